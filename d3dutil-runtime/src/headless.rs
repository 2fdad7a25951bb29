//! A CPU-only texture backend.
//!
//! Textures live in system memory and can be read back, which makes this
//! backend useful wherever no Direct3D device is available.
use crate::error::TextureArrayError;
use crate::image::{MipLevel, TextureData};
use crate::texture_array::{
    ArrayViewDesc, TextureArrayDesc, TextureContext, TextureDesc, TextureDevice,
};
use d3dutil_common::{HResult, Size};
use parking_lot::RwLock;
use std::cell::Cell;
use std::sync::Arc;

/// Largest width or height of a 2D texture.
pub const MAX_TEXTURE_DIMENSION: u32 = 16384;
/// Largest number of slices in a texture array.
pub const MAX_ARRAY_SIZE: u32 = 2048;

/// A device that allocates textures in system memory.
#[derive(Debug, Default)]
pub struct HeadlessDevice {
    staging_created: Cell<usize>,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of staging textures created so far.
    pub fn staging_created(&self) -> usize {
        self.staging_created.get()
    }
}

/// A staging texture holding a decoded image.
#[derive(Debug, Clone)]
pub struct HeadlessStaging {
    data: TextureData,
}

impl HeadlessStaging {
    pub fn data(&self) -> &TextureData {
        &self.data
    }
}

#[derive(Debug)]
struct TextureStorage {
    desc: TextureArrayDesc,
    subresources: RwLock<Vec<MipLevel>>,
}

/// A shared handle to a texture array in system memory.
#[derive(Debug, Clone)]
pub struct HeadlessTexture {
    storage: Arc<TextureStorage>,
}

impl HeadlessTexture {
    pub fn desc(&self) -> &TextureArrayDesc {
        &self.storage.desc
    }

    /// Read back a tightly packed copy of a subresource.
    pub fn read_subresource(&self, subresource: u32) -> Option<Vec<u8>> {
        self.storage
            .subresources
            .read()
            .get(subresource as usize)
            .map(|level| level.bytes.clone())
    }

    /// The number of live handles to this texture, views included.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.storage)
    }
}

/// A view over a texture array. Holds a handle to the texture it views.
#[derive(Debug, Clone)]
pub struct HeadlessView {
    texture: HeadlessTexture,
    desc: ArrayViewDesc,
}

impl HeadlessView {
    pub fn texture(&self) -> &HeadlessTexture {
        &self.texture
    }

    pub fn desc(&self) -> &ArrayViewDesc {
        &self.desc
    }
}

/// Mapped staging memory.
#[derive(Debug, Clone)]
pub struct HeadlessMapping {
    pub bytes: Vec<u8>,
    pub row_pitch: u32,
    pub depth_pitch: u32,
}

/// A context that copies between system memory textures.
#[derive(Debug, Default)]
pub struct HeadlessContext {
    maps: Cell<usize>,
    unmaps: Cell<usize>,
    updates: Cell<usize>,
    rejected_updates: Cell<usize>,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn maps(&self) -> usize {
        self.maps.get()
    }

    pub fn unmaps(&self) -> usize {
        self.unmaps.get()
    }

    pub fn updates(&self) -> usize {
        self.updates.get()
    }

    /// Updates dropped because the subresource or the mapped data was invalid.
    pub fn rejected_updates(&self) -> usize {
        self.rejected_updates.get()
    }
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

impl TextureDevice for HeadlessDevice {
    type Staging = HeadlessStaging;
    type Texture = HeadlessTexture;
    type View = HeadlessView;

    fn create_staging_texture(
        &self,
        source: &TextureData,
    ) -> Result<Self::Staging, TextureArrayError> {
        if source.mips.is_empty()
            || source.size.width > MAX_TEXTURE_DIMENSION
            || source.size.height > MAX_TEXTURE_DIMENSION
        {
            return Err(TextureArrayError::Device(HResult::E_INVALIDARG));
        }

        bump(&self.staging_created);
        Ok(HeadlessStaging {
            data: source.clone(),
        })
    }

    fn staging_desc(&self, staging: &Self::Staging) -> TextureDesc {
        TextureDesc {
            size: staging.data.size,
            mip_levels: staging.data.mip_levels(),
            format: staging.data.format,
        }
    }

    fn create_texture_array(
        &self,
        desc: &TextureArrayDesc,
    ) -> Result<Self::Texture, TextureArrayError> {
        let Size { width, height } = desc.size;
        if width == 0
            || height == 0
            || width > MAX_TEXTURE_DIMENSION
            || height > MAX_TEXTURE_DIMENSION
            || desc.array_size == 0
            || desc.array_size > MAX_ARRAY_SIZE
            || desc.mip_levels == 0
            || desc.mip_levels > desc.size.calculate_miplevels()
        {
            return Err(TextureArrayError::Device(HResult::E_INVALIDARG));
        }

        let mut subresources = Vec::with_capacity(desc.subresource_count() as usize);
        for _slice in 0..desc.array_size {
            for mip in 0..desc.mip_levels {
                let mip_size = desc.size.scale_mipmap(mip);
                let len = desc.format.surface_size(mip_size) as usize;
                subresources.push(MipLevel::packed(desc.format, mip_size, vec![0; len]));
            }
        }

        Ok(HeadlessTexture {
            storage: Arc::new(TextureStorage {
                desc: *desc,
                subresources: RwLock::new(subresources),
            }),
        })
    }

    fn create_array_view(
        &self,
        texture: &Self::Texture,
        desc: &ArrayViewDesc,
    ) -> Result<Self::View, TextureArrayError> {
        let texture_desc = texture.desc();
        if desc.format != texture_desc.format
            || desc.most_detailed_mip + desc.mip_levels > texture_desc.mip_levels
            || desc.first_array_slice + desc.array_size > texture_desc.array_size
        {
            return Err(TextureArrayError::Device(HResult::E_INVALIDARG));
        }

        Ok(HeadlessView {
            texture: texture.clone(),
            desc: *desc,
        })
    }
}

impl TextureContext<HeadlessDevice> for HeadlessContext {
    type Mapping = HeadlessMapping;

    fn map_read(
        &self,
        staging: &HeadlessStaging,
        mip_level: u32,
    ) -> Result<Self::Mapping, TextureArrayError> {
        let level = staging
            .data
            .mips
            .get(mip_level as usize)
            .ok_or(TextureArrayError::Device(HResult::E_INVALIDARG))?;

        bump(&self.maps);
        Ok(HeadlessMapping {
            bytes: level.bytes.clone(),
            row_pitch: level.row_pitch,
            depth_pitch: level.depth_pitch,
        })
    }

    fn update_subresource(
        &self,
        texture: &HeadlessTexture,
        subresource: u32,
        source: &Self::Mapping,
    ) {
        let format = texture.desc().format;
        let mut subresources = texture.storage.subresources.write();
        let Some(target) = subresources.get_mut(subresource as usize) else {
            log::error!("subresource {subresource} is out of range");
            bump(&self.rejected_updates);
            return;
        };

        let row_len = target.row_pitch as usize;
        let rows = format.row_count(target.size.height) as usize;
        let required = (rows - 1) * source.row_pitch as usize + row_len;
        if source.row_pitch < target.row_pitch || source.bytes.len() < required {
            log::error!("mapped data for subresource {subresource} is too short");
            bump(&self.rejected_updates);
            return;
        }

        for row in 0..rows {
            let src = row * source.row_pitch as usize;
            let dst = row * row_len;
            target.bytes[dst..dst + row_len].copy_from_slice(&source.bytes[src..src + row_len]);
        }
        bump(&self.updates);
    }

    fn unmap(&self, _staging: &HeadlessStaging, _mip_level: u32) {
        bump(&self.unmaps);
    }
}
