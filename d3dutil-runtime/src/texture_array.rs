//! Building a 2D texture array from a set of image files.
//!
//! Every source image is decoded into a CPU-readable staging texture, then each
//! of its mip levels is copied into its own slice of a freshly allocated array.
//! The array is returned together with a shader resource view over all of its
//! mips and slices.
use crate::error::TextureArrayError;
use crate::image::TextureData;
use d3dutil_common::{ImageFormat, Size};
use std::path::Path;

/// Dimensions of a single 2D texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    pub size: Size<u32>,
    pub mip_levels: u32,
    pub format: ImageFormat,
}

/// Description of the texture array to allocate.
///
/// The array is always single-sampled, lives in default (GPU) memory, is bound
/// as a shader resource only and has no CPU access.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureArrayDesc {
    pub size: Size<u32>,
    pub mip_levels: u32,
    pub array_size: u32,
    pub format: ImageFormat,
}

impl TextureArrayDesc {
    pub fn subresource_count(&self) -> u32 {
        self.mip_levels * self.array_size
    }
}

/// A 2D-array shader resource view.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ArrayViewDesc {
    pub format: ImageFormat,
    pub most_detailed_mip: u32,
    pub mip_levels: u32,
    pub first_array_slice: u32,
    pub array_size: u32,
}

impl ArrayViewDesc {
    /// A view over every mip level and slice of the array.
    pub fn full(desc: &TextureArrayDesc) -> ArrayViewDesc {
        ArrayViewDesc {
            format: desc.format,
            most_detailed_mip: 0,
            mip_levels: desc.mip_levels,
            first_array_slice: 0,
            array_size: desc.array_size,
        }
    }
}

/// Subresource index of `mip_slice` in array slice `array_slice`.
///
/// Equivalent to `D3D11CalcSubresource`.
pub const fn calc_subresource(mip_slice: u32, array_slice: u32, mip_levels: u32) -> u32 {
    mip_slice + array_slice * mip_levels
}

/// Resource creation for the texture array builder.
pub trait TextureDevice {
    /// A CPU-readable texture holding one decoded source image.
    type Staging;
    /// The texture array.
    type Texture;
    /// A shader resource view over the texture array.
    type View;

    /// Create a staging texture with CPU read and write access from decoded data.
    fn create_staging_texture(&self, source: &TextureData)
        -> Result<Self::Staging, TextureArrayError>;

    /// The dimensions of a staging texture, as reported by the device.
    fn staging_desc(&self, staging: &Self::Staging) -> TextureDesc;

    fn create_texture_array(
        &self,
        desc: &TextureArrayDesc,
    ) -> Result<Self::Texture, TextureArrayError>;

    fn create_array_view(
        &self,
        texture: &Self::Texture,
        desc: &ArrayViewDesc,
    ) -> Result<Self::View, TextureArrayError>;
}

/// Subresource copies for the texture array builder.
pub trait TextureContext<D: TextureDevice + ?Sized> {
    /// A mapped staging subresource.
    type Mapping;

    /// Map a mip level of a staging texture for reading.
    fn map_read(&self, staging: &D::Staging, mip_level: u32)
        -> Result<Self::Mapping, TextureArrayError>;

    /// Copy mapped data into a subresource of the texture array.
    fn update_subresource(&self, texture: &D::Texture, subresource: u32, source: &Self::Mapping);

    fn unmap(&self, staging: &D::Staging, mip_level: u32);
}

/// A texture array and the shader resource view over it.
///
/// The view is only valid while the texture is alive, so both are kept together.
pub struct TextureArray<D: TextureDevice + ?Sized> {
    texture: D::Texture,
    view: D::View,
    desc: TextureArrayDesc,
}

impl<D: TextureDevice + ?Sized> TextureArray<D> {
    pub fn view(&self) -> &D::View {
        &self.view
    }

    pub fn texture(&self) -> &D::Texture {
        &self.texture
    }

    pub fn desc(&self) -> &TextureArrayDesc {
        &self.desc
    }

    /// Split into the texture and its view.
    pub fn into_parts(self) -> (D::Texture, D::View) {
        (self.texture, self.view)
    }
}

impl<D> std::fmt::Debug for TextureArray<D>
where
    D: TextureDevice + ?Sized,
    D::Texture: std::fmt::Debug,
    D::View: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureArray")
            .field("texture", &self.texture)
            .field("view", &self.view)
            .field("desc", &self.desc)
            .finish()
    }
}

/// Build a texture array from the images at `paths`.
///
/// Each image is loaded with at most `max_mip_levels` mip levels (0 keeps all).
/// All images must have the same size, mip count and format.
///
/// Returns `Ok(None)` without loading anything if the device or context is missing.
pub fn build_texture_array<D, C, P>(
    device: Option<&D>,
    context: Option<&C>,
    paths: &[P],
    max_mip_levels: u32,
) -> Result<Option<TextureArray<D>>, TextureArrayError>
where
    D: TextureDevice + ?Sized,
    C: TextureContext<D> + ?Sized,
    P: AsRef<Path>,
{
    let (Some(device), Some(context)) = (device, context) else {
        return Ok(None);
    };

    if paths.is_empty() {
        return Err(TextureArrayError::NoSources);
    }

    // load every source into staging memory
    let mut sources = Vec::with_capacity(paths.len());
    let mut reference: Option<TextureDesc> = None;
    for (index, path) in paths.iter().enumerate() {
        let path = path.as_ref();
        let data = TextureData::load(path, max_mip_levels)
            .map_err(|e| TextureArrayError::ImageLoad(path.to_path_buf(), e))?;
        let staging = device.create_staging_texture(&data)?;
        let desc = device.staging_desc(&staging);

        match reference {
            None => reference = Some(desc),
            Some(expected) if expected != desc => {
                return Err(TextureArrayError::MismatchedSource {
                    index,
                    path: path.to_path_buf(),
                    expected,
                    actual: desc,
                });
            }
            Some(_) => {}
        }
        sources.push(staging);
    }

    let Some(reference) = reference else {
        return Err(TextureArrayError::NoSources);
    };

    let desc = TextureArrayDesc {
        size: reference.size,
        mip_levels: reference.mip_levels,
        array_size: sources.len() as u32,
        format: reference.format,
    };
    log::debug!(
        "allocating {}x{} texture array with {} slices of {} mips ({:?})",
        desc.size.width,
        desc.size.height,
        desc.array_size,
        desc.mip_levels,
        desc.format
    );
    let texture = device.create_texture_array(&desc)?;

    // copy each mip of each source into its slice
    for (slice, staging) in sources.iter().enumerate() {
        let slice = slice as u32;
        for mip in 0..desc.mip_levels {
            let mapping = context.map_read(staging, mip)?;
            let subresource = calc_subresource(mip, slice, desc.mip_levels);
            log::trace!("copying slice {slice} mip {mip} into subresource {subresource}");
            context.update_subresource(&texture, subresource, &mapping);
            context.unmap(staging, mip);
        }
    }

    let view = device.create_array_view(&texture, &ArrayViewDesc::full(&desc))?;

    Ok(Some(TextureArray {
        texture,
        view,
        desc,
    }))
}
