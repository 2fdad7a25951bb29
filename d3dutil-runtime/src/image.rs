//! Decoding image files into textures with mip chains.
use crate::dds;
use crate::error::ImageError;
use d3dutil_common::{ImageFormat, Size};
use image::imageops::FilterType;
use image::DynamicImage;
use std::path::Path;

/// One mip level of a decoded texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipLevel {
    pub bytes: Vec<u8>,
    pub size: Size<u32>,
    /// Byte stride between rows, or block rows for compressed formats.
    pub row_pitch: u32,
    /// Byte size of the whole level.
    pub depth_pitch: u32,
}

impl MipLevel {
    /// A tightly packed mip level.
    pub fn packed(format: ImageFormat, size: Size<u32>, bytes: Vec<u8>) -> MipLevel {
        MipLevel {
            bytes,
            size,
            row_pitch: format.row_pitch(size.width),
            depth_pitch: format.surface_size(size),
        }
    }
}

/// A decoded 2D texture and its mip chain, ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub format: ImageFormat,
    pub size: Size<u32>,
    pub mips: Vec<MipLevel>,
}

/// The number of mip levels kept out of `available` when capped at
/// `max_mip_levels`, where 0 means no cap.
pub fn effective_mip_levels(available: u32, max_mip_levels: u32) -> u32 {
    if max_mip_levels == 0 {
        available
    } else {
        available.min(max_mip_levels)
    }
}

impl TextureData {
    /// Load a texture from a file, keeping at most `max_mip_levels` mips (0 keeps all).
    ///
    /// DDS files keep their stored format and mip chain. Other formats are
    /// decoded as RGBA8 and get a full generated mip chain.
    pub fn load(path: impl AsRef<Path>, max_mip_levels: u32) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let is_dds = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("dds"));

        if is_dds {
            let bytes =
                std::fs::read(path).map_err(|e| ImageError::IoError(path.to_path_buf(), e))?;
            return dds::decode(&bytes, max_mip_levels);
        }

        let image = image::open(path)?;
        Ok(Self::from_image(image, max_mip_levels))
    }

    /// Decode a DDS file from memory.
    pub fn from_dds(bytes: &[u8], max_mip_levels: u32) -> Result<Self, ImageError> {
        dds::decode(bytes, max_mip_levels)
    }

    /// Convert an image to RGBA8 and generate its mip chain.
    pub fn from_image(image: DynamicImage, max_mip_levels: u32) -> Self {
        const FORMAT: ImageFormat = ImageFormat::R8G8B8A8Unorm;

        let mut current = image.to_rgba8();
        let size = Size::new(current.width(), current.height());
        let mip_levels = effective_mip_levels(size.calculate_miplevels().max(1), max_mip_levels);

        let mut mips = Vec::with_capacity(mip_levels as usize);
        for level in 0..mip_levels {
            let mip_size = size.scale_mipmap(level);
            if level > 0 {
                current = image::imageops::resize(
                    &current,
                    mip_size.width,
                    mip_size.height,
                    FilterType::Triangle,
                );
            }
            mips.push(MipLevel::packed(FORMAT, mip_size, current.as_raw().clone()));
        }

        TextureData {
            format: FORMAT,
            size,
            mips,
        }
    }

    /// Assemble a texture from tightly packed mip levels, largest first.
    pub fn from_packed_mips(
        format: ImageFormat,
        size: Size<u32>,
        mips: Vec<Vec<u8>>,
    ) -> Result<Self, ImageError> {
        if mips.is_empty() {
            return Err(ImageError::UnsupportedLayout("texture without mip levels"));
        }

        let mips = mips
            .into_iter()
            .enumerate()
            .map(|(level, bytes)| {
                let mip_size = size.scale_mipmap(level as u32);
                if bytes.len() != format.surface_size(mip_size) as usize {
                    return Err(ImageError::InvalidMipLevel(level as u32));
                }
                Ok(MipLevel::packed(format, mip_size, bytes))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TextureData { format, size, mips })
    }

    pub fn mip_levels(&self) -> u32 {
        self.mips.len() as u32
    }

    /// Encode the texture as a DDS file.
    pub fn to_dds_bytes(&self) -> Vec<u8> {
        dds::encode(self)
    }
}
