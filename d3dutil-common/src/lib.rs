//! Common types shared by the d3dutil runtime and its backends.
#[cfg(all(target_os = "windows", feature = "d3d11"))]
pub mod d3d11;

mod hresult;

pub use hresult::*;

/// Pixel formats understood by the texture helpers.
///
/// Discriminants are the matching `DXGI_FORMAT` values, so a format can be
/// handed to the native API without a lookup table.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ImageFormat {
    /* 128-bit */
    R32G32B32A32Sfloat = 2,

    /* 64-bit */
    R16G16B16A16Sfloat = 10,
    R16G16B16A16Unorm = 11,

    /* 32-bit */
    A2B10G10R10UnormPack32 = 24,
    R8G8B8A8Unorm = 28,
    R8G8B8A8Srgb = 29,
    R32Sfloat = 41,
    B8G8R8A8Unorm = 87,
    B8G8R8X8Unorm = 88,
    B8G8R8A8Srgb = 91,
    B8G8R8X8Srgb = 93,

    /* 16-bit */
    R8G8Unorm = 49,
    R16Sfloat = 54,
    B5G6R5Unorm = 85,
    B5G5R5A1Unorm = 86,

    /* 8-bit */
    R8Unorm = 61,
    A8Unorm = 65,

    /* block compressed */
    Bc1Unorm = 71,
    Bc1Srgb = 72,
    Bc2Unorm = 74,
    Bc2Srgb = 75,
    Bc3Unorm = 77,
    Bc3Srgb = 78,
    Bc4Unorm = 80,
    Bc5Unorm = 83,
    Bc7Unorm = 98,
    Bc7Srgb = 99,
}

impl ImageFormat {
    /// Look up a format by its `DXGI_FORMAT` value.
    pub const fn from_dxgi(value: u32) -> Option<ImageFormat> {
        Some(match value {
            2 => Self::R32G32B32A32Sfloat,
            10 => Self::R16G16B16A16Sfloat,
            11 => Self::R16G16B16A16Unorm,
            24 => Self::A2B10G10R10UnormPack32,
            28 => Self::R8G8B8A8Unorm,
            29 => Self::R8G8B8A8Srgb,
            41 => Self::R32Sfloat,
            87 => Self::B8G8R8A8Unorm,
            88 => Self::B8G8R8X8Unorm,
            91 => Self::B8G8R8A8Srgb,
            93 => Self::B8G8R8X8Srgb,
            49 => Self::R8G8Unorm,
            54 => Self::R16Sfloat,
            85 => Self::B5G6R5Unorm,
            86 => Self::B5G5R5A1Unorm,
            61 => Self::R8Unorm,
            65 => Self::A8Unorm,
            71 => Self::Bc1Unorm,
            72 => Self::Bc1Srgb,
            74 => Self::Bc2Unorm,
            75 => Self::Bc2Srgb,
            77 => Self::Bc3Unorm,
            78 => Self::Bc3Srgb,
            80 => Self::Bc4Unorm,
            83 => Self::Bc5Unorm,
            98 => Self::Bc7Unorm,
            99 => Self::Bc7Srgb,
            _ => return None,
        })
    }

    /// The `DXGI_FORMAT` value of this format.
    pub const fn dxgi(self) -> u32 {
        self as u32
    }

    /// Bytes per 4x4 block for block-compressed formats.
    pub const fn block_bytes(self) -> Option<u32> {
        match self {
            Self::Bc1Unorm | Self::Bc1Srgb | Self::Bc4Unorm => Some(8),
            Self::Bc2Unorm
            | Self::Bc2Srgb
            | Self::Bc3Unorm
            | Self::Bc3Srgb
            | Self::Bc5Unorm
            | Self::Bc7Unorm
            | Self::Bc7Srgb => Some(16),
            _ => None,
        }
    }

    pub const fn is_block_compressed(self) -> bool {
        self.block_bytes().is_some()
    }

    /// Bits per pixel of an uncompressed format, or the effective rate of a
    /// block-compressed one.
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            Self::R32G32B32A32Sfloat => 128,
            Self::R16G16B16A16Sfloat | Self::R16G16B16A16Unorm => 64,
            Self::A2B10G10R10UnormPack32
            | Self::R8G8B8A8Unorm
            | Self::R8G8B8A8Srgb
            | Self::R32Sfloat
            | Self::B8G8R8A8Unorm
            | Self::B8G8R8X8Unorm
            | Self::B8G8R8A8Srgb
            | Self::B8G8R8X8Srgb => 32,
            Self::R8G8Unorm | Self::R16Sfloat | Self::B5G6R5Unorm | Self::B5G5R5A1Unorm => 16,
            Self::R8Unorm | Self::A8Unorm => 8,
            Self::Bc1Unorm | Self::Bc1Srgb | Self::Bc4Unorm => 4,
            Self::Bc2Unorm
            | Self::Bc2Srgb
            | Self::Bc3Unorm
            | Self::Bc3Srgb
            | Self::Bc5Unorm
            | Self::Bc7Unorm
            | Self::Bc7Srgb => 8,
        }
    }

    /// Byte stride between rows (block rows for compressed formats) of a
    /// tightly packed surface of the given width, saturating at `u32::MAX`.
    pub const fn row_pitch(self, width: u32) -> u32 {
        match self.checked_row_pitch(width) {
            Some(pitch) => pitch,
            None => u32::MAX,
        }
    }

    /// Like [`row_pitch`](Self::row_pitch), or `None` on overflow.
    pub const fn checked_row_pitch(self, width: u32) -> Option<u32> {
        match self.block_bytes() {
            Some(block) => block.checked_mul(block_count(width)),
            None => match width.checked_mul(self.bits_per_pixel()) {
                Some(bits) => Some(bits.div_ceil(8)),
                None => None,
            },
        }
    }

    /// Number of rows (block rows for compressed formats) in a surface of the
    /// given height.
    pub const fn row_count(self, height: u32) -> u32 {
        if self.is_block_compressed() {
            block_count(height)
        } else {
            height
        }
    }

    /// Byte size of a tightly packed surface, saturating at `u32::MAX`.
    pub const fn surface_size(self, size: Size<u32>) -> u32 {
        match self.checked_surface_size(size) {
            Some(len) => len,
            None => u32::MAX,
        }
    }

    /// Like [`surface_size`](Self::surface_size), or `None` on overflow.
    pub const fn checked_surface_size(self, size: Size<u32>) -> Option<u32> {
        match self.checked_row_pitch(size.width) {
            Some(pitch) => pitch.checked_mul(self.row_count(size.height)),
            None => None,
        }
    }
}

const fn block_count(texels: u32) -> u32 {
    let blocks = texels.div_ceil(4);
    if blocks == 0 {
        1
    } else {
        blocks
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

impl<T> Size<T> {
    pub const fn new(width: T, height: T) -> Self {
        Size { width, height }
    }
}

impl Size<u32> {
    /// Calculate the number of mipmap levels of a full chain for this size.
    pub fn calculate_miplevels(self) -> u32 {
        let mut size = std::cmp::max(self.width, self.height);
        let mut levels = 0;
        while size != 0 {
            levels += 1;
            size >>= 1;
        }

        levels
    }

    /// The size of the given mip level, clamped to 1x1.
    pub fn scale_mipmap(self, miplevel: u32) -> Size<u32> {
        let scale = |extent: u32| extent.checked_shr(miplevel).unwrap_or(0).max(1);
        Size {
            width: scale(self.width),
            height: scale(self.height),
        }
    }
}
