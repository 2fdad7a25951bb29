//! DirectDraw Surface container parsing.
//!
//! Only single 2D textures are supported. The DX10 extension header is read
//! when present and written by [`encode`].
use crate::error::ImageError;
use crate::image::{MipLevel, TextureData};
use bytemuck::{Pod, Zeroable};
use d3dutil_common::{ImageFormat, Size};
use std::mem::size_of;

const DDS_MAGIC: u32 = four_cc(b"DDS ");

const DDSD_CAPS: u32 = 0x1;
const DDSD_HEIGHT: u32 = 0x2;
const DDSD_WIDTH: u32 = 0x4;
const DDSD_PITCH: u32 = 0x8;
const DDSD_PIXELFORMAT: u32 = 0x1000;
const DDSD_MIPMAPCOUNT: u32 = 0x20000;
const DDSD_LINEARSIZE: u32 = 0x80000;
const DDSD_DEPTH: u32 = 0x80_0000;

const DDPF_ALPHA: u32 = 0x2;
const DDPF_FOURCC: u32 = 0x4;
const DDPF_RGB: u32 = 0x40;
const DDPF_LUMINANCE: u32 = 0x2_0000;

const DDSCAPS_COMPLEX: u32 = 0x8;
const DDSCAPS_TEXTURE: u32 = 0x1000;
const DDSCAPS_MIPMAP: u32 = 0x40_0000;

const DDSCAPS2_CUBEMAP: u32 = 0x200;
const DDSCAPS2_VOLUME: u32 = 0x20_0000;

const DIMENSION_TEXTURE2D: u32 = 3;
const DIMENSION_TEXTURE3D: u32 = 4;
const MISC_TEXTURECUBE: u32 = 0x4;

const DX10: u32 = four_cc(b"DX10");
const DXT1: u32 = four_cc(b"DXT1");
const DXT2: u32 = four_cc(b"DXT2");
const DXT3: u32 = four_cc(b"DXT3");
const DXT4: u32 = four_cc(b"DXT4");
const DXT5: u32 = four_cc(b"DXT5");
const ATI1: u32 = four_cc(b"ATI1");
const BC4U: u32 = four_cc(b"BC4U");
const ATI2: u32 = four_cc(b"ATI2");
const BC5U: u32 = four_cc(b"BC5U");

// D3DFORMAT values stored in the FourCC field
const D3DFMT_A16B16G16R16: u32 = 36;
const D3DFMT_R16F: u32 = 111;
const D3DFMT_A16B16G16R16F: u32 = 113;
const D3DFMT_R32F: u32 = 114;
const D3DFMT_A32B32G32R32F: u32 = 116;

const fn four_cc(code: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*code)
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct DdsPixelFormat {
    size: u32,
    flags: u32,
    four_cc: u32,
    rgb_bit_count: u32,
    r_bit_mask: u32,
    g_bit_mask: u32,
    b_bit_mask: u32,
    a_bit_mask: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct DdsHeader {
    size: u32,
    flags: u32,
    height: u32,
    width: u32,
    pitch_or_linear_size: u32,
    depth: u32,
    mip_map_count: u32,
    reserved1: [u32; 11],
    pixel_format: DdsPixelFormat,
    caps: u32,
    caps2: u32,
    caps3: u32,
    caps4: u32,
    reserved2: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct DdsHeaderDxt10 {
    dxgi_format: u32,
    resource_dimension: u32,
    misc_flag: u32,
    array_size: u32,
    misc_flags2: u32,
}

/// `D3D11_REQ_TEXTURE2D_U_OR_V_DIMENSION`
const MAX_DIMENSION: u32 = 16384;
/// `D3D11_REQ_MIP_LEVELS`
const MAX_MIP_LEVELS: u32 = 15;

const HEADER_OFFSET: usize = size_of::<u32>();
const DATA_OFFSET: usize = HEADER_OFFSET + size_of::<DdsHeader>();
const DX10_DATA_OFFSET: usize = DATA_OFFSET + size_of::<DdsHeaderDxt10>();

/// Decode a DDS file, keeping at most `max_mip_levels` mips (0 keeps all).
pub fn decode(bytes: &[u8], max_mip_levels: u32) -> Result<TextureData, ImageError> {
    let Some(magic) = bytes.get(..HEADER_OFFSET) else {
        return Err(ImageError::InvalidDds("file is too small"));
    };
    if magic != DDS_MAGIC.to_le_bytes() {
        return Err(ImageError::InvalidDds("missing DDS magic"));
    }

    let header: DdsHeader = bytes
        .get(HEADER_OFFSET..DATA_OFFSET)
        .map(bytemuck::pod_read_unaligned)
        .ok_or(ImageError::InvalidDds("truncated header"))?;

    if header.size as usize != size_of::<DdsHeader>()
        || header.pixel_format.size as usize != size_of::<DdsPixelFormat>()
    {
        return Err(ImageError::InvalidDds("bad header size"));
    }

    let pf = &header.pixel_format;
    let (format, mut offset) = if pf.flags & DDPF_FOURCC != 0 && pf.four_cc == DX10 {
        let dxt10: DdsHeaderDxt10 = bytes
            .get(DATA_OFFSET..DX10_DATA_OFFSET)
            .map(bytemuck::pod_read_unaligned)
            .ok_or(ImageError::InvalidDds("truncated DX10 header"))?;

        match dxt10.resource_dimension {
            DIMENSION_TEXTURE2D => {}
            DIMENSION_TEXTURE3D => return Err(ImageError::UnsupportedLayout("volume texture")),
            _ => return Err(ImageError::UnsupportedLayout("not a 2D texture")),
        }
        if dxt10.misc_flag & MISC_TEXTURECUBE != 0 {
            return Err(ImageError::UnsupportedLayout("cubemap"));
        }
        match dxt10.array_size {
            0 => return Err(ImageError::InvalidDds("empty texture array")),
            1 => {}
            _ => return Err(ImageError::UnsupportedLayout("texture array")),
        }

        let format = ImageFormat::from_dxgi(dxt10.dxgi_format).ok_or_else(|| {
            ImageError::UnsupportedFormat(format!("DXGI_FORMAT {}", dxt10.dxgi_format))
        })?;
        (format, DX10_DATA_OFFSET)
    } else {
        if header.caps2 & DDSCAPS2_VOLUME != 0
            || (header.flags & DDSD_DEPTH != 0 && header.depth > 1)
        {
            return Err(ImageError::UnsupportedLayout("volume texture"));
        }
        if header.caps2 & DDSCAPS2_CUBEMAP != 0 {
            return Err(ImageError::UnsupportedLayout("cubemap"));
        }
        (legacy_format(pf)?, DATA_OFFSET)
    };

    let size = Size::new(header.width, header.height);
    if size.width == 0 || size.height == 0 {
        return Err(ImageError::InvalidDds("zero-sized texture"));
    }
    if size.width > MAX_DIMENSION || size.height > MAX_DIMENSION {
        return Err(ImageError::InvalidDds("dimension too large"));
    }
    if header.mip_map_count > MAX_MIP_LEVELS
        || header.mip_map_count > size.calculate_miplevels()
    {
        return Err(ImageError::InvalidDds("mip count exceeds the full chain"));
    }

    let mip_levels = crate::image::effective_mip_levels(header.mip_map_count.max(1), max_mip_levels);
    let mut mips = Vec::new();
    for level in 0..mip_levels {
        let mip_size = size.scale_mipmap(level);
        let len = format
            .checked_surface_size(mip_size)
            .ok_or(ImageError::InvalidDds("surface too large"))? as usize;
        let data = offset
            .checked_add(len)
            .and_then(|end| bytes.get(offset..end))
            .ok_or(ImageError::InvalidDds("truncated pixel data"))?;
        mips.push(MipLevel::packed(format, mip_size, data.to_vec()));
        offset += len;
    }

    Ok(TextureData { format, size, mips })
}

/// Encode a texture as a DDS file with a DX10 header.
pub fn encode(texture: &TextureData) -> Vec<u8> {
    let format = texture.format;
    let mip_levels = texture.mips.len() as u32;

    let mut header = DdsHeader::zeroed();
    header.size = size_of::<DdsHeader>() as u32;
    header.flags = DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT | DDSD_MIPMAPCOUNT;
    header.height = texture.size.height;
    header.width = texture.size.width;
    if format.is_block_compressed() {
        header.flags |= DDSD_LINEARSIZE;
        header.pitch_or_linear_size = format.surface_size(texture.size);
    } else {
        header.flags |= DDSD_PITCH;
        header.pitch_or_linear_size = format.row_pitch(texture.size.width);
    }
    header.mip_map_count = mip_levels;
    header.pixel_format.size = size_of::<DdsPixelFormat>() as u32;
    header.pixel_format.flags = DDPF_FOURCC;
    header.pixel_format.four_cc = DX10;
    header.caps = DDSCAPS_TEXTURE;
    if mip_levels > 1 {
        header.caps |= DDSCAPS_COMPLEX | DDSCAPS_MIPMAP;
    }

    let dxt10 = DdsHeaderDxt10 {
        dxgi_format: format.dxgi(),
        resource_dimension: DIMENSION_TEXTURE2D,
        misc_flag: 0,
        array_size: 1,
        misc_flags2: 0,
    };

    let mut bytes = Vec::with_capacity(
        DX10_DATA_OFFSET + texture.mips.iter().map(|m| m.bytes.len()).sum::<usize>(),
    );
    bytes.extend_from_slice(&DDS_MAGIC.to_le_bytes());
    bytes.extend_from_slice(bytemuck::bytes_of(&header));
    bytes.extend_from_slice(bytemuck::bytes_of(&dxt10));

    for mip in &texture.mips {
        let packed_pitch = format.row_pitch(mip.size.width) as usize;
        if mip.row_pitch as usize == packed_pitch {
            bytes.extend_from_slice(&mip.bytes);
            continue;
        }
        // repack padded rows
        for row in mip.bytes.chunks(mip.row_pitch as usize) {
            bytes.extend_from_slice(&row[..packed_pitch.min(row.len())]);
        }
    }

    bytes
}

fn legacy_format(pf: &DdsPixelFormat) -> Result<ImageFormat, ImageError> {
    let masks = (pf.r_bit_mask, pf.g_bit_mask, pf.b_bit_mask, pf.a_bit_mask);
    let format = if pf.flags & DDPF_RGB != 0 {
        match (pf.rgb_bit_count, masks) {
            (32, (0x0000_00ff, 0x0000_ff00, 0x00ff_0000, 0xff00_0000)) => {
                Some(ImageFormat::R8G8B8A8Unorm)
            }
            (32, (0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0xff00_0000)) => {
                Some(ImageFormat::B8G8R8A8Unorm)
            }
            (32, (0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0)) => Some(ImageFormat::B8G8R8X8Unorm),
            (32, (0x0000_03ff, 0x000f_fc00, 0x3ff0_0000, 0xc000_0000)) => {
                Some(ImageFormat::A2B10G10R10UnormPack32)
            }
            (32, (0xffff_ffff, 0, 0, 0)) => Some(ImageFormat::R32Sfloat),
            (16, (0xf800, 0x07e0, 0x001f, 0)) => Some(ImageFormat::B5G6R5Unorm),
            (16, (0x7c00, 0x03e0, 0x001f, 0x8000)) => Some(ImageFormat::B5G5R5A1Unorm),
            _ => None,
        }
    } else if pf.flags & DDPF_LUMINANCE != 0 {
        match (pf.rgb_bit_count, masks) {
            (8, (0xff, 0, 0, 0)) => Some(ImageFormat::R8Unorm),
            (16, (0xff, 0, 0, 0xff00)) => Some(ImageFormat::R8G8Unorm),
            _ => None,
        }
    } else if pf.flags & DDPF_ALPHA != 0 {
        (pf.rgb_bit_count == 8).then_some(ImageFormat::A8Unorm)
    } else if pf.flags & DDPF_FOURCC != 0 {
        match pf.four_cc {
            DXT1 => Some(ImageFormat::Bc1Unorm),
            DXT2 | DXT3 => Some(ImageFormat::Bc2Unorm),
            DXT4 | DXT5 => Some(ImageFormat::Bc3Unorm),
            ATI1 | BC4U => Some(ImageFormat::Bc4Unorm),
            ATI2 | BC5U => Some(ImageFormat::Bc5Unorm),
            D3DFMT_A16B16G16R16 => Some(ImageFormat::R16G16B16A16Unorm),
            D3DFMT_R16F => Some(ImageFormat::R16Sfloat),
            D3DFMT_A16B16G16R16F => Some(ImageFormat::R16G16B16A16Sfloat),
            D3DFMT_R32F => Some(ImageFormat::R32Sfloat),
            D3DFMT_A32B32G32R32F => Some(ImageFormat::R32G32B32A32Sfloat),
            _ => None,
        }
    } else {
        None
    };

    format.ok_or_else(|| {
        ImageError::UnsupportedFormat(format!(
            "flags {:#x}, fourcc {:#010x}, {} bpp, masks {:08x}/{:08x}/{:08x}/{:08x}",
            pf.flags,
            pf.four_cc,
            pf.rgb_bit_count,
            pf.r_bit_mask,
            pf.g_bit_mask,
            pf.b_bit_mask,
            pf.a_bit_mask
        ))
    })
}
