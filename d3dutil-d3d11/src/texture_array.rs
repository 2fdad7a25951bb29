//! Texture arrays on a Direct3D 11 device.
use crate::util::{assume_d3d11_init, device_error};
use d3dutil_common::ImageFormat;
use d3dutil_runtime::error::TextureArrayError;
use d3dutil_runtime::image::TextureData;
use d3dutil_runtime::texture_array::{
    build_texture_array, ArrayViewDesc, TextureArray, TextureArrayDesc, TextureContext,
    TextureDesc, TextureDevice,
};
use std::ops::Deref;
use std::path::Path;
use windows::Win32::Graphics::Direct3D::D3D_SRV_DIMENSION_TEXTURE2DARRAY;
use windows::Win32::Graphics::Direct3D11::{
    ID3D11Device, ID3D11DeviceContext, ID3D11ShaderResourceView, ID3D11Texture2D,
    D3D11_BIND_SHADER_RESOURCE, D3D11_CPU_ACCESS_READ, D3D11_CPU_ACCESS_WRITE, D3D11_MAP_READ,
    D3D11_MAPPED_SUBRESOURCE, D3D11_SHADER_RESOURCE_VIEW_DESC, D3D11_SHADER_RESOURCE_VIEW_DESC_0,
    D3D11_SUBRESOURCE_DATA, D3D11_TEX2D_ARRAY_SRV, D3D11_TEXTURE2D_DESC, D3D11_USAGE_DEFAULT,
    D3D11_USAGE_STAGING,
};
use windows::Win32::Graphics::Dxgi::Common::DXGI_SAMPLE_DESC;

/// An `ID3D11Device` used to allocate texture arrays.
#[derive(Debug, Clone)]
pub struct D3D11Device(pub ID3D11Device);

/// An `ID3D11DeviceContext` used to fill texture arrays.
#[derive(Debug, Clone)]
pub struct D3D11DeviceContext(pub ID3D11DeviceContext);

impl Deref for D3D11Device {
    type Target = ID3D11Device;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for D3D11DeviceContext {
    type Target = ID3D11DeviceContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A staging texture holding every mip level of one source image.
#[derive(Debug, Clone)]
pub struct StagingTexture {
    handle: ID3D11Texture2D,
    desc: D3D11_TEXTURE2D_DESC,
    format: ImageFormat,
}

const fn single_sample() -> DXGI_SAMPLE_DESC {
    DXGI_SAMPLE_DESC {
        Count: 1,
        Quality: 0,
    }
}

impl TextureDevice for D3D11Device {
    type Staging = StagingTexture;
    type Texture = ID3D11Texture2D;
    type View = ID3D11ShaderResourceView;

    fn create_staging_texture(
        &self,
        source: &TextureData,
    ) -> Result<Self::Staging, TextureArrayError> {
        let desc = D3D11_TEXTURE2D_DESC {
            Width: source.size.width,
            Height: source.size.height,
            MipLevels: source.mip_levels(),
            ArraySize: 1,
            Format: source.format.into(),
            SampleDesc: single_sample(),
            Usage: D3D11_USAGE_STAGING,
            BindFlags: 0,
            CPUAccessFlags: (D3D11_CPU_ACCESS_READ.0 | D3D11_CPU_ACCESS_WRITE.0) as u32,
            MiscFlags: 0,
        };

        let initial_data: Vec<D3D11_SUBRESOURCE_DATA> = source
            .mips
            .iter()
            .map(|mip| D3D11_SUBRESOURCE_DATA {
                pSysMem: mip.bytes.as_ptr().cast(),
                SysMemPitch: mip.row_pitch,
                SysMemSlicePitch: mip.depth_pitch,
            })
            .collect();

        let mut handle = None;
        unsafe {
            self.CreateTexture2D(&desc, Some(initial_data.as_ptr()), Some(&mut handle))
                .map_err(device_error)?;
        }
        assume_d3d11_init!(handle, "CreateTexture2D");

        let mut desc = D3D11_TEXTURE2D_DESC::default();
        unsafe { handle.GetDesc(&mut desc) };

        Ok(StagingTexture {
            handle,
            desc,
            format: source.format,
        })
    }

    fn staging_desc(&self, staging: &Self::Staging) -> TextureDesc {
        TextureDesc {
            size: (&staging.desc).into(),
            mip_levels: staging.desc.MipLevels,
            format: staging.format,
        }
    }

    fn create_texture_array(
        &self,
        desc: &TextureArrayDesc,
    ) -> Result<Self::Texture, TextureArrayError> {
        let desc = D3D11_TEXTURE2D_DESC {
            Width: desc.size.width,
            Height: desc.size.height,
            MipLevels: desc.mip_levels,
            ArraySize: desc.array_size,
            Format: desc.format.into(),
            SampleDesc: single_sample(),
            Usage: D3D11_USAGE_DEFAULT,
            BindFlags: D3D11_BIND_SHADER_RESOURCE.0 as u32,
            CPUAccessFlags: 0,
            MiscFlags: 0,
        };

        let mut handle = None;
        unsafe {
            self.CreateTexture2D(&desc, None, Some(&mut handle))
                .map_err(device_error)?;
        }
        assume_d3d11_init!(handle, "CreateTexture2D");
        Ok(handle)
    }

    fn create_array_view(
        &self,
        texture: &Self::Texture,
        desc: &ArrayViewDesc,
    ) -> Result<Self::View, TextureArrayError> {
        let desc = D3D11_SHADER_RESOURCE_VIEW_DESC {
            Format: desc.format.into(),
            ViewDimension: D3D_SRV_DIMENSION_TEXTURE2DARRAY,
            Anonymous: D3D11_SHADER_RESOURCE_VIEW_DESC_0 {
                Texture2DArray: D3D11_TEX2D_ARRAY_SRV {
                    MostDetailedMip: desc.most_detailed_mip,
                    MipLevels: desc.mip_levels,
                    FirstArraySlice: desc.first_array_slice,
                    ArraySize: desc.array_size,
                },
            },
        };

        let mut view = None;
        unsafe {
            self.CreateShaderResourceView(texture, Some(&desc), Some(&mut view))
                .map_err(device_error)?;
        }
        assume_d3d11_init!(view, "CreateShaderResourceView");
        Ok(view)
    }
}

impl TextureContext<D3D11Device> for D3D11DeviceContext {
    type Mapping = D3D11_MAPPED_SUBRESOURCE;

    fn map_read(
        &self,
        staging: &StagingTexture,
        mip_level: u32,
    ) -> Result<Self::Mapping, TextureArrayError> {
        let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
        unsafe {
            self.Map(&staging.handle, mip_level, D3D11_MAP_READ, 0, Some(&mut mapped))
                .map_err(device_error)?;
        }
        Ok(mapped)
    }

    fn update_subresource(
        &self,
        texture: &ID3D11Texture2D,
        subresource: u32,
        source: &Self::Mapping,
    ) {
        unsafe {
            self.UpdateSubresource(
                texture,
                subresource,
                None,
                source.pData,
                source.RowPitch,
                source.DepthPitch,
            )
        }
    }

    fn unmap(&self, staging: &StagingTexture, mip_level: u32) {
        unsafe { self.Unmap(&staging.handle, mip_level) }
    }
}

/// Load the DDS files at `paths` into a 2D texture array with a shader
/// resource view over all of its mips and slices.
///
/// Every file must have the same size, format and mip count. At most
/// `max_mip_levels` mips are loaded from each file (0 loads all of them).
/// Returns `Ok(None)` if either the device or the context is missing.
pub fn create_dds_texture_2d_array_from_file<P: AsRef<Path>>(
    device: Option<&ID3D11Device>,
    context: Option<&ID3D11DeviceContext>,
    paths: &[P],
    max_mip_levels: u32,
) -> Result<Option<TextureArray<D3D11Device>>, TextureArrayError> {
    let device = device.cloned().map(D3D11Device);
    let context = context.cloned().map(D3D11DeviceContext);

    build_texture_array(device.as_ref(), context.as_ref(), paths, max_mip_levels)
}
