use crate::{AsHResult, HResult, ImageFormat, Size};
use windows::Win32::Graphics::Direct3D11::D3D11_TEXTURE2D_DESC;
use windows::Win32::Graphics::Dxgi::Common as dxgi;

impl From<ImageFormat> for dxgi::DXGI_FORMAT {
    fn from(format: ImageFormat) -> Self {
        dxgi::DXGI_FORMAT(format.dxgi() as i32)
    }
}

impl TryFrom<dxgi::DXGI_FORMAT> for ImageFormat {
    type Error = dxgi::DXGI_FORMAT;

    fn try_from(value: dxgi::DXGI_FORMAT) -> Result<Self, Self::Error> {
        ImageFormat::from_dxgi(value.0 as u32).ok_or(value)
    }
}

impl From<windows::core::HRESULT> for HResult {
    fn from(value: windows::core::HRESULT) -> Self {
        HResult(value.0)
    }
}

impl From<HResult> for windows::core::HRESULT {
    fn from(value: HResult) -> Self {
        windows::core::HRESULT(value.0)
    }
}

impl AsHResult for windows::core::Error {
    fn hresult(&self) -> HResult {
        self.code().into()
    }
}

impl From<&D3D11_TEXTURE2D_DESC> for Size<u32> {
    fn from(desc: &D3D11_TEXTURE2D_DESC) -> Self {
        Size {
            width: desc.Width,
            height: desc.Height,
        }
    }
}
