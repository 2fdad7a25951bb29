use d3dutil_common::AsHResult;
use d3dutil_runtime::error::TextureArrayError;
use std::slice;
use windows::Win32::Graphics::Direct3D::ID3DBlob;

/// Unwrap an out-parameter of a D3D call that reported success,
/// returning a device error if the object was not written.
macro_rules! assume_d3d11_init {
    ($value:ident, $call:literal) => {
        let Some($value) = $value else {
            log::error!(concat!($call, " succeeded without returning an object"));
            return Err($crate::util::device_error(d3dutil_common::HResult::E_FAIL));
        };
    };
}

pub(crate) use assume_d3d11_init;

pub(crate) fn device_error(code: impl AsHResult) -> TextureArrayError {
    TextureArrayError::Device(code.hresult())
}

/// The contents of a blob.
///
/// # Safety
/// The slice is only valid for as long as the blob is alive.
pub(crate) unsafe fn blob_bytes(blob: &ID3DBlob) -> &[u8] {
    slice::from_raw_parts(blob.GetBufferPointer().cast::<u8>(), blob.GetBufferSize())
}

/// Compiler messages stored in a blob, without the trailing NUL.
pub(crate) fn blob_text(blob: &ID3DBlob) -> String {
    // SAFETY: the slice does not outlive the borrow of the blob.
    let bytes = unsafe { blob_bytes(blob) };
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .to_owned()
}
