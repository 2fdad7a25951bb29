//! Error types for the d3dutil runtime.
use crate::texture_array::TextureDesc;
use d3dutil_common::{AsHResult, HResult};
use std::path::PathBuf;
use thiserror::Error;

/// Error type for image decoding.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("unable to read image file {0}")]
    IoError(PathBuf, #[source] std::io::Error),
    #[error("image decode error")]
    DecodeError(#[from] image::ImageError),
    #[error("invalid DDS file: {0}")]
    InvalidDds(&'static str),
    #[error("unsupported pixel format {0}")]
    UnsupportedFormat(String),
    #[error("mip level {0} does not match the size of its extent")]
    InvalidMipLevel(u32),
    #[error("unsupported texture layout: {0}")]
    UnsupportedLayout(&'static str),
}

/// Error type for loading or compiling shader bytecode.
#[derive(Error, Debug)]
pub enum ShaderLoadError {
    #[error("unable to read cached shader bytecode from {0}")]
    CacheRead(PathBuf, #[source] std::io::Error),
    #[error("unable to write shader bytecode to {0}")]
    CacheWrite(PathBuf, #[source] std::io::Error),
    #[error("shader compilation failed ({code})")]
    Compile {
        code: HResult,
        diagnostics: Option<String>,
    },
}

/// Error type for building texture arrays.
#[derive(Error, Debug)]
pub enum TextureArrayError {
    #[error("no source images were given")]
    NoSources,
    #[error("unable to load source image {0}")]
    ImageLoad(PathBuf, #[source] ImageError),
    #[error("source image {index} ({path}) is {actual:?}, expected {expected:?}")]
    MismatchedSource {
        index: usize,
        path: PathBuf,
        expected: TextureDesc,
        actual: TextureDesc,
    },
    #[error("graphics device error ({0})")]
    Device(HResult),
}

impl AsHResult for ImageError {
    fn hresult(&self) -> HResult {
        match self {
            ImageError::IoError(_, err) => err.hresult(),
            ImageError::DecodeError(image::ImageError::IoError(err)) => err.hresult(),
            ImageError::UnsupportedFormat(_) | ImageError::UnsupportedLayout(_) => {
                HResult::E_NOTIMPL
            }
            _ => HResult::E_FAIL,
        }
    }
}

impl AsHResult for ShaderLoadError {
    fn hresult(&self) -> HResult {
        match self {
            ShaderLoadError::CacheRead(_, err) | ShaderLoadError::CacheWrite(_, err) => {
                err.hresult()
            }
            ShaderLoadError::Compile { code, .. } => *code,
        }
    }
}

impl AsHResult for TextureArrayError {
    fn hresult(&self) -> HResult {
        match self {
            TextureArrayError::NoSources | TextureArrayError::MismatchedSource { .. } => {
                HResult::E_INVALIDARG
            }
            TextureArrayError::ImageLoad(_, err) => err.hresult(),
            TextureArrayError::Device(code) => *code,
        }
    }
}
