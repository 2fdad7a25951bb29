//! Direct3D 11 backend for the d3dutil helpers.
//!
//! Provides the Windows implementations of the traits in `d3dutil-runtime`:
//! debugger output and prompts for error tracing, FXC for shader compilation,
//! and `ID3D11Device` resources for texture arrays.
#![cfg(target_os = "windows")]

mod util;

/// Error code tracing to the debugger.
pub mod trace;

/// Shader compilation with FXC.
pub mod compiler;

/// Texture arrays from DDS files.
pub mod texture_array;

pub use compiler::{create_shader_from_file, FxcCompiler};
pub use texture_array::{create_dds_texture_2d_array_from_file, D3D11Device, D3D11DeviceContext};
pub use trace::{dx_trace, Win32TraceHost};
