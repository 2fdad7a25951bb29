#![forbid(missing_docs)]
//! Direct3D 11 helpers for error tracing, shader caching and texture arrays.
//!
//! d3dutil bundles three small utilities that most Direct3D 11 samples end up
//! rewriting:
//!
//! * [`trace`]: report a failing `HRESULT` with its source location and system
//!   description to the debugger, optionally asking whether to break.
//! * [`shader`]: load compiled shader bytecode from a cache file, or compile it
//!   from HLSL source and write the cache.
//! * [`texture_array`]: load a set of equally sized DDS images with their mip
//!   chains into a single `Texture2DArray` with a shader resource view.
//!
//! The logic of each utility is independent of Direct3D and runs against the
//! traits in each module. The `d3d11` feature provides the Windows
//! implementations, and the `headless` feature a system-memory texture backend.
//!
//! ## Usage
//! ```no_run
//! # #[cfg(all(windows, feature = "d3d11"))]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use d3dutil::d3d11::{create_shader_from_file, create_dds_texture_2d_array_from_file};
//!
//! let vs = create_shader_from_file(
//!     Some(Path::new("HLSL/Basic_VS.cso")),
//!     Path::new("HLSL/Basic_VS.hlsl"),
//!     "VS",
//!     "vs_5_0",
//! )?;
//! # let (device, context) = (None, None);
//! let trees = create_dds_texture_2d_array_from_file(
//!     device,
//!     context,
//!     &["Texture/tree0.dds", "Texture/tree1.dds"],
//!     0,
//! )?;
//! # Ok(())
//! # }
//! # #[cfg(not(all(windows, feature = "d3d11")))]
//! # fn main() {}
//! ```
//!
//! ## Features
//! | **Feature**    | **Default** | **Provides**                                        |
//! |----------------|-------------|-----------------------------------------------------|
//! | `d3d11`        | ✔           | Direct3D 11, FXC and debugger backends (Windows)    |
//! | `headless`     | ✔           | A system-memory texture backend                     |
//! | `debug-shader` |             | Debug information in shaders compiled in release    |

/// Error types.
pub mod error {
    pub use d3dutil_runtime::error::*;
}

/// Error code tracing.
///
/// [`trace::trace`] writes a single line to the debug output and can prompt
/// to break into the debugger. The [`dx_trace!`](crate::dx_trace) and
/// [`hr!`](crate::hr) macros fill in the source location.
pub mod trace {
    pub use d3dutil_runtime::trace::*;
}

/// Shader bytecode loading and caching.
pub mod shader {
    pub use d3dutil_runtime::shader::*;
}

/// Image decoding and DDS handling.
pub mod image {
    pub use d3dutil_runtime::dds::{decode as decode_dds, encode as encode_dds};
    pub use d3dutil_runtime::image::*;
}

/// Texture array construction.
pub mod texture_array {
    pub use d3dutil_runtime::texture_array::*;

    #[cfg(feature = "headless")]
    /// A system-memory texture backend, for use without a GPU.
    pub mod headless {
        pub use d3dutil_runtime::headless::*;
    }
}

#[cfg(all(target_os = "windows", feature = "d3d11"))]
/// Direct3D 11 implementations of the helpers.
pub mod d3d11 {
    pub use d3dutil_d3d11::*;
}

pub use d3dutil_common::{AsHResult, HResult, ImageFormat, Size};
pub use d3dutil_runtime::{dx_trace, hr};
