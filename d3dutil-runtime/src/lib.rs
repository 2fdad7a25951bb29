//! Backend-independent core of the d3dutil helpers.
//!
//! This crate holds the logic shared by every graphics backend: error code
//! tracing, shader bytecode caching, image decoding and the texture array
//! builder. Backends plug in through the traits in [`trace`], [`shader`] and
//! [`texture_array`].

/// Error types.
pub mod error;

/// Error code tracing.
pub mod trace;

/// Shader bytecode loading and caching.
pub mod shader;

/// Image decoding and mip chain helpers.
pub mod image;

/// DDS container parsing.
pub mod dds;

/// Texture array construction.
pub mod texture_array;

/// A system-memory texture backend.
pub mod headless;
