//! Loading shader bytecode from a cache file, or compiling it from source.
use crate::error::ShaderLoadError;
use crate::trace::DebugOutput;
use bitflags::bitflags;
use d3dutil_common::HResult;
use std::fmt;
use std::path::Path;

bitflags! {
    /// Shader compiler flags. Bits match the native `D3DCOMPILE_*` values.
    #[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
    pub struct CompileFlags: u32 {
        /// Emit debug information into the bytecode.
        const DEBUG = 1 << 0;
        const SKIP_VALIDATION = 1 << 1;
        const SKIP_OPTIMIZATION = 1 << 2;
        const PACK_MATRIX_ROW_MAJOR = 1 << 3;
        const PACK_MATRIX_COLUMN_MAJOR = 1 << 4;
        /// Forbid deprecated syntax.
        const ENABLE_STRICTNESS = 1 << 11;
        const WARNINGS_ARE_ERRORS = 1 << 18;
    }
}

impl CompileFlags {
    /// Flags for the current build: strictness is always on, debug builds (or the
    /// `debug-shader` feature) add debug information and skip optimization.
    pub fn for_build() -> CompileFlags {
        let mut flags = CompileFlags::ENABLE_STRICTNESS;
        if cfg!(any(debug_assertions, feature = "debug-shader")) {
            flags |= CompileFlags::DEBUG | CompileFlags::SKIP_OPTIMIZATION;
        }
        flags
    }
}

impl Default for CompileFlags {
    fn default() -> Self {
        CompileFlags::for_build()
    }
}

/// Compiled shader bytecode.
#[derive(Clone, PartialEq, Eq)]
pub struct ShaderBytecode(Box<[u8]>);

impl ShaderBytecode {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0.into_vec()
    }
}

impl fmt::Debug for ShaderBytecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderBytecode")
            .field("len", &self.0.len())
            .finish()
    }
}

impl From<Vec<u8>> for ShaderBytecode {
    fn from(value: Vec<u8>) -> Self {
        ShaderBytecode(value.into_boxed_slice())
    }
}

impl From<&[u8]> for ShaderBytecode {
    fn from(value: &[u8]) -> Self {
        ShaderBytecode(value.into())
    }
}

impl AsRef<[u8]> for ShaderBytecode {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A failed compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileFailure {
    pub code: HResult,
    /// Compiler diagnostics, if the compiler produced any.
    pub diagnostics: Option<String>,
}

/// A source-to-bytecode shader compiler.
pub trait ShaderCompiler {
    fn compile_from_file(
        &self,
        source: &Path,
        entry_point: &str,
        target: &str,
        flags: CompileFlags,
    ) -> Result<ShaderBytecode, CompileFailure>;
}

impl<T: ShaderCompiler + ?Sized> ShaderCompiler for &T {
    fn compile_from_file(
        &self,
        source: &Path,
        entry_point: &str,
        target: &str,
        flags: CompileFlags,
    ) -> Result<ShaderBytecode, CompileFailure> {
        (**self).compile_from_file(source, entry_point, target, flags)
    }
}

/// Loads shader bytecode from a cache file, compiling it from source if the
/// cache file does not exist.
///
/// The cache is never checked against the source; deleting stale cache files
/// is up to the caller.
pub struct ShaderLoader<C, O> {
    compiler: C,
    output: O,
    flags: CompileFlags,
}

impl<C: ShaderCompiler, O: DebugOutput> ShaderLoader<C, O> {
    /// Create a loader with the compile flags of the current build.
    pub fn new(compiler: C, output: O) -> Self {
        ShaderLoader {
            compiler,
            output,
            flags: CompileFlags::for_build(),
        }
    }

    /// Override the compile flags.
    pub fn with_flags(mut self, flags: CompileFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn flags(&self) -> CompileFlags {
        self.flags
    }

    /// Load the cached bytecode at `cache` if it exists, otherwise compile
    /// `entry_point` in `source` for `target` and write the result to `cache`.
    ///
    /// Compiler diagnostics are written to the debug output.
    pub fn load(
        &self,
        cache: Option<&Path>,
        source: &Path,
        entry_point: &str,
        target: &str,
    ) -> Result<ShaderBytecode, ShaderLoadError> {
        if let Some(cache) = cache.filter(|cache| cache.exists()) {
            let bytes = std::fs::read(cache)
                .map_err(|e| ShaderLoadError::CacheRead(cache.to_path_buf(), e))?;
            log::debug!(
                "loaded {} bytes of cached bytecode from {}",
                bytes.len(),
                cache.display()
            );
            return Ok(bytes.into());
        }

        log::debug!(
            "compiling {entry_point} ({target}) from {} with {:?}",
            source.display(),
            self.flags
        );
        let bytecode = match self
            .compiler
            .compile_from_file(source, entry_point, target, self.flags)
        {
            Ok(bytecode) => bytecode,
            Err(CompileFailure { code, diagnostics }) => {
                if let Some(diagnostics) = &diagnostics {
                    self.output.output_debug_string(diagnostics);
                }
                return Err(ShaderLoadError::Compile { code, diagnostics });
            }
        };

        if let Some(cache) = cache {
            std::fs::write(cache, bytecode.as_bytes())
                .map_err(|e| ShaderLoadError::CacheWrite(cache.to_path_buf(), e))?;
            log::debug!("wrote shader bytecode to {}", cache.display());
        }

        Ok(bytecode)
    }
}
