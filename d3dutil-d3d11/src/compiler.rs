//! HLSL compilation with the FXC compiler.
use crate::trace::Win32TraceHost;
use crate::util::{blob_bytes, blob_text};
use d3dutil_common::{AsHResult, HResult};
use d3dutil_runtime::dx_trace;
use d3dutil_runtime::error::ShaderLoadError;
use d3dutil_runtime::shader::{
    CompileFailure, CompileFlags, ShaderBytecode, ShaderCompiler, ShaderLoader,
};
use std::ffi::CString;
use std::mem::ManuallyDrop;
use std::path::Path;
use windows::core::{HSTRING, PCSTR};
use windows::Win32::Graphics::Direct3D::Fxc::D3DCompileFromFile;
use windows::Win32::Graphics::Direct3D::ID3DInclude;

/// `D3D_COMPILE_STANDARD_FILE_INCLUDE`: resolve `#include` relative to the source file.
fn standard_file_include() -> ManuallyDrop<ID3DInclude> {
    // SAFETY: the compiler treats this sentinel pointer value specially and never
    // dereferences it. ManuallyDrop keeps it from being released.
    ManuallyDrop::new(unsafe { std::mem::transmute::<usize, ID3DInclude>(1) })
}

fn c_string(value: &str) -> Result<CString, CompileFailure> {
    CString::new(value).map_err(|_| CompileFailure {
        code: HResult::E_INVALIDARG,
        diagnostics: Some(format!("{value:?} contains a NUL byte")),
    })
}

/// Compiles HLSL files with `D3DCompileFromFile`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FxcCompiler;

impl ShaderCompiler for FxcCompiler {
    fn compile_from_file(
        &self,
        source: &Path,
        entry_point: &str,
        target: &str,
        flags: CompileFlags,
    ) -> Result<ShaderBytecode, CompileFailure> {
        let entry_point = c_string(entry_point)?;
        let target = c_string(target)?;
        let file_name = HSTRING::from(source.as_os_str());
        let include = standard_file_include();

        let mut blob = None;
        let mut errors = None;
        let result = unsafe {
            D3DCompileFromFile(
                &file_name,
                None,
                &*include,
                PCSTR(entry_point.as_ptr().cast()),
                PCSTR(target.as_ptr().cast()),
                flags.bits(),
                0,
                &mut blob,
                Some(&mut errors),
            )
        };

        let diagnostics = errors.as_ref().map(blob_text);
        match (result, blob) {
            (Ok(()), Some(blob)) => {
                if let Some(warnings) = diagnostics.filter(|d| !d.is_empty()) {
                    log::warn!("{}", warnings.trim_end());
                }
                // SAFETY: the bytes are copied out while the blob is alive.
                Ok(ShaderBytecode::from(unsafe { blob_bytes(&blob) }))
            }
            (Ok(()), None) => Err(CompileFailure {
                code: HResult::E_FAIL,
                diagnostics,
            }),
            (Err(err), _) => Err(CompileFailure {
                code: err.hresult(),
                diagnostics,
            }),
        }
    }
}

/// Load shader bytecode from `cso`, or compile `entry_point` in `hlsl` for
/// `target` and write the result to `cso`.
///
/// Compiler messages are written to the debugger output, and failures to read
/// or write `cso` are traced.
pub fn create_shader_from_file(
    cso: Option<&Path>,
    hlsl: &Path,
    entry_point: &str,
    target: &str,
) -> Result<ShaderBytecode, ShaderLoadError> {
    ShaderLoader::new(FxcCompiler, Win32TraceHost)
        .load(cso, hlsl, entry_point, target)
        .inspect_err(|err| {
            if let ShaderLoadError::CacheRead(..) | ShaderLoadError::CacheWrite(..) = err {
                dx_trace!(&Win32TraceHost, err.hresult(), &err.to_string());
            }
        })
}
