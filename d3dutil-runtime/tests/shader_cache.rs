use d3dutil_runtime::error::ShaderLoadError;
use d3dutil_runtime::shader::{
    CompileFailure, CompileFlags, ShaderBytecode, ShaderCompiler, ShaderLoader,
};
use d3dutil_runtime::trace::{DebugOutput, HResult};
use std::cell::{Cell, RefCell};
use std::path::Path;

struct FakeCompiler {
    calls: Cell<u32>,
    result: Result<Vec<u8>, CompileFailure>,
    last_flags: Cell<Option<CompileFlags>>,
}

impl FakeCompiler {
    fn succeeding(bytecode: &[u8]) -> Self {
        FakeCompiler {
            calls: Cell::new(0),
            result: Ok(bytecode.to_vec()),
            last_flags: Cell::new(None),
        }
    }

    fn failing(diagnostics: Option<&str>) -> Self {
        FakeCompiler {
            calls: Cell::new(0),
            result: Err(CompileFailure {
                code: HResult::E_FAIL,
                diagnostics: diagnostics.map(str::to_owned),
            }),
            last_flags: Cell::new(None),
        }
    }
}

impl ShaderCompiler for FakeCompiler {
    fn compile_from_file(
        &self,
        _source: &Path,
        _entry_point: &str,
        _target: &str,
        flags: CompileFlags,
    ) -> Result<ShaderBytecode, CompileFailure> {
        self.calls.set(self.calls.get() + 1);
        self.last_flags.set(Some(flags));
        self.result.clone().map(ShaderBytecode::from)
    }
}

#[derive(Default)]
struct CapturedOutput(RefCell<Vec<String>>);

impl DebugOutput for CapturedOutput {
    fn output_debug_string(&self, message: &str) {
        self.0.borrow_mut().push(message.to_owned());
    }
}

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn second_load_reads_the_cache() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("Basic_VS.cso");
    let source = dir.path().join("Basic_VS.hlsl");

    let compiler = FakeCompiler::succeeding(&[0x44, 0x58, 0x42, 0x43]);
    let output = CapturedOutput::default();
    let loader = ShaderLoader::new(&compiler, &output);

    let first = loader.load(Some(&cache), &source, "VS", "vs_5_0").unwrap();
    assert_eq!(compiler.calls.get(), 1);
    assert_eq!(std::fs::read(&cache).unwrap(), first.as_bytes());

    let second = loader.load(Some(&cache), &source, "VS", "vs_5_0").unwrap();
    assert_eq!(compiler.calls.get(), 1);
    assert_eq!(first, second);
    assert!(output.0.borrow().is_empty());
}

#[test]
fn existing_cache_is_returned_verbatim() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("Sky_PS.cso");
    std::fs::write(&cache, b"precompiled").unwrap();

    let compiler = FakeCompiler::succeeding(b"fresh");
    let loader = ShaderLoader::new(&compiler, CapturedOutput::default());

    let bytecode = loader
        .load(Some(&cache), Path::new("missing.hlsl"), "PS", "ps_5_0")
        .unwrap();
    assert_eq!(bytecode.as_bytes(), b"precompiled");
    assert_eq!(compiler.calls.get(), 0);
}

#[test]
fn no_cache_path_always_compiles() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let compiler = FakeCompiler::succeeding(b"bytecode");
    let loader = ShaderLoader::new(&compiler, CapturedOutput::default());
    let source = dir.path().join("Tree_GS.hlsl");

    loader.load(None, &source, "GS", "gs_5_0").unwrap();
    loader.load(None, &source, "GS", "gs_5_0").unwrap();
    assert_eq!(compiler.calls.get(), 2);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn compile_failure_emits_diagnostics_and_writes_nothing() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("Broken_PS.cso");
    let diagnostics = "Broken_PS.hlsl(3,5): error X3004: undeclared identifier 'color'";

    let compiler = FakeCompiler::failing(Some(diagnostics));
    let output = CapturedOutput::default();
    let loader = ShaderLoader::new(&compiler, &output);

    let err = loader
        .load(Some(&cache), &dir.path().join("Broken_PS.hlsl"), "PS", "ps_5_0")
        .unwrap_err();

    match err {
        ShaderLoadError::Compile {
            code,
            diagnostics: Some(text),
        } => {
            assert_eq!(code, HResult::E_FAIL);
            assert_eq!(text, diagnostics);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(output.0.borrow().as_slice(), &[diagnostics.to_owned()]);
    assert!(!cache.exists());
}

#[test]
fn compile_failure_without_diagnostics_is_silent() {
    init();
    let compiler = FakeCompiler::failing(None);
    let output = CapturedOutput::default();
    let loader = ShaderLoader::new(&compiler, &output);

    let err = loader
        .load(None, Path::new("missing.hlsl"), "VS", "vs_5_0")
        .unwrap_err();
    assert!(matches!(
        err,
        ShaderLoadError::Compile {
            diagnostics: None,
            ..
        }
    ));
    assert!(output.0.borrow().is_empty());
}

#[test]
fn unwritable_cache_is_an_error() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("no-such-dir").join("Basic_VS.cso");

    let compiler = FakeCompiler::succeeding(b"bytecode");
    let loader = ShaderLoader::new(&compiler, CapturedOutput::default());

    let err = loader
        .load(Some(&cache), Path::new("Basic_VS.hlsl"), "VS", "vs_5_0")
        .unwrap_err();
    assert!(matches!(err, ShaderLoadError::CacheWrite(path, _) if path == cache));
}

#[test]
fn flags_are_passed_to_the_compiler() {
    init();
    let compiler = FakeCompiler::succeeding(b"bytecode");
    let loader = ShaderLoader::new(&compiler, CapturedOutput::default())
        .with_flags(CompileFlags::ENABLE_STRICTNESS | CompileFlags::WARNINGS_ARE_ERRORS);

    loader
        .load(None, Path::new("Basic_VS.hlsl"), "VS", "vs_5_0")
        .unwrap();
    assert_eq!(
        compiler.last_flags.get(),
        Some(CompileFlags::ENABLE_STRICTNESS | CompileFlags::WARNINGS_ARE_ERRORS)
    );
}
