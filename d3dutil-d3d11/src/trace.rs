//! Error code tracing through the Windows debugger facilities.
use d3dutil_runtime::trace::{
    self, DebugOutput, ErrorContext, HResult, TraceHost, MAX_MESSAGE_LEN,
};
use windows::core::{HSTRING, PWSTR};
use windows::Win32::System::Diagnostics::Debug::{
    DebugBreak, FormatMessageW, OutputDebugStringW, FORMAT_MESSAGE_FROM_SYSTEM,
    FORMAT_MESSAGE_IGNORE_INSERTS,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetForegroundWindow, MessageBoxW, IDYES, MB_ICONERROR, MB_YESNO,
};

/// `MAKELANGID(LANG_NEUTRAL, SUBLANG_DEFAULT)`
const LANG_USER_DEFAULT: u32 = 0x0400;

/// A [`TraceHost`] that writes to the debugger output, describes codes with
/// `FormatMessageW` and prompts with a message box.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32TraceHost;

impl DebugOutput for Win32TraceHost {
    fn output_debug_string(&self, message: &str) {
        unsafe { OutputDebugStringW(&HSTRING::from(message)) }
    }
}

impl TraceHost for Win32TraceHost {
    fn format_message(&self, code: HResult) -> Option<String> {
        let mut buffer = vec![0u16; MAX_MESSAGE_LEN];
        let len = unsafe {
            FormatMessageW(
                FORMAT_MESSAGE_FROM_SYSTEM | FORMAT_MESSAGE_IGNORE_INSERTS,
                None,
                code.0 as u32,
                LANG_USER_DEFAULT,
                PWSTR(buffer.as_mut_ptr()),
                buffer.len() as u32,
                None,
            )
        };

        if len == 0 {
            return None;
        }
        Some(String::from_utf16_lossy(&buffer[..len as usize]))
    }

    fn ask_to_debug(&self, caption: &str, text: &str) -> bool {
        unsafe {
            MessageBoxW(
                GetForegroundWindow(),
                &HSTRING::from(text),
                &HSTRING::from(caption),
                MB_YESNO | MB_ICONERROR,
            ) == IDYES
        }
    }

    fn debug_break(&self) {
        unsafe { DebugBreak() }
    }
}

/// Report `code` to the debugger output, optionally asking whether to break.
///
/// Returns `code` unchanged.
pub fn dx_trace(
    file: Option<&str>,
    line: u32,
    code: HResult,
    message: Option<&str>,
    show_dialog: bool,
) -> HResult {
    trace::trace(
        &Win32TraceHost,
        &ErrorContext {
            file,
            line,
            code,
            message,
            show_dialog,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_describes_known_codes() {
        let description = Win32TraceHost.format_message(HResult::E_INVALIDARG);
        assert!(description.is_some_and(|d| !d.is_empty()));
    }

    #[test]
    fn trace_returns_the_code() {
        let code = dx_trace(
            Some(file!()),
            line!(),
            HResult::E_OUTOFMEMORY,
            Some("CreateBuffer"),
            false,
        );
        assert_eq!(code, HResult::E_OUTOFMEMORY);
    }
}
