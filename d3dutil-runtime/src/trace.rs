//! Error code reporting for debugging.
//!
//! [`trace`] turns an `HResult` and the location it was observed at into a
//! single line on the debug output stream, and can optionally ask the user
//! whether to break into the debugger.
use std::fmt::Write;

pub use d3dutil_common::{AsHResult, HResult};

/// Caption of the debugger prompt.
pub const ERROR_CAPTION: &str = "Error";

/// Messages longer than this many characters are cut off.
pub const MAX_MESSAGE_LEN: usize = 1024;

/// A sink for debug output.
pub trait DebugOutput {
    /// Write a string to the debug output stream as-is.
    fn output_debug_string(&self, message: &str);
}

/// Platform facilities used by the error reporter.
pub trait TraceHost: DebugOutput {
    /// Look up the system description of an error code.
    ///
    /// The returned string may carry the line terminator the system appends.
    fn format_message(&self, code: HResult) -> Option<String>;

    /// Show a blocking Yes/No prompt. Returns `true` if the user chose Yes.
    fn ask_to_debug(&self, caption: &str, text: &str) -> bool;

    /// Trap into an attached debugger.
    fn debug_break(&self);
}

impl<T: DebugOutput + ?Sized> DebugOutput for &T {
    fn output_debug_string(&self, message: &str) {
        (**self).output_debug_string(message)
    }
}

impl<T: TraceHost + ?Sized> TraceHost for &T {
    fn format_message(&self, code: HResult) -> Option<String> {
        (**self).format_message(code)
    }

    fn ask_to_debug(&self, caption: &str, text: &str) -> bool {
        (**self).ask_to_debug(caption, text)
    }

    fn debug_break(&self) {
        (**self).debug_break()
    }
}

/// Where and why an error code was observed.
#[derive(Debug, Clone, Copy)]
pub struct ErrorContext<'a> {
    pub file: Option<&'a str>,
    pub line: u32,
    pub code: HResult,
    pub message: Option<&'a str>,
    /// Ask the user whether to break into the debugger.
    pub show_dialog: bool,
}

/// Report an error code to the debug output stream, returning the code unchanged.
///
/// The emitted line has the form
/// `<file>(<line>): <message> Error description: <description> (0x<code>)`.
/// If `show_dialog` is set, a prompt summarizing the error is shown and a
/// debugger break is triggered when the user answers Yes.
pub fn trace<H: TraceHost + ?Sized>(host: &H, context: &ErrorContext<'_>) -> HResult {
    let line = context.line.to_string();
    let message = context
        .message
        .map(|message| bounded(message, MAX_MESSAGE_LEN))
        .filter(|message| !message.is_empty());
    let description = describe(host, context.code);

    let mut output = String::new();
    if let Some(file) = context.file {
        let _ = write!(output, "{file}({line}): ");
    }
    if let Some(message) = message {
        output.push_str(message);
        output.push(' ');
    }
    let _ = writeln!(output, "Error description: {description}");
    host.output_debug_string(&output);

    if context.show_dialog {
        let mut text = String::new();
        let _ = writeln!(text, "File: {}", context.file.unwrap_or(""));
        let _ = writeln!(text, "Line: {line}");
        let _ = writeln!(text, "Error description: {description}");
        if let Some(message) = message {
            let _ = writeln!(text, "Current call: {message}");
        }
        text.push_str("Do you want to debug the application?");

        if host.ask_to_debug(ERROR_CAPTION, &text) {
            host.debug_break();
        }
    }

    context.code
}

/// Describe an error code as `<system description> (0x<code>)`.
///
/// Anything from the last carriage return onwards is dropped from the system
/// description, as are trailing newlines.
pub fn describe<H: TraceHost + ?Sized>(host: &H, code: HResult) -> String {
    let mut description = host
        .format_message(code)
        .unwrap_or_else(|| String::from("Unknown error"));

    if let Some(cr) = description.rfind('\r') {
        description.truncate(cr);
    }
    let trimmed = description.trim_end_matches(&['\r', '\n'][..]).len();
    description.truncate(trimmed);

    let _ = write!(description, " (0x{code:08x})");
    description
}

fn bounded(message: &str, max_chars: usize) -> &str {
    match message.char_indices().nth(max_chars) {
        Some((end, _)) => &message[..end],
        None => message,
    }
}

/// A portable [`TraceHost`] that writes to the `log` facade.
///
/// Error codes are described from the built-in `HResult` table. No dialog can
/// be shown, so the debugger prompt is always answered with No.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTraceHost;

impl DebugOutput for LogTraceHost {
    fn output_debug_string(&self, message: &str) {
        log::error!("{}", message.trim_end());
    }
}

impl TraceHost for LogTraceHost {
    fn format_message(&self, code: HResult) -> Option<String> {
        code.description().map(str::to_owned)
    }

    fn ask_to_debug(&self, caption: &str, _text: &str) -> bool {
        log::warn!("debugger prompt \"{caption}\" requested, but no dialog is available");
        false
    }

    fn debug_break(&self) {}
}

/// Report an error code at the call site.
///
/// The prompt to break into the debugger is only shown in debug builds.
#[macro_export]
macro_rules! dx_trace {
    ($host:expr, $code:expr) => {
        $crate::dx_trace!($host, $code, "")
    };
    ($host:expr, $code:expr, $message:expr) => {
        $crate::trace::trace(
            $host,
            &$crate::trace::ErrorContext {
                file: Some(file!()),
                line: line!(),
                code: $code,
                message: Some($message),
                show_dialog: cfg!(debug_assertions),
            },
        )
    };
}

/// Evaluate a `Result`, reporting the error code of a failure with the
/// expression text as the message. The result is passed through unchanged.
#[macro_export]
macro_rules! hr {
    ($host:expr, $call:expr) => {
        match $call {
            Ok(value) => Ok(value),
            Err(err) => {
                $crate::dx_trace!(
                    $host,
                    $crate::trace::AsHResult::hresult(&err),
                    stringify!($call)
                );
                Err(err)
            }
        }
    };
}
