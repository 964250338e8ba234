//! Purpose: Process-wide diagnostic handler slots and the C-ABI dispatch shims.
//! Exports: `MessageHandler`, `set_global_*_handler`, `register_*_handler`,
//! `error_sax_handler`, `warning_sax_handler`.
//! Role: The calling-convention half of the bridge; composes slot lookup
//! with the formatter and forwards the result.
//! Invariants: Slots are write-once; a second assignment is rejected.
//! Invariants: A formatted message is forwarded at most once and released
//! exactly once; on any failure the event is dropped, never forwarded
//! partially.

use std::ffi::CStr;
use std::os::raw::{c_char, c_void};
use std::slice;
use std::sync::OnceLock;

use tracing::debug;

use crate::error::{Error, ErrorKind};
use crate::format::{BufferSource, HeapSource, MessageArg, format_message_with};
use crate::sax::{DiagnosticSaxFunc, SaxHandler};

/// The embedder's forwarding handler: one fully formatted message per call,
/// with the parser's context pointer passed through uninterpreted.
pub type MessageHandler = unsafe extern "C" fn(ctx: *mut c_void, msg: *const c_char);

static ERROR_HANDLER: OnceLock<MessageHandler> = OnceLock::new();
static WARNING_HANDLER: OnceLock<MessageHandler> = OnceLock::new();

/// Assign the process-wide error forwarding handler. Must happen before any
/// parse begins; the slot accepts exactly one assignment for the life of
/// the process and is never cleared.
pub fn set_global_error_handler(handler: MessageHandler) -> Result<(), Error> {
    ERROR_HANDLER
        .set(handler)
        .map_err(|_| already_assigned("error"))
}

/// Assign the process-wide warning forwarding handler. Same contract as the
/// error slot.
pub fn set_global_warning_handler(handler: MessageHandler) -> Result<(), Error> {
    WARNING_HANDLER
        .set(handler)
        .map_err(|_| already_assigned("warning"))
}

fn already_assigned(slot: &str) -> Error {
    Error::new(ErrorKind::Usage).with_message(format!("{slot} handler slot is already assigned"))
}

/// Install the error dispatch shim into the table's `error` field.
pub fn register_error_handler(sax: &mut SaxHandler) {
    let shim: DiagnosticSaxFunc = error_sax_handler;
    sax.error = Some(shim);
}

/// Install the warning dispatch shim into the table's `warning` field.
pub fn register_warning_handler(sax: &mut SaxHandler) {
    let shim: DiagnosticSaxFunc = warning_sax_handler;
    sax.warning = Some(shim);
}

/// Install both dispatch shims. Embedders that bridge diagnostics at all
/// invariably want the pair.
pub fn register_diagnostic_handlers(sax: &mut SaxHandler) {
    register_error_handler(sax);
    register_warning_handler(sax);
}

/// Error entry point handed to the parser.
///
/// # Safety
/// `msg`, when non-null, must point to a NUL-terminated template and
/// `args`/`len` must describe a valid argument array, both valid for the
/// duration of the call.
pub unsafe extern "C" fn error_sax_handler(
    ctx: *mut c_void,
    msg: *const c_char,
    args: *const MessageArg<'_>,
    len: usize,
) {
    unsafe { dispatch(&ERROR_HANDLER, "error", ctx, msg, args, len) }
}

/// Warning entry point handed to the parser. Same contract as
/// [`error_sax_handler`], using the warning slot.
pub unsafe extern "C" fn warning_sax_handler(
    ctx: *mut c_void,
    msg: *const c_char,
    args: *const MessageArg<'_>,
    len: usize,
) {
    unsafe { dispatch(&WARNING_HANDLER, "warning", ctx, msg, args, len) }
}

unsafe fn dispatch(
    slot: &OnceLock<MessageHandler>,
    kind: &str,
    ctx: *mut c_void,
    msg: *const c_char,
    args: *const MessageArg<'_>,
    len: usize,
) {
    unsafe { dispatch_with(&HeapSource, slot, kind, ctx, msg, args, len) }
}

unsafe fn dispatch_with(
    source: &impl BufferSource,
    slot: &OnceLock<MessageHandler>,
    kind: &str,
    ctx: *mut c_void,
    msg: *const c_char,
    args: *const MessageArg<'_>,
    len: usize,
) {
    // No destination means no work: the event is not even formatted.
    let Some(&handler) = slot.get() else {
        return;
    };
    if msg.is_null() {
        return;
    }
    let template = unsafe { CStr::from_ptr(msg) };
    let args = if args.is_null() || len == 0 {
        &[]
    } else {
        unsafe { slice::from_raw_parts(args, len) }
    };
    match format_message_with(source, template, args) {
        Ok(message) => {
            unsafe { handler(ctx, message.as_ptr()) };
            // `message` drops here: released exactly once, after forwarding.
        }
        Err(err) => {
            debug!(kind, error = %err, "dropping parser diagnostic; formatting failed");
        }
    }
}
