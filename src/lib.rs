//! Purpose: Bridge a C HTML SAX parser's variadic diagnostics to single-string handlers.
//! Exports: `format` (message formatting), `sax` (callback table), `bridge` (registry + shims).
//! Role: Adaptation layer between the parser's callback ABI and an embedder
//! that cannot define C variadic functions.
//! Invariants: A formatted message is forwarded at most once and released exactly once.
//! Invariants: Handler slots are write-once and assigned before parsing starts.

pub mod bridge;
pub mod error;
pub mod format;
pub mod sax;

pub use bridge::{
    MessageHandler, error_sax_handler, register_diagnostic_handlers, register_error_handler,
    register_warning_handler, set_global_error_handler, set_global_warning_handler,
    warning_sax_handler,
};
pub use error::{Error, ErrorKind};
pub use format::{ArgKind, MessageArg, format_message};
pub use sax::{DiagnosticSaxFunc, SaxHandler};
