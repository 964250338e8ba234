//! Purpose: printf-style message formatting over a typed argument list.
//! Exports: `MessageArg`, `format_message`.
//! Role: The formatting half of the bridge; pure, no shared state, no I/O
//! beyond buffer allocation.
//! Invariants: Returned messages are sized exactly to their content.
//! Invariants: Allocation failure is the only error; rendering is total.

use std::ffi::{CStr, CString};
use std::fmt;
use std::marker::PhantomData;
use std::os::raw::{c_char, c_void};

use crate::error::{Error, ErrorKind};

mod render;
mod spec;

/// Fixed growth applied when the required length is not yet known.
const GROWTH_STEP: usize = 100;

#[repr(C)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArgKind {
    Int = 0,
    Uint,
    Double,
    Str,
    Ptr,
}

#[repr(C)]
#[derive(Clone, Copy)]
union ArgValue {
    sint: i64,
    uint: u64,
    real: f64,
    text: *const c_char,
    ptr: *const c_void,
}

/// One marshalled variadic argument: the fixed-arity stand-in for a
/// `va_list` entry. Arguments are ephemeral; they live for the duration of
/// a single formatting call and are interpreted only by the formatting
/// routine, per the conversion specifiers of the template. No agreement
/// between specifier and argument kind is validated: mismatches are
/// numerically converted where a conversion exists and otherwise leave the
/// directive in the output verbatim.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct MessageArg<'a> {
    kind: ArgKind,
    value: ArgValue,
    _borrow: PhantomData<&'a CStr>,
}

impl MessageArg<'_> {
    pub fn int(value: i64) -> MessageArg<'static> {
        MessageArg {
            kind: ArgKind::Int,
            value: ArgValue { sint: value },
            _borrow: PhantomData,
        }
    }

    pub fn uint(value: u64) -> MessageArg<'static> {
        MessageArg {
            kind: ArgKind::Uint,
            value: ArgValue { uint: value },
            _borrow: PhantomData,
        }
    }

    pub fn double(value: f64) -> MessageArg<'static> {
        MessageArg {
            kind: ArgKind::Double,
            value: ArgValue { real: value },
            _borrow: PhantomData,
        }
    }

    /// Borrows `text` for the lifetime of the argument.
    pub fn str(text: &CStr) -> MessageArg<'_> {
        MessageArg {
            kind: ArgKind::Str,
            value: ArgValue {
                text: text.as_ptr(),
            },
            _borrow: PhantomData,
        }
    }

    /// A string argument carrying a null pointer, as a C caller may
    /// produce. Renders as `(null)`.
    pub fn null_str() -> MessageArg<'static> {
        MessageArg {
            kind: ArgKind::Str,
            value: ArgValue {
                text: std::ptr::null(),
            },
            _borrow: PhantomData,
        }
    }

    pub fn ptr(value: *const c_void) -> MessageArg<'static> {
        MessageArg {
            kind: ArgKind::Ptr,
            value: ArgValue { ptr: value },
            _borrow: PhantomData,
        }
    }

    pub fn kind(&self) -> ArgKind {
        self.kind
    }

    pub(crate) fn as_signed(&self) -> Option<i64> {
        match self.kind {
            ArgKind::Int => Some(unsafe { self.value.sint }),
            ArgKind::Uint => Some(unsafe { self.value.uint } as i64),
            ArgKind::Double => Some(unsafe { self.value.real } as i64),
            ArgKind::Str | ArgKind::Ptr => None,
        }
    }

    pub(crate) fn as_unsigned(&self) -> Option<u64> {
        match self.kind {
            ArgKind::Int => Some(unsafe { self.value.sint } as u64),
            ArgKind::Uint => Some(unsafe { self.value.uint }),
            ArgKind::Double => Some(unsafe { self.value.real } as u64),
            ArgKind::Str | ArgKind::Ptr => None,
        }
    }

    pub(crate) fn as_double(&self) -> Option<f64> {
        match self.kind {
            ArgKind::Int => Some(unsafe { self.value.sint } as f64),
            ArgKind::Uint => Some(unsafe { self.value.uint } as f64),
            ArgKind::Double => Some(unsafe { self.value.real }),
            ArgKind::Str | ArgKind::Ptr => None,
        }
    }

    pub(crate) fn as_text(&self) -> Option<*const c_char> {
        match self.kind {
            ArgKind::Str => Some(unsafe { self.value.text }),
            _ => None,
        }
    }

    pub(crate) fn as_pointer(&self) -> Option<*const c_void> {
        match self.kind {
            ArgKind::Ptr => Some(unsafe { self.value.ptr }),
            ArgKind::Str => Some(unsafe { self.value.text } as *const c_void),
            _ => None,
        }
    }
}

impl fmt::Debug for MessageArg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ArgKind::Int => write!(f, "Int({})", unsafe { self.value.sint }),
            ArgKind::Uint => write!(f, "Uint({})", unsafe { self.value.uint }),
            ArgKind::Double => write!(f, "Double({})", unsafe { self.value.real }),
            ArgKind::Str => write!(f, "Str({:p})", unsafe { self.value.text }),
            ArgKind::Ptr => write!(f, "Ptr({:p})", unsafe { self.value.ptr }),
        }
    }
}

/// Source of candidate message buffers. A seam so tests can observe
/// allocation behavior and inject failure.
pub(crate) trait BufferSource {
    fn alloc(&self, size: usize) -> Result<Vec<u8>, Error>;
}

pub(crate) struct HeapSource;

impl BufferSource for HeapSource {
    fn alloc(&self, size: usize) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(size).map_err(|err| {
            Error::new(ErrorKind::Alloc)
                .with_message("message buffer allocation failed")
                .with_source(err)
        })?;
        buf.resize(size, 0);
        Ok(buf)
    }
}

/// Expand `template` with `args` into a single owned, NUL-terminated
/// message sized exactly to its content. The output length is unknown up
/// front, so candidate buffers grow until the rendered text fits: exact fit
/// once the required length is known, a fixed step otherwise. Allocation
/// failure is the only error exit; a template that renders to nothing
/// yields a valid empty string.
pub fn format_message(template: &CStr, args: &[MessageArg<'_>]) -> Result<CString, Error> {
    format_message_with(&HeapSource, template, args)
}

pub(crate) fn format_message_with(
    source: &impl BufferSource,
    template: &CStr,
    args: &[MessageArg<'_>],
) -> Result<CString, Error> {
    let template = template.to_bytes();
    let mut size: usize = 0;
    loop {
        let mut buf = source.alloc(size)?;
        let needed = render::render_into(&mut buf, template, args);
        if needed < size {
            buf.truncate(needed);
            if let Some(end) = buf.iter().position(|&byte| byte == 0) {
                // An argument-supplied NUL ends the message, as in C.
                buf.truncate(end);
            }
            return Ok(CString::new(buf).expect("interior nul stripped"));
        }
        size = if needed > size {
            needed.saturating_add(1)
        } else {
            size.saturating_add(GROWTH_STEP)
        };
    }
}
