//! Purpose: Render a template and argument list into a bounded buffer.
//! Exports: `render_into` plus the per-conversion renderers.
//! Role: The underlying formatted-output primitive, with `vsnprintf`
//! semantics: bounded writes, unconditional terminator, full required
//! length as the return value.
//! Invariants: Rendering is total; directives that cannot be honored
//! (unknown conversion, exhausted or untextual arguments) are emitted
//! verbatim, never dropped and never unsafe.

use std::ffi::CStr;

use crate::format::MessageArg;
use crate::format::spec::{FormatFlags, FormatSpec, LengthMod, Precision, Width, parse_format_spec};

/// Bounded output sink. Stores at most `buf.len() - 1` content bytes while
/// counting everything, so the caller learns the full required length.
pub(crate) struct BoundedWriter<'a> {
    buf: &'a mut [u8],
    needed: usize,
}

impl<'a> BoundedWriter<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, needed: 0 }
    }

    fn capacity(&self) -> usize {
        self.buf.len().saturating_sub(1)
    }

    fn push(&mut self, byte: u8) {
        if self.needed < self.capacity() {
            self.buf[self.needed] = byte;
        }
        self.needed = self.needed.saturating_add(1);
    }

    fn push_slice(&mut self, bytes: &[u8]) {
        let cap = self.capacity();
        if self.needed < cap {
            let stored = bytes.len().min(cap - self.needed);
            self.buf[self.needed..self.needed + stored].copy_from_slice(&bytes[..stored]);
        }
        self.needed = self.needed.saturating_add(bytes.len());
    }

    fn push_repeat(&mut self, byte: u8, count: usize) {
        let cap = self.capacity();
        if self.needed < cap {
            let stored = count.min(cap - self.needed);
            self.buf[self.needed..self.needed + stored].fill(byte);
        }
        self.needed = self.needed.saturating_add(count);
    }

    /// Terminate and report the required length (terminator excluded).
    pub(crate) fn finish(self) -> usize {
        if !self.buf.is_empty() {
            let end = self.needed.min(self.buf.len() - 1);
            self.buf[end] = 0;
        }
        self.needed
    }
}

struct ArgCursor<'s, 'a> {
    args: &'s [MessageArg<'a>],
    index: usize,
}

impl<'s, 'a> ArgCursor<'s, 'a> {
    fn new(args: &'s [MessageArg<'a>]) -> Self {
        Self { args, index: 0 }
    }

    fn next(&mut self) -> Option<&'s MessageArg<'a>> {
        let arg = self.args.get(self.index)?;
        self.index += 1;
        Some(arg)
    }

    fn next_int(&mut self) -> Option<i32> {
        self.next()?.as_signed().map(|value| value as i32)
    }
}

/// Render `template` with `args` into `buf` and return the length the full
/// output requires, whether or not it fit.
pub(crate) fn render_into(buf: &mut [u8], template: &[u8], args: &[MessageArg<'_>]) -> usize {
    let mut out = BoundedWriter::new(buf);
    let mut cursor = ArgCursor::new(args);
    let mut i = 0;
    while i < template.len() {
        let byte = template[i];
        if byte != b'%' {
            out.push(byte);
            i += 1;
            continue;
        }
        match parse_format_spec(template, i) {
            Some((spec, next)) => {
                if !render_spec(&mut out, &spec, &mut cursor) {
                    out.push_slice(&template[i..next]);
                }
                i = next;
            }
            None => {
                out.push(b'%');
                i += 1;
            }
        }
    }
    out.finish()
}

fn render_spec(out: &mut BoundedWriter<'_>, spec: &FormatSpec, cursor: &mut ArgCursor<'_, '_>) -> bool {
    let mut flags = spec.flags;
    let width = match spec.width {
        None => None,
        Some(Width::Fixed(n)) => Some(n),
        Some(Width::FromArg) => match cursor.next_int() {
            Some(value) if value < 0 => {
                // A negative width argument means left alignment.
                flags.left_align = true;
                Some(value.unsigned_abs() as usize)
            }
            Some(value) => Some(value as usize),
            None => return false,
        },
    };
    let precision = match spec.precision {
        None => None,
        Some(Precision::Fixed(n)) => Some(n),
        Some(Precision::FromArg) => match cursor.next_int() {
            // A negative precision argument behaves as if omitted.
            Some(value) if value < 0 => None,
            Some(value) => Some(value as usize),
            None => return false,
        },
    };

    match spec.conversion {
        b'%' => {
            out.push(b'%');
            true
        }
        b'd' | b'i' => match cursor.next().and_then(MessageArg::as_signed) {
            Some(value) => {
                format_signed(out, truncate_signed(value, spec.length), flags, width, precision);
                true
            }
            None => false,
        },
        b'u' | b'o' | b'x' | b'X' => match cursor.next().and_then(MessageArg::as_unsigned) {
            Some(value) => {
                let value = truncate_unsigned(value, spec.length);
                let (base, upper) = match spec.conversion {
                    b'o' => (8, false),
                    b'x' => (16, false),
                    b'X' => (16, true),
                    _ => (10, false),
                };
                format_unsigned(out, value, base, upper, flags, width, precision);
                true
            }
            None => false,
        },
        b'c' if spec.length == LengthMod::None => {
            match cursor.next().and_then(MessageArg::as_signed) {
                Some(value) => {
                    format_char(out, value as u8, flags, width);
                    true
                }
                None => false,
            }
        }
        b's' if spec.length == LengthMod::None => {
            match cursor.next().and_then(MessageArg::as_text) {
                Some(ptr) if ptr.is_null() => {
                    format_str(out, b"(null)", flags, width, precision);
                    true
                }
                Some(ptr) => {
                    // Valid for the duration of the call per the MessageArg
                    // construction contract.
                    let text = unsafe { CStr::from_ptr(ptr) };
                    format_str(out, text.to_bytes(), flags, width, precision);
                    true
                }
                None => false,
            }
        }
        b'p' => match cursor.next().and_then(MessageArg::as_pointer) {
            Some(ptr) => {
                format_pointer(out, ptr as usize, flags, width, precision);
                true
            }
            None => false,
        },
        b'f' | b'F' | b'e' | b'E' | b'g' | b'G' => {
            match cursor.next().and_then(MessageArg::as_double) {
                Some(value) => {
                    format_float(out, value, spec.conversion, flags, width, precision);
                    true
                }
                None => false,
            }
        }
        _ => false,
    }
}

fn truncate_signed(value: i64, length: LengthMod) -> i64 {
    match length {
        LengthMod::Char => value as i8 as i64,
        LengthMod::Short => value as i16 as i64,
        // A plain conversion takes a C int.
        LengthMod::None => value as i32 as i64,
        _ => value,
    }
}

fn truncate_unsigned(value: u64, length: LengthMod) -> u64 {
    match length {
        LengthMod::Char => value as u8 as u64,
        LengthMod::Short => value as u16 as u64,
        LengthMod::None => value as u32 as u64,
        _ => value,
    }
}

fn to_base(mut value: u64, base: u64, upper: bool) -> ([u8; 64], usize) {
    let table: &[u8; 16] = if upper {
        b"0123456789ABCDEF"
    } else {
        b"0123456789abcdef"
    };
    let mut buf = [0u8; 64];
    let mut pos = buf.len();
    if value == 0 {
        pos -= 1;
        buf[pos] = b'0';
    }
    while value > 0 {
        pos -= 1;
        buf[pos] = table[(value % base) as usize];
        value /= base;
    }
    (buf, pos)
}

/// Shared integer layout: optional sign, base prefix, zero extension up to
/// the precision, then the digits, padded to the field width.
fn emit_padded_number(
    out: &mut BoundedWriter<'_>,
    sign: &[u8],
    prefix: &[u8],
    digits: &[u8],
    flags: FormatFlags,
    width: Option<usize>,
    precision: Option<usize>,
) {
    let min_digits = precision.unwrap_or(1);
    let zeros = min_digits.saturating_sub(digits.len());
    let content = sign.len() + prefix.len() + zeros + digits.len();
    let pad = width.unwrap_or(0).saturating_sub(content);
    if flags.left_align {
        out.push_slice(sign);
        out.push_slice(prefix);
        out.push_repeat(b'0', zeros);
        out.push_slice(digits);
        out.push_repeat(b' ', pad);
    } else if flags.zero_pad && precision.is_none() {
        out.push_slice(sign);
        out.push_slice(prefix);
        out.push_repeat(b'0', pad + zeros);
        out.push_slice(digits);
    } else {
        out.push_repeat(b' ', pad);
        out.push_slice(sign);
        out.push_slice(prefix);
        out.push_repeat(b'0', zeros);
        out.push_slice(digits);
    }
}

pub(crate) fn format_signed(
    out: &mut BoundedWriter<'_>,
    value: i64,
    flags: FormatFlags,
    width: Option<usize>,
    precision: Option<usize>,
) {
    let (buf, pos) = to_base(value.unsigned_abs(), 10, false);
    let digits: &[u8] = if value == 0 && precision == Some(0) {
        b""
    } else {
        &buf[pos..]
    };
    let sign: &[u8] = if value < 0 {
        b"-"
    } else if flags.plus_sign {
        b"+"
    } else if flags.space_sign {
        b" "
    } else {
        b""
    };
    emit_padded_number(out, sign, b"", digits, flags, width, precision);
}

pub(crate) fn format_unsigned(
    out: &mut BoundedWriter<'_>,
    value: u64,
    base: u64,
    upper: bool,
    flags: FormatFlags,
    width: Option<usize>,
    mut precision: Option<usize>,
) {
    let (buf, pos) = to_base(value, base, upper);
    let digits: &[u8] = if value == 0 && precision == Some(0) {
        b""
    } else {
        &buf[pos..]
    };
    let prefix: &[u8] = if flags.alternate && base == 16 && value != 0 {
        if upper { b"0X" } else { b"0x" }
    } else {
        b""
    };
    if flags.alternate && base == 8 && digits.first() != Some(&b'0') {
        // "%#o" guarantees a leading zero digit.
        precision = Some(precision.unwrap_or(1).max(digits.len() + 1));
    }
    emit_padded_number(out, b"", prefix, digits, flags, width, precision);
}

pub(crate) fn format_char(
    out: &mut BoundedWriter<'_>,
    value: u8,
    flags: FormatFlags,
    width: Option<usize>,
) {
    let pad = width.unwrap_or(0).saturating_sub(1);
    if flags.left_align {
        out.push(value);
        out.push_repeat(b' ', pad);
    } else {
        out.push_repeat(b' ', pad);
        out.push(value);
    }
}

pub(crate) fn format_str(
    out: &mut BoundedWriter<'_>,
    bytes: &[u8],
    flags: FormatFlags,
    width: Option<usize>,
    precision: Option<usize>,
) {
    let limit = precision.unwrap_or(bytes.len()).min(bytes.len());
    let content = &bytes[..limit];
    let pad = width.unwrap_or(0).saturating_sub(content.len());
    if flags.left_align {
        out.push_slice(content);
        out.push_repeat(b' ', pad);
    } else {
        out.push_repeat(b' ', pad);
        out.push_slice(content);
    }
}

pub(crate) fn format_pointer(
    out: &mut BoundedWriter<'_>,
    addr: usize,
    flags: FormatFlags,
    width: Option<usize>,
    precision: Option<usize>,
) {
    if addr == 0 {
        format_str(out, b"(nil)", flags, width, None);
        return;
    }
    let (buf, pos) = to_base(addr as u64, 16, false);
    emit_padded_number(out, b"", b"0x", &buf[pos..], flags, width, precision);
}

pub(crate) fn format_float(
    out: &mut BoundedWriter<'_>,
    value: f64,
    conversion: u8,
    flags: FormatFlags,
    width: Option<usize>,
    precision: Option<usize>,
) {
    let upper = conversion.is_ascii_uppercase();
    let sign: &[u8] = if value.is_sign_negative() {
        b"-"
    } else if flags.plus_sign {
        b"+"
    } else if flags.space_sign {
        b" "
    } else {
        b""
    };

    if !value.is_finite() {
        let body: &[u8] = match (value.is_nan(), upper) {
            (true, false) => b"nan",
            (true, true) => b"NAN",
            (false, false) => b"inf",
            (false, true) => b"INF",
        };
        // Zero padding does not apply to non-finite values.
        let pad = width.unwrap_or(0).saturating_sub(sign.len() + body.len());
        if flags.left_align {
            out.push_slice(sign);
            out.push_slice(body);
            out.push_repeat(b' ', pad);
        } else {
            out.push_repeat(b' ', pad);
            out.push_slice(sign);
            out.push_slice(body);
        }
        return;
    }

    let magnitude = value.abs();
    let precision = precision.unwrap_or(6);
    let mut body = match conversion.to_ascii_lowercase() {
        b'e' => render_scientific(magnitude, precision, flags.alternate),
        b'g' => render_general(magnitude, precision, flags.alternate),
        _ => render_fixed(magnitude, precision, flags.alternate),
    };
    if upper {
        body.make_ascii_uppercase();
    }

    let pad = width.unwrap_or(0).saturating_sub(sign.len() + body.len());
    if flags.left_align {
        out.push_slice(sign);
        out.push_slice(body.as_bytes());
        out.push_repeat(b' ', pad);
    } else if flags.zero_pad {
        out.push_slice(sign);
        out.push_repeat(b'0', pad);
        out.push_slice(body.as_bytes());
    } else {
        out.push_repeat(b' ', pad);
        out.push_slice(sign);
        out.push_slice(body.as_bytes());
    }
}

fn render_fixed(magnitude: f64, precision: usize, alternate: bool) -> String {
    let mut body = format!("{magnitude:.precision$}");
    if precision == 0 && alternate {
        body.push('.');
    }
    body
}

fn render_scientific(magnitude: f64, precision: usize, alternate: bool) -> String {
    let formatted = format!("{magnitude:.precision$e}");
    let (mantissa, exponent) = split_exponent(&formatted);
    let mut body = String::with_capacity(mantissa.len() + 5);
    body.push_str(mantissa);
    if precision == 0 && alternate {
        body.push('.');
    }
    push_exponent(&mut body, exponent);
    body
}

fn render_general(magnitude: f64, precision: usize, alternate: bool) -> String {
    let significant = precision.max(1).min(i32::MAX as usize);
    let probe = format!("{:.*e}", significant - 1, magnitude);
    let (mantissa, exponent) = split_exponent(&probe);
    if exponent < -4 || exponent >= significant as i32 {
        let mut body = mantissa.to_string();
        if !alternate {
            strip_trailing_zeros(&mut body);
        }
        push_exponent(&mut body, exponent);
        body
    } else {
        let fractional = (significant as i64 - 1 - i64::from(exponent)).max(0) as usize;
        let mut body = format!("{magnitude:.fractional$}");
        if !alternate {
            strip_trailing_zeros(&mut body);
        }
        body
    }
}

fn split_exponent(formatted: &str) -> (&str, i32) {
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse().unwrap_or(0)),
        None => (formatted, 0),
    }
}

/// Exponent field: sign plus at least two digits.
fn push_exponent(body: &mut String, exponent: i32) {
    body.push('e');
    body.push(if exponent < 0 { '-' } else { '+' });
    let magnitude = exponent.unsigned_abs();
    if magnitude < 10 {
        body.push('0');
    }
    body.push_str(&magnitude.to_string());
}

fn strip_trailing_zeros(body: &mut String) {
    if !body.contains('.') {
        return;
    }
    while body.ends_with('0') {
        body.pop();
    }
    if body.ends_with('.') {
        body.pop();
    }
}


#[cfg(all(test, unix))]
mod conformance {
    use std::ffi::{CStr, CString};
    use std::os::raw::{c_char, c_double, c_int, c_longlong, c_uint, c_void};

    use crate::format::{MessageArg, format_message};

    fn ours(template: &CStr, args: &[MessageArg<'_>]) -> String {
        format_message(template, args)
            .expect("format")
            .into_string()
            .expect("utf8")
    }

    fn capture(fill: impl FnOnce(*mut c_char, usize) -> c_int) -> String {
        let mut buf = vec![0u8; 512];
        let written = fill(buf.as_mut_ptr() as *mut c_char, buf.len());
        assert!(written >= 0 && (written as usize) < buf.len());
        buf.truncate(written as usize);
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn signed_decimal_matches_snprintf() {
        let cases: &[(&CStr, c_int)] = &[
            (c"%d", 0),
            (c"%d", -5),
            (c"%i", 12345),
            (c"%5d", 42),
            (c"%-5d", 42),
            (c"%05d", -42),
            (c"%+d", 7),
            (c"% d", 7),
            (c"%.3d", 7),
            (c"%.0d", 0),
            (c"%08.3d", -42),
            (c"%+.5d", 99),
        ];
        for &(template, value) in cases {
            let expected = capture(|buf, len| unsafe {
                libc::snprintf(buf, len, template.as_ptr(), value)
            });
            let actual = ours(template, &[MessageArg::int(i64::from(value))]);
            assert_eq!(actual, expected, "template {template:?} value {value}");
        }
    }

    #[test]
    fn long_long_extremes_match_snprintf() {
        let cases: &[(&CStr, c_longlong)] = &[
            (c"%lld", i64::MIN),
            (c"%lld", i64::MAX),
            (c"%+lld", -1),
        ];
        for &(template, value) in cases {
            let expected = capture(|buf, len| unsafe {
                libc::snprintf(buf, len, template.as_ptr(), value)
            });
            assert_eq!(ours(template, &[MessageArg::int(value)]), expected);
        }
    }

    #[test]
    fn unsigned_bases_match_snprintf() {
        let cases: &[(&CStr, c_uint)] = &[
            (c"%u", 0),
            (c"%u", 4294967295),
            (c"%x", 48879),
            (c"%X", 48879),
            (c"%#x", 48879),
            (c"%#X", 48879),
            (c"%#x", 0),
            (c"%o", 8),
            (c"%#o", 8),
            (c"%#o", 0),
            (c"%#.5o", 9),
            (c"%#010x", 48879),
            (c"%-10x|", 255),
            (c"%.8X", 255),
        ];
        for &(template, value) in cases {
            let expected = capture(|buf, len| unsafe {
                libc::snprintf(buf, len, template.as_ptr(), value)
            });
            let actual = ours(template, &[MessageArg::uint(u64::from(value))]);
            assert_eq!(actual, expected, "template {template:?} value {value}");
        }
    }

    #[test]
    fn characters_match_snprintf() {
        let cases: &[(&CStr, c_int)] = &[(c"%c", 65), (c"%5c", 122), (c"%-5c|", 122)];
        for &(template, value) in cases {
            let expected = capture(|buf, len| unsafe {
                libc::snprintf(buf, len, template.as_ptr(), value)
            });
            assert_eq!(ours(template, &[MessageArg::int(i64::from(value))]), expected);
        }
    }

    #[test]
    fn strings_match_snprintf() {
        let cases: &[(&CStr, &CStr)] = &[
            (c"%s", c"hello"),
            (c"%s", c""),
            (c"%10s", c"hello"),
            (c"%-10s|", c"hello"),
            (c"%.3s", c"hello"),
            (c"%10.3s", c"hello"),
            (c"tag <%s> line", c"body"),
        ];
        for &(template, text) in cases {
            let expected = capture(|buf, len| unsafe {
                libc::snprintf(buf, len, template.as_ptr(), text.as_ptr())
            });
            assert_eq!(ours(template, &[MessageArg::str(text)]), expected);
        }
    }

    #[test]
    fn pointers_match_snprintf() {
        let value = 0xdead_beefusize as *const c_void;
        let expected =
            capture(|buf, len| unsafe { libc::snprintf(buf, len, c"%p".as_ptr(), value) });
        assert_eq!(ours(c"%p", &[MessageArg::ptr(value)]), expected);
    }

    #[test]
    fn fixed_floats_match_snprintf() {
        let cases: &[(&CStr, c_double)] = &[
            (c"%f", 0.0),
            (c"%f", 3.1415926535),
            (c"%f", -0.5),
            (c"%.0f", 2.5),
            (c"%.0f", 3.5),
            (c"%.2f", 0.005),
            (c"%10.3f", -3.14159),
            (c"%-10.3f|", 3.14159),
            (c"%010.2f", 3.5),
            (c"%+f", 1.25),
            (c"%#.0f", 7.0),
            (c"%f", f64::INFINITY),
            (c"%F", f64::NEG_INFINITY),
            (c"%f", f64::NAN),
            (c"%8.2f", f64::INFINITY),
        ];
        for &(template, value) in cases {
            let expected = capture(|buf, len| unsafe {
                libc::snprintf(buf, len, template.as_ptr(), value)
            });
            let actual = ours(template, &[MessageArg::double(value)]);
            assert_eq!(actual, expected, "template {template:?} value {value}");
        }
    }

    #[test]
    fn scientific_floats_match_snprintf() {
        let cases: &[(&CStr, c_double)] = &[
            (c"%e", 0.0),
            (c"%e", 12345.6789),
            (c"%.0e", 999.9),
            (c"%E", 0.00012345),
            (c"%.3e", -12345.6789),
            (c"%15.4e", 0.5),
            (c"%e", 1e100),
            (c"%e", 1e-7),
        ];
        for &(template, value) in cases {
            let expected = capture(|buf, len| unsafe {
                libc::snprintf(buf, len, template.as_ptr(), value)
            });
            let actual = ours(template, &[MessageArg::double(value)]);
            assert_eq!(actual, expected, "template {template:?} value {value}");
        }
    }

    #[test]
    fn general_floats_match_snprintf() {
        let cases: &[(&CStr, c_double)] = &[
            (c"%g", 0.0),
            (c"%g", 0.0001),
            (c"%g", 0.00001),
            (c"%g", 0.5),
            (c"%g", 123456.0),
            (c"%g", 1234567.0),
            (c"%g", 123456789.0),
            (c"%G", 0.000012345),
            (c"%.3g", 3.14159),
            (c"%.0g", 123.0),
            (c"%#g", 0.5),
            (c"%g", -0.0),
            (c"%g", 999999.5),
            (c"%12.4g|", 42.0),
        ];
        for &(template, value) in cases {
            let expected = capture(|buf, len| unsafe {
                libc::snprintf(buf, len, template.as_ptr(), value)
            });
            let actual = ours(template, &[MessageArg::double(value)]);
            assert_eq!(actual, expected, "template {template:?} value {value}");
        }
    }

    #[test]
    fn width_and_precision_from_arguments_match_snprintf() {
        let expected = capture(|buf, len| unsafe {
            libc::snprintf(buf, len, c"%*d".as_ptr(), 6 as c_int, 42 as c_int)
        });
        assert_eq!(
            ours(c"%*d", &[MessageArg::int(6), MessageArg::int(42)]),
            expected
        );

        let expected = capture(|buf, len| unsafe {
            libc::snprintf(buf, len, c"%*d".as_ptr(), -6 as c_int, 42 as c_int)
        });
        assert_eq!(
            ours(c"%*d", &[MessageArg::int(-6), MessageArg::int(42)]),
            expected
        );

        let text = CString::new("truncate me").expect("cstring");
        let expected = capture(|buf, len| unsafe {
            libc::snprintf(buf, len, c"%.*s".as_ptr(), 8 as c_int, text.as_ptr())
        });
        assert_eq!(
            ours(c"%.*s", &[MessageArg::int(8), MessageArg::str(&text)]),
            expected
        );
    }

    #[test]
    fn mixed_template_matches_snprintf() {
        let tag = c"font";
        let expected = capture(|buf, len| unsafe {
            libc::snprintf(
                buf,
                len,
                c"Unexpected end tag : %s at line %d (%x)".as_ptr(),
                tag.as_ptr(),
                17 as c_int,
                255 as c_uint,
            )
        });
        let actual = ours(
            c"Unexpected end tag : %s at line %d (%x)",
            &[MessageArg::str(tag), MessageArg::int(17), MessageArg::uint(255)],
        );
        assert_eq!(actual, expected);
    }
}
