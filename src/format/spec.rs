//! Purpose: Parse printf-style conversion specifications out of a template.
//! Exports: `FormatSpec`, `FormatFlags`, `Width`, `Precision`, `LengthMod`, `parse_format_spec`.
//! Role: Pure syntax layer; the renderer decides what each spec means.
//! Invariants: Parsing never fails the whole template; an unrecognized
//! directive is reported as `None` so the renderer can emit it verbatim.

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct FormatFlags {
    pub left_align: bool,
    pub plus_sign: bool,
    pub space_sign: bool,
    pub alternate: bool,
    pub zero_pad: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Width {
    Fixed(usize),
    FromArg,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Precision {
    Fixed(usize),
    FromArg,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum LengthMod {
    #[default]
    None,
    Char,
    Short,
    Long,
    LongLong,
    Max,
    Size,
    Ptrdiff,
    LongDouble,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct FormatSpec {
    pub flags: FormatFlags,
    pub width: Option<Width>,
    pub precision: Option<Precision>,
    pub length: LengthMod,
    pub conversion: u8,
}

const CONVERSIONS: &[u8] = b"diuoxXcspfFeEgG";

/// Parse one conversion specification starting at `bytes[start]`, which must
/// be a `%`. Returns the spec plus the index one past its end. `%%` is only
/// recognized in its bare form; a `%` with no valid conversion yields `None`.
pub(crate) fn parse_format_spec(bytes: &[u8], start: usize) -> Option<(FormatSpec, usize)> {
    debug_assert_eq!(bytes.get(start), Some(&b'%'));
    let mut i = start + 1;

    let mut flags = FormatFlags::default();
    while let Some(&byte) = bytes.get(i) {
        match byte {
            b'-' => flags.left_align = true,
            b'+' => flags.plus_sign = true,
            b' ' => flags.space_sign = true,
            b'#' => flags.alternate = true,
            b'0' => flags.zero_pad = true,
            _ => break,
        }
        i += 1;
    }

    let width = if bytes.get(i) == Some(&b'*') {
        i += 1;
        Some(Width::FromArg)
    } else {
        parse_digits(bytes, &mut i).map(Width::Fixed)
    };

    let precision = if bytes.get(i) == Some(&b'.') {
        i += 1;
        if bytes.get(i) == Some(&b'*') {
            i += 1;
            Some(Precision::FromArg)
        } else {
            // A bare '.' means precision zero.
            Some(Precision::Fixed(parse_digits(bytes, &mut i).unwrap_or(0)))
        }
    } else {
        None
    };

    let length = parse_length(bytes, &mut i);

    let conversion = *bytes.get(i)?;
    if conversion == b'%' {
        // Only the two-byte form "%%" is a complete specification.
        if i == start + 1 {
            let spec = FormatSpec {
                flags: FormatFlags::default(),
                width: None,
                precision: None,
                length: LengthMod::None,
                conversion,
            };
            return Some((spec, i + 1));
        }
        return None;
    }
    if !CONVERSIONS.contains(&conversion) {
        return None;
    }

    let spec = FormatSpec {
        flags,
        width,
        precision,
        length,
        conversion,
    };
    Some((spec, i + 1))
}

fn parse_digits(bytes: &[u8], i: &mut usize) -> Option<usize> {
    let mut value: Option<usize> = None;
    while let Some(&byte) = bytes.get(*i) {
        if !byte.is_ascii_digit() {
            break;
        }
        let digit = usize::from(byte - b'0');
        value = Some(
            value
                .unwrap_or(0)
                .saturating_mul(10)
                .saturating_add(digit),
        );
        *i += 1;
    }
    value
}

fn parse_length(bytes: &[u8], i: &mut usize) -> LengthMod {
    let length = match bytes.get(*i) {
        Some(b'h') => {
            if bytes.get(*i + 1) == Some(&b'h') {
                *i += 1;
                LengthMod::Char
            } else {
                LengthMod::Short
            }
        }
        Some(b'l') => {
            if bytes.get(*i + 1) == Some(&b'l') {
                *i += 1;
                LengthMod::LongLong
            } else {
                LengthMod::Long
            }
        }
        Some(b'j') => LengthMod::Max,
        Some(b'z') => LengthMod::Size,
        Some(b't') => LengthMod::Ptrdiff,
        Some(b'L') => LengthMod::LongDouble,
        _ => return LengthMod::None,
    };
    *i += 1;
    length
}
