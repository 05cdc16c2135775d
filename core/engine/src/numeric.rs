//! FILENAME: core/engine/src/numeric.rs
//! PURPOSE: Lenient number parsing shared by the normalizer, formulas, filters and sorting.
//! CONTEXT: Exported quantities arrive as "120 m2", "$45.00", "12%". Two readings
//! are needed: stripping decorations down to digits, and reading the leading
//! numeric prefix of a string the way a lenient float parser would.

/// Keeps only ASCII digits, '.' and '-'.
pub fn strip_to_numeric(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect()
}

/// Strips decorations and reads the numeric prefix of what remains.
/// Returns None when nothing numeric is left or the result is not finite.
pub fn parse_stripped(s: &str) -> Option<f64> {
    parse_float_prefix(&strip_to_numeric(s))
}

/// Reads a decorated quantity. The numeric body is whatever precedes the first
/// letter, so unit suffixes that carry digits ("m2", "m3") stay out of the
/// value: "12 m2" -> 12, "$1,250.50" -> 1250.5. When that body holds no number
/// ("Nivel 3") the whole string is stripped instead.
pub fn parse_decorated(s: &str) -> Option<f64> {
    let body_end = s
        .char_indices()
        .find(|(_, c)| c.is_alphabetic())
        .map(|(i, _)| i)
        .unwrap_or(s.len());

    parse_stripped(&s[..body_end]).or_else(|| parse_stripped(s))
}

/// Parses the longest numeric prefix of `s`: optional leading whitespace,
/// optional sign, digits with an optional fraction, and an optional exponent.
/// "15 m2" -> 15, "-.5x" -> -0.5, "1e3kg" -> 1000, "abc" -> None.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let bytes = s.trim_start().as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when digits follow it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    let prefix = std::str::from_utf8(&bytes[..end]).ok()?;
    prefix.parse::<f64>().ok().filter(|n| n.is_finite())
}
