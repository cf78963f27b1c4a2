/// Removes thousands separators from typed or pasted input.
///
/// Whitespace is kept; the expression evaluator accepts it.
pub fn strip_commas(s: &str) -> String {
    s.replace(',', "")
}

/// Parses the leading integer of `s`, ignoring anything after it.
///
/// `"12abc"` is 12, `"  -3"` is -3, `"1,500"` is 1500 and `"abc"` is `None`.
/// Only ASCII digits count. Values beyond the `i64` range saturate.
pub fn parse_int_like(s: &str) -> Option<i64> {
    let normalized = strip_commas(s);
    let trimmed = normalized.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..end];
    if digits.is_empty() {
        return None;
    }

    let value = match digits.parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(input = %s, "integer out of range, saturating");
            i64::MAX
        }
    };
    Some(if negative { -value } else { value })
}

/// Like [`parse_int_like`], but blank input is `None` without a warning and
/// unparseable input is logged.
pub fn parse_optional_int(s: &str) -> Option<i64> {
    if s.trim().is_empty() {
        return None;
    }
    let parsed = parse_int_like(s);
    if parsed.is_none() {
        tracing::warn!(input = %s, "ignoring non-numeric value");
    }
    parsed
}
