/// Value of an ASCII hexadecimal digit
#[inline]
fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

/// Decode a URL-encoded query (RFC 3986 escapes, plus `+` as space).
///
/// `%` consumes the next two characters as hex digits. An escape with a
/// non-hex digit, or decoding to NUL, is dropped entirely. A `+` inside an
/// escape still yields a space and does not consume an escape position.
pub fn percent_decode(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut pending = 0u8;
    let mut value: Option<u8> = Some(0);

    for &c in raw {
        match c {
            b'+' => out.push(b' '),
            b'%' => {
                pending = 2;
                value = Some(0);
            }
            _ if pending == 0 => out.push(c),
            _ => {
                value = match (value, hex_value(c)) {
                    (Some(v), Some(digit)) => Some(v * 16 + digit),
                    _ => None,
                };
                pending -= 1;
                if pending == 0 {
                    if let Some(v) = value.filter(|&v| v != 0) {
                        out.push(v);
                    }
                }
            }
        }
    }

    out
}

/// [`percent_decode`] rendered as text, replacing invalid UTF-8
pub fn percent_decode_lossy(raw: &[u8]) -> String {
    match String::from_utf8(percent_decode(raw)) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}
