use std::str::Chars;

/// Escape a literal lexical form for N-Quads output.
///
/// Only `\\`, `\t`, `\n`, `\r` and `"` are escaped. Everything else is
/// written verbatim so canonical output stays byte-stable.
pub fn escape_nquads(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out
}

/// Decode an N-Quads string body.
///
/// Accepts the ECHAR escapes plus `\uXXXX` (with surrogate pairs) and `\UXXXXXXXX`.
pub fn unescape_nquads(s: &str) -> Result<String, String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{0008}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some('u') => {
                let high = read_hex(&mut chars, 4)?;
                if (0xD800..=0xDBFF).contains(&high) {
                    if chars.next() != Some('\\') || chars.next() != Some('u') {
                        return Err(format!("expected low surrogate after \\u{high:04X}"));
                    }
                    let low = read_hex(&mut chars, 4)?;
                    if !(0xDC00..=0xDFFF).contains(&low) {
                        return Err(format!("invalid low surrogate \\u{low:04X}"));
                    }
                    out.push(to_char(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))?);
                } else {
                    out.push(to_char(high)?);
                }
            }
            Some('U') => out.push(to_char(read_hex(&mut chars, 8)?)?),
            Some(other) => return Err(format!("unknown escape sequence \\{other}")),
            None => return Err("trailing backslash".to_string()),
        }
    }
    Ok(out)
}

fn read_hex(chars: &mut Chars<'_>, digits: usize) -> Result<u32, String> {
    let hex: String = chars.by_ref().take(digits).collect();
    if hex.len() != digits {
        return Err(format!("incomplete unicode escape '{hex}'"));
    }
    u32::from_str_radix(&hex, 16).map_err(|_| format!("invalid unicode escape '{hex}'"))
}

fn to_char(code_point: u32) -> Result<char, String> {
    char::from_u32(code_point).ok_or_else(|| format!("invalid code point U+{code_point:X}"))
}
