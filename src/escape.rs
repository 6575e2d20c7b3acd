// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A small, dedicated escape decoder for quoted string literals.
//!
//! The source this crate is distilled from delegates escape decoding to
//! Python's generic literal evaluator, which accepts the whole of Python's
//! string-literal grammar. Mimicking that is explicitly out of scope here;
//! this decoder covers exactly `\n \r \t \\ \' \" \xHH \uHHHH` and rejects
//! anything else.

/// Decode `raw`, the characters strictly between a string token's opening
/// and closing quote (the quotes themselves must already be stripped).
pub fn decode(raw: &str) -> Result<String, String> {
    let mut chars = raw.chars().peekable();
    let mut out = String::with_capacity(raw.len());

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('x') => out.push(decode_hex_escape(&mut chars, 2)?),
            Some('u') => out.push(decode_hex_escape(&mut chars, 4)?),
            Some(other) => return Err(format!("invalid escape sequence \\{}", other)),
            None => return Err("invalid escape sequence at end of string".to_string()),
        }
    }

    Ok(out)
}

fn decode_hex_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
) -> Result<char, String> {
    let mut hex = String::with_capacity(digits);
    for _ in 0..digits {
        match chars.next() {
            Some(d) if d.is_ascii_hexdigit() => hex.push(d),
            _ => return Err(format!("invalid \\x/\\u escape, expected {} hex digits", digits)),
        }
    }
    let code = u32::from_str_radix(&hex, 16).map_err(|_| "invalid hex escape".to_string())?;
    char::from_u32(code).ok_or_else(|| format!("invalid unicode code point \\u{{{:x}}}", code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_escapes() {
        assert_eq!(decode("a\\nb\\tc").unwrap(), "a\nb\tc");
        assert_eq!(decode("\\\\").unwrap(), "\\");
        assert_eq!(decode("\\'\\\"").unwrap(), "'\"");
    }

    #[test]
    fn decodes_hex_and_unicode_escapes() {
        assert_eq!(decode("\\x41").unwrap(), "A");
        assert_eq!(decode("\\u0041").unwrap(), "A");
    }

    #[test]
    fn rejects_unknown_escape() {
        assert!(decode("\\q").is_err());
    }

    #[test]
    fn rejects_truncated_hex_escape() {
        assert!(decode("\\x4").is_err());
    }
}
