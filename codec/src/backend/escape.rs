//! String escaping for inline literals.

/// Escape a string for a CozoDB double-quoted string literal (JSON-compatible).
pub fn escape_cozo_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 2);
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}

/// Escape a string for a standard-conforming SQL single-quoted literal.
///
/// Only the quote needs doubling; backslashes are literal when
/// `standard_conforming_strings` is on (the PostgreSQL default).
pub fn escape_sql_string(s: &str) -> String {
    s.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("hello", "hello")]
    #[case(r#"say "hello""#, r#"say \"hello\""#)]
    #[case(r"path\to\file", r"path\\to\\file")]
    #[case("line\nbreak\ttab", r"line\nbreak\ttab")]
    #[case("nul\0", r"nul\u0000")]
    fn test_escape_cozo_string(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_cozo_string(input), expected);
    }

    #[rstest]
    fn test_escaped_json_survives_as_cozo_literal() {
        let json = r#"{"name":"alice","note":"a \"quoted\" word"}"#;
        let literal = format!("\"{}\"", escape_cozo_string(json));
        let parsed: String = serde_json::from_str(&literal).unwrap();
        assert_eq!(parsed, json);
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("it's", "it''s")]
    #[case(r#"{"name":"o'brien"}"#, r#"{"name":"o''brien"}"#)]
    #[case(r"back\slash", r"back\slash")]
    fn test_escape_sql_string(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_sql_string(input), expected);
    }
}
