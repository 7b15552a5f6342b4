//! Placeholder lexer
//!
//! Turns template text into a stream of [`Token`]s:
//!
//! - `{key}` is a required placeholder
//! - `{key?}` is an optional placeholder
//! - `{{` is a literal `{`
//! - any other brace is literal text, so JSON such as `{"limit": 100}` in a
//!   code block passes through untouched
//!
//! Keys start with an ASCII letter, digit or underscore and may continue with
//! letters, digits, `_`, `-` and `.`. Date-shaped keys such as `YYYY-MM-DD`
//! are ordinary keys.

use serde::Serialize;

/// A lexed piece of template text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Token {
    Text(String),
    Placeholder { key: String, optional: bool },
}

impl Token {
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    #[must_use]
    pub fn required(key: impl Into<String>) -> Self {
        Self::Placeholder {
            key: key.into(),
            optional: false,
        }
    }

    #[must_use]
    pub fn optional(key: impl Into<String>) -> Self {
        Self::Placeholder {
            key: key.into(),
            optional: true,
        }
    }

    /// Placeholder key, if this token is a placeholder.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Placeholder { key, .. } => Some(key),
            Self::Text(_) => None,
        }
    }
}

/// Whether `key` is a syntactically valid placeholder key.
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Lex `input` into tokens. Adjacent text is merged into one `Text` token.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut rest = input;

    while let Some(ch) = rest.chars().next() {
        if rest.starts_with("{{") {
            text.push('{');
            rest = &rest[2..];
            continue;
        }

        if ch == '{' {
            if let Some((key, optional, consumed)) = placeholder_at(rest) {
                if !text.is_empty() {
                    tokens.push(Token::Text(std::mem::take(&mut text)));
                }
                tokens.push(Token::Placeholder {
                    key: key.to_string(),
                    optional,
                });
                rest = &rest[consumed..];
                continue;
            }
        }

        text.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }

    tokens
}

/// Try to read `{key}` or `{key?}` at the start of `s`.
///
/// Returns the key, whether it is optional, and the number of bytes consumed.
fn placeholder_at(s: &str) -> Option<(&str, bool, usize)> {
    let close = s[1..].find('}')? + 1;
    let inner = &s[1..close];
    let (key, optional) = match inner.strip_suffix('?') {
        Some(key) => (key, true),
        None => (inner, false),
    };
    is_valid_key(key).then_some((key, optional, close + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_one_token() {
        assert_eq!(tokenize("hello world"), vec![Token::text("hello world")]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_required_and_optional_placeholders() {
        assert_eq!(
            tokenize("specs/{date}_011_spec_dlt_rest_client_{api_name}.md"),
            vec![
                Token::text("specs/"),
                Token::required("date"),
                Token::text("_011_spec_dlt_rest_client_"),
                Token::required("api_name"),
                Token::text(".md"),
            ]
        );
        assert_eq!(
            tokenize("notes: {notes?}"),
            vec![Token::text("notes: "), Token::optional("notes")]
        );
    }

    #[test]
    fn test_date_shaped_key_is_ordinary() {
        assert_eq!(
            tokenize("{YYYY-MM-DD}"),
            vec![Token::required("YYYY-MM-DD")]
        );
    }

    #[test]
    fn test_json_braces_stay_literal() {
        let src = r#"params = {"per_page": 100, "state": {"open": true}}"#;
        assert_eq!(tokenize(src), vec![Token::text(src)]);
    }

    #[test]
    fn test_escaped_open_brace() {
        assert_eq!(tokenize("{{api_name}"), vec![Token::text("{api_name}")]);
    }

    #[test]
    fn test_invalid_keys_are_text() {
        assert_eq!(tokenize("{ spaced }"), vec![Token::text("{ spaced }")]);
        assert_eq!(tokenize("{}"), vec![Token::text("{}")]);
        assert_eq!(tokenize("{-lead}"), vec![Token::text("{-lead}")]);
        assert_eq!(tokenize("unclosed {key"), vec![Token::text("unclosed {key")]);
    }

    #[test]
    fn test_multibyte_text_around_placeholders() {
        assert_eq!(
            tokenize("→ {api_name} ✓"),
            vec![
                Token::text("→ "),
                Token::required("api_name"),
                Token::text(" ✓"),
            ]
        );
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("api_name"));
        assert!(is_valid_key("auth.token-url"));
        assert!(is_valid_key("2fa"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key(".hidden"));
        assert!(!is_valid_key("has space"));
    }
}
