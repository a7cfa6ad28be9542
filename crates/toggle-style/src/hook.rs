//! Hooks: the atomic selectors and at-rules conditions are built from.
//!
//! A hook is either a selector containing `&` (the styled element), such as
//! `&:hover` or `.dark &`, or a `@media` / `@container` / `@supports` at-rule
//! prelude. Hook text ends up verbatim in the emitted style sheet, so it is
//! tokenized with `cssparser` first and anything that could close or open a
//! block is rejected.

use std::fmt;

use cssparser::{BasicParseErrorKind, ParseError, ParseErrorKind, Parser, ParserInput, Token};

use crate::{Error, Result};

/// The at-rules a hook may be scoped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtRuleKind {
    /// `@media`
    Media,
    /// `@container`
    Container,
    /// `@supports`
    Supports,
}

impl AtRuleKind {
    /// The at-keyword, including the `@`.
    pub fn keyword(&self) -> &'static str {
        match self {
            AtRuleKind::Media => "@media",
            AtRuleKind::Container => "@container",
            AtRuleKind::Supports => "@supports",
        }
    }

    fn all() -> [AtRuleKind; 3] {
        [AtRuleKind::Media, AtRuleKind::Container, AtRuleKind::Supports]
    }
}

/// A validated hook definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Hook {
    /// A selector relative to the styled element (`&`).
    Selector(String),
    /// An at-rule; the styled element is matched with `*` inside it.
    AtRule {
        /// Which at-rule.
        kind: AtRuleKind,
        /// Full source text, e.g. `@media (prefers-color-scheme: dark)`.
        text: String,
    },
}

impl Hook {
    /// Whether `text` is written as a hook rather than a condition name.
    ///
    /// Condition names are alphanumeric, so anything with `&` or a leading `@`
    /// cannot be one.
    pub fn is_hook_syntax(text: &str) -> bool {
        text.contains('&') || text.starts_with('@')
    }

    /// Parse and validate a hook definition.
    pub fn parse(text: &str) -> Result<Self> {
        if let Some(rest) = text.strip_prefix('@') {
            let kind = AtRuleKind::all()
                .into_iter()
                .find(|kind| {
                    rest.strip_prefix(&kind.keyword()[1..])
                        .is_some_and(|prelude| prelude.starts_with(char::is_whitespace))
                })
                .ok_or_else(|| {
                    Error::invalid_hook(text, "only @media, @container and @supports are supported")
                })?;
            let prelude = text[kind.keyword().len()..].trim();
            if prelude.is_empty() {
                return Err(Error::invalid_hook(text, "at-rule has no prelude"));
            }
            validate_tokens(text)?;
            return Ok(Hook::AtRule {
                kind,
                text: text.to_string(),
            });
        }

        if !text.contains('&') {
            return Err(Error::invalid_hook(text, "selector must reference the element with '&'"));
        }
        validate_tokens(text)?;
        Ok(Hook::Selector(text.to_string()))
    }

    /// The source text of the hook.
    pub fn as_str(&self) -> &str {
        match self {
            Hook::Selector(text) => text,
            Hook::AtRule { text, .. } => text,
        }
    }

    /// The selector used for the scoped rule: `&` becomes `*`.
    ///
    /// At-rules match every element inside their block.
    pub fn scoped_selector(&self) -> String {
        match self {
            Hook::Selector(text) => text.replace('&', "*"),
            Hook::AtRule { .. } => "*".to_string(),
        }
    }

    /// Whether this hook wraps its rule in an at-rule block.
    pub fn is_at_rule(&self) -> bool {
        matches!(self, Hook::AtRule { .. })
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn validate_tokens(text: &str) -> Result<()> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    scan_tokens(&mut parser).map_err(|e| {
        let message = match e.kind {
            ParseErrorKind::Custom(message) => message,
            ParseErrorKind::Basic(kind) => format!("{:?}", kind),
        };
        Error::invalid_hook(text, message)
    })
}

/// Walk every token, descending into nested blocks.
///
/// Blocks are only accepted when explicitly closed; `cssparser` would
/// otherwise close them silently at end of input.
fn scan_tokens<'i>(parser: &mut Parser<'i, '_>) -> std::result::Result<(), ParseError<'i, String>> {
    loop {
        let start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(e) if matches!(e.kind, BasicParseErrorKind::EndOfInput) => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        let closing = match token {
            Token::CurlyBracketBlock | Token::CloseCurlyBracket => {
                return Err(parser.new_custom_error("curly braces are not allowed".to_string()));
            }
            Token::Semicolon => {
                return Err(parser.new_custom_error("';' is not allowed".to_string()));
            }
            Token::CloseParenthesis | Token::CloseSquareBracket => {
                return Err(parser.new_custom_error("unbalanced closing bracket".to_string()));
            }
            Token::BadString(_) | Token::BadUrl(_) => {
                return Err(parser.new_custom_error("malformed token".to_string()));
            }
            // The tokenizer ends these at end of input without a terminator.
            Token::Comment(_) => {
                let text = parser.slice_from(start);
                if text.len() < 4 || !text.ends_with("*/") {
                    return Err(parser.new_custom_error("unterminated comment".to_string()));
                }
                continue;
            }
            Token::QuotedString(_) => {
                if !is_terminated_string(parser.slice_from(start)) {
                    return Err(parser.new_custom_error("unterminated string".to_string()));
                }
                continue;
            }
            Token::UnquotedUrl(_) => {
                if !parser.slice_from(start).ends_with(')') {
                    return Err(parser.new_custom_error("unterminated url".to_string()));
                }
                continue;
            }
            Token::Function(_) | Token::ParenthesisBlock => ')',
            Token::SquareBracketBlock => ']',
            _ => continue,
        };
        parser.parse_nested_block(|nested| scan_tokens(nested))?;
        if !parser.slice_from(start).ends_with(closing) {
            return Err(parser.new_custom_error(format!("unclosed block, expected '{}'", closing)));
        }
    }
}

/// Check that a quoted string token ends with its opening quote, and that
/// the quote is not escaped.
fn is_terminated_string(text: &str) -> bool {
    let Some(quote) = text.chars().next() else {
        return false;
    };
    let Some(body) = text[quote.len_utf8()..].strip_suffix(quote) else {
        return false;
    };
    let escapes = body.chars().rev().take_while(|&c| c == '\\').count();
    escapes % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors() {
        let hook = Hook::parse("&:hover").unwrap();
        assert_eq!(hook, Hook::Selector("&:hover".to_string()));
        assert_eq!(hook.scoped_selector(), "*:hover");

        let hook = Hook::parse(".dark &[aria-disabled=true]").unwrap();
        assert_eq!(hook.scoped_selector(), ".dark *[aria-disabled=true]");

        let hook = Hook::parse("&:is(:hover, :focus-visible)").unwrap();
        assert!(!hook.is_at_rule());
    }

    #[test]
    fn at_rules() {
        let hook = Hook::parse("@media (prefers-color-scheme: dark)").unwrap();
        assert!(matches!(
            hook,
            Hook::AtRule {
                kind: AtRuleKind::Media,
                ..
            }
        ));
        assert_eq!(hook.scoped_selector(), "*");

        assert!(Hook::parse("@container (min-width: 400px)").is_ok());
        assert!(Hook::parse("@supports (display: grid)").is_ok());
    }

    #[test]
    fn rejects_unknown_at_rules() {
        assert!(Hook::parse("@layer base").is_err());
        assert!(Hook::parse("@mediafoo (x)").is_err());
        assert!(Hook::parse("@media   ").is_err());
    }

    #[test]
    fn rejects_selector_without_ampersand() {
        assert!(Hook::parse(":hover").is_err());
    }

    #[test]
    fn rejects_block_injection() {
        assert!(Hook::parse("&:hover{color:red}").is_err());
        assert!(Hook::parse("&:hover; color: red").is_err());
        assert!(Hook::parse("&:hover }").is_err());
        assert!(Hook::parse("@media (a{b)").is_err());
    }

    #[test]
    fn rejects_unterminated_comments_and_strings() {
        assert!(Hook::parse("&:hover /*").is_err());
        assert!(Hook::parse("&:hover /*/").is_err());
        assert!(Hook::parse("&:hover \"abc").is_err());
        assert!(Hook::parse("&[title='abc\\']").is_err());
        assert!(Hook::parse("@media (min-width: 1px) /*").is_err());
        assert!(Hook::parse("&:not(:hover) /* note").is_err());

        assert!(Hook::parse("&:hover /* note */").is_ok());
        assert!(Hook::parse("&[title=\"abc\"]").is_ok());
        assert!(Hook::parse("&[title='a\\\\']").is_ok());
    }

    #[test]
    fn rejects_unbalanced_brackets() {
        assert!(Hook::parse("&:is(:hover").is_err());
        assert!(Hook::parse("&[data-x").is_err());
        assert!(Hook::parse("&:hover)").is_err());
        assert!(Hook::parse("@media (min-width: 10px").is_err());
    }

    #[test]
    fn hook_syntax_detection() {
        assert!(Hook::is_hook_syntax("&:hover"));
        assert!(Hook::is_hook_syntax("@media print"));
        assert!(!Hook::is_hook_syntax("hover"));
    }
}
