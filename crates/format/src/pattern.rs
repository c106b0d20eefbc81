//! ICU message-pattern parsing.
//!
//! A pattern is scanned left to right into a tree of [`MessagePart`]s.
//! Quoted literal runs, placeholders, `select`, `plural`, and
//! `selectordinal` blocks are recognized here; everything structural is
//! validated at parse time so a constructed message can always be
//! formatted.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::plural::{PluralCategory, PluralKind};

pub(crate) const OTHER_CASE: &str = "other";

/// Error conditions raised while parsing a message pattern.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("'}}' at byte {0} has no matching '{{'")]
    UnmatchedCloseBrace(usize),
    #[error("'{{' at byte {0} is never closed")]
    UnclosedBrace(usize),
    #[error("argument block at byte {0} is missing a name")]
    MissingArgumentName(usize),
    #[error("unexpected content in argument block for '{name}' at byte {pos}")]
    MalformedArgument { name: String, pos: usize },
    #[error("unsupported argument type '{kind}' for '{name}'")]
    UnsupportedArgumentType { name: String, kind: String },
    #[error("{kind} block for '{name}' is missing the mandatory 'other' case")]
    MissingOtherCase { name: String, kind: &'static str },
    #[error("{kind} block for '{name}' has a case without a braced body")]
    MissingCaseBody { name: String, kind: &'static str },
    #[error("plural block for '{name}' has invalid case label '{label}'")]
    InvalidPluralCase { name: String, label: String },
    #[error("plural block for '{name}' has a malformed offset")]
    InvalidOffset { name: String },
}

/// A single parsed element of a message pattern.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MessagePart {
    /// Plain pattern text. `#` inside a plural case body is substituted
    /// with the adjusted count when this part is rendered.
    Text(String),
    /// Quoted literal text, emitted verbatim.
    Quoted(String),
    /// `{name}`, replaced with the named parameter's string form.
    Placeholder(String),
    Select(SelectBlock),
    Plural(PluralBlock),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SelectBlock {
    pub name: String,
    /// Cases in declaration order; the parser guarantees an `other` entry.
    pub cases: Vec<(String, Vec<MessagePart>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PluralBlock {
    pub name: String,
    pub kind: PluralKind,
    pub offset: i64,
    /// `=K` cases, matched against the unadjusted value.
    pub exact: BTreeMap<i64, Vec<MessagePart>>,
    /// Keyword cases; the parser guarantees an `Other` entry.
    pub keyword: BTreeMap<PluralCategory, Vec<MessagePart>>,
}

pub(crate) fn parse(pattern: &str) -> Result<Vec<MessagePart>, PatternError> {
    let mut cursor = Cursor::new(pattern);
    parse_sequence(&mut cursor, None)
}

/// Byte-indexed cursor over the pattern text, threaded through every parse
/// function so there is no shared lexer state.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn advance(&mut self, bytes: usize) {
        self.pos += bytes;
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Consumes a `[A-Za-z0-9_]+` run, possibly empty.
    fn take_identifier(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    /// Consumes a select case label: any run of non-whitespace characters
    /// that is not interrupted by a brace or quote.
    fn take_case_label(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if !c.is_whitespace() && !matches!(c, '{' | '}' | '\'')) {
            self.bump();
        }
        &self.src[start..self.pos]
    }
}

/// Parses parts until end of input (top level) or the `}` closing the block
/// opened at `open_pos`.
fn parse_sequence(
    cursor: &mut Cursor,
    open_pos: Option<usize>,
) -> Result<Vec<MessagePart>, PatternError> {
    let mut parts = Vec::new();
    let mut text = String::new();
    loop {
        let Some(ch) = cursor.peek() else {
            match open_pos {
                Some(pos) => return Err(PatternError::UnclosedBrace(pos)),
                None => break,
            }
        };
        match ch {
            '\'' => scan_quote(cursor, &mut parts, &mut text),
            '{' => {
                flush_text(&mut parts, &mut text);
                let pos = cursor.pos;
                cursor.bump();
                parts.push(parse_block(cursor, pos)?);
            }
            '}' => {
                if open_pos.is_some() {
                    cursor.bump();
                    break;
                }
                return Err(PatternError::UnmatchedCloseBrace(cursor.pos));
            }
            _ => {
                text.push(ch);
                cursor.bump();
            }
        }
    }
    flush_text(&mut parts, &mut text);
    Ok(parts)
}

fn flush_text(parts: &mut Vec<MessagePart>, text: &mut String) {
    if !text.is_empty() {
        parts.push(MessagePart::Text(std::mem::take(text)));
    }
}

/// Handles a `'` during scanning.
///
/// `''` collapses to a literal apostrophe. A single quote opens a verbatim
/// run only when it is immediately followed by `{`, `}`, or `#` and a
/// closing quote exists; any other quote is an ordinary character.
fn scan_quote(cursor: &mut Cursor, parts: &mut Vec<MessagePart>, text: &mut String) {
    match cursor.peek_second() {
        Some('\'') => {
            text.push('\'');
            cursor.advance(2);
        }
        Some('{') | Some('}') | Some('#') => {
            if let Some((content, end)) = scan_quoted_run(cursor) {
                flush_text(parts, text);
                parts.push(MessagePart::Quoted(content));
                cursor.pos = end;
            } else {
                // No closing quote: the apostrophe stays literal and the
                // special character after it remains active.
                text.push('\'');
                cursor.bump();
            }
        }
        _ => {
            text.push('\'');
            cursor.bump();
        }
    }
}

/// Scans a quoted run starting at the opening quote under the cursor.
/// Returns the run's content (with inner `''` collapsed) and the byte
/// offset just past the closing quote, or `None` when unterminated.
fn scan_quoted_run(cursor: &Cursor) -> Option<(String, usize)> {
    let body_start = cursor.pos + 1;
    let tail = &cursor.src[body_start..];
    let mut content = String::new();
    let mut chars = tail.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        if ch == '\'' {
            if matches!(chars.peek(), Some((_, '\''))) {
                content.push('\'');
                chars.next();
            } else {
                return Some((content, body_start + i + 1));
            }
        } else {
            content.push(ch);
        }
    }
    None
}

/// Parses the block whose `{` (at `open_pos`) was just consumed.
fn parse_block(cursor: &mut Cursor, open_pos: usize) -> Result<MessagePart, PatternError> {
    cursor.skip_whitespace();
    if cursor.is_eof() {
        return Err(PatternError::UnclosedBrace(open_pos));
    }
    let name = cursor.take_identifier();
    if name.is_empty() {
        return Err(PatternError::MissingArgumentName(open_pos));
    }
    let name = name.to_string();
    cursor.skip_whitespace();
    match cursor.peek() {
        Some('}') => {
            cursor.bump();
            Ok(MessagePart::Placeholder(name))
        }
        Some(',') => {
            cursor.bump();
            cursor.skip_whitespace();
            let kind = cursor.take_identifier().to_string();
            if !matches!(kind.as_str(), "select" | "plural" | "selectordinal") {
                return Err(PatternError::UnsupportedArgumentType { name, kind });
            }
            cursor.skip_whitespace();
            if !cursor.eat(',') {
                let pos = cursor.pos;
                return Err(PatternError::MalformedArgument { name, pos });
            }
            match kind.as_str() {
                "select" => parse_select_block(cursor, open_pos, name),
                "plural" => parse_plural_block(cursor, open_pos, name, PluralKind::Cardinal),
                _ => parse_plural_block(cursor, open_pos, name, PluralKind::Ordinal),
            }
        }
        Some(_) => {
            let pos = cursor.pos;
            Err(PatternError::MalformedArgument { name, pos })
        }
        None => Err(PatternError::UnclosedBrace(open_pos)),
    }
}

fn parse_select_block(
    cursor: &mut Cursor,
    open_pos: usize,
    name: String,
) -> Result<MessagePart, PatternError> {
    let mut cases: Vec<(String, Vec<MessagePart>)> = Vec::new();
    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            None => return Err(PatternError::UnclosedBrace(open_pos)),
            Some('}') => {
                cursor.bump();
                break;
            }
            Some(_) => {
                let label = cursor.take_case_label();
                if label.is_empty() {
                    let pos = cursor.pos;
                    return Err(PatternError::MalformedArgument { name, pos });
                }
                let label = label.to_string();
                let body = expect_case_body(cursor, &name, "select")?;
                cases.push((label, body));
            }
        }
    }
    if !cases.iter().any(|(label, _)| label == OTHER_CASE) {
        return Err(PatternError::MissingOtherCase {
            name,
            kind: "select",
        });
    }
    Ok(MessagePart::Select(SelectBlock { name, cases }))
}

fn parse_plural_block(
    cursor: &mut Cursor,
    open_pos: usize,
    name: String,
    kind: PluralKind,
) -> Result<MessagePart, PatternError> {
    let kind_name = match kind {
        PluralKind::Cardinal => "plural",
        PluralKind::Ordinal => "selectordinal",
    };
    cursor.skip_whitespace();
    let mut offset = 0i64;
    if cursor.rest().starts_with("offset:") {
        cursor.advance("offset:".len());
        let digits = cursor.take_identifier();
        match digits.parse() {
            Ok(value) => offset = value,
            Err(_) => return Err(PatternError::InvalidOffset { name }),
        }
    }
    let mut exact: BTreeMap<i64, Vec<MessagePart>> = BTreeMap::new();
    let mut keyword: BTreeMap<PluralCategory, Vec<MessagePart>> = BTreeMap::new();
    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            None => return Err(PatternError::UnclosedBrace(open_pos)),
            Some('}') => {
                cursor.bump();
                break;
            }
            Some('=') => {
                cursor.bump();
                let digits = cursor.take_identifier();
                let value: i64 = match digits.parse() {
                    Ok(value) => value,
                    Err(_) => {
                        let label = format!("={digits}");
                        return Err(PatternError::InvalidPluralCase { name, label });
                    }
                };
                let body = expect_case_body(cursor, &name, kind_name)?;
                exact.insert(value, body);
            }
            Some(_) => {
                let label = cursor.take_identifier();
                if label.is_empty() {
                    let pos = cursor.pos;
                    return Err(PatternError::MalformedArgument { name, pos });
                }
                let Some(category) = PluralCategory::parse(label) else {
                    let label = label.to_string();
                    return Err(PatternError::InvalidPluralCase { name, label });
                };
                let body = expect_case_body(cursor, &name, kind_name)?;
                keyword.insert(category, body);
            }
        }
    }
    if !keyword.contains_key(&PluralCategory::Other) {
        return Err(PatternError::MissingOtherCase {
            name,
            kind: kind_name,
        });
    }
    Ok(MessagePart::Plural(PluralBlock {
        name,
        kind,
        offset,
        exact,
        keyword,
    }))
}

fn expect_case_body(
    cursor: &mut Cursor,
    name: &str,
    kind: &'static str,
) -> Result<Vec<MessagePart>, PatternError> {
    cursor.skip_whitespace();
    let body_open = cursor.pos;
    if !cursor.eat('{') {
        return Err(PatternError::MissingCaseBody {
            name: name.to_string(),
            kind,
        });
    }
    parse_sequence(cursor, Some(body_open))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pattern_parses_to_nothing() {
        assert_eq!(parse("").unwrap(), Vec::new());
    }

    #[test]
    fn literal_and_placeholder_parts() {
        let parts = parse("New York in {SEASON} is nice.").unwrap();
        assert_eq!(
            parts,
            vec![
                MessagePart::Text("New York in ".into()),
                MessagePart::Placeholder("SEASON".into()),
                MessagePart::Text(" is nice.".into()),
            ]
        );
    }

    #[test]
    fn doubled_quotes_collapse() {
        let parts = parse("Anna''s house").unwrap();
        assert_eq!(parts, vec![MessagePart::Text("Anna's house".into())]);
    }

    #[test]
    fn quote_before_brace_opens_verbatim_run() {
        let parts = parse("has '{0} and # in the roof' here").unwrap();
        assert_eq!(
            parts,
            vec![
                MessagePart::Text("has ".into()),
                MessagePart::Quoted("{0} and # in the roof".into()),
                MessagePart::Text(" here".into()),
            ]
        );
    }

    #[test]
    fn quote_before_plain_text_stays_literal() {
        let parts = parse("'has {X} cows'").unwrap();
        assert_eq!(
            parts,
            vec![
                MessagePart::Text("'has ".into()),
                MessagePart::Placeholder("X".into()),
                MessagePart::Text(" cows'".into()),
            ]
        );
    }

    #[test]
    fn unterminated_run_keeps_brace_active() {
        // The quote cannot open a run without a closing quote, so the
        // brace after it is structural and left unclosed here.
        assert_eq!(parse("a'{b"), Err(PatternError::UnclosedBrace(2)));
    }

    #[test]
    fn unmatched_close_brace_is_rejected() {
        assert_eq!(parse("oops} here"), Err(PatternError::UnmatchedCloseBrace(4)));
    }

    #[test]
    fn unclosed_block_is_rejected() {
        assert_eq!(parse("{NAME"), Err(PatternError::UnclosedBrace(0)));
        assert_eq!(
            parse("{N, plural, other {x"),
            Err(PatternError::UnclosedBrace(18))
        );
    }

    #[test]
    fn empty_argument_name_is_rejected() {
        assert_eq!(parse("{}"), Err(PatternError::MissingArgumentName(0)));
        assert_eq!(parse("''{}}"), Err(PatternError::MissingArgumentName(2)));
    }

    #[test]
    fn unknown_argument_type_is_rejected() {
        assert_eq!(
            parse("{WHEN, date, short}"),
            Err(PatternError::UnsupportedArgumentType {
                name: "WHEN".into(),
                kind: "date".into(),
            })
        );
    }

    #[test]
    fn select_requires_other_case() {
        assert_eq!(
            parse("{G, select, male {His} female {Her}}"),
            Err(PatternError::MissingOtherCase {
                name: "G".into(),
                kind: "select",
            })
        );
    }

    #[test]
    fn plural_requires_other_case() {
        assert_eq!(
            parse("{N, plural, one {thing}}"),
            Err(PatternError::MissingOtherCase {
                name: "N".into(),
                kind: "plural",
            })
        );
    }

    #[test]
    fn plural_rejects_unknown_case_label() {
        assert_eq!(
            parse("{N, plural, lots {x} other {y}}"),
            Err(PatternError::InvalidPluralCase {
                name: "N".into(),
                label: "lots".into(),
            })
        );
    }

    #[test]
    fn plural_rejects_non_numeric_exact_case() {
        assert_eq!(
            parse("{N, plural, =x {x} other {y}}"),
            Err(PatternError::InvalidPluralCase {
                name: "N".into(),
                label: "=x".into(),
            })
        );
    }

    #[test]
    fn plural_rejects_malformed_offset() {
        assert_eq!(
            parse("{N, plural, offset:x other {y}}"),
            Err(PatternError::InvalidOffset { name: "N".into() })
        );
    }

    #[test]
    fn plural_offset_and_cases_are_captured() {
        let parts = parse("{N, plural, offset:1 =0 {none} one {one} other {# more}}").unwrap();
        let MessagePart::Plural(block) = &parts[0] else {
            panic!("expected plural block, got {parts:?}");
        };
        assert_eq!(block.offset, 1);
        assert_eq!(block.kind, PluralKind::Cardinal);
        assert!(block.exact.contains_key(&0));
        assert!(block.keyword.contains_key(&PluralCategory::One));
        assert!(block.keyword.contains_key(&PluralCategory::Other));
    }

    #[test]
    fn selectordinal_parses_as_ordinal() {
        let parts = parse("{N, selectordinal, one {#st} other {#th}}").unwrap();
        let MessagePart::Plural(block) = &parts[0] else {
            panic!("expected plural block, got {parts:?}");
        };
        assert_eq!(block.kind, PluralKind::Ordinal);
    }

    #[test]
    fn nested_blocks_parse_recursively() {
        let parts = parse(
            "{CIRCLES, plural, one {{GENDER, select, female {her} other {his}}} \
             other {{GENDER, select, female {her #} other {his #}}}}",
        )
        .unwrap();
        let MessagePart::Plural(block) = &parts[0] else {
            panic!("expected plural block, got {parts:?}");
        };
        let one = &block.keyword[&PluralCategory::One];
        assert!(matches!(one[0], MessagePart::Select(_)));
    }
}
