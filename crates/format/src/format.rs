//! Message evaluation against a parameter map.

use icu_locid::{locale, Locale};

use crate::args::{ArgValue, MessageArgs};
use crate::number::{decimal_repr, CountFormatter};
use crate::pattern::{self, MessagePart, PatternError, PluralBlock, SelectBlock, OTHER_CASE};
use crate::plural::{PluralCategory, PluralSelector};

/// Values in the exact range where `f64 → i64` is lossless.
fn exact_case_key(value: f64) -> Option<i64> {
    const EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0; // 2^53
    if value == value.trunc() && value.abs() < EXACT_INT_LIMIT {
        Some(value as i64)
    } else {
        None
    }
}

/// A compiled ICU-style message pattern.
///
/// Parsing happens once at construction; the parsed tree is immutable and a
/// single instance can serve any number of concurrent `format` calls. The
/// plural rules and count grouping it consults are injected at construction,
/// so messages built for different locales are fully independent.
#[derive(Debug)]
pub struct MessageFormat {
    parts: Vec<MessagePart>,
    plurals: PluralSelector,
    counts: CountFormatter,
}

impl MessageFormat {
    /// Compiles a pattern with `en-US` plural rules and grouping.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Self::with_locale(pattern, &locale!("en-US"))
    }

    /// Compiles a pattern with the locale's plural rules and grouping.
    pub fn with_locale(pattern: &str, locale: &Locale) -> Result<Self, PatternError> {
        Self::with_services(
            pattern,
            PluralSelector::for_locale(locale),
            CountFormatter::for_locale(locale),
        )
    }

    /// Compiles a pattern with explicitly injected locale services.
    pub fn with_services(
        pattern: &str,
        plurals: PluralSelector,
        counts: CountFormatter,
    ) -> Result<Self, PatternError> {
        Ok(Self {
            parts: pattern::parse(pattern)?,
            plurals,
            counts,
        })
    }

    /// Formats the message. Missing or invalid parameters degrade to
    /// inline diagnostics instead of failing the whole message.
    pub fn format(&self, args: &MessageArgs) -> String {
        self.render(args, true)
    }

    /// Same as [`format`](Self::format), but `#` inside plural case bodies
    /// is emitted verbatim instead of being replaced with the count.
    pub fn format_ignoring_pound(&self, args: &MessageArgs) -> String {
        self.render(args, false)
    }

    /// Whether the pattern contains a plural or selectordinal block at any
    /// nesting depth.
    pub fn has_plural(&self) -> bool {
        parts_have_plural(&self.parts)
    }

    fn render(&self, args: &MessageArgs, substitute_pound: bool) -> String {
        let renderer = Renderer {
            message: self,
            args,
            substitute_pound,
        };
        let mut out = String::new();
        renderer.render_parts(&self.parts, None, &mut out);
        out
    }
}

fn parts_have_plural(parts: &[MessagePart]) -> bool {
    parts.iter().any(|part| match part {
        MessagePart::Plural(_) => true,
        MessagePart::Select(block) => block
            .cases
            .iter()
            .any(|(_, body)| parts_have_plural(body)),
        _ => false,
    })
}

struct Renderer<'a> {
    message: &'a MessageFormat,
    args: &'a MessageArgs,
    substitute_pound: bool,
}

impl Renderer<'_> {
    /// Walks a part list. `pound` carries the rendered count of the
    /// innermost enclosing plural block; it propagates through select
    /// bodies and is replaced by nested plural blocks.
    fn render_parts(&self, parts: &[MessagePart], pound: Option<&str>, out: &mut String) {
        for part in parts {
            match part {
                MessagePart::Text(text) => match pound {
                    Some(count) if self.substitute_pound && text.contains('#') => {
                        out.push_str(&text.replace('#', count));
                    }
                    _ => out.push_str(text),
                },
                MessagePart::Quoted(text) => out.push_str(text),
                MessagePart::Placeholder(name) => match self.args.get(name) {
                    Some(value) => out.push_str(&value.as_text()),
                    None => push_undefined(out, name),
                },
                MessagePart::Select(block) => self.render_select(block, pound, out),
                MessagePart::Plural(block) => self.render_plural(block, out),
            }
        }
    }

    fn render_select(&self, block: &SelectBlock, pound: Option<&str>, out: &mut String) {
        let Some(value) = self.args.get(&block.name) else {
            push_undefined(out, &block.name);
            return;
        };
        let key = value.as_text();
        let matched = block
            .cases
            .iter()
            .find(|(label, _)| label.as_str() == key.as_ref())
            .or_else(|| block.cases.iter().find(|(label, _)| label == OTHER_CASE));
        if let Some((_, body)) = matched {
            self.render_parts(body, pound, out);
        }
    }

    fn render_plural(&self, block: &PluralBlock, out: &mut String) {
        let value = self
            .args
            .get(&block.name)
            .and_then(ArgValue::as_number)
            .filter(|value| value.is_finite());
        let Some(value) = value else {
            push_invalid(out, &block.name);
            return;
        };
        let adjusted = value - block.offset as f64;
        let decimal = decimal_repr(adjusted);
        let body = match exact_case_key(value).and_then(|key| block.exact.get(&key)) {
            Some(body) => Some(body),
            None => {
                if adjusted < 0.0 {
                    push_invalid(out, &block.name);
                    return;
                }
                let category = self.message.plurals.select(block.kind, &decimal);
                block
                    .keyword
                    .get(&category)
                    .or_else(|| block.keyword.get(&PluralCategory::Other))
            }
        };
        if let Some(body) = body {
            let count = self.message.counts.format(&decimal);
            self.render_parts(body, Some(&count), out);
        }
    }
}

fn push_undefined(out: &mut String, name: &str) {
    out.push_str("Undefined parameter - ");
    out.push_str(name);
}

fn push_invalid(out: &mut String, name: &str) {
    out.push_str("Undefined or invalid parameter - ");
    out.push_str(name);
}
