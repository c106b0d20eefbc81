//! ICU-style message formatting for Phrasebook components.
//!
//! A [`MessageFormat`] compiles a message pattern (placeholders, `select`,
//! `plural`, and `selectordinal` blocks, with `''`/quoted-literal escaping)
//! into an immutable token tree, then formats it against a [`MessageArgs`]
//! parameter map. Structural problems (unbalanced braces, a missing `other`
//! case) fail at construction; missing or non-numeric parameters degrade to
//! inline diagnostics at format time so the rest of the message still
//! renders. Plural-rule selection and the grouped rendering of `#` are
//! backed by ICU4X locale data injected per message instance.

pub mod args;
pub mod format;
pub mod number;
pub mod pattern;
pub mod plural;

pub use args::{ArgValue, MessageArgs};
pub use format::MessageFormat;
pub use number::CountFormatter;
pub use pattern::PatternError;
pub use plural::{PluralCategory, PluralKind, PluralSelector};
