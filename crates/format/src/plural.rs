//! Plural categories and locale-backed rule selection.

use std::str::FromStr;

use icu_locid::Locale;
use icu_plurals::{PluralCategory as IcuPluralCategory, PluralOperands, PluralRules};

/// CLDR plural category of a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    /// Parses a case keyword as written in a message pattern.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "zero" => Some(Self::Zero),
            "one" => Some(Self::One),
            "two" => Some(Self::Two),
            "few" => Some(Self::Few),
            "many" => Some(Self::Many),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::One => "one",
            Self::Two => "two",
            Self::Few => "few",
            Self::Many => "many",
            Self::Other => "other",
        }
    }
}

impl From<IcuPluralCategory> for PluralCategory {
    fn from(value: IcuPluralCategory) -> Self {
        match value {
            IcuPluralCategory::Zero => PluralCategory::Zero,
            IcuPluralCategory::One => PluralCategory::One,
            IcuPluralCategory::Two => PluralCategory::Two,
            IcuPluralCategory::Few => PluralCategory::Few,
            IcuPluralCategory::Many => PluralCategory::Many,
            IcuPluralCategory::Other => PluralCategory::Other,
        }
    }
}

/// Which rule family a plural block selects with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralKind {
    /// `plural` blocks: counting quantities.
    Cardinal,
    /// `selectordinal` blocks: ordinal suffixes (1st, 2nd, 3rd, ...).
    Ordinal,
}

/// Locale-backed plural rule selection for both rule families.
///
/// Built once per locale and owned by the message it serves, so two
/// messages formatted for different locales never share rule state.
#[derive(Debug)]
pub struct PluralSelector {
    cardinal: Option<PluralRules>,
    ordinal: Option<PluralRules>,
}

impl PluralSelector {
    /// Loads cardinal and ordinal rules for the locale. Missing locale data
    /// leaves the corresponding family on the built-in fallback.
    pub fn for_locale(locale: &Locale) -> Self {
        Self {
            cardinal: PluralRules::try_new_cardinal(&locale.clone().into()).ok(),
            ordinal: PluralRules::try_new_ordinal(&locale.clone().into()).ok(),
        }
    }

    /// Maps the decimal rendering of an (offset-adjusted) count to its
    /// plural category.
    pub fn select(&self, kind: PluralKind, decimal: &str) -> PluralCategory {
        let rules = match kind {
            PluralKind::Cardinal => self.cardinal.as_ref(),
            PluralKind::Ordinal => self.ordinal.as_ref(),
        };
        if let Some(rules) = rules {
            if let Ok(operands) = PluralOperands::from_str(decimal) {
                return PluralCategory::from(rules.category_for(operands));
            }
        }
        if decimal == "1" {
            PluralCategory::One
        } else {
            PluralCategory::Other
        }
    }
}
