//! Locale-aware rendering of plural counts for `#` substitution.

use std::fmt;
use std::str::FromStr;

use fixed_decimal::FixedDecimal;
use icu_decimal::options::FixedDecimalFormatterOptions;
use icu_decimal::FixedDecimalFormatter;
use icu_locid::Locale;

/// Renders counts with the locale's digit grouping (`1234` → `1,234` for
/// English-like conventions). Falls back to the plain decimal string when
/// locale data is unavailable.
pub struct CountFormatter {
    inner: Option<FixedDecimalFormatter>,
}

impl CountFormatter {
    pub fn for_locale(locale: &Locale) -> Self {
        let inner = FixedDecimalFormatter::try_new(
            &locale.clone().into(),
            FixedDecimalFormatterOptions::default(),
        )
        .ok();
        Self { inner }
    }

    /// A formatter that performs no grouping at all.
    pub fn unlocalized() -> Self {
        Self { inner: None }
    }

    /// Formats the canonical decimal rendering of a count.
    pub fn format(&self, decimal: &str) -> String {
        match (&self.inner, FixedDecimal::from_str(decimal)) {
            (Some(formatter), Ok(value)) => formatter.format_to_string(&value),
            _ => decimal.to_string(),
        }
    }
}

impl fmt::Debug for CountFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountFormatter")
            .field("localized", &self.inner.is_some())
            .finish()
    }
}

/// Canonical decimal rendering of a numeric parameter: integral values
/// print without a fraction, everything else uses the shortest `f64` form.
pub(crate) fn decimal_repr(value: f64) -> String {
    const EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0; // 2^53
    if value == value.trunc() && value.abs() < EXACT_INT_LIMIT {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use icu_locid::locale;

    use super::*;

    #[test]
    fn english_grouping() {
        let counts = CountFormatter::for_locale(&locale!("en"));
        assert_eq!(counts.format("1234"), "1,234");
        assert_eq!(counts.format("12"), "12");
    }

    #[test]
    fn croatian_grouping_uses_periods() {
        let counts = CountFormatter::for_locale(&locale!("hr"));
        assert_eq!(counts.format("1235"), "1.235");
    }

    #[test]
    fn unlocalized_passthrough() {
        let counts = CountFormatter::unlocalized();
        assert_eq!(counts.format("1234"), "1234");
        assert_eq!(counts.format("-1"), "-1");
    }

    #[test]
    fn decimal_repr_shapes() {
        assert_eq!(decimal_repr(2.0), "2");
        assert_eq!(decimal_repr(-1.0), "-1");
        assert_eq!(decimal_repr(1.5), "1.5");
        assert_eq!(decimal_repr(0.0), "0");
    }
}
