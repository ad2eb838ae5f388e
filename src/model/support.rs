//! Branch support values and their display.

use std::fmt;
use std::str::FromStr;

/// Placeholder rendered for a tree in which no matching clade was found.
pub const MISSING_SUPPORT: &str = "-";

/// Glyph rendered for maximal support.
pub const FULL_SUPPORT: &str = "*";

/// Float comparison tolerance
const EPSILON: f64 = 1e-9;

// =#========================================================================#=
// SUPPORT SCALE
// =#========================================================================#=
/// Scale on which support values of an analysis are reported.
///
/// Bootstrap analyses report percentages, Bayesian and SH-like local supports
/// report proportions. With [Auto](SupportScale::Auto) the scale is not known
/// and both `100` and `1.0` count as maximal support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupportScale {
    /// Either `100` or `1.0` is maximal
    #[default]
    Auto,
    /// `100` is maximal
    Percentage,
    /// `1.0` is maximal
    Proportion,
}

impl SupportScale {
    /// Returns whether `value` is the maximal support on this scale.
    pub fn is_maximal(&self, value: f64) -> bool {
        let is_percent_max = (value - 100.0).abs() < EPSILON;
        let is_proportion_max = (value - 1.0).abs() < EPSILON;
        match self {
            SupportScale::Auto => is_percent_max || is_proportion_max,
            SupportScale::Percentage => is_percent_max,
            SupportScale::Proportion => is_proportion_max,
        }
    }
}

impl FromStr for SupportScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(SupportScale::Auto),
            "percentage" | "percent" => Ok(SupportScale::Percentage),
            "proportion" => Ok(SupportScale::Proportion),
            other => Err(format!("unknown support scale '{other}'")),
        }
    }
}

// =#========================================================================#=
// SUPPORT
// =#========================================================================#=
/// Support of a clade in one analysis, or a placeholder where the clade was
/// not recovered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Support {
    /// Support value as reported by the analysis
    Value(f64),
    /// Clade not present in that analysis, or no value reported
    Missing,
}

impl Support {
    /// Returns the numeric value, or `None` for [Support::Missing].
    pub fn value(&self) -> Option<f64> {
        match self {
            Support::Value(v) => Some(*v),
            Support::Missing => None,
        }
    }

    /// Returns whether this is maximal support on `scale`.
    pub fn is_maximal(&self, scale: SupportScale) -> bool {
        self.value().is_some_and(|v| scale.is_maximal(v))
    }

    /// Renders this support for display: `*` if maximal on `scale`, the
    /// compact decimal value otherwise, and `-` if missing.
    pub fn display(&self, scale: SupportScale) -> String {
        match self {
            Support::Value(_) if self.is_maximal(scale) => FULL_SUPPORT.to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<Option<f64>> for Support {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Support::Missing, Support::Value)
    }
}

impl fmt::Display for Support {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // `{}` on f64 prints the shortest round-tripping decimal: 95 or 87.3
            Support::Value(v) => write!(f, "{v}"),
            Support::Missing => f.write_str(MISSING_SUPPORT),
        }
    }
}

impl FromStr for Support {
    type Err = std::num::ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == MISSING_SUPPORT {
            Ok(Support::Missing)
        } else {
            s.parse::<f64>().map(Support::Value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Support::Value(100.0), SupportScale::Auto, "*" ; "percent max auto")]
    #[test_case(Support::Value(1.0), SupportScale::Auto, "*" ; "proportion max auto")]
    #[test_case(Support::Value(1.0), SupportScale::Percentage, "1" ; "one percent")]
    #[test_case(Support::Value(100.0), SupportScale::Proportion, "100" ; "hundred as proportion")]
    #[test_case(Support::Value(87.3), SupportScale::Auto, "87.3" ; "fraction digits kept")]
    #[test_case(Support::Value(95.0), SupportScale::Auto, "95" ; "no trailing zeros")]
    #[test_case(Support::Value(0.97), SupportScale::Proportion, "0.97" ; "proportion")]
    #[test_case(Support::Missing, SupportScale::Auto, "-" ; "missing")]
    fn test_display(support: Support, scale: SupportScale, expected: &str) {
        assert_eq!(support.display(scale), expected);
    }

    #[test]
    fn test_parse() {
        assert_eq!("-".parse::<Support>().unwrap(), Support::Missing);
        assert_eq!("87.5".parse::<Support>().unwrap(), Support::Value(87.5));
        assert!("abc".parse::<Support>().is_err());
    }
}
