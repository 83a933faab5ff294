//! Valuation method tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// The valuation method selected for a run.
///
/// Every method returns the same [`ValuationResult`](super::ValuationResult)
/// shape, so callers never special-case beyond the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationMethod {
    /// Discounted cash flow with a Gordon growth terminal value.
    Dcf,
    /// Comparable companies (trading multiples).
    #[serde(alias = "comparable_companies")]
    Comps,
    /// A registered custom model.
    Custom,
}

impl ValuationMethod {
    /// Returns the wire tag for this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValuationMethod::Dcf => "dcf",
            ValuationMethod::Comps => "comps",
            ValuationMethod::Custom => "custom",
        }
    }
}

impl fmt::Display for ValuationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ValuationMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dcf" => Ok(ValuationMethod::Dcf),
            "comps" | "comparable_companies" => Ok(ValuationMethod::Comps),
            "custom" => Ok(ValuationMethod::Custom),
            other => Err(EngineError::validation(
                "method",
                format!("unknown valuation method '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!("dcf".parse::<ValuationMethod>().unwrap(), ValuationMethod::Dcf);
        assert_eq!(" DCF ".parse::<ValuationMethod>().unwrap(), ValuationMethod::Dcf);
        assert_eq!(
            "comparable_companies".parse::<ValuationMethod>().unwrap(),
            ValuationMethod::Comps
        );
        assert_eq!("custom".parse::<ValuationMethod>().unwrap(), ValuationMethod::Custom);
    }

    #[test]
    fn test_unknown_tag_names_method_field() {
        let err = "lbo".parse::<ValuationMethod>().unwrap_err();
        assert_eq!(err.field(), Some("method"));
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&ValuationMethod::Comps).unwrap();
        assert_eq!(json, "\"comps\"");
        let parsed: ValuationMethod = serde_json::from_str("\"comparable_companies\"").unwrap();
        assert_eq!(parsed, ValuationMethod::Comps);
    }
}
