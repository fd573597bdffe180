//! Unit-bearing numeric values
//!
//! Upstream text uses Indonesian conventions: comma decimals (`10,76g`) and
//! `kkal` for kilocalories. Everything here normalizes toward period decimals,
//! `kcal` and `g`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// First integer or decimal token, either separator
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+[.,]?\d*").expect("Invalid number regex")
});

/// A number directly or loosely followed by a unit token
static QUANTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(kkal|kcal|gram|gr|g)\b").expect("Invalid quantity regex")
});

static KKAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)kkal").expect("Invalid kkal regex")
});

static UNIT_SPACING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d)(kcal|gram|gr|g)\b").expect("Invalid unit spacing regex")
});

pub const KCAL: &str = "kcal";
pub const GRAM: &str = "g";

/// A magnitude with its physical unit, e.g. `237 kcal`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub magnitude: f64,
    pub unit: String,
}

impl Quantity {
    pub fn new(magnitude: f64, unit: &str) -> Self {
        Self {
            magnitude,
            unit: unit.to_string(),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit)
    }
}

/// Parse the first numeric token in `text`, treating a comma as the decimal separator
pub fn parse_number(text: &str) -> Option<f64> {
    let token = NUMBER_RE.find(text)?.as_str();
    token
        .replace(',', ".")
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
}

/// Parse the first numeric token and attach the unit the caller knows applies
pub fn parse_value(text: &str, unit: &str) -> Option<Quantity> {
    parse_number(text).map(|magnitude| Quantity::new(magnitude, unit))
}

/// Parse a number together with the unit token written after it.
///
/// `gram`/`gr` become `g`, `kkal` becomes `kcal`.
pub fn parse_quantity(text: &str) -> Option<Quantity> {
    let caps = QUANTITY_RE.captures(text)?;
    let magnitude = parse_number(caps.get(1)?.as_str())?;
    let unit = match caps.get(2)?.as_str().to_lowercase().as_str() {
        "kkal" | "kcal" => KCAL,
        _ => GRAM,
    };
    Some(Quantity::new(magnitude, unit))
}

/// Rewrite `kkal` to `kcal` and put a space between a number and its unit
pub fn normalize_units(text: &str) -> String {
    let text = KKAL_RE.replace_all(text, KCAL);
    UNIT_SPACING_RE.replace_all(&text, "$1 $2").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_comma_decimal() {
        assert_eq!(parse_number("Karb: 10,76g"), Some(10.76));
        assert_eq!(parse_number("Lemak 13.49 g"), Some(13.49));
        assert_eq!(parse_number("Kalori 237"), Some(237.0));
    }

    #[test]
    fn test_parse_number_absent() {
        assert_eq!(parse_number("Protein"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_parse_number_trailing_separator() {
        assert_eq!(parse_number("12, lalu"), Some(12.0));
    }

    #[test]
    fn test_parse_value_attaches_unit() {
        let q = parse_value("Kal237", KCAL).unwrap();
        assert_eq!(q, Quantity::new(237.0, "kcal"));
        assert_eq!(q.to_string(), "237 kcal");
    }

    #[test]
    fn test_parse_quantity_units() {
        assert_eq!(parse_quantity("237kkal"), Some(Quantity::new(237.0, "kcal")));
        assert_eq!(parse_quantity("13,49 g"), Some(Quantity::new(13.49, "g")));
        assert_eq!(parse_quantity("5 gram"), Some(Quantity::new(5.0, "g")));
        assert_eq!(parse_quantity("no numbers"), None);
    }

    #[test]
    fn test_normalize_units() {
        assert_eq!(normalize_units("237kkal"), "237 kcal");
        assert_eq!(normalize_units("237 KKal"), "237 kcal");
        assert_eq!(normalize_units("13,49g, 5gr, 100gram"), "13,49 g, 5 gr, 100 gram");
        assert_eq!(normalize_units("1 gelas"), "1 gelas");
    }

    #[test]
    fn test_normalize_units_uppercase() {
        assert_eq!(normalize_units("100G 5GR"), "100 G 5 GR");
        assert_eq!(normalize_units("Lemak: 13,49G"), "Lemak: 13,49 G");
        assert_eq!(normalize_units("90KKAL"), "90 kcal");
        assert_eq!(parse_quantity(&normalize_units("13,49G")), Some(Quantity::new(13.49, "g")));
    }

    #[test]
    fn test_normalize_units_leaves_words_alone() {
        assert_eq!(normalize_units("2 goreng"), "2 goreng");
        assert_eq!(normalize_units("2goreng"), "2goreng");
    }
}
