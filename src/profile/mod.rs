use serde::{Deserialize, Serialize};

/// The stored description of the user's dog. Every field is free text and
/// empty means "not set"; nothing here is ever rejected at the model layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub allergies: String,
    #[serde(default)]
    pub conditions: String,
    #[serde(default)]
    pub home_location: String,
}

const AGE_UNITS: &[&str] = &["yr", "yrs", "year", "years", "mo", "mos", "month", "months"];
const WEIGHT_UNITS: &[&str] = &["kg", "lbs", "lb"];

/// Loose grammar check for the age field: an integer, optionally followed by
/// whitespace and a duration unit. Empty input carries no opinion and is valid.
/// Validity is advisory; it never blocks a save.
pub fn age_is_valid(input: &str) -> bool {
    matches_grammar(input, AGE_UNITS)
}

/// Same grammar as the age check with mass units instead.
pub fn weight_is_valid(input: &str) -> bool {
    matches_grammar(input, WEIGHT_UNITS)
}

fn matches_grammar(input: &str, units: &[&str]) -> bool {
    let input = input.trim();
    if input.is_empty() {
        return true;
    }

    let digits: String = input.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return false;
    }

    let rest = input[digits.len()..].trim_start();
    if rest.is_empty() {
        return true;
    }

    let rest = rest.to_lowercase();
    units.iter().any(|u| *u == rest)
}
