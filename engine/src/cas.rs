//! CAS registry numbers.
//!
//! A CAS number has the shape `NNNNNN-NN-N`: up to six registry digits, two
//! digits, and a check digit. The strict form left-pads the registry digits
//! with zeros to six places; the trimmed form strips the leading zeros and is
//! the one used for display and comparison.

use crate::{error::Result, Error};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Number of registry digits in the strict form.
pub const CAS_REGISTRY_DIGITS: usize = 6;

static CAS_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{0,6}-[0-9]{2}-[0-9]$").expect("CAS shape pattern"));

/// Check whether a term has the shape of a CAS number.
///
/// Longer digit runs such as `1234567-89-5` are not CAS numbers and stay
/// ordinary terms.
pub fn looks_like_cas(term: &str) -> bool {
    CAS_SHAPE.is_match(term.trim())
}

/// A normalized CAS registry number.
///
/// Holds the zero-padded form, so two numbers compare equal exactly when
/// their trimmed forms do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cas(String);

impl Cas {
    /// Parse a CAS number in either padded or trimmed spelling.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if !CAS_SHAPE.is_match(input) {
            return Err(Error::MalformedCas(input.to_string()));
        }

        let (registry, rest) = input
            .split_once('-')
            .ok_or_else(|| Error::MalformedCas(input.to_string()))?;
        let significant = registry.trim_start_matches('0');

        Ok(Self(format!(
            "{:0>width$}-{}",
            significant,
            rest,
            width = CAS_REGISTRY_DIGITS
        )))
    }

    /// Strict form, e.g. `000050-00-0`.
    pub fn padded(&self) -> &str {
        &self.0
    }

    /// Display form with leading zeros stripped, e.g. `50-00-0`.
    pub fn trimmed(&self) -> &str {
        self.0.trim_start_matches('0')
    }

    /// Verify the trailing check digit.
    ///
    /// Each digit before the check digit is weighted by its position counted
    /// from the right, starting at 1; the sum modulo 10 must equal the check digit.
    pub fn has_valid_check_digit(&self) -> bool {
        let digits: Vec<u32> = self.0.chars().filter_map(|c| c.to_digit(10)).collect();
        let Some((check, body)) = digits.split_last() else {
            return false;
        };
        let sum: u32 = body
            .iter()
            .rev()
            .enumerate()
            .map(|(i, d)| (i as u32 + 1) * d)
            .sum();
        sum % 10 == *check
    }
}

impl fmt::Display for Cas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.trimmed())
    }
}

impl FromStr for Cas {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
