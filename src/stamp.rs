//! 14-digit `YYYYMMDDHHMMSS` stamps.
//!
//! Every date field in the domain travels as a 14-digit decimal string.
//! Caller-supplied stamps are validated on entry. Stamps already in the
//! ledger are treated more leniently: a stored value that is not exactly
//! 14 digits is "not comparable" and falls out of range queries without
//! failing them.

use chrono::Utc;

use crate::error::ValidationError;

/// Exact length of a stamp.
pub const STAMP_LEN: usize = 14;

/// The current UTC time as a stamp.
#[must_use]
pub fn now() -> String {
    Utc::now().format("%Y%m%d%H%M%S").to_string()
}

/// Returns true if `value` is exactly 14 ASCII digits.
#[must_use]
pub fn is_well_formed(value: &str) -> bool {
    value.len() == STAMP_LEN && value.bytes().all(|b| b.is_ascii_digit())
}

/// Validates a caller-supplied stamp for `field`.
///
/// A malformed stamp is a validation failure distinct from absence.
pub fn validate(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if is_well_formed(value) {
        Ok(())
    } else {
        Err(ValidationError::MalformedStamp {
            field,
            value: value.to_string(),
        })
    }
}

/// Parses a stamp into its numeric form, or `None` if malformed.
#[must_use]
pub fn numeric(value: &str) -> Option<u64> {
    if is_well_formed(value) {
        value.parse().ok()
    } else {
        None
    }
}

/// An inclusive `[from, to]` range over stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StampRange {
    from: u64,
    to: u64,
}

impl StampRange {
    /// Parses caller-supplied range bounds.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MalformedStamp` if either bound is not a
    /// 14-digit stamp.
    pub fn parse(from: &str, to: &str) -> Result<Self, ValidationError> {
        let from = numeric(from).ok_or_else(|| ValidationError::MalformedStamp {
            field: "from",
            value: from.to_string(),
        })?;
        let to = numeric(to).ok_or_else(|| ValidationError::MalformedStamp {
            field: "to",
            value: to.to_string(),
        })?;
        Ok(Self { from, to })
    }

    /// Returns true if `value` is a well-formed stamp inside the range.
    ///
    /// A value that is not exactly 14 digits is not comparable and never
    /// matches.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        match numeric(value) {
            Some(v) => self.from <= v && v <= self.to,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_well_formed() {
        assert!(is_well_formed(&now()));
    }

    #[test]
    fn test_well_formed() {
        assert!(is_well_formed("20260807120000"));
        assert!(!is_well_formed("2026-08-07"));
        assert!(!is_well_formed("202608071200001")); // 15 digits
        assert!(!is_well_formed("2026080712000")); // 13 digits
        assert!(!is_well_formed("2026080712000x"));
        assert!(!is_well_formed(""));
    }

    #[test]
    fn test_validate() {
        assert!(validate("assembly_date", "20260807120000").is_ok());
        let err = validate("assembly_date", "yesterday").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MalformedStamp { field: "assembly_date", .. }
        ));
    }

    #[test]
    fn test_numeric() {
        assert_eq!(numeric("20260807120000"), Some(20_260_807_120_000));
        assert_eq!(numeric("not-a-stamp"), None);
    }

    #[test]
    fn test_range_inclusive_bounds() {
        let range = StampRange::parse("20260101000000", "20261231235959").unwrap();
        assert!(range.contains("20260101000000"));
        assert!(range.contains("20261231235959"));
        assert!(range.contains("20260807120000"));
        assert!(!range.contains("20251231235959"));
        assert!(!range.contains("20270101000000"));
    }

    #[test]
    fn test_range_skips_malformed_values() {
        let range = StampRange::parse("20260101000000", "20261231235959").unwrap();
        assert!(!range.contains("2026-08-07"));
        assert!(!range.contains(""));
    }

    #[test]
    fn test_range_rejects_malformed_bounds() {
        assert!(StampRange::parse("garbage", "20261231235959").is_err());
        assert!(StampRange::parse("20260101000000", "garbage").is_err());
    }
}
