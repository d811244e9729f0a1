//! Scan selectors and predicates

use super::{MemoryError, MemoryResult, MemoryValue, ValueType};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Comparison applied to every candidate during a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanType {
    Exact,
    NotExact,
    BiggerThan,
    BiggerOrEqual,
    SmallerThan,
    SmallerOrEqual,
    Between,
    NotBetween,
}

impl ScanType {
    /// Checks if this scan type needs a lower and an upper bound
    pub fn requires_range(&self) -> bool {
        matches!(self, ScanType::Between | ScanType::NotBetween)
    }

    /// Applies the comparison to `value` against its bound(s).
    ///
    /// `lower` is the ordering of the value relative to the single (or lower)
    /// bound, `upper` relative to the upper bound for range types.
    pub(crate) fn accepts(&self, lower: Option<Ordering>, upper: Option<Ordering>) -> bool {
        use Ordering::*;

        let inside =
            || matches!(lower, Some(Greater | Equal)) && matches!(upper, Some(Less | Equal));

        match self {
            ScanType::Exact => lower == Some(Equal),
            ScanType::NotExact => lower != Some(Equal),
            ScanType::BiggerThan => lower == Some(Greater),
            ScanType::BiggerOrEqual => matches!(lower, Some(Greater | Equal)),
            ScanType::SmallerThan => lower == Some(Less),
            ScanType::SmallerOrEqual => matches!(lower, Some(Less | Equal)),
            ScanType::Between => inside(),
            ScanType::NotBetween => !inside(),
        }
    }
}

/// A validated scan predicate.
///
/// Range bounds are inclusive and always ordered (`lower <= upper`); both
/// bounds share one value kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanPredicate {
    scan_type: ScanType,
    value: MemoryValue,
    upper: Option<MemoryValue>,
}

impl ScanPredicate {
    /// Builds a single-value predicate for any non-range scan type
    pub fn new(scan_type: ScanType, value: impl Into<MemoryValue>) -> MemoryResult<Self> {
        if scan_type.requires_range() {
            return Err(MemoryError::InvalidPredicate(format!(
                "{:?} requires a lower and an upper bound",
                scan_type
            )));
        }

        Ok(ScanPredicate {
            scan_type,
            value: value.into(),
            upper: None,
        })
    }

    /// Matches values equal to `value`
    pub fn exact(value: impl Into<MemoryValue>) -> Self {
        ScanPredicate {
            scan_type: ScanType::Exact,
            value: value.into(),
            upper: None,
        }
    }

    /// Matches values strictly greater than `value`
    pub fn greater_than(value: impl Into<MemoryValue>) -> Self {
        ScanPredicate {
            scan_type: ScanType::BiggerThan,
            value: value.into(),
            upper: None,
        }
    }

    /// Matches values strictly smaller than `value`
    pub fn less_than(value: impl Into<MemoryValue>) -> Self {
        ScanPredicate {
            scan_type: ScanType::SmallerThan,
            value: value.into(),
            upper: None,
        }
    }

    /// Matches values in `[lower, upper]`
    pub fn between(
        lower: impl Into<MemoryValue>,
        upper: impl Into<MemoryValue>,
    ) -> MemoryResult<Self> {
        Self::range(ScanType::Between, lower.into(), upper.into())
    }

    /// Matches values outside `[lower, upper]`
    pub fn not_between(
        lower: impl Into<MemoryValue>,
        upper: impl Into<MemoryValue>,
    ) -> MemoryResult<Self> {
        Self::range(ScanType::NotBetween, lower.into(), upper.into())
    }

    fn range(scan_type: ScanType, lower: MemoryValue, upper: MemoryValue) -> MemoryResult<Self> {
        match lower.compare(&upper) {
            Some(Ordering::Less | Ordering::Equal) => Ok(ScanPredicate {
                scan_type,
                value: lower,
                upper: Some(upper),
            }),
            Some(Ordering::Greater) => Err(MemoryError::InvalidPredicate(format!(
                "lower bound {} is above upper bound {}",
                lower, upper
            ))),
            None => Err(MemoryError::InvalidPredicate(format!(
                "bounds {} and {} are not comparable",
                lower, upper
            ))),
        }
    }

    pub fn scan_type(&self) -> ScanType {
        self.scan_type
    }

    /// The single value, or the lower bound of a range
    pub fn value(&self) -> &MemoryValue {
        &self.value
    }

    pub fn upper(&self) -> Option<&MemoryValue> {
        self.upper.as_ref()
    }

    /// Kind shared by every bound of the predicate
    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }

    /// Tests a decoded value against the predicate
    pub fn matches(&self, candidate: &MemoryValue) -> bool {
        let lower = candidate.compare(&self.value);
        let upper = self
            .upper
            .as_ref()
            .and_then(|upper| candidate.compare(upper));
        self.scan_type.accepts(lower, upper)
    }

    /// Rebuilds the predicate with bounds replaced by `f`, keeping the type.
    ///
    /// Range predicates are re-validated since `f` may move the bounds.
    pub(crate) fn map_bounds<F>(&self, mut f: F) -> MemoryResult<Self>
    where
        F: FnMut(&MemoryValue) -> MemoryResult<MemoryValue>,
    {
        let value = f(&self.value)?;
        match &self.upper {
            Some(upper) => Self::range(self.scan_type, value, f(upper)?),
            None => Ok(ScanPredicate {
                scan_type: self.scan_type,
                value,
                upper: None,
            }),
        }
    }
}
