//! Lifecycle calculator
//!
//! Every view that shows wear (part listings, installation timelines, the
//! warnings dashboard) derives it through this module, so the threshold
//! constants below are the only place the tiers are defined.
//!
//! There are deliberately three separate cut-offs:
//!
//! - display tiers at [`WARNING_TIER_PCT`] and [`CRITICAL_TIER_PCT`] (gauge colouring)
//! - the aggregate warning list at [`WARNING_LIST_PCT`]
//! - the regulatory hard limit at [`REPLACEMENT_PCT`]

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::CarPart;

/// Display tier boundary: at or above this a part shows as "warning"
pub const WARNING_TIER_PCT: f64 = 70.0;

/// Display tier boundary: at or above this a part shows as "critical"
pub const CRITICAL_TIER_PCT: f64 = 90.0;

/// Operational early-warning threshold for the aggregate warnings list
pub const WARNING_LIST_PCT: f64 = 80.0;

/// Regulatory limit: at or above this the part must be replaced
pub const REPLACEMENT_PCT: f64 = 100.0;

/// Invalid lifecycle input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("mileage cannot be negative (got {mileage} km)")]
    NegativeMileage { mileage: i64 },

    #[error("cumulative mileage overflows")]
    MileageOverflow,
}

/// Lifecycle display tier
///
/// Variants are ordered by severity so tiers can be compared and sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleTier {
    /// No limit applies, or no usable data
    Unknown,
    Good,
    Warning,
    Critical,
}

impl LifecycleTier {
    /// Classify a lifecycle percentage, highest severity first
    pub fn classify(percentage: Option<f64>) -> Self {
        match percentage {
            Some(p) if !p.is_finite() => LifecycleTier::Unknown,
            None => LifecycleTier::Unknown,
            Some(p) if p >= CRITICAL_TIER_PCT => LifecycleTier::Critical,
            Some(p) if p >= WARNING_TIER_PCT => LifecycleTier::Warning,
            Some(_) => LifecycleTier::Good,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            LifecycleTier::Unknown => "No Data",
            LifecycleTier::Good => "Good",
            LifecycleTier::Warning => "Warning",
            LifecycleTier::Critical => "Critical",
        }
    }

    /// All tiers in severity order
    pub fn all() -> &'static [LifecycleTier] {
        &[
            LifecycleTier::Unknown,
            LifecycleTier::Good,
            LifecycleTier::Warning,
            LifecycleTier::Critical,
        ]
    }
}

impl std::fmt::Display for LifecycleTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleTier::Unknown => write!(f, "unknown"),
            LifecycleTier::Good => write!(f, "good"),
            LifecycleTier::Warning => write!(f, "warning"),
            LifecycleTier::Critical => write!(f, "critical"),
        }
    }
}

/// A limit of zero or below means "no limit"
pub fn effective_limit(limit: Option<i64>) -> Option<i64> {
    limit.filter(|l| *l > 0)
}

/// Percentage of the limit consumed by `mileage`.
///
/// `Ok(None)` when no (positive) limit applies. The value is not clamped;
/// anything above 100 means the part is overdue.
pub fn lifecycle_percentage(mileage: i64, limit: Option<i64>) -> Result<Option<f64>, LifecycleError> {
    if mileage < 0 {
        return Err(LifecycleError::NegativeMileage { mileage });
    }
    Ok(effective_limit(limit).map(|limit| 100.0 * mileage as f64 / limit as f64))
}

/// Whether the part has hit the regulatory limit
pub fn needs_replacement(percentage: Option<f64>) -> bool {
    percentage.is_some_and(|p| p >= REPLACEMENT_PCT)
}

/// Whether the percentage belongs on the aggregate warnings list
pub fn is_lifecycle_warning(percentage: Option<f64>) -> bool {
    percentage.is_some_and(|p| p >= WARNING_LIST_PCT)
}

/// Sum of mileage over a part's installation records, active and historical
pub fn cumulative_mileage<'a, I>(records: I) -> Result<i64, LifecycleError>
where
    I: IntoIterator<Item = &'a CarPart>,
{
    records.into_iter().try_fold(0i64, |total, record| {
        let mileage = record.counted_mileage();
        if mileage < 0 {
            return Err(LifecycleError::NegativeMileage { mileage });
        }
        total
            .checked_add(mileage)
            .ok_or(LifecycleError::MileageOverflow)
    })
}

/// Full lifecycle assessment for one mileage figure against one limit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Lifecycle {
    pub mileage: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    pub tier: LifecycleTier,
    pub needs_replacement: bool,
}

impl Lifecycle {
    /// Assess `mileage` against `limit`
    pub fn compute(mileage: i64, limit: Option<i64>) -> Result<Self, LifecycleError> {
        let percentage = lifecycle_percentage(mileage, limit)?;
        Ok(Self {
            mileage,
            limit: effective_limit(limit),
            percentage,
            tier: LifecycleTier::classify(percentage),
            needs_replacement: needs_replacement(percentage),
        })
    }

    /// Whether this belongs on the aggregate warnings list
    pub fn is_warning(&self) -> bool {
        is_lifecycle_warning(self.percentage)
    }

    /// Distance left before the regulatory limit (negative when overdue)
    pub fn remaining_km(&self) -> Option<i64> {
        self.limit.map(|limit| limit - self.mileage)
    }
}
