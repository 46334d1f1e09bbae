use crate::domain::model::ShareRecord;
use crate::utils::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};

/// One donut slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareSlice {
    pub category: String,
    pub value: f64,
    pub percent: f64,
}

/// Percent of total per category, in input order. A zero total gives 0% slices.
pub fn share_slices(shares: &[ShareRecord]) -> Result<Vec<ShareSlice>> {
    if shares.is_empty() {
        return Err(DashboardError::empty("pie"));
    }
    let total: f64 = shares.iter().map(|s| s.value).sum();
    if !total.is_finite() {
        return Err(DashboardError::InvalidValueError {
            context: "pie".to_string(),
            message: "sum of values overflows double precision".to_string(),
        });
    }

    Ok(shares
        .iter()
        .map(|share| ShareSlice {
            category: share.category.clone(),
            value: share.value,
            percent: if total > 0.0 {
                share.value / total * 100.0
            } else {
                0.0
            },
        })
        .collect())
}
