use crate::domain::model::{RankRecord, ShareRecord};
use crate::utils::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_THRESHOLD_PERCENT: f64 = 80.0;

// Absorbs rounding in the running percentage when it lands exactly on the threshold.
const THRESHOLD_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoRanking {
    pub records: Vec<RankRecord>,
    pub threshold_percent: f64,
    /// First position whose cumulative percentage reaches the threshold.
    /// `None` when the total is zero.
    pub threshold_index: Option<usize>,
    pub total: f64,
}

impl ParetoRanking {
    /// Categories up to and including the threshold position.
    pub fn vital_few(&self) -> &[RankRecord] {
        match self.threshold_index {
            Some(index) => &self.records[..=index],
            None => &[],
        }
    }
}

/// Rank categories by value, descending, with their running share of the total.
///
/// Equal values keep their input order. A zero total yields 0% everywhere and
/// no threshold index.
pub fn rank(shares: &[ShareRecord], threshold_percent: f64) -> Result<ParetoRanking> {
    if !(threshold_percent > 0.0 && threshold_percent <= 100.0) {
        return Err(DashboardError::InvalidValueError {
            context: "pareto".to_string(),
            message: format!(
                "threshold must be within (0, 100], got {}",
                threshold_percent
            ),
        });
    }
    if shares.is_empty() {
        return Err(DashboardError::empty("pareto"));
    }
    if let Some(bad) = shares.iter().find(|s| !s.value.is_finite() || s.value < 0.0) {
        return Err(DashboardError::InvalidValueError {
            context: "pareto".to_string(),
            message: format!("category '{}' has value {}", bad.category, bad.value),
        });
    }

    let mut sorted: Vec<&ShareRecord> = shares.iter().collect();
    // sort_by is stable, so ties keep input order
    sorted.sort_by(|a, b| b.value.total_cmp(&a.value));

    let total: f64 = sorted.iter().map(|s| s.value).sum();
    if !total.is_finite() {
        return Err(DashboardError::InvalidValueError {
            context: "pareto".to_string(),
            message: "sum of values overflows double precision".to_string(),
        });
    }

    let mut running = 0.0;
    let records: Vec<RankRecord> = sorted
        .into_iter()
        .map(|share| {
            running += share.value;
            RankRecord {
                category: share.category.clone(),
                value: share.value,
                cumulative_percent: if total > 0.0 {
                    running / total * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();

    let threshold_index = if total > 0.0 {
        records
            .iter()
            .position(|r| r.cumulative_percent + THRESHOLD_EPSILON >= threshold_percent)
    } else {
        tracing::warn!("Pareto total is zero; cumulative percentages reported as 0");
        None
    };

    Ok(ParetoRanking {
        records,
        threshold_percent,
        threshold_index,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shares(values: &[(&str, f64)]) -> Vec<ShareRecord> {
        values
            .iter()
            .map(|(category, value)| ShareRecord {
                category: category.to_string(),
                value: *value,
            })
            .collect()
    }

    #[test]
    fn test_department_threshold() {
        let input = shares(&[
            ("마케팅부", 923.0),
            ("영업부", 477.0),
            ("생산부", 954.0),
            ("인사부", 209.0),
            ("연구개발부", 559.0),
        ]);
        let ranking = rank(&input, DEFAULT_THRESHOLD_PERCENT).unwrap();

        let order: Vec<&str> = ranking.records.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(order, vec!["생산부", "마케팅부", "연구개발부", "영업부", "인사부"]);

        let expected = [30.56, 60.12, 78.03, 93.31, 100.0];
        for (record, want) in ranking.records.iter().zip(expected) {
            assert!(
                (record.cumulative_percent - want).abs() < 0.01,
                "{} vs {}",
                record.cumulative_percent,
                want
            );
        }
        assert_eq!(ranking.total, 3122.0);
        assert_eq!(ranking.threshold_index, Some(3));
        assert_eq!(ranking.records[3].category, "영업부");
        assert_eq!(ranking.vital_few().len(), 4);
    }

    #[test]
    fn test_cumulative_is_monotonic_and_ends_at_100() {
        let input = shares(&[("a", 0.1), ("b", 7.3), ("c", 2.2), ("d", 0.0), ("e", 13.9)]);
        let ranking = rank(&input, DEFAULT_THRESHOLD_PERCENT).unwrap();

        for pair in ranking.records.windows(2) {
            assert!(pair[0].cumulative_percent <= pair[1].cumulative_percent);
        }
        let last = ranking.records.last().unwrap().cumulative_percent;
        assert!((last - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let input = shares(&[("first", 5.0), ("big", 9.0), ("second", 5.0)]);
        let ranking = rank(&input, DEFAULT_THRESHOLD_PERCENT).unwrap();
        let order: Vec<&str> = ranking.records.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(order, vec!["big", "first", "second"]);
    }

    #[test]
    fn test_exact_threshold_counts() {
        let input = shares(&[("a", 80.0), ("b", 20.0)]);
        let ranking = rank(&input, DEFAULT_THRESHOLD_PERCENT).unwrap();
        assert_eq!(ranking.threshold_index, Some(0));
    }

    #[test]
    fn test_zero_total_reports_zero_percentages() {
        let input = shares(&[("a", 0.0), ("b", 0.0)]);
        let ranking = rank(&input, DEFAULT_THRESHOLD_PERCENT).unwrap();
        assert!(ranking.records.iter().all(|r| r.cumulative_percent == 0.0));
        assert_eq!(ranking.threshold_index, None);
        assert!(ranking.vital_few().is_empty());
    }

    #[test]
    fn test_empty_and_negative_input() {
        assert!(matches!(
            rank(&[], DEFAULT_THRESHOLD_PERCENT),
            Err(DashboardError::EmptyDatasetError { .. })
        ));
        assert!(matches!(
            rank(&shares(&[("a", -1.0)]), DEFAULT_THRESHOLD_PERCENT),
            Err(DashboardError::InvalidValueError { .. })
        ));
    }

    #[test]
    fn test_overflowing_total_is_rejected() {
        let input = shares(&[("a", 1e308), ("b", 1e308)]);
        assert!(matches!(
            rank(&input, DEFAULT_THRESHOLD_PERCENT),
            Err(DashboardError::InvalidValueError { .. })
        ));
    }

    #[test]
    fn test_threshold_outside_range_is_rejected() {
        let input = shares(&[("a", 3.0), ("b", 1.0)]);
        for threshold in [0.0, -5.0, 100.5, f64::NAN] {
            assert!(
                matches!(
                    rank(&input, threshold),
                    Err(DashboardError::InvalidValueError { .. })
                ),
                "threshold {} accepted",
                threshold
            );
        }
        let full = rank(&input, 100.0).unwrap();
        assert_eq!(full.threshold_index, Some(1));
    }
}
