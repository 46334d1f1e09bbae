use crate::domain::model::{CategorySeriesRecord, Period, PeriodRecord};
use crate::utils::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Differences at or below this are treated as balanced.
pub const RECONCILIATION_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total: f64,
    pub max: PeriodRecord,
    pub min: PeriodRecord,
}

/// Sum, best and worst period of the bar table.
///
/// Ties keep the first record in input order.
pub fn compute_kpis(records: &[PeriodRecord]) -> Result<Kpis> {
    let (first, rest) = records
        .split_first()
        .ok_or_else(|| DashboardError::empty("bar"))?;

    let mut total = first.total;
    let mut max = first;
    let mut min = first;
    for record in rest {
        total += record.total;
        if record.total > max.total {
            max = record;
        }
        if record.total < min.total {
            min = record;
        }
    }

    if !total.is_finite() {
        return Err(DashboardError::InvalidValueError {
            context: "bar".to_string(),
            message: "sum of monthly totals overflows double precision".to_string(),
        });
    }

    Ok(Kpis {
        total,
        max: max.clone(),
        min: min.clone(),
    })
}

/// One reconciliation line. A side missing from either table is `None`,
/// and so is the difference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationRow {
    pub period: Period,
    pub total: Option<f64>,
    pub category_sum: Option<f64>,
    pub difference: Option<f64>,
}

impl ReconciliationRow {
    pub fn is_balanced(&self) -> bool {
        self.difference
            .is_some_and(|difference| difference.abs() <= RECONCILIATION_TOLERANCE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub rows: Vec<ReconciliationRow>,
}

impl Reconciliation {
    pub fn all_balanced(&self) -> bool {
        self.rows.iter().all(ReconciliationRow::is_balanced)
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &ReconciliationRow> {
        self.rows.iter().filter(|row| !row.is_balanced())
    }
}

/// Compare each period total with the sum of its category values.
///
/// Rows follow `totals`; periods only present in `series` are appended in
/// chronological order.
pub fn reconcile(totals: &[PeriodRecord], series: &[CategorySeriesRecord]) -> Reconciliation {
    let mut sums: BTreeMap<Period, f64> = BTreeMap::new();
    for record in series {
        *sums.entry(record.period).or_insert(0.0) += record.value;
    }

    let mut rows = Vec::with_capacity(totals.len());
    for record in totals {
        let category_sum = sums.remove(&record.period);
        rows.push(ReconciliationRow {
            period: record.period,
            total: Some(record.total),
            category_sum,
            difference: category_sum.map(|sum| record.total - sum),
        });
    }

    rows.extend(sums.into_iter().map(|(period, sum)| ReconciliationRow {
        period,
        total: None,
        category_sum: Some(sum),
        difference: None,
    }));

    for row in rows.iter().filter(|row| !row.is_balanced()) {
        tracing::warn!(
            "Reconciliation mismatch for {}: total={:?}, category sum={:?}",
            row.period,
            row.total,
            row.category_sum
        );
    }

    Reconciliation { rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(month: u32) -> Period {
        Period::from_ym(2024, month).unwrap()
    }

    fn totals(values: &[f64]) -> Vec<PeriodRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, &total)| PeriodRecord {
                period: period(i as u32 + 1),
                total,
            })
            .collect()
    }

    fn series(month: u32, values: &[f64]) -> Vec<CategorySeriesRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| CategorySeriesRecord {
                period: period(month),
                category: format!("제품 {}", i),
                value,
            })
            .collect()
    }

    #[test]
    fn test_kpis_for_first_quarter() {
        let kpis = compute_kpis(&totals(&[885.0, 918.0, 887.0])).unwrap();
        assert_eq!(kpis.total, 2690.0);
        assert_eq!(kpis.max.total, 918.0);
        assert_eq!(kpis.max.period, period(2));
        assert_eq!(kpis.min.total, 885.0);
        assert_eq!(kpis.min.period, period(1));
    }

    #[test]
    fn test_kpis_ties_keep_first_occurrence() {
        let kpis = compute_kpis(&totals(&[5.0, 9.0, 9.0, 5.0])).unwrap();
        assert_eq!(kpis.max.period, period(2));
        assert_eq!(kpis.min.period, period(1));
    }

    #[test]
    fn test_kpis_single_record() {
        let kpis = compute_kpis(&totals(&[42.0])).unwrap();
        assert_eq!(kpis.max, kpis.min);
        assert_eq!(kpis.total, 42.0);
    }

    #[test]
    fn test_kpis_empty_is_error() {
        assert!(matches!(
            compute_kpis(&[]),
            Err(DashboardError::EmptyDatasetError { .. })
        ));
    }

    #[test]
    fn test_kpis_overflowing_total_is_rejected() {
        assert!(matches!(
            compute_kpis(&totals(&[1e308, 1e308])),
            Err(DashboardError::InvalidValueError { .. })
        ));
    }

    #[test]
    fn test_reconcile_exact_sums_have_zero_difference() {
        let mut records = series(1, &[320.0, 300.0, 265.0]);
        records.extend(series(2, &[335.0, 310.0, 273.0]));

        let result = reconcile(&totals(&[885.0, 918.0]), &records);

        assert_eq!(result.rows.len(), 2);
        assert!(result.rows.iter().all(|row| row.difference == Some(0.0)));
        assert!(result.all_balanced());
    }

    #[test]
    fn test_reconcile_reports_missing_sides() {
        let mut records = series(1, &[1.0, 2.0]);
        records.extend(series(5, &[7.0]));

        let result = reconcile(&totals(&[4.0, 10.0]), &records);

        assert_eq!(result.rows.len(), 3);
        assert_eq!(result.rows[0].difference, Some(1.0));
        assert_eq!(result.rows[1].category_sum, None);
        assert_eq!(result.rows[1].difference, None);
        assert_eq!(result.rows[2].period, period(5));
        assert_eq!(result.rows[2].total, None);
        assert_eq!(result.mismatches().count(), 3);
    }
}
