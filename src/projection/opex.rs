//! Operating expenses as fixed fractions of a base amount

use super::cashflows::OperatingExpenses;
use crate::assumptions::CostSchedule;
use crate::error::{ProjectionError, Result};

/// Apply a cost schedule (with overrides) to a base amount
///
/// Each override replaces the configured fraction for its bucket. Overrides
/// naming a bucket the schedule does not have are rejected.
/// `total = base * sum(fractions)`.
pub fn operating_expenses(
    base: f64,
    schedule: &CostSchedule,
    overrides: &CostSchedule,
    division: &str,
) -> Result<OperatingExpenses> {
    if let Some(bucket) = overrides.keys().find(|k| !schedule.contains_key(*k)) {
        return Err(ProjectionError::UnknownCostBucket {
            division: division.to_string(),
            bucket: bucket.clone(),
        });
    }

    let mut expenses = OperatingExpenses::default();
    let mut fraction_sum = 0.0;

    for (name, default_fraction) in schedule {
        let fraction = overrides.get(name).copied().unwrap_or(*default_fraction);
        fraction_sum += fraction;
        expenses.buckets.insert(name.clone(), base * fraction);
    }
    expenses.total = base * fraction_sum;

    Ok(expenses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::cost_schedule;
    use approx::assert_relative_eq;

    fn transport_costs() -> CostSchedule {
        cost_schedule(&[
            ("maintenance", 0.08),
            ("insurance", 0.03),
            ("storage", 0.02),
            ("administrative", 0.05),
        ])
    }

    #[test]
    fn test_buckets_and_total() {
        let opex = operating_expenses(1_000_000.0, &transport_costs(), &CostSchedule::new(), "transport")
            .unwrap();

        assert_relative_eq!(opex.buckets["maintenance"], 80_000.0, max_relative = 1e-12);
        assert_relative_eq!(opex.buckets["insurance"], 30_000.0, max_relative = 1e-12);
        assert_relative_eq!(opex.total, 180_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_override_replaces_bucket() {
        let overrides = cost_schedule(&[("maintenance", 0.10)]);
        let opex = operating_expenses(1_000_000.0, &transport_costs(), &overrides, "transport").unwrap();

        assert_relative_eq!(opex.buckets["maintenance"], 100_000.0, max_relative = 1e-12);
        assert_relative_eq!(opex.buckets["storage"], 20_000.0, max_relative = 1e-12);
        assert_relative_eq!(opex.total, 200_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_unknown_override_rejected() {
        let overrides = cost_schedule(&[("marketing", 0.10)]);
        let err = operating_expenses(1.0, &transport_costs(), &overrides, "transport").unwrap_err();
        assert!(matches!(err, ProjectionError::UnknownCostBucket { .. }));
    }

    #[test]
    fn test_zero_revenue_zero_costs() {
        let opex = operating_expenses(0.0, &transport_costs(), &CostSchedule::new(), "transport").unwrap();
        assert_eq!(opex.total, 0.0);
        assert!(opex.buckets.values().all(|v| *v == 0.0));
    }
}
