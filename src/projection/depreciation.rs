//! Annual depreciation on gross purchase price

use crate::assumptions::DivisionConfig;
use crate::fleet::{FleetSnapshot, UnitCounts};

/// Depreciation for one division-year: sum of price * units * rate
///
/// The rate applies to gross purchase price every year, so units held past
/// their nominal life keep depreciating.
pub fn year_depreciation(division: &DivisionConfig, units: Option<&UnitCounts>) -> f64 {
    let Some(units) = units else {
        return 0.0;
    };

    division
        .categories
        .iter()
        .map(|category| {
            let count = units.get(&category.key).copied().unwrap_or(0);
            category.annual_depreciation(count)
        })
        .sum()
}

/// Depreciation for each projection year, in year order
pub fn depreciation_schedule(division: &DivisionConfig, fleet: &FleetSnapshot, years: &[u32]) -> Vec<f64> {
    years
        .iter()
        .map(|&year| year_depreciation(division, fleet.year(year)))
        .collect()
}
