//! Capital requirement from year-over-year fleet growth

use serde::{Deserialize, Serialize};

use crate::fleet::{FleetSnapshot, UnitCounts};

/// What the first projection year is compared against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum CapitalBaseline {
    /// No existing fleet: year 1 is the full initial investment
    #[default]
    Empty,
    /// Units already owned before the first projection year
    Units(UnitCounts),
}

impl CapitalBaseline {
    fn units(&self) -> Option<&UnitCounts> {
        match self {
            CapitalBaseline::Empty => None,
            CapitalBaseline::Units(units) => Some(units),
        }
    }
}

fn count(units: Option<&UnitCounts>, key: &str) -> u32 {
    units.and_then(|u| u.get(key)).copied().unwrap_or(0)
}

/// Capital needed for one year: `sum(max(0, current - prior) * price)`
///
/// A shrinking category contributes nothing; there is no disposal credit.
pub fn year_capital(prices: &[(&str, f64)], current: Option<&UnitCounts>, prior: Option<&UnitCounts>) -> f64 {
    prices
        .iter()
        .map(|&(key, price)| {
            let new_units = count(current, key).saturating_sub(count(prior, key));
            new_units as f64 * price
        })
        .sum()
}

/// Capital requirement for each projection year, in year order
pub fn capital_requirements(
    prices: &[(&str, f64)],
    fleet: &FleetSnapshot,
    years: &[u32],
    baseline: &CapitalBaseline,
) -> Vec<f64> {
    let mut prior = baseline.units();
    years
        .iter()
        .map(|&year| {
            let current = fleet.year(year);
            let capital = year_capital(prices, current, prior);
            prior = current;
            capital
        })
        .collect()
}
