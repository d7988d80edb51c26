//! Rental, lease and sale revenue from unit counts

use log::debug;

use super::cashflows::{CategoryRevenue, RevenueBreakdown};
use crate::assumptions::{AssetCategory, DivisionConfig};
use crate::error::Result;
use crate::fleet::{RevenueSplit, UnitCounts};
use crate::scenario::Scenario;

/// Revenue for one division in one year
#[derive(Debug, Clone, Default)]
pub struct YearRevenue {
    pub categories: Vec<CategoryRevenue>,
    pub total: RevenueBreakdown,
}

/// Annual revenue streams for one category
///
/// - rental: `monthly_rate * units * utilization * rental% * 12`
/// - lease: `price * units * lease_monthly_rate * lease% * 12`
/// - sale: `price * units * disposal_rate * sale%`
pub fn category_revenue(
    category: &AssetCategory,
    units: u32,
    utilization: f64,
    split: &RevenueSplit,
    lease_monthly_rate: f64,
    disposal_rate: f64,
) -> RevenueBreakdown {
    let units = units as f64;

    let monthly_rental = category.monthly_rental_rate * units * utilization * (split.rental / 100.0);
    let annual_rental = monthly_rental * 12.0;

    let monthly_lease = category.purchase_price * units * lease_monthly_rate * (split.lease / 100.0);
    let annual_lease = monthly_lease * 12.0;

    let sale = category.purchase_price * units * disposal_rate * (split.sale / 100.0);

    RevenueBreakdown::new(annual_rental, annual_lease, sale, 0.0)
}

/// Revenue for every category of a division in one year
///
/// Categories missing from `units` count as zero units. The scenario must
/// have a utilization for every category, even those with zero units.
pub fn division_year_revenue(
    division: &DivisionConfig,
    units: Option<&UnitCounts>,
    split: &RevenueSplit,
    scenario: Scenario,
) -> Result<YearRevenue> {
    let mut year = YearRevenue::default();

    for category in &division.categories {
        let count = units
            .and_then(|u| u.get(&category.key))
            .copied()
            .unwrap_or(0);
        let utilization = category.utilization(scenario)?;

        let revenue = category_revenue(
            category,
            count,
            utilization,
            split,
            division.lease_monthly_rate,
            division.disposal_rate,
        );
        year.total.add(&revenue);
        year.categories.push(CategoryRevenue {
            key: category.key.clone(),
            group: category.group.clone(),
            units: count,
            utilization: Some(utilization),
            revenue,
        });
    }

    debug!(
        "{} revenue: rental {:.2}, lease {:.2}, sale {:.2}",
        division.name, year.total.rental, year.total.lease, year.total.sale
    );
    Ok(year)
}
