//! Lending portfolio: flat interest revenue and principal/revenue costs

use log::debug;

use super::cashflows::{CategoryRevenue, OperatingExpenses, RevenueBreakdown};
use super::opex::operating_expenses;
use crate::assumptions::{CostSchedule, FinanceConfig};
use crate::error::Result;
use crate::fleet::UnitCounts;

/// One year of a lending book
#[derive(Debug, Clone, Default)]
pub struct PortfolioYear {
    pub products: Vec<CategoryRevenue>,
    pub revenue: RevenueBreakdown,
    /// Outstanding principal across all products
    pub principal: f64,
    pub operating_expenses: OperatingExpenses,
}

/// Interest revenue and costs for one year of contract counts
///
/// Revenue per product is `contracts * average_loan_size * annual_rate`.
/// Principal-based buckets apply to outstanding principal; revenue-based
/// buckets apply to interest revenue.
pub fn portfolio_year(finance: &FinanceConfig, contracts: Option<&UnitCounts>) -> Result<PortfolioYear> {
    let mut year = PortfolioYear::default();

    for product in &finance.products {
        let count = contracts
            .and_then(|c| c.get(&product.key))
            .copied()
            .unwrap_or(0);
        let principal = count as f64 * finance.average_loan_size;
        let interest = principal * product.annual_rate;

        let revenue = RevenueBreakdown::new(0.0, 0.0, 0.0, interest);
        year.revenue.add(&revenue);
        year.principal += principal;
        year.products.push(CategoryRevenue {
            key: product.key.clone(),
            group: None,
            units: count,
            utilization: None,
            revenue,
        });
    }

    let no_overrides = CostSchedule::new();
    let mut costs = operating_expenses(year.principal, &finance.principal_costs, &no_overrides, &finance.name)?;
    let revenue_costs =
        operating_expenses(year.revenue.total, &finance.revenue_costs, &no_overrides, &finance.name)?;
    costs.merge(&revenue_costs);
    year.operating_expenses = costs;

    debug!(
        "{} book: principal {:.2}, interest {:.2}, costs {:.2}",
        finance.name, year.principal, year.revenue.total, year.operating_expenses.total
    );
    Ok(year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_year_book() {
        let finance = FinanceConfig::equipment_finance();
        let year = portfolio_year(&finance, finance.default_portfolio.year(2025)).unwrap();

        // 50 * 200k * 6.5% + 30 * 200k * 5.5% + 20 * 200k * 7.5%
        let interest = 650_000.0 + 330_000.0 + 300_000.0;
        assert_relative_eq!(year.revenue.interest, interest, max_relative = 1e-12);
        assert_relative_eq!(year.revenue.total, interest, max_relative = 1e-12);
        assert_relative_eq!(year.principal, 20_000_000.0, max_relative = 1e-12);

        // funding 3.5% + loss 2% of principal, admin 1.5% + compliance 0.5% of revenue
        let costs = 20_000_000.0 * 0.055 + interest * 0.02;
        assert_relative_eq!(year.operating_expenses.total, costs, max_relative = 1e-12);
        assert_eq!(year.operating_expenses.buckets.len(), 4);
    }

    #[test]
    fn test_empty_book() {
        let finance = FinanceConfig::equipment_finance();
        let year = portfolio_year(&finance, None).unwrap();
        assert_eq!(year.revenue.total, 0.0);
        assert_eq!(year.operating_expenses.total, 0.0);
        assert!(year.products.iter().all(|p| p.units == 0));
    }
}
