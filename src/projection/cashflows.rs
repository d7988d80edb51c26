//! Projection output structures

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ebitda::Ebitda;
use super::irr::calculate_cagr;
use super::valuation::Valuation;
use crate::scenario::Scenario;

/// Revenue by stream for one category, division or year
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueBreakdown {
    pub rental: f64,
    pub lease: f64,
    pub sale: f64,
    /// Interest income (lending portfolios only)
    pub interest: f64,
    pub total: f64,
}

impl RevenueBreakdown {
    pub fn new(rental: f64, lease: f64, sale: f64, interest: f64) -> Self {
        Self {
            rental,
            lease,
            sale,
            interest,
            total: rental + lease + sale + interest,
        }
    }

    /// Accumulate another breakdown into this one
    pub fn add(&mut self, other: &RevenueBreakdown) {
        self.rental += other.rental;
        self.lease += other.lease;
        self.sale += other.sale;
        self.interest += other.interest;
        self.total += other.total;
    }
}

/// Revenue detail for one category in one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRevenue {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub units: u32,
    /// Scenario utilization (rental categories only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utilization: Option<f64>,
    pub revenue: RevenueBreakdown,
}

/// Operating expense buckets for one year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatingExpenses {
    pub buckets: BTreeMap<String, f64>,
    pub total: f64,
}

impl OperatingExpenses {
    /// Sum bucket-by-bucket with another expense set
    pub fn merge(&mut self, other: &OperatingExpenses) {
        for (name, amount) in &other.buckets {
            *self.buckets.entry(name.clone()).or_insert(0.0) += amount;
        }
        self.total += other.total;
    }
}

/// Free cash flow build-up for one year
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FreeCashFlow {
    pub ebitda: f64,
    pub depreciation: f64,
    pub ebit: f64,
    pub taxes: f64,
    pub nopat: f64,
    pub capex: f64,
    pub working_capital_change: f64,
    pub fcf: f64,
}

impl FreeCashFlow {
    /// EBIT = EBITDA - D; taxes = EBIT * t; FCF = NOPAT + D - capex - dWC
    ///
    /// Taxes are charged on negative EBIT as well (a tax credit), with no
    /// floor at zero.
    pub fn calculate(
        ebitda: f64,
        depreciation: f64,
        tax_rate: f64,
        capex: f64,
        working_capital_change: f64,
    ) -> Self {
        let ebit = ebitda - depreciation;
        let taxes = ebit * tax_rate;
        let nopat = ebit - taxes;
        let fcf = nopat + depreciation - capex - working_capital_change;

        Self {
            ebitda,
            depreciation,
            ebit,
            taxes,
            nopat,
            capex,
            working_capital_change,
            fcf,
        }
    }
}

/// All figures for a single projection year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyProjection {
    pub year: u32,

    pub revenue: RevenueBreakdown,

    /// Per-category detail (empty when detailed output is off)
    #[serde(default)]
    pub categories: Vec<CategoryRevenue>,

    pub operating_expenses: OperatingExpenses,

    pub ebitda: Ebitda,

    pub depreciation: f64,

    /// Purchase value of net new units over the prior year
    pub capital_requirement: f64,

    pub cash_flow: FreeCashFlow,
}

/// Whole-run totals across all years
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionTotals {
    pub revenue: f64,
    pub operating_expenses: f64,
    pub ebitda: f64,
    pub depreciation: f64,
    pub capital_requirement: f64,
    pub taxes: f64,
    pub free_cash_flow: f64,
}

impl ProjectionTotals {
    pub fn from_years(years: &[YearlyProjection]) -> Self {
        years.iter().fold(Self::default(), |mut acc, y| {
            acc.revenue += y.revenue.total;
            acc.operating_expenses += y.operating_expenses.total;
            acc.ebitda += y.ebitda.value;
            acc.depreciation += y.depreciation;
            acc.capital_requirement += y.capital_requirement;
            acc.taxes += y.cash_flow.taxes;
            acc.free_cash_flow += y.cash_flow.fcf;
            acc
        })
    }
}

/// Complete projection result for a division, portfolio or combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Division, portfolio or "combined"
    pub label: String,

    pub scenario: Scenario,

    /// Yearly rows in ascending year order
    pub years: Vec<YearlyProjection>,

    pub totals: ProjectionTotals,

    /// Whole-run revenue by category key
    pub revenue_by_category: BTreeMap<String, f64>,

    /// Whole-run revenue by brand/group tag
    pub revenue_by_group: BTreeMap<String, f64>,

    pub valuation: Valuation,
}

impl ProjectionResult {
    /// Row for a specific year
    pub fn year(&self, year: u32) -> Option<&YearlyProjection> {
        self.years.iter().find(|y| y.year == year)
    }

    /// Compound annual growth of revenue from first to last year
    pub fn revenue_cagr(&self) -> f64 {
        match (self.years.first(), self.years.last()) {
            (Some(first), Some(last)) => calculate_cagr(
                first.revenue.total,
                last.revenue.total,
                (self.years.len() - 1) as f64,
            ),
            _ => 0.0,
        }
    }

    /// Mean of the yearly EBITDA margins (as fractions)
    pub fn average_ebitda_margin(&self) -> f64 {
        if self.years.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.years.iter().map(|y| y.ebitda.margin).sum();
        sum / self.years.len() as f64
    }
}

/// Combined result plus each division's own projection for drill-down
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedProjectionResult {
    pub combined: ProjectionResult,
    pub divisions: Vec<ProjectionResult>,
}

impl CombinedProjectionResult {
    pub fn division(&self, label: &str) -> Option<&ProjectionResult> {
        self.divisions.iter().find(|d| d.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fcf_formula() {
        let cf = FreeCashFlow::calculate(1_000_000.0, 200_000.0, 0.27, 300_000.0, 50_000.0);

        assert_relative_eq!(cf.ebit, 800_000.0, max_relative = 1e-12);
        assert_relative_eq!(cf.taxes, 216_000.0, max_relative = 1e-12);
        assert_relative_eq!(cf.nopat, 584_000.0, max_relative = 1e-12);
        // 584,000 + 200,000 - 300,000 - 50,000
        assert_relative_eq!(cf.fcf, 434_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_negative_ebit_still_taxed() {
        let cf = FreeCashFlow::calculate(100.0, 300.0, 0.25, 0.0, 0.0);
        assert_relative_eq!(cf.ebit, -200.0, max_relative = 1e-12);
        assert_relative_eq!(cf.taxes, -50.0, max_relative = 1e-12);
        assert_relative_eq!(cf.nopat, -150.0, max_relative = 1e-12);
        assert_relative_eq!(cf.fcf, 150.0, max_relative = 1e-12);
    }

    #[test]
    fn test_revenue_breakdown_accumulates() {
        let mut total = RevenueBreakdown::default();
        total.add(&RevenueBreakdown::new(10.0, 5.0, 1.0, 0.0));
        total.add(&RevenueBreakdown::new(0.0, 0.0, 0.0, 4.0));
        assert_relative_eq!(total.total, 20.0, max_relative = 1e-12);
        assert_relative_eq!(total.interest, 4.0, max_relative = 1e-12);
    }

    #[test]
    fn test_opex_merge_by_bucket() {
        let mut a = OperatingExpenses {
            buckets: [("maintenance".to_string(), 8.0)].into_iter().collect(),
            total: 8.0,
        };
        let b = OperatingExpenses {
            buckets: [("maintenance".to_string(), 12.0), ("storage".to_string(), 3.0)]
                .into_iter()
                .collect(),
            total: 15.0,
        };
        a.merge(&b);
        assert_relative_eq!(a.buckets["maintenance"], 20.0, max_relative = 1e-12);
        assert_relative_eq!(a.buckets["storage"], 3.0, max_relative = 1e-12);
        assert_relative_eq!(a.total, 23.0, max_relative = 1e-12);
    }
}
