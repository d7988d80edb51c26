//! Lending portfolio configuration: loan products and cost structure

use serde::{Deserialize, Serialize};

use super::division::{cost_schedule, CostSchedule};
use crate::error::{ProjectionError, Result};
use crate::fleet::FleetSnapshot;

/// A loan or lease product in the finance book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProduct {
    pub key: String,
    pub name: String,
    /// Flat annual interest rate charged on principal
    pub annual_rate: f64,
}

impl LoanProduct {
    pub fn new(key: &str, name: &str, annual_rate: f64) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            annual_rate,
        }
    }
}

/// Equipment finance portfolio configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceConfig {
    pub name: String,

    pub products: Vec<LoanProduct>,

    /// Principal per contract
    pub average_loan_size: f64,

    /// Costs charged as a fraction of outstanding principal
    pub principal_costs: CostSchedule,

    /// Costs charged as a fraction of interest revenue
    pub revenue_costs: CostSchedule,

    /// Contract counts by year and product key
    #[serde(default)]
    pub default_portfolio: FleetSnapshot,
}

impl FinanceConfig {
    pub fn product(&self, key: &str) -> Option<&LoanProduct> {
        self.products.iter().find(|p| p.key == key)
    }

    /// Capital deployed per new contract
    pub fn unit_prices(&self) -> Vec<(&str, f64)> {
        self.products
            .iter()
            .map(|p| (p.key.as_str(), self.average_loan_size))
            .collect()
    }

    /// Reject portfolios that mention products this book does not offer
    pub fn check_portfolio(&self, portfolio: &FleetSnapshot) -> Result<()> {
        for key in portfolio.category_keys() {
            if self.product(key).is_none() {
                return Err(ProjectionError::UnknownCategory {
                    division: self.name.clone(),
                    category: key.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.average_loan_size.is_finite() || self.average_loan_size < 0.0 {
            return Err(ProjectionError::invalid_config(format!(
                "average loan size must be a non-negative number in '{}'",
                self.name
            )));
        }
        let fractions = self
            .products
            .iter()
            .map(|p| p.annual_rate)
            .chain(self.principal_costs.values().copied())
            .chain(self.revenue_costs.values().copied());
        for value in fractions {
            if !value.is_finite() {
                return Err(ProjectionError::invalid_config(format!(
                    "non-finite rate in '{}'",
                    self.name
                )));
            }
        }
        self.check_portfolio(&self.default_portfolio)
    }

    /// Equipment finance book with loans, leases and credit lines
    pub fn equipment_finance() -> Self {
        Self {
            name: "finance".to_string(),
            products: vec![
                LoanProduct::new("equipmentLoan", "Equipment Loan", 0.065),
                LoanProduct::new("lease", "Equipment Lease", 0.055),
                LoanProduct::new("lineOfCredit", "Line of Credit", 0.075),
            ],
            average_loan_size: 200_000.0,
            principal_costs: cost_schedule(&[("fundingCost", 0.035), ("lossProvision", 0.02)]),
            revenue_costs: cost_schedule(&[("administrative", 0.015), ("compliance", 0.005)]),
            default_portfolio: FleetSnapshot::from_rows(&[
                (2025, &[("equipmentLoan", 50), ("lease", 30), ("lineOfCredit", 20)]),
                (2026, &[("equipmentLoan", 75), ("lease", 45), ("lineOfCredit", 30)]),
                (2027, &[("equipmentLoan", 100), ("lease", 60), ("lineOfCredit", 40)]),
                (2028, &[("equipmentLoan", 125), ("lease", 75), ("lineOfCredit", 50)]),
                (2029, &[("equipmentLoan", 150), ("lease", 90), ("lineOfCredit", 60)]),
                (2030, &[("equipmentLoan", 175), ("lease", 105), ("lineOfCredit", 70)]),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_finance_validates() {
        let finance = FinanceConfig::equipment_finance();
        finance.validate().unwrap();
        assert_eq!(finance.default_portfolio.units(2028, "lease"), 75);
    }

    #[test]
    fn test_unknown_product_rejected() {
        let finance = FinanceConfig::equipment_finance();
        let mut portfolio = FleetSnapshot::new();
        portfolio.set_units(2025, "mortgage", 1);
        assert!(matches!(
            finance.check_portfolio(&portfolio),
            Err(ProjectionError::UnknownCategory { .. })
        ));
    }
}
