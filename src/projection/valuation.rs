//! Exit-multiple terminal value, NPV and IRR over the projection horizon

use serde::{Deserialize, Serialize};

use super::cashflows::YearlyProjection;
use super::irr::{calculate_irr, calculate_npv, IrrOptions};
use crate::assumptions::FinancialAssumptions;

/// Valuation metrics for a projection
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// Final-year EBITDA x multiple
    pub terminal_value: f64,
    pub npv: f64,
    pub irr: f64,
    /// NPV at the reported IRR
    pub irr_residual_npv: f64,
    pub irr_iterations: u32,
    pub irr_converged: bool,
    pub ebitda_multiple: f64,
    pub discount_rate: f64,
}

/// Cash flows used for NPV: each year's FCF, then terminal value
pub fn valuation_cash_flows(years: &[YearlyProjection], terminal_value: f64) -> Vec<f64> {
    let mut flows: Vec<f64> = years.iter().map(|y| y.cash_flow.fcf).collect();
    flows.push(terminal_value);
    flows
}

/// Value a projection
///
/// NPV discounts `[fcf_1, ..., fcf_n, terminal]` from t = 0. IRR uses the
/// same series prefixed by the negated first-year capital requirement as the
/// initial investment.
pub fn calculate_valuation(
    years: &[YearlyProjection],
    financial: &FinancialAssumptions,
    irr_options: &IrrOptions,
) -> Valuation {
    let final_ebitda = years.last().map(|y| y.ebitda.value).unwrap_or(0.0);
    let terminal_value = final_ebitda * financial.ebitda_multiple;

    let cash_flows = valuation_cash_flows(years, terminal_value);
    let npv = calculate_npv(&cash_flows, financial.discount_rate);

    let initial_investment = years.first().map(|y| y.capital_requirement).unwrap_or(0.0);
    let mut irr_flows = Vec::with_capacity(cash_flows.len() + 1);
    irr_flows.push(-initial_investment);
    irr_flows.extend_from_slice(&cash_flows);
    let irr = calculate_irr(&irr_flows, irr_options);

    Valuation {
        terminal_value,
        npv,
        irr: irr.rate,
        irr_residual_npv: irr.residual_npv,
        irr_iterations: irr.iterations,
        irr_converged: irr.converged,
        ebitda_multiple: financial.ebitda_multiple,
        discount_rate: financial.discount_rate,
    }
}
