//! CSV and JSON export of projection results
//!
//! Numbers are written with full `f64` precision; rounding is left to
//! whatever renders the files.

use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::projection::{ProjectionResult, YearlyProjection};

/// One yearly row of a projection in CSV form
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct YearRow<'a> {
    label: &'a str,
    scenario: &'a str,
    year: u32,
    rental_revenue: f64,
    lease_revenue: f64,
    sale_revenue: f64,
    interest_revenue: f64,
    total_revenue: f64,
    operating_expenses: f64,
    ebitda: f64,
    ebitda_margin: f64,
    depreciation: f64,
    ebit: f64,
    taxes: f64,
    nopat: f64,
    capital_requirement: f64,
    working_capital_change: f64,
    free_cash_flow: f64,
}

impl<'a> YearRow<'a> {
    fn new(result: &'a ProjectionResult, y: &YearlyProjection) -> Self {
        Self {
            label: &result.label,
            scenario: result.scenario.as_str(),
            year: y.year,
            rental_revenue: y.revenue.rental,
            lease_revenue: y.revenue.lease,
            sale_revenue: y.revenue.sale,
            interest_revenue: y.revenue.interest,
            total_revenue: y.revenue.total,
            operating_expenses: y.operating_expenses.total,
            ebitda: y.ebitda.value,
            ebitda_margin: y.ebitda.margin,
            depreciation: y.depreciation,
            ebit: y.cash_flow.ebit,
            taxes: y.cash_flow.taxes,
            nopat: y.cash_flow.nopat,
            capital_requirement: y.capital_requirement,
            working_capital_change: y.cash_flow.working_capital_change,
            free_cash_flow: y.cash_flow.fcf,
        }
    }
}

/// Whole-run summary of a projection in CSV form
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ValuationRow<'a> {
    label: &'a str,
    scenario: &'a str,
    total_revenue: f64,
    total_ebitda: f64,
    average_ebitda_margin: f64,
    revenue_cagr: f64,
    total_free_cash_flow: f64,
    terminal_value: f64,
    npv: f64,
    irr: f64,
    irr_residual_npv: f64,
    irr_converged: bool,
}

impl<'a> From<&'a ProjectionResult> for ValuationRow<'a> {
    fn from(result: &'a ProjectionResult) -> Self {
        Self {
            label: &result.label,
            scenario: result.scenario.as_str(),
            total_revenue: result.totals.revenue,
            total_ebitda: result.totals.ebitda,
            average_ebitda_margin: result.average_ebitda_margin(),
            revenue_cagr: result.revenue_cagr(),
            total_free_cash_flow: result.totals.free_cash_flow,
            terminal_value: result.valuation.terminal_value,
            npv: result.valuation.npv,
            irr: result.valuation.irr,
            irr_residual_npv: result.valuation.irr_residual_npv,
            irr_converged: result.valuation.irr_converged,
        }
    }
}

/// Write every year of every result as one CSV table
pub fn write_yearly_csv<W: Write>(results: &[&ProjectionResult], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for result in results {
        for year in &result.years {
            csv.serialize(YearRow::new(result, year))?;
        }
    }
    csv.flush()?;
    Ok(())
}

/// Write one valuation summary row per result
pub fn write_valuation_csv<W: Write>(results: &[&ProjectionResult], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for result in results {
        csv.serialize(ValuationRow::from(*result))?;
    }
    csv.flush()?;
    Ok(())
}

/// Pretty-printed JSON for any result shape
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn from_json(json: &str) -> Result<ProjectionResult> {
    Ok(serde_json::from_str(json)?)
}
