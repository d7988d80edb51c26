//! Net Present Value, Internal Rate of Return and growth rate helpers
//!
//! Used by the valuation step on yearly free cash flows

use log::warn;
use serde::{Deserialize, Serialize};

/// Newton-Raphson settings for IRR
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrOptions {
    /// Starting rate
    pub initial_guess: f64,
    /// Stop once |NPV(rate)| falls below this
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for IrrOptions {
    fn default() -> Self {
        Self {
            initial_guess: 0.10,
            tolerance: 1e-4,
            max_iterations: 100,
        }
    }
}

/// Outcome of an IRR search
///
/// `rate` is always the last iterate. When `converged` is false the caller
/// should check `residual_npv` before trusting it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrSolution {
    pub rate: f64,
    /// NPV of the cash flows at `rate`
    pub residual_npv: f64,
    pub iterations: u32,
    pub converged: bool,
}

/// Calculate NPV of a series of cash flows
///
/// Cash flow `t` is discounted by `(1 + rate)^t`, so the first entry is
/// undiscounted.
pub fn calculate_npv(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        let discount = (1.0 + rate).powi(t as i32);
        npv += cf / discount;
        if t > 0 {
            dnpv -= (t as f64) * cf / ((1.0 + rate).powi(t as i32 + 1));
        }
    }

    (npv, dnpv)
}

/// Calculate the Internal Rate of Return (IRR) for a series of cash flows
/// using the Newton-Raphson method.
///
/// Iterates from `options.initial_guess` until `|NPV| < tolerance` or the
/// iteration cap is hit. A zero (or non-finite) derivative, or a step that
/// leaves the finite range, stops the search early. Non-convergence is not an
/// error: the last rate is returned with `converged == false`.
///
/// # Arguments
/// * `cashflows` - Periodic cash flows (positive = inflow, negative = outflow)
/// * `options` - Starting guess, tolerance and iteration cap
pub fn calculate_irr(cashflows: &[f64], options: &IrrOptions) -> IrrSolution {
    let mut rate = options.initial_guess;
    let mut iterations = 0;

    while iterations < options.max_iterations {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);

        if npv.abs() < options.tolerance {
            return IrrSolution {
                rate,
                residual_npv: npv,
                iterations,
                converged: true,
            };
        }

        if dnpv == 0.0 || !dnpv.is_finite() {
            warn!("IRR derivative vanished at rate {:.6}; stopping after {} iterations", rate, iterations);
            break;
        }

        let new_rate = rate - npv / dnpv;
        if !new_rate.is_finite() {
            warn!("IRR step diverged from rate {:.6}; stopping after {} iterations", rate, iterations);
            break;
        }

        rate = new_rate;
        iterations += 1;
    }

    let residual_npv = calculate_npv(cashflows, rate);
    let converged = residual_npv.abs() < options.tolerance;
    if !converged {
        warn!(
            "IRR did not converge after {} iterations (rate {:.6}, residual NPV {:.4})",
            iterations, rate, residual_npv
        );
    }

    IrrSolution {
        rate,
        residual_npv,
        iterations,
        converged,
    }
}

/// Compound annual growth rate between two values
///
/// Returns 0 when the start value or period count is 0, or when the values
/// have opposite signs (no real growth rate exists).
pub fn calculate_cagr(start_value: f64, end_value: f64, years: f64) -> f64 {
    if start_value == 0.0 || years == 0.0 {
        return 0.0;
    }
    let ratio = end_value / start_value;
    if ratio < 0.0 {
        return 0.0;
    }
    ratio.powf(1.0 / years) - 1.0
}
