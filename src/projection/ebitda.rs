//! EBITDA and margin

use serde::{Deserialize, Serialize};

/// EBITDA with revenue-relative margin
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ebitda {
    pub value: f64,
    /// EBITDA / revenue, 0 when revenue is 0
    pub margin: f64,
    /// Margin x 100 for display
    pub margin_percent: f64,
}

impl Ebitda {
    pub fn calculate(revenue: f64, operating_expenses: f64) -> Self {
        let value = revenue - operating_expenses;
        let margin = if revenue != 0.0 { value / revenue } else { 0.0 };

        Self {
            value,
            margin,
            margin_percent: margin * 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin() {
        let e = Ebitda::calculate(1000.0, 180.0);
        assert_eq!(e.value, 820.0);
        assert!((e.margin - 0.82).abs() < 1e-12);
        assert!((e.margin_percent - 82.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_revenue_margin_is_zero() {
        let e = Ebitda::calculate(0.0, 0.0);
        assert_eq!(e.value, 0.0);
        assert_eq!(e.margin, 0.0);
        assert_eq!(e.margin_percent, 0.0);
    }
}
