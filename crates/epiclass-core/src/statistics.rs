//! Measures of association for a 2x2 exposure/outcome table.
//!
//! Confidence intervals use the log method: Katz for the risk ratio and
//! Woolf for the odds ratio.

use serde::{Deserialize, Serialize};

use crate::error::StatisticsError;

/// z for a two-sided 95% interval.
pub const Z_95: f64 = 1.959_963_984_540_054;

/// Counts of a cohort or case-control study.
///
/// ```text
///               outcome   no outcome
/// exposed          a          b
/// unexposed        c          d
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoByTwo {
    pub exposed_cases: f64,
    pub exposed_noncases: f64,
    pub unexposed_cases: f64,
    pub unexposed_noncases: f64,
}

/// A point estimate with its 95% confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Measure {
    /// Whether the interval excludes the null value `null`.
    pub fn excludes(&self, null: f64) -> bool {
        self.lower > null || self.upper < null
    }
}

impl TwoByTwo {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            exposed_cases: a,
            exposed_noncases: b,
            unexposed_cases: c,
            unexposed_noncases: d,
        }
    }

    pub fn exposed_total(&self) -> f64 {
        self.exposed_cases + self.exposed_noncases
    }

    pub fn unexposed_total(&self) -> f64 {
        self.unexposed_cases + self.unexposed_noncases
    }

    /// Risk (attack rate) among the exposed.
    pub fn exposed_risk(&self) -> Result<f64, StatisticsError> {
        if self.exposed_total() <= 0.0 {
            return Err(StatisticsError::EmptyGroup { group: "exposed" });
        }
        Ok(self.exposed_cases / self.exposed_total())
    }

    /// Risk (attack rate) among the unexposed.
    pub fn unexposed_risk(&self) -> Result<f64, StatisticsError> {
        if self.unexposed_total() <= 0.0 {
            return Err(StatisticsError::EmptyGroup { group: "unexposed" });
        }
        Ok(self.unexposed_cases / self.unexposed_total())
    }

    pub fn risk_ratio(&self) -> Result<Measure, StatisticsError> {
        let r1 = self.exposed_risk()?;
        let r0 = self.unexposed_risk()?;
        if self.exposed_cases == 0.0 {
            return Err(StatisticsError::ZeroCell {
                measure: "risk ratio",
                cell: "exposed cases",
            });
        }
        if self.unexposed_cases == 0.0 {
            return Err(StatisticsError::ZeroCell {
                measure: "risk ratio",
                cell: "unexposed cases",
            });
        }

        let estimate = r1 / r0;
        let se = (1.0 / self.exposed_cases - 1.0 / self.exposed_total()
            + 1.0 / self.unexposed_cases
            - 1.0 / self.unexposed_total())
        .sqrt();
        Ok(log_interval(estimate, se))
    }

    pub fn odds_ratio(&self) -> Result<Measure, StatisticsError> {
        let cells = [
            (self.exposed_cases, "exposed cases"),
            (self.exposed_noncases, "exposed non-cases"),
            (self.unexposed_cases, "unexposed cases"),
            (self.unexposed_noncases, "unexposed non-cases"),
        ];
        if let Some((_, cell)) = cells.iter().find(|(n, _)| *n == 0.0) {
            return Err(StatisticsError::ZeroCell {
                measure: "odds ratio",
                cell: *cell,
            });
        }

        let estimate = (self.exposed_cases * self.unexposed_noncases)
            / (self.exposed_noncases * self.unexposed_cases);
        let se = cells.iter().map(|(n, _)| 1.0 / n).sum::<f64>().sqrt();
        Ok(log_interval(estimate, se))
    }

    /// Excess risk in the exposed, with a Wald interval.
    pub fn risk_difference(&self) -> Result<Measure, StatisticsError> {
        let r1 = self.exposed_risk()?;
        let r0 = self.unexposed_risk()?;
        let estimate = r1 - r0;
        let se = (r1 * (1.0 - r1) / self.exposed_total()
            + r0 * (1.0 - r0) / self.unexposed_total())
        .sqrt();
        Ok(Measure {
            estimate,
            lower: estimate - Z_95 * se,
            upper: estimate + Z_95 * se,
        })
    }

    /// Table with 0.5 added to every cell (Haldane-Anscombe correction).
    pub fn with_continuity_correction(&self) -> Self {
        Self::new(
            self.exposed_cases + 0.5,
            self.exposed_noncases + 0.5,
            self.unexposed_cases + 0.5,
            self.unexposed_noncases + 0.5,
        )
    }
}

fn log_interval(estimate: f64, se: f64) -> Measure {
    let ln = estimate.ln();
    Measure {
        estimate,
        lower: (ln - Z_95 * se).exp(),
        upper: (ln + Z_95 * se).exp(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Classic food-borne outbreak teaching table.
    fn potato_salad() -> TwoByTwo {
        TwoByTwo::new(30.0, 10.0, 5.0, 55.0)
    }

    #[test]
    fn risks_per_group() {
        let t = potato_salad();
        assert!((t.exposed_risk().unwrap() - 0.75).abs() < 1e-12);
        assert!((t.unexposed_risk().unwrap() - 5.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn risk_ratio_point_and_interval() {
        let rr = potato_salad().risk_ratio().unwrap();
        assert!((rr.estimate - 9.0).abs() < 1e-9);
        assert!(rr.lower < rr.estimate && rr.estimate < rr.upper);
        assert!(rr.excludes(1.0));
        assert!((rr.lower - 3.83).abs() < 0.05, "lower = {}", rr.lower);
        assert!((rr.upper - 21.13).abs() < 0.2, "upper = {}", rr.upper);
    }

    #[test]
    fn odds_ratio_point_and_interval() {
        let or = potato_salad().odds_ratio().unwrap();
        assert!((or.estimate - 33.0).abs() < 1e-9);
        assert!(or.excludes(1.0));
        assert!((or.lower - 10.3).abs() < 0.2, "lower = {}", or.lower);
    }

    #[test]
    fn null_association() {
        let t = TwoByTwo::new(10.0, 90.0, 10.0, 90.0);
        let rr = t.risk_ratio().unwrap();
        let or = t.odds_ratio().unwrap();
        assert!((rr.estimate - 1.0).abs() < 1e-12);
        assert!((or.estimate - 1.0).abs() < 1e-12);
        assert!(!rr.excludes(1.0));
        assert!(t.risk_difference().unwrap().estimate.abs() < 1e-12);
    }

    #[test]
    fn zero_cell_is_an_error() {
        let t = TwoByTwo::new(12.0, 0.0, 3.0, 40.0);
        let err = t.odds_ratio().unwrap_err();
        assert!(err.is_zero_cell());
        assert!(err.to_string().contains("exposed non-cases"));
        assert!(t.with_continuity_correction().odds_ratio().is_ok());
    }

    #[test]
    fn empty_group_is_an_error() {
        let t = TwoByTwo::new(0.0, 0.0, 3.0, 40.0);
        assert_eq!(
            t.risk_ratio().unwrap_err(),
            StatisticsError::EmptyGroup { group: "exposed" }
        );
    }
}
