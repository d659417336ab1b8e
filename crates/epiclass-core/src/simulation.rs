//! Deterministic discrete-time SEIR simulator.
//!
//! One step per day, mass-action mixing, transmission reduced by
//! time-triggered interventions. Compartments never go negative: every
//! update is clamped at zero.

use chrono::{Days, NaiveDate};

use crate::error::SimulationError;
use crate::model::{DaySnapshot, SimulationParams};

/// Population state carried from one day to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compartments {
    pub susceptible: f64,
    pub exposed: f64,
    pub infectious: f64,
    pub removed: f64,
}

impl Compartments {
    /// Day-zero state. Negative initial counts become zero and susceptibles
    /// absorb any excess, so the total never exceeds the population.
    pub fn initial(params: &SimulationParams) -> Self {
        let exposed = params.initial_exposed.max(0.0);
        let infectious = params.initial_infectious.max(0.0);
        let seeded = infectious + exposed;
        if seeded > params.population_size {
            tracing::warn!(
                "initial infectious + exposed ({seeded}) exceeds population size ({}); \
                 susceptibles clamped to zero",
                params.population_size
            );
        }
        Self {
            susceptible: (params.population_size - seeded).max(0.0),
            exposed,
            infectious,
            removed: 0.0,
        }
    }

    pub fn total(&self) -> f64 {
        self.susceptible + self.exposed + self.infectious + self.removed
    }
}

/// Flows computed for a single day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyFlows {
    pub new_exposures: f64,
    pub new_infectious: f64,
    pub new_recoveries: f64,
    pub new_deaths: f64,
}

/// Advance `state` by one day at transmission rate `beta`.
pub fn step(
    state: Compartments,
    params: &SimulationParams,
    beta: f64,
) -> (Compartments, DailyFlows) {
    let n = params.population_size;
    let flows = DailyFlows {
        new_exposures: beta * state.infectious * state.susceptible / n,
        new_infectious: params.incubation_rate * state.exposed,
        new_recoveries: params.recovery_rate * state.infectious,
        new_deaths: params.recovery_rate * state.infectious * params.fatality_fraction,
    };

    let next = Compartments {
        susceptible: (state.susceptible - flows.new_exposures).max(0.0),
        exposed: (state.exposed + flows.new_exposures - flows.new_infectious).max(0.0),
        infectious: (state.infectious + flows.new_infectious - flows.new_recoveries).max(0.0),
        removed: (state.removed + flows.new_recoveries - flows.new_deaths).max(0.0),
    };

    (next, flows)
}

fn check_finite(field: &'static str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::NonFinite { field, value })
    }
}

/// Run a full simulation and return one snapshot per day.
///
/// The result has exactly `horizon_days` entries. Snapshot `t` holds the
/// state after day `t`'s flows, dated `start_date + t`.
pub fn simulate(params: &SimulationParams) -> Result<Vec<DaySnapshot>, SimulationError> {
    check_finite("population_size", params.population_size)?;
    if params.population_size <= 0.0 {
        return Err(SimulationError::NonPositivePopulation(params.population_size));
    }
    check_finite("initial_infectious", params.initial_infectious)?;
    check_finite("initial_exposed", params.initial_exposed)?;
    check_finite("r0", params.r0)?;
    check_finite("incubation_rate", params.incubation_rate)?;
    check_finite("recovery_rate", params.recovery_rate)?;
    check_finite("fatality_fraction", params.fatality_fraction)?;

    tracing::debug!(
        population = params.population_size,
        r0 = params.r0,
        days = params.horizon_days,
        interventions = params.interventions.len(),
        "starting SEIR run"
    );

    let mut state = Compartments::initial(params);
    let mut snapshots = Vec::with_capacity(params.horizon_days as usize);

    for day in 0..params.horizon_days {
        let beta = params.effective_rate(day);
        let (next, flows) = step(state, params, beta);
        state = next;

        // Saturates at the last representable date.
        let date = params
            .start_date
            .checked_add_days(Days::new(u64::from(day)))
            .unwrap_or(NaiveDate::MAX);

        snapshots.push(DaySnapshot {
            day,
            date,
            susceptible: state.susceptible,
            exposed: state.exposed,
            infectious: state.infectious,
            removed: state.removed,
            new_exposures: flows.new_exposures,
            new_recoveries: flows.new_recoveries,
            new_deaths: flows.new_deaths,
            effective_rate: beta,
        });
    }

    Ok(snapshots)
}

/// Non-fatal problems with a parameter set that the simulator would silently absorb.
pub fn check_params(params: &SimulationParams) -> Vec<String> {
    let mut warnings = Vec::new();

    if params.initial_infectious + params.initial_exposed > params.population_size {
        warnings.push(format!(
            "initial infectious + exposed ({}) exceeds population size ({})",
            params.initial_infectious + params.initial_exposed,
            params.population_size
        ));
    }
    if params.initial_infectious < 0.0 || params.initial_exposed < 0.0 {
        warnings.push("initial counts should not be negative".into());
    }
    if params.incubation_rate <= 0.0 {
        warnings.push("incubation_rate should be positive".into());
    }
    if params.recovery_rate <= 0.0 {
        warnings.push("recovery_rate should be positive".into());
    }
    if params.incubation_rate > 1.0 || params.recovery_rate > 1.0 {
        warnings.push("daily rates above 1 overshoot and rely on clamping".into());
    }
    if !(0.0..=1.0).contains(&params.fatality_fraction) {
        warnings.push(format!(
            "fatality_fraction should be between 0 and 1, got {}",
            params.fatality_fraction
        ));
    }
    for iv in &params.interventions {
        if !(0.0..=1.0).contains(&iv.reduction) {
            warnings.push(format!(
                "intervention on day {} has reduction {} outside [0, 1]",
                iv.trigger_day, iv.reduction
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Intervention;

    fn classroom() -> SimulationParams {
        SimulationParams {
            population_size: 1000.0,
            initial_infectious: 10.0,
            initial_exposed: 0.0,
            r0: 2.0,
            incubation_rate: 0.2,
            recovery_rate: 0.143,
            fatality_fraction: 0.0,
            horizon_days: 1,
            ..Default::default()
        }
    }

    #[test]
    fn first_day_matches_hand_calculation() {
        let out = simulate(&classroom()).unwrap();
        assert_eq!(out.len(), 1);
        let expected = 2.0 * 0.143 * 10.0 * 990.0 / 1000.0;
        assert!((out[0].new_exposures - expected).abs() < 1e-9);
        assert!((out[0].new_exposures - 2.83).abs() < 0.01);
        assert!((out[0].susceptible - (990.0 - expected)).abs() < 1e-9);
        assert!((out[0].effective_rate - 0.286).abs() < 1e-12);
    }

    #[test]
    fn zero_horizon_is_empty() {
        let params = SimulationParams {
            horizon_days: 0,
            ..classroom()
        };
        assert!(simulate(&params).unwrap().is_empty());
    }

    #[test]
    fn length_matches_horizon_and_dates_advance() {
        let params = SimulationParams {
            horizon_days: 45,
            ..classroom()
        };
        let out = simulate(&params).unwrap();
        assert_eq!(out.len(), 45);
        assert_eq!(out[0].date, params.start_date);
        assert_eq!(
            out[44].date,
            params.start_date.checked_add_days(Days::new(44)).unwrap()
        );
        assert!(out.iter().enumerate().all(|(i, s)| s.day as usize == i));
    }

    #[test]
    fn compartments_never_negative() {
        let params = SimulationParams {
            population_size: 100.0,
            initial_infectious: 80.0,
            initial_exposed: 60.0,
            r0: 12.0,
            incubation_rate: 1.5,
            recovery_rate: 0.9,
            fatality_fraction: 0.3,
            horizon_days: 200,
            ..Default::default()
        };
        for s in simulate(&params).unwrap() {
            assert!(s.susceptible >= 0.0, "day {}: S={}", s.day, s.susceptible);
            assert!(s.exposed >= 0.0, "day {}: E={}", s.day, s.exposed);
            assert!(s.infectious >= 0.0, "day {}: I={}", s.day, s.infectious);
            assert!(s.removed >= 0.0, "day {}: R={}", s.day, s.removed);
        }
    }

    #[test]
    fn zero_reduction_is_identical_to_baseline() {
        let base = SimulationParams {
            horizon_days: 90,
            ..classroom()
        };
        let with_noop = SimulationParams {
            interventions: vec![Intervention::new(7, 0.0)],
            ..base.clone()
        };
        assert_eq!(simulate(&base).unwrap(), simulate(&with_noop).unwrap());
    }

    #[test]
    fn full_suppression_stops_transmission() {
        let params = SimulationParams {
            horizon_days: 60,
            interventions: vec![Intervention::new(0, 1.0)],
            ..classroom()
        };
        let out = simulate(&params).unwrap();
        for s in &out {
            assert_eq!(s.new_exposures, 0.0);
            assert_eq!(s.effective_rate, 0.0);
            assert!(s.exposed <= params.initial_exposed);
            assert!(s.infectious <= params.initial_infectious);
        }
    }

    #[test]
    fn intervention_order_does_not_matter() {
        let a = SimulationParams {
            horizon_days: 60,
            interventions: vec![Intervention::new(5, 0.3), Intervention::new(20, 0.5)],
            ..classroom()
        };
        let b = SimulationParams {
            interventions: vec![Intervention::new(20, 0.5), Intervention::new(5, 0.3)],
            ..a.clone()
        };
        let (ra, rb) = (simulate(&a).unwrap(), simulate(&b).unwrap());
        for (x, y) in ra.iter().zip(&rb) {
            assert!((x.infectious - y.infectious).abs() < 1e-9);
        }
    }

    #[test]
    fn deaths_are_a_fraction_of_recoveries() {
        let params = SimulationParams {
            horizon_days: 30,
            fatality_fraction: 0.1,
            ..classroom()
        };
        for s in simulate(&params).unwrap() {
            assert!((s.new_deaths - 0.1 * s.new_recoveries).abs() < 1e-9);
        }
    }

    #[test]
    fn mass_is_conserved_up_to_deaths() {
        let params = SimulationParams {
            horizon_days: 100,
            fatality_fraction: 0.05,
            ..classroom()
        };
        let out = simulate(&params).unwrap();
        let deaths: f64 = out.iter().map(|s| s.new_deaths).sum();
        let last = out.last().unwrap();
        let total = last.susceptible + last.exposed + last.infectious + last.removed;
        assert!((total + deaths - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn inconsistent_initial_counts_are_clamped() {
        let params = SimulationParams {
            population_size: 10.0,
            initial_infectious: 8.0,
            initial_exposed: 5.0,
            horizon_days: 5,
            ..classroom()
        };
        let state = Compartments::initial(&params);
        assert_eq!(state.susceptible, 0.0);
        assert_eq!(simulate(&params).unwrap().len(), 5);
        assert!(!check_params(&params).is_empty());
    }

    #[test]
    fn negative_initial_counts_never_inflate_susceptibles() {
        let params = SimulationParams {
            population_size: 1000.0,
            initial_infectious: 10.0,
            initial_exposed: -50.0,
            ..classroom()
        };
        let state = Compartments::initial(&params);
        assert_eq!(state.exposed, 0.0);
        assert_eq!(state.susceptible, 990.0);
        assert!(state.total() <= params.population_size);
        assert!(simulate(&params)
            .unwrap()
            .iter()
            .all(|s| s.susceptible + s.exposed + s.infectious + s.removed <= 1000.0 + 1e-9));
    }

    #[test]
    fn dates_saturate_instead_of_wrapping() {
        let params = SimulationParams {
            start_date: NaiveDate::MAX.pred_opt().unwrap(),
            horizon_days: 4,
            ..classroom()
        };
        let out = simulate(&params).unwrap();
        assert_eq!(out[1].date, NaiveDate::MAX);
        assert_eq!(out[3].date, NaiveDate::MAX);
        assert!(out.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn rejects_zero_population() {
        let params = SimulationParams {
            population_size: 0.0,
            ..classroom()
        };
        assert_eq!(
            simulate(&params),
            Err(SimulationError::NonPositivePopulation(0.0))
        );
    }

    #[test]
    fn rejects_non_finite_parameters() {
        let params = SimulationParams {
            r0: f64::NAN,
            ..classroom()
        };
        assert!(matches!(
            simulate(&params),
            Err(SimulationError::NonFinite { field: "r0", .. })
        ));
    }

    #[test]
    fn default_params_are_clean() {
        assert!(check_params(&SimulationParams::default()).is_empty());
    }
}
