//! Error types for the simulator and the epidemiological measures.
//!
//! Quiz selection never fails: an exhausted tier is reported through
//! [`StepStatus::Exhausted`](crate::quiz::StepStatus::Exhausted) instead.

use thiserror::Error;

/// Errors raised before a simulation run starts.
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    /// Mass-action mixing divides by the population size.
    #[error("population size must be positive, got {0}")]
    NonPositivePopulation(f64),

    /// A parameter is NaN or infinite.
    #[error("parameter `{field}` must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
}

/// Errors from 2x2 contingency table measures.
#[derive(Debug, Error, PartialEq)]
pub enum StatisticsError {
    /// A comparison group has no members.
    #[error("{group} group is empty")]
    EmptyGroup { group: &'static str },

    /// A cell is zero and the measure is undefined.
    #[error("{measure} is undefined: {cell} count is zero")]
    ZeroCell {
        measure: &'static str,
        cell: &'static str,
    },
}

impl StatisticsError {
    /// Returns `true` if adding a continuity correction would make the measure defined.
    pub fn is_zero_cell(&self) -> bool {
        matches!(self, StatisticsError::ZeroCell { .. })
    }
}
