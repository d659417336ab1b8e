//! epiclass-core: SEIR outbreak simulator, adaptive quiz engine, and
//! epidemiological measures.
//!
//! Both engines are pure functions over caller-supplied state: the simulator
//! maps a parameter set to a day-by-day time series, and the quiz engine maps
//! an answer history and score to the next question.

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod quiz;
pub mod report;
pub mod scenario;
pub mod simulation;
pub mod statistics;
pub mod traits;

pub use error::{SimulationError, StatisticsError};
pub use model::{
    AnswerRecord, DaySnapshot, Intervention, Question, QuestionBank, SimulationParams, Tier,
};
pub use quiz::{Badge, QuizEngine, QuizSession, QuizStep, StepStatus};
pub use simulation::simulate;
