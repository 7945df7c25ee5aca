//! Batch substrate: dense agent-by-year matrices and per-agent inputs.
//!
//! Every component of the crate shares one layout convention: rows are
//! agents (independent scenarios evaluated in parallel), columns are
//! calendar years, with column 0 the year of investment.

pub mod error;
pub mod matrix;
pub mod value;

pub use error::ModelError;
pub use matrix::AgentMatrix;
pub use value::PerAgent;
