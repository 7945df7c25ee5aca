//! Human-readable rendering of computed results.
pub mod trace;
