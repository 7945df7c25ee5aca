//! The cash-flow construction engine.
//!
//! `cashflow_constructor` assembles every annual line item of a PV plus
//! battery investment (bill savings, installed cost, replacements, O&M,
//! ITC, depreciation, debt service, state and federal tax) into one
//! after-tax cash-flow matrix per batch, and returns every intermediate
//! quantity for downstream inspection.

pub mod constructor;
pub mod inputs;
pub mod results;

pub use constructor::cashflow_constructor;
pub use inputs::{CashflowInputs, Sector};
pub use results::CashflowResults;
