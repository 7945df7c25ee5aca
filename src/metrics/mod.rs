//! Post-processing metrics over cash-flow matrices.
//!
//! These utilities are independent of the constructor: the caller applies
//! them to the `cf` matrix (or any other batch of series) to obtain
//! per-agent scalar metrics.

pub mod irr;
pub mod npv;
pub mod payback;

pub use irr::{virr, virr_with_options, IrrOptions};
pub use npv::calc_npv;
pub use payback::{calc_payback, NO_PAYBACK_YEARS};
