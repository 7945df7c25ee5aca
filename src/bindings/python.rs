use crate::batch::AgentMatrix;
use crate::cashflow::{self, CashflowInputs};
use crate::display::trace;
use crate::metrics::{self, IrrOptions};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

fn matrix_from_py(cfs: Vec<Vec<f64>>) -> PyResult<AgentMatrix> {
    AgentMatrix::from_rows(cfs).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Vectorized NPV: one discount rate per cash-flow row.
#[pyfunction]
pub fn calc_npv(cfs: Vec<Vec<f64>>, dr: Vec<f64>) -> PyResult<Vec<f64>> {
    let matrix = matrix_from_py(cfs)?;
    metrics::calc_npv(&matrix, &dr).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Interpolated payback period per row, rounded to 0.1 years.
#[pyfunction]
pub fn calc_payback(cfs: Vec<Vec<f64>>, tech_lifetime: usize) -> PyResult<Vec<f64>> {
    let matrix = matrix_from_py(cfs)?;
    metrics::calc_payback(&matrix, tech_lifetime).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Batched IRR over the bounded two-tier rate grid.
#[pyfunction]
#[pyo3(signature = (cfs, precision = 0.005, rmin = 0.0, rmax1 = 0.3, rmax2 = 0.5))]
pub fn virr(
    cfs: Vec<Vec<f64>>,
    precision: f64,
    rmin: f64,
    rmax1: f64,
    rmax2: f64,
) -> PyResult<Vec<f64>> {
    let matrix = matrix_from_py(cfs)?;
    let options = IrrOptions { precision, rmin, rmax1, rmax2 };
    metrics::virr_with_options(&matrix, options).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Runs the cash-flow constructor over a JSON-encoded `CashflowInputs` and
/// returns the full results bundle as JSON.
#[pyfunction]
pub fn cashflow_constructor(inputs_json: &str) -> PyResult<String> {
    let inputs: CashflowInputs =
        serde_json::from_str(inputs_json).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let results = cashflow::cashflow_constructor(&inputs)
        .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
    results.to_json().map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

/// Plain-text audit table of one agent's annual line items.
#[pyfunction]
pub fn trace_agent(inputs_json: &str, agent: usize) -> PyResult<String> {
    let inputs: CashflowInputs =
        serde_json::from_str(inputs_json).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let results = cashflow::cashflow_constructor(&inputs)
        .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
    Ok(trace::format_trace(&results, agent))
}
