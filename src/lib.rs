// FFI Facade: The main entry point for Python.
// This file declares the crate's modules and uses `pyo3` to define the
// `_core` Python module when the extension build is enabled.

pub mod batch;
pub mod cashflow;
pub mod display;
pub mod metrics;

#[cfg(feature = "extension-module")]
pub mod bindings;

#[cfg(feature = "extension-module")]
use pyo3::prelude::*;

/// A simple function to confirm the Rust core is callable from Python.
#[cfg(feature = "extension-module")]
#[pyfunction]
fn rust_core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// --- Module Definition ---
/// This function defines the `helios._core` Python module.
/// The name `_core` is chosen to indicate it's an internal, compiled component.
#[cfg(feature = "extension-module")]
#[pymodule]
fn _core(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(rust_core_version, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::python::calc_npv, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::python::calc_payback, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::python::virr, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::python::cashflow_constructor, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::python::trace_agent, m)?)?;
    Ok(())
}
