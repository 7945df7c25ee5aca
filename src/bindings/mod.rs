//! Foreign-language bindings. Only compiled for the Python extension build.
pub mod python;
