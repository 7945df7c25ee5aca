use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Shape mismatch: {msg}")]
    ShapeMismatch { msg: String },
    #[error("Degenerate input: {msg}")]
    DegenerateInput { msg: String },
    #[error("Replacement scheduled in year {year}, beyond the {horizon}-year analysis horizon")]
    ScheduleOutOfRange { year: usize, horizon: usize },
}
