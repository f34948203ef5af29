use thiserror::Error;

/// Precondition violations rejected before any geometry is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInput {
    #[error("category list cannot be empty")]
    Empty,
    #[error("spacing must be a finite, non-negative number of degrees, got {0}")]
    InvalidSpacing(f64),
    #[error("total spacing of {total}° ({count} x {spacing}°) must stay below 360°")]
    SpacingOverflow {
        spacing: f64,
        count: usize,
        total: f64,
    },
    #[error("weight of item {index} must be positive and finite, got {weight}")]
    InvalidWeight { index: usize, weight: f64 },
    #[error("total weight must be positive, got {0}")]
    NonPositiveTotal(f64),
    #[error("{name} must be positive, got {value}")]
    NonPositiveDimension { name: &'static str, value: f64 },
}
