//! Tukey-fence outlier filtering for tabular data.
//!
//! For each configured column the interquartile range of the remaining rows
//! gives an open interval `(Q1 - k*IQR, Q3 + k*IQR)`; rows outside it, or
//! with a missing value, are dropped before the next column is considered.

pub mod config;
pub mod data;
pub mod error;
pub mod fence;
pub mod pipeline;
pub mod stats;

pub use data::filter::filter_in_bounds;
pub use data::model::{Record, Table, Value};
pub use error::FenceError;
pub use fence::{compute_bounds, compute_bounds_with, Bounds, TUKEY_MULTIPLIER};
pub use pipeline::{FilterMode, Pipeline, PipelineOutput, PipelineReport, UndefinedPolicy};
