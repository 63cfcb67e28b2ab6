//! Data masking: perturb one numeric column of a table with multiplicative
//! uniform noise.
//!
//! ```text
//!  cli::Args ──► app::MaskJob ──► data::loader ──► noise ──► data::writer
//! ```

pub mod app;
pub mod cli;
pub mod data;
pub mod error;
pub mod noise;

pub use app::MaskJob;
pub use data::model::{Column, Dataset, Value};
pub use error::MaskError;
pub use noise::{InjectionSummary, NoiseRange, inject, inject_with_rng};
