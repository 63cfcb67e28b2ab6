//! Multiplicative uniform noise for a single numeric column.
//!
//! Every cell `v` of the target column becomes `v * (1 + u)` with
//! `u ~ Uniform[min_noise, max_noise)`, drawn independently per row from a
//! generator owned by the caller.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::model::{Dataset, Value};
use crate::error::{MaskError, Result};

// ---------------------------------------------------------------------------
// NoiseRange
// ---------------------------------------------------------------------------

/// Half-open interval `[min, max)` of relative offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseRange {
    min: f64,
    max: f64,
}

impl NoiseRange {
    /// Both bounds must be finite, `min < max` strictly, and the width must
    /// itself be finite. Equal bounds are rejected.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let valid = min.is_finite() && max.is_finite() && min < max && (max - min).is_finite();
        if !valid {
            return Err(MaskError::InvalidRange { min, max });
        }
        Ok(NoiseRange { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    fn sampler(&self) -> Uniform<f64> {
        Uniform::new(self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// InjectionSummary
// ---------------------------------------------------------------------------

/// What a single injection pass did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InjectionSummary {
    /// Rows in the column (one draw each).
    pub rows: usize,
    /// Rows holding a number, i.e. rows actually rescaled.
    pub perturbed: usize,
    /// Smallest factor `1 + u` applied, `None` for an empty column.
    pub min_factor: Option<f64>,
    /// Largest factor `1 + u` applied.
    pub max_factor: Option<f64>,
}

// ---------------------------------------------------------------------------
// Injection
// ---------------------------------------------------------------------------

/// Build the generator for a run: seeded when `seed` is given, otherwise
/// from OS entropy.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Check that `column` exists and holds only numbers (or missing cells).
fn validate_column(dataset: &Dataset, column: &str) -> Result<()> {
    let col = dataset
        .column(column)
        .ok_or_else(|| MaskError::UnknownColumn {
            column: column.to_string(),
            available: dataset.column_names(),
        })?;

    if let Some((row, value)) = col
        .values
        .iter()
        .enumerate()
        .find(|(_, v)| !(v.is_numeric() || v.is_null()))
    {
        return Err(MaskError::NonNumericColumn {
            column: column.to_string(),
            row,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Scale every cell of `column` by `1 + u`, `u` drawn from `range` with `rng`.
///
/// Nothing is modified unless the column exists and is numeric. One draw is
/// made per row, nulls included, so row `i` always consumes the `i`-th draw.
pub fn inject_with_rng<R: Rng + ?Sized>(
    dataset: &mut Dataset,
    column: &str,
    range: NoiseRange,
    rng: &mut R,
) -> Result<InjectionSummary> {
    validate_column(dataset, column)?;

    let sampler = range.sampler();
    let mut summary = InjectionSummary {
        rows: 0,
        perturbed: 0,
        min_factor: None,
        max_factor: None,
    };

    let Some(col) = dataset.column_mut(column) else {
        return Ok(summary);
    };

    for value in col.values.iter_mut() {
        let factor = 1.0 + sampler.sample(rng);
        summary.rows += 1;
        summary.min_factor = Some(summary.min_factor.map_or(factor, |m| m.min(factor)));
        summary.max_factor = Some(summary.max_factor.map_or(factor, |m| m.max(factor)));

        if let Some(v) = value.as_f64() {
            *value = Value::Float(v * factor);
            summary.perturbed += 1;
        }
    }

    log::debug!(
        "Perturbed {} of {} rows in '{column}' with u in [{}, {}) (factors {:?}..{:?})",
        summary.perturbed,
        summary.rows,
        range.min(),
        range.max(),
        summary.min_factor,
        summary.max_factor
    );
    Ok(summary)
}

/// Apply noise to `column` of `dataset` in place.
///
/// Checks, in order: the column exists, the column is numeric, the range is
/// valid. A given `seed` makes the result reproducible bit for bit.
pub fn inject_in_place(
    dataset: &mut Dataset,
    column: &str,
    min_noise: f64,
    max_noise: f64,
    seed: Option<u64>,
) -> Result<InjectionSummary> {
    validate_column(dataset, column)?;
    let range = NoiseRange::new(min_noise, max_noise)?;

    let mut rng = rng_from_seed(seed);
    inject_with_rng(dataset, column, range, &mut rng)
}

/// Return `dataset` with noise applied to `column`. See [`inject_in_place`].
pub fn inject(
    mut dataset: Dataset,
    column: &str,
    min_noise: f64,
    max_noise: f64,
    seed: Option<u64>,
) -> Result<Dataset> {
    inject_in_place(&mut dataset, column, min_noise, max_noise, seed)?;
    Ok(dataset)
}
