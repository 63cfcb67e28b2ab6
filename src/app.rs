use std::path::PathBuf;

use crate::data::{loader, writer};
use crate::error::Result;
use crate::noise::{self, InjectionSummary};

// ---------------------------------------------------------------------------
// Masking job: load → inject → save
// ---------------------------------------------------------------------------

/// Everything one run needs, independent of how it was configured.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub column: String,
    pub min_noise: f64,
    pub max_noise: f64,
    pub seed: Option<u64>,
}

impl MaskJob {
    /// Run the job. The output file is only written once every check passed
    /// and the noise has been applied.
    pub fn run(&self) -> Result<InjectionSummary> {
        log::info!("Reading input file: {}", self.input.display());
        let mut dataset = loader::load_file(&self.input)?;

        log::info!("Adding noise to column: {}", self.column);
        let summary = noise::inject_in_place(
            &mut dataset,
            &self.column,
            self.min_noise,
            self.max_noise,
            self.seed,
        )?;

        log::info!("Saving output to: {}", self.output.display());
        writer::save_file(&dataset, &self.output)?;

        log::info!("Data masking completed successfully.");
        Ok(summary)
    }
}
