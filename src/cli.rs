use std::path::PathBuf;

use clap::Parser;

use crate::app::MaskJob;

/// Adds random noise to numerical data within a specified range.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file (.json and .parquet are also accepted)
    pub input_file: PathBuf,

    /// Path to the output file; format follows the extension
    pub output_file: PathBuf,

    /// Name of the column to add noise to
    pub column_name: String,

    /// Minimum noise value (as a fraction of the data value)
    #[arg(
        long = "min_noise",
        visible_alias = "min-noise",
        default_value_t = -0.1,
        allow_negative_numbers = true
    )]
    pub min_noise: f64,

    /// Maximum noise value (as a fraction of the data value)
    #[arg(
        long = "max_noise",
        visible_alias = "max-noise",
        default_value_t = 0.1,
        allow_negative_numbers = true
    )]
    pub max_noise: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Args {
    pub fn to_job(&self) -> MaskJob {
        MaskJob {
            input: self.input_file.clone(),
            output: self.output_file.clone(),
            column: self.column_name.clone(),
            min_noise: self.min_noise,
            max_noise: self.max_noise,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let args = Args::try_parse_from(["rusty-noise", "in.csv", "out.csv", "salary"]).unwrap();
        let job = args.to_job();

        assert_eq!(job.input, PathBuf::from("in.csv"));
        assert_eq!(job.output, PathBuf::from("out.csv"));
        assert_eq!(job.column, "salary");
        assert_eq!(job.min_noise, -0.1);
        assert_eq!(job.max_noise, 0.1);
        assert_eq!(job.seed, None);
    }

    #[test]
    fn negative_noise_and_seed_are_parsed() {
        let args = Args::try_parse_from([
            "rusty-noise",
            "in.csv",
            "out.csv",
            "salary",
            "--min_noise",
            "-0.2",
            "--max-noise",
            "0.2",
            "--seed",
            "42",
        ])
        .unwrap();

        assert_eq!(args.min_noise, -0.2);
        assert_eq!(args.max_noise, 0.2);
        assert_eq!(args.seed, Some(42));
    }

    #[test]
    fn missing_positional_is_an_error() {
        assert!(Args::try_parse_from(["rusty-noise", "in.csv", "out.csv"]).is_err());
    }

    #[test]
    fn non_integer_seed_is_an_error() {
        let res = Args::try_parse_from(["rusty-noise", "a", "b", "c", "--seed", "x"]);
        assert!(res.is_err());
    }
}
