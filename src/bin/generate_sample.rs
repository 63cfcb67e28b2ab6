use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand::seq::SliceRandom;

use rusty_noise::data::writer::save_file;
use rusty_noise::{Column, Dataset, Value};

/// Write a deterministic employee table to try the masking tool on.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output path; .json and .parquet select those formats
    #[arg(default_value = "input.csv")]
    output: PathBuf,

    /// Number of rows
    #[arg(long, default_value_t = 20)]
    rows: usize,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const NAMES: [&str; 8] = [
    "Alice", "Bob", "Carol", "Dave", "Erin", "Frank", "Grace", "Heidi",
];

/// Department and its base salary.
const DEPARTMENTS: [(&str, i64); 4] = [
    ("Engineering", 85_000),
    ("Sales", 60_000),
    ("Support", 48_000),
    ("Finance", 72_000),
];

fn generate(rows: usize, rng: &mut StdRng) -> anyhow::Result<Dataset> {
    let mut ids = Vec::with_capacity(rows);
    let mut names = Vec::with_capacity(rows);
    let mut departments = Vec::with_capacity(rows);
    let mut salaries = Vec::with_capacity(rows);

    for i in 0..rows {
        let name = NAMES.choose(rng).copied().unwrap_or("Anon");
        let &(dept, base) = DEPARTMENTS.choose(rng).unwrap_or(&DEPARTMENTS[0]);
        // Round to the nearest hundred, like a real payroll export.
        let salary = (base + rng.gen_range(-15_000..=25_000)) / 100 * 100;

        ids.push(Value::Integer(i as i64 + 1));
        names.push(Value::String(name.to_string()));
        departments.push(Value::String(dept.to_string()));
        salaries.push(Value::Integer(salary));
    }

    Dataset::new(vec![
        Column::new("id", ids),
        Column::new("name", names),
        Column::new("department", departments),
        Column::new("salary", salaries),
    ])
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut rng = StdRng::seed_from_u64(args.seed);
    let result = generate(args.rows, &mut rng)
        .map_err(rusty_noise::MaskError::from)
        .and_then(|dataset| save_file(&dataset, &args.output));

    match result {
        Ok(()) => {
            log::info!("Wrote {} rows to {}", args.rows, args.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
