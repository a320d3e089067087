use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use iqr_fence::config::FenceConfig;
use iqr_fence::data::{loader, writer};
use iqr_fence::pipeline::{FilterMode, PipelineReport, UndefinedPolicy};

/// Drop rows outside the Tukey fences of each column, one column at a time.
#[derive(Debug, Parser)]
#[command(name = "iqr-fence", version, about)]
struct Args {
    /// Input table (.csv, .json, .parquet)
    input: PathBuf,

    /// Where to write the filtered table; format follows the extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Comma-separated columns, filtered in the given order
    #[arg(short, long, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// Fence multiplier k
    #[arg(short = 'k', long)]
    multiplier: Option<f64>,

    /// JSON config file; flags given on the command line take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Leave a column unfiltered when it has no usable values
    #[arg(long)]
    skip_undefined: bool,

    /// Compute every column's bounds on the unfiltered input
    #[arg(long, conflicts_with = "reference")]
    independent: bool,

    /// Compute bounds on this table instead of the input
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Write the per-stage report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Args {
    fn fence_config(&self) -> Result<FenceConfig> {
        let mut cfg = match &self.config {
            Some(path) => FenceConfig::load(path)?,
            None => FenceConfig::default(),
        };
        if let Some(cols) = &self.columns {
            cfg.columns = cols.clone();
        }
        if let Some(k) = self.multiplier {
            cfg.multiplier = k;
        }
        if self.skip_undefined {
            cfg.on_undefined = UndefinedPolicy::Skip;
        }
        if self.independent {
            cfg.mode = FilterMode::Independent;
        }
        Ok(cfg)
    }
}

fn print_summary(report: &PipelineReport) {
    for stage in &report.stages {
        match &stage.bounds {
            Some(b) => println!(
                "{:<16} ({:>12.4}, {:>12.4})  {} -> {} rows",
                stage.column, b.lower, b.upper, stage.rows_in, stage.rows_out
            ),
            None => println!("{:<16} skipped (no usable values)", stage.column),
        }
    }
    println!("{} -> {} rows", report.input_rows, report.output_rows);
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let cfg = args.fence_config()?;
    let pipeline = cfg.pipeline();

    let table = loader::load_file(&args.input)?;
    let output = match &args.reference {
        Some(path) => {
            let reference = loader::load_file(path)?;
            pipeline.run_with_reference(&reference, &table)?
        }
        None => pipeline.run(&table)?,
    };

    print_summary(&output.report);

    if let Some(path) = &args.report {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating report {}", path.display()))?;
        serde_json::to_writer_pretty(file, &output.report).context("writing report")?;
    }
    if let Some(path) = &args.output {
        writer::save_file(&output.table, path)?;
    }
    Ok(())
}
