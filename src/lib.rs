pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod frame;
pub mod io_utils;
pub mod pipeline;
pub mod report;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::Cli,
    pipeline::{CleaningPipeline, PipelineOptions},
    report::Reporter,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_cleanse", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let reporter = if cli.no_log_file {
        Reporter::console_only()
    } else {
        Reporter::with_log_file(&cli.log_file)
    };
    let options = PipelineOptions {
        delimiter: cli.delimiter,
        output_delimiter: cli.output_delimiter,
        input_encoding: cli.input_encoding.clone(),
    };
    let mut pipeline = CleaningPipeline::new(reporter, options);
    let report = pipeline.run(&cli.config, &cli.input, &cli.output)?;
    info!(
        "Run finished: {} of {} row(s) kept, {} column(s) written, {} cast warning(s)",
        report.rows_written, report.rows_loaded, report.columns_written, report.cast_failures
    );
    Ok(())
}
