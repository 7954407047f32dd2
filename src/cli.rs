use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Clean delimited datasets using a declarative configuration",
    long_about = None
)]
pub struct Cli {
    /// Cleaning configuration file (JSON, or YAML by extension)
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,
    /// Input CSV file to clean
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output CSV file (overwritten if it exists)
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// CSV delimiter character for reading input (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Delimiter to use for output (defaults to the input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Append progress messages to this log file
    #[arg(long = "log-file", default_value = "cleaning.log")]
    pub log_file: PathBuf,
    /// Skip the durable log file and report to the console only
    #[arg(long = "no-log-file")]
    pub no_log_file: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
