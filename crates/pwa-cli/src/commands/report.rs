use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use pwa_fit::{analyze_bin, to_canonical_json_bytes, ReportOpts};
use serde_yaml::from_str;
use tracing::info;

use super::load_fit_result;

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Fit-result JSON document of one kinematic bin.
    #[arg(long = "in")]
    pub input: PathBuf,
    /// Optional YAML report options.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Output directory for `report.json`.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &ReportArgs) -> Result<(), Box<dyn Error>> {
    let result = load_fit_result(&args.input)?;
    let opts = load_opts(args.config.as_ref())?;
    let report = analyze_bin(&result, &opts)?;
    fs::create_dir_all(&args.out)?;
    let json = to_canonical_json_bytes(&report)?;
    let path = args.out.join("report.json");
    fs::write(&path, json)?;
    info!(path = %path.display(), waves = report.waves.len(), "wrote bin report");
    println!("{}", report.report_hash);
    Ok(())
}

fn load_opts(path: Option<&PathBuf>) -> Result<ReportOpts, Box<dyn Error>> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            Ok(from_str(&raw)?)
        }
        None => Ok(ReportOpts::default()),
    }
}
