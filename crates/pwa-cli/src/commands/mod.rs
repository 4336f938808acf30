pub mod query;
pub mod report;
pub mod version;

use std::error::Error;
use std::path::Path;

use pwa_fit::{from_json_file, FitResult};
use tracing::info;

/// Reads a fit-result document; validation happens during deserialisation.
pub fn load_fit_result(path: &Path) -> Result<FitResult, Box<dyn Error>> {
    let result: FitResult = from_json_file(path)?;
    info!(
        path = %path.display(),
        amplitudes = result.nmb_prod_amps(),
        waves = result.nmb_waves(),
        "loaded fit result"
    );
    Ok(result)
}
