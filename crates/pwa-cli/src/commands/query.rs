use std::error::Error;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use pwa_fit::{to_canonical_json_bytes, FitResult};
use serde::Serialize;

use super::load_fit_result;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Observable {
    /// Summed intensity of the waves matching a pattern.
    Intensity,
    /// Phase of wave A relative to wave B in degrees.
    Phase,
    /// Coherence of two waves.
    Coherence,
    /// Interference term of two waves.
    Overlap,
    /// A single real fit parameter.
    Parameter,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Fit-result JSON document of one kinematic bin.
    #[arg(long = "in")]
    pub input: PathBuf,
    /// Observable to evaluate.
    #[arg(value_enum)]
    pub observable: Observable,
    /// Wave pattern, wave name or parameter name.
    pub first: String,
    /// Second wave for two-wave observables.
    pub second: Option<String>,
}

#[derive(Debug, Serialize)]
struct QueryAnswer<'a> {
    observable: Observable,
    arguments: Vec<&'a str>,
    value: f64,
    error: f64,
}

pub fn run(args: &QueryArgs) -> Result<(), Box<dyn Error>> {
    let result = load_fit_result(&args.input)?;
    let (value, error) = evaluate(&result, args)?;
    let mut arguments = vec![args.first.as_str()];
    arguments.extend(args.second.as_deref());
    let answer = QueryAnswer {
        observable: args.observable,
        arguments,
        value,
        error,
    };
    println!("{}", String::from_utf8(to_canonical_json_bytes(&answer)?)?);
    Ok(())
}

fn evaluate(result: &FitResult, args: &QueryArgs) -> Result<(f64, f64), Box<dyn Error>> {
    let a = args.first.as_str();
    let pair = || {
        args.second
            .as_deref()
            .ok_or_else(|| format!("{:?} needs a second wave name", args.observable))
    };
    Ok(match args.observable {
        Observable::Intensity => (result.intensity(a), result.intensity_err(a)),
        Observable::Parameter => (result.fit_parameter(a), result.fit_parameter_err(a)),
        Observable::Phase => {
            let b = pair()?;
            (result.phase_by_name(a, b), result.phase_err_by_name(a, b))
        }
        Observable::Coherence => {
            let b = pair()?;
            (result.coherence_by_name(a, b), result.coherence_err_by_name(a, b))
        }
        Observable::Overlap => {
            let b = pair()?;
            (result.overlap_by_name(a, b), result.overlap_err_by_name(a, b))
        }
    })
}
