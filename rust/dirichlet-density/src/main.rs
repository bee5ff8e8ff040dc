//! dirichlet-density CLI: render the six density plots.
//!
//! Options:
//!   --out-dir=<path>              Output directory for PNGs (default: .)
//!   --bound=<N>                   Bound for the comparison, heatmap and race plots
//!   --limits=10000,20000,...      Ascending sample bounds for convergence plots
//!   --moduli=3,4,5,...            Heatmap moduli
//!   --normalization=all|coprime   Density denominator (default: all)
//!   --json                        Also write the plot payloads to plots.json

use std::path::PathBuf;
use std::time::Instant;

use dirichlet_density::plots::PlotSuite;
use dirichlet_density::render::{self, RenderError};
use dirichlet_density::residue::MIN_MODULUS;
use dirichlet_density::{DensityNormalization, DirichletError, ExperimentConfig, SieveCache};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid value for {flag}: '{value}'")]
    InvalidValue { flag: &'static str, value: String },

    #[error("invalid modulus {modulus}: at least {min} is required")]
    InvalidModulus { modulus: i64, min: u64 },

    #[error(transparent)]
    Dirichlet(#[from] DirichletError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// CLI configuration parsed from command-line arguments.
struct CliConfig {
    out_dir: PathBuf,
    write_json: bool,
    experiment: ExperimentConfig,
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter().find_map(|a| a.strip_prefix(flag))
}

/// Bounds arrive as signed integers so a negative value is reported as such
/// instead of failing to parse.
fn parse_bound(flag: &'static str, value: &str) -> Result<u64, CliError> {
    let parsed = value.trim().parse::<i64>().map_err(|_| CliError::InvalidValue {
        flag,
        value: value.to_string(),
    })?;
    u64::try_from(parsed).map_err(|_| DirichletError::InvalidBound(parsed).into())
}

/// Like [`parse_bound`], but a negative value is an invalid modulus.
fn parse_modulus(flag: &'static str, value: &str) -> Result<u64, CliError> {
    let parsed = value.trim().parse::<i64>().map_err(|_| CliError::InvalidValue {
        flag,
        value: value.to_string(),
    })?;
    u64::try_from(parsed).map_err(|_| CliError::InvalidModulus {
        modulus: parsed,
        min: MIN_MODULUS,
    })
}

fn parse_list(
    flag: &'static str,
    value: &str,
    parse: fn(&'static str, &str) -> Result<u64, CliError>,
) -> Result<Vec<u64>, CliError> {
    value
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse(flag, s))
        .collect()
}

fn parse_args() -> Result<CliConfig, CliError> {
    let args: Vec<String> = std::env::args().collect();
    let mut experiment = ExperimentConfig::default();

    if let Some(v) = flag_value(&args, "--bound=") {
        experiment = experiment.with_bound(parse_bound("--bound", v)?);
    }
    if let Some(v) = flag_value(&args, "--limits=") {
        experiment.convergence_bounds = parse_list("--limits", v, parse_bound)?;
    }
    if let Some(v) = flag_value(&args, "--moduli=") {
        experiment.heatmap_moduli = parse_list("--moduli", v, parse_modulus)?;
    }
    if let Some(v) = flag_value(&args, "--normalization=") {
        experiment.normalization = match v {
            "all" => DensityNormalization::AllPrimes,
            "coprime" => DensityNormalization::CoprimePrimes,
            other => {
                return Err(CliError::InvalidValue {
                    flag: "--normalization",
                    value: other.to_string(),
                })
            }
        };
    }

    let out_dir = flag_value(&args, "--out-dir=")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let write_json = args.iter().any(|a| a == "--json");

    Ok(CliConfig {
        out_dir,
        write_json,
        experiment,
    })
}

fn run(config: &CliConfig) -> Result<(), CliError> {
    let start = Instant::now();
    let mut cache = SieveCache::new();
    let suite = PlotSuite::build(&config.experiment, &mut cache)?;
    println!(
        "Computed plot data in {:.2?} (sieve bound {})",
        start.elapsed(),
        cache.max_bound().unwrap_or(0)
    );
    println!();

    println!("--- Convergence ---");
    for plot in &suite.convergence {
        let finals: Vec<String> = plot
            .series
            .iter()
            .map(|s| format!("{}: {:.4}", s.label, s.values.last().copied().unwrap_or(0.0)))
            .collect();
        println!(
            "  N={} (target {:.4}) -> {}",
            plot.modulus,
            plot.reference.value,
            finals.join(", ")
        );
    }
    println!();

    let cmp = &suite.comparison;
    println!("--- Comparison N={} at {} ---", cmp.modulus, cmp.bound);
    for ((cat, e), t) in cmp.categories.iter().zip(&cmp.empirical).zip(&cmp.theoretical) {
        println!("  {:>9}: empirical {:.4}  theoretical {:.4}", cat, e, t);
    }
    println!();

    let race = &suite.race;
    println!(
        "--- Prime race {} vs {} (mod {}) ---",
        race.residues.0, race.residues.1, race.modulus
    );
    println!(
        "  final lead {:+}, {} lead changes over {} primes",
        race.final_lead,
        race.lead_changes,
        race.primes.len()
    );
    println!();

    let written = render::render_suite(&suite, &config.out_dir)?;
    for path in &written {
        println!("  wrote {}", path.display());
    }
    if config.write_json {
        let path = config.out_dir.join(render::PAYLOAD_FILE);
        render::write_payloads(&suite, &path)?;
        println!("  wrote {}", path.display());
    }
    Ok(())
}

fn main() {
    env_logger::init();

    println!("========================================");
    println!("  Primes in Arithmetic Progressions");
    println!("========================================");
    println!();

    let config = match parse_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_modulus_is_reported_as_modulus() {
        let err = parse_list("--moduli", "3,-3", parse_modulus).unwrap_err();
        assert!(matches!(err, CliError::InvalidModulus { modulus: -3, min: 2 }));
        assert_eq!(err.to_string(), "invalid modulus -3: at least 2 is required");
    }

    #[test]
    fn test_negative_limit_is_reported_as_bound() {
        let err = parse_list("--limits", "10,-5", parse_bound).unwrap_err();
        assert!(matches!(err, CliError::Dirichlet(DirichletError::InvalidBound(-5))));
    }

    #[test]
    fn test_parse_list_skips_empty_entries() {
        assert_eq!(parse_list("--moduli", "3, 4,,5", parse_modulus).unwrap(), vec![3, 4, 5]);
        assert!(matches!(
            parse_list("--moduli", "3,x", parse_modulus),
            Err(CliError::InvalidValue { flag: "--moduli", .. })
        ));
    }
}
