//! Plot payloads built from density snapshots and trajectories.
//!
//! Every payload is plain data: arrays, labels, axis ranges and reference
//! values, ready for any renderer. Nothing here draws, names files or uses
//! randomness, so identical inputs always give identical payloads.

use log::info;
use rayon::prelude::*;
use serde::Serialize;

use crate::arith::{coprime_residues, gcd};
use crate::cache::SieveCache;
use crate::config::{check_race_residues, ExperimentConfig};
use crate::convergence::ConvergenceSampler;
use crate::density::{DensityEstimator, DensityNormalization};
use crate::error::{DirichletError, Result};
use crate::sieve::PrimeSet;

/// Closed numeric interval for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    /// Smallest range holding every value, widened by `pad` (a fraction of
    /// the span) on both sides. Degenerate spans widen to +-0.5.
    fn covering(values: impl IntoIterator<Item = f64>, pad: f64) -> Self {
        let (min, max) = values
            .into_iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if !min.is_finite() || !max.is_finite() {
            return Self { min: 0.0, max: 1.0 };
        }
        let span = max - min;
        if span == 0.0 {
            return Self {
                min: min - 0.5,
                max: max + 0.5,
            };
        }
        Self {
            min: min - span * pad,
            max: max + span * pad,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub residue: u64,
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub label: String,
    pub value: f64,
}

/// One line per coprime class against the bound, plus 1/phi(N).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergencePlot {
    pub modulus: u64,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bounds: Vec<u64>,
    pub series: Vec<Series>,
    pub reference: ReferenceLine,
    pub x_range: AxisRange,
    pub y_range: AxisRange,
}

/// Empirical and theoretical bar for each coprime class at one bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonPlot {
    pub modulus: u64,
    pub bound: u64,
    pub title: String,
    pub residues: Vec<u64>,
    pub categories: Vec<String>,
    pub empirical: Vec<f64>,
    pub theoretical: Vec<f64>,
    pub y_range: AxisRange,
}

/// Densities with moduli as rows and residues as columns.
///
/// A cell is `None` when the residue is not coprime to the row's modulus or
/// lies outside 0..N for that row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapPlot {
    pub bound: u64,
    pub title: String,
    pub moduli: Vec<u64>,
    pub columns: Vec<u64>,
    pub cells: Vec<Vec<Option<f64>>>,
    pub value_range: AxisRange,
}

/// Running lead of one residue class over another.
///
/// At every prime p <= bound coprime to N, `leads` holds
/// #{q <= p : q = a} - #{q <= p : q = b} (mod N).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimeRacePlot {
    pub modulus: u64,
    pub residues: (u64, u64),
    pub bound: u64,
    pub title: String,
    pub y_label: String,
    pub primes: Vec<u64>,
    pub leads: Vec<i64>,
    /// Times the sign of a nonzero lead flipped.
    pub lead_changes: usize,
    pub final_lead: i64,
    pub x_range: AxisRange,
    pub y_range: AxisRange,
}

/// The six standard plots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSuite {
    pub convergence: Vec<ConvergencePlot>,
    pub comparison: ComparisonPlot,
    pub heatmap: HeatmapPlot,
    pub race: PrimeRacePlot,
}

fn class_label(r: u64, n: u64) -> String {
    format!("r = {} mod {}", r, n)
}

/// Convergence curves for modulus `n` at the ascending `bounds`.
pub fn convergence_plot(
    primes: &PrimeSet,
    n: u64,
    bounds: &[u64],
    normalization: DensityNormalization,
) -> Result<ConvergencePlot> {
    let trajectory = ConvergenceSampler::new(primes)
        .with_normalization(normalization)
        .trajectory(n, bounds)?;

    let series: Vec<Series> = coprime_residues(n)
        .into_iter()
        .map(|r| Series {
            residue: r,
            label: class_label(r, n),
            values: trajectory.series(r),
        })
        .collect();

    let y_max = series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold(trajectory.theoretical, f64::max);

    Ok(ConvergencePlot {
        modulus: n,
        title: format!("Empirical density convergence (N={})", n),
        x_label: "Prime upper limit".into(),
        y_label: "Empirical density".into(),
        x_range: AxisRange {
            min: bounds.first().copied().unwrap_or(0) as f64,
            max: bounds.last().copied().unwrap_or(0) as f64,
        },
        y_range: AxisRange {
            min: 0.0,
            max: y_max * 1.1,
        },
        reference: ReferenceLine {
            label: format!("theoretical 1/phi({}) = {:.3}", n, trajectory.theoretical),
            value: trajectory.theoretical,
        },
        bounds: trajectory.bounds(),
        series,
    })
}

/// Empirical vs theoretical bars for each coprime class mod `n`.
pub fn comparison_plot(
    primes: &PrimeSet,
    n: u64,
    bound: u64,
    normalization: DensityNormalization,
) -> Result<ComparisonPlot> {
    let snapshot = ConvergenceSampler::new(primes)
        .with_normalization(normalization)
        .snapshot(n, bound)?;
    let residues = snapshot.coprime_residues();
    let empirical: Vec<f64> = residues.iter().map(|&r| snapshot.density(r)).collect();
    let theoretical = vec![snapshot.theoretical; residues.len()];
    let y_max = empirical.iter().copied().fold(snapshot.theoretical, f64::max);

    Ok(ComparisonPlot {
        modulus: n,
        bound,
        title: format!("Empirical vs theoretical densities (N={}, limit={})", n, bound),
        categories: residues.iter().map(|&r| format!("{} mod {}", r, n)).collect(),
        residues,
        empirical,
        theoretical,
        y_range: AxisRange {
            min: 0.0,
            max: y_max * 1.1,
        },
    })
}

/// Density heatmap across `moduli` at one bound.
///
/// Rows are computed in parallel over the shared prime set and collected in
/// input order.
pub fn heatmap_plot(
    primes: &PrimeSet,
    moduli: &[u64],
    bound: u64,
    normalization: DensityNormalization,
) -> Result<HeatmapPlot> {
    let width = moduli.iter().copied().max().ok_or(DirichletError::EmptyModuli)?;
    let view = primes.upto(bound)?;

    let cells = moduli
        .par_iter()
        .map(|&n| -> Result<Vec<Option<f64>>> {
            let snapshot = DensityEstimator::new(n)?
                .with_normalization(normalization)
                .snapshot(bound, &view);
            Ok((0..width)
                .map(|r| snapshot.is_coprime(r).then(|| snapshot.density(r)))
                .collect())
        })
        .collect::<Result<Vec<_>>>()?;

    let value_range = AxisRange::covering(cells.iter().flatten().flatten().copied(), 0.0);

    Ok(HeatmapPlot {
        bound,
        title: format!("Prime densities by residue class (limit={})", bound),
        moduli: moduli.to_vec(),
        columns: (0..width).collect(),
        cells,
        value_range,
    })
}

/// Prime race between classes `a` and `b` mod `n`, up to `bound`.
pub fn prime_race_plot(
    primes: &PrimeSet,
    n: u64,
    (a, b): (u64, u64),
    bound: u64,
) -> Result<PrimeRacePlot> {
    check_race_residues(n, (a, b))?;
    let view = primes.upto(bound)?;

    let mut lead = 0i64;
    let mut last_sign = 0i64;
    let mut lead_changes = 0usize;
    let mut xs = Vec::new();
    let mut leads = Vec::new();

    for &p in view.iter() {
        if gcd(p, n) != 1 {
            continue;
        }
        let r = p % n;
        if r == a {
            lead += 1;
        } else if r == b {
            lead -= 1;
        }
        let sign = lead.signum();
        if sign != 0 {
            if last_sign != 0 && sign != last_sign {
                lead_changes += 1;
            }
            last_sign = sign;
        }
        xs.push(p);
        leads.push(lead);
    }

    let y_range = AxisRange::covering(leads.iter().map(|&l| l as f64).chain([0.0]), 0.05);

    Ok(PrimeRacePlot {
        modulus: n,
        residues: (a, b),
        bound,
        title: format!("Prime race: {} vs {} (mod {})", a, b, n),
        y_label: format!("Count difference (r={} minus r={})", a, b),
        x_range: AxisRange {
            min: 0.0,
            max: bound as f64,
        },
        y_range,
        final_lead: lead,
        lead_changes,
        primes: xs,
        leads,
    })
}

impl PlotSuite {
    /// Build every plot in `config` from a single sieve held in `cache`.
    pub fn build(config: &ExperimentConfig, cache: &mut SieveCache) -> Result<Self> {
        config.validate()?;
        let primes = cache.covering(config.max_bound())?;
        info!(
            "building plots from {} primes up to {}",
            primes.len(),
            primes.bound()
        );

        let convergence = config
            .convergence_moduli
            .iter()
            .map(|&n| {
                convergence_plot(primes, n, &config.convergence_bounds, config.normalization)
            })
            .collect::<Result<Vec<_>>>()?;
        let comparison = comparison_plot(
            primes,
            config.comparison_modulus,
            config.comparison_bound,
            config.normalization,
        )?;
        let heatmap = heatmap_plot(
            primes,
            &config.heatmap_moduli,
            config.heatmap_bound,
            config.normalization,
        )?;
        let race = prime_race_plot(
            primes,
            config.race_modulus,
            config.race_residues,
            config.race_bound,
        )?;

        Ok(Self {
            convergence,
            comparison,
            heatmap,
            race,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::estimate_density;
    use crate::residue::count_by_residue;
    use crate::sieve::generate_primes;

    #[test]
    fn test_convergence_plot_shape() {
        let primes = generate_primes(50_000);
        let plot = convergence_plot(&primes, 5, &[1_000, 10_000, 50_000], DensityNormalization::AllPrimes)
            .unwrap();
        assert_eq!(plot.series.len(), 4);
        assert_eq!(
            plot.series.iter().map(|s| s.residue).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert!(plot.series.iter().all(|s| s.values.len() == 3));
        assert_eq!(plot.reference.value, 0.25);
        assert_eq!(plot.x_range, AxisRange { min: 1_000.0, max: 50_000.0 });
        assert_eq!(plot.y_range.min, 0.0);
        assert!(plot.y_range.max > 0.25);
    }

    #[test]
    fn test_comparison_plot_mod_12() {
        let primes = generate_primes(100_000);
        let plot = comparison_plot(&primes, 12, 100_000, DensityNormalization::AllPrimes).unwrap();
        assert_eq!(plot.residues, vec![1, 5, 7, 11]);
        assert_eq!(plot.categories[0], "1 mod 12");
        assert_eq!(plot.theoretical, vec![0.25; 4]);
        for (&e, &t) in plot.empirical.iter().zip(&plot.theoretical) {
            assert!((e - t).abs() < 0.01, "empirical {} far from {}", e, t);
        }
    }

    #[test]
    fn test_heatmap_masks_non_coprime_cells() {
        let primes = generate_primes(10_000);
        let plot = heatmap_plot(&primes, &[3, 4, 6], 10_000, DensityNormalization::AllPrimes).unwrap();
        assert_eq!(plot.columns, vec![0, 1, 2, 3, 4, 5]);
        // N=3: residue 0 masked, 3..6 out of range
        assert_eq!(plot.cells[0][0], None);
        assert!(plot.cells[0][1].is_some());
        assert_eq!(plot.cells[0][3], None);
        // N=6: only 1 and 5
        let present: Vec<usize> = plot.cells[2]
            .iter()
            .enumerate()
            .filter_map(|(r, c)| c.map(|_| r))
            .collect();
        assert_eq!(present, vec![1, 5]);

        let direct = estimate_density(primes.upto(10_000).unwrap().primes(), 4).unwrap();
        assert_eq!(plot.cells[1][3], Some(direct.density(3)));
    }

    #[test]
    fn test_heatmap_requires_moduli() {
        let primes = generate_primes(100);
        assert_eq!(
            heatmap_plot(&primes, &[], 100, DensityNormalization::AllPrimes),
            Err(DirichletError::EmptyModuli)
        );
    }

    #[test]
    fn test_prime_race_final_lead_matches_counts() {
        let primes = generate_primes(100_000);
        let plot = prime_race_plot(&primes, 4, (1, 3), 100_000).unwrap();
        let counts = count_by_residue(&primes, 4).unwrap();
        assert_eq!(plot.final_lead, counts[1] as i64 - counts[3] as i64);
        // every odd prime is coprime to 4
        assert_eq!(plot.primes.len(), primes.len() - 1);
        assert_eq!(plot.primes.len(), plot.leads.len());
        // 3 leads the race from the start
        assert_eq!(plot.leads[0], -1);
        // Below 616841, class 1 leads only at 26861; 26863 ties it again.
        let ahead: Vec<u64> = plot
            .primes
            .iter()
            .zip(&plot.leads)
            .filter_map(|(&p, &l)| (l > 0).then_some(p))
            .collect();
        assert_eq!(ahead, vec![26_861]);
        assert_eq!(plot.lead_changes, 2);
    }

    #[test]
    fn test_prime_race_rejects_bad_residues() {
        let primes = generate_primes(100);
        assert!(prime_race_plot(&primes, 4, (1, 1), 100).is_err());
        assert!(prime_race_plot(&primes, 4, (1, 2), 100).is_err());
        assert!(prime_race_plot(&primes, 4, (1, 5), 100).is_err());
    }

    #[test]
    fn test_suite_is_reproducible() {
        let config = ExperimentConfig {
            convergence_bounds: vec![1_000, 5_000, 20_000],
            ..ExperimentConfig::default().with_bound(20_000)
        };
        let mut cache = SieveCache::new();
        let first = PlotSuite::build(&config, &mut cache).unwrap();
        let second = PlotSuite::build(&config, &mut cache).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.misses(), 1);
        assert_eq!(first.convergence.len(), 3);
        assert_eq!(first.heatmap.moduli, config.heatmap_moduli);
    }
}
