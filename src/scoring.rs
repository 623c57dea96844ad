//! Derived dimensions and min-max rescaling onto 0-100.
//!
//! Scores are relative to the observed population: each column is rescaled
//! against its own minimum and maximum across all regions. Missing inputs
//! stay missing here; the composite step decides what missing means.
use crate::types::{DerivedMetrics, Dimension, MasterRecord, ScoredMaster, SubScores};
use crate::util::{mean_present, ratio, round2};
use tracing::debug;

/// Neutral score given to every region when a column has no spread.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// MSME density is reported per this many residents.
pub const DENSITY_PER: f64 = 10_000.0;

/// Coverage percentages above this are census artefacts and get capped.
pub const COVERAGE_CAP: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// Rescale one metric column onto 0-100.
///
/// When every present value is equal, or none is present, every entry
/// (missing ones included) scores [`NEUTRAL_SCORE`].
pub fn min_max_scores(values: &[Option<f64>], direction: Direction) -> Vec<Option<f64>> {
    let (min, max) = values
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });

    // an empty column leaves min at +inf and max at -inf
    let range = max - min;
    if range <= 0.0 {
        return vec![Some(NEUTRAL_SCORE); values.len()];
    }

    values
        .iter()
        .map(|v| {
            v.map(|v| {
                let scaled = match direction {
                    Direction::HigherIsBetter => (v - min) / range * 100.0,
                    Direction::LowerIsBetter => (max - v) / range * 100.0,
                };
                round2(scaled)
            })
        })
        .collect()
}

pub fn derive_metrics(record: &MasterRecord) -> DerivedMetrics {
    DerivedMetrics {
        aadhaar_coverage_capped: record
            .aadhaar
            .aadhaar_percentage
            .map(|p| p.min(COVERAGE_CAP)),
        pds_avg: mean_present(&[
            record.ration_card_seeding(),
            record.beneficiary_seeding(),
            record.fps_automation(),
        ]),
        msme_density: ratio(
            record.total_msmes(),
            record.aadhaar.population_2011,
            DENSITY_PER,
        ),
    }
}

/// Raw metric feeding each dimension.
fn dimension_input(dim: Dimension, record: &MasterRecord, derived: &DerivedMetrics) -> Option<f64> {
    match dim {
        Dimension::AadhaarCoverage => derived.aadhaar_coverage_capped,
        Dimension::PdsReadiness => derived.pds_avg,
        Dimension::MgnregsAbps => record.abps_coverage(),
        Dimension::MsmeDensity => derived.msme_density,
    }
}

pub fn direction(dim: Dimension) -> Direction {
    match dim {
        Dimension::AadhaarCoverage
        | Dimension::PdsReadiness
        | Dimension::MgnregsAbps
        | Dimension::MsmeDensity => Direction::HigherIsBetter,
    }
}

/// Derive metrics for every region, then score each dimension column.
pub fn score(records: Vec<MasterRecord>) -> Vec<ScoredMaster> {
    let derived: Vec<DerivedMetrics> = records.iter().map(derive_metrics).collect();
    let mut scores = vec![SubScores::default(); records.len()];

    for dim in Dimension::ALL {
        let column: Vec<Option<f64>> = records
            .iter()
            .zip(&derived)
            .map(|(r, d)| dimension_input(dim, r, d))
            .collect();
        let present = column.iter().flatten().count();
        debug!(dimension = dim.label(), present, "scoring column");
        for (slot, value) in scores.iter_mut().zip(min_max_scores(&column, direction(dim))) {
            slot.set(dim, value);
        }
    }

    records
        .into_iter()
        .zip(derived)
        .zip(scores)
        .map(|((record, derived), scores)| ScoredMaster {
            record,
            derived,
            scores,
        })
        .collect()
}
