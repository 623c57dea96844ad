// Read-only views over the ranked table for the export collaborators.
//
// Every view is computed from `ScoredRecord`s alone; nothing here rescores
// or reloads a source.
use crate::regions::normalize;
use crate::types::{
    AbpsTotals, ColumnStats, CorrelationRow, MgnregsGapRow, RankedRegion, ScoreMatrixRow,
    ScoredRecord,
};
use crate::util::{average, median, pearson, ratio};
use std::collections::HashSet;

/// Numeric columns a collaborator can aggregate over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Index,
    AadhaarPercentage,
    AadhaarCoverageCapped,
    PdsAvg,
    RationCardSeeding,
    BeneficiarySeeding,
    AbpsCoverage,
    MsmeDensity,
    Population,
    ActiveWorkersLakh,
    AbpsEligibleLakh,
    TotalMsmes,
    ScoreAadhaarCoverage,
    ScorePdsReadiness,
    ScoreMgnregsAbps,
    ScoreMsmeDensity,
}

impl Column {
    pub fn value(self, r: &ScoredRecord) -> Option<f64> {
        match self {
            Column::Index => Some(r.row.index),
            Column::AadhaarPercentage => r.row.aadhaar_percentage,
            Column::AadhaarCoverageCapped => r.derived.aadhaar_coverage_capped,
            Column::PdsAvg => r.derived.pds_avg,
            Column::RationCardSeeding => r.row.ration_card_seeding,
            Column::BeneficiarySeeding => r.row.beneficiary_seeding,
            Column::AbpsCoverage => r.row.abps_coverage,
            Column::MsmeDensity => r.row.msme_density,
            Column::Population => r.record.aadhaar.population_2011,
            Column::ActiveWorkersLakh => r.record.active_workers_lakh(),
            Column::AbpsEligibleLakh => r.record.abps_eligible_lakh(),
            Column::TotalMsmes => r.record.total_msmes(),
            Column::ScoreAadhaarCoverage => Some(r.row.score_aadhaar_coverage),
            Column::ScorePdsReadiness => Some(r.row.score_pds_readiness),
            Column::ScoreMgnregsAbps => Some(r.row.score_mgnregs_abps),
            Column::ScoreMsmeDensity => Some(r.row.score_msme_density),
        }
    }
}

/// First `n` rows by rank. `table` must already be sorted by rank.
pub fn top_n(table: &[ScoredRecord], n: usize) -> &[ScoredRecord] {
    &table[..n.min(table.len())]
}

/// Last `n` rows by rank, still in ascending rank order.
pub fn bottom_n(table: &[ScoredRecord], n: usize) -> &[ScoredRecord] {
    &table[table.len().saturating_sub(n)..]
}

/// Sub-score pivot, one row per region in rank order.
pub fn score_matrix(table: &[ScoredRecord]) -> Vec<ScoreMatrixRow> {
    table
        .iter()
        .map(|r| ScoreMatrixRow {
            region: r.row.region.clone(),
            aadhaar_coverage: r.row.score_aadhaar_coverage,
            pds_readiness: r.row.score_pds_readiness,
            mgnregs_abps: r.row.score_mgnregs_abps,
            msme_density: r.row.score_msme_density,
            overall: r.row.index,
        })
        .collect()
}

/// The named regions present in the table, in rank order. Names go through
/// the alias table, so any known spelling selects its region.
pub fn cohort<'a, S: AsRef<str>>(
    table: &'a [ScoredRecord],
    names: &[S],
) -> Vec<&'a ScoredRecord> {
    let wanted: HashSet<_> = names.iter().filter_map(|n| normalize(n.as_ref())).collect();
    table
        .iter()
        .filter(|r| wanted.contains(&r.record.region))
        .collect()
}

/// Mean, median, sum and count over the present values of one column.
pub fn column_stats(table: &[ScoredRecord], column: Column) -> ColumnStats {
    let values: Vec<f64> = table.iter().filter_map(|r| column.value(r)).collect();
    ColumnStats {
        count: values.len(),
        mean: average(&values),
        median: median(values.clone()),
        sum: values.iter().sum(),
    }
}

/// Raw metrics compared pairwise in [`correlation_matrix`], in column order.
pub const CORRELATION_COLUMNS: [(Column, &str); 5] = [
    (Column::AadhaarPercentage, "Aadhaar_Percentage"),
    (Column::RationCardSeeding, "Ration_Card_Seeding"),
    (Column::BeneficiarySeeding, "Beneficiary_Seeding"),
    (Column::AbpsCoverage, "ABPS_Coverage"),
    (Column::MsmeDensity, "MSME_Density"),
];

/// Pairwise Pearson correlations of the raw metrics, over the regions that
/// report all five.
pub fn correlation_matrix(table: &[ScoredRecord]) -> Vec<CorrelationRow> {
    let complete: Vec<[f64; 5]> = table
        .iter()
        .filter_map(|r| {
            let mut values = [0.0; 5];
            for (slot, (column, _)) in values.iter_mut().zip(CORRELATION_COLUMNS) {
                *slot = column.value(r)?;
            }
            Some(values)
        })
        .collect();
    let series: Vec<Vec<f64>> = (0..5)
        .map(|i| complete.iter().map(|v| v[i]).collect())
        .collect();

    CORRELATION_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, (_, name))| {
            let with = |j: usize| pearson(&series[i], &series[j]);
            CorrelationRow {
                metric: *name,
                aadhaar_percentage: with(0),
                ration_card_seeding: with(1),
                beneficiary_seeding: with(2),
                abps_coverage: with(3),
                msme_density: with(4),
            }
        })
        .collect()
}

/// Regions with the largest shortfall of ABPS-eligible workers.
pub fn mgnregs_gap(table: &[ScoredRecord], n: usize) -> Vec<MgnregsGapRow> {
    let mut rows: Vec<MgnregsGapRow> = table
        .iter()
        .filter_map(|r| {
            let active = r.record.active_workers_lakh()?;
            let eligible = r.record.abps_eligible_lakh()?;
            Some(MgnregsGapRow {
                region: r.row.region.clone(),
                active_workers_lakh: active,
                abps_eligible_lakh: eligible,
                gap_lakh: active - eligible,
            })
        })
        .collect();
    rows.sort_by(|a, b| b.gap_lakh.total_cmp(&a.gap_lakh));
    rows.truncate(n);
    rows
}

pub fn national_abps(table: &[ScoredRecord]) -> AbpsTotals {
    let active = column_stats(table, Column::ActiveWorkersLakh).sum;
    let eligible = column_stats(table, Column::AbpsEligibleLakh).sum;
    AbpsTotals {
        active_workers_lakh: active,
        abps_eligible_lakh: eligible,
        coverage_pct: ratio(Some(eligible), Some(active), 100.0),
    }
}

pub fn ranked<'a>(records: impl IntoIterator<Item = &'a ScoredRecord>) -> Vec<RankedRegion> {
    records
        .into_iter()
        .map(|r| RankedRegion {
            rank: r.row.rank,
            region: r.row.region.clone(),
            index: r.row.index,
        })
        .collect()
}
