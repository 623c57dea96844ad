use crate::regions::RegionKey;
use crate::util::{format_opt, mean_present, ratio};
use serde::Serialize;
use std::collections::HashMap;
use tabled::Tabled;

/// One input file as read from disk: header row plus positional cells.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Position of a header, compared case-insensitively after trimming.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AadhaarRow {
    pub population_2011: Option<f64>,
    pub aadhaar_generated: Option<f64>,
    pub aadhaar_percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdsRow {
    pub ration_card_seeding: Option<f64>,
    pub beneficiary_seeding: Option<f64>,
    pub fps_automation: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MgnregsRow {
    pub active_workers_lakh: Option<f64>,
    pub abps_eligible_lakh: Option<f64>,
    /// `abps_eligible_lakh / active_workers_lakh * 100`, 2 decimals.
    pub abps_coverage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MsmeRow {
    pub total_msmes: Option<f64>,
}

/// Missing unless both sides are present.
fn sum_both(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? + b?)
}

/// Folding the row of one pre-merger territory into its sibling's, so a
/// merged region carries both parts. Counts add up; percentages are rebuilt
/// from the summed counts where the row has them.
pub trait CombineParts {
    fn absorb(&mut self, other: Self);
}

impl CombineParts for AadhaarRow {
    fn absorb(&mut self, other: Self) {
        self.population_2011 = sum_both(self.population_2011, other.population_2011);
        self.aadhaar_generated = sum_both(self.aadhaar_generated, other.aadhaar_generated);
        self.aadhaar_percentage = ratio(self.aadhaar_generated, self.population_2011, 100.0);
    }
}

impl CombineParts for PdsRow {
    // Seeding rates come without a base, so parts are averaged.
    fn absorb(&mut self, other: Self) {
        self.ration_card_seeding =
            mean_present(&[self.ration_card_seeding, other.ration_card_seeding]);
        self.beneficiary_seeding =
            mean_present(&[self.beneficiary_seeding, other.beneficiary_seeding]);
        self.fps_automation = mean_present(&[self.fps_automation, other.fps_automation]);
    }
}

impl CombineParts for MgnregsRow {
    fn absorb(&mut self, other: Self) {
        self.active_workers_lakh = sum_both(self.active_workers_lakh, other.active_workers_lakh);
        self.abps_eligible_lakh = sum_both(self.abps_eligible_lakh, other.abps_eligible_lakh);
        self.abps_coverage = ratio(self.abps_eligible_lakh, self.active_workers_lakh, 100.0);
    }
}

impl CombineParts for MsmeRow {
    fn absorb(&mut self, other: Self) {
        self.total_msmes = sum_both(self.total_msmes, other.total_msmes);
    }
}

/// Rows of one source keyed uniquely by region, in first-seen order.
#[derive(Debug, Clone)]
pub struct CleanedTable<T> {
    rows: Vec<(RegionKey, T)>,
    index: HashMap<RegionKey, usize>,
}

impl<T> Default for CleanedTable<T> {
    fn default() -> Self {
        CleanedTable {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> CleanedTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row; a later row for the same region replaces the earlier one
    /// in place. Returns `true` when a row was replaced.
    pub fn insert(&mut self, key: RegionKey, row: T) -> bool {
        match self.index.get(&key) {
            Some(&pos) => {
                self.rows[pos].1 = row;
                true
            }
            None => {
                self.index.insert(key.clone(), self.rows.len());
                self.rows.push((key, row));
                false
            }
        }
    }

    pub fn get(&self, key: &RegionKey) -> Option<&T> {
        self.index.get(key).map(|&pos| &self.rows[pos].1)
    }

    pub fn get_mut(&mut self, key: &RegionKey) -> Option<&mut T> {
        let pos = *self.index.get(key)?;
        Some(&mut self.rows[pos].1)
    }

    pub fn contains(&self, key: &RegionKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RegionKey, &T)> {
        self.rows.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &RegionKey> {
        self.rows.iter().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T> FromIterator<(RegionKey, T)> for CleanedTable<T> {
    fn from_iter<I: IntoIterator<Item = (RegionKey, T)>>(iter: I) -> Self {
        let mut table = CleanedTable::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

/// The four scored dimensions, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    AadhaarCoverage,
    PdsReadiness,
    MgnregsAbps,
    MsmeDensity,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::AadhaarCoverage,
        Dimension::PdsReadiness,
        Dimension::MgnregsAbps,
        Dimension::MsmeDensity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::AadhaarCoverage => "Aadhaar Coverage",
            Dimension::PdsReadiness => "PDS Readiness",
            Dimension::MgnregsAbps => "MGNREGS ABPS",
            Dimension::MsmeDensity => "MSME Density",
        }
    }
}

/// Sub-scores per dimension; `None` only before compositing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubScores {
    pub aadhaar_coverage: Option<f64>,
    pub pds_readiness: Option<f64>,
    pub mgnregs_abps: Option<f64>,
    pub msme_density: Option<f64>,
}

impl SubScores {
    pub fn get(&self, dim: Dimension) -> Option<f64> {
        match dim {
            Dimension::AadhaarCoverage => self.aadhaar_coverage,
            Dimension::PdsReadiness => self.pds_readiness,
            Dimension::MgnregsAbps => self.mgnregs_abps,
            Dimension::MsmeDensity => self.msme_density,
        }
    }

    pub fn set(&mut self, dim: Dimension, value: Option<f64>) {
        match dim {
            Dimension::AadhaarCoverage => self.aadhaar_coverage = value,
            Dimension::PdsReadiness => self.pds_readiness = value,
            Dimension::MgnregsAbps => self.mgnregs_abps = value,
            Dimension::MsmeDensity => self.msme_density = value,
        }
    }
}

/// One region after the left join, before scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterRecord {
    pub region: RegionKey,
    pub aadhaar: AadhaarRow,
    pub pds: Option<PdsRow>,
    pub mgnregs: Option<MgnregsRow>,
    pub msme: Option<MsmeRow>,
}

impl MasterRecord {
    pub fn ration_card_seeding(&self) -> Option<f64> {
        self.pds.as_ref().and_then(|p| p.ration_card_seeding)
    }

    pub fn beneficiary_seeding(&self) -> Option<f64> {
        self.pds.as_ref().and_then(|p| p.beneficiary_seeding)
    }

    pub fn fps_automation(&self) -> Option<f64> {
        self.pds.as_ref().and_then(|p| p.fps_automation)
    }

    pub fn active_workers_lakh(&self) -> Option<f64> {
        self.mgnregs.as_ref().and_then(|m| m.active_workers_lakh)
    }

    pub fn abps_eligible_lakh(&self) -> Option<f64> {
        self.mgnregs.as_ref().and_then(|m| m.abps_eligible_lakh)
    }

    pub fn abps_coverage(&self) -> Option<f64> {
        self.mgnregs.as_ref().and_then(|m| m.abps_coverage)
    }

    pub fn total_msmes(&self) -> Option<f64> {
        self.msme.as_ref().and_then(|m| m.total_msmes)
    }
}

/// Derived per-region metrics computed before normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DerivedMetrics {
    pub aadhaar_coverage_capped: Option<f64>,
    pub pds_avg: Option<f64>,
    pub msme_density: Option<f64>,
}

/// A merged record with its derived metrics and raw sub-scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMaster {
    pub record: MasterRecord,
    pub derived: DerivedMetrics,
    pub scores: SubScores,
}

/// Final exported row: one per region, sorted by rank.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct IndexRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "State")]
    #[tabled(rename = "State")]
    pub region: String,
    #[serde(rename = "Digital_Readiness_Index")]
    #[tabled(rename = "Index", display_with = "display_score")]
    pub index: f64,
    #[serde(rename = "Aadhaar_Percentage")]
    #[tabled(rename = "Aadhaar %", display_with = "display_metric")]
    pub aadhaar_percentage: Option<f64>,
    #[serde(rename = "Ration_Card_Seeding")]
    #[tabled(skip)]
    pub ration_card_seeding: Option<f64>,
    #[serde(rename = "Beneficiary_Seeding")]
    #[tabled(skip)]
    pub beneficiary_seeding: Option<f64>,
    #[serde(rename = "ABPS_Coverage")]
    #[tabled(rename = "ABPS %", display_with = "display_metric")]
    pub abps_coverage: Option<f64>,
    #[serde(rename = "MSME_Density")]
    #[tabled(rename = "MSME/10k", display_with = "display_metric")]
    pub msme_density: Option<f64>,
    #[serde(rename = "Score_Aadhaar_Coverage")]
    #[tabled(rename = "Aadhaar", display_with = "display_score")]
    pub score_aadhaar_coverage: f64,
    #[serde(rename = "Score_PDS_Readiness")]
    #[tabled(rename = "PDS", display_with = "display_score")]
    pub score_pds_readiness: f64,
    #[serde(rename = "Score_MGNREGS_ABPS")]
    #[tabled(rename = "MGNREGS", display_with = "display_score")]
    pub score_mgnregs_abps: f64,
    #[serde(rename = "Score_MSME_Density")]
    #[tabled(rename = "MSME", display_with = "display_score")]
    pub score_msme_density: f64,
}

fn display_metric(v: &Option<f64>) -> String {
    format_opt(*v, 2)
}

fn display_score(v: &f64) -> String {
    format!("{:.2}", v)
}

/// A scored region: the exported row plus the merged inputs it came from, so
/// every collaborator view can be computed without rescoring.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub row: IndexRow,
    pub record: MasterRecord,
    pub derived: DerivedMetrics,
}

impl ScoredRecord {
    pub fn score(&self, dim: Dimension) -> f64 {
        match dim {
            Dimension::AadhaarCoverage => self.row.score_aadhaar_coverage,
            Dimension::PdsReadiness => self.row.score_pds_readiness,
            Dimension::MgnregsAbps => self.row.score_mgnregs_abps,
            Dimension::MsmeDensity => self.row.score_msme_density,
        }
    }
}

/// Pivot row for the score matrix: sub-scores plus the overall index.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct ScoreMatrixRow {
    #[serde(rename = "State")]
    #[tabled(rename = "State")]
    pub region: String,
    #[serde(rename = "Aadhaar_Coverage")]
    #[tabled(rename = "Aadhaar", display_with = "display_score")]
    pub aadhaar_coverage: f64,
    #[serde(rename = "PDS_Readiness")]
    #[tabled(rename = "PDS", display_with = "display_score")]
    pub pds_readiness: f64,
    #[serde(rename = "MGNREGS_ABPS")]
    #[tabled(rename = "MGNREGS", display_with = "display_score")]
    pub mgnregs_abps: f64,
    #[serde(rename = "MSME_Density")]
    #[tabled(rename = "MSME", display_with = "display_score")]
    pub msme_density: f64,
    #[serde(rename = "Overall_Index")]
    #[tabled(rename = "Overall", display_with = "display_score")]
    pub overall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct MgnregsGapRow {
    #[serde(rename = "State")]
    #[tabled(rename = "State")]
    pub region: String,
    #[serde(rename = "Active_Workers_Lakh")]
    #[tabled(rename = "Active (L)", display_with = "display_score")]
    pub active_workers_lakh: f64,
    #[serde(rename = "ABPS_Eligible_Lakh")]
    #[tabled(rename = "Eligible (L)", display_with = "display_score")]
    pub abps_eligible_lakh: f64,
    #[serde(rename = "Gap_Lakh")]
    #[tabled(rename = "Gap (L)", display_with = "display_score")]
    pub gap_lakh: f64,
}

/// One row of the metric correlation matrix. `None` where a column has no
/// spread over the complete rows.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct CorrelationRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: &'static str,
    #[serde(rename = "Aadhaar_Percentage")]
    #[tabled(rename = "Aadhaar %", display_with = "display_metric")]
    pub aadhaar_percentage: Option<f64>,
    #[serde(rename = "Ration_Card_Seeding")]
    #[tabled(rename = "RC seeding", display_with = "display_metric")]
    pub ration_card_seeding: Option<f64>,
    #[serde(rename = "Beneficiary_Seeding")]
    #[tabled(rename = "Ben. seeding", display_with = "display_metric")]
    pub beneficiary_seeding: Option<f64>,
    #[serde(rename = "ABPS_Coverage")]
    #[tabled(rename = "ABPS %", display_with = "display_metric")]
    pub abps_coverage: Option<f64>,
    #[serde(rename = "MSME_Density")]
    #[tabled(rename = "MSME/10k", display_with = "display_metric")]
    pub msme_density: Option<f64>,
}

/// Aggregate statistics over one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub sum: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AbpsTotals {
    pub active_workers_lakh: f64,
    pub abps_eligible_lakh: f64,
    /// `None` when no active workers were reported.
    pub coverage_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedRegion {
    pub rank: usize,
    pub region: String,
    pub index: f64,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub total_regions: usize,
    pub index: ColumnStats,
    pub weights_bps: [u32; 4],
    pub top: Vec<RankedRegion>,
    pub bottom: Vec<RankedRegion>,
    pub cohort_name: String,
    pub cohort: Vec<RankedRegion>,
    pub national_abps: AbpsTotals,
}
