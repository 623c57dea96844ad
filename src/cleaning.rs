//! Per-source cleaning: raw positional cells into typed, region-keyed rows.
//!
//! Agencies publish the same kind of table with different (and sometimes
//! meaningless) headers, so the positional sources are read through a fixed
//! column layout per source. The MSME table is wide and only its `State/UT`
//! and `Total` columns matter, so it is addressed by header.
use crate::config::SourceId;
use crate::regions::{aliases, RegionKey, Resolution};
use crate::types::{
    AadhaarRow, CleanedTable, CombineParts, MgnregsRow, MsmeRow, PdsRow, RawTable,
};
use crate::util::{parse_f64_safe, ratio};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Column positions in the Aadhaar saturation table.
#[derive(Debug, Clone, Copy)]
pub struct AadhaarColumns {
    pub region: usize,
    pub population_2011: usize,
    pub aadhaar_generated: usize,
    pub aadhaar_percentage: usize,
}

pub const AADHAAR_COLUMNS: AadhaarColumns = AadhaarColumns {
    region: 1,
    population_2011: 2,
    aadhaar_generated: 3,
    aadhaar_percentage: 4,
};

#[derive(Debug, Clone, Copy)]
pub struct PdsColumns {
    pub region: usize,
    pub ration_card_seeding: usize,
    pub beneficiary_seeding: usize,
    pub fps_automation: usize,
}

pub const PDS_COLUMNS: PdsColumns = PdsColumns {
    region: 1,
    ration_card_seeding: 2,
    beneficiary_seeding: 3,
    fps_automation: 4,
};

#[derive(Debug, Clone, Copy)]
pub struct MgnregsColumns {
    pub region: usize,
    pub active_workers_lakh: usize,
    pub abps_eligible_lakh: usize,
}

pub const MGNREGS_COLUMNS: MgnregsColumns = MgnregsColumns {
    region: 1,
    active_workers_lakh: 2,
    abps_eligible_lakh: 3,
};

pub const MSME_REGION_HEADER: &str = "State/UT";
pub const MSME_TOTAL_HEADER: &str = "Total";

/// What happened to the rows of one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    /// Blank region cells and aggregate/footer rows.
    pub rows_dropped: usize,
    /// Region names that matched nothing in the alias table.
    pub unknown_names: Vec<String>,
    /// Rows that replaced an earlier row for the same region.
    pub duplicates: usize,
    /// Pre-merger territory rows summed into their joint region.
    pub merged_parts: usize,
    /// Numeric cells that were present but not a usable number.
    pub missing_numbers: usize,
}

/// Shared row walk: resolve the region, build the typed row, insert last-wins.
/// Rows of distinct pre-merger parts are combined instead of replaced.
fn clean_rows<T: CombineParts>(
    source: SourceId,
    raw: &RawTable,
    region_column: usize,
    mut build: impl FnMut(usize, &mut CleanReport) -> T,
) -> (CleanedTable<T>, CleanReport) {
    let mut table: CleanedTable<T> = CleanedTable::new();
    let mut report = CleanReport::default();
    // parts folded into each joint key so far
    let mut parts_seen: HashMap<RegionKey, Vec<&'static str>> = HashMap::new();

    for row in 0..raw.rows.len() {
        report.rows_read += 1;
        let name = raw.cell(row, region_column).unwrap_or("");
        let (key, part) = match aliases().resolve(name) {
            Resolution::Dropped => {
                debug!(%source, row, "dropping aggregate/blank row {:?}", name);
                report.rows_dropped += 1;
                continue;
            }
            Resolution::Known(key) => (key, None),
            Resolution::Part(key, part) => (key, Some(part)),
            Resolution::Unknown(key) => {
                warn!(%source, "region name {:?} not in alias table, using as-is", key.as_str());
                report.unknown_names.push(key.as_str().to_string());
                (key, None)
            }
        };
        let value = build(row, &mut report);

        let new_part = part.filter(|p| {
            parts_seen
                .get(&key)
                .map_or(false, |seen| !seen.contains(p))
        });
        if let (Some(p), Some(existing)) = (new_part, table.get_mut(&key)) {
            debug!(%source, region = %key, part = p, "combining pre-merger territory rows");
            existing.absorb(value);
            parts_seen.entry(key).or_default().push(p);
            report.merged_parts += 1;
            continue;
        }

        if table.insert(key.clone(), value) {
            warn!(%source, region = %key, "duplicate region row, keeping the later one");
            report.duplicates += 1;
        }
        match part {
            Some(p) => {
                parts_seen.insert(key, vec![p]);
            }
            None => {
                parts_seen.remove(&key);
            }
        }
    }

    report.rows_kept = table.len();
    (table, report)
}

/// Coerce one cell, counting present-but-unusable content.
fn number(raw: &RawTable, row: usize, col: usize, report: &mut CleanReport) -> Option<f64> {
    let cell = raw.cell(row, col);
    let value = parse_f64_safe(cell);
    if value.is_none() && cell.map_or(false, |c| !c.trim().is_empty()) {
        report.missing_numbers += 1;
    }
    value
}

pub fn clean_aadhaar(raw: &RawTable) -> (CleanedTable<AadhaarRow>, CleanReport) {
    let c = AADHAAR_COLUMNS;
    clean_rows(SourceId::Aadhaar, raw, c.region, |row, report| AadhaarRow {
        population_2011: number(raw, row, c.population_2011, report),
        aadhaar_generated: number(raw, row, c.aadhaar_generated, report),
        aadhaar_percentage: number(raw, row, c.aadhaar_percentage, report),
    })
}

pub fn clean_pds(raw: &RawTable) -> (CleanedTable<PdsRow>, CleanReport) {
    let c = PDS_COLUMNS;
    clean_rows(SourceId::Pds, raw, c.region, |row, report| PdsRow {
        ration_card_seeding: number(raw, row, c.ration_card_seeding, report),
        beneficiary_seeding: number(raw, row, c.beneficiary_seeding, report),
        fps_automation: number(raw, row, c.fps_automation, report),
    })
}

pub fn clean_mgnregs(raw: &RawTable) -> (CleanedTable<MgnregsRow>, CleanReport) {
    let c = MGNREGS_COLUMNS;
    clean_rows(SourceId::Mgnregs, raw, c.region, |row, report| {
        let active = number(raw, row, c.active_workers_lakh, report);
        let eligible = number(raw, row, c.abps_eligible_lakh, report);
        MgnregsRow {
            active_workers_lakh: active,
            abps_eligible_lakh: eligible,
            abps_coverage: ratio(eligible, active, 100.0),
        }
    })
}

pub fn clean_msme(raw: &RawTable) -> Result<(CleanedTable<MsmeRow>, CleanReport)> {
    let region_col = raw.column_index(MSME_REGION_HEADER).ok_or_else(|| {
        anyhow!(
            "source `{}` has no `{}` column (headers: {:?})",
            SourceId::Msme,
            MSME_REGION_HEADER,
            raw.headers
        )
    })?;
    let total_col = raw.column_index(MSME_TOTAL_HEADER).ok_or_else(|| {
        anyhow!(
            "source `{}` has no `{}` column (headers: {:?})",
            SourceId::Msme,
            MSME_TOTAL_HEADER,
            raw.headers
        )
    })?;
    Ok(clean_rows(SourceId::Msme, raw, region_col, |row, report| {
        MsmeRow {
            total_msmes: number(raw, row, total_col, report),
        }
    }))
}
