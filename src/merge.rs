// Left join of the non-anchor sources onto the anchor (Aadhaar) table.
//
// The anchor enumerates the region universe: every anchor region appears once,
// in anchor order, and regions that only show up in another source are left
// out of the master table.
use crate::config::SourceId;
use crate::types::{AadhaarRow, CleanedTable, MasterRecord, MgnregsRow, MsmeRow, PdsRow};
use tracing::{debug, info};

/// The cleaned non-anchor sources.
#[derive(Debug, Clone, Default)]
pub struct OtherSources {
    pub pds: CleanedTable<PdsRow>,
    pub mgnregs: CleanedTable<MgnregsRow>,
    pub msme: CleanedTable<MsmeRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub regions: usize,
    /// Anchor regions with no row in the given source.
    pub unmatched: Vec<(SourceId, String)>,
    /// Non-anchor regions left out because the anchor does not list them.
    pub excluded: Vec<(SourceId, String)>,
}

pub fn merge(
    anchor: &CleanedTable<AadhaarRow>,
    others: &OtherSources,
) -> (Vec<MasterRecord>, MergeReport) {
    let mut report = MergeReport::default();

    let records: Vec<MasterRecord> = anchor
        .iter()
        .map(|(key, aadhaar)| {
            let record = MasterRecord {
                region: key.clone(),
                aadhaar: aadhaar.clone(),
                pds: others.pds.get(key).cloned(),
                mgnregs: others.mgnregs.get(key).cloned(),
                msme: others.msme.get(key).cloned(),
            };
            for (source, present) in [
                (SourceId::Pds, record.pds.is_some()),
                (SourceId::Mgnregs, record.mgnregs.is_some()),
                (SourceId::Msme, record.msme.is_some()),
            ] {
                if !present {
                    debug!(%source, region = %key, "no row for anchor region");
                    report.unmatched.push((source, key.to_string()));
                }
            }
            record
        })
        .collect();

    let excluded = others
        .pds
        .keys()
        .map(|k| (SourceId::Pds, k))
        .chain(others.mgnregs.keys().map(|k| (SourceId::Mgnregs, k)))
        .chain(others.msme.keys().map(|k| (SourceId::Msme, k)))
        .filter(|(_, k)| !anchor.contains(k));
    for (source, key) in excluded {
        debug!(%source, region = %key, "region absent from anchor, excluded");
        report.excluded.push((source, key.to_string()));
    }

    report.regions = records.len();
    info!(
        regions = report.regions,
        unmatched = report.unmatched.len(),
        excluded = report.excluded.len(),
        "built master table"
    );
    (records, report)
}
