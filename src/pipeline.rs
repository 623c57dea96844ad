// load -> clean -> merge -> score -> rank, strictly in that order. Each stage
// takes the previous stage's output and returns a new value.
use crate::cleaning::{clean_aadhaar, clean_mgnregs, clean_msme, clean_pds, CleanReport};
use crate::config::{Config, SourceId};
use crate::index::rank;
use crate::loader::load_raw_table;
use crate::merge::{merge, MergeReport, OtherSources};
use crate::scoring::score;
use crate::types::{RawTable, ScoredRecord};
use anyhow::{Context, Result};
use tracing::info;

/// Everything one run produces.
#[derive(Debug)]
pub struct RunOutput {
    /// Ranked table, ascending by rank.
    pub table: Vec<ScoredRecord>,
    pub clean_reports: Vec<(SourceId, CleanReport)>,
    pub merge_report: MergeReport,
}

struct RawSources {
    aadhaar: RawTable,
    pds: RawTable,
    mgnregs: RawTable,
    msme: RawTable,
}

fn load_all(config: &Config) -> Result<RawSources> {
    let load = |source| load_raw_table(source, &config.source_path(source));
    Ok(RawSources {
        aadhaar: load(SourceId::Aadhaar)?,
        pds: load(SourceId::Pds)?,
        mgnregs: load(SourceId::Mgnregs)?,
        msme: load(SourceId::Msme)?,
    })
}

pub fn run(config: &Config) -> Result<RunOutput> {
    config.validate().context("invalid configuration")?;

    let raw = load_all(config)?;

    let (anchor, aadhaar_report) = clean_aadhaar(&raw.aadhaar);
    let (pds, pds_report) = clean_pds(&raw.pds);
    let (mgnregs, mgnregs_report) = clean_mgnregs(&raw.mgnregs);
    let (msme, msme_report) = clean_msme(&raw.msme)?;
    let clean_reports = vec![
        (SourceId::Aadhaar, aadhaar_report),
        (SourceId::Pds, pds_report),
        (SourceId::Mgnregs, mgnregs_report),
        (SourceId::Msme, msme_report),
    ];
    for (source, report) in &clean_reports {
        info!(
            %source,
            read = report.rows_read,
            kept = report.rows_kept,
            dropped = report.rows_dropped,
            unknown = report.unknown_names.len(),
            duplicates = report.duplicates,
            merged_parts = report.merged_parts,
            missing_numbers = report.missing_numbers,
            "cleaned"
        );
    }

    let others = OtherSources { pds, mgnregs, msme };
    let (master, merge_report) = merge(&anchor, &others);
    let table = rank(score(master), &config.weights);
    info!(regions = table.len(), "index computed");

    Ok(RunOutput {
        table,
        clean_reports,
        merge_report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_sources(dir: &Path, config: &Config) {
        let files = &config.sources;
        fs::write(
            dir.join(&files.aadhaar),
            "Sl. No.,State,Population (2011),Aadhaar Generated,Saturation %\n\
             1,Kerala,100000,104000,104.0\n\
             2,A & N Islands,10000,9000,90.0\n\
             3,Bihar,200000,160000,80.0\n\
             4,Goa,50000,45000,90.0\n\
             ,Total,360000,318000,88.3\n",
        )
        .unwrap();
        fs::write(
            dir.join(&files.pds),
            "Sl No,Name of State,RC seeding,Beneficiary seeding,FPS automation\n\
             1,Kerala,100,100,100\n\
             2,Andaman & Nicobar,90,90,NA\n\
             3,Bihar,80,70,60\n\
             4,Atlantis,1,1,1\n\
             ,Grand Total,,,\n",
        )
        .unwrap();
        fs::write(
            dir.join(&files.mgnregs),
            "S.No.,State/UT,Active workers (lakh),ABPS eligible (lakh)\n\
             1,Kerala,10,10\n\
             2,Bihar,80,40\n\
             3,Goa,0,0\n",
        )
        .unwrap();
        fs::write(
            dir.join(&files.msme),
            "Sl. No.,State/UT,Micro,Small,Medium,Total\n\
             1,Kerala,900,90,10,1000\n\
             2,Andaman & Nicobar Island,90,9,1,100\n\
             3,Bihar,500,0,0,500\n\
             4,Goa,200,40,10,250\n\
             ,Total,1690,139,21,1850\n",
        )
        .unwrap();
    }

    fn config_for(dir: &Path) -> Config {
        Config {
            data_dir: dir.to_path_buf(),
            output_dir: dir.join("out"),
            ..Config::default()
        }
    }

    #[test]
    fn end_to_end_ranking() {
        let tmp = tempdir().unwrap();
        let config = config_for(tmp.path());
        write_sources(tmp.path(), &config);

        let out = run(&config).unwrap();
        let names: Vec<&str> = out.table.iter().map(|r| r.row.region.as_str()).collect();
        assert_eq!(names.len(), 4);
        assert_eq!(names[0], "Kerala");
        assert!(names.contains(&"Andaman and Nicobar Islands"));
        assert!(!names.contains(&"Atlantis"));

        for r in &out.table {
            assert!((0.0..=100.0).contains(&r.row.index));
            for dim in crate::types::Dimension::ALL {
                assert!((0.0..=100.0).contains(&r.score(dim)));
            }
        }
        let ranks: Vec<usize> = out.table.iter().map(|r| r.row.rank).collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));

        // Goa has no PDS row and a zero-denominator MGNREGS row
        let goa = out.table.iter().find(|r| r.row.region == "Goa").unwrap();
        assert_eq!(goa.row.score_pds_readiness, 0.0);
        assert_eq!(goa.row.abps_coverage, None);
        assert_eq!(goa.row.score_mgnregs_abps, 0.0);

        let kerala = &out.table[0];
        assert_eq!(kerala.derived.aadhaar_coverage_capped, Some(100.0));
        assert_eq!(kerala.row.msme_density, Some(100.0));

        assert_eq!(
            out.merge_report.excluded,
            vec![(SourceId::Pds, "Atlantis".to_string())]
        );
        let (_, pds_report) = &out.clean_reports[1];
        assert_eq!(pds_report.rows_dropped, 1);
        assert_eq!(pds_report.unknown_names, vec!["Atlantis".to_string()]);
    }

    #[test]
    fn missing_source_is_fatal_and_named() {
        let tmp = tempdir().unwrap();
        let config = config_for(tmp.path());
        write_sources(tmp.path(), &config);
        fs::remove_file(tmp.path().join(&config.sources.mgnregs)).unwrap();

        let err = format!("{:#}", run(&config).unwrap_err());
        assert!(err.contains("mgnregs"), "{err}");
    }

    #[test]
    fn invalid_weights_stop_the_run() {
        let tmp = tempdir().unwrap();
        let mut config = config_for(tmp.path());
        config.weights.msme_density = 1;
        assert!(run(&config).is_err());
    }
}
