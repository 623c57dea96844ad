use crate::config::SourceId;
use crate::types::RawTable;
use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::{info, warn};

/// Read one source file fully into memory.
///
/// A missing or unreadable file is fatal and names the source; a malformed
/// record is skipped with a warning.
pub fn load_raw_table(source: SourceId, path: &Path) -> Result<RawTable> {
    if !path.is_file() {
        bail!("source `{}` not found at {}", source, path.display());
    }
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening source `{}` ({})", source, path.display()))?;

    let headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("reading header row of source `{}`", source))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (line, result) in rdr.records().enumerate() {
        match result {
            Ok(record) => rows.push(record.iter().map(str::to_string).collect()),
            Err(e) => {
                skipped += 1;
                warn!(%source, line = line + 2, "skipping malformed record: {}", e);
            }
        }
    }

    info!(%source, rows = rows.len(), skipped, "loaded {}", path.display());
    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_names_the_source() {
        let tmp = tempdir().unwrap();
        let err = load_raw_table(SourceId::Mgnregs, &tmp.path().join("nope.csv")).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("mgnregs"), "{msg}");
        assert!(msg.contains("nope.csv"), "{msg}");
    }

    #[test]
    fn reads_headers_and_ragged_rows() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("pds.csv");
        fs::write(
            &path,
            "Sl. No., State/UT ,A,B,C\n1,Kerala,100,99.5,98\n2,Goa,100\n,Total,,,\n",
        )
        .unwrap();

        let table = load_raw_table(SourceId::Pds, &path).unwrap();
        assert_eq!(table.headers[1], "State/UT");
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1].len(), 3);
        assert_eq!(table.cell(1, 4), None);
        assert_eq!(table.cell(0, 3), Some("99.5"));
    }
}
