// Summary artefacts built from the ranked table: the JSON summary and the
// Markdown summary document.
use crate::config::Config;
use crate::output::markdown_table;
use crate::types::{Dimension, IndexRow, ScoredRecord, SummaryStats};
use crate::util::{format_int, format_number, format_opt};
use crate::views::{
    bottom_n, cohort, column_stats, correlation_matrix, mgnregs_gap, national_abps, ranked,
    score_matrix, top_n, Column,
};
use anyhow::Result;
use std::fmt::{self, Write};

const SUMMARY_HEAD: usize = 5;
pub const GAP_ROWS: usize = 15;

pub fn generate_summary(table: &[ScoredRecord], config: &Config) -> SummaryStats {
    SummaryStats {
        generated_at: chrono::Utc::now(),
        total_regions: table.len(),
        index: column_stats(table, Column::Index),
        weights_bps: config.weights.basis_points(),
        top: ranked(top_n(table, SUMMARY_HEAD)),
        bottom: ranked(bottom_n(table, SUMMARY_HEAD)),
        cohort_name: config.cohort.name.clone(),
        cohort: ranked(cohort(table, &config.cohort.regions)),
        national_abps: national_abps(table),
    }
}

fn rows(records: &[ScoredRecord]) -> Vec<IndexRow> {
    records.iter().map(|r| r.row.clone()).collect()
}

/// The Markdown summary document.
pub fn render_markdown(
    table: &[ScoredRecord],
    summary: &SummaryStats,
    config: &Config,
) -> Result<String> {
    let mut doc = String::new();
    write_document(&mut doc, table, summary, config)?;
    Ok(doc)
}

fn write_document(
    doc: &mut String,
    table: &[ScoredRecord],
    summary: &SummaryStats,
    config: &Config,
) -> fmt::Result {
    let n = config.top_n;
    writeln!(doc, "# Digital Readiness Index\n")?;
    writeln!(
        doc,
        "Generated {} for {} states/UTs.\n",
        summary.generated_at.format("%Y-%m-%d %H:%M UTC"),
        format_int(summary.total_regions)
    )?;

    writeln!(doc, "## Key metrics\n")?;
    writeln!(doc, "- Mean index: {}", format_number(summary.index.mean, 1))?;
    writeln!(doc, "- Median index: {}", format_number(summary.index.median, 1))?;
    writeln!(
        doc,
        "- MGNREGS active workers: {} lakh, ABPS eligible: {} lakh, national coverage: {}%",
        format_number(summary.national_abps.active_workers_lakh, 1),
        format_number(summary.national_abps.abps_eligible_lakh, 1),
        format_opt(summary.national_abps.coverage_pct, 1)
    )?;
    let weights: Vec<String> = Dimension::ALL
        .iter()
        .zip(summary.weights_bps)
        .map(|(dim, bps)| format!("{} {}%", dim.label(), format_number(bps as f64 / 100.0, 0)))
        .collect();
    writeln!(doc, "- Weights: {}\n", weights.join(", "))?;

    writeln!(doc, "## Top {}\n", n)?;
    writeln!(doc, "{}\n", markdown_table(&rows(top_n(table, n)), n))?;
    writeln!(doc, "## Bottom {}\n", n)?;
    writeln!(doc, "{}\n", markdown_table(&rows(bottom_n(table, n)), n))?;

    let members: Vec<IndexRow> = cohort(table, &config.cohort.regions)
        .into_iter()
        .map(|r| r.row.clone())
        .collect();
    writeln!(doc, "## {}\n", config.cohort.name)?;
    writeln!(doc, "{}\n", markdown_table(&members, members.len()))?;

    let gap = mgnregs_gap(table, GAP_ROWS);
    writeln!(doc, "## MGNREGS ABPS eligibility gap (top {})\n", GAP_ROWS)?;
    writeln!(doc, "{}\n", markdown_table(&gap, GAP_ROWS))?;

    let correlations = correlation_matrix(table);
    writeln!(doc, "## Metric correlations\n")?;
    writeln!(doc, "{}\n", markdown_table(&correlations, correlations.len()))?;

    let matrix = score_matrix(table);
    writeln!(doc, "## Score matrix\n")?;
    writeln!(doc, "{}", markdown_table(&matrix, matrix.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cohort;
    use crate::views::tests::sample;

    fn config() -> Config {
        Config {
            top_n: 2,
            cohort: Cohort {
                name: "Hills".to_string(),
                regions: vec!["Sikkim".to_string(), "Assam".to_string()],
            },
            ..Config::default()
        }
    }

    #[test]
    fn summary_aggregates_the_table() {
        let table = sample();
        let s = generate_summary(&table, &config());
        assert_eq!(s.total_regions, 5);
        assert_eq!(s.index.mean, 52.0);
        assert_eq!(s.top.len(), 5);
        assert_eq!(s.top[0].region, "Kerala");
        assert_eq!(s.bottom.last().unwrap().region, "Bihar");
        let cohort: Vec<&str> = s.cohort.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(cohort, vec!["Assam", "Sikkim"]);
        assert_eq!(s.weights_bps, [2_000, 3_500, 3_000, 1_500]);
    }

    #[test]
    fn markdown_document_has_every_section() {
        let table = sample();
        let cfg = config();
        let s = generate_summary(&table, &cfg);
        let doc = render_markdown(&table, &s, &cfg).unwrap();
        for heading in [
            "# Digital Readiness Index",
            "## Key metrics",
            "## Top 2",
            "## Bottom 2",
            "## Hills",
            "## MGNREGS ABPS eligibility gap",
            "## Metric correlations",
            "## Score matrix",
        ] {
            assert!(doc.contains(heading), "missing {heading}");
        }
        assert!(doc.contains("Aadhaar Coverage 20%"));
        assert!(doc.contains("national coverage: 63.8%"));
    }
}
