// Entry point and high-level CLI flow.
//
// One batch run: load the four sources, clean, merge onto the anchor, score,
// rank, then export the index table and its summary artefacts. Scoring
// failures are fatal; export failures are logged and the remaining exports
// still run.
use anyhow::{Context, Result};
use clap::Parser;
use readiness_index::config::{Config, Weights};
use readiness_index::types::{IndexRow, ScoredRecord};
use readiness_index::{output, pipeline, report, util, views};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "readiness_index",
    about = "Builds the state-wise digital readiness index from the source CSVs"
)]
struct Args {
    /// JSON config file; unset fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the source CSVs
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory the exports are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Rows in the top/bottom tables of the summary document
    #[arg(long)]
    top_n: Option<usize>,

    /// Relative dimension weights "aadhaar,pds,mgnregs,msme", renormalized
    /// to sum to 1 (e.g. "20,35,30,15")
    #[arg(long)]
    weights: Option<String>,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(n) = self.top_n {
            config.top_n = n;
        }
        if let Some(raw) = &self.weights {
            config.weights = Weights::parse_relative(raw).context("--weights")?;
        }
        Ok(config)
    }
}

/// Log a failed export without stopping the others.
fn report_write(name: &str, result: Result<()>) {
    if let Err(e) = result {
        error!("export {} failed: {:#}", name, e);
    }
}

fn export_all(dir: &Path, table: &[ScoredRecord], config: &Config) {
    let rows: Vec<IndexRow> = table.iter().map(|r| r.row.clone()).collect();
    report_write(
        "index",
        output::write_csv(&dir.join("digital_readiness_index.csv"), &rows),
    );
    report_write(
        "score matrix",
        output::write_csv(&dir.join("score_matrix.csv"), &views::score_matrix(table)),
    );
    report_write(
        "mgnregs gap",
        output::write_csv(
            &dir.join("mgnregs_gap.csv"),
            &views::mgnregs_gap(table, report::GAP_ROWS),
        ),
    );

    report_write(
        "correlation matrix",
        output::write_csv(
            &dir.join("correlation_matrix.csv"),
            &views::correlation_matrix(table),
        ),
    );

    let summary = report::generate_summary(table, config);
    report_write(
        "summary json",
        output::write_json(&dir.join("summary.json"), &summary),
    );
    report_write(
        "summary document",
        report::render_markdown(table, &summary, config)
            .and_then(|doc| output::write_text(&dir.join("summary.md"), &doc)),
    );
}

fn print_overview(table: &[ScoredRecord], config: &Config) {
    let stats = views::column_stats(table, views::Column::Index);
    println!();
    println!("Digital Readiness Index");
    println!(
        "({} states/UTs, mean {}, median {})\n",
        util::format_int(table.len()),
        util::format_number(stats.mean, 1),
        util::format_number(stats.median, 1)
    );
    let top: Vec<IndexRow> = views::top_n(table, config.preview_rows)
        .iter()
        .map(|r| r.row.clone())
        .collect();
    output::preview_table_rows(&top, config.preview_rows);
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config = Args::parse().into_config()?;
    info!(
        data_dir = %config.data_dir.display(),
        output_dir = %config.output_dir.display(),
        "startup"
    );

    let run = pipeline::run(&config)?;
    for (source, cleaned) in &run.clean_reports {
        if !cleaned.unknown_names.is_empty() {
            warn!(
                %source,
                "unmatched region names, review the alias table: {:?}",
                cleaned.unknown_names
            );
        }
    }

    print_overview(&run.table, &config);

    match output::ensure_output_dir(&config.output_dir) {
        Some(dir) => export_all(&dir, &run.table, &config),
        None => warn!("no exports written"),
    }
    info!("done");
    Ok(())
}
