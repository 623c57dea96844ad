// Run configuration: where the sources live, where outputs go, and how the
// four dimensions are weighted. Defaults reproduce the published index; a JSON
// file and CLI flags can override any of it.
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The four declared input sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    /// Aadhaar generation per state; defines the region universe.
    Aadhaar,
    Pds,
    Mgnregs,
    Msme,
}

impl SourceId {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceId::Aadhaar => "aadhaar",
            SourceId::Pds => "pds",
            SourceId::Mgnregs => "mgnregs",
            SourceId::Msme => "msme",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceFiles {
    pub aadhaar: String,
    pub pds: String,
    pub mgnregs: String,
    pub msme: String,
}

impl Default for SourceFiles {
    fn default() -> Self {
        SourceFiles {
            aadhaar: "rs_session-241_au2785_1.1.csv".to_string(),
            pds: "RS_Session_254_AU_1356.csv".to_string(),
            mgnregs: "RS_Session_260_AU_1546_C.csv".to_string(),
            msme: "RS_Session_254_AU_1540.1.ii_.csv".to_string(),
        }
    }
}

impl SourceFiles {
    pub fn file_name(&self, source: SourceId) -> &str {
        match source {
            SourceId::Aadhaar => &self.aadhaar,
            SourceId::Pds => &self.pds,
            SourceId::Mgnregs => &self.mgnregs,
            SourceId::Msme => &self.msme,
        }
    }
}

/// Integer weights in basis points; they must sum to exactly 10,000 so the
/// fractional weights sum to exactly 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Weights {
    pub aadhaar_coverage: u32,
    pub pds_readiness: u32,
    pub mgnregs_abps: u32,
    pub msme_density: u32,
}

pub const WEIGHT_TOTAL: u32 = 10_000;

impl Default for Weights {
    fn default() -> Self {
        Weights {
            aadhaar_coverage: 2_000,
            pds_readiness: 3_500,
            mgnregs_abps: 3_000,
            msme_density: 1_500,
        }
    }
}

impl Weights {
    pub fn basis_points(&self) -> [u32; 4] {
        [
            self.aadhaar_coverage,
            self.pds_readiness,
            self.mgnregs_abps,
            self.msme_density,
        ]
    }

    pub fn validate(&self) -> Result<()> {
        let bps = self.basis_points();
        if bps.iter().any(|w| *w == 0) {
            bail!("every dimension weight must be positive, got {:?}", bps);
        }
        // u64 so oversized config values can't wrap back to the target
        let total: u64 = bps.iter().map(|w| u64::from(*w)).sum();
        if total != u64::from(WEIGHT_TOTAL) {
            bail!(
                "dimension weights must sum to {} basis points, got {}",
                WEIGHT_TOTAL,
                total
            );
        }
        Ok(())
    }

    /// Scale arbitrary positive weights so they sum to 10,000 basis points.
    /// Rounding remainders go to the largest weight.
    pub fn renormalized(raw: [f64; 4]) -> Result<Self> {
        let total: f64 = raw.iter().sum();
        if raw.iter().any(|w| !w.is_finite() || *w <= 0.0) || total <= 0.0 {
            bail!("weights must be positive and finite, got {:?}", raw);
        }
        let mut bps = raw.map(|w| (w / total * WEIGHT_TOTAL as f64).round() as u32);
        let assigned: u32 = bps.iter().sum();
        let largest = (0..4)
            .max_by(|a, b| raw[*a].total_cmp(&raw[*b]))
            .unwrap_or(0);
        bps[largest] = (bps[largest] + WEIGHT_TOTAL).saturating_sub(assigned);
        let weights = Weights {
            aadhaar_coverage: bps[0],
            pds_readiness: bps[1],
            mgnregs_abps: bps[2],
            msme_density: bps[3],
        };
        weights.validate()?;
        Ok(weights)
    }

    /// Parse comma-separated relative weights in dimension order
    /// (`"20,35,30,15"` or `"1,1,1,0.5"`) and renormalize them.
    pub fn parse_relative(s: &str) -> Result<Self> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<f64>()
                    .with_context(|| format!("weight {:?} is not a number", p.trim()))
            })
            .collect::<Result<_>>()?;
        let raw: [f64; 4] = parts
            .try_into()
            .map_err(|got: Vec<f64>| anyhow!("expected 4 weights, got {}", got.len()))?;
        Self::renormalized(raw)
    }
}

/// A named subset of regions rendered side by side.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Cohort {
    pub name: String,
    pub regions: Vec<String>,
}

impl Default for Cohort {
    fn default() -> Self {
        Cohort {
            name: "North-Eastern States".to_string(),
            regions: [
                "Assam",
                "Meghalaya",
                "Arunachal Pradesh",
                "Nagaland",
                "Manipur",
                "Mizoram",
                "Tripura",
                "Sikkim",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub sources: SourceFiles,
    pub weights: Weights,
    /// Rows shown in console previews.
    pub preview_rows: usize,
    /// Size of the top/bottom tables in the summary document.
    pub top_n: usize,
    pub cohort: Cohort,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            sources: SourceFiles::default(),
            weights: Weights::default(),
            preview_rows: 5,
            top_n: 10,
            cohort: Cohort::default(),
        }
    }
}

impl Config {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn source_path(&self, source: SourceId) -> PathBuf {
        self.data_dir.join(self.sources.file_name(source))
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        if self.top_n == 0 {
            bail!("top_n must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_exactly_one() {
        let w = Weights::default();
        w.validate().unwrap();
        let total: u32 = w.basis_points().iter().sum();
        assert_eq!(total, WEIGHT_TOTAL);
    }

    #[test]
    fn rejects_bad_weights() {
        let mut w = Weights::default();
        w.msme_density = 1_400;
        assert!(w.validate().is_err());
        w.msme_density = 0;
        w.aadhaar_coverage = 3_500;
        assert!(w.validate().is_err());
    }

    #[test]
    fn oversized_weights_are_rejected_not_wrapped() {
        let w = Weights {
            aadhaar_coverage: u32::MAX - 4,
            pds_readiness: 5_000,
            mgnregs_abps: 5_000,
            msme_density: 5,
        };
        let err = w.validate().unwrap_err().to_string();
        assert!(err.contains("10000"), "{err}");

        let w = Weights {
            aadhaar_coverage: u32::MAX,
            pds_readiness: u32::MAX,
            mgnregs_abps: u32::MAX,
            msme_density: u32::MAX,
        };
        assert!(w.validate().is_err());
    }

    #[test]
    fn renormalizes_arbitrary_weights() {
        let w = Weights::renormalized([1.0, 1.0, 1.0, 0.5]).unwrap();
        assert_eq!(w.basis_points().iter().sum::<u32>(), WEIGHT_TOTAL);
        assert_eq!(w.msme_density, 1_429);
        assert!(Weights::renormalized([1.0, 0.0, 1.0, 1.0]).is_err());
    }

    #[test]
    fn relative_weights_from_a_flag() {
        assert_eq!(Weights::parse_relative("20, 35, 30, 15").unwrap(), Weights::default());
        assert_eq!(
            Weights::parse_relative("0.2,0.35,0.3,0.15").unwrap(),
            Weights::default()
        );
        assert!(Weights::parse_relative("1,1,1").is_err());
        assert!(Weights::parse_relative("1,1,x,1").is_err());
        assert!(Weights::parse_relative("1,1,1,-1").is_err());
    }

    #[test]
    fn cohort_fields_default_independently() {
        let cfg: Config = serde_json::from_str(r#"{"cohort": {"name": "NE"}}"#).unwrap();
        assert_eq!(cfg.cohort.name, "NE");
        assert_eq!(cfg.cohort.regions, Cohort::default().regions);

        let cfg: Config =
            serde_json::from_str(r#"{"cohort": {"regions": ["Goa"]}}"#).unwrap();
        assert_eq!(cfg.cohort.name, "North-Eastern States");
        assert_eq!(cfg.cohort.regions, vec!["Goa".to_string()]);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: Config =
            serde_json::from_str(r#"{"data_dir": "in", "weights": {"pds_readiness": 3500}}"#)
                .unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("in"));
        assert_eq!(cfg.output_dir, PathBuf::from("output"));
        assert_eq!(cfg.weights, Weights::default());
        assert_eq!(cfg.cohort.regions.len(), 8);
        assert!(cfg
            .source_path(SourceId::Aadhaar)
            .ends_with("rs_session-241_au2785_1.1.csv"));
    }
}
