//! Region name canonicalization.
//!
//! Every source spells states and union territories slightly differently
//! ("A & N Islands", "Andaman & Nicobar", "Jammu & Kashmir", ...). The alias
//! table below maps every known spelling onto one canonical name so cleaned
//! tables can be joined on a single key. New spellings only need a new entry
//! in [`ALIAS_GROUPS`]; cleaning and merging code never changes.
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Labels of footer/aggregate rows that never describe a region.
const AGGREGATE_LABELS: &[&str] = &["total", "grand total"];

/// Canonical name followed by the aliases that resolve to it.
const ALIAS_GROUPS: &[(&str, &[&str])] = &[
    (
        "Andaman and Nicobar Islands",
        &[
            "A & N Islands",
            "A&N Islands",
            "Andaman & Nicobar",
            "Andaman & Nicobar Island",
            "Andaman & Nicobar Islands",
            "Andaman and Nicobar",
            "Andaman and Nicobar Island",
        ],
    ),
    (
        // Merged in 2020; sources before and after the merger must share a key.
        "Dadra and Nagar Haveli and Daman and Diu",
        &[
            "DNH and DD",
            "DNH & DD",
            "D&NH and D&D",
            "Dadra & Nagar Haveli and Daman Diu",
            "Dadra & Nagar Haveli and Daman & Diu",
            "Dadra and Nagar Haveli and Daman Diu",
        ],
    ),
    ("Jammu and Kashmir", &["Jammu & Kashmir", "J&K", "J & K"]),
    ("Delhi", &["NCT of Delhi", "NCT Delhi", "Delhi (NCT)"]),
    ("Odisha", &["Orissa"]),
    ("Puducherry", &["Pondicherry"]),
    ("Uttarakhand", &["Uttaranchal"]),
    ("Telangana", &["Telengana"]),
    ("Chhattisgarh", &["Chattisgarh", "Chhatisgarh"]),
    ("Arunachal Pradesh", &["Arunachal"]),
    ("Tamil Nadu", &["Tamilnadu"]),
];

const MERGED_TERRITORY: &str = "Dadra and Nagar Haveli and Daman and Diu";

/// Pre-merger territories, listed separately by older sources. Each part
/// resolves to [`MERGED_TERRITORY`]; cleaning sums the parts' rows.
const PRE_MERGER_PARTS: &[(&str, &[&str])] = &[
    ("Dadra and Nagar Haveli", &["Dadra & Nagar Haveli", "D&NH"]),
    ("Daman and Diu", &["Daman & Diu", "D&D"]),
];

/// Canonical names that carry no alias of their own.
const PLAIN_REGIONS: &[&str] = &[
    "Andhra Pradesh",
    "Assam",
    "Bihar",
    "Chandigarh",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Ladakh",
    "Lakshadweep",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tripura",
    "Uttar Pradesh",
    "West Bengal",
];

/// Canonical identifier of one region across every source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionKey(String);

impl RegionKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionKey {
    fn from(s: &str) -> Self {
        RegionKey(s.to_string())
    }
}

/// Outcome of resolving one raw name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Blank or an aggregate/footer label; the row carries no region.
    Dropped,
    /// Matched the alias table or a known canonical name.
    Known(RegionKey),
    /// One pre-merger part of a merged territory: the joint key plus the
    /// part's own canonical name.
    Part(RegionKey, &'static str),
    /// No match; the trimmed name acts as its own key.
    Unknown(RegionKey),
}

impl Resolution {
    pub fn key(self) -> Option<RegionKey> {
        match self {
            Resolution::Dropped => None,
            Resolution::Known(k) | Resolution::Part(k, _) | Resolution::Unknown(k) => Some(k),
        }
    }
}

/// Case-insensitive lookup from any known spelling to its canonical name.
pub struct RegionAliases {
    lookup: HashMap<String, &'static str>,
    parts: HashMap<String, &'static str>,
}

impl RegionAliases {
    fn builtin() -> Self {
        let mut lookup = HashMap::new();
        for (canonical, aliases) in ALIAS_GROUPS {
            lookup.insert(fold(canonical), *canonical);
            for alias in aliases.iter() {
                lookup.insert(fold(alias), *canonical);
            }
        }
        for canonical in PLAIN_REGIONS {
            lookup.insert(fold(canonical), *canonical);
        }
        let mut parts = HashMap::new();
        for (part, spellings) in PRE_MERGER_PARTS {
            parts.insert(fold(part), *part);
            for spelling in spellings.iter() {
                parts.insert(fold(spelling), *part);
            }
        }
        RegionAliases { lookup, parts }
    }

    pub fn resolve(&self, raw: &str) -> Resolution {
        let trimmed = collapse_whitespace(raw);
        if trimmed.is_empty() {
            return Resolution::Dropped;
        }
        let folded = trimmed.to_lowercase();
        if AGGREGATE_LABELS.contains(&folded.as_str()) {
            return Resolution::Dropped;
        }
        if let Some(part) = self.parts.get(&folded) {
            return Resolution::Part(RegionKey::from(MERGED_TERRITORY), *part);
        }
        match self.lookup.get(&folded) {
            Some(canonical) => Resolution::Known(RegionKey::from(*canonical)),
            None => Resolution::Unknown(RegionKey(trimmed)),
        }
    }

    pub fn normalize(&self, raw: &str) -> Option<RegionKey> {
        self.resolve(raw).key()
    }
}

static ALIASES: Lazy<RegionAliases> = Lazy::new(RegionAliases::builtin);

/// The built-in alias table shared by every cleaner.
pub fn aliases() -> &'static RegionAliases {
    &ALIASES
}

/// Shorthand for `aliases().normalize(raw)`.
pub fn normalize(raw: &str) -> Option<RegionKey> {
    ALIASES.normalize(raw)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold(s: &str) -> String {
    collapse_whitespace(s).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_and_blank_rows_have_no_key() {
        for raw in ["Total", "  grand total ", "GRAND TOTAL", "", "   "] {
            assert_eq!(normalize(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn andaman_spellings_share_a_key() {
        let a = normalize("A & N Islands");
        let b = normalize("Andaman & Nicobar");
        assert!(a.is_some());
        assert_eq!(a, b);
        assert_eq!(a.unwrap().as_str(), "Andaman and Nicobar Islands");
    }

    #[test]
    fn merged_territory_old_and_new_names_collapse() {
        let joint = normalize("Dadra and Nagar Haveli and Daman and Diu");
        for raw in [
            "DNH and DD",
            "Dadra & Nagar Haveli and Daman Diu",
            "Dadra & Nagar Haveli",
            "Daman & Diu",
            "daman and diu",
        ] {
            assert_eq!(normalize(raw), joint, "{raw:?}");
        }
        assert_eq!(
            aliases().resolve("Dadra & Nagar Haveli"),
            Resolution::Part(RegionKey::from(MERGED_TERRITORY), "Dadra and Nagar Haveli")
        );
        assert_eq!(
            aliases().resolve("DAMAN AND DIU"),
            Resolution::Part(RegionKey::from(MERGED_TERRITORY), "Daman and Diu")
        );
        assert_eq!(
            aliases().resolve("DNH and DD"),
            Resolution::Known(RegionKey::from(MERGED_TERRITORY))
        );
    }

    #[test]
    fn canonical_names_are_fixed_points() {
        for (canonical, _) in ALIAS_GROUPS {
            assert_eq!(normalize(canonical).unwrap().as_str(), *canonical);
        }
        for canonical in PLAIN_REGIONS {
            let once = normalize(canonical).unwrap();
            let twice = normalize(once.as_str()).unwrap();
            assert_eq!(once, twice);
            assert_eq!(once.as_str(), *canonical);
        }
    }

    #[test]
    fn lookup_ignores_case_and_spacing() {
        assert_eq!(
            normalize("  jammu   &  kashmir ").unwrap().as_str(),
            "Jammu and Kashmir"
        );
        assert_eq!(normalize("KERALA").unwrap().as_str(), "Kerala");
    }

    #[test]
    fn unknown_names_pass_through_trimmed() {
        let res = aliases().resolve("  Atlantis ");
        assert_eq!(res, Resolution::Unknown(RegionKey::from("Atlantis")));
        assert_eq!(normalize("Atlantis").unwrap().as_str(), "Atlantis");
    }
}
