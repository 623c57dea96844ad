// Composite index and competition ranking.
//
// Missing sub-scores count as 0 (a lossy default, not imputation). Ranking is
// "min" style: tied indices share the lowest ordinal of their group and the
// next distinct index skips past the group (1, 2, 3, 3, 5).
use crate::config::{Weights, WEIGHT_TOTAL};
use crate::types::{Dimension, IndexRow, ScoredMaster, ScoredRecord, SubScores};
use crate::util::round2;

fn weight(weights: &Weights, dim: Dimension) -> f64 {
    let bps = match dim {
        Dimension::AadhaarCoverage => weights.aadhaar_coverage,
        Dimension::PdsReadiness => weights.pds_readiness,
        Dimension::MgnregsAbps => weights.mgnregs_abps,
        Dimension::MsmeDensity => weights.msme_density,
    };
    bps as f64 / WEIGHT_TOTAL as f64
}

/// Weighted sum of the sub-scores, rounded to 2 decimals and kept in [0, 100].
pub fn composite(scores: &SubScores, weights: &Weights) -> f64 {
    let total: f64 = Dimension::ALL
        .iter()
        .map(|dim| scores.get(*dim).unwrap_or(0.0) * weight(weights, *dim))
        .sum();
    round2(total).clamp(0.0, 100.0)
}

/// Competition ranks for `indices` as given (not sorted): rank = 1 + number of
/// strictly greater indices.
pub fn competition_ranks(indices: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..indices.len()).collect();
    order.sort_by(|a, b| indices[*b].total_cmp(&indices[*a]));

    let mut ranks = vec![0usize; indices.len()];
    for (pos, &i) in order.iter().enumerate() {
        ranks[i] = if pos > 0 && indices[order[pos - 1]] == indices[i] {
            ranks[order[pos - 1]]
        } else {
            pos + 1
        };
    }
    ranks
}

/// Composite every region, rank, and sort ascending by rank. Ties keep their
/// anchor order.
pub fn rank(scored: Vec<ScoredMaster>, weights: &Weights) -> Vec<ScoredRecord> {
    let indices: Vec<f64> = scored
        .iter()
        .map(|s| composite(&s.scores, weights))
        .collect();
    let ranks = competition_ranks(&indices);

    let mut out: Vec<ScoredRecord> = scored
        .into_iter()
        .zip(indices)
        .zip(ranks)
        .map(|((s, index), rank)| {
            let score = |dim| s.scores.get(dim).unwrap_or(0.0);
            let row = IndexRow {
                rank,
                region: s.record.region.to_string(),
                index,
                aadhaar_percentage: s.record.aadhaar.aadhaar_percentage,
                ration_card_seeding: s.record.ration_card_seeding(),
                beneficiary_seeding: s.record.beneficiary_seeding(),
                abps_coverage: s.record.abps_coverage(),
                msme_density: s.derived.msme_density,
                score_aadhaar_coverage: score(Dimension::AadhaarCoverage),
                score_pds_readiness: score(Dimension::PdsReadiness),
                score_mgnregs_abps: score(Dimension::MgnregsAbps),
                score_msme_density: score(Dimension::MsmeDensity),
            };
            ScoredRecord {
                row,
                record: s.record,
                derived: s.derived,
            }
        })
        .collect();

    out.sort_by_key(|r| r.row.rank);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::RegionKey;
    use crate::types::{AadhaarRow, DerivedMetrics, MasterRecord};

    fn scores(a: f64, p: f64, m: f64, d: f64) -> SubScores {
        SubScores {
            aadhaar_coverage: Some(a),
            pds_readiness: Some(p),
            mgnregs_abps: Some(m),
            msme_density: Some(d),
        }
    }

    fn scored(name: &str, s: SubScores) -> ScoredMaster {
        ScoredMaster {
            record: MasterRecord {
                region: RegionKey::from(name),
                aadhaar: AadhaarRow::default(),
                pds: None,
                mgnregs: None,
                msme: None,
            },
            derived: DerivedMetrics::default(),
            scores: s,
        }
    }

    #[test]
    fn composite_uses_default_weights() {
        let w = Weights::default();
        assert_eq!(composite(&scores(100.0, 100.0, 100.0, 100.0), &w), 100.0);
        assert_eq!(composite(&scores(0.0, 0.0, 0.0, 0.0), &w), 0.0);
        // 0.2*50 + 0.35*100 + 0.3*0 + 0.15*10
        assert_eq!(composite(&scores(50.0, 100.0, 0.0, 10.0), &w), 46.5);
    }

    #[test]
    fn missing_sub_scores_count_as_zero() {
        let mut s = scores(100.0, 100.0, 100.0, 100.0);
        s.mgnregs_abps = None;
        assert_eq!(composite(&s, &Weights::default()), 70.0);
    }

    #[test]
    fn ties_share_the_lowest_ordinal() {
        let ranks = competition_ranks(&[95.0, 80.0, 90.0, 80.0, 70.0]);
        assert_eq!(ranks, vec![1, 3, 2, 3, 5]);
        assert!(competition_ranks(&[]).is_empty());
        assert_eq!(competition_ranks(&[12.5, 12.5]), vec![1, 1]);
    }

    #[test]
    fn strictly_greater_index_means_strictly_better_rank() {
        let indices = [10.0, 55.5, 55.5, 99.99, 0.0, 42.0, 55.49];
        let ranks = competition_ranks(&indices);
        for i in 0..indices.len() {
            for j in 0..indices.len() {
                if indices[i] > indices[j] {
                    assert!(ranks[i] < ranks[j]);
                }
                if ranks[i] == ranks[j] {
                    assert_eq!(indices[i], indices[j]);
                }
            }
        }
    }

    #[test]
    fn rank_sorts_output_and_keeps_anchor_order_for_ties() {
        let out = rank(
            vec![
                scored("Low", scores(10.0, 10.0, 10.0, 10.0)),
                scored("TieA", scores(80.0, 80.0, 80.0, 80.0)),
                scored("Top", scores(100.0, 100.0, 100.0, 100.0)),
                scored("TieB", scores(80.0, 80.0, 80.0, 80.0)),
            ],
            &Weights::default(),
        );
        let got: Vec<(usize, &str, f64)> = out
            .iter()
            .map(|r| (r.row.rank, r.row.region.as_str(), r.row.index))
            .collect();
        assert_eq!(
            got,
            vec![
                (1, "Top", 100.0),
                (2, "TieA", 80.0),
                (2, "TieB", 80.0),
                (4, "Low", 10.0),
            ]
        );
    }

    fn ranks_under(weights: &Weights) -> Vec<(String, usize)> {
        let out = rank(
            vec![
                scored("Top", scores(100.0, 100.0, 100.0, 100.0)),
                scored("AadhaarHeavy", scores(100.0, 0.0, 50.0, 50.0)),
                scored("PdsHeavy", scores(0.0, 100.0, 50.0, 50.0)),
                scored("Low", scores(0.0, 0.0, 0.0, 0.0)),
            ],
            weights,
        );
        let mut got: Vec<(String, usize)> =
            out.into_iter().map(|r| (r.row.region, r.row.rank)).collect();
        got.sort();
        got
    }

    #[test]
    fn reweighting_moves_ranks_only_across_a_tie() {
        let even = ranks_under(&Weights::renormalized([1.0, 1.0, 1.0, 1.0]).unwrap());
        let expect = |a: usize, p: usize| {
            vec![
                ("AadhaarHeavy".to_string(), a),
                ("Low".to_string(), 4),
                ("PdsHeavy".to_string(), p),
                ("Top".to_string(), 1),
            ]
        };
        assert_eq!(even, expect(2, 2));

        // tilting towards Aadhaar breaks the tie, tilting further does not
        // reorder anything
        let tilt = ranks_under(&Weights::renormalized([1.1, 1.0, 1.0, 1.0]).unwrap());
        let more = ranks_under(&Weights::renormalized([1.5, 1.0, 1.0, 1.0]).unwrap());
        assert_eq!(tilt, expect(2, 3));
        assert_eq!(more, tilt);

        let other = ranks_under(&Weights::renormalized([1.0, 1.1, 1.0, 1.0]).unwrap());
        assert_eq!(other, expect(3, 2));
    }

    #[test]
    fn region_missing_from_a_source_still_ranks() {
        let mut partial = scores(100.0, 100.0, 100.0, 100.0);
        partial.msme_density = None;
        let out = rank(vec![scored("Partial", partial)], &Weights::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].row.score_msme_density, 0.0);
        assert_eq!(out[0].row.index, 85.0);
    }
}
