//! Seed-and-extend matching: exact-fingerprint lookup of every query window
//! against the seed table, then verification against the true feature
//! sequence to discard fingerprint collisions.

use crate::{
    error::PlasmapError,
    feature::FeatureType,
    feature_store::{FeatureId, FeatureStore},
    fragment_code::{KTUP, fragment_fingerprint, reverse_complement},
    seed_table::FragmentRecord,
};
use anyhow::Result;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One feature occurrence on the query. `end` is exclusive; `antisense` is
/// true when the feature matched via its reverse-complement strand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureHit {
    pub feature_id: FeatureId,
    pub feature_name: String,
    pub feature_type: FeatureType,
    pub start: usize,
    pub end: usize,
    pub antisense: bool,
}

/// Seed lookup structure over one collection's fragment records. Full-length
/// fragments (sentinel 0) go into a hash map for exact-integer lookup; short
/// fragments are checked with their sentinel as a high-bit mask.
pub struct SeedMatcher {
    full: HashMap<u32, Vec<FragmentRecord>>,
    partial: Vec<FragmentRecord>,
}

impl SeedMatcher {
    pub fn new(records: &[FragmentRecord]) -> Self {
        let mut full: HashMap<u32, Vec<FragmentRecord>> = HashMap::new();
        let mut partial = vec![];
        for record in records {
            if record.sentinel == 0 {
                full.entry(record.fingerprint).or_default().push(record.clone());
            } else {
                partial.push(record.clone());
            }
        }
        Self { full, partial }
    }

    /// Finds all features of `collection` occurring in `query`, ordered by
    /// query start. The store's strand entries must come from the same build
    /// as the records handed to `new`.
    pub fn find_hits(
        &self,
        store: &FeatureStore,
        collection: &str,
        query: &str,
    ) -> Result<Vec<FeatureHit>> {
        let query = normalize_query(query)?;
        let entries = store.strand_entries(collection)?;
        let mut strands: Vec<Vec<u8>> = Vec::with_capacity(entries.len());
        for entry in entries {
            let forward = store.feature(entry.feature_id)?.sequence.clone().into_bytes();
            strands.push(if entry.antisense {
                reverse_complement(&forward)
            } else {
                forward
            });
        }

        // Seed phase: one fingerprint per query offset. Tail windows pad
        // naturally inside the encoder; the extension phase rejects anything
        // the padding let through.
        let mut confirmed: HashSet<(usize, usize)> = HashSet::new();
        for window_start in 0..query.len() {
            let window_end = (window_start + KTUP).min(query.len());
            let window = fragment_fingerprint(&query[window_start..window_end])?;
            for record in self.full.get(&window).into_iter().flatten() {
                extend_seed(record, window_start, &query, &strands, &mut confirmed);
            }
            for record in self
                .partial
                .iter()
                .filter(|r| window & r.sentinel == r.fingerprint)
            {
                extend_seed(record, window_start, &query, &strands, &mut confirmed);
            }
        }

        let hits: Vec<FeatureHit> = confirmed
            .into_iter()
            .map(|(feature_index, start)| {
                let entry = &entries[feature_index];
                let feature = store.feature(entry.feature_id)?;
                Ok(FeatureHit {
                    feature_id: entry.feature_id,
                    feature_name: feature.name.clone(),
                    feature_type: feature.feature_type,
                    start,
                    end: start + strands[feature_index].len(),
                    antisense: entry.antisense,
                })
            })
            .collect::<Result<_, PlasmapError>>()?;
        Ok(hits
            .into_iter()
            .sorted_by_key(|h| (h.start, h.end, h.feature_id))
            .collect())
    }
}

/// Extension: recovers the candidate alignment from the fragment's true
/// offset on its strand, then compares the whole strand against the query
/// slice. Adjacent seed hits of one occurrence all confirm the same
/// (strand, start) pair, which merges them.
fn extend_seed(
    record: &FragmentRecord,
    window_start: usize,
    query: &[u8],
    strands: &[Vec<u8>],
    confirmed: &mut HashSet<(usize, usize)>,
) {
    let Some(strand) = strands.get(record.feature_index) else {
        // seed table does not belong to these strand entries
        return;
    };
    let Some(fragment_start) = (record.offset * KTUP).checked_sub(record.shift) else {
        // malformed record: shift can only borrow within the strand
        return;
    };
    if fragment_start > window_start {
        return;
    }
    let start = window_start - fragment_start;
    if start + strand.len() <= query.len() && &query[start..start + strand.len()] == strand {
        confirmed.insert((record.feature_index, start));
    }
}

/// Lowercases the query and strips whitespace; bytes outside {a,c,g,t,n}
/// are an encoding error.
fn normalize_query(query: &str) -> Result<Vec<u8>, PlasmapError> {
    let mut ret = Vec::with_capacity(query.len());
    for base in query.bytes().filter(|b| !b.is_ascii_whitespace()) {
        match base.to_ascii_lowercase() {
            b @ (b'a' | b'c' | b'g' | b't' | b'n') => ret.push(b),
            other => return Err(PlasmapError::Encoding { base: other }),
        }
    }
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::Feature;
    use crate::fragment_index::build_fragment_index;

    fn sample_store() -> FeatureStore {
        let mut store = FeatureStore::new();
        for (name, feature_type, sequence) in [
            ("GENE1", FeatureType::Gene, "ATGCATGCATGCATGC"),
            ("EcoRI", FeatureType::Enzyme, "GAATTC"),
            ("T7", FeatureType::Promoter, "taatacgactcactatagg"),
        ] {
            let id = store.save_feature(Feature::new(name, feature_type, sequence));
            store.add_to_collection("default", id);
        }
        store
    }

    fn hits_for(query: &str) -> Vec<FeatureHit> {
        let mut store = sample_store();
        let records = build_fragment_index(&mut store, "default").unwrap();
        SeedMatcher::new(&records)
            .find_hits(&store, "default", query)
            .unwrap()
    }

    #[test]
    fn test_forward_hit() {
        let hits = hits_for("ccccATGCATGCATGCATGCcccc");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].feature_name, "GENE1");
        assert_eq!(hits[0].start, 4);
        assert_eq!(hits[0].end, 20);
        assert!(!hits[0].antisense);
    }

    #[test]
    fn test_antisense_hit() {
        // reverse complement of GENE1
        let hits = hits_for("ttGCATGCATGCATGCATtt");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].feature_name, "GENE1");
        assert!(hits[0].antisense);
        assert_eq!(hits[0].start, 2);
        assert_eq!(hits[0].end, 18);
    }

    #[test]
    fn test_short_feature_hit_via_sentinel_mask() {
        // EcoRI is shorter than KTUP; its record matches through the
        // sentinel-masked compare
        let hits = hits_for("ttttttGAATTCtttttt");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].feature_name, "EcoRI");
        assert_eq!(hits[0].start, 6);
        assert_eq!(hits[0].end, 12);
        assert!(!hits[0].antisense);
    }

    #[test]
    fn test_hit_at_query_end() {
        let hits = hits_for("ccccccGAATTC");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].start, 6);
        assert_eq!(hits[0].end, 12);
    }

    #[test]
    fn test_truncated_occurrence_is_rejected() {
        // only 5 of EcoRI's 6 bases fit; extension must reject the seed
        let hits = hits_for("ccccccGAATT");
        assert!(hits.is_empty());
    }

    #[test]
    fn test_multiple_hits_ordered_by_start() {
        let hits = hits_for("GAATTCatgcATGCATGCATGCATGCttGAATTC");
        let summary: Vec<(&str, usize, bool)> = hits
            .iter()
            .map(|h| (h.feature_name.as_str(), h.start, h.antisense))
            .collect();
        // the periodic GENE1 region also contains its own reverse
        // complement, four bases in
        assert_eq!(
            summary,
            vec![
                ("EcoRI", 0, false),
                ("GENE1", 6, false),
                ("GENE1", 8, true),
                ("GENE1", 10, false),
                ("EcoRI", 28, false),
            ]
        );
    }

    #[test]
    fn test_no_hits_in_unrelated_query() {
        assert!(hits_for("gggggggggggggggggggg").is_empty());
    }

    #[test]
    fn test_bad_query_base_is_an_error() {
        let mut store = sample_store();
        let records = build_fragment_index(&mut store, "default").unwrap();
        let matcher = SeedMatcher::new(&records);
        assert!(matcher.find_hits(&store, "default", "acgtXacgt").is_err());
    }

    #[test]
    fn test_matching_from_a_parsed_seed_table() {
        use crate::seed_table::{parse_seed_table, seed_table_string};
        let mut store = sample_store();
        let records = build_fragment_index(&mut store, "default").unwrap();
        let parsed = parse_seed_table(&seed_table_string(&records)).unwrap();
        let hits = SeedMatcher::new(&parsed)
            .find_hits(&store, "default", "ccccATGCATGCATGCATGCcccc")
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].feature_name, "GENE1");
    }
}
