//! Index builder: decomposes every eligible feature of a collection (and its
//! antisense strand, where applicable) into fixed-width fragments and
//! replaces the collection's strand-resolution entries in the store.

use crate::{
    error::PlasmapError,
    feature::Feature,
    feature_store::{FeatureId, FeatureStore, StrandEntry},
    fragment_code::{KTUP, MIN_FRAGMENT, fragment_fingerprint, length_sentinel, reverse_complement},
    seed_table::FragmentRecord,
};
use anyhow::Result;
use rayon::prelude::*;

/// Builds the fragment index for one collection and returns the ordered
/// fragment records, ready for seed table emission.
///
/// This is a full rebuild: prior strand entries for the collection are
/// discarded first, so a completed run is idempotent. It is not
/// transactional — a failed run leaves the collection's index empty and must
/// be re-run to completion before being trusted. One writer per collection;
/// concurrent rebuilds of the same collection would corrupt dense-index
/// uniqueness.
pub fn build_fragment_index(
    store: &mut FeatureStore,
    collection: &str,
) -> Result<Vec<FragmentRecord>> {
    let features: Vec<(FeatureId, Feature)> = store
        .features_in(collection)?
        .into_iter()
        .map(|(id, f)| (id, f.clone()))
        .collect();
    store.replace_index(collection, vec![]);

    // Strictly ordered pre-pass: dense indices must be contiguous and
    // assigned in feature insertion order, forward before antisense.
    let mut entries: Vec<StrandEntry> = vec![];
    let mut strands: Vec<Vec<u8>> = vec![];
    for (id, feature) in &features {
        let forward = feature.sequence.clone().into_bytes();
        if forward.len() < MIN_FRAGMENT {
            continue;
        }
        entries.push(StrandEntry {
            feature_index: entries.len(),
            feature_id: *id,
            antisense: false,
        });
        strands.push(forward.clone());
        // Enzymes are never indexed antisense (recognition sites are oriented
        // by convention); self-complementary sequences are indexed once.
        if !feature.is_enzyme() {
            let antisense = reverse_complement(&forward);
            if antisense != forward {
                entries.push(StrandEntry {
                    feature_index: entries.len(),
                    feature_id: *id,
                    antisense: true,
                });
                strands.push(antisense);
            }
        }
    }

    // Chunking depends only on the strand's own bases; parallel across
    // strands, concatenated back in dense-index order.
    let fragments: Vec<Vec<FragmentRecord>> = entries
        .par_iter()
        .zip(strands.par_iter())
        .map(|(entry, strand)| strand_fragments(entry.feature_index, strand))
        .collect::<Result<_, PlasmapError>>()?;

    store.replace_index(collection, entries);
    Ok(fragments.into_iter().flatten().collect())
}

/// Splits one strand into consecutive non-overlapping KTUP-length chunks and
/// fingerprints each. A trailing chunk shorter than MIN_FRAGMENT is spliced
/// with the tail of its predecessor to full width; `shift` records how many
/// bases were borrowed so the matcher can recover the true offset. A short
/// strand with no predecessor chunk is padded by the fingerprint itself.
fn strand_fragments(
    feature_index: usize,
    strand: &[u8],
) -> Result<Vec<FragmentRecord>, PlasmapError> {
    let mut records = Vec::with_capacity(strand.len() / KTUP + 1);
    let mut previous: Option<&[u8]> = None;
    for (offset, chunk) in strand.chunks(KTUP).enumerate() {
        let mut fragment = chunk.to_vec();
        let mut shift = 0;
        if chunk.len() < MIN_FRAGMENT {
            if let Some(prev) = previous {
                let left = chunk.len();
                shift = KTUP - left;
                fragment = prev[left..]
                    .iter()
                    .chain(chunk.iter())
                    .copied()
                    .collect();
            }
        }
        // Sentinel of the post-splice fragment; spliced tails are full
        // width again and carry 0 like any other full-length fragment.
        let sentinel = if fragment.len() == KTUP {
            0
        } else {
            length_sentinel(&fragment)
        };
        records.push(FragmentRecord {
            feature_index,
            offset,
            sentinel,
            fingerprint: fragment_fingerprint(&fragment)?,
            shift,
        });
        previous = Some(chunk);
    }
    Ok(records)
}
