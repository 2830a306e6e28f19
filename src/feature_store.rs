//! In-process feature store: content-addressed features, named collections,
//! and the strand-resolution entries written by the index builder. Persisted
//! as a JSON file.

use crate::error::PlasmapError;
use crate::feature::Feature;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;

pub type FeatureId = usize;

/// Named grouping of features; membership is many-to-many and kept in
/// insertion order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub name: String,
    pub members: Vec<FeatureId>,
}

/// One strand of one feature, as resolved during an index build.
/// `feature_index` is the dense, collection-local index the seed table and
/// the matcher speak in; it is unique and contiguous within one build.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrandEntry {
    pub feature_index: usize,
    pub feature_id: FeatureId,
    pub antisense: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FeatureStore {
    features: Vec<Feature>,
    collections: Vec<FeatureCollection>,
    #[serde(default)]
    strand_index: HashMap<String, Vec<StrandEntry>>,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content-addressed upsert: saving a feature whose (name, hash) already
    /// exists resolves to the existing entry instead of creating a duplicate.
    pub fn save_feature(&mut self, feature: Feature) -> FeatureId {
        if let Some(id) = self
            .features
            .iter()
            .position(|f| f.name == feature.name && f.hash == feature.hash)
        {
            return id;
        }
        self.features.push(feature);
        self.features.len() - 1
    }

    pub fn feature(&self, id: FeatureId) -> Result<&Feature, PlasmapError> {
        self.features
            .get(id)
            .ok_or_else(|| PlasmapError::NotFound(format!("feature #{id}")))
    }

    pub fn collection(&self, name: &str) -> Result<&FeatureCollection, PlasmapError> {
        self.collections
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| PlasmapError::NotFound(format!("collection '{name}'")))
    }

    pub fn collections(&self) -> &Vec<FeatureCollection> {
        &self.collections
    }

    /// Adds a feature to a collection, creating the collection on demand.
    /// Duplicate membership is ignored.
    pub fn add_to_collection(&mut self, name: &str, id: FeatureId) {
        if self.collections.iter().all(|c| c.name != name) {
            self.collections.push(FeatureCollection {
                name: name.to_string(),
                members: vec![],
            });
        }
        if let Some(collection) = self.collections.iter_mut().find(|c| c.name == name) {
            if !collection.members.contains(&id) {
                collection.members.push(id);
            }
        }
    }

    /// Features of a collection, in insertion order.
    pub fn features_in(&self, name: &str) -> Result<Vec<(FeatureId, &Feature)>, PlasmapError> {
        self.collection(name)?
            .members
            .iter()
            .map(|&id| Ok((id, self.feature(id)?)))
            .collect()
    }

    /// Replaces the strand-resolution entries of a collection,
    /// delete-then-insert. Old entries are never patched incrementally.
    pub fn replace_index(&mut self, name: &str, entries: Vec<StrandEntry>) {
        self.strand_index.remove(name);
        self.strand_index.insert(name.to_string(), entries);
    }

    pub fn strand_entries(&self, name: &str) -> Result<&Vec<StrandEntry>, PlasmapError> {
        self.strand_index
            .get(name)
            .ok_or_else(|| PlasmapError::NotFound(format!("index for collection '{name}'")))
    }

    pub fn load_from_path(path: &str) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn save_to_path(&self, path: &str) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureType;

    #[test]
    fn test_save_feature_is_a_deterministic_upsert() {
        let mut store = FeatureStore::new();
        let id1 = store.save_feature(Feature::new("EcoRI", FeatureType::Enzyme, "gaattc"));
        let id2 = store.save_feature(Feature::new("EcoRI", FeatureType::Enzyme, "GAATTC"));
        assert_eq!(id1, id2);
        // same name, different sequence: a new entity
        let id3 = store.save_feature(Feature::new("EcoRI", FeatureType::Enzyme, "gaattt"));
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_collection_membership_is_insertion_ordered() {
        let mut store = FeatureStore::new();
        let a = store.save_feature(Feature::new("a", FeatureType::Feature, "acgtacgt"));
        let b = store.save_feature(Feature::new("b", FeatureType::Feature, "tgcatgca"));
        store.add_to_collection("default", b);
        store.add_to_collection("default", a);
        store.add_to_collection("default", b); // duplicate, ignored
        store.add_to_collection("other", a);
        let members: Vec<FeatureId> = store
            .features_in("default")
            .unwrap()
            .iter()
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(members, vec![b, a]);
    }

    #[test]
    fn test_missing_collection_is_not_found() {
        let store = FeatureStore::new();
        assert!(store.collection("nope").is_err());
        assert!(store.strand_entries("nope").is_err());
    }

    #[test]
    fn test_replace_index_discards_old_entries() {
        let mut store = FeatureStore::new();
        store.replace_index(
            "default",
            vec![StrandEntry {
                feature_index: 0,
                feature_id: 7,
                antisense: false,
            }],
        );
        store.replace_index(
            "default",
            vec![StrandEntry {
                feature_index: 0,
                feature_id: 3,
                antisense: true,
            }],
        );
        let entries = store.strand_entries("default").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].feature_id, 3);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let mut store = FeatureStore::new();
        let id = store.save_feature(Feature::new("EcoRI", FeatureType::Enzyme, "gaattc"));
        store.add_to_collection("default", id);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let path = path.to_str().unwrap();
        store.save_to_path(path).unwrap();

        let loaded = FeatureStore::load_from_path(path).unwrap();
        let features = loaded.features_in("default").unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].1.name, "EcoRI");
        assert_eq!(features[0].1.hash, store.feature(id).unwrap().hash);
    }
}
