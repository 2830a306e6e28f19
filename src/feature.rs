use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// The closed set of reference feature types, with the numeric ids used in
/// the original library dumps and the one-letter codes of the library line
/// format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureType {
    Feature,
    Promoter,
    Primer,
    Enzyme,
    Gene,
    Origin,
    Regulatory,
    Terminator,
    ExactFeature,
}

impl FeatureType {
    pub fn type_id(&self) -> u8 {
        match self {
            FeatureType::Feature => 1,
            FeatureType::Promoter => 2,
            FeatureType::Primer => 3,
            FeatureType::Enzyme => 4,
            FeatureType::Gene => 5,
            FeatureType::Origin => 6,
            FeatureType::Regulatory => 7,
            FeatureType::Terminator => 8,
            FeatureType::ExactFeature => 9,
        }
    }

    /// Maps a library line-format type code; unknown codes fall back to the
    /// generic `Feature` type.
    pub fn from_code(code: &str) -> Self {
        match code {
            "G" => FeatureType::Gene,
            "P" => FeatureType::Promoter,
            "O" => FeatureType::Origin,
            "R" => FeatureType::Regulatory,
            "T" => FeatureType::Terminator,
            "E" => FeatureType::Enzyme,
            "f" => FeatureType::ExactFeature,
            "S" => FeatureType::Primer,
            _ => FeatureType::Feature,
        }
    }
}

/// A reference genetic element. Content-addressed: (name, hash) is the
/// logical identity, so re-saving the same feature resolves to one entity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub feature_type: FeatureType,
    /// Nucleotide sequence over {a,c,g,t,n}, stored lowercase.
    pub sequence: String,
    /// sha-1 of the lowercased sequence, hex.
    pub hash: String,
    /// Enzymes only: cut position after this many bases of the recognition site.
    pub cut_after: Option<isize>,
}

impl Feature {
    pub fn new(name: &str, feature_type: FeatureType, sequence: &str) -> Self {
        let sequence = sequence.to_ascii_lowercase();
        let hash = Self::sequence_hash(&sequence);
        Self {
            name: name.to_string(),
            feature_type,
            sequence,
            hash,
            cut_after: None,
        }
    }

    pub fn sequence_hash(sequence: &str) -> String {
        let mut hasher = Sha1::new();
        hasher.update(sequence.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn is_enzyme(&self) -> bool {
        self.feature_type == FeatureType::Enzyme
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_id_table() {
        assert_eq!(FeatureType::Feature.type_id(), 1);
        assert_eq!(FeatureType::Promoter.type_id(), 2);
        assert_eq!(FeatureType::Primer.type_id(), 3);
        assert_eq!(FeatureType::Enzyme.type_id(), 4);
        assert_eq!(FeatureType::Gene.type_id(), 5);
        assert_eq!(FeatureType::Origin.type_id(), 6);
        assert_eq!(FeatureType::Regulatory.type_id(), 7);
        assert_eq!(FeatureType::Terminator.type_id(), 8);
        assert_eq!(FeatureType::ExactFeature.type_id(), 9);
    }

    #[test]
    fn test_from_code() {
        assert_eq!(FeatureType::from_code("G"), FeatureType::Gene);
        assert_eq!(FeatureType::from_code("S"), FeatureType::Primer);
        assert_eq!(FeatureType::from_code("f"), FeatureType::ExactFeature);
        assert_eq!(FeatureType::from_code("X"), FeatureType::Feature);
        assert_eq!(FeatureType::from_code(""), FeatureType::Feature);
    }

    #[test]
    fn test_content_hash_is_case_insensitive() {
        let a = Feature::new("GENE1", FeatureType::Gene, "ATGCATGC");
        let b = Feature::new("GENE1", FeatureType::Gene, "atgcatgc");
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.sequence, "atgcatgc");
        let c = Feature::new("GENE1", FeatureType::Gene, "atgcatga");
        assert_ne!(a.hash, c.hash);
    }
}
