use feature::Feature;
use lazy_static::lazy_static;

pub mod error;
pub mod feature;
pub mod feature_import;
pub mod feature_store;
pub mod fragment_code;
pub mod fragment_index;
pub mod seed_match;
pub mod seed_table;

lazy_static! {
    // Built-in starter library, in the reference-library line format
    pub static ref FEATURE_LIBRARY: Vec<Feature> =
        feature_import::parse_feature_lines(include_str!("../assets/features.txt"));
}

#[cfg(test)]
mod tests {
    use crate::FEATURE_LIBRARY;

    #[test]
    fn test_builtin_library_loads() {
        assert!(FEATURE_LIBRARY.iter().any(|f| f.name == "EcoRI"));
        assert!(FEATURE_LIBRARY.iter().any(|f| f.name == "BamHI"));
        assert!(
            FEATURE_LIBRARY
                .iter()
                .all(|f| f.sequence.bytes().all(|b| b"acgtn".contains(&b)))
        );
    }
}
