//! Parser for the reference-library line format.
//!
//! Enzyme lines: `E:<name>,<cutAfter>/<otherCut> <sequence>`
//! Generic lines: `<TypeCode>:<name> <sequence>`
//! Malformed lines are skipped silently.

use crate::feature::{Feature, FeatureType};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ENZYME_LINE: Regex = Regex::new(r"^E:(\w+),(\d)/(\d) (.+)$").unwrap();
    static ref FEATURE_LINE: Regex = Regex::new(r"^(\w+):(\S+) (.+)$").unwrap();
}

/// Parses library text into features. The enzyme form is tried first; a
/// line matching neither form is skipped.
pub fn parse_feature_lines(text: &str) -> Vec<Feature> {
    let mut ret = vec![];
    for line in text.lines() {
        let line = line.trim_end();
        if let Some(m) = ENZYME_LINE.captures(line) {
            let mut feature = Feature::new(&m[1], FeatureType::Enzyme, &m[4]);
            feature.cut_after = m[2].parse().ok();
            ret.push(feature);
        } else if let Some(m) = FEATURE_LINE.captures(line) {
            ret.push(Feature::new(&m[2], FeatureType::from_code(&m[1]), &m[3]));
        }
    }
    ret
}
