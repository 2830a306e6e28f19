use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum PlasmapError {
    String(String),
    Io(std::io::Error),
    Serde(serde_json::Error),
    /// A sequence byte outside {A,C,G,T,N} reached the fragment encoder.
    Encoding { base: u8 },
    NotFound(String),
}

impl Error for PlasmapError {}

impl fmt::Display for PlasmapError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlasmapError::String(s) => write!(f, "{s}"),
            PlasmapError::Io(e) => write!(f, "{e}"),
            PlasmapError::Serde(e) => write!(f, "{e}"),
            PlasmapError::Encoding { base } => {
                write!(f, "Bad nucleotide '{}'", char::from(*base))
            }
            PlasmapError::NotFound(what) => write!(f, "Not found: {what}"),
        }
    }
}

impl From<String> for PlasmapError {
    fn from(err: String) -> Self {
        PlasmapError::String(err)
    }
}

impl From<std::io::Error> for PlasmapError {
    fn from(err: std::io::Error) -> Self {
        PlasmapError::Io(err)
    }
}

impl From<serde_json::Error> for PlasmapError {
    fn from(err: serde_json::Error) -> Self {
        PlasmapError::Serde(err)
    }
}
