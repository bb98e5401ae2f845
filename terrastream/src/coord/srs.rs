use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kind of spatial reference system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SrsType {
    Cartesian,
    Projected,
    Geographic,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown SRS type '{0}' (expected cartesian, projected or geographic)")]
pub struct SrsParseError(pub String);

impl FromStr for SrsType {
    type Err = SrsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cartesian" => Ok(SrsType::Cartesian),
            "projected" => Ok(SrsType::Projected),
            "geographic" => Ok(SrsType::Geographic),
            _ => Err(SrsParseError(s.to_string())),
        }
    }
}

impl fmt::Display for SrsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SrsType::Cartesian => "cartesian",
            SrsType::Projected => "projected",
            SrsType::Geographic => "geographic",
        })
    }
}
