//! Coordinate Reference System codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// CRS codes understood by the sampling layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lon/lat in degrees)
    Epsg4326,
    /// Web Mercator (meters)
    Epsg3857,
    /// NAD83 Geographic
    Epsg4269,
    /// Any other EPSG-style numeric code, typically a model-native projection
    Custom(u32),
}

impl CrsCode {
    /// Parse a CRS identifier.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326"
    /// - "epsg:4326"
    /// - "CRS:84" (equivalent to EPSG:4326 with lon/lat axis order)
    /// - "EPSG:900913" (legacy alias of Web Mercator)
    pub fn from_string(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "EPSG:4326" | "CRS:84" => Ok(CrsCode::Epsg4326),
            "EPSG:3857" | "EPSG:900913" => Ok(CrsCode::Epsg3857),
            "EPSG:4269" => Ok(CrsCode::Epsg4269),
            other => {
                let code = other
                    .strip_prefix("EPSG:")
                    .and_then(|c| c.parse::<u32>().ok())
                    .ok_or_else(|| CrsParseError::UnsupportedCrs(s.to_string()))?;
                Ok(CrsCode::Custom(code))
            }
        }
    }

    /// True for the CRS that positions are compared in: lon/lat degrees on WGS84.
    pub fn is_wgs84_lonlat(&self) -> bool {
        matches!(self, CrsCode::Epsg4326)
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326 | CrsCode::Epsg4269)
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrsCode::Epsg4326 => write!(f, "EPSG:4326"),
            CrsCode::Epsg3857 => write!(f, "EPSG:3857"),
            CrsCode::Epsg4269 => write!(f, "EPSG:4269"),
            CrsCode::Custom(code) => write!(f, "EPSG:{}", code),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crs() {
        assert_eq!(CrsCode::from_string("EPSG:4326").unwrap(), CrsCode::Epsg4326);
        assert_eq!(CrsCode::from_string("epsg:3857").unwrap(), CrsCode::Epsg3857);
        assert_eq!(CrsCode::from_string("CRS:84").unwrap(), CrsCode::Epsg4326);
        assert_eq!(
            CrsCode::from_string("EPSG:32618").unwrap(),
            CrsCode::Custom(32618)
        );
        assert!(CrsCode::from_string("WGS84").is_err());
        assert!(CrsCode::from_string("EPSG:abc").is_err());
    }

    #[test]
    fn test_display_roundtrips() {
        for code in [
            CrsCode::Epsg4326,
            CrsCode::Epsg3857,
            CrsCode::Epsg4269,
            CrsCode::Custom(32618),
        ] {
            assert_eq!(CrsCode::from_string(&code.to_string()).unwrap(), code);
        }
    }

    #[test]
    fn test_geographic() {
        assert!(CrsCode::Epsg4326.is_wgs84_lonlat());
        assert!(!CrsCode::Epsg4269.is_wgs84_lonlat());
        assert!(CrsCode::Epsg4269.is_geographic());
        assert!(!CrsCode::Epsg3857.is_geographic());
    }
}
