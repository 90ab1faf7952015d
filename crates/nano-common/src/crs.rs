//! Coordinate Reference System lookup.
//!
//! Only identification is handled here; no coordinate transformation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::bbox::AxisOrder;
use crate::error::{NanoError, NanoResult};

/// A resolved CRS definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    /// Canonical identifier, e.g. `EPSG:4326`.
    pub code: String,
    pub name: String,
    /// Axis order declared by the defining authority.
    pub axis_order: AxisOrder,
    pub geographic: bool,
}

impl Crs {
    /// True when the authority axis order is latitude first.
    pub fn is_lat_first(&self) -> bool {
        self.axis_order.is_flipped()
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// Reasons a CRS lookup can fail.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CrsLookupError {
    #[error("Unsupported CRS parameter: {0}")]
    UnsupportedParameter(String),

    #[error("Unknown authority code: {0}")]
    UnknownAuthorityCode(String),

    #[error("CRS lookup failed: {0}")]
    IllegalState(String),
}

impl CrsLookupError {
    /// Log-friendly reason; clients only ever see the folded message.
    pub fn reason(&self) -> &'static str {
        match self {
            CrsLookupError::UnsupportedParameter(_) => "Cannot parse provided srs",
            CrsLookupError::UnknownAuthorityCode(_) => "Cannot locate provided authority",
            CrsLookupError::IllegalState(_) => "CRS lookup failed",
        }
    }
}

/// Something that can turn a CRS identifier into a definition.
pub trait CrsLookup: Send + Sync {
    fn lookup(&self, identifier: &str) -> Result<Crs, CrsLookupError>;
}

struct KnownCrs {
    code: u32,
    name: &'static str,
    axis_order: AxisOrder,
    geographic: bool,
}

const EPSG_CODES: &[KnownCrs] = &[
    KnownCrs {
        code: 4326,
        name: "WGS 84",
        axis_order: AxisOrder::LatLon,
        geographic: true,
    },
    KnownCrs {
        code: 4269,
        name: "NAD83",
        axis_order: AxisOrder::LatLon,
        geographic: true,
    },
    KnownCrs {
        code: 3857,
        name: "WGS 84 / Pseudo-Mercator",
        axis_order: AxisOrder::XY,
        geographic: false,
    },
    KnownCrs {
        code: 900913,
        name: "Google Maps Global Mercator",
        axis_order: AxisOrder::XY,
        geographic: false,
    },
    KnownCrs {
        code: 5070,
        name: "NAD83 / Conus Albers",
        axis_order: AxisOrder::XY,
        geographic: false,
    },
    KnownCrs {
        code: 3413,
        name: "WGS 84 / NSIDC Sea Ice Polar Stereographic North",
        axis_order: AxisOrder::XY,
        geographic: false,
    },
    KnownCrs {
        code: 3031,
        name: "WGS 84 / Antarctic Polar Stereographic",
        axis_order: AxisOrder::XY,
        geographic: false,
    },
];

/// Built-in lookup for the handful of CRSs the service knows about.
///
/// Accepts `AUTH:CODE` (case-insensitive) and `urn:ogc:def:crs:AUTH::CODE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpsgRegistry;

impl EpsgRegistry {
    pub fn new() -> Self {
        Self
    }

    fn split_identifier(identifier: &str) -> Result<(String, String), CrsLookupError> {
        let normalized = identifier.trim().to_uppercase();
        let unsupported = || CrsLookupError::UnsupportedParameter(identifier.to_string());

        let (authority, code) = if let Some(rest) = normalized.strip_prefix("URN:OGC:DEF:CRS:") {
            // AUTH:version:CODE, version usually empty
            let mut parts = rest.split(':');
            let authority = parts.next().ok_or_else(unsupported)?;
            let code = parts.last().ok_or_else(unsupported)?;
            (authority.to_string(), code.to_string())
        } else {
            let (authority, code) = normalized.split_once(':').ok_or_else(unsupported)?;
            (authority.to_string(), code.to_string())
        };

        if authority.is_empty() || code.is_empty() {
            return Err(unsupported());
        }
        Ok((authority, code))
    }
}

impl CrsLookup for EpsgRegistry {
    fn lookup(&self, identifier: &str) -> Result<Crs, CrsLookupError> {
        let (authority, code) = Self::split_identifier(identifier)?;

        match authority.as_str() {
            "CRS" if code == "84" => Ok(Crs {
                code: "CRS:84".to_string(),
                name: "WGS 84 (lon/lat)".to_string(),
                axis_order: AxisOrder::XY,
                geographic: true,
            }),
            "EPSG" => {
                let number: u32 = code
                    .parse()
                    .map_err(|_| CrsLookupError::UnsupportedParameter(identifier.to_string()))?;
                EPSG_CODES
                    .iter()
                    .find(|known| known.code == number)
                    .map(|known| Crs {
                        code: format!("EPSG:{}", known.code),
                        name: known.name.to_string(),
                        axis_order: known.axis_order,
                        geographic: known.geographic,
                    })
                    .ok_or_else(|| CrsLookupError::UnknownAuthorityCode(identifier.to_string()))
            }
            _ => Err(CrsLookupError::UnknownAuthorityCode(identifier.to_string())),
        }
    }
}

/// Resolves the `srs` query parameter, folding lookup failures into a
/// single client error.
pub struct CrsResolver<'a> {
    lookup: &'a dyn CrsLookup,
}

impl<'a> CrsResolver<'a> {
    pub fn new(lookup: &'a dyn CrsLookup) -> Self {
        Self { lookup }
    }

    /// `Ok(None)` when no CRS was requested.
    pub fn resolve(&self, identifier: Option<&str>) -> NanoResult<Option<Crs>> {
        let Some(identifier) = identifier else {
            return Ok(None);
        };

        match self.lookup.lookup(identifier) {
            Ok(crs) => Ok(Some(crs)),
            Err(e) => {
                tracing::debug!(
                    srs = identifier,
                    reason = e.reason(),
                    error = %e,
                    "CRS lookup failed"
                );
                Err(NanoError::UnresolvableCrs(identifier.to_string()))
            }
        }
    }
}
