//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// Axis order a set of coordinates was supplied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisOrder {
    /// X (longitude/easting), Y (latitude/northing)
    #[default]
    XY,
    /// Y (latitude/northing), X (longitude/easting)
    LatLon,
}

impl AxisOrder {
    pub fn is_flipped(&self) -> bool {
        matches!(self, AxisOrder::LatLon)
    }
}

/// A geographic or projected bounding box.
///
/// The extents are always stored as x/y regardless of the order the client
/// sent them in; `axis_order` records that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    #[serde(default)]
    pub axis_order: AxisOrder,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
            axis_order: AxisOrder::XY,
        }
    }

    /// Assemble a box from the four components of a BBOX parameter.
    ///
    /// With `flipped` unset the components are `minx,miny,maxx,maxy`. With it
    /// set they are `miny,minx,maxy,maxx` (latitude-first CRSs).
    pub fn from_components(parts: [f64; 4], flipped: bool) -> Self {
        let (xi, yi) = if flipped { (1, 0) } else { (0, 1) };
        Self {
            min_x: parts[xi],
            min_y: parts[yi],
            max_x: parts[xi + 2],
            max_y: parts[yi + 2],
            axis_order: if flipped {
                AxisOrder::LatLon
            } else {
                AxisOrder::XY
            },
        }
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// min <= max on both axes.
    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    /// Check if this bbox intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Extents as `[minx, miny, maxx, maxy]`.
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(parts: [f64; 4]) -> Self {
        Self::from_components(parts, false)
    }
}
