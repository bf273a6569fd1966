//! Parser for the HDF-EOS `StructMetadata.0` text block.
//!
//! The block is ODL-like: one `Key=Value` statement per line, indented with
//! tabs, nested with `GROUP=<name>` / `END_GROUP=<name>` (and
//! `OBJECT=` / `END_OBJECT=`). For an HLS grid it reads:
//!
//! ```text
//! GROUP=SwathStructure
//! END_GROUP=SwathStructure
//! GROUP=GridStructure
//!     GROUP=GRID_1
//!         GridName="Grid"
//!         XDim=3660
//!         YDim=3660
//!         UpperLeftPointMtrs=(399960.000000,4000020.000000)
//!         LowerRightMtrs=(509760.000000,3890220.000000)
//!         Projection=GCTP_UTM
//!         ...
//!     END_GROUP=GRID_1
//! END_GROUP=GridStructure
//! END
//! ```
//!
//! Grid corners are `(x,y)` tuples of signed decimals in projected metres.
use std::fmt;

use crate::error::{Error, Result};

const UPPER_LEFT_KEY: &str = "UpperLeftPointMtrs";
const LOWER_RIGHT_KEY: &str = "LowerRightMtrs";

/// One `Key=Value` statement and the group path enclosing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub group: String,
    pub key: String,
    pub value: String,
}

/// Parsed statements of a structured-metadata block, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructMetadata {
    statements: Vec<Statement>,
}

/// Two opposite grid corners in projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCorners {
    pub upper_left: (f64, f64),
    pub lower_right: (f64, f64),
}

impl GridCorners {
    /// Corners of a `width` x `height` raster with the given affine
    /// geotransform (`[x0, dx, rx, y0, ry, dy]`).
    pub fn from_geo_transform(gt: [f64; 6], (width, height): (usize, usize)) -> Self {
        let (w, h) = (width as f64, height as f64);
        GridCorners {
            upper_left: (gt[0], gt[3]),
            lower_right: (gt[0] + w * gt[1] + h * gt[2], gt[3] + w * gt[4] + h * gt[5]),
        }
    }

    /// Bounds ordered as `[x_low, y_low, x_high, y_high]`.
    pub fn projected_bounds(&self) -> [f64; 4] {
        let (ulx, uly) = self.upper_left;
        let (lrx, lry) = self.lower_right;
        [ulx.min(lrx), uly.min(lry), ulx.max(lrx), uly.max(lry)]
    }
}

/// Renders the corner statements in the block's own syntax.
impl fmt::Display for GridCorners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (ulx, uly) = self.upper_left;
        let (lrx, lry) = self.lower_right;
        writeln!(f, "{}=({:.6},{:.6})", UPPER_LEFT_KEY, ulx, uly)?;
        write!(f, "{}=({:.6},{:.6})", LOWER_RIGHT_KEY, lrx, lry)
    }
}

impl StructMetadata {
    pub fn parse(text: &str) -> Self {
        let mut groups: Vec<&str> = Vec::new();
        let mut statements = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            match key {
                "GROUP" | "OBJECT" => groups.push(value),
                "END_GROUP" | "END_OBJECT" => {
                    groups.pop();
                }
                _ => statements.push(Statement {
                    group: groups.join("/"),
                    key: key.to_string(),
                    value: value.to_string(),
                }),
            }
        }

        StructMetadata { statements }
    }

    /// Value of the first statement named `key`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.statements
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.value.as_str())
    }

    /// Corners of the first grid declared in the block.
    pub fn grid_corners(&self) -> Result<GridCorners> {
        let upper_left = self.corner(UPPER_LEFT_KEY)?;
        let lower_right = self.corner(LOWER_RIGHT_KEY)?;
        Ok(GridCorners {
            upper_left,
            lower_right,
        })
    }

    fn corner(&self, key: &str) -> Result<(f64, f64)> {
        let value = self
            .value(key)
            .ok_or_else(|| Error::SpatialParse(format!("missing `{}` statement", key)))?;
        match numeric_tokens(value).as_slice() {
            [x, y, ..] => Ok((*x, *y)),
            _ => Err(Error::SpatialParse(format!(
                "`{}` holds fewer than two coordinates: {}",
                key, value
            ))),
        }
    }
}

/// Numeric tokens of a value such as `(399960.000000,-4000020.5)`.
fn numeric_tokens(value: &str) -> Vec<f64> {
    value
        .split(|c: char| c == '(' || c == ')' || c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .collect()
}
