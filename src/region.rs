use std::fmt;
use std::str::FromStr;

use imageproc::point::Point;

use crate::{MaskPaintError, MaskPaintResult};

/// A pixel-space vertex.
pub type Vertex = Point<i32>;

/// Four ordered vertices describing the editable quadrilateral.
///
/// Coordinates are not validated or clipped; vertices outside the canvas are
/// left to the fill primitive's own clipping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    vertices: [Vertex; 4],
}

impl Region {
    pub fn new(vertices: [(i32, i32); 4]) -> Self {
        Self {
            vertices: vertices.map(|(x, y)| Point::new(x, y)),
        }
    }

    /// Axis aligned rectangle from `(x0, y0)` to `(x1, y1)`, walked
    /// top-left, top-right, bottom-right, bottom-left.
    pub fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self::new([(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
    }

    /// Region covering a whole `width` x `height` canvas.
    pub fn full(width: u32, height: u32) -> Self {
        Self::rect(0, 0, clamp_i32(width), clamp_i32(height))
    }

    pub fn vertices(&self) -> &[Vertex; 4] {
        &self.vertices
    }

    /// Apply `f` to every vertex, keeping the order.
    pub fn map(&self, f: impl Fn(Vertex) -> Vertex) -> Self {
        Self {
            vertices: self.vertices.map(f),
        }
    }

    /// Smallest `(min_x, min_y, max_x, max_y)` box containing all vertices.
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        let xs = self.vertices.iter().map(|p| p.x);
        let ys = self.vertices.iter().map(|p| p.y);
        (
            xs.clone().min().unwrap_or_default(),
            ys.clone().min().unwrap_or_default(),
            xs.max().unwrap_or_default(),
            ys.max().unwrap_or_default(),
        )
    }
}

fn clamp_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl From<[(i32, i32); 4]> for Region {
    fn from(vertices: [(i32, i32); 4]) -> Self {
        Self::new(vertices)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.vertices.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{},{}", p.x, p.y)?;
        }
        Ok(())
    }
}

impl FromStr for Region {
    type Err = MaskPaintError;

    /// Parse `x1,y1,x2,y2,x3,y3,x4,y4`. Commas, semicolons and whitespace
    /// all separate values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_region(s)
    }
}

fn parse_region(input: &str) -> MaskPaintResult<Region> {
    let invalid = |reason: String| MaskPaintError::InvalidRegion {
        input: input.to_string(),
        reason,
    };

    let values = input
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<i32>()
                .map_err(|_| invalid(format!("`{token}` is not an integer")))
        })
        .collect::<MaskPaintResult<Vec<i32>>>()?;

    let coords: [i32; 8] = values
        .as_slice()
        .try_into()
        .map_err(|_| invalid(format!("expected 8 integers, got {}", values.len())))?;

    Ok(Region::new([
        (coords[0], coords[1]),
        (coords[2], coords[3]),
        (coords[4], coords[5]),
        (coords[6], coords[7]),
    ]))
}
