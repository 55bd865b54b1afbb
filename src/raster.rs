use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;

use crate::region::{Region, Vertex};

/// Coverage value marking a pixel inside the region.
pub const COVERED: u8 = 255;

/// Rasterize `region` onto a fresh zeroed `width` x `height` canvas.
///
/// Pixels enclosed by the polygon through the vertices (in their given cyclic
/// order) become [`COVERED`], every other pixel stays 0. The fill is a
/// scanline fill that pairs sorted edge crossings (even-odd rule) and also
/// strokes the edges, so boundary pixels are included. Vertices may take any
/// `i32` value; the polygon is clipped to the canvas before it is filled.
/// Degenerate regions never fail; they produce an empty, single-pixel or
/// line-shaped fill.
pub fn rasterize_region(width: u32, height: u32, region: &Region) -> GrayImage {
    let mut canvas = GrayImage::new(width, height);
    fill_region(&mut canvas, region);
    canvas
}

/// Fill `region` into an existing canvas with [`COVERED`].
pub fn fill_region(canvas: &mut GrayImage, region: &Region) {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    log::debug!("filling region {region} on {width}x{height} canvas");
    let polygon = open_polygon(clip_to_canvas(region.vertices(), width, height));
    match polygon.as_slice() {
        [] => {}
        [point] => {
            if let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y))
                && x < width
                && y < height
            {
                canvas.put_pixel(x, y, Luma([COVERED]));
            }
        }
        _ => draw_polygon_mut(canvas, &polygon, Luma([COVERED])),
    }
}

/// One side of the clip window.
#[derive(Clone, Copy, Debug)]
enum ClipEdge {
    Left(f64),
    Right(f64),
    Top(f64),
    Bottom(f64),
}

impl ClipEdge {
    fn contains(self, (x, y): (f64, f64)) -> bool {
        match self {
            ClipEdge::Left(bound) => x >= bound,
            ClipEdge::Right(bound) => x <= bound,
            ClipEdge::Top(bound) => y >= bound,
            ClipEdge::Bottom(bound) => y <= bound,
        }
    }

    /// Where the segment `a`-`b` crosses this edge. Only called when exactly
    /// one endpoint is inside, so the divisor is never zero.
    fn intersect(self, (ax, ay): (f64, f64), (bx, by): (f64, f64)) -> (f64, f64) {
        match self {
            ClipEdge::Left(bound) | ClipEdge::Right(bound) => {
                let t = (bound - ax) / (bx - ax);
                (bound, ay + t * (by - ay))
            }
            ClipEdge::Top(bound) | ClipEdge::Bottom(bound) => {
                let t = (bound - ay) / (by - ay);
                (ax + t * (bx - ax), bound)
            }
        }
    }

    fn clip(self, input: &[(f64, f64)]) -> Vec<(f64, f64)> {
        let mut output = Vec::with_capacity(input.len() + 2);
        let Some(&last) = input.last() else {
            return output;
        };
        let mut prev = last;
        for &cur in input {
            match (self.contains(prev), self.contains(cur)) {
                (true, true) => output.push(cur),
                (true, false) => output.push(self.intersect(prev, cur)),
                (false, true) => {
                    output.push(self.intersect(prev, cur));
                    output.push(cur);
                }
                (false, false) => {}
            }
            prev = cur;
        }
        output
    }
}

/// Clip the polygon to a window one pixel larger than the canvas on every
/// side (Sutherland-Hodgman), so the fill primitive only ever sees small
/// coordinates. Edges introduced by the clip lie off the canvas, which keeps
/// the on-canvas fill unchanged. Consecutive vertices that round to the same
/// pixel are merged.
fn clip_to_canvas(vertices: &[Vertex], width: u32, height: u32) -> Vec<Vertex> {
    let window = [
        ClipEdge::Left(-1.0),
        ClipEdge::Right(f64::from(width)),
        ClipEdge::Top(-1.0),
        ClipEdge::Bottom(f64::from(height)),
    ];
    let mut points: Vec<(f64, f64)> = vertices
        .iter()
        .map(|v| (f64::from(v.x), f64::from(v.y)))
        .collect();
    for edge in window {
        points = edge.clip(&points);
    }

    let mut clipped: Vec<Vertex> = Vec::with_capacity(points.len());
    for (x, y) in points {
        let vertex = Vertex::new(x.round() as i32, y.round() as i32);
        if clipped.last() != Some(&vertex) {
            clipped.push(vertex);
        }
    }
    clipped
}

/// The fill primitive rejects polygons whose last vertex repeats the first,
/// so trailing repeats of the first vertex are dropped. This does not change
/// the enclosed area since the polygon is closed implicitly. A polygon whose
/// vertices all coincide collapses to a single point.
fn open_polygon(mut polygon: Vec<Vertex>) -> Vec<Vertex> {
    while polygon.len() > 1 && polygon.last() == polygon.first() {
        polygon.pop();
    }
    polygon
}
