//! Turns a blob outline into a closed smooth curve for rendering.
//!
//! The deformed outline is not guaranteed to be simple, so the curve is
//! built through the convex hull of the absolute boundary points. Each hull
//! edge becomes one cubic Bézier segment with conservative control points.

use std::f32::consts::TAU;
use std::fmt::Write;

use glam::Vec2;

use crate::blob::Blob;
use crate::hull::convex_hull;

/// Pull of the first control point toward the next hull vertex.
const LEAD_BLEND: f32 = 0.15;
/// Pull of the second control point back from the vertex after next.
const TRAIL_BLEND: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicSegment {
    pub c1: Vec2,
    pub c2: Vec2,
    pub to: Vec2,
}

impl CubicSegment {
    /// Point at parameter `t` of the segment starting at `from`.
    pub fn eval(&self, from: Vec2, t: f32) -> Vec2 {
        let u = 1.0 - t;
        from * (u * u * u)
            + self.c1 * (3.0 * u * u * t)
            + self.c2 * (3.0 * u * t * t)
            + self.to * (t * t * t)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum BlobPath {
    Circle { center: Vec2, radius: f32 },
    /// Closed curve: the last segment ends at `start`.
    Curve {
        start: Vec2,
        segments: Vec<CubicSegment>,
    },
}

impl BlobPath {
    /// SVG path data with two decimals.
    ///
    /// Curves render as `M x,y C … Z`; circles as two half arcs.
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        match self {
            Self::Circle { center, radius } => {
                let (cx, cy, r) = (center.x, center.y, *radius);
                // Writing to a String cannot fail.
                let _ = write!(
                    out,
                    "M {:.2},{:.2} A {r:.2},{r:.2} 0 1,0 {:.2},{:.2} A {r:.2},{r:.2} 0 1,0 {:.2},{:.2} Z",
                    cx - r,
                    cy,
                    cx + r,
                    cy,
                    cx - r,
                    cy,
                );
            }
            Self::Curve { start, segments } => {
                let _ = write!(out, "M {:.2},{:.2}", start.x, start.y);
                for s in segments {
                    let _ = write!(
                        out,
                        " C {:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
                        s.c1.x, s.c1.y, s.c2.x, s.c2.y, s.to.x, s.to.y
                    );
                }
                out.push_str(" Z");
            }
        }
        out
    }

    /// Polyline approximation with `samples` points per segment (or per
    /// circle). The closing point is not repeated.
    pub fn flatten(&self, samples: usize) -> Vec<Vec2> {
        let samples = samples.max(1);
        match self {
            Self::Circle { center, radius } => {
                let n = samples.max(3);
                (0..n)
                    .map(|i| *center + Vec2::from_angle(i as f32 / n as f32 * TAU) * *radius)
                    .collect()
            }
            Self::Curve { start, segments } => {
                let mut points = Vec::with_capacity(segments.len() * samples);
                let mut from = *start;
                for s in segments {
                    for k in 0..samples {
                        points.push(s.eval(from, k as f32 / samples as f32));
                    }
                    from = s.to;
                }
                points
            }
        }
    }
}

/// Path through the convex hull of `blob`'s outline.
///
/// Falls back to a circle of radius `size` when the blob has fewer than
/// three boundary points or the hull collapses.
pub fn blob_path(blob: &Blob) -> BlobPath {
    let circle = BlobPath::Circle {
        center: blob.position(),
        radius: blob.size(),
    };
    if blob.boundary.len() < 3 {
        return circle;
    }

    let hull = convex_hull(&blob.outline());
    let n = hull.len();
    if n < 3 {
        return circle;
    }

    let segments = (0..n)
        .map(|i| {
            let prev = hull[(i + n - 1) % n];
            let p0 = hull[i];
            let p1 = hull[(i + 1) % n];
            let p2 = hull[(i + 2) % n];
            CubicSegment {
                c1: p0 + (p1 - prev) * LEAD_BLEND,
                c2: p1 - (p2 - p0) * TRAIL_BLEND,
                to: p1,
            }
        })
        .collect();

    BlobPath::Curve {
        start: hull[0],
        segments,
    }
}
