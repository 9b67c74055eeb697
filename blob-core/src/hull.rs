//! Convex hull of a blob outline (gift wrapping).

use glam::Vec2;

/// Below this cross product three points count as collinear.
const COLLINEAR_EPS: f32 = 1e-6;

/// Convex hull of `points` in counter-clockwise order (y up).
///
/// Starts from the leftmost point and wraps around. On collinear
/// candidates the farthest one wins, so hull edges never contain
/// interior vertices. Duplicate points are dropped. The walk is capped at
/// `2·n` steps so degenerate input always terminates.
///
/// Inputs with fewer than three points are returned as they are.
pub fn convex_hull(points: &[Vec2]) -> Vec<Vec2> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let start = leftmost(points);
    let mut hull = Vec::with_capacity(n);
    let mut current = start;

    for _ in 0..(2 * n) {
        hull.push(points[current]);

        let mut next = if current == 0 { 1 } else { 0 };
        for candidate in 0..n {
            if candidate == current {
                continue;
            }
            let (a, b, c) = (points[current], points[next], points[candidate]);
            if (c - a).length_squared() <= f32::EPSILON {
                continue;
            }
            if (b - a).length_squared() <= f32::EPSILON {
                next = candidate;
                continue;
            }
            let turn = (b - a).perp_dot(c - a);
            // `c` is clockwise of a→b, or collinear and farther.
            if turn < -COLLINEAR_EPS
                || (turn.abs() <= COLLINEAR_EPS
                    && (c - a).length_squared() > (b - a).length_squared())
            {
                next = candidate;
            }
        }

        current = next;
        if current == start || (points[current] - points[start]).length_squared() <= f32::EPSILON
        {
            break;
        }
    }

    hull
}

fn leftmost(points: &[Vec2]) -> usize {
    let mut best = 0;
    for (i, p) in points.iter().enumerate().skip(1) {
        let b = points[best];
        if p.x < b.x || (p.x == b.x && p.y < b.y) {
            best = i;
        }
    }
    best
}
