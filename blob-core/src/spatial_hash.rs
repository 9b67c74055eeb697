//! Uniform grid over blob centers.
//!
//! The grid is rebuilt from scratch every tick, so it never has to track
//! moving entries. A cell size of roughly twice the largest query radius
//! keeps every query inside a 3×3 block of cells.

use std::collections::HashMap;

use glam::{IVec2, Vec2};

use crate::blob::Blob;
use crate::types::BlobId;

#[derive(Clone, Copy, Debug)]
struct Entry {
    id: BlobId,
    pos: Vec2,
}

/// Uniform grid index over blob centers.
///
/// Each blob is bucketed by the cell containing its position. Range
/// queries scan every cell the query circle overlaps and then filter by
/// exact distance, so results never depend on the cell size.
#[derive(Debug)]
pub struct SpatialHash {
    cell_size: f32,
    buckets: HashMap<IVec2, Vec<Entry>>,
    /// Position of every indexed blob, by id.
    positions: Vec<Option<Vec2>>,
    len: usize,
}

impl SpatialHash {
    /// Creates an empty index. Non-positive or non-finite cell sizes fall
    /// back to `1.0`.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            buckets: HashMap::new(),
            positions: Vec::new(),
            len: 0,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Re-indexes every blob under its [`Blob::id`].
    pub fn rebuild(&mut self, blobs: &[Blob]) {
        self.rebuild_with(blobs.iter().map(|b| (b.id, b.position())));
    }

    /// Re-indexes plain positions; entry `i` gets id `i`.
    pub fn rebuild_from_positions(&mut self, positions: &[Vec2]) {
        self.rebuild_with(positions.iter().copied().enumerate());
    }

    fn rebuild_with(&mut self, entries: impl Iterator<Item = (BlobId, Vec2)>) {
        // Keep bucket allocations around between ticks.
        for bucket in self.buckets.values_mut() {
            bucket.clear();
        }
        self.positions.clear();
        self.len = 0;

        for (id, pos) in entries {
            let cell = self.cell_of(pos);
            self.buckets.entry(cell).or_default().push(Entry { id, pos });
            if self.positions.len() <= id {
                self.positions.resize(id + 1, None);
            }
            self.positions[id] = Some(pos);
            self.len += 1;
        }

        self.buckets.retain(|_, bucket| !bucket.is_empty());
    }

    #[inline]
    fn cell_of(&self, pos: Vec2) -> IVec2 {
        IVec2::new(
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    #[inline]
    fn reach(&self, radius: f32) -> i32 {
        (radius / self.cell_size).ceil().max(0.0) as i32
    }

    /// Ids of all entries strictly closer than `radius` to `point`,
    /// sorted ascending, skipping `exclude`.
    ///
    /// Matches a brute-force distance filter exactly.
    pub fn query(&self, point: Vec2, radius: f32, exclude: Option<BlobId>) -> Vec<BlobId> {
        let mut result = Vec::new();
        if !(radius > 0.0) || self.is_empty() {
            return result;
        }

        let r2 = radius * radius;
        let center = self.cell_of(point);
        let reach = self.reach(radius);

        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let Some(bucket) = self.buckets.get(&(center + IVec2::new(dx, dy))) else {
                    continue;
                };
                for e in bucket {
                    if Some(e.id) == exclude {
                        continue;
                    }
                    if (e.pos - point).length_squared() < r2 {
                        result.push(e.id);
                    }
                }
            }
        }

        result.sort_unstable();
        result
    }

    /// Neighbours of an indexed blob, excluding itself. Unknown ids yield
    /// nothing.
    pub fn query_neighbors(&self, id: BlobId, radius: f32) -> Vec<BlobId> {
        match self.positions.get(id).copied().flatten() {
            Some(pos) => self.query(pos, radius, Some(id)),
            None => Vec::new(),
        }
    }

    /// Every unordered pair closer than `radius`, each reported once.
    ///
    /// Pairs inside one cell are enumerated directly; pairs across cells
    /// are only looked up in the forward half of the neighbourhood
    /// (right, lower-right, down, lower-left when the reach is one cell),
    /// so the mirrored lookup never happens.
    pub fn all_pairs(&self, radius: f32) -> Vec<(BlobId, BlobId)> {
        let mut pairs = Vec::new();
        if !(radius > 0.0) {
            return pairs;
        }

        let r2 = radius * radius;
        let reach = self.reach(radius);
        let offsets = forward_offsets(reach);

        for (&cell, bucket) in &self.buckets {
            for (i, a) in bucket.iter().enumerate() {
                for b in &bucket[i + 1..] {
                    if (a.pos - b.pos).length_squared() < r2 {
                        pairs.push((a.id, b.id));
                    }
                }
            }

            for &offset in &offsets {
                let Some(other) = self.buckets.get(&(cell + offset)) else {
                    continue;
                };
                for a in bucket {
                    for b in other {
                        if (a.pos - b.pos).length_squared() < r2 {
                            pairs.push((a.id, b.id));
                        }
                    }
                }
            }
        }

        pairs.sort_unstable();
        pairs
    }
}

/// Cell offsets in the forward half-plane: `dy > 0`, or `dy == 0 && dx > 0`.
fn forward_offsets(reach: i32) -> Vec<IVec2> {
    let mut offsets = Vec::new();
    for dy in 0..=reach {
        for dx in -reach..=reach {
            if dy > 0 || dx > 0 {
                offsets.push(IVec2::new(dx, dy));
            }
        }
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;
    use rand::Rng;
    use std::collections::HashSet;

    fn brute_force(
        positions: &[Vec2],
        point: Vec2,
        radius: f32,
        exclude: Option<BlobId>,
    ) -> Vec<BlobId> {
        positions
            .iter()
            .enumerate()
            .filter(|&(id, p)| Some(id) != exclude && (*p - point).length_squared() < radius * radius)
            .map(|(id, _)| id)
            .collect()
    }

    fn random_positions(n: usize, seed: u64) -> Vec<Vec2> {
        let mut rng = create_rng(seed);
        (0..n)
            .map(|_| {
                Vec2::new(
                    rng.random_range(-200.0..600.0),
                    rng.random_range(-200.0..600.0),
                )
            })
            .collect()
    }

    #[test]
    fn forward_offsets_for_one_cell_are_the_canonical_four() {
        let offsets: HashSet<IVec2> = forward_offsets(1).into_iter().collect();
        let expected: HashSet<IVec2> = [
            IVec2::new(1, 0),
            IVec2::new(1, 1),
            IVec2::new(0, 1),
            IVec2::new(-1, 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(offsets, expected);
    }

    #[test]
    fn empty_index_returns_nothing() {
        let hash = SpatialHash::new(50.0);
        assert!(hash.is_empty());
        assert!(hash.query(Vec2::ZERO, 100.0, None).is_empty());
        assert!(hash.query_neighbors(0, 100.0).is_empty());
        assert!(hash.all_pairs(100.0).is_empty());
    }

    #[test]
    fn query_matches_brute_force() {
        let positions = random_positions(120, 11);
        let mut hash = SpatialHash::new(60.0);
        hash.rebuild_from_positions(&positions);
        assert_eq!(hash.len(), positions.len());

        let mut rng = create_rng(12);
        for _ in 0..200 {
            let point = Vec2::new(
                rng.random_range(-250.0..650.0),
                rng.random_range(-250.0..650.0),
            );
            // Radii both below and well above the cell size.
            let radius = rng.random_range(1.0..250.0);
            let exclude = if rng.random_bool(0.5) {
                Some(rng.random_range(0..positions.len()))
            } else {
                None
            };
            assert_eq!(
                hash.query(point, radius, exclude),
                brute_force(&positions, point, radius, exclude)
            );
        }
    }

    #[test]
    fn query_uses_strict_distance() {
        let positions = [Vec2::ZERO, Vec2::new(10.0, 0.0)];
        let mut hash = SpatialHash::new(20.0);
        hash.rebuild_from_positions(&positions);
        assert_eq!(hash.query(Vec2::ZERO, 10.0, None), vec![0]);
        assert_eq!(hash.query(Vec2::ZERO, 10.001, None), vec![0, 1]);
    }

    #[test]
    fn query_neighbors_excludes_self() {
        let positions = [
            Vec2::new(5.0, 5.0),
            Vec2::new(6.0, 5.0),
            Vec2::new(50.0, 50.0),
        ];
        let mut hash = SpatialHash::new(10.0);
        hash.rebuild_from_positions(&positions);
        assert_eq!(hash.query_neighbors(0, 2.0), vec![1]);
        assert!(hash.query_neighbors(7, 2.0).is_empty());
    }

    #[test]
    fn rebuild_discards_stale_positions() {
        let mut hash = SpatialHash::new(10.0);
        hash.rebuild_from_positions(&[Vec2::ZERO, Vec2::new(1.0, 0.0)]);
        assert_eq!(hash.query(Vec2::ZERO, 5.0, None), vec![0, 1]);

        hash.rebuild_from_positions(&[Vec2::new(100.0, 100.0)]);
        assert!(hash.query(Vec2::ZERO, 5.0, None).is_empty());
        assert_eq!(hash.query(Vec2::new(100.0, 100.0), 5.0, None), vec![0]);
    }

    #[test]
    fn all_pairs_is_unique_and_complete() {
        let positions = random_positions(150, 21);
        let mut hash = SpatialHash::new(50.0);
        hash.rebuild_from_positions(&positions);

        for radius in [20.0, 50.0, 90.0, 180.0] {
            let pairs = hash.all_pairs(radius);

            let mut seen = HashSet::new();
            for &(a, b) in &pairs {
                assert_ne!(a, b, "self pair reported");
                assert!(seen.insert((a.min(b), a.max(b))), "pair {a},{b} reported twice");
            }

            let mut expected = HashSet::new();
            for i in 0..positions.len() {
                for j in (i + 1)..positions.len() {
                    if (positions[i] - positions[j]).length_squared() < radius * radius {
                        expected.insert((i, j));
                    }
                }
            }
            assert_eq!(seen, expected, "radius {radius}");
        }
    }

    #[test]
    fn negative_coordinates_land_in_their_own_cells() {
        let positions = [Vec2::new(-0.5, -0.5), Vec2::new(0.5, 0.5)];
        let mut hash = SpatialHash::new(10.0);
        hash.rebuild_from_positions(&positions);
        assert_eq!(hash.all_pairs(2.0), vec![(0, 1)]);
    }

    #[test]
    fn invalid_cell_size_falls_back() {
        assert_eq!(SpatialHash::new(0.0).cell_size(), 1.0);
        assert_eq!(SpatialHash::new(f32::NAN).cell_size(), 1.0);
    }
}
