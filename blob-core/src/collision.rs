//! Anti-clustering: keeps blob centers at least a personal space apart.
//!
//! Two interchangeable detectors exist. Both write velocity corrections
//! into a [`ForceBuffer`] first and apply them in one pass afterwards.
//!
//! - [`CollisionDetector::BruteForce`] scans every pair once and pushes
//!   both blobs with equal and opposite full-strength corrections.
//! - [`CollisionDetector::SpatialHash`] lets every blob query its own
//!   neighbourhood and push only itself, at half strength. The neighbour
//!   supplies the other half on its own visit, scaled by its own
//!   repulsion strength, so per-blob corrections are half of what the
//!   brute-force detector gives for the same pair.

use glam::Vec2;

use crate::blob::Blob;
use crate::config::{CollisionMode, SimConfig};
use crate::force_buffer::ForceBuffer;
use crate::spatial_hash::SpatialHash;
use crate::spring::SpringSystem;

/// Acceleration at full overlap and unit strength.
pub const REPULSION_ACCEL: f32 = 600.0;

/// Below this fraction of the required distance the push is boosted.
pub const DEEP_OVERLAP_RATIO: f32 = 0.7;

pub const DEEP_OVERLAP_BOOST: f32 = 3.5;

/// Acceleration pushing a blob at `pos` away from a neighbour at `other`.
///
/// Returns the acceleration and the overlap fraction, or `None` when the
/// centers are far enough apart or coincide.
pub fn repulsion(
    pos: Vec2,
    personal_space: f32,
    other: Vec2,
    other_personal_space: f32,
    strength: f32,
) -> Option<(Vec2, f32)> {
    let delta = pos - other;
    let dist = delta.length();
    if dist <= f32::EPSILON {
        return None;
    }

    let required = personal_space.max(other_personal_space);
    if dist >= required {
        return None;
    }

    let overlap = (required - dist) / required;
    let mut accel = overlap * strength * REPULSION_ACCEL;
    if dist < DEEP_OVERLAP_RATIO * required {
        accel *= DEEP_OVERLAP_BOOST;
    }

    Some((delta / dist * accel, overlap))
}

#[derive(Debug)]
pub enum CollisionDetector {
    BruteForce,
    SpatialHash(SpatialHash),
}

impl CollisionDetector {
    /// Picks the detector named by `cfg.collision`.
    ///
    /// The grid cell is twice the neighbour query radius, so each query
    /// touches at most a 3×3 block of cells.
    pub fn from_config(cfg: &SimConfig) -> Self {
        match cfg.collision {
            CollisionMode::BruteForce => Self::BruteForce,
            CollisionMode::SpatialHash => {
                Self::SpatialHash(SpatialHash::new(cfg.max_personal_space * 2.0))
            }
        }
    }

    pub fn mode(&self) -> CollisionMode {
        match self {
            Self::BruteForce => CollisionMode::BruteForce,
            Self::SpatialHash(_) => CollisionMode::SpatialHash,
        }
    }

    /// Accumulates this tick's corrections into `forces`.
    ///
    /// ### Parameters
    /// - `blobs` - Current blobs; only positions and social records are read.
    ///   Blob ids must equal their index in `blobs`.
    /// - `cfg` - Supplies repulsion strength and personal-space limits.
    /// - `dt` - Step length; corrections are velocity changes over `dt`.
    /// - `forces` - Cleared and resized, then filled with one entry per blob.
    pub fn detect(&mut self, blobs: &[Blob], cfg: &SimConfig, dt: f32, forces: &mut ForceBuffer) {
        forces.ensure_len(blobs.len());

        match self {
            Self::BruteForce => {
                for i in 0..blobs.len() {
                    for j in (i + 1)..blobs.len() {
                        let (a, b) = (&blobs[i], &blobs[j]);
                        let strength = cfg.anti_clustering_strength
                            * 0.5
                            * (a.social.repulsion_strength + b.social.repulsion_strength);
                        if let Some((accel, overlap)) = repulsion(
                            a.position(),
                            a.social.personal_space,
                            b.position(),
                            b.social.personal_space,
                            strength,
                        ) {
                            forces.add(i, accel * dt, overlap);
                            forces.add(j, -accel * dt, overlap);
                        }
                    }
                }
            }
            Self::SpatialHash(hash) => {
                hash.rebuild(blobs);
                for (i, a) in blobs.iter().enumerate() {
                    debug_assert_eq!(a.id, i);
                    let strength = cfg.anti_clustering_strength * a.social.repulsion_strength;
                    for j in hash.query_neighbors(i, cfg.max_personal_space) {
                        let b = &blobs[j];
                        if let Some((accel, overlap)) = repulsion(
                            a.position(),
                            a.social.personal_space,
                            b.position(),
                            b.social.personal_space,
                            strength,
                        ) {
                            forces.add(i, accel * dt * 0.5, overlap);
                        }
                    }
                }
            }
        }
    }

    /// Detects overlaps and applies the corrections.
    ///
    /// Every blob that was pushed gets its repulsion time stamped and its
    /// boundary compressed in proportion to the deepest overlap. Returns
    /// the number of blobs pushed.
    pub fn resolve(
        &mut self,
        blobs: &mut [Blob],
        cfg: &SimConfig,
        dt: f32,
        time: f32,
        forces: &mut ForceBuffer,
    ) -> usize {
        self.detect(blobs, cfg, dt, forces);

        let mut touched = 0;
        for id in forces.touched_indices() {
            let blob = &mut blobs[id];
            blob.kinematics.velocity += forces.total(id);
            blob.social.last_repulsion_time = Some(time);
            SpringSystem::apply_pressure(
                &mut blob.boundary.velocities,
                -forces.overlap(id) * cfg.contact_pressure,
            );
            touched += 1;
        }
        touched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn pair(a: Vec2, b: Vec2, personal_space: f32) -> Vec<Blob> {
        [a, b]
            .into_iter()
            .enumerate()
            .map(|(id, pos)| {
                let mut blob = Blob::new(id, pos, 20.0, 8);
                blob.social.personal_space = personal_space;
                blob
            })
            .collect()
    }

    fn config(mode: CollisionMode) -> SimConfig {
        SimConfig {
            collision: mode,
            ..SimConfig::default()
        }
    }

    #[test]
    fn repulsion_points_away_from_neighbour() {
        let (accel, overlap) =
            repulsion(Vec2::new(0.0, 0.0), 10.0, Vec2::new(5.0, 0.0), 10.0, 1.0).unwrap();
        assert!(accel.x < 0.0);
        assert_eq!(accel.y, 0.0);
        assert!((overlap - 0.5).abs() < 1e-6);
    }

    #[test]
    fn repulsion_uses_larger_personal_space() {
        assert!(repulsion(Vec2::ZERO, 5.0, Vec2::new(8.0, 0.0), 10.0, 1.0).is_some());
        assert!(repulsion(Vec2::ZERO, 5.0, Vec2::new(8.0, 0.0), 6.0, 1.0).is_none());
    }

    #[test]
    fn deep_overlap_is_boosted() {
        // 0.75 of required distance: plain push.
        let (shallow, _) = repulsion(Vec2::ZERO, 100.0, Vec2::new(75.0, 0.0), 100.0, 1.0).unwrap();
        assert!((shallow.length() - 0.25 * REPULSION_ACCEL).abs() < 1e-2);

        // 0.65 of required distance: boosted.
        let (deep, _) = repulsion(Vec2::ZERO, 100.0, Vec2::new(65.0, 0.0), 100.0, 1.0).unwrap();
        assert!((deep.length() - 0.35 * REPULSION_ACCEL * DEEP_OVERLAP_BOOST).abs() < 1e-1);
    }

    #[test]
    fn coincident_centers_are_skipped() {
        assert!(repulsion(Vec2::ONE, 10.0, Vec2::ONE, 10.0, 1.0).is_none());

        let mut blobs = pair(Vec2::ONE, Vec2::ONE, 45.0);
        let cfg = config(CollisionMode::BruteForce);
        let mut detector = CollisionDetector::from_config(&cfg);
        let mut forces = ForceBuffer::default();
        assert_eq!(detector.resolve(&mut blobs, &cfg, DT, 0.0, &mut forces), 0);
        assert!(blobs.iter().all(|b| b.velocity() == Vec2::ZERO));
    }

    #[test]
    fn overlapping_pair_is_pushed_apart_in_both_modes() {
        for mode in [CollisionMode::BruteForce, CollisionMode::SpatialHash] {
            let mut blobs = pair(Vec2::new(50.0, 50.0), Vec2::new(55.0, 50.0), 45.0);
            let cfg = config(mode);
            let mut detector = CollisionDetector::from_config(&cfg);
            assert_eq!(detector.mode(), mode);
            let mut forces = ForceBuffer::default();

            let touched = detector.resolve(&mut blobs, &cfg, DT, 2.5, &mut forces);

            assert_eq!(touched, 2, "{mode:?}");
            assert!(blobs[0].velocity().x < 0.0, "{mode:?}");
            assert!(blobs[1].velocity().x > 0.0, "{mode:?}");
            assert!(blobs[0].velocity().y.abs() < 1e-6);
            assert!(blobs[1].velocity().y.abs() < 1e-6);
            for blob in &blobs {
                assert_eq!(blob.social.last_repulsion_time, Some(2.5));
                assert!(blob.boundary.velocities.iter().all(|v| v.radial < 0.0));
            }
        }
    }

    #[test]
    fn distant_pair_is_left_alone() {
        for mode in [CollisionMode::BruteForce, CollisionMode::SpatialHash] {
            let mut blobs = pair(Vec2::new(0.0, 0.0), Vec2::new(300.0, 0.0), 45.0);
            let cfg = config(mode);
            let mut detector = CollisionDetector::from_config(&cfg);
            let mut forces = ForceBuffer::default();
            assert_eq!(detector.resolve(&mut blobs, &cfg, DT, 0.0, &mut forces), 0);
            assert!(blobs.iter().all(|b| b.social.last_repulsion_time.is_none()));
        }
    }

    #[test]
    fn spatial_hash_mode_applies_half_of_brute_force() {
        let blobs = pair(Vec2::new(50.0, 50.0), Vec2::new(60.0, 58.0), 45.0);

        let cfg = config(CollisionMode::BruteForce);
        let mut brute = ForceBuffer::default();
        CollisionDetector::from_config(&cfg).detect(&blobs, &cfg, DT, &mut brute);

        let cfg = config(CollisionMode::SpatialHash);
        let mut hashed = ForceBuffer::default();
        CollisionDetector::from_config(&cfg).detect(&blobs, &cfg, DT, &mut hashed);

        for id in 0..2 {
            assert!((hashed.total(id) * 2.0 - brute.total(id)).length() < 1e-4);
        }
        // Brute force is exactly equal and opposite.
        assert!((brute.total(0) + brute.total(1)).length() < 1e-5);
    }
}
