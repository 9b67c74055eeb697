//! Mass-spring-damper law for the radial motion of boundary points.
//!
//! Each point is tied to its rest radius, to the average of its two
//! circular neighbours, and to a shared internal pressure. The system
//! itself holds only constants; the points and velocities it drives are
//! owned by the blob.

use crate::blob::{BoundaryPoint, BoundaryPointVelocity};
use crate::config::SimConfig;

/// Fraction of radial velocity kept after hitting the deformation limit.
const LIMIT_DAMPING: f32 = 0.3;

/// Scale of the uniform pressure term, relative to the base radius.
const PRESSURE_SCALE: f32 = 0.01;

/// Caller-supplied radial force, shared by all points or given per point.
#[derive(Clone, Copy, Debug)]
pub enum ExternalForce<'a> {
    Uniform(f32),
    /// Missing trailing entries count as zero.
    PerPoint(&'a [f32]),
}

impl ExternalForce<'_> {
    #[inline]
    fn at(&self, i: usize) -> f32 {
        match self {
            Self::Uniform(f) => *f,
            Self::PerPoint(forces) => forces.get(i).copied().unwrap_or(0.0),
        }
    }
}

/// Constants of the radial mass-spring-damper model.
///
/// Every boundary point has unit mass. Its force combines a spring to the
/// rest radius, tension toward the neighbour average, neighbour coupling,
/// a uniform pressure term, damping and a caller-supplied external force.
#[derive(Clone, Debug, PartialEq)]
pub struct SpringSystem {
    /// Spring-to-rest constant.
    pub stiffness: f32,
    /// Pull toward the neighbour average.
    pub tension: f32,
    /// Internal pressure; 1.0 is neutral.
    pub pressure: f32,
    pub coupling_strength: f32,
    /// Viscous damping on radial velocity.
    pub damping: f32,
    pub max_velocity: f32,
    /// Allowed relative deviation from the base radius.
    pub max_deformation: f32,
}

impl Default for SpringSystem {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

impl SpringSystem {
    pub fn from_config(cfg: &SimConfig) -> Self {
        Self {
            stiffness: cfg.spring_stiffness,
            tension: cfg.spring_tension,
            pressure: cfg.spring_pressure,
            coupling_strength: cfg.coupling_strength,
            damping: cfg.spring_damping,
            max_velocity: cfg.max_radial_velocity,
            max_deformation: cfg.max_deformation,
        }
    }

    /// Total radial force on one point.
    pub fn force(
        &self,
        point: &BoundaryPoint,
        velocity: &BoundaryPointVelocity,
        left: f32,
        right: f32,
        external: f32,
    ) -> f32 {
        let r = point.radius;
        let spring = -self.stiffness * (r - point.base_radius);
        let tension = -self.tension * (r - 0.5 * (left + right));
        let pressure = (self.pressure - 1.0) * point.base_radius * PRESSURE_SCALE;
        let coupling = self.coupling_strength * 0.5 * ((left - r) + (right - r));
        let damping = -self.damping * velocity.radial;
        spring + tension + pressure + coupling + damping + external
    }

    /// Advances one point by `dt` with semi-implicit Euler.
    ///
    /// Velocity is clamped to `±max_velocity`. When the radius hits the
    /// deformation band the velocity is mostly absorbed, so the limit
    /// behaves like an inelastic wall.
    pub fn update_control_point(
        &self,
        point: &mut BoundaryPoint,
        velocity: &mut BoundaryPointVelocity,
        left: f32,
        right: f32,
        external: f32,
        dt: f32,
    ) {
        let f = self.force(point, velocity, left, right, external);

        velocity.radial = (velocity.radial + f * dt).clamp(-self.max_velocity, self.max_velocity);
        point.radius += velocity.radial * dt;

        let lo = point.base_radius * (1.0 - self.max_deformation);
        let hi = point.base_radius * (1.0 + self.max_deformation);
        if point.radius < lo || point.radius > hi {
            point.radius = point.radius.clamp(lo, hi);
            velocity.radial *= LIMIT_DAMPING;
        }
    }

    /// Advances every point, coupling each to its circular neighbours.
    ///
    /// Neighbour radii come from the state before the sweep, so the
    /// update does not depend on iteration order.
    pub fn update_all_control_points(
        &self,
        points: &mut [BoundaryPoint],
        velocities: &mut [BoundaryPointVelocity],
        external: ExternalForce<'_>,
        dt: f32,
    ) {
        let n = points.len().min(velocities.len());
        if n < 3 {
            return;
        }

        let radii: Vec<f32> = points[..n].iter().map(|p| p.radius).collect();
        for i in 0..n {
            let left = radii[(i + n - 1) % n];
            let right = radii[(i + 1) % n];
            self.update_control_point(
                &mut points[i],
                &mut velocities[i],
                left,
                right,
                external.at(i),
                dt,
            );
        }
    }

    /// Radial kick from a directional impulse.
    ///
    /// The side facing `direction` is pushed inward, the opposite side
    /// outward.
    pub fn apply_impulse(
        points: &[BoundaryPoint],
        velocities: &mut [BoundaryPointVelocity],
        direction: f32,
        magnitude: f32,
    ) {
        for (p, v) in points.iter().zip(velocities.iter_mut()) {
            v.radial += -(p.angle - direction).cos() * magnitude;
        }
    }

    /// Uniform radial nudge, negative to compress.
    pub fn apply_pressure(velocities: &mut [BoundaryPointVelocity], delta: f32) {
        for v in velocities {
            v.radial += delta;
        }
    }

    /// `Σ ½v²` over the radial velocities, unit mass.
    pub fn kinetic_energy(velocities: &[BoundaryPointVelocity]) -> f32 {
        velocities.iter().map(|v| 0.5 * v.radial * v.radial).sum()
    }

    /// Energy stored in the springs to the rest radius.
    pub fn potential_energy(&self, points: &[BoundaryPoint]) -> f32 {
        points
            .iter()
            .map(|p| {
                let d = p.displacement();
                0.5 * self.stiffness * d * d
            })
            .sum()
    }

    /// Energy stored between circular neighbours.
    ///
    /// Tension and coupling both act as springs on the radius difference of
    /// adjacent points, with combined constant `(tension + coupling) / 2`
    /// per edge. Fewer than three points are never coupled.
    pub fn neighbour_energy(&self, points: &[BoundaryPoint]) -> f32 {
        let n = points.len();
        if n < 3 {
            return 0.0;
        }
        let k = 0.25 * (self.tension + self.coupling_strength);
        (0..n)
            .map(|i| {
                let d = points[i].radius - points[(i + 1) % n].radius;
                k * d * d
            })
            .sum()
    }

    /// Kinetic plus both potential terms.
    ///
    /// With neutral pressure and no external force this strictly decreases
    /// from one damped update to the next until the boundary is at rest.
    /// A non-neutral pressure is treated as an outside load and its work is
    /// not counted.
    pub fn total_energy(
        &self,
        points: &[BoundaryPoint],
        velocities: &[BoundaryPointVelocity],
    ) -> f32 {
        Self::kinetic_energy(velocities)
            + self.potential_energy(points)
            + self.neighbour_energy(points)
    }

    /// `true` once [`SpringSystem::total_energy`] is below `threshold`.
    pub fn is_at_rest(
        &self,
        points: &[BoundaryPoint],
        velocities: &[BoundaryPointVelocity],
        threshold: f32,
    ) -> bool {
        self.total_energy(points, velocities) < threshold
    }
}
