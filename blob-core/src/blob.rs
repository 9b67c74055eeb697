//! Blob data model.
//!
//! A [`Blob`] is composed of small cohesive records instead of one flat
//! bag of optional fields. Every field has a concrete value from the
//! moment the blob is built, so the update code never has to invent
//! fallbacks.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::config::SimConfig;
use crate::types::BlobId;

/// Colors assigned round-robin when no palette is supplied.
pub const DEFAULT_PALETTE: [&str; 6] = [
    "#ff6b9d", "#c44dff", "#4d9fff", "#4dffb8", "#ffd24d", "#ff8a4d",
];

const RADIUS_JITTER: f32 = 0.35;
const INITIAL_SPEED: f32 = 20.0;
const INITIAL_ANGULAR_SPEED: f32 = 0.05;

/// One polar sample of a blob outline.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryPoint {
    pub radius: f32,
    pub angle: f32,
    /// Rest length of the radial spring.
    pub base_radius: f32,
    pub target_radius: f32,
    pub pressure: f32,
    pub adhesion: f32,
    pub tension: f32,
}

impl BoundaryPoint {
    pub fn new(angle: f32, base_radius: f32, radius: f32) -> Self {
        Self {
            radius,
            angle,
            base_radius,
            target_radius: radius,
            pressure: 1.0,
            adhesion: 0.0,
            tension: 1.0,
        }
    }

    /// Deviation from the rest length.
    #[inline]
    pub fn displacement(&self) -> f32 {
        self.radius - self.base_radius
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundaryPointVelocity {
    pub radial: f32,
    pub angular: f32,
    /// Reserved; the current force law does not read it.
    pub pressure: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Kinematics {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Nominal radius.
    pub size: f32,
}

/// Outline samples plus their velocities, kept in two parallel vectors.
#[derive(Clone, Debug, PartialEq)]
pub struct Boundary {
    pub points: Vec<BoundaryPoint>,
    pub velocities: Vec<BoundaryPointVelocity>,
    /// Phase offset of the sinusoidal pulse.
    pub pulse_phase: f32,
}

impl Boundary {
    /// Evenly spaced points around a circle of radius `base_radius`.
    pub fn circle(count: usize, base_radius: f32) -> Self {
        let points = (0..count)
            .map(|i| {
                let angle = i as f32 / count as f32 * TAU;
                BoundaryPoint::new(angle, base_radius, base_radius)
            })
            .collect();
        Self {
            points,
            velocities: vec![BoundaryPointVelocity::default(); count],
            pulse_phase: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

}

#[derive(Clone, Debug, PartialEq)]
pub struct Physique {
    /// Scales how much motion squashes the outline.
    pub elasticity: f32,
    /// Scales per-tick friction.
    pub viscosity: f32,
    /// Scales attraction toward the pointer while scrolling.
    pub scroll_affinity: f32,
}

impl Default for Physique {
    fn default() -> Self {
        Self {
            elasticity: 1.0,
            viscosity: 1.0,
            scroll_affinity: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Social {
    /// Minimum center distance before repulsion kicks in.
    pub personal_space: f32,
    pub repulsion_strength: f32,
    pub last_repulsion_time: Option<f32>,
}

/// Soft home region.
#[derive(Clone, Debug, PartialEq)]
pub struct Territory {
    pub center: Vec2,
    pub radius: f32,
    pub last_relocation: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Agitation {
    /// Extra boundary noise, in `[0, 1]`.
    pub chaos_level: f32,
    /// Per-tick multiplier applied to `chaos_level`.
    pub turbulence_decay: f32,
    /// Random-walk heading of the ambient drift.
    pub drift_angle: f32,
}

impl Default for Agitation {
    fn default() -> Self {
        Self {
            chaos_level: 0.0,
            turbulence_decay: 0.96,
            drift_angle: 0.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WallContact {
    pub bounce_count: u32,
    pub last_bounce_time: Option<f32>,
}

/// Values the renderer needs but the physics never reads.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderHints {
    pub color: String,
    pub gradient_id: String,
    pub intensity: f32,
    /// Latest device tilt, copied through untouched.
    pub tilt: Vec3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Blob {
    pub id: BlobId,
    pub kinematics: Kinematics,
    pub boundary: Boundary,
    pub physique: Physique,
    pub social: Social,
    pub territory: Territory,
    pub agitation: Agitation,
    pub wall: WallContact,
    pub render: RenderHints,
}

impl Blob {
    /// A motionless round blob with neutral constants.
    ///
    /// Personal space defaults to twice the size and the territory is
    /// centered on the starting position.
    pub fn new(id: BlobId, position: Vec2, size: f32, boundary_points: usize) -> Self {
        Self {
            id,
            kinematics: Kinematics {
                position,
                velocity: Vec2::ZERO,
                size,
            },
            boundary: Boundary::circle(boundary_points, size),
            physique: Physique::default(),
            social: Social {
                personal_space: size * 2.0,
                repulsion_strength: 1.0,
                last_repulsion_time: None,
            },
            territory: Territory {
                center: position,
                radius: size * 2.0,
                last_relocation: 0.0,
            },
            agitation: Agitation::default(),
            wall: WallContact::default(),
            render: RenderHints {
                color: DEFAULT_PALETTE[id % DEFAULT_PALETTE.len()].to_string(),
                gradient_id: format!("blob-gradient-{id}"),
                intensity: 1.0,
                tilt: Vec3::ZERO,
            },
        }
    }

    /// A blob with every physical constant drawn from its fixed range.
    pub fn random(id: BlobId, position: Vec2, cfg: &SimConfig, rng: &mut impl Rng) -> Self {
        let size = rng.random_range(cfg.min_size..=cfg.max_size);
        let mut blob = Self::new(id, position, size, cfg.boundary_points);

        let band = cfg.max_deformation.min(RADIUS_JITTER);
        for p in &mut blob.boundary.points {
            p.radius = size * (1.0 + rng.random_range(-band..=band));
            p.target_radius = p.radius;
        }
        let spin = rng.random_range(-INITIAL_ANGULAR_SPEED..=INITIAL_ANGULAR_SPEED);
        for v in &mut blob.boundary.velocities {
            v.angular = spin;
        }
        blob.boundary.pulse_phase = rng.random_range(0.0..TAU);

        blob.kinematics.velocity = Vec2::new(
            rng.random_range(-INITIAL_SPEED..=INITIAL_SPEED),
            rng.random_range(-INITIAL_SPEED..=INITIAL_SPEED),
        );

        blob.physique = Physique {
            elasticity: rng.random_range(0.7..=1.3),
            viscosity: rng.random_range(0.8..=1.2),
            scroll_affinity: rng.random_range(0.5..=1.5),
        };
        blob.social.personal_space = (size * rng.random_range(1.9..=2.3)).min(cfg.max_personal_space);
        blob.social.repulsion_strength = rng.random_range(0.8..=1.2);

        blob.territory.radius = rng.random_range(80.0..=160.0);
        // Staggered so that territories do not all move on the same tick.
        let interval = cfg.territory_relocation_interval.max(f32::EPSILON);
        blob.territory.last_relocation = -rng.random_range(0.0..interval);

        blob.agitation.turbulence_decay = rng.random_range(0.95..=0.98);
        blob.agitation.drift_angle = rng.random_range(0.0..TAU);
        blob.render.intensity = rng.random_range(0.7..=1.0);

        blob
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.kinematics.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.kinematics.velocity
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.kinematics.size
    }

    /// Boundary points in absolute coordinates.
    pub fn outline(&self) -> Vec<Vec2> {
        let center = self.kinematics.position;
        self.boundary
            .points
            .iter()
            .map(|p| center + Vec2::from_angle(p.angle) * p.radius)
            .collect()
    }

    /// Raises the chaos level, saturating at 1.
    pub fn agitate(&mut self, amount: f32) {
        self.agitation.chaos_level = (self.agitation.chaos_level + amount).clamp(0.0, 1.0);
    }
}
