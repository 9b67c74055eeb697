//! Boundary deformation and smoothing strategies.

use std::f32::consts::TAU;

use rand::Rng;

use crate::blob::{Blob, BoundaryPoint};
use crate::config::{DeformationMode, SimConfig, SmoothingMode};
use crate::gaussian::GaussianKernel;
use crate::spring::{ExternalForce, SpringSystem};

/// Per-tick random-walk step of a point's angular velocity.
const ANGULAR_WALK: f32 = 0.01;
/// Bound on a point's angular velocity, radians per second.
pub const MAX_ANGULAR_VELOCITY: f32 = 0.15;
/// Fraction of the gap to the pulse target closed each tick.
const PULSE_EASE: f32 = 0.1;
/// Relative radius noise at chaos level 1.0 in pulse mode.
const PULSE_CHAOS_NOISE: f32 = 0.1;

/// Smooths a closed boundary after it has been deformed.
#[derive(Clone, Debug)]
pub enum Smoother {
    /// Each radius becomes the mean of itself and its two neighbours.
    Averaging,
    Gaussian(GaussianKernel),
}

impl Smoother {
    pub fn from_config(cfg: &SimConfig) -> Self {
        match cfg.smoothing {
            SmoothingMode::Averaging => Self::Averaging,
            SmoothingMode::Gaussian => {
                Self::Gaussian(GaussianKernel::new(cfg.gaussian_size, cfg.gaussian_sigma))
            }
        }
    }

    pub fn mode(&self) -> SmoothingMode {
        match self {
            Self::Averaging => SmoothingMode::Averaging,
            Self::Gaussian(_) => SmoothingMode::Gaussian,
        }
    }

    /// No-op below three points.
    pub fn smooth(&self, points: &mut [BoundaryPoint]) {
        match self {
            Self::Averaging => average_neighbors(points),
            Self::Gaussian(kernel) => kernel.convolve(points),
        }
    }
}

fn average_neighbors(points: &mut [BoundaryPoint]) {
    let n = points.len();
    if n < 3 {
        return;
    }
    let radii: Vec<f32> = points.iter().map(|p| p.radius).collect();
    for (i, p) in points.iter_mut().enumerate() {
        p.radius = (radii[(i + n - 1) % n] + radii[i] + radii[(i + 1) % n]) / 3.0;
    }
}

/// Drives boundary radii each tick.
#[derive(Clone, Debug)]
pub enum Deformer {
    /// Radii ease toward a travelling sine wave around the rest radius.
    Sinusoidal {
        pulse_speed: f32,
        pulse_amplitude: f32,
        max_deformation: f32,
    },
    Spring(SpringSystem),
}

impl Deformer {
    pub fn from_config(cfg: &SimConfig) -> Self {
        match cfg.deformation {
            DeformationMode::Sinusoidal => Self::Sinusoidal {
                pulse_speed: cfg.pulse_speed,
                pulse_amplitude: cfg.pulse_amplitude,
                max_deformation: cfg.max_deformation,
            },
            DeformationMode::Spring => Self::Spring(SpringSystem::from_config(cfg)),
        }
    }

    pub fn mode(&self) -> DeformationMode {
        match self {
            Self::Sinusoidal { .. } => DeformationMode::Sinusoidal,
            Self::Spring(_) => DeformationMode::Spring,
        }
    }

    pub fn spring(&self) -> Option<&SpringSystem> {
        match self {
            Self::Spring(spring) => Some(spring),
            Self::Sinusoidal { .. } => None,
        }
    }

    /// Rotates the boundary slowly and updates every radius.
    ///
    /// In spring mode the external force on each point squashes the side
    /// facing the direction of travel and stretches the trailing side,
    /// plus radial noise proportional to the chaos level.
    pub fn deform(
        &self,
        blob: &mut Blob,
        cfg: &SimConfig,
        time: f32,
        dt: f32,
        rng: &mut impl Rng,
    ) {
        rotate(blob, dt, rng);

        let chaos = blob.agitation.chaos_level;
        let boundary = &mut blob.boundary;
        let n = boundary.points.len();

        match self {
            Self::Spring(spring) => {
                let velocity = blob.kinematics.velocity;
                let speed = velocity.length();
                let heading = velocity.y.atan2(velocity.x);
                let squash = speed * cfg.velocity_deformation * blob.physique.elasticity;

                let forces: Vec<f32> = boundary
                    .points
                    .iter()
                    .map(|p| {
                        let noise = if chaos > 0.0 {
                            rng.random_range(-1.0..=1.0) * chaos * cfg.chaos_noise
                        } else {
                            0.0
                        };
                        -(p.angle - heading).cos() * squash + noise
                    })
                    .collect();

                spring.update_all_control_points(
                    &mut boundary.points,
                    &mut boundary.velocities,
                    ExternalForce::PerPoint(&forces),
                    dt,
                );
            }
            Self::Sinusoidal {
                pulse_speed,
                pulse_amplitude,
                max_deformation,
            } => {
                let (speed, amplitude, limit) = (*pulse_speed, *pulse_amplitude, *max_deformation);
                let phase0 = time * speed + boundary.pulse_phase;
                for (i, p) in boundary.points.iter_mut().enumerate() {
                    // Two lobes travelling around the outline.
                    let phase = phase0 + i as f32 / n as f32 * TAU * 2.0;
                    let noise = if chaos > 0.0 {
                        rng.random_range(-1.0..=1.0) * chaos * PULSE_CHAOS_NOISE
                    } else {
                        0.0
                    };
                    p.target_radius = p.base_radius * (1.0 + amplitude * phase.sin() + noise);
                    p.radius += (p.target_radius - p.radius) * PULSE_EASE;
                    p.radius = p.radius.clamp(
                        p.base_radius * (1.0 - limit),
                        p.base_radius * (1.0 + limit),
                    );
                }
            }
        }
    }
}

/// Rigid rotation of the whole outline.
///
/// Every point shares one angular velocity, which takes a bounded random
/// walk step per tick. Angles therefore keep their cyclic index order.
fn rotate(blob: &mut Blob, dt: f32, rng: &mut impl Rng) {
    let boundary = &mut blob.boundary;
    let Some(current) = boundary.velocities.first().map(|v| v.angular) else {
        return;
    };
    let spin = (current + rng.random_range(-ANGULAR_WALK..=ANGULAR_WALK))
        .clamp(-MAX_ANGULAR_VELOCITY, MAX_ANGULAR_VELOCITY);
    for v in &mut boundary.velocities {
        v.angular = spin;
    }
    let step = spin * dt;
    for p in &mut boundary.points {
        p.angle = (p.angle + step).rem_euclid(TAU);
    }
}
