use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How blob-blob overlap is detected each tick.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CollisionMode {
    /// O(n²) pairwise scan with symmetric forces.
    BruteForce,
    /// Uniform grid queries with one-sided half-strength forces.
    #[default]
    SpatialHash,
}

/// How boundary radii are smoothed after deformation.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingMode {
    /// Plain 3-point circular averaging.
    Averaging,
    #[default]
    Gaussian,
}

/// How boundary radii are driven each tick.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeformationMode {
    /// Radii ease toward a pulsing sine target.
    Sinusoidal,
    /// Mass-spring-damper law per boundary point.
    #[default]
    Spring,
}

/// Flat set of tunables supplied once when a simulation is constructed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Deterministic seed for reproducible runs.
    pub seed: u64,
    /// Number of blobs created by `init`.
    pub blob_count: usize,
    /// Visible canvas width.
    pub width: f32,
    /// Visible canvas height.
    pub height: f32,
    /// Extra room on every side of the canvas that blobs may move into.
    pub bounds_padding: f32,
    /// Boundary samples per blob.
    pub boundary_points: usize,
    /// Lower bound of the nominal blob radius.
    pub min_size: f32,
    /// Upper bound of the nominal blob radius.
    pub max_size: f32,

    pub collision: CollisionMode,
    pub smoothing: SmoothingMode,
    pub deformation: DeformationMode,

    /// Spring-to-rest constant `k`.
    pub spring_stiffness: f32,
    /// Pull toward the neighbour average.
    pub spring_tension: f32,
    /// Uniform internal pressure, 1.0 is neutral.
    pub spring_pressure: f32,
    pub coupling_strength: f32,
    /// Radial damping coefficient `c`.
    pub spring_damping: f32,
    /// Clamp for radial velocity of boundary points.
    pub max_radial_velocity: f32,
    /// Allowed relative deviation of a radius from its base radius.
    pub max_deformation: f32,
    pub gaussian_size: usize,
    pub gaussian_sigma: f32,

    /// Global multiplier on blob-blob repulsion.
    pub anti_clustering_strength: f32,
    /// Neighbour query radius used for anti-clustering.
    pub max_personal_space: f32,
    /// Boundary compression applied on contact, per unit of overlap.
    pub contact_pressure: f32,

    /// Pull-back acceleration per unit of distance past the territory radius.
    pub territory_strength: f32,
    /// Seconds between territory relocations.
    pub territory_relocation_interval: f32,

    pub gravity_strength: f32,
    pub max_gravity_force: f32,
    pub drift_strength: f32,
    pub ambient_jitter: f32,
    pub escape_strength: f32,
    /// Seconds after a repulsion during which escape kicks are applied.
    pub escape_duration: f32,
    /// How strongly translational speed squashes the leading edge.
    pub velocity_deformation: f32,
    /// Radial noise amplitude at chaos level 1.0.
    pub chaos_noise: f32,
    pub pulse_speed: f32,
    pub pulse_amplitude: f32,

    pub scroll_strength: f32,
    pub max_speed: f32,
    /// Fraction of normal velocity kept after a wall bounce.
    pub bounce_damping: f32,
    pub bounce_kick: f32,
    /// Fraction of velocity removed every tick.
    pub friction: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            blob_count: 6,
            width: 800.0,
            height: 600.0,
            bounds_padding: 120.0,
            boundary_points: 8,
            min_size: 55.0,
            max_size: 95.0,

            collision: CollisionMode::default(),
            smoothing: SmoothingMode::default(),
            deformation: DeformationMode::default(),

            spring_stiffness: 30.0,
            spring_tension: 12.0,
            spring_pressure: 1.0,
            coupling_strength: 8.0,
            spring_damping: 4.0,
            max_radial_velocity: 60.0,
            max_deformation: 0.4,
            gaussian_size: 5,
            gaussian_sigma: 1.2,

            anti_clustering_strength: 1.0,
            max_personal_space: 220.0,
            contact_pressure: 20.0,

            territory_strength: 0.8,
            territory_relocation_interval: 45.0,

            gravity_strength: 120.0,
            max_gravity_force: 80.0,
            drift_strength: 10.0,
            ambient_jitter: 6.0,
            escape_strength: 40.0,
            escape_duration: 3.0,
            velocity_deformation: 0.6,
            chaos_noise: 40.0,
            pulse_speed: 1.6,
            pulse_amplitude: 0.08,

            scroll_strength: 30.0,
            max_speed: 140.0,
            bounce_damping: 0.6,
            bounce_kick: 15.0,
            friction: 0.008,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimConfigError {
    #[error("canvas width and height must be positive and finite")]
    InvalidCanvas,
    #[error("bounds padding must be finite and non-negative")]
    InvalidBoundsPadding,
    #[error("too many blobs: {actual} (max {max})")]
    TooManyBlobs { max: usize, actual: usize },
    #[error("too many boundary points: {actual} (max {max})")]
    TooManyBoundaryPoints { max: usize, actual: usize },
    #[error("gaussian kernel too large: {actual} (max {max})")]
    GaussianSizeTooLarge { max: usize, actual: usize },
    #[error("blob size range must satisfy 0 < min_size <= max_size")]
    InvalidSizeRange,
    #[error("max_deformation must lie in (0, 1)")]
    InvalidMaxDeformation,
    #[error("bounce_damping must lie in [0, 1]")]
    InvalidBounceDamping,
    #[error("friction must lie in [0, 1)")]
    InvalidFriction,
    #[error("{0} must be positive and finite")]
    NotPositive(&'static str),
    #[error("{0} must be finite and non-negative")]
    Negative(&'static str),
}

impl SimConfig {
    pub const MAX_BLOBS: usize = 512;

    pub const MAX_BOUNDARY_POINTS: usize = 64;

    /// Widest smoothing kernel; wider ones would wrap the outline.
    pub const MAX_GAUSSIAN_SIZE: usize = Self::MAX_BOUNDARY_POINTS;

    pub fn validate(&self) -> Result<(), SimConfigError> {
        self.validate_canvas()?;
        self.validate_population()?;
        self.validate_boundary()?;
        self.validate_forces()?;
        self.validate_motion()?;
        Ok(())
    }

    /// Lower-left corner of the extended bounding box.
    pub fn bounds_min(&self) -> Vec2 {
        Vec2::splat(-self.bounds_padding)
    }

    /// Upper-right corner of the extended bounding box.
    pub fn bounds_max(&self) -> Vec2 {
        Vec2::new(
            self.width + self.bounds_padding,
            self.height + self.bounds_padding,
        )
    }

    fn validate_canvas(&self) -> Result<(), SimConfigError> {
        if !(positive(self.width) && positive(self.height)) {
            return Err(SimConfigError::InvalidCanvas);
        }
        if !non_negative(self.bounds_padding) {
            return Err(SimConfigError::InvalidBoundsPadding);
        }
        Ok(())
    }

    fn validate_population(&self) -> Result<(), SimConfigError> {
        if self.blob_count > Self::MAX_BLOBS {
            return Err(SimConfigError::TooManyBlobs {
                max: Self::MAX_BLOBS,
                actual: self.blob_count,
            });
        }
        if !(positive(self.min_size) && self.max_size.is_finite() && self.min_size <= self.max_size)
        {
            return Err(SimConfigError::InvalidSizeRange);
        }
        Ok(())
    }

    fn validate_boundary(&self) -> Result<(), SimConfigError> {
        if self.boundary_points > Self::MAX_BOUNDARY_POINTS {
            return Err(SimConfigError::TooManyBoundaryPoints {
                max: Self::MAX_BOUNDARY_POINTS,
                actual: self.boundary_points,
            });
        }
        if self.gaussian_size > Self::MAX_GAUSSIAN_SIZE {
            return Err(SimConfigError::GaussianSizeTooLarge {
                max: Self::MAX_GAUSSIAN_SIZE,
                actual: self.gaussian_size,
            });
        }
        if !(self.max_deformation.is_finite()
            && self.max_deformation > 0.0
            && self.max_deformation < 1.0)
        {
            return Err(SimConfigError::InvalidMaxDeformation);
        }
        check_positive("max_radial_velocity", self.max_radial_velocity)?;
        check_positive("gaussian_sigma", self.gaussian_sigma)?;
        for (name, value) in [
            ("spring_stiffness", self.spring_stiffness),
            ("spring_tension", self.spring_tension),
            ("spring_pressure", self.spring_pressure),
            ("coupling_strength", self.coupling_strength),
            ("spring_damping", self.spring_damping),
            ("pulse_speed", self.pulse_speed),
            ("pulse_amplitude", self.pulse_amplitude),
        ] {
            check_non_negative(name, value)?;
        }
        Ok(())
    }

    fn validate_forces(&self) -> Result<(), SimConfigError> {
        check_positive("max_personal_space", self.max_personal_space)?;
        for (name, value) in [
            ("anti_clustering_strength", self.anti_clustering_strength),
            ("contact_pressure", self.contact_pressure),
            ("territory_strength", self.territory_strength),
            ("territory_relocation_interval", self.territory_relocation_interval),
            ("gravity_strength", self.gravity_strength),
            ("max_gravity_force", self.max_gravity_force),
            ("drift_strength", self.drift_strength),
            ("ambient_jitter", self.ambient_jitter),
            ("escape_strength", self.escape_strength),
            ("escape_duration", self.escape_duration),
            ("velocity_deformation", self.velocity_deformation),
            ("chaos_noise", self.chaos_noise),
            ("scroll_strength", self.scroll_strength),
            ("bounce_kick", self.bounce_kick),
        ] {
            check_non_negative(name, value)?;
        }
        Ok(())
    }

    fn validate_motion(&self) -> Result<(), SimConfigError> {
        check_positive("max_speed", self.max_speed)?;
        if !(self.bounce_damping.is_finite() && (0.0..=1.0).contains(&self.bounce_damping)) {
            return Err(SimConfigError::InvalidBounceDamping);
        }
        if !(self.friction.is_finite() && (0.0..1.0).contains(&self.friction)) {
            return Err(SimConfigError::InvalidFriction);
        }
        Ok(())
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

fn check_positive(name: &'static str, value: f32) -> Result<(), SimConfigError> {
    if positive(value) {
        Ok(())
    } else {
        Err(SimConfigError::NotPositive(name))
    }
}

fn check_non_negative(name: &'static str, value: f32) -> Result<(), SimConfigError> {
    if non_negative(value) {
        Ok(())
    } else {
        Err(SimConfigError::Negative(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_non_positive_canvas() {
        let cfg = SimConfig {
            width: 0.0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(SimConfigError::InvalidCanvas));

        let cfg = SimConfig {
            height: f32::NAN,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(SimConfigError::InvalidCanvas));
    }

    #[test]
    fn rejects_too_many_blobs() {
        let cfg = SimConfig {
            blob_count: SimConfig::MAX_BLOBS + 1,
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SimConfigError::TooManyBlobs { .. })
        ));
    }

    #[test]
    fn rejects_inverted_size_range() {
        let cfg = SimConfig {
            min_size: 90.0,
            max_size: 40.0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(SimConfigError::InvalidSizeRange));
    }

    #[test]
    fn rejects_out_of_range_deformation_and_damping() {
        let cfg = SimConfig {
            max_deformation: 1.0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(SimConfigError::InvalidMaxDeformation));

        let cfg = SimConfig {
            bounce_damping: 1.5,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(SimConfigError::InvalidBounceDamping));

        let cfg = SimConfig {
            friction: 1.0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(SimConfigError::InvalidFriction));
    }

    #[test]
    fn rejects_oversized_gaussian_kernel() {
        let cfg = SimConfig {
            gaussian_size: usize::MAX,
            ..SimConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(SimConfigError::GaussianSizeTooLarge {
                max: SimConfig::MAX_GAUSSIAN_SIZE,
                actual: usize::MAX,
            })
        );

        let cfg = SimConfig {
            gaussian_size: SimConfig::MAX_GAUSSIAN_SIZE,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn names_the_offending_constant() {
        let cfg = SimConfig {
            spring_damping: -1.0,
            ..SimConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err, SimConfigError::Negative("spring_damping"));
        assert!(err.to_string().contains("spring_damping"));
    }

    #[test]
    fn extended_bounds_surround_canvas() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.bounds_min(), Vec2::splat(-120.0));
        assert_eq!(cfg.bounds_max(), Vec2::new(920.0, 720.0));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: SimConfig =
            serde_json::from_str(r#"{"blob_count": 3, "collision": "brute_force"}"#).unwrap();
        assert_eq!(cfg.blob_count, 3);
        assert_eq!(cfg.collision, CollisionMode::BruteForce);
        assert_eq!(cfg.width, SimConfig::default().width);
    }
}
