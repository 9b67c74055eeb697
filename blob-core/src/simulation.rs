//! The simulation orchestrator.
//!
//! [`Simulation`] owns the blob vector and the three strategies chosen from
//! the configuration. External input is latched by the `set_*` methods and
//! read on the next [`Simulation::tick`]; nothing is computed eagerly.

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::blob::Blob;
use crate::collision::CollisionDetector;
use crate::config::{SimConfig, SimConfigError};
use crate::deformation::{Deformer, Smoother};
use crate::force_buffer::ForceBuffer;
use crate::path;
use crate::phases::{self, TickContext};
use crate::rng::{SimRng, create_rng};
use crate::snapshot::FrameSnapshot;
use crate::spring::SpringSystem;

/// Fraction of a grid cell a spawn position may be jittered by.
const SPAWN_JITTER: f32 = 0.25;

/// Where a [`Simulation`] is between `new`, `init` and `dispose`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Running,
    Disposed,
}

/// Latched external input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inputs {
    /// Device gravity, roughly in `[-1, 1]` per axis.
    pub gravity: Vec2,
    /// Passed through to [`crate::blob::RenderHints::tilt`].
    pub tilt: Vec3,
    /// Never negative; zero disables the pointer pull.
    pub scroll_stickiness: f32,
    /// Last known pointer position, canvas coordinates.
    pub pointer: Option<Vec2>,
}

/// Owns the blobs, the seeded generator and the strategies chosen from the
/// configuration, and advances them one tick at a time.
///
/// Lifecycle: [`Simulation::new`] validates, [`Simulation::init`] spawns,
/// [`Simulation::tick`] advances and [`Simulation::dispose`] clears.
pub struct Simulation {
    config: SimConfig,
    rng: SimRng,
    blobs: Vec<Blob>,
    lifecycle: Lifecycle,
    inputs: Inputs,

    collision: CollisionDetector,
    smoother: Smoother,
    deformer: Deformer,
    forces: ForceBuffer,

    /// Simulated time passed to the last tick.
    time: f32,
}

impl Simulation {
    /// Validates `config` and picks the collision, smoothing and
    /// deformation strategies. No blobs exist until [`Simulation::init`].
    pub fn new(config: SimConfig) -> Result<Self, SimConfigError> {
        config.validate()?;

        let collision = CollisionDetector::from_config(&config);
        let smoother = Smoother::from_config(&config);
        let deformer = Deformer::from_config(&config);
        log::debug!(
            "strategies: collision={:?} smoothing={:?} deformation={:?}",
            collision.mode(),
            smoother.mode(),
            deformer.mode()
        );

        Ok(Self {
            rng: create_rng(config.seed),
            blobs: Vec::new(),
            lifecycle: Lifecycle::Uninitialized,
            inputs: Inputs::default(),
            collision,
            smoother,
            deformer,
            forces: ForceBuffer::default(),
            time: 0.0,
            config,
        })
    }

    /// Creates the blobs on a jittered grid. Does nothing if already running.
    ///
    /// The RNG is reseeded from `config.seed`, so initializing again after
    /// [`Simulation::dispose`] reproduces the first run.
    pub fn init(&mut self) {
        if self.lifecycle == Lifecycle::Running {
            return;
        }

        self.rng = create_rng(self.config.seed);
        self.blobs = spawn_blobs(&self.config, &mut self.rng);
        self.forces = ForceBuffer::with_len(self.blobs.len());
        self.time = 0.0;
        self.lifecycle = Lifecycle::Running;

        log::info!(
            "initialized {} blobs on a {}x{} canvas (seed {:#x})",
            self.blobs.len(),
            self.config.width,
            self.config.height,
            self.config.seed
        );
    }

    /// `true` between `init` and `dispose`.
    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Drops every blob. Ticks are no-ops until the next `init`.
    pub fn dispose(&mut self) {
        let count = self.blobs.len();
        self.blobs = Vec::new();
        self.forces = ForceBuffer::default();
        self.lifecycle = Lifecycle::Disposed;
        log::info!("disposed {count} blobs");
    }

    /// Non-finite vectors are latched as zero.
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.inputs.gravity = if gravity.is_finite() { gravity } else { Vec2::ZERO };
    }

    pub fn set_tilt(&mut self, tilt: Vec3) {
        self.inputs.tilt = if tilt.is_finite() { tilt } else { Vec3::ZERO };
    }

    /// Negative and non-finite values are latched as zero.
    pub fn set_scroll_stickiness(&mut self, stickiness: f32) {
        self.inputs.scroll_stickiness = if stickiness.is_finite() {
            stickiness.max(0.0)
        } else {
            0.0
        };
    }

    /// Latches the pointer used by scroll attraction. Non-finite positions
    /// are ignored.
    pub fn update_mouse_position(&mut self, position: Vec2) {
        if position.is_finite() {
            self.inputs.pointer = Some(position);
        }
    }

    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    /// Advances every blob by `dt` seconds; `time` is the simulated clock.
    ///
    /// No-op unless running, or when `dt` is not a positive finite number.
    pub fn tick(&mut self, dt: f32, time: f32) {
        if self.lifecycle != Lifecycle::Running || !(dt.is_finite() && dt > 0.0) {
            return;
        }

        let Self {
            config,
            rng,
            blobs,
            inputs,
            collision,
            smoother,
            deformer,
            forces,
            ..
        } = self;

        let pushed = collision.resolve(blobs, config, dt, time, forces);

        let ctx = TickContext {
            cfg: config,
            inputs,
            time,
            dt,
        };
        let mut bounced = 0;
        for blob in blobs.iter_mut() {
            if phases::update_blob(blob, &ctx, deformer, smoother, rng) {
                bounced += 1;
            }
        }

        log::trace!("tick t={time:.3} dt={dt:.4} pushed={pushed} bounced={bounced}");
        self.time = time;
    }

    pub fn blobs(&self) -> &[Blob] {
        &self.blobs
    }

    /// Copies of the blobs recolored by `palette[index % palette.len()]`.
    ///
    /// An empty palette leaves every color unchanged.
    pub fn colored_blobs<S: AsRef<str>>(&self, palette: &[S]) -> Vec<Blob> {
        self.blobs
            .iter()
            .enumerate()
            .map(|(i, blob)| {
                let mut blob = blob.clone();
                if !palette.is_empty() {
                    blob.render.color = palette[i % palette.len()].as_ref().to_string();
                }
                blob
            })
            .collect()
    }

    /// SVG path data for `blob`; see [`path::blob_path`].
    pub fn generate_smooth_blob_path(&self, blob: &Blob) -> String {
        path::blob_path(blob).to_svg()
    }

    /// Owned, serializable view of the current frame.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::capture(self.time, &self.blobs)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Simulated clock passed to the last tick.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Total kinetic energy of the field.
    ///
    /// ### Returns
    /// The sum over blobs of translational energy `½|v|²` plus the radial
    /// kinetic energy of their boundary points, all with unit mass.
    pub fn kinetic_energy(&self) -> f32 {
        self.blobs
            .iter()
            .map(|b| {
                0.5 * b.velocity().length_squared()
                    + SpringSystem::kinetic_energy(&b.boundary.velocities)
            })
            .sum()
    }
}

/// Lays `cfg.blob_count` blobs out on a grid matching the canvas aspect
/// ratio, each jittered inside its cell.
fn spawn_blobs(cfg: &SimConfig, rng: &mut impl Rng) -> Vec<Blob> {
    let n = cfg.blob_count;
    if n == 0 {
        return Vec::new();
    }

    let cols = ((n as f32 * cfg.width / cfg.height).sqrt().ceil() as usize).clamp(1, n);
    let rows = n.div_ceil(cols);
    let cell = Vec2::new(cfg.width / cols as f32, cfg.height / rows as f32);
    let reach = cell * SPAWN_JITTER;

    (0..n)
        .map(|id| {
            let (col, row) = (id % cols, id / cols);
            let center = Vec2::new((col as f32 + 0.5) * cell.x, (row as f32 + 0.5) * cell.y);
            let jitter = Vec2::new(
                rng.random_range(-reach.x..=reach.x),
                rng.random_range(-reach.y..=reach.y),
            );
            Blob::random(id, center + jitter, cfg, rng)
        })
        .collect()
}
