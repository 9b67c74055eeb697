//! Per-blob simulation phases.
//!
//! After collision handling, every blob goes through these phases in
//! order, each taking one `&mut Blob`:
//! 1. [`territory_phase`]: pull back toward home, relocate home now and then.
//! 2. [`gravity_phase`]: bounded push from the device gravity vector.
//! 3. [`drift_phase`]: ambient jitter plus a smooth wandering heading.
//! 4. [`escape_phase`]: random kicks for a while after being repelled.
//! 5. [`deformation_phase`]: deform the outline, then smooth it.
//! 6. [`scroll_phase`]: attraction toward the pointer while scrolling.
//! 7. [`integrate_phase`]: speed limit and Euler step.
//! 8. [`wall_phase`]: keep the blob inside the extended bounds.
//! 9. [`friction_phase`]: velocity friction, chaos decay, render hints.
//!
//! [`update_blob`] runs the whole sequence.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec2;
use rand::Rng;

use crate::blob::Blob;
use crate::config::SimConfig;
use crate::deformation::{Deformer, Smoother};
use crate::simulation::Inputs;
use crate::spring::SpringSystem;

/// Gravity magnitude above which the outline gets agitated.
const GRAVITY_CHAOS_THRESHOLD: f32 = 0.7;
const GRAVITY_CHAOS: f32 = 0.05;
/// Per-tick random-walk step of the drift heading.
const DRIFT_WALK: f32 = 0.1;
const STICKINESS_CHAOS_THRESHOLD: f32 = 2.0;
const STICKINESS_CHAOS: f32 = 0.02;
/// Pointer distance below which scroll attraction is skipped.
const MIN_POINTER_DISTANCE: f32 = 1.0;
/// Wall margins, as multiples of the blob size.
pub const WALL_MARGIN_X: f32 = 0.8;
pub const WALL_MARGIN_Y: f32 = 1.2;
const BOUNCE_CHAOS: f32 = 0.3;
/// Boundary impulse per unit of normal speed at a bounce.
const WALL_IMPULSE: f32 = 0.2;

/// Read-only state shared by every phase during one tick.
#[derive(Clone, Copy, Debug)]
pub struct TickContext<'a> {
    pub cfg: &'a SimConfig,
    /// Inputs latched before the tick started.
    pub inputs: &'a Inputs,
    /// Simulated seconds at the start of this tick.
    pub time: f32,
    pub dt: f32,
}

/// Runs every phase on one blob, in the order listed in the module docs.
///
/// ### Parameters
/// - `blob` - The blob to advance; every phase mutates it in place.
/// - `ctx` - Configuration, latched inputs and timing for this tick.
/// - `deformer` - Radius driver chosen when the simulation was built.
/// - `smoother` - Radius smoother chosen when the simulation was built.
/// - `rng` - The simulation's seeded generator.
///
/// ### Returns
/// `true` if the blob hit at least one wall during this tick.
pub fn update_blob(
    blob: &mut Blob,
    ctx: &TickContext<'_>,
    deformer: &Deformer,
    smoother: &Smoother,
    rng: &mut impl Rng,
) -> bool {
    territory_phase(blob, ctx, rng);
    gravity_phase(blob, ctx);
    drift_phase(blob, ctx, rng);
    escape_phase(blob, ctx, rng);
    deformation_phase(blob, ctx, deformer, smoother, rng);
    scroll_phase(blob, ctx);
    integrate_phase(blob, ctx);
    let bounced = wall_phase(blob, ctx, rng);
    friction_phase(blob, ctx);
    bounced
}

/// Pulls a blob back once it strays past its territory radius.
///
/// The pull grows linearly with the distance past the radius. Every
/// `territory_relocation_interval` seconds the territory moves to a
/// random spot inside the canvas.
pub fn territory_phase(blob: &mut Blob, ctx: &TickContext<'_>, rng: &mut impl Rng) {
    let cfg = ctx.cfg;
    let territory = &mut blob.territory;

    if ctx.time - territory.last_relocation >= cfg.territory_relocation_interval {
        let r = territory.radius;
        territory.center = Vec2::new(
            random_between(rng, r, cfg.width - r),
            random_between(rng, r, cfg.height - r),
        );
        territory.last_relocation = ctx.time;
        log::debug!(
            "blob {} territory moved to ({:.1}, {:.1})",
            blob.id,
            territory.center.x,
            territory.center.y
        );
    }

    let offset = blob.kinematics.position - territory.center;
    let dist = offset.length();
    if dist > territory.radius {
        let excess = dist - territory.radius;
        let pull = -offset / dist * excess * cfg.territory_strength;
        blob.kinematics.velocity += pull * ctx.dt;
    }
}

/// Uniform sample in `[lo, hi]`, or the midpoint when the range is empty.
fn random_between(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if lo < hi {
        rng.random_range(lo..=hi)
    } else {
        0.5 * (lo + hi)
    }
}

/// Adds the latched gravity, capped at `max_gravity_force`.
///
/// A strong tilt (gravity input above 0.7) also agitates the outline.
pub fn gravity_phase(blob: &mut Blob, ctx: &TickContext<'_>) {
    let gravity = ctx.inputs.gravity;
    let force = (gravity * ctx.cfg.gravity_strength).clamp_length_max(ctx.cfg.max_gravity_force);
    blob.kinematics.velocity += force * ctx.dt;

    if gravity.length() > GRAVITY_CHAOS_THRESHOLD {
        blob.agitate(GRAVITY_CHAOS);
    }
}

/// Ambient motion: uniform jitter plus a "Brownian" term that follows a
/// slowly wandering heading.
pub fn drift_phase(blob: &mut Blob, ctx: &TickContext<'_>, rng: &mut impl Rng) {
    let cfg = ctx.cfg;
    let agitation = &mut blob.agitation;
    agitation.drift_angle =
        (agitation.drift_angle + rng.random_range(-DRIFT_WALK..=DRIFT_WALK)).rem_euclid(TAU);

    let jitter = Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0))
        * cfg.ambient_jitter;
    let heading = agitation.drift_angle;
    let brownian = Vec2::new(
        (heading + (ctx.time * 0.3).sin()).cos(),
        (heading + (ctx.time * 0.23).cos()).sin(),
    ) * cfg.drift_strength;

    blob.kinematics.velocity += (jitter + brownian) * ctx.dt;
}

/// Random kicks during `escape_duration` seconds after a repulsion.
pub fn escape_phase(blob: &mut Blob, ctx: &TickContext<'_>, rng: &mut impl Rng) {
    let Some(repelled_at) = blob.social.last_repulsion_time else {
        return;
    };
    let since = ctx.time - repelled_at;
    if (0.0..ctx.cfg.escape_duration).contains(&since) {
        let dir = Vec2::from_angle(rng.random_range(0.0..TAU));
        blob.kinematics.velocity += dir * ctx.cfg.escape_strength * ctx.dt;
    }
}

/// Deforms the outline and then smooths its radii.
///
/// ### Parameters
/// - `blob` - Blob whose boundary is rotated, deformed and smoothed.
/// - `ctx` - Supplies the time used by the pulse and the step `dt`.
/// - `deformer` - Sinusoidal pulse or spring model.
/// - `smoother` - Neighbour averaging or Gaussian kernel.
/// - `rng` - Source of the rotation walk and chaos noise.
pub fn deformation_phase(
    blob: &mut Blob,
    ctx: &TickContext<'_>,
    deformer: &Deformer,
    smoother: &Smoother,
    rng: &mut impl Rng,
) {
    deformer.deform(blob, ctx.cfg, ctx.time, ctx.dt, rng);
    smoother.smooth(&mut blob.boundary.points);

    // The pulse sets its own targets; the spring's target is wherever the
    // smoothed outline settled this tick.
    if deformer.spring().is_some() {
        for p in &mut blob.boundary.points {
            p.target_radius = p.radius;
        }
    }
}

/// Pulls toward the pointer while scroll stickiness is positive.
pub fn scroll_phase(blob: &mut Blob, ctx: &TickContext<'_>) {
    let stickiness = ctx.inputs.scroll_stickiness;
    let Some(pointer) = ctx.inputs.pointer else {
        return;
    };
    if stickiness <= 0.0 {
        return;
    }

    let to_pointer = pointer - blob.kinematics.position;
    let dist = to_pointer.length();
    if dist > MIN_POINTER_DISTANCE {
        let pull = stickiness * blob.physique.scroll_affinity * ctx.cfg.scroll_strength;
        blob.kinematics.velocity += to_pointer / dist * pull * ctx.dt;
    }

    if stickiness > STICKINESS_CHAOS_THRESHOLD {
        blob.agitate(STICKINESS_CHAOS * (stickiness - STICKINESS_CHAOS_THRESHOLD));
    }
}

/// Caps the speed at `max_speed`, then moves the blob by `velocity·dt`.
pub fn integrate_phase(blob: &mut Blob, ctx: &TickContext<'_>) {
    let k = &mut blob.kinematics;
    k.velocity = k.velocity.clamp_length_max(ctx.cfg.max_speed);
    k.position += k.velocity * ctx.dt;
}

/// Clamps the blob into the extended bounds and bounces it off walls.
///
/// The allowed range is the bounding box shrunk by `size·0.8`
/// horizontally and `size·1.2` vertically; if that would leave nothing,
/// the blob is centered on that axis. A bounce reflects and damps the
/// normal velocity, adds a random kick and some chaos, and squashes the
/// side of the outline facing the wall.
///
/// ### Parameters
/// - `blob` - The blob to clamp; its wall record is updated on a bounce.
/// - `ctx` - Supplies the bounds, damping, kick strength and current time.
/// - `rng` - Source of the random bounce kick.
///
/// ### Returns
/// `true` if either axis was clamped. A corner hit counts as two bounces.
pub fn wall_phase(blob: &mut Blob, ctx: &TickContext<'_>, rng: &mut impl Rng) -> bool {
    let cfg = ctx.cfg;
    let (min, max) = (cfg.bounds_min(), cfg.bounds_max());
    let size = blob.kinematics.size;
    let (lo_x, hi_x) = shrink(min.x, max.x, size * WALL_MARGIN_X);
    let (lo_y, hi_y) = shrink(min.y, max.y, size * WALL_MARGIN_Y);

    let k = &mut blob.kinematics;
    let damping = cfg.bounce_damping;
    // (direction of the wall seen from the blob, normal speed into it)
    let hit_x = if k.position.x < lo_x {
        k.position.x = lo_x;
        Some((PI, reflect(&mut k.velocity.x, -1.0, damping)))
    } else if k.position.x > hi_x {
        k.position.x = hi_x;
        Some((0.0, reflect(&mut k.velocity.x, 1.0, damping)))
    } else {
        None
    };
    let hit_y = if k.position.y < lo_y {
        k.position.y = lo_y;
        Some((-FRAC_PI_2, reflect(&mut k.velocity.y, -1.0, damping)))
    } else if k.position.y > hi_y {
        k.position.y = hi_y;
        Some((FRAC_PI_2, reflect(&mut k.velocity.y, 1.0, damping)))
    } else {
        None
    };

    if hit_x.is_none() && hit_y.is_none() {
        return false;
    }

    for (direction, normal_speed) in [hit_x, hit_y].into_iter().flatten() {
        let kick = Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0));
        blob.kinematics.velocity += kick * cfg.bounce_kick;
        SpringSystem::apply_impulse(
            &blob.boundary.points,
            &mut blob.boundary.velocities,
            direction,
            normal_speed * WALL_IMPULSE,
        );
        blob.agitate(BOUNCE_CHAOS);
        blob.wall.bounce_count += 1;
    }
    blob.wall.last_bounce_time = Some(ctx.time);
    true
}

fn shrink(min: f32, max: f32, margin: f32) -> (f32, f32) {
    let (lo, hi) = (min + margin, max - margin);
    if lo <= hi {
        (lo, hi)
    } else {
        let mid = 0.5 * (min + max);
        (mid, mid)
    }
}

/// Reflects a velocity component heading toward `outward` (±1) and
/// returns the speed it had into the wall.
fn reflect(v: &mut f32, outward: f32, damping: f32) -> f32 {
    let into_wall = *v * outward;
    if into_wall > 0.0 {
        *v = -*v * damping;
        into_wall
    } else {
        0.0
    }
}

/// Friction, chaos decay and render-hint pass-through.
pub fn friction_phase(blob: &mut Blob, ctx: &TickContext<'_>) {
    let keep = (1.0 - ctx.cfg.friction * blob.physique.viscosity).max(0.0);
    blob.kinematics.velocity *= keep;
    blob.agitation.chaos_level *= blob.agitation.turbulence_decay;
    blob.render.tilt = ctx.inputs.tilt;
}
