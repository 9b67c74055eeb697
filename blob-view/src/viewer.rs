//! Interactive blob field viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Simulation`] plus the
//! configuration being edited, and implements [`eframe::App`] to drive and
//! render it.

use blob_core::{
    config::{CollisionMode, DeformationMode, SimConfig, SimConfigError, SmoothingMode},
    path,
    simulation::Simulation,
};
use eframe::App;
use glam::{Vec2, Vec3};

/// Longest time step handed to the simulation, seconds.
const MAX_DT: f32 = 0.033;
/// Per-frame decay of scroll stickiness.
const STICKINESS_DECAY: f32 = 0.95;
/// Stickiness added per pixel of scroll.
const STICKINESS_PER_PIXEL: f32 = 0.01;
const MAX_STICKINESS: f32 = 5.0;
/// Polyline samples per curve segment when drawing.
const SAMPLES_PER_SEGMENT: usize = 6;

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The simulation core: [`Simulation`] built from `cfg`.
/// - The input it latches every frame (arrow-key gravity, scroll stickiness,
///   pointer position).
/// - eframe/egui callbacks for drawing and user interaction.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true`, call [`Viewer::step_once`] with the frame time.
/// 3. Render every blob through its smoothed hull path.
///
/// ### Fields
/// - `sim` - The running simulation.
/// - `cfg` - Configuration edited in the side panel; applied by [`Viewer::reset`].
/// - `running` - Whether the simulation is currently auto-advancing.
/// - `time` - Simulated clock passed to each tick.
/// - `gravity` - Gravity from the arrow keys.
/// - `stickiness` - Scroll stickiness, decays every frame.
/// - `last_step_dt` - Time step of the last tick (for display only).
/// - `config_error` - Why the last [`Viewer::reset`] was rejected, if it was.
pub struct Viewer {
    sim: Simulation,
    cfg: SimConfig,

    running: bool,
    time: f32,
    gravity: Vec2,
    stickiness: f32,
    last_step_dt: f32,

    config_error: Option<String>,
}

impl Viewer {
    /// Creates a viewer with the default configuration and initialized blobs.
    ///
    /// ### Returns
    /// A ready [`Viewer`], or the configuration error if the defaults are
    /// rejected.
    pub fn new() -> Result<Self, SimConfigError> {
        let cfg = SimConfig::default();
        let mut sim = Simulation::new(cfg.clone())?;
        sim.init();

        Ok(Self {
            sim,
            cfg,
            running: true,
            time: 0.0,
            gravity: Vec2::ZERO,
            stickiness: 0.0,
            last_step_dt: 0.0,
            config_error: None,
        })
    }

    /// Rebuilds the simulation from `cfg`.
    ///
    /// On success the clock and inputs are reset and auto-running stops.
    /// An invalid configuration keeps the current simulation and is shown in
    /// the side panel.
    fn reset(&mut self) {
        match Simulation::new(self.cfg.clone()) {
            Ok(mut sim) => {
                sim.init();
                self.sim = sim;
                self.time = 0.0;
                self.gravity = Vec2::ZERO;
                self.stickiness = 0.0;
                self.running = false;
                self.config_error = None;
            }
            Err(err) => {
                log::warn!("rejected configuration: {err}");
                self.config_error = Some(err.to_string());
            }
        }
    }

    /// Latches the current input and advances the simulation by `dt`
    /// (clamped to [`MAX_DT`]).
    fn step_once(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_DT);
        self.time += dt;

        self.sim.set_gravity(self.gravity);
        self.sim.set_tilt(Vec3::new(self.gravity.x, self.gravity.y, 0.0));
        self.sim.set_scroll_stickiness(self.stickiness);
        self.sim.tick(dt, self.time);

        self.stickiness *= STICKINESS_DECAY;
        self.last_step_dt = dt;
    }

    /// Scale that fits the canvas into `rect`.
    fn scale(&self, rect: egui::Rect) -> f32 {
        let cfg = self.sim.config();
        (rect.width() / cfg.width).min(rect.height() / cfg.height)
    }

    /// Converts a canvas position to screen-space, centering the canvas in
    /// `rect`. Both use y down.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let cfg = self.sim.config();
        let s = self.scale(rect);
        let center = rect.center();
        egui::pos2(
            center.x + (p.x - cfg.width * 0.5) * s,
            center.y + (p.y - cfg.height * 0.5) * s,
        )
    }

    /// Inverse of [`Viewer::world_to_screen`].
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let cfg = self.sim.config();
        let s = self.scale(rect);
        let center = rect.center();
        Vec2::new(
            (p.x - center.x) / s + cfg.width * 0.5,
            (p.y - center.y) / s + cfg.height * 0.5,
        )
    }

    /// Gravity from the arrow keys, one unit per axis.
    fn gravity_from_keys(ctx: &egui::Context) -> Vec2 {
        ctx.input(|i| {
            let axis = |neg: egui::Key, pos: egui::Key| {
                i.key_down(pos) as i32 as f32 - i.key_down(neg) as i32 as f32
            };
            Vec2::new(
                axis(egui::Key::ArrowLeft, egui::Key::ArrowRight),
                axis(egui::Key::ArrowUp, egui::Key::ArrowDown),
            )
        })
    }

    /// Helper to draw a labeled `usize` [`egui::DragValue`].
    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, lifecycle).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                if ui.button("Step").clicked() {
                    self.step_once(1.0 / 60.0);
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                if self.sim.is_ready() {
                    if ui.button("Dispose").clicked() {
                        self.sim.dispose();
                    }
                } else if ui.button("Init").clicked() {
                    self.sim.init();
                }
            });
        });
    }

    /// Builds the bottom status bar (clock, blob count, energy, input).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("t = {:.2} s", self.time));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!("blobs = {}", self.sim.blobs().len()));
                ui.label(format!("kinetic = {:.1}", self.sim.kinetic_energy()));
                ui.separator();
                ui.label(format!(
                    "gravity = ({:.0}, {:.0})",
                    self.gravity.x, self.gravity.y
                ));
                ui.label(format!("stickiness = {:.2}", self.stickiness));
            });
        });
    }

    /// Builds the right-hand configuration panel. Changes take effect on
    /// "Apply".
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Collision");
                ui.radio_value(&mut self.cfg.collision, CollisionMode::SpatialHash, "Spatial hash");
                ui.radio_value(&mut self.cfg.collision, CollisionMode::BruteForce, "Brute force");

                ui.label("Smoothing");
                ui.radio_value(&mut self.cfg.smoothing, SmoothingMode::Gaussian, "Gaussian");
                ui.radio_value(&mut self.cfg.smoothing, SmoothingMode::Averaging, "Averaging");

                ui.label("Deformation");
                ui.radio_value(&mut self.cfg.deformation, DeformationMode::Spring, "Spring");
                ui.radio_value(
                    &mut self.cfg.deformation,
                    DeformationMode::Sinusoidal,
                    "Sinusoidal",
                );

                ui.separator();
                ui.label("Population");
                ui.horizontal(|ui| {
                    ui.label("seed:");
                    ui.add(egui::DragValue::new(&mut self.cfg.seed));
                });
                Self::labeled_drag_usize(
                    ui,
                    "blob_count:",
                    &mut self.cfg.blob_count,
                    0..=SimConfig::MAX_BLOBS,
                    1.0,
                );
                Self::labeled_drag_usize(
                    ui,
                    "boundary_points:",
                    &mut self.cfg.boundary_points,
                    0..=SimConfig::MAX_BOUNDARY_POINTS,
                    1.0,
                );
                Self::labeled_drag_f32(ui, "min_size:", &mut self.cfg.min_size, 1.0..=300.0, 0.5);
                Self::labeled_drag_f32(ui, "max_size:", &mut self.cfg.max_size, 1.0..=300.0, 0.5);

                ui.separator();
                ui.label("Forces");
                Self::labeled_drag_f32(
                    ui,
                    "anti_clustering:",
                    &mut self.cfg.anti_clustering_strength,
                    0.0..=5.0,
                    0.05,
                );
                Self::labeled_drag_f32(
                    ui,
                    "gravity_strength:",
                    &mut self.cfg.gravity_strength,
                    0.0..=500.0,
                    1.0,
                );
                Self::labeled_drag_f32(
                    ui,
                    "scroll_strength:",
                    &mut self.cfg.scroll_strength,
                    0.0..=200.0,
                    0.5,
                );
                Self::labeled_drag_f32(ui, "max_speed:", &mut self.cfg.max_speed, 1.0..=500.0, 1.0);

                ui.separator();
                ui.label("Boundary");
                Self::labeled_drag_f32(
                    ui,
                    "spring_stiffness:",
                    &mut self.cfg.spring_stiffness,
                    0.0..=200.0,
                    0.5,
                );
                Self::labeled_drag_f32(
                    ui,
                    "spring_damping:",
                    &mut self.cfg.spring_damping,
                    0.0..=50.0,
                    0.1,
                );
                Self::labeled_drag_f32(
                    ui,
                    "max_deformation:",
                    &mut self.cfg.max_deformation,
                    0.01..=0.99,
                    0.01,
                );
                Self::labeled_drag_f32(
                    ui,
                    "gaussian_sigma:",
                    &mut self.cfg.gaussian_sigma,
                    0.1..=5.0,
                    0.05,
                );

                ui.separator();
                if ui.button("Apply").clicked() {
                    self.reset();
                }
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = SimConfig::default();
                }
                if let Some(err) = &self.config_error {
                    ui.colored_label(egui::Color32::LIGHT_RED, err);
                }
            });
    }

    /// Builds the central panel where blobs are drawn and input is read.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::hover());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            if let Some(p) = response.hover_pos() {
                let world = self.screen_to_world(p, rect);
                self.sim.update_mouse_position(world);
            }

            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                self.stickiness =
                    (self.stickiness + scroll.abs() * STICKINESS_PER_PIXEL).min(MAX_STICKINESS);
            }

            self.gravity = Self::gravity_from_keys(ctx);

            // Canvas outline.
            let cfg = self.sim.config();
            let canvas = egui::Rect::from_min_max(
                self.world_to_screen(Vec2::ZERO, rect),
                self.world_to_screen(Vec2::new(cfg.width, cfg.height), rect),
            );
            painter.rect_stroke(
                canvas,
                0.0,
                egui::Stroke::new(1.0, egui::Color32::DARK_GRAY),
                egui::StrokeKind::Inside,
            );

            // Blobs, drawn through their hull paths.
            for blob in self.sim.blobs() {
                let color = egui::Color32::from_hex(&blob.render.color)
                    .unwrap_or(egui::Color32::LIGHT_BLUE)
                    .gamma_multiply(blob.render.intensity);
                let points: Vec<egui::Pos2> = path::blob_path(blob)
                    .flatten(SAMPLES_PER_SEGMENT)
                    .into_iter()
                    .map(|p| self.world_to_screen(p, rect))
                    .collect();
                painter.add(egui::Shape::convex_polygon(
                    points,
                    color,
                    egui::Stroke::new(1.0, color.gamma_multiply(0.6)),
                ));
            }

            // Auto-run simulation if requested.
            if self.running {
                let dt = ctx.input(|i| i.stable_dt);
                self.step_once(dt);
                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
