//! Application entry point for the blob field viewer.
//!
//! This binary installs the logger, sets up eframe/egui and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.

mod viewer;

use viewer::Viewer;

/// Starts the native eframe application.
///
/// Logging is controlled by `RUST_LOG` (for example
/// `RUST_LOG=blob_core=debug`).
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or the default
///   configuration is rejected.
fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Blob Field",
        options,
        Box::new(|_cc| Ok(Box::new(Viewer::new()?))),
    )
}
