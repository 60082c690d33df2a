mod config;
mod settings;
mod viewer;

use anyhow::{Context, Result};
use winit::dpi::LogicalSize;

use tess_engine::device::GpuInit;
use tess_engine::logging::{init_logging, LoggingConfig};
use tess_engine::mesh::load_obj;
use tess_engine::window::{Runtime, RuntimeConfig};

use config::{ViewerConfig, HELP};
use settings::{window_title, RenderSettings};
use viewer::Viewer;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Some(config) = ViewerConfig::from_env()? else {
        print!("{HELP}");
        return Ok(());
    };

    init_logging(LoggingConfig::with_filter(config.log_filter.clone()));

    let mesh = load_obj(&config.mesh)
        .with_context(|| format!("failed to load mesh {}", config.mesh.display()))?;

    let settings = match config.tess_level {
        Some(level) => RenderSettings::tessellated(level),
        None => RenderSettings::default(),
    };

    let runtime = RuntimeConfig {
        title: window_title(None, &settings),
        initial_size: LogicalSize::new(config.width as f64, config.height as f64),
    };

    Runtime::run(runtime, GpuInit::default(), Viewer::new(mesh, settings))
}
