use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use kamogawa::{BaseApp, EngineConfig, graphics::HeadlessBackend, window};

/// User-specified command line parameters
#[derive(Debug, Parser)]
#[clap(name = "kamogawa", about, version)]
struct Args {
    #[clap(long, short = 'c')]
    /// Engine configuration file (TOML). Built-in defaults are used without one.
    config: Option<PathBuf>,

    #[clap(long)]
    /// Overrides the window width.
    width: Option<u32>,

    #[clap(long)]
    /// Overrides the window height.
    height: Option<u32>,

    #[clap(long)]
    /// Renders this many frames without a window or GPU, then exits.
    headless_frames: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        eprintln!("Warning: Could not initialize logger: {}", e);
    };

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(width) = args.width {
        config.window.width = width;
    }
    if let Some(height) = args.height {
        config.window.height = height;
    }

    match args.headless_frames {
        Some(frames) => run_headless(config, frames),
        None => window::run(config),
    }
}

fn run_headless(config: EngineConfig, frames: u32) -> anyhow::Result<()> {
    let mut app = BaseApp::init(config, Box::new(HeadlessBackend::new()))?;
    for frame in 0..frames {
        app.update()
            .and_then(|()| app.render())
            .with_context(|| format!("frame {frame}"))?;
    }
    let device = app.destroy();
    if let Some(backend) = device.backend::<HeadlessBackend>() {
        let draws: usize = backend
            .frames()
            .iter()
            .map(|f| f.iter().filter(|c| c.is_draw()).count())
            .sum();
        log::info!("Rendered {} frames with {draws} draws", backend.present_count());
    }
    Ok(())
}
