use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wavescape_common::{Viewport, WorldConfig};
use wavescape_content::Waves;
use wavescape_kernel::{HeadlessHost, World};
use wavescape_render::RenderSurface;

#[derive(Parser)]
#[command(name = "wavescape-cli", about = "CLI tool for wavescape operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the fully resolved settings of a configuration file
    Config {
        /// Configuration file (.json, .yaml or .yml)
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Run the wave scene on a headless host and report frame statistics
    Simulate {
        /// Configuration file; defaults to container `app` with all defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Simulated wall-clock time in seconds
        #[arg(short, long, default_value = "1")]
        seconds: f64,
        /// Display refresh rate in Hz
        #[arg(short, long, default_value = "60")]
        refresh: f64,
        /// Viewport as WIDTHxHEIGHT
        #[arg(long, default_value = "1280x720")]
        viewport: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Info => {
            println!("wavescape-cli v{}", env!("CARGO_PKG_VERSION"));
            let settings = WorldConfig::new("app").resolve()?;
            println!(
                "defaults: fps={} fov={} background={}",
                settings.animate.fps(), settings.camera.fov_degrees, settings.scene.background
            );
        }
        Commands::Config { config } => {
            let config = WorldConfig::load(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            let settings = config.resolve()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Commands::Simulate {
            config,
            seconds,
            refresh,
            viewport,
        } => simulate(config, seconds, refresh, &viewport)?,
    }

    Ok(())
}

fn simulate(config: Option<PathBuf>, seconds: f64, refresh: f64, viewport: &str) -> anyhow::Result<()> {
    anyhow::ensure!(refresh > 0.0, "refresh rate must be positive");
    anyhow::ensure!(seconds >= 0.0, "duration must not be negative");
    let config = match config {
        Some(path) => WorldConfig::load(&path).with_context(|| format!("loading {}", path.display()))?,
        None => WorldConfig::new("app"),
    };
    let viewport = parse_viewport(viewport)?;

    let mut host = HeadlessHost::new()
        .with_container(config.renderer.container_id.clone())
        .with_viewport(viewport);
    let world = World::launch(&config, &mut host)?;
    world.with_world(Waves::load)?;

    let tick = Duration::from_secs_f64(1.0 / refresh);
    let refreshes = (seconds * refresh).round() as u64;
    for _ in 0..refreshes {
        host.step(tick);
    }
    world.stop();

    world.with_world(|w| {
        let stats = w.stats();
        println!(
            "Simulated {seconds}s at {refresh} Hz, target {} fps",
            w.settings().animate.fps()
        );
        println!(
            "Iterations: {}  Rendered: {}  Throttled: {}",
            stats.iterations, stats.rendered, stats.throttled
        );
        println!(
            "Callback failures: {}  Render failures: {}",
            stats.callback_failures, stats.render_failures
        );
        println!("Surface: {} (physical {})", w.surface().size(), w.surface().physical_size());
        print!("{}", w.surface().summary());
    });
    Ok(())
}

fn parse_viewport(s: &str) -> anyhow::Result<Viewport> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .with_context(|| format!("viewport {s:?} is not WIDTHxHEIGHT"))?;
    Ok(Viewport::new(w.trim().parse()?, h.trim().parse()?))
}
