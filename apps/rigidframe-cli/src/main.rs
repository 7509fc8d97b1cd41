use clap::{Parser, Subcommand};
use rigidframe_driver::{
    DemoConfig, DriverConfig, FailurePolicy, FixedIntervalClock, FrameClock, FrameDriver,
    ImmediateClock, build_demo,
};
use rigidframe_render::{
    AlphaMode, CommandTextRenderer, DecodeOptions, Renderer, SceneConfig, decode_debug_batch,
};
use rigidframe_tools::{FrameStats, WorldInspector};
use serde::Serialize;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rigidframe-cli", about = "Headless runner for the rigidframe demo")]
struct Cli {
    /// Enable verbose logging (per-frame body positions)
    #[arg(short, long)]
    verbose: bool,

    /// Viewport width in pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value = "720")]
    height: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and demo world info
    Info,
    /// Run the frame loop for a number of frames
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "600")]
        frames: u64,
        /// Pace frames at 60 Hz instead of running as fast as possible
        #[arg(long)]
        realtime: bool,
        /// Stop at the first failed frame
        #[arg(long)]
        halt_on_error: bool,
        /// Reject malformed debug batches instead of truncating them
        #[arg(long)]
        strict: bool,
        /// Print the final scene as text
        #[arg(long)]
        show_scene: bool,
    },
    /// Step the demo world and print its debug geometry as JSON
    DumpDebug {
        /// Steps to take before dumping
        #[arg(short, long, default_value = "0")]
        steps: u64,
        /// Scale alpha by 255 like the color channels
        #[arg(long)]
        scaled_alpha: bool,
        /// Emit the raw flat arrays instead of decoded segments
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Serialize)]
struct SimulateOutput {
    frames: u64,
    failures: u64,
    elapsed_ms: f64,
    body: Option<rigidframe_tools::BodyInfo>,
    world: rigidframe_tools::WorldSummary,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the JSON reports; logs go to stderr.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let demo = DemoConfig {
        scene: SceneConfig::new(cli.width, cli.height),
        ..DemoConfig::default()
    };

    match cli.command {
        Commands::Info => {
            let ctx = build_demo(&demo)?;
            println!("rigidframe-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("{}", WorldInspector::summary(&ctx.world));
            if let Some(body) = WorldInspector::inspect_body(&ctx.world, ctx.body) {
                println!("{body}");
            }
            println!(
                "viewport: {}x{} px, scale={} px/m",
                cli.width,
                cli.height,
                ctx.transform.scale()
            );
        }
        Commands::Simulate {
            frames,
            realtime,
            halt_on_error,
            strict,
            show_scene,
        } => {
            let config = DriverConfig {
                decode: DecodeOptions {
                    strict,
                    ..Default::default()
                },
                policy: if halt_on_error {
                    FailurePolicy::Halt
                } else {
                    FailurePolicy::LogAndContinue
                },
                ..DriverConfig::default()
            };
            let mut driver = FrameDriver::new(build_demo(&demo)?, config);

            let start = Instant::now();
            let summary = if realtime {
                driver.run(&mut StatsClock::new(FixedIntervalClock::default()).take_frames(frames))?
            } else {
                driver.run(&mut ImmediateClock::default().take_frames(frames))?
            };
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

            let ctx = driver.context();
            let output = SimulateOutput {
                frames: summary.frames,
                failures: summary.failures,
                elapsed_ms,
                body: WorldInspector::inspect_body(&ctx.world, ctx.body),
                world: WorldInspector::summary(&ctx.world),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);

            if show_scene {
                print!("{}", CommandTextRenderer::new().render(driver.scene()));
            }
        }
        Commands::DumpDebug {
            steps,
            scaled_alpha,
            raw,
        } => {
            println!("{}", dump_debug(&demo, steps, scaled_alpha, raw)?);
        }
    }

    Ok(())
}

/// JSON for the demo world's debug geometry after `steps` steps.
fn dump_debug(
    demo: &DemoConfig,
    steps: u64,
    scaled_alpha: bool,
    raw: bool,
) -> anyhow::Result<String> {
    let mut ctx = build_demo(demo)?;
    for _ in 0..steps {
        ctx.world.step();
    }
    let batch = ctx.world.debug_render_batch();
    if raw {
        return Ok(serde_json::to_string_pretty(&batch)?);
    }
    let options = DecodeOptions {
        alpha: if scaled_alpha {
            AlphaMode::Scaled
        } else {
            AlphaMode::Unscaled
        },
        strict: true,
    };
    let segments = decode_debug_batch(&batch, options)?;
    Ok(serde_json::to_string_pretty(&segments)?)
}

/// Wraps a clock and logs frame-time statistics once a second of frames.
struct StatsClock<C> {
    inner: C,
    stats: FrameStats,
}

impl<C: FrameClock> StatsClock<C> {
    fn new(inner: C) -> Self {
        Self {
            inner,
            stats: FrameStats::default(),
        }
    }
}

impl<C: FrameClock> FrameClock for StatsClock<C> {
    fn next_frame(&mut self) -> Option<std::time::Duration> {
        let dt = self.inner.next_frame()?;
        self.stats.record(dt);
        if self.stats.total_frames() % 60 == 0 {
            tracing::info!("{}", self.stats);
        }
        Some(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_debug_output_is_pure_json() {
        let out = dump_debug(&DemoConfig::default(), 0, false, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let segments = value.as_array().unwrap();
        assert!(!segments.is_empty());
        assert!(segments[0].get("color").is_some());
    }

    #[test]
    fn raw_dump_keeps_flat_arrays() {
        let out = dump_debug(&DemoConfig::default(), 3, false, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let vertices = value["vertices"].as_array().unwrap().len();
        let colors = value["colors"].as_array().unwrap().len();
        assert_eq!(vertices % 4, 0);
        assert_eq!(colors, vertices * 2);
    }

    #[test]
    fn cli_accepts_dump_debug_flags() {
        let cli = Cli::try_parse_from(["rigidframe-cli", "dump-debug", "--steps", "5", "--raw"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::DumpDebug { steps: 5, raw: true, scaled_alpha: false }
        ));
    }
}
