#![deny(unsafe_code)]
//! CLI binary for the gravity-points particle simulation.
//!
//! Subcommands:
//! - `run <variant>`: simulate N frames headless, write PNG frames
//! - `list`: print available variants and themes
//! - `schema <variant>`: print the JSON parameter schema

mod error;

use clap::{ArgAction, Parser, Subcommand};
use error::CliError;
use gravity_points_core::input::events_for_frame;
use gravity_points_core::{FrameClock, InputEvent, LoopState, Scene, ScriptedEvent, Theme};
use gravity_points_engines::raster::{frame_time_ms, render, Starfield};
use gravity_points_engines::snapshot::{sequence_path, write_png};
use gravity_points_engines::{build_scene, Variant};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_SEED: u64 = 42;
const DEFAULT_FRAMES: usize = 120;

#[derive(Parser)]
#[command(name = "gravity-points", about = "Particles falling into user-placed gravity points")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Raise log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate a variant for N frames and write the last frame as PNG.
    Run {
        /// Variant name (classic, tidal, enhanced). Optional with --scene.
        variant: Option<String>,

        /// Screen width in pixels [default: the variant's].
        #[arg(short = 'W', long)]
        width: Option<usize>,

        /// Screen height in pixels [default: the variant's].
        #[arg(short = 'H', long)]
        height: Option<usize>,

        /// Number of frames to simulate [default: 120].
        #[arg(short, long)]
        frames: Option<usize>,

        /// PRNG seed for deterministic output [default: 42].
        #[arg(long)]
        seed: Option<u64>,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,

        /// Parameter overrides as a JSON object, layered over the scene's.
        #[arg(long)]
        params: Option<String>,

        /// Place an attractor at X,Y before the first frame. Repeatable.
        #[arg(long = "click", value_name = "X,Y")]
        clicks: Vec<String>,

        /// Scene file describing the whole run.
        #[arg(long)]
        scene: Option<PathBuf>,

        /// Also write every Nth frame as <output>_NNNN.png.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        every: Option<u64>,

        /// Pace frames at 60 per second instead of running flat out.
        #[arg(long)]
        realtime: bool,

        /// Start without the variant's startup attractors.
        #[arg(long)]
        no_patterns: bool,
    },
    /// List available variants and themes.
    List,
    /// Print the parameter schema of a variant as JSON.
    Schema {
        /// Variant name.
        variant: String,
    },
}

/// Everything `run` needs besides the scene itself.
struct RunOptions {
    output: PathBuf,
    every: Option<u64>,
    realtime: bool,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Parses `"X,Y"` into a click event.
fn parse_click(text: &str) -> Result<InputEvent, CliError> {
    let bad = || CliError::Input(format!("invalid --click '{text}': expected X,Y"));
    let (x, y) = text.split_once(',').ok_or_else(bad)?;
    let x: f64 = x.trim().parse().map_err(|_| bad())?;
    let y: f64 = y.trim().parse().map_err(|_| bad())?;
    if !x.is_finite() || !y.is_finite() {
        return Err(bad());
    }
    Ok(InputEvent::click(x, y))
}

/// Shallow-merges the keys of `overrides` into `base`. Both must be objects.
fn merge_params(base: &mut Value, overrides: Value) -> Result<(), CliError> {
    let Value::Object(extra) = overrides else {
        return Err(CliError::Input("--params must be a JSON object".into()));
    };
    match base {
        Value::Object(map) => {
            map.extend(extra);
            Ok(())
        }
        _ => Err(CliError::Input("scene params must be a JSON object".into())),
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_scene(
    variant: Option<String>,
    scene_path: Option<&Path>,
    width: Option<usize>,
    height: Option<usize>,
    frames: Option<usize>,
    seed: Option<u64>,
    params: Option<&str>,
    clicks: &[String],
    no_patterns: bool,
) -> Result<Scene, CliError> {
    let mut scene = match (scene_path, &variant) {
        (Some(path), _) => Scene::load(path)?,
        (None, Some(name)) => {
            let (w, h) = Variant::from_name(name)?.default_size();
            Scene::new(name, w, h, DEFAULT_SEED)
        }
        (None, None) => {
            return Err(CliError::Input(
                "a variant name or --scene is required".into(),
            ))
        }
    };

    if let Some(name) = variant {
        scene.variant = name;
    }
    if let Some(w) = width {
        scene.width = w;
    }
    if let Some(h) = height {
        scene.height = h;
    }
    if let Some(s) = seed {
        scene.seed = s;
    }
    match frames {
        Some(f) => scene.frames = f,
        None if scene.frames == 0 => scene.frames = DEFAULT_FRAMES,
        None => {}
    }
    if let Some(text) = params {
        let overrides: Value = serde_json::from_str(text)
            .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
        merge_params(&mut scene.params, overrides)?;
    }
    for click in clicks {
        scene.events.push(ScriptedEvent {
            frame: 0,
            event: parse_click(click)?,
        });
    }
    if no_patterns {
        scene.patterns = Some(Vec::new());
    }
    scene.validate()?;
    Ok(scene)
}

fn run_scene(scene: &Scene, opts: &RunOptions, json: bool) -> Result<(), CliError> {
    let (variant, mut sim, theme) = build_scene(scene)?;
    let stars = Starfield::generate(theme.stars, sim.width(), sim.height(), scene.seed);
    let mut clock = opts.realtime.then(FrameClock::default);
    let mut sequence = Vec::new();

    info!(
        variant = variant.name(),
        width = scene.width,
        height = scene.height,
        frames = scene.frames,
        seed = scene.seed,
        "run started"
    );

    for frame in 0..scene.frames as u64 {
        if sim.frame(events_for_frame(&scene.events, frame)) == LoopState::Stopped {
            info!(frame, "quit received");
            break;
        }
        let done = sim.frame_index();
        if opts.every.is_some_and(|n| done % n == 0) {
            let path = sequence_path(&opts.output, done);
            let fb = render(&sim, &theme, &stars, frame_time_ms(done))?;
            write_png(&fb, &path)?;
            sequence.push(path.display().to_string());
        }
        if let Some(clock) = clock.as_mut() {
            clock.tick();
        }
    }

    let fb = render(&sim, &theme, &stars, frame_time_ms(sim.frame_index()))?;
    write_png(&fb, &opts.output)?;

    if json {
        let info = serde_json::json!({
            "variant": variant.name(),
            "title": variant.title(),
            "width": scene.width,
            "height": scene.height,
            "frames": sim.frame_index(),
            "seed": scene.seed,
            "theme": theme.name,
            "particles": sim.particles().len(),
            "attractors": sim.attractors().len(),
            "output": opts.output.display().to_string(),
            "sequence": sequence,
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        eprintln!(
            "ran {} ({}x{}, {} frames, seed {}, {} particles, {} attractors) -> {}",
            variant.name(),
            scene.width,
            scene.height,
            sim.frame_index(),
            scene.seed,
            sim.particles().len(),
            sim.attractors().len(),
            opts.output.display()
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let themes = Theme::list_names();
            if cli.json {
                let variants: Vec<Value> = Variant::list_variants()
                    .iter()
                    .map(|name| -> Result<Value, CliError> {
                        let v = Variant::from_name(name)?;
                        let (w, h) = v.default_size();
                        Ok(serde_json::json!({
                            "name": v.name(),
                            "title": v.title(),
                            "width": w,
                            "height": h,
                            "theme": v.default_theme(),
                        }))
                    })
                    .collect::<Result<_, _>>()?;
                let info = serde_json::json!({
                    "variants": variants,
                    "themes": themes,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Variants:");
                for name in Variant::list_variants() {
                    let v = Variant::from_name(name)?;
                    let (w, h) = v.default_size();
                    println!("  {name:<10} {w}x{h}  {}", v.title());
                }
                println!("Themes:");
                println!("  {}", themes.join(", "));
            }
        }
        Command::Schema { variant } => {
            let schema = Variant::from_name(&variant)?.param_schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Command::Run {
            variant,
            width,
            height,
            frames,
            seed,
            output,
            params,
            clicks,
            scene,
            every,
            realtime,
            no_patterns,
        } => {
            let scene = resolve_scene(
                variant,
                scene.as_deref(),
                width,
                height,
                frames,
                seed,
                params.as_deref(),
                &clicks,
                no_patterns,
            )?;
            let opts = RunOptions {
                output,
                every,
                realtime,
            };
            run_scene(&scene, &opts, cli.json)?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
