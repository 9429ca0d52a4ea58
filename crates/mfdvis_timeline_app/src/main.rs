// SPDX-License-Identifier: MIT OR Apache-2.0
//! `mfdvis_timeline` - command line front end for the device visualizer timeline
//!
//! Loads a keyframe timeline saved by the visualizer and:
//! - lists its keyframes and total duration
//! - resolves the visual state at any time
//! - exports every frame at a fixed rate as JSON lines
//!
//! Rendering is done by a recording target, so exported frames carry the
//! state that would be pushed into the 3D scene.

mod error;
mod frame_writer;

use clap::{Parser, Subcommand};
use error::AppError;
use frame_writer::JsonLinesWriter;
use mfdvis_timeline::{
    AnimatedProperty, CameraSnapshot, Color, FileSink, KeyframePatch, LightEntry, LightSnapshot,
    ModelState, ModelVisibilitySnapshot, RecordingTarget, Timeline, TimelineSettings,
    TransitionSpec, VisualState, SETTINGS_FILE_NAME,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(author, version, about = "Device visualizer keyframe timeline", long_about = None)]
struct Cli {
    /// Timeline file (`.ron` or `.json`)
    #[arg(short, long, global = true, default_value = "timeline.ron")]
    timeline: PathBuf,

    /// Settings file; defaults to `timeline.settings.ron` next to the timeline
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List keyframes and the total duration.
    Inspect,
    /// Print the resolved visual state at a time as JSON.
    Sample {
        /// Timeline time in seconds; clamped into the timeline
        #[arg(long)]
        time: f32,
    },
    /// Export every frame as one JSON object per line.
    Export {
        /// Frames per second; defaults to the settings value
        #[arg(long)]
        fps: Option<u32>,
        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Write a small example timeline.
    Demo,
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mfdvis_timeline=info,mfdvis_timeline_app=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let settings_path = cli
        .settings
        .clone()
        .unwrap_or_else(|| settings_path_for(&cli.timeline));
    let settings = TimelineSettings::load(&settings_path)?;

    let mut timeline = Timeline::with_settings(RecordingTarget::new(), VisualState::default(), settings)
        .with_persistence(Box::new(FileSink::new(&cli.timeline)));

    match cli.command {
        Commands::Demo => {
            write_demo(&mut timeline)?;
            tracing::info!("Wrote {} keyframes to {:?}", timeline.keyframes().len(), cli.timeline);
            Ok(())
        }
        Commands::Inspect => {
            load(&mut timeline, &cli.timeline)?;
            for (row, keyframe) in timeline.listing().iter().zip(timeline.keyframes()) {
                let kinds: Vec<_> = AnimatedProperty::all()
                    .iter()
                    .map(|p| format!("{} {}", p.name(), keyframe.transition_for(*p).kind.name()))
                    .collect();
                println!(
                    "{:>3}  {:<24} hold {:>6.2}s  transition {:>6.2}s  [{}]",
                    row.index,
                    row.name,
                    row.hold,
                    row.transition,
                    kinds.join(", ")
                );
            }
            println!("total {:.2}s", timeline.total_duration());
            Ok(())
        }
        Commands::Sample { time } => {
            load(&mut timeline, &cli.timeline)?;
            if let Some(frame) = timeline.sample(time) {
                println!("{}", serde_json::to_string_pretty(frame)?);
            }
            Ok(())
        }
        Commands::Export { fps, out } => {
            load(&mut timeline, &cli.timeline)?;
            let mut writer = JsonLinesWriter::new(BufWriter::new(File::create(&out)?));
            let summary = match fps {
                Some(fps) => pollster::block_on(timeline.export_frames(fps, &mut writer))?,
                None => pollster::block_on(timeline.export_default(&mut writer))?,
            };
            writer.finish()?;
            tracing::info!(
                "Exported {} frames at {} fps to {:?}",
                summary.frames,
                summary.fps,
                out
            );
            Ok(())
        }
    }
}

fn settings_path_for(timeline: &Path) -> PathBuf {
    timeline
        .parent()
        .map_or_else(|| PathBuf::from(SETTINGS_FILE_NAME), |dir| dir.join(SETTINGS_FILE_NAME))
}

fn load(timeline: &mut Timeline<RecordingTarget>, path: &Path) -> Result<(), AppError> {
    let count = timeline.load()?;
    if count == 0 {
        return Err(AppError::NoKeyframes(path.display().to_string()));
    }
    Ok(())
}

fn write_demo(timeline: &mut Timeline<RecordingTarget>) -> Result<(), AppError> {
    let lights = LightSnapshot::default();
    let models = ModelVisibilitySnapshot::new()
        .with_model("housing", ModelState::shown("rev-b"))
        .with_model("lid", ModelState::shown("rev-b"))
        .with_model("chip", ModelState::shown("rev-a"));

    timeline.append(VisualState::new(
        CameraSnapshot::looking_at([0.0, -12.0, 8.0], [0.0, 0.0, 0.0]),
        lights.clone(),
        models.clone(),
    ))?;

    let mut close_up_lights = lights.clone();
    close_up_lights
        .lights
        .push(LightEntry::spot([2.0, -2.0, 4.0], 0.8).with_color(Color::from_rgb8(255, 214, 170)));
    timeline.append(VisualState::new(
        CameraSnapshot::looking_at([3.0, -4.0, 3.0], [0.0, 0.0, 0.5]),
        close_up_lights,
        models
            .clone()
            .with_model("lid", ModelState::hidden("rev-b")),
    ))?;

    timeline.append(VisualState::new(
        CameraSnapshot::looking_at([-6.0, -6.0, 6.0], [0.0, 0.0, 0.0]),
        lights,
        models.with_model("chip", ModelState::shown("rev-b")),
    ))?;

    timeline.rename(0, "Overview")?;
    timeline.rename(1, "Inside")?;
    timeline.rename(2, "Revision B")?;
    timeline.update(
        0,
        KeyframePatch::new().transition_spec(AnimatedProperty::Camera, TransitionSpec::smooth()),
    )?;
    timeline.save()?;
    Ok(())
}
