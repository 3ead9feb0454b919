use std::time::Duration;

use anyhow::Result;

use annolens::annotate::{format_timestamp, Dimensions};
use annolens::playback::{MediaSource, MountPoint, SimulatedPrimary, SimulatedSecondary};
use annolens::{replay, Config, ReplayPlan, ReviewSession};

use super::input::{apply_filters, load_set};
use crate::{FilterArgs, InputArgs};

pub struct ReplayOptions {
    pub duration: Option<f64>,
    pub speed: f64,
    pub tick_ms: Option<u64>,
    pub ready_after: f64,
    pub fail_secondary: Option<String>,
    pub seek: Option<f64>,
    pub media: String,
    pub native: Option<Dimensions>,
    pub displayed: Option<Dimensions>,
}

pub async fn cmd_replay(
    input: &InputArgs,
    filter_args: &FilterArgs,
    options: ReplayOptions,
    config: &Config,
) -> Result<()> {
    let set = load_set(input)?;

    let duration = options
        .duration
        .unwrap_or_else(|| (set.end_ms() as f64 / 1000.0).ceil() + 1.0);

    let mut primary = SimulatedPrimary::new(duration).with_seek_units(config.playback.seek_units);
    if let (Some(native), Some(displayed)) = (options.native, options.displayed) {
        primary = primary.with_dimensions(native, displayed);
    }

    let mut session = ReviewSession::open(set, primary);
    apply_filters(session.filters_mut(), filter_args, config)?;

    let secondary = match options.fail_secondary {
        Some(message) => SimulatedSecondary::failing(message),
        None => SimulatedSecondary::new(),
    };
    if let Err(e) = session.attach_secondary(
        secondary,
        MountPoint::new("waveform"),
        MediaSource::new(options.media),
    ) {
        eprintln!("⚠️  {e}; continuing without waveform");
    }

    let plan = ReplayPlan {
        tick: options
            .tick_ms
            .filter(|ms| *ms > 0)
            .map_or_else(|| config.tick_interval(), Duration::from_millis),
        speed: options.speed,
        ready_after: Some(options.ready_after),
        seek: options.seek,
    };

    eprintln!(
        "▶️  Replaying {duration:.1}s at {}x ({} ms ticks)",
        options.speed,
        plan.tick.as_millis()
    );

    let summary = replay(&mut session, &plan, |report| {
        for annotation in &report.active {
            let model = annotation
                .model_name()
                .map(|m| format!(" [{m}]"))
                .unwrap_or_default();
            println!(
                "{}  {:>4}s  {}{model}  {}",
                format_timestamp((report.time * 1000.0).round() as u64),
                report.second,
                annotation.classifier,
                annotation.confidence
            );
        }
        if let Some(shapes) = report.overlay_shapes.filter(|n| *n > 0) {
            println!("{:>20}  overlay: {shapes} shapes", "");
        }
    })
    .await?;

    eprintln!(
        "⏹️  Stopped at {:.2}s ({} seconds visited, waveform {})",
        summary.final_time, summary.seconds_reported, summary.final_state
    );
    if let Some(message) = session.sync().last_error() {
        eprintln!("   Waveform error: {message}");
    }

    if let Some(secondary) = session.close() {
        eprintln!(
            "🧹 Waveform released after {} mirrored commands",
            secondary.commands().len()
        );
    }

    Ok(())
}
