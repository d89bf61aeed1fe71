use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use picture_slideshow_core::{
    Carousel, Controls, DisplayConfig, Effect, LoopBuilder, Millis, MountOptions, RecordingSurface,
    Signal, SlideSet, SlideshowError,
};
use tracing_subscriber::EnvFilter;

fn main() -> picture_slideshow_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            source,
            duration_ms,
            resize_at,
            resize_width,
            hover,
        } => run_simulate(&source, duration_ms, resize_at.zip(resize_width), hover),
        Commands::Layout { source } => run_layout(&source),
    }
}

fn run_simulate(
    source: &SourceArgs,
    duration_ms: Millis,
    resize: Option<(Millis, u32)>,
    hover: Option<String>,
) -> picture_slideshow_core::Result<()> {
    let config = source.load_config()?;
    let hover = hover.as_deref().map(parse_window).transpose()?;
    tracing::info!(
        slides = source.slides,
        width = source.width,
        duration_ms,
        mode = ?config.mode,
        "simulating slideshow"
    );

    let mut carousel = Carousel::mount(
        SlideSet::placeholders(source.slides),
        config,
        MountOptions::new(source.width).with_controls(Controls::all()),
        RecordingSurface::new(),
    );
    print_effects(&mut carousel, 0)?;

    let mut signals = Vec::new();
    if let Some((at, width)) = resize {
        signals.push((at, Signal::Resize { viewport_width: width }));
    }
    if let Some((start, end)) = hover {
        signals.push((start, Signal::PointerEnter));
        signals.push((end, Signal::PointerLeave));
    }
    signals.sort_by_key(|(at, _)| *at);

    let mut pending = signals.into_iter().peekable();
    let mut now = 0;
    while now < duration_ms {
        let next_signal = pending.peek().map(|(at, _)| *at);
        let wakeup = [carousel.next_wakeup(), next_signal, Some(duration_ms)]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(duration_ms)
            .max(now);

        carousel.advance_to(wakeup);
        while let Some((_, signal)) = pending.next_if(|(at, _)| *at <= wakeup) {
            carousel.handle(signal, wakeup);
        }
        print_effects(&mut carousel, wakeup)?;

        // Progress even when a callback is due at the current instant.
        now = if wakeup == now { now + 1 } else { wakeup };
    }

    carousel.destroy();
    print_effects(&mut carousel, duration_ms)?;
    tracing::info!(state = ?carousel.playback_state(), "simulation finished");
    Ok(())
}

fn run_layout(source: &SourceArgs) -> picture_slideshow_core::Result<()> {
    let config = source.load_config()?;
    let breakpoint = config.breakpoint_for(source.width);
    let visible_count = config.visible_count(breakpoint);
    let buffer = LoopBuilder::new(config.padding).build(&SlideSet::placeholders(source.slides), visible_count);

    let report = serde_json::json!({
        "breakpoint": breakpoint,
        "visible_count": visible_count,
        "looping": buffer.is_looping(),
        "baseline_position": buffer.baseline_position(),
        "source_indices": buffer.source_indices(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_effects(
    carousel: &mut Carousel<RecordingSurface>,
    at: Millis,
) -> picture_slideshow_core::Result<()> {
    for effect in carousel.surface_mut().drain() {
        let line = serde_json::json!({ "at": at, "effect": effect_json(&effect)? });
        println!("{line}");
    }
    Ok(())
}

fn effect_json(effect: &Effect) -> picture_slideshow_core::Result<serde_json::Value> {
    Ok(serde_json::to_value(effect)?)
}

/// Parses `start-end` in milliseconds.
fn parse_window(window: &str) -> picture_slideshow_core::Result<(Millis, Millis)> {
    let (start, end) = window
        .split_once('-')
        .ok_or_else(|| SlideshowError::msg(format!("expected `start-end`, got `{window}`")))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<Millis>()
            .map_err(|_| SlideshowError::msg(format!("invalid timestamp `{value}`")))
    };
    let (start, end) = (parse(start)?, parse(end)?);
    if end < start {
        return Err(SlideshowError::msg("hover window ends before it starts"));
    }
    Ok((start, end))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Picture card slideshow simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive a slideshow on a virtual clock and print every effect as JSON.
    Simulate {
        #[command(flatten)]
        source: SourceArgs,
        /// Length of the simulation in milliseconds.
        #[arg(long, default_value_t = 6_000)]
        duration_ms: Millis,
        /// Time at which a resize event is delivered.
        #[arg(long, requires = "resize_width")]
        resize_at: Option<Millis>,
        /// Viewport width reported by the resize event.
        #[arg(long, requires = "resize_at")]
        resize_width: Option<u32>,
        /// Hover window as `start-end` in milliseconds.
        #[arg(long)]
        hover: Option<String>,
    },
    /// Print the mounted slide order for a slide count and viewport width.
    Layout {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Data attributes as `key=value`, applied when no config file is given.
    #[arg(long = "attr", value_name = "KEY=VALUE")]
    attributes: Vec<String>,
    /// Number of slides in the section.
    #[arg(short, long, default_value_t = 6)]
    slides: usize,
    /// Viewport width in pixels.
    #[arg(short, long, default_value_t = 1_200)]
    width: u32,
}

impl SourceArgs {
    fn load_config(&self) -> picture_slideshow_core::Result<DisplayConfig> {
        match &self.config {
            Some(path) => load_file(path),
            None => {
                let pairs = self
                    .attributes
                    .iter()
                    .map(|attribute| {
                        attribute.split_once('=').ok_or_else(|| {
                            SlideshowError::msg(format!("expected KEY=VALUE, got `{attribute}`"))
                        })
                    })
                    .collect::<picture_slideshow_core::Result<Vec<_>>>()?;
                let config = DisplayConfig::from_attributes(pairs);
                config.validate()?;
                Ok(config)
            }
        }
    }
}

fn load_file(path: &Path) -> picture_slideshow_core::Result<DisplayConfig> {
    tracing::debug!(?path, "loading configuration");
    DisplayConfig::load(path)
}
