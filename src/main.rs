use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;
use tracing::info;

use mouse_spacer::config::Config;
use mouse_spacer::controller::GestureController;
use mouse_spacer::input::EnigoSink;
use mouse_spacer::source::{FrameSource, LandmarkStream};
use mouse_spacer::translator::Translator;

#[derive(Parser, Debug)]
#[command(
    name = "mouse-spacer",
    version,
    about = "Touchless mouse and keyboard driven by hand gestures"
)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Read hand landmarks as JSON lines from this file ("-" for stdin)
    #[arg(long, default_value = "-", conflicts_with = "detector")]
    landmarks: PathBuf,

    /// Spawn this detector and read hand landmarks from its stdout (must come last)
    #[arg(long, num_args = 1.., allow_hyphen_values = true, value_name = "COMMAND")]
    detector: Option<Vec<String>>,

    /// Capture from the webcam with the embedded MediaPipe model
    #[cfg(feature = "camera")]
    #[arg(long, conflicts_with_all = ["detector", "landmarks"])]
    camera: bool,

    /// Fingertip to thumb distance counted as touching
    #[arg(long)]
    distance_threshold: Option<f32>,

    /// Palm movement per axis ignored as jitter
    #[arg(long)]
    shake_sensitivity: Option<f32>,

    /// Cursor pixels per unit of palm movement
    #[arg(long)]
    mouse_sensitivity: Option<f32>,

    /// Wheel clicks per unit of vertical palm movement
    #[arg(long)]
    scroll_sensitivity: Option<f32>,
}

fn open_source(cli: &Cli, config: &Config) -> Result<Box<dyn FrameSource>> {
    let min_confidence = config.detector.min_detection_confidence;

    #[cfg(feature = "camera")]
    if cli.camera {
        let source = mouse_spacer::source::CameraSource::new(&config.detector)?;
        return Ok(Box::new(source));
    }

    if let Some(command) = &cli.detector {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| anyhow::anyhow!("--detector needs a command"))?;
        return Ok(Box::new(LandmarkStream::spawn(program, args, min_confidence)?));
    }

    Ok(Box::new(LandmarkStream::open(&cli.landmarks, min_confidence)?))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mouse_spacer=info".into()),
        )
        .init();

    info!("mouse-spacer v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load_or_default(&cli.config);
    let source = open_source(&cli, &config)?;
    let sink = EnigoSink::new()?;

    let mut controller = GestureController::new(
        source,
        sink,
        Translator::new(config.translator.clone()),
        config.controller.tick(),
    );

    let translator = controller.translator_mut().config_mut();
    if let Some(value) = cli.distance_threshold {
        translator.set_distance_threshold(value);
    }
    if let Some(value) = cli.shake_sensitivity {
        translator.set_shake_sensitivity(value);
    }
    if let Some(value) = cli.mouse_sensitivity {
        translator.set_mouse_sensitivity(value);
    }
    if let Some(value) = cli.scroll_sensitivity {
        translator.set_scroll_sensitivity(value);
    }
    info!("translator: {:?}", translator);

    // The first Ctrl-C or SIGTERM ends the loop so held keys get released.
    // A second one exits at once, e.g. while blocked on an idle stdin.
    let shutdown = controller.shutdown_flag();
    for signal in [SIGINT, SIGTERM] {
        flag::register_conditional_shutdown(signal, 1, Arc::clone(&shutdown))?;
        flag::register(signal, Arc::clone(&shutdown))?;
    }

    controller.run()
}
