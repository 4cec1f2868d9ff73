use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hairfit::{compose, config, css, frames, AlignmentEngine, AnchorMode, Viewport};
use log::{info, warn};

#[derive(Parser)]
#[command(name = "hairfit")]
#[command(version, about = "Align a 2D overlay to face-mesh landmarks, frame by frame")]
struct Cli {
    /// Config file (defaults to the system or per-user config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Anchor the overlay on this face point
    #[arg(long, global = true)]
    anchor: Option<AnchorMode>,

    /// Overlay width as a fraction of the viewport width
    #[arg(long, global = true)]
    width_fraction: Option<f32>,

    /// Log per-frame geometry
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align every frame of a JSON-lines landmark stream
    Align {
        /// Frame stream (defaults to stdin)
        frames: Option<PathBuf>,

        /// Output format, one line per frame
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Composite an overlay onto a still frame
    Compose {
        /// Base frame image
        #[arg(long)]
        image: PathBuf,

        /// Overlay image (transparency is honored)
        #[arg(long)]
        overlay: PathBuf,

        /// Landmark frame for the image, as JSON
        #[arg(long)]
        landmarks: PathBuf,

        /// Output image
        #[arg(short, long)]
        output: PathBuf,

        /// Draw the eyes midpoint and anchor
        #[arg(long)]
        markers: bool,
    },
    /// Print the face geometry for every anchor mode
    Anchors {
        /// Landmark frame, as JSON
        landmarks: PathBuf,
    },
    /// Open config file in editor
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Css,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::builder()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_target(false)
        .format_timestamp(None)
        .init();

    let mut cfg = config::load_config(cli.config.as_deref())?;
    if let Some(anchor) = cli.anchor {
        cfg.anchor = anchor;
    }
    if let Some(fraction) = cli.width_fraction {
        cfg.overlay_width_fraction = fraction;
    }

    match cli.command {
        Commands::Align { frames, format } => {
            align(&build_engine(&cfg)?, frames.as_deref(), format)
        }
        Commands::Compose {
            image,
            overlay,
            landmarks,
            output,
            markers,
        } => compose(&build_engine(&cfg)?, &image, &overlay, &landmarks, &output, markers),
        Commands::Anchors { landmarks } => anchors(&build_engine(&cfg)?, &landmarks),
        Commands::Config => open_config(cli.config.as_deref()),
    }
}

fn build_engine(cfg: &config::Config) -> Result<AlignmentEngine> {
    AlignmentEngine::new(cfg.engine_config()).context("Invalid alignment configuration")
}

fn align(engine: &AlignmentEngine, path: Option<&Path>, format: Format) -> Result<()> {
    let input: Box<dyn BufRead> = match path {
        Some(p) => Box::new(BufReader::new(
            File::open(p).with_context(|| format!("opening {}", p.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    info!("Aligning with anchor {}", engine.config().anchor);

    let (mut total, mut with_face, mut skipped) = (0usize, 0usize, 0usize);
    for frame in frames::FrameReader::new(input) {
        total += 1;
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                warn!("{:#}", e);
                skipped += 1;
                continue;
            }
        };

        let transform = match engine.align(frame.face.as_ref(), frame.viewport) {
            Ok(t) => t,
            Err(e) => {
                warn!("Frame {}: {}", frame.number, e);
                skipped += 1;
                continue;
            }
        };
        if transform.is_present() {
            with_face += 1;
        }

        match format {
            Format::Json => serde_json::to_writer(&mut out, &transform)?,
            Format::Css => write!(out, "{}", css::style_declaration(&transform))?,
        }
        writeln!(out)?;
    }
    out.flush()?;

    info!(
        "{} frame(s): {} with a face, {} skipped",
        total, with_face, skipped
    );
    Ok(())
}

fn compose(
    engine: &AlignmentEngine,
    image_path: &Path,
    overlay_path: &Path,
    landmarks_path: &Path,
    output: &Path,
    markers: bool,
) -> Result<()> {
    let mut frame = image::open(image_path)
        .with_context(|| format!("opening {}", image_path.display()))?
        .to_rgba8();
    let overlay = image::open(overlay_path)
        .with_context(|| format!("opening {}", overlay_path.display()))?
        .to_rgba8();
    let record = frames::read_frame_file(landmarks_path)?;

    // The still image is the rendering surface
    let (width, height) = frame.dimensions();
    let viewport = Viewport::new(width as f32, height as f32);

    let transform = engine
        .align(record.face.as_ref(), viewport)
        .context("Failed to align overlay")?;
    match transform.placement() {
        Some(p) => info!(
            "Overlay at ({:.1}, {:.1}), {:.1}px wide, rotated {:.2}deg",
            p.center_x, p.center_y, p.width_px, p.rotation_degrees
        ),
        None => warn!("No face in {}; writing the frame unchanged", landmarks_path.display()),
    }

    compose::composite(&mut frame, &overlay, &transform);
    if markers {
        if let Some(face) = record.face.as_ref() {
            let geometry = engine.measure(face, viewport)?;
            compose::draw_markers(&mut frame, &geometry);
        }
    }

    frame
        .save(output)
        .with_context(|| format!("writing {}", output.display()))?;
    info!("✓ Wrote {}", output.display());
    Ok(())
}

fn anchors(engine: &AlignmentEngine, landmarks_path: &Path) -> Result<()> {
    let record = frames::read_frame_file(landmarks_path)?;
    let Some(face) = record.face.as_ref() else {
        anyhow::bail!("No face in {}", landmarks_path.display());
    };

    let mut geometries = Vec::with_capacity(AnchorMode::ALL.len());
    for mode in AnchorMode::ALL {
        geometries.push(engine.measure_with(face, record.viewport, mode)?);
    }
    println!("{}", serde_json::to_string_pretty(&geometries)?);
    Ok(())
}

fn open_config(path: Option<&Path>) -> Result<()> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_path);
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    if !config_path.exists() {
        config::save_config(&config::Config::default(), Some(&config_path))
            .context("Failed to write default config")?;
    }

    info!("Opening config file: {:?}", config_path);

    let status = std::process::Command::new(editor)
        .arg(&config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        anyhow::bail!("Editor exited with non-zero status");
    }

    Ok(())
}
