//! section-scan CLI: detect, calibrate and profile cross-sections.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[cfg(not(feature = "tracing"))]
use section_scan::core::{init_with_level, level_from_verbosity};
use section_scan::{BisectionAxis, ReferenceObject, ScanConfig, ScanParams, Session};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "section-scan")]
#[command(about = "Measure roughly circular cross-sections from a single photograph")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    #[cfg_attr(feature = "tracing", allow(dead_code))]
    verbose: u8,

    /// Emit tracing output as JSON.
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect circumferences in an image and optionally profile them.
    Scan(ScanArgs),

    /// Run a scan described by a JSON config file.
    Run {
        /// Path to the JSON config.
        #[arg(long)]
        config: PathBuf,
    },

    /// Write a config file with default detection parameters.
    InitConfig {
        /// Destination path.
        #[arg(long)]
        out: PathBuf,

        /// Image path recorded in the config.
        #[arg(long, default_value = "")]
        image: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AxisArg {
    Horizontal,
    Vertical,
}

impl From<AxisArg> for BisectionAxis {
    fn from(value: AxisArg) -> Self {
        match value {
            AxisArg::Horizontal => BisectionAxis::Horizontal,
            AxisArg::Vertical => BisectionAxis::Vertical,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct ScanArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Known scale in pixels per real unit.
    #[arg(long, conflicts_with = "reference_box")]
    pixels_per_metric: Option<f64>,

    /// Bounding box index of a reference object of known size.
    #[arg(long, requires = "reference_length")]
    reference_box: Option<usize>,

    /// Bisection of the reference box that has the known size.
    #[arg(long, value_enum, default_value_t = AxisArg::Horizontal)]
    reference_axis: AxisArg,

    /// Real size of the reference object along the chosen axis.
    #[arg(long)]
    reference_length: Option<f64>,

    /// Comma-separated candidate indices to keep, e.g. `0,3`.
    #[arg(long, value_delimiter = ',')]
    select: Option<Vec<usize>>,

    /// Write the text report here.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write the cropped region of interest here.
    #[arg(long)]
    roi: Option<PathBuf>,

    /// Write the all-candidates overlay here.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Directory for per-candidate and per-box review images.
    #[arg(long)]
    render_dir: Option<PathBuf>,
}

impl ScanArgs {
    fn to_config(&self) -> ScanConfig {
        let reference = match (self.reference_box, self.reference_length) {
            (Some(box_index), Some(real_length)) => Some(ReferenceObject {
                box_index,
                axis: self.reference_axis.into(),
                real_length,
            }),
            _ => None,
        };
        let path_string = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());
        ScanConfig {
            image_path: self.image.display().to_string(),
            pixels_per_metric: self.pixels_per_metric,
            reference,
            selection: self.select.clone(),
            report_path: path_string(&self.report),
            roi_path: path_string(&self.roi),
            preview_path: path_string(&self.preview),
            render_dir: path_string(&self.render_dir),
            params: ScanParams::default(),
        }
    }
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    #[cfg(feature = "tracing")]
    section_scan::core::init_tracing(if cli.log_json {
        section_scan::core::TracingFormat::Json
    } else {
        section_scan::core::TracingFormat::Pretty
    });
    #[cfg(not(feature = "tracing"))]
    init_with_level(level_from_verbosity(cli.verbose))?;

    match cli.command {
        Commands::Scan(args) => run_scan(&args.to_config()),
        Commands::Run { config } => run_scan(&ScanConfig::load_json(config)?),
        Commands::InitConfig { out, image } => run_init_config(&out, image),
    }
}

fn run_init_config(out: &Path, image: String) -> CliResult<()> {
    let cfg = ScanConfig {
        image_path: image,
        ..ScanConfig::default()
    };
    cfg.write_json(out)?;
    println!("wrote {}", out.display());
    Ok(())
}

fn run_scan(cfg: &ScanConfig) -> CliResult<()> {
    let mut session = Session::new(cfg.params.clone());
    let count = session.load_image(&cfg.image_path)?;

    println!("image: {}", cfg.image_path);
    println!("  candidates: {count}");
    for (i, c) in session.registry().candidates().iter().enumerate() {
        println!(
            "    [{i}] centroid ({}, {}), {} points",
            c.centroid.x,
            c.centroid.y,
            c.point_count()
        );
    }
    println!("  boxes: {}", session.boxes().len());
    for (i, b) in session.boxes().iter().enumerate() {
        println!(
            "    [{i}] horizontal {:.2} px, vertical {:.2} px",
            b.horizontal_bisection().length(),
            b.vertical_bisection().length()
        );
    }

    if let Some(path) = &cfg.preview_path {
        session.candidates_preview()?.save(path)?;
    }
    if let Some(dir) = &cfg.render_dir {
        write_review_images(&session, Path::new(dir))?;
    }

    if let Some(value) = cfg.pixels_per_metric {
        session.set_pixels_per_metric(value)?;
    } else if let Some(reference) = &cfg.reference {
        let scale =
            session.calibrate_from_box(reference.box_index, reference.axis, reference.real_length)?;
        println!("  pixels per metric: {}", scale.get());
    }

    if let Some(selection) = &cfg.selection {
        if !session.registry().has_snapshot() {
            return Err("selection needs more than two candidates".into());
        }
        session.set_final(selection)?;
    }

    if !session.calibration().is_set() {
        if cfg.report_path.is_some() {
            return Err("a report needs --pixels-per-metric or a reference box".into());
        }
        return write_roi(&mut session, cfg);
    }

    for (i, profile) in session.profile()?.iter().enumerate() {
        println!(
            "  {}: {} samples, average diameter {}",
            section_scan::report::circumference_tag(i),
            profile.len(),
            profile.average_diameter
        );
    }

    if let Some(path) = cfg.report_path() {
        if !session.generate_report(&path)? {
            return Err(format!("failed to write report {}", path.display()).into());
        }
        println!("  report: {}", path.display());
    }
    write_roi(&mut session, cfg)
}

fn write_roi(session: &mut Session, cfg: &ScanConfig) -> CliResult<()> {
    if let Some(path) = &cfg.roi_path {
        session.roi()?.save(path)?;
        println!("  roi: {path}");
    }
    Ok(())
}

fn write_review_images(session: &Session, dir: &Path) -> CliResult<()> {
    fs::create_dir_all(dir)?;
    for (i, img) in session.render_all()?.iter().enumerate() {
        img.save(dir.join(format!("candidate_{i}.png")))?;
    }
    for (i, views) in session.render_boxes()?.iter().enumerate() {
        views
            .horizontal
            .image
            .save(dir.join(format!("box_{i}_horizontal.png")))?;
        views
            .vertical
            .image
            .save(dir.join(format!("box_{i}_vertical.png")))?;
    }
    Ok(())
}
