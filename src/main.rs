use clap::{Parser, Subcommand};
use img_normalizer::config::{self, LogFormat, NormalizerConfig};
use img_normalizer::imaging::{AspectRatio, Dimensions, compute_target_dimensions};
use img_normalizer::process::{self, ProcessOptions};
use img_normalizer::{logging, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "img-normalizer")]
#[command(about = "Normalize photographs to standard aspect ratios")]
#[command(long_about = "\
Normalize photographs to standard aspect ratios

Every image under --source is matched to the closest ratio in the catalog
(1:1, 4:3, 3:2, 16:9, 21:9, 9:16 by default). Images that are off by a few
pixels are scaled; images further off are center-cropped. Results are written
under --dest, mirroring the source tree:

  photos/                          normalized/
  ├── IMG_0042.jpg  (1280x853)  →  ├── IMG_0042_1279x853.jpg
  └── day2/                        ├── day2/
      └── pano.png  (2140x900)  →  │   └── pano_2100x900.png
                                   └── image_process_log.csv

Supported formats: JPEG, PNG, WebP. Other files are listed in the log as
unsupported and left alone.

Settings are read from ./normalizer.toml when present.
Run 'img-normalizer gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Image file or directory to normalize
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Output directory (mirrors the source tree)
    #[arg(long, default_value = "normalized", global = true)]
    dest: PathBuf,

    /// Config file (default: ./normalizer.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Max pixels an axis may change before scaling gives way to cropping
    #[arg(long, value_name = "PX", global = true)]
    tolerance: Option<u32>,

    /// Max distance between image ratio and a catalog ratio
    #[arg(long, value_name = "F", global = true)]
    ratio_tolerance: Option<f64>,

    /// Catalog ratio, e.g. 16:9; repeat to build a custom catalog
    #[arg(long = "ratio", value_name = "W:H", global = true)]
    ratios: Vec<AspectRatio>,

    /// Processing log format
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    /// Enable debug diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit diagnostics as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize images and write results plus the processing log
    Run {
        /// Also copy images that need no change into the destination
        #[arg(long)]
        copy_unchanged: bool,
    },
    /// Decode and decide for every image without writing anything
    Check,
    /// Show the target size for given dimensions and ratio
    Target {
        /// Original size, e.g. 1280x853
        dimensions: String,
        /// Ratio, e.g. 16:9
        ratio: AspectRatio,
    },
    /// Print a stock normalizer.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Target { dimensions, ratio } => {
            let original = parse_dimensions(dimensions)?;
            println!("{}", compute_target_dimensions(original, *ratio));
        }
        Command::Run { copy_unchanged } => {
            logging::init(cli.verbose, cli.json_logs);
            let mut config = resolve_config(&cli)?;
            config.output.copy_unchanged |= *copy_unchanged;
            run(&cli, &config, false)?;
        }
        Command::Check => {
            logging::init(cli.verbose, cli.json_logs);
            let config = resolve_config(&cli)?;
            run(&cli, &config, true)?;
        }
    }

    Ok(())
}

/// Load the config file and apply command-line overrides on top.
fn resolve_config(cli: &Cli) -> Result<NormalizerConfig, config::ConfigError> {
    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(pixels) = cli.tolerance {
        config.tolerance.pixels = pixels;
    }
    if let Some(ratio) = cli.ratio_tolerance {
        config.tolerance.ratio = ratio;
    }
    if !cli.ratios.is_empty() {
        config.catalog.ratios = cli.ratios.clone();
    }
    if let Some(format) = cli.log_format {
        config.log.format = format;
    }
    config.validate()?;
    Ok(config)
}

fn run(
    cli: &Cli,
    config: &NormalizerConfig,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    init_thread_pool(&config.processing);

    let mut options = ProcessOptions::from_config(&cli.source, &cli.dest, config);
    options.dry_run = dry_run;

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event, dry_run) {
                println!("{}", line);
            }
        }
    });
    let result = process::process(&options, Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;

    let report = result?;
    output::print_summary(&report);
    Ok(())
}

/// Parse `WxH` as given on the command line.
fn parse_dimensions(s: &str) -> Result<Dimensions, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let width = w.trim().parse().map_err(|_| format!("bad width in '{s}'"))?;
    let height = h.trim().parse().map_err(|_| format!("bad height in '{s}'"))?;
    Ok(Dimensions::new(width, height))
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
