//! TDMS Convert CLI Application
//!
//! Command-line front end over the tdms-convert library. It parses flags
//! into an `ExportConfig`, optionally layered over TOML defaults, and hands
//! the path to the batch driver. Exit status: 0 on full success, 1 when any
//! source failed (or the batch could not start), 2 for configuration errors
//! caught before any file is processed.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use tdms_convert::config::{self, OutputFormat};
use tdms_convert::{batch, ExportConfig};

/// Convert NI TDMS recordings to npy/mat/wav/csv
///
/// PATH comes first so it can never be swallowed by a list-valued option;
/// channel lists are comma-separated (or repeat the flag) for the same
/// reason.
#[derive(Parser, Debug)]
#[command(name = "tdms-convert")]
#[command(about = "Convert NI TDMS recordings to scientific data formats", long_about = None)]
#[command(version, disable_version_flag = true)]
struct Args {
    /// Path to a TDMS file or a folder containing them
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Print file meta info to the console; no data files are written
    #[arg(short = 'd', long)]
    display_info: bool,

    /// Also save meta info to a .info sidecar file
    #[arg(short = 'm', long)]
    meta_save2file: bool,

    /// Zero-based channel indices to export, e.g. -c 0,2,3 (default: all)
    #[arg(short = 'c', long, value_name = "IDX", value_delimiter = ',')]
    channel_selection: Vec<usize>,

    /// Prepend a time track column when the source declares a sampling interval
    #[arg(short = 't', long)]
    time_track: bool,

    /// Compress the output where the format supports it (npy -> npz, mat)
    #[arg(short = 'z', long)]
    zip_compression: bool,

    /// Save each channel to its own output file
    #[arg(short = 's', long)]
    split_file: bool,

    /// Output labels in selection order, e.g. -n x,y,z; with -t the first
    /// name labels the time track
    #[arg(short = 'n', long, value_name = "NAME", value_delimiter = ',')]
    name_channel: Vec<String>,

    /// Output format (default: npy)
    #[arg(short = 'o', long, value_enum, value_name = "FORMAT")]
    output_format: Option<OutputFormat>,

    /// Sampling rate in Hz, required for wav output
    #[arg(short = 'r', long, value_name = "HZ")]
    rate_sampling: Option<u32>,

    /// Directory to write outputs into (default: beside each source file)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// TOML file with [output] defaults; flags take precedence
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the batch summary as JSON
    #[arg(long)]
    json: bool,

    /// Convert batch entries in parallel
    #[arg(long)]
    parallel: bool,

    /// Print version information and exit
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// Verbosity level (can be repeated: --verbose --verbose)
    #[arg(long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short = 'q', long)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("tdms-convert v{}", env!("CARGO_PKG_VERSION"));
    log::info!("using decoder library v{}", tdms_decoder::VERSION);

    let code = match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[error]: {:#}", e);
            1
        }
    };
    std::process::exit(code);
}

fn run(args: Args) -> Result<i32> {
    // Configuration problems terminate before any file is touched
    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[error]: {}", e);
            return Ok(2);
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("[error]: {}", e);
        return Ok(2);
    }

    let summary = batch::run(&args.path, &config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if !args.quiet {
        print!("{}", summary);
    }

    Ok(if summary.all_succeeded() { 0 } else { 1 })
}

/// Merge command-line flags over optional TOML defaults
fn build_config(args: &Args) -> tdms_convert::Result<ExportConfig> {
    let defaults = match &args.config {
        Some(path) => {
            log::debug!("loading configuration defaults from {:?}", path);
            config::load_file_config(path)?
        }
        None => Default::default(),
    };

    let format = args
        .output_format
        .or(defaults.output.format)
        .unwrap_or(OutputFormat::Npy);
    let output_dir = args
        .output_dir
        .clone()
        .or(defaults.output.directory.clone());
    let compress =
        args.zip_compression || defaults.output.compress.unwrap_or(false);

    let mut config = ExportConfig::new(format)
        .with_split(args.split_file)
        .with_compression(compress)
        .with_time_track(args.time_track)
        .with_selection(args.channel_selection.clone())
        .with_names(args.name_channel.clone());
    if let Some(rate) = args.rate_sampling {
        config = config.with_sample_rate(rate);
    }
    if let Some(dir) = output_dir {
        config = config.with_output_dir(dir);
    }
    config.display_info = args.display_info;
    config.save_meta = args.meta_save2file;
    config.parallel = args.parallel;
    Ok(config)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
