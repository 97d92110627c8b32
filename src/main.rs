use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use glob::Pattern;
use log::{info, warn};

use stitchmap::atlas::{AtlasBuilder, DEFAULT_MAX_SIZE};
use stitchmap::cli::{
    BuildArgs, CliArgs, Command, CompressionLevel, InspectArgs, PackArgs, PackingArgs,
    PackingHeuristic,
};
use stitchmap::config::LoadedConfig;
use stitchmap::output::read_info;
use stitchmap::{ContentScanner, HeadlessGpu, ResourceCache, ResourcePaths, initialize_content};

#[allow(clippy::print_stderr)]
fn main() {
    if let Err(e) = run() {
        // Use eprintln instead of error! because logger may not be initialized
        // (e.g., config loading fails before logger init)
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = CliArgs::parse();

    match cli.command {
        Command::Build(args) => run_build(&args),
        Command::Pack(args) => run_pack(&args),
        Command::Inspect(args) => {
            init_logging(args.verbose);
            run_inspect(&args)
        }
    }
}

fn init_logging(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn run_build(args: &BuildArgs) -> Result<()> {
    let merged = merge_config_with_args(&args.packing, args.config.as_deref(), args.resources.clone())?;
    init_logging(merged.verbose);
    info!("Stitchmap v{}", env!("CARGO_PKG_VERSION"));

    let paths = ResourcePaths::from_root(&merged.resources);
    let scanner = merged.scanner();

    if args.load {
        let mut cache = ResourceCache::new(paths, HeadlessGpu::new());
        let report = initialize_content(&scanner, &mut cache)
            .context("content initialization failed")?;
        info!(
            "Loaded {} of {} atlases ({} uploads)",
            report.loaded(),
            report.built.len(),
            cache.gpu().uploads()
        );
        cache.shutdown();
    } else {
        let report = scanner.scan(&paths);
        if !report.is_success() {
            anyhow::bail!(
                "{} of {} directories failed to stitch",
                report.failures.len(),
                report.failures.len() + report.built.len()
            );
        }
        info!("Built {} atlases", report.built.len());
    }

    info!("Done!");
    Ok(())
}

fn run_pack(args: &PackArgs) -> Result<()> {
    let merged = merge_config_with_args(&args.packing, None, None)?;
    init_logging(merged.verbose);
    info!("Stitchmap v{}", env!("CARGO_PKG_VERSION"));

    let key = match &args.name {
        Some(name) => name.clone(),
        None => args
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("cannot derive an atlas name from {}", args.input.display()))?,
    };
    let output = args.output.clone().unwrap_or_else(|| PathBuf::from("."));

    let built = merged
        .scanner()
        .stitch_directory(&args.input, &key, &output)
        .with_context(|| format!("failed to stitch {}", args.input.display()))?;

    match built {
        Some((atlas, _)) => info!(
            "Saved {}/{}.png ({}x{}, {} entries)",
            output.display(),
            key,
            atlas.width,
            atlas.height,
            atlas.entries.len()
        ),
        None => warn!("No .png images in {}", args.input.display()),
    }

    Ok(())
}

#[allow(clippy::print_stdout)]
fn run_inspect(args: &InspectArgs) -> Result<()> {
    let info = read_info(&args.info)
        .with_context(|| format!("failed to read {}", args.info.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&info).context("failed to serialize info")?;
        println!("{}", json);
        return Ok(());
    }

    println!(
        "{}x{} {} atlas, {} entries",
        info.width,
        info.height,
        info.kind.as_str(),
        info.len()
    );
    for entry in info.entries() {
        let px = entry.uv.to_pixels(info.width, info.height);
        print!(
            "  {:<32} {:>5} {:>5} {:>5} {:>5}",
            entry.name, px.x, px.y, px.width, px.height
        );
        match entry.frame_duration_ms {
            Some(ms) => println!("  {} frames @ {}ms", entry.frame_count(), ms),
            None => println!(),
        }
    }
    Ok(())
}

/// Merged configuration from CLI args and optional config file.
struct MergedConfig {
    resources: PathBuf,
    max_size: u32,
    padding: u32,
    extrude: u32,
    heuristic: PackingHeuristic,
    pot: bool,
    compress: Option<CompressionLevel>,
    exclude: Vec<Pattern>,
    verbose: bool,
}

impl MergedConfig {
    fn scanner(&self) -> ContentScanner {
        let builder = AtlasBuilder::new()
            .max_size(self.max_size)
            .padding(self.padding)
            .extrude(self.extrude)
            .heuristic(self.heuristic)
            .power_of_two(self.pot);
        ContentScanner::new(builder)
            .compress(self.compress)
            .exclude(self.exclude.clone())
    }
}

/// Merge config file values with CLI arguments.
/// CLI arguments always take precedence over config values.
fn merge_config_with_args(
    args: &PackingArgs,
    config_path: Option<&Path>,
    resources: Option<PathBuf>,
) -> Result<MergedConfig> {
    let loaded_config = match config_path {
        Some(path) => Some(
            LoadedConfig::load(path)
                .with_context(|| format!("failed to load config: {}", path.display()))?,
        ),
        None => None,
    };
    let config = loaded_config.as_ref().map(|lc| &lc.config);

    // Resources root: CLI > config > default
    let resources = resources.unwrap_or_else(|| {
        loaded_config
            .as_ref()
            .map(|lc| lc.resolve_resources())
            .unwrap_or_else(|| PathBuf::from("resources"))
    });

    // For numeric fields: CLI > config > default
    let max_size = args
        .max_size
        .unwrap_or_else(|| config.map(|c| c.max_size).unwrap_or(DEFAULT_MAX_SIZE));
    let padding = args
        .padding
        .unwrap_or_else(|| config.map(|c| c.padding).unwrap_or(0));
    let extrude = args
        .extrude
        .unwrap_or_else(|| config.map(|c| c.extrude).unwrap_or(0));

    // Boolean flags: CLI presence sets them to true, otherwise use config
    let pot = args.pot || config.is_some_and(|c| c.power_of_two);

    // Heuristic: CLI > config > default
    let heuristic = if let Some(h) = args.heuristic {
        h
    } else if let Some(c) = config {
        PackingHeuristic::parse(&c.heuristic).ok_or_else(|| {
            anyhow::anyhow!(
                "unknown heuristic '{}' in config file. Valid values: best-short-side-fit, \
                 best-long-side-fit, best-area-fit, bottom-left, contact-point, best",
                c.heuristic
            )
        })?
    } else {
        PackingHeuristic::BestShortSideFit
    };

    // Compress: CLI option overrides config
    let compress = if args.compress.is_some() {
        args.compress
    } else if let Some(setting) = config.and_then(|c| c.compress.as_ref()) {
        Some(setting.level().ok_or_else(|| {
            anyhow::anyhow!("invalid compress value {:?} in config file", setting)
        })?)
    } else {
        None
    };

    let exclude = match &loaded_config {
        Some(lc) => lc.exclude_patterns()?,
        None => Vec::new(),
    };

    Ok(MergedConfig {
        resources,
        max_size,
        padding,
        extrude,
        heuristic,
        pot,
        compress,
        exclude,
        verbose: args.verbose,
    })
}
