use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stitchmap")]
#[command(version, about = "Texture atlas stitcher and resource cache", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Scan a resources tree and stitch every texture directory
    Build(BuildArgs),
    /// Stitch a single directory into a named atlas
    Pack(PackArgs),
    /// Print a persisted atlas info record
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Resources root containing textures/ and models/ [default: resources]
    pub resources: Option<PathBuf>,

    /// Load settings from a stitchmap config file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Load every built atlas into a headless cache after building
    #[arg(long)]
    pub load: bool,

    #[command(flatten)]
    pub packing: PackingArgs,
}

#[derive(Args, Debug, Clone)]
pub struct PackArgs {
    /// Directory of .png images to stitch
    pub input: PathBuf,

    /// Namespaced atlas key (e.g. ui:button) [default: directory name]
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Output directory for the .png and .info files [default: .]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub packing: PackingArgs,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Path to a .info file
    pub info: PathBuf,

    /// Print as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Packing options shared by `build` and `pack`.
#[derive(Args, Debug, Clone, Default)]
pub struct PackingArgs {
    /// Largest canvas side the atlas may grow to [default: 16384]
    #[arg(long)]
    pub max_size: Option<u32>,

    /// Padding between images in pixels [default: 0]
    #[arg(short, long)]
    pub padding: Option<u32>,

    /// Extrude image edges by N pixels (helps with texture bleeding) [default: 0]
    #[arg(long)]
    pub extrude: Option<u32>,

    /// Packing heuristic to use [default: best-short-side-fit]
    #[arg(long, value_enum)]
    pub heuristic: Option<PackingHeuristic>,

    /// Force power-of-two atlas dimensions
    #[arg(long)]
    pub pot: bool,

    /// Compress PNG output (0-6 or 'max'). Default level is 2 if flag is present without value.
    #[arg(long, value_name = "LEVEL", default_missing_value = "2", num_args = 0..=1)]
    pub compress: Option<CompressionLevel>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// PNG compression level (0-6 or max)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression
    Max,
}

impl std::str::FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("max") {
            Ok(CompressionLevel::Max)
        } else {
            s.parse::<u8>()
                .map_err(|_e| format!("invalid compression level: {}", s))
                .and_then(|n| {
                    if n <= 6 {
                        Ok(CompressionLevel::Level(n))
                    } else {
                        Err(format!("compression level must be 0-6 or 'max', got {}", n))
                    }
                })
        }
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        CompressionLevel::Level(2)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum PackingHeuristic {
    /// Best Short Side Fit - minimizes the shorter leftover side
    #[default]
    #[value(name = "best-short-side-fit")]
    BestShortSideFit,
    /// Best Long Side Fit - minimizes the longer leftover side
    #[value(name = "best-long-side-fit")]
    BestLongSideFit,
    /// Best Area Fit - picks the smallest free rectangle
    #[value(name = "best-area-fit")]
    BestAreaFit,
    /// Bottom Left - Tetris-style packing
    #[value(name = "bottom-left")]
    BottomLeft,
    /// Contact Point - maximizes contact with placed rectangles and canvas edges
    #[value(name = "contact-point")]
    ContactPoint,
    /// Best - tries all heuristics and keeps the smallest canvas
    #[value(name = "best")]
    Best,
}

impl PackingHeuristic {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "best-short-side-fit" => Some(PackingHeuristic::BestShortSideFit),
            "best-long-side-fit" => Some(PackingHeuristic::BestLongSideFit),
            "best-area-fit" => Some(PackingHeuristic::BestAreaFit),
            "bottom-left" => Some(PackingHeuristic::BottomLeft),
            "contact-point" => Some(PackingHeuristic::ContactPoint),
            "best" => Some(PackingHeuristic::Best),
            _ => None,
        }
    }
}
