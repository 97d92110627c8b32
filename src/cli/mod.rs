mod args;

pub use args::{
    BuildArgs, CliArgs, Command, CompressionLevel, InspectArgs, PackArgs, PackingArgs,
    PackingHeuristic,
};
