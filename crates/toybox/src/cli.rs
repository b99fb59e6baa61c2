use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use submove::SortRange;

#[derive(Parser, Debug)]
#[command(
    name = "toybox",
    author,
    version,
    about = "Shadertoy-style shader gallery"
)]
pub struct Cli {
    #[command(flatten)]
    pub gallery: GalleryArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GalleryArgs {
    /// Additional directory to scan for sub packs (repeatable).
    #[arg(long = "root", value_name = "DIR", global = true)]
    pub roots: Vec<String>,

    /// Leave the bundled subs out of the gallery.
    #[arg(long, global = true)]
    pub no_builtins: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List gallery entries in display order.
    List(ListArgs),
    /// Print one sub's metadata and, optionally, its GLSL.
    Show(ShowArgs),
    /// Validate every sub in the gallery.
    Check(CheckArgs),
    /// Write a sub out as a pack directory.
    Export(ExportArgs),
    /// Move subs whose sort index falls in a range into another directory.
    Move(MoveArgs),
    /// Print resolved config, data, and share directories.
    Where,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[arg(value_name = "KEY")]
    pub key: String,

    /// Include GLSL sources in the output.
    #[arg(long)]
    pub source: bool,

    /// Emit the full descriptor as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[arg(value_name = "KEY")]
    pub key: String,

    /// Target directory; the pack is written to DIR/KEY.
    #[arg(long, value_name = "DIR")]
    pub out: String,
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Directory to scan (default `subs`).
    #[arg(long, value_name = "DIR")]
    pub source: Option<String>,

    /// Directory matching subs are moved into (default `subs2`).
    #[arg(long = "dest", value_name = "DIR")]
    pub destination: Option<String>,

    /// Sort range as `MIN:MAX`, matching `MIN < sort <= MAX` (default `200:300`).
    #[arg(long, value_name = "MIN:MAX", value_parser = parse_sort_range)]
    pub range: Option<SortRange>,

    /// Report what would move without touching the filesystem.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_sort_range(value: &str) -> Result<SortRange, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("sort range must not be empty".to_string());
    }

    let (min, max) = trimmed
        .split_once([':', ','])
        .ok_or_else(|| "expected MIN:MAX, e.g. 200:300".to_string())?;
    let min = min
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid lower bound '{}'", min.trim()))?;
    let max = max
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid upper bound '{}'", max.trim()))?;
    if min >= max {
        return Err(format!("lower bound {min} must be below upper bound {max}"));
    }
    Ok(SortRange::new(min, max))
}
