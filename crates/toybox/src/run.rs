use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use gallery::{write_pack, Gallery, LoadReport, PathResolver, ShaderDescriptor};
use serde::Serialize;
use submove::{move_matching, MoveOptions, SkipReason, SortRange};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{CheckArgs, Cli, Command, ExportArgs, GalleryArgs, ListArgs, MoveArgs, ShowArgs};
use crate::config::AppConfig;
use crate::paths::AppPaths;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    let paths = AppPaths::discover()?;
    let config = AppConfig::load_or_default(&paths.config_file())?;
    let resolver = PathResolver::new()?;
    debug!(
        config = %paths.config_dir().display(),
        data = %paths.data_dir().display(),
        share = %paths.share_dir().display(),
        "resolved toybox paths"
    );

    match cli.command {
        Command::List(args) => {
            let (gallery, _) = build_gallery(&cli.gallery, &paths, &config, &resolver)?;
            run_list(&gallery, &args)
        }
        Command::Show(args) => {
            let (gallery, _) = build_gallery(&cli.gallery, &paths, &config, &resolver)?;
            run_show(&gallery, &args)
        }
        Command::Check(args) => {
            let (gallery, loaded) = build_gallery(&cli.gallery, &paths, &config, &resolver)?;
            run_check(&gallery, &loaded, &args)
        }
        Command::Export(args) => {
            let (gallery, _) = build_gallery(&cli.gallery, &paths, &config, &resolver)?;
            run_export(&gallery, &args, &resolver)
        }
        Command::Move(args) => run_move(&args, &config, &resolver),
        Command::Where => run_where(&paths, &config),
    }
}

fn build_gallery(
    args: &GalleryArgs,
    paths: &AppPaths,
    config: &AppConfig,
    resolver: &PathResolver,
) -> Result<(Gallery, LoadReport)> {
    let mut gallery = if args.no_builtins || !config.include_builtins {
        Gallery::new()
    } else {
        Gallery::with_builtins()
    };

    let mut roots = paths.sub_roots();
    for root in &config.extra_roots {
        roots.push(resolver.resolve_path(root)?);
    }
    for root in &args.roots {
        roots.push(
            resolver
                .resolve(root)
                .with_context(|| format!("failed to resolve sub root '{root}'"))?,
        );
    }

    let report = gallery.load_roots(&roots);
    if !report.failed.is_empty() {
        warn!(
            failed = report.failed.len(),
            "some sub packs could not be loaded"
        );
    }
    debug!(
        subs = gallery.len(),
        packs = report.loaded.len(),
        "gallery assembled"
    );
    Ok((gallery, report))
}

#[derive(Serialize)]
struct ListEntry<'a> {
    key: &'a str,
    name: &'a str,
    sort: Option<u16>,
    webgl: u8,
    buffers: usize,
    channels: usize,
    tags: &'a [String],
}

fn run_list(gallery: &Gallery, args: &ListArgs) -> Result<()> {
    let entries: Vec<ListEntry<'_>> = gallery
        .iter_sorted()
        .into_iter()
        .map(|d| ListEntry {
            key: d.key(),
            name: d.name(),
            sort: d.sort_index(),
            webgl: d.webgl().major(),
            buffers: d.auxiliary_buffers().len(),
            channels: d.input_channels().len(),
            tags: d.tags(),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("Gallery is empty.");
        return Ok(());
    }

    for entry in entries {
        let sort = entry
            .sort
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {sort:>4}  {:<20} {:<32} webgl{} buffers={} channels={}",
            entry.key, entry.name, entry.webgl, entry.buffers, entry.channels
        );
    }
    Ok(())
}

fn lookup<'a>(gallery: &'a Gallery, key: &str) -> Result<&'a ShaderDescriptor> {
    gallery
        .get(key)
        .ok_or_else(|| anyhow!("no sub with key '{key}' in the gallery"))
}

fn run_show(gallery: &Gallery, args: &ShowArgs) -> Result<()> {
    let descriptor = lookup(gallery, &args.key)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(descriptor)?);
        return Ok(());
    }

    println!("key:        {}", descriptor.key());
    println!("name:       {}", descriptor.name());
    match descriptor.sort_index() {
        Some(sort) => println!("sort:       {sort}"),
        None => println!("sort:       (unset)"),
    }
    println!("webgl:      {}", descriptor.webgl().major());
    if let Some(precision) = descriptor.fragment_precision() {
        println!("precision:  {precision}");
    }
    if !descriptor.tags().is_empty() {
        println!("tags:       {}", descriptor.tags().join(", "));
    }
    if let Some(description) = descriptor.description() {
        println!("about:      {description}");
    }
    for (position, pass) in descriptor.auxiliary_buffers().iter().enumerate() {
        println!("buffer {position}:   -> iChannel{}", pass.channel_index);
    }
    for binding in descriptor.input_channels() {
        println!(
            "iChannel{}:  {}",
            binding.channel,
            serde_json::to_string(&binding.source)?
        );
    }

    if args.source {
        if let Some(common) = descriptor.common_source() {
            println!("\n// ---- common ----\n{common}");
        }
        for (position, pass) in descriptor.auxiliary_buffers().iter().enumerate() {
            println!("\n// ---- buffer {position} ----\n{}", pass.glsl_source);
        }
        println!("\n// ---- image ----\n{}", descriptor.fragment_source());
    }
    Ok(())
}

fn run_check(gallery: &Gallery, loaded: &LoadReport, args: &CheckArgs) -> Result<()> {
    // Packs that never made it into the gallery count as errors too.
    for (path, error) in &loaded.failed {
        println!("error: [{}] {error}", path.display());
    }

    let report = gallery.validate();
    for issue in &report.issues {
        println!("{issue}");
    }

    let errors = report.errors().count() + loaded.failed.len();
    let warnings = report.warnings().count();
    println!(
        "Checked {} subs: {errors} error(s), {warnings} warning(s).",
        report.checked + loaded.failed.len()
    );

    if errors > 0 || (args.strict && warnings > 0) {
        bail!("gallery validation failed");
    }
    Ok(())
}

fn run_export(gallery: &Gallery, args: &ExportArgs, resolver: &PathResolver) -> Result<()> {
    let descriptor = lookup(gallery, &args.key)?;
    let target = resolver
        .resolve(&args.out)
        .with_context(|| format!("failed to resolve export directory '{}'", args.out))?
        .join(descriptor.key());
    let manifest = write_pack(descriptor, &target)
        .with_context(|| format!("failed to export '{}' to {}", args.key, target.display()))?;
    info!(key = %args.key, path = %manifest.display(), "exported sub pack");
    println!("Exported {} -> {}", descriptor.key(), target.display());
    Ok(())
}

fn run_move(args: &MoveArgs, config: &AppConfig, resolver: &PathResolver) -> Result<()> {
    let defaults = MoveOptions::default();
    let source = pick_dir(
        resolver,
        args.source.as_deref(),
        config.mover.source.as_deref(),
        &defaults.source,
    )?;
    let destination = pick_dir(
        resolver,
        args.destination.as_deref(),
        config.mover.destination.as_deref(),
        &defaults.destination,
    )?;
    let range = args.range.unwrap_or_else(|| {
        SortRange::new(
            config.mover.min.unwrap_or(defaults.range.min_exclusive),
            config.mover.max.unwrap_or(defaults.range.max_inclusive),
        )
    });

    let options = MoveOptions {
        source,
        destination,
        range,
        dry_run: args.dry_run,
    };
    info!(
        source = %options.source.display(),
        destination = %options.destination.display(),
        range = %options.range,
        dry_run = options.dry_run,
        "moving subs"
    );
    let report = move_matching(&options)?;

    let verb = if report.dry_run { "would move" } else { "moved" };
    for entry in &report.moved {
        println!(
            "  {verb} {} -> {} (sort {})",
            entry.from.display(),
            entry.to.display(),
            entry.sort
        );
    }
    for entry in &report.failed {
        println!("  failed {}: {}", entry.path.display(), entry.error);
    }
    let unsorted = report
        .skipped
        .iter()
        .filter(|s| s.reason == SkipReason::NoSortIndex)
        .count();
    println!(
        "Scanned {}: {} {verb}, {} out of range, {unsorted} without sort index, {} failed.",
        report.scanned,
        report.moved.len(),
        report.skipped.len() - unsorted,
        report.failed.len()
    );

    if report.has_failures() {
        bail!("{} sub(s) could not be moved", report.failed.len());
    }
    Ok(())
}

fn pick_dir(
    resolver: &PathResolver,
    flag: Option<&str>,
    configured: Option<&Path>,
    fallback: &Path,
) -> Result<PathBuf> {
    match (flag, configured) {
        (Some(raw), _) => resolver.resolve(raw),
        (None, Some(path)) => resolver.resolve_path(path),
        (None, None) => resolver.resolve_path(fallback),
    }
}

fn run_where(paths: &AppPaths, config: &AppConfig) -> Result<()> {
    println!("Configuration directories:");
    println!("  config:     {}", paths.config_dir().display());
    println!("  data:       {}", paths.data_dir().display());
    println!("  share:      {}", paths.share_dir().display());
    println!("  file:       {}", paths.config_file().display());
    println!("Sub search roots:");
    for root in paths.sub_roots().iter().chain(config.extra_roots.iter()) {
        println!("  {}", root.display());
    }
    println!(
        "Built-in subs: {}",
        if config.include_builtins {
            "enabled"
        } else {
            "disabled"
        }
    );
    Ok(())
}
