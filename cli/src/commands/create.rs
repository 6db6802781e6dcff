//! # Create Command
//!
//! File: cli/src/commands/create.rs
//!
//! ## Overview
//!
//! `carchive create <SOURCE_DIR>` packs a prepared directory into a component
//! archive. The directory must contain `component-descriptor.yaml`; every
//! other regular file below it becomes a blob named by its relative path.
//! Blob content is streamed from disk while the archive is written.
//!
//! Resources with `localFilesystemBlob` access whose `filename` has no
//! matching file are reported as warnings; the archive is still written.
//!
//! When the destination lies inside the source directory (for example
//! `carchive create . -f tar`), the destination and its `.partial` sibling
//! are never collected as blobs, so repeated runs do not nest earlier output.
//!
//! ```bash
//! carchive create ./my-comp -f tgz -o my-comp.tgz
//! ```
//!
use super::{resolve_output_path, write_options};
use anyhow::Context;
use carchive::common::fs::{
    io as fsio, join_relative, relative_name, FileKind, FileSystem, OsFileSystem,
};
use carchive::component::descriptor::DESCRIPTOR_FILE_NAME;
use carchive::component::{dispatch, Blob, ComponentArchive, ComponentDescriptor, FormatArg};
use carchive::core::config;
use carchive::core::error::Result;
use clap::Parser;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Arguments for `carchive create`.
#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Directory holding component-descriptor.yaml and the blob files.
    pub source_dir: PathBuf,
    /// Destination path. Defaults to <output_dir>/<name>-<version><ext>.
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub format: FormatArg,
}

pub fn handle_create(args: CreateArgs) -> Result<()> {
    info!("Creating component archive from {}", args.source_dir.display());
    let cfg = config::load_config().context("Failed to load carchive configuration")?;
    let format = args.format.resolve(cfg.archive.default_format()?)?;

    let fs = OsFileSystem::new();
    let descriptor = read_source_descriptor(&fs, &args.source_dir)?;
    let output = resolve_output_path(args.output, &cfg, &descriptor, format);
    let archive = build_archive(&fs, &args.source_dir, descriptor, Some(&output))?;

    dispatch::write_as(&fs, &output, &archive, format, &write_options(&cfg))?;
    println!(
        "Wrote {} archive for {}:{} ({} blob(s)) to {}",
        format,
        archive.descriptor().name(),
        archive.descriptor().version(),
        archive.len(),
        output.display()
    );
    Ok(())
}

/// Reads `component-descriptor.yaml` from `source_dir`.
pub fn read_source_descriptor(
    fs: &dyn FileSystem,
    source_dir: &Path,
) -> Result<ComponentDescriptor> {
    let kind = fs
        .stat(source_dir)
        .with_context(|| format!("Failed to inspect {}", source_dir.display()))?;
    if kind != Some(FileKind::Directory) {
        anyhow::bail!(
            "Source directory '{}' does not exist or is not a directory.",
            source_dir.display()
        );
    }
    let descriptor_path = source_dir.join(DESCRIPTOR_FILE_NAME);
    let content = fsio::read_bytes(fs, &descriptor_path)
        .with_context(|| format!("Failed to read {}", descriptor_path.display()))?;
    ComponentDescriptor::from_yaml(&content)
}

/// Assembles an archive from the files in `source_dir`. Files at `output`, or
/// below it, are skipped when `output` lies inside `source_dir`.
pub fn build_archive(
    fs: &dyn FileSystem,
    source_dir: &Path,
    descriptor: ComponentDescriptor,
    output: Option<&Path>,
) -> Result<ComponentArchive> {
    let mut excluded = Vec::new();
    if let Some(output) = output {
        if let Some(name) = name_within(source_dir, output)? {
            if name.is_empty() {
                anyhow::bail!(
                    "Output path '{}' is the source directory itself.",
                    output.display()
                );
            }
            let partial = dispatch::partial_path(Path::new(&name))?;
            excluded.push(relative_name(&partial)?);
            excluded.push(name);
        }
    }

    let mut archive = ComponentArchive::new(descriptor);
    let files = fs
        .list_files(source_dir)
        .with_context(|| format!("Failed to list files in {}", source_dir.display()))?;
    for name in files.into_iter().filter(|name| name != DESCRIPTOR_FILE_NAME) {
        if excluded.iter().any(|skip| is_same_or_below(&name, skip)) {
            debug!("Skipping '{}': it is the archive being written", name);
            continue;
        }
        let path = join_relative(source_dir, &name);
        debug!("Adding blob '{}' from {}", name, path.display());
        archive.add_blob(name, Blob::from_file(path))?;
    }

    for reference in archive.descriptor().local_blob_references() {
        if archive.blob(reference).is_none() {
            warn!(
                "Resource blob '{}' is referenced by the descriptor but missing from {}",
                reference,
                source_dir.display()
            );
        }
    }
    Ok(archive)
}

fn is_same_or_below(name: &str, prefix: &str) -> bool {
    name == prefix
        || name
            .strip_prefix(prefix)
            .map_or(false, |rest| rest.starts_with('/'))
}

/// `path` as a `/`-separated name relative to `dir`, or `None` if it lies
/// outside. Both paths are resolved lexically against the working directory;
/// symbolic links are not followed.
fn name_within(dir: &Path, path: &Path) -> Result<Option<String>> {
    let dir = lexical_absolute(dir)?;
    let path = lexical_absolute(path)?;
    match path.strip_prefix(&dir) {
        Ok(relative) => Ok(Some(relative_name(relative)?)),
        Err(_) => Ok(None),
    }
}

fn lexical_absolute(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to determine the current directory")?
            .join(path)
    };
    let mut resolved = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    Ok(resolved)
}
