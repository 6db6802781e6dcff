//! # Inspect Command
//!
//! File: cli/src/commands/inspect.rs
//!
//! `carchive inspect <ARCHIVE>` prints the detected encoding, the component
//! identity, its declared resources and the blobs stored in the archive.
//!
use carchive::common::fs::{FileSystem, OsFileSystem};
use carchive::component::descriptor::ResourceRelation;
use carchive::component::reader::read_archive_as;
use carchive::component::{detect_format, ComponentArchive, OutputFormat};
use carchive::core::error::Result;
use clap::Parser;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Arguments for `carchive inspect`.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Archive to inspect: a directory, a tar file or a gzip-compressed tar file.
    pub archive: PathBuf,
}

pub fn handle_inspect(args: InspectArgs) -> Result<()> {
    let fs = OsFileSystem::new();
    let format = detect_format(&fs, &args.archive)?;
    let archive = read_archive_as(&fs, &args.archive, format)?;
    print!("{}", render_summary(&fs, format, &archive)?);
    Ok(())
}

/// Human-readable summary of an archive. File-backed blob sizes are taken from `fs`.
pub fn render_summary(
    fs: &dyn FileSystem,
    format: OutputFormat,
    archive: &ComponentArchive,
) -> Result<String> {
    let component = &archive.descriptor().component;
    let mut out = String::new();
    writeln!(out, "Format:    {}", format)?;
    writeln!(out, "Component: {}", component.name)?;
    writeln!(out, "Version:   {}", component.version)?;
    writeln!(out, "Provider:  {}", component.provider)?;

    writeln!(out, "Resources: {}", component.resources.len())?;
    for resource in &component.resources {
        let relation = match resource.relation {
            ResourceRelation::Local => "local",
            ResourceRelation::External => "external",
        };
        write!(
            out,
            "  - {} {} ({}, {})",
            resource.name, resource.version, resource.kind, relation
        )?;
        if let Some(access) = &resource.access {
            write!(out, " via {}", access.kind)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "Blobs:     {}", archive.len())?;
    for (name, blob) in archive.blobs() {
        writeln!(out, "  - {} ({} bytes)", name, blob.size(fs)?)?;
    }
    Ok(out)
}
