//! # Convert Command
//!
//! File: cli/src/commands/convert.rs
//!
//! `carchive convert <INPUT>` reads an archive in any of the three encodings
//! (detected automatically) and writes it again in the selected one.
//!
use super::{resolve_output_path, write_options};
use anyhow::Context;
use carchive::common::fs::OsFileSystem;
use carchive::component::{dispatch, read_archive, FormatArg};
use carchive::core::config;
use carchive::core::error::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Arguments for `carchive convert`.
#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Existing archive: a directory, a tar file or a gzip-compressed tar file.
    pub input: PathBuf,
    /// Destination path. Defaults to <output_dir>/<name>-<version><ext>.
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub format: FormatArg,
}

pub fn handle_convert(args: ConvertArgs) -> Result<()> {
    let cfg = config::load_config().context("Failed to load carchive configuration")?;
    let format = args.format.resolve(cfg.archive.default_format()?)?;

    let fs = OsFileSystem::new();
    let archive = read_archive(&fs, &args.input)?;
    let output = resolve_output_path(args.output, &cfg, archive.descriptor(), format);
    if output == args.input {
        anyhow::bail!(
            "Output path '{}' is the input archive; choose a different --output.",
            output.display()
        );
    }

    info!(
        "Converting {} to {} at {}",
        args.input.display(),
        format,
        output.display()
    );
    dispatch::write_as(&fs, &output, &archive, format, &write_options(&cfg))?;
    println!(
        "Converted {}:{} to {} at {}",
        archive.descriptor().name(),
        archive.descriptor().version(),
        format,
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_convert_args() {
        let args = ConvertArgs::try_parse_from(["convert", "in.tar", "-f", "fs"]).unwrap();
        assert_eq!(args.input, PathBuf::from("in.tar"));
        assert_eq!(args.output, None);
        assert_eq!(args.format.raw(), Some("fs"));
    }
}
