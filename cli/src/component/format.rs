//! # Component Archive Output Formats
//!
//! File: cli/src/component/format.rs
//!
//! ## Overview
//!
//! A component archive can be written in three interchangeable encodings:
//!
//! | Token | Variant                    | Layout                                   |
//! |-------|----------------------------|------------------------------------------|
//! | `fs`  | `OutputFormat::Filesystem` | directory tree                           |
//! | `tar` | `OutputFormat::Tar`        | single uncompressed tar stream           |
//! | `tgz` | `OutputFormat::TarGzip`    | the same tar stream, gzip-compressed     |
//!
//! This module turns user input into a validated `OutputFormat`. An empty value
//! means "not chosen yet" where the caller allows it, and is resolved later to
//! a caller-supplied default (see [`FormatArg::resolve`]).
//!
use crate::core::error::{ArchiveError, Result};
use clap::Args;
use std::fmt;
use std::str::FromStr;

/// One of the supported archive encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Filesystem,
    Tar,
    TarGzip,
}

impl OutputFormat {
    /// Every supported format, in the order they are listed to users.
    pub const ALL: [OutputFormat; 3] = [
        OutputFormat::Filesystem,
        OutputFormat::Tar,
        OutputFormat::TarGzip,
    ];

    /// The token accepted on the command line and in configuration files.
    pub fn token(self) -> &'static str {
        match self {
            OutputFormat::Filesystem => "fs",
            OutputFormat::Tar => "tar",
            OutputFormat::TarGzip => "tgz",
        }
    }

    /// File name suffix used when deriving a default output path.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Filesystem => "",
            OutputFormat::Tar => ".tar",
            OutputFormat::TarGzip => ".tgz",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for OutputFormat {
    type Err = ArchiveError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.token() == value)
            .ok_or_else(|| ArchiveError::UnsupportedFormat {
                value: value.to_string(),
            })
    }
}

/// Quoted, comma-separated list of the accepted tokens: `"fs", "tar", "tgz"`.
pub fn allowed_formats() -> String {
    OutputFormat::ALL
        .iter()
        .map(|format| format!("{:?}", format.token()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Help text for a format option, built from the supported set.
pub fn default_usage() -> String {
    let tokens: Vec<String> = OutputFormat::ALL
        .iter()
        .map(|format| format!("{:?}", format.token()))
        .collect();
    match tokens.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!(
            "output format of the component archive. Can be {} or {}",
            rest.join(", "),
            last
        ),
        _ => format!(
            "output format of the component archive. Can be {}",
            tokens.join(", ")
        ),
    }
}

/// Validates a format token.
///
/// With `ignore_empty` set, an empty value is accepted and yields `None`
/// (no format chosen yet). Any other value must be exactly one of the
/// supported tokens, otherwise `ArchiveError::UnsupportedFormat` is returned.
pub fn validate_output_format(value: &str, ignore_empty: bool) -> Result<Option<OutputFormat>> {
    if ignore_empty && value.is_empty() {
        return Ok(None);
    }
    Ok(Some(value.parse::<OutputFormat>()?))
}

/// Clap value parser for the `--format` option. Empty values pass through.
fn parse_format_flag(value: &str) -> std::result::Result<String, String> {
    validate_output_format(value, true)
        .map(|_| value.to_string())
        .map_err(|err| err.to_string())
}

/// The `-f/--format` option shared by the commands that write archives.
///
/// The raw value is validated while parsing but only resolved to an
/// `OutputFormat` once the caller's default (from configuration) is known.
#[derive(Args, Debug, Clone, Default)]
pub struct FormatArg {
    #[arg(
        short = 'f',
        long = "format",
        value_name = "FORMAT",
        help = default_usage(),
        value_parser = parse_format_flag
    )]
    format: Option<String>,
}

impl FormatArg {
    /// Builds the option as if `--format <value>` had been passed.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            format: Some(value.into()),
        }
    }

    /// The value as given on the command line, if any.
    pub fn raw(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Resolves the option, falling back to `default` when the flag was
    /// omitted or given an empty value.
    pub fn resolve(&self, default: OutputFormat) -> Result<OutputFormat> {
        match self.raw() {
            None => Ok(default),
            Some(value) => Ok(validate_output_format(value, true)?.unwrap_or(default)),
        }
    }
}
