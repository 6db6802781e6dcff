//! # carchive Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! One module per subcommand, each exposing an `Args` struct parsed by clap
//! and a `handle_*` function called from `main.rs`:
//!
//! - `create`: build an archive from a source directory
//! - `convert`: re-encode an existing archive in another format
//! - `inspect`: print what an archive contains
//!
//! The helpers below are shared by the commands that write archives.
//!
use carchive::component::{ComponentDescriptor, OutputFormat, WriteOptions};
use carchive::core::config::Config;
use std::path::{Path, PathBuf};

pub mod convert;
pub mod create;
pub mod inspect;

/// Write options derived from configuration.
pub fn write_options(cfg: &Config) -> WriteOptions {
    WriteOptions {
        compression_level: cfg.archive.compression_level(),
        atomic: cfg.archive.atomic_writes(),
    }
}

/// File name used when no output path is given: `<name>-<version><ext>`,
/// with `/` in the component name replaced by `_`.
pub fn default_output_name(descriptor: &ComponentDescriptor, format: OutputFormat) -> String {
    format!(
        "{}-{}{}",
        descriptor.name().replace('/', "_"),
        descriptor.version(),
        format.extension()
    )
}

/// The explicit output path, or the default name inside the configured
/// output directory (the current directory when unset).
pub fn resolve_output_path(
    explicit: Option<PathBuf>,
    cfg: &Config,
    descriptor: &ComponentDescriptor,
    format: OutputFormat,
) -> PathBuf {
    explicit.unwrap_or_else(|| {
        cfg.archive
            .output_dir()
            .unwrap_or_else(|| Path::new(".").to_path_buf())
            .join(default_output_name(descriptor, format))
    })
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use carchive::core::config::ArchiveConfig;

    #[test]
    fn test_default_output_name() {
        let descriptor = ComponentDescriptor::new("github.com/acme/my-comp", "1.0.0");
        assert_eq!(
            default_output_name(&descriptor, OutputFormat::TarGzip),
            "github.com_acme_my-comp-1.0.0.tgz"
        );
        assert_eq!(
            default_output_name(&descriptor, OutputFormat::Filesystem),
            "github.com_acme_my-comp-1.0.0"
        );
    }

    #[test]
    fn test_resolve_output_path() {
        let descriptor = ComponentDescriptor::new("my-comp", "1.0.0");
        let mut cfg = Config::default();
        assert_eq!(
            resolve_output_path(None, &cfg, &descriptor, OutputFormat::Tar),
            PathBuf::from("./my-comp-1.0.0.tar")
        );
        cfg.archive = ArchiveConfig {
            output_dir: Some("/srv/archives".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve_output_path(None, &cfg, &descriptor, OutputFormat::Tar),
            PathBuf::from("/srv/archives/my-comp-1.0.0.tar")
        );
        assert_eq!(
            resolve_output_path(Some("out.tar".into()), &cfg, &descriptor, OutputFormat::Tar),
            PathBuf::from("out.tar")
        );
    }

    #[test]
    fn test_write_options_follow_config() {
        let cfg = Config {
            archive: ArchiveConfig {
                compression_level: Some(9),
                atomic_writes: Some(true),
                ..Default::default()
            },
        };
        assert_eq!(
            write_options(&cfg),
            WriteOptions {
                compression_level: 9,
                atomic: true
            }
        );
        assert_eq!(write_options(&Config::default()), WriteOptions::default());
    }
}
