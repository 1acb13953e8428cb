use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sweep_engine::PruneConfig;

use crate::cli::Cli;

/// File looked up in the working copy when `--config` is not given.
pub const CONFIG_FILE: &str = ".git-sweep.toml";

/// Contents of a config file. Every field is optional.
///
/// ```toml
/// [prune]
/// keep = ["main", "release"]
/// force = false
///
/// [fetch]
/// enabled = true
/// ssh_directory = "/home/ci/.ssh"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub prune: PruneConfig,
    pub fetch: FetchConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub enabled: bool,
    pub ssh_directory: Option<PathBuf>,
}

impl SweepConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Load the explicit file if given, else the working copy's default file
    /// if it exists, else the built-in defaults.
    pub fn discover(explicit: Option<&Path>, workdir: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match workdir.map(|dir| dir.join(CONFIG_FILE)) {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// Effective settings for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub prune: PruneConfig,
    pub fetch: bool,
    pub ssh_directory: PathBuf,
}

impl Settings {
    /// Command-line flags win over the file, the file over built-in defaults.
    pub fn resolve(cli: &Cli, file: SweepConfig) -> Self {
        let SweepConfig { prune, fetch } = file;
        let keep = if cli.always_keep.is_empty() {
            prune.keep
        } else {
            cli.always_keep.clone()
        };
        let ssh_directory = cli
            .ssh_directory
            .clone()
            .or(fetch.ssh_directory)
            .unwrap_or_else(default_ssh_directory);

        Self {
            prune: PruneConfig {
                keep,
                force: cli.force().unwrap_or(prune.force),
                dry_run: cli.dry_run || prune.dry_run,
            },
            fetch: cli.fetch || fetch.enabled,
            ssh_directory,
        }
    }
}

fn default_ssh_directory() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".ssh"))
        .unwrap_or_else(|| PathBuf::from(".ssh"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("git-sweep").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_without_file_or_flags() {
        let s = Settings::resolve(&cli(&[]), SweepConfig::default());
        assert_eq!(s.prune, PruneConfig::default());
        assert!(!s.fetch);
        assert!(s.ssh_directory.ends_with(".ssh"));
    }

    #[test]
    fn file_overrides_defaults() {
        let file: SweepConfig = toml::from_str(
            "[prune]\nkeep = [\"trunk\"]\nforce = false\n[fetch]\nenabled = true\nssh_directory = \"/keys\"\n",
        )
        .unwrap();
        let s = Settings::resolve(&cli(&[]), file);
        assert_eq!(s.prune.keep, vec!["trunk"]);
        assert!(!s.prune.force);
        assert!(s.fetch);
        assert_eq!(s.ssh_directory, PathBuf::from("/keys"));
    }

    #[test]
    fn flags_override_file() {
        let file: SweepConfig =
            toml::from_str("[prune]\nkeep = [\"trunk\"]\nforce = false\n[fetch]\nssh_directory = \"/keys\"\n")
                .unwrap();
        let s = Settings::resolve(
            &cli(&[
                "--always-keep",
                "main,develop",
                "--force-prune-unmerged",
                "--ssh-directory",
                "/other",
            ]),
            file,
        );
        assert_eq!(s.prune.keep, vec!["main", "develop"]);
        assert!(s.prune.force);
        assert_eq!(s.ssh_directory, PathBuf::from("/other"));
    }

    #[test]
    fn dry_run_from_either_source() {
        let file: SweepConfig = toml::from_str("[prune]\ndry_run = true\n").unwrap();
        assert!(Settings::resolve(&cli(&[]), file).prune.dry_run);
        assert!(Settings::resolve(&cli(&["--dry-run"]), SweepConfig::default()).prune.dry_run);
    }

    #[test]
    fn discover_prefers_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[prune]\nkeep = [\"a\"]\n").unwrap();
        let explicit = dir.path().join("other.toml");
        std::fs::write(&explicit, "[prune]\nkeep = [\"b\"]\n").unwrap();

        let c = SweepConfig::discover(Some(&explicit), Some(dir.path())).unwrap();
        assert_eq!(c.prune.keep, vec!["b"]);
        let c = SweepConfig::discover(None, Some(dir.path())).unwrap();
        assert_eq!(c.prune.keep, vec!["a"]);
    }

    #[test]
    fn discover_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            SweepConfig::discover(None, Some(dir.path())).unwrap(),
            SweepConfig::default()
        );
        assert_eq!(SweepConfig::discover(None, None).unwrap(), SweepConfig::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SweepConfig::discover(Some(&dir.path().join("nope.toml")), None).unwrap_err();
        assert!(err.to_string().contains("cannot read config file"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[prune]\nforce = \"sometimes\"\n").unwrap();
        assert!(SweepConfig::load(&path).is_err());
    }
}
