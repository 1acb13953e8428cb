use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "git-sweep",
    about = "Delete local branches whose work has already landed on the current branch",
    version
)]
pub struct Cli {
    /// Working copy to sweep (searched upwards for a repository)
    #[arg(short = 'C', long = "repo", value_name = "PATH", default_value = ".")]
    pub repo: PathBuf,

    /// Config file (defaults to .git-sweep.toml in the working copy)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Branch never to delete; repeat or comma-separate. Replaces the default list
    #[arg(long = "always-keep", value_name = "NAME", value_delimiter = ',')]
    pub always_keep: Vec<String>,

    /// Delete merged branches even if git considers them unmerged [default]
    #[arg(long, overrides_with = "no_force_prune_unmerged")]
    pub force_prune_unmerged: bool,

    /// Only delete branches git itself considers merged into HEAD
    #[arg(long, overrides_with = "force_prune_unmerged")]
    pub no_force_prune_unmerged: bool,

    /// Report what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Fetch every remote before classifying branches
    #[arg(long)]
    pub fetch: bool,

    /// Directory holding SSH private keys for fetching (defaults to ~/.ssh)
    #[arg(long, value_name = "PATH")]
    pub ssh_directory: Option<PathBuf>,

    /// Log at debug level
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// The force setting given on the command line, if any.
    pub fn force(&self) -> Option<bool> {
        if self.no_force_prune_unmerged {
            Some(false)
        } else if self.force_prune_unmerged {
            Some(true)
        } else {
            None
        }
    }
}
