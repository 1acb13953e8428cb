use anyhow::Context;
use colored::Colorize;
use sweep_engine::{BranchReport, Outcome, PruneReport, Pruner};
use sweep_git::{fetch_remotes, CredentialHelper, CredentialKind, FetchContext, GitRepository};
use tracing::{debug, info, warn};

use crate::cli::Cli;
use crate::config::{Settings, SweepConfig};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let repo = GitRepository::discover(&cli.repo)
        .with_context(|| format!("cannot open repository at {}", cli.repo.display()))?;
    let file = SweepConfig::discover(cli.config.as_deref(), repo.workdir())?;
    let settings = Settings::resolve(&cli, file);
    debug!(?settings, "resolved settings");

    if settings.fetch {
        cmd_fetch(&repo, &settings)?;
    }
    cmd_prune(&repo, &settings)
}

fn cmd_fetch(repo: &GitRepository, settings: &Settings) -> anyhow::Result<()> {
    let helper = repo
        .credential_helper()
        .context("cannot read credential.helper")?
        .map(CredentialHelper::new);
    if let Some(helper) = &helper {
        if !helper.supports(&[CredentialKind::Username, CredentialKind::Password]) {
            warn!(helper = helper.name(), "credential helper cannot supply passwords");
        }
    }

    let ctx = FetchContext::new(&settings.ssh_directory).with_credential_helper(helper);
    debug!(ssh_directory = %ctx.ssh_directory().display(), keys = ctx.ssh_keys().len(), "fetching remotes");
    let summary = fetch_remotes(repo, &ctx).context("fetch failed")?;
    info!(fetched = summary.fetched.len(), skipped = summary.skipped.len(), "fetch complete");
    for name in &summary.skipped {
        println!("  {} remote {}", "skipped".yellow(), name.bold());
    }
    Ok(())
}

fn cmd_prune(repo: &GitRepository, settings: &Settings) -> anyhow::Result<()> {
    let report = Pruner::new(repo, &settings.prune)
        .run()
        .context("cannot classify branches")?;
    print_report(&report);
    Ok(())
}

fn print_report<Id: std::fmt::Display>(report: &PruneReport<Id>) {
    for branch in &report.branches {
        println!("{}", branch_line(branch));
    }
    let summary = report.to_string();
    if report.deleted() == 0 {
        println!("{} {}", "✓".green().bold(), summary);
    } else if report.dry_run {
        println!("{} {}", "✓".yellow().bold(), summary.yellow());
    } else {
        println!("{} {}", "✓".green().bold(), summary.green());
    }
    if report.refused() > 0 {
        println!(
            "  {} deletions were refused; run with --debug for details",
            report.refused().to_string().red()
        );
    }
}

fn branch_line<Id: std::fmt::Display>(branch: &BranchReport<Id>) -> String {
    let name = &branch.decision.branch;
    let reason = branch.decision.reason();
    let label = format!("{:<12}", outcome_label(branch.outcome));
    match branch.outcome {
        Outcome::Deleted => format!("  {} {} ({})", label.green(), name.bold(), reason.dimmed()),
        Outcome::WouldDelete => format!("  {} {} ({})", label.yellow(), name.bold(), reason.dimmed()),
        Outcome::Refused => format!("  {} {} ({})", label.red(), name.bold(), reason.dimmed()),
        Outcome::Kept => format!("  {} {} ({})", label.dimmed(), name, reason.dimmed()),
    }
}

fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Deleted => "deleted",
        Outcome::WouldDelete => "would delete",
        Outcome::Kept => "kept",
        Outcome::Refused => "refused",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use git2::{Repository, Signature};
    use std::path::Path;

    struct Fixture {
        dir: tempfile::TempDir,
        repo: Repository,
    }

    impl Fixture {
        /// main with one commit; `done` at main; `wip` one commit ahead.
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let repo = Repository::init(dir.path()).unwrap();
            {
                let sig = Signature::now("sweep", "sweep@example.com").unwrap();
                let empty = repo.find_tree(repo.treebuilder(None).unwrap().write().unwrap()).unwrap();
                let c1 = repo
                    .commit(Some("refs/heads/main"), &sig, &sig, "initial", &empty, &[])
                    .unwrap();
                repo.set_head("refs/heads/main").unwrap();
                let c1 = repo.find_commit(c1).unwrap();
                repo.branch("done", &c1, false).unwrap();

                let blob = repo.blob(b"draft").unwrap();
                let mut builder = repo.treebuilder(None).unwrap();
                builder.insert("notes.txt", blob, 0o100644).unwrap();
                let tree = repo.find_tree(builder.write().unwrap()).unwrap();
                repo.commit(Some("refs/heads/wip"), &sig, &sig, "draft", &tree, &[&c1])
                    .unwrap();
            }
            Self { dir, repo }
        }

        fn path(&self) -> &Path {
            self.dir.path()
        }

        fn has_branch(&self, name: &str) -> bool {
            self.repo.find_branch(name, git2::BranchType::Local).is_ok()
        }

        fn run(&self, extra: &[&str]) -> anyhow::Result<()> {
            let repo = self.path().to_string_lossy().into_owned();
            let args = ["git-sweep", "-C", repo.as_str()]
                .into_iter()
                .chain(extra.iter().copied());
            run_command(Cli::try_parse_from(args).unwrap())
        }
    }

    #[test]
    fn deletes_merged_branch_and_keeps_the_rest() {
        let f = Fixture::new();
        f.run(&[]).unwrap();
        assert!(!f.has_branch("done"));
        assert!(f.has_branch("wip"));
        assert!(f.has_branch("main"));
    }

    #[test]
    fn dry_run_deletes_nothing() {
        let f = Fixture::new();
        f.run(&["--dry-run"]).unwrap();
        assert!(f.has_branch("done"));
    }

    #[test]
    fn keep_list_from_config_file() {
        let f = Fixture::new();
        std::fs::write(
            f.path().join(crate::config::CONFIG_FILE),
            "[prune]\nkeep = [\"main\", \"done\"]\n",
        )
        .unwrap();
        f.run(&[]).unwrap();
        assert!(f.has_branch("done"));

        f.run(&["--always-keep", "main"]).unwrap();
        assert!(!f.has_branch("done"));
    }

    #[test]
    fn fetch_without_remotes_is_a_no_op() {
        let f = Fixture::new();
        let keys = f.path().join("keys");
        f.run(&["--fetch", "--ssh-directory", keys.to_str().unwrap()])
            .unwrap();
        assert!(!f.has_branch("done"));
    }

    #[test]
    fn not_a_repository_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_string_lossy().into_owned();
        let err = run_command(Cli::try_parse_from(["git-sweep", "-C", path.as_str()]).unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("cannot open repository"));
    }

    #[test]
    fn unborn_head_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        let path = dir.path().to_string_lossy().into_owned();
        let err = run_command(Cli::try_parse_from(["git-sweep", "-C", path.as_str()]).unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("cannot classify branches"));
    }

    #[test]
    fn labels_every_outcome() {
        assert_eq!(outcome_label(Outcome::Deleted), "deleted");
        assert_eq!(outcome_label(Outcome::WouldDelete), "would delete");
        assert_eq!(outcome_label(Outcome::Kept), "kept");
        assert_eq!(outcome_label(Outcome::Refused), "refused");
    }
}
