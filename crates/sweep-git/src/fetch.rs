//! Pre-prune fetch of every remote.
//!
//! Transport settings travel in a [`FetchContext`] built once per run and
//! handed to [`fetch_remotes`]; nothing is configured process-wide.

use std::cell::Cell;
use std::path::{Path, PathBuf};

use git2::{Cred, CredentialType, ErrorClass, ErrorCode, FetchOptions, FetchPrune, RemoteCallbacks};
use tracing::{debug, info, warn};

use crate::credentials::{CredentialHelper, Credentials};
use crate::error::{GitError, GitResult};
use crate::repository::GitRepository;

/// Private key file names tried in `ssh_directory`, most preferred first.
const SSH_KEY_NAMES: &[&str] = &["id_ed25519", "id_ecdsa", "id_rsa"];

/// Everything a fetch needs to authenticate.
#[derive(Clone, Debug)]
pub struct FetchContext {
    ssh_directory: PathBuf,
    credential_helper: Option<CredentialHelper>,
}

impl FetchContext {
    pub fn new(ssh_directory: impl Into<PathBuf>) -> Self {
        Self {
            ssh_directory: ssh_directory.into(),
            credential_helper: None,
        }
    }

    pub fn with_credential_helper(mut self, helper: Option<CredentialHelper>) -> Self {
        self.credential_helper = helper;
        self
    }

    pub fn ssh_directory(&self) -> &Path {
        &self.ssh_directory
    }

    pub fn credential_helper(&self) -> Option<&CredentialHelper> {
        self.credential_helper.as_ref()
    }

    /// Private keys present in the ssh directory.
    pub fn ssh_keys(&self) -> Vec<PathBuf> {
        SSH_KEY_NAMES
            .iter()
            .map(|name| self.ssh_directory.join(name))
            .filter(|path| path.is_file())
            .collect()
    }

    fn callbacks(&self) -> RemoteCallbacks<'_> {
        let keys = self.ssh_keys();
        let next_key = Cell::new(0usize);
        let helper_tried = Cell::new(false);

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username, allowed| {
            let user = username.unwrap_or("git");

            if allowed.contains(CredentialType::USERNAME) {
                return Cred::username(user);
            }
            if allowed.contains(CredentialType::SSH_KEY) {
                if let Some(key) = keys.get(next_key.get()) {
                    next_key.set(next_key.get() + 1);
                    debug!(key = %key.display(), "offering ssh key");
                    return Cred::ssh_key(user, None, key, None);
                }
            }
            if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) && !helper_tried.replace(true) {
                if let Some(helper) = &self.credential_helper {
                    return self.ask_helper(helper, url, username);
                }
            }
            if allowed.contains(CredentialType::DEFAULT) {
                return Cred::default();
            }
            Err(git2::Error::from_str("no usable credentials"))
        });
        callbacks
    }

    fn ask_helper(
        &self,
        helper: &CredentialHelper,
        url: &str,
        username: Option<&str>,
    ) -> Result<Cred, git2::Error> {
        let (protocol, host) = protocol_and_host(url)
            .ok_or_else(|| git2::Error::from_str("cannot parse remote url"))?;
        match helper.get(&protocol, &host) {
            Ok(Some(Credentials {
                username: found_user,
                password: Some(password),
            })) => {
                let user = found_user.or_else(|| username.map(str::to_string)).unwrap_or_default();
                Cred::userpass_plaintext(&user, &password)
            }
            Ok(_) => Err(git2::Error::from_str("credential helper returned no password")),
            Err(e) => Err(git2::Error::from_str(&e.to_string())),
        }
    }
}

/// Remotes fetched and remotes skipped as invalid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub fetched: Vec<String>,
    pub skipped: Vec<String>,
}

/// Fetch every configured remote, pruning remote-tracking refs that no
/// longer exist upstream.
///
/// A remote that cannot be found or is misconfigured is skipped with a
/// warning. Any other failure stops the fetch.
pub fn fetch_remotes(repo: &GitRepository, ctx: &FetchContext) -> GitResult<FetchSummary> {
    let git = repo.raw();
    let names = git.remotes()?;
    let mut summary = FetchSummary::default();

    for name in names.iter().flatten() {
        debug!(remote = %name, "fetching remote");
        let mut remote = match git.find_remote(name) {
            Ok(remote) => remote,
            Err(e) if is_invalid_remote(&e) => {
                warn!(remote = %name, error = %e.message(), "remote {name} is not valid, considering it removed");
                summary.skipped.push(name.to_string());
                continue;
            }
            Err(e) => return Err(GitError::from_git2(e, name)),
        };

        let mut options = FetchOptions::new();
        options.remote_callbacks(ctx.callbacks()).prune(FetchPrune::On);

        match remote.fetch::<&str>(&[], Some(&mut options), None) {
            Ok(()) => {
                info!(remote = %name, "fetched");
                summary.fetched.push(name.to_string());
            }
            Err(e) if is_invalid_remote(&e) => {
                warn!(remote = %name, error = %e.message(), "remote {name} is not valid, considering it removed");
                summary.skipped.push(name.to_string());
            }
            Err(e) => {
                return Err(GitError::Internal {
                    message: format!("fetch {name}: {}", e.message()),
                })
            }
        }
    }

    Ok(summary)
}

fn is_invalid_remote(err: &git2::Error) -> bool {
    matches!(err.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec)
        || err.class() == ErrorClass::Config
}

/// Split a remote url into the credential protocol's `protocol` and `host`.
///
/// scp-style `user@host:path` urls are reported as `ssh`.
pub(crate) fn protocol_and_host(url: &str) -> Option<(String, String)> {
    let strip_user = |authority: &str| -> String {
        authority
            .rsplit_once('@')
            .map_or(authority, |(_, host)| host)
            .to_string()
    };

    if let Some((scheme, rest)) = url.split_once("://") {
        let authority = rest.split('/').next().unwrap_or(rest);
        let host = strip_user(authority);
        return (!host.is_empty()).then(|| (scheme.to_string(), host));
    }

    let (authority, _) = url.split_once(':')?;
    let host = strip_user(authority);
    (!host.is_empty() && !host.contains('/')).then(|| ("ssh".to_string(), host))
}
