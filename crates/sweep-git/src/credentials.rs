//! Credential lookup through git's credential-helper protocol.
//!
//! The helper named by `credential.helper` is run as
//! `git credential-<helper> get` (or directly, when configured with an
//! absolute path). It receives `protocol=` and `host=` lines on stdin and
//! answers with `key=value` lines.

use std::collections::HashMap;
use std::io::Write;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::error::{GitError, GitResult};

/// The pieces of a credential a transport may ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    Username,
    Password,
}

/// Credentials returned by a helper. Either half may be missing.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A configured git credential helper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialHelper {
    helper: String,
}

impl CredentialHelper {
    const SUPPORTED: &'static [CredentialKind] = &[CredentialKind::Username, CredentialKind::Password];

    /// Wrap the value of `credential.helper`.
    pub fn new(helper: impl Into<String>) -> Self {
        Self {
            helper: helper.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.helper
    }

    /// Returns `true` if this helper can supply every kind in `kinds`.
    pub fn supports(&self, kinds: &[CredentialKind]) -> bool {
        kinds.iter().all(|k| Self::SUPPORTED.contains(k))
    }

    fn command(&self) -> GitResult<Command> {
        let mut words = self.helper.split_whitespace();
        let program = words.next().ok_or_else(|| GitError::CredentialHelper {
            helper: self.helper.clone(),
            message: "empty helper".into(),
        })?;
        let mut cmd = if program.starts_with('/') {
            Command::new(program)
        } else {
            let mut git = Command::new("git");
            git.arg(format!("credential-{program}"));
            git
        };
        cmd.args(words).arg("get");
        Ok(cmd)
    }

    /// Ask the helper for credentials for `protocol://host`.
    ///
    /// A helper that exits non-zero yields `Ok(None)` after a warning; only
    /// failing to run it at all is an error.
    pub fn get(&self, protocol: &str, host: &str) -> GitResult<Option<Credentials>> {
        debug!(helper = %self.helper, protocol, host, "looking up credentials");
        let failed = |message: String| GitError::CredentialHelper {
            helper: self.helper.clone(),
            message,
        };

        let mut child = self
            .command()?
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| failed(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            writeln!(stdin, "protocol={protocol}")
                .and_then(|_| writeln!(stdin, "host={host}"))
                .map_err(|e| failed(e.to_string()))?;
        }

        let output = child.wait_with_output().map_err(|e| failed(e.to_string()))?;
        if !output.status.success() {
            warn!(helper = %self.helper, status = %output.status, "git credential helper failed");
            return Ok(None);
        }

        Ok(Some(parse_response(&String::from_utf8_lossy(&output.stdout))))
    }
}

/// Parse `key=value` lines; anything else is ignored.
pub(crate) fn parse_response(text: &str) -> Credentials {
    let mut fields: HashMap<&str, &str> = text
        .lines()
        .filter_map(|line| line.split_once('='))
        .collect();
    Credentials {
        username: fields.remove("username").map(str::to_string),
        password: fields.remove("password").map(str::to_string),
    }
}
