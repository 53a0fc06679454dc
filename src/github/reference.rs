use url::Url;

use crate::error::{LinearizeError, Result};

/// A repository at a concrete ref, ready to be downloaded.
///
/// `git_ref` is always a branch, tag or commit name. Pull request numbers are
/// resolved to their head branch before one of these is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalReference {
    pub owner: String,
    pub repo: String,
    pub git_ref: String,
    pub pull_request: Option<u64>,
}

impl CanonicalReference {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        git_ref: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            git_ref: git_ref.into(),
            pull_request: None,
        }
    }

    pub fn with_pull_request(mut self, number: u64) -> Self {
        self.pull_request = Some(number);
        self
    }

    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    /// ZIP archive URL on the codeload host, e.g.
    /// `https://codeload.github.com/acme/widgets/zip/release%2Fv2`.
    pub fn download_url(&self, codeload_base: &str) -> Result<Url> {
        let config_error = |reason: String| {
            LinearizeError::Config(format!("codeload base URL {}: {}", codeload_base, reason))
        };
        let mut url =
            Url::parse(codeload_base).map_err(|err| config_error(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| config_error("cannot hold a path".to_string()))?
            .pop_if_empty()
            .push(&self.owner)
            .push(&self.repo)
            .push("zip")
            .push(&self.git_ref);
        Ok(url)
    }

    /// Short label used for default output names: `{repo}-{ref}` with `/` flattened.
    pub fn slug(&self) -> String {
        format!("{}-{}", self.repo, self.git_ref.replace(['/', '\\'], "-"))
    }
}

impl std::fmt::Display for CanonicalReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.git_ref)?;
        if let Some(number) = self.pull_request {
            write!(f, " (PR #{})", number)?;
        }
        Ok(())
    }
}
