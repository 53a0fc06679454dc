use std::path::PathBuf;

use crate::error::{LinearizeError, Result};

use super::client::GitHubClient;
use super::reference::CanonicalReference;
use super::source::Source;

/// Outcome of resolving a `source` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSource {
    /// A local archive for the filesystem collaborator to open.
    Local(PathBuf),
    /// A repository at a concrete ref.
    Remote(CanonicalReference),
}

/// Turns a `source` argument into a local path or a fetchable reference.
///
/// Performs at most one metadata request (default branch or pull request
/// head) and never retries; retry policy belongs to the transport.
pub struct SourceResolver<'a> {
    client: &'a GitHubClient,
}

impl<'a> SourceResolver<'a> {
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    pub async fn resolve(&self, input: &str) -> Result<ResolvedSource> {
        match Source::parse(input)? {
            Source::LocalPath(path) => {
                if !path.is_file() {
                    return Err(LinearizeError::InvalidSource(format!(
                        "{} is not a readable file or a GitHub URL",
                        path.display()
                    )));
                }
                Ok(ResolvedSource::Local(path))
            }
            Source::RepoRoot { owner, repo } => {
                let branch = self.client.default_branch(&owner, &repo).await?;
                Ok(ResolvedSource::Remote(CanonicalReference::new(owner, repo, branch)))
            }
            Source::RepoBranch {
                owner,
                repo,
                branch,
            } => Ok(ResolvedSource::Remote(CanonicalReference::new(owner, repo, branch))),
            Source::PullRequest {
                owner,
                repo,
                number,
            } => {
                log::info!("Pull request #{} detected", number);
                let head = self.client.pull_request_head(&owner, &repo, number).await?;
                Ok(ResolvedSource::Remote(
                    CanonicalReference::new(head.owner, head.repo, head.branch)
                        .with_pull_request(number),
                ))
            }
        }
    }
}
