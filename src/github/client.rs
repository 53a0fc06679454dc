use std::sync::Arc;

use serde::Deserialize;

use crate::error::{LinearizeError, Result};
use crate::io::HttpTransport;

/// Endpoints and credentials for talking to GitHub.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_base: String,
    pub codeload_base: String,
    /// Optional bearer token; raises the anonymous rate limit.
    pub token: Option<String>,
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            codeload_base: "https://codeload.github.com".to_string(),
            token: None,
            user_agent: concat!("ziplinear/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl GitHubConfig {
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Headers sent with every request.
    pub(crate) fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("User-Agent", self.user_agent.clone()),
            ("Accept", "application/vnd.github+json".to_string()),
        ];
        if let Some(token) = &self.token {
            headers.push(("Authorization", format!("Bearer {}", token)));
        }
        headers
    }
}

/// Head of a pull request: the branch and the repository that holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestHead {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub base_branch: Option<String>,
}

#[derive(Deserialize)]
struct RepositoryInfo {
    default_branch: Option<String>,
}

#[derive(Deserialize)]
struct PullRequestInfo {
    head: Option<PullRequestRef>,
    base: Option<PullRequestRef>,
}

#[derive(Deserialize)]
struct PullRequestRef {
    #[serde(rename = "ref")]
    git_ref: Option<String>,
    repo: Option<PullRequestRepo>,
}

#[derive(Deserialize)]
struct PullRequestRepo {
    name: String,
    owner: RepoOwner,
}

#[derive(Deserialize)]
struct RepoOwner {
    login: String,
}

/// Read-only client for the repository and pull request metadata endpoints.
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    config: GitHubConfig,
}

impl GitHubClient {
    pub fn new(transport: Arc<dyn HttpTransport>, config: GitHubConfig) -> Self {
        Self { transport, config }
    }

    /// The repository's default branch, `main` if the API omits it.
    pub async fn default_branch(&self, owner: &str, repo: &str) -> Result<String> {
        let url = format!("{}/repos/{}/{}", self.api_base(), owner, repo);
        let info: RepositoryInfo = self
            .get_json(&url)
            .await
            .map_err(|reason| {
                LinearizeError::UnresolvedBranch(format!(
                    "default branch of {}/{}: {}",
                    owner, repo, reason
                ))
            })?;

        let branch = info.default_branch.unwrap_or_else(|| "main".to_string());
        log::info!("Default branch of {}/{}: {}", owner, repo, branch);
        Ok(branch)
    }

    /// Look up the head branch of pull request `number`.
    ///
    /// Fork pull requests report the fork as the owning repository. When the
    /// fork has been deleted the base repository is kept.
    pub async fn pull_request_head(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestHead> {
        let unresolved = |reason: String| {
            LinearizeError::UnresolvedBranch(format!(
                "PR #{} of {}/{}: {}",
                number, owner, repo, reason
            ))
        };

        let url = format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_base(),
            owner,
            repo,
            number
        );
        let info: PullRequestInfo = self.get_json(&url).await.map_err(unresolved)?;

        let head = info
            .head
            .ok_or_else(|| unresolved("response has no head".to_string()))?;
        let branch = head
            .git_ref
            .filter(|b| !b.is_empty())
            .ok_or_else(|| unresolved("response has no head ref".to_string()))?;
        let (head_owner, head_repo) = match head.repo {
            Some(r) => (r.owner.login, r.name),
            None => (owner.to_string(), repo.to_string()),
        };
        let base_branch = info.base.and_then(|b| b.git_ref);

        log::info!(
            "PR #{}: head {}/{}@{} (base {})",
            number,
            head_owner,
            head_repo,
            branch,
            base_branch.as_deref().unwrap_or("unknown")
        );

        Ok(PullRequestHead {
            owner: head_owner,
            repo: head_repo,
            branch,
            base_branch,
        })
    }

    fn api_base(&self) -> &str {
        self.config.api_base.trim_end_matches('/')
    }

    /// GET a JSON document; the error is a human-readable reason.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, String> {
        log::debug!("Requesting {}", url);
        let headers = self.config.headers();
        let response = self
            .transport
            .get(url, &headers)
            .await
            .map_err(|err| format!("request to {} failed: {:#}", url, err))?;
        if !response.is_success() {
            return Err(format!("{} returned HTTP status {}", url, response.status));
        }
        serde_json::from_slice(&response.body)
            .map_err(|err| format!("{} returned malformed JSON: {}", url, err))
    }
}
