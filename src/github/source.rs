//! Classification of the user-supplied `source` argument.
//!
//! Parsing is an ordered list of path-shape rules over the URL; it performs
//! no I/O. Resolving a parsed source into something fetchable happens in
//! [`SourceResolver`](super::SourceResolver).

use std::path::PathBuf;

use url::Url;

use crate::error::{LinearizeError, Result};

const GITHUB_HOSTS: &[&str] = &["github.com", "www.github.com"];

/// What a `source` argument refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A path on the local filesystem, opened as-is.
    LocalPath(PathBuf),
    /// Repository root; the default branch has to be looked up.
    RepoRoot { owner: String, repo: String },
    /// Explicit branch, tag or commit. May contain `/`.
    RepoBranch {
        owner: String,
        repo: String,
        branch: String,
    },
    /// Pull request; the head branch has to be looked up.
    PullRequest {
        owner: String,
        repo: String,
        number: u64,
    },
}

impl Source {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let Some(url) = parse_url(trimmed)? else {
            return Ok(Source::LocalPath(PathBuf::from(trimmed)));
        };

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        if !GITHUB_HOSTS.contains(&host.as_str()) {
            return Err(invalid(trimmed, "not a GitHub URL"));
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|parts| parts.filter(|part| !part.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [] | [_] => Err(invalid(trimmed, "expected https://github.com/{owner}/{repo}")),
            [owner, repo] => Ok(Source::RepoRoot {
                owner: owner.to_string(),
                repo: strip_git_suffix(repo),
            }),
            [owner, repo, "tree", branch @ ..] => {
                if branch.is_empty() {
                    return Err(invalid(trimmed, "branch name missing after /tree"));
                }
                Ok(Source::RepoBranch {
                    owner: owner.to_string(),
                    repo: strip_git_suffix(repo),
                    branch: decode_segments(branch),
                })
            }
            [owner, repo, "pull", number] | [owner, repo, "pull", number, "files"] => {
                let number = number
                    .parse::<u64>()
                    .map_err(|_| invalid(trimmed, "pull request number is not numeric"))?;
                Ok(Source::PullRequest {
                    owner: owner.to_string(),
                    repo: strip_git_suffix(repo),
                    number,
                })
            }
            [_, _, "pull"] => Err(invalid(trimmed, "pull request number missing")),
            [owner, repo, "archive", rest @ ..] => {
                let branch = archive_ref(rest)
                    .ok_or_else(|| invalid(trimmed, "unrecognized archive link"))?;
                Ok(Source::RepoBranch {
                    owner: owner.to_string(),
                    repo: strip_git_suffix(repo),
                    branch,
                })
            }
            _ => Err(invalid(trimmed, "unrecognized GitHub URL shape")),
        }
    }
}

/// `None` when the input does not look like a URL at all.
fn parse_url(input: &str) -> Result<Option<Url>> {
    let lower = input.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        input.to_string()
    } else if GITHUB_HOSTS
        .iter()
        .any(|host| lower.starts_with(&format!("{}/", host)))
    {
        format!("https://{}", input)
    } else {
        return Ok(None);
    };

    Url::parse(&candidate)
        .map(Some)
        .map_err(|err| invalid(input, &err.to_string()))
}

fn strip_git_suffix(repo: &str) -> String {
    repo.strip_suffix(".git").unwrap_or(repo).to_string()
}

fn decode_segments(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|segment| {
            urlencoding::decode(segment)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| segment.to_string())
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// `refs/heads/{branch}.zip`, `refs/tags/{tag}.zip` or `{ref}.zip`.
fn archive_ref(rest: &[&str]) -> Option<String> {
    let rest = match rest {
        ["refs", "heads" | "tags", tail @ ..] => tail,
        other => other,
    };
    let (last, init) = rest.split_last()?;
    let last = last.strip_suffix(".zip")?;
    if last.is_empty() {
        return None;
    }
    let mut parts = init.to_vec();
    parts.push(last);
    Some(decode_segments(&parts))
}

fn invalid(input: &str, reason: &str) -> LinearizeError {
    LinearizeError::InvalidSource(format!("{}: {}", input, reason))
}
