//! GitHub sources: URL parsing, ref resolution and archive download.
//!
//! ```text
//! "https://github.com/acme/widgets/pull/42"
//!     -> Source::PullRequest            (source.rs, pure)
//!     -> CanonicalReference             (resolver.rs, one API call)
//!     -> codeload ZIP URL + bytes       (reference.rs, fetcher.rs)
//! ```

mod client;
mod fetcher;
mod reference;
mod resolver;
mod source;

pub use client::{GitHubClient, GitHubConfig, PullRequestHead};
pub use fetcher::ArchiveFetcher;
pub use reference::CanonicalReference;
pub use resolver::{ResolvedSource, SourceResolver};
pub use source::Source;
