//! GitHub releases lookup and asset download

use reqwest::blocking::{Client, Response};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::time::Duration;
use tracing::debug;

use crate::channel::ReleaseChannel;
use crate::error::SourceError;

/// Timeout for API calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for asset downloads, which stream whole binaries
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Versioned JSON media type of the GitHub REST API
const GITHUB_JSON: &str = "application/vnd.github.v3+json";

/// Release information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Release {
    /// Release tag (e.g., "v1.2.0")
    pub tag_name: String,

    /// Release name
    #[serde(default)]
    pub name: Option<String>,

    /// Release body (changelog)
    #[serde(default)]
    pub body: Option<String>,

    /// Whether this is a prerelease
    #[serde(default)]
    pub prerelease: bool,

    /// Whether this is a draft
    #[serde(default)]
    pub draft: bool,

    /// Release assets
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// Release asset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseAsset {
    /// Asset name
    pub name: String,

    /// Download URL
    pub browser_download_url: String,
}

impl Release {
    /// Tag without the leading `v`
    pub fn version_tag(&self) -> &str {
        self.tag_name.strip_prefix('v').unwrap_or(&self.tag_name)
    }

    /// Whether the tag carries `-<label>` (`v1.0.0-alpha.1` matches `alpha`)
    pub fn matches_channel(&self, label: &str) -> bool {
        self.version_tag().contains(&format!("-{}", label))
    }
}

/// Pick the release a channel should receive from a newest-first list
///
/// Drafts never qualify. The stable channel takes the first non-prerelease;
/// other channels take the first tag matching their label.
pub fn select_for_channel<I>(releases: I, channel: ReleaseChannel) -> Option<Release>
where
    I: IntoIterator<Item = Release>,
{
    releases.into_iter().filter(|r| !r.draft).find(|r| {
        if channel.is_stable() {
            !r.prerelease
        } else {
            r.matches_channel(channel.prerelease_label())
        }
    })
}

/// Where releases come from
///
/// Implementations perform no retries; a failed call surfaces as
/// [`SourceError`] and the caller decides what to do with it.
pub trait ReleaseSource {
    /// Newest non-draft, non-prerelease release
    fn latest_stable(&self) -> Result<Release, SourceError>;

    /// Newest non-draft release on the given channel
    fn latest_for_channel(&self, channel: ReleaseChannel) -> Result<Release, SourceError>;

    /// Stream a remote resource into `sink`, returning the byte count
    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, SourceError>;

    /// Web page of a release, for display
    fn release_web_url(&self, tag: &str) -> String;
}

/// Release source backed by the GitHub REST API
pub struct GitHubReleases {
    client: Client,
    owner: String,
    repo: String,
    api_url: String,
    web_url: String,
    download_timeout: Duration,
}

impl GitHubReleases {
    /// Create a client for `owner/repo` with the default timeout
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Result<Self, SourceError> {
        Self::with_timeout(owner, repo, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom API timeout
    pub fn with_timeout(
        owner: impl Into<String>,
        repo: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(user_agent())
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            owner: owner.into(),
            repo: repo.into(),
            api_url: "https://api.github.com".to_string(),
            web_url: "https://github.com".to_string(),
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
        })
    }

    /// Override the API base URL (GitHub Enterprise, tests)
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the web base URL used for release links
    pub fn with_web_url(mut self, url: impl Into<String>) -> Self {
        self.web_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn releases_url(&self) -> String {
        format!("{}/repos/{}/{}/releases", self.api_url, self.owner, self.repo)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        debug!("Fetching {}", url);

        let response = self.client.get(url).header(ACCEPT, GITHUB_JSON).send()?;
        let body = ensure_success(response)?.text()?;

        serde_json::from_str(&body).map_err(|source| SourceError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl ReleaseSource for GitHubReleases {
    fn latest_stable(&self) -> Result<Release, SourceError> {
        let url = format!("{}/latest", self.releases_url());
        self.get_json(&url)
    }

    fn latest_for_channel(&self, channel: ReleaseChannel) -> Result<Release, SourceError> {
        let releases: Vec<Release> = self.get_json(&self.releases_url())?;
        debug!(
            "Received {} releases, selecting for channel {}",
            releases.len(),
            channel
        );

        select_for_channel(releases, channel).ok_or_else(|| SourceError::NoMatchingRelease {
            channel: channel.to_string(),
        })
    }

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, SourceError> {
        debug!("Downloading {}", url);

        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()?;
        let mut response = ensure_success(response)?;

        let written = io::copy(&mut response, sink)?;
        debug!("Downloaded {} bytes", written);
        Ok(written)
    }

    fn release_web_url(&self, tag: &str) -> String {
        format!(
            "{}/{}/{}/releases/tag/{}",
            self.web_url, self.owner, self.repo, tag
        )
    }
}

/// Turn a non-2xx response into [`SourceError::Status`] carrying the body
fn ensure_success(response: Response) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(SourceError::Status {
        status: status.as_u16(),
        body,
    })
}

fn user_agent() -> String {
    format!(
        "tasklog/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(tag: &str, prerelease: bool, draft: bool) -> Release {
        Release {
            tag_name: tag.to_string(),
            prerelease,
            draft,
            ..Default::default()
        }
    }

    #[test]
    fn test_matches_channel() {
        assert!(release("v1.0.0-alpha.1", true, false).matches_channel("alpha"));
        assert!(release("1.0.0-rc.2", true, false).matches_channel("rc"));
        assert!(!release("v1.0.0-beta", true, false).matches_channel("alpha"));
        assert!(!release("v1.0.0", false, false).matches_channel("rc"));
    }

    #[test]
    fn test_select_skips_drafts() {
        let releases = vec![
            release("v2.0.0-beta.1", true, true),
            release("v1.9.0-beta.3", true, false),
            release("v1.8.0", false, false),
        ];

        let selected = select_for_channel(releases.clone(), ReleaseChannel::Beta).unwrap();
        assert_eq!(selected.tag_name, "v1.9.0-beta.3");

        let selected = select_for_channel(releases, ReleaseChannel::Stable).unwrap();
        assert_eq!(selected.tag_name, "v1.8.0");
    }

    #[test]
    fn test_select_no_match() {
        let releases = vec![release("v1.0.0", false, false)];
        assert!(select_for_channel(releases, ReleaseChannel::Rc).is_none());
    }

    #[test]
    fn test_release_web_url() {
        let source = GitHubReleases::new("tasklog", "tasklog")
            .unwrap()
            .with_web_url("https://github.example.com/");
        assert_eq!(
            source.release_web_url("v1.2.0"),
            "https://github.example.com/tasklog/tasklog/releases/tag/v1.2.0"
        );
    }
}
