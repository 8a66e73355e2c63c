//! Wiremock helpers for the GitHub releases API

use tasklog_update::{GitHubReleases, Release};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const OWNER: &str = "tasklog";
pub const REPO: &str = "tasklog";

/// Client pointed at a mock server URI for both API and web URLs
///
/// The blocking client owns its own runtime, so build, use and drop it
/// inside `spawn_blocking`.
pub fn github_client(uri: &str) -> GitHubReleases {
    GitHubReleases::new(OWNER, REPO)
        .unwrap()
        .with_api_url(uri)
        .with_web_url(uri)
}

/// Run a blocking closure off the async test runtime
pub async fn blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap()
}

fn releases_path() -> String {
    format!("/repos/{}/{}/releases", OWNER, REPO)
}

/// `GET /repos/{owner}/{repo}/releases/latest`
pub async fn mock_latest_release(server: &MockServer, release: &Release) {
    Mock::given(method("GET"))
        .and(path(format!("{}/latest", releases_path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(release))
        .mount(server)
        .await;
}

/// `GET /repos/{owner}/{repo}/releases`
pub async fn mock_release_list(server: &MockServer, releases: &[Release]) {
    Mock::given(method("GET"))
        .and(path(releases_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(releases))
        .mount(server)
        .await;
}

/// Any request under `route` answers with `status` and `body`
pub async fn mock_status(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Raw bytes at `route`
pub async fn mock_file(server: &MockServer, route: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content))
        .mount(server)
        .await;
}
