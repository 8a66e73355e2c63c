//! In-memory release source

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::Write;

use tasklog_update::{Release, ReleaseChannel, ReleaseSource, SourceError};

/// Serves fixed releases and files, recording every call
#[derive(Debug, Default)]
pub struct FakeSource {
    stable: Option<Release>,
    channels: HashMap<ReleaseChannel, Release>,
    files: HashMap<String, Vec<u8>>,
    release_calls: Cell<usize>,
    requested_channels: RefCell<Vec<ReleaseChannel>>,
    downloads: RefCell<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stable(mut self, release: Release) -> Self {
        self.stable = Some(release);
        self
    }

    pub fn with_channel(mut self, channel: ReleaseChannel, release: Release) -> Self {
        self.channels.insert(channel, release);
        self
    }

    pub fn with_file(mut self, url: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(url.into(), content.into());
        self
    }

    /// Calls to `latest_stable` and `latest_for_channel`
    pub fn release_calls(&self) -> usize {
        self.release_calls.get()
    }

    pub fn requested_channels(&self) -> Vec<ReleaseChannel> {
        self.requested_channels.borrow().clone()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.borrow().clone()
    }

    /// Release lookups plus downloads
    pub fn network_calls(&self) -> usize {
        self.release_calls() + self.downloads.borrow().len()
    }
}

impl ReleaseSource for FakeSource {
    fn latest_stable(&self) -> Result<Release, SourceError> {
        self.release_calls.set(self.release_calls.get() + 1);
        self.requested_channels
            .borrow_mut()
            .push(ReleaseChannel::Stable);
        self.stable.clone().ok_or(SourceError::Status {
            status: 404,
            body: "{\"message\":\"Not Found\"}".to_string(),
        })
    }

    fn latest_for_channel(&self, channel: ReleaseChannel) -> Result<Release, SourceError> {
        self.release_calls.set(self.release_calls.get() + 1);
        self.requested_channels.borrow_mut().push(channel);
        self.channels
            .get(&channel)
            .cloned()
            .ok_or(SourceError::NoMatchingRelease {
                channel: channel.to_string(),
            })
    }

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, SourceError> {
        self.downloads.borrow_mut().push(url.to_string());
        let content = self.files.get(url).ok_or(SourceError::Status {
            status: 404,
            body: "Not Found".to_string(),
        })?;
        sink.write_all(content)?;
        Ok(content.len() as u64)
    }

    fn release_web_url(&self, tag: &str) -> String {
        format!("https://github.com/tasklog/tasklog/releases/tag/{}", tag)
    }
}
