//! Builder patterns for test data construction

use tasklog_update::releases::{Release, ReleaseAsset};

use super::constants::*;

/// Builder for Release objects with sensible test defaults
#[derive(Debug, Clone)]
pub struct ReleaseBuilder {
    tag_name: String,
    body: Option<String>,
    prerelease: bool,
    draft: bool,
    assets: Vec<ReleaseAsset>,
}

impl ReleaseBuilder {
    pub fn new() -> Self {
        Self {
            tag_name: TAG_V1_0_0.to_string(),
            body: None,
            prerelease: false,
            draft: false,
            assets: Vec::new(),
        }
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag_name = tag.to_string();
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn prerelease(mut self) -> Self {
        self.prerelease = true;
        self
    }

    pub fn draft(mut self) -> Self {
        self.draft = true;
        self
    }

    pub fn asset(mut self, asset: ReleaseAsset) -> Self {
        self.assets.push(asset);
        self
    }

    /// Binary for the test platform plus one for another platform
    pub fn with_standard_assets(self) -> Self {
        self.asset(ReleaseAssetBuilder::binary(TEST_ASSET).build())
            .asset(ReleaseAssetBuilder::binary(OTHER_ASSET).build())
    }

    /// `<asset>.sha256` next to the test platform binary
    pub fn with_checksum_file(self) -> Self {
        let name = format!("{}.sha256", TEST_ASSET);
        self.asset(ReleaseAssetBuilder::binary(&name).build())
    }

    pub fn build(self) -> Release {
        Release {
            name: Some(self.tag_name.clone()),
            tag_name: self.tag_name,
            body: self.body,
            prerelease: self.prerelease,
            draft: self.draft,
            assets: self.assets,
        }
    }
}

impl Default for ReleaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for ReleaseAsset objects
#[derive(Debug, Clone)]
pub struct ReleaseAssetBuilder {
    name: String,
    url: String,
}

impl ReleaseAssetBuilder {
    /// Asset served from [`DOWNLOAD_BASE`]
    pub fn binary(name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: download_url(name),
        }
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    pub fn build(self) -> ReleaseAsset {
        ReleaseAsset {
            name: self.name,
            browser_download_url: self.url,
        }
    }
}

/// Gzipped tarball holding `entries` as executable regular files
pub fn tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, name, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}
