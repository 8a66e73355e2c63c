//! Release channel selection

use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::version::SemanticVersion;

/// Release track an installation follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReleaseChannel {
    #[default]
    Stable,
    Alpha,
    Beta,
    Rc,
}

impl ReleaseChannel {
    /// Channel named by a pre-release label; unknown labels mean stable
    pub fn from_prerelease_label(label: &str) -> Self {
        match label {
            "alpha" => ReleaseChannel::Alpha,
            "beta" => ReleaseChannel::Beta,
            "rc" => ReleaseChannel::Rc,
            _ => ReleaseChannel::Stable,
        }
    }

    /// Decide which channel to query
    ///
    /// An explicit pre-release channel is used as-is. With no override (or
    /// `stable`), a running pre-release keeps following its own track so
    /// people testing `alpha` builds keep receiving them.
    pub fn resolve(configured: Option<&str>, current: &SemanticVersion) -> Self {
        let configured = configured.map(str::trim).filter(|c| !c.is_empty());

        if let Some(name) = configured {
            match name.parse::<ReleaseChannel>() {
                Ok(ReleaseChannel::Stable) => {}
                Ok(channel) => return channel,
                Err(_) => warn!("Ignoring unknown release channel {:?}", name),
            }
        }

        let channel = Self::from_prerelease_label(current.prerelease_channel());
        debug!(
            "Resolved release channel {} (configured: {:?}, current: {})",
            channel, configured, current
        );
        channel
    }

    /// Label matched against tags (`-alpha`, `-beta`, `-rc`); empty for stable
    pub fn prerelease_label(&self) -> &'static str {
        match self {
            ReleaseChannel::Stable => "",
            ReleaseChannel::Alpha => "alpha",
            ReleaseChannel::Beta => "beta",
            ReleaseChannel::Rc => "rc",
        }
    }

    pub fn is_stable(&self) -> bool {
        *self == ReleaseChannel::Stable
    }
}

impl FromStr for ReleaseChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "stable" => Ok(ReleaseChannel::Stable),
            "alpha" => Ok(ReleaseChannel::Alpha),
            "beta" => Ok(ReleaseChannel::Beta),
            "rc" => Ok(ReleaseChannel::Rc),
            other => Err(format!(
                "unknown release channel '{}' (expected stable, alpha, beta or rc)",
                other
            )),
        }
    }
}

impl fmt::Display for ReleaseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseChannel::Stable => write!(f, "stable"),
            other => write!(f, "{}", other.prerelease_label()),
        }
    }
}
