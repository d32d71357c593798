//! Supported hot-search platforms.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A platform whose hot-search ranking Trendlens can ingest.
///
/// The lowercase id returned by [`Platform::as_str`] is used everywhere a
/// machine-readable name is needed: CLI arguments, file names, and the
/// upstream endpoint table in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Weibo trending search
    Weibo,
    /// Douyin trending search
    Douyin,
    /// WeChat trending topics
    Wechat,
}

impl Platform {
    /// All supported platforms, in report order.
    pub const ALL: [Platform; 3] = [Platform::Weibo, Platform::Douyin, Platform::Wechat];

    /// Lowercase machine id (`weibo`, `douyin`, `wechat`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Weibo => "weibo",
            Platform::Douyin => "douyin",
            Platform::Wechat => "wechat",
        }
    }

    /// Human-readable label used in reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Weibo => "Weibo",
            Platform::Douyin => "Douyin",
            Platform::Wechat => "WeChat",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a supported platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPlatform(pub String);

impl fmt::Display for UnknownPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let supported: Vec<&str> = Platform::ALL.iter().map(|p| p.as_str()).collect();
        write!(
            f,
            "unsupported platform '{}'; supported platforms: {}",
            self.0,
            supported.join(", ")
        )
    }
}

impl std::error::Error for UnknownPlatform {}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weibo" => Ok(Platform::Weibo),
            "douyin" => Ok(Platform::Douyin),
            "wechat" => Ok(Platform::Wechat),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}
