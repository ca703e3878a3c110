use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;
use thiserror::Error;

/// Hosting platforms a [`VideoAsset`](crate::db::VideoAsset) can live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Vimeo,
    Cloudflare,
    Drive,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported video platform: {0}")]
pub struct UnsupportedPlatform(pub String);

impl Platform {
    pub fn all() -> &'static [Platform] {
        &[
            Platform::Youtube,
            Platform::Vimeo,
            Platform::Cloudflare,
            Platform::Drive,
        ]
    }

    /// Stored identifier, as found in the `platform` column.
    pub fn code(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Vimeo => "vimeo",
            Platform::Cloudflare => "cloudflare",
            Platform::Drive => "drive",
        }
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Youtube => "YouTube",
            Platform::Vimeo => "Vimeo",
            Platform::Cloudflare => "Cloudflare Stream",
            Platform::Drive => "Google Drive",
        }
    }

    /// Standalone page URL on the hosting platform.
    ///
    /// Cloudflare and Drive pages have no offset parameter, so
    /// `start_seconds` is ignored for them. An offset of zero is no offset.
    pub fn watch_url(&self, external_id: &str, start_seconds: Option<u32>) -> String {
        match (self, start_seconds.filter(|s| *s > 0)) {
            (Platform::Youtube, Some(s)) => {
                format!("https://www.youtube.com/watch?v={external_id}&t={s}s")
            }
            (Platform::Youtube, None) => format!("https://www.youtube.com/watch?v={external_id}"),
            (Platform::Vimeo, Some(s)) => format!("https://vimeo.com/{external_id}#t={s}s"),
            (Platform::Vimeo, None) => format!("https://vimeo.com/{external_id}"),
            (Platform::Cloudflare, _) => format!("https://cloudflarestream.com/{external_id}"),
            (Platform::Drive, _) => format!("https://drive.google.com/file/d/{external_id}/view"),
        }
    }

    /// Iframe-embeddable player URL.
    ///
    /// The Drive `t` parameter is best-effort: the player may ignore it.
    pub fn embed_url(&self, external_id: &str, start_seconds: Option<u32>) -> String {
        let base = match self {
            Platform::Youtube => format!("https://www.youtube.com/embed/{external_id}"),
            Platform::Vimeo => format!("https://player.vimeo.com/video/{external_id}"),
            Platform::Cloudflare => format!("https://iframe.cloudflarestream.com/{external_id}"),
            Platform::Drive => format!("https://drive.google.com/file/d/{external_id}/preview"),
        };

        let Some(s) = start_seconds.filter(|s| *s > 0) else {
            return base;
        };

        match self {
            Platform::Youtube => format!("{base}?start={s}"),
            Platform::Vimeo => format!("{base}#t={s}s"),
            Platform::Cloudflare => format!("{base}?startTime={s}"),
            Platform::Drive => format!("{base}?t={s}s"),
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::Youtube
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Platform {
    type Err = UnsupportedPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "youtube" => Ok(Platform::Youtube),
            "vimeo" => Ok(Platform::Vimeo),
            "cloudflare" => Ok(Platform::Cloudflare),
            "drive" => Ok(Platform::Drive),
            _ => Err(UnsupportedPlatform(s.to_string())),
        }
    }
}

/// Watch URL for a platform given by name. `None` when the platform is not supported.
pub fn watch_url(platform: &str, external_id: &str, start_seconds: Option<u32>) -> Option<String> {
    platform
        .parse::<Platform>()
        .ok()
        .map(|p| p.watch_url(external_id, start_seconds))
}

/// Embed URL for a platform given by name. `None` when the platform is not supported.
pub fn embed_url(platform: &str, external_id: &str, start_seconds: Option<u32>) -> Option<String> {
    platform
        .parse::<Platform>()
        .ok()
        .map(|p| p.embed_url(external_id, start_seconds))
}
