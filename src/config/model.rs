// src/config/model.rs

use serde::Deserialize;

use crate::config::paths::PathTable;
use crate::engine::TriggerWhileRunningBehaviour;

/// Complete build configuration.
///
/// Every field has a built-in default, so an absent config file (the normal
/// case) and an empty one produce the same result. A file only needs the
/// sections it overrides:
///
/// ```toml
/// [paths.html]
/// src = "pages/**/*"
/// dest = "."
///
/// [favicons]
/// app_name = "My site"
///
/// [watch]
/// debounce_ms = 250
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub paths: PathTable,
    pub favicons: FaviconSettings,
    pub scripts: ScriptSettings,
    pub images: ImageSettings,
    pub watch: WatchSettings,
}

/// `[favicons]` section: application metadata and icon variants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FaviconSettings {
    pub app_name: String,
    pub app_description: String,
    pub lang: String,
    /// Background colour for flattened icons and the manifest, `#rrggbb`.
    pub background: String,
    pub theme_color: String,
    pub icons: IconToggles,
}

impl Default for FaviconSettings {
    fn default() -> Self {
        Self {
            app_name: "Название".to_string(),
            app_description: "Описание".to_string(),
            lang: "ru".to_string(),
            background: "#1d1d1d".to_string(),
            theme_color: "#fff".to_string(),
            icons: IconToggles::default(),
        }
    }
}

/// `[favicons.icons]`: which icon families to generate.
///
/// Only `favicons`, `apple_icon` and `android` can be generated; the other
/// switches exist so a config can state them explicitly and must stay off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconToggles {
    pub favicons: bool,
    pub apple_icon: bool,
    pub android: bool,
    pub windows: bool,
    pub yandex: bool,
    pub coast: bool,
    pub firefox: bool,
    pub apple_startup: bool,
}

impl Default for IconToggles {
    fn default() -> Self {
        Self {
            favicons: true,
            apple_icon: true,
            android: true,
            windows: false,
            yandex: false,
            coast: false,
            firefox: false,
            apple_startup: false,
        }
    }
}

impl IconToggles {
    /// Names of enabled variants this tool cannot produce.
    pub fn unsupported_enabled(&self) -> Vec<&'static str> {
        [
            ("windows", self.windows),
            ("yandex", self.yandex),
            ("coast", self.coast),
            ("firefox", self.firefox),
            ("apple_startup", self.apple_startup),
        ]
        .into_iter()
        .filter(|(_, on)| *on)
        .map(|(name, _)| name)
        .collect()
    }
}

/// `[scripts]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptSettings {
    /// Shell command run on each script before it is lowered to ES5 (source
    /// on stdin, result on stdout). `None` skips the filter.
    pub transpile_cmd: Option<String>,
}

/// `[images]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageSettings {
    pub jpeg_quality: u8,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self { jpeg_quality: 75 }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchSettings {
    /// Window in which filesystem events are coalesced into one trigger.
    pub debounce_ms: u64,

    /// Only trigger when the aggregate content hash of a binding's files
    /// actually changed.
    pub use_hash: bool,

    pub triggered_while_running_behaviour: TriggerWhileRunningBehaviour,

    /// Maximum number of queued re-runs to remember.
    pub queue_length: usize,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            use_hash: false,
            triggered_while_running_behaviour: TriggerWhileRunningBehaviour::Queue,
            queue_length: 1,
        }
    }
}
