// src/config/paths.rs

//! The path table: which source glob feeds which destination directory.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Logical asset groups, one per path table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetGroup {
    Styles,
    Scripts,
    Plugins,
    Images,
    Webp,
    Html,
    Favicons,
}

impl AssetGroup {
    pub const ALL: [AssetGroup; 7] = [
        AssetGroup::Styles,
        AssetGroup::Scripts,
        AssetGroup::Plugins,
        AssetGroup::Images,
        AssetGroup::Webp,
        AssetGroup::Html,
        AssetGroup::Favicons,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetGroup::Styles => "styles",
            AssetGroup::Scripts => "scripts",
            AssetGroup::Plugins => "plugins",
            AssetGroup::Images => "images",
            AssetGroup::Webp => "webp",
            AssetGroup::Html => "html",
            AssetGroup::Favicons => "favicons",
        }
    }
}

impl fmt::Display for AssetGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One row of the path table.
///
/// ```toml
/// [paths.scripts]
/// src = "src/js/main/*.js"
/// dest = "f/js"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathEntry {
    /// Source glob, relative to the project root. A leading `./` is ignored.
    pub src: String,

    /// Destination directory, relative to the project root.
    pub dest: PathBuf,

    /// Single entry file for groups compiled from one root (styles only).
    #[serde(default)]
    pub entry: Option<PathBuf>,
}

impl PathEntry {
    pub fn new(src: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
            entry: None,
        }
    }

    pub fn with_entry(mut self, entry: impl Into<PathBuf>) -> Self {
        self.entry = Some(entry.into());
        self
    }

    /// Destination directory resolved against the project root.
    pub fn dest_in(&self, root: &Path) -> PathBuf {
        root.join(&self.dest)
    }
}

/// Immutable mapping from asset group to its [`PathEntry`].
///
/// Built once at startup and shared read-only by every task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathTable {
    pub styles: PathEntry,
    pub scripts: PathEntry,
    pub plugins: PathEntry,
    pub images: PathEntry,
    pub webp: PathEntry,
    pub html: PathEntry,
    pub favicons: PathEntry,
}

impl Default for PathTable {
    fn default() -> Self {
        Self {
            styles: PathEntry::new("./src/sass/**/*.scss", "f/css")
                .with_entry("src/sass/main.scss"),
            scripts: PathEntry::new("./src/js/main/*.js", "f/js"),
            plugins: PathEntry::new("./src/js/plugins/*.js", "f/js"),
            images: PathEntry::new("./src/i/images/**/*", "f/i"),
            webp: PathEntry::new("./src/i/webp/**/*", "f/i/webp"),
            html: PathEntry::new("./src/html/**/*", "."),
            favicons: PathEntry::new("./src/i/favicon/*", "f/i/favicons"),
        }
    }
}

impl PathTable {
    pub fn get(&self, group: AssetGroup) -> &PathEntry {
        match group {
            AssetGroup::Styles => &self.styles,
            AssetGroup::Scripts => &self.scripts,
            AssetGroup::Plugins => &self.plugins,
            AssetGroup::Images => &self.images,
            AssetGroup::Webp => &self.webp,
            AssetGroup::Html => &self.html,
            AssetGroup::Favicons => &self.favicons,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssetGroup, &PathEntry)> {
        AssetGroup::ALL.into_iter().map(move |g| (g, self.get(g)))
    }
}
