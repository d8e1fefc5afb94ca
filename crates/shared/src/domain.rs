use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A browsable position: a directory path or one of the reserved virtual views.
///
/// Equality is exact string equality; no normalization is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(pub String);

impl Location {
    pub const ROOT: &'static str = "/";
    pub const SETTINGS: &'static str = "/settings";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn root() -> Self {
        Self::new(Self::ROOT)
    }

    pub fn settings() -> Self {
        Self::new(Self::SETTINGS)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }

    /// Virtual views are never listed through the backend.
    pub fn is_virtual(&self) -> bool {
        self.0 == Self::SETTINGS
    }

    /// Path of an entry named `name` living next to this one.
    pub fn sibling(&self, name: &str) -> Self {
        let trimmed = self.0.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(0) => Self(format!("/{name}")),
            Some(idx) => Self(format!("{}/{name}", &trimmed[..idx])),
            None => Self(name.to_string()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Location {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub path: Location,
    pub is_dir: bool,
    pub size: u64,
    /// Seconds since the unix epoch.
    pub last_modified: u64,
    pub extension: String,
}

impl FileInfo {
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.last_modified).ok()?;
        DateTime::from_timestamp(secs, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickPaths {
    pub home: Location,
    pub desktop: Location,
    pub documents: Location,
    pub downloads: Location,
    pub movies: Location,
    pub pictures: Location,
}

impl QuickPaths {
    pub fn entries(&self) -> [(&'static str, &Location); 6] {
        [
            ("Home", &self.home),
            ("Desktop", &self.desktop),
            ("Documents", &self.documents),
            ("Downloads", &self.downloads),
            ("Movies", &self.movies),
            ("Pictures", &self.pictures),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub documents: u64,
    pub photos: u64,
    pub videos: u64,
    pub audio: u64,
    pub apps: u64,
    #[serde(default)]
    pub archives: u64,
    pub other: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderStats {
    pub total_size: u64,
    pub file_count: u64,
    pub folder_count: u64,
    pub breakdown: CategoryBreakdown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskStats {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub cpu_usage: f32,
    pub memory: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub cpu_usage: f32,
    pub total_memory: u64,
    pub used_memory: u64,
    pub top_processes: Vec<ProcessInfo>,
}

impl SystemStats {
    pub fn memory_percent(&self) -> f32 {
        if self.total_memory == 0 {
            return 0.0;
        }
        (self.used_memory as f64 / self.total_memory as f64 * 100.0) as f32
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SidebarTab {
    #[default]
    Info,
    Activity,
}
