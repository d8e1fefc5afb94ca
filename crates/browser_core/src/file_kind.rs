//! Extension classification and icon resolution order.

use std::collections::HashMap;

use shared::domain::{FileInfo, Location};

use crate::preview_cache::PreviewData;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "svg", "webp", "bmp", "ico"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac"];
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt", "md"];
const APP_EXTENSION: &str = "app";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    Photos,
    Videos,
    Audio,
    Documents,
    Apps,
    Other,
}

impl FileCategory {
    pub fn from_extension(extension: &str) -> Self {
        let ext = extension.to_ascii_lowercase();
        let ext = ext.as_str();
        if IMAGE_EXTENSIONS.contains(&ext) {
            FileCategory::Photos
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            FileCategory::Videos
        } else if AUDIO_EXTENSIONS.contains(&ext) {
            FileCategory::Audio
        } else if DOCUMENT_EXTENSIONS.contains(&ext) {
            FileCategory::Documents
        } else if ext == APP_EXTENSION {
            FileCategory::Apps
        } else {
            FileCategory::Other
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileCategory::Photos => "photos",
            FileCategory::Videos => "videos",
            FileCategory::Audio => "audio",
            FileCategory::Documents => "documents",
            FileCategory::Apps => "apps",
            FileCategory::Other => "other",
        }
    }
}

/// Default preview predicate: application bundles and raster/vector images.
pub fn is_previewable(file: &FileInfo) -> bool {
    if file.is_dir {
        return false;
    }
    matches!(
        FileCategory::from_extension(&file.extension),
        FileCategory::Photos | FileCategory::Apps
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconResolution {
    Directory,
    CachedPreview(PreviewData),
    CategoryGlyph(FileCategory),
    GenericGlyph,
}

/// Picks the icon for `file`, trying directory, cached preview, category glyph,
/// then the generic glyph, in that order.
pub fn resolve_icon(file: &FileInfo, previews: &HashMap<Location, PreviewData>) -> IconResolution {
    if file.is_dir {
        return IconResolution::Directory;
    }
    if let Some(data) = previews.get(&file.path) {
        return IconResolution::CachedPreview(data.clone());
    }
    match FileCategory::from_extension(&file.extension) {
        FileCategory::Other => IconResolution::GenericGlyph,
        category => IconResolution::CategoryGlyph(category),
    }
}
