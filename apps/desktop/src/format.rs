use browser_core::IconResolution;
use shared::domain::FileInfo;

const KB: f64 = 1_000.0;
const MB: f64 = 1_000_000.0;
const GB: f64 = 1_000_000_000.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Decimal units, matching how disk and folder sizes are reported.
pub fn format_size(bytes: u64) -> String {
    let value = bytes as f64;
    if value >= GB {
        format!("{:.2} GB", value / GB)
    } else if value >= MB {
        format!("{:.1} MB", value / MB)
    } else {
        format!("{:.0} KB", value / KB)
    }
}

pub fn format_memory(bytes: u64) -> String {
    format!("{:.1} GB", bytes as f64 / GIB)
}

/// Application bundles are shown without their `.app` suffix.
pub fn display_name(file: &FileInfo) -> &str {
    if !file.extension.eq_ignore_ascii_case("app") {
        return &file.name;
    }
    let split = file.name.len().saturating_sub(4);
    match file.name.get(split..) {
        Some(suffix) if suffix.eq_ignore_ascii_case(".app") => &file.name[..split],
        _ => &file.name,
    }
}

pub fn icon_label(icon: &IconResolution) -> String {
    match icon {
        IconResolution::Directory => "dir".to_string(),
        IconResolution::CachedPreview(data) => format!("preview({}B)", data.len()),
        IconResolution::CategoryGlyph(category) => category.label().to_string(),
        IconResolution::GenericGlyph => "file".to_string(),
    }
}
