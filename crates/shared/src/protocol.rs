use serde::{Deserialize, Serialize};

use crate::domain::Location;

/// Command envelope understood by the backend's invoke endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum BackendRequest {
    GetQuickPaths,
    ReadDirectory { path: Location },
    GetFolderStats { path: Location },
    GetDiskStats,
    GetSystemStats,
    GetFilePreview { path: Location },
    OpenFile { path: Location },
    KillProcess { pid: u32 },
    RenamePath { old_path: Location, new_path: Location },
    DuplicatePath { path: Location },
    DeletePath { path: Location },
    ClearStatsCache,
}

impl BackendRequest {
    pub fn name(&self) -> &'static str {
        match self {
            BackendRequest::GetQuickPaths => "get_quick_paths",
            BackendRequest::ReadDirectory { .. } => "read_directory",
            BackendRequest::GetFolderStats { .. } => "get_folder_stats",
            BackendRequest::GetDiskStats => "get_disk_stats",
            BackendRequest::GetSystemStats => "get_system_stats",
            BackendRequest::GetFilePreview { .. } => "get_file_preview",
            BackendRequest::OpenFile { .. } => "open_file",
            BackendRequest::KillProcess { .. } => "kill_process",
            BackendRequest::RenamePath { .. } => "rename_path",
            BackendRequest::DuplicatePath { .. } => "duplicate_path",
            BackendRequest::DeletePath { .. } => "delete_path",
            BackendRequest::ClearStatsCache => "clear_stats_cache",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_tagged_with_command_name() {
        let request = BackendRequest::RenamePath {
            old_path: Location::new("/tmp/a"),
            new_path: Location::new("/tmp/b"),
        };
        let value = serde_json::to_value(&request).expect("encode");
        assert_eq!(value["command"], request.name());
        assert_eq!(value["old_path"], "/tmp/a");
        assert_eq!(value["new_path"], "/tmp/b");
    }

    #[test]
    fn unit_commands_carry_only_the_tag() {
        let value = serde_json::to_value(BackendRequest::GetSystemStats).expect("encode");
        assert_eq!(value, serde_json::json!({ "command": "get_system_stats" }));
    }
}
