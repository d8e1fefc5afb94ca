use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::{DiskStats, FileInfo, FolderStats, Location, QuickPaths, SystemStats};

pub mod config;
pub mod error;
pub mod file_kind;
pub mod layout;
pub mod mutation;
pub mod navigation;
pub mod preview_cache;
mod session;
pub mod transport;

pub use config::{load_settings, PanelSettings, SessionSettings};
pub use error::{MutationError, SettingsError, TransportError};
pub use file_kind::{resolve_icon, FileCategory, IconResolution};
pub use layout::{LayoutState, PanelAnchor, PanelId, PanelLayoutController, WidthBounds};
pub use mutation::{FileMutation, MutationOutcome, OptimisticMutationCoordinator};
pub use navigation::{HistoryState, NavigationController};
pub use preview_cache::{PreviewCache, PreviewData, PreviewLoadReport, PreviewPredicate};
pub use session::{SessionController, SessionEvent, SessionSnapshot, WindowAction};
pub use transport::HttpRemoteService;

/// Backend operations the session consumes. Every call may fail with an opaque error.
#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn get_quick_paths(&self) -> Result<QuickPaths>;
    async fn read_directory(&self, location: &Location) -> Result<Vec<FileInfo>>;
    async fn get_folder_stats(&self, location: &Location) -> Result<FolderStats>;
    async fn get_disk_stats(&self) -> Result<DiskStats>;
    async fn get_system_stats(&self) -> Result<SystemStats>;
    async fn get_file_preview(&self, location: &Location) -> Result<Vec<u8>>;
    async fn open_file(&self, location: &Location) -> Result<()>;
    async fn kill_process(&self, pid: u32) -> Result<()>;
    async fn rename_path(&self, from: &Location, to: &Location) -> Result<()>;
    async fn duplicate_path(&self, location: &Location) -> Result<()>;
    async fn delete_path(&self, location: &Location) -> Result<()>;
    async fn clear_stats_cache(&self) -> Result<()>;
}

/// Window chrome owned by the host shell.
#[async_trait]
pub trait WindowControls: Send + Sync {
    async fn close(&self) -> Result<()>;
    async fn minimize(&self) -> Result<()>;
    async fn toggle_maximize(&self) -> Result<()>;
}

pub struct MissingWindowControls;

#[async_trait]
impl WindowControls for MissingWindowControls {
    async fn close(&self) -> Result<()> {
        Err(anyhow!("window controls are unavailable"))
    }

    async fn minimize(&self) -> Result<()> {
        Err(anyhow!("window controls are unavailable"))
    }

    async fn toggle_maximize(&self) -> Result<()> {
        Err(anyhow!("window controls are unavailable"))
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
