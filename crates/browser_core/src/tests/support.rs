use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Duration,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::{
    DiskStats, FileInfo, FolderStats, Location, ProcessInfo, QuickPaths, SystemStats,
};
use tokio::sync::{broadcast, Mutex, Notify};

use crate::{RemoteService, SessionEvent, WindowControls};

pub(crate) fn file(path: &str, extension: &str) -> FileInfo {
    FileInfo {
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        path: Location::new(path),
        is_dir: false,
        size: 1024,
        last_modified: 1_700_000_000,
        extension: extension.to_string(),
    }
}

pub(crate) fn dir(path: &str) -> FileInfo {
    FileInfo {
        is_dir: true,
        extension: String::new(),
        ..file(path, "")
    }
}

pub(crate) fn images(prefix: &str, count: usize) -> Vec<FileInfo> {
    (0..count)
        .map(|idx| file(&format!("{prefix}/img{idx:03}.png"), "png"))
        .collect()
}

pub(crate) fn process(pid: u32, name: &str) -> ProcessInfo {
    ProcessInfo {
        pid,
        name: name.to_string(),
        cpu_usage: 1.5,
        memory: 4096,
    }
}

pub(crate) fn quick_paths(home: &str) -> QuickPaths {
    QuickPaths {
        home: Location::new(home),
        desktop: Location::new(format!("{home}/Desktop")),
        documents: Location::new(format!("{home}/Documents")),
        downloads: Location::new(format!("{home}/Downloads")),
        movies: Location::new(format!("{home}/Movies")),
        pictures: Location::new(format!("{home}/Pictures")),
    }
}

/// Waits for the first event matching `pred`, failing the test after two seconds.
pub(crate) async fn wait_for_event(
    events: &mut broadcast::Receiver<SessionEvent>,
    pred: impl Fn(&SessionEvent) -> bool,
) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match events.recv().await {
                Ok(event) if pred(&event) => return event,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for session event")
}

/// Scriptable backend recording every call it receives.
pub(crate) struct FakeRemote {
    pub quick_paths: Option<QuickPaths>,
    pub directories: Mutex<HashMap<Location, Vec<FileInfo>>>,
    pub directory_delays: HashMap<Location, Duration>,
    pub folder_stats: Option<FolderStats>,
    pub disk_stats: Option<DiskStats>,
    pub system_stats: Mutex<Option<SystemStats>>,
    pub failing_previews: HashSet<Location>,
    pub preview_delay: Duration,
    pub fail_kill_with: Option<String>,
    /// When set, `kill_process` waits for a permit before answering.
    pub kill_gate: Option<Arc<Notify>>,
    pub fail_mutations_with: Option<String>,
    pub fail_open_with: Option<String>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub preview_log: Arc<Mutex<Vec<String>>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self {
            quick_paths: Some(quick_paths("/Users/alice")),
            directories: Mutex::new(HashMap::new()),
            directory_delays: HashMap::new(),
            folder_stats: Some(FolderStats {
                total_size: 4096,
                file_count: 3,
                folder_count: 1,
                ..FolderStats::default()
            }),
            disk_stats: Some(DiskStats {
                total_bytes: 1000,
                used_bytes: 600,
                free_bytes: 400,
            }),
            system_stats: Mutex::new(None),
            failing_previews: HashSet::new(),
            preview_delay: Duration::from_millis(5),
            fail_kill_with: None,
            kill_gate: None,
            fail_mutations_with: None,
            fail_open_with: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            preview_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_directory(self, location: &str, entries: Vec<FileInfo>) -> Self {
        self.directories
            .try_lock()
            .expect("uncontended during setup")
            .insert(Location::new(location), entries);
        self
    }

    pub fn with_system_stats(self, stats: SystemStats) -> Self {
        *self
            .system_stats
            .try_lock()
            .expect("uncontended during setup") = Some(stats);
        self
    }

    pub async fn calls_named(&self, prefix: &str) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| call.starts_with(prefix))
            .cloned()
            .collect()
    }

    async fn record(&self, call: String) {
        self.calls.lock().await.push(call);
    }
}

#[async_trait]
impl RemoteService for FakeRemote {
    async fn get_quick_paths(&self) -> Result<QuickPaths> {
        self.record("get_quick_paths".into()).await;
        self.quick_paths
            .clone()
            .ok_or_else(|| anyhow!("backend unavailable"))
    }

    async fn read_directory(&self, location: &Location) -> Result<Vec<FileInfo>> {
        self.record(format!("read_directory:{location}")).await;
        if let Some(delay) = self.directory_delays.get(location) {
            tokio::time::sleep(*delay).await;
        }
        self.directories
            .lock()
            .await
            .get(location)
            .cloned()
            .ok_or_else(|| anyhow!("no such directory: {location}"))
    }

    async fn get_folder_stats(&self, location: &Location) -> Result<FolderStats> {
        self.record(format!("get_folder_stats:{location}")).await;
        self.folder_stats
            .clone()
            .ok_or_else(|| anyhow!("stats unavailable"))
    }

    async fn get_disk_stats(&self) -> Result<DiskStats> {
        self.record("get_disk_stats".into()).await;
        self.disk_stats.ok_or_else(|| anyhow!("disk stats unavailable"))
    }

    async fn get_system_stats(&self) -> Result<SystemStats> {
        self.record("get_system_stats".into()).await;
        self.system_stats
            .lock()
            .await
            .clone()
            .ok_or_else(|| anyhow!("system stats unavailable"))
    }

    async fn get_file_preview(&self, location: &Location) -> Result<Vec<u8>> {
        self.record(format!("get_file_preview:{location}")).await;
        self.preview_log.lock().await.push(format!("start:{location}"));
        tokio::time::sleep(self.preview_delay).await;
        self.preview_log.lock().await.push(format!("end:{location}"));
        if self.failing_previews.contains(location) {
            return Err(anyhow!("No preview available"));
        }
        Ok(format!("preview:{location}").into_bytes())
    }

    async fn open_file(&self, location: &Location) -> Result<()> {
        self.record(format!("open_file:{location}")).await;
        match &self.fail_open_with {
            Some(reason) => Err(anyhow!(reason.clone())),
            None => Ok(()),
        }
    }

    async fn kill_process(&self, pid: u32) -> Result<()> {
        self.record(format!("kill_process:{pid}")).await;
        if let Some(gate) = &self.kill_gate {
            gate.notified().await;
        }
        match &self.fail_kill_with {
            Some(reason) => Err(anyhow!(reason.clone())),
            None => Ok(()),
        }
    }

    async fn rename_path(&self, from: &Location, to: &Location) -> Result<()> {
        self.record(format!("rename_path:{from}->{to}")).await;
        if let Some(reason) = &self.fail_mutations_with {
            return Err(anyhow!(reason.clone()));
        }
        let mut directories = self.directories.lock().await;
        for entries in directories.values_mut() {
            for entry in entries.iter_mut().filter(|entry| &entry.path == from) {
                entry.path = to.clone();
                entry.name = to.as_str().rsplit('/').next().unwrap_or_default().to_string();
            }
        }
        Ok(())
    }

    async fn duplicate_path(&self, location: &Location) -> Result<()> {
        self.record(format!("duplicate_path:{location}")).await;
        match &self.fail_mutations_with {
            Some(reason) => Err(anyhow!(reason.clone())),
            None => Ok(()),
        }
    }

    async fn delete_path(&self, location: &Location) -> Result<()> {
        self.record(format!("delete_path:{location}")).await;
        if let Some(reason) = &self.fail_mutations_with {
            return Err(anyhow!(reason.clone()));
        }
        let mut directories = self.directories.lock().await;
        for entries in directories.values_mut() {
            entries.retain(|entry| &entry.path != location);
        }
        Ok(())
    }

    async fn clear_stats_cache(&self) -> Result<()> {
        self.record("clear_stats_cache".into()).await;
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingWindow {
    pub actions: Mutex<Vec<&'static str>>,
}

#[async_trait]
impl WindowControls for RecordingWindow {
    async fn close(&self) -> Result<()> {
        self.actions.lock().await.push("close");
        Ok(())
    }

    async fn minimize(&self) -> Result<()> {
        self.actions.lock().await.push("minimize");
        Ok(())
    }

    async fn toggle_maximize(&self) -> Result<()> {
        self.actions.lock().await.push("toggle_maximize");
        Ok(())
    }
}
