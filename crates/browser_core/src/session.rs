//! Root controller composing history, previews, layout and mutations.

use std::sync::Arc;

use shared::domain::{
    DiskStats, FileInfo, FolderStats, Location, QuickPaths, SidebarTab, SystemStats, ViewMode,
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, error, info, warn};

use crate::{
    config::SessionSettings,
    error::{MutationError, SettingsError},
    file_kind::{resolve_icon, IconResolution},
    layout::{LayoutState, PanelId},
    mutation::{FileMutation, MutationOutcome, OptimisticMutationCoordinator},
    navigation::NavigationController,
    preview_cache::{PreviewCache, PreviewPredicate},
    MissingWindowControls, RemoteService, WindowControls,
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAction {
    Close,
    Minimize,
    ToggleMaximize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    NavigationChanged {
        location: Location,
        can_go_back: bool,
        can_go_forward: bool,
    },
    DirectoryLoaded {
        location: Location,
        entries: usize,
    },
    StatsUpdated {
        location: Location,
    },
    PreviewsUpdated {
        cached: usize,
    },
    ActivityUpdated,
    /// A user-visible message, e.g. a failed rename.
    Notice(String),
    WindowActionFailed {
        action: WindowAction,
        reason: String,
    },
}

/// Rendering-ready copy of the session state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub current_location: Option<Location>,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub quick_paths: Option<QuickPaths>,
    pub listed_location: Option<Location>,
    pub files: Vec<FileInfo>,
    pub folder_stats: Option<FolderStats>,
    pub disk_stats: Option<DiskStats>,
    pub system_stats: Option<SystemStats>,
    pub is_scanning: bool,
    pub view_mode: ViewMode,
    pub details_tab: SidebarTab,
    pub navigation_width: f32,
    pub details_width: f32,
    pub notice: Option<String>,
}

#[derive(Debug, Default)]
struct DirectoryView {
    listed_location: Option<Location>,
    files: Vec<FileInfo>,
    folder_stats: Option<FolderStats>,
    disk_stats: Option<DiskStats>,
    is_scanning: bool,
}

#[derive(Debug, Default)]
struct Presentation {
    quick_paths: Option<QuickPaths>,
    view_mode: ViewMode,
    notice: Option<String>,
}

pub struct SessionController {
    remote: Arc<dyn RemoteService>,
    window: Arc<dyn WindowControls>,
    settings: SessionSettings,
    previews: PreviewCache,
    mutations: OptimisticMutationCoordinator,
    history: Mutex<Option<NavigationController>>,
    view: Mutex<DirectoryView>,
    activity: Mutex<Option<SystemStats>>,
    layout: Mutex<LayoutState>,
    presentation: Mutex<Presentation>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    pub fn new(
        remote: Arc<dyn RemoteService>,
        settings: SessionSettings,
    ) -> Result<Arc<Self>, SettingsError> {
        Self::new_with_dependencies(remote, Arc::new(MissingWindowControls), settings, None)
    }

    pub fn new_with_dependencies(
        remote: Arc<dyn RemoteService>,
        window: Arc<dyn WindowControls>,
        settings: SessionSettings,
        preview_predicate: Option<PreviewPredicate>,
    ) -> Result<Arc<Self>, SettingsError> {
        settings.validate()?;
        let layout = LayoutState::new(
            &settings.navigation_panel,
            &settings.details_panel,
            settings.activity_panel_width,
        )?;

        let mut previews = PreviewCache::with_limits(
            Arc::clone(&remote),
            settings.preview_batch_size,
            settings.preview_cache_capacity,
        );
        if let Some(predicate) = preview_predicate {
            previews = previews.with_predicate(predicate);
        }

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Arc::new(Self {
            mutations: OptimisticMutationCoordinator::new(Arc::clone(&remote)),
            remote,
            window,
            settings,
            previews,
            history: Mutex::new(None),
            view: Mutex::new(DirectoryView::default()),
            activity: Mutex::new(None),
            layout: Mutex::new(layout),
            presentation: Mutex::new(Presentation::default()),
            events,
        }))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn previews(&self) -> &PreviewCache {
        &self.previews
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Loads the quick paths and opens the initial location. A failure leaves the
    /// session empty; nothing retries automatically.
    pub async fn start(self: &Arc<Self>) {
        let quick_paths = match self.remote.get_quick_paths().await {
            Ok(paths) => paths,
            Err(err) => {
                error!(error = %err, "navigation: failed to load quick paths");
                return;
            }
        };

        let initial = self
            .settings
            .initial_location
            .clone()
            .unwrap_or_else(|| quick_paths.home.clone());
        self.presentation.lock().await.quick_paths = Some(quick_paths);
        *self.history.lock().await = Some(NavigationController::new(initial.clone()));
        info!(location = %initial, "navigation: session started");

        self.emit_navigation().await;
        self.load_directory(initial).await;
    }

    pub async fn navigate(self: &Arc<Self>, location: Location) {
        {
            let mut history = self.history.lock().await;
            match history.as_mut() {
                Some(nav) => nav.navigate(location.clone()),
                None => *history = Some(NavigationController::new(location.clone())),
            }
        }
        self.emit_navigation().await;
        self.load_directory(location).await;
    }

    pub async fn go_back(self: &Arc<Self>) -> Option<Location> {
        let target = self
            .history
            .lock()
            .await
            .as_mut()
            .and_then(NavigationController::go_back);
        self.open_history_target(target).await
    }

    pub async fn go_forward(self: &Arc<Self>) -> Option<Location> {
        let target = self
            .history
            .lock()
            .await
            .as_mut()
            .and_then(NavigationController::go_forward);
        self.open_history_target(target).await
    }

    async fn open_history_target(self: &Arc<Self>, target: Option<Location>) -> Option<Location> {
        let location = target?;
        self.emit_navigation().await;
        self.load_directory(location.clone()).await;
        Some(location)
    }

    pub async fn current_location(&self) -> Option<Location> {
        self.history
            .lock()
            .await
            .as_ref()
            .map(|nav| nav.current().clone())
    }

    /// Re-lists the current location.
    pub async fn reload(self: &Arc<Self>) {
        if let Some(location) = self.current_location().await {
            self.load_directory(location).await;
        }
    }

    async fn load_directory(self: &Arc<Self>, location: Location) {
        if location.is_virtual() {
            *self.view.lock().await = DirectoryView {
                listed_location: Some(location.clone()),
                ..DirectoryView::default()
            };
            self.emit(SessionEvent::DirectoryLoaded {
                location,
                entries: 0,
            });
            return;
        }

        let entries = match self.remote.read_directory(&location).await {
            Ok(entries) => entries,
            Err(err) => {
                error!(path = %location, error = %err, "navigation: directory read failed");
                return;
            }
        };

        {
            let history = self.history.lock().await;
            let is_current = history
                .as_ref()
                .is_some_and(|nav| nav.current() == &location);
            if !is_current {
                debug!(path = %location, "navigation: discarding listing for abandoned location");
                return;
            }
            let mut view = self.view.lock().await;
            view.listed_location = Some(location.clone());
            view.files = entries.clone();
            view.is_scanning = true;
        }
        self.emit(SessionEvent::DirectoryLoaded {
            location: location.clone(),
            entries: entries.len(),
        });

        let session = Arc::clone(self);
        let stats_location = location;
        tokio::spawn(async move {
            session.refresh_stats(&stats_location).await;
        });

        let session = Arc::clone(self);
        tokio::spawn(async move {
            session.load_previews(&entries).await;
        });
    }

    async fn refresh_stats(&self, location: &Location) {
        let mut disk_stats = None;
        let mut folder_stats = None;
        if location.is_root() {
            match self.remote.get_disk_stats().await {
                Ok(stats) => disk_stats = Some(stats),
                Err(err) => warn!(error = %err, "stats: disk stats unavailable"),
            }
        } else {
            match self.remote.get_folder_stats(location).await {
                Ok(stats) => folder_stats = Some(stats),
                Err(err) => warn!(path = %location, error = %err, "stats: folder stats unavailable"),
            }
        }

        {
            let mut view = self.view.lock().await;
            if view.listed_location.as_ref() != Some(location) {
                debug!(path = %location, "stats: discarding stats for abandoned location");
                return;
            }
            if disk_stats.is_some() {
                view.disk_stats = disk_stats;
            }
            if folder_stats.is_some() {
                view.folder_stats = folder_stats;
            }
            view.is_scanning = false;
        }
        self.emit(SessionEvent::StatsUpdated {
            location: location.clone(),
        });
    }

    /// Recomputes statistics for the listed location, bypassing the backend's
    /// folder statistics cache. After a failed read the listing lags history;
    /// the listing is what gets rescanned.
    pub async fn rescan(&self) {
        let location = {
            let mut view = self.view.lock().await;
            let Some(location) = view.listed_location.clone() else {
                return;
            };
            if location.is_virtual() {
                return;
            }
            view.is_scanning = true;
            location
        };

        if !location.is_root() {
            if let Err(err) = self.remote.clear_stats_cache().await {
                warn!(error = %err, "stats: failed to clear backend stats cache");
            }
        }
        self.refresh_stats(&location).await;
    }

    async fn load_previews(&self, files: &[FileInfo]) {
        let report = self.previews.load(files).await;
        if report.requested > 0 {
            self.emit(SessionEvent::PreviewsUpdated {
                cached: self.previews.len().await,
            });
        }
    }

    /// Icon choice for every displayed entry, in listing order.
    pub async fn icons(&self) -> Vec<(FileInfo, IconResolution)> {
        let previews = self.previews.snapshot().await;
        let view = self.view.lock().await;
        view.files
            .iter()
            .map(|file| (file.clone(), resolve_icon(file, &previews)))
            .collect()
    }

    pub async fn open_file(&self, location: &Location) {
        if let Err(err) = self.remote.open_file(location).await {
            error!(path = %location, error = %err, "navigation: failed to open file");
        }
    }

    /// Fetches a fresh activity snapshot; failures keep the previous one.
    pub async fn refresh_system_stats(&self) -> bool {
        match self.remote.get_system_stats().await {
            Ok(stats) => {
                *self.activity.lock().await = Some(stats);
                self.emit(SessionEvent::ActivityUpdated);
                true
            }
            Err(err) => {
                warn!(error = %err, "stats: system stats unavailable");
                false
            }
        }
    }

    /// Polls system activity at the configured interval until the handle is aborted.
    pub fn spawn_system_stats_poller(self: &Arc<Self>) -> JoinHandle<()> {
        let session = Arc::clone(self);
        let period = self.settings.system_stats_poll_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                session.refresh_system_stats().await;
            }
        })
    }

    /// Removes `pid` from the displayed activity and announces it before the
    /// backend answers; a refusal announces the reloaded snapshot as well.
    pub async fn kill_process(&self, pid: u32) -> MutationOutcome {
        if self.mutations.remove_process(pid, &self.activity).await {
            self.emit(SessionEvent::ActivityUpdated);
        }
        let outcome = self.mutations.terminate_process(pid, &self.activity).await;
        if matches!(outcome, MutationOutcome::Reconciled { .. }) {
            self.emit(SessionEvent::ActivityUpdated);
        }
        outcome
    }

    /// Runs a file mutation and re-lists the current directory on success. A
    /// failure is posted as a notice naming the action and the reason.
    pub async fn mutate_path(self: &Arc<Self>, mutation: FileMutation) -> Result<(), MutationError> {
        match self.mutations.apply_file_mutation(&mutation).await {
            Ok(()) => {
                self.reload().await;
                Ok(())
            }
            Err(err) => {
                self.post_notice(err.to_string()).await;
                Err(err)
            }
        }
    }

    pub async fn rename(self: &Arc<Self>, path: &Location, new_name: &str) -> Result<(), MutationError> {
        let mutation = FileMutation::Rename {
            from: path.clone(),
            to: path.sibling(new_name),
        };
        self.mutate_path(mutation).await
    }

    pub async fn duplicate(self: &Arc<Self>, path: &Location) -> Result<(), MutationError> {
        self.mutate_path(FileMutation::Duplicate { path: path.clone() })
            .await
    }

    pub async fn delete(self: &Arc<Self>, path: &Location) -> Result<(), MutationError> {
        self.mutate_path(FileMutation::Delete { path: path.clone() })
            .await
    }

    async fn post_notice(&self, message: String) {
        self.presentation.lock().await.notice = Some(message.clone());
        self.emit(SessionEvent::Notice(message));
    }

    pub async fn clear_notice(&self) {
        self.presentation.lock().await.notice = None;
    }

    pub async fn set_view_mode(&self, mode: ViewMode) {
        self.presentation.lock().await.view_mode = mode;
    }

    pub async fn set_details_tab(&self, tab: SidebarTab) {
        self.layout.lock().await.switch_details_tab(tab);
    }

    pub async fn start_resize(&self, panel: PanelId) {
        self.layout.lock().await.start_resize(panel);
    }

    pub async fn pointer_moved(&self, pointer_x: f32, window_width: f32) {
        self.layout.lock().await.pointer_moved(pointer_x, window_width);
    }

    pub async fn pointer_released(&self) {
        self.layout.lock().await.pointer_released();
    }

    pub async fn is_tracking_pointer(&self) -> bool {
        self.layout.lock().await.is_tracking_pointer()
    }

    pub async fn window_action(&self, action: WindowAction) {
        let result = match action {
            WindowAction::Close => self.window.close().await,
            WindowAction::Minimize => self.window.minimize().await,
            WindowAction::ToggleMaximize => self.window.toggle_maximize().await,
        };
        if let Err(err) = result {
            warn!(?action, error = %err, "window: action failed");
            self.emit(SessionEvent::WindowActionFailed {
                action,
                reason: err.to_string(),
            });
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let (current_location, can_go_back, can_go_forward) = {
            let history = self.history.lock().await;
            match history.as_ref() {
                Some(nav) => (
                    Some(nav.current().clone()),
                    nav.can_go_back(),
                    nav.can_go_forward(),
                ),
                None => (None, false, false),
            }
        };
        let (listed_location, files, folder_stats, disk_stats, is_scanning) = {
            let view = self.view.lock().await;
            (
                view.listed_location.clone(),
                view.files.clone(),
                view.folder_stats.clone(),
                view.disk_stats,
                view.is_scanning,
            )
        };
        let system_stats = self.activity.lock().await.clone();
        let (details_tab, navigation_width, details_width) = {
            let layout = self.layout.lock().await;
            (
                layout.details().tab(),
                layout.width(PanelId::Navigation),
                layout.width(PanelId::Details),
            )
        };
        let presentation = self.presentation.lock().await;

        SessionSnapshot {
            current_location,
            can_go_back,
            can_go_forward,
            quick_paths: presentation.quick_paths.clone(),
            listed_location,
            files,
            folder_stats,
            disk_stats,
            system_stats,
            is_scanning,
            view_mode: presentation.view_mode,
            details_tab,
            navigation_width,
            details_width,
            notice: presentation.notice.clone(),
        }
    }

    async fn emit_navigation(&self) {
        let event = {
            let history = self.history.lock().await;
            history.as_ref().map(|nav| SessionEvent::NavigationChanged {
                location: nav.current().clone(),
                can_go_back: nav.can_go_back(),
                can_go_forward: nav.can_go_forward(),
            })
        };
        if let Some(event) = event {
            self.emit(event);
        }
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
