//! Resizable panel widths, drag tracking and per-tab width memory.

use std::collections::HashMap;

use shared::domain::SidebarTab;
use tracing::debug;

use crate::{config::PanelSettings, error::SettingsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAnchor {
    /// Grows to the right of the window's left edge.
    Left,
    /// Grows to the left of the window's right edge.
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelId {
    Navigation,
    Details,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidthBounds {
    min: f32,
    max: f32,
}

impl WidthBounds {
    pub fn new(min: f32, max: f32) -> Result<Self, SettingsError> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(SettingsError::Invalid(format!(
                "panel width bounds must be finite with min <= max (got {min}..{max})"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn clamp(&self, width: f32) -> f32 {
        if width.is_nan() {
            return self.min;
        }
        width.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone)]
pub struct PanelLayoutController {
    anchor: PanelAnchor,
    bounds: WidthBounds,
    width: f32,
    is_resizing: bool,
}

impl PanelLayoutController {
    pub fn new(anchor: PanelAnchor, initial_width: f32, bounds: WidthBounds) -> Self {
        Self {
            anchor,
            bounds,
            width: bounds.clamp(initial_width),
            is_resizing: false,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn bounds(&self) -> WidthBounds {
        self.bounds
    }

    pub fn is_resizing(&self) -> bool {
        self.is_resizing
    }

    pub fn start_resize(&mut self) {
        self.is_resizing = true;
    }

    pub fn stop_resize(&mut self) {
        self.is_resizing = false;
    }

    /// Applies a pointer position while a drag is active and returns the new width.
    pub fn resize(&mut self, pointer_x: f32, window_width: f32) -> Option<f32> {
        if !self.is_resizing || !pointer_x.is_finite() {
            return None;
        }
        let raw = match self.anchor {
            PanelAnchor::Left => pointer_x,
            PanelAnchor::Right => window_width - pointer_x,
        };
        self.width = self.bounds.clamp(raw);
        Some(self.width)
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = self.bounds.clamp(width);
    }
}

/// Details panel: a resizable panel whose width depends on the active tab.
///
/// `Info` is the reference tab. Its width is remembered when switching away and
/// restored when switching back; every other tab opens at its preferred width.
#[derive(Debug, Clone)]
pub struct SecondaryPanel {
    panel: PanelLayoutController,
    tab: SidebarTab,
    saved_width_for_mode: HashMap<SidebarTab, f32>,
    preferred_width: HashMap<SidebarTab, f32>,
}

impl SecondaryPanel {
    const REFERENCE_TAB: SidebarTab = SidebarTab::Info;

    pub fn new(panel: PanelLayoutController, activity_width: f32) -> Self {
        let mut saved_width_for_mode = HashMap::new();
        saved_width_for_mode.insert(Self::REFERENCE_TAB, panel.width());
        let mut preferred_width = HashMap::new();
        preferred_width.insert(SidebarTab::Activity, activity_width);
        Self {
            panel,
            tab: Self::REFERENCE_TAB,
            saved_width_for_mode,
            preferred_width,
        }
    }

    pub fn tab(&self) -> SidebarTab {
        self.tab
    }

    pub fn panel(&self) -> &PanelLayoutController {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut PanelLayoutController {
        &mut self.panel
    }

    pub fn saved_width(&self, tab: SidebarTab) -> Option<f32> {
        self.saved_width_for_mode.get(&tab).copied()
    }

    pub fn resize(&mut self, pointer_x: f32, window_width: f32) -> Option<f32> {
        let width = self.panel.resize(pointer_x, window_width)?;
        if self.tab == Self::REFERENCE_TAB {
            self.saved_width_for_mode.insert(Self::REFERENCE_TAB, width);
        }
        Some(width)
    }

    pub fn switch_tab(&mut self, tab: SidebarTab) {
        if tab == self.tab {
            return;
        }
        if self.tab == Self::REFERENCE_TAB {
            self.saved_width_for_mode
                .insert(Self::REFERENCE_TAB, self.panel.width());
        }

        let target = if tab == Self::REFERENCE_TAB {
            self.saved_width_for_mode.get(&tab).copied()
        } else {
            self.preferred_width.get(&tab).copied()
        };
        if let Some(width) = target {
            self.panel.set_width(width);
        }
        debug!(?tab, width = self.panel.width(), "layout: details tab switched");
        self.tab = tab;
    }
}

/// Both resizable panels of the window plus global pointer routing.
#[derive(Debug, Clone)]
pub struct LayoutState {
    navigation: PanelLayoutController,
    details: SecondaryPanel,
}

impl LayoutState {
    pub fn new(
        navigation: &PanelSettings,
        details: &PanelSettings,
        activity_width: f32,
    ) -> Result<Self, SettingsError> {
        let navigation = PanelLayoutController::new(
            PanelAnchor::Left,
            navigation.initial,
            WidthBounds::new(navigation.min, navigation.max)?,
        );
        let details = PanelLayoutController::new(
            PanelAnchor::Right,
            details.initial,
            WidthBounds::new(details.min, details.max)?,
        );
        Ok(Self {
            navigation,
            details: SecondaryPanel::new(details, activity_width),
        })
    }

    pub fn navigation(&self) -> &PanelLayoutController {
        &self.navigation
    }

    pub fn details(&self) -> &SecondaryPanel {
        &self.details
    }

    pub fn width(&self, panel: PanelId) -> f32 {
        match panel {
            PanelId::Navigation => self.navigation.width(),
            PanelId::Details => self.details.panel().width(),
        }
    }

    pub fn start_resize(&mut self, panel: PanelId) {
        match panel {
            PanelId::Navigation => self.navigation.start_resize(),
            PanelId::Details => self.details.panel_mut().start_resize(),
        }
    }

    /// Pointer moves only matter while some panel is being dragged.
    pub fn is_tracking_pointer(&self) -> bool {
        self.navigation.is_resizing() || self.details.panel().is_resizing()
    }

    pub fn pointer_moved(&mut self, pointer_x: f32, window_width: f32) {
        if !self.is_tracking_pointer() {
            return;
        }
        self.navigation.resize(pointer_x, window_width);
        self.details.resize(pointer_x, window_width);
    }

    /// A pointer release anywhere ends every active drag.
    pub fn pointer_released(&mut self) {
        self.navigation.stop_resize();
        self.details.panel_mut().stop_resize();
    }

    pub fn switch_details_tab(&mut self, tab: SidebarTab) {
        self.details.switch_tab(tab);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details_panel() -> SecondaryPanel {
        let bounds = WidthBounds::new(230.0, 500.0).expect("bounds");
        SecondaryPanel::new(
            PanelLayoutController::new(PanelAnchor::Right, 230.0, bounds),
            350.0,
        )
    }

    #[test]
    fn rejects_inverted_or_non_finite_bounds() {
        assert!(WidthBounds::new(400.0, 180.0).is_err());
        assert!(WidthBounds::new(f32::NAN, 180.0).is_err());
        assert!(WidthBounds::new(0.0, f32::INFINITY).is_err());
    }

    #[test]
    fn left_panel_tracks_pointer_within_bounds() {
        let bounds = WidthBounds::new(180.0, 400.0).expect("bounds");
        let mut panel = PanelLayoutController::new(PanelAnchor::Left, 180.0, bounds);

        assert_eq!(panel.resize(250.0, 1200.0), None);
        panel.start_resize();
        assert_eq!(panel.resize(250.0, 1200.0), Some(250.0));
        assert_eq!(panel.resize(-40.0, 1200.0), Some(180.0));
        assert_eq!(panel.resize(1.0e9, 1200.0), Some(400.0));
        assert_eq!(panel.resize(f32::NAN, 1200.0), None);
        assert_eq!(panel.width(), 400.0);
    }

    #[test]
    fn right_panel_measures_from_window_edge() {
        let bounds = WidthBounds::new(230.0, 500.0).expect("bounds");
        let mut panel = PanelLayoutController::new(PanelAnchor::Right, 230.0, bounds);
        panel.start_resize();

        assert_eq!(panel.resize(900.0, 1200.0), Some(300.0));
        assert_eq!(panel.resize(1190.0, 1200.0), Some(230.0));
        assert_eq!(panel.resize(-5000.0, 1200.0), Some(500.0));
        assert_eq!(panel.resize(5000.0, 1200.0), Some(230.0));
    }

    #[test]
    fn width_stays_in_bounds_for_arbitrary_pointers() {
        let bounds = WidthBounds::new(180.0, 400.0).expect("bounds");
        let mut left = PanelLayoutController::new(PanelAnchor::Left, 10.0, bounds);
        let mut right = PanelLayoutController::new(PanelAnchor::Right, 1000.0, bounds);
        assert_eq!(left.width(), 180.0);
        assert_eq!(right.width(), 400.0);
        left.start_resize();
        right.start_resize();

        for pointer in [-1.0e12, -1.0, 0.0, 179.9, 300.0, 400.1, 1.0e12] {
            for panel in [&mut left, &mut right] {
                let width = panel.resize(pointer, 800.0).expect("resizing");
                assert!((180.0..=400.0).contains(&width), "width {width}");
            }
        }
    }

    #[test]
    fn switching_tabs_restores_info_width() {
        let mut details = details_panel();
        details.switch_tab(SidebarTab::Activity);
        assert_eq!(details.panel().width(), 350.0);

        details.switch_tab(SidebarTab::Info);
        assert_eq!(details.panel().width(), 230.0);
    }

    #[test]
    fn manual_resize_in_info_is_remembered_across_switches() {
        let mut details = details_panel();
        details.panel_mut().start_resize();
        details.resize(1200.0 - 310.0, 1200.0);
        details.panel_mut().stop_resize();
        assert_eq!(details.saved_width(SidebarTab::Info), Some(310.0));

        details.switch_tab(SidebarTab::Activity);
        assert_eq!(details.panel().width(), 350.0);
        details.switch_tab(SidebarTab::Info);
        assert_eq!(details.panel().width(), 310.0);
    }

    #[test]
    fn resizing_in_activity_does_not_touch_info_snapshot() {
        let mut details = details_panel();
        details.switch_tab(SidebarTab::Activity);
        details.panel_mut().start_resize();
        details.resize(1200.0 - 480.0, 1200.0);
        details.panel_mut().stop_resize();
        assert_eq!(details.panel().width(), 480.0);

        details.switch_tab(SidebarTab::Info);
        assert_eq!(details.panel().width(), 230.0);
    }

    #[test]
    fn pointer_release_ends_every_drag() {
        let mut layout = LayoutState::new(
            &PanelSettings::navigation_default(),
            &PanelSettings::details_default(),
            350.0,
        )
        .expect("layout");
        assert!(!layout.is_tracking_pointer());

        layout.start_resize(PanelId::Navigation);
        layout.pointer_moved(260.0, 1200.0);
        assert_eq!(layout.width(PanelId::Navigation), 260.0);
        assert_eq!(layout.width(PanelId::Details), 230.0);

        layout.pointer_released();
        assert!(!layout.is_tracking_pointer());
        layout.pointer_moved(390.0, 1200.0);
        assert_eq!(layout.width(PanelId::Navigation), 260.0);
    }
}
