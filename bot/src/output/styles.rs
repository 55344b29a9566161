//! Output styles using owo-colors stylesheet pattern

use owo_colors::Style;
use spotcraft_common::LifecycleState;

/// Centralized stylesheet for CLI output colors.
#[derive(Default, Clone)]
pub struct Styles {
    /// Success messages (green)
    pub success: Style,
    /// Warning messages (yellow)
    pub warning: Style,
    /// Error messages (red)
    pub error: Style,
    /// Info messages (blue)
    pub info: Style,
    /// Dimmed/secondary text
    pub dim: Style,
}

impl Styles {
    /// Apply colors to the stylesheet.
    pub fn colorize(&mut self) {
        self.success = Style::new().green();
        self.warning = Style::new().yellow();
        self.error = Style::new().red();
        self.info = Style::new().blue();
        self.dim = Style::new().dimmed();
    }

    /// Style for a composite lifecycle state.
    #[must_use]
    pub fn for_state(&self, state: LifecycleState) -> Style {
        match state {
            LifecycleState::Ready => self.success,
            LifecycleState::FleetGone | LifecycleState::Error => self.error,
            LifecycleState::InstanceUpServiceDown | LifecycleState::StatusUnclear => self.warning,
            LifecycleState::OfflineNoFleet
            | LifecycleState::FleetActiveNoInstance
            | LifecycleState::FleetTransitioning => self.info,
        }
    }
}
