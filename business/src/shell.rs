//! Top-level navigation and theme.

use crate::{history::HistoryManager, store::PersistentStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ThemeState {
    #[default]
    Dark,
    Light,
}

impl ThemeState {
    pub fn as_stored(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn from_stored(raw: &str) -> Option<Self> {
        match raw {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tab {
    #[default]
    Simple,
    Formats,
    Advanced,
    Scanner,
    History,
}

impl Tab {
    pub const ALL: [Self; 5] = [
        Self::Simple,
        Self::Formats,
        Self::Advanced,
        Self::Scanner,
        Self::History,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Simple => "Simple",
            Self::Formats => "Formats",
            Self::Advanced => "Advanced",
            Self::Scanner => "Scanner",
            Self::History => "History",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AdvancedMode {
    #[default]
    Preview,
    Batch,
    Logo,
}

impl AdvancedMode {
    pub const ALL: [Self; 3] = [Self::Preview, Self::Batch, Self::Logo];

    pub fn label(self) -> &'static str {
        match self {
            Self::Preview => "Multi-Size Preview",
            Self::Batch => "Batch Generate",
            Self::Logo => "Logo Overlay",
        }
    }
}

/// Application-wide state shared by every tab.
#[derive(Debug)]
pub struct Shell {
    store: PersistentStore,
    theme: ThemeState,
    tab: Tab,
    advanced: AdvancedMode,
    history: HistoryManager,
}

impl Shell {
    /// Restores theme, history and favorites from `store`.
    pub fn load(store: PersistentStore, history_limit: usize) -> Self {
        let theme = store.load_theme();
        let history = HistoryManager::load(store.clone(), history_limit);
        Self {
            store,
            theme,
            tab: Tab::default(),
            advanced: AdvancedMode::default(),
            history,
        }
    }

    pub fn theme(&self) -> ThemeState {
        self.theme
    }

    /// Flips the theme and persists it right away.
    pub fn toggle_theme(&mut self) -> ThemeState {
        self.theme = self.theme.toggled();
        if let Err(e) = self.store.save_theme(self.theme) {
            log::warn!("Failed to persist theme: {e}");
        }
        self.theme
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Switches tabs. Returns `true` when this leaves the scanner, whose camera must stop.
    pub fn select_tab(&mut self, tab: Tab) -> bool {
        let leaves_scanner = self.tab == Tab::Scanner && tab != Tab::Scanner;
        if self.tab != tab {
            log::debug!("Switching to {} tab", tab.label());
        }
        self.tab = tab;
        leaves_scanner
    }

    pub fn advanced(&self) -> AdvancedMode {
        self.advanced
    }

    pub fn set_advanced(&mut self, mode: AdvancedMode) {
        self.advanced = mode;
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryManager {
        &mut self.history
    }
}
