//! Theme application
//!
//! Switching the theme toggles document-level class markers that styling
//! keys off:
//! - dark: root gets `dark`, body gets `dark-theme-active`
//! - light: root loses `dark`, body gets `light-theme-active`
//!
//! The store applies markers through a [`ThemeTarget`], so a front end can
//! plug in whatever it renders with. [`DocumentClasses`] is the in-memory
//! target used by default.

use std::collections::BTreeSet;
use std::sync::RwLock;
use tracing::debug;

use crate::models::Theme;

pub const ROOT_DARK_CLASS: &str = "dark";
pub const BODY_DARK_CLASS: &str = "dark-theme-active";
pub const BODY_LIGHT_CLASS: &str = "light-theme-active";

/// Receives theme changes.
pub trait ThemeTarget: Send + Sync {
    fn apply_theme(&self, theme: Theme);
}

/// Class sets of the document root and body.
#[derive(Debug, Default)]
pub struct DocumentClasses {
    root: RwLock<BTreeSet<String>>,
    body: RwLock<BTreeSet<String>>,
}

impl DocumentClasses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root_classes(&self) -> Vec<String> {
        let root = self.root.read().unwrap_or_else(|e| e.into_inner());
        root.iter().cloned().collect()
    }

    pub fn body_classes(&self) -> Vec<String> {
        let body = self.body.read().unwrap_or_else(|e| e.into_inner());
        body.iter().cloned().collect()
    }

    /// Theme currently marked on the document, if any
    pub fn current(&self) -> Option<Theme> {
        let body = self.body.read().unwrap_or_else(|e| e.into_inner());
        if body.contains(BODY_DARK_CLASS) {
            Some(Theme::Dark)
        } else if body.contains(BODY_LIGHT_CLASS) {
            Some(Theme::Light)
        } else {
            None
        }
    }
}

impl ThemeTarget for DocumentClasses {
    fn apply_theme(&self, theme: Theme) {
        let mut root = self.root.write().unwrap_or_else(|e| e.into_inner());
        let mut body = self.body.write().unwrap_or_else(|e| e.into_inner());

        match theme {
            Theme::Dark => {
                root.insert(ROOT_DARK_CLASS.to_string());
                body.insert(BODY_DARK_CLASS.to_string());
                body.remove(BODY_LIGHT_CLASS);
            }
            Theme::Light => {
                root.remove(ROOT_DARK_CLASS);
                body.insert(BODY_LIGHT_CLASS.to_string());
                body.remove(BODY_DARK_CLASS);
            }
        }
        debug!("Applied {} theme markers", theme);
    }
}
