use crate::error::{ErrorKind, Result};
use crate::parse::{self, ParseOptions};
use exn::ResultExt;
use serde::Serialize;

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;
/// Window title used when neither `window.title` nor `name` is set.
pub const DEFAULT_TITLE: &str = "TappHost";

/// Declarative configuration shipped inside a package as `tapp.json`.
///
/// Every field has a default, so a package without a manifest (or with an
/// empty one) is still fully described. `version` is informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Entry document, relative to the package root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    pub window: WindowConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Always at least 1.
    pub width: u32,
    /// Always at least 1.
    pub height: u32,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { title: None, width: DEFAULT_WIDTH, height: DEFAULT_HEIGHT, resizable: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugConfig {
    pub open_dev_tools: bool,
}

impl Manifest {
    /// Parse a manifest document with the default (permissive) options.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Self::from_slice_with(bytes, &ParseOptions::default())
    }

    pub fn from_slice_with(bytes: &[u8], options: &ParseOptions) -> Result<Self> {
        parse::parse(bytes, options)
    }

    /// The window title: `window.title`, falling back to `name`, then to
    /// [`DEFAULT_TITLE`].
    pub fn window_title(&self) -> &str {
        self.window.title.as_deref().or(self.name.as_deref()).unwrap_or(DEFAULT_TITLE)
    }

    /// Whether developer tools should open, given a caller-side override.
    pub fn open_dev_tools(&self, force: bool) -> bool {
        force || self.debug.open_dev_tools
    }

    /// Pretty-printed JSON with camelCase keys. Unset optional fields are
    /// left out.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).or_raise(|| ErrorKind::Serialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let manifest = Manifest::default();
        assert_eq!(manifest.window.width, 1280);
        assert_eq!(manifest.window.height, 720);
        assert!(manifest.window.resizable);
        assert!(!manifest.debug.open_dev_tools);
        assert_eq!(manifest.name, None);
        assert_eq!(manifest.entry, None);
    }

    #[test]
    fn test_window_title_fallbacks() {
        let mut manifest = Manifest::default();
        assert_eq!(manifest.window_title(), "TappHost");
        manifest.name = Some("Notes".to_string());
        assert_eq!(manifest.window_title(), "Notes");
        manifest.window.title = Some("Notes (beta)".to_string());
        assert_eq!(manifest.window_title(), "Notes (beta)");
    }

    #[test]
    fn test_open_dev_tools() {
        let mut manifest = Manifest::default();
        assert!(!manifest.open_dev_tools(false));
        assert!(manifest.open_dev_tools(true));
        manifest.debug.open_dev_tools = true;
        assert!(manifest.open_dev_tools(false));
    }

    #[test]
    fn test_serializes_camel_case_without_unset_fields() {
        let manifest = Manifest {
            name: Some("Notes".to_string()),
            entry: Some("dist/index.html".to_string()),
            ..Default::default()
        };
        let json = manifest.to_json_pretty().unwrap();
        assert!(json.contains("\"openDevTools\": false"));
        assert!(!json.contains("version"));
        assert!(!json.contains("title"));
        assert_eq!(Manifest::from_slice(json.as_bytes()).unwrap(), manifest);
    }
}
