//! Editor tunables, loadable from a JSON file.
//!
//! Every field has a default so a config file only needs to mention what it
//! overrides.

use std::time::Duration;

use anyhow::Context;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};

/// An RGBA colour (straight, non-premultiplied alpha).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba(r, g, b, 255)
    }

    pub fn with_alpha(self, alpha: u8) -> Self {
        Rgba(self.0, self.1, self.2, alpha)
    }
}

/// Colours used by the renderer. Changing the theme invalidates the
/// renderer's style cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: Rgba,
    pub line: Rgba,
    pub emphasis: Rgba,
    pub provisional: Rgba,
    pub highlight: Rgba,
    pub input_port: Rgba,
    pub output_port: Rgba,
    pub selected_port: Rgba,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgba::rgb(250, 250, 250),
            line: Rgba::rgb(60, 60, 60),
            emphasis: Rgba::rgb(0, 120, 255),
            provisional: Rgba::rgb(100, 200, 100),
            highlight: Rgba(0, 120, 255, 60),
            input_port: Rgba::rgb(40, 150, 40),
            output_port: Rgba::rgb(200, 110, 20),
            selected_port: Rgba::rgb(0, 120, 255),
        }
    }
}

impl Theme {
    /// Palette for dark backgrounds.
    pub fn dark() -> Self {
        Self {
            background: Rgba::rgb(27, 27, 27),
            line: Rgba::rgb(200, 200, 200),
            emphasis: Rgba::rgb(90, 170, 255),
            provisional: Rgba::rgb(120, 220, 120),
            highlight: Rgba(90, 170, 255, 50),
            input_port: Rgba::rgb(110, 200, 110),
            output_port: Rgba::rgb(240, 160, 70),
            selected_port: Rgba::rgb(90, 170, 255),
        }
    }
}

/// Where provisional and committed lines attach relative to a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Distance past the row edge for output ports.
    pub output_offset: f32,
    /// Distance past the row edge for input ports.
    pub input_offset: f32,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            output_offset: 12.0,
            input_offset: 4.0,
        }
    }
}

/// Top-level editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Delay before the pre-selected candidate set is visually emphasised.
    pub highlight_delay_ms: u64,
    /// Depth limit of the "Expand All" command.
    pub expand_depth: usize,
    /// Above this many visible connection endpoints lines are drawn opaque.
    pub transparency_threshold: usize,
    /// Alpha used for committed lines when the pass is translucent.
    pub translucent_alpha: u8,
    pub line_width: f32,
    pub emphasis_width: f32,
    /// Height of one list row in the headless outline list.
    pub row_height: f32,
    /// Horizontal indent per hierarchy level in the outline list.
    pub indent: f32,
    pub anchors: AnchorConfig,
    pub theme: Theme,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            highlight_delay_ms: 400,
            expand_depth: 20,
            transparency_threshold: 3,
            translucent_alpha: 140,
            line_width: 1.5,
            emphasis_width: 2.5,
            row_height: 18.0,
            indent: 14.0,
            anchors: AnchorConfig::default(),
            theme: Theme::default(),
        }
    }
}

impl EditorConfig {
    /// Load a configuration from a JSON file, filling unspecified fields with
    /// defaults.
    pub fn load(path: &Utf8Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("Open {}", path))?;
        let cfg: EditorConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load `path` if given, otherwise return the defaults.
    pub fn load_or_default(path: Option<&Utf8Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn highlight_delay(&self) -> Duration {
        Duration::from_millis(self.highlight_delay_ms)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.row_height <= 0.0 {
            anyhow::bail!("row_height must be positive, got {}", self.row_height);
        }
        if self.line_width <= 0.0 || self.emphasis_width <= 0.0 {
            anyhow::bail!("line widths must be positive");
        }
        Ok(())
    }
}
