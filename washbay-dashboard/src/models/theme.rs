use serde::{Deserialize, Serialize};

use super::settings::CustomTheme;

/// Colors applied to the dashboard chrome through CSS custom properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePalette {
    pub name: String,
    pub bg_color: String,
    pub text_color: String,
    pub primary_color: String,
    pub sidebar_color: String,
    pub card_bg: String,
    pub card_text: String,
}

struct Preset {
    key: &'static str,
    bg_color: &'static str,
    text_color: &'static str,
    primary_color: &'static str,
    sidebar_color: &'static str,
    card_bg: &'static str,
    card_text: &'static str,
}

const PRESETS: [Preset; 10] = [
    Preset { key: "default", bg_color: "#f5f5f5", text_color: "#333", primary_color: "#667eea", sidebar_color: "#2c3e50", card_bg: "#ffffff", card_text: "#333" },
    Preset { key: "ocean", bg_color: "#e0f7fa", text_color: "#004d40", primary_color: "#00acc1", sidebar_color: "#006064", card_bg: "#ffffff", card_text: "#004d40" },
    Preset { key: "sunset", bg_color: "#fff3e0", text_color: "#bf360c", primary_color: "#ff6f00", sidebar_color: "#e64a19", card_bg: "#ffffff", card_text: "#bf360c" },
    Preset { key: "forest", bg_color: "#f1f8e9", text_color: "#33691e", primary_color: "#689f38", sidebar_color: "#558b2f", card_bg: "#ffffff", card_text: "#33691e" },
    Preset { key: "midnight", bg_color: "#1a237e", text_color: "#e8eaf6", primary_color: "#5c6bc0", sidebar_color: "#283593", card_bg: "#3f51b5", card_text: "#ffffff" },
    Preset { key: "charcoal", bg_color: "#212121", text_color: "#e0e0e0", primary_color: "#ff5722", sidebar_color: "#424242", card_bg: "#424242", card_text: "#ffffff" },
    Preset { key: "royal", bg_color: "#f3e5f5", text_color: "#4a148c", primary_color: "#ab47bc", sidebar_color: "#6a1b9a", card_bg: "#ffffff", card_text: "#4a148c" },
    Preset { key: "crimson", bg_color: "#1a1a1a", text_color: "#ffebee", primary_color: "#ef5350", sidebar_color: "#c62828", card_bg: "#424242", card_text: "#ffffff" },
    Preset { key: "mint", bg_color: "#e8f5e9", text_color: "#1b5e20", primary_color: "#66bb6a", sidebar_color: "#388e3c", card_bg: "#ffffff", card_text: "#1b5e20" },
    Preset { key: "slate", bg_color: "#eceff1", text_color: "#263238", primary_color: "#546e7a", sidebar_color: "#37474f", card_bg: "#ffffff", card_text: "#263238" },
];

impl ThemePalette {
    /// Names of the built-in presets, in display order.
    pub fn preset_names() -> Vec<&'static str> {
        PRESETS.iter().map(|p| p.key).collect()
    }

    /// Looks up a built-in preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        PRESETS.iter().find(|p| p.key == name).map(Self::from_preset)
    }

    fn from_preset(p: &Preset) -> Self {
        Self {
            name: p.key.to_string(),
            bg_color: p.bg_color.to_string(),
            text_color: p.text_color.to_string(),
            primary_color: p.primary_color.to_string(),
            sidebar_color: p.sidebar_color.to_string(),
            card_bg: p.card_bg.to_string(),
            card_text: p.card_text.to_string(),
        }
    }

    /// Palette for a saved custom theme.
    pub fn from_custom(theme: &CustomTheme) -> Self {
        Self {
            name: theme.preset_name.clone(),
            bg_color: theme.bg_color.clone(),
            text_color: theme.text_color.clone(),
            primary_color: theme.button_color.clone(),
            sidebar_color: theme.sidebar_color.clone(),
            card_bg: theme.card_color.clone(),
            card_text: theme.text_color.clone(),
        }
    }

    /// Inline `style` value declaring the palette's CSS variables.
    pub fn css_variables(&self) -> String {
        format!(
            "--bg-color: {}; --text-color: {}; --primary-color: {}; --sidebar-color: {}; --card-bg: {}; --card-text: {};",
            self.bg_color,
            self.text_color,
            self.primary_color,
            self.sidebar_color,
            self.card_bg,
            self.card_text
        )
    }
}

impl Default for ThemePalette {
    fn default() -> Self {
        Self::from_preset(&PRESETS[0])
    }
}
