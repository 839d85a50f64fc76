use egui::Color32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::LineType;

/// Errors raised while reading canvas settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Options for one canvas widget. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasSettings {
    pub width: u32,
    pub height: u32,
    /// Stroke width for new shapes
    pub thickness: f32,
    /// Dash pattern for new shapes
    pub line_type: LineType,
    pub background: Color32,
    /// Maximum number of undo steps, 0 for no limit
    pub history_limit: usize,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: 900,
            height: 548,
            thickness: 2.0,
            line_type: LineType::Solid,
            background: Color32::WHITE,
            history_limit: 0,
        }
    }
}

impl CanvasSettings {
    /// Parse user settings, filling anything not given with defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.width == 0 || self.height == 0 {
            return Err(SettingsError::Invalid(format!(
                "canvas size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.thickness.is_nan() || self.thickness <= 0.0 {
            return Err(SettingsError::Invalid(format!(
                "thickness must be positive, got {}",
                self.thickness
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = CanvasSettings::from_json(r#"{ "height": 300, "history_limit": 20 }"#).unwrap();
        assert_eq!(settings.height, 300);
        assert_eq!(settings.history_limit, 20);
        assert_eq!(settings.width, 900);
        assert_eq!(settings.thickness, 2.0);
    }

    #[test]
    fn test_line_type_names() {
        let settings = CanvasSettings::from_json(r#"{ "line_type": "dashed" }"#).unwrap();
        assert_eq!(settings.line_type, LineType::Dashed);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            CanvasSettings::from_json(r#"{ "thickness": 0 }"#),
            Err(SettingsError::Invalid(_))
        ));
        assert!(matches!(
            CanvasSettings::from_json(r#"{ "show_edit_toolbar": false }"#),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_settings_survive_json() {
        let mut settings = CanvasSettings::default();
        settings.background = Color32::from_rgb(10, 20, 30);
        let json = settings.to_json().unwrap();
        assert_eq!(CanvasSettings::from_json(&json).unwrap(), settings);
    }
}
