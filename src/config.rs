// File: config.rs
// Location: /src/config.rs

use anyhow::{Context, Result};
use qrcode::EcLevel;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderSettings {
    #[serde(default = "default_ec_level")]
    pub ec_level: String,
    /// Pixel width of one QR module.
    #[serde(default = "default_module_size")]
    pub module_size: u32,
    /// Quiet zone width, in modules.
    #[serde(default = "default_border")]
    pub border: u32,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            ec_level: default_ec_level(),
            module_size: default_module_size(),
            border: default_border(),
        }
    }
}

impl EncoderSettings {
    pub fn ec_level(&self) -> Result<EcLevel> {
        match self.ec_level.as_str() {
            "L" => Ok(EcLevel::L),
            "M" => Ok(EcLevel::M),
            "Q" => Ok(EcLevel::Q),
            "H" => Ok(EcLevel::H),
            other => anyhow::bail!("Invalid error correction level: {}", other),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.ec_level()?;

        if self.module_size == 0 || self.module_size > 64 {
            anyhow::bail!("Module size must be 1-64 pixels");
        }

        if self.border > 16 {
            anyhow::bail!("Border must be at most 16 modules");
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellSettings {
    #[serde(default = "default_file_name")]
    pub default_file_name: String,
    #[serde(default = "default_preview_size")]
    pub preview_size: i32,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            default_file_name: default_file_name(),
            preview_size: default_preview_size(),
        }
    }
}

impl ShellSettings {
    pub fn validate(&self) -> Result<()> {
        let name = self.default_file_name.trim();
        if name.is_empty() {
            anyhow::bail!("Default file name must not be empty");
        }

        if name.contains('/') || name.contains('\\') {
            anyhow::bail!("Default file name must not contain path separators");
        }

        if !(64..=1024).contains(&self.preview_size) {
            anyhow::bail!("Preview size must be 64-1024 pixels");
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub encoder: EncoderSettings,
    #[serde(default)]
    pub shell: ShellSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.encoder.validate()?;
        self.shell.validate()?;
        Ok(())
    }
}

fn default_ec_level() -> String {
    "L".to_string()
}

fn default_module_size() -> u32 {
    10
}

fn default_border() -> u32 {
    4
}

fn default_file_name() -> String {
    "qr_code.png".to_string()
}

fn default_preview_size() -> i32 {
    280
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
    settings.validate()?;
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    settings.validate()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.encoder.ec_level().unwrap(), EcLevel::L);
        assert_eq!(settings.encoder.module_size, 10);
        assert_eq!(settings.encoder.border, 4);
        assert_eq!(settings.shell.preview_size, 280);
    }

    #[test]
    fn test_invalid_ec_level() {
        let encoder = EncoderSettings {
            ec_level: "X".to_string(),
            ..EncoderSettings::default()
        };
        assert!(encoder.validate().is_err());
    }

    #[test]
    fn test_invalid_module_size() {
        let encoder = EncoderSettings {
            module_size: 0,
            ..EncoderSettings::default()
        };
        assert!(encoder.validate().is_err());
    }

    #[test]
    fn test_file_name_with_separator() {
        let shell = ShellSettings {
            default_file_name: "out/qr.png".to_string(),
            ..ShellSettings::default()
        };
        assert!(shell.validate().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "encoder": { "ec_level": "H" } }"#).unwrap();
        assert_eq!(settings.encoder.ec_level, "H");
        assert_eq!(settings.encoder.module_size, 10);
        assert_eq!(settings.shell, ShellSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/settings.json");
        let settings = Settings {
            encoder: EncoderSettings {
                ec_level: "M".to_string(),
                module_size: 6,
                border: 2,
            },
            shell: ShellSettings::default(),
        };

        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path).unwrap(), settings);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "shell": { "preview_size": 5 } }"#).unwrap();
        assert!(load_settings(&path).is_err());
    }
}
