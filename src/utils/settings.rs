use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_MAX_INPUT_CHARS: usize = 4000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub theme: String,
    pub theme_mode: ThemeMode, // dark or light
    /// Length cap applied to each user input before marker substitution.
    pub max_input_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Dark,
    Light,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "dracula".to_string(),
            theme_mode: ThemeMode::Dark,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }
}

impl Settings {
    /// Get the platform-specific settings directory
    pub fn settings_dir() -> Result<PathBuf, String> {
        let config_dir = if cfg!(target_os = "windows") {
            // Windows: %APPDATA%\promptdesk
            dirs::config_dir()
                .ok_or("Could not find config directory")?
                .join("promptdesk")
        } else if cfg!(target_os = "macos") {
            // macOS: ~/Library/Application Support/promptdesk
            dirs::config_dir()
                .ok_or("Could not find config directory")?
                .join("promptdesk")
        } else {
            // Linux/Unix: $HOME/.promptdesk
            dirs::home_dir()
                .ok_or("Could not find home directory")?
                .join(".promptdesk")
        };

        Ok(config_dir)
    }

    /// Get the full path to the settings file
    pub fn settings_path() -> Result<PathBuf, String> {
        Ok(Self::settings_dir()?.join("settings.toml"))
    }

    /// Load settings from the config file
    pub fn load() -> Result<Self, String> {
        let path = Self::settings_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| format!("failed to read settings file: {}", e))?;

        let settings: Settings =
            toml::from_str(&contents).map_err(|e| format!("failed to parse settings file: {}", e))?;

        Ok(settings)
    }

    /// Save settings to the config file
    pub fn save(&self) -> Result<(), String> {
        let dir = Self::settings_dir()?;

        if !dir.exists() {
            fs::create_dir_all(&dir)
                .map_err(|e| format!("failed to create settings directory: {}", e))?;
        }

        let path = Self::settings_path()?;
        let contents = toml::to_string_pretty(self)
            .map_err(|e| format!("failed to serialize settings: {}", e))?;

        fs::write(&path, contents).map_err(|e| format!("failed to write settings file: {}", e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path)
                .map_err(|e| format!("failed to get file metadata: {}", e))?
                .permissions();
            perms.set_mode(0o600); // Read/write for owner only
            fs::set_permissions(&path, perms)
                .map_err(|e| format!("failed to set file permissions: {}", e))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.theme, "dracula");
        assert_eq!(settings.theme_mode, ThemeMode::Dark);
        assert_eq!(settings.max_input_chars, DEFAULT_MAX_INPUT_CHARS);
    }

    #[test]
    fn settings_toml_round_trips() {
        let mut settings = Settings::default();
        settings.theme = "winter".to_string();
        settings.theme_mode = ThemeMode::Light;
        settings.max_input_chars = 1234;

        let rendered = toml::to_string_pretty(&settings).unwrap();
        let reloaded: Settings = toml::from_str(&rendered).unwrap();
        assert_eq!(reloaded, settings);
    }
}
