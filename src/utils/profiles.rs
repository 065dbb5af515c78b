use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::utils::{BackendProfile, Settings, DEFAULT_TIMEOUT_SECS};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_MODEL: &str = "deepseek-r1:1.5b";

/// One backend profile as stored on disk. The API key is kept as a plain
/// string here so an empty value survives the round trip; `resolve` turns
/// it into the option the runner dispatches on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ProfileEntry {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Named backend profiles, persisted as one TOML table per name. Reloaded
/// wholesale after every mutation; duplicate names overwrite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileStore {
    profiles: BTreeMap<String, ProfileEntry>,
}

impl ProfileStore {
    /// Path to the profile file inside the app's config directory.
    pub fn profiles_path() -> Result<PathBuf, String> {
        Ok(Settings::settings_dir()?.join("profiles.toml"))
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let profiles: BTreeMap<String, ProfileEntry> =
            toml::from_str(content).map_err(|e| format!("failed to parse profile file: {}", e))?;
        Ok(Self { profiles })
    }

    pub fn render(&self) -> Result<String, String> {
        toml::to_string_pretty(&self.profiles)
            .map_err(|e| format!("failed to serialize profiles: {}", e))
    }

    /// Loads the store from disk. A missing file is an empty store.
    pub fn load() -> Result<Self, String> {
        let path = Self::profiles_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(&path).map_err(|e| format!("failed to read profile file: {}", e))?;

        Self::parse(&contents)
    }

    /// Rewrites the profile file from the in-memory store.
    pub fn save(&self) -> Result<(), String> {
        let dir = Settings::settings_dir()?;

        if !dir.exists() {
            fs::create_dir_all(&dir)
                .map_err(|e| format!("failed to create settings directory: {}", e))?;
        }

        let path = Self::profiles_path()?;
        fs::write(&path, self.render()?)
            .map_err(|e| format!("failed to write profile file: {}", e))?;

        // Keys live in this file.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path)
                .map_err(|e| format!("failed to get file metadata: {}", e))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms)
                .map_err(|e| format!("failed to set file permissions: {}", e))?;
        }

        Ok(())
    }

    pub fn entry(&self, name: &str) -> Option<&ProfileEntry> {
        self.profiles.get(name)
    }

    /// Resolves a stored entry into the runner's profile. An empty or
    /// whitespace key becomes `None`, selecting the generate protocol.
    pub fn resolve(&self, name: &str) -> Option<BackendProfile> {
        let entry = self.profiles.get(name)?;
        let api_key = match entry.api_key.trim() {
            "" => None,
            key => Some(key.to_string()),
        };
        Some(BackendProfile {
            name: name.to_string(),
            endpoint: entry.endpoint.clone(),
            api_key,
            model: entry.model.clone(),
            timeout_secs: entry.timeout_secs,
        })
    }

    pub fn upsert(&mut self, name: String, entry: ProfileEntry) {
        self.profiles.insert(name, entry);
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.profiles.remove(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cloud_entry() -> ProfileEntry {
        ProfileEntry {
            endpoint: "https://api.example.com/v1".to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 45,
        }
    }

    #[test]
    fn render_then_parse_round_trips() {
        let mut store = ProfileStore::default();
        store.upsert("cloud".to_string(), cloud_entry());
        store.upsert("local".to_string(), ProfileEntry::default());

        let reloaded = ProfileStore::parse(&store.render().unwrap()).unwrap();
        assert_eq!(reloaded, store);
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn parse_grouped_tables() {
        let content = "[local]\nendpoint = \"http://localhost:11434/api/generate\"\nmodel = \"deepseek-r1:1.5b\"\n";
        let store = ProfileStore::parse(content).unwrap();
        let entry = store.entry("local").unwrap();
        assert_eq!(entry.api_key, "");
        assert_eq!(entry.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn resolve_treats_blank_key_as_absent() {
        let mut store = ProfileStore::default();
        store.upsert("local".to_string(), ProfileEntry::default());
        store.upsert("cloud".to_string(), cloud_entry());

        let local = store.resolve("local").unwrap();
        assert_eq!(local.api_key, None);
        assert!(!local.has_api_key());

        let cloud = store.resolve("cloud").unwrap();
        assert_eq!(cloud.api_key.as_deref(), Some("sk-test"));
        assert!(cloud.has_api_key());
        assert_eq!(cloud.timeout_secs, 45);
    }

    #[test]
    fn upsert_overwrites_by_name() {
        let mut store = ProfileStore::default();
        store.upsert("a".to_string(), ProfileEntry::default());
        let mut updated = ProfileEntry::default();
        updated.model = "other-model".to_string();
        store.upsert("a".to_string(), updated);

        assert_eq!(store.len(), 1);
        assert_eq!(store.entry("a").unwrap().model, "other-model");
    }

    #[test]
    fn remove_then_names_never_returns_stale_entry() {
        let mut store = ProfileStore::default();
        store.upsert("a".to_string(), ProfileEntry::default());
        store.upsert("b".to_string(), ProfileEntry::default());

        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert_eq!(store.names(), vec!["b"]);
    }
}
