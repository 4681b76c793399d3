use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured notebook path
pub const FILE_ENV: &str = "MEMOS_FILE";

/// Notebook file name used when nothing else is configured
pub const DEFAULT_NOTEBOOK: &str = ".memos.xml";

/// A recognised configuration key
#[derive(Debug, Clone)]
pub struct ConfigKey {
    pub name: &'static str,
    pub description: &'static str,
}

pub static CONFIG_KEYS: &[ConfigKey] = &[
    ConfigKey {
        name: "file",
        description: "Notebook file opened when --file is not given",
    },
    ConfigKey {
        name: "default_title",
        description: "Title given to new memos",
    },
    ConfigKey {
        name: "case_sensitive",
        description: "Search case-sensitively by default (true/false)",
    },
];

pub fn is_known_key(key: &str) -> bool {
    CONFIG_KEYS.iter().any(|k| k.name == key)
}

fn global_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("memos")
}

/// Location of the global config file
pub fn global_config_file() -> PathBuf {
    global_config_dir().join("config.yaml")
}

/// Key/value settings backed by a YAML file
#[derive(Debug, Clone)]
pub struct MemosConfig {
    config_file: PathBuf,
    values: BTreeMap<String, String>,
}

impl MemosConfig {
    /// Load the global config. A missing or unreadable file yields defaults.
    pub fn load() -> Self {
        Self::at(global_config_file())
    }

    pub fn at(config_file: PathBuf) -> Self {
        let mut instance = Self {
            config_file,
            values: BTreeMap::new(),
        };
        instance.reload();
        instance
    }

    fn reload(&mut self) {
        if let Ok(content) = fs::read_to_string(&self.config_file) {
            match serde_yaml::from_str::<BTreeMap<String, String>>(&content) {
                Ok(values) => self.values = values,
                Err(e) => tracing::warn!(
                    path = %self.config_file.display(),
                    error = %e,
                    "ignoring unreadable config"
                ),
            }
        }
    }

    fn save(&self) -> std::io::Result<()> {
        if let Some(dir) = self.config_file.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = serde_yaml::to_string(&self.values)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&self.config_file, content)
    }

    pub fn path(&self) -> &Path {
        &self.config_file
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) -> std::io::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn default_title(&self) -> Option<&str> {
        self.get("default_title").filter(|t| !t.is_empty())
    }

    pub fn case_sensitive(&self) -> bool {
        self.get("case_sensitive")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Resolve the notebook path: explicit flag, then `MEMOS_FILE`, then the
    /// `file` key, then `~/.memos.xml`.
    pub fn notebook_path(&self, flag: Option<&str>) -> PathBuf {
        let env = std::env::var(FILE_ENV).ok();
        self.notebook_path_with(flag, env.as_deref())
    }

    fn notebook_path_with(&self, flag: Option<&str>, env: Option<&str>) -> PathBuf {
        flag.or(env.filter(|p| !p.is_empty()))
            .or(self.get("file"))
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(DEFAULT_NOTEBOOK)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = MemosConfig::at(dir.path().join("config.yaml"));
        assert!(config.get("file").is_none());
        assert!(config.default_title().is_none());
        assert!(!config.case_sensitive());
    }

    #[test]
    fn set_persists_to_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = MemosConfig::at(path.clone());
        config.set("default_title", "New memo").unwrap();
        config.set("case_sensitive", "TRUE").unwrap();

        let reloaded = MemosConfig::at(path);
        assert_eq!(reloaded.default_title(), Some("New memo"));
        assert!(reloaded.case_sensitive());
        assert_eq!(reloaded.entries().count(), 2);
    }

    #[test]
    fn unrecognized_keys_are_kept_in_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "colour: blue\ndefault_title: Note\n").unwrap();

        let config = MemosConfig::at(path);
        let extra: Vec<(&str, &str)> = config
            .entries()
            .filter(|(k, _)| !is_known_key(k))
            .collect();
        assert_eq!(extra, vec![("colour", "blue")]);
        assert_eq!(config.default_title(), Some("Note"));
    }

    #[test]
    fn garbage_config_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "- not\n- a\n- map\n").unwrap();
        assert!(MemosConfig::at(path).get("file").is_none());
    }

    #[test]
    fn notebook_path_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = MemosConfig::at(dir.path().join("config.yaml"));
        config.set("file", "/from/config.xml").unwrap();

        assert_eq!(
            config.notebook_path_with(Some("/from/flag.xml"), Some("/from/env.xml")),
            PathBuf::from("/from/flag.xml")
        );
        assert_eq!(
            config.notebook_path_with(None, Some("/from/env.xml")),
            PathBuf::from("/from/env.xml")
        );
        assert_eq!(
            config.notebook_path_with(None, Some("")),
            PathBuf::from("/from/config.xml")
        );
    }

    #[test]
    fn known_keys() {
        assert!(is_known_key("file"));
        assert!(!is_known_key("colour"));
    }
}
