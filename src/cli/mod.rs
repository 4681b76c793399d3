pub mod config;
pub mod memo;

use memos::config::MemosConfig;
use memos::MemoStore;
use std::path::PathBuf;

/// A notebook file opened for one command
pub struct Notebook {
    pub store: MemoStore,
    pub path: PathBuf,
    pub config: MemosConfig,
}

impl Notebook {
    /// Open the notebook named by `--file` or the config.
    ///
    /// A file that does not exist yet opens as an empty notebook.
    pub fn open(file: Option<&str>) -> Result<Self, String> {
        let config = MemosConfig::load();
        let path = config.notebook_path(file);

        let mut store = match config.default_title() {
            Some(title) => MemoStore::with_default_title(title),
            None => MemoStore::new(),
        };

        if path.exists() {
            store
                .load(&path)
                .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
        } else {
            tracing::info!(path = %path.display(), "notebook not found, starting empty");
        }

        Ok(Self {
            store,
            path,
            config,
        })
    }

    pub fn save(&mut self) -> Result<(), String> {
        self.store
            .save(&self.path)
            .map_err(|e| format!("Failed to save {}: {}", self.path.display(), e))
    }
}

/// Split a comma-separated tag argument, trimming each tag
pub fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_trimmed_and_empty_dropped() {
        assert_eq!(parse_tags(" work, home ,,"), vec!["work", "home"]);
        assert!(parse_tags("").is_empty());
    }
}
