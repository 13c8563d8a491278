use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::gateway::PreferenceStore;
use super::{PreferencePatch, UserRestPreferences};
use crate::error::StoreError;

/// One JSON document per user under a directory.
#[derive(Debug, Clone)]
pub struct JsonFilePreferenceStore {
    dir: PathBuf,
}

impl JsonFilePreferenceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        let safe: String = user_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("prefs-{safe}.json"))
    }
}

#[async_trait]
impl PreferenceStore for JsonFilePreferenceStore {
    async fn fetch(&self, user_id: &str) -> Result<Option<PreferencePatch>, StoreError> {
        match tokio::fs::read_to_string(self.path_for(user_id)).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, user_id: &str, prefs: &UserRestPreferences) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let content = serde_json::to_string_pretty(prefs)?;
        tokio::fs::write(self.path_for(user_id), content).await?;
        Ok(())
    }
}
