//! Run snapshots on disk.

use std::io::ErrorKind;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::{ItemStack, RosterMember};

/// The parts of a run worth keeping between sessions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunSnapshot {
    pub floor: u32,
    pub roster: Vec<RosterMember>,
    #[serde(default)]
    pub lead: usize,
    pub inventory: Vec<ItemStack>,
}

pub async fn save_run(path: &Path, snapshot: &RunSnapshot) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("Failed to create save directory: {}", e))?;
    }
    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| format!("Failed to serialize: {}", e))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| format!("Failed to write save file: {}", e))?;
    Ok(())
}

pub async fn load_run(path: &Path) -> Result<RunSnapshot, String> {
    let json = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) => {
            if e.kind() == ErrorKind::NotFound {
                return Err("Save file not found.".to_string());
            }
            return Err(format!("Failed to read save file: {}", e));
        }
    };
    let snapshot: RunSnapshot =
        serde_json::from_str(&json).map_err(|e| format!("Save file corrupted: {}", e))?;
    if snapshot.roster.is_empty() {
        return Err("Save file has an empty roster.".to_string());
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TowerConfig;
    use crate::state::AppState;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("battletower-{}-{}", name, std::process::id()))
            .join("run.json")
    }

    #[tokio::test]
    async fn save_then_load_restores_run() {
        let mut state = AppState::new(TowerConfig::default(), 4, String::new(), 7);
        state.inventory[0].qty = 0;
        let snapshot = state.snapshot();
        let path = temp_path("roundtrip");

        save_run(&path, &snapshot).await.expect("save");
        let loaded = load_run(&path).await.expect("load");
        assert_eq!(loaded, snapshot);

        let _ = tokio::fs::remove_dir_all(path.parent().expect("parent")).await;
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let err = load_run(&temp_path("missing")).await.unwrap_err();
        assert_eq!(err, "Save file not found.");
    }
}
