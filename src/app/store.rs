use std::path::{Path, PathBuf};

use noteboard::StoreError;
use noteboard::canvas::codec::CanvasStateRecord;
use noteboard::graph::codec::GraphStateRecord;
use noteboard::persistence::StateStore;

/// Keeps `canvas-{id}.json` and `graph-{id}.json` files under one directory.
pub(super) struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub(super) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn canvas_path(&self, id: u64) -> PathBuf {
        self.dir.join(format!("canvas-{id}.json"))
    }

    fn graph_path(&self, id: u64) -> PathBuf {
        self.dir.join(format!("graph-{id}.json"))
    }

    fn read(path: &Path) -> Result<String, StoreError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, path: &Path, text: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(path, text)?;
        log::info!("saved {}", path.display());
        Ok(())
    }

    fn next_graph_id(&self) -> u64 {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return 1;
        };
        entries
            .flatten()
            .filter_map(|e| {
                let name = e.file_name().into_string().ok()?;
                name.strip_prefix("graph-")?.strip_suffix(".json")?.parse::<u64>().ok()
            })
            .max()
            .unwrap_or(0)
            + 1
    }
}

impl StateStore for FileStore {
    fn load_canvas_state(&mut self, id: u64) -> Result<String, StoreError> {
        Self::read(&self.canvas_path(id))
    }

    fn save_canvas_state(&mut self, record: &CanvasStateRecord) -> Result<(), StoreError> {
        self.write(&self.canvas_path(record.id), &record.json)
    }

    fn load_graph_state(&mut self, id: u64) -> Result<String, StoreError> {
        Self::read(&self.graph_path(id))
    }

    fn save_graph_state(&mut self, record: &GraphStateRecord) -> Result<u64, StoreError> {
        let id = record.id.unwrap_or_else(|| self.next_graph_id());
        let mut stored = record.clone();
        stored.id = Some(id);
        self.write(&self.graph_path(id), &serde_json::to_string_pretty(&stored)?)?;
        Ok(id)
    }
}
