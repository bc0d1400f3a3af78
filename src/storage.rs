use crate::dlog;
use crate::types::Workout;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Key holding the JSON array of every workout.
pub const WORKOUTS_KEY: &str = "workouts";

/// String key/value store, written wholesale per key.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// One `<key>.json` file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating dir: {}", self.dir.display()))?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn save_workouts<S: Storage + ?Sized>(storage: &mut S, workouts: &[Workout]) -> Result<()> {
    let json = serde_json::to_string(workouts).context("serializing workouts")?;
    storage.set(WORKOUTS_KEY, &json)
}

/// Missing and unreadable-as-JSON data both come back as an empty list.
pub fn load_workouts<S: Storage + ?Sized>(storage: &S) -> Result<Vec<Workout>> {
    let Some(raw) = storage.get(WORKOUTS_KEY)? else {
        dlog!("no stored workouts");
        return Ok(Vec::new());
    };

    match serde_json::from_str::<Option<Vec<Workout>>>(&raw) {
        Ok(workouts) => Ok(workouts.unwrap_or_default()),
        Err(e) => {
            tracing::warn!(err = %e, "stored workouts are unreadable; starting empty");
            Ok(Vec::new())
        }
    }
}
