//! Change detection: the aggregate template hash and the write gate.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::info;

use crate::config::BuildConfig;
use crate::error::Result;

/// Write `content` only when it differs from what is on disk, creating
/// parent directories as needed. Reports whether a write happened.
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    if let Ok(existing) = fs::read_to_string(path)
        && existing == content
    {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(true)
}

/// Aggregate hash over the page template and every embedded asset, as a
/// lowercase hex string. A touch to any input changes the hash, even
/// when the final page content would be byte-identical.
pub fn aggregate_hash(template: &str, config: &BuildConfig) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(template.as_bytes());
    for path in config.style_paths.iter().chain(config.script_paths.iter()) {
        hasher.update(fs::read(path)?);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Write gate for one build run.
///
/// Holds the current aggregate hash, whether it differs from the last
/// recorded one (forcing page rewrites), and a count of the writes that
/// actually happened. The count stays zero across a no-change rerun.
#[derive(Debug)]
pub struct WriteGate {
    hash: String,
    force: bool,
    written: usize,
}

impl WriteGate {
    /// Compare the current aggregate hash against the recorded state.
    pub fn new(config: &BuildConfig, template: &str) -> Result<Self> {
        let hash = aggregate_hash(template, config)?;
        let force = match fs::read_to_string(&config.hash_state_path) {
            Ok(text) => {
                let state: serde_json::Value = serde_json::from_str(&text)?;
                let recorded = state.get("hash").and_then(|h| h.as_str()).unwrap_or("");
                recorded != hash
            }
            Err(_) => true,
        };
        if force {
            info!("template or embedded assets changed, forcing rebuild of all pages");
        }
        Ok(WriteGate {
            hash,
            force,
            written: 0,
        })
    }

    /// Whether every page output is rewritten this run.
    pub fn forced(&self) -> bool {
        self.force
    }

    /// Writes performed through this gate so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Write `content` only when it differs from what is on disk.
    /// Reports whether a write happened.
    pub fn write_if_changed(&mut self, path: &Path, content: &str) -> Result<bool> {
        let wrote = write_if_changed(path, content)?;
        if wrote {
            self.written += 1;
        }
        Ok(wrote)
    }

    /// Write a page output: unconditional on a forced run, gated otherwise.
    pub fn write_page(&mut self, path: &Path, content: &str) -> Result<bool> {
        if self.force {
            fs::write(path, content)?;
            self.written += 1;
            return Ok(true);
        }
        self.write_if_changed(path, content)
    }

    /// Record the aggregate hash for the next run.
    pub fn store(&self, config: &BuildConfig) -> Result<()> {
        if let Some(parent) = config.hash_state_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let state = serde_json::json!({ "hash": self.hash });
        fs::write(&config.hash_state_path, state.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, BuildConfig) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let config = BuildConfig::new(root);
        fs::create_dir_all(root.join("static/data")).unwrap();
        fs::create_dir_all(root.join("styles")).unwrap();
        fs::create_dir_all(root.join("scripts")).unwrap();
        for path in config.style_paths.iter().chain(config.script_paths.iter()) {
            fs::write(path, "body {}").unwrap();
        }
        (dir, config)
    }

    #[test]
    fn test_write_if_changed_skips_identical_content() {
        let (dir, config) = fixture();
        let mut gate = WriteGate::new(&config, "template").unwrap();
        let path = dir.path().join("out.html");

        assert!(gate.write_if_changed(&path, "hello").unwrap());
        assert!(!gate.write_if_changed(&path, "hello").unwrap());
        assert!(gate.write_if_changed(&path, "changed").unwrap());
        assert_eq!(gate.written(), 2);
    }

    #[test]
    fn test_standalone_gate_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets/deep/index.json");
        assert!(write_if_changed(&path, "[]").unwrap());
        assert!(!write_if_changed(&path, "[]").unwrap());
    }

    #[test]
    fn test_first_run_is_forced_then_settles() {
        let (_dir, config) = fixture();

        let gate = WriteGate::new(&config, "template").unwrap();
        assert!(gate.forced());
        gate.store(&config).unwrap();

        let gate = WriteGate::new(&config, "template").unwrap();
        assert!(!gate.forced());
    }

    #[test]
    fn test_asset_touch_forces_rebuild() {
        let (_dir, config) = fixture();
        let gate = WriteGate::new(&config, "template").unwrap();
        gate.store(&config).unwrap();

        fs::write(&config.style_paths[1], "td { padding: 0; }").unwrap();
        let gate = WriteGate::new(&config, "template").unwrap();
        assert!(gate.forced());
    }

    #[test]
    fn test_forced_page_write_is_unconditional() {
        let (dir, config) = fixture();
        let mut gate = WriteGate::new(&config, "template").unwrap();
        assert!(gate.forced());

        let path = dir.path().join("page.html");
        fs::write(&path, "same").unwrap();
        assert!(gate.write_page(&path, "same").unwrap());

        gate.store(&config).unwrap();
        let mut gate = WriteGate::new(&config, "template").unwrap();
        assert!(!gate.write_page(&path, "same").unwrap());
    }

    #[test]
    fn test_hash_changes_with_template_text() {
        let (_dir, config) = fixture();
        let a = aggregate_hash("one", &config).unwrap();
        let b = aggregate_hash("two", &config).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }
}
