//! `<stem>.provenance.json` sidecars: enough to regenerate any artifact from its seed.

use anyhow::{Context, Result};
use marginbench::ReplayToken;
use serde_json::{json, Value};
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What produced an artifact.
pub struct Payload {
    pub command: &'static str,
    pub seed: u64,
    /// Tokens of the datasets drawn directly into the artifact, in draw order.
    pub replay: Vec<ReplayToken>,
    pub params: Value,
}

impl Payload {
    pub fn new(command: &'static str, seed: u64, params: Value) -> Self {
        Self {
            command,
            seed,
            replay: Vec::new(),
            params,
        }
    }

    pub fn with_replay(mut self, tok: ReplayToken) -> Self {
        self.replay.push(tok);
        self
    }
}

/// Write the sidecar next to `artifact` and return its path.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let path = provenance_path(artifact);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating provenance dir {}", parent.display()))?;
    }

    let callsite = Location::caller();
    let doc = json!({
        "code_rev": current_git_rev(),
        "version": marginbench::VERSION,
        "callsite": { "file": callsite.file(), "line": callsite.line() },
        "command": payload.command,
        "seed": payload.seed,
        "replay": payload.replay,
        "params": payload.params,
        "outputs": [artifact.to_string_lossy()]
    });
    fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(path = %path.display(), "provenance written");
    Ok(path)
}

/// `out/errors.csv` -> `out/errors.provenance.json`.
fn provenance_path(artifact: &Path) -> PathBuf {
    artifact.with_extension("provenance.json")
}

/// `GIT_COMMIT` (build time, then run time), else `git rev-parse HEAD`, else `"unknown"`.
pub fn current_git_rev() -> String {
    let non_empty = |s: String| (!s.is_empty()).then_some(s);
    option_env!("GIT_COMMIT")
        .map(str::to_owned)
        .and_then(non_empty)
        .or_else(|| std::env::var("GIT_COMMIT").ok().and_then(non_empty))
        .or_else(git_head)
        .unwrap_or_else(|| "unknown".to_owned())
}

fn git_head() -> Option<String> {
    let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let rev = String::from_utf8(out.stdout).ok()?;
    Some(rev.trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sidecar_sits_next_to_artifact() {
        assert_eq!(
            provenance_path(Path::new("/tmp/output/errors.csv")),
            Path::new("/tmp/output/errors.provenance.json")
        );
        assert_eq!(
            provenance_path(Path::new("fig")),
            Path::new("fig.provenance.json")
        );
    }

    #[test]
    fn sidecar_records_seed_replay_and_params() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("points.csv");
        fs::write(&artifact, "x0,x1,label,distance\n").unwrap();
        let payload = Payload::new("generate", 17, json!({"gamma": 0.2, "n": 40}))
            .with_replay(ReplayToken { seed: 17, index: 3 });
        let prov_path = write_sidecar(&artifact, payload).unwrap();
        let parsed: Value = serde_json::from_slice(&fs::read(prov_path).unwrap()).unwrap();
        assert_eq!(parsed["command"], "generate");
        assert_eq!(parsed["seed"], 17);
        assert_eq!(parsed["replay"], json!([{"seed": 17, "index": 3}]));
        assert_eq!(parsed["params"]["n"], 40);
        assert_eq!(parsed["version"], marginbench::VERSION);
        assert_eq!(parsed["outputs"][0], artifact.to_string_lossy().as_ref());
    }

    #[test]
    fn sweeps_record_an_empty_replay_list() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("nested/margin.csv");
        let prov_path = write_sidecar(&artifact, Payload::new("margin", 0, json!({}))).unwrap();
        let parsed: Value = serde_json::from_slice(&fs::read(prov_path).unwrap()).unwrap();
        assert_eq!(parsed["replay"], json!([]));
    }
}
