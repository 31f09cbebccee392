use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::memory::types::Turn;
use crate::Result;

/// Default number of turns kept on disk.
pub const DEFAULT_MAX_TURNS: usize = 50;

/// File-backed conversational memory.
///
/// Owned by the main loop only. Every append is followed by a persist, and
/// every persist trims the history to the `max_turns` most recent entries,
/// so the in-memory and on-disk sequences never drift apart.
#[derive(Debug)]
pub struct ConversationStore {
    path: PathBuf,
    max_turns: usize,
    turns: Vec<Turn>,
}

impl ConversationStore {
    /// Load the history at `path`. Missing, unreadable or malformed files
    /// (including JSON that is not an array of turns) yield an empty history.
    pub fn load(path: impl Into<PathBuf>, max_turns: usize) -> Self {
        let path = path.into();
        let mut turns = read_turns(&path);
        let max_turns = max_turns.max(1);
        trim_front(&mut turns, max_turns);
        debug!(path = %path.display(), turns = turns.len(), "conversation loaded");
        Self { path, max_turns, turns }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Append a turn and persist. Persistence failures are logged, not returned.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
        if let Err(e) = self.persist() {
            warn!(error = %e, path = %self.path.display(), "failed to persist conversation");
        }
    }

    /// Trim to the most recent `max_turns` and write the history.
    ///
    /// The file is written to a sibling temp file first and renamed over the
    /// target, so a crash mid-write leaves the previous file intact.
    pub fn persist(&mut self) -> Result<()> {
        trim_front(&mut self.turns, self.max_turns);

        let json = serde_json::to_string_pretty(&self.turns)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = temp_path(&self.path);
        let written = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                debug!(error = %cleanup, path = %tmp.display(), "no temp file to clean up");
            }
            return Err(e.into());
        }
        Ok(())
    }
}

fn read_turns(path: &Path) -> Vec<Turn> {
    if !path.exists() {
        return Vec::new();
    }
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, path = %path.display(), "cannot read conversation, starting empty");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<Turn>>(&content) {
        Ok(turns) => turns,
        Err(e) => {
            warn!(error = %e, path = %path.display(), "malformed conversation, starting empty");
            Vec::new()
        }
    }
}

fn trim_front(turns: &mut Vec<Turn>, max_turns: usize) {
    if turns.len() > max_turns {
        let excess = turns.len() - max_turns;
        turns.drain(..excess);
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "conversation.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
