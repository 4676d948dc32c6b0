use std::collections::VecDeque;

use crate::canvas::PixelBuffer;

/// Maximum number of snapshots kept in the undo/redo ring.
pub const MAX_HISTORY_STEPS: usize = 20;

// ============================================================================
// SNAPSHOT — full-buffer copy captured after every committed edit
// ============================================================================

/// An independently owned copy of the pixel buffer at one point in time.
///
/// Capturing clones the pixel data, so later edits to the live buffer can
/// never reach back into a stored snapshot.
#[derive(Clone, Debug)]
pub struct Snapshot {
    description: String,
    buffer: PixelBuffer,
}

impl Snapshot {
    pub fn capture(description: impl Into<String>, buffer: &PixelBuffer) -> Self {
        Self {
            description: description.into(),
            buffer: buffer.clone(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// A fresh copy of the stored pixels for the caller to own.
    pub fn restore(&self) -> PixelBuffer {
        self.buffer.clone()
    }

    pub fn memory_bytes(&self) -> usize {
        self.buffer.memory_bytes() + self.description.len()
    }
}

// ============================================================================
// HISTORY MANAGER — bounded, branch-discarding snapshot ring
// ============================================================================

/// Linear undo/redo history over full snapshots.
///
/// `cursor` points at the snapshot that matches the live buffer. Committing
/// after an undo drops everything ahead of the cursor. Once the ring holds
/// [`MAX_HISTORY_STEPS`] entries, each commit evicts the oldest one and the
/// cursor stays on the last index instead of advancing.
#[derive(Debug)]
pub struct HistoryManager {
    entries: VecDeque<Snapshot>,
    cursor: Option<usize>,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryManager {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(MAX_HISTORY_STEPS + 1),
            cursor: None,
        }
    }

    /// Record `buffer` as the newest state.
    pub fn commit(&mut self, description: impl Into<String>, buffer: &PixelBuffer) {
        // Redo branch dies here
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);

        self.entries.push_back(Snapshot::capture(description, buffer));
        if self.entries.len() > MAX_HISTORY_STEPS {
            self.entries.pop_front();
        } else {
            self.cursor = Some(keep);
        }

        tracing::debug!(
            entries = self.entries.len(),
            cursor = ?self.cursor,
            "history commit"
        );
    }

    /// Step back one snapshot. `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                tracing::debug!(cursor = c - 1, "history undo");
                self.entries.get(c - 1)
            }
            _ => None,
        }
    }

    /// Step forward one snapshot. `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        match self.cursor {
            Some(c) if c + 1 < self.entries.len() => {
                self.cursor = Some(c + 1);
                tracing::debug!(cursor = c + 1, "history redo");
                self.entries.get(c + 1)
            }
            _ => None,
        }
    }

    /// Drop every snapshot. Callers commit the seed state right after.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the snapshot matching the live buffer; `None` when empty.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    pub fn entries(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }

    pub fn undo_count(&self) -> usize {
        self.cursor.unwrap_or(0)
    }

    pub fn redo_count(&self) -> usize {
        self.cursor
            .map_or(0, |c| self.entries.len().saturating_sub(c + 1))
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.current()
            .filter(|_| self.can_undo())
            .map(Snapshot::description)
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.cursor
            .and_then(|c| self.entries.get(c + 1))
            .map(Snapshot::description)
    }

    /// Descriptions up to and including the current state, most recent first.
    pub fn undo_history(&self) -> Vec<String> {
        let upto = self.cursor.map_or(0, |c| c + 1);
        self.entries
            .iter()
            .take(upto)
            .rev()
            .map(|s| s.description.clone())
            .collect()
    }

    /// Bytes held by all stored snapshots.
    pub fn memory_usage(&self) -> usize {
        self.entries.iter().map(Snapshot::memory_bytes).sum()
    }
}
