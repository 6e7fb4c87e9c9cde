//! Dialogue turn aggregation.
//!
//! Pieces arrive from concurrently completing transcription workers and are
//! inserted by segment sequence number, not completion order, so a
//! late-finishing worker for an earlier segment still lands before a piece
//! from a later segment.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recognized piece of a conversational turn.
///
/// Produced by exactly one transcription worker from exactly one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnPiece {
    /// Sequence number of the segment this piece came from.
    pub sequence: u64,
    /// Identified profile id, or the unknown-speaker sentinel.
    pub speaker_id: String,
    /// Normalized transcript text.
    pub text: String,
    /// Audio duration of the source segment.
    pub duration: Duration,
}

/// Ordered collection of the pieces recognized so far in one turn.
#[derive(Debug, Default)]
pub struct DialogueTurn {
    pieces: BTreeMap<u64, TurnPiece>,
}

impl DialogueTurn {
    fn append(&mut self, piece: TurnPiece) {
        self.pieces.insert(piece.sequence, piece);
    }

    fn text(&self) -> String {
        self.pieces
            .values()
            .map(|p| p.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }

    fn pieces(&self) -> Vec<TurnPiece> {
        self.pieces.values().cloned().collect()
    }
}

/// Shared handle to the active dialogue turn.
///
/// Clones refer to the same turn instance. The session replaces its handle
/// with a fresh one at each turn boundary; a worker still holding a clone of
/// the previous handle completes its append against that detached instance,
/// whose content is then never read. This last-write-wins race is inherited
/// from the reference behavior and kept deliberately.
#[derive(Debug, Clone, Default)]
pub struct TurnHandle {
    inner: Arc<Mutex<DialogueTurn>>,
}

impl TurnHandle {
    /// Creates a handle to a fresh, empty turn.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a piece at its sequence position.
    pub fn append(&self, piece: TurnPiece) {
        if let Ok(mut turn) = self.inner.lock() {
            turn.append(piece);
        }
    }

    /// Space-joined, trimmed text of all pieces in sequence order.
    ///
    /// Pure projection; safe to call concurrently with `append`.
    pub fn text(&self) -> String {
        self.inner.lock().map(|turn| turn.text()).unwrap_or_default()
    }

    /// Returns true when no piece has contributed any text yet.
    pub fn is_blank(&self) -> bool {
        self.text().is_empty()
    }

    /// Copies out the pieces in sequence order.
    pub fn pieces(&self) -> Vec<TurnPiece> {
        self.inner
            .lock()
            .map(|turn| turn.pieces())
            .unwrap_or_default()
    }

    /// Case-insensitive substring test of the current text against phrases.
    pub fn contains_any(&self, phrases: &[String]) -> bool {
        if phrases.is_empty() {
            return false;
        }
        let text = self.text().to_lowercase();
        phrases
            .iter()
            .any(|phrase| !phrase.is_empty() && text.contains(&phrase.to_lowercase()))
    }
}
