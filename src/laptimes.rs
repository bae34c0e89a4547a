//! Fastest-lap leaderboard
//!
//! Persisted as JSON, keeps the top 10 laps by tick count.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Maximum number of laps to keep
pub const MAX_LAP_ENTRIES: usize = 10;

/// A single recorded lap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapEntry {
    /// Lap duration in simulation ticks
    pub ticks: u64,
    /// Episode the lap was driven in
    pub episode: u32,
}

/// Lap leaderboard, fastest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LapBoard {
    pub entries: Vec<LapEntry>,
}

impl LapBoard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a lap time makes the board
    pub fn qualifies(&self, ticks: u64) -> bool {
        if ticks == 0 {
            return false;
        }
        if self.entries.len() < MAX_LAP_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| ticks < e.ticks).unwrap_or(true)
    }

    /// Rank a lap would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, ticks: u64) -> Option<usize> {
        if !self.qualifies(ticks) {
            return None;
        }
        let rank = self.entries.iter().position(|e| ticks < e.ticks);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Record a lap. Returns the rank achieved (1-indexed) or None.
    pub fn add_lap(&mut self, ticks: u64, episode: u32) -> Option<usize> {
        let rank = self.potential_rank(ticks)?;
        self.entries.insert(rank - 1, LapEntry { ticks, episode });
        self.entries.truncate(MAX_LAP_ENTRIES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fastest lap (if any)
    pub fn best(&self) -> Option<u64> {
        self.entries.first().map(|e| e.ticks)
    }

    /// Load a board from JSON, starting fresh if the file is missing or unreadable
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path)
            .map_err(SettingsError::from)
            .and_then(|json| serde_json::from_str::<LapBoard>(&json).map_err(SettingsError::from))
        {
            Ok(board) => {
                log::info!("Loaded {} lap times", board.entries.len());
                board
            }
            Err(e) => {
                log::info!("No lap times found ({e}), starting fresh");
                Self::new()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        std::fs::write(path.as_ref(), serde_json::to_string_pretty(self)?)?;
        log::info!("Lap times saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_fastest_first() {
        let mut board = LapBoard::new();
        assert_eq!(board.add_lap(900, 0), Some(1));
        assert_eq!(board.add_lap(700, 1), Some(1));
        assert_eq!(board.add_lap(800, 2), Some(2));
        assert_eq!(board.add_lap(1000, 3), Some(4));
        let ticks: Vec<u64> = board.entries.iter().map(|e| e.ticks).collect();
        assert_eq!(ticks, vec![700, 800, 900, 1000]);
        assert_eq!(board.best(), Some(700));
    }

    #[test]
    fn test_board_is_capped() {
        let mut board = LapBoard::new();
        for i in 0..MAX_LAP_ENTRIES as u64 {
            board.add_lap(100 + i, 0);
        }
        assert!(!board.qualifies(500));
        assert_eq!(board.add_lap(500, 1), None);
        assert_eq!(board.potential_rank(50), Some(1));
        assert_eq!(board.add_lap(50, 1), Some(1));
        assert_eq!(board.entries.len(), MAX_LAP_ENTRIES);
        assert_eq!(board.entries.last().map(|e| e.ticks), Some(108));
    }

    #[test]
    fn test_zero_tick_lap_rejected() {
        let board = LapBoard::new();
        assert!(!board.qualifies(0));
        assert!(board.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("track-racer-laps-{}.json", std::process::id()));
        let mut board = LapBoard::new();
        board.add_lap(640, 3);
        board.save(&path).unwrap();
        assert_eq!(LapBoard::load(&path), board);
        let _ = std::fs::remove_file(&path);
        assert!(LapBoard::load(&path).is_empty());
    }
}
