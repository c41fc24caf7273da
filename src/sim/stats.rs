use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::sim::engine::GameResult;

/// Aggregate view over a batch of game results.
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    pub games: usize,
    pub wins: usize,
    pub average_win_turn: f64,
    pub average_ubg_turn: f64,
    /// Wins per turn number, ordered.
    pub win_turns: BTreeMap<u32, usize>,
}

impl BatchStats {
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        }
    }

    pub fn losses(&self) -> usize {
        self.games - self.wins
    }
}

pub fn summarize(results: &[GameResult]) -> BatchStats {
    let mut stats = BatchStats {
        games: results.len(),
        ..Default::default()
    };

    let mut win_turn_sum = 0u64;
    let mut ubg_sum = 0u64;
    let mut ubg_games = 0usize;

    for result in results {
        if let Some(turn) = result.win_turn {
            stats.wins += 1;
            win_turn_sum += u64::from(turn);
            *stats.win_turns.entry(turn).or_insert(0) += 1;
        }
        if let Some(turn) = result.ubg_turn {
            ubg_games += 1;
            ubg_sum += u64::from(turn);
        }
    }

    if stats.wins > 0 {
        stats.average_win_turn = win_turn_sum as f64 / stats.wins as f64;
    }
    if ubg_games > 0 {
        stats.average_ubg_turn = ubg_sum as f64 / ubg_games as f64;
    }
    stats
}

/// Render the win-turn distribution as a bar chart, one row per turn.
pub fn render_histogram(stats: &BatchStats) -> String {
    let mut out = String::new();
    for (turn, count) in &stats.win_turns {
        let pct = *count as f64 / stats.games.max(1) as f64 * 100.0;
        let bar = "█".repeat((pct / 2.0) as usize);
        let _ = writeln!(out, "  Turn {turn:2}: {pct:5.1}% {bar} ({count})");
    }
    let losses = stats.losses();
    if losses > 0 {
        let pct = losses as f64 / stats.games.max(1) as f64 * 100.0;
        let _ = writeln!(out, "  No win: {pct:5.1}% ({losses})");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(win_turn: Option<u32>, ubg_turn: Option<u32>) -> GameResult {
        GameResult { win_turn, ubg_turn }
    }

    #[test]
    fn summary_over_mixed_results() {
        let results = vec![
            result(Some(4), Some(3)),
            result(Some(6), Some(3)),
            result(None, Some(5)),
            result(None, None),
        ];
        let stats = summarize(&results);
        assert_eq!(stats.games, 4);
        assert_eq!(stats.wins, 2);
        assert!((stats.win_rate() - 0.5).abs() < f64::EPSILON);
        assert!((stats.average_win_turn - 5.0).abs() < f64::EPSILON);
        assert!((stats.average_ubg_turn - 11.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats.win_turns.get(&4), Some(&1));
        assert_eq!(stats.losses(), 2);
    }

    #[test]
    fn empty_batch_is_all_zero() {
        let stats = summarize(&[]);
        assert_eq!(stats.games, 0);
        assert_eq!(stats.win_rate(), 0.0);
    }

    #[test]
    fn histogram_lists_turns_in_order() {
        let results = vec![
            result(Some(6), None),
            result(Some(4), None),
            result(Some(4), None),
            result(None, None),
        ];
        let rendered = render_histogram(&summarize(&results));
        let turn4 = rendered.find("Turn  4").unwrap();
        let turn6 = rendered.find("Turn  6").unwrap();
        assert!(turn4 < turn6);
        assert!(rendered.contains("No win"));
    }
}
