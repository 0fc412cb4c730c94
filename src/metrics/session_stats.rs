use std::time::Duration;

use crate::game::{GameEvent, GameStatus};

/// Running totals across every game in one session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    pub games_played: u32,
    pub high_score: u32,
    pub best_length: usize,
    pub food_eaten: u32,
    /// Game time of finished games plus the one in progress
    pub play_time: Duration,
    current_game: Duration,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one engine event into the totals
    pub fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::FoodEaten { .. } => self.food_eaten += 1,
            GameEvent::StatusChanged {
                from,
                to: GameStatus::Playing,
            } if *from != GameStatus::Paused => self.on_game_start(),
            GameEvent::StatusChanged { .. } => {}
            GameEvent::GameOver {
                score,
                length,
                elapsed_secs,
                ..
            } => {
                self.update(*elapsed_secs);
                self.on_game_over(*score, *length);
            }
        }
    }

    /// Track the clock of the game in progress
    pub fn update(&mut self, elapsed_secs: f64) {
        let elapsed = Duration::from_secs_f64(elapsed_secs.max(0.0));
        self.play_time = self.play_time.saturating_sub(self.current_game) + elapsed;
        self.current_game = elapsed;
    }

    pub fn on_game_start(&mut self) {
        self.current_game = Duration::ZERO;
    }

    pub fn on_game_over(&mut self, final_score: u32, final_length: usize) {
        self.games_played += 1;
        self.high_score = self.high_score.max(final_score);
        self.best_length = self.best_length.max(final_length);
        self.current_game = Duration::ZERO;
    }

    /// Total play time as `mm:ss`
    pub fn format_time(&self) -> String {
        format_time(self.play_time)
    }
}

/// Format a duration as `mm:ss`; minutes keep counting past the hour
pub fn format_time(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{CollisionType, Food, FoodKind, Position};

    fn game_over(score: u32, length: usize, elapsed_secs: f64) -> GameEvent {
        GameEvent::GameOver {
            score,
            length,
            elapsed_secs,
            cause: CollisionType::Wall,
        }
    }

    fn started() -> GameEvent {
        GameEvent::StatusChanged {
            from: GameStatus::Menu,
            to: GameStatus::Playing,
        }
    }

    #[test]
    fn test_time_formatting() {
        assert_eq!(format_time(Duration::from_secs(125)), "02:05");
        assert_eq!(format_time(Duration::from_secs(0)), "00:00");
        assert_eq!(format_time(Duration::from_secs(3661)), "61:01");
        assert_eq!(format_time(Duration::from_millis(59_999)), "00:59");
    }

    #[test]
    fn test_high_score_tracking() {
        let mut stats = SessionStats::new();

        stats.on_event(&game_over(10, 6, 30.0));
        assert_eq!(stats.high_score, 10);
        assert_eq!(stats.games_played, 1);

        stats.on_event(&game_over(5, 9, 10.0));
        assert_eq!(stats.high_score, 10); // Should not decrease
        assert_eq!(stats.best_length, 9);
        assert_eq!(stats.games_played, 2);
    }

    #[test]
    fn test_food_counting() {
        let mut stats = SessionStats::new();
        let food = Food {
            position: Position::new(1.0, 1.0),
            kind: FoodKind::Golden,
            value: 5,
        };
        stats.on_event(&GameEvent::FoodEaten { food, score: 5 });
        stats.on_event(&GameEvent::FoodEaten { food, score: 10 });
        assert_eq!(stats.food_eaten, 2);
    }

    #[test]
    fn test_play_time_accumulates_across_games() {
        let mut stats = SessionStats::new();

        stats.on_event(&started());
        stats.update(20.0);
        stats.update(45.0);
        stats.on_event(&game_over(3, 4, 50.0));
        assert_eq!(stats.play_time, Duration::from_secs(50));

        stats.on_event(&started());
        stats.update(15.0);
        assert_eq!(stats.play_time, Duration::from_secs(65));
        assert_eq!(stats.format_time(), "01:05");
    }

    #[test]
    fn test_resume_keeps_current_game() {
        let mut stats = SessionStats::new();
        stats.on_event(&started());
        stats.update(12.0);
        stats.on_event(&GameEvent::StatusChanged {
            from: GameStatus::Paused,
            to: GameStatus::Playing,
        });
        stats.update(13.0);
        assert_eq!(stats.play_time, Duration::from_secs(13));
    }
}
