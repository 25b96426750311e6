//! Tick-driven Snake state machine.
//!
//! `SnakeGame` is the single owner of all game state. The presentation layer
//! feeds it commands and timer ticks and draws the `Snapshot` it hands back;
//! nothing in here touches the DOM.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::Serialize;

use super::config::GameConfig;
use super::types::{Direction, GameOutcome, Lifecycle, Position};

/// Lifecycle or steering request coming from the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    TogglePause,
    Turn(Direction),
}

/// Read-only view handed to the renderer after every tick or accepted input.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Head first.
    pub snake: Vec<Position>,
    pub food: Option<Position>,
    pub direction: Direction,
    pub score: u32,
    pub lifecycle: Lifecycle,
    pub grid_size: u32,
}

impl Snapshot {
    pub fn head(&self) -> Option<Position> {
        self.snake.first().copied()
    }
}

pub struct SnakeGame {
    config: GameConfig,
    snake: VecDeque<Position>,
    food: Option<Position>,
    direction: Direction,
    pending_direction: Direction,
    score: u32,
    lifecycle: Lifecycle,
    rng: StdRng,
}

impl SnakeGame {
    /// New game in `NotStarted`, seeded from the platform entropy source.
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic food placement for replays and tests.
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        let origin = config.origin();
        let food = config.preview_food();
        Self {
            snake: VecDeque::from([origin]),
            food: Some(food),
            direction: Direction::Right,
            pending_direction: Direction::Right,
            score: 0,
            lifecycle: Lifecycle::NotStarted,
            config,
            rng,
        }
    }

    /// A `Running` game positioned mid-play. An empty `body` falls back to the
    /// origin cell.
    pub fn from_state(
        config: GameConfig,
        body: impl IntoIterator<Item = Position>,
        direction: Direction,
        food: Position,
        seed: u64,
    ) -> Self {
        let mut game = Self::with_seed(config, seed);
        let body: VecDeque<Position> = body.into_iter().collect();
        let grid_size = game.config.grid_size;
        debug_assert!(
            body.iter().all(|p| p.in_bounds(grid_size)),
            "body leaves the {grid_size}x{grid_size} grid"
        );
        debug_assert!(
            body.iter().enumerate().all(|(i, p)| !body.iter().skip(i + 1).any(|q| q == p)),
            "body overlaps itself"
        );
        debug_assert!(food.in_bounds(grid_size), "food outside the grid");
        debug_assert!(!body.contains(&food), "food on the snake");
        if !body.is_empty() {
            game.snake = body;
        }
        game.direction = direction;
        game.pending_direction = direction;
        game.food = Some(food);
        game.lifecycle = Lifecycle::Running;
        game
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    pub fn food(&self) -> Option<Position> {
        self.food
    }

    pub fn head(&self) -> Position {
        // body is never empty
        self.snake[0]
    }

    pub fn len(&self) -> usize {
        self.snake.len()
    }

    pub fn body(&self) -> impl Iterator<Item = Position> + '_ {
        self.snake.iter().copied()
    }

    pub fn occupies(&self, pos: Position) -> bool {
        self.snake.contains(&pos)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            snake: self.snake.iter().copied().collect(),
            food: self.food,
            direction: self.direction,
            score: self.score,
            lifecycle: self.lifecycle,
            grid_size: self.config.grid_size,
        }
    }

    /// Returns whether the command changed any state.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Start => self.start(),
            Command::TogglePause => self.toggle_pause(),
            Command::Turn(d) => self.set_direction_intent(d),
        }
    }

    /// Begin a fresh game. Ignored unless `NotStarted` or `Over`.
    pub fn start(&mut self) -> bool {
        if !self.lifecycle.can_start() {
            return false;
        }
        self.snake.clear();
        self.snake.push_back(self.config.origin());
        self.direction = Direction::Right;
        self.pending_direction = Direction::Right;
        self.score = 0;
        self.lifecycle = Lifecycle::Running;
        self.food = self.place_food();
        if self.food.is_none() {
            // 1x1 grid: the spawn cell is the whole board
            self.finish(GameOutcome::BoardFilled);
        } else {
            log::info!("game started on {0}x{0} grid", self.config.grid_size);
        }
        true
    }

    /// Queue a heading change for the next tick.
    pub fn set_direction_intent(&mut self, direction: Direction) -> bool {
        if !self.lifecycle.is_running() {
            return false;
        }
        if direction.is_opposite(self.direction) || direction == self.pending_direction {
            log::debug!(
                "ignored turn to {direction} (heading {}, queued {})",
                self.direction,
                self.pending_direction
            );
            return false;
        }
        self.pending_direction = direction;
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.lifecycle = match self.lifecycle {
            Lifecycle::Running => Lifecycle::Paused,
            Lifecycle::Paused => Lifecycle::Running,
            _ => return false,
        };
        log::info!("game {:?}", self.lifecycle);
        true
    }

    /// Advance one step. No-op unless `Running`.
    pub fn tick(&mut self) -> Snapshot {
        if self.lifecycle.is_running() {
            self.advance();
        }
        self.snapshot()
    }

    fn advance(&mut self) {
        self.direction = self.pending_direction;
        let new_head = self.head().step(self.direction);

        if !new_head.in_bounds(self.config.grid_size) {
            self.finish(GameOutcome::Wall);
            return;
        }
        if self.hits_body(new_head) {
            self.finish(GameOutcome::SelfCollision);
            return;
        }

        self.snake.push_front(new_head);
        if self.food == Some(new_head) {
            self.score += self.config.food_score;
            self.food = self.place_food();
            if self.food.is_none() {
                self.finish(GameOutcome::BoardFilled);
            }
        } else {
            self.snake.pop_back();
        }
    }

    /// Collision against the pre-move body. The tail cell counts unless
    /// `tail_vacates` is set and the tail will actually move this tick.
    fn hits_body(&self, new_head: Position) -> bool {
        let skip_tail = self.config.tail_vacates && self.food != Some(new_head);
        let checked = if skip_tail {
            self.snake.len() - 1
        } else {
            self.snake.len()
        };
        self.snake.iter().take(checked).any(|&seg| seg == new_head)
    }

    fn finish(&mut self, outcome: GameOutcome) {
        self.lifecycle = Lifecycle::Over(outcome);
        match outcome {
            GameOutcome::BoardFilled => {
                log::warn!("board filled at length {}, score {}", self.snake.len(), self.score)
            }
            _ => log::info!("game over ({outcome:?}), score {}", self.score),
        }
    }

    /// Uniform random free cell, or `None` when the snake covers the grid.
    fn place_food(&mut self) -> Option<Position> {
        let side = self.config.grid_size as i32;
        if self.snake.len() >= self.config.cell_count() {
            return None;
        }
        for _ in 0..self.config.food_attempts {
            let candidate = Position::new(self.rng.gen_range(0..side), self.rng.gen_range(0..side));
            if !self.occupies(candidate) {
                return Some(candidate);
            }
        }
        // Crowded board: pick among the remaining cells directly.
        let free: Vec<Position> = (0..side)
            .flat_map(|y| (0..side).map(move |x| Position::new(x, y)))
            .filter(|p| !self.occupies(*p))
            .collect();
        if free.is_empty() {
            return None;
        }
        Some(free[self.rng.gen_range(0..free.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(body: &[(i32, i32)], direction: Direction, food: (i32, i32)) -> SnakeGame {
        SnakeGame::from_state(
            GameConfig::default(),
            body.iter().map(|&(x, y)| Position::new(x, y)),
            direction,
            Position::new(food.0, food.1),
            7,
        )
    }

    #[test]
    fn test_initial_state_is_not_started() {
        let game = SnakeGame::with_seed(GameConfig::default(), 1);
        assert_eq!(game.lifecycle(), Lifecycle::NotStarted);
        assert_eq!(game.head(), Position::new(10, 10));
        assert_eq!(game.food(), Some(Position::new(5, 5)));
        assert_eq!(game.direction(), Direction::Right);
    }

    #[test]
    fn test_start_resets_and_places_food() {
        let mut game = SnakeGame::with_seed(GameConfig::default(), 3);
        assert!(game.start());
        assert_eq!(game.lifecycle(), Lifecycle::Running);
        assert_eq!(game.len(), 1);
        assert_eq!(game.score(), 0);
        let food = game.food().unwrap();
        assert!(food.in_bounds(20));
        assert!(!game.occupies(food));
        // second start while running is ignored
        assert!(!game.start());
    }

    #[test]
    fn test_restart_after_over() {
        let mut game = running(&[(19, 10)], Direction::Right, (0, 0));
        game.tick();
        assert_eq!(game.lifecycle(), Lifecycle::Over(GameOutcome::Wall));
        assert!(game.start());
        assert_eq!(game.lifecycle(), Lifecycle::Running);
        assert_eq!(game.body().collect::<Vec<_>>(), vec![Position::new(10, 10)]);
    }

    #[test]
    fn test_plain_move() {
        let mut game = running(&[(10, 10)], Direction::Right, (0, 0));
        let snap = game.tick();
        assert_eq!(snap.snake, vec![Position::new(11, 10)]);
        assert_eq!(snap.lifecycle, Lifecycle::Running);
    }

    #[test]
    fn test_wall_leaves_body_untouched() {
        let cases = [
            ((0, 5), Direction::Left),
            ((5, 0), Direction::Up),
            ((19, 5), Direction::Right),
            ((5, 19), Direction::Down),
        ];
        for ((x, y), dir) in cases {
            let mut game = running(&[(x, y)], dir, (10, 10));
            let snap = game.tick();
            assert_eq!(snap.lifecycle, Lifecycle::Over(GameOutcome::Wall), "{dir}");
            assert_eq!(snap.snake, vec![Position::new(x, y)], "{dir}");
            assert_eq!(snap.score, 0);
            assert_eq!(snap.food, Some(Position::new(10, 10)));
        }
    }

    #[test]
    fn test_wall_with_longer_body() {
        let mut game = running(&[(0, 3), (1, 3), (2, 3)], Direction::Left, (10, 10));
        let before: Vec<_> = game.body().collect();
        let snap = game.tick();
        assert_eq!(snap.lifecycle, Lifecycle::Over(GameOutcome::Wall));
        assert_eq!(snap.snake, before);
        // further ticks are inert
        assert_eq!(game.tick().snake, before);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "body overlaps itself")]
    fn test_from_state_rejects_overlapping_body() {
        running(&[(3, 3), (3, 4), (3, 3)], Direction::Up, (10, 10));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "food on the snake")]
    fn test_from_state_rejects_food_on_body() {
        running(&[(3, 3), (3, 4)], Direction::Up, (3, 4));
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let mut game = running(&[(5, 5), (5, 6)], Direction::Up, (5, 4));
        let snap = game.tick();
        assert_eq!(
            snap.snake,
            vec![Position::new(5, 4), Position::new(5, 5), Position::new(5, 6)]
        );
        assert_eq!(snap.score, 10);
        let food = snap.food.unwrap();
        assert!(!snap.snake.contains(&food));
    }

    #[test]
    fn test_reverse_intent_rejected() {
        let mut game = running(&[(10, 10), (9, 10)], Direction::Right, (0, 0));
        assert!(!game.set_direction_intent(Direction::Left));
        assert_eq!(game.pending_direction(), Direction::Right);
        // same as queued
        assert!(!game.set_direction_intent(Direction::Right));
        assert!(game.set_direction_intent(Direction::Up));
        // still measured against the committed heading
        assert!(!game.set_direction_intent(Direction::Left));
        game.tick();
        assert_eq!(game.direction(), Direction::Up);
        assert_eq!(game.head(), Position::new(10, 9));
    }

    #[test]
    fn test_intent_ignored_unless_running() {
        let mut game = SnakeGame::with_seed(GameConfig::default(), 1);
        assert!(!game.set_direction_intent(Direction::Up));
        game.start();
        game.toggle_pause();
        assert!(!game.set_direction_intent(Direction::Up));
        assert_eq!(game.pending_direction(), Direction::Right);
    }

    #[test]
    fn test_pause_toggle_and_frozen_tick() {
        let mut game = running(&[(10, 10)], Direction::Right, (0, 0));
        assert!(game.toggle_pause());
        assert_eq!(game.lifecycle(), Lifecycle::Paused);
        let snap = game.tick();
        assert_eq!(snap.head(), Some(Position::new(10, 10)));
        assert!(game.toggle_pause());
        assert_eq!(game.lifecycle(), Lifecycle::Running);
    }

    #[test]
    fn test_toggle_pause_not_started_is_noop() {
        let mut game = SnakeGame::with_seed(GameConfig::default(), 1);
        let before = game.snapshot();
        assert!(!game.toggle_pause());
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn test_tail_cell_counts_as_collision() {
        // square loop: head (5,5) going Down would enter the tail cell (5,6)
        let body = [(5, 5), (4, 5), (4, 6), (5, 6)];
        let mut game = running(&body, Direction::Down, (0, 0));
        game.tick();
        assert_eq!(game.lifecycle(), Lifecycle::Over(GameOutcome::SelfCollision));
    }

    #[test]
    fn test_tail_vacates_option() {
        let config = GameConfig {
            tail_vacates: true,
            ..Default::default()
        };
        let body = [(5, 5), (4, 5), (4, 6), (5, 6)].map(|(x, y)| Position::new(x, y));
        let mut game = SnakeGame::from_state(config, body, Direction::Down, Position::new(0, 0), 1);
        let snap = game.tick();
        assert_eq!(snap.lifecycle, Lifecycle::Running);
        assert_eq!(snap.head(), Some(Position::new(5, 6)));
        assert_eq!(snap.snake.len(), 4);
    }

    #[test]
    fn test_board_filled_ends_game() {
        // 2x2 grid, three cells taken, food in the last one
        let config = GameConfig::with_grid_size(2);
        let body = [(0, 1), (0, 0), (1, 0)].map(|(x, y)| Position::new(x, y));
        let mut game = SnakeGame::from_state(config, body, Direction::Right, Position::new(1, 1), 9);
        let snap = game.tick();
        assert_eq!(snap.lifecycle, Lifecycle::Over(GameOutcome::BoardFilled));
        assert_eq!(snap.food, None);
        assert_eq!(snap.snake.len(), 4);
        assert_eq!(snap.score, 10);
    }

    #[test]
    fn test_single_cell_grid_start() {
        let mut game = SnakeGame::with_seed(GameConfig::with_grid_size(1), 1);
        assert!(game.start());
        assert_eq!(game.lifecycle(), Lifecycle::Over(GameOutcome::BoardFilled));
    }

    #[test]
    fn test_crowded_board_fallback_finds_free_cell() {
        let config = GameConfig {
            grid_size: 3,
            food_attempts: 0,
            ..Default::default()
        };
        let body = [(0, 0), (1, 0), (2, 0), (2, 1), (1, 1), (0, 1), (0, 2)]
            .map(|(x, y)| Position::new(x, y));
        let mut game = SnakeGame::from_state(config, body, Direction::Down, Position::new(1, 2), 4);
        let food = game.place_food().unwrap();
        assert!(food == Position::new(1, 2) || food == Position::new(2, 2));
    }

    #[test]
    fn test_apply_dispatch() {
        let mut game = SnakeGame::with_seed(GameConfig::default(), 5);
        assert!(!game.apply(Command::TogglePause));
        assert!(game.apply(Command::Start));
        assert!(game.apply(Command::Turn(Direction::Down)));
        assert!(game.apply(Command::TogglePause));
        assert_eq!(game.lifecycle(), Lifecycle::Paused);
    }
}
