//! Food placement and consumption
//!
//! Placement tries random cells against a strict validity test a bounded
//! number of times, then falls back to a full scan that only requires a free,
//! unoccupied cell. The scan visits every cell at most once, so spawning always
//! terminates, and it never places food on a blocked or occupied cell.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::config::GameConfig;
use super::state::{Food, FoodKind, Position, Snake};
use super::world::{GridIndex, WorldModel};

const ORTHOGONAL: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Spawns food and detects when the head reaches it
#[derive(Debug, Clone)]
pub struct FoodManager {
    rng: StdRng,
    spawn_attempts: usize,
    obstacle_clearance: f32,
    consumption_radius: f32,
    normal_value: u32,
    golden_chance: f64,
    golden_value: u32,
    special_chance: f64,
    special_value: u32,
    extra_chance: f64,
    max_items: usize,
}

impl FoodManager {
    pub fn new(config: &GameConfig, rng: StdRng) -> Self {
        Self {
            rng,
            spawn_attempts: config.food_spawn_attempts,
            obstacle_clearance: config.food_obstacle_clearance,
            consumption_radius: config.consumption_radius,
            normal_value: config.normal_food_value,
            golden_chance: config.golden_food_chance.clamp(0.0, 1.0),
            golden_value: config.golden_food_value,
            special_chance: config.special_food_chance.clamp(0.0, 1.0),
            special_value: config.special_food_value,
            extra_chance: config.extra_food_chance.clamp(0.0, 1.0),
            max_items: config.max_food_items.max(1),
        }
    }

    pub fn from_entropy(config: &GameConfig) -> Self {
        Self::new(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: &GameConfig, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    /// Place one item and possibly a few more, up to the concurrent cap.
    ///
    /// Returns the items placed. Placement can come back empty only when the
    /// world has no free cell left or the cap is already reached.
    pub fn spawn<W: WorldModel + ?Sized>(
        &mut self,
        world: &W,
        snake: &Snake,
        food: &mut Vec<Food>,
    ) -> Vec<Food> {
        let mut placed = Vec::new();
        while food.len() < self.max_items {
            let Some(cell) = self.find_cell(world, snake, food) else {
                break;
            };
            let item = self.make_food(cell);
            food.push(item);
            placed.push(item);

            if !self.rng.gen_bool(self.extra_chance) {
                break;
            }
        }
        placed
    }

    /// Remove every item within reach of `head`, spawning a replacement for each.
    ///
    /// Returns the eaten items in the order they were stored.
    pub fn consume<W: WorldModel + ?Sized>(
        &mut self,
        head: Position,
        world: &W,
        snake: &Snake,
        food: &mut Vec<Food>,
    ) -> Vec<Food> {
        let radius = self.consumption_radius;
        let mut eaten = Vec::new();
        food.retain(|item| {
            if item.position.distance(head) <= radius {
                eaten.push(*item);
                false
            } else {
                true
            }
        });

        for _ in &eaten {
            self.spawn(world, snake, food);
        }
        eaten
    }

    fn make_food(&mut self, cell: GridIndex) -> Food {
        let roll: f64 = self.rng.gen_range(0.0..1.0);
        let (kind, value) = if roll < self.golden_chance {
            (FoodKind::Golden, self.golden_value)
        } else if roll < self.golden_chance + self.special_chance {
            (FoodKind::Special, self.special_value)
        } else {
            (FoodKind::Normal, self.normal_value)
        };
        Food {
            position: cell.into(),
            kind,
            value,
        }
    }

    fn find_cell<W: WorldModel + ?Sized>(
        &mut self,
        world: &W,
        snake: &Snake,
        food: &[Food],
    ) -> Option<GridIndex> {
        let (width, height) = (world.width() as i32, world.height() as i32);
        if width <= 0 || height <= 0 {
            return None;
        }

        for _ in 0..self.spawn_attempts {
            let cell = GridIndex::new(self.rng.gen_range(0..width), self.rng.gen_range(0..height));
            if self.is_ideal(cell, world, snake, food) {
                return Some(cell);
            }
        }

        debug!(
            attempts = self.spawn_attempts,
            "no ideal food cell found, scanning for any free cell"
        );
        let total = (width as usize) * (height as usize);
        let start = self.rng.gen_range(0..total);
        (0..total)
            .map(|offset| {
                let index = (start + offset) % total;
                GridIndex::new((index % width as usize) as i32, (index / width as usize) as i32)
            })
            .find(|cell| is_free(*cell, world, snake, food))
    }

    fn is_ideal<W: WorldModel + ?Sized>(
        &self,
        cell: GridIndex,
        world: &W,
        snake: &Snake,
        food: &[Food],
    ) -> bool {
        if !is_free(cell, world, snake, food) {
            return false;
        }
        if world.is_near_obstacle(cell.x, cell.y, self.obstacle_clearance) {
            return false;
        }
        for dy in -1..=1 {
            for dx in -1..=1 {
                if world.is_blocked(cell.x + dx, cell.y + dy) {
                    return false;
                }
            }
        }
        let open_sides = ORTHOGONAL
            .iter()
            .filter(|(dx, dy)| !world.is_blocked(cell.x + dx, cell.y + dy))
            .count();
        open_sides >= 2
    }
}

/// Minimum requirement for any food cell
fn is_free<W: WorldModel + ?Sized>(
    cell: GridIndex,
    world: &W,
    snake: &Snake,
    food: &[Food],
) -> bool {
    !world.is_blocked(cell.x, cell.y)
        && !snake.occupies(cell)
        && !food.iter().any(|f| f.position.rounded() == cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action::Direction;
    use crate::game::world::{GridWorld, WorldConfig};

    fn snake_at(x: f32, y: f32) -> Snake {
        Snake::new(Position::new(x, y), Direction::Right, 3, 1.0, 64)
    }

    fn quiet_config() -> GameConfig {
        GameConfig {
            extra_food_chance: 0.0,
            ..GameConfig::small()
        }
    }

    fn assert_strictly_valid(world: &GridWorld, snake: &Snake, item: &Food) {
        let cell = item.position.rounded();
        assert!(!world.is_blocked(cell.x, cell.y));
        assert!(!snake.occupies(cell));
        assert!(!world.is_near_obstacle(cell.x, cell.y, 2.0));
        for dy in -1..=1 {
            for dx in -1..=1 {
                assert!(!world.is_blocked(cell.x + dx, cell.y + dy));
            }
        }
    }

    #[test]
    fn test_spawn_places_valid_food() {
        let world: GridWorld = WorldConfig::new(20, 20)
            .with_obstacles([GridIndex::new(10, 4), GridIndex::new(3, 15)])
            .into();
        let snake = snake_at(10.0, 10.0);
        let mut manager = FoodManager::with_seed(&quiet_config(), 1);

        for _ in 0..50 {
            let mut food = Vec::new();
            let placed = manager.spawn(&world, &snake, &mut food);
            assert_eq!(placed.len(), 1);
            assert_strictly_valid(&world, &snake, &food[0]);
        }
    }

    #[test]
    fn test_fallback_finds_only_free_cell() {
        // Everything blocked except (1,1) and the snake's own cells
        let mut obstacles = Vec::new();
        for y in 0..6 {
            for x in 0..6 {
                let snake_row = y == 4 && x >= 1 && x <= 3;
                if (x, y) != (1, 1) && !snake_row {
                    obstacles.push(GridIndex::new(x, y));
                }
            }
        }
        let world: GridWorld = WorldConfig::new(6, 6).with_obstacles(obstacles).into();
        let snake = snake_at(3.0, 4.0);
        let mut manager = FoodManager::with_seed(&quiet_config(), 3);

        let mut food = Vec::new();
        let placed = manager.spawn(&world, &snake, &mut food);
        assert_eq!(placed.len(), 1);
        assert_eq!(food[0].position, Position::new(1.0, 1.0));
    }

    #[test]
    fn test_spawn_gives_up_when_world_is_full() {
        let obstacles = (0..4).flat_map(|x| (0..4).map(move |y| GridIndex::new(x, y)));
        let world: GridWorld = WorldConfig::new(4, 4).with_obstacles(obstacles).into();
        let snake = Snake::empty(16);
        let mut manager = FoodManager::with_seed(&quiet_config(), 9);

        let mut food = Vec::new();
        assert!(manager.spawn(&world, &snake, &mut food).is_empty());
        assert!(food.is_empty());
    }

    #[test]
    fn test_extra_spawns_respect_cap() {
        let config = GameConfig {
            extra_food_chance: 1.0,
            max_food_items: 4,
            ..GameConfig::small()
        };
        let world = GridWorld::from(WorldConfig::new(20, 20));
        let snake = snake_at(10.0, 10.0);
        let mut manager = FoodManager::with_seed(&config, 5);

        let mut food = Vec::new();
        let placed = manager.spawn(&world, &snake, &mut food);
        assert_eq!(placed.len(), 4);
        assert_eq!(food.len(), 4);
        assert!(manager.spawn(&world, &snake, &mut food).is_empty());
    }

    #[test]
    fn test_food_never_stacks() {
        let config = GameConfig {
            extra_food_chance: 1.0,
            max_food_items: 20,
            ..GameConfig::small()
        };
        let world = GridWorld::from(WorldConfig::new(6, 6));
        let snake = snake_at(3.0, 3.0);
        let mut manager = FoodManager::with_seed(&config, 11);

        let mut food = Vec::new();
        manager.spawn(&world, &snake, &mut food);
        for (i, a) in food.iter().enumerate() {
            for b in &food[i + 1..] {
                assert_ne!(a.position, b.position);
            }
        }
    }

    #[test]
    fn test_kind_weights() {
        let config = GameConfig {
            golden_food_chance: 1.0,
            ..quiet_config()
        };
        let world = GridWorld::from(WorldConfig::new(20, 20));
        let mut manager = FoodManager::with_seed(&config, 2);
        let mut food = Vec::new();
        manager.spawn(&world, &snake_at(10.0, 10.0), &mut food);
        assert_eq!(food[0].kind, FoodKind::Golden);
        assert_eq!(food[0].value, 5);

        let config = GameConfig {
            golden_food_chance: 0.0,
            ..quiet_config()
        };
        let mut manager = FoodManager::with_seed(&config, 2);
        let mut food = Vec::new();
        manager.spawn(&world, &snake_at(10.0, 10.0), &mut food);
        assert_eq!(food[0].kind, FoodKind::Normal);
        assert_eq!(food[0].value, 1);
    }

    #[test]
    fn test_consume_within_radius() {
        let world = GridWorld::from(WorldConfig::new(20, 20));
        let snake = snake_at(10.0, 10.0);
        let mut manager = FoodManager::with_seed(&quiet_config(), 4);
        let near = Food {
            position: Position::new(11.0, 10.0),
            kind: FoodKind::Golden,
            value: 7,
        };
        let far = Food {
            position: Position::new(2.0, 2.0),
            kind: FoodKind::Normal,
            value: 1,
        };
        let mut food = vec![near, far];

        let eaten = manager.consume(Position::new(10.7, 10.0), &world, &snake, &mut food);
        assert_eq!(eaten, vec![near]);
        assert_eq!(food.len(), 2);
        assert!(food.contains(&far));
        assert!(!food.contains(&near));
    }

    #[test]
    fn test_consume_misses_outside_radius() {
        let world = GridWorld::from(WorldConfig::new(20, 20));
        let snake = snake_at(10.0, 10.0);
        let mut manager = FoodManager::with_seed(&quiet_config(), 4);
        let item = Food {
            position: Position::new(11.0, 10.0),
            kind: FoodKind::Normal,
            value: 1,
        };
        let mut food = vec![item];

        let eaten = manager.consume(Position::new(10.5, 10.0), &world, &snake, &mut food);
        assert!(eaten.is_empty());
        assert_eq!(food, vec![item]);
    }
}
