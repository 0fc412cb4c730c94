use super::state::{CollisionType, Food, GameStatus};

/// Something observers may want to react to (audio, progression, UI)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// The head reached a food item
    FoodEaten { food: Food, score: u32 },
    /// Status moved between two values
    StatusChanged { from: GameStatus, to: GameStatus },
    /// A collision ended the game
    GameOver {
        score: u32,
        length: usize,
        elapsed_secs: f64,
        cause: CollisionType,
    },
}

type Observer = Box<dyn FnMut(&GameEvent)>;

/// Plain observer list; events are delivered in emission order
#[derive(Default)]
pub struct EventBus {
    observers: Vec<Observer>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn publish(&mut self, event: &GameEvent) {
        for observer in &mut self.observers {
            observer(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .finish()
    }
}
