pub mod headless;
pub mod stepper;

pub use headless::{HeadlessConfig, HeadlessMode, WanderInput};
pub use stepper::FixedStepper;
