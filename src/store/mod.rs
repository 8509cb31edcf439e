mod memory;

pub use memory::{OrderStore, TransitionRecord};
