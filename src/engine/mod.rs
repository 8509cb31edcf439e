pub mod claim;
pub mod lifecycle;
pub mod presence;
pub mod queue;
pub mod wallet;
