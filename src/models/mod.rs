pub mod actor;
pub mod order;
pub mod partner;
pub mod wallet;
