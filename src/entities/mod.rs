//! Units, settlements and empires

pub mod empire;
pub mod settlement;
pub mod unit;

pub use empire::{Empire, GoldenAgeState, GreatPersonPool, ResearchState};
pub use settlement::{ProductionItem, Settlement};
pub use unit::{PendingEffect, SettlerMemory, Unit, WorkOrder, MAX_HEALTH};
