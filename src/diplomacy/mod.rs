//! Diplomatic relationships, deals and the AI rules that drive them

pub mod heuristics;
pub mod relations;
pub mod table;

pub use heuristics::{should_accept_peace, should_declare_war, strength_ratio};
pub use relations::{Deal, DealKind, Relationship, Status};
pub use table::Diplomacy;
