//! Combat resolution
//!
//! `modifiers` turns snapshots of both sides into effective strengths and
//! damage; `resolve` validates a pairing against the game state and applies
//! the result.

pub mod modifiers;
pub mod resolve;

pub use modifiers::{compute_damage, effective_strengths, Battleground, Damage, Fighter, FighterKind};
pub use resolve::{CombatOutcome, SETTLEMENT_BOMBARD_RANGE};
