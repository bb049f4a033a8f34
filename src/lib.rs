//! Hex Empires - turn-based empire simulation core
//!
//! A deterministic rules engine for a hex map: movement and pathfinding,
//! combat, diplomacy, the per-turn economy and an AI that plays empires.
//! Every operation takes the `GameState` it works on and an `EventSink`
//! for what happened; there is no global state.

pub mod ai;
pub mod combat;
pub mod core;
pub mod diplomacy;
pub mod economy;
pub mod entities;
pub mod events;
pub mod game;
pub mod grid;
pub mod pathfinding;
pub mod rules;
pub mod turn;

pub use crate::core::{GameConfig, GameError, Result};
pub use crate::events::{EventLog, EventSink, GameEvent};
pub use crate::game::GameState;
