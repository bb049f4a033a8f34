//! Pairwise relationship state and time-limited deals

use serde::{Deserialize, Serialize};

use crate::core::types::{EmpireId, EmpirePair};
use crate::grid::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Status {
    #[default]
    Neutral,
    Friendly,
    Hostile,
    War,
    Peace,
    Alliance,
}

impl Status {
    /// Held by a deal or a war rather than derived from opinion
    pub fn is_locked(&self) -> bool {
        matches!(self, Status::War | Status::Peace | Status::Alliance)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub status: Status,
    /// Clamped to [-100, 100]
    pub opinion: f32,
    pub turns_at_war: u32,
    pub turns_known: u32,
    pub open_borders: bool,
    pub allied: bool,
}

impl Default for Relationship {
    fn default() -> Self {
        Self {
            status: Status::Neutral,
            opinion: 0.0,
            turns_at_war: 0,
            turns_known: 0,
            open_borders: false,
            allied: false,
        }
    }
}

impl Relationship {
    pub fn is_at_war(&self) -> bool {
        self.status == Status::War
    }

    pub fn adjust_opinion(&mut self, delta: f32) {
        self.opinion = (self.opinion + delta).clamp(-100.0, 100.0);
    }

    /// Move opinion toward zero without crossing it
    pub fn drift(&mut self, positive_rate: f32, negative_rate: f32) {
        if self.opinion > 0.0 {
            self.opinion = (self.opinion - positive_rate).max(0.0);
        } else if self.opinion < 0.0 {
            self.opinion = (self.opinion + negative_rate).min(0.0);
        }
    }

    /// Re-derive an unlocked status from opinion
    pub fn derive_status(&mut self, friendly_threshold: f32, hostile_threshold: f32) {
        if self.status.is_locked() {
            return;
        }
        self.status = if self.opinion >= friendly_threshold {
            Status::Friendly
        } else if self.opinion <= hostile_threshold {
            Status::Hostile
        } else {
            Status::Neutral
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DealKind {
    PeaceTreaty,
    OpenBorders,
    Alliance,
    ResourceTrade {
        from: EmpireId,
        to: EmpireId,
        resource: ResourceKind,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub kind: DealKind,
    pub parties: EmpirePair,
    pub remaining: u32,
}
