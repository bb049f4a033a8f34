//! Governments and social policies

use serde::{Deserialize, Serialize};

use crate::rules::modifiers::Modifiers;
use crate::rules::techs::TechId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Government {
    #[default]
    Despotism,
    Monarchy,
    Republic,
    Theocracy,
}

impl Government {
    pub const ALL: [Government; 4] = [
        Government::Despotism,
        Government::Monarchy,
        Government::Republic,
        Government::Theocracy,
    ];

    pub fn tech(&self) -> Option<TechId> {
        match self {
            Government::Despotism => None,
            Government::Monarchy => Some(TechId::Calendar),
            Government::Republic => Some(TechId::Philosophy),
            Government::Theocracy => Some(TechId::Theology),
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            Government::Despotism => Modifiers::NONE,
            Government::Monarchy => Modifiers {
                production: 0.1,
                combat: 0.1,
                maintenance_reduction: 0.25,
                ..Modifiers::NONE
            },
            Government::Republic => Modifiers {
                gold: 0.1,
                science: 0.15,
                ..Modifiers::NONE
            },
            Government::Theocracy => Modifiers {
                culture: 0.25,
                combat: 0.05,
                happiness: 2,
                ..Modifiers::NONE
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PolicyKind {
    Tradition,
    Liberty,
    Honor,
    Piety,
    Commerce,
    Rationalism,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 6] = [
        PolicyKind::Tradition,
        PolicyKind::Liberty,
        PolicyKind::Honor,
        PolicyKind::Piety,
        PolicyKind::Commerce,
        PolicyKind::Rationalism,
    ];

    pub fn prerequisite(&self) -> Option<PolicyKind> {
        match self {
            PolicyKind::Piety => Some(PolicyKind::Tradition),
            PolicyKind::Commerce => Some(PolicyKind::Liberty),
            PolicyKind::Rationalism => Some(PolicyKind::Liberty),
            _ => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            PolicyKind::Tradition => Modifiers {
                food: 0.1,
                ..Modifiers::NONE
            },
            PolicyKind::Liberty => Modifiers {
                production: 0.1,
                ..Modifiers::NONE
            },
            PolicyKind::Honor => Modifiers {
                combat: 0.1,
                ..Modifiers::NONE
            },
            PolicyKind::Piety => Modifiers {
                culture: 0.1,
                happiness: 2,
                ..Modifiers::NONE
            },
            PolicyKind::Commerce => Modifiers {
                gold: 0.15,
                ..Modifiers::NONE
            },
            PolicyKind::Rationalism => Modifiers {
                science: 0.15,
                ..Modifiers::NONE
            },
        }
    }
}

/// Culture needed for the next policy: `base × growth^adopted`, rounded
pub fn policy_cost(adopted: usize, base: f32, growth: f32) -> f32 {
    (base * growth.powi(adopted as i32)).round()
}
