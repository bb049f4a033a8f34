//! Empires: the owners of units and settlements

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::ai::personality::Personality;
use crate::core::types::{Controller, EmpireId, SettlementId, UnitId};
use crate::entities::settlement::Settlement;
use crate::entities::unit::Unit;
use crate::grid::{HexCoord, ResourceKind, Yields};
use crate::rules::governments::{Government, PolicyKind};
use crate::rules::modifiers::Modifiers;
use crate::rules::techs::{Era, TechId};
use crate::rules::units::GreatPersonKind;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResearchState {
    pub current: Option<TechId>,
    pub progress: f32,
    pub unlocked: BTreeSet<TechId>,
}

impl ResearchState {
    pub fn has(&self, tech: TechId) -> bool {
        self.unlocked.contains(&tech)
    }

    /// True when `tech` is None or unlocked
    pub fn satisfies(&self, tech: Option<TechId>) -> bool {
        tech.map_or(true, |t| self.has(t))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldenAgeState {
    pub active: bool,
    pub turns_left: u32,
    pub progress: f32,
    pub threshold: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreatPersonPool {
    pub points: f32,
    pub threshold: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Empire {
    pub id: EmpireId,
    pub name: String,
    pub controller: Controller,
    pub personality: Personality,
    pub units: BTreeMap<UnitId, Unit>,
    pub settlements: BTreeMap<SettlementId, Settlement>,

    pub gold: f32,
    /// Lifetime science, for reporting
    pub science_total: f32,
    /// Unspent culture toward the next policy
    pub culture: f32,
    pub culture_total: f32,
    pub strategic: BTreeMap<ResourceKind, u32>,
    pub luxuries: BTreeSet<ResourceKind>,

    pub discovered: BTreeSet<HexCoord>,
    pub visible: BTreeSet<HexCoord>,

    pub research: ResearchState,
    pub era: Era,

    pub government: Government,
    pub policies: BTreeSet<PolicyKind>,
    pub anarchy_turns: u32,

    pub golden_age: GoldenAgeState,
    pub great_people: BTreeMap<GreatPersonKind, GreatPersonPool>,

    /// Happiness computed during the last economy update
    pub happiness: i32,
    /// Yields gathered during the last economy update
    pub last_yields: Yields,
    pub score: u32,
    pub eliminated: bool,
}

impl Empire {
    pub fn new(
        id: EmpireId,
        name: impl Into<String>,
        controller: Controller,
        golden_age_threshold: f32,
        great_person_threshold: f32,
    ) -> Self {
        let great_people = GreatPersonKind::ALL
            .into_iter()
            .map(|kind| {
                (
                    kind,
                    GreatPersonPool {
                        points: 0.0,
                        threshold: great_person_threshold,
                    },
                )
            })
            .collect();

        Self {
            id,
            name: name.into(),
            controller,
            personality: Personality::for_empire(id),
            units: BTreeMap::new(),
            settlements: BTreeMap::new(),
            gold: 0.0,
            science_total: 0.0,
            culture: 0.0,
            culture_total: 0.0,
            strategic: BTreeMap::new(),
            luxuries: BTreeSet::new(),
            discovered: BTreeSet::new(),
            visible: BTreeSet::new(),
            research: ResearchState::default(),
            era: Era::Ancient,
            government: Government::Despotism,
            policies: BTreeSet::new(),
            anarchy_turns: 0,
            golden_age: GoldenAgeState {
                active: false,
                turns_left: 0,
                progress: 0.0,
                threshold: golden_age_threshold,
            },
            great_people,
            happiness: 0,
            last_yields: Yields::ZERO,
            score: 0,
            eliminated: false,
        }
    }

    pub fn is_ai(&self) -> bool {
        self.controller == Controller::Ai
    }

    pub fn capital(&self) -> Option<&Settlement> {
        self.settlements
            .values()
            .find(|s| s.is_capital)
            .or_else(|| self.settlements.values().next())
    }

    pub fn capital_id(&self) -> Option<SettlementId> {
        self.capital().map(|s| s.id)
    }

    pub fn total_population(&self) -> u32 {
        self.settlements.values().map(|s| s.population).sum()
    }

    pub fn has_resource(&self, resource: ResourceKind) -> bool {
        self.strategic.get(&resource).copied().unwrap_or(0) > 0 || self.luxuries.contains(&resource)
    }

    /// Government, policy and golden-age modifiers combined
    pub fn modifiers(&self, golden_age_bonus: f32) -> Modifiers {
        let mut total = self.government.modifiers();
        for policy in &self.policies {
            total += policy.modifiers();
        }
        if self.golden_age.active {
            total += Modifiers {
                production: golden_age_bonus,
                gold: golden_age_bonus,
                ..Modifiers::NONE
            };
        }
        total
    }

    pub fn in_anarchy(&self) -> bool {
        self.anarchy_turns > 0
    }

    /// Sum of each combat unit's strength scaled by health
    pub fn military_strength(&self) -> f32 {
        self.units
            .values()
            .filter(|u| u.is_combatant())
            .map(|u| {
                let stats = u.stats();
                let best = stats.ranged.map_or(stats.strength, |r| r.strength.max(stats.strength));
                best * u.health.max(0) as f32 / 100.0
            })
            .sum()
    }

    pub fn is_defeated(&self) -> bool {
        self.settlements.is_empty() && self.units.is_empty()
    }

    pub fn tile_owned(&self, coord: HexCoord) -> bool {
        self.settlements.values().any(|s| s.territory.contains(&coord))
    }

    pub fn settlement_at(&self, coord: HexCoord) -> Option<&Settlement> {
        self.settlements.values().find(|s| s.position == coord)
    }
}
