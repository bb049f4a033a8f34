//! Typed game events and the presentation sink
//!
//! The core reports everything a host may want to render through an
//! `EventSink`. Emitting never fails and never feeds back into game logic.

use serde::{Deserialize, Serialize};

use crate::core::types::{EmpireId, SettlementId, UnitId};
use crate::diplomacy::DealKind;
use crate::entities::{PendingEffect, ProductionItem};
use crate::grid::HexCoord;
use crate::rules::{Era, Government, GreatPersonKind, PolicyKind, PromotionId, TechId, UnitType, WonderKind};

/// Either side of a fight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Combatant {
    Unit(UnitId),
    Settlement(SettlementId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VillageReward {
    Gold(u32),
    Science(u32),
    MapReveal,
    Experience(u32),
    Population,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    // Units
    UnitCreated { owner: EmpireId, unit: UnitId, kind: UnitType, at: HexCoord },
    UnitMoved { owner: EmpireId, unit: UnitId, from: HexCoord, to: HexCoord },
    UnitFortified { owner: EmpireId, unit: UnitId },
    UnitKilled { owner: EmpireId, unit: UnitId, by: Option<EmpireId> },
    UnitDisbanded { owner: EmpireId, unit: UnitId },
    UnitPromoted { owner: EmpireId, unit: UnitId, promotion: PromotionId },
    ImprovementStarted { owner: EmpireId, unit: UnitId, effect: PendingEffect },
    ImprovementCompleted { owner: EmpireId, effect: PendingEffect },
    VillageClaimed { owner: EmpireId, at: HexCoord, reward: VillageReward },

    // Combat
    CombatResolved {
        attacker: Combatant,
        defender: Combatant,
        attacker_damage: i32,
        defender_damage: i32,
        ranged: bool,
    },

    // Settlements
    SettlementFounded { owner: EmpireId, settlement: SettlementId, name: String, at: HexCoord },
    SettlementCaptured { settlement: SettlementId, from: EmpireId, to: EmpireId },
    SettlementGrew { owner: EmpireId, settlement: SettlementId, population: u32 },
    SettlementStarved { owner: EmpireId, settlement: SettlementId, population: u32 },
    ProductionCompleted { owner: EmpireId, settlement: SettlementId, item: ProductionItem },
    WonderBuilt { owner: EmpireId, settlement: SettlementId, wonder: WonderKind },

    // Empire progress
    TechCompleted { empire: EmpireId, tech: TechId },
    EraEntered { empire: EmpireId, era: Era },
    PolicyAdopted { empire: EmpireId, policy: PolicyKind },
    GovernmentChanged { empire: EmpireId, government: Government },
    GoldenAgeStarted { empire: EmpireId },
    GoldenAgeEnded { empire: EmpireId },
    GreatPersonBorn { empire: EmpireId, kind: GreatPersonKind, unit: UnitId },
    GreatPersonUsed { empire: EmpireId, kind: GreatPersonKind },
    EmpireEliminated { empire: EmpireId },

    // Diplomacy
    EmpiresMet { a: EmpireId, b: EmpireId },
    WarDeclared { aggressor: EmpireId, target: EmpireId },
    PeaceSigned { a: EmpireId, b: EmpireId },
    PeaceProposed { from: EmpireId, to: EmpireId },
    AllianceFormed { a: EmpireId, b: EmpireId },
    DealSigned { a: EmpireId, b: EmpireId, kind: DealKind },
    DealExpired { a: EmpireId, b: EmpireId, kind: DealKind },
}

/// Receiver for events; hosts forward them to a UI, tests record them
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: GameEvent) {}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub id: u32,
    pub turn: u32,
    pub event: GameEvent,
}

/// Turn-stamped record of every emitted event
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    pub events: Vec<LoggedEvent>,
    turn: u32,
    next_event_id: u32,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp subsequent events with `turn`
    pub fn set_turn(&mut self, turn: u32) {
        self.turn = turn;
    }

    pub fn events_for_turn(&self, turn: u32) -> impl Iterator<Item = &LoggedEvent> {
        self.events.iter().filter(move |e| e.turn == turn)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter().map(|e| &e.event)
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: GameEvent) {
        let id = self.next_event_id;
        self.next_event_id += 1;
        self.events.push(LoggedEvent {
            id,
            turn: self.turn,
            event,
        });
    }
}
