//! The diplomacy state machine over every pair of empires that has met

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::core::config::DiplomacyConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{EmpireId, EmpirePair};
use crate::diplomacy::relations::{Deal, DealKind, Relationship, Status};
use crate::events::{EventSink, GameEvent};
use crate::grid::ResourceKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diplomacy {
    #[serde(with = "crate::core::serde_pairs")]
    relations: BTreeMap<EmpirePair, Relationship>,
    deals: Vec<Deal>,
}

fn pair(a: EmpireId, b: EmpireId) -> Result<EmpirePair> {
    EmpirePair::new(a, b).ok_or_else(|| GameError::InvalidTransition(format!("{} cannot deal with itself", a)))
}

impl Diplomacy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record first contact. Returns true if the pair had not met before.
    pub fn meet(&mut self, a: EmpireId, b: EmpireId, sink: &mut dyn EventSink) -> bool {
        let Some(key) = EmpirePair::new(a, b) else {
            return false;
        };
        if self.relations.contains_key(&key) {
            return false;
        }
        self.relations.insert(key, Relationship::default());
        info!("{} and {} have met", a, b);
        sink.emit(GameEvent::EmpiresMet { a, b });
        true
    }

    pub fn has_met(&self, a: EmpireId, b: EmpireId) -> bool {
        EmpirePair::new(a, b).is_some_and(|key| self.relations.contains_key(&key))
    }

    pub fn relationship(&self, a: EmpireId, b: EmpireId) -> Option<&Relationship> {
        EmpirePair::new(a, b).and_then(|key| self.relations.get(&key))
    }

    fn relationship_mut(&mut self, a: EmpireId, b: EmpireId) -> Result<&mut Relationship> {
        let key = pair(a, b)?;
        self.relations.get_mut(&key).ok_or(GameError::NotMet(a, b))
    }

    pub fn relationships(&self) -> impl Iterator<Item = (&EmpirePair, &Relationship)> {
        self.relations.iter()
    }

    pub fn status(&self, a: EmpireId, b: EmpireId) -> Option<Status> {
        self.relationship(a, b).map(|r| r.status)
    }

    /// Opinion between the pair; zero if they have not met
    pub fn opinion(&self, a: EmpireId, b: EmpireId) -> f32 {
        self.relationship(a, b).map_or(0.0, |r| r.opinion)
    }

    pub fn is_at_war(&self, a: EmpireId, b: EmpireId) -> bool {
        self.relationship(a, b).is_some_and(|r| r.is_at_war())
    }

    /// Empires `id` has met, in id order
    pub fn known_empires(&self, id: EmpireId) -> Vec<EmpireId> {
        self.relations.keys().filter_map(|key| key.other(id)).collect()
    }

    pub fn deals(&self) -> &[Deal] {
        &self.deals
    }

    pub fn deals_between(&self, a: EmpireId, b: EmpireId) -> impl Iterator<Item = &Deal> {
        let key = EmpirePair::new(a, b);
        self.deals.iter().filter(move |d| Some(d.parties) == key)
    }

    pub fn has_peace_treaty(&self, a: EmpireId, b: EmpireId) -> bool {
        self.deals_between(a, b).any(|d| d.kind == DealKind::PeaceTreaty)
    }

    /// Resources flowing to `id` through active trade deals
    pub fn resources_received(&self, id: EmpireId) -> Vec<ResourceKind> {
        self.deals
            .iter()
            .filter_map(|d| match d.kind {
                DealKind::ResourceTrade { to, resource, .. } if to == id => Some(resource),
                _ => None,
            })
            .collect()
    }

    pub fn adjust_opinion(&mut self, a: EmpireId, b: EmpireId, delta: f32) {
        if let Ok(rel) = self.relationship_mut(a, b) {
            rel.adjust_opinion(delta);
        }
    }

    /// Enter war from any state unless a peace treaty is active.
    ///
    /// Clears open borders and alliance, cancels every deal between the pair,
    /// costs opinion between them and with every third party that has met
    /// the aggressor.
    pub fn declare_war(
        &mut self,
        aggressor: EmpireId,
        target: EmpireId,
        config: &DiplomacyConfig,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        let key = pair(aggressor, target)?;
        let rel = self.relations.get(&key).ok_or(GameError::NotMet(aggressor, target))?;
        if rel.is_at_war() {
            return Err(GameError::AlreadyAtWar(aggressor, target));
        }
        if self.has_peace_treaty(aggressor, target) {
            return Err(GameError::PeaceTreatyActive(aggressor, target));
        }

        self.deals.retain(|d| d.parties != key);
        if let Some(rel) = self.relations.get_mut(&key) {
            rel.status = Status::War;
            rel.turns_at_war = 0;
            rel.open_borders = false;
            rel.allied = false;
            rel.adjust_opinion(-config.war_opinion_penalty);
        }

        for (other_key, other_rel) in self.relations.iter_mut() {
            if *other_key == key {
                continue;
            }
            if other_key.contains(aggressor) {
                other_rel.adjust_opinion(-config.warmonger_penalty);
            }
        }

        info!("{} declared war on {}", aggressor, target);
        sink.emit(GameEvent::WarDeclared { aggressor, target });
        Ok(())
    }

    /// Sign a peace treaty once the war has lasted the minimum duration
    pub fn make_peace(
        &mut self,
        a: EmpireId,
        b: EmpireId,
        config: &DiplomacyConfig,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        let key = pair(a, b)?;
        let rel = self.relationship_mut(a, b)?;
        if !rel.is_at_war() {
            return Err(GameError::NotAtWar(a, b));
        }
        if rel.turns_at_war < config.min_war_turns {
            return Err(GameError::WarTooShort {
                turns: rel.turns_at_war,
                required: config.min_war_turns,
            });
        }

        rel.status = Status::Peace;
        rel.turns_at_war = 0;
        self.deals.push(Deal {
            kind: DealKind::PeaceTreaty,
            parties: key,
            remaining: config.peace_treaty_turns,
        });

        info!("{} and {} signed peace", a, b);
        sink.emit(GameEvent::PeaceSigned { a, b });
        Ok(())
    }

    /// Peace or Friendly pairs may ally
    pub fn propose_alliance(
        &mut self,
        a: EmpireId,
        b: EmpireId,
        config: &DiplomacyConfig,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        let key = pair(a, b)?;
        let rel = self.relationship_mut(a, b)?;
        if !matches!(rel.status, Status::Peace | Status::Friendly) {
            return Err(GameError::InvalidTransition(format!(
                "alliance requires peace or friendship, status is {:?}",
                rel.status
            )));
        }

        rel.status = Status::Alliance;
        rel.allied = true;
        self.deals.push(Deal {
            kind: DealKind::Alliance,
            parties: key,
            remaining: config.alliance_turns,
        });

        info!("{} and {} formed an alliance", a, b);
        sink.emit(GameEvent::AllianceFormed { a, b });
        Ok(())
    }

    pub fn open_borders(
        &mut self,
        a: EmpireId,
        b: EmpireId,
        config: &DiplomacyConfig,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        let key = pair(a, b)?;
        let rel = self.relationship_mut(a, b)?;
        if rel.is_at_war() {
            return Err(GameError::InvalidTransition("cannot open borders while at war".to_string()));
        }
        if rel.open_borders {
            return Err(GameError::InvalidTransition("borders already open".to_string()));
        }

        rel.open_borders = true;
        self.deals.push(Deal {
            kind: DealKind::OpenBorders,
            parties: key,
            remaining: config.open_borders_turns,
        });
        sink.emit(GameEvent::DealSigned {
            a,
            b,
            kind: DealKind::OpenBorders,
        });
        Ok(())
    }

    /// `from` grants `resource` to `to` for the length of the deal
    pub fn trade_resource(
        &mut self,
        from: EmpireId,
        to: EmpireId,
        resource: ResourceKind,
        config: &DiplomacyConfig,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        let key = pair(from, to)?;
        let rel = self.relationship_mut(from, to)?;
        if rel.is_at_war() {
            return Err(GameError::InvalidTransition("cannot trade while at war".to_string()));
        }

        let kind = DealKind::ResourceTrade { from, to, resource };
        self.deals.push(Deal {
            kind,
            parties: key,
            remaining: config.trade_turns,
        });
        sink.emit(GameEvent::DealSigned { a: from, b: to, kind });
        Ok(())
    }

    /// Advance one turn: expire deals, count turns, apply opinion pressure
    /// and drift, then re-derive unlocked statuses.
    ///
    /// `touching` lists the pairs whose territories border each other.
    pub fn tick(&mut self, touching: &BTreeSet<EmpirePair>, config: &DiplomacyConfig, sink: &mut dyn EventSink) {
        let mut expired = Vec::new();
        for deal in self.deals.iter_mut() {
            deal.remaining = deal.remaining.saturating_sub(1);
            if deal.remaining == 0 {
                expired.push(deal.clone());
            }
        }
        self.deals.retain(|d| d.remaining > 0);

        for deal in expired {
            if let Some(rel) = self.relations.get_mut(&deal.parties) {
                match deal.kind {
                    DealKind::PeaceTreaty => {
                        if rel.status == Status::Peace {
                            rel.status = Status::Neutral;
                        }
                    }
                    DealKind::OpenBorders => rel.open_borders = false,
                    DealKind::Alliance => {
                        rel.allied = false;
                        if rel.status == Status::Alliance {
                            rel.status = Status::Neutral;
                        }
                    }
                    DealKind::ResourceTrade { .. } => {}
                }
            }
            let (a, b) = deal.parties.members();
            sink.emit(GameEvent::DealExpired { a, b, kind: deal.kind });
        }

        for (key, rel) in self.relations.iter_mut() {
            rel.turns_known += 1;
            if rel.is_at_war() {
                rel.turns_at_war += 1;
            }

            if touching.contains(key) {
                rel.adjust_opinion(-config.border_tension);
            }
            if rel.open_borders || rel.allied {
                rel.adjust_opinion(config.partnership_bonus);
            }
            rel.drift(config.positive_drift, config.negative_drift);
            rel.derive_status(config.friendly_threshold, config.hostile_threshold);
        }
    }

    /// Drop every deal involving `id` (used when an empire is eliminated)
    pub fn remove_empire(&mut self, id: EmpireId) {
        self.deals.retain(|d| !d.parties.contains(id));
    }
}
