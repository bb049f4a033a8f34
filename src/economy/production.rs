//! Production queues: gating, overflow and completion

use tracing::{debug, info, warn};

use crate::core::error::{GameError, Result};
use crate::core::types::SettlementId;
use crate::entities::ProductionItem;
use crate::events::{EventSink, GameEvent};
use crate::game::GameState;
use crate::grid::GridProvider;
use crate::rules::BuildingKind;

impl GameState {
    /// Tech, resource, building and uniqueness gates for `item` in a settlement
    pub fn can_produce(&self, settlement: SettlementId, item: ProductionItem) -> bool {
        let Some(owner) = self.settlement_owner(settlement) else {
            return false;
        };
        let Some(empire) = self.empires.get(&owner) else {
            return false;
        };
        let Some(s) = empire.settlements.get(&settlement) else {
            return false;
        };

        match item {
            ProductionItem::Unit(kind) => {
                let stats = kind.stats();
                if !kind.is_trainable() || !empire.research.satisfies(stats.tech) {
                    return false;
                }
                if stats.resource.is_some_and(|r| !empire.has_resource(r)) {
                    return false;
                }
                !kind.is_naval() || self.grid.neighbors(s.position).iter().any(|t| t.is_water())
            }
            ProductionItem::Building(kind) => {
                let stats = kind.stats();
                !s.has_building(kind)
                    && empire.research.satisfies(stats.tech)
                    && stats.requires.map_or(true, |req| s.has_building(req))
            }
            ProductionItem::Wonder(kind) => {
                !self.wonders_built.contains_key(&kind)
                    && !self.all_settlements().any(|other| other.queue.contains(&item) && other.id != settlement)
                    && empire.research.satisfies(kind.stats().tech)
            }
            ProductionItem::Wealth => true,
        }
    }

    /// Append an item to a settlement's queue
    pub fn enqueue(&mut self, settlement: SettlementId, item: ProductionItem) -> Result<()> {
        if self.settlement(settlement).is_none() {
            return Err(GameError::SettlementNotFound(settlement));
        }
        if !self.can_produce(settlement, item) {
            return Err(GameError::PrerequisiteMissing(format!("{} cannot build {}", settlement, item.name())));
        }
        if let Some(s) = self.settlement_mut(settlement) {
            s.queue.push_back(item);
        }
        Ok(())
    }

    /// Put `amount` production into the head of the queue, completing it
    /// when paid for. Overflow stays stored for the next item. Items that
    /// became impossible (a wonder finished elsewhere) are dropped first.
    pub fn advance_production(
        &mut self,
        settlement: SettlementId,
        amount: f32,
        sink: &mut dyn EventSink,
    ) -> Option<ProductionItem> {
        while let Some(item) = self.settlement(settlement).and_then(|s| s.current_item()) {
            if self.can_produce(settlement, item) {
                break;
            }
            debug!("{} drops {} from its queue", settlement, item.name());
            if let Some(s) = self.settlement_mut(settlement) {
                s.queue.pop_front();
            }
        }

        let s = self.settlement_mut(settlement)?;
        let owner = s.owner;
        let completed = match s.current_item() {
            None => {
                s.production += amount;
                None
            }
            Some(ProductionItem::Wealth) => {
                s.queue.pop_front();
                if let Some(e) = self.empires.get_mut(&owner) {
                    e.gold += amount;
                }
                Some(ProductionItem::Wealth)
            }
            Some(item) => {
                s.production += amount;
                if s.production >= item.cost() {
                    s.production -= item.cost();
                    s.queue.pop_front();
                    Some(item)
                } else {
                    None
                }
            }
        };

        let item = completed?;
        self.complete_item(settlement, item, sink);
        sink.emit(GameEvent::ProductionCompleted {
            owner,
            settlement,
            item,
        });
        Some(item)
    }

    fn complete_item(&mut self, settlement: SettlementId, item: ProductionItem, sink: &mut dyn EventSink) {
        let Some(s) = self.settlement(settlement) else {
            return;
        };
        let owner = s.owner;
        let position = s.position;
        let has_barracks = s.has_building(BuildingKind::Barracks);

        match item {
            ProductionItem::Unit(kind) => match self.spawn_unit(owner, kind, position, sink) {
                Ok(id) => {
                    if has_barracks {
                        let xp = self.config.economy.barracks_xp;
                        if let Some(u) = self.unit_mut(id).filter(|u| u.is_military()) {
                            u.xp += xp;
                        }
                    }
                }
                Err(e) => warn!("{} could not train {:?}: {}", settlement, kind, e),
            },
            ProductionItem::Building(kind) => {
                if let Some(s) = self.settlement_mut(settlement) {
                    s.buildings.insert(kind);
                }
            }
            ProductionItem::Wonder(kind) => {
                if self.wonders_built.contains_key(&kind) {
                    return;
                }
                self.wonders_built.insert(kind, owner);
                if let Some(s) = self.settlement_mut(settlement) {
                    s.wonders.insert(kind);
                }
                info!("{} completed {}", owner, kind.stats().name);
                sink.emit(GameEvent::WonderBuilt {
                    owner,
                    settlement,
                    wonder: kind,
                });
            }
            ProductionItem::Wealth => {}
        }
    }
}
