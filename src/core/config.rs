//! Game configuration with documented constants
//!
//! Every tuned number used by combat, diplomacy, the economy and the AI lives
//! here. Hosts may override any subset from a TOML file; missing keys keep
//! their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{GameError, Result};

/// Top-level tuning for a game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub combat: CombatConfig,
    pub diplomacy: DiplomacyConfig,
    pub economy: EconomyConfig,
    pub ai: AiConfig,
}

/// Combat resolution constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Damage dealt by a side holding 100% of the combined strength
    pub damage_scale: f32,
    /// Floor applied to every damage roll
    pub min_damage: f32,
    /// Strength multiplier for land units standing on water
    pub embark_multiplier: f32,
    /// Additive defense bonus for fortified defenders (0.5 = +50%)
    pub fortify_bonus: f32,
    /// Additive bonus when a friendly great general is nearby
    pub great_general_bonus: f32,
    /// Radius of the great general aura in hexes
    pub great_general_radius: i32,
    /// Defense bonus for a defender standing on a river tile against melee
    pub river_defense_bonus: f32,
    /// Settlement HP loss multiplier for melee attacks
    pub settlement_melee_multiplier: f32,
    /// Settlement HP loss multiplier for ranged attacks
    pub settlement_ranged_multiplier: f32,
    /// Experience for combat involving a settlement
    pub settlement_xp: u32,
    /// Experience for unit-vs-unit combat
    pub unit_xp: u32,
    /// Share of the attacker's experience awarded to the defender
    pub defender_xp_share: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            damage_scale: 30.0,
            min_damage: 5.0,
            embark_multiplier: 0.25,
            fortify_bonus: 0.5,
            great_general_bonus: 0.15,
            great_general_radius: 2,
            river_defense_bonus: 0.25,
            settlement_melee_multiplier: 2.0,
            settlement_ranged_multiplier: 3.0,
            settlement_xp: 8,
            unit_xp: 5,
            defender_xp_share: 0.7,
        }
    }
}

/// Diplomacy state machine and AI heuristics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiplomacyConfig {
    /// Turns at war before peace may be signed
    pub min_war_turns: u32,
    pub peace_treaty_turns: u32,
    pub alliance_turns: u32,
    pub open_borders_turns: u32,
    pub trade_turns: u32,
    /// Opinion lost between the pair on a declaration of war
    pub war_opinion_penalty: f32,
    /// Opinion every third party that knows the aggressor loses toward it
    pub warmonger_penalty: f32,
    /// Per-turn drift toward zero for positive opinion
    pub positive_drift: f32,
    /// Per-turn drift toward zero for negative opinion
    pub negative_drift: f32,
    /// Opinion lost per turn while the pair's territories touch
    pub border_tension: f32,
    /// Opinion gained per turn while open borders or an alliance is active
    pub partnership_bonus: f32,
    pub friendly_threshold: f32,
    pub hostile_threshold: f32,
    /// Own/target military strength ratio an AI needs before declaring war
    pub war_strength_ratio: f32,
    /// Opinion an AI must fall below before declaring war
    pub war_opinion_threshold: f32,
    /// Strength ratio below which an AI considers itself losing
    pub peace_losing_ratio: f32,
    /// War length after which an AI always accepts peace
    pub peace_long_war_turns: u32,
    /// Chance to accept peace once the minimum war duration elapsed
    pub peace_random_chance: f32,
    /// Opinion an AI needs before proposing an alliance
    pub alliance_opinion: f32,
}

impl Default for DiplomacyConfig {
    fn default() -> Self {
        Self {
            min_war_turns: 10,
            peace_treaty_turns: 10,
            alliance_turns: 50,
            open_borders_turns: 30,
            trade_turns: 30,
            war_opinion_penalty: 30.0,
            warmonger_penalty: 10.0,
            positive_drift: 0.5,
            negative_drift: 0.25,
            border_tension: 1.0,
            partnership_bonus: 0.5,
            friendly_threshold: 25.0,
            hostile_threshold: -25.0,
            war_strength_ratio: 1.8,
            war_opinion_threshold: -20.0,
            peace_losing_ratio: 0.8,
            peace_long_war_turns: 30,
            peace_random_chance: 0.3,
            alliance_opinion: 50.0,
        }
    }
}

/// Yields, growth, happiness and the rising thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub base_gold: f32,
    pub science_per_pop: f32,
    pub base_production: f32,
    pub base_food: f32,
    /// Food eaten per population point
    pub food_per_pop: f32,
    /// Food needed to grow = growth_base + growth_per_pop * pop
    pub growth_base: f32,
    pub growth_per_pop: f32,
    /// Share of stored food a granary keeps after growth
    pub granary_retention: f32,

    pub base_happiness: i32,
    pub luxury_happiness: i32,
    pub settlement_unhappiness: i32,
    /// Food surplus multiplier while unhappy
    pub unhappy_growth_factor: f32,
    /// Production and gold multiplier while unhappy
    pub unhappy_yield_factor: f32,
    pub very_happy_threshold: i32,
    /// Extra food share while very happy
    pub very_happy_food_bonus: f32,

    /// Yield multiplier while in anarchy (0.25 = 75% reduction)
    pub anarchy_factor: f32,
    pub anarchy_turns: u32,

    pub golden_age_threshold: f32,
    /// Threshold multiplier applied after every golden age
    pub golden_age_growth: f32,
    pub golden_age_turns: u32,
    /// Production and gold bonus during a golden age
    pub golden_age_bonus: f32,

    pub great_person_threshold: f32,
    pub great_person_growth: f32,

    pub policy_base_cost: f32,
    pub policy_cost_growth: f32,

    pub settlement_max_hp: i32,
    pub settlement_heal: i32,
    /// Starting experience of military units trained with a barracks
    pub barracks_xp: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            base_gold: 2.0,
            science_per_pop: 1.5,
            base_production: 2.0,
            base_food: 2.0,
            food_per_pop: 2.0,
            growth_base: 15.0,
            growth_per_pop: 6.0,
            granary_retention: 0.25,

            base_happiness: 9,
            luxury_happiness: 4,
            settlement_unhappiness: 3,
            unhappy_growth_factor: 0.25,
            unhappy_yield_factor: 0.9,
            very_happy_threshold: 15,
            very_happy_food_bonus: 0.1,

            anarchy_factor: 0.25,
            anarchy_turns: 2,

            golden_age_threshold: 400.0,
            golden_age_growth: 1.5,
            golden_age_turns: 10,
            golden_age_bonus: 0.2,

            great_person_threshold: 100.0,
            great_person_growth: 1.5,

            policy_base_cost: 25.0,
            policy_cost_growth: 1.5,

            settlement_max_hp: 200,
            settlement_heal: 20,
            barracks_xp: 15,
        }
    }
}

/// Decision engine weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Settle thresholds, loosened as the settler wanders: start, mid, late
    pub settle_thresholds: [f32; 3],
    /// Distance from origin that moves a settler to the mid / late threshold
    pub settle_distance_steps: [i32; 2],
    /// Turns searching that moves a settler to the mid / late threshold
    pub settle_turn_steps: [u32; 2],
    /// No new settlement closer than this to an existing one
    pub settlement_spacing: i32,
    /// Settler counts as "close to origin" within this distance
    pub near_origin_distance: i32,
    pub search_radius_near: i32,
    pub search_radius_far: i32,
    /// Bonus for candidates farther from origin than the settler
    pub farther_bonus: f32,

    pub enemy_search_radius: i32,
    pub min_defenders: usize,
    pub defender_radius: i32,

    pub wonder_chance: f32,
    pub military_per_settlement: usize,
    pub aggressive_military_per_settlement: usize,
    pub max_workers: usize,
    pub expansion_settlement_cap: usize,

    pub scout_undiscovered: f32,
    pub scout_near_undiscovered: f32,
    pub scout_far_undiscovered: f32,
    pub scout_hills: f32,
    pub scout_visible_penalty: f32,
    pub scout_jitter: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            settle_thresholds: [8.0, 6.5, 5.0],
            settle_distance_steps: [4, 8],
            settle_turn_steps: [5, 10],
            settlement_spacing: 5,
            near_origin_distance: 3,
            search_radius_near: 3,
            search_radius_far: 5,
            farther_bonus: 5.0,

            enemy_search_radius: 5,
            min_defenders: 2,
            defender_radius: 2,

            wonder_chance: 0.4,
            military_per_settlement: 3,
            aggressive_military_per_settlement: 4,
            max_workers: 3,
            expansion_settlement_cap: 4,

            scout_undiscovered: 150.0,
            scout_near_undiscovered: 20.0,
            scout_far_undiscovered: 5.0,
            scout_hills: 25.0,
            scout_visible_penalty: 10.0,
            scout_jitter: 1.0,
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML override file's contents
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate().map_err(GameError::Config)?;
        Ok(config)
    }

    /// Load from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        let t = &self.ai.settle_thresholds;
        if !(t[0] >= t[1] && t[1] >= t[2]) {
            return Err(format!("settle_thresholds must not increase: {:?}", t));
        }

        if self.combat.damage_scale <= 0.0 || self.combat.min_damage < 0.0 {
            return Err("damage_scale must be positive and min_damage non-negative".into());
        }

        if self.diplomacy.hostile_threshold >= self.diplomacy.friendly_threshold {
            return Err(format!(
                "hostile_threshold ({}) should be < friendly_threshold ({})",
                self.diplomacy.hostile_threshold, self.diplomacy.friendly_threshold
            ));
        }

        if self.economy.golden_age_growth < 1.0 || self.economy.great_person_growth < 1.0 {
            return Err("threshold growth factors must be >= 1.0".into());
        }

        if self.economy.settlement_max_hp <= 0 {
            return Err("settlement_max_hp must be positive".into());
        }

        Ok(())
    }
}
