//! Immutable game rules: units, buildings, wonders, techs, governments,
//! policies and promotions

pub mod buildings;
pub mod governments;
pub mod modifiers;
pub mod promotions;
pub mod techs;
pub mod units;

pub use buildings::{BuildingKind, BuildingStats, WonderKind};
pub use governments::{policy_cost, Government, PolicyKind};
pub use modifiers::Modifiers;
pub use promotions::{CombatSituation, Condition, Effect, Promotion, PromotionId};
pub use techs::{available_techs, era_of, Era, TechId};
pub use units::{
    Domain, GreatPersonKind, PromotionClass, RangedProfile, UnitCategory, UnitRole, UnitStats, UnitType,
};
