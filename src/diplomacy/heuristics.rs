//! AI accept/reject rules for war and peace

use rand::Rng;

use crate::core::config::DiplomacyConfig;

/// `own / other`, infinite when only `own` has an army
pub fn strength_ratio(own: f32, other: f32) -> f32 {
    if other <= 0.0 {
        if own > 0.0 {
            f32::INFINITY
        } else {
            1.0
        }
    } else {
        own / other
    }
}

/// Declare only when clearly stronger and already on bad terms
pub fn should_declare_war(own_strength: f32, target_strength: f32, opinion: f32, config: &DiplomacyConfig) -> bool {
    strength_ratio(own_strength, target_strength) > config.war_strength_ratio
        && opinion < config.war_opinion_threshold
}

/// Accept peace when losing, when the war drags on, or on a random roll.
/// Never before the minimum war duration.
pub fn should_accept_peace<R: Rng + ?Sized>(
    own_strength: f32,
    enemy_strength: f32,
    turns_at_war: u32,
    config: &DiplomacyConfig,
    rng: &mut R,
) -> bool {
    if turns_at_war < config.min_war_turns {
        return false;
    }
    strength_ratio(own_strength, enemy_strength) < config.peace_losing_ratio
        || turns_at_war > config.peace_long_war_turns
        || rng.gen::<f32>() < config.peace_random_chance
}
