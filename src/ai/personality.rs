//! AI personalities
//!
//! A personality is fixed for the whole game and derived from the empire id,
//! so replays with the same empires always behave the same way. It only
//! biases choices; tech and resource gates still apply.

use serde::{Deserialize, Serialize};

use crate::core::types::EmpireId;
use crate::rules::{Government, PolicyKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    Aggressive,
    Builder,
    Scientist,
    #[default]
    Balanced,
}

impl Personality {
    pub fn for_empire(id: EmpireId) -> Self {
        match id.0 % 4 {
            0 => Personality::Aggressive,
            1 => Personality::Builder,
            2 => Personality::Scientist,
            _ => Personality::Balanced,
        }
    }

    /// Policies in the order this personality wants them
    pub fn policy_preference(&self) -> &'static [PolicyKind] {
        use PolicyKind::*;
        match self {
            Personality::Aggressive => &[Honor, Liberty, Tradition, Commerce, Piety, Rationalism],
            Personality::Builder => &[Tradition, Liberty, Piety, Commerce, Honor, Rationalism],
            Personality::Scientist => &[Liberty, Rationalism, Tradition, Commerce, Piety, Honor],
            Personality::Balanced => &[Tradition, Liberty, Commerce, Honor, Piety, Rationalism],
        }
    }

    /// Governments worth switching to, best first
    pub fn government_preference(&self) -> &'static [Government] {
        use Government::*;
        match self {
            Personality::Aggressive => &[Monarchy],
            Personality::Builder => &[Theocracy, Monarchy],
            Personality::Scientist => &[Republic, Monarchy],
            Personality::Balanced => &[Republic, Monarchy],
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "aggressive" => Some(Personality::Aggressive),
            "builder" => Some(Personality::Builder),
            "scientist" => Some(Personality::Scientist),
            "balanced" => Some(Personality::Balanced),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personality_is_deterministic() {
        assert_eq!(Personality::for_empire(EmpireId(0)), Personality::Aggressive);
        assert_eq!(Personality::for_empire(EmpireId(5)), Personality::Builder);
        assert_eq!(Personality::for_empire(EmpireId(6)), Personality::Scientist);
        assert_eq!(Personality::for_empire(EmpireId(7)), Personality::Balanced);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Personality::from_name("Scientist"), Some(Personality::Scientist));
        assert_eq!(Personality::from_name("pacifist"), None);
    }

    #[test]
    fn test_policy_preferences_cover_every_policy() {
        for personality in [
            Personality::Aggressive,
            Personality::Builder,
            Personality::Scientist,
            Personality::Balanced,
        ] {
            let mut prefs = personality.policy_preference().to_vec();
            prefs.sort();
            let mut all = PolicyKind::ALL.to_vec();
            all.sort();
            assert_eq!(prefs, all);
        }
    }
}
