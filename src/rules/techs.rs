//! Technology tree and eras

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Historical era, ordered oldest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Era {
    #[default]
    Ancient,
    Classical,
    Medieval,
    Renaissance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TechId {
    // Ancient
    Agriculture,
    Pottery,
    AnimalHusbandry,
    Archery,
    Mining,
    Sailing,
    Writing,
    BronzeWorking,
    Masonry,
    Calendar,
    // Classical
    HorsebackRiding,
    IronWorking,
    Mathematics,
    Philosophy,
    Currency,
    Construction,
    // Medieval
    Theology,
    CivilService,
    Chivalry,
    Education,
    Astronomy,
    Engineering,
    // Renaissance
    Banking,
    Gunpowder,
    Navigation,
}

impl TechId {
    pub const ALL: [TechId; 25] = [
        TechId::Agriculture,
        TechId::Pottery,
        TechId::AnimalHusbandry,
        TechId::Archery,
        TechId::Mining,
        TechId::Sailing,
        TechId::Writing,
        TechId::BronzeWorking,
        TechId::Masonry,
        TechId::Calendar,
        TechId::HorsebackRiding,
        TechId::IronWorking,
        TechId::Mathematics,
        TechId::Philosophy,
        TechId::Currency,
        TechId::Construction,
        TechId::Theology,
        TechId::CivilService,
        TechId::Chivalry,
        TechId::Education,
        TechId::Astronomy,
        TechId::Engineering,
        TechId::Banking,
        TechId::Gunpowder,
        TechId::Navigation,
    ];

    /// Science required to research
    pub fn cost(&self) -> f32 {
        match self {
            TechId::Agriculture => 20.0,
            TechId::Pottery | TechId::AnimalHusbandry | TechId::Archery | TechId::Mining => 35.0,
            TechId::Sailing | TechId::Writing | TechId::BronzeWorking | TechId::Masonry => 55.0,
            TechId::Calendar => 70.0,
            TechId::HorsebackRiding | TechId::IronWorking | TechId::Mathematics | TechId::Currency => 105.0,
            TechId::Philosophy | TechId::Construction => 175.0,
            TechId::Theology => 250.0,
            TechId::CivilService | TechId::Engineering => 275.0,
            TechId::Chivalry | TechId::Education | TechId::Astronomy => 325.0,
            TechId::Banking | TechId::Gunpowder | TechId::Navigation => 485.0,
        }
    }

    pub fn era(&self) -> Era {
        match self {
            TechId::Agriculture
            | TechId::Pottery
            | TechId::AnimalHusbandry
            | TechId::Archery
            | TechId::Mining
            | TechId::Sailing
            | TechId::Writing
            | TechId::BronzeWorking
            | TechId::Masonry
            | TechId::Calendar => Era::Ancient,
            TechId::HorsebackRiding
            | TechId::IronWorking
            | TechId::Mathematics
            | TechId::Philosophy
            | TechId::Currency
            | TechId::Construction => Era::Classical,
            TechId::Theology
            | TechId::CivilService
            | TechId::Chivalry
            | TechId::Education
            | TechId::Astronomy
            | TechId::Engineering => Era::Medieval,
            TechId::Banking | TechId::Gunpowder | TechId::Navigation => Era::Renaissance,
        }
    }

    pub fn prerequisites(&self) -> &'static [TechId] {
        match self {
            TechId::Agriculture => &[],
            TechId::Pottery | TechId::AnimalHusbandry | TechId::Archery | TechId::Mining => {
                &[TechId::Agriculture]
            }
            TechId::Sailing | TechId::Writing | TechId::Calendar => &[TechId::Pottery],
            TechId::BronzeWorking | TechId::Masonry => &[TechId::Mining],
            TechId::HorsebackRiding => &[TechId::AnimalHusbandry],
            TechId::IronWorking | TechId::Currency => &[TechId::BronzeWorking],
            TechId::Mathematics => &[TechId::Archery, TechId::Writing],
            TechId::Philosophy => &[TechId::Writing],
            TechId::Construction => &[TechId::Masonry],
            TechId::Theology => &[TechId::Philosophy, TechId::Calendar],
            TechId::CivilService => &[TechId::Philosophy],
            TechId::Chivalry => &[TechId::HorsebackRiding, TechId::CivilService],
            TechId::Education => &[TechId::Theology],
            TechId::Astronomy => &[TechId::Mathematics, TechId::Philosophy],
            TechId::Engineering => &[TechId::Construction, TechId::Mathematics],
            TechId::Banking => &[TechId::Currency, TechId::Education],
            TechId::Gunpowder => &[TechId::IronWorking, TechId::Engineering],
            TechId::Navigation => &[TechId::Astronomy, TechId::Sailing],
        }
    }

    /// All prerequisites are in `unlocked` and this tech is not
    pub fn is_available(&self, unlocked: &BTreeSet<TechId>) -> bool {
        !unlocked.contains(self) && self.prerequisites().iter().all(|p| unlocked.contains(p))
    }
}

/// Techs an empire could start researching now, in table order
pub fn available_techs(unlocked: &BTreeSet<TechId>) -> Vec<TechId> {
    TechId::ALL
        .into_iter()
        .filter(|t| t.is_available(unlocked))
        .collect()
}

/// Highest era among unlocked techs
pub fn era_of(unlocked: &BTreeSet<TechId>) -> Era {
    unlocked.iter().map(|t| t.era()).max().unwrap_or_default()
}
