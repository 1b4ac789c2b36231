#![allow(dead_code)]

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/**
 *  development cards.  the five variants are tagged data plus a dispatcher
 *  in the rules engine -- no trait objects.  the shuffled draw pile lives in
 *  the game actor, never inside a state snapshot, so clients can only ever
 *  learn the remaining count.
 */

pub const DECK_SIZE: usize = 25;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "snake_case")]
pub enum DevCardKind {
    Knight,
    VictoryPoint,
    RoadBuilding,
    YearOfPlenty,
    Monopoly,
}

impl DevCardKind {
    /// Victory points stay hidden in hand; every other kind is playable.
    pub fn is_playable_kind(&self) -> bool {
        !matches!(self, DevCardKind::VictoryPoint)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DevCard {
    pub id: String,
    pub kind: DevCardKind,
    pub purchased_on_turn: u32,
    pub played: bool,
}

impl DevCard {
    pub fn new(id: &str, kind: DevCardKind, purchased_on_turn: u32) -> Self {
        Self {
            id: id.to_owned(),
            kind,
            purchased_on_turn,
            played: false,
        }
    }
}

//  14 knights, 5 victory points, 2 each of the rest
const DECK_DISTRIBUTION: [(DevCardKind, usize); 5] = [
    (DevCardKind::Knight, 14),
    (DevCardKind::VictoryPoint, 5),
    (DevCardKind::RoadBuilding, 2),
    (DevCardKind::YearOfPlenty, 2),
    (DevCardKind::Monopoly, 2),
];

#[derive(Debug, Clone)]
pub struct DevCardDeck {
    cards: Vec<DevCardKind>,
}

impl DevCardDeck {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let mut cards: Vec<DevCardKind> = DECK_DISTRIBUTION
            .iter()
            .flat_map(|(kind, count)| std::iter::repeat(*kind).take(*count))
            .collect();
        cards.shuffle(rng);
        Self { cards }
    }

    /// A deck with a known draw order, for tests.
    pub fn from_cards(cards: Vec<DevCardKind>) -> Self {
        Self { cards }
    }

    pub fn draw(&mut self) -> Option<DevCardKind> {
        self.cards.pop()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
