use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/**
 *  the five-resource currency everything in the game trades in.  a
 *  ResourceCount is a full five-field record even when most fields are zero
 *  so wire payloads always carry all five and validation stays trivial.
 */

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Brick,
    Lumber,
    Ore,
    Grain,
    Wool,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Brick => "brick",
            Resource::Lumber => "lumber",
            Resource::Ore => "ore",
            Resource::Grain => "grain",
            Resource::Wool => "wool",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCount {
    pub brick: u32,
    pub lumber: u32,
    pub ore: u32,
    pub grain: u32,
    pub wool: u32,
}

//  the bank starts with 19 of each resource
pub const BANK_SUPPLY_PER_RESOURCE: u32 = 19;

impl ResourceCount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(resource: Resource, count: u32) -> Self {
        let mut rc = Self::default();
        rc.set(resource, count);
        rc
    }

    pub fn full_bank() -> Self {
        let mut rc = Self::default();
        for resource in Resource::iter() {
            rc.set(resource, BANK_SUPPLY_PER_RESOURCE);
        }
        rc
    }

    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Brick => self.brick,
            Resource::Lumber => self.lumber,
            Resource::Ore => self.ore,
            Resource::Grain => self.grain,
            Resource::Wool => self.wool,
        }
    }

    pub fn set(&mut self, resource: Resource, count: u32) {
        match resource {
            Resource::Brick => self.brick = count,
            Resource::Lumber => self.lumber = count,
            Resource::Ore => self.ore = count,
            Resource::Grain => self.grain = count,
            Resource::Wool => self.wool = count,
        }
    }

    pub fn add(&mut self, resource: Resource, count: u32) {
        self.set(resource, self.get(resource) + count);
    }

    pub fn total(&self) -> u32 {
        self.brick + self.lumber + self.ore + self.grain + self.wool
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// True when every field of `other` fits inside self.
    pub fn contains(&self, other: &ResourceCount) -> bool {
        Resource::iter().all(|r| self.get(r) >= other.get(r))
    }

    /// Removes `other` from self; fails without mutating when self is short.
    pub fn subtract(&mut self, other: &ResourceCount) -> bool {
        if !self.contains(other) {
            return false;
        }
        for resource in Resource::iter() {
            self.set(resource, self.get(resource) - other.get(resource));
        }
        true
    }

    pub fn remove(&mut self, resource: Resource, count: u32) -> bool {
        if self.get(resource) < count {
            return false;
        }
        self.set(resource, self.get(resource) - count);
        true
    }

    /// The hand as an expanded multiset, used for uniform steal picks.
    pub fn to_multiset(&self) -> Vec<Resource> {
        let mut cards = Vec::with_capacity(self.total() as usize);
        for resource in Resource::iter() {
            for _ in 0..self.get(resource) {
                cards.push(resource);
            }
        }
        cards
    }
}

impl Add for ResourceCount {
    type Output = ResourceCount;

    fn add(self, other: ResourceCount) -> ResourceCount {
        let mut out = self;
        out += other;
        out
    }
}

impl AddAssign for ResourceCount {
    fn add_assign(&mut self, other: ResourceCount) {
        for resource in Resource::iter() {
            self.add(resource, other.get(resource));
        }
    }
}

impl fmt::Display for ResourceCount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "brick:{} lumber:{} ore:{} grain:{} wool:{}",
            self.brick, self.lumber, self.ore, self.grain, self.wool
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_and_subtract() {
        let mut hand = ResourceCount {
            brick: 2,
            lumber: 1,
            ore: 0,
            grain: 3,
            wool: 0,
        };
        let cost = ResourceCount {
            brick: 1,
            lumber: 1,
            ore: 0,
            grain: 0,
            wool: 0,
        };
        assert!(hand.contains(&cost));
        assert!(hand.subtract(&cost));
        assert_eq!(hand.brick, 1);
        assert_eq!(hand.lumber, 0);

        let too_much = ResourceCount::single(Resource::Ore, 1);
        let before = hand;
        assert!(!hand.subtract(&too_much));
        assert_eq!(hand, before, "failed subtract must not mutate");
    }

    #[test]
    fn test_multiset_expansion() {
        let hand = ResourceCount {
            brick: 2,
            lumber: 0,
            ore: 1,
            grain: 0,
            wool: 0,
        };
        let cards = hand.to_multiset();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards.iter().filter(|r| **r == Resource::Brick).count(), 2);
        assert_eq!(cards.iter().filter(|r| **r == Resource::Ore).count(), 1);
    }

    #[test]
    fn test_wire_form_is_camel_case_with_all_fields() {
        let json = serde_json::to_string(&ResourceCount::single(Resource::Wool, 2)).unwrap();
        assert_eq!(
            json,
            "{\"brick\":0,\"lumber\":0,\"ore\":0,\"grain\":0,\"wool\":2}"
        );
    }

    #[test]
    fn test_negative_counts_rejected_at_the_wire() {
        let err = serde_json::from_str::<ResourceCount>(
            "{\"brick\":-1,\"lumber\":0,\"ore\":0,\"grain\":0,\"wool\":0}",
        );
        assert!(err.is_err());
    }
}
