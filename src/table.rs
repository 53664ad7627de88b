//! Open-addressing table from station name bytes to a running [`Statistic`].
//!
//! Collisions are resolved by linear probing. The table doubles once load
//! would pass 0.7, up to a fixed ceiling; past the ceiling it fills every slot
//! and then reports [`AggregateError::TableFull`] instead of probing forever.

use tracing::trace;

use crate::error::{AggregateError, Result};
use crate::scanner::hash_key;
use crate::stats::Statistic;

pub const DEFAULT_CAPACITY: usize = 1 << 17;
pub const DEFAULT_MAX_CAPACITY: usize = 1 << 24;

struct Slot {
    hash: u32,
    key: Box<[u8]>,
    stat: Statistic,
}

enum Probe {
    Found(usize),
    Vacant(usize),
    Exhausted,
}

pub struct AggregationTable {
    slots: Vec<Option<Slot>>,
    len: usize,
    max_capacity: usize,
}

impl Default for AggregationTable {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, DEFAULT_MAX_CAPACITY)
    }
}

impl AggregationTable {
    /// Both limits are rounded up to a power of two.
    pub fn with_capacity(capacity: usize, max_capacity: usize) -> Self {
        let capacity = capacity.max(1).next_power_of_two();
        Self {
            slots: empty_slots(capacity),
            len: 0,
            max_capacity: max_capacity.max(capacity).next_power_of_two(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Folds `value` into the statistic for `key`, inserting it on first sight.
    /// `hash` must equal `hash_key(key)`; only insertion allocates.
    pub fn put_or_merge(&mut self, key: &[u8], hash: u32, value: i16) -> Result<()> {
        let index = match self.probe(key, hash) {
            Probe::Found(index) => {
                if let Some(slot) = self.slots[index].as_mut() {
                    slot.stat.record(value);
                }
                return Ok(());
            }
            Probe::Vacant(index) if !self.needs_growth() => index,
            _ if self.slots.len() < self.max_capacity => {
                self.grow();
                return self.put_or_merge(key, hash, value);
            }
            Probe::Vacant(index) => index,
            Probe::Exhausted => {
                return Err(AggregateError::TableFull {
                    capacity: self.slots.len(),
                })
            }
        };

        self.slots[index] = Some(Slot {
            hash,
            key: key.into(),
            stat: Statistic::new(value),
        });
        self.len += 1;
        Ok(())
    }

    pub fn get(&self, key: &[u8]) -> Option<&Statistic> {
        match self.probe(key, hash_key(key)) {
            Probe::Found(index) => self.slots[index].as_ref().map(|slot| &slot.stat),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &Statistic)> {
        self.slots
            .iter()
            .flatten()
            .map(|slot| (&*slot.key, &slot.stat))
    }

    pub fn into_entries(self) -> impl Iterator<Item = (Box<[u8]>, Statistic)> {
        self.slots
            .into_iter()
            .flatten()
            .map(|slot| (slot.key, slot.stat))
    }

    fn probe(&self, key: &[u8], hash: u32) -> Probe {
        let mask = self.slots.len() - 1;
        let mut index = hash as usize & mask;
        for _ in 0..self.slots.len() {
            match &self.slots[index] {
                None => return Probe::Vacant(index),
                Some(slot) if slot.hash == hash && *slot.key == *key => return Probe::Found(index),
                Some(_) => index = (index + 1) & mask,
            }
        }
        Probe::Exhausted
    }

    fn needs_growth(&self) -> bool {
        (self.len + 1) * 10 > self.slots.len() * 7
    }

    fn grow(&mut self) {
        let capacity = self.slots.len() * 2;
        trace!(from = self.slots.len(), to = capacity, "growing aggregation table");

        let old = std::mem::replace(&mut self.slots, empty_slots(capacity));
        let mask = capacity - 1;
        for slot in old.into_iter().flatten() {
            let mut index = slot.hash as usize & mask;
            while self.slots[index].is_some() {
                index = (index + 1) & mask;
            }
            self.slots[index] = Some(slot);
        }
    }
}

fn empty_slots(capacity: usize) -> Vec<Option<Slot>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || None);
    slots
}
