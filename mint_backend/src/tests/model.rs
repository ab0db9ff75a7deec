use std::collections::HashMap;

use crate::seed::roll;

/// Dense reference model of the allocator.
///
/// Keeps the whole pool as a `Vec` and runs the textbook partial Fisher-Yates
/// step. The sparse allocator must produce exactly the same sequence for the
/// same seeds; only the storage differs.
pub struct DenseShuffleModel {
    pub slots: Vec<u64>,
    pub remaining: u64,
    pub held: HashMap<u8, u64>,
    pub issued: Vec<u64>,
}

impl DenseShuffleModel {
    pub fn new(capacity: u64) -> Self {
        Self {
            slots: (0..capacity).collect(),
            remaining: capacity,
            held: HashMap::new(),
            issued: Vec::new(),
        }
    }

    /// Mirrors `mint::allocate` after the gate has passed.
    pub fn draw(&mut self, requester: u8, seed: &[u8; 32], quantity: u64) -> Vec<u64> {
        let mut units = Vec::new();
        for draw_index in 0..quantity {
            let r = self.remaining;
            let i = (roll(seed, draw_index) % r) as usize;
            let value = self.slots[i];
            self.slots[i] = self.slots[r as usize - 1];
            self.remaining = r - 1;
            units.push(value + 1);
        }
        *self.held.entry(requester).or_insert(0) += quantity;
        self.issued.extend(&units);
        units
    }

    /// THE CORE INVARIANT
    /// Live slots plus issued units partition the original pool.
    pub fn check_invariant(&self, capacity: u64) -> Result<(), String> {
        let mut all: Vec<u64> = self.slots[..self.remaining as usize]
            .iter()
            .map(|v| v + 1)
            .chain(self.issued.iter().copied())
            .collect();
        all.sort_unstable();
        let expected: Vec<u64> = (1..=capacity).collect();
        if all != expected {
            return Err(format!(
                "INVARIANT VIOLATION: live + issued does not cover 1..={} exactly",
                capacity
            ));
        }
        Ok(())
    }
}

#[test]
fn model_matches_three_unit_scenario() {
    let mut model = DenseShuffleModel::new(3);
    assert_eq!(model.draw(1, &[1u8; 32], 2), vec![3, 1]);
    assert_eq!(model.remaining, 1);
    model.check_invariant(3).unwrap();
}
