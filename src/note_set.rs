//! Per-note membership table.

use serde::{Deserialize, Serialize};

/// Membership table over the 128 MIDI note numbers.
///
/// Backed by two 64-bit words. Iteration yields notes in ascending order,
/// which fixes the emission order of deferred note-offs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSet {
    bits: [u64; 2],
}

impl NoteSet {
    pub const fn new() -> Self {
        Self { bits: [0; 2] }
    }

    #[inline]
    pub fn insert(&mut self, note: u8) {
        if note < 128 {
            self.bits[(note >> 6) as usize] |= 1 << (note & 63);
        }
    }

    #[inline]
    pub fn remove(&mut self, note: u8) {
        if note < 128 {
            self.bits[(note >> 6) as usize] &= !(1 << (note & 63));
        }
    }

    #[inline]
    pub fn contains(&self, note: u8) -> bool {
        note < 128 && self.bits[(note >> 6) as usize] & (1 << (note & 63)) != 0
    }

    pub fn clear(&mut self) {
        self.bits = [0; 2];
    }

    pub fn is_empty(&self) -> bool {
        self.bits == [0; 2]
    }

    /// Number of notes in the set.
    pub fn len(&self) -> usize {
        (self.bits[0].count_ones() + self.bits[1].count_ones()) as usize
    }

    /// Notes in ascending order.
    pub fn iter(&self) -> Iter {
        Iter {
            bits: self.bits,
            word: 0,
        }
    }
}

impl IntoIterator for NoteSet {
    type Item = u8;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        self.iter()
    }
}

impl FromIterator<u8> for NoteSet {
    fn from_iter<I: IntoIterator<Item = u8>>(notes: I) -> Self {
        let mut set = NoteSet::new();
        for note in notes {
            set.insert(note);
        }
        set
    }
}

/// Ascending-order iterator over a [`NoteSet`].
#[derive(Debug, Clone)]
pub struct Iter {
    bits: [u64; 2],
    word: usize,
}

impl Iterator for Iter {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        while self.word < 2 {
            let w = self.bits[self.word];
            if w != 0 {
                let bit = w.trailing_zeros() as u8;
                // Clear the lowest set bit.
                self.bits[self.word] = w & (w - 1);
                return Some((self.word as u8) * 64 + bit);
            }
            self.word += 1;
        }
        None
    }
}
