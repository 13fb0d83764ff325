//! Lock-free frame hand-off between the tick context and the audio callback.
//!
//! Three banks of atomic `f32` samples: the writer owns one, the reader owns
//! one and the third sits in a shared slot. Publishing fills the writer's bank
//! and swaps it into the slot with the dirty bit set; the reader swaps the slot
//! for its own bank only when that bit is set. A bank is never reachable by
//! both sides at once, so a frame is either seen whole or not at all.

use atomic_float::AtomicF32;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::error::{Result, SynthError};

const INDEX_MASK: u8 = 0b011;
const DIRTY: u8 = 0b100;

struct Shared {
    banks: [Box<[AtomicF32]>; 3],
    /// Bank index parked in the middle, plus `DIRTY` when it holds a frame
    /// the reader has not picked up yet
    slot: AtomicU8,
}

impl Shared {
    fn bank(len: usize) -> Box<[AtomicF32]> {
        (0..len).map(|_| AtomicF32::new(0.0)).collect()
    }
}

/// Namespace for building the writer/reader pair
pub struct AudioDoubleBuffer;

impl AudioDoubleBuffer {
    /// Allocate a hand-off for frames of exactly `len` samples.
    ///
    /// Until the first publish the reader sees silence.
    pub fn new(len: usize) -> (BufferWriter, BufferReader) {
        let shared = Arc::new(Shared {
            banks: [Shared::bank(len), Shared::bank(len), Shared::bank(len)],
            slot: AtomicU8::new(1),
        });
        let writer = BufferWriter {
            shared: Arc::clone(&shared),
            write_idx: 0,
        };
        let reader = BufferReader {
            shared,
            read_idx: 2,
        };
        (writer, reader)
    }
}

/// Tick-side half: publishes complete frames
pub struct BufferWriter {
    shared: Arc<Shared>,
    write_idx: u8,
}

impl BufferWriter {
    pub fn len(&self) -> usize {
        self.shared.banks[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy a full frame into the private bank and make it the newest frame.
    pub fn publish(&mut self, frame: &[f32]) -> Result<()> {
        if frame.len() != self.len() {
            return Err(SynthError::FieldLength {
                expected: self.len(),
                actual: frame.len(),
            });
        }

        let bank = &self.shared.banks[self.write_idx as usize];
        for (cell, &sample) in bank.iter().zip(frame) {
            cell.store(sample, Ordering::Relaxed);
        }

        // Release makes the stores above visible to whoever acquires the slot
        let previous = self
            .shared
            .slot
            .swap(self.write_idx | DIRTY, Ordering::AcqRel);
        self.write_idx = previous & INDEX_MASK;
        Ok(())
    }
}

/// Callback-side half: reads the most recent complete frame
pub struct BufferReader {
    shared: Arc<Shared>,
    read_idx: u8,
}

impl BufferReader {
    pub fn len(&self) -> usize {
        self.shared.banks[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the newest published frame if there is one. Returns whether the
    /// visible frame changed.
    pub fn refresh(&mut self) -> bool {
        if self.shared.slot.load(Ordering::Relaxed) & DIRTY == 0 {
            return false;
        }
        // Only the reader clears DIRTY, so the swapped-out value still carries it
        let previous = self.shared.slot.swap(self.read_idx, Ordering::AcqRel);
        self.read_idx = previous & INDEX_MASK;
        true
    }

    #[inline]
    pub fn sample(&self, index: usize) -> f32 {
        self.shared.banks[self.read_idx as usize][index].load(Ordering::Relaxed)
    }
}
