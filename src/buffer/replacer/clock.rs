//! CLOCK (second chance) replacement policy.

use tracing::trace;

use crate::buffer::frame::FrameDescriptor;
use crate::common::FrameId;

/// Outcome of a successful clock sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    /// The frame holds no page and can be used as is.
    Free(FrameId),
    /// The frame holds an unpinned, unreferenced page. The caller must write
    /// it back if dirty, unmap it and clear the descriptor before reuse.
    Victim(FrameId),
}

impl Sweep {
    #[inline]
    pub fn frame_id(self) -> FrameId {
        match self {
            Sweep::Free(frame_id) | Sweep::Victim(frame_id) => frame_id,
        }
    }
}

/// Clock hand over the descriptor table.
///
/// The hand starts at frame 0 and only ever moves forward, modulo the pool
/// size. It is not reset between sweeps: each sweep resumes where the last
/// one stopped, and stays on the frame it selects.
///
/// # Bound
/// A sweep inspects at most `2 × pool_size` frames, one more than a
/// `2 × pool_size − 1` inspection bound. Put as advances, the hand moves
/// at most `2 × pool_size − 1` times before selecting a frame. The extra
/// inspection is needed when the only eligible frame is the last one the
/// hand reaches, with its reference bit set: the first rotation clears
/// every bit and the `2n`th inspection selects it. With one frame, a `2n − 1` inspection
/// bound would report an unpinned page as unevictable.
pub struct ClockReplacer {
    hand: FrameId,
    pool_size: usize,
}

impl ClockReplacer {
    pub fn new(pool_size: usize) -> Self {
        Self {
            hand: FrameId::new(0),
            pool_size,
        }
    }

    /// The frame the next sweep inspects first.
    #[inline]
    pub fn hand(&self) -> FrameId {
        self.hand
    }

    #[inline]
    fn advance(&mut self) {
        self.hand = self.hand.next(self.pool_size);
    }

    /// Find a frame to reuse.
    ///
    /// Clears the reference bit of every referenced frame it passes, pinned
    /// or not. Returns `None` when every frame stays pinned for the whole
    /// bounded sweep.
    pub fn sweep(&mut self, frames: &mut [FrameDescriptor]) -> Option<Sweep> {
        debug_assert_eq!(frames.len(), self.pool_size);

        for _ in 0..2 * self.pool_size {
            let desc = &mut frames[self.hand.0];

            if !desc.is_valid() {
                trace!(frame = %self.hand, "clock: free frame");
                return Some(Sweep::Free(self.hand));
            }

            if desc.ref_bit() {
                trace!(frame = %self.hand, "clock: second chance");
                desc.clear_ref_bit();
            } else if desc.is_pinned() {
                trace!(frame = %self.hand, pins = desc.pin_count(), "clock: pinned");
            } else {
                trace!(frame = %self.hand, page = %desc.page_no(), "clock: victim");
                return Some(Sweep::Victim(self.hand));
            }

            self.advance();
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::PageId;
    use crate::storage::{FileHandle, MemoryPageStore};

    /// Build `n` descriptors, all holding a page of one file.
    fn loaded(n: usize) -> Vec<FrameDescriptor> {
        let file = FileHandle::new(MemoryPageStore::new("clock"));
        (0..n)
            .map(|i| {
                let mut desc = FrameDescriptor::new(FrameId::new(i));
                desc.set(file.clone(), PageId::new(i as u32));
                desc
            })
            .collect()
    }

    #[test]
    fn test_empty_frame_selected_without_advancing() {
        let mut frames: Vec<_> = (0..3).map(|i| FrameDescriptor::new(FrameId::new(i))).collect();
        let mut clock = ClockReplacer::new(3);

        assert_eq!(clock.sweep(&mut frames), Some(Sweep::Free(FrameId::new(0))));
        assert_eq!(clock.hand(), FrameId::new(0));
    }

    #[test]
    fn test_second_chance_then_victim() {
        let mut frames = loaded(3);
        for desc in &mut frames {
            desc.unpin();
        }
        let mut clock = ClockReplacer::new(3);

        // Every frame referenced: one rotation clears them, then frame 0 goes.
        assert_eq!(clock.sweep(&mut frames), Some(Sweep::Victim(FrameId::new(0))));
        assert!(frames.iter().all(|d| !d.ref_bit()));
        assert_eq!(clock.hand(), FrameId::new(0));
    }

    #[test]
    fn test_skips_pinned_frames() {
        let mut frames = loaded(3);
        frames[2].unpin();
        for desc in &mut frames {
            desc.clear_ref_bit();
        }
        let mut clock = ClockReplacer::new(3);

        assert_eq!(clock.sweep(&mut frames), Some(Sweep::Victim(FrameId::new(2))));
        assert_eq!(clock.hand(), FrameId::new(2));
    }

    #[test]
    fn test_worst_case_within_bound() {
        // Only frame 2 is evictable, and the hand starts just after it.
        let mut frames = loaded(3);
        frames[2].unpin();
        let mut clock = ClockReplacer::new(3);
        clock.hand = FrameId::new(0);

        // Hand: 0,1,2 (clear bits), 0,1 (pinned), 2 (victim): 2n inspections.
        assert_eq!(clock.sweep(&mut frames), Some(Sweep::Victim(FrameId::new(2))));
    }

    #[test]
    fn test_single_referenced_unpinned_frame_is_evictable() {
        let mut frames = loaded(1);
        frames[0].unpin();
        let mut clock = ClockReplacer::new(1);

        // Inspection 1 clears the bit, inspection 2 (= 2n) selects the frame.
        assert_eq!(clock.sweep(&mut frames), Some(Sweep::Victim(FrameId::new(0))));
        assert_eq!(clock.hand(), FrameId::new(0));
    }


    #[test]
    fn test_all_pinned_exhausts() {
        let mut frames = loaded(4);
        let mut clock = ClockReplacer::new(4);

        assert_eq!(clock.sweep(&mut frames), None);
        // Two full rotations: back where it started, bits cleared.
        assert_eq!(clock.hand(), FrameId::new(0));
        assert!(frames.iter().all(|d| !d.ref_bit()));
    }

    #[test]
    fn test_hand_persists_across_sweeps() {
        let mut frames = loaded(3);
        for desc in &mut frames {
            desc.unpin();
            desc.clear_ref_bit();
        }
        frames[0].pin();
        let mut clock = ClockReplacer::new(3);

        assert_eq!(clock.sweep(&mut frames), Some(Sweep::Victim(FrameId::new(1))));
        frames[1].pin();
        assert_eq!(clock.sweep(&mut frames), Some(Sweep::Victim(FrameId::new(2))));
        assert_eq!(Sweep::Victim(FrameId::new(2)).frame_id(), FrameId::new(2));
    }
}
