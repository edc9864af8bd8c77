//! Frame identifier type.

use std::fmt;

/// Index of a frame in the buffer pool, in `[0, pool_size)`.
///
/// Frame ids are stable handles into the descriptor table and the page
/// arena; both are indexed with `frame_id.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub usize);

impl FrameId {
    #[inline]
    pub fn new(id: usize) -> Self {
        FrameId(id)
    }

    /// The frame after this one on a clock of `pool_size` frames.
    #[inline]
    pub fn next(self, pool_size: usize) -> Self {
        FrameId((self.0 + 1) % pool_size)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_id_wraps() {
        assert_eq!(FrameId::new(0).next(3), FrameId::new(1));
        assert_eq!(FrameId::new(2).next(3), FrameId::new(0));
        assert_eq!(FrameId::new(0).next(1), FrameId::new(0));
    }

    #[test]
    fn test_frame_id_display() {
        assert_eq!(format!("{}", FrameId::new(42)), "Frame(42)");
    }
}
