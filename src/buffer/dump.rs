//! Diagnostic snapshot of the whole descriptor table.

use std::fmt;

use super::frame::FrameState;

/// State of every frame plus the number of valid ones.
///
/// Produced by [`BufferPoolManager::dump`](super::BufferPoolManager::dump);
/// taking one never changes the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDump {
    pub frames: Vec<FrameState>,
    pub valid_frames: usize,
}

impl BufferDump {
    pub(crate) fn new(frames: Vec<FrameState>) -> Self {
        let valid_frames = frames.iter().filter(|f| f.valid).count();
        Self {
            frames,
            valid_frames,
        }
    }
}

impl fmt::Display for BufferDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            writeln!(f, "{}", frame)?;
        }
        write!(f, "Total Number of Valid Frames: {}", self.valid_frames)
    }
}
