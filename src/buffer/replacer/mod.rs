//! Replacement policy for the buffer pool.
//!
//! - [`ClockReplacer`] - CLOCK (second chance) sweep over the descriptor table

mod clock;

pub use clock::{ClockReplacer, Sweep};
