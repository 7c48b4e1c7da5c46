//! Published telemetry snapshot.
//!
//! Single producer (the SIF edge handler, interrupt context on the target),
//! single consumer (the reporting loop). Both sides run inside the same
//! critical section, so the consumer observes either the fully-old or the
//! fully-new 12 bytes, never a torn mix. On the host the critical section
//! is provided by the `critical-section` std implementation, standing in
//! for disabled interrupts.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use sifdash_protocol::{SifFrame, FRAME_LEN};

struct Inner {
    frame: SifFrame,
    fresh: bool,
}

/// Latch cell holding the most recently accepted frame.
///
/// The stored frame is always one that passed checksum validation; the
/// `fresh` latch is set on every publish and cleared by [`FrameCell::take`].
pub struct FrameCell {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Inner>>,
}

impl FrameCell {
    /// Empty cell, latch unset
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                frame: SifFrame::from_bytes([0; FRAME_LEN]),
                fresh: false,
            })),
        }
    }

    /// Store a newly accepted frame and set the new-data latch.
    ///
    /// Producer side only.
    pub fn publish(&self, frame: SifFrame) {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            inner.frame = frame;
            inner.fresh = true;
        });
    }

    /// Copy the frame out and clear the latch.
    ///
    /// Returns `None` when nothing new has been published since the last
    /// take.
    pub fn take(&self) -> Option<SifFrame> {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            if inner.fresh {
                inner.fresh = false;
                Some(inner.frame)
            } else {
                None
            }
        })
    }

    /// Copy the current frame without touching the latch
    pub fn peek(&self) -> SifFrame {
        self.inner.lock(|cell| cell.borrow().frame)
    }
}

impl Default for FrameCell {
    fn default() -> Self {
        Self::new()
    }
}
