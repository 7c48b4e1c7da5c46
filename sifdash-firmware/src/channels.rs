//! Inter-task communication statics
//!
//! The SIF edge task is the single producer of the published snapshot; the
//! reporter task is its single consumer. Console input flows through a
//! channel so the reporter owns all arbitration state.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;
use portable_atomic::{AtomicBool, AtomicU32};

use sifdash_core::console::ConsoleInput;
use sifdash_core::snapshot::FrameCell;

/// Channel capacity for parsed console input
const CONSOLE_CHANNEL_SIZE: usize = 8;

/// Channel capacity for outgoing status lines
const OUT_CHANNEL_SIZE: usize = 4;

/// Maximum length of one outgoing status line
pub const OUT_LINE_LEN: usize = 160;

/// Most recently accepted SIF frame plus the new-data latch.
///
/// Written only by the SIF task, read only by the reporter task; both run
/// their accesses under the cell's critical section.
pub static SIF_SNAPSHOT: FrameCell = FrameCell::new();

/// Parsed console lines (commands and bench feed records)
pub static CONSOLE_INPUT: Channel<CriticalSectionRawMutex, ConsoleInput, CONSOLE_CHANNEL_SIZE> =
    Channel::new();

/// Status/acknowledgement lines awaiting transmission
pub static CONSOLE_OUT: Channel<CriticalSectionRawMutex, String<OUT_LINE_LEN>, OUT_CHANNEL_SIZE> =
    Channel::new();

/// Raw-frame tracing toggle (DEBUG_ON / DEBUG_OFF)
pub static DEBUG_MODE: AtomicBool = AtomicBool::new(false);

/// Accepted SIF frames since boot, for STATUS
pub static SIF_PACKETS: AtomicU32 = AtomicU32::new(0);
