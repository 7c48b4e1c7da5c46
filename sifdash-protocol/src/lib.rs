//! SIF Telemetry Protocol
//!
//! This crate decodes the single-wire, pulse-width-encoded telemetry stream
//! ("SIF") emitted by the vehicle controller. The line is self-clocking:
//! each bit cell is a low interval followed by a high interval, and the bit
//! value is carried by the ratio of the two widths.
//!
//! ```text
//!        ┌──┐      ┌──────┐  ┌──┐        ┌──
//!  ──────┘  └──────┘      └──┘  └────────┘
//!   sync       0        1      0   (sync: low ≥ 31x its high)
//! ```
//!
//! 96 bits per sync cycle form a 12-byte frame: 11 payload bytes plus an
//! XOR checksum. Decoding runs in interrupt context on the target; the
//! crate itself is pure state-machine code and tests on the host.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod decoder;
pub mod frame;
pub mod telemetry;

pub use decoder::{DecoderStats, Edge, SifDecoder, SYNC_RATIO};
pub use frame::{SifFrame, FRAME_BITS, FRAME_LEN, PAYLOAD_LEN, REVERSE_SENTINEL};
pub use telemetry::VehicleState;
