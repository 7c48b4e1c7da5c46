//! Board-agnostic dashboard logic for the sifdash firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware:
//!
//! - Published telemetry snapshot (interrupt-to-main-loop handoff)
//! - Telemetry source arbitration (SIF vs bench console feed)
//! - Console command and feed-line parsing
//! - CSV record formatting for the host-side logger
//! - Road-speed derivation from motor RPM

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod console;
pub mod report;
pub mod snapshot;
pub mod source;
pub mod speed;
