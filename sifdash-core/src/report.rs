//! CSV telemetry records for the host-side logger.
//!
//! One record per accepted frame: uptime, the 12 raw frame bytes, the
//! decoded fields, a derived power state, and an estimated pack power.
//! Column order matches what the logger expects; keep [`HEADER`] in step
//! with [`write_record`].

use core::fmt::{self, Write};

use sifdash_protocol::{SifFrame, VehicleState};

/// Column header, emitted once at startup
pub const HEADER: &str = "Timestamp,Byte0,Byte1,Byte2,Byte3,Byte4,Byte5,Byte6,Byte7,Byte8,\
Byte9,Byte10,Byte11,Battery,LoadVoltage,RPM,SpeedMode,Reverse,Brake,Regen,PowerState,Forward,EstPower";

/// Coarse power-flow classification for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    Idle,
    Regen,
    Coast,
    Load,
}

impl PowerState {
    /// Current draw above which the vehicle counts as under load, amps
    const LOAD_THRESHOLD_A: i16 = 10;

    pub fn derive(state: &VehicleState) -> Self {
        if state.regen {
            PowerState::Regen
        } else if state.brake {
            PowerState::Coast
        } else if state.current_a > Self::LOAD_THRESHOLD_A {
            PowerState::Load
        } else {
            PowerState::Idle
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerState::Idle => "IDLE",
            PowerState::Regen => "REGEN",
            PowerState::Coast => "COAST",
            PowerState::Load => "LOAD",
        }
    }
}

/// Append one CSV record (no trailing newline) to `out`.
///
/// `uptime_ms` is printed as seconds with millisecond resolution. The
/// LoadVoltage column re-applies the logger's x1.33 fudge factor to the
/// decivolt reading; EstPower is |current x voltage| in kilowatts with two
/// decimals.
pub fn write_record<W: Write>(
    out: &mut W,
    uptime_ms: u32,
    frame: &SifFrame,
    state: &VehicleState,
) -> fmt::Result {
    write!(out, "{}.{:03}", uptime_ms / 1000, uptime_ms % 1000)?;

    for byte in frame.as_bytes() {
        write!(out, ",{}", byte)?;
    }

    let load_voltage = u32::from(state.voltage_dv) * 133 / 1000;
    let kw_x100 = u32::from(state.current_a.unsigned_abs()) * u32::from(state.voltage_dv) / 100;

    write!(
        out,
        ",{},{},{},{},{},{},{},{},{},{}.{:02}",
        state.battery_percent,
        load_voltage,
        state.rpm,
        state.speed_mode,
        state.reverse as u8,
        state.brake as u8,
        state.regen as u8,
        PowerState::derive(state).as_str(),
        (state.rpm > 100) as u8,
        kw_x100 / 100,
        kw_x100 % 100,
    )
}
