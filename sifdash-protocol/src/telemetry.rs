//! Typed view over an accepted SIF frame.
//!
//! Raw field values carry fixed scale factors determined from the
//! controller: RPM is raw x1.91, voltage is raw x0.75. Both are applied in
//! integer arithmetic; voltage is kept in decivolts so nothing in the decode
//! path touches floating point.

use crate::frame::SifFrame;

/// RPM scale factor, x1.91 as a ratio
const RPM_SCALE_NUM: u32 = 191;
const RPM_SCALE_DEN: u32 = 100;

/// Voltage scale factor, x0.75 expressed in decivolts per raw count
const VOLTAGE_DECIVOLTS_NUM: u32 = 75;
const VOLTAGE_DECIVOLTS_DEN: u32 = 10;

/// Decoded vehicle state from one telemetry frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VehicleState {
    /// Battery level, percent
    pub battery_percent: u8,
    /// Motor current, amps
    pub current_a: i16,
    /// Battery voltage, decivolts (375 = 37.5 V)
    pub voltage_dv: u16,
    /// Motor speed, RPM
    pub rpm: u16,
    /// Brake lever engaged
    pub brake: bool,
    /// Regenerative braking active
    pub regen: bool,
    /// Reverse gear engaged
    pub reverse: bool,
    /// Controller speed mode (low 3 bits of the flags byte)
    pub speed_mode: u8,
}

impl VehicleState {
    /// Decode the consumed fields from an accepted frame.
    ///
    /// The frame is taken at face value; range policy (speed mode limits,
    /// RPM ceilings) belongs to the consumer, not the protocol layer.
    pub fn from_frame(frame: &SifFrame) -> Self {
        Self {
            battery_percent: frame.battery_raw(),
            current_a: i16::from(frame.current_raw()),
            voltage_dv: scale_voltage(frame.voltage_raw()),
            rpm: scale_rpm(frame.rpm_raw()),
            brake: frame.brake(),
            regen: frame.regen(),
            reverse: frame.reverse(),
            speed_mode: frame.speed_mode_raw(),
        }
    }
}

/// Raw big-endian RPM counts to motor RPM
pub fn scale_rpm(raw: u16) -> u16 {
    let scaled = u32::from(raw) * RPM_SCALE_NUM / RPM_SCALE_DEN;
    scaled.min(u32::from(u16::MAX)) as u16
}

/// Raw voltage counts to decivolts
pub fn scale_voltage(raw: u8) -> u16 {
    (u32::from(raw) * VOLTAGE_DECIVOLTS_NUM / VOLTAGE_DECIVOLTS_DEN) as u16
}
