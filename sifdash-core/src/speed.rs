//! Road-speed derivation from motor RPM.
//!
//! Motor RPM is geared down through the chain drive before reaching the
//! wheel; speed comes out of the wheel circumference. All arithmetic is
//! integer x10 fixed point (pi as 355/113).

/// Chain-drive and wheel geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriveGeometry {
    /// Front (motor) sprocket tooth count
    pub front_teeth: u8,
    /// Rear (wheel) sprocket tooth count
    pub rear_teeth: u8,
    /// Wheel diameter, tenths of an inch
    pub wheel_diameter_in_x10: u16,
}

impl Default for DriveGeometry {
    /// The stock drivetrain: 11T front, 54T rear, 10" wheel
    fn default() -> Self {
        Self {
            front_teeth: 11,
            rear_teeth: 54,
            wheel_diameter_in_x10: 100,
        }
    }
}

/// Inches per mile
const INCHES_PER_MILE: u64 = 63_360;

/// Road speed in tenths of a mile per hour
pub fn mph_x10(rpm: u16, geometry: &DriveGeometry) -> u16 {
    // wheel RPM = motor RPM x front/rear; mph = wheel RPM x pi x d x 60 / 63360
    let numerator = u64::from(rpm)
        * u64::from(geometry.front_teeth)
        * u64::from(geometry.wheel_diameter_in_x10)
        * 355
        * 60;
    let denominator = u64::from(geometry.rear_teeth) * 113 * INCHES_PER_MILE;
    (numerator / denominator).min(u64::from(u16::MAX)) as u16
}
