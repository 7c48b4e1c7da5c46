//! Console line parsing: debug commands and the bench telemetry feed.
//!
//! The console accepts one command per line:
//!
//! - `DEBUG_ON` / `DEBUG_OFF` - raw frame tracing
//! - `STATUS` - one-line decoder status report
//! - `SIF_ON` / `SIF_OFF` - source arbitration override
//! - `DATA,<battery>,<rpm>,<mode>,<reverse>,<brake>,<regen>,<current>,<voltage>`
//!   - bench telemetry feed, fields in the order above; battery and voltage
//!     may carry one decimal place
//!
//! Parsing is allocation-free; numeric fields use x10 fixed point where the
//! feed sends decimals.

/// Maximum valid RPM from the feed
pub const MAX_RPM: u16 = 12_000;

/// Speed modes the controller reports
pub const SPEED_MODE_RANGE: core::ops::RangeInclusive<u8> = 1..=3;

/// A recognized debug command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleCommand {
    DebugOn,
    DebugOff,
    Status,
    SifOn,
    SifOff,
}

/// One telemetry record from the bench feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConsoleFrame {
    pub battery_percent: u8,
    pub rpm: u16,
    pub speed_mode: u8,
    pub reverse: bool,
    pub brake: bool,
    pub regen: bool,
    pub current_a: i16,
    pub voltage_dv: u16,
}

impl From<ConsoleFrame> for sifdash_protocol::VehicleState {
    fn from(frame: ConsoleFrame) -> Self {
        Self {
            battery_percent: frame.battery_percent,
            current_a: frame.current_a,
            voltage_dv: frame.voltage_dv,
            rpm: frame.rpm,
            brake: frame.brake,
            regen: frame.regen,
            reverse: frame.reverse,
            speed_mode: frame.speed_mode,
        }
    }
}

/// A successfully parsed console line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleInput {
    Command(ConsoleCommand),
    Data(ConsoleFrame),
}

/// Why a console line was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleError {
    /// Line is neither a known command nor a DATA record
    UnknownCommand,
    /// DATA record with the wrong number of fields
    FieldCount,
    /// A numeric field failed to parse
    BadNumber,
}

/// Parse one trimmed console line
pub fn parse_line(line: &str) -> Result<ConsoleInput, ConsoleError> {
    let line = line.trim();
    if let Some(fields) = line.strip_prefix("DATA,") {
        return parse_data(fields).map(ConsoleInput::Data);
    }

    let command = match line {
        "DEBUG_ON" => ConsoleCommand::DebugOn,
        "DEBUG_OFF" => ConsoleCommand::DebugOff,
        "STATUS" => ConsoleCommand::Status,
        "SIF_ON" => ConsoleCommand::SifOn,
        "SIF_OFF" => ConsoleCommand::SifOff,
        _ => return Err(ConsoleError::UnknownCommand),
    };
    Ok(ConsoleInput::Command(command))
}

fn parse_data(fields: &str) -> Result<ConsoleFrame, ConsoleError> {
    let mut fields = fields.split(',');
    let mut next = || fields.next().map(str::trim).ok_or(ConsoleError::FieldCount);

    let battery_x10 = parse_x10(next()?)?.clamp(0, 1000);
    let rpm = parse_int(next()?)?.clamp(0, i32::from(MAX_RPM)) as u16;
    let speed_mode = parse_int(next()?)?
        .clamp(i32::from(*SPEED_MODE_RANGE.start()), i32::from(*SPEED_MODE_RANGE.end()))
        as u8;
    let reverse = parse_flag(next()?)?;
    let brake = parse_flag(next()?)?;
    let regen = parse_flag(next()?)?;
    let current_a = parse_int(next()?)?.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
    let voltage_dv = parse_x10(next()?)?.clamp(0, i32::from(u16::MAX)) as u16;

    if fields.next().is_some() {
        return Err(ConsoleError::FieldCount);
    }

    Ok(ConsoleFrame {
        battery_percent: (battery_x10 / 10) as u8,
        rpm,
        speed_mode,
        reverse,
        brake,
        regen,
        current_a,
        voltage_dv,
    })
}

fn parse_int(field: &str) -> Result<i32, ConsoleError> {
    field.parse().map_err(|_| ConsoleError::BadNumber)
}

fn parse_flag(field: &str) -> Result<bool, ConsoleError> {
    Ok(parse_int(field)? == 1)
}

/// Parse a decimal field into x10 fixed point; digits past the first
/// fractional place are truncated (`"41.57"` -> 415)
fn parse_x10(field: &str) -> Result<i32, ConsoleError> {
    match field.split_once('.') {
        None => Ok(parse_int(field)? * 10),
        Some((whole, frac)) => {
            let whole: i32 = parse_int(whole)?;
            let tenths: i32 = frac
                .chars()
                .next()
                .and_then(|c| c.to_digit(10))
                .map(|d| d as i32)
                .ok_or(ConsoleError::BadNumber)?;
            let sign = if whole < 0 || field.starts_with('-') { -1 } else { 1 };
            Ok(whole * 10 + sign * tenths)
        }
    }
}
