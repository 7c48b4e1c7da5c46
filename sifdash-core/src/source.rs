//! Telemetry source arbitration.
//!
//! The dashboard normally runs from decoded SIF frames. A bench setup can
//! instead drive it over the console feed (`DATA,` lines); the feed takes
//! over as soon as a line arrives and SIF reclaims the source once the feed
//! has been silent for [`CONSOLE_TIMEOUT_MS`]. The `SIF_ON`/`SIF_OFF`
//! console commands override arbitration entirely.
//!
//! This is data-source policy for the consumer side; the SIF decoder keeps
//! running (and publishing) regardless of which source is active.

/// Console feed staleness window, milliseconds
pub const CONSOLE_TIMEOUT_MS: u32 = 2000;

/// Which telemetry source currently drives the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetrySource {
    /// Decoded SIF frames from the controller
    Sif,
    /// Textual `DATA,` feed over the console
    Console,
}

/// Tracks feed freshness and the manual override.
#[derive(Debug, Clone)]
pub struct SourceArbiter {
    active: TelemetrySource,
    /// Uptime of the last console feed line, None until the first
    last_console_ms: Option<u32>,
    /// Cleared by `SIF_OFF`, set by `SIF_ON`
    sif_enabled: bool,
}

impl Default for SourceArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceArbiter {
    /// SIF active, no console data seen, override off
    pub const fn new() -> Self {
        Self {
            active: TelemetrySource::Sif,
            last_console_ms: None,
            sif_enabled: true,
        }
    }

    /// Record a console feed line; the feed becomes the active source
    pub fn console_data(&mut self, now_ms: u32) {
        self.last_console_ms = Some(now_ms);
        self.active = TelemetrySource::Console;
    }

    /// Periodic update; reverts to SIF once the feed goes stale
    pub fn tick(&mut self, now_ms: u32) {
        if !self.sif_enabled {
            self.active = TelemetrySource::Console;
            return;
        }
        if let Some(last_ms) = self.last_console_ms {
            if now_ms.wrapping_sub(last_ms) > CONSOLE_TIMEOUT_MS {
                self.active = TelemetrySource::Sif;
            }
        }
    }

    /// Manual override from the `SIF_ON`/`SIF_OFF` commands.
    ///
    /// Disabling pins the console source until re-enabled; re-enabling
    /// returns to normal staleness arbitration.
    pub fn set_sif_enabled(&mut self, enabled: bool) {
        self.sif_enabled = enabled;
        if !enabled {
            self.active = TelemetrySource::Console;
        } else if self.last_console_ms.is_none() {
            self.active = TelemetrySource::Sif;
        }
    }

    /// Whether SIF frames are currently trusted
    pub fn sif_enabled(&self) -> bool {
        self.sif_enabled
    }

    /// The currently active source
    pub fn active(&self) -> TelemetrySource {
        self.active
    }
}
