//! Reporter task - the consumer side of the decoder
//!
//! Waits on parsed console input and a periodic tick. On each tick it
//! polls the published snapshot, maps accepted frames to vehicle state,
//! and emits CSV records for the host-side logger. Also owns telemetry
//! source arbitration: while the bench console feed is active, SIF frames
//! keep decoding but are not reported.

use core::fmt::Write as _;

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::uart::BufferedUartTx;
use embassy_time::{Duration, Instant, Ticker};
use embedded_io_async::Write;
use heapless::String;
use portable_atomic::Ordering;

use sifdash_core::console::{ConsoleCommand, ConsoleInput};
use sifdash_core::report;
use sifdash_core::source::{SourceArbiter, TelemetrySource};
use sifdash_core::speed::{mph_x10, DriveGeometry};
use sifdash_protocol::{SifFrame, VehicleState};

use crate::channels::{CONSOLE_INPUT, CONSOLE_OUT, OUT_LINE_LEN, SIF_PACKETS, SIF_SNAPSHOT};

/// Polling period for the snapshot latch
const TICK_MS: u64 = 50;

/// Re-send the last record at least this often, matching the logger's
/// expectation of a steady feed
const RESEND_MS: u32 = 200;

/// Reporter task - emits CSV telemetry records
#[embassy_executor::task]
pub async fn reporter_task(mut tx: BufferedUartTx) {
    info!("Reporter task started");

    send_line(&mut tx, report::HEADER).await;

    let geometry = DriveGeometry::default();
    let mut arbiter = SourceArbiter::new();
    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));
    let mut state = VehicleState::default();
    let mut last_frame: Option<SifFrame> = None;
    let mut last_sent_ms: u32 = 0;

    loop {
        // Wait for either: parsed console input, or the reporting tick
        match select(CONSOLE_INPUT.receive(), ticker.next()).await {
            Either::First(input) => {
                let now_ms = uptime_ms();
                match input {
                    ConsoleInput::Command(ConsoleCommand::SifOn) => {
                        arbiter.set_sif_enabled(true);
                        send_line(&mut tx, "# SIF enabled").await;
                    }
                    ConsoleInput::Command(ConsoleCommand::SifOff) => {
                        arbiter.set_sif_enabled(false);
                        send_line(&mut tx, "# SIF disabled - using console feed").await;
                    }
                    ConsoleInput::Command(ConsoleCommand::Status) => {
                        let line = status_line(&arbiter, &state, &geometry);
                        send_line(&mut tx, line.as_str()).await;
                    }
                    ConsoleInput::Command(_) => {
                        // Debug toggles are applied in the console task
                    }
                    ConsoleInput::Data(feed) => {
                        arbiter.console_data(now_ms);
                        state = VehicleState::from(feed);
                    }
                }
            }
            Either::Second(()) => {
                let now_ms = uptime_ms();
                arbiter.tick(now_ms);

                // Acknowledgements queued by the console task
                while let Ok(line) = CONSOLE_OUT.try_receive() {
                    send_line(&mut tx, line.as_str()).await;
                }

                if arbiter.active() == TelemetrySource::Sif {
                    if let Some(frame) = SIF_SNAPSHOT.take() {
                        state = VehicleState::from_frame(&frame);
                        send_record(&mut tx, now_ms, &frame, &state).await;
                        last_frame = Some(frame);
                        last_sent_ms = now_ms;
                    } else if let Some(frame) = last_frame {
                        if now_ms.wrapping_sub(last_sent_ms) > RESEND_MS {
                            send_record(&mut tx, now_ms, &frame, &state).await;
                            last_sent_ms = now_ms;
                        }
                    }
                }
                // While the console feed drives the state there is nothing
                // to echo; SIF frames keep accumulating in the snapshot.
            }
        }
    }
}

/// Milliseconds since boot, truncated to the logger's 32-bit clock
fn uptime_ms() -> u32 {
    Instant::now().as_millis() as u32
}

/// One-line STATUS response
fn status_line(
    arbiter: &SourceArbiter,
    state: &VehicleState,
    geometry: &DriveGeometry,
) -> String<OUT_LINE_LEN> {
    let mph = mph_x10(state.rpm, geometry);
    let source = match arbiter.active() {
        TelemetrySource::Sif => "SIF",
        TelemetrySource::Console => "CONSOLE",
    };

    let mut line: String<OUT_LINE_LEN> = String::new();
    let _ = write!(
        line,
        "# SIF packets: {}, source: {}, speed: {}.{} mph",
        SIF_PACKETS.load(Ordering::Relaxed),
        source,
        mph / 10,
        mph % 10,
    );
    line
}

/// Format and transmit one CSV record
async fn send_record(tx: &mut BufferedUartTx, now_ms: u32, frame: &SifFrame, state: &VehicleState) {
    let mut line: String<256> = String::new();
    if report::write_record(&mut line, now_ms, frame, state).is_err() {
        warn!("CSV record overflowed its buffer");
        return;
    }
    send_line(tx, line.as_str()).await;
}

/// Transmit one line with CRLF termination
async fn send_line(tx: &mut BufferedUartTx, line: &str) {
    if let Err(e) = tx.write_all(line.as_bytes()).await {
        warn!("UART write error: {:?}", e);
        return;
    }
    if let Err(e) = tx.write_all(b"\r\n").await {
        warn!("UART write error: {:?}", e);
    }
}
