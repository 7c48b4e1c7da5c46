//! Console RX task
//!
//! Reads lines from the host serial link and dispatches them: debug
//! toggles are applied here, everything else goes to the reporter task,
//! which owns the arbitration state.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;
use heapless::{String, Vec};
use portable_atomic::Ordering;

use sifdash_core::console::{parse_line, ConsoleCommand, ConsoleInput};

use crate::channels::{CONSOLE_INPUT, CONSOLE_OUT, DEBUG_MODE, OUT_LINE_LEN};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Maximum console line length; longer lines are dropped whole
const LINE_LEN: usize = 128;

/// Console task - reads and dispatches host serial input
#[embassy_executor::task]
pub async fn console_task(mut rx: BufferedUartRx) {
    info!("Console task started");

    let mut line: Vec<u8, LINE_LEN> = Vec::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                for &byte in &buf[..n] {
                    if byte == b'\n' {
                        handle_line(&line).await;
                        line.clear();
                    } else if line.push(byte).is_err() {
                        warn!("Console line overflow, dropping");
                        line.clear();
                    }
                }
            }
            Ok(_) => {
                // No bytes read, continue
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

/// Parse one raw line and dispatch it
async fn handle_line(raw: &[u8]) {
    let Ok(text) = core::str::from_utf8(raw) else {
        warn!("Console line is not UTF-8, dropping");
        return;
    };
    let text = text.trim();
    if text.is_empty() {
        return;
    }

    match parse_line(text) {
        Ok(ConsoleInput::Command(ConsoleCommand::DebugOn)) => {
            DEBUG_MODE.store(true, Ordering::Relaxed);
            ack("# Debug mode enabled").await;
        }
        Ok(ConsoleInput::Command(ConsoleCommand::DebugOff)) => {
            DEBUG_MODE.store(false, Ordering::Relaxed);
            ack("# Debug mode disabled").await;
        }
        Ok(input) => {
            CONSOLE_INPUT.send(input).await;
        }
        Err(e) => {
            warn!("Rejected console line: {:?}", e);
        }
    }
}

/// Queue a short acknowledgement for the reporter to transmit
async fn ack(message: &str) {
    let mut line: String<OUT_LINE_LEN> = String::new();
    if line.push_str(message).is_ok() {
        CONSOLE_OUT.send(line).await;
    }
}
