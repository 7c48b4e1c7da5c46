//! SIF edge task
//!
//! Highest-priority work in the system: every transition on the SIF pin is
//! timestamped and fed to the decoder, which must keep up with edges a few
//! hundred microseconds apart. Accepted frames go straight into the shared
//! snapshot; everything else is handled (or dropped) inside the decoder.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::Instant;
use portable_atomic::Ordering;

use sifdash_protocol::{Edge, SifDecoder};

use crate::channels::{DEBUG_MODE, SIF_PACKETS, SIF_SNAPSHOT};

/// SIF edge task - decodes controller telemetry from pin transitions
#[embassy_executor::task]
pub async fn sif_task(mut pin: Input<'static>) {
    info!("SIF task started");

    let mut decoder = SifDecoder::new();

    loop {
        pin.wait_for_any_edge().await;
        let now_us = Instant::now().as_micros();
        let edge = if pin.is_high() {
            Edge::Rising
        } else {
            Edge::Falling
        };

        if let Some(frame) = decoder.on_edge(edge, now_us) {
            SIF_SNAPSHOT.publish(frame);
            SIF_PACKETS.fetch_add(1, Ordering::Relaxed);

            if DEBUG_MODE.load(Ordering::Relaxed) {
                debug!("SIF frame: {:02x}", frame.as_bytes());
            }
        }
    }
}
