//! Capture-file ingestion: extract the timestamp of every TCP packet.

use std::path::Path;

use anyhow::{Context, Result};
use etherparse::{SlicedPacket, TransportSlice};
use pcap::Capture;

/// Read a capture file and return the capture timestamp (seconds since
/// epoch, microsecond precision) of every TCP packet, in file order.
///
/// The capture handle is closed when it goes out of scope, including on
/// the error paths. Packets that etherparse cannot slice (truncated or
/// non-ethernet frames) never match the filter and are skipped, which
/// is what the reference capture library does with them.
pub fn read_capture(path: &Path) -> Result<Vec<f64>> {
    let mut cap = Capture::from_file(path)
        .with_context(|| format!("failed to open capture file {}", path.display()))?;

    let mut timestamps = Vec::new();
    let mut total_packets = 0u64;
    loop {
        match cap.next_packet() {
            Ok(packet) => {
                total_packets += 1;
                if packet_is_tcp(packet.data) {
                    let ts = packet.header.ts;
                    timestamps.push(ts.tv_sec as f64 + ts.tv_usec as f64 / 1e6);
                }
            }
            Err(pcap::Error::NoMorePackets) => break,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("error while reading {}", path.display()));
            }
        }
    }

    log::info!(
        "read {} packets from {}, {} matched the TCP filter",
        total_packets,
        path.display(),
        timestamps.len()
    );
    Ok(timestamps)
}

/// True when the ethernet frame carries a TCP segment (IPv4 or IPv6).
fn packet_is_tcp(data: &[u8]) -> bool {
    match SlicedPacket::from_ethernet(data) {
        Ok(sliced) => matches!(sliced.transport, Some(TransportSlice::Tcp(_))),
        Err(_) => false,
    }
}
