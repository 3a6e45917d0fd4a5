/// Implementation of `bps fetch`.
///
/// Queries the recent window and prints a report.
///
/// # Example output
///
/// ```text
/// Samples:  512 × 2 (temperature, humidity)
/// Segments: 2
/// Planes:   12 of 12 requested  [4..=15]
/// Ratio:    2.207×  (3712 bytes compressed)
/// Latency:  0.41 ms avg compression, 3.2 ms round trip
///
/// Plane  Blocks   Bytes   Ratio
/// ──────────────────────────────
///     4       1      62   1.032
///   ...
///    15       1      11   5.818
/// ──────────────────────────────
/// ```
use std::fmt::Write as _;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use bps_decoder::{Client, DecodedResponse};

use crate::FetchArgs;

/// Run the `bps fetch` command.
///
/// An empty window is reported on stdout and is not an error.
///
/// # Errors
///
/// Returns an error if the connection fails or the response is invalid.
pub async fn run(args: &FetchArgs) -> Result<()> {
    let client = Client::new(args.addr.as_str());
    let started = Instant::now();
    let response = client
        .fetch_recent(args.seconds, args.planes)
        .await
        .with_context(|| format!("fetch from {} failed", args.addr))?;
    let round_trip = started.elapsed();

    match response {
        Some(response) => print!("{}", report(&response, args, round_trip)),
        None => println!("No data in range (last {} s)", args.seconds),
    }
    Ok(())
}

fn report(response: &DecodedResponse, args: &FetchArgs, round_trip: Duration) -> String {
    let header = &response.header;
    let info = &header.compression_info;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Samples:  {} × {} ({})",
        response.samples(),
        header.sensors,
        header.sensor_names.join(", ")
    );
    let _ = writeln!(out, "Segments: {}", header.segments.len());
    let range = match (header.planes.first(), header.planes.last()) {
        (Some(lo), Some(hi)) => format!("[{lo}..={hi}]"),
        _ => "[]".to_string(),
    };
    let _ = writeln!(
        out,
        "Planes:   {} of {} requested  {range}",
        header.planes.len(),
        args.planes
    );
    let _ = writeln!(
        out,
        "Ratio:    {}×  ({} bytes compressed)",
        info.compression_ratio, info.compressed_bytes
    );
    let _ = writeln!(
        out,
        "Latency:  {} ms avg compression, {:.1} ms round trip",
        info.avg_compression_latency_ms,
        round_trip.as_secs_f64() * 1000.0
    );

    // ── Per-plane table (first segment) ───────────────────────────────────────

    let _ = writeln!(out);
    let _ = writeln!(out, "Plane  Blocks   Bytes   Ratio");
    let _ = writeln!(out, "{}", "─".repeat(30));
    for stat in response.per_plane_stats() {
        let _ = writeln!(
            out,
            "{:>5}  {:>6}  {:>6}  {:>6.3}",
            stat.plane, stat.blocks, stat.compressed_bytes, stat.ratio
        );
    }
    let _ = writeln!(out, "{}", "─".repeat(30));

    if let Some(limit) = args.show_values {
        let _ = writeln!(out);
        let _ = writeln!(out, "{:>6}  {}", "row", header.sensor_names.join("  "));
        for (index, row) in response.values.rows().take(limit).enumerate() {
            let cells: Vec<String> = row.iter().map(|v| format!("{:>9.3}", v.to_f32())).collect();
            let _ = writeln!(out, "{index:>6}  {}", cells.join("  "));
        }
    }
    out
}
