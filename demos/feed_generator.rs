/// Synthetic dump1090 feed generator
///
/// Writes an `aircraft.json` snapshot with random traffic around a home
/// location to stdout or a file. Serve the output directory with any static
/// HTTP server to point `poll_feed` at it.

use rand::Rng;
use serde_json::{json, Value};
use std::env;
use std::fs::File;
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

const HOME_LATITUDE: f64 = -31.0;
const HOME_LONGITUDE: f64 = 151.0;

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let output_path = if args.len() > 1 {
        args[1].clone()
    } else {
        "/tmp/aircraft.json".to_string()
    };

    let aircraft_count: usize = if args.len() > 2 {
        args[2].parse().unwrap_or(50)
    } else {
        50
    };

    let mut output: Box<dyn Write> = if output_path == "stdout" {
        Box::new(std::io::stdout())
    } else {
        Box::new(File::create(&output_path)?)
    };

    let mut rng = rand::thread_rng();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default();

    eprintln!("Generating {} aircraft to {}", aircraft_count, output_path);

    let aircraft: Vec<Value> = (0..aircraft_count)
        .map(|i| {
            let mut record = json!({
                "hex": format!("{:06x}", 0x7c0000 + rng.gen_range(0..0xffff)),
                "squawk": format!("{:04o}", rng.gen_range(0..0o7777)),
                "messages": rng.gen_range(1..5000),
                "seen": rng.gen_range(0.0..10.0),
                "rssi": rng.gen_range(-35.0..-15.0),
            });

            // Mix in the cases a receiver actually reports: aircraft on the
            // ground, no position yet, no callsign yet.
            match rng.gen_range(0..10) {
                0 => {
                    record["altitude"] = json!("ground");
                    record["speed"] = json!(0);
                }
                _ => {
                    record["altitude"] = json!(rng.gen_range(500..41000));
                    record["speed"] = json!(rng.gen_range(120..520));
                    record["track"] = json!(rng.gen_range(0..360));
                    record["vert_rate"] = json!(rng.gen_range(-3000..3000));
                }
            }
            if rng.gen_ratio(9, 10) {
                record["lat"] = json!(HOME_LATITUDE + rng.gen_range(-4.0..4.0));
                record["lon"] = json!(HOME_LONGITUDE + rng.gen_range(-4.0..4.0));
            }
            if rng.gen_ratio(4, 5) {
                record["flight"] = json!(format!("{:<8}", format!("VOZ{}", 100 + i)));
            }
            record
        })
        .collect();

    let payload = json!({"now": now, "messages": rng.gen_range(10_000..1_000_000), "aircraft": aircraft});
    serde_json::to_writer_pretty(&mut output, &payload)?;
    writeln!(output)?;

    eprintln!("Feed generation complete: {} aircraft", aircraft_count);

    Ok(())
}
