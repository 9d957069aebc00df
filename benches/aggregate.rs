/// Aggregation cycle benchmarks

use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use flight_feed::{FeedAggregator, FeedConfig, FeedFormat, FeedResult, FetchSource, GeoPoint};
use rand::Rng;
use serde_json::{json, Value};

const HOME: GeoPoint = GeoPoint::new(-31.0, 151.0);

/// Serves the same body on every fetch
struct StaticSource(Vec<u8>);

#[async_trait]
impl FetchSource for StaticSource {
    async fn fetch(&self, _url: &str) -> FeedResult<Vec<u8>> {
        Ok(self.0.clone())
    }
}

/// Roughly one in five records has a position dropout and one in five a
/// blank callsign, so every cycle exercises gap repair.
fn payload(aircraft_count: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let aircraft: Vec<Value> = (0..aircraft_count)
        .map(|i| {
            let mut record = json!({
                "hex": format!("{:06x}", 0x7c0000 + i),
                "altitude": rng.gen_range(1000..41000),
                "speed": rng.gen_range(120..520),
                "track": rng.gen_range(0..360),
            });
            if rng.gen_ratio(4, 5) {
                record["lat"] = json!(rng.gen_range(-33.0..-29.0));
                record["lon"] = json!(rng.gen_range(149.0..153.0));
            }
            record["flight"] = if rng.gen_ratio(4, 5) {
                json!(format!("VOZ{}", i))
            } else {
                json!("        ")
            };
            record
        })
        .collect();
    serde_json::to_vec(&json!({"now": 1540539351.4, "aircraft": aircraft})).unwrap()
}

fn bench_aggregate_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_cycle");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();

    for aircraft_count in [10, 100, 1000].iter() {
        let config = FeedConfig::new(FeedFormat::Dump1090, HOME)
            .with_filter_radius(300.0)
            .with_cache_sizes(2000, 2000, 2000);
        let mut aggregator = FeedAggregator::new(&config, StaticSource(payload(*aircraft_count))).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(aircraft_count), aircraft_count, |b, _| {
            b.iter(|| runtime.block_on(aggregator.update()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_aggregate_cycle);
criterion_main!(benches);
