use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, Criterion};
use rulebinder::{Actor, ActorType, Item, RuleEngine};
use serde_json::json;

fn build_shared() -> (Arc<RuleEngine>, Arc<Actor>) {
    let mut actor = Actor::new("a1", "Bench", ActorType::Character)
        .with_system("details.level.value", 12)
        .with_roll_option("stance:mountain");

    for i in 0..20 {
        actor = actor.with_item(
            Item::new(format!("i{i}"), format!("Feat {i}"), "feat")
                .with_rule(json!({"key": "RollOption", "option": format!("feat:{i}")}))
                .with_rule(json!({
                    "key": "ActiveEffectLike",
                    "path": "attributes.ac.bonus",
                    "mode": "upgrade",
                    "value": "@actor.details.level.value",
                    "predicate": ["stance:mountain"]
                })),
        );
    }

    (Arc::new(RuleEngine::default()), Arc::new(actor))
}

fn bench_throughput(c: &mut Criterion) {
    let thread_counts = [1, 2, 4, 8];

    let mut group = c.benchmark_group("throughput");
    group.measurement_time(Duration::from_secs(5));

    for &threads in &thread_counts {
        let (engine, actor) = build_shared();

        group.bench_function(&format!("{threads}_threads"), |b| {
            b.iter_custom(|iters| {
                let per_thread = iters / threads as u64;
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let engine = Arc::clone(&engine);
                        let actor = Arc::clone(&actor);
                        thread::spawn(move || {
                            let start = Instant::now();
                            for _ in 0..per_thread {
                                let _ = engine.prepare(&actor);
                            }
                            start.elapsed()
                        })
                    })
                    .collect();

                let mut max_elapsed = Duration::ZERO;
                for h in handles {
                    let elapsed = h.join().unwrap();
                    if elapsed > max_elapsed {
                        max_elapsed = elapsed;
                    }
                }
                max_elapsed
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_throughput);
criterion_main!(benches);
