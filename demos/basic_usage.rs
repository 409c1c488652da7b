//! Walks a small cache through inserts, an eviction, a touch and an update.
//!
//! Run with tracing output to see evictions as they happen:
//!
//! ```sh
//! RUST_LOG=guarded_lru=trace cargo run --example basic_usage
//! ```

use core::fmt;
use core::num::NonZeroUsize;

use guarded_lru::metrics::CacheMetrics;
use guarded_lru::ConcurrentLruCache;
use tracing_subscriber::EnvFilter;

/// Values stored in the demo cache can be text or numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Text(String),
    Int(i64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{}", n),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cache: ConcurrentLruCache<&'static str, Value> =
        ConcurrentLruCache::new(NonZeroUsize::new(3).unwrap());

    cache.put("company", Value::Text("Yandex".into()));
    cache.put("division", Value::Text("Yandex Lyceum".into()));
    cache.put("course", Value::Text("Golang".into()));
    println!("{}", cache.snapshot());

    match cache.get(&"company") {
        Some(company) => println!("Value for company: {}", company),
        None => println!("company not found in the cache."),
    }

    if let Some((key, value)) = cache.put("year", Value::Int(2024)) {
        println!("evicted {} = {}", key, value);
    }
    if let Some((key, value)) = cache.put("age", Value::Text("13-17yrs".into())) {
        println!("evicted {} = {}", key, value);
    }
    println!("{}", cache.snapshot());

    for (name, value) in cache.metrics() {
        println!("{:>16}: {}", name, value);
    }
}
