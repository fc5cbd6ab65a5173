//! Example demonstrating multi-threaded store access with SyncGeoStore.
//!
//! Run with: cargo run --example sync_wrapper --features sync --release

#![cfg(feature = "sync")]

use geostore::{QueryOptions, SyncGeoStore};
use std::thread;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== SyncGeoStore Multi-threaded Example ===\n");

    let store = SyncGeoStore::new()?;

    println!("1. Concurrent writers");
    let mut handles = vec![];
    for thread_id in 0..4 {
        let store = store.clone();
        handles.push(thread::spawn(move || {
            for i in 0..250 {
                let x = (thread_id * 64 + i % 64) as f64;
                let y = (i / 64 * 60 + thread_id) as f64;
                store.insert(x, y);
            }
            println!("   Writer {} inserted 250 points", thread_id);
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    println!("   Total points: {}\n", store.len());

    println!("2. Concurrent readers");
    let mut handles = vec![];
    for thread_id in 0..3 {
        let store = store.clone();
        handles.push(thread::spawn(move || {
            let mut matches = 0;
            for i in 0..100 {
                let x = (i * 2 % 256) as f64;
                matches += store.find(x, 60.0, 4.0, None).unwrap().match_count;
            }
            println!("   Reader {} saw {} matches", thread_id, matches);
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    println!("\n3. Cached queries share the write lock");
    let first = store.query(32.0, 60.0, 8.0, QueryOptions::default())?;
    let second = store.query(32.0, 60.0, 8.0, QueryOptions::default())?;
    println!(
        "   {} matches, second call cache hit: {}",
        first.match_count, second.cache_hit
    );

    let stats = store.stats();
    println!(
        "\nFinal: {} points, {} cells, depth {}, {} cached results",
        stats.points, stats.cells, stats.depth, stats.cached_results
    );

    Ok(())
}
