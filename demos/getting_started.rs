//! Walkthrough of the store: inserts, radius queries, the result cache,
//! cost limits and the cell dump.
//!
//! Run with: cargo run --example getting_started

use geostore::{Bounds, GeoStore, GeoStoreError, QueryOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== geostore getting started ===\n");

    let mut store = GeoStore::builder()
        .bounds(Bounds::new(0.0, 0.0, 256.0, 256.0))
        .split_threshold(2)
        .cache(20, 10)
        .build()?;

    println!("1. Inserting points");
    for (x, y) in [
        (10.0, 10.0),
        (10.0, 10.0),
        (65.0, 65.0),
        (66.0, 66.0),
        (67.0, 67.0),
        (127.0, 127.0),
        (129.0, 129.0),
        (67.0, 127.0),
        (68.0, 129.0),
    ] {
        store.insert(x, y);
    }
    let stats = store.stats();
    println!(
        "   {} points in {} cells, depth {}\n",
        stats.points, stats.cells, stats.depth
    );

    println!("2. Radius query");
    let response = store.query(63.0, 63.0, 3.0 * 2f64.sqrt(), QueryOptions::default())?;
    for m in &response.entities {
        println!("   ({}, {}) at {:.3}", m.point.x(), m.point.y(), m.distance);
    }
    println!(
        "   estimate {}, {} cells scanned, cache hit: {}\n",
        response.estimate, response.cells_visited, response.cache_hit
    );

    println!("3. Same query again");
    let again = store.query(63.0, 63.0, 3.0 * 2f64.sqrt(), QueryOptions::default())?;
    println!("   cache hit: {}\n", again.cache_hit);

    println!("4. Cost limit");
    match store.query(128.0, 128.0, 100.0, QueryOptions::default().with_limit(3)) {
        Err(GeoStoreError::CandidateOverflow { estimate, limit }) => {
            println!("   refused: estimate {} over limit {}", estimate, limit)
        }
        Err(e) => return Err(e.into()),
        Ok(r) => println!("   {} matches", r.match_count),
    }
    let paged = store.query(
        128.0,
        128.0,
        100.0,
        QueryOptions::default().with_count(3).with_offset(1),
    )?;
    println!(
        "   without a limit: {} matches, page of {}\n",
        paged.match_count,
        paged.entities.len()
    );

    println!("5. Cell dump");
    for cell in store.enumerate() {
        println!(
            "   {}[{}, {}]-[{}, {}] level {} count {}",
            "  ".repeat(cell.level as usize),
            cell.x0,
            cell.y0,
            cell.x1,
            cell.y1,
            cell.level,
            cell.entity_count
        );
    }

    store.reset(None)?;
    println!("\nAfter reset: {} points", store.len());

    Ok(())
}
