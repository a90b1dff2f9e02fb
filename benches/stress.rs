use std::time::{Duration, Instant};

use bedrate::catalog::Catalog;
use bedrate::engine::{self, ChildOrdering};
use bedrate::model::*;

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.2}ms, p50={:.2}ms, p95={:.2}ms, p99={:.2}ms, max={:.2}ms",
        latencies.len(),
        avg.as_secs_f64() * 1000.0,
        percentile(latencies, 50.0).as_secs_f64() * 1000.0,
        percentile(latencies, 95.0).as_secs_f64() * 1000.0,
        percentile(latencies, 99.0).as_secs_f64() * 1000.0,
        latencies.last().unwrap().as_secs_f64() * 1000.0,
    );
}

/// A family room with three setups and every variant allowed.
fn family_room(id: &str) -> RoomType {
    let mut room = RoomType::new(id, "Family");
    for (setup_id, basic, extra) in [("s1", 2, 2), ("s2", 3, 1), ("s3", 4, 2)] {
        room.bed_setups.push(BedSetup::new(setup_id, basic, extra).unwrap());
    }
    let keys: Vec<String> = engine::occupancy_table(&room)
        .into_iter()
        .map(|row| row.key)
        .collect();
    room.allowed_occupancy_variants = keys;
    room
}

fn empty_price_list() -> PriceList {
    PriceList {
        id: "bench".into(),
        name: "Bench".into(),
        property_id: "p".into(),
        currency: "EUR".into(),
        valid_from: None,
        valid_to: None,
        person_categories: Catalog::default().categories().to_vec(),
        room_type_pricing: Vec::new(),
        pricing_matrices: Vec::new(),
    }
}

fn phase1_generation(ordering: ChildOrdering, rounds: usize) {
    let room = family_room("fam");
    let catalog = Catalog::default();
    let mut latencies = Vec::with_capacity(rounds);
    let mut rules = 0;
    for _ in 0..rounds {
        let start = Instant::now();
        let generated = engine::generate_rules(&room, &catalog, ordering).unwrap();
        latencies.push(start.elapsed());
        rules = generated.rules.len();
    }
    println!("  {rules} rules per run");
    print_latency(&format!("generate ({ordering:?})"), &mut latencies);
}

fn phase2_regenerate_many(rooms: usize) {
    let catalog = Catalog::default();
    let mut list = empty_price_list();
    let mut latencies = Vec::with_capacity(rooms);
    let start = Instant::now();
    for i in 0..rooms {
        let room = family_room(&format!("room{i}"));
        let t = Instant::now();
        engine::regenerate(&mut list, &room, &catalog, ChildOrdering::Combinations).unwrap();
        latencies.push(t.elapsed());
    }
    let total: usize = list.room_type_pricing.iter().map(|p| p.pricing_rules.len()).sum();
    println!(
        "  {rooms} room types, {total} rules in {:.2}s",
        start.elapsed().as_secs_f64()
    );
    print_latency("regenerate", &mut latencies);
}

fn phase3_matrix(rounds: usize) {
    let room = family_room("fam");
    let mut pricing = RoomTypePricing {
        room_type_id: room.room_type_id.clone(),
        room_type_name: room.name.clone(),
        base_occupancy_variants: room.allowed_occupancy_variants.clone(),
        pricing_rules: engine::generate_rules(
            &room,
            &Catalog::default(),
            ChildOrdering::Permutations,
        )
        .unwrap()
        .rules,
        base_room_price: 100.0,
    };
    engine::set_base_price(&mut pricing, 100.0).unwrap();

    let context = PricingMatrixContext::new(2, "2 adults");
    let ctx = context.id.clone();
    let mut matrix = PricingMatrix::new("bench").with_context(context).unwrap();
    for i in 1..=2 {
        let slot = SlotKey::new(BedType::Basic, i);
        matrix = matrix
            .with_cell(&ctx, slot, CategoryCode::Adl, MatrixCell::percent(50.0))
            .unwrap();
    }
    for code in [CategoryCode::Adl, CategoryCode::Chd1, CategoryCode::Chd2, CategoryCode::Chd3] {
        for i in 1..=2 {
            matrix = matrix
                .with_cell(&ctx, SlotKey::new(BedType::Extra, i), code, MatrixCell::fixed(20.0))
                .unwrap();
        }
    }

    let mut latencies = Vec::with_capacity(rounds);
    for _ in 0..rounds {
        let start = Instant::now();
        let updated = engine::apply_matrix(&matrix, None, &pricing).unwrap();
        latencies.push(start.elapsed());
        assert_eq!(updated.pricing_rules.len(), pricing.pricing_rules.len());
    }
    println!("  {} rules per application", pricing.pricing_rules.len());
    print_latency("apply matrix", &mut latencies);
}

fn main() {
    let rounds: usize = std::env::var("BEDRATE_BENCH_ROUNDS")
        .unwrap_or_else(|_| "200".into())
        .parse()
        .expect("invalid BEDRATE_BENCH_ROUNDS");

    println!("=== bedrate stress benchmark ===");
    println!("rounds: {rounds}\n");

    println!("[phase 1] rule generation");
    phase1_generation(ChildOrdering::Combinations, rounds);
    phase1_generation(ChildOrdering::Permutations, rounds);

    println!("\n[phase 2] regenerate many room types");
    phase2_regenerate_many(rounds);

    println!("\n[phase 3] matrix application");
    phase3_matrix(rounds);

    println!("\n=== benchmark complete ===");
}
