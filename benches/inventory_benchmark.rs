use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use vendor_vault::models::card::{is_complete, normalize_set_number};
use vendor_vault::models::{CardRecord, Condition, InventorySummary, ItemType};

fn synthetic_inventory(count: usize) -> Vec<CardRecord> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let condition = Condition::ALL[i % Condition::ALL.len()];
            let item_type = ItemType::ALL[i % ItemType::ALL.len()];
            CardRecord {
                id: Some(format!("card{:016}", i)),
                card_name: format!("Card {}", i),
                pokemon_name: format!("Pokemon {}", i % 151),
                set_name: "Base Set".to_string(),
                // Every tenth card has no usable number
                set_number: if i % 10 == 0 {
                    "0".to_string()
                } else {
                    format!("{}/102", i % 102)
                },
                condition: condition.to_string(),
                language: "English".to_string(),
                item_type: item_type.to_string(),
                acquisition_price: (i % 500) as f64 + 0.99,
                date_added: base + chrono::Duration::minutes(i as i64),
                card_image_url: None,
                is_complete: false,
            }
        })
        .collect()
}

fn benchmark_completeness(c: &mut Criterion) {
    let cards = synthetic_inventory(10_000);

    let mut group = c.benchmark_group("completeness");

    group.bench_function("is_complete_10k", |b| {
        b.iter(|| cards.iter().filter(|c| is_complete(black_box(c))).count())
    });

    group.bench_function("normalize_set_number", |b| {
        b.iter(|| normalize_set_number(black_box("SWSH-TG30/TG30")))
    });

    group.bench_function("to_document_10k", |b| {
        b.iter(|| {
            cards
                .iter()
                .map(|c| black_box(c).to_document())
                .collect::<Vec<_>>()
        })
    });

    group.finish();
}

fn benchmark_summary(c: &mut Criterion) {
    let cards = synthetic_inventory(10_000);

    c.bench_function("inventory_summary_10k", |b| {
        b.iter(|| InventorySummary::from_cards(black_box(&cards)))
    });
}

criterion_group!(benches, benchmark_completeness, benchmark_summary);
criterion_main!(benches);
