use nobeline_laureates::transform::{
    Accumulator, Language, LaureateAccumulator, LaureateRow, PrizeAccumulator, PrizeKey,
    PrizeRecord,
};
use serde_json::Value;

const FIXTURE: &str = include_str!("../tests/fixtures/laureates.json");

/// Fixture records repeated to roughly the size of the full laureate listing
fn load_records() -> Vec<Value> {
    let envelope: Value = serde_json::from_str(FIXTURE).unwrap();
    let records = envelope["laureates"].as_array().unwrap().clone();
    records.iter().cycle().take(1_000).cloned().collect()
}

#[divan::bench]
fn decode_laureate_rows(bencher: divan::Bencher) {
    let records = load_records();
    bencher.bench(|| {
        records
            .iter()
            .filter_map(|v| serde_json::from_value::<LaureateRow>(v.clone()).ok())
            .count()
    });
}

#[divan::bench]
fn accumulate_laureates_and_prizes(bencher: divan::Bencher) {
    let records = load_records();
    bencher.bench(|| {
        let mut laureates = LaureateAccumulator::new(Language::En);
        let mut prizes = PrizeAccumulator::new();
        for v in &records {
            let Ok(row) = serde_json::from_value::<LaureateRow>(v.clone()) else {
                continue;
            };
            for prize in &row.nobel_prizes {
                prizes.push(PrizeRecord::new(
                    PrizeKey::new(&row.id, prize),
                    prize,
                    Language::En,
                ));
            }
            laureates.push(row);
        }
        (laureates.take_batch().unwrap(), prizes.take_batch().unwrap())
    });
}

fn main() {
    divan::main();
}
