//! Prize residences → `prize_residences` rows

use std::sync::Arc;

use arrow::array::*;
use arrow::datatypes::Schema;

use super::prize::PrizeKey;
use super::{Accumulator, FlatPlace, Language, Place, PlaceColumns, RECORD_BATCH_SIZE, string_array};
use crate::schema;

#[derive(Debug, Clone)]
pub struct ResidenceRecord {
    pub key: PrizeKey,
    pub position: i32,
    pub place: FlatPlace,
}

impl ResidenceRecord {
    pub fn new(key: PrizeKey, position: usize, place: &Place, lang: Language) -> Self {
        Self {
            key,
            position: i32::try_from(position).unwrap_or(i32::MAX),
            place: place.resolve(lang),
        }
    }
}

pub struct ResidenceAccumulator {
    schema: Arc<Schema>,
    laureate_id: Vec<String>,
    award_year: Vec<Option<i32>>,
    category: Vec<Option<String>>,
    position: Vec<i32>,
    place: PlaceColumns,
}

impl ResidenceAccumulator {
    pub fn new() -> Self {
        Self {
            schema: schema::prize_residences().clone(),
            laureate_id: Vec::with_capacity(RECORD_BATCH_SIZE),
            award_year: Vec::with_capacity(RECORD_BATCH_SIZE),
            category: Vec::with_capacity(RECORD_BATCH_SIZE),
            position: Vec::with_capacity(RECORD_BATCH_SIZE),
            place: PlaceColumns::default(),
        }
    }
}

impl Default for ResidenceAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator for ResidenceAccumulator {
    type Row = ResidenceRecord;

    fn push(&mut self, row: ResidenceRecord) {
        self.laureate_id.push(row.key.laureate_id);
        self.award_year.push(row.key.award_year);
        self.category.push(row.key.category);
        self.position.push(row.position);
        self.place.push(row.place);
    }

    fn len(&self) -> usize {
        self.laureate_id.len()
    }

    fn take_batch(&mut self) -> Result<RecordBatch, arrow::error::ArrowError> {
        let mut arrays: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(std::mem::take(&mut self.laureate_id))),
            Arc::new(Int32Array::from(std::mem::take(&mut self.award_year))),
            string_array(&mut self.category),
            Arc::new(Int32Array::from(std::mem::take(&mut self.position))),
        ];
        arrays.extend(self.place.take_arrays());
        RecordBatch::try_new(self.schema.clone(), arrays)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residence_batch() {
        let place: Place = serde_json::from_str(
            r#"{"city": {"en": "Princeton, NJ"}, "country": {"en": "USA"}}"#,
        )
        .unwrap();
        let key = PrizeKey {
            laureate_id: "26".into(),
            award_year: Some(1921),
            category: Some("Physics".into()),
        };
        let mut acc = ResidenceAccumulator::new();
        acc.push(ResidenceRecord::new(key, 0, &place, Language::En));

        let batch = acc.take_batch().unwrap();
        assert_eq!(batch.num_rows(), 1);
        let country = batch
            .column_by_name("country")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(country.value(0), "USA");
    }
}
