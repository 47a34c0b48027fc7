//! Prize affiliations → `prize_affiliations` rows

use std::sync::Arc;

use arrow::array::*;
use arrow::datatypes::Schema;
use serde::Deserialize;

use super::prize::PrizeKey;
use super::{
    Accumulator, FlatPlace, Language, Localized, Place, PlaceColumns, RECORD_BATCH_SIZE,
    string_array, text,
};
use crate::schema;

/// Institution the laureate worked at when awarded; place keys sit beside the name
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffiliationEntry {
    #[serde(default)]
    pub name: Option<Localized>,
    #[serde(default)]
    pub name_now: Option<Localized>,
    #[serde(flatten)]
    pub place: Place,
}

#[derive(Debug, Clone)]
pub struct AffiliationRecord {
    pub key: PrizeKey,
    pub position: i32,
    pub name: Option<String>,
    pub name_now: Option<String>,
    pub place: FlatPlace,
}

impl AffiliationRecord {
    pub fn new(key: PrizeKey, position: usize, entry: &AffiliationEntry, lang: Language) -> Self {
        Self {
            key,
            position: i32::try_from(position).unwrap_or(i32::MAX),
            name: text(&entry.name, lang),
            name_now: text(&entry.name_now, lang),
            place: entry.place.resolve(lang),
        }
    }
}

pub struct AffiliationAccumulator {
    schema: Arc<Schema>,
    laureate_id: Vec<String>,
    award_year: Vec<Option<i32>>,
    category: Vec<Option<String>>,
    position: Vec<i32>,
    name: Vec<Option<String>>,
    name_now: Vec<Option<String>>,
    place: PlaceColumns,
}

impl AffiliationAccumulator {
    pub fn new() -> Self {
        Self {
            schema: schema::prize_affiliations().clone(),
            laureate_id: Vec::with_capacity(RECORD_BATCH_SIZE),
            award_year: Vec::with_capacity(RECORD_BATCH_SIZE),
            category: Vec::with_capacity(RECORD_BATCH_SIZE),
            position: Vec::with_capacity(RECORD_BATCH_SIZE),
            name: Vec::with_capacity(RECORD_BATCH_SIZE),
            name_now: Vec::with_capacity(RECORD_BATCH_SIZE),
            place: PlaceColumns::default(),
        }
    }
}

impl Default for AffiliationAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator for AffiliationAccumulator {
    type Row = AffiliationRecord;

    fn push(&mut self, row: AffiliationRecord) {
        self.laureate_id.push(row.key.laureate_id);
        self.award_year.push(row.key.award_year);
        self.category.push(row.key.category);
        self.position.push(row.position);
        self.name.push(row.name);
        self.name_now.push(row.name_now);
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
            string_array(&mut self.name),
            string_array(&mut self.name_now),
        ];
        arrays.extend(self.place.take_arrays());
        RecordBatch::try_new(self.schema.clone(), arrays)
    }
}
