//! Nobel Prize entity transformation: one row per (award year, category),
//! plus the exploded laureate list of each prize.

use std::sync::Arc;

use arrow::array::*;
use arrow::datatypes::Schema;
use serde::Deserialize;

use super::prize::category_key;
use super::{
    Accumulator, Language, Link, Localized, RECORD_BATCH_SIZE, id_string, lenient_i32,
    lenient_i64, one_or_many, string_array, text,
};
use crate::schema;

/// Nobel Prize API prize record
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NobelPrizeRow {
    #[serde(default, deserialize_with = "lenient_i32")]
    pub award_year: Option<i32>,
    #[serde(default)]
    pub category: Option<Localized>,
    #[serde(default)]
    pub category_full_name: Option<Localized>,
    #[serde(default)]
    pub date_awarded: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub prize_amount: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub prize_amount_adjusted: Option<i64>,
    #[serde(default)]
    pub top_motivation: Option<Localized>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub links: Vec<Link>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub laureates: Vec<PrizeLaureate>,
}

impl NobelPrizeRow {
    /// English category name used as the join key
    pub fn category_key(&self) -> Option<String> {
        category_key(&self.category)
    }
}

/// Laureate reference nested in a prize record
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeLaureate {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub known_name: Option<Localized>,
    #[serde(default)]
    pub full_name: Option<Localized>,
    #[serde(default)]
    pub org_name: Option<Localized>,
    #[serde(default)]
    pub portion: Option<String>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub motivation: Option<Localized>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub links: Vec<Link>,
}

/// Flattened `nobel_prize_laureates` row
#[derive(Debug, Clone)]
pub struct NobelPrizeLaureateRecord {
    pub award_year: Option<i32>,
    pub category: Option<String>,
    pub laureate_id: String,
    pub known_name: Option<String>,
    pub portion: Option<String>,
    pub sort_order: Option<i32>,
    pub motivation: Option<String>,
}

impl NobelPrizeLaureateRecord {
    pub fn new(prize: &NobelPrizeRow, laureate: &PrizeLaureate, lang: Language) -> Self {
        Self {
            award_year: prize.award_year,
            category: prize.category_key(),
            laureate_id: laureate.id.clone(),
            known_name: text(&laureate.known_name, lang)
                .or_else(|| text(&laureate.org_name, lang))
                .or_else(|| text(&laureate.full_name, lang)),
            portion: laureate.portion.clone(),
            sort_order: laureate.sort_order,
            motivation: text(&laureate.motivation, lang),
        }
    }
}

// === Accumulators ===

pub struct NobelPrizeAccumulator {
    schema: Arc<Schema>,
    lang: Language,
    award_year: Vec<Option<i32>>,
    category: Vec<Option<String>>,
    category_full_name: Vec<Option<String>>,
    date_awarded: Vec<Option<String>>,
    prize_amount: Vec<Option<i64>>,
    prize_amount_adjusted: Vec<Option<i64>>,
    top_motivation: Vec<Option<String>>,
    laureate_count: Vec<i32>,
}

impl NobelPrizeAccumulator {
    pub fn new(lang: Language) -> Self {
        Self {
            schema: schema::nobel_prizes().clone(),
            lang,
            award_year: Vec::with_capacity(RECORD_BATCH_SIZE),
            category: Vec::with_capacity(RECORD_BATCH_SIZE),
            category_full_name: Vec::with_capacity(RECORD_BATCH_SIZE),
            date_awarded: Vec::with_capacity(RECORD_BATCH_SIZE),
            prize_amount: Vec::with_capacity(RECORD_BATCH_SIZE),
            prize_amount_adjusted: Vec::with_capacity(RECORD_BATCH_SIZE),
            top_motivation: Vec::with_capacity(RECORD_BATCH_SIZE),
            laureate_count: Vec::with_capacity(RECORD_BATCH_SIZE),
        }
    }
}

impl Accumulator for NobelPrizeAccumulator {
    type Row = NobelPrizeRow;

    fn push(&mut self, row: NobelPrizeRow) {
        let lang = self.lang;
        self.category.push(row.category_key());
        self.category_full_name
            .push(text(&row.category_full_name, lang));
        self.top_motivation.push(text(&row.top_motivation, lang));
        self.award_year.push(row.award_year);
        self.date_awarded.push(row.date_awarded);
        self.prize_amount.push(row.prize_amount);
        self.prize_amount_adjusted.push(row.prize_amount_adjusted);
        self.laureate_count
            .push(i32::try_from(row.laureates.len()).unwrap_or(i32::MAX));
    }

    fn len(&self) -> usize {
        self.award_year.len()
    }

    fn take_batch(&mut self) -> Result<RecordBatch, arrow::error::ArrowError> {
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(std::mem::take(&mut self.award_year))),
            string_array(&mut self.category),
            string_array(&mut self.category_full_name),
            string_array(&mut self.date_awarded),
            Arc::new(Int64Array::from(std::mem::take(&mut self.prize_amount))),
            Arc::new(Int64Array::from(std::mem::take(
                &mut self.prize_amount_adjusted,
            ))),
            string_array(&mut self.top_motivation),
            Arc::new(Int32Array::from(std::mem::take(&mut self.laureate_count))),
        ];
        RecordBatch::try_new(self.schema.clone(), arrays)
    }
}

pub struct NobelPrizeLaureateAccumulator {
    schema: Arc<Schema>,
    award_year: Vec<Option<i32>>,
    category: Vec<Option<String>>,
    laureate_id: Vec<String>,
    known_name: Vec<Option<String>>,
    portion: Vec<Option<String>>,
    sort_order: Vec<Option<i32>>,
    motivation: Vec<Option<String>>,
}

impl NobelPrizeLaureateAccumulator {
    pub fn new() -> Self {
        Self {
            schema: schema::nobel_prize_laureates().clone(),
            award_year: Vec::with_capacity(RECORD_BATCH_SIZE),
            category: Vec::with_capacity(RECORD_BATCH_SIZE),
            laureate_id: Vec::with_capacity(RECORD_BATCH_SIZE),
            known_name: Vec::with_capacity(RECORD_BATCH_SIZE),
            portion: Vec::with_capacity(RECORD_BATCH_SIZE),
            sort_order: Vec::with_capacity(RECORD_BATCH_SIZE),
            motivation: Vec::with_capacity(RECORD_BATCH_SIZE),
        }
    }
}

impl Default for NobelPrizeLaureateAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator for NobelPrizeLaureateAccumulator {
    type Row = NobelPrizeLaureateRecord;

    fn push(&mut self, row: NobelPrizeLaureateRecord) {
        self.award_year.push(row.award_year);
        self.category.push(row.category);
        self.laureate_id.push(row.laureate_id);
        self.known_name.push(row.known_name);
        self.portion.push(row.portion);
        self.sort_order.push(row.sort_order);
        self.motivation.push(row.motivation);
    }

    fn len(&self) -> usize {
        self.laureate_id.len()
    }

    fn take_batch(&mut self) -> Result<RecordBatch, arrow::error::ArrowError> {
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(std::mem::take(&mut self.award_year))),
            string_array(&mut self.category),
            Arc::new(StringArray::from(std::mem::take(&mut self.laureate_id))),
            string_array(&mut self.known_name),
            string_array(&mut self.portion),
            Arc::new(Int32Array::from(std::mem::take(&mut self.sort_order))),
            string_array(&mut self.motivation),
        ];
        RecordBatch::try_new(self.schema.clone(), arrays)
    }
}
