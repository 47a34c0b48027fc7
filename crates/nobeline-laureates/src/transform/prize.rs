//! Per-laureate prize entries → `laureate_prizes` rows

use std::sync::Arc;

use arrow::array::*;
use arrow::datatypes::Schema;
use serde::Deserialize;

use super::affiliation::AffiliationEntry;
use super::{
    Accumulator, Language, Link, Localized, Place, RECORD_BATCH_SIZE, lenient_i32, lenient_i64,
    one_or_many, string_array, text,
};
use crate::schema;

/// One element of a laureate's `nobelPrizes` array
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeEntry {
    #[serde(default, deserialize_with = "lenient_i32")]
    pub award_year: Option<i32>,
    #[serde(default)]
    pub category: Option<Localized>,
    #[serde(default)]
    pub category_full_name: Option<Localized>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub portion: Option<String>,
    #[serde(default)]
    pub date_awarded: Option<String>,
    #[serde(default)]
    pub prize_status: Option<String>,
    #[serde(default)]
    pub motivation: Option<Localized>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub prize_amount: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub prize_amount_adjusted: Option<i64>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub affiliations: Vec<AffiliationEntry>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub residences: Vec<Place>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub links: Vec<Link>,
}

/// Natural key of a category: always the English name, independent of the
/// output language, so tables fetched in different languages still join.
pub fn category_key(category: &Option<Localized>) -> Option<String> {
    text(category, Language::En)
}

/// Parent key carried by every row derived from one prize of one laureate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrizeKey {
    pub laureate_id: String,
    pub award_year: Option<i32>,
    pub category: Option<String>,
}

impl PrizeKey {
    pub fn new(laureate_id: &str, prize: &PrizeEntry) -> Self {
        Self {
            laureate_id: laureate_id.to_string(),
            award_year: prize.award_year,
            category: category_key(&prize.category),
        }
    }
}

/// Flattened `laureate_prizes` row
#[derive(Debug, Clone)]
pub struct PrizeRecord {
    pub key: PrizeKey,
    pub category_full_name: Option<String>,
    pub sort_order: Option<i32>,
    pub portion: Option<String>,
    pub date_awarded: Option<String>,
    pub prize_status: Option<String>,
    pub motivation: Option<String>,
    pub prize_amount: Option<i64>,
    pub prize_amount_adjusted: Option<i64>,
    pub affiliation_count: i32,
    pub residence_count: i32,
}

impl PrizeRecord {
    pub fn new(key: PrizeKey, prize: &PrizeEntry, lang: Language) -> Self {
        Self {
            key,
            category_full_name: text(&prize.category_full_name, lang),
            sort_order: prize.sort_order,
            portion: prize.portion.clone(),
            date_awarded: prize.date_awarded.clone(),
            prize_status: prize.prize_status.clone(),
            motivation: text(&prize.motivation, lang),
            prize_amount: prize.prize_amount,
            prize_amount_adjusted: prize.prize_amount_adjusted,
            affiliation_count: i32::try_from(prize.affiliations.len()).unwrap_or(i32::MAX),
            residence_count: i32::try_from(prize.residences.len()).unwrap_or(i32::MAX),
        }
    }
}

// === Accumulator ===

pub struct PrizeAccumulator {
    schema: Arc<Schema>,
    laureate_id: Vec<String>,
    award_year: Vec<Option<i32>>,
    category: Vec<Option<String>>,
    category_full_name: Vec<Option<String>>,
    sort_order: Vec<Option<i32>>,
    portion: Vec<Option<String>>,
    date_awarded: Vec<Option<String>>,
    prize_status: Vec<Option<String>>,
    motivation: Vec<Option<String>>,
    prize_amount: Vec<Option<i64>>,
    prize_amount_adjusted: Vec<Option<i64>>,
    affiliation_count: Vec<i32>,
    residence_count: Vec<i32>,
}

impl PrizeAccumulator {
    pub fn new() -> Self {
        Self {
            schema: schema::laureate_prizes().clone(),
            laureate_id: Vec::with_capacity(RECORD_BATCH_SIZE),
            award_year: Vec::with_capacity(RECORD_BATCH_SIZE),
            category: Vec::with_capacity(RECORD_BATCH_SIZE),
            category_full_name: Vec::with_capacity(RECORD_BATCH_SIZE),
            sort_order: Vec::with_capacity(RECORD_BATCH_SIZE),
            portion: Vec::with_capacity(RECORD_BATCH_SIZE),
            date_awarded: Vec::with_capacity(RECORD_BATCH_SIZE),
            prize_status: Vec::with_capacity(RECORD_BATCH_SIZE),
            motivation: Vec::with_capacity(RECORD_BATCH_SIZE),
            prize_amount: Vec::with_capacity(RECORD_BATCH_SIZE),
            prize_amount_adjusted: Vec::with_capacity(RECORD_BATCH_SIZE),
            affiliation_count: Vec::with_capacity(RECORD_BATCH_SIZE),
            residence_count: Vec::with_capacity(RECORD_BATCH_SIZE),
        }
    }
}

impl Default for PrizeAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator for PrizeAccumulator {
    type Row = PrizeRecord;

    fn push(&mut self, row: PrizeRecord) {
        self.laureate_id.push(row.key.laureate_id);
        self.award_year.push(row.key.award_year);
        self.category.push(row.key.category);
        self.category_full_name.push(row.category_full_name);
        self.sort_order.push(row.sort_order);
        self.portion.push(row.portion);
        self.date_awarded.push(row.date_awarded);
        self.prize_status.push(row.prize_status);
        self.motivation.push(row.motivation);
        self.prize_amount.push(row.prize_amount);
        self.prize_amount_adjusted.push(row.prize_amount_adjusted);
        self.affiliation_count.push(row.affiliation_count);
        self.residence_count.push(row.residence_count);
    }

    fn len(&self) -> usize {
        self.laureate_id.len()
    }

    fn take_batch(&mut self) -> Result<RecordBatch, arrow::error::ArrowError> {
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(std::mem::take(&mut self.laureate_id))),
            Arc::new(Int32Array::from(std::mem::take(&mut self.award_year))),
            string_array(&mut self.category),
            string_array(&mut self.category_full_name),
            Arc::new(Int32Array::from(std::mem::take(&mut self.sort_order))),
            string_array(&mut self.portion),
            string_array(&mut self.date_awarded),
            string_array(&mut self.prize_status),
            string_array(&mut self.motivation),
            Arc::new(Int64Array::from(std::mem::take(&mut self.prize_amount))),
            Arc::new(Int64Array::from(std::mem::take(
                &mut self.prize_amount_adjusted,
            ))),
            Arc::new(Int32Array::from(std::mem::take(&mut self.affiliation_count))),
            Arc::new(Int32Array::from(std::mem::take(&mut self.residence_count))),
        ];
        RecordBatch::try_new(self.schema.clone(), arrays)
    }
}
