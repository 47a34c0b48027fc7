//! Cross-reference link pairs → `laureate_links` / `nobel_prize_links` rows

use std::sync::Arc;

use arrow::array::*;
use arrow::datatypes::Schema;

use super::{Accumulator, Link, RECORD_BATCH_SIZE, string_array};
use crate::schema;

/// `rel` value given to `sameAs` URLs
pub const SAME_AS_REL: &str = "sameAs";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRecord {
    pub laureate_id: Option<String>,
    pub award_year: Option<i32>,
    pub category: Option<String>,
    pub rel: Option<String>,
    pub href: Option<String>,
    pub action: Option<String>,
    pub types: Option<String>,
}

impl LinkRecord {
    pub fn new(
        laureate_id: Option<&str>,
        award_year: Option<i32>,
        category: Option<&str>,
        link: &Link,
    ) -> Self {
        Self {
            laureate_id: laureate_id.map(str::to_string),
            award_year,
            category: category.map(str::to_string),
            rel: link.rel.clone(),
            href: link.href.clone(),
            action: link.action.clone(),
            types: link.types.clone(),
        }
    }

    /// Laureate-level `sameAs` URL
    pub fn same_as(laureate_id: &str, url: &str) -> Self {
        Self {
            laureate_id: Some(laureate_id.to_string()),
            rel: Some(SAME_AS_REL.to_string()),
            href: Some(url.to_string()),
            ..Default::default()
        }
    }
}

pub struct LinkAccumulator {
    schema: Arc<Schema>,
    laureate_id: Vec<Option<String>>,
    award_year: Vec<Option<i32>>,
    category: Vec<Option<String>>,
    rel: Vec<Option<String>>,
    href: Vec<Option<String>>,
    action: Vec<Option<String>>,
    types: Vec<Option<String>>,
}

impl LinkAccumulator {
    pub fn new() -> Self {
        Self {
            schema: schema::links().clone(),
            laureate_id: Vec::with_capacity(RECORD_BATCH_SIZE),
            award_year: Vec::with_capacity(RECORD_BATCH_SIZE),
            category: Vec::with_capacity(RECORD_BATCH_SIZE),
            rel: Vec::with_capacity(RECORD_BATCH_SIZE),
            href: Vec::with_capacity(RECORD_BATCH_SIZE),
            action: Vec::with_capacity(RECORD_BATCH_SIZE),
            types: Vec::with_capacity(RECORD_BATCH_SIZE),
        }
    }
}

impl Default for LinkAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator for LinkAccumulator {
    type Row = LinkRecord;

    fn push(&mut self, row: LinkRecord) {
        self.laureate_id.push(row.laureate_id);
        self.award_year.push(row.award_year);
        self.category.push(row.category);
        self.rel.push(row.rel);
        self.href.push(row.href);
        self.action.push(row.action);
        self.types.push(row.types);
    }

    fn len(&self) -> usize {
        self.href.len()
    }

    fn take_batch(&mut self) -> Result<RecordBatch, arrow::error::ArrowError> {
        let arrays: Vec<ArrayRef> = vec![
            string_array(&mut self.laureate_id),
            Arc::new(Int32Array::from(std::mem::take(&mut self.award_year))),
            string_array(&mut self.category),
            string_array(&mut self.rel),
            string_array(&mut self.href),
            string_array(&mut self.action),
            string_array(&mut self.types),
        ];
        RecordBatch::try_new(self.schema.clone(), arrays)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_as_record() {
        let rec = LinkRecord::same_as("6", "https://www.wikidata.org/wiki/Q7186");
        assert_eq!(rec.rel.as_deref(), Some(SAME_AS_REL));
        assert_eq!(rec.laureate_id.as_deref(), Some("6"));
        assert!(rec.award_year.is_none());
        assert!(rec.action.is_none());
    }

    #[test]
    fn prize_level_link_keeps_keys() {
        let link = Link {
            rel: Some("nobelPrize".into()),
            href: Some("https://api.nobelprize.org/2/nobelPrize/phy/1903".into()),
            action: Some("GET".into()),
            types: Some("application/json".into()),
        };
        let rec = LinkRecord::new(Some("6"), Some(1903), Some("Physics"), &link);
        assert_eq!(rec.award_year, Some(1903));
        assert_eq!(rec.category.as_deref(), Some("Physics"));
        assert_eq!(rec.types.as_deref(), Some("application/json"));
    }

    #[test]
    fn accumulator_batch_allows_null_laureate() {
        let mut acc = LinkAccumulator::new();
        acc.push(LinkRecord::new(None, Some(1901), Some("Physics"), &Link::default()));
        let batch = acc.take_batch().unwrap();
        assert_eq!(batch.num_rows(), 1);
        assert_eq!(batch.column_by_name("laureate_id").unwrap().null_count(), 1);
    }
}
