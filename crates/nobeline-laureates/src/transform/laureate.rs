//! Laureate entity transformation: JSON → Arrow RecordBatch

use std::sync::Arc;

use arrow::array::*;
use arrow::datatypes::Schema;
use serde::Deserialize;

use super::{
    Accumulator, EventColumns, Language, LifeEvent, Link, Localized, RECORD_BATCH_SIZE,
    id_string, one_or_many, string_array, text,
};
use super::prize::PrizeEntry;
use crate::schema;

// === Row struct (deserialized from JSON) ===

/// Nobel Prize API laureate record (person or organization)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaureateRow {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,

    #[serde(default)]
    pub known_name: Option<Localized>,
    #[serde(default)]
    pub given_name: Option<Localized>,
    #[serde(default)]
    pub family_name: Option<Localized>,
    #[serde(default)]
    pub full_name: Option<Localized>,

    // organizations only
    #[serde(default)]
    pub org_name: Option<Localized>,
    #[serde(default)]
    pub native_name: Option<Localized>,
    #[serde(default)]
    pub acronym: Option<Localized>,

    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,

    #[serde(default)]
    pub birth: Option<LifeEvent>,
    #[serde(default)]
    pub death: Option<LifeEvent>,
    #[serde(default)]
    pub founded: Option<LifeEvent>,
    #[serde(default)]
    pub dissolution: Option<LifeEvent>,

    #[serde(default)]
    pub wikipedia: Option<Wikipedia>,
    #[serde(default)]
    pub wikidata: Option<Wikidata>,

    #[serde(default, deserialize_with = "one_or_many")]
    pub same_as: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub links: Vec<Link>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub nobel_prizes: Vec<PrizeEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Wikipedia {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub english: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Wikidata {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl LaureateRow {
    pub fn is_organization(&self) -> bool {
        self.org_name.is_some()
    }

    pub fn laureate_type(&self) -> &'static str {
        if self.is_organization() {
            "organization"
        } else {
            "person"
        }
    }

    /// Display name: `knownName` for people, `orgName` for organizations
    pub fn known_name(&self, lang: Language) -> Option<String> {
        text(&self.known_name, lang).or_else(|| text(&self.org_name, lang))
    }
}

// === Accumulator ===

pub struct LaureateAccumulator {
    schema: Arc<Schema>,
    lang: Language,
    id: Vec<String>,
    laureate_type: Vec<&'static str>,
    known_name: Vec<Option<String>>,
    given_name: Vec<Option<String>>,
    family_name: Vec<Option<String>>,
    full_name: Vec<Option<String>>,
    org_name: Vec<Option<String>>,
    native_name: Vec<Option<String>>,
    acronym: Vec<Option<String>>,
    file_name: Vec<Option<String>>,
    gender: Vec<Option<String>>,
    birth: EventColumns,
    death: EventColumns,
    founded: EventColumns,
    dissolution: EventColumns,
    wikipedia_slug: Vec<Option<String>>,
    wikipedia_url: Vec<Option<String>>,
    wikidata_id: Vec<Option<String>>,
    wikidata_url: Vec<Option<String>>,
    prize_count: Vec<i32>,
}

impl LaureateAccumulator {
    pub fn new(lang: Language) -> Self {
        Self {
            schema: schema::laureates().clone(),
            lang,
            id: Vec::with_capacity(RECORD_BATCH_SIZE),
            laureate_type: Vec::with_capacity(RECORD_BATCH_SIZE),
            known_name: Vec::with_capacity(RECORD_BATCH_SIZE),
            given_name: Vec::with_capacity(RECORD_BATCH_SIZE),
            family_name: Vec::with_capacity(RECORD_BATCH_SIZE),
            full_name: Vec::with_capacity(RECORD_BATCH_SIZE),
            org_name: Vec::with_capacity(RECORD_BATCH_SIZE),
            native_name: Vec::with_capacity(RECORD_BATCH_SIZE),
            acronym: Vec::with_capacity(RECORD_BATCH_SIZE),
            file_name: Vec::with_capacity(RECORD_BATCH_SIZE),
            gender: Vec::with_capacity(RECORD_BATCH_SIZE),
            birth: EventColumns::default(),
            death: EventColumns::default(),
            founded: EventColumns::default(),
            dissolution: EventColumns::default(),
            wikipedia_slug: Vec::with_capacity(RECORD_BATCH_SIZE),
            wikipedia_url: Vec::with_capacity(RECORD_BATCH_SIZE),
            wikidata_id: Vec::with_capacity(RECORD_BATCH_SIZE),
            wikidata_url: Vec::with_capacity(RECORD_BATCH_SIZE),
            prize_count: Vec::with_capacity(RECORD_BATCH_SIZE),
        }
    }
}

impl Default for LaureateAccumulator {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl Accumulator for LaureateAccumulator {
    type Row = LaureateRow;

    /// Takes ownership; push the child tables first since they only borrow.
    fn push(&mut self, row: LaureateRow) {
        let lang = self.lang;
        self.known_name.push(row.known_name(lang));
        self.laureate_type.push(row.laureate_type());
        self.given_name.push(text(&row.given_name, lang));
        self.family_name.push(text(&row.family_name, lang));
        self.full_name.push(text(&row.full_name, lang));
        self.org_name.push(text(&row.org_name, lang));
        self.native_name.push(text(&row.native_name, lang));
        self.acronym.push(text(&row.acronym, lang));
        self.file_name.push(row.file_name);
        self.gender.push(row.gender);

        self.birth.push(row.birth.as_ref(), lang);
        self.death.push(row.death.as_ref(), lang);
        self.founded.push(row.founded.as_ref(), lang);
        self.dissolution.push(row.dissolution.as_ref(), lang);

        let (slug, english) = match row.wikipedia {
            Some(w) => (w.slug, w.english),
            None => (None, None),
        };
        self.wikipedia_slug.push(slug);
        self.wikipedia_url.push(english);
        let (wd_id, wd_url) = match row.wikidata {
            Some(w) => (w.id, w.url),
            None => (None, None),
        };
        self.wikidata_id.push(wd_id);
        self.wikidata_url.push(wd_url);

        self.prize_count
            .push(i32::try_from(row.nobel_prizes.len()).unwrap_or(i32::MAX));
        self.id.push(row.id);
    }

    fn len(&self) -> usize {
        self.id.len()
    }

    fn take_batch(&mut self) -> Result<RecordBatch, arrow::error::ArrowError> {
        let mut arrays: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(std::mem::take(&mut self.id))),
            Arc::new(StringArray::from(std::mem::take(&mut self.laureate_type))),
            string_array(&mut self.known_name),
            string_array(&mut self.given_name),
            string_array(&mut self.family_name),
            string_array(&mut self.full_name),
            string_array(&mut self.org_name),
            string_array(&mut self.native_name),
            string_array(&mut self.acronym),
            string_array(&mut self.file_name),
            string_array(&mut self.gender),
        ];
        arrays.extend(self.birth.take_arrays());
        arrays.extend(self.death.take_arrays());
        arrays.extend(self.founded.take_arrays());
        arrays.extend(self.dissolution.take_arrays());
        arrays.extend([
            string_array(&mut self.wikipedia_slug),
            string_array(&mut self.wikipedia_url),
            string_array(&mut self.wikidata_id),
            string_array(&mut self.wikidata_url),
            Arc::new(Int32Array::from(std::mem::take(&mut self.prize_count))) as ArrayRef,
        ]);
        RecordBatch::try_new(self.schema.clone(), arrays)
    }
}
