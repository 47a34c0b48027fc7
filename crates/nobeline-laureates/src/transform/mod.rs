//! JSON row types and Arrow accumulators for Nobel Prize API records
//!
//! Shared building blocks live here: localized text, places, life events,
//! link pairs, and the tolerant number/string deserializers the API needs.

pub mod affiliation;
pub mod laureate;
pub mod link;
pub mod nobel_prize;
pub mod prize;
pub mod residence;

use std::collections::BTreeMap;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use serde::{Deserialize, Deserializer};

pub use nobeline_core::{Accumulator, DEFAULT_BATCH_SIZE as RECORD_BATCH_SIZE};

/// Output language for localized text fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    En,
    Se,
    No,
}

impl Language {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "en" => Some(Self::En),
            "se" | "sv" => Some(Self::Se),
            "no" | "nb" => Some(Self::No),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Se => "se",
            Self::No => "no",
        }
    }
}

/// Text that is either a plain string or a `{"en": .., "se": .., "no": ..}` map.
///
/// Place maps also carry non-text keys (`sameAs` arrays, `latitude`,
/// `longitude`); only the language keys are ever read.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Localized {
    Plain(String),
    Map(BTreeMap<String, serde_json::Value>),
}

const LANGUAGE_KEYS: [&str; 3] = ["en", "se", "no"];

impl Localized {
    /// Resolve in `lang`, falling back to English, then to any translation.
    pub fn get(&self, lang: Language) -> Option<&str> {
        match self {
            Self::Plain(s) => Some(s.as_str()),
            Self::Map(m) => std::iter::once(lang.code())
                .chain(LANGUAGE_KEYS)
                .find_map(|key| m.get(key).and_then(serde_json::Value::as_str)),
        }
    }
}

/// Resolve an optional localized field into an owned string
pub fn text(field: &Option<Localized>, lang: Language) -> Option<String> {
    field
        .as_ref()
        .and_then(|l| l.get(lang))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrStr {
    Int(i64),
    Float(f64),
    Str(String),
}

/// Deserialize `"1901"`, `1901` or null as `Option<i32>`; junk becomes null
pub fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumOrStr>::deserialize(deserializer)? {
        Some(NumOrStr::Int(n)) => i32::try_from(n).ok(),
        Some(NumOrStr::Float(f)) if f.fract() == 0.0 => Some(f as i32),
        Some(NumOrStr::Str(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Deserialize an integer that may be quoted as `Option<i64>`
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumOrStr>::deserialize(deserializer)? {
        Some(NumOrStr::Int(n)) => Some(n),
        Some(NumOrStr::Float(f)) if f.fract() == 0.0 => Some(f as i64),
        Some(NumOrStr::Str(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Deserialize an identifier that may be a number or a string
pub fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumOrStr>::deserialize(deserializer)? {
        Some(NumOrStr::Int(n)) => n.to_string(),
        Some(NumOrStr::Float(f)) => f.to_string(),
        Some(NumOrStr::Str(s)) => s,
        None => String::new(),
    })
}

/// Accept a single object, an array of objects, or null
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(v)) => v,
        Some(OneOrMany::One(t)) => vec![t],
        None => Vec::new(),
    })
}

/// Geographic reference as the API nests it (birth place, affiliation, residence)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(default)]
    pub city: Option<Localized>,
    #[serde(default)]
    pub country: Option<Localized>,
    #[serde(default)]
    pub city_now: Option<Localized>,
    #[serde(default)]
    pub country_now: Option<Localized>,
    #[serde(default)]
    pub continent: Option<Localized>,
    #[serde(default)]
    pub location_string: Option<Localized>,
}

/// Place with localized text resolved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatPlace {
    pub city: Option<String>,
    pub country: Option<String>,
    pub city_now: Option<String>,
    pub country_now: Option<String>,
    pub continent: Option<String>,
    pub location: Option<String>,
}

impl Place {
    pub fn resolve(&self, lang: Language) -> FlatPlace {
        FlatPlace {
            city: text(&self.city, lang),
            country: text(&self.country, lang),
            city_now: text(&self.city_now, lang),
            country_now: text(&self.country_now, lang),
            continent: text(&self.continent, lang),
            location: text(&self.location_string, lang),
        }
    }
}

/// Birth, death, founding or dissolution: a date plus an optional place
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LifeEvent {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub place: Option<Place>,
}

/// Cross-reference link pair (`rel` → `href`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub rel: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub types: Option<String>,
}

/// Column buffers for the six place columns
#[derive(Debug, Default)]
pub struct PlaceColumns {
    city: Vec<Option<String>>,
    country: Vec<Option<String>>,
    city_now: Vec<Option<String>>,
    country_now: Vec<Option<String>>,
    continent: Vec<Option<String>>,
    location: Vec<Option<String>>,
}

impl PlaceColumns {
    pub fn push(&mut self, place: FlatPlace) {
        self.city.push(place.city);
        self.country.push(place.country);
        self.city_now.push(place.city_now);
        self.country_now.push(place.country_now);
        self.continent.push(place.continent);
        self.location.push(place.location);
    }

    /// Arrays in schema order: city, country, city_now, country_now, continent, location
    pub fn take_arrays(&mut self) -> Vec<ArrayRef> {
        vec![
            string_array(&mut self.city),
            string_array(&mut self.country),
            string_array(&mut self.city_now),
            string_array(&mut self.country_now),
            string_array(&mut self.continent),
            string_array(&mut self.location),
        ]
    }
}

/// Column buffers for one life event: date + place
#[derive(Debug, Default)]
pub struct EventColumns {
    date: Vec<Option<String>>,
    place: PlaceColumns,
}

impl EventColumns {
    pub fn push(&mut self, event: Option<&LifeEvent>, lang: Language) {
        let date = event.and_then(|e| e.date.clone()).filter(|d| !d.is_empty());
        let place = event
            .and_then(|e| e.place.as_ref())
            .map(|p| p.resolve(lang))
            .unwrap_or_default();
        self.date.push(date);
        self.place.push(place);
    }

    pub fn take_arrays(&mut self) -> Vec<ArrayRef> {
        let mut arrays = vec![string_array(&mut self.date)];
        arrays.extend(self.place.take_arrays());
        arrays
    }
}

/// Drain a column buffer into a Utf8 array
pub fn string_array(col: &mut Vec<Option<String>>) -> ArrayRef {
    Arc::new(StringArray::from(std::mem::take(col)))
}

// Re-exports
pub use affiliation::{AffiliationAccumulator, AffiliationEntry, AffiliationRecord};
pub use laureate::{LaureateAccumulator, LaureateRow};
pub use link::{LinkAccumulator, LinkRecord};
pub use nobel_prize::{
    NobelPrizeAccumulator, NobelPrizeLaureateAccumulator, NobelPrizeLaureateRecord,
    NobelPrizeRow,
};
pub use prize::{PrizeAccumulator, PrizeEntry, PrizeKey, PrizeRecord};
pub use residence::{ResidenceAccumulator, ResidenceRecord};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localized_prefers_requested_language() {
        let l: Localized =
            serde_json::from_str(r#"{"en": "Physics", "se": "Fysik", "no": "Fysikk"}"#).unwrap();
        assert_eq!(l.get(Language::Se), Some("Fysik"));
        assert_eq!(l.get(Language::En), Some("Physics"));
    }

    #[test]
    fn localized_falls_back_to_english_then_any() {
        let l: Localized = serde_json::from_str(r#"{"en": "Stockholm"}"#).unwrap();
        assert_eq!(l.get(Language::No), Some("Stockholm"));

        let l: Localized = serde_json::from_str(r#"{"se": "Uppsala"}"#).unwrap();
        assert_eq!(l.get(Language::En), Some("Uppsala"));
    }

    #[test]
    fn localized_ignores_place_extras() {
        let l: Localized = serde_json::from_str(
            r#"{"en": "Remscheid", "no": "Remscheid", "se": "Remscheid",
                "sameAs": ["https://www.wikidata.org/wiki/Q3167"],
                "latitude": "51.178889", "longitude": "7.189722"}"#,
        )
        .unwrap();
        assert_eq!(l.get(Language::Se), Some("Remscheid"));

        // coordinates are never mistaken for a translation
        let l: Localized =
            serde_json::from_str(r#"{"sameAs": [], "latitude": "51.178889"}"#).unwrap();
        assert_eq!(l.get(Language::En), None);
    }

    #[test]
    fn localized_accepts_plain_string() {
        let l: Localized = serde_json::from_str(r#""Nobel Foundation""#).unwrap();
        assert_eq!(l.get(Language::Se), Some("Nobel Foundation"));
    }

    #[test]
    fn text_drops_empty_strings() {
        let l = Some(Localized::Plain(String::new()));
        assert_eq!(text(&l, Language::En), None);
        assert_eq!(text(&None, Language::En), None);
    }

    #[derive(Deserialize)]
    struct Numbers {
        #[serde(default, deserialize_with = "lenient_i32")]
        year: Option<i32>,
        #[serde(default, deserialize_with = "lenient_i64")]
        amount: Option<i64>,
        #[serde(default, deserialize_with = "id_string")]
        id: String,
    }

    #[test]
    fn lenient_numbers_accept_strings_and_numbers() {
        let n: Numbers =
            serde_json::from_str(r#"{"year": "1901", "amount": 150782, "id": 160}"#).unwrap();
        assert_eq!(n.year, Some(1901));
        assert_eq!(n.amount, Some(150782));
        assert_eq!(n.id, "160");
    }

    #[test]
    fn lenient_numbers_null_and_junk() {
        let n: Numbers = serde_json::from_str(r#"{"year": "n/a", "amount": null}"#).unwrap();
        assert_eq!(n.year, None);
        assert_eq!(n.amount, None);
        assert_eq!(n.id, "");
    }

    #[derive(Deserialize)]
    struct Links {
        #[serde(default, deserialize_with = "one_or_many")]
        links: Vec<Link>,
    }

    #[test]
    fn one_or_many_single_object() {
        let l: Links =
            serde_json::from_str(r#"{"links": {"rel": "external", "href": "https://x"}}"#).unwrap();
        assert_eq!(l.links.len(), 1);
        assert_eq!(l.links[0].rel.as_deref(), Some("external"));
    }

    #[test]
    fn one_or_many_array_and_null() {
        let l: Links = serde_json::from_str(r#"{"links": [{"rel": "a"}, {"rel": "b"}]}"#).unwrap();
        assert_eq!(l.links.len(), 2);
        let l: Links = serde_json::from_str(r#"{"links": null}"#).unwrap();
        assert!(l.links.is_empty());
    }

    #[test]
    fn place_resolve_maps_location_string() {
        let p: Place = serde_json::from_str(
            r#"{
                "city": {"en": "Lemberg", "se": "Lemberg"},
                "country": {"en": "Austria-Hungary"},
                "cityNow": {"en": "Lviv"},
                "countryNow": {"en": "Ukraine"},
                "continent": {"en": "Europe"},
                "locationString": {"en": "Lemberg, Austria-Hungary (now Lviv, Ukraine)"}
            }"#,
        )
        .unwrap();
        let flat = p.resolve(Language::En);
        assert_eq!(flat.city.as_deref(), Some("Lemberg"));
        assert_eq!(flat.country_now.as_deref(), Some("Ukraine"));
        assert_eq!(
            flat.location.as_deref(),
            Some("Lemberg, Austria-Hungary (now Lviv, Ukraine)")
        );
    }

    #[test]
    fn event_columns_missing_event_is_all_null() {
        let mut cols = EventColumns::default();
        cols.push(None, Language::En);
        let arrays = cols.take_arrays();
        assert_eq!(arrays.len(), 7);
        assert!(arrays.iter().all(|a| a.len() == 1 && a.null_count() == 1));
    }
}
