//! Arrow schema definitions for all output tables

use std::sync::{Arc, LazyLock};

use arrow::datatypes::{DataType, Field, Schema};

/// Column suffixes produced by a flattened place, in order
pub const PLACE_COLUMNS: [&str; 6] = [
    "city",
    "country",
    "city_now",
    "country_now",
    "continent",
    "location",
];

/// Life events flattened onto the laureates table, in order
pub const LIFE_EVENTS: [&str; 4] = ["birth", "death", "founded", "dissolution"];

fn utf8(name: &str) -> Field {
    Field::new(name, DataType::Utf8, true)
}

/// `city, country, ...` optionally prefixed (`birth_city, birth_country, ...`)
fn place_fields(prefix: Option<&str>) -> Vec<Field> {
    PLACE_COLUMNS
        .iter()
        .map(|col| match prefix {
            Some(p) => utf8(&format!("{p}_{col}")),
            None => utf8(col),
        })
        .collect()
}

fn event_fields(prefix: &str) -> Vec<Field> {
    let mut fields = vec![utf8(&format!("{prefix}_date"))];
    fields.extend(place_fields(Some(prefix)));
    fields
}

/// Parent key shared by every per-prize child table
fn prize_key_fields() -> Vec<Field> {
    vec![
        Field::new("laureate_id", DataType::Utf8, false),
        Field::new("award_year", DataType::Int32, true),
        utf8("category"),
    ]
}

/// `laureates`: one row per laureate (person or organization)
pub fn laureates() -> &'static Arc<Schema> {
    static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| {
        let mut fields = vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("laureate_type", DataType::Utf8, false),
            utf8("known_name"),
            utf8("given_name"),
            utf8("family_name"),
            utf8("full_name"),
            utf8("org_name"),
            utf8("native_name"),
            utf8("acronym"),
            utf8("file_name"),
            utf8("gender"),
        ];
        for event in LIFE_EVENTS {
            fields.extend(event_fields(event));
        }
        fields.extend([
            utf8("wikipedia_slug"),
            utf8("wikipedia_url"),
            utf8("wikidata_id"),
            utf8("wikidata_url"),
            Field::new("prize_count", DataType::Int32, false),
        ]);
        Arc::new(Schema::new(fields))
    });
    &SCHEMA
}

/// `laureate_prizes`: one row per (laureate, prize)
pub fn laureate_prizes() -> &'static Arc<Schema> {
    static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| {
        let mut fields = prize_key_fields();
        fields.extend([
            utf8("category_full_name"),
            Field::new("sort_order", DataType::Int32, true),
            utf8("portion"),
            utf8("date_awarded"),
            utf8("prize_status"),
            utf8("motivation"),
            Field::new("prize_amount", DataType::Int64, true),
            Field::new("prize_amount_adjusted", DataType::Int64, true),
            Field::new("affiliation_count", DataType::Int32, false),
            Field::new("residence_count", DataType::Int32, false),
        ]);
        Arc::new(Schema::new(fields))
    });
    &SCHEMA
}

/// `prize_affiliations`: one row per (laureate, prize, affiliation)
pub fn prize_affiliations() -> &'static Arc<Schema> {
    static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| {
        let mut fields = prize_key_fields();
        fields.extend([
            Field::new("position", DataType::Int32, false),
            utf8("name"),
            utf8("name_now"),
        ]);
        fields.extend(place_fields(None));
        Arc::new(Schema::new(fields))
    });
    &SCHEMA
}

/// `prize_residences`: one row per (laureate, prize, residence)
pub fn prize_residences() -> &'static Arc<Schema> {
    static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| {
        let mut fields = prize_key_fields();
        fields.push(Field::new("position", DataType::Int32, false));
        fields.extend(place_fields(None));
        Arc::new(Schema::new(fields))
    });
    &SCHEMA
}

/// `laureate_links`, `nobel_prize_links`: cross-reference link pairs.
///
/// Keys are nullable: laureate-level links have no award, prize-level links
/// from the prizes endpoint have no laureate.
pub fn links() -> &'static Arc<Schema> {
    static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| {
        Arc::new(Schema::new(vec![
            utf8("laureate_id"),
            Field::new("award_year", DataType::Int32, true),
            utf8("category"),
            utf8("rel"),
            utf8("href"),
            utf8("action"),
            utf8("types"),
        ]))
    });
    &SCHEMA
}

/// `nobel_prizes`: one row per (award year, category)
pub fn nobel_prizes() -> &'static Arc<Schema> {
    static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| {
        Arc::new(Schema::new(vec![
            Field::new("award_year", DataType::Int32, true),
            utf8("category"),
            utf8("category_full_name"),
            utf8("date_awarded"),
            Field::new("prize_amount", DataType::Int64, true),
            Field::new("prize_amount_adjusted", DataType::Int64, true),
            utf8("top_motivation"),
            Field::new("laureate_count", DataType::Int32, false),
        ]))
    });
    &SCHEMA
}

/// `nobel_prize_laureates`: one row per (prize, laureate)
pub fn nobel_prize_laureates() -> &'static Arc<Schema> {
    static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| {
        Arc::new(Schema::new(vec![
            Field::new("award_year", DataType::Int32, true),
            utf8("category"),
            Field::new("laureate_id", DataType::Utf8, false),
            utf8("known_name"),
            utf8("portion"),
            Field::new("sort_order", DataType::Int32, true),
            utf8("motivation"),
        ]))
    });
    &SCHEMA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn laureates_schema_has_event_groups() {
        let schema = laureates();
        for name in [
            "birth_date",
            "birth_city_now",
            "death_location",
            "founded_country",
            "dissolution_continent",
        ] {
            assert!(schema.field_with_name(name).is_ok(), "missing {name}");
        }
        // id + type + 9 names + 4 events * 7 + 4 wiki + prize_count
        assert_eq!(schema.fields().len(), 2 + 9 + 28 + 4 + 1);
    }

    #[test]
    fn child_tables_carry_parent_key() {
        for schema in [laureate_prizes(), prize_affiliations(), prize_residences()] {
            assert!(!schema.field_with_name("laureate_id").unwrap().is_nullable());
            assert!(schema.field_with_name("award_year").is_ok());
            assert!(schema.field_with_name("category").is_ok());
        }
    }

    #[test]
    fn affiliation_place_columns_unprefixed() {
        let schema = prize_affiliations();
        for col in PLACE_COLUMNS {
            assert!(schema.field_with_name(col).is_ok());
        }
    }

    #[test]
    fn link_keys_nullable() {
        let schema = links();
        assert!(schema.field_with_name("laureate_id").unwrap().is_nullable());
        assert!(schema.field_with_name("award_year").unwrap().is_nullable());
    }
}
