//! SQL generation for the laureate join pipeline.
//!
//! Every input table becomes a typed view with the column list of its Arrow
//! schema, whatever the on-disk format. Optional inputs that were never
//! written fall back to an empty view with the same columns, so the joins
//! below never fail on a missing file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use arrow::datatypes::{DataType, Schema};
use nobeline_core::OutputFormat;
use nobeline_laureates::Table;

/// Quote a filesystem path as a SQL string literal
pub fn sql_path(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', "''"))
}

/// DuckDB column type for an Arrow type used in the output schemas
fn duck_type(dt: &DataType) -> &'static str {
    match dt {
        DataType::Int32 => "INTEGER",
        DataType::Int64 => "BIGINT",
        DataType::Float64 => "DOUBLE",
        DataType::Boolean => "BOOLEAN",
        _ => "VARCHAR",
    }
}

/// `TRY_CAST(col AS TYPE) AS col, ...` over every schema column
fn typed_columns(schema: &Schema) -> String {
    schema
        .fields()
        .iter()
        .map(|f| {
            format!(
                "TRY_CAST(\"{0}\" AS {1}) AS \"{0}\"",
                f.name(),
                duck_type(f.data_type())
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `NULL::TYPE AS col, ...` for the empty fallback
fn null_columns(schema: &Schema) -> String {
    schema
        .fields()
        .iter()
        .map(|f| format!("NULL::{} AS \"{}\"", duck_type(f.data_type()), f.name()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Locate `{table}.parquet`, `{table}.csv` or `{table}.tsv` in `dir`.
///
/// Parquet wins when several formats are present.
pub fn find_table_file(dir: &Path, table: Table) -> Option<PathBuf> {
    let pattern = format!(
        "{}/{}.*",
        glob::Pattern::escape(&dir.to_string_lossy()),
        table.name()
    );
    let mut found: Vec<PathBuf> = glob::glob(&pattern)
        .ok()?
        .filter_map(Result::ok)
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("parquet" | "csv" | "tsv")
            )
        })
        .collect();
    found.sort_by_key(|p| match p.extension().and_then(|e| e.to_str()) {
        Some("parquet") => 0,
        Some("csv") => 1,
        _ => 2,
    });
    found.into_iter().next()
}

/// Delimiter of a delimited file, read off its header line.
///
/// The header starts with the schema's first column, so the byte right after
/// it is the delimiter. `None` when the header does not look like that.
pub fn header_delimiter(path: &Path, first_column: &str) -> Option<u8> {
    let file = File::open(path).ok()?;
    let mut line = String::new();
    BufReader::new(file).read_line(&mut line).ok()?;
    let rest = line
        .strip_prefix('\u{feff}')
        .unwrap_or(&line)
        .trim_start_matches('"')
        .strip_prefix(first_column)?
        .trim_start_matches('"');
    match rest.bytes().next()? {
        b if (b.is_ascii_punctuation() && b != b'_') || b == b'\t' || b == b' ' => Some(b),
        _ => None,
    }
}

/// Table scan expression for a located file.
///
/// `.csv` files may use any single-byte delimiter; it is taken from the
/// header when possible, otherwise DuckDB sniffs it.
fn read_expr(path: &Path, first_column: &str) -> String {
    let lit = sql_path(path);
    let ext = path.extension().and_then(|e| e.to_str());
    if ext == Some("parquet") {
        return format!("read_parquet({lit})");
    }
    let delim = match (ext, header_delimiter(path, first_column)) {
        (_, Some(b)) => Some(b),
        (Some("tsv"), None) => Some(b'\t'),
        _ => None,
    };
    match delim {
        Some(b'\t') => format!("read_csv({lit}, header = true, delim = '\\t', all_varchar = true)"),
        Some(b) => format!(
            "read_csv({lit}, header = true, delim = '{}', all_varchar = true)",
            (b as char).to_string().replace('\'', "''")
        ),
        None => format!("read_csv({lit}, header = true, all_varchar = true)"),
    }
}

/// View over `file`, or an empty typed view when there is none
pub fn source_view(table: Table, file: Option<&Path>) -> String {
    let name = table.name();
    let schema = table.schema();
    match file {
        Some(path) => format!(
            "CREATE OR REPLACE VIEW {name} AS SELECT {} FROM {}",
            typed_columns(schema),
            read_expr(path, schema.field(0).name())
        ),
        None => format!(
            "CREATE OR REPLACE VIEW {name} AS SELECT {} WHERE false",
            null_columns(schema)
        ),
    }
}

/// Every laureate with each of their prizes; prizeless laureates keep null prize columns.
pub fn laureate_awards() -> &'static str {
    "CREATE OR REPLACE TABLE laureate_awards AS
     SELECT
       l.*,
       p.* EXCLUDE (laureate_id)
     FROM laureates l
     LEFT JOIN laureate_prizes p ON l.id = p.laureate_id
     ORDER BY TRY_CAST(l.id AS BIGINT) NULLS LAST, l.id, p.award_year, p.category"
}

/// Every prize with each affiliation; prizes without one keep null affiliation columns.
pub fn award_affiliations() -> &'static str {
    "CREATE OR REPLACE TABLE award_affiliations AS
     SELECT
       p.laureate_id,
       l.known_name,
       l.org_name,
       p.award_year,
       p.category,
       p.category_full_name,
       p.motivation,
       a.position AS affiliation_position,
       a.name AS affiliation_name,
       a.name_now AS affiliation_name_now,
       a.city,
       a.country,
       a.city_now,
       a.country_now,
       a.continent,
       a.location
     FROM laureate_prizes p
     LEFT JOIN prize_affiliations a
       ON p.laureate_id = a.laureate_id
      AND p.award_year IS NOT DISTINCT FROM a.award_year
      AND p.category IS NOT DISTINCT FROM a.category
     LEFT JOIN laureates l ON l.id = p.laureate_id
     ORDER BY TRY_CAST(p.laureate_id AS BIGINT) NULLS LAST, p.laureate_id,
              p.award_year, p.category, a.position"
}

/// Every prize with each residence at award time.
pub fn award_residences() -> &'static str {
    "CREATE OR REPLACE TABLE award_residences AS
     SELECT
       p.laureate_id,
       l.known_name,
       l.org_name,
       p.award_year,
       p.category,
       r.position AS residence_position,
       r.city,
       r.country,
       r.city_now,
       r.country_now,
       r.continent,
       r.location
     FROM laureate_prizes p
     LEFT JOIN prize_residences r
       ON p.laureate_id = r.laureate_id
      AND p.award_year IS NOT DISTINCT FROM r.award_year
      AND p.category IS NOT DISTINCT FROM r.category
     LEFT JOIN laureates l ON l.id = p.laureate_id
     ORDER BY TRY_CAST(p.laureate_id AS BIGINT) NULLS LAST, p.laureate_id,
              p.award_year, p.category, r.position"
}

/// Prizes with their laureates; prizes never awarded and orphan laureate rows both survive.
pub fn prize_laureate_details() -> &'static str {
    "CREATE OR REPLACE TABLE prize_laureate_details AS
     SELECT
       COALESCE(np.award_year, npl.award_year) AS award_year,
       COALESCE(np.category, npl.category) AS category,
       np.category_full_name,
       np.date_awarded,
       np.prize_amount,
       np.prize_amount_adjusted,
       np.top_motivation,
       np.laureate_count,
       npl.laureate_id,
       npl.known_name,
       npl.portion,
       npl.sort_order,
       npl.motivation
     FROM nobel_prizes np
     FULL OUTER JOIN nobel_prize_laureates npl
       ON np.award_year = npl.award_year
      AND np.category = npl.category
     ORDER BY 1, 2, npl.sort_order"
}

/// Join summary: laureates, award rows, awards with an affiliation, prizeless laureates
pub fn summary_query() -> &'static str {
    "SELECT
       (SELECT COUNT(*) FROM laureates),
       (SELECT COUNT(*) FROM laureate_prizes),
       (SELECT COUNT(*) FROM (
          SELECT DISTINCT laureate_id, award_year, category
          FROM award_affiliations
          WHERE affiliation_position IS NOT NULL)),
       (SELECT COUNT(*) FROM laureates l
          WHERE NOT EXISTS (SELECT 1 FROM laureate_prizes p WHERE p.laureate_id = l.id))"
}

/// Row count of a joined table
pub fn count_rows(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {table}")
}

/// Export a joined table to `path` in the requested format
pub fn export_table(table: &str, path: &Path, format: OutputFormat) -> String {
    let options = match format {
        OutputFormat::Csv => "FORMAT CSV, HEADER, DELIMITER ','",
        OutputFormat::Parquet => "FORMAT PARQUET, COMPRESSION ZSTD",
    };
    format!(
        "COPY (SELECT * FROM {table}) TO {} ({options})",
        sql_path(path)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn sql_path_escapes_quotes() {
        assert_eq!(sql_path(Path::new("/tmp/o'neil")), "'/tmp/o''neil'");
    }

    #[test]
    fn empty_view_has_typed_columns() {
        let sql = source_view(Table::PrizeResidences, None);
        assert!(sql.starts_with("CREATE OR REPLACE VIEW prize_residences AS SELECT NULL::VARCHAR AS \"laureate_id\""));
        assert!(sql.contains("NULL::INTEGER AS \"award_year\""));
        assert!(sql.ends_with("WHERE false"));
    }

    #[test]
    fn csv_view_casts_columns() {
        let sql = source_view(Table::LaureatePrizes, Some(Path::new("/d/laureate_prizes.csv")));
        assert!(sql.contains("TRY_CAST(\"award_year\" AS INTEGER) AS \"award_year\""));
        assert!(sql.contains("TRY_CAST(\"prize_amount\" AS BIGINT) AS \"prize_amount\""));
        // unreadable file: delimiter left to DuckDB
        assert!(sql.contains("read_csv('/d/laureate_prizes.csv', header = true, all_varchar = true)"));
    }

    #[test]
    fn csv_delimiter_from_header() {
        let dir = tempfile::tempdir().unwrap();
        let semi = dir.path().join("laureates.csv");
        fs::write(&semi, "id;laureate_type;known_name\n6;person;Marie Curie\n").unwrap();
        assert_eq!(header_delimiter(&semi, "id"), Some(b';'));
        let sql = source_view(Table::Laureates, Some(&semi));
        assert!(sql.contains("delim = ';'"));

        let comma = dir.path().join("laureate_prizes.csv");
        fs::write(&comma, "laureate_id,award_year\n").unwrap();
        assert_eq!(header_delimiter(&comma, "laureate_id"), Some(b','));

        // header of some other table
        assert_eq!(header_delimiter(&comma, "id"), None);
        assert_eq!(header_delimiter(&comma, "laureate"), None);
        assert_eq!(header_delimiter(&dir.path().join("missing.csv"), "id"), None);
    }

    #[test]
    fn tsv_and_parquet_readers() {
        let tsv = source_view(Table::Laureates, Some(Path::new("/d/laureates.tsv")));
        assert!(tsv.contains("delim = '\\t'"));
        let pq = source_view(Table::Laureates, Some(Path::new("/d/laureates.parquet")));
        assert!(pq.contains("read_parquet('/d/laureates.parquet')"));
    }

    #[test]
    fn find_table_file_prefers_parquet() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_table_file(dir.path(), Table::Laureates).is_none());

        fs::write(dir.path().join("laureates.csv"), "id\n").unwrap();
        fs::write(dir.path().join("laureates.csv.tmp"), "").unwrap();
        assert_eq!(
            find_table_file(dir.path(), Table::Laureates).unwrap(),
            dir.path().join("laureates.csv")
        );

        fs::write(dir.path().join("laureates.parquet"), "").unwrap();
        assert_eq!(
            find_table_file(dir.path(), Table::Laureates).unwrap(),
            dir.path().join("laureates.parquet")
        );
        // prefix of another table name does not match
        assert!(find_table_file(dir.path(), Table::LaureatePrizes).is_none());
    }

    #[test]
    fn export_options() {
        let csv = export_table("laureate_awards", Path::new("/o/laureate_awards.csv"), OutputFormat::Csv);
        assert!(csv.contains("HEADER"));
        let pq = export_table("x", Path::new("/o/x.parquet"), OutputFormat::Parquet);
        assert!(pq.contains("COMPRESSION ZSTD"));
    }
}
