//! Nobel Prize API client: offset pagination over a listing endpoint

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use indicatif::ProgressBar;
use nobeline_core::{
    FetchError, get_text, http_config, retry_with_backoff, shutdown_flag, upgrade_to_bar,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::Config;

/// `meta` block of a listing response
#[derive(Debug, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    /// Total records matching the query
    #[serde(default)]
    pub count: Option<usize>,
}

/// `links` block of a listing response
#[derive(Debug, Default, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    meta: Option<PageMeta>,
    #[serde(default)]
    links: Option<PageLinks>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

/// One decoded page; records stay raw so each can fail on its own
#[derive(Debug, Default)]
pub struct Page {
    pub records: Vec<Value>,
    pub meta: PageMeta,
    /// `None` when the response carried no `links` block at all
    pub links: Option<PageLinks>,
}

/// Decode a listing response body.
///
/// `records_key` is `laureates` or `nobelPrizes`; a missing or null key is an
/// empty page, anything other than an array is a decode error.
pub fn parse_page(body: &str, records_key: &str, offset: usize) -> Result<Page, FetchError> {
    let decode = |message: String| FetchError::Decode { offset, message };

    let mut envelope: Envelope =
        serde_json::from_str(body).map_err(|e| decode(e.to_string()))?;
    let records = match envelope.rest.remove(records_key) {
        Some(Value::Array(records)) => records,
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            return Err(decode(format!(
                "'{records_key}' is {}, expected an array",
                json_kind(&other)
            )));
        }
    };

    Ok(Page {
        records,
        meta: envelope.meta.unwrap_or_default(),
        links: envelope.links,
    })
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Offset bookkeeping for the page loop
#[derive(Debug)]
pub struct PageCursor {
    offset: usize,
    page_size: usize,
    max_records: Option<usize>,
    total: Option<usize>,
    done: bool,
}

impl PageCursor {
    pub fn new(page_size: usize, max_records: Option<usize>) -> Self {
        Self {
            offset: 0,
            page_size: page_size.max(1),
            max_records,
            total: None,
            done: max_records == Some(0),
        }
    }

    /// `(offset, limit)` of the next request, or `None` once finished
    pub fn next_request(&self) -> Option<(usize, usize)> {
        if self.done {
            return None;
        }
        let limit = match self.max_records {
            Some(max) => self.page_size.min(max.saturating_sub(self.offset)),
            None => self.page_size,
        };
        Some((self.offset, limit))
    }

    /// Record a received page; returns how many of its records to keep.
    pub fn advance(&mut self, page: &Page) -> usize {
        let received = page.records.len();
        let keep = match self.max_records {
            Some(max) => received.min(max.saturating_sub(self.offset)),
            None => received,
        };
        self.offset += keep;
        if let Some(count) = page.meta.count {
            self.total = Some(count);
        }

        let exhausted = self.total.is_some_and(|t| self.offset >= t);
        let capped = self.max_records.is_some_and(|m| self.offset >= m);
        let last_page = page.links.as_ref().is_some_and(|l| l.next.is_none());
        self.done = received == 0 || exhausted || capped || last_page;
        keep
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total reported by the API, capped by `max_records`
    pub fn expected(&self) -> Option<usize> {
        match (self.total, self.max_records) {
            (Some(t), Some(m)) => Some(t.min(m)),
            (t, _) => t,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// Records collected by [`fetch_all`]
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: Vec<Value>,
    pub pages: usize,
    /// `meta.count` from the last page
    pub reported_total: Option<usize>,
}

/// Fetch every page of the configured endpoint.
///
/// Each page is retried on transient errors; a page that still fails aborts
/// the run. A shutdown request stops the loop after the current page.
pub fn fetch_all(config: &Config, pb: &ProgressBar) -> anyhow::Result<FetchOutcome> {
    let url = config.endpoint_url();
    log::info!("Fetching {url} (page size {})", config.page_size);
    fetch_pages(
        config,
        pb,
        http_config().page_delay,
        shutdown_flag(),
        |query| Ok(get_text(&url, query)?),
    )
}

/// Page loop behind [`fetch_all`], with the transport passed in as `fetch`.
///
/// `fetch` receives the full query (`offset`, `limit`, then the configured
/// filters) and returns the response body. `delay` separates consecutive
/// requests; `shutdown` is polled after every page.
pub fn fetch_pages(
    config: &Config,
    pb: &ProgressBar,
    delay: Duration,
    shutdown: &AtomicBool,
    mut fetch: impl FnMut(&[(String, String)]) -> Result<String, FetchError>,
) -> anyhow::Result<FetchOutcome> {
    let key = config.entity.records_key();
    let mut cursor = PageCursor::new(config.page_size, config.max_records);
    let mut outcome = FetchOutcome::default();

    pb.set_message("connecting...");

    while let Some((offset, limit)) = cursor.next_request() {
        if outcome.pages > 0 && !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let mut query = vec![
            ("offset".to_string(), offset.to_string()),
            ("limit".to_string(), limit.to_string()),
        ];
        query.extend(config.filters.iter().cloned());

        let label = format!("{} offset {offset}", config.entity);
        let page = retry_with_backoff(&label, pb, || {
            let body = fetch(&query)?;
            parse_page(&body, key, offset)
        })
        .with_context(|| format!("Failed to fetch {} page at offset {offset}", config.entity))?;

        let received = page.records.len();
        let keep = cursor.advance(&page);
        outcome.pages += 1;
        outcome.reported_total = cursor.expected();
        outcome.records.extend(page.records.into_iter().take(keep));

        if let Some(total) = cursor.expected() {
            upgrade_to_bar(pb, total as u64);
        }
        pb.set_position(outcome.records.len() as u64);
        pb.set_message(format!("page {}", outcome.pages));
        log::debug!(
            "{}: offset {offset} returned {received} records (kept {keep})",
            config.entity
        );

        if shutdown.load(Ordering::Relaxed) && !cursor.is_done() {
            anyhow::bail!(
                "interrupted after {} pages ({} records)",
                outcome.pages,
                outcome.records.len()
            );
        }
    }

    match outcome.reported_total {
        Some(total) if outcome.records.len() < total => log::warn!(
            "{}: API reported {total} records but only {} were received",
            config.entity,
            outcome.records.len()
        ),
        _ => {}
    }
    log::info!(
        "{}: {} records in {} pages",
        config.entity,
        outcome.records.len(),
        outcome.pages
    );
    Ok(outcome)
}

/// Write concatenated raw records as a JSON array
pub fn save_raw(path: &Path, records: &[Value]) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("Cannot create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)
        .with_context(|| format!("Cannot write {}", path.display()))?;
    writer.flush()?;
    log::info!("Saved {} raw records to {}", records.len(), path.display());
    Ok(())
}

/// Read raw records: a bare JSON array, or a single listing response
pub fn load_raw(path: &Path, records_key: &str) -> anyhow::Result<Vec<Value>> {
    let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let value: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    let records = match value {
        Value::Array(records) => records,
        Value::Object(mut obj) => match obj.remove(records_key) {
            Some(Value::Array(records)) => records,
            _ => anyhow::bail!("{}: no '{records_key}' array", path.display()),
        },
        other => anyhow::bail!(
            "{}: expected an array or object, got {}",
            path.display(),
            json_kind(&other)
        ),
    };
    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(n: usize, count: Option<usize>, next: bool) -> Page {
        Page {
            records: (0..n).map(|i| json!({ "id": i.to_string() })).collect(),
            meta: PageMeta {
                count,
                ..Default::default()
            },
            links: Some(PageLinks {
                next: next.then(|| "https://api.nobelprize.org/2.1/laureates?offset=25".into()),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn parse_page_laureates() {
        let body = r#"{
            "laureates": [{"id": "1"}, {"id": "2"}],
            "meta": {"offset": 0, "limit": 2, "count": 1004, "sort": "asc"},
            "links": {"first": "a", "self": "b", "next": "c", "last": "d"}
        }"#;
        let page = parse_page(body, "laureates", 0).unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.meta.count, Some(1004));
        assert_eq!(page.links.unwrap().next.as_deref(), Some("c"));
    }

    #[test]
    fn parse_page_missing_key_is_empty() {
        let page = parse_page(r#"{"meta": {"count": 0}}"#, "nobelPrizes", 0).unwrap();
        assert!(page.records.is_empty());
        assert!(page.links.is_none());
    }

    #[test]
    fn parse_page_wrong_shape_is_decode_error() {
        let err = parse_page(r#"{"laureates": {"id": "1"}}"#, "laureates", 50).unwrap_err();
        assert!(matches!(err, FetchError::Decode { offset: 50, .. }));
        assert!(!err.is_retryable());

        let err = parse_page("<html>rate limited</html>", "laureates", 0).unwrap_err();
        assert!(err.to_string().contains("offset 0"));
    }

    #[test]
    fn cursor_walks_until_count() {
        let mut cursor = PageCursor::new(25, None);
        assert_eq!(cursor.next_request(), Some((0, 25)));
        assert_eq!(cursor.advance(&page(25, Some(60), true)), 25);
        assert_eq!(cursor.next_request(), Some((25, 25)));
        cursor.advance(&page(25, Some(60), true));
        assert_eq!(cursor.next_request(), Some((50, 25)));
        cursor.advance(&page(10, Some(60), true));
        assert!(cursor.is_done());
        assert_eq!(cursor.offset(), 60);
        assert_eq!(cursor.next_request(), None);
    }

    #[test]
    fn cursor_stops_on_empty_page() {
        let mut cursor = PageCursor::new(25, None);
        cursor.advance(&page(0, None, true));
        assert!(cursor.is_done());
    }

    #[test]
    fn cursor_stops_without_next_link() {
        let mut cursor = PageCursor::new(25, None);
        cursor.advance(&page(25, Some(1000), false));
        assert!(cursor.is_done());
    }

    #[test]
    fn cursor_keeps_going_without_links_block() {
        let mut cursor = PageCursor::new(2, None);
        let mut p = page(2, Some(10), true);
        p.links = None;
        cursor.advance(&p);
        assert!(!cursor.is_done());
    }

    #[test]
    fn cursor_caps_records() {
        let mut cursor = PageCursor::new(25, Some(30));
        assert_eq!(cursor.next_request(), Some((0, 25)));
        cursor.advance(&page(25, Some(1000), true));
        // second request only asks for what is left
        assert_eq!(cursor.next_request(), Some((25, 5)));
        // server ignores the limit; extra records are dropped
        assert_eq!(cursor.advance(&page(25, Some(1000), true)), 5);
        assert!(cursor.is_done());
        assert_eq!(cursor.expected(), Some(30));
    }

    #[test]
    fn cursor_zero_cap_requests_nothing() {
        let cursor = PageCursor::new(25, Some(0));
        assert_eq!(cursor.next_request(), None);
    }

    /// Listing of `count` laureates served at most `max_page` per response
    fn serve(query: &[(String, String)], count: usize, max_page: usize) -> String {
        let param = |name: &str| -> usize {
            query
                .iter()
                .find(|(k, _)| k == name)
                .and_then(|(_, v)| v.parse().ok())
                .unwrap()
        };
        let offset = param("offset");
        let end = (offset + param("limit").min(max_page)).min(count);
        let records: Vec<Value> = (offset..end).map(|i| json!({ "id": i.to_string() })).collect();
        json!({
            "laureates": records,
            "meta": {"offset": offset, "limit": param("limit"), "count": count},
        })
        .to_string()
    }

    fn small_pages(page_size: usize) -> Config {
        Config {
            page_size,
            filters: vec![("gender".into(), "female".into())],
            ..Default::default()
        }
    }

    #[test]
    fn fetch_pages_advances_by_records_received() {
        let config = small_pages(3);
        let mut requests = Vec::new();
        let outcome = fetch_pages(
            &config,
            &ProgressBar::hidden(),
            Duration::ZERO,
            &AtomicBool::new(false),
            |query| {
                requests.push(query.to_vec());
                // server returns fewer records than asked for
                Ok(serve(query, 5, 2))
            },
        )
        .unwrap();

        let offsets: Vec<&str> = requests.iter().map(|q| q[0].1.as_str()).collect();
        assert_eq!(offsets, ["0", "2", "4"]);
        assert!(requests.iter().all(|q| q[1].1 == "3"));
        assert!(requests.iter().all(|q| q[2].0 == "gender" && q[2].1 == "female"));

        assert_eq!(outcome.pages, 3);
        assert_eq!(outcome.reported_total, Some(5));
        let ids: Vec<&str> = outcome.records.iter().filter_map(|r| r["id"].as_str()).collect();
        assert_eq!(ids, ["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn fetch_pages_error_names_offset() {
        let config = small_pages(2);
        let err = fetch_pages(
            &config,
            &ProgressBar::hidden(),
            Duration::ZERO,
            &AtomicBool::new(false),
            |query| {
                if query[0].1 == "2" {
                    Ok("<html>maintenance</html>".to_string())
                } else {
                    Ok(serve(query, 6, 2))
                }
            },
        )
        .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("page at offset 2"), "{msg}");
    }

    #[test]
    fn fetch_pages_stops_on_shutdown() {
        let config = small_pages(2);
        let shutdown = AtomicBool::new(false);
        let mut calls = 0;
        let err = fetch_pages(&config, &ProgressBar::hidden(), Duration::ZERO, &shutdown, |query| {
            calls += 1;
            shutdown.store(true, Ordering::Relaxed);
            Ok(serve(query, 6, 2))
        })
        .unwrap_err();
        assert_eq!(calls, 1);
        assert!(err.to_string().contains("interrupted after 1 pages (2 records)"), "{err}");

        // a request that completes the listing is not an interruption
        let outcome = fetch_pages(
            &small_pages(10),
            &ProgressBar::hidden(),
            Duration::ZERO,
            &AtomicBool::new(true),
            |query| Ok(serve(query, 3, 10)),
        )
        .unwrap();
        assert_eq!(outcome.records.len(), 3);
    }

    #[test]
    fn fetch_pages_waits_between_pages() {
        let config = small_pages(2);
        let delay = Duration::from_millis(40);
        let mut sent = Vec::new();
        let outcome = fetch_pages(
            &config,
            &ProgressBar::hidden(),
            delay,
            &AtomicBool::new(false),
            |query| {
                sent.push(std::time::Instant::now());
                Ok(serve(query, 5, 2))
            },
        )
        .unwrap();
        assert_eq!(outcome.pages, 3);
        assert_eq!(sent.len(), 3);
        for pair in sent.windows(2) {
            assert!(pair[1] - pair[0] >= delay);
        }
    }

    #[test]
    fn raw_dump_round_trip_and_envelope_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laureates_raw.json");
        let records = vec![json!({"id": "1"}), json!({"id": "2"})];
        save_raw(&path, &records).unwrap();
        assert_eq!(load_raw(&path, "laureates").unwrap(), records);

        let envelope = dir.path().join("page.json");
        std::fs::write(
            &envelope,
            r#"{"laureates": [{"id": "7"}], "meta": {"count": 1}}"#,
        )
        .unwrap();
        assert_eq!(load_raw(&envelope, "laureates").unwrap().len(), 1);
        assert!(load_raw(&envelope, "nobelPrizes").is_err());
    }
}
