//! Explode decoded records into their output tables.
//!
//! Each entity owns one [`TableWriter`] per table. Child rows are pushed
//! before the parent row is moved into its accumulator, and every child row
//! carries the full parent key.

use std::io;
use std::path::{Path, PathBuf};

use nobeline_core::{Accumulator, SinkOptions, TableSink, flush_into};
use serde::de::DeserializeOwned;

use crate::state::Table;
use crate::transform::{
    AffiliationAccumulator, AffiliationRecord, Language, LaureateAccumulator, LaureateRow,
    LinkAccumulator, LinkRecord, NobelPrizeAccumulator, NobelPrizeLaureateAccumulator,
    NobelPrizeLaureateRecord, NobelPrizeRow, PrizeAccumulator, PrizeKey, PrizeRecord,
    ResidenceAccumulator, ResidenceRecord,
};

/// Rows written to one table
#[derive(Debug, Clone)]
pub struct TableStats {
    pub table: Table,
    pub rows: usize,
    pub path: PathBuf,
}

/// One accumulator feeding one sink
pub struct TableWriter<A: Accumulator> {
    table: Table,
    acc: A,
    sink: TableSink,
}

impl<A: Accumulator> TableWriter<A> {
    pub fn new(table: Table, acc: A, output_dir: &Path, options: &SinkOptions) -> io::Result<Self> {
        let sink = TableSink::new(table.name(), output_dir, table.schema(), options)?;
        Ok(Self { table, acc, sink })
    }

    pub fn push(&mut self, row: A::Row) -> io::Result<()> {
        self.acc.push(row);
        flush_into(&mut self.acc, &mut self.sink, false)
    }

    pub fn finish(mut self) -> io::Result<TableStats> {
        flush_into(&mut self.acc, &mut self.sink, true)?;
        let path = self.sink.path().to_path_buf();
        let rows = self.sink.finalize()?;
        Ok(TableStats {
            table: self.table,
            rows,
            path,
        })
    }
}

/// The tables of one entity
pub trait TableSet {
    /// Typed record decoded from one raw JSON value
    type Record: DeserializeOwned;

    /// Reject records that cannot produce a keyed row
    fn validate(record: &Self::Record) -> Result<(), String>;

    /// Natural key used to drop duplicates across pages
    fn dedup_key(record: &Self::Record) -> Option<String>;

    /// Explode one record into all tables
    fn push(&mut self, record: Self::Record) -> io::Result<()>;

    /// Flush remaining rows and finalize every file
    fn finish(self) -> io::Result<Vec<TableStats>>;
}

// === Laureates ===

pub struct LaureateTables {
    lang: Language,
    laureates: TableWriter<LaureateAccumulator>,
    prizes: TableWriter<PrizeAccumulator>,
    affiliations: TableWriter<AffiliationAccumulator>,
    residences: TableWriter<ResidenceAccumulator>,
    links: TableWriter<LinkAccumulator>,
}

impl LaureateTables {
    pub fn new(output_dir: &Path, options: &SinkOptions, lang: Language) -> io::Result<Self> {
        Ok(Self {
            lang,
            laureates: TableWriter::new(
                Table::Laureates,
                LaureateAccumulator::new(lang),
                output_dir,
                options,
            )?,
            prizes: TableWriter::new(
                Table::LaureatePrizes,
                PrizeAccumulator::new(),
                output_dir,
                options,
            )?,
            affiliations: TableWriter::new(
                Table::PrizeAffiliations,
                AffiliationAccumulator::new(),
                output_dir,
                options,
            )?,
            residences: TableWriter::new(
                Table::PrizeResidences,
                ResidenceAccumulator::new(),
                output_dir,
                options,
            )?,
            links: TableWriter::new(
                Table::LaureateLinks,
                LinkAccumulator::new(),
                output_dir,
                options,
            )?,
        })
    }
}

impl TableSet for LaureateTables {
    type Record = LaureateRow;

    fn validate(record: &LaureateRow) -> Result<(), String> {
        if record.id.is_empty() {
            return Err("laureate without id".to_string());
        }
        Ok(())
    }

    fn dedup_key(record: &LaureateRow) -> Option<String> {
        Some(record.id.clone())
    }

    fn push(&mut self, row: LaureateRow) -> io::Result<()> {
        let lang = self.lang;
        let id = row.id.as_str();

        for link in &row.links {
            self.links.push(LinkRecord::new(Some(id), None, None, link))?;
        }
        for url in &row.same_as {
            self.links.push(LinkRecord::same_as(id, url))?;
        }

        for prize in &row.nobel_prizes {
            let key = PrizeKey::new(id, prize);
            for (pos, affiliation) in prize.affiliations.iter().enumerate() {
                self.affiliations.push(AffiliationRecord::new(
                    key.clone(),
                    pos,
                    affiliation,
                    lang,
                ))?;
            }
            for (pos, residence) in prize.residences.iter().enumerate() {
                self.residences
                    .push(ResidenceRecord::new(key.clone(), pos, residence, lang))?;
            }
            for link in &prize.links {
                self.links.push(LinkRecord::new(
                    Some(id),
                    key.award_year,
                    key.category.as_deref(),
                    link,
                ))?;
            }
            self.prizes.push(PrizeRecord::new(key, prize, lang))?;
        }

        self.laureates.push(row)
    }

    fn finish(self) -> io::Result<Vec<TableStats>> {
        Ok(vec![
            self.laureates.finish()?,
            self.prizes.finish()?,
            self.affiliations.finish()?,
            self.residences.finish()?,
            self.links.finish()?,
        ])
    }
}

// === Nobel prizes ===

pub struct NobelPrizeTables {
    lang: Language,
    prizes: TableWriter<NobelPrizeAccumulator>,
    laureates: TableWriter<NobelPrizeLaureateAccumulator>,
    links: TableWriter<LinkAccumulator>,
}

impl NobelPrizeTables {
    pub fn new(output_dir: &Path, options: &SinkOptions, lang: Language) -> io::Result<Self> {
        Ok(Self {
            lang,
            prizes: TableWriter::new(
                Table::NobelPrizes,
                NobelPrizeAccumulator::new(lang),
                output_dir,
                options,
            )?,
            laureates: TableWriter::new(
                Table::NobelPrizeLaureates,
                NobelPrizeLaureateAccumulator::new(),
                output_dir,
                options,
            )?,
            links: TableWriter::new(
                Table::NobelPrizeLinks,
                LinkAccumulator::new(),
                output_dir,
                options,
            )?,
        })
    }
}

impl TableSet for NobelPrizeTables {
    type Record = NobelPrizeRow;

    fn validate(record: &NobelPrizeRow) -> Result<(), String> {
        if record.award_year.is_none() || record.category.is_none() {
            return Err("prize without award year or category".to_string());
        }
        Ok(())
    }

    fn dedup_key(record: &NobelPrizeRow) -> Option<String> {
        let year = record.award_year?;
        let category = record.category_key()?;
        Some(format!("{year}|{category}"))
    }

    fn push(&mut self, row: NobelPrizeRow) -> io::Result<()> {
        let lang = self.lang;
        let category = row.category_key();

        for laureate in &row.laureates {
            self.laureates
                .push(NobelPrizeLaureateRecord::new(&row, laureate, lang))?;
            for link in &laureate.links {
                self.links.push(LinkRecord::new(
                    Some(&laureate.id),
                    row.award_year,
                    category.as_deref(),
                    link,
                ))?;
            }
        }
        for link in &row.links {
            self.links.push(LinkRecord::new(
                None,
                row.award_year,
                category.as_deref(),
                link,
            ))?;
        }

        self.prizes.push(row)
    }

    fn finish(self) -> io::Result<Vec<TableStats>> {
        Ok(vec![
            self.prizes.finish()?,
            self.laureates.finish()?,
            self.links.finish()?,
        ])
    }
}
