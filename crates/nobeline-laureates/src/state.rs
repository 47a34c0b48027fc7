//! Entity and table identifiers for the Nobel Prize pipeline

use std::fmt;
use std::sync::Arc;

use arrow::datatypes::Schema;

use crate::schema;

/// Nobel Prize API listing endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    /// People and organizations that received a prize
    Laureates,
    /// One record per (award year, category)
    NobelPrizes,
}

impl Entity {
    /// Parse entity from string name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "laureates" | "laureate" => Some(Self::Laureates),
            "nobel-prizes" | "nobel_prizes" | "nobelprizes" | "prizes" => Some(Self::NobelPrizes),
            _ => None,
        }
    }

    /// CLI / manifest name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Laureates => "laureates",
            Self::NobelPrizes => "nobel-prizes",
        }
    }

    /// Path segment under the API base URL
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Laureates => "laureates",
            Self::NobelPrizes => "nobelPrizes",
        }
    }

    /// Envelope key holding the page's records
    pub fn records_key(&self) -> &'static str {
        self.endpoint()
    }

    /// Output filename prefix for raw dumps
    pub fn output_prefix(&self) -> &'static str {
        match self {
            Self::Laureates => "laureates",
            Self::NobelPrizes => "nobel_prizes",
        }
    }

    /// Tables written for this entity, parent first
    pub fn tables(&self) -> &'static [Table] {
        match self {
            Self::Laureates => &[
                Table::Laureates,
                Table::LaureatePrizes,
                Table::PrizeAffiliations,
                Table::PrizeResidences,
                Table::LaureateLinks,
            ],
            Self::NobelPrizes => &[
                Table::NobelPrizes,
                Table::NobelPrizeLaureates,
                Table::NobelPrizeLinks,
            ],
        }
    }

    /// List all available entities
    pub fn all() -> &'static [Entity] {
        &[Self::Laureates, Self::NobelPrizes]
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Output tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Laureates,
    LaureatePrizes,
    PrizeAffiliations,
    PrizeResidences,
    LaureateLinks,
    NobelPrizes,
    NobelPrizeLaureates,
    NobelPrizeLinks,
}

impl Table {
    /// File stem, also the view name used by the join step
    pub fn name(&self) -> &'static str {
        match self {
            Self::Laureates => "laureates",
            Self::LaureatePrizes => "laureate_prizes",
            Self::PrizeAffiliations => "prize_affiliations",
            Self::PrizeResidences => "prize_residences",
            Self::LaureateLinks => "laureate_links",
            Self::NobelPrizes => "nobel_prizes",
            Self::NobelPrizeLaureates => "nobel_prize_laureates",
            Self::NobelPrizeLinks => "nobel_prize_links",
        }
    }

    pub fn schema(&self) -> &'static Arc<Schema> {
        match self {
            Self::Laureates => schema::laureates(),
            Self::LaureatePrizes => schema::laureate_prizes(),
            Self::PrizeAffiliations => schema::prize_affiliations(),
            Self::PrizeResidences => schema::prize_residences(),
            Self::LaureateLinks | Self::NobelPrizeLinks => schema::links(),
            Self::NobelPrizes => schema::nobel_prizes(),
            Self::NobelPrizeLaureates => schema::nobel_prize_laureates(),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_from_name() {
        assert_eq!(Entity::from_name("laureates"), Some(Entity::Laureates));
        assert_eq!(Entity::from_name("Laureates"), Some(Entity::Laureates));
        assert_eq!(Entity::from_name("nobel-prizes"), Some(Entity::NobelPrizes));
        assert_eq!(Entity::from_name("NOBEL_PRIZES"), Some(Entity::NobelPrizes));
        assert_eq!(Entity::from_name("works"), None);
    }

    #[test]
    fn entity_endpoint_and_key() {
        assert_eq!(Entity::Laureates.endpoint(), "laureates");
        assert_eq!(Entity::NobelPrizes.endpoint(), "nobelPrizes");
        assert_eq!(Entity::NobelPrizes.records_key(), "nobelPrizes");
        assert_eq!(format!("{}", Entity::NobelPrizes), "nobel-prizes");
    }

    #[test]
    fn entity_tables_parent_first() {
        assert_eq!(Entity::Laureates.tables()[0], Table::Laureates);
        assert_eq!(Entity::NobelPrizes.tables()[0], Table::NobelPrizes);
        assert_eq!(Entity::Laureates.tables().len(), 5);
        assert_eq!(Entity::NobelPrizes.tables().len(), 3);
    }

    #[test]
    fn link_tables_share_schema() {
        assert!(Arc::ptr_eq(
            Table::LaureateLinks.schema(),
            Table::NobelPrizeLinks.schema()
        ));
    }
}
