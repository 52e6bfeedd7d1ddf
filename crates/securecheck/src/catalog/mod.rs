//! The fixed report catalog.
//!
//! Two tiers of parameterless aggregate queries, each an ordered sequence of
//! immutable definitions. Menu order is declaration order. Ids and labels are
//! checked for uniqueness when the catalog is built.

mod entries;

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

use crate::config::TableName;
use crate::sqlite::validate_read_only_sql;

const TABLE_PLACEHOLDER: &str = "{table}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Advanced,
    Complex,
}

impl Tier {
    pub const ALL: [Tier; 2] = [Tier::Advanced, Tier::Complex];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Advanced => "advanced",
            Self::Complex => "complex",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Advanced => "Advanced Insights",
            Self::Complex => "Complex Insights",
        }
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "advanced" => Ok(Self::Advanced),
            "complex" => Ok(Self::Complex),
            other => Err(format!(
                "unknown tier `{other}` (expected `advanced` or `complex`)"
            )),
        }
    }
}

/// Static shape of a report before the table name is bound.
#[derive(Debug, Clone, Copy)]
pub struct QueryTemplate {
    pub id: &'static str,
    pub label: &'static str,
    pub sql: &'static str,
    pub columns: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryDefinition {
    pub id: &'static str,
    pub tier: Tier,
    pub label: &'static str,
    pub sql: String,
    pub columns: &'static [&'static str],
}

impl QueryDefinition {
    #[must_use]
    pub fn bind(tier: Tier, template: &QueryTemplate, table: &TableName) -> Self {
        Self {
            id: template.id,
            tier,
            label: template.label,
            sql: template.sql.replace(TABLE_PLACEHOLDER, table.as_str()),
            columns: template.columns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {tier} query `{key}`")]
pub struct UnknownQueryError {
    pub tier: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogIntegrityError {
    #[error("{tier} query #{position} has an empty id or label")]
    EmptyKey { tier: Tier, position: usize },

    #[error("query id `{id}` is declared more than once")]
    DuplicateId { id: String },

    #[error("{tier} query label `{label}` is declared more than once")]
    DuplicateLabel { tier: Tier, label: String },

    #[error("query `{id}` has no SQL text")]
    EmptySql { id: String },

    #[error("query `{id}` declares no output columns")]
    NoColumns { id: String },

    #[error("query `{id}` is not read-only: {message}")]
    NotReadOnly { id: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCatalog {
    advanced: Vec<QueryDefinition>,
    complex: Vec<QueryDefinition>,
}

impl QueryCatalog {
    /// The builtin catalog bound to `table`.
    pub fn for_table(table: &TableName) -> Result<Self, CatalogIntegrityError> {
        let bind_all = |tier: Tier, templates: &[QueryTemplate]| {
            templates
                .iter()
                .map(|template| QueryDefinition::bind(tier, template, table))
                .collect::<Vec<_>>()
        };

        Self::from_definitions(
            bind_all(Tier::Advanced, entries::ADVANCED),
            bind_all(Tier::Complex, entries::COMPLEX),
        )
    }

    pub fn builtin() -> Result<Self, CatalogIntegrityError> {
        Self::for_table(&TableName::default())
    }

    pub fn from_definitions(
        advanced: Vec<QueryDefinition>,
        complex: Vec<QueryDefinition>,
    ) -> Result<Self, CatalogIntegrityError> {
        let catalog = Self { advanced, complex };
        catalog.check_integrity()?;
        Ok(catalog)
    }

    fn check_integrity(&self) -> Result<(), CatalogIntegrityError> {
        let mut ids = BTreeSet::new();
        for tier in Tier::ALL {
            let mut labels = BTreeSet::new();
            for (position, definition) in self.entries(tier).iter().enumerate() {
                if definition.id.trim().is_empty() || definition.label.trim().is_empty() {
                    return Err(CatalogIntegrityError::EmptyKey {
                        tier,
                        position: position + 1,
                    });
                }
                if !ids.insert(definition.id) {
                    return Err(CatalogIntegrityError::DuplicateId {
                        id: definition.id.to_string(),
                    });
                }
                if !labels.insert(definition.label) {
                    return Err(CatalogIntegrityError::DuplicateLabel {
                        tier,
                        label: definition.label.to_string(),
                    });
                }
                if definition.sql.trim().is_empty() {
                    return Err(CatalogIntegrityError::EmptySql {
                        id: definition.id.to_string(),
                    });
                }
                if definition.columns.is_empty() {
                    return Err(CatalogIntegrityError::NoColumns {
                        id: definition.id.to_string(),
                    });
                }
                validate_read_only_sql(&definition.sql).map_err(|violation| {
                    CatalogIntegrityError::NotReadOnly {
                        id: definition.id.to_string(),
                        message: violation.message,
                    }
                })?;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn entries(&self, tier: Tier) -> &[QueryDefinition] {
        match tier {
            Tier::Advanced => &self.advanced,
            Tier::Complex => &self.complex,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.advanced.len() + self.complex.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Menu labels for `tier` in declaration order.
    #[must_use]
    pub fn list_queries(&self, tier: Tier) -> Vec<&'static str> {
        self.entries(tier)
            .iter()
            .map(|definition| definition.label)
            .collect()
    }

    pub fn get_query(&self, tier: Tier, label: &str) -> Result<&str, UnknownQueryError> {
        self.entries(tier)
            .iter()
            .find(|definition| definition.label == label)
            .map(|definition| definition.sql.as_str())
            .ok_or_else(|| UnknownQueryError {
                tier: tier.to_string(),
                key: label.to_string(),
            })
    }

    /// Resolves `key` as either a label or an id within `tier`.
    pub fn find(&self, tier: Tier, key: &str) -> Result<&QueryDefinition, UnknownQueryError> {
        self.entries(tier)
            .iter()
            .find(|definition| definition.label == key || definition.id == key)
            .ok_or_else(|| UnknownQueryError {
                tier: tier.to_string(),
                key: key.to_string(),
            })
    }

    pub fn by_id(&self, id: &str) -> Result<&QueryDefinition, UnknownQueryError> {
        Tier::ALL
            .into_iter()
            .flat_map(|tier| self.entries(tier))
            .find(|definition| definition.id == id)
            .ok_or_else(|| UnknownQueryError {
                tier: "catalog".to_string(),
                key: id.to_string(),
            })
    }
}
