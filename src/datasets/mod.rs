//! The built-in table schemas, one per output dataset.
//!
//! Each submodule declares the extraction rules for one tab-separated table
//! over the same trademark application corpus. The selectors mirror the CIPO
//! ST.96 element layout; all of them compile against the fixed namespace
//! bindings in [`crate::ns`].

mod claims;
mod classes;
mod events;
mod goods;
mod main;
mod parties;
mod priority;
mod vienna;

use crate::error::SchemaError;
use crate::flatten::TableSchema;
use std::fmt;
use std::str::FromStr;

/// Selector for the ST13 application number, shared by every dataset's
/// identifier field.
pub(crate) const APPLICATION_NUMBER: &str =
    ".//tmk:Trademark/com:ApplicationNumber/com:ST13ApplicationNumber/text()";

/// The datasets this tool can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Main,
    Classes,
    Goods,
    Vienna,
    Priority,
    Claims,
    Events,
    Parties,
}

impl Dataset {
    pub const ALL: [Dataset; 8] = [
        Dataset::Main,
        Dataset::Classes,
        Dataset::Goods,
        Dataset::Vienna,
        Dataset::Priority,
        Dataset::Claims,
        Dataset::Events,
        Dataset::Parties,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Main => "main",
            Dataset::Classes => "classes",
            Dataset::Goods => "goods",
            Dataset::Vienna => "vienna",
            Dataset::Priority => "priority",
            Dataset::Claims => "claims",
            Dataset::Events => "allevents",
            Dataset::Parties => "parties",
        }
    }

    /// Output file name without extension.
    pub fn file_stem(&self) -> String {
        format!("CA_TM_{}", self.name())
    }

    /// Build this dataset's table schema. Fails only if a built-in selector
    /// is malformed, which no record data can trigger.
    pub fn schema(&self) -> Result<TableSchema, SchemaError> {
        match self {
            Dataset::Main => main::schema(),
            Dataset::Classes => classes::schema(),
            Dataset::Goods => goods::schema(),
            Dataset::Vienna => vienna::schema(),
            Dataset::Priority => priority::schema(),
            Dataset::Claims => claims::schema(),
            Dataset::Events => events::schema(),
            Dataset::Parties => parties::schema(),
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" => Ok(Dataset::Main),
            "classes" => Ok(Dataset::Classes),
            "goods" => Ok(Dataset::Goods),
            "vienna" => Ok(Dataset::Vienna),
            "priority" => Ok(Dataset::Priority),
            "claims" => Ok(Dataset::Claims),
            "events" | "allevents" => Ok(Dataset::Events),
            "parties" => Ok(Dataset::Parties),
            other => Err(format!(
                "unknown dataset '{other}' (expected one of: main, classes, goods, vienna, priority, claims, events, parties)"
            )),
        }
    }
}
