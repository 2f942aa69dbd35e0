//! # Flatmark - Trademark Record Flattening Toolkit
//!
//! Streams concatenated ST.96 trademark XML collections and flattens each
//! `tmk:TrademarkBag` record into tab-separated tables, one declarative
//! schema per table.
//!
//! ## Modules
//!
//! - **source**: streaming record reader with O(record) memory
//! - **flatten**: declarative schemas, the recursive flattening engine, and
//!   the TSV writer
//! - **datasets**: the built-in table schemas (main, classes, goods, vienna,
//!   priority, claims, events, parties)
//! - **extractor**: ties a source, a schema, and a writer into one run
//!
//! ## Quick Start
//!
//! ```rust
//! use flatmark::{Dataset, Extractor, RecordSource, TableWriter};
//! use std::io::Cursor;
//!
//! # fn main() -> anyhow::Result<()> {
//! let xml = r#"<tmk:TrademarkBag
//!       xmlns:tmk="http://www.wipo.int/standards/XMLSchema/ST96/Trademark"
//!       xmlns:com="http://www.wipo.int/standards/XMLSchema/ST96/Common">
//!     <tmk:Trademark>
//!       <com:ApplicationNumber>
//!         <com:ST13ApplicationNumber>CA5000012340101</com:ST13ApplicationNumber>
//!       </com:ApplicationNumber>
//!     </tmk:Trademark>
//! </tmk:TrademarkBag>"#;
//!
//! let extractor = Extractor::new(Dataset::Main.schema()?);
//! let mut source = RecordSource::from_reader(Cursor::new(xml.as_bytes()));
//! let mut out = Vec::new();
//! let mut writer = TableWriter::new(&mut out, &extractor.schema().header)?;
//!
//! let stats = extractor.run(&mut source, &mut writer)?;
//! assert_eq!(stats.rows, 1);
//! # Ok(())
//! # }
//! ```

pub mod datasets;
pub mod error;
pub mod extractor;
pub mod flatten;
pub mod ns;
pub mod selector;
pub mod source;
pub mod tree;

// Re-export commonly used types for convenience
pub use datasets::Dataset;
pub use error::{RecordError, SchemaError, SourceError};
pub use extractor::{ExtractStats, Extractor};
pub use flatten::{Flattener, LevelSchema, TableSchema, TableWriter, Transform};
pub use selector::Selector;
pub use source::RecordSource;
pub use tree::Element;
