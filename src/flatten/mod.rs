//! Record flattening - turn hierarchical record subtrees into table rows.
//!
//! A flat table is described declaratively ([`schema`]), interpreted by a
//! single recursive engine ([`engine`]), and written out as tab-separated
//! text ([`writer`]). Schemas compile their selectors up front, so a
//! malformed extraction rule fails before the first record is read.

pub mod engine;
pub mod schema;
pub mod transform;
pub mod writer;

pub use engine::{Flattener, Row, Stem};
pub use schema::{
    CarryForward, FieldKind, FieldSpec, LevelSchema, RecurseSpec, ScalarSpec, StemAction,
    TableSchema, ZipField, ZipSpec,
};
pub use transform::{CodeTable, Transform};
pub use writer::TableWriter;
