//! One row per Vienna figurative-element classification triple, with a
//! 1-based sequence column.

use super::APPLICATION_NUMBER;
use crate::error::SchemaError;
use crate::flatten::{LevelSchema, TableSchema, Transform, ZipSpec};

const HEADER: &[&str] = &[
    "AppNo",
    "ExtNo",
    "ViennaSeq",
    "ViennaCategory",
    "ViennaDivision",
    "ViennaSection",
];

pub(crate) fn schema() -> Result<TableSchema, SchemaError> {
    let zip = ZipSpec::new()
        .indexed("ViennaSeq")
        .field(
            "ViennaCategory",
            ".//com:ViennaClassification/com:ViennaCategory/text()",
            Transform::Verbatim,
        )?
        .field(
            "ViennaDivision",
            ".//com:ViennaClassification/com:ViennaDivision/text()",
            Transform::Verbatim,
        )?
        .field(
            "ViennaSection",
            ".//com:ViennaClassification/com:ViennaSection/text()",
            Transform::Verbatim,
        )?;

    let root = LevelSchema::new().identifier(APPLICATION_NUMBER)?.zipped(zip);

    Ok(TableSchema::new("vienna", HEADER, root))
}
