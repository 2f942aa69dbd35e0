//! One row per goods/services line: class number, sequence label, and the
//! whitespace-normalized description, zipped positionally with padding.

use super::APPLICATION_NUMBER;
use crate::error::SchemaError;
use crate::flatten::{LevelSchema, TableSchema, Transform, ZipSpec};

const HEADER: &[&str] = &["AppNo", "ExtNo", "Class", "GoodsSeq", "GoodsDesc"];

pub(crate) fn schema() -> Result<TableSchema, SchemaError> {
    let zip = ZipSpec::new()
        .field(
            "Class",
            ".//tmk:GoodsServicesBag//tmk:ClassDescription/tmk:ClassNumber/text()",
            Transform::Verbatim,
        )?
        .field(
            "GoodsSeq",
            ".//tmk:GoodsServicesBag//tmk:GoodsServicesDescriptionText/@com:sequenceNumber",
            Transform::Verbatim,
        )?
        .field(
            "GoodsDesc",
            ".//tmk:GoodsServicesBag//tmk:GoodsServicesDescriptionText/text()",
            Transform::Normalize,
        )?;

    let root = LevelSchema::new().identifier(APPLICATION_NUMBER)?.zipped(zip);

    Ok(TableSchema::new("goods", HEADER, root))
}
