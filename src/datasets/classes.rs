//! One row per application: Nice classification membership indicators,
//! `IC1`..`IC45`. When an application declares no classes at all, every
//! indicator cell stays empty rather than zero.

use super::APPLICATION_NUMBER;
use crate::error::SchemaError;
use crate::flatten::{FieldKind, LevelSchema, TableSchema};

const NICE_CLASS_COUNT: u32 = 45;

pub(crate) fn schema() -> Result<TableSchema, SchemaError> {
    let mut header = vec!["AppNo".to_string(), "ExtNo".to_string()];
    for i in 1..=NICE_CLASS_COUNT {
        header.push(format!("IC{i}"));
    }
    let header: Vec<&str> = header.iter().map(String::as_str).collect();

    let root = LevelSchema::new().identifier(APPLICATION_NUMBER)?.field(
        "Classes",
        ".//tmk:GoodsServicesClassification/tmk:ClassNumber/text()",
        FieldKind::Indicators {
            prefix: "IC".to_string(),
            count: NICE_CLASS_COUNT,
        },
    )?;

    Ok(TableSchema::new("classes", &header, root))
}
