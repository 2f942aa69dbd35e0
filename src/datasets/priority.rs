//! One row per foreign priority claim.

use super::APPLICATION_NUMBER;
use crate::error::SchemaError;
use crate::flatten::{LevelSchema, RecurseSpec, TableSchema, Transform};

const HEADER: &[&str] = &[
    "AppNo",
    "ExtNo",
    "PriorityCountry",
    "PriorityDocNo",
    "PriorityDate",
    "PriorityComment",
    "PriorityClass",
    "PriorityGoods",
];

pub(crate) fn schema() -> Result<TableSchema, SchemaError> {
    let claim = LevelSchema::new()
        .scalar(
            "PriorityCountry",
            ".//com:PriorityCountryCode/text()",
            Transform::Normalize,
        )?
        .scalar(
            "PriorityDocNo",
            ".//com:ApplicationNumberText/text()",
            Transform::Normalize,
        )?
        .scalar(
            "PriorityDate",
            ".//com:PriorityApplicationFilingDate/text()",
            Transform::Normalize,
        )?
        .scalar("PriorityComment", ".//com:CommentText/text()", Transform::Normalize)?
        .scalar("PriorityClass", ".//tmk:ClassNumber/text()", Transform::Normalize)?
        .scalar(
            "PriorityGoods",
            ".//tmk:GoodsServicesDescriptionText/@com:sequenceNumber",
            Transform::Join("/"),
        )?;

    let root = LevelSchema::new().identifier(APPLICATION_NUMBER)?.recurse(
        "PriorityClaim",
        ".//tmk:Priority",
        RecurseSpec::into_level(claim),
    )?;

    Ok(TableSchema::new("priority", HEADER, root))
}
