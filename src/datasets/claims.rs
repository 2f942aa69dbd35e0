//! One row per use/registrability claim. Claim dates arrive either as a
//! structured ISO date (decomposed into Year/Month/Date cells) or as an
//! unstructured year/month/day sub-element group, which recurses one level
//! deeper and fills only the components actually present.

use super::APPLICATION_NUMBER;
use crate::error::SchemaError;
use crate::flatten::{FieldKind, LevelSchema, RecurseSpec, TableSchema, Transform};

const HEADER: &[&str] = &[
    "AppNo",
    "ExtNo",
    "ClaimTypeCode",
    "ClaimTypeDesc",
    "ClaimSerialNo",
    "ClaimCode",
    "ClaimDesc",
    "Year",
    "Month",
    "Date",
    "Country",
    "ForeignDocNo",
    "ClaimedGoods",
];

pub(crate) fn schema() -> Result<TableSchema, SchemaError> {
    let partial_date = LevelSchema::new()
        .scalar_sticky("Year", ".//catmk:ClaimYear/text()", Transform::Verbatim)?
        .scalar_sticky("Month", ".//catmk:ClaimMonth/text()", Transform::Verbatim)?
        .scalar_sticky("Date", ".//catmk:ClaimDay/text()", Transform::Verbatim)?;

    let claim = LevelSchema::new()
        .scalar(
            "ClaimTypeCode",
            ".//catmk:ClaimCategoryType/text()",
            Transform::Verbatim,
        )?
        .scalar(
            "ClaimTypeDesc",
            ".//catmk:ClaimTypeDescription/text()",
            Transform::Verbatim,
        )?
        .scalar("ClaimSerialNo", ".//catmk:ClaimNumber/text()", Transform::Verbatim)?
        .scalar("ClaimCode", ".//catmk:ClaimCode/text()", Transform::Verbatim)?
        .scalar("ClaimDesc", ".//catmk:ClaimText/text()", Transform::Normalize)?
        .scalar("Country", ".//catmk:ClaimCountryCode/text()", Transform::Verbatim)?
        .scalar(
            "ForeignDocNo",
            ".//catmk:ClaimForeignRegistrationNbr/text()",
            Transform::Verbatim,
        )?
        .scalar(
            "ClaimedGoods",
            ".//catmk:GoodsServicesReferenceIdentifier/text()",
            Transform::Join("/"),
        )?
        .field(
            "CompleteDate",
            ".//catmk:StructuredClaimDate/text()",
            FieldKind::DateParts {
                year: "Year".to_string(),
                month: "Month".to_string(),
                day: "Date".to_string(),
            },
        )?
        .recurse(
            "PartialDate",
            ".//catmk:UnstructuredClaimDate",
            RecurseSpec::into_level(partial_date).optional(),
        )?;

    let root = LevelSchema::new().identifier(APPLICATION_NUMBER)?.recurse(
        "Claim",
        ".//catmk:Claim",
        RecurseSpec::into_level(claim),
    )?;

    Ok(TableSchema::new("claims", HEADER, root))
}
