//! One row per prosecution or proceeding event: office actions
//! (`tmk:MarkEvent`), registration amendments (`catmk:Footnote`), and the
//! events nested inside opposition and cancellation proceedings, stage by
//! stage. Amendment rows without an explicit change date fall back to the
//! footnote's filing date.

use super::APPLICATION_NUMBER;
use crate::error::SchemaError;
use crate::flatten::{CarryForward, LevelSchema, RecurseSpec, TableSchema, Transform};

const HEADER: &[&str] = &[
    "AppNo",
    "ExtNo",
    "EventType",
    "ProceedingSeq",
    "FilingDate",
    "StageCode",
    "StageDesc",
    "EventCode",
    "EventDesc",
    "EventDate",
];

const CASE_TYPE: &str = ".//catmk:OppositionCaseTypeDescription[@com:languageCode=\"en\"]/text()";

fn mark_event_level() -> Result<LevelSchema, SchemaError> {
    LevelSchema::new()
        .scalar("EventCode", ".//tmk:MarkEventCode/text()", Transform::Verbatim)?
        .scalar(
            "EventDesc",
            ".//tmk:MarkEventDescriptionText/text()",
            Transform::Normalize,
        )?
        .scalar("EventDate", ".//tmk:MarkEventDate/text()", Transform::Verbatim)
}

fn footnote_level() -> Result<LevelSchema, SchemaError> {
    LevelSchema::new()
        .scalar("EventCode", ".//cacom:CategoryCode/text()", Transform::Verbatim)?
        .scalar(
            "EventDesc",
            ".//cacom:CategoryDescription/text()",
            Transform::Normalize,
        )?
        .scalar("FilingDate", ".//cacom:RegisteredDate/text()", Transform::Verbatim)?
        .scalar_with_carry(
            "EventDate",
            ".//cacom:ChangedDate/text()",
            Transform::Verbatim,
            CarryForward {
                from: "FilingDate".to_string(),
                when: "EventType".to_string(),
                equals: "Amendment".to_string(),
            },
        )
}

fn stage_level() -> Result<LevelSchema, SchemaError> {
    LevelSchema::new()
        .scalar(
            "StageCode",
            ".//catmk:ProceedingStageCode/text()",
            Transform::Verbatim,
        )?
        .scalar(
            "StageDesc",
            ".//catmk:ProceedingStageDescriptionText[@com:languageCode=\"en\"]/text()",
            Transform::Normalize,
        )?
        .recurse(
            "StageEvents",
            ".//tmk:ProceedingEvent",
            RecurseSpec::into_level(mark_event_level()?),
        )
}

fn opposition_level() -> Result<LevelSchema, SchemaError> {
    LevelSchema::new()
        .scalar("EventType", CASE_TYPE, Transform::Normalize)?
        .scalar(
            "ProceedingSeq",
            ".//com:OppositionIdentifier/text()",
            Transform::Verbatim,
        )?
        .scalar("FilingDate", ".//com:OppositionDate/text()", Transform::Verbatim)?
        .recurse(
            "ProceedingStage",
            ".//catmk:ProceedingStage",
            RecurseSpec::into_level(stage_level()?),
        )
}

fn cancellation_level() -> Result<LevelSchema, SchemaError> {
    LevelSchema::new()
        .scalar("EventType", CASE_TYPE, Transform::Normalize)?
        .scalar(
            "ProceedingSeq",
            ".//tmk:LegalProceedingIdentifier/text()",
            Transform::Verbatim,
        )?
        .scalar(
            "FilingDate",
            ".//tmk:LegalProceedingFilingDate/text()",
            Transform::Verbatim,
        )?
        .recurse(
            "ProceedingStage",
            ".//catmk:ProceedingStage",
            RecurseSpec::into_level(stage_level()?),
        )
}

pub(crate) fn schema() -> Result<TableSchema, SchemaError> {
    let root = LevelSchema::new()
        .identifier(APPLICATION_NUMBER)?
        .recurse(
            "EventBag",
            ".//tmk:MarkEvent",
            RecurseSpec::into_level(mark_event_level()?).set("EventType", "Office Action"),
        )?
        .recurse(
            "FootnoteBag",
            ".//catmk:Footnote",
            RecurseSpec::into_level(footnote_level()?).set("EventType", "Amendment"),
        )?
        .recurse(
            "CancelBag",
            ".//tmk:CancellationProceedings",
            RecurseSpec::into_level(cancellation_level()?),
        )?
        .recurse(
            "OppBag",
            ".//tmk:OppositionProceedingBag",
            RecurseSpec::into_level(opposition_level()?),
        )?;

    Ok(TableSchema::new("allevents", HEADER, root))
}
