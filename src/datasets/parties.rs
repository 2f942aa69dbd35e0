//! One row per party touching an application: current owners and their
//! representatives, opposition and cancellation litigants and *their*
//! representatives, and interested parties. The party role is injected into
//! the stem at each recursion edge; litigant rows are emitted before
//! descending into the representative, whose address replaces the litigant's.

use super::APPLICATION_NUMBER;
use crate::error::SchemaError;
use crate::flatten::{LevelSchema, RecurseSpec, TableSchema, Transform};

const HEADER: &[&str] = &[
    "AppNo",
    "ExtNo",
    "PartyType",
    "AgentCode",
    "ProceedingType",
    "ProceedingSeq",
    "PartyName",
    "Address",
    "Province",
    "Country",
    "PostCode",
];

const CASE_TYPE: &str = ".//catmk:OppositionCaseTypeDescription[@com:languageCode=\"en\"]/text()";

/// Contact fields shared by every party level. Selectors are anchored with
/// `./` so a litigant's fields never bleed in from an embedded representative.
fn contact_fields(level: LevelSchema) -> Result<LevelSchema, SchemaError> {
    level
        .scalar(
            "PartyName",
            "./com:Contact/com:Name/com:EntityName/text()",
            Transform::Normalize,
        )?
        .scalar("AgentCode", "./com:CommentText/text()", Transform::Normalize)?
        .scalar(
            "Address",
            "./com:Contact/com:PostalAddressBag//com:AddressLineText/text()",
            Transform::Normalize,
        )?
        .scalar(
            "Province",
            "./com:Contact/com:PostalAddressBag//com:GeographicRegionName/text()",
            Transform::Normalize,
        )?
        .scalar(
            "Country",
            "./com:Contact/com:PostalAddressBag//com:CountryCode/text()",
            Transform::Normalize,
        )?
        .scalar(
            "PostCode",
            "./com:Contact/com:PostalAddressBag//com:PostalCode/text()",
            Transform::Normalize,
        )
}

fn party_level() -> Result<LevelSchema, SchemaError> {
    contact_fields(LevelSchema::new())
}

/// A plaintiff or defendant: its own row first, then one row per
/// representative with the role suffixed and the litigant's address cleared.
fn litigant_level() -> Result<LevelSchema, SchemaError> {
    contact_fields(LevelSchema::new())?.recurse(
        "Representative",
        ".//com:Representative",
        RecurseSpec::into_level(party_level()?)
            .emit_before()
            .append("PartyType", "'s Representative")
            .clear("Address")
            .clear("Province")
            .clear("Country")
            .clear("PostCode"),
    )
}

fn proceeding_level(seq_selector: &str) -> Result<LevelSchema, SchemaError> {
    LevelSchema::new()
        .scalar("ProceedingType", CASE_TYPE, Transform::Normalize)?
        .scalar("ProceedingSeq", seq_selector, Transform::Verbatim)?
        .recurse(
            "Plaintiff",
            ".//tmk:Plaintiff",
            RecurseSpec::into_level(litigant_level()?).set("PartyType", "Plaintiff"),
        )?
        .recurse(
            "Defendant",
            ".//tmk:Defendant",
            RecurseSpec::into_level(litigant_level()?).set("PartyType", "Defendant"),
        )
}

fn interested_level() -> Result<LevelSchema, SchemaError> {
    contact_fields(
        LevelSchema::new().scalar(
            "PartyType",
            ".//catmk:InterestedPartyCategory/text()",
            Transform::Normalize,
        )?,
    )
}

pub(crate) fn schema() -> Result<TableSchema, SchemaError> {
    let root = LevelSchema::new()
        .identifier(APPLICATION_NUMBER)?
        .recurse(
            "ApplicantBag",
            ".//tmk:Applicant",
            RecurseSpec::into_level(party_level()?).set("PartyType", "Current Owner"),
        )?
        .recurse(
            "RepBag",
            ".//tmk:NationalRepresentative",
            RecurseSpec::into_level(party_level()?)
                .set("PartyType", "Current Owner's Representative"),
        )?
        .recurse(
            "OppBag",
            ".//tmk:OppositionProceedingBag",
            RecurseSpec::into_level(proceeding_level(".//com:OppositionIdentifier/text()")?),
        )?
        .recurse(
            "CancelBag",
            ".//tmk:CancellationProceedings",
            RecurseSpec::into_level(proceeding_level(
                ".//tmk:LegalProceedingIdentifier/text()",
            )?),
        )?
        .recurse(
            "Interested",
            ".//catmk:InterestedParty",
            RecurseSpec::into_level(interested_level()?)
                .clear("ProceedingType")
                .clear("ProceedingSeq"),
        )?;

    Ok(TableSchema::new("parties", HEADER, root))
}
