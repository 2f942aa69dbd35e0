//! One row per application: mark text, registration identifiers, status and
//! lifecycle dates, basis indicators, owner name, and the Section 9 /
//! geographical-indication code columns with their description lookups.

use super::APPLICATION_NUMBER;
use crate::error::SchemaError;
use crate::flatten::{CodeTable, LevelSchema, TableSchema, Transform};

/// Trademarks Act Section 9 paragraph descriptors, keyed by CIPO code.
const SECTION9: CodeTable = &[
    ("1", "Paragraph 9(1)(e) - Government Flags"),
    ("2", "Subparagraph 9(1)(n)(i) - Her Majesties Forces"),
    ("3", "Subparagraph 9(1)(n)(ii) - Universities"),
    (
        "4",
        "Subparagraph 9(1)(n)(iii) - Public Authorities in Canada for specific goods and services",
    ),
    ("5", "Paragraph 9(1)(n.1) - Armorial Emblems"),
    (
        "6",
        "Paragraph 9(1)(i) - Foreign Government Flags and Symbols and 6ter applications",
    ),
    ("7", "Paragraph 9(1)(i.1) - 6ter - Official Sign or Hallmark"),
    (
        "8",
        "Paragraph 9(1)(i.3) - 6ter - Armorial Bearing/Emblem or Abbreviation of Name",
    ),
    (
        "9",
        "Paragraph 9(1)(i.2) - 6ter - National Flag of a Country of the Union",
    ),
];

/// Geographical indication kinds, keyed by category code.
const GI_KINDS: CodeTable = &[
    ("1", "Wine"),
    ("2", "Spirits"),
    ("3", "Agricultural Product or Food"),
];

const HEADER: &[&str] = &[
    "AppNo",
    "ExtNo",
    "TMText",
    "TMDesc",
    "RegNo",
    "MadridNo",
    "MarkType",
    "MarkClassCode",
    "MarkClassDesc",
    "LegisCode",
    "LegisDesc",
    "StanChar",
    "CurrStatus",
    "StatusDate",
    "AppDate",
    "PubDate",
    "AllowDate",
    "AbanDate",
    "RegDate",
    "Canceln",
    "Oppn",
    "Doubtful",
    "RenewedDate",
    "TermDate",
    "AcquiredDist",
    "ForeignAppBasis",
    "ForeignRegBasis",
    "UseBasis",
    "ITUBasis",
    "NoBasis",
    "UseEvid",
    "NonUse",
    "Disclaimer",
    "Restriction",
    "OwnerName",
    "Section9Code",
    "Section9Desc",
    "GICode",
    "GIDesc",
];

pub(crate) fn schema() -> Result<TableSchema, SchemaError> {
    let root = LevelSchema::new()
        .identifier(APPLICATION_NUMBER)?
        .scalar(
            "TMText",
            ".//tmk:MarkSignificantVerbalElementText/text()",
            Transform::Normalize,
        )?
        .scalar("TMDesc", ".//tmk:MarkDescriptionText/text()", Transform::Normalize)?
        .scalar(
            "RegNo",
            ".//tmk:Trademark/com:RegistrationNumber/text()",
            Transform::Digits,
        )?
        .scalar(
            "MadridNo",
            ".//tmk:InternationalMarkIdentifier/text()",
            Transform::Normalize,
        )?
        .scalar(
            "MarkType",
            ".//tmk:MarkRepresentation/tmk:MarkFeatureCategory/text()",
            Transform::Normalize,
        )?
        .scalar(
            "MarkClassCode",
            ".//catmk:TrademarkClassCode/text()",
            Transform::Normalize,
        )?
        .scalar(
            "MarkClassDesc",
            ".//catmk:TrademarkClassDescription[@com:languageCode=\"en\"]/text()",
            Transform::Normalize,
        )?
        .scalar("LegisCode", ".//catmk:LegislationCode/text()", Transform::Normalize)?
        .scalar(
            "LegisDesc",
            ".//catmk:LegislationDescription[@com:languageCode=\"en\"]/text()",
            Transform::Normalize,
        )?
        .scalar_with_default(
            "StanChar",
            ".//tmk:MarkStandardCharacterIndicator/text()",
            Transform::TrueFalse,
            "0",
        )?
        .scalar(
            "CurrStatus",
            ".//tmk:MarkCurrentStatusInternalDescriptionText/text()",
            Transform::Normalize,
        )?
        .scalar(
            "StatusDate",
            ".//tmk:MarkCurrentStatusDate/text()",
            Transform::Normalize,
        )?
        .scalar("AppDate", ".//com:ApplicationDate/text()", Transform::Normalize)?
        .scalar(
            "PubDate",
            ".//tmk:PublicationActionDate/text()",
            Transform::Normalize,
        )?
        .scalar("AllowDate", ".//catmk:AllowedDate/text()", Transform::Normalize)?
        .scalar(
            "AbanDate",
            ".//tmk:ApplicationAbandonedDate/text()",
            Transform::Normalize,
        )?
        .scalar("RegDate", ".//com:RegistrationDate/text()", Transform::Normalize)?
        .scalar("Canceln", ".//tmk:CancellationProceedings", Transform::Presence)?
        .scalar("Oppn", ".//tmk:OppositionProceedingBag", Transform::Presence)?
        .scalar("Doubtful", ".//catmk:DoubtfulCaseBag", Transform::Presence)?
        .scalar("RenewedDate", ".//com:RenewalDate/text()", Transform::Normalize)?
        // the CIPO data dictionary lists this element under com, the data
        // itself qualifies it as tmk
        .scalar("TermDate", ".//tmk:TerminationDate/text()", Transform::Normalize)?
        .scalar(
            "AcquiredDist",
            ".//tmk:TradeDistinctivenessIndicator/text()",
            Transform::TrueFalse,
        )?
        .scalar(
            "ForeignAppBasis",
            ".//tmk:BasisForeignApplicationIndicator/text()",
            Transform::TrueFalse,
        )?
        .scalar(
            "ForeignRegBasis",
            ".//tmk:BasisForeignRegistrationIndicator/text()",
            Transform::TrueFalse,
        )?
        .scalar("UseBasis", ".//tmk:BasisUseIndicator/text()", Transform::TrueFalse)?
        .scalar(
            "ITUBasis",
            ".//tmk:BasisIntentToUseIndicator/text()",
            Transform::TrueFalse,
        )?
        .scalar_with_default(
            "NoBasis",
            ".//tmk:NoBasisIndicator/text()",
            Transform::TrueFalse,
            "0",
        )?
        .scalar("UseEvid", ".//tmk:UseRightIndicator/text()", Transform::TrueFalse)?
        .scalar(
            "NonUse",
            ".//tmk:NonUseCancelledIndicator/text()",
            Transform::TrueFalse,
        )?
        .scalar("Disclaimer", ".//tmk:MarkDisclaimerText/text()", Transform::Presence)?
        .scalar("Restriction", ".//tmk:UseLimitationText/text()", Transform::Presence)?
        .scalar(
            "OwnerName",
            ".//tmk:ApplicantBag/tmk:Applicant/com:LegalEntityName/text()",
            Transform::Normalize,
        )?
        .scalar("Section9Code", ".//catmk:Section9Code/text()", Transform::Verbatim)?
        .scalar(
            "Section9Desc",
            ".//catmk:Section9Code/text()",
            Transform::Lookup(SECTION9),
        )?
        .scalar(
            "GICode",
            ".//catmk:GeographicalIndicationKindCategory/cacom:CategoryCode/text()",
            Transform::Verbatim,
        )?
        .scalar(
            "GIDesc",
            ".//catmk:GeographicalIndicationKindCategory/cacom:CategoryCode/text()",
            Transform::Lookup(GI_KINDS),
        )?;

    Ok(TableSchema::new("main", HEADER, root))
}
