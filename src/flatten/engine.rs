//! The flattening engine: one compound record in, zero or more rows out.
//!
//! A single generic interpreter replaces a per-dataset hand-written control
//! flow. Each invocation scans its level's fields in declaration order,
//! accumulating scalar values, fanning out into recursive calls on matched
//! child elements (document order), and finally projecting the accumulator
//! through the fixed header list when nothing at this level recursed.
//!
//! The accumulator handed to a recursive call is always a copy; siblings at
//! the same level can never observe each other's writes.

use crate::error::RecordError;
use crate::flatten::schema::{
    FieldKind, LevelSchema, RecurseSpec, ScalarSpec, StemAction, TableSchema, ZipSpec,
    ID_SECONDARY_LEN, ID_SUFFIX_LEN,
};
use crate::flatten::transform::{decompose_date, Transform};
use crate::selector::Matched;
use crate::tree::Element;
use std::collections::BTreeMap;

/// One output row: cells in header order.
pub type Row = Vec<String>;

/// The field-value mapping threaded through a recursion path. Ordered map so
/// iteration can never introduce nondeterminism.
#[derive(Debug, Clone, Default)]
pub struct Stem {
    values: BTreeMap<String, String>,
}

impl Stem {
    pub fn new() -> Self {
        Stem::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.values.insert(field.to_string(), value.into());
    }

    pub fn clear(&mut self, field: &str) {
        self.values.remove(field);
    }
}

/// Interprets one [`TableSchema`] over compound record subtrees.
pub struct Flattener {
    schema: TableSchema,
}

impl Flattener {
    pub fn new(schema: TableSchema) -> Self {
        Flattener { schema }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn header(&self) -> &[String] {
        &self.schema.header
    }

    /// Flatten one compound record into its output rows.
    ///
    /// A missing root identifier aborts this record only; the caller skips it
    /// and continues with the next one.
    pub fn flatten(&self, record: &Element) -> Result<Vec<Row>, RecordError> {
        let mut rows = Vec::new();
        self.flatten_level(&self.schema.root, record, Stem::new(), &mut rows)?;
        Ok(rows)
    }

    fn flatten_level(
        &self,
        level: &LevelSchema,
        element: &Element,
        stem: Stem,
        rows: &mut Vec<Row>,
    ) -> Result<(), RecordError> {
        let mut acc = stem;
        let mut terminal = true;

        for field in &level.fields {
            match &field.kind {
                FieldKind::Identifier { primary, secondary } => {
                    let values = field.selector.select_values(element);
                    let raw = values.first().ok_or(RecordError::MissingIdentifier)?;
                    let (head, tail) = slice_identifier(raw)?;
                    acc = Stem::new();
                    acc.set(primary, head);
                    acc.set(secondary, tail);
                }
                FieldKind::Scalar(spec) => {
                    self.apply_scalar(spec, &field.name, &field.selector, element, &mut acc);
                }
                FieldKind::DateParts { year, month, day } => {
                    if let Some(date) = field.selector.select_values(element).first() {
                        let (y, m, d) = decompose_date(date);
                        acc.set(year, y);
                        acc.set(month, m);
                        acc.set(day, d);
                    }
                }
                FieldKind::Indicators { prefix, count } => {
                    let values = field.selector.select_values(element);
                    if !values.is_empty() {
                        let members: Vec<u32> =
                            values.iter().filter_map(|v| v.trim().parse().ok()).collect();
                        for i in 1..=*count {
                            let cell = if members.contains(&i) { "1" } else { "0" };
                            acc.set(&format!("{prefix}{i}"), cell);
                        }
                    }
                }
                FieldKind::Recurse(spec) => {
                    let children = field.selector.select_elements(element);
                    if spec.emit_before {
                        rows.push(self.project(&acc));
                    }
                    if !children.is_empty() || !spec.optional {
                        terminal = false;
                    }
                    if !children.is_empty() {
                        let branch = branch_stem(&acc, spec);
                        for child in children {
                            self.flatten_level(&spec.schema, child, branch.clone(), rows)?;
                        }
                    }
                }
            }
        }

        if let Some(zip) = &level.zip {
            self.emit_zipped(zip, element, &acc, rows);
            return Ok(());
        }

        if terminal {
            rows.push(self.project(&acc));
        }
        Ok(())
    }

    fn apply_scalar(
        &self,
        spec: &ScalarSpec,
        name: &str,
        selector: &crate::selector::Selector,
        element: &Element,
        acc: &mut Stem,
    ) {
        let matches = selector.select(element);

        // Presence is about the match set, not the matched text; element
        // matches count even though they carry no value.
        if matches!(spec.transform, Transform::Presence) {
            let cell = if matches.is_empty() { "0" } else { "1" };
            acc.set(name, cell);
            return;
        }

        let values: Vec<String> = matches
            .into_iter()
            .filter_map(|m| match m {
                Matched::Value(v) => Some(v),
                Matched::Element(_) => None,
            })
            .collect();

        if values.is_empty() {
            if let Some(carry) = &spec.carry {
                if acc.get(&carry.when) == Some(carry.equals.as_str()) {
                    if let Some(carried) = acc.get(&carry.from).map(str::to_string) {
                        acc.set(name, carried);
                        return;
                    }
                }
            }
            if let Some(default) = &spec.default {
                acc.set(name, default.clone());
            }
            return;
        }

        acc.set(name, spec.transform.apply(&values));
    }

    /// Positional zip fan-out: one row per index up to the longest list,
    /// shorter lists padded with empty cells.
    fn emit_zipped(&self, zip: &ZipSpec, element: &Element, acc: &Stem, rows: &mut Vec<Row>) {
        let lists: Vec<Vec<String>> = zip
            .fields
            .iter()
            .map(|f| {
                f.selector
                    .select_values(element)
                    .into_iter()
                    .map(|v| f.transform.apply(&[v]))
                    .collect()
            })
            .collect();

        let longest = lists.iter().map(Vec::len).max().unwrap_or(0);
        for i in 0..longest {
            let mut row_acc = acc.clone();
            if let Some(index_field) = &zip.index_field {
                row_acc.set(index_field, (i + 1).to_string());
            }
            for (field, list) in zip.fields.iter().zip(&lists) {
                row_acc.set(&field.name, list.get(i).cloned().unwrap_or_default());
            }
            rows.push(self.project(&row_acc));
        }
    }

    fn project(&self, acc: &Stem) -> Row {
        self.schema
            .header
            .iter()
            .map(|field| acc.get(field).unwrap_or_default().to_string())
            .collect()
    }
}

/// Copy the accumulator and apply the recursion edge's stem adjustments.
fn branch_stem(acc: &Stem, spec: &RecurseSpec) -> Stem {
    let mut branch = acc.clone();
    for action in &spec.actions {
        match action {
            StemAction::Set(field, value) => branch.set(field, value.clone()),
            StemAction::Append(field, suffix) => {
                let current = branch.get(field).unwrap_or_default().to_string();
                branch.set(field, format!("{current}{suffix}"));
            }
            StemAction::Clear(field) => branch.clear(field),
        }
    }
    branch
}

/// Identifier slicing: all but the trailing seven characters form the primary
/// key, the last two the secondary key.
fn slice_identifier(raw: &str) -> Result<(String, String), RecordError> {
    let raw = raw.trim();
    if !raw.is_ascii() || raw.len() < ID_SUFFIX_LEN + ID_SECONDARY_LEN {
        return Err(RecordError::MalformedIdentifier(raw.to_string()));
    }
    Ok((
        raw[..raw.len() - ID_SUFFIX_LEN].to_string(),
        raw[raw.len() - ID_SECONDARY_LEN..].to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::schema::{CarryForward, RecurseSpec, TableSchema, ZipSpec};
    use crate::ns;
    use crate::source::RecordSource;
    use std::io::Cursor;

    fn record(body: &str) -> Element {
        let xml = format!(
            r#"<tmk:TrademarkBag
                xmlns:tmk="http://www.wipo.int/standards/XMLSchema/ST96/Trademark"
                xmlns:catmk="http://www.cipo.ic.gc.ca/standards/XMLSchema/ST96/Trademark"
                xmlns:com="http://www.wipo.int/standards/XMLSchema/ST96/Common"
                xmlns:cacom="http://www.cipo.ic.gc.ca/standards/XMLSchema/ST96/Common">{body}</tmk:TrademarkBag>"#
        );
        RecordSource::from_reader(Cursor::new(xml.into_bytes()))
            .next()
            .expect("one record")
            .expect("record parses")
    }

    const APP_NO: &str =
        "<com:ApplicationNumber><com:ST13ApplicationNumber>CA5000012340101</com:ST13ApplicationNumber></com:ApplicationNumber>";

    fn id_selector() -> &'static str {
        ".//com:ApplicationNumber/com:ST13ApplicationNumber/text()"
    }

    #[test]
    fn identifier_slicing_matches_the_fixed_rule() {
        assert_eq!(
            slice_identifier("CA5000012340101").unwrap(),
            ("CA500001".to_string(), "01".to_string())
        );
        assert!(matches!(
            slice_identifier("short"),
            Err(RecordError::MalformedIdentifier(_))
        ));
    }

    #[test]
    fn non_recursive_schema_yields_one_row_per_record() {
        let level = LevelSchema::new()
            .identifier(id_selector())
            .unwrap()
            .scalar("Status", ".//tmk:MarkCurrentStatusDate/text()", Transform::Verbatim)
            .unwrap();
        let schema = TableSchema::new("t", &["AppNo", "ExtNo", "Status"], level);
        let flattener = Flattener::new(schema);

        let rows = flattener.flatten(&record(APP_NO)).unwrap();
        assert_eq!(rows, vec![vec!["CA500001", "01", ""]]);
    }

    #[test]
    fn missing_identifier_skips_the_record() {
        let level = LevelSchema::new().identifier(id_selector()).unwrap();
        let schema = TableSchema::new("t", &["AppNo", "ExtNo"], level);
        let flattener = Flattener::new(schema);

        let err = flattener.flatten(&record("<tmk:Trademark/>")).unwrap_err();
        assert!(matches!(err, RecordError::MissingIdentifier));
    }

    #[test]
    fn recursion_emits_one_row_per_matched_child() {
        let nested = LevelSchema::new()
            .scalar("Country", ".//com:PriorityCountryCode/text()", Transform::Verbatim)
            .unwrap();
        let level = LevelSchema::new()
            .identifier(id_selector())
            .unwrap()
            .recurse(
                "PriorityClaim",
                ".//tmk:Priority",
                RecurseSpec::into_level(nested),
            )
            .unwrap();
        let schema = TableSchema::new("t", &["AppNo", "ExtNo", "Country"], level);
        let flattener = Flattener::new(schema);

        let body = format!(
            "{APP_NO}\
             <tmk:Priority><com:PriorityCountryCode>US</com:PriorityCountryCode></tmk:Priority>\
             <tmk:Priority><com:PriorityCountryCode>FR</com:PriorityCountryCode></tmk:Priority>"
        );
        let rows = flattener.flatten(&record(&body)).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["CA500001", "01", "US"],
                vec!["CA500001", "01", "FR"],
            ]
        );
    }

    #[test]
    fn recursive_schema_with_no_matches_emits_nothing() {
        let nested = LevelSchema::new()
            .scalar("Country", ".//com:PriorityCountryCode/text()", Transform::Verbatim)
            .unwrap();
        let level = LevelSchema::new()
            .identifier(id_selector())
            .unwrap()
            .recurse(
                "PriorityClaim",
                ".//tmk:Priority",
                RecurseSpec::into_level(nested),
            )
            .unwrap();
        let schema = TableSchema::new("t", &["AppNo", "ExtNo", "Country"], level);
        let flattener = Flattener::new(schema);

        let rows = flattener.flatten(&record(APP_NO)).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn sibling_recursions_cannot_see_each_others_writes() {
        let nested = LevelSchema::new()
            .scalar_sticky("Secret", ".//com:CommentText/text()", Transform::Verbatim)
            .unwrap();
        let level = LevelSchema::new()
            .identifier(id_selector())
            .unwrap()
            .recurse("Claim", ".//catmk:Claim", RecurseSpec::into_level(nested))
            .unwrap();
        let schema = TableSchema::new("t", &["AppNo", "ExtNo", "Secret"], level);
        let flattener = Flattener::new(schema);

        // Only the first sibling carries the field; sticky scalars leave the
        // stem untouched on no match, so aliasing would leak it into row two.
        let body = format!(
            "{APP_NO}\
             <catmk:Claim><com:CommentText>first-only</com:CommentText></catmk:Claim>\
             <catmk:Claim/>"
        );
        let rows = flattener.flatten(&record(&body)).unwrap();
        assert_eq!(rows[0][2], "first-only");
        assert_eq!(rows[1][2], "");
    }

    #[test]
    fn zip_fan_out_pads_shorter_lists() {
        let zip = ZipSpec::new()
            .field("Class", ".//tmk:ClassNumber/text()", Transform::Verbatim)
            .unwrap()
            .field(
                "Seq",
                ".//tmk:GoodsServicesDescriptionText/@com:sequenceNumber",
                Transform::Verbatim,
            )
            .unwrap()
            .field(
                "Desc",
                ".//tmk:GoodsServicesDescriptionText/text()",
                Transform::Normalize,
            )
            .unwrap();
        let level = LevelSchema::new().identifier(id_selector()).unwrap().zipped(zip);
        let schema = TableSchema::new("t", &["AppNo", "ExtNo", "Class", "Seq", "Desc"], level);
        let flattener = Flattener::new(schema);

        let body = format!(
            "{APP_NO}\
             <tmk:ClassNumber>9</tmk:ClassNumber>\
             <tmk:ClassNumber>16</tmk:ClassNumber>\
             <tmk:ClassNumber>25</tmk:ClassNumber>\
             <tmk:GoodsServicesDescriptionText com:sequenceNumber=\"1\">computers</tmk:GoodsServicesDescriptionText>\
             <tmk:GoodsServicesDescriptionText com:sequenceNumber=\"2\">paper  goods</tmk:GoodsServicesDescriptionText>"
        );
        let rows = flattener.flatten(&record(&body)).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["CA500001", "01", "9", "1", "computers"]);
        assert_eq!(rows[1], vec!["CA500001", "01", "16", "2", "paper goods"]);
        assert_eq!(rows[2], vec!["CA500001", "01", "25", "", ""]);
    }

    #[test]
    fn zip_with_no_matches_emits_no_rows() {
        let zip = ZipSpec::new()
            .field("Class", ".//tmk:ClassNumber/text()", Transform::Verbatim)
            .unwrap();
        let level = LevelSchema::new().identifier(id_selector()).unwrap().zipped(zip);
        let schema = TableSchema::new("t", &["AppNo", "ExtNo", "Class"], level);
        let flattener = Flattener::new(schema);

        assert!(flattener.flatten(&record(APP_NO)).unwrap().is_empty());
    }

    #[test]
    fn carry_forward_fills_missing_date_on_trigger() {
        let nested = LevelSchema::new()
            .scalar("FilingDate", ".//cacom:RegisteredDate/text()", Transform::Verbatim)
            .unwrap()
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
            .unwrap();
        let level = LevelSchema::new()
            .identifier(id_selector())
            .unwrap()
            .recurse(
                "FootnoteBag",
                ".//catmk:Footnote",
                RecurseSpec::into_level(nested).set("EventType", "Amendment"),
            )
            .unwrap();
        let schema = TableSchema::new(
            "t",
            &["AppNo", "ExtNo", "EventType", "FilingDate", "EventDate"],
            level,
        );
        let flattener = Flattener::new(schema);

        let body = format!(
            "{APP_NO}\
             <catmk:Footnote><cacom:RegisteredDate>2018-05-04</cacom:RegisteredDate></catmk:Footnote>"
        );
        let rows = flattener.flatten(&record(&body)).unwrap();
        assert_eq!(
            rows,
            vec![vec!["CA500001", "01", "Amendment", "2018-05-04", "2018-05-04"]]
        );
    }

    #[test]
    fn emit_before_writes_the_parent_row_first() {
        let rep_level = LevelSchema::new()
            .scalar("PartyName", ".//com:EntityName/text()", Transform::Normalize)
            .unwrap();
        let party_level = LevelSchema::new()
            .scalar("PartyName", "./com:Contact/com:Name/com:EntityName/text()", Transform::Normalize)
            .unwrap()
            .recurse(
                "Representative",
                ".//com:Representative",
                RecurseSpec::into_level(rep_level)
                    .emit_before()
                    .append("PartyType", "'s Representative"),
            )
            .unwrap();
        let level = LevelSchema::new()
            .identifier(id_selector())
            .unwrap()
            .recurse(
                "Plaintiff",
                ".//tmk:Plaintiff",
                RecurseSpec::into_level(party_level).set("PartyType", "Plaintiff"),
            )
            .unwrap();
        let schema = TableSchema::new("t", &["AppNo", "ExtNo", "PartyType", "PartyName"], level);
        let flattener = Flattener::new(schema);

        let body = format!(
            "{APP_NO}\
             <tmk:Plaintiff>\
               <com:Contact><com:Name><com:EntityName>Acme Ltd</com:EntityName></com:Name></com:Contact>\
               <com:Representative>\
                 <com:EntityName>Smith &amp; Jones LLP</com:EntityName>\
               </com:Representative>\
             </tmk:Plaintiff>"
        );
        let rows = flattener.flatten(&record(&body)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["CA500001", "01", "Plaintiff", "Acme Ltd"]);
        assert_eq!(
            rows[1],
            vec!["CA500001", "01", "Plaintiff's Representative", "Smith & Jones LLP"]
        );
    }

    #[test]
    fn optional_recursion_only_blocks_emission_when_matched() {
        let date_level = LevelSchema::new()
            .scalar_sticky("Year", ".//catmk:ClaimYear/text()", Transform::Verbatim)
            .unwrap();
        let claim_level = LevelSchema::new()
            .scalar("ClaimCode", ".//catmk:ClaimCode/text()", Transform::Verbatim)
            .unwrap()
            .recurse(
                "PartialDate",
                ".//catmk:UnstructuredClaimDate",
                RecurseSpec::into_level(date_level).optional(),
            )
            .unwrap();
        let level = LevelSchema::new()
            .identifier(id_selector())
            .unwrap()
            .recurse("Claim", ".//catmk:Claim", RecurseSpec::into_level(claim_level))
            .unwrap();
        let schema = TableSchema::new("t", &["AppNo", "ExtNo", "ClaimCode", "Year"], level);
        let flattener = Flattener::new(schema);

        let body = format!(
            "{APP_NO}\
             <catmk:Claim><catmk:ClaimCode>2</catmk:ClaimCode></catmk:Claim>\
             <catmk:Claim>\
               <catmk:ClaimCode>5</catmk:ClaimCode>\
               <catmk:UnstructuredClaimDate><catmk:ClaimYear>1999</catmk:ClaimYear></catmk:UnstructuredClaimDate>\
             </catmk:Claim>"
        );
        let rows = flattener.flatten(&record(&body)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["CA500001", "01", "2", ""]);
        assert_eq!(rows[1], vec!["CA500001", "01", "5", "1999"]);
    }

    #[test]
    fn indicator_columns_cover_the_declared_range() {
        let level = LevelSchema::new()
            .identifier(id_selector())
            .unwrap()
            .field(
                "Classes",
                ".//tmk:GoodsServicesClassification/tmk:ClassNumber/text()",
                FieldKind::Indicators {
                    prefix: "IC".to_string(),
                    count: 5,
                },
            )
            .unwrap();
        let schema = TableSchema::new(
            "t",
            &["AppNo", "ExtNo", "IC1", "IC2", "IC3", "IC4", "IC5"],
            level,
        );
        let flattener = Flattener::new(schema);

        let body = format!(
            "{APP_NO}\
             <tmk:GoodsServicesClassification><tmk:ClassNumber>2</tmk:ClassNumber>\
             <tmk:ClassNumber>5</tmk:ClassNumber></tmk:GoodsServicesClassification>"
        );
        let rows = flattener.flatten(&record(&body)).unwrap();
        assert_eq!(rows, vec![vec!["CA500001", "01", "0", "1", "0", "0", "1"]]);

        // No classes at all leaves the indicator cells empty, not zero.
        let rows = flattener.flatten(&record(APP_NO)).unwrap();
        assert_eq!(rows, vec![vec!["CA500001", "01", "", "", "", "", ""]]);
    }

    #[test]
    fn flattening_is_deterministic() {
        let level = LevelSchema::new()
            .identifier(id_selector())
            .unwrap()
            .scalar("Text", ".//tmk:MarkDescriptionText/text()", Transform::Normalize)
            .unwrap()
            .scalar("Oppn", ".//tmk:OppositionProceedingBag", Transform::Presence)
            .unwrap();
        let schema = TableSchema::new("t", &["AppNo", "ExtNo", "Text", "Oppn"], level);
        let flattener = Flattener::new(schema);

        let body = format!("{APP_NO}<tmk:MarkDescriptionText>a  mark</tmk:MarkDescriptionText>");
        let first = flattener.flatten(&record(&body)).unwrap();
        let second = flattener.flatten(&record(&body)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0][3], "0");
    }
}
