//! Declarative extraction schemas.
//!
//! A schema is pure data: the engine interprets it, it has no behavior of its
//! own. Construction compiles every selector against the fixed namespace
//! bindings and fails fast on the first bad one, so a schema that exists is a
//! schema that runs.

use crate::error::SchemaError;
use crate::flatten::transform::Transform;
use crate::selector::Selector;

/// Number of characters trimmed off the end of the matched identifier string
/// to form the primary key.
pub const ID_SUFFIX_LEN: usize = 7;

/// Width of the secondary key taken from the end of the identifier string.
pub const ID_SECONDARY_LEN: usize = 2;

/// One extraction rule: an output field name, a selector scoped to the
/// current element, and what to do with the matches.
#[derive(Debug)]
pub struct FieldSpec {
    pub name: String,
    pub selector: Selector,
    pub kind: FieldKind,
}

#[derive(Debug)]
pub enum FieldKind {
    /// The application identifier pair. Root-level only; resets the
    /// accumulator. `primary` takes all but the last [`ID_SUFFIX_LEN`]
    /// characters of the matched string, `secondary` the last
    /// [`ID_SECONDARY_LEN`].
    Identifier { primary: String, secondary: String },

    /// A plain cell value.
    Scalar(ScalarSpec),

    /// Structured date split into three accumulator fields, leading zeros
    /// preserved as text.
    DateParts {
        year: String,
        month: String,
        day: String,
    },

    /// Multi-valued numeric match set expanded into `prefix1..prefixN`
    /// membership columns ("1"/"0"). Zero matches leave every column absent.
    Indicators { prefix: String, count: u32 },

    /// Fan out into one recursive call per matched child element.
    Recurse(RecurseSpec),
}

#[derive(Debug)]
pub struct ScalarSpec {
    pub transform: Transform,
    /// Cell value when the selector has no match and no carry-forward
    /// applies. `None` leaves the accumulator untouched, so a value inherited
    /// from the stem survives.
    pub default: Option<String>,
    pub carry: Option<CarryForward>,
}

/// Back-fill a missing value from a previously accumulated sibling value,
/// gated on another accumulator field holding a trigger value.
#[derive(Debug)]
pub struct CarryForward {
    /// Field whose value is copied in.
    pub from: String,
    /// Field inspected for the trigger.
    pub when: String,
    /// Trigger value that enables the carry.
    pub equals: String,
}

#[derive(Debug)]
pub struct RecurseSpec {
    pub schema: LevelSchema,
    /// Stem adjustments applied to the copy passed down, never to the
    /// current level's accumulator.
    pub actions: Vec<StemAction>,
    /// Project the current accumulator into a row before recursing
    /// (representative fan-outs emit the represented party first).
    pub emit_before: bool,
    /// An optional recursion forbids terminal emission at its level only
    /// when it matched at least once. A non-optional one always forbids it.
    pub optional: bool,
}

/// Adjustment applied to the stem copy handed to a recursive call.
#[derive(Debug)]
pub enum StemAction {
    Set(String, String),
    /// Append a suffix to an existing field value (missing treated as empty).
    Append(String, String),
    Clear(String),
}

/// Positionally-independent multi-valued fields zipped into rows of equal
/// length, shorter lists padded with empty cells. Replaces terminal emission
/// at its level; all-empty lists yield zero rows.
#[derive(Debug)]
pub struct ZipSpec {
    /// Optional 1-based sequence column emitted alongside the zipped fields.
    pub index_field: Option<String>,
    pub fields: Vec<ZipField>,
}

#[derive(Debug)]
pub struct ZipField {
    pub name: String,
    pub selector: Selector,
    /// Applied to each list item individually.
    pub transform: Transform,
}

/// The ordered extraction rules applicable at one nesting depth.
#[derive(Debug, Default)]
pub struct LevelSchema {
    pub fields: Vec<FieldSpec>,
    pub zip: Option<ZipSpec>,
}

/// A complete dataset: name, fixed header order, and the root level.
#[derive(Debug)]
pub struct TableSchema {
    pub name: String,
    pub header: Vec<String>,
    pub root: LevelSchema,
}

impl LevelSchema {
    pub fn new() -> Self {
        LevelSchema::default()
    }

    pub fn field(
        mut self,
        name: &str,
        selector: &str,
        kind: FieldKind,
    ) -> Result<Self, SchemaError> {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            selector: Selector::compile(selector)?,
            kind,
        });
        Ok(self)
    }

    /// Identifier field pair under the conventional column names.
    pub fn identifier(self, selector: &str) -> Result<Self, SchemaError> {
        self.field(
            "AppNo",
            selector,
            FieldKind::Identifier {
                primary: "AppNo".to_string(),
                secondary: "ExtNo".to_string(),
            },
        )
    }

    pub fn scalar(self, name: &str, selector: &str, transform: Transform) -> Result<Self, SchemaError> {
        self.field(
            name,
            selector,
            FieldKind::Scalar(ScalarSpec {
                transform,
                default: Some(String::new()),
                carry: None,
            }),
        )
    }

    /// Scalar whose absence leaves the accumulator untouched instead of
    /// writing a default (structured date components).
    pub fn scalar_sticky(
        self,
        name: &str,
        selector: &str,
        transform: Transform,
    ) -> Result<Self, SchemaError> {
        self.field(
            name,
            selector,
            FieldKind::Scalar(ScalarSpec {
                transform,
                default: None,
                carry: None,
            }),
        )
    }

    pub fn scalar_with_default(
        self,
        name: &str,
        selector: &str,
        transform: Transform,
        default: &str,
    ) -> Result<Self, SchemaError> {
        self.field(
            name,
            selector,
            FieldKind::Scalar(ScalarSpec {
                transform,
                default: Some(default.to_string()),
                carry: None,
            }),
        )
    }

    pub fn scalar_with_carry(
        self,
        name: &str,
        selector: &str,
        transform: Transform,
        carry: CarryForward,
    ) -> Result<Self, SchemaError> {
        self.field(
            name,
            selector,
            FieldKind::Scalar(ScalarSpec {
                transform,
                default: Some(String::new()),
                carry: Some(carry),
            }),
        )
    }

    pub fn recurse(self, name: &str, selector: &str, spec: RecurseSpec) -> Result<Self, SchemaError> {
        self.field(name, selector, FieldKind::Recurse(spec))
    }

    pub fn zipped(mut self, zip: ZipSpec) -> Self {
        self.zip = Some(zip);
        self
    }
}

impl RecurseSpec {
    pub fn into_level(schema: LevelSchema) -> Self {
        RecurseSpec {
            schema,
            actions: Vec::new(),
            emit_before: false,
            optional: false,
        }
    }

    pub fn set(mut self, field: &str, value: &str) -> Self {
        self.actions
            .push(StemAction::Set(field.to_string(), value.to_string()));
        self
    }

    pub fn append(mut self, field: &str, suffix: &str) -> Self {
        self.actions
            .push(StemAction::Append(field.to_string(), suffix.to_string()));
        self
    }

    pub fn clear(mut self, field: &str) -> Self {
        self.actions.push(StemAction::Clear(field.to_string()));
        self
    }

    pub fn emit_before(mut self) -> Self {
        self.emit_before = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl ZipSpec {
    pub fn new() -> Self {
        ZipSpec {
            index_field: None,
            fields: Vec::new(),
        }
    }

    pub fn indexed(mut self, field: &str) -> Self {
        self.index_field = Some(field.to_string());
        self
    }

    pub fn field(
        mut self,
        name: &str,
        selector: &str,
        transform: Transform,
    ) -> Result<Self, SchemaError> {
        self.fields.push(ZipField {
            name: name.to_string(),
            selector: Selector::compile(selector)?,
            transform,
        });
        Ok(self)
    }
}

impl Default for ZipSpec {
    fn default() -> Self {
        Self::new()
    }
}

impl TableSchema {
    pub fn new(name: &str, header: &[&str], root: LevelSchema) -> Self {
        TableSchema {
            name: name.to_string(),
            header: header.iter().map(|h| h.to_string()).collect(),
            root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_selector_fails_at_construction() {
        let result = LevelSchema::new().scalar(
            "Broken",
            ".//nope:Element/text()",
            Transform::Verbatim,
        );
        assert!(matches!(result, Err(SchemaError::UnknownPrefix { .. })));
    }

    #[test]
    fn builder_preserves_declaration_order() {
        let level = LevelSchema::new()
            .identifier(".//com:ST13ApplicationNumber/text()")
            .unwrap()
            .scalar("B", ".//tmk:B/text()", Transform::Verbatim)
            .unwrap()
            .scalar("C", ".//tmk:C/text()", Transform::Verbatim)
            .unwrap();
        let names: Vec<&str> = level.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["AppNo", "B", "C"]);
    }
}
