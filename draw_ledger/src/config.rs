// ********* Input data structures ***********

use snafu::prelude::*;
use std::fmt::Display;
use std::hash::{Hash, Hasher};

// Forces a delimited text field to be read as text.
const TEXT_MARKER: char = '\'';

/// A single cell of a participant row.
///
/// Equality and hashing are structural. Floating point values compare by their
/// bit pattern so that rows can be used as keys of a hash set.
#[derive(Debug, Clone)]
pub enum Value {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Value {
    /// Reads a value from its textual form.
    ///
    /// A typed value is only inferred when the text is exactly the canonical
    /// form of that value (see [`Value::to_text`]). Anything else stays text,
    /// so that identifiers such as `007` or `+33 1 23` are never rewritten.
    ///
    /// A leading apostrophe forces text, as in spreadsheet programs: `'42` is
    /// the text `42`. [`Value::to_field`] writes text that way when it would
    /// otherwise read back as another type.
    pub fn from_text(s: &str) -> Value {
        if let Some(quoted) = s.strip_prefix(TEXT_MARKER) {
            if !quoted.is_empty() {
                return Value::Text(quoted.to_string());
            }
        }
        Value::infer(s)
    }

    fn infer(s: &str) -> Value {
        if s.is_empty() {
            return Value::Empty;
        }
        if let Ok(i) = s.parse::<i64>() {
            if i.to_string() == s {
                return Value::Int(i);
            }
        }
        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() && format!("{:?}", f) == s {
                return Value::Float(f);
            }
        }
        match s {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::Text(s.to_string()),
        }
    }

    /// The canonical textual form, as written in delimited text exports.
    pub fn to_text(&self) -> String {
        match self {
            Value::Empty => String::new(),
            Value::Text(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            // Debug keeps the fractional part (3.0), Display would not.
            Value::Float(f) => format!("{:?}", f),
            Value::Bool(b) => b.to_string(),
        }
    }

    /// The form written in a delimited text field, which
    /// [`Value::from_text`] reads back to the same value.
    pub fn to_field(&self) -> String {
        match self {
            Value::Text(s) if s.starts_with(TEXT_MARKER) || Value::infer(s) != *self => {
                format!("{}{}", TEXT_MARKER, s)
            }
            v => v.to_text(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Empty, Value::Empty) => true,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Empty => {}
            Value::Text(s) => s.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        if s.is_empty() {
            Value::Empty
        } else {
            Value::Text(s.to_string())
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        if s.is_empty() {
            Value::Empty
        } else {
            Value::Text(s)
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Value {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Value {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

/// The ordered column names shared by every row of a participant set.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Schema {
    columns: Vec<String>,
}

impl Schema {
    pub fn new(columns: &[String]) -> Result<Schema, DrawErrors> {
        ensure!(!columns.is_empty(), EmptySchemaSnafu);
        Ok(Schema {
            columns: columns.to_vec(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

/// One participant record.
///
/// The values are stored in schema order. Two rows are the same participant
/// when all their values are equal, there is no other notion of identity.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Row {
        Row { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn get_by_name(&self, schema: &Schema, column: &str) -> Option<&Value> {
        schema.index_of(column).and_then(|idx| self.values.get(idx))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_text_record(&self) -> Vec<String> {
        self.values.iter().map(|v| v.to_field()).collect()
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Row {
        Row {
            values: iter.into_iter().collect(),
        }
    }
}

/// The label of a draw.
///
/// Free-text draw names and numbered rounds are the same thing: a batch label
/// attached to every winner of the batch. The name is stored trimmed and is
/// never blank.
#[derive(Eq, PartialEq, Debug, Clone, Hash, PartialOrd, Ord)]
pub struct DrawName(String);

impl DrawName {
    pub fn new(name: &str) -> Result<DrawName, DrawErrors> {
        let trimmed = name.trim();
        ensure!(!trimmed.is_empty(), BlankDrawNameSnafu);
        Ok(DrawName(trimmed.to_string()))
    }

    /// The label of a numbered round. Rounds are zero-padded so that sorting
    /// the labels keeps the numeric order.
    pub fn round(num_round: u32) -> DrawName {
        DrawName(format!("Round {:03}", num_round))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for DrawName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A request for one draw.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DrawRequest {
    pub name: DrawName,
    pub count: usize,
    /// Removes the rows already present in the ledger from the pool.
    pub exclude_previous: bool,
}

// ******** Output data structures *********

/// One winner, tagged with the draw that selected it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LedgerEntry {
    pub draw: DrawName,
    pub row: Row,
}

/// The outcome of one successful draw.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Draw {
    pub name: DrawName,
    /// In selection order, which carries no meaning.
    pub winners: Vec<Row>,
    /// The size of the eligible pool the winners were drawn from.
    pub pool_size: usize,
    pub pool: Pool,
}

/// Which pool a draw was made from.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Pool {
    /// Every participant.
    Everyone,
    /// The participants left after removing all the previous winners.
    ExcludingPrevious,
    /// Rows chosen by the caller, with no information on how.
    Given,
}

impl Display for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pool::Everyone => write!(f, "participants are available"),
            Pool::ExcludingPrevious => {
                write!(f, "participants remain after excluding previous winners")
            }
            Pool::Given => write!(f, "rows are in the pool"),
        }
    }
}

/// Errors that prevent a draw from completing.
///
/// None of them leaves a partial draw behind: the ledger is untouched when an
/// error is returned.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DrawErrors {
    #[snafu(display("the draw name must not be blank"))]
    BlankDrawName {},
    #[snafu(display("the number of winners must be at least 1"))]
    ZeroCount {},
    #[snafu(display("a draw must record at least one winner"))]
    EmptyDraw {},
    #[snafu(display("cannot draw {requested} winners: only {available} {pool}"))]
    Capacity {
        requested: usize,
        available: usize,
        pool: Pool,
    },
    #[snafu(display("a participant table needs at least one column"))]
    EmptySchema {},
    #[snafu(display("row {row} has {found} values but the table has {expected} columns"))]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[snafu(display("cannot combine participant tables with columns {expected:?} and {found:?}"))]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl DrawErrors {
    /// True for the errors caused by the size of the pool, as opposed to
    /// malformed input.
    pub fn is_capacity(&self) -> bool {
        matches!(self, DrawErrors::Capacity { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_text_is_inferred() {
        assert_eq!(Value::from_text(""), Value::Empty);
        assert_eq!(Value::from_text("42"), Value::Int(42));
        assert_eq!(Value::from_text("-7"), Value::Int(-7));
        assert_eq!(Value::from_text("2.5"), Value::Float(2.5));
        assert_eq!(Value::from_text("3.0"), Value::Float(3.0));
        assert_eq!(Value::from_text("true"), Value::Bool(true));
        assert_eq!(Value::from_text("Alice"), Value::Text("Alice".to_string()));
    }

    #[test]
    fn non_canonical_text_stays_text() {
        for s in ["007", "+1", "1e3", "3.50", "NaN", "inf", "True", " 4"] {
            assert_eq!(Value::from_text(s), Value::Text(s.to_string()), "{}", s);
        }
    }

    #[test]
    fn ambiguous_text_is_marked() {
        for s in ["42", "true", "3.0", "'quoted"] {
            let v = Value::Text(s.to_string());
            let field = v.to_field();
            assert_eq!(field, format!("'{}", s));
            assert_eq!(Value::from_text(&field), v, "{}", s);
        }
        assert_eq!(Value::from("Alice").to_field(), "Alice");
        assert_eq!(Value::Int(42).to_field(), "42");
        assert_eq!(Value::from_text("'"), Value::from("'"));
        assert_eq!(Value::from("'").to_field(), "''");
    }

    #[test]
    fn floats_keep_their_fraction() {
        assert_eq!(Value::Float(3.0).to_text(), "3.0");
        assert_eq!(Value::Int(3).to_text(), "3");
        assert_ne!(Value::Float(3.0), Value::Int(3));
    }

    #[test]
    fn empty_strings_are_empty_values() {
        assert_eq!(Value::from(""), Value::Empty);
        assert_eq!(Value::from(String::new()), Value::Empty);
    }

    #[test]
    fn draw_names_are_trimmed() {
        assert_eq!(DrawName::new("  Round A ").unwrap().as_str(), "Round A");
        assert_eq!(
            DrawName::new(" \t ").unwrap_err(),
            DrawErrors::BlankDrawName {}
        );
    }

    #[test]
    fn rounds_sort_numerically() {
        let mut names = vec![DrawName::round(10), DrawName::round(2), DrawName::round(1)];
        names.sort();
        assert_eq!(
            names,
            vec![DrawName::round(1), DrawName::round(2), DrawName::round(10)]
        );
        assert_eq!(DrawName::round(2).as_str(), "Round 002");
    }

    #[test]
    fn capacity_message_has_both_numbers() {
        let e = DrawErrors::Capacity {
            requested: 6,
            available: 5,
            pool: Pool::Everyone,
        };
        let msg = e.to_string();
        assert!(msg.contains('6') && msg.contains('5'), "{}", msg);
        assert!(e.is_capacity());

        let e2 = DrawErrors::Capacity {
            requested: 4,
            available: 2,
            pool: Pool::ExcludingPrevious,
        };
        assert!(e2.to_string().contains("excluding previous winners"));

        let e3 = DrawErrors::Capacity {
            requested: 4,
            available: 2,
            pool: Pool::Given,
        };
        assert!(e3.to_string().contains("only 2 rows are in the pool"));
    }

    #[test]
    fn rows_lookup_by_column() {
        let schema = Schema::new(&["name".to_string(), "team".to_string()]).unwrap();
        let row: Row = vec![Value::from("Ann"), Value::from("Blue")]
            .into_iter()
            .collect();
        assert_eq!(row.get_by_name(&schema, "team"), Some(&Value::from("Blue")));
        assert_eq!(row.get_by_name(&schema, "age"), None);
        assert_eq!(Schema::new(&[]).unwrap_err(), DrawErrors::EmptySchema {});
    }
}
