pub use crate::config::*;

use log::debug;

/// The table of participants a session draws from.
///
/// It is built once per loaded source and replaced as a whole when another
/// source is loaded. Every row has exactly one value per column.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParticipantSet {
    schema: Schema,
    rows: Vec<Row>,
}

impl ParticipantSet {
    pub fn new(columns: &[String], rows: Vec<Row>) -> Result<ParticipantSet, DrawErrors> {
        let schema = Schema::new(columns)?;
        for (idx, row) in rows.iter().enumerate() {
            ensure_width(&schema, idx, row)?;
        }
        Ok(ParticipantSet { schema, rows })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends the rows of another table with the same columns.
    ///
    /// Used when the participants come from several files.
    pub fn concat(self, other: ParticipantSet) -> Result<ParticipantSet, DrawErrors> {
        if self.schema != other.schema {
            return Err(DrawErrors::SchemaMismatch {
                expected: self.schema.columns().to_vec(),
                found: other.schema.columns().to_vec(),
            });
        }
        let mut rows = self.rows;
        rows.extend(other.rows);
        Ok(ParticipantSet {
            schema: self.schema,
            rows,
        })
    }
}

fn ensure_width(schema: &Schema, idx: usize, row: &Row) -> Result<(), DrawErrors> {
    if row.len() != schema.len() {
        return Err(DrawErrors::RowWidth {
            row: idx,
            expected: schema.len(),
            found: row.len(),
        });
    }
    Ok(())
}

/// A builder for adding participants one row at a time.
///
/// ```
/// pub use draw_ledger::builder::Builder;
/// # use draw_ledger::DrawErrors;
///
/// let mut builder = Builder::new(&["name".to_string(), "team".to_string()])?;
///
/// builder.add_row_simple(&["Anna".to_string(), "Blue".to_string()])?;
/// builder.add_row_simple(&["Bob".to_string(), "".to_string()])?;
///
/// let participants = builder.build();
/// assert_eq!(participants.len(), 2);
/// # Ok::<(), DrawErrors>(())
/// ```
pub struct Builder {
    pub(crate) _schema: Schema,
    pub(crate) _rows: Vec<Row>,
}

impl Builder {
    pub fn new(columns: &[String]) -> Result<Builder, DrawErrors> {
        Ok(Builder {
            _schema: Schema::new(columns)?,
            _rows: Vec::new(),
        })
    }

    /// Adds a row given as text cells.
    ///
    /// Each cell goes through [`Value::from_text`], which is how delimited
    /// text sources are read.
    pub fn add_row_simple(&mut self, cells: &[String]) -> Result<(), DrawErrors> {
        let row: Row = cells.iter().map(|s| Value::from_text(s)).collect();
        self.add_row(row)
    }

    pub fn add_row(&mut self, row: Row) -> Result<(), DrawErrors> {
        ensure_width(&self._schema, self._rows.len(), &row)?;
        self._rows.push(row);
        Ok(())
    }

    pub fn build(self) -> ParticipantSet {
        debug!(
            "Builder::build: {} rows with columns {:?}",
            self._rows.len(),
            self._schema.columns()
        );
        ParticipantSet {
            schema: self._schema,
            rows: self._rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<String> {
        vec!["name".to_string(), "email".to_string()]
    }

    #[test]
    fn rejects_short_rows() {
        let mut builder = Builder::new(&columns()).unwrap();
        builder
            .add_row_simple(&["a".to_string(), "a@x".to_string()])
            .unwrap();
        let err = builder.add_row_simple(&["b".to_string()]).unwrap_err();
        assert_eq!(
            err,
            DrawErrors::RowWidth {
                row: 1,
                expected: 2,
                found: 1
            }
        );
        assert_eq!(builder.build().len(), 1);
    }

    #[test]
    fn new_checks_every_row() {
        let rows = vec![
            Row::new(vec![Value::from("a"), Value::from("a@x")]),
            Row::new(vec![Value::from("b"), Value::from("b@x"), Value::Int(3)]),
        ];
        assert!(matches!(
            ParticipantSet::new(&columns(), rows),
            Err(DrawErrors::RowWidth { row: 1, .. })
        ));
    }

    #[test]
    fn concat_requires_same_columns() {
        let a = ParticipantSet::new(
            &columns(),
            vec![Row::new(vec![Value::from("a"), Value::from("a@x")])],
        )
        .unwrap();
        let b = ParticipantSet::new(
            &columns(),
            vec![Row::new(vec![Value::from("b"), Value::from("b@x")])],
        )
        .unwrap();
        let joined = a.clone().concat(b).unwrap();
        assert_eq!(joined.len(), 2);
        assert_eq!(joined.rows()[1].get(0), Some(&Value::from("b")));

        let other = ParticipantSet::new(&["name".to_string()], vec![]).unwrap();
        assert!(matches!(
            a.concat(other),
            Err(DrawErrors::SchemaMismatch { .. })
        ));
    }
}
