use calamine::{open_workbook_auto, DataType, Range, Reader};

use draw_ledger::builder::Builder;

use crate::draw::{io_common::column_name, *};

// Up to this, integral floats are exact integers. Same bound as the writer.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

pub fn read_excel_participants(
    path: &str,
    worksheet_name: Option<&str>,
) -> BLuckyDrawResult<ParticipantSet> {
    let mut workbook = open_workbook_auto(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet_name {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };
    participants_from_range(&wrange, path)
}

/// The first row of the range is the header, every other row a participant.
pub fn participants_from_range(
    wrange: &Range<DataType>,
    path: &str,
) -> BLuckyDrawResult<ParticipantSet> {
    let header = wrange.rows().next().context(EmptyExcelSnafu { path })?;
    debug!("participants_from_range: header: {:?}", header);
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| match cell {
            DataType::Empty => column_name(idx, ""),
            c => column_name(idx, &read_cell(c, 1).map(|v| v.to_text()).unwrap_or_default()),
        })
        .collect();

    let mut builder = Builder::new(&columns).context(DrawingSnafu)?;
    for (idx, row) in wrange.rows().enumerate().skip(1) {
        let lineno = (idx + 1) as u64;
        if row.iter().all(|c| *c == DataType::Empty) {
            debug!("participants_from_range: skipping empty row {}", lineno);
            continue;
        }
        let mut values: Vec<Value> = Vec::with_capacity(row.len());
        for cell in row {
            values.push(read_cell(cell, lineno)?);
        }
        builder
            .add_row(values.into_iter().collect())
            .context(DrawingSnafu)?;
    }
    let participants = builder.build();
    debug!(
        "participants_from_range: {:?}: {} participants",
        path,
        participants.len()
    );
    Ok(participants)
}

fn read_cell(cell: &DataType, lineno: u64) -> LuckyDrawResult<Value> {
    match cell {
        DataType::Empty => Ok(Value::Empty),
        DataType::String(s) => Ok(Value::from(s.as_str())),
        DataType::Int(i) => Ok(Value::Int(*i)),
        // Spreadsheets store every number as a float.
        DataType::Float(f) if f.fract() == 0.0 && f.abs() <= MAX_EXACT_FLOAT => {
            Ok(Value::Int(*f as i64))
        }
        DataType::Float(f) => Ok(Value::Float(*f)),
        DataType::Bool(b) => Ok(Value::Bool(*b)),
        // Dates keep their serial number.
        DataType::DateTime(f) => Ok(Value::Float(*f)),
        c => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", c),
        }
        .fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Xlsx;
    use draw_ledger::export::Table;
    use std::io::Cursor;

    fn participants() -> ParticipantSet {
        let columns = vec!["name".to_string(), "ticket".to_string(), "score".to_string(), "vip".to_string()];
        let rows = vec![
            Row::new(vec![Value::from("Ann"), Value::Int(7), Value::Float(2.5), Value::Bool(true)]),
            Row::new(vec![Value::from("Bo"), Value::Int(-12), Value::Empty, Value::Bool(false)]),
            Row::new(vec![Value::from("Cy"), Value::from("A-3"), Value::Float(0.125), Value::Empty]),
        ];
        ParticipantSet::new(&columns, rows).unwrap()
    }

    fn read_back(bytes: Vec<u8>) -> ParticipantSet {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        let wrange = workbook.worksheet_range_at(0).unwrap().unwrap();
        participants_from_range(&wrange, "memory").unwrap()
    }

    #[test]
    fn xlsx_round_trip() {
        let ps = participants();
        let draw = Draw {
            name: DrawName::new("Round A").unwrap(),
            winners: ps.rows().to_vec(),
            pool_size: ps.len(),
            pool: Pool::Everyone,
        };
        let bytes = Table::for_draw(ps.schema(), &draw).to_xlsx().unwrap();
        let again = read_back(bytes);
        assert_eq!(again.schema(), ps.schema());
        assert_eq!(again.rows(), ps.rows());
    }

    #[test]
    fn ledger_workbook_starts_with_draw_column() {
        let ps = participants();
        let mut ledger = Ledger::new();
        ledger
            .record(&DrawName::new("Zeta").unwrap(), &ps.rows()[..1])
            .unwrap();
        ledger
            .record(&DrawName::new("Alpha").unwrap(), &ps.rows()[1..])
            .unwrap();
        let bytes = Table::for_ledger(ps.schema(), &ledger).to_xlsx().unwrap();
        let again = read_back(bytes);
        assert_eq!(again.schema().columns()[0], "Draw");
        assert_eq!(&again.schema().columns()[1..], ps.schema().columns());
        let draws: Vec<&Value> = again.rows().iter().filter_map(|r| r.get(0)).collect();
        assert_eq!(
            draws,
            vec![&Value::from("Alpha"), &Value::from("Alpha"), &Value::from("Zeta")]
        );
    }

    #[test]
    fn integers_at_the_float_limit() {
        let limit: i64 = 1 << 53;
        let ps = ParticipantSet::new(
            &["ticket".to_string()],
            vec![
                Row::new(vec![Value::Int(limit)]),
                Row::new(vec![Value::Int(-limit)]),
                Row::new(vec![Value::Int(limit + 1)]),
            ],
        )
        .unwrap();
        let draw = Draw {
            name: DrawName::new("Limits").unwrap(),
            winners: ps.rows().to_vec(),
            pool_size: ps.len(),
            pool: Pool::Everyone,
        };
        let again = read_back(Table::for_draw(ps.schema(), &draw).to_xlsx().unwrap());
        assert_eq!(again.rows()[0], ps.rows()[0]);
        assert_eq!(again.rows()[1], ps.rows()[1]);
        // Written as text to keep every digit.
        assert_eq!(
            again.rows()[2].values(),
            &[Value::from("9007199254740993")]
        );
    }

    #[test]
    fn integral_floats_become_integers() {
        assert_eq!(read_cell(&DataType::Float(12.0), 2).unwrap(), Value::Int(12));
        assert_eq!(read_cell(&DataType::Float(1.5), 2).unwrap(), Value::Float(1.5));
        assert_eq!(
            read_cell(&DataType::String(String::new()), 2).unwrap(),
            Value::Empty
        );
    }
}
