// Primitives for reading CSV files.

use std::io::Read;

use draw_ledger::builder::Builder;

use crate::draw::{io_common::column_name, *};

const UTF8_BOM: char = '\u{feff}';

pub fn read_csv_participants(path: &str) -> BLuckyDrawResult<ParticipantSet> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    read_csv_records(rdr, path)
}

/// Reads participants from any CSV stream. `label` only appears in errors.
pub fn read_csv_reader<R: Read>(reader: R, label: &str) -> BLuckyDrawResult<ParticipantSet> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    read_csv_records(rdr, label)
}

fn read_csv_records<R: Read>(mut rdr: csv::Reader<R>, path: &str) -> BLuckyDrawResult<ParticipantSet> {
    let header = rdr
        .headers()
        .context(CsvLineParseSnafu { path, lineno: 1u64 })?
        .clone();
    debug!("read_csv_records: header: {:?}", header);
    ensure!(
        !header.is_empty() && header.iter().any(|h| !h.trim().is_empty()),
        CsvMissingHeaderSnafu { path }
    );
    // Spreadsheet programs often save CSV files with a byte order mark.
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, h)| column_name(idx, h.trim_start_matches(UTF8_BOM)))
        .collect();

    let mut builder = Builder::new(&columns).context(DrawingSnafu)?;
    for (idx, record_r) in rdr.records().enumerate() {
        // Line 1 is the header.
        let lineno = (idx + 2) as u64;
        let record = record_r.context(CsvLineParseSnafu { path, lineno })?;
        if record.iter().all(|cell| cell.is_empty()) {
            debug!("read_csv_records: skipping empty line {}", lineno);
            continue;
        }
        let cells: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        builder.add_row_simple(&cells).context(DrawingSnafu)?;
    }
    let participants = builder.build();
    debug!(
        "read_csv_records: {:?}: {} participants",
        path,
        participants.len()
    );
    Ok(participants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use draw_ledger::export::Table;

    #[test]
    fn reads_typed_cells() {
        let data = "\u{feff}name,ticket,score,vip\nAnn,007,2.5,true\nBo,12,,false\n";
        let ps = read_csv_reader(data.as_bytes(), "inline").unwrap();
        assert_eq!(ps.schema().columns(), &["name", "ticket", "score", "vip"]);
        assert_eq!(
            ps.rows()[0].values(),
            &[
                Value::from("Ann"),
                Value::from("007"),
                Value::Float(2.5),
                Value::Bool(true)
            ]
        );
        assert_eq!(
            ps.rows()[1].values(),
            &[Value::from("Bo"), Value::Int(12), Value::Empty, Value::Bool(false)]
        );
    }

    #[test]
    fn ragged_lines_are_errors() {
        let data = "name,email\nAnn,a@x\nBo\n";
        let err = read_csv_reader(data.as_bytes(), "inline").unwrap_err();
        assert!(matches!(
            *err,
            LuckyDrawError::CsvLineParse { lineno: 3, .. }
        ));
    }

    #[test]
    fn empty_input_has_no_header() {
        let err = read_csv_reader("".as_bytes(), "inline").unwrap_err();
        assert!(matches!(*err, LuckyDrawError::CsvMissingHeader { .. }));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let data = "name,team\nAnn,Blue\n,\nBo,Red\n";
        let ps = read_csv_reader(data.as_bytes(), "inline").unwrap();
        assert_eq!(ps.len(), 2);
    }

    #[test]
    fn text_that_looks_typed_stays_text() {
        let columns = vec!["phone".to_string(), "member".to_string(), "size".to_string(), "note".to_string()];
        let rows = vec![
            Row::new(vec![Value::from("42"), Value::from("true"), Value::from("3.0"), Value::from("'quoted")]),
            Row::new(vec![Value::Int(42), Value::Bool(true), Value::Float(3.0), Value::from("plain")]),
        ];
        let ps = ParticipantSet::new(&columns, rows).unwrap();
        let draw = Draw {
            name: DrawName::new("Round A").unwrap(),
            winners: ps.rows().to_vec(),
            pool_size: ps.len(),
            pool: Pool::Everyone,
        };
        let bytes = Table::for_draw(ps.schema(), &draw).to_csv().unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert_eq!(text.lines().nth(1), Some("'42,'true,'3.0,''quoted"));

        let again = read_csv_reader(bytes.as_slice(), "export").unwrap();
        assert_eq!(again.rows(), ps.rows());
    }

    #[test]
    fn export_then_reparse() {
        let data = "name,age,note\n\"Kim, Min-ji\",29,\"said \"\"hi\"\"\"\nLee,31,\n";
        let ps = read_csv_reader(data.as_bytes(), "inline").unwrap();
        let mut ledger = Ledger::new();
        let mut rng = StdRng::seed_from_u64(4);
        let request = DrawRequest {
            name: DrawName::new("Round A").unwrap(),
            count: 2,
            exclude_previous: false,
        };
        let draw = perform_draw(&ps, &mut ledger, &request, &mut rng).unwrap();
        let bytes = Table::for_draw(ps.schema(), &draw).to_csv().unwrap();

        let again = read_csv_reader(bytes.as_slice(), "export").unwrap();
        assert_eq!(again.schema(), ps.schema());
        assert_eq!(again.rows(), draw.winners.as_slice());
    }
}
