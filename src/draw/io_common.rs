use std::path::Path;

use draw_ledger::{Row, Schema};

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

pub fn is_url(path: &str) -> bool {
    path.starts_with("https://") || path.starts_with("http://")
}

/// Guesses the input type from the extension of the file.
pub fn infer_provider(path: &str) -> &'static str {
    if is_url(path) {
        return "gsheet";
    }
    let lower = path.to_lowercase();
    if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
        "xlsx"
    } else {
        "csv"
    }
}

/// Relative paths are taken from the root directory when there is one.
pub fn resolve_path(root_path: Option<&Path>, file_path: &str) -> String {
    match root_path {
        Some(root) if !is_url(file_path) && Path::new(file_path).is_relative() => {
            root.join(file_path).display().to_string()
        }
        _ => file_path.to_string(),
    }
}

/// `name=Ann, team=Blue`, skipping the empty cells.
pub fn format_row(schema: &Schema, row: &Row) -> String {
    schema
        .columns()
        .iter()
        .zip(row.values())
        .filter(|(_, v)| !v.is_empty())
        .map(|(c, v)| format!("{}={}", c, v))
        .collect::<Vec<String>>()
        .join(", ")
}

/// Header cells can be blank in spreadsheets; they get a placeholder name.
pub fn column_name(idx: usize, raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        format!("Unnamed: {}", idx)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draw_ledger::Value;

    #[test]
    fn providers() {
        assert_eq!(infer_provider("a/b/members.XLSX"), "xlsx");
        assert_eq!(infer_provider("members.csv"), "csv");
        assert_eq!(infer_provider("members"), "csv");
        assert_eq!(
            infer_provider("https://docs.google.com/spreadsheets/d/abc/edit#gid=0"),
            "gsheet"
        );
    }

    #[test]
    fn paths() {
        let root = Path::new("/data/plans");
        assert_eq!(
            resolve_path(Some(root), "members.csv"),
            Path::new("/data/plans").join("members.csv").display().to_string()
        );
        assert_eq!(resolve_path(Some(root), "/tmp/m.csv"), "/tmp/m.csv");
        assert_eq!(resolve_path(None, "m.csv"), "m.csv");
        assert_eq!(simplify_file_name("/data/plans/members.csv"), "members.csv");
    }

    #[test]
    fn rows_and_headers() {
        let schema = Schema::new(&["name".to_string(), "team".to_string(), "age".to_string()]).unwrap();
        let row = Row::new(vec![Value::from("Ann"), Value::Empty, Value::Int(30)]);
        assert_eq!(format_row(&schema, &row), "name=Ann, age=30");
        assert_eq!(column_name(3, "  "), "Unnamed: 3");
        assert_eq!(column_name(0, " Email "), "Email");
    }
}
