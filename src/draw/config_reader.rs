use crate::draw::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "format")]
    pub format: Option<String>,
    #[serde(rename = "exportEachDraw")]
    pub export_each_draw: Option<bool>,
    #[serde(rename = "exportLedger")]
    pub export_ledger: Option<bool>,
    #[serde(rename = "exportLatest")]
    pub export_latest: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DrawSettings {
    pub name: String,
    // A number or a string holding a number.
    #[serde(rename = "count")]
    _count: Option<JSValue>,
    #[serde(rename = "excludePrevious")]
    pub exclude_previous: Option<bool>,
}

impl DrawSettings {
    pub fn new(name: &str, count: usize, exclude_previous: bool) -> DrawSettings {
        DrawSettings {
            name: name.to_string(),
            _count: Some(JSValue::from(count)),
            exclude_previous: Some(exclude_previous),
        }
    }

    pub fn set_count(&mut self, count: usize) {
        self._count = Some(JSValue::from(count));
    }

    /// Defaults to a single winner.
    pub fn count(&self) -> LuckyDrawResult<usize> {
        match &self._count {
            None => Ok(1),
            x => read_js_int(x),
        }
    }

    pub fn to_request(&self) -> BLuckyDrawResult<DrawRequest> {
        Ok(DrawRequest {
            name: DrawName::new(&self.name).context(DrawingSnafu)?,
            count: self.count()?,
            exclude_previous: self.exclude_previous.unwrap_or(false),
        })
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrawPlan {
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
    #[serde(rename = "participantSources", default)]
    pub participant_sources: Vec<ParticipantSource>,
    #[serde(default)]
    pub draws: Vec<DrawSettings>,
}

pub fn read_plan(path: &str) -> BLuckyDrawResult<DrawPlan> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let plan: DrawPlan = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    info!(
        "read_plan: {} sources, {} draws",
        plan.participant_sources.len(),
        plan.draws.len()
    );
    Ok(plan)
}

fn read_js_int(x: &Option<JSValue>) -> LuckyDrawResult<usize> {
    let value = format!("{:?}", x);
    match x {
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu { value }),
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<usize>()
            .ok()
            .context(ParsingJsonNumberSnafu { value }),
        _ => None.context(ParsingJsonNumberSnafu { value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_as_numbers_or_strings() {
        let plan: DrawPlan = serde_json::from_str(
            r#"{ "draws": [
                { "name": "A", "count": 2 },
                { "name": "B", "count": " 3 " },
                { "name": "C" },
                { "name": "D", "count": -1 },
                { "name": "E", "count": "many" }
            ] }"#,
        )
        .unwrap();
        let counts: Vec<Option<usize>> = plan.draws.iter().map(|d| d.count().ok()).collect();
        assert_eq!(counts, vec![Some(2), Some(3), Some(1), None, None]);
        assert!(plan.participant_sources.is_empty());
        assert_eq!(plan.output_settings, None);
    }

    #[test]
    fn zero_count_is_refused_at_draw_time() {
        let d = DrawSettings::new("Zero", 0, false);
        assert_eq!(d.count().unwrap(), 0);
        // The request is built, the sampling engine refuses it.
        assert_eq!(d.to_request().unwrap().count, 0);
    }

    #[test]
    fn blank_names_are_refused() {
        let d = DrawSettings::new("   ", 1, false);
        let err = d.to_request().unwrap_err();
        assert!(matches!(
            *err,
            LuckyDrawError::Drawing {
                source: DrawErrors::BlankDrawName {}
            }
        ));
    }

    #[test]
    fn full_plan() {
        let plan: DrawPlan = serde_json::from_str(
            r#"{
              "outputSettings": { "outputDirectory": "out", "format": "xlsx", "exportLedger": false },
              "participantSources": [
                { "provider": "xlsx", "filePath": "a.xlsx", "excelWorksheetName": "Sheet2" }
              ],
              "draws": [ { "name": "Round A", "count": 3, "excludePrevious": true } ]
            }"#,
        )
        .unwrap();
        let out = plan.output_settings.clone().unwrap();
        assert_eq!(out.output_directory.as_deref(), Some("out"));
        assert_eq!(out.export_ledger, Some(false));
        assert_eq!(out.export_each_draw, None);
        assert_eq!(
            plan.participant_sources[0].excel_worksheet_name.as_deref(),
            Some("Sheet2")
        );
        let req = plan.draws[0].to_request().unwrap();
        assert_eq!(req.count, 3);
        assert!(req.exclude_previous);
        assert_eq!(req.name.as_str(), "Round A");
    }
}
