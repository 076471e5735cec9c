// Published Google Sheets, downloaded in CSV form.

use regex::Regex;

use crate::draw::*;

const SHEET_URL_PATTERN: &str =
    r"^https://docs\.google\.com/spreadsheets/d/([a-zA-Z0-9_-]+).*gid=([0-9]+)";

/// Rewrites the address of a sheet into its CSV export address.
///
/// Returns the export address and the name used to label the results.
pub fn export_url(url: &str) -> BLuckyDrawResult<(String, String)> {
    let re = Regex::new(SHEET_URL_PATTERN).context(PatternSnafu)?;
    let caps = re.captures(url.trim()).context(GoogleSheetUrlSnafu { url })?;
    let file_id = &caps[1];
    let gid = &caps[2];
    let csv_url = format!(
        "https://docs.google.com/spreadsheets/d/{}/export?format=csv&gid={}",
        file_id, gid
    );
    Ok((csv_url, format!("GoogleSheet_{}.csv", file_id)))
}

pub fn read_google_sheet(url: &str) -> BLuckyDrawResult<(ParticipantSet, String)> {
    let (csv_url, source_name) = export_url(url)?;
    info!("read_google_sheet: fetching {:?}", csv_url);
    let response = reqwest::blocking::get(csv_url.as_str())
        .and_then(|r| r.error_for_status())
        .context(FetchingSnafu { url: csv_url.as_str() })?;
    let body = response
        .bytes()
        .context(FetchingSnafu { url: csv_url.as_str() })?;
    debug!("read_google_sheet: {} bytes", body.len());
    let participants = io_csv::read_csv_reader(&body[..], &source_name)?;
    Ok((participants, source_name))
}
