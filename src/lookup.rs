//! Monitor metadata from the EPA AQS API `monitors/byState` endpoint.

use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{error::Error, error::Result};

pub const MONITORS_URL: &str = "https://aqs.epa.gov/data/api/monitors/byState";

/// One physical monitoring site.
///
/// An AQS site id is the FIPS state code (2 digits), the FIPS county code
/// (3 digits) and the AQS site code (4 characters), concatenated.
#[derive(Debug, Clone, PartialEq)]
pub struct Monitor {
    id: String,
    metadata: Map<String, Value>,
}

impl Monitor {
    pub fn from_metadata(metadata: Map<String, Value>) -> Result<Self> {
        let state_code = field(&metadata, "state_code", 2)?;
        let county_code = field(&metadata, "county_code", 3)?;
        let site_number = field(&metadata, "site_number", 4)?;
        let id = format!("{state_code}{county_code}{site_number}");

        Ok(Monitor { id, metadata })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn region_code(&self) -> &str {
        &self.id[0..2]
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }
}

fn field<'a>(metadata: &'a Map<String, Value>, name: &str, width: usize) -> Result<&'a str> {
    let value = metadata
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::UnexpectedResponse(format!("monitor is missing `{name}`")))?;

    if value.len() != width {
        return Err(Error::UnexpectedResponse(format!(
            "monitor `{name}` should be {width} characters, got `{value}`"
        )));
    }

    Ok(value)
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(rename = "Header")]
    header: Vec<Header>,
    #[serde(rename = "Data", default)]
    data: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Header {
    status: String,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

/// Parses the `Header`/`Data` envelope into monitors, in the order received.
pub fn parse_lookup_response(body: &str) -> Result<Vec<Monitor>> {
    let response: LookupResponse = serde_json::from_str(body)
        .map_err(|e| Error::UnexpectedResponse(format!("lookup envelope: {e}")))?;

    let status = response
        .header
        .first()
        .map(|h| h.status.as_str())
        .ok_or_else(|| Error::UnexpectedResponse("lookup header is empty".into()))?;

    if status == "Failed" {
        let header = serde_json::to_string(&response.header)?;
        return Err(Error::LookupRejected { header });
    }

    response.data.into_iter().map(Monitor::from_metadata).collect()
}

/// A `Failed` header is reported as a rejection whatever the HTTP status;
/// any other body on a non-2xx status is a status error.
pub fn read_lookup_response(status: StatusCode, body: &str) -> Result<Vec<Monitor>> {
    match parse_lookup_response(body) {
        Err(e @ Error::LookupRejected { .. }) => Err(e),
        _ if !status.is_success() => Err(Error::Status(status)),
        parsed => parsed,
    }
}

/// Only the first of the pollutant's codes is sent; the metadata service
/// accepts a single parameter code.
pub fn lookup_query(
    email: &str,
    key: &str,
    codes: &[&str],
    region_code: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Vec<(&'static str, String)> {
    vec![
        ("email", email.to_string()),
        ("key", key.to_string()),
        ("param", codes.first().copied().unwrap_or_default().to_string()),
        ("bdate", start_date.format("%Y%m%d").to_string()),
        ("edate", end_date.format("%Y%m%d").to_string()),
        ("state", region_code.to_string()),
    ]
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::registry::codes_for;

    fn site(state: &str, county: &str, number: &str) -> Map<String, Value> {
        json!({
            "state_code": state,
            "county_code": county,
            "site_number": number,
            "address": "4103 BEACON HILL S",
            "state_name": "Washington",
            "county_name": "King",
            "cbsa_code": "42660",
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn should_concatenate_site_id() {
        let monitor = Monitor::from_metadata(site("53", "033", "0030")).unwrap();

        assert_eq!(monitor.id(), "530330030");
        assert_eq!(monitor.id().len(), 9);
        assert_eq!(monitor.region_code(), "53");
        assert_eq!(monitor.metadata()["county_name"], "King");
    }

    #[test]
    fn should_reject_short_county_code() {
        let err = Monitor::from_metadata(site("53", "33", "0030")).unwrap_err();

        assert!(matches!(err, Error::UnexpectedResponse(_)));
    }

    #[test]
    fn should_parse_monitors_in_order() {
        let body = json!({
            "Header": [{"status": "Success", "request_time": "2020-06-01", "rows": 2}],
            "Data": [site("53", "033", "0080"), site("53", "033", "0030")],
        })
        .to_string();
        let monitors = parse_lookup_response(&body).unwrap();

        assert_eq!(monitors.len(), 2);
        assert_eq!(monitors[0].id(), "530330080");
        assert_eq!(monitors[1].id(), "530330030");
    }

    #[test]
    fn should_fail_when_header_reports_failure() {
        let body = r#"{"Header":[{"status":"Failed","error":["invalid key"]}],"Data":[]}"#;
        let err = parse_lookup_response(body).unwrap_err();

        match err {
            Error::LookupRejected { header } => {
                assert!(header.contains("Failed"));
                assert!(header.contains("invalid key"));
            }
            e => panic!("unexpected error {e:?}"),
        }
    }

    #[test]
    fn should_accept_missing_data_block() {
        let body = r#"{"Header":[{"status":"No data matched your selection"}]}"#;

        assert!(parse_lookup_response(body).unwrap().is_empty());
    }

    #[test]
    fn should_report_unexpected_shape() {
        let err = parse_lookup_response(r#"{"Header":[]}"#).unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(_)));

        let err = parse_lookup_response("<html></html>").unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(_)));
    }

    #[test]
    fn should_keep_rejection_header_on_error_status() {
        let body = r#"{"Header":[{"status":"Failed","error":["invalid key"]}]}"#;
        let err = read_lookup_response(StatusCode::BAD_REQUEST, body).unwrap_err();

        assert!(matches!(err, Error::LookupRejected { header } if header.contains("invalid key")));
    }

    #[test]
    fn should_fail_on_error_status_without_envelope() {
        let err = read_lookup_response(StatusCode::SERVICE_UNAVAILABLE, "<html>busy</html>").unwrap_err();
        assert!(matches!(err, Error::Status(StatusCode::SERVICE_UNAVAILABLE)));

        let body = r#"{"Header":[{"status":"Success"}],"Data":[]}"#;
        let err = read_lookup_response(StatusCode::INTERNAL_SERVER_ERROR, body).unwrap_err();
        assert!(matches!(err, Error::Status(_)));

        assert!(read_lookup_response(StatusCode::OK, body).unwrap().is_empty());
    }

    #[test]
    fn should_build_query_with_first_code() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
        let query = lookup_query("a@b.c", "k", codes_for("PM2.5").unwrap(), "53", start, end);

        assert!(query.contains(&("param", "88101".to_string())));
        assert!(query.contains(&("bdate", "20200101".to_string())));
        assert!(query.contains(&("edate", "20201231".to_string())));
        assert!(query.contains(&("state", "53".to_string())));
    }
}
