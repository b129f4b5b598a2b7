//! Data links from the AirNow CGI broker.
//!
//! The broker backs the form at
//! <https://www.epa.gov/outdoor-air-quality-data/download-daily-data>. With
//! nonessential parameters stripped a request looks like
//! `broker?_service=data&_program=dataprog.ad_data_daily_airnow.sas&poll=88101,88502&year=2020&site=530330030`.

use scraper::{Html, Selector};

use crate::{error::Error, error::Result, lookup::Monitor, registry::Pollutant};

pub const BROKER_URL: &str = "https://www3.epa.gov/cgi-bin/broker";
pub const BROKER_PROGRAM: &str = "dataprog.ad_data_daily_airnow.sas";
pub const ACTIVE_LINK_MARKER: &str = "The following data link is active";

#[derive(Debug, Clone, PartialEq)]
pub enum DataLink {
    Active(String),
    /// The broker answered but prepared no link, usually because the monitor
    /// has no data for the year.
    Unavailable,
}

pub fn data_link_query(pollutant: Pollutant, year: i32, monitor: &Monitor) -> Vec<(&'static str, String)> {
    vec![
        ("_service", "data".to_string()),
        ("_program", BROKER_PROGRAM.to_string()),
        ("poll", pollutant.joined_codes()),
        ("year", year.to_string()),
        ("site", monitor.id().to_string()),
    ]
}

pub fn parse_data_link(html: &str) -> Result<DataLink> {
    let doc = Html::parse_document(html);

    let body_selector = create_selector("body")?;
    let body_text = doc
        .select(&body_selector)
        .next()
        .map(|body| body.text().collect::<String>())
        .unwrap_or_default();

    if !body_text.contains(ACTIVE_LINK_MARKER) {
        return Ok(DataLink::Unavailable);
    }

    let anchor_selector = create_selector("a")?;
    let href = doc
        .select(&anchor_selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .ok_or_else(|| Error::UnexpectedResponse("active data link page has no anchor href".into()))?;

    Ok(DataLink::Active(href.to_string()))
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::UnexpectedResponse(format!("bad selector `{sel_str}`")))
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const ACTIVE_PAGE: &str = r#"<html><head><title>Daily Data</title></head>
        <body><p>The following data link is active for 24 hours:</p>
        <a href="https://www3.epa.gov/cgi-bin/broker?_service=data&amp;_id=abc123">ad_viz_plotval_data.csv</a>
        <a href="https://www.epa.gov/">EPA home</a></body></html>"#;

    const EMPTY_PAGE: &str = r#"<html><body><p>No data available.</p>
        <a href="https://www.epa.gov/">EPA home</a></body></html>"#;

    #[test]
    fn should_take_first_anchor_when_marker_present() {
        let link = parse_data_link(ACTIVE_PAGE).unwrap();

        assert_eq!(
            link,
            DataLink::Active("https://www3.epa.gov/cgi-bin/broker?_service=data&_id=abc123".into())
        );
    }

    #[test]
    fn should_report_unavailable_without_marker() {
        assert_eq!(parse_data_link(EMPTY_PAGE).unwrap(), DataLink::Unavailable);
        assert_eq!(parse_data_link("").unwrap(), DataLink::Unavailable);
    }

    #[test]
    fn should_fail_when_marker_has_no_link() {
        let html = "<html><body>The following data link is active</body></html>";

        assert!(matches!(parse_data_link(html), Err(Error::UnexpectedResponse(_))));
    }

    #[test]
    fn should_build_query_with_all_codes() {
        let metadata = json!({"state_code": "53", "county_code": "033", "site_number": "0030"});
        let monitor = Monitor::from_metadata(metadata.as_object().cloned().unwrap()).unwrap();
        let query = data_link_query(Pollutant::Pm25, 2020, &monitor);

        assert!(query.contains(&("poll", "88101,88502".to_string())));
        assert!(query.contains(&("year", "2020".to_string())));
        assert!(query.contains(&("site", "530330030".to_string())));
        assert!(query.contains(&("_program", BROKER_PROGRAM.to_string())));
    }
}
