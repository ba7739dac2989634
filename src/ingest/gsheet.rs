use log::{debug, info};
use snafu::{OptionExt, ResultExt};
use std::future::Future;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, Retry};

use super::error::*;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const SHEETS_HOST: &str = "docs.google.com";
const RETRY_BASE_MILLIS: u64 = 200;
const RETRY_ATTEMPTS: usize = 3;

/// Turn a Google Sheets link into its CSV export URL.
///
/// Accepts edit/view links (`https://docs.google.com/spreadsheets/d/<id>/edit#gid=123`)
/// and keeps the worksheet `gid` when the link names one. Any other host is
/// rejected so a mistyped link fails before a download is attempted.
pub fn sheet_export_url(url: &str) -> IngestResult<String> {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .context(InvalidSheetUrlSnafu { url })?;
    let host_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (host, path) = rest.split_at(host_end);
    if !host.eq_ignore_ascii_case(SHEETS_HOST) {
        return InvalidSheetUrlSnafu { url }.fail();
    }

    let id: String = path
        .strip_prefix("/spreadsheets/d/")
        .context(InvalidSheetUrlSnafu { url })?
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if id.is_empty() {
        return InvalidSheetUrlSnafu { url }.fail();
    }

    let gid = path.find("gid=").map(|i| {
        path[i + 4..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>()
    });

    let mut export = format!("https://{}/spreadsheets/d/{}/export?format=csv", SHEETS_HOST, id);
    if let Some(gid) = gid.filter(|g| !g.is_empty()) {
        export.push_str("&gid=");
        export.push_str(&gid);
    }
    Ok(export)
}

/// Exponential backoff capped at 5s, `RETRY_ATTEMPTS` retries after the first try
fn retry_strategy(base_millis: u64) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(base_millis)
        .max_delay(Duration::from_secs(5))
        .take(RETRY_ATTEMPTS)
}

async fn with_retry<T, E, F, Fut>(
    strategy: impl Iterator<Item = Duration>,
    action: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    Retry::start(strategy, action).await
}

/// Download a public sheet as CSV text
pub async fn fetch_sheet_csv(url: &str) -> IngestResult<String> {
    let export_url = sheet_export_url(url)?;
    info!("Fetching sheet {}", export_url);

    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context(SheetDownloadSnafu { url })?;

    let client = &client;
    let target = export_url.as_str();
    let body = with_retry(retry_strategy(RETRY_BASE_MILLIS), move || async move {
        let response = client.get(target).send().await?.error_for_status()?;
        response.text().await
    })
    .await
    .context(SheetDownloadSnafu { url })?;

    debug!("fetch_sheet_csv: {} byte(s)", body.len());
    if looks_like_html(&body) {
        // Private sheets redirect to a sign-in page instead of failing
        return SheetNotPublicSnafu { url }.fail();
    }
    Ok(body)
}

fn looks_like_html(body: &str) -> bool {
    let head: String = body
        .trim_start()
        .chars()
        .take(15)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_url_from_edit_link() {
        let url = "https://docs.google.com/spreadsheets/d/1AbC_d-9/edit#gid=42";
        assert_eq!(
            sheet_export_url(url).unwrap(),
            "https://docs.google.com/spreadsheets/d/1AbC_d-9/export?format=csv&gid=42"
        );
    }

    #[test]
    fn test_export_url_without_gid() {
        let url = "https://docs.google.com/spreadsheets/d/1AbC/view";
        assert_eq!(
            sheet_export_url(url).unwrap(),
            "https://docs.google.com/spreadsheets/d/1AbC/export?format=csv"
        );
    }

    #[test]
    fn test_export_url_rejects_other_links() {
        assert!(matches!(
            sheet_export_url("https://example.com/report.csv"),
            Err(IngestError::InvalidSheetUrl { .. })
        ));
        assert!(matches!(
            sheet_export_url("https://docs.google.com/spreadsheets/d/"),
            Err(IngestError::InvalidSheetUrl { .. })
        ));
    }

    #[test]
    fn test_export_url_requires_google_host() {
        for url in [
            "https://example.com/spreadsheets/d/abc/edit",
            "https://docs.google.com.evil.net/spreadsheets/d/abc/edit",
            "docs.google.com/spreadsheets/d/abc/edit",
            "https://docs.google.com/document/d/abc/edit?x=/spreadsheets/d/abc",
        ] {
            let err = sheet_export_url(url).unwrap_err();
            assert!(matches!(err, IngestError::InvalidSheetUrl { .. }), "{}", url);
            assert!(!err.is_network());
        }
        assert_eq!(
            sheet_export_url("http://DOCS.google.com/spreadsheets/d/abc?gid=7").unwrap(),
            "https://docs.google.com/spreadsheets/d/abc/export?format=csv&gid=7"
        );
    }

    #[test]
    fn test_retry_strategy_is_bounded() {
        let delays: Vec<Duration> = retry_strategy(RETRY_BASE_MILLIS).collect();
        assert_eq!(delays.len(), RETRY_ATTEMPTS);
        assert_eq!(delays[0], Duration::from_millis(RETRY_BASE_MILLIS));
        assert!(delays.iter().all(|d| *d <= Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_with_retry_recovers_after_failures() {
        let mut attempts = 0;
        let result: Result<u32, &str> = with_retry(retry_strategy(1), || {
            attempts += 1;
            let n = attempts;
            async move {
                if n < 3 {
                    Err("connection reset")
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result, Ok(3));
    }

    #[tokio::test]
    async fn test_with_retry_gives_up() {
        let mut attempts = 0;
        let result: Result<(), &str> = with_retry(retry_strategy(1), || {
            attempts += 1;
            async { Err("timeout") }
        })
        .await;
        assert_eq!(result, Err("timeout"));
        assert_eq!(attempts, RETRY_ATTEMPTS + 1);
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("\n<!DOCTYPE html><html>"));
        assert!(looks_like_html("<HTML><head>"));
        assert!(!looks_like_html("Sales Rep,Issued Appts\n"));
        assert!(!looks_like_html(""));
    }
}
