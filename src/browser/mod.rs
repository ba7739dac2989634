use anyhow::{Context, Result};

/// Open a URL in the user's default browser
///
/// # Arguments
/// * `url` - The URL to open (e.g., the Google Sheet the dashboard reads)
///
/// # Errors
/// Returns error if the URL is not http(s) or the browser cannot be opened
pub fn open_url(url: &str) -> Result<()> {
    if !is_web_url(url) {
        anyhow::bail!("Not a web link: {}", url);
    }
    webbrowser::open(url).with_context(|| format!("Failed to open browser for URL: {}", url))?;
    Ok(())
}

fn is_web_url(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("https://") || url.starts_with("http://")
}
