use url::{ParseError, Url};

/// Parses a provider base URL, assuming `https://` when no scheme is given.
/// Only `http` and `https` URLs without credentials are accepted. The result
/// always ends in `/` so relative API paths join underneath it.
pub fn parse_base_url(input: &str) -> Option<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut url = match Url::parse(trimmed) {
        Ok(url) if is_http(&url) => url,
        // `host:port` parses as an opaque URL with scheme `host`.
        Ok(_) if !trimmed.contains("://") => with_https(trimmed)?,
        Err(ParseError::RelativeUrlWithoutBase) => with_https(trimmed)?,
        _ => return None,
    };
    if !is_http(&url)
        || url.cannot_be_a_base()
        || url.host_str().is_none_or(str::is_empty)
        || !url.username().is_empty()
        || url.password().is_some()
    {
        return None;
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Some(url)
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

fn with_https(input: &str) -> Option<Url> {
    Url::parse(&format!("https://{input}")).ok()
}
