use crate::UrlError;
use url::Url;

/// Query parameters that identify a click rather than a posting
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "refId",
    "trackingId",
    "position",
    "pageNum",
    "from",
];

/// Produces the canonical form of a job URL
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only `http` and `https`
/// 3. Lowercase the host
/// 4. Remove dot segments, duplicate and trailing slashes from the path
/// 5. Remove the fragment
/// 6. Remove tracking query parameters and sort the rest
///
/// The scheme is kept as-is so that plain-HTTP test servers keep working.
///
/// # Examples
///
/// ```
/// use job_trawl::url::canonical_job_url;
///
/// let url = canonical_job_url("https://WWW.Example.com/jobs/view/42/?trackingId=x#top").unwrap();
/// assert_eq!(url.as_str(), "https://www.example.com/jobs/view/42");
/// ```
pub fn canonical_job_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;

    let path = normalize_path(url.path());
    url.set_path(&path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
    }

    Ok(url)
}

/// Resolves an `href` found on `page_url` into a canonical absolute job URL
///
/// Returns None if the link should be ignored:
/// - empty, fragment-only, `javascript:`, `mailto:`, `tel:` or `data:` hrefs
/// - hrefs that do not resolve to an HTTP(S) URL
pub fn resolve_href(href: &str, page_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = page_url.join(href).ok()?;
    canonical_job_url(absolute.as_str()).ok()
}

fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    format!("/{}", segments.join("/"))
}

fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    params.sort();
    params
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
