use crate::UrlError;
use url::Url;

/// Canonicalizes a URL for visited-set comparison
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject non-http(s) schemes and host-less URLs
/// 3. Remove the fragment (everything after #)
/// 4. Normalize the path: drop `.` and `..` segments, collapse duplicate
///    slashes, strip the trailing slash except at root
/// 5. Sort query parameters by key; drop an empty query string
///
/// Unlike a politeness-oriented crawler this does NOT upgrade http to https,
/// strip `www.`, or drop tracking parameters: the mirror must fetch exactly
/// the URL it was given, canonicalization only decides when two URLs are the
/// same page.
///
/// # Arguments
///
/// * `url_str` - The URL string to canonicalize
///
/// # Returns
///
/// * `Ok(Url)` - Canonical URL
/// * `Err(UrlError)` - Failed to parse or an unsupported scheme
pub fn canonicalize(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        params.sort_by(|a, b| a.0.cmp(&b.0));

        if params.is_empty() {
            url.set_query(None);
        } else {
            let query_string = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&query_string));
        }
    }

    Ok(url)
}

/// The string key used for visited-set and frontier dedup
pub fn canonical_key(url: &Url) -> String {
    match canonicalize(url.as_str()) {
        Ok(canonical) => canonical.to_string(),
        // Already-parsed URLs only fail canonicalization on scheme/host
        // grounds; fall back to the raw string so dedup still works.
        Err(_) => url.to_string(),
    }
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let mut normalized_segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                if !normalized_segments.is_empty() {
                    normalized_segments.pop();
                }
            }
            _ => normalized_segments.push(segment),
        }
    }

    if normalized_segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", normalized_segments.join("/"))
}
