use std::collections::HashMap;
use url::Url;

use super::ConfigError;

/// Immutable descriptor of the delivery target.
///
/// Built once from the raw configuration strings; scheme, host, port and path
/// always form a syntactically valid absolute URL.
#[derive(Debug, Clone)]
pub struct Endpoint {
    url: Url,
    extra_headers: HashMap<String, String>,
}

impl Endpoint {
    /// Parses and validates the endpoint URL and additional-header string.
    pub fn parse(raw_url: &str, raw_headers: Option<&str>) -> Result<Self, ConfigError> {
        let url = Url::parse(raw_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("'{raw_url}': {e}")))?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::InvalidUrl(format!(
                    "'{raw_url}': unsupported scheme '{other}'"
                )));
            }
        }

        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!("'{raw_url}': missing host")));
        }

        let extra_headers = match raw_headers {
            Some(raw) => parse_headers(raw)?,
            None => HashMap::new(),
        };

        Ok(Self { url, extra_headers })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn port(&self) -> u16 {
        // http/https always have a known default port
        self.url.port_or_known_default().unwrap_or(80)
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Static headers attached to every request, last-write-wins on duplicates.
    pub fn extra_headers(&self) -> &HashMap<String, String> {
        &self.extra_headers
    }
}

/// Splits a comma-separated `key=value` list, exactly one split per pair at
/// the first `=` (values may themselves contain `=`).
fn parse_headers(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut headers = HashMap::new();
    if raw.is_empty() {
        return Ok(headers);
    }

    for pair in raw.split(',') {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(ConfigError::InvalidHeaders(format!(
                "'{pair}' is not a key=value pair"
            )));
        };
        headers.insert(key.to_string(), value.to_string());
    }

    Ok(headers)
}
