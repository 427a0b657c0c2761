use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use url::Url;

use crate::source::FetchError;
use crate::SummarizerError;

/// Proxy schemes reqwest can route through
const PROXY_SCHEMES: &[&str] = &["http", "https", "socks5", "socks5h"];

/// Network routing for a single transcript fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkRouting {
    /// Proxy endpoint URI
    pub proxy: Option<String>,

    /// Netscape-format cookie file used to authorize requests
    pub cookie_path: Option<PathBuf>,
}

impl NetworkRouting {
    /// Routing without proxy or cookies
    pub fn direct() -> Self {
        Self::default()
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_path = Some(path.into());
        self
    }
}

/// Where the cookie file for a request comes from
#[derive(Debug, Clone)]
pub enum CookieSource {
    /// A cookie file already on disk
    Path(PathBuf),

    /// Cookie file contents uploaded by the caller.
    ///
    /// Used by library hosts that receive the file as bytes (a web form upload, say).
    /// The CLI always passes [`CookieSource::Path`].
    Uploaded(Vec<u8>),
}

/// Routing options as received at the pipeline boundary
#[derive(Debug, Clone, Default)]
pub struct RoutingRequest {
    pub proxy: Option<String>,
    pub cookies: Option<CookieSource>,
}

impl RoutingRequest {
    pub fn new(proxy: Option<String>, cookies: Option<CookieSource>) -> Self {
        Self { proxy, cookies }
    }

    /// Check the proxy URI without touching the network
    pub fn validate(&self) -> Result<(), SummarizerError> {
        if let Some(proxy) = &self.proxy {
            validate_proxy(proxy)?;
        }
        Ok(())
    }

    /// Resolve into a concrete routing, writing uploaded cookies to a temporary file.
    ///
    /// The temporary file lives as long as the returned [`ScopedRouting`] and is removed
    /// when it is dropped.
    pub fn materialize(&self) -> Result<ScopedRouting, SummarizerError> {
        let proxy = self
            .proxy
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        let (cookie_path, cookie_file) = match &self.cookies {
            None => (None, None),
            Some(CookieSource::Path(path)) => (Some(path.clone()), None),
            Some(CookieSource::Uploaded(bytes)) => {
                if bytes.is_empty() {
                    return Err(SummarizerError::Validation("Uploaded cookie file is empty".to_string()));
                }
                let file = write_temp_cookie_file(bytes)?;
                tracing::debug!("Wrote uploaded cookies to: {}", file.path().display());
                (Some(file.path().to_path_buf()), Some(file))
            }
        };

        Ok(ScopedRouting {
            routing: NetworkRouting { proxy, cookie_path },
            cookie_file,
        })
    }
}

/// A routing plus the temporary resources it depends on
#[derive(Debug)]
pub struct ScopedRouting {
    routing: NetworkRouting,
    cookie_file: Option<NamedTempFile>,
}

impl ScopedRouting {
    pub fn routing(&self) -> &NetworkRouting {
        &self.routing
    }

    /// Path of the temporary cookie file, if one was written for this request
    #[cfg(test)]
    pub fn temp_cookie_path(&self) -> Option<&Path> {
        self.cookie_file.as_ref().map(|f| f.path())
    }
}

fn write_temp_cookie_file(bytes: &[u8]) -> Result<NamedTempFile, SummarizerError> {
    let mut file = tempfile::Builder::new()
        .prefix("cookies-")
        .suffix(".txt")
        .tempfile()
        .map_err(|e| FetchError::Cookies(format!("failed to create temporary cookie file: {}", e)))?;

    file.write_all(bytes)
        .and_then(|_| file.flush())
        .map_err(|e| FetchError::Cookies(format!("failed to write temporary cookie file: {}", e)))?;

    Ok(file)
}

/// Validate a proxy URI
pub fn validate_proxy(proxy: &str) -> Result<Url, SummarizerError> {
    let parsed = Url::parse(proxy.trim())
        .map_err(|_| SummarizerError::Validation(format!("Invalid proxy URI: {}", proxy)))?;

    if !PROXY_SCHEMES.contains(&parsed.scheme()) {
        return Err(SummarizerError::Validation(format!(
            "Proxy must use one of {} (got {})",
            PROXY_SCHEMES.join(", "),
            parsed.scheme()
        )));
    }

    Ok(parsed)
}

/// A single cookie from a Netscape cookie file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub domain: String,
    pub name: String,
    pub value: String,
}

/// Cookies loaded from a Netscape-format cookie file (as exported by browser extensions)
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn from_netscape_file(path: &Path) -> Result<Self, FetchError> {
        let content = fs_err::read_to_string(path)
            .map_err(|e| FetchError::Cookies(format!("cannot read {}: {}", path.display(), e)))?;

        let jar = Self::parse_netscape(&content);
        if jar.cookies.is_empty() {
            return Err(FetchError::Cookies(format!(
                "no cookies found in {} (expected Netscape cookie file format)",
                path.display()
            )));
        }

        Ok(jar)
    }

    pub fn parse_netscape(content: &str) -> Self {
        let cookies = content
            .lines()
            .filter_map(|line| {
                let line = line.trim_end_matches('\r');
                let line = line.strip_prefix("#HttpOnly_").unwrap_or(line);
                if line.trim().is_empty() || line.starts_with('#') {
                    return None;
                }

                let fields: Vec<&str> = line.split('\t').collect();
                if fields.len() != 7 {
                    return None;
                }

                Some(Cookie {
                    domain: fields[0].to_string(),
                    name: fields[5].to_string(),
                    value: fields[6].to_string(),
                })
            })
            .collect();

        Self { cookies }
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Build a `Cookie` header value with every cookie that applies to `host`
    pub fn header_for(&self, host: &str) -> Option<String> {
        let header = self
            .cookies
            .iter()
            .filter(|cookie| domain_matches(&cookie.domain, host))
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>()
            .join("; ");

        if header.is_empty() {
            None
        } else {
            Some(header)
        }
    }
}

fn domain_matches(cookie_domain: &str, host: &str) -> bool {
    let domain = cookie_domain.trim_start_matches('.');
    host.eq_ignore_ascii_case(domain)
        || host
            .to_ascii_lowercase()
            .ends_with(&format!(".{}", domain.to_ascii_lowercase()))
}
