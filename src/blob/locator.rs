use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("signed URL must be http(s), got '{0}'")]
    UnsupportedScheme(String),

    #[error("signed URL has no host")]
    MissingHost,

    #[error("failed to build blob URL: {0}")]
    Build(String),
}

/// A signed URL split into origin, container and SAS query
///
/// Brokers hand out either an account-root URL (`https://acct.host?sig`) or a
/// container-scoped one (`https://acct.host/container/some/path?sig`); both
/// resolve to the same shape here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedLocator {
    origin: String,
    container: String,
    query: Option<String>,
}

impl SignedLocator {
    pub fn parse(signed_url: &Url, default_container: &str) -> Result<Self, LocatorError> {
        if !matches!(signed_url.scheme(), "http" | "https") {
            return Err(LocatorError::UnsupportedScheme(
                signed_url.scheme().to_string(),
            ));
        }
        if !signed_url.has_host() {
            return Err(LocatorError::MissingHost);
        }

        let container = signed_url
            .path_segments()
            .and_then(|mut segments| segments.find(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| default_container.to_string());

        Ok(Self {
            origin: signed_url.origin().ascii_serialization(),
            container,
            query: signed_url.query().filter(|q| !q.is_empty()).map(str::to_string),
        })
    }

    /// Scheme, host and non-default port, without a trailing slash
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// `origin/container/<blob_path>?query`, each path segment percent-encoded
    pub fn blob_url(&self, blob_path: &str) -> Result<Url, LocatorError> {
        let mut url = Url::parse(&self.origin).map_err(|e| LocatorError::Build(e.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| LocatorError::Build(format!("'{}' cannot be a base", self.origin)))?;
            segments.pop_if_empty().push(&self.container);
            for segment in blob_path.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
        }
        url.set_query(self.query.as_deref());
        Ok(url)
    }
}
