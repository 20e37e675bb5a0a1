use url::Url;

pub const DEFAULT_BASE_URL: &str = "ws://localhost:8020/agent/";

/// Endpoint path, one per operating mode of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPath {
    PlayGround,
    LiveStreaming,
}

impl StreamPath {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamPath::PlayGround => "PlayGround/",
            StreamPath::LiveStreaming => "LiveStreaming/",
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
    #[error("unsupported scheme {0:?}; expected ws or wss")]
    UnsupportedScheme(String),
    #[error("token must not be empty")]
    EmptyToken,
}

/// Base address of the backend's streaming endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    pub fn parse(base: &str) -> Result<Self, EndpointError> {
        let mut base = Url::parse(base).map_err(|err| EndpointError::InvalidUrl(err.to_string()))?;
        if !matches!(base.scheme(), "ws" | "wss") {
            return Err(EndpointError::UnsupportedScheme(base.scheme().to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { base })
    }

    /// `<base><path>?token=<token>`, token percent-encoded.
    pub fn url_for(&self, path: StreamPath, token: &str) -> Result<Url, EndpointError> {
        if token.is_empty() {
            return Err(EndpointError::EmptyToken);
        }
        let mut url = self
            .base
            .join(path.as_str())
            .map_err(|err| EndpointError::InvalidUrl(err.to_string()))?;
        url.query_pairs_mut().append_pair("token", token);
        Ok(url)
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
        }
    }
}
