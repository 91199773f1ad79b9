use std::time::Duration;

/// Default service hostname.
pub const DEFAULT_HOST: &str = "api.geonames.org";

/// Default timezone label used when coercing `datetime` fields.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Default strptime-style pattern used when coercing `datetime` fields.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Per-client options.
///
/// A config is consumed at client construction and is immutable for the
/// client's lifetime.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Service host. Either a bare host (`api.geonames.org`,
    /// `127.0.0.1:8080`) or a URL prefix with an explicit scheme.
    pub host: String,
    /// GeoNames username sent with every parameterized request.
    ///
    /// When absent, calls that require one are rejected by the remote
    /// service rather than validated locally.
    pub username: Option<String>,
    /// Timezone label combined with `datetime` fields before parsing.
    pub timezone: String,
    /// Pattern used to parse `datetime` fields, `%z` included.
    pub time_format: String,
    /// Optional per-request timeout. The platform default applies when unset.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            username: None,
            timezone: DEFAULT_TIMEZONE.to_owned(),
            time_format: DEFAULT_TIME_FORMAT.to_owned(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    #[must_use]
    pub fn with_time_format(mut self, time_format: impl Into<String>) -> Self {
        self.time_format = time_format.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
