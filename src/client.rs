use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::params::RequestParams;
use crate::registry::{OPERATIONS, OperationDefinition};
use crate::response::postprocess;
use crate::template::{RequestMode, RequestPlanner};

/// Async GeoNames client.
///
/// This is the asynchronous counterpart of [`crate::BlockingGeoNamesClient`].
/// Each call is a single stateless GET round trip; the client holds no
/// mutable state beyond its immutable options and templates, so it is safe
/// to share across tasks.
#[derive(Clone, Debug)]
pub struct GeoNamesClient {
    planner: RequestPlanner,
    http: reqwest::Client,
}

impl GeoNamesClient {
    /// Creates a client from the given options.
    ///
    /// URL templates for every registered operation are built here and
    /// reused for the client's lifetime.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self {
            planner: RequestPlanner::new(config),
            http,
        })
    }

    /// Returns the static operation catalogue.
    pub fn operations() -> &'static [OperationDefinition] {
        OPERATIONS
    }

    /// Renders the URL template for one operation, for example
    /// `http://{host}/oceanJSON{?lat,lng,radius,username}`.
    pub fn url_template(&self, operation: &str) -> Result<String, ClientError> {
        Ok(self.planner.template(operation)?.render())
    }

    /// Calls an operation and returns its post-processed payload.
    ///
    /// Supplied parameters outside the operation's allowed list are silently
    /// dropped. The decoded body is checked for the service error envelope
    /// before any envelope key is unwrapped. `countryCode` with `type=xml`
    /// skips JSON decoding and returns the raw body as a JSON string value.
    pub async fn call(
        &self,
        operation: &str,
        params: &RequestParams,
    ) -> Result<Value, ClientError> {
        let planned = self.planner.plan(operation, params)?;
        match planned.mode {
            RequestMode::RawText => Ok(Value::String(self.fetch_text(planned.url).await?)),
            RequestMode::Json => {
                let body = self.fetch_json(planned.url).await?;
                postprocess(planned.op, body, self.planner.config())
            }
        }
    }

    /// Calls an operation and returns the unparsed response body.
    pub async fn call_text(
        &self,
        operation: &str,
        params: &RequestParams,
    ) -> Result<String, ClientError> {
        let planned = self.planner.plan(operation, params)?;
        self.fetch_text(planned.url).await
    }

    async fn fetch_json(&self, url: Url) -> Result<Value, ClientError> {
        debug!(url = %url, "sending GET request");
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(_) if !status.is_success() => Err(ClientError::HttpStatus { status, body }),
            Err(error) => Err(error.into()),
        }
    }

    async fn fetch_text(&self, url: Url) -> Result<String, ClientError> {
        debug!(url = %url, "sending GET request");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(ClientError::HttpStatus { status, body })
        }
    }
}
