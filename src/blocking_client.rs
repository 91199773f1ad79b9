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

/// Blocking GeoNames client.
///
/// This is the synchronous counterpart of [`crate::GeoNamesClient`]. Each
/// call blocks the invoking thread for one GET round trip; a failed call
/// fails once and is never retried.
#[derive(Debug)]
pub struct BlockingGeoNamesClient {
    planner: RequestPlanner,
    http: reqwest::blocking::Client,
}

impl BlockingGeoNamesClient {
    /// Creates a client from the given options.
    ///
    /// URL templates for every registered operation are built here and
    /// reused for the client's lifetime.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::blocking::Client::builder();
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
    pub fn call(&self, operation: &str, params: &RequestParams) -> Result<Value, ClientError> {
        let planned = self.planner.plan(operation, params)?;
        match planned.mode {
            RequestMode::RawText => Ok(Value::String(self.fetch_text(planned.url)?)),
            RequestMode::Json => {
                let body = self.fetch_json(planned.url)?;
                postprocess(planned.op, body, self.planner.config())
            }
        }
    }

    /// Calls an operation and returns the unparsed response body.
    pub fn call_text(&self, operation: &str, params: &RequestParams) -> Result<String, ClientError> {
        let planned = self.planner.plan(operation, params)?;
        self.fetch_text(planned.url)
    }

    fn fetch_json(&self, url: Url) -> Result<Value, ClientError> {
        debug!(url = %url, "sending GET request");
        let response = self.http.get(url).header(ACCEPT, "application/json").send()?;
        let status = response.status();
        let body = response.text()?;
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(_) if !status.is_success() => Err(ClientError::HttpStatus { status, body }),
            Err(error) => Err(error.into()),
        }
    }

    fn fetch_text(&self, url: Url) -> Result<String, ClientError> {
        debug!(url = %url, "sending GET request");
        let response = self.http.get(url).send()?;
        let status = response.status();
        let body = response.text()?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(ClientError::HttpStatus { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use serde_json::json;

    use super::BlockingGeoNamesClient;
    use crate::config::ClientConfig;
    use crate::error::ClientError;
    use crate::params::RequestParams;

    /// Serves exactly one canned HTTP response on a local port.
    fn serve_once(
        status_line: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = [0u8; 4096];
                let _ = stream.read(&mut request);
                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {length}\r\nConnection: close\r\n\r\n{body}",
                    length = body.len(),
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("127.0.0.1:{}", addr.port())
    }

    fn client_for(host: String) -> BlockingGeoNamesClient {
        BlockingGeoNamesClient::new(ClientConfig::new().with_host(host).with_username("demo"))
            .expect("client")
    }

    #[test]
    fn unwraps_enveloped_record() {
        let host = serve_once(
            "200 OK",
            "application/json",
            r#"{"ocean":{"name":"North Atlantic Ocean"}}"#,
        );
        let params = RequestParams::new().set("lat", 0).set("lng", 0);
        let value = client_for(host).call("ocean", &params).expect("ocean call");
        assert_eq!(value, json!({"name": "North Atlantic Ocean"}));
    }

    #[test]
    fn reports_the_service_error_envelope() {
        let host = serve_once(
            "200 OK",
            "application/json",
            r#"{"status":{"message":"user does not exist.","value":10}}"#,
        );
        let params = RequestParams::new().set("lat", 0).set("lng", 0);
        let error = client_for(host)
            .call("ocean", &params)
            .expect_err("error envelope");
        match error {
            ClientError::Remote { value, message } => {
                assert_eq!(value, 10);
                assert_eq!(message, "user does not exist.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn returns_raw_text_when_country_code_asks_for_xml() {
        let host = serve_once(
            "200 OK",
            "text/xml",
            "<geonames><countryCode>AT</countryCode></geonames>",
        );
        let params = RequestParams::new()
            .set("lat", 47.03)
            .set("lng", 10.2)
            .set("type", "xml");
        let value = client_for(host)
            .call("countryCode", &params)
            .expect("raw call");
        assert_eq!(
            value,
            json!("<geonames><countryCode>AT</countryCode></geonames>")
        );
    }

    #[test]
    fn invalid_json_body_is_a_decode_error() {
        let host = serve_once("200 OK", "text/html", "<html>oops</html>");
        let params = RequestParams::new().set("lat", 0).set("lng", 0);
        let error = client_for(host)
            .call("ocean", &params)
            .expect_err("bad body");
        assert!(matches!(error, ClientError::Decode(_)));
    }

    #[test]
    fn non_success_status_with_non_json_body_surfaces_http_status() {
        let host = serve_once("503 Service Unavailable", "text/plain", "try later");
        let params = RequestParams::new().set("lat", 0).set("lng", 0);
        let error = client_for(host)
            .call("ocean", &params)
            .expect_err("http failure");
        match error {
            ClientError::HttpStatus { status, body } => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body, "try later");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn xml_only_operation_never_reaches_the_network() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        listener.set_nonblocking(true).expect("nonblocking listener");

        let client = client_for(format!("127.0.0.1:{}", addr.port()));
        let params = RequestParams::new().set("lat", 1).set("lng", 2);
        let error = client
            .call("extendedFindNearby", &params)
            .expect_err("unsupported operation");
        assert!(matches!(error, ClientError::NotImplemented(_)));

        match listener.accept() {
            Err(error) => assert_eq!(error.kind(), std::io::ErrorKind::WouldBlock),
            Ok(_) => panic!("a request was sent for an unsupported operation"),
        }
    }
}
