//! Client library for the GeoNames geographical web services.
//!
//! Every call is a single stateless GET round trip: the operation name is
//! looked up in a static registry, its URL template is expanded with the
//! supplied parameters, and the JSON response is decoded, checked for the
//! service error envelope, and unwrapped to its payload. There is no
//! caching, no retry and no connection-reuse contract; calls that want
//! concurrency issue independent requests from independent tasks.
//!
//! Public API layers:
//! - [`GeoNamesClient`]/[`BlockingGeoNamesClient`]: operation dispatch clients.
//! - [`ClientConfig`]: per-client options (host, username, datetime handling).
//! - [`RequestParams`]/[`ParamValue`]: per-call query parameters.
//! - [`ClientError`]: unified error type used by both clients.
//!
//! The operation registry is a static table reproducing the service's
//! documented parameter lists; see [`OPERATIONS`].

mod blocking_client;
mod client;
mod config;
mod error;
mod params;
mod registry;
mod response;
mod template;

/// Blocking operation client.
pub use blocking_client::BlockingGeoNamesClient;
/// Async operation client.
pub use client::GeoNamesClient;
pub use config::{ClientConfig, DEFAULT_HOST, DEFAULT_TIMEZONE, DEFAULT_TIME_FORMAT};
pub use error::ClientError;
pub use params::{ParamValue, RequestParams};
pub use registry::{OPERATIONS, OperationDefinition, Payload, ResponseFormat};
pub use response::{RemoteStatus, parse_datetime};
pub use template::UrlTemplate;
