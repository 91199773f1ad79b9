//! URL templates and request planning.

use std::collections::HashMap;

use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::params::{ParamValue, RequestParams};
use crate::registry::{OPERATIONS, OperationDefinition, ResponseFormat, find_operation};

/// Reusable URL template for one operation.
///
/// The allowed query names are the operation's declared parameters plus
/// `username`, deduplicated and sorted, so rendered templates are stable.
/// Query parameter order carries no meaning for the service.
#[derive(Clone, Debug)]
pub struct UrlTemplate {
    path: &'static str,
    query_names: Vec<&'static str>,
}

impl UrlTemplate {
    /// Builds the template for an operation.
    ///
    /// Operations with no declared parameters get a bare path: no query
    /// string, and no implicit `username` either.
    pub fn for_operation(op: &OperationDefinition) -> Self {
        let query_names = if op.params.is_empty() {
            Vec::new()
        } else {
            let mut names = op.params.to_vec();
            names.push("username");
            names.sort_unstable();
            names.dedup();
            names
        };
        Self {
            path: op.path,
            query_names,
        }
    }

    /// Allowed query parameter names in expansion order.
    pub fn query_names(&self) -> &[&'static str] {
        &self.query_names
    }

    /// Renders the template in optional-query-expansion form, for example
    /// `http://{host}/oceanJSON{?lat,lng,radius,username}`.
    pub fn render(&self) -> String {
        if self.query_names.is_empty() {
            format!("http://{{host}}/{}", self.path)
        } else {
            format!("http://{{host}}/{}{{?{}}}", self.path, self.query_names.join(","))
        }
    }

    /// Expands the template against a host and merged parameters.
    ///
    /// Parameters without a supplied, non-empty value are omitted from the
    /// URL entirely, and supplied names outside the allowed list are never
    /// substituted. Values are percent-encoded as form-urlencoded query
    /// pairs; list values expand to one pair per element in array order.
    pub(crate) fn expand(&self, host: &str, params: &RequestParams) -> Result<Url, ClientError> {
        let host = host.trim_end_matches('/');
        let base = if host.contains("://") {
            format!("{host}/{}", self.path)
        } else {
            format!("http://{host}/{}", self.path)
        };
        let mut url = Url::parse(&base).map_err(|_| ClientError::InvalidUrl(base.clone()))?;

        {
            let mut pairs = url.query_pairs_mut();
            for name in self.query_names.iter().copied() {
                let Some(value) = params.get(name) else {
                    continue;
                };
                if value.is_empty() {
                    continue;
                }
                for item in value.query_values() {
                    pairs.append_pair(name, &item);
                }
            }
        }
        // query_pairs_mut leaves a dangling '?' when nothing was appended
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }
}

/// Request mode chosen at planning time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RequestMode {
    Json,
    RawText,
}

/// A fully expanded request, ready for the transport layer.
#[derive(Debug)]
pub(crate) struct PlannedRequest {
    pub(crate) op: &'static OperationDefinition,
    pub(crate) url: Url,
    pub(crate) mode: RequestMode,
}

/// Turns operation calls into concrete request URLs.
///
/// Templates are built once at construction and reused for the planner's
/// lifetime; nothing here is mutated after that, so clients sharing a
/// planner are safe to use from concurrent tasks.
#[derive(Clone, Debug)]
pub(crate) struct RequestPlanner {
    config: ClientConfig,
    templates: HashMap<&'static str, UrlTemplate>,
}

impl RequestPlanner {
    pub(crate) fn new(config: ClientConfig) -> Self {
        let templates = OPERATIONS
            .iter()
            .map(|op| (op.name, UrlTemplate::for_operation(op)))
            .collect();
        Self { config, templates }
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn template(&self, operation: &str) -> Result<&UrlTemplate, ClientError> {
        self.templates
            .get(operation)
            .ok_or_else(|| ClientError::InvalidOperation(operation.to_owned()))
    }

    /// Expands an operation call into a concrete URL and dispatch mode.
    ///
    /// The configured host always provides the URL authority, and a
    /// configured username overrides a caller-supplied `username` value.
    /// Every other parameter is caller-controlled; this asymmetry matches
    /// the historical behavior of the service's client libraries and is
    /// kept for compatibility.
    pub(crate) fn plan(
        &self,
        operation: &str,
        params: &RequestParams,
    ) -> Result<PlannedRequest, ClientError> {
        let op = find_operation(operation)?;
        if op.format == ResponseFormat::XmlOnly {
            return Err(ClientError::NotImplemented(op.name));
        }

        let mut merged = params.clone();
        let mut mode = RequestMode::Json;
        if op.format == ResponseFormat::TypeParam {
            let wants_xml = params
                .get("type")
                .and_then(ParamValue::as_text)
                .is_some_and(|value| value.eq_ignore_ascii_case("xml"));
            if wants_xml {
                mode = RequestMode::RawText;
            } else {
                merged.insert("type", "JSON");
            }
        }
        if let Some(username) = &self.config.username {
            if !username.is_empty() {
                merged.insert("username", username.clone());
            }
        }

        let url = self.template(op.name)?.expand(&self.config.host, &merged)?;
        debug!(operation = op.name, url = %url, "expanded request");
        Ok(PlannedRequest { op, url, mode })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{RequestMode, RequestPlanner, UrlTemplate};
    use crate::config::ClientConfig;
    use crate::error::ClientError;
    use crate::params::RequestParams;
    use crate::registry::{OPERATIONS, find_operation};

    fn planner() -> RequestPlanner {
        RequestPlanner::new(ClientConfig::new().with_username("demo"))
    }

    #[test]
    fn every_template_covers_declared_params_plus_username() {
        for op in OPERATIONS {
            let template = UrlTemplate::for_operation(op);
            let names = template.query_names();
            let unique: HashSet<_> = names.iter().collect();
            assert_eq!(unique.len(), names.len(), "duplicate name in {}", op.name);

            if op.params.is_empty() {
                assert!(names.is_empty(), "{} should have a bare template", op.name);
            } else {
                assert_eq!(names.len(), op.params.len() + 1);
                assert!(names.contains(&"username"));
                for param in op.params {
                    assert!(names.contains(param), "{} lost {param}", op.name);
                }
                let mut sorted = names.to_vec();
                sorted.sort_unstable();
                assert_eq!(sorted.as_slice(), names, "{} is not sorted", op.name);
            }
        }
    }

    #[test]
    fn template_includes_declared_params_plus_username_sorted() {
        let op = find_operation("ocean").expect("operation exists");
        let template = UrlTemplate::for_operation(op);
        assert_eq!(template.render(), "http://{host}/oceanJSON{?lat,lng,radius,username}");
    }

    #[test]
    fn zero_parameter_operation_renders_a_bare_path() {
        let op = find_operation("postalCodeCountryInfo").expect("operation exists");
        let template = UrlTemplate::for_operation(op);
        assert!(template.query_names().is_empty());
        assert_eq!(template.render(), "http://{host}/postalCodeCountryInfoJSON");
    }

    #[test]
    fn expansion_omits_parameters_without_values() {
        let params = RequestParams::new().set("lat", 0).set("radius", "");
        let plan = planner().plan("ocean", &params).expect("plan");
        assert_eq!(plan.url.query(), Some("lat=0&username=demo"));
    }

    #[test]
    fn zero_parameter_operation_expands_without_a_query_string() {
        let plan = planner()
            .plan("postalCodeCountryInfo", &RequestParams::new())
            .expect("plan");
        assert_eq!(plan.url.query(), None);
        assert_eq!(plan.url.path(), "/postalCodeCountryInfoJSON");
    }

    #[test]
    fn array_values_expand_to_repeated_keys_in_order() {
        let params = RequestParams::new()
            .set("q", "x")
            .set("country", vec!["FR", "GP"]);
        let plan = planner().plan("search", &params).expect("plan");
        assert_eq!(
            plan.url.query(),
            Some("country=FR&country=GP&q=x&username=demo")
        );
    }

    #[test]
    fn values_are_percent_encoded_and_round_trip() {
        let params = RequestParams::new()
            .set("q", "a b&c=d?e")
            .set("name", "東京");
        let plan = planner().plan("search", &params).expect("plan");
        let query = plan.url.query().expect("query present");
        assert!(!query.contains("c=d"), "reserved characters must be encoded: {query}");

        let decoded: Vec<(String, String)> = plan
            .url
            .query_pairs()
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();
        assert!(decoded.contains(&("q".to_owned(), "a b&c=d?e".to_owned())));
        assert!(decoded.contains(&("name".to_owned(), "東京".to_owned())));
    }

    #[test]
    fn supplied_names_outside_the_allowed_list_are_dropped() {
        let params = RequestParams::new().set("lat", 1).set("verbosity", "11");
        let plan = planner().plan("ocean", &params).expect("plan");
        assert_eq!(plan.url.query(), Some("lat=1&username=demo"));
    }

    #[test]
    fn config_username_overrides_caller_value() {
        let params = RequestParams::new().set("lat", 1).set("username", "caller");
        let plan = planner().plan("ocean", &params).expect("plan");
        assert_eq!(plan.url.query(), Some("lat=1&username=demo"));
    }

    #[test]
    fn caller_username_survives_when_config_has_none() {
        let planner = RequestPlanner::new(ClientConfig::new());
        let params = RequestParams::new().set("lat", 1).set("username", "caller");
        let plan = planner.plan("ocean", &params).expect("plan");
        assert_eq!(plan.url.query(), Some("lat=1&username=caller"));
    }

    #[test]
    fn config_host_provides_the_authority() {
        let params = RequestParams::new().set("lat", 1).set("host", "evil.example");
        let plan = planner().plan("ocean", &params).expect("plan");
        assert_eq!(plan.url.host_str(), Some("api.geonames.org"));
    }

    #[test]
    fn scheme_prefixed_hosts_are_used_verbatim() {
        let planner = RequestPlanner::new(ClientConfig::new().with_host("https://example.org"));
        let plan = planner.plan("ocean", &RequestParams::new()).expect("plan");
        assert_eq!(plan.url.scheme(), "https");
        assert_eq!(plan.url.host_str(), Some("example.org"));
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let error = planner()
            .plan("teleport", &RequestParams::new())
            .expect_err("unknown operation");
        assert!(matches!(error, ClientError::InvalidOperation(_)));
    }

    #[test]
    fn country_code_defaults_to_json_type() {
        let params = RequestParams::new().set("lat", 47.03).set("lng", 10.2);
        let plan = planner().plan("countryCode", &params).expect("plan");
        assert_eq!(plan.mode, RequestMode::Json);
        assert_eq!(
            plan.url.query(),
            Some("lat=47.03&lng=10.2&type=JSON&username=demo")
        );
    }

    #[test]
    fn country_code_xml_requests_raw_text() {
        let params = RequestParams::new()
            .set("lat", 47.03)
            .set("lng", 10.2)
            .set("type", "XML");
        let plan = planner().plan("countryCode", &params).expect("plan");
        assert_eq!(plan.mode, RequestMode::RawText);
        assert_eq!(
            plan.url.query(),
            Some("lat=47.03&lng=10.2&type=XML&username=demo")
        );
    }

    #[test]
    fn xml_only_operation_fails_before_expansion() {
        let params = RequestParams::new().set("lat", 1).set("lng", 2);
        let error = planner()
            .plan("extendedFindNearby", &params)
            .expect_err("unsupported operation");
        match error {
            ClientError::NotImplemented(name) => assert_eq!(name, "extendedFindNearby"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
