//! Static catalogue of GeoNames operations.
//!
//! Every operation the service exposes is described by one
//! [`OperationDefinition`] in [`OPERATIONS`]. The table is the authoritative
//! contract with the remote service: parameter names are reproduced verbatim
//! from the public GeoNames REST documentation, and envelope keys match what
//! the live service returns (including the lowercase `postalcodes` key of
//! `postalCodeLookup`).

use crate::error::ClientError;

/// Payload shape of a successful response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Payload {
    /// The decoded body is returned unchanged.
    Document,
    /// A single record nested under the given envelope key. Unwraps to
    /// `null` when the key is absent.
    Record(&'static str),
    /// A list nested under the given envelope key. An absent or `null` key
    /// normalizes to an empty list, and a bare record to a one-element list.
    List(&'static str),
}

/// How the service formats the response body for an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Always JSON.
    Json,
    /// JSON unless the caller passes `type=xml`, in which case the raw body
    /// is returned undecoded. The dispatcher forces `type=JSON` otherwise.
    TypeParam,
    /// XML only. Calls fail with [`ClientError::NotImplemented`] before any
    /// request is sent.
    XmlOnly,
}

/// Metadata for one GeoNames operation.
#[derive(Clone, Copy, Debug)]
pub struct OperationDefinition {
    /// Wire operation name (for example `search`).
    pub name: &'static str,
    /// Request path under the service host.
    pub path: &'static str,
    /// Allowed query parameter names, as the service documents them.
    ///
    /// `username` is implicitly allowed for every operation whose list is
    /// non-empty and does not appear here.
    pub params: &'static [&'static str],
    /// Payload shape of a successful response.
    pub payload: Payload,
    /// Response body format behavior.
    pub format: ResponseFormat,
    /// Whether response records carry a `datetime` field to coerce.
    pub coerce_datetime: bool,
}

impl OperationDefinition {
    const fn new(
        name: &'static str,
        path: &'static str,
        params: &'static [&'static str],
        payload: Payload,
    ) -> Self {
        Self {
            name,
            path,
            params,
            payload,
            format: ResponseFormat::Json,
            coerce_datetime: false,
        }
    }

    const fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }

    const fn with_datetime(mut self) -> Self {
        self.coerce_datetime = true;
        self
    }
}

/// Every operation the service exposes, with its documented parameter list.
pub const OPERATIONS: &[OperationDefinition] = &[
    OperationDefinition::new("astergdem", "astergdemJSON", &["lat", "lng"], Payload::Document),
    OperationDefinition::new(
        "children",
        "childrenJSON",
        &["geonameId", "maxRows", "hierarchy"],
        Payload::List("geonames"),
    ),
    OperationDefinition::new(
        "cities",
        "citiesJSON",
        &["north", "south", "east", "west", "lang", "maxRows"],
        Payload::List("geonames"),
    ),
    OperationDefinition::new(
        "contains",
        "containsJSON",
        &["geonameId", "featureClass", "featureCode"],
        Payload::List("geonames"),
    ),
    OperationDefinition::new(
        "countryCode",
        "countryCode",
        &["lat", "lng", "type", "lang", "radius"],
        Payload::Document,
    )
    .with_format(ResponseFormat::TypeParam),
    OperationDefinition::new(
        "countryInfo",
        "countryInfoJSON",
        &["country", "lang"],
        Payload::List("geonames"),
    ),
    OperationDefinition::new(
        "countrySubdivision",
        "countrySubdivisionJSON",
        &["lat", "lng", "lang", "radius", "level"],
        Payload::Document,
    ),
    OperationDefinition::new(
        "earthquakes",
        "earthquakesJSON",
        &["north", "south", "east", "west", "date", "minMagnitude", "maxRows"],
        Payload::List("earthquakes"),
    )
    .with_datetime(),
    OperationDefinition::new(
        "extendedFindNearby",
        "extendedFindNearby",
        &["lat", "lng"],
        Payload::Document,
    )
    .with_format(ResponseFormat::XmlOnly),
    OperationDefinition::new(
        "findNearby",
        "findNearbyJSON",
        &["lat", "lng", "featureClass", "featureCode", "radius", "style", "localCountry", "maxRows"],
        Payload::List("geonames"),
    ),
    OperationDefinition::new(
        "findNearbyPlaceName",
        "findNearbyPlaceNameJSON",
        &["lat", "lng", "lang", "radius", "maxRows", "style", "localCountry", "cities"],
        Payload::List("geonames"),
    ),
    OperationDefinition::new(
        "findNearbyPostalCodes",
        "findNearbyPostalCodesJSON",
        &["lat", "lng", "radius", "maxRows", "style", "country", "localCountry", "isReduced", "postalcode"],
        Payload::List("postalCodes"),
    ),
    OperationDefinition::new(
        "findNearbyStreets",
        "findNearbyStreetsJSON",
        &["lat", "lng", "radius", "maxRows"],
        Payload::List("streetSegment"),
    ),
    OperationDefinition::new(
        "findNearbyStreetsOSM",
        "findNearbyStreetsOSMJSON",
        &["lat", "lng"],
        Payload::List("streetSegment"),
    ),
    OperationDefinition::new(
        "findNearByWeather",
        "findNearByWeatherJSON",
        &["lat", "lng"],
        Payload::Record("weatherObservation"),
    )
    .with_datetime(),
    OperationDefinition::new(
        "findNearbyWikipedia",
        "findNearbyWikipediaJSON",
        &["lat", "lng", "lang", "radius", "maxRows", "country", "postalcode"],
        Payload::List("geonames"),
    ),
    OperationDefinition::new(
        "get",
        "getJSON",
        &["geonameId", "lang", "style"],
        Payload::Document,
    ),
    OperationDefinition::new("gtopo30", "gtopo30JSON", &["lat", "lng"], Payload::Document),
    OperationDefinition::new(
        "hierarchy",
        "hierarchyJSON",
        &["geonameId"],
        Payload::List("geonames"),
    ),
    OperationDefinition::new(
        "neighbourhood",
        "neighbourhoodJSON",
        &["lat", "lng"],
        Payload::Record("neighbourhood"),
    ),
    OperationDefinition::new(
        "neighbours",
        "neighboursJSON",
        &["geonameId", "country"],
        Payload::List("geonames"),
    ),
    OperationDefinition::new(
        "ocean",
        "oceanJSON",
        &["lat", "lng", "radius"],
        Payload::Record("ocean"),
    ),
    OperationDefinition::new(
        "postalCodeCountryInfo",
        "postalCodeCountryInfoJSON",
        &[],
        Payload::List("geonames"),
    ),
    OperationDefinition::new(
        "postalCodeLookup",
        "postalCodeLookupJSON",
        &["postalcode", "country", "maxRows", "charset"],
        Payload::List("postalcodes"),
    ),
    OperationDefinition::new(
        "postalCodeSearch",
        "postalCodeSearchJSON",
        &[
            "postalcode",
            "postalcode_startsWith",
            "placename",
            "placename_startsWith",
            "country",
            "countryBias",
            "maxRows",
            "style",
            "operator",
            "charset",
            "isReduced",
        ],
        Payload::List("postalCodes"),
    ),
    OperationDefinition::new(
        "search",
        "searchJSON",
        &[
            "q",
            "name",
            "name_equals",
            "name_startsWith",
            "maxRows",
            "startRow",
            "country",
            "countryBias",
            "continentCode",
            "adminCode1",
            "adminCode2",
            "adminCode3",
            "cities",
            "lang",
            "type",
            "style",
            "isNameRequired",
            "tag",
            "operator",
            "charset",
            "fuzzy",
            "east",
            "west",
            "north",
            "south",
            "searchlang",
            "orderby",
            "inclBbox",
        ],
        Payload::List("geonames"),
    ),
    OperationDefinition::new(
        "siblings",
        "siblingsJSON",
        &["geonameId"],
        Payload::List("geonames"),
    ),
    OperationDefinition::new("srtm1", "srtm1JSON", &["lat", "lng"], Payload::Document),
    OperationDefinition::new("srtm3", "srtm3JSON", &["lat", "lng"], Payload::Document),
    OperationDefinition::new(
        "timezone",
        "timezoneJSON",
        &["lat", "lng", "radius", "lang", "date"],
        Payload::Document,
    ),
    OperationDefinition::new(
        "weather",
        "weatherJSON",
        &["north", "south", "east", "west", "maxRows"],
        Payload::List("weatherObservations"),
    )
    .with_datetime(),
    OperationDefinition::new(
        "weatherIcao",
        "weatherIcaoJSON",
        &["ICAO"],
        Payload::Record("weatherObservation"),
    )
    .with_datetime(),
    OperationDefinition::new(
        "wikipediaBoundingBox",
        "wikipediaBoundingBoxJSON",
        &["north", "south", "east", "west", "lang", "maxRows"],
        Payload::List("geonames"),
    ),
    OperationDefinition::new(
        "wikipediaSearch",
        "wikipediaSearchJSON",
        &["q", "title", "lang", "maxRows"],
        Payload::List("geonames"),
    ),
];

pub(crate) fn find_operation(name: &str) -> Result<&'static OperationDefinition, ClientError> {
    OPERATIONS
        .iter()
        .find(|op| op.name == name)
        .ok_or_else(|| ClientError::InvalidOperation(name.to_owned()))
}
