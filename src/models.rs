// WFS capability model for geoprobe
// Decodes a GetCapabilities (or service-exception) response into plain data.
// The schema is treated as a permissive superset: anything missing from the
// body defaults to empty rather than failing the decode.

use crate::errors::ProbeError;
use serde::Deserialize;

/// Root of a WFS 1.0.0 `GetCapabilities` response.
///
/// The same shape also carries GeoServer's service-exception reports, so the
/// injection probe reuses this decoder to read the exception text out of an
/// error response. Immutable once decoded.
#[derive(Debug, Default, Deserialize)]
pub struct WfsCapabilities {
    #[serde(rename = "@version", default)]
    pub version: String,
    #[serde(rename = "@schemaLocation", default)]
    pub schema_location: String,
    #[serde(rename = "Service", default)]
    pub service: Service,
    #[serde(rename = "FeatureTypeList", default)]
    pub feature_type_list: FeatureTypeList,
    #[serde(rename = "ServiceException", default)]
    pub service_exception: Option<ServiceException>,
}

/// Free-form service metadata. All fields optional strings.
#[derive(Debug, Default, Deserialize)]
pub struct Service {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Abstract", default)]
    pub abstract_text: String,
    #[serde(rename = "Keywords", default)]
    pub keywords: String,
    #[serde(rename = "OnlineResource", default)]
    pub online_resource: String,
    #[serde(rename = "Fees", default)]
    pub fees: String,
    #[serde(rename = "AccessConstraints", default)]
    pub access_constraints: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeatureTypeList {
    #[serde(rename = "FeatureType", default)]
    pub feature_types: Vec<FeatureType>,
}

/// One queryable layer/table. `name` is the identifier used as `typeName`
/// in every downstream request; duplicates are tolerated and an empty name
/// is a degenerate entry the caller is expected to skip.
#[derive(Debug, Default, Deserialize)]
pub struct FeatureType {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Abstract", default)]
    pub abstract_text: String,
    #[serde(rename = "Keywords", default)]
    pub keywords: String,
    #[serde(rename = "SRS", default)]
    pub srs: String,
    #[serde(rename = "LatLongBoundingBox", default)]
    pub bounding_box: LatLongBoundingBox,
}

#[derive(Debug, Default, Deserialize)]
pub struct LatLongBoundingBox {
    #[serde(rename = "@minx", default)]
    pub min_x: String,
    #[serde(rename = "@miny", default)]
    pub min_y: String,
    #[serde(rename = "@maxx", default)]
    pub max_x: String,
    #[serde(rename = "@maxy", default)]
    pub max_y: String,
}

/// Raw diagnostic text forwarded verbatim by the service, typically the
/// backing database driver's multi-line error output. Built fresh per
/// response, never merged across requests.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceException {
    #[serde(rename = "$text", default)]
    pub text: String,
}

impl WfsCapabilities {
    /// Feature-type names in catalog order. Restartable: iterating the same
    /// document twice yields the same sequence. Empty names are passed
    /// through unchanged; filtering is the caller's call.
    pub fn feature_type_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.feature_type_list
            .feature_types
            .iter()
            .map(|ft| ft.name.as_str())
    }
}

/// Decode a capabilities or service-exception body.
pub fn decode_capabilities(body: &str) -> Result<WfsCapabilities, ProbeError> {
    let doc = quick_xml::de::from_str(body)?;
    Ok(doc)
}
