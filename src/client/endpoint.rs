//! Endpoint construction.

use url::form_urlencoded;

/// Append the query, form-urlencoded, to the endpoint.
///
/// An absent or empty query leaves the endpoint untouched. Exactly one `?` is
/// introduced; the endpoint is not inspected for an existing query string.
pub fn build_endpoint(endpoint: &str, query: Option<&[(String, String)]>) -> String {
    let pairs = match query {
        Some(pairs) if !pairs.is_empty() => pairs,
        _ => return endpoint.to_string(),
    };

    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish();

    format!("{}?{}", endpoint, encoded)
}
