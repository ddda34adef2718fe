//! Quick-create
//!
//! Paste a full URL after the host to start a new redirect for it: `https://short.link/https://example.com`

use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;

use crate::api::ADD_REDIRECT_FORM;
use crate::redirects::parse_destination;

/// Schemes that make a path look like a URL
const URL_PREFIXES: [&str; 4] = ["http://", "https://", "ftp://", "ftps://"];

/// Get the destination out of a path (without leading slash) that is an absolute URL
///
/// The query string of the request belongs to the destination.
pub fn destination_from_path(path: &str, query: Option<&str>) -> Option<String> {
    let lowercase_path = path.to_ascii_lowercase();

    if !URL_PREFIXES
        .iter()
        .any(|prefix| lowercase_path.starts_with(prefix))
    {
        return None;
    }

    let destination = match query {
        Some(query) if !query.is_empty() => format!("{path}?{query}"),
        _ => path.to_string(),
    };

    parse_destination(&destination).ok()?;

    Some(destination)
}

/// Location of the add form, prefilled with the destination
pub fn add_form_location(destination: &str) -> String {
    format!(
        "{ADD_REDIRECT_FORM}?destination={}",
        utf8_percent_encode(destination, NON_ALPHANUMERIC)
    )
}
