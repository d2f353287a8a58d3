//! Reading and rewriting the exercise parameter of a page address.

use url::Url;

/// Raw value of the first `name` query parameter, if present.
#[must_use]
pub fn param(address: &Url, name: &str) -> Option<String> {
    address
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// `address` with the `name` parameter set to `value`.
///
/// The first existing occurrence is replaced in place and later duplicates
/// are dropped; without one, the parameter is appended. Other parameters and
/// the fragment are kept.
#[must_use]
pub fn with_param(address: &Url, name: &str, value: &str) -> Url {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (key, existing) in address.query_pairs() {
        if key != name {
            pairs.push((key.into_owned(), existing.into_owned()));
        } else if !replaced {
            pairs.push((name.to_string(), value.to_string()));
            replaced = true;
        }
    }
    if !replaced {
        pairs.push((name.to_string(), value.to_string()));
    }

    let mut next = address.clone();
    next.query_pairs_mut().clear().extend_pairs(pairs);
    next
}
