//! Launch routing for the Mini App
//!
//! Telegram hands a Mini App an opaque `start_param` (letters, digits, `_`
//! and `-` only), and the web build may also be opened with a location hash.
//! Both are mapped onto the same small set of routes.
//!
//! ## Supported forms
//!
//! - `listing_<id>` / `listing-<id>` / `#/listing/<id>` - open a listing
//! - `category_<name>` / `#/category/<name>` - preselect a category
//! - `search_<text>` / `#/search/<text>` - prefill the search box
//!   (percent-encoded text is decoded)
//! - empty, `home`, `#/` - nothing to do
//!
//! Query strings and fragments after the route are ignored.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Listing { id: String },
    Category { name: String },
    Search { text: String },
}

/// Strip query and trailing fragment from a path
#[inline]
fn strip_query_frag(s: &str) -> &str {
    match s.find(['?', '#']) {
        Some(i) => &s[..i],
        None => s,
    }
}

fn decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

fn build(kind: &str, value: &str) -> Option<Route> {
    let value = value.trim();
    match kind.to_ascii_lowercase().as_str() {
        "" | "home" => Some(Route::Home),
        "listing" => {
            if !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric()) {
                Some(Route::Listing {
                    id: value.to_string(),
                })
            } else {
                None
            }
        }
        "category" if !value.is_empty() => Some(Route::Category {
            name: decode(value),
        }),
        "search" if !value.is_empty() => Some(Route::Search {
            text: decode(value),
        }),
        _ => None,
    }
}

/// Parse a start parameter or location hash.
///
/// Returns `None` for malformed input; callers treat that like `Home`.
pub fn parse(raw: &str) -> Option<Route> {
    let s = raw.trim();
    if s.is_empty() || s == "#" {
        return Some(Route::Home);
    }

    if let Some(rest) = s.strip_prefix("#/").or_else(|| s.strip_prefix('#')) {
        let path = strip_query_frag(rest);
        let mut segments = path.split('/').filter(|seg| !seg.is_empty());
        let kind = segments.next().unwrap_or("");
        let value = segments.next().unwrap_or("");
        if segments.next().is_some() {
            return None;
        }
        return build(kind, value);
    }

    // start_param form: <kind>_<value> or <kind>-<value>
    let s = strip_query_frag(s);
    match s.find(['_', '-']) {
        Some(i) => build(&s[..i], &s[i + 1..]),
        None => build(s, ""),
    }
}
