//! Path normalization.
//!
//! Two directions:
//!
//! - [`clean_path`] turns whatever the client sent into the canonical form
//!   routes are registered in. The router redirects when the two differ.
//! - [`canonical_path`] goes the other way: it renders the matched route
//!   template back into a concrete path using the request's (possibly
//!   rewritten) parameters, so a handler can redirect to a normalized URL.

use crate::error::PathError;
use crate::params::Params;
use crate::pattern::{self, Kind};

/// Returns the canonical form of `path`: rooted, no `.` or `..` elements, no
/// repeated slashes. A trailing slash survives, except that `/` stays `/`.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_owned();
    }

    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            part => parts.push(part),
        }
    }

    let mut cleaned = String::with_capacity(path.len() + 1);
    for part in &parts {
        cleaned.push('/');
        cleaned.push_str(part);
    }
    if cleaned.is_empty() || path.ends_with('/') {
        cleaned.push('/');
    }
    cleaned
}

/// Decodes `%XX` escapes in a request path. `None` if an escape is
/// malformed or the decoded bytes are not UTF-8.
///
/// Routing, cleaning and captured values all work on the decoded path, so
/// `%2E%2E` is a `..` element and `J%C3%B6rg` is captured as `Jörg`.
pub(crate) fn decode_path(path: &str) -> Option<String> {
    if !path.contains('%') {
        return Some(path.to_owned());
    }

    let bytes = path.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))?;
            let hex = std::str::from_utf8(hex).ok()?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

/// Percent-encodes every byte of `path` that is not visible ASCII, plus the
/// bytes in `reserved`. Visible ASCII input without reserved bytes comes back
/// unchanged.
pub(crate) fn escape_path(path: &str, reserved: &[u8]) -> String {
    let mut escaped = String::with_capacity(path.len());
    for &b in path.as_bytes() {
        if b.is_ascii_graphic() && !reserved.contains(&b) {
            escaped.push(char::from(b));
        } else {
            escaped.push_str(&format!("%{b:02X}"));
        }
    }
    escaped
}

/// Renders `route` using the segments of `path` and the values in `params`.
///
/// Static segments come from the template, anonymous captures from the
/// original path, named captures from `params`.
pub fn canonical_path(route: &str, path: &str, params: &Params) -> Result<String, PathError> {
    let trailing_slash = route.len() > 1 && route.ends_with('/');
    let mut template = route.strip_prefix('/').unwrap_or(route);
    let mut original = path.strip_prefix('/').unwrap_or(path);

    let mut canonical = String::with_capacity(route.len());
    loop {
        let (component, template_rest) = pattern::next_part(template);
        if component.is_empty() {
            break;
        }
        template = template_rest;

        let (part, original_rest) = pattern::next_part(original);
        let segment = pattern::parse_segment(component)?;

        canonical.push('/');
        match segment.kind {
            Kind::Static => canonical.push_str(&segment.name),
            Kind::Path if segment.name.is_empty() => canonical.push_str(original),
            _ if segment.name.is_empty() => canonical.push_str(part),
            _ => {
                let param = params
                    .get(&segment.name)
                    .ok_or_else(|| PathError::MissingParam(segment.name.clone()))?;
                canonical.push_str(param.raw());
            }
        }
        original = original_rest;
    }

    if canonical.is_empty() || trailing_slash {
        canonical.push('/');
    }
    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::params::{ParamsBuilder, Value};

    #[test]
    fn decodes_paths() {
        let cases = [
            ("/plain", Some("/plain")),
            ("/J%C3%B6rg", Some("/Jörg")),
            ("/a/%2E%2E/b", Some("/a/../b")),
            ("/a%2fb", Some("/a/b")),
            ("/100%25", Some("/100%")),
            ("/bad%zz", None),
            ("/short%4", None),
            ("/sign%+1", None),
            ("/invalid%FF", None),
        ];
        for (input, want) in cases {
            assert_eq!(decode_path(input).as_deref(), want, "decode_path({input:?})");
        }
    }

    #[test]
    fn escapes_paths() {
        assert_eq!(escape_path("/users/7", b""), "/users/7");
        assert_eq!(escape_path("/Jörg", b""), "/J%C3%B6rg");
        assert_eq!(escape_path("/a b", b""), "/a%20b");
        assert_eq!(escape_path("/100%?#", b"%?#"), "/100%25%3F%23");
    }

    #[test]
    fn cleans_paths() {
        let cases = [
            ("", "/"),
            ("/", "/"),
            ("//", "/"),
            ("/a", "/a"),
            ("a/b", "/a/b"),
            ("//double//slash", "/double/slash"),
            ("/a/./b", "/a/b"),
            ("/a/../b", "/b"),
            ("/../a", "/a"),
            ("/a/b/..", "/a"),
            ("/a/b/../", "/a/"),
            ("/users/me/", "/users/me/"),
            ("/{}/", "/{}/"),
        ];
        for (input, want) in cases {
            assert_eq!(clean_path(input), want, "clean_path({input:?})");
        }
    }

    fn username(raw: &str) -> Params {
        let mut builder = ParamsBuilder::default();
        builder.push("username", Kind::String, raw, 1, Value::Str(raw.to_owned()));
        builder.finish()
    }

    #[test]
    fn renders_named_parameters_from_params() {
        let route = "/profile/{username string}/personal";
        let params = username("Me").shadow("username", "me").unwrap();
        assert_eq!(
            canonical_path(route, "/profile/Me/personal", &params).unwrap(),
            "/profile/me/personal",
        );
    }

    #[test]
    fn renders_anonymous_parameters_from_the_path() {
        assert_eq!(
            canonical_path("/a/{}/{int}/b", "/a/x/7/b", &Params::default()).unwrap(),
            "/a/x/7/b",
        );
        assert_eq!(
            canonical_path("/files/{path}", "/files/x/y/z", &Params::default()).unwrap(),
            "/files/x/y/z",
        );
    }

    #[test]
    fn keeps_trailing_slash_and_root() {
        assert_eq!(canonical_path("/{}/", "/test/", &Params::default()).unwrap(), "/test/");
        assert_eq!(canonical_path("/", "/", &Params::default()).unwrap(), "/");
    }

    #[test]
    fn missing_parameter() {
        assert_eq!(
            canonical_path("/profile/{username string}", "/profile/me", &Params::default()),
            Err(PathError::MissingParam("username".to_owned())),
        );
    }
}
