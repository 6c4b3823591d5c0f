//! Route pattern grammar.
//!
//! A pattern is a `/`-separated list of segments. Each segment is either
//! literal text or a capture in braces:
//!
//! | Segment        | Meaning                                              |
//! |----------------|------------------------------------------------------|
//! | `users`        | static, matches the text exactly                     |
//! | `{}`           | anonymous single-segment string capture              |
//! | `{int}`        | anonymous capture of a type keyword                  |
//! | `{id}`         | named string capture (`id` is not a type keyword)     |
//! | `{id uint}`    | named capture with an explicit type                  |
//!
//! Type keywords: `int`, `uint`, `float`, `string`, `path`. All numeric types
//! are 64 bits wide. `path` swallows the rest of the request path and may only
//! appear as the final segment.

use std::fmt;
use std::str::FromStr;

use crate::error::RouteError;

/// What a segment matches.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    Static,
    String,
    Int,
    Uint,
    Float,
    /// Wildcard remainder: everything left in the path, separators included.
    Path,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::String => "string",
            Self::Int    => "int",
            Self::Uint   => "uint",
            Self::Float  => "float",
            Self::Path   => "path",
        }
    }

    pub fn is_static(self) -> bool {
        self == Self::Static
    }
}

/// Parses a type keyword. `static` is not a keyword: it cannot be written in a
/// pattern.
impl FromStr for Kind {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "int"    => Ok(Self::Int),
            "uint"   => Ok(Self::Uint),
            "float"  => Ok(Self::Float),
            "path"   => Ok(Self::Path),
            _        => Err(RouteError::InvalidType(s.to_owned())),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed pattern segment: the literal text for static segments, the
/// capture name (possibly empty) otherwise.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Segment {
    pub name: String,
    pub kind: Kind,
}

impl Segment {
    /// Anonymous captures are matched but never stored.
    pub fn is_anonymous(&self) -> bool {
        !self.kind.is_static() && self.name.is_empty()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Kind::Static => f.write_str(&self.name),
            kind if self.name.is_empty() => write!(f, "{{{kind}}}"),
            kind => write!(f, "{{{} {kind}}}", self.name),
        }
    }
}

/// Classifies one segment of a route pattern.
pub fn parse_segment(text: &str) -> Result<Segment, RouteError> {
    if text.is_empty() {
        return Err(RouteError::EmptySegment(text.to_owned()));
    }

    let inner = match text.strip_prefix('{').and_then(|t| t.strip_suffix('}')) {
        Some(inner) => inner,
        None => return Ok(Segment { name: text.to_owned(), kind: Kind::Static }),
    };

    if inner.is_empty() {
        return Ok(Segment { name: String::new(), kind: Kind::String });
    }

    match inner.split_once(' ') {
        Some((name, kind)) => Ok(Segment { name: name.to_owned(), kind: kind.parse()? }),
        None => match inner.parse() {
            Ok(kind) => Ok(Segment { name: String::new(), kind }),
            Err(_) => Ok(Segment { name: inner.to_owned(), kind: Kind::String }),
        },
    }
}

/// Splits `path` at its first `/`: `("a", "b/c")` for `"a/b/c"`.
pub(crate) fn next_part(path: &str) -> (&str, &str) {
    path.split_once('/').unwrap_or((path, ""))
}

/// Splits a rooted pattern into segments. A trailing `/` does not produce a
/// segment.
pub(crate) fn segments(pattern: &str) -> Result<Vec<Segment>, RouteError> {
    let rest = pattern.strip_prefix('/').unwrap_or(pattern);
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    if rest.is_empty() {
        return Ok(Vec::new());
    }

    let segments = rest
        .split('/')
        .map(|text| {
            parse_segment(text).map_err(|e| match e {
                RouteError::EmptySegment(_) => RouteError::EmptySegment(pattern.to_owned()),
                other => other,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let last = segments.len() - 1;
    if segments[..last].iter().any(|s| s.kind == Kind::Path) {
        return Err(RouteError::WildcardNotLast(pattern.to_owned()));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn seg(name: &str, kind: Kind) -> Segment {
        Segment { name: name.to_owned(), kind }
    }

    #[test]
    fn static_segments() {
        assert_eq!(parse_segment("users").unwrap(), seg("users", Kind::Static));
        assert_eq!(parse_segment("{open").unwrap(), seg("{open", Kind::Static));
        assert_eq!(parse_segment("close}").unwrap(), seg("close}", Kind::Static));
    }

    #[test]
    fn captures() {
        assert_eq!(parse_segment("{}").unwrap(), seg("", Kind::String));
        assert_eq!(parse_segment("{int}").unwrap(), seg("", Kind::Int));
        assert_eq!(parse_segment("{path}").unwrap(), seg("", Kind::Path));
        assert_eq!(parse_segment("{id}").unwrap(), seg("id", Kind::String));
        assert_eq!(parse_segment("{id uint}").unwrap(), seg("id", Kind::Uint));
        assert_eq!(parse_segment("{f float}").unwrap(), seg("f", Kind::Float));
        assert_eq!(parse_segment("{rest path}").unwrap(), seg("rest", Kind::Path));
    }

    #[test]
    fn invalid_segments() {
        assert_eq!(parse_segment(""), Err(RouteError::EmptySegment(String::new())));
        assert_eq!(
            parse_segment("{name badtyp}"),
            Err(RouteError::InvalidType("badtyp".to_owned())),
        );
        assert_eq!(
            parse_segment("{name static}"),
            Err(RouteError::InvalidType("static".to_owned())),
        );
    }

    #[test]
    fn display_round_trips_the_grammar() {
        for text in ["users", "{int}", "{id uint}", "{rest path}"] {
            assert_eq!(parse_segment(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn splits_patterns() {
        assert!(segments("/").unwrap().is_empty());
        assert_eq!(
            segments("/users/{id int}/").unwrap(),
            vec![seg("users", Kind::Static), seg("id", Kind::Int)],
        );
        assert_eq!(
            segments("/files/{p path}/end"),
            Err(RouteError::WildcardNotLast("/files/{p path}/end".to_owned())),
        );
        assert!(segments("/files/{p path}").is_ok());
    }

    #[test]
    fn next_part_splits_once() {
        assert_eq!(next_part("a/b/c"), ("a", "b/c"));
        assert_eq!(next_part("a"), ("a", ""));
        assert_eq!(next_part("a/"), ("a", ""));
        assert_eq!(next_part(""), ("", ""));
    }
}
