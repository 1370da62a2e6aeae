//! URL to view resolution.
//!
//! Matches a request URL against an ordered table of route definitions.
//! First match wins; the table order is significant. A URL that only
//! matches after dropping its trailing slash resolves to a redirect to the
//! canonical form.

use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;

/// Views the page renderer knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewId {
    /// Recently drawn rooms.
    RoomList,
    /// A single room with its canvas.
    Room,
}

/// One backend fetch a view needs before it can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataRequirement {
    /// Key of the fetched value in the data bag.
    pub key: &'static str,
    /// Backend path template, e.g. `/api/rooms/:id`.
    pub path: &'static str,
}

impl DataRequirement {
    /// Expand the path template into concrete path segments.
    ///
    /// Returns `None` if the template names a parameter the match did not
    /// capture.
    pub fn segments(&self, params: &BTreeMap<String, String>) -> Option<Vec<String>> {
        self.path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => params.get(name).cloned(),
                None => Some(segment.to_string()),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(&'static str),
    Param(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RouteTarget {
    View {
        view: ViewId,
        requirements: Vec<DataRequirement>,
    },
    Redirect(&'static str),
}

/// A path pattern and what it resolves to. Immutable once built.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    pattern: &'static str,
    segments: Vec<Segment>,
    target: RouteTarget,
}

impl RouteDefinition {
    /// A route rendering `view` after fetching `requirements`.
    ///
    /// Patterns are `/`-separated; a `:name` segment captures one non-empty
    /// path segment.
    pub fn view(pattern: &'static str, view: ViewId, requirements: &[DataRequirement]) -> Self {
        Self {
            pattern,
            segments: parse_pattern(pattern),
            target: RouteTarget::View {
                view,
                requirements: requirements.to_vec(),
            },
        }
    }

    /// A route that permanently points somewhere else.
    pub fn redirect(pattern: &'static str, to: &'static str) -> Self {
        Self {
            pattern,
            segments: parse_pattern(pattern),
            target: RouteTarget::Redirect(to),
        }
    }

    /// The pattern this route was declared with.
    pub fn pattern(&self) -> &'static str {
        self.pattern
    }

    fn capture(&self, path_segments: &[&str]) -> Option<BTreeMap<String, String>> {
        if path_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, actual) in self.segments.iter().zip(path_segments) {
            match segment {
                Segment::Literal(lit) if lit == actual => {}
                Segment::Param(name) if !actual.is_empty() => {
                    let value = percent_decode_str(actual).decode_utf8().ok()?;
                    params.insert((*name).to_string(), value.into_owned());
                }
                _ => return None,
            }
        }
        Some(params)
    }
}

fn parse_pattern(pattern: &'static str) -> Vec<Segment> {
    split_path(pattern)
        .into_iter()
        .map(|s| match s.strip_prefix(':') {
            Some(name) => Segment::Param(name),
            None => Segment::Literal(s),
        })
        .collect()
}

/// Split a path into segments. `/` has none; empty inner segments are kept
/// so that `//` never matches.
fn split_path(path: &str) -> Vec<&str> {
    match path.strip_prefix('/') {
        Some("") => Vec::new(),
        Some(rest) => rest.split('/').collect(),
        None => vec![path],
    }
}

/// A URL matched to a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedView {
    /// The view to render.
    pub view: ViewId,
    /// Captured path parameters.
    pub params: BTreeMap<String, String>,
    /// Backend fetches the view needs.
    pub requirements: Vec<DataRequirement>,
}

/// Outcome of resolving a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Render this view.
    Matched(MatchedView),
    /// Send the client to this location (path and query).
    Redirect(String),
    /// Nothing matches.
    NotFound,
}

/// Ordered set of route definitions.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
}

impl Default for RouteTable {
    /// The ISUketch client routes.
    fn default() -> Self {
        Self::new(vec![
            RouteDefinition::view(
                "/",
                ViewId::RoomList,
                &[DataRequirement {
                    key: "rooms",
                    path: "/api/rooms",
                }],
            ),
            RouteDefinition::redirect("/rooms", "/"),
            RouteDefinition::view(
                "/rooms/:id",
                ViewId::Room,
                &[DataRequirement {
                    key: "room",
                    path: "/api/rooms/:id",
                }],
            ),
        ])
    }
}

impl RouteTable {
    /// Build a table from routes in priority order.
    pub fn new(routes: Vec<RouteDefinition>) -> Self {
        Self { routes }
    }

    /// Resolve a request URL (path plus optional query).
    pub fn resolve(&self, url: &str) -> Resolution {
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (url, None),
        };

        if let Some(resolution) = self.resolve_path(path, query) {
            return resolution;
        }

        // Trailing slash canonicalization.
        if let Some(canonical) = path.strip_suffix('/').filter(|p| !p.is_empty())
            && self.resolve_path(canonical, query).is_some()
        {
            return Resolution::Redirect(with_query(canonical, query));
        }

        Resolution::NotFound
    }

    fn resolve_path(&self, path: &str, query: Option<&str>) -> Option<Resolution> {
        let segments = split_path(path);

        self.routes.iter().find_map(|route| {
            let params = route.capture(&segments)?;
            Some(match &route.target {
                RouteTarget::View { view, requirements } => Resolution::Matched(MatchedView {
                    view: *view,
                    params,
                    requirements: requirements.clone(),
                }),
                RouteTarget::Redirect(to) => Resolution::Redirect(with_query(to, query)),
            })
        })
    }
}

fn with_query(path: &str, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{path}?{q}"),
        _ => path.to_string(),
    }
}
