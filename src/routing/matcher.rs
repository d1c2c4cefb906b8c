//! Path template matching.
//!
//! # Responsibilities
//! - Parse templates like `/api/patent/{pub_id}`
//! - Capture parameter segments from a concrete request path
//! - Render a template back into a path from captured parameters
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - A parameter matches exactly one non-empty segment
//! - Captured values are kept percent-encoded, so rendering the upstream
//!   path forwards them byte-for-byte
//! - No regex to guarantee O(n) matching

/// One `/`-separated piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// Captured `(name, raw value)` pairs, in template order.
pub type Params = Vec<(String, String)>;

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a template. `{name}` segments become parameters.
    pub fn parse(template: &str) -> Self {
        let segments = split(template)
            .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();
        Self { segments }
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// The literal path up to the first parameter, e.g. `/api/patent` for
    /// `/api/patent/{pub_id}`. `None` if the template has no parameters.
    pub fn parent(&self) -> Option<String> {
        let first_param = self
            .segments
            .iter()
            .position(|s| matches!(s, Segment::Param(_)))?;
        let literals: Vec<&str> = self.segments[..first_param]
            .iter()
            .filter_map(|s| match s {
                Segment::Literal(l) => Some(l.as_str()),
                Segment::Param(_) => None,
            })
            .collect();
        Some(format!("/{}", literals.join("/")))
    }

    /// Match `path` against this template, returning captured parameters.
    pub fn captures(&self, path: &str) -> Option<Params> {
        let mut parts = split(path);
        let mut params = Vec::new();

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.push((name.clone(), part.to_string())),
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }

    /// Substitute `params` into this template. Unknown parameters render empty.
    pub fn render(&self, params: &[(String, String)]) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Literal(lit) => out.push_str(lit),
                Segment::Param(name) => {
                    if let Some((_, value)) = params.iter().find(|(n, _)| n == name) {
                        out.push_str(value);
                    }
                }
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        out
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_template() {
        let t = PathTemplate::parse("/api/trend/volume");
        assert_eq!(t.param_names().count(), 0);
        assert_eq!(t.parent(), None);
        assert_eq!(t.captures("/api/trend/volume"), Some(vec![]));
        assert_eq!(t.captures("/api/trend/volume/"), Some(vec![]));
        assert_eq!(t.captures("/api/trend"), None);
        assert_eq!(t.captures("/api/trend/volume/extra"), None);
        assert_eq!(t.captures("/API/trend/volume"), None);
        assert_eq!(t.render(&[]), "/api/trend/volume");
    }

    #[test]
    fn test_param_capture_and_render() {
        let route = PathTemplate::parse("/api/patent/{pub_id}");
        let upstream = PathTemplate::parse("/patent/{pub_id}");

        let params = route.captures("/api/patent/US-1234567-B2").unwrap();
        assert_eq!(params, vec![("pub_id".to_string(), "US-1234567-B2".to_string())]);
        assert_eq!(upstream.render(&params), "/patent/US-1234567-B2");
        assert_eq!(route.captures("/api/patent"), None);
        assert_eq!(route.parent().as_deref(), Some("/api/patent"));
        assert_eq!(route.param_names().collect::<Vec<_>>(), vec!["pub_id"]);
    }

    #[test]
    fn test_encoded_values_pass_through() {
        let route = PathTemplate::parse("/api/saved-queries/{id}");
        let params = route.captures("/api/saved-queries/a%2Fb").unwrap();
        assert_eq!(params[0].1, "a%2Fb");
        assert_eq!(PathTemplate::parse("/saved-queries/{id}").render(&params), "/saved-queries/a%2Fb");
    }

    #[test]
    fn test_root_template() {
        let t = PathTemplate::parse("/");
        assert_eq!(t.captures("/"), Some(vec![]));
        assert_eq!(t.render(&[]), "/");
    }
}
