//! Route variable extraction
//!
//! Matches request paths against configured templates and pulls out the
//! routing metadata (`node`, `port`, `alias`, `session`) the resolver needs.
//! Templates match as a prefix: extra path segments beyond the template are
//! allowed and the relayed request keeps its full original path.

use anyhow::bail;

/// Routing metadata extracted from a matched request path.
///
/// Empty string means the variable was not present in the matched template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteVars {
    pub node: String,
    pub port: String,
    pub alias: String,
    pub session: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VarName {
    Node,
    Port,
    Alias,
    Session,
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Var(VarName),
}

/// A single parsed path template, e.g. `/nodes/{node}/ports/{port}`.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(template: &str) -> anyhow::Result<Self> {
        if !template.starts_with('/') {
            bail!("route template must start with '/': {}", template);
        }

        let mut segments = Vec::new();
        for seg in template.trim_matches('/').split('/') {
            if seg.is_empty() {
                bail!("route template has an empty segment: {}", template);
            }

            if let Some(name) = seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                let var = match name {
                    "node" => VarName::Node,
                    "port" => VarName::Port,
                    "alias" => VarName::Alias,
                    "session" => VarName::Session,
                    other => bail!("unknown route variable {{{}}} in {}", other, template),
                };
                segments.push(Segment::Var(var));
            } else {
                segments.push(Segment::Literal(seg.to_string()));
            }
        }

        Ok(Self { segments })
    }

    /// Matches the leading segments of `path` against this template.
    fn matches(&self, path: &str) -> Option<RouteVars> {
        // Query strings play no part in route matching
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let segs: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        if segs.len() < self.segments.len() {
            return None;
        }

        let mut vars = RouteVars::default();
        for (pattern_seg, seg) in self.segments.iter().zip(&segs) {
            match pattern_seg {
                Segment::Literal(lit) => {
                    if lit != seg {
                        return None;
                    }
                }
                Segment::Var(name) => {
                    if seg.is_empty() {
                        return None;
                    }
                    let slot = match name {
                        VarName::Node => &mut vars.node,
                        VarName::Port => &mut vars.port,
                        VarName::Alias => &mut vars.alias,
                        VarName::Session => &mut vars.session,
                    };
                    *slot = seg.to_string();
                }
            }
        }

        Some(vars)
    }
}

/// Ordered route table; the first matching template wins.
#[derive(Debug, Clone, Default)]
pub struct Router {
    patterns: Vec<RoutePattern>,
}

impl Router {
    pub fn new(templates: &[String]) -> anyhow::Result<Self> {
        let patterns = templates
            .iter()
            .map(|t| RoutePattern::parse(t))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, path: &str) -> Option<RouteVars> {
        self.patterns.iter().find_map(|p| p.matches(path))
    }
}
