//! Tile URL templates and relative URL resolution.

use super::TileId;

/// Values substituted into a [`UrlTemplate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlVars {
    pub tile: TileId,
    /// Sub-mesh index.
    pub sub: u32,
}

impl UrlVars {
    pub fn new(tile: TileId) -> Self {
        Self { tile, sub: 0 }
    }

    pub fn with_sub(tile: TileId, sub: u32) -> Self {
        Self { tile, sub }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Lod,
    X,
    Y,
    Sub,
}

/// A URL containing `{lod}`, `{x}`, `{y}` and `{sub}` placeholders.
///
/// Unknown placeholders are kept literally.
///
/// ```
/// use terrastream::tile::{TileId, UrlTemplate, UrlVars};
///
/// let t = UrlTemplate::parse("https://h/{lod}-{x}-{y}.mesh");
/// assert_eq!(t.expand(&UrlVars::new(TileId::new(3, 1, 2))), "https://h/3-1-2.mesh");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    source: String,
    parts: Vec<Part>,
}

impl UrlTemplate {
    pub fn parse(source: &str) -> Self {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|c| open + c) else {
                break;
            };
            literal.push_str(&rest[..open]);
            let part = match &rest[open + 1..close] {
                "lod" => Some(Part::Lod),
                "x" => Some(Part::X),
                "y" => Some(Part::Y),
                "sub" => Some(Part::Sub),
                _ => None,
            };
            match part {
                Some(part) => {
                    if !literal.is_empty() {
                        parts.push(Part::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(part);
                }
                None => literal.push_str(&rest[open..=close]),
            }
            rest = &rest[close + 1..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }

        Self {
            source: source.to_string(),
            parts,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expand(&self, vars: &UrlVars) -> String {
        let mut out = String::with_capacity(self.source.len() + 16);
        for part in &self.parts {
            match part {
                Part::Literal(s) => out.push_str(s),
                Part::Lod => out.push_str(&vars.tile.lod.to_string()),
                Part::X => out.push_str(&vars.tile.x.to_string()),
                Part::Y => out.push_str(&vars.tile.y.to_string()),
                Part::Sub => out.push_str(&vars.sub.to_string()),
            }
        }
        out
    }
}

/// Resolve `path` against the URL of the document that referenced it.
///
/// Absolute URLs are returned unchanged, `//host/..` inherits the parent's
/// scheme, and anything else replaces the parent's last path segment.
pub fn resolve_url(path: &str, parent: &str) -> String {
    if path.contains("://") {
        return path.to_string();
    }
    if let Some(rest) = path.strip_prefix("//") {
        return match parent.find("://") {
            Some(p) => format!("{}{}", &parent[..p + 3], rest),
            None => rest.to_string(),
        };
    }
    if parent.is_empty() {
        return path.to_string();
    }
    match parent.rfind('/') {
        Some(slash) => format!("{}{}", &parent[..=slash], path),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_all_variables() {
        let t = UrlTemplate::parse("{lod}/{x}/{y}-{sub}.jpg");
        let vars = UrlVars::with_sub(TileId::new(14, 9000, 5000), 2);
        assert_eq!(t.expand(&vars), "14/9000/5000-2.jpg");
    }

    #[test]
    fn test_unknown_and_unclosed_placeholders_stay_literal() {
        let t = UrlTemplate::parse("a{alt(1,2)}b{lod}c{open");
        assert_eq!(t.expand(&UrlVars::new(TileId::new(5, 0, 0))), "a{alt(1,2)}b5c{open");
    }

    #[test]
    fn test_template_without_variables() {
        let t = UrlTemplate::parse("https://h/static.json");
        assert_eq!(t.expand(&UrlVars::new(TileId::ROOT)), "https://h/static.json");
        assert_eq!(t.source(), "https://h/static.json");
    }

    #[test]
    fn test_resolve_absolute() {
        assert_eq!(
            resolve_url("https://other/x", "https://h/a/mapConfig.json"),
            "https://other/x"
        );
    }

    #[test]
    fn test_resolve_protocol_relative() {
        assert_eq!(
            resolve_url("//cdn.h/x", "https://h/a/mapConfig.json"),
            "https://cdn.h/x"
        );
        assert_eq!(resolve_url("//cdn.h/x", "local/mapConfig.json"), "cdn.h/x");
    }

    #[test]
    fn test_resolve_sibling() {
        assert_eq!(
            resolve_url("surf/{lod}.meta", "https://h/a/mapConfig.json"),
            "https://h/a/surf/{lod}.meta"
        );
        assert_eq!(resolve_url("x.json", "mapConfig.json"), "x.json");
        assert_eq!(resolve_url("x.json", ""), "x.json");
    }
}
