//! Route pattern parsing and matching.
//!
//! # Syntax
//! - `/users/list`: literal segments, matched case-sensitively
//! - `/users/:id` or `/users/{id}`: one non-empty segment
//! - `/files/*rest` or `/files/{*rest}`: one or more trailing segments
//!
//! # Design Decisions
//! - Patterns are parsed once at compile time; matching is a segment walk
//! - No regex to guarantee O(n) matching
//! - Specificity is a per-segment rank: literal < param < catch-all

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

/// Reasons a route pattern is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern must start with '/'")]
    MissingLeadingSlash,
    #[error("empty segment at position {0}")]
    EmptySegment(usize),
    #[error("parameter name is empty in segment {0:?}")]
    EmptyParam(String),
    #[error("parameter {0:?} appears more than once")]
    DuplicateParam(String),
    #[error("catch-all {0:?} must be the last segment")]
    CatchAllNotLast(String),
    #[error("unbalanced braces in segment {0:?}")]
    Unbalanced(String),
}

/// One `/`-separated piece of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
    CatchAll(String),
}

impl Segment {
    fn rank(&self) -> u8 {
        match self {
            Segment::Literal(_) => 0,
            Segment::Param(_) => 1,
            Segment::CatchAll(_) => 2,
        }
    }

    fn parse(raw: &str) -> Result<Self, PatternError> {
        let (name, catch_all) = if let Some(inner) = raw.strip_prefix('{') {
            let inner = inner
                .strip_suffix('}')
                .ok_or_else(|| PatternError::Unbalanced(raw.to_string()))?;
            match inner.strip_prefix('*') {
                Some(name) => (name, true),
                None => (inner, false),
            }
        } else if let Some(name) = raw.strip_prefix(':') {
            (name, false)
        } else if let Some(name) = raw.strip_prefix('*') {
            (name, true)
        } else if raw.contains(['{', '}']) {
            return Err(PatternError::Unbalanced(raw.to_string()));
        } else {
            return Ok(Segment::Literal(raw.to_string()));
        };

        if name.is_empty() || name.contains(['{', '}', ':', '*']) {
            return Err(PatternError::EmptyParam(raw.to_string()));
        }
        Ok(if catch_all {
            Segment::CatchAll(name.to_string())
        } else {
            Segment::Param(name.to_string())
        })
    }
}

/// A parsed, validated route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a full route path such as `/api/users/{id}`.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let rest = raw
            .strip_prefix('/')
            .ok_or(PatternError::MissingLeadingSlash)?;

        let mut segments = Vec::new();
        if !rest.is_empty() {
            let pieces: Vec<&str> = rest.split('/').collect();
            let last = pieces.len() - 1;
            let mut names = HashSet::new();

            for (i, piece) in pieces.iter().enumerate() {
                // A trailing slash is kept as an empty literal so "/a/" and "/a" stay distinct.
                if piece.is_empty() && i != last {
                    return Err(PatternError::EmptySegment(i));
                }
                let segment = Segment::parse(piece)?;
                match &segment {
                    Segment::Param(name) | Segment::CatchAll(name) => {
                        if !names.insert(name.clone()) {
                            return Err(PatternError::DuplicateParam(name.clone()));
                        }
                    }
                    Segment::Literal(_) => {}
                }
                if matches!(segment, Segment::CatchAll(_)) && i != last {
                    return Err(PatternError::CatchAllNotLast(piece.to_string()));
                }
                segments.push(segment);
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the pattern has no parameters and can be looked up by exact key.
    pub fn is_static(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Returns true if the request path matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let Some(rest) = path.strip_prefix('/') else {
            return false;
        };
        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(lit) => {
                    if parts.get(i) != Some(&lit.as_str()) {
                        return false;
                    }
                }
                Segment::Param(_) => match parts.get(i) {
                    Some(part) if !part.is_empty() => {}
                    _ => return false,
                },
                Segment::CatchAll(_) => {
                    return parts.len() > i && parts[i..].iter().any(|p| !p.is_empty());
                }
            }
        }
        parts.len() == self.segments.len()
    }

    /// The pattern with parameter names erased: `{}` per parameter and `{*}`
    /// for a catch-all. Two patterns match the same paths exactly when their
    /// canonical forms are equal.
    pub fn canonical(&self) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        let mut out = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Literal(lit) => out.push_str(lit),
                Segment::Param(_) => out.push_str("{}"),
                Segment::CatchAll(_) => out.push_str("{*}"),
            }
        }
        out
    }

    /// Orders patterns from most to least specific.
    ///
    /// Ties are broken by the raw pattern text so the order is total. Tied
    /// patterns in one table never overlap, since equivalent spellings are
    /// collapsed at compile time.
    pub fn specificity_cmp(&self, other: &Self) -> Ordering {
        let lhs = self.segments.iter().map(Segment::rank);
        let rhs = other.segments.iter().map(Segment::rank);
        lhs.cmp(rhs).then_with(|| self.raw.cmp(&other.raw))
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
