//! Route schema normalization.
//!
//! Mapping annotations come in two shapes: the generic `request_mapping`, which spells out
//! its request methods and media types, and one shorthand per HTTP method
//! (`get_mapping`, `post_mapping`, ...) whose method is implied by its kind and which
//! carries only a path. [`normalize`] turns whichever of them a declaration carries into
//! an [`AnnotationDescriptor`].

use crate::declaration::{simple_name_of, Annotation};
use log::warn;
use std::fmt;
use std::str::FromStr;

/// Mapping annotation kinds, in registration order.
///
/// When a declaration carries several of them, the one registered first is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingKind {
    Request,
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl MappingKind {
    pub const ALL: [MappingKind; 6] = [
        MappingKind::Request,
        MappingKind::Get,
        MappingKind::Post,
        MappingKind::Put,
        MappingKind::Delete,
        MappingKind::Patch,
    ];

    /// Annotation kind name as written on declarations
    pub fn name(self) -> &'static str {
        match self {
            MappingKind::Request => "request_mapping",
            MappingKind::Get => "get_mapping",
            MappingKind::Post => "post_mapping",
            MappingKind::Put => "put_mapping",
            MappingKind::Delete => "delete_mapping",
            MappingKind::Patch => "patch_mapping",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// The request method a shorthand kind is fixed to.
    pub fn shorthand_method(self) -> Option<HttpMethod> {
        match self {
            MappingKind::Request => None,
            MappingKind::Get => Some(HttpMethod::Get),
            MappingKind::Post => Some(HttpMethod::Post),
            MappingKind::Put => Some(HttpMethod::Put),
            MappingKind::Delete => Some(HttpMethod::Delete),
            MappingKind::Patch => Some(HttpMethod::Patch),
        }
    }
}

impl fmt::Display for MappingKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// HTTP request methods a mapping can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "OPTIONS" => Ok(HttpMethod::Options),
            "TRACE" => Ok(HttpMethod::Trace),
            _ => Err(format!("unknown request method: {}", s)),
        }
    }
}

/// Contents of a generic `request_mapping`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericMapping {
    pub paths: Vec<String>,
    pub methods: Vec<HttpMethod>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
}

/// Contents of a shorthand mapping; its method comes from the variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShorthandMapping {
    pub paths: Vec<String>,
}

/// A mapping annotation, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationDescriptor {
    Request(GenericMapping),
    Get(ShorthandMapping),
    Post(ShorthandMapping),
    Put(ShorthandMapping),
    Delete(ShorthandMapping),
    Patch(ShorthandMapping),
}

impl AnnotationDescriptor {
    /// Reads the descriptor of `kind` out of a raw annotation.
    ///
    /// The path is taken from `path`, or from `value` when `path` is absent or empty.
    pub fn from_annotation(kind: MappingKind, annotation: &Annotation) -> Self {
        let paths = annotation.first_list(&["path", "value"]);

        match kind {
            MappingKind::Request => AnnotationDescriptor::Request(GenericMapping {
                paths,
                methods: parse_methods(&annotation.list("method")),
                consumes: annotation.list("consumes"),
                produces: annotation.list("produces"),
            }),
            MappingKind::Get => AnnotationDescriptor::Get(ShorthandMapping { paths }),
            MappingKind::Post => AnnotationDescriptor::Post(ShorthandMapping { paths }),
            MappingKind::Put => AnnotationDescriptor::Put(ShorthandMapping { paths }),
            MappingKind::Delete => AnnotationDescriptor::Delete(ShorthandMapping { paths }),
            MappingKind::Patch => AnnotationDescriptor::Patch(ShorthandMapping { paths }),
        }
    }

    pub fn kind(&self) -> MappingKind {
        match self {
            AnnotationDescriptor::Request(_) => MappingKind::Request,
            AnnotationDescriptor::Get(_) => MappingKind::Get,
            AnnotationDescriptor::Post(_) => MappingKind::Post,
            AnnotationDescriptor::Put(_) => MappingKind::Put,
            AnnotationDescriptor::Delete(_) => MappingKind::Delete,
            AnnotationDescriptor::Patch(_) => MappingKind::Patch,
        }
    }

    pub fn paths(&self) -> &[String] {
        match self {
            AnnotationDescriptor::Request(generic) => &generic.paths,
            AnnotationDescriptor::Get(s)
            | AnnotationDescriptor::Post(s)
            | AnnotationDescriptor::Put(s)
            | AnnotationDescriptor::Delete(s)
            | AnnotationDescriptor::Patch(s) => &s.paths,
        }
    }

    /// Declared request methods; a shorthand always yields exactly its own method.
    pub fn methods(&self) -> Vec<HttpMethod> {
        match self {
            AnnotationDescriptor::Request(generic) => generic.methods.clone(),
            other => other.kind().shorthand_method().into_iter().collect(),
        }
    }

    pub fn consumes(&self) -> &[String] {
        match self {
            AnnotationDescriptor::Request(generic) => &generic.consumes,
            _ => &[],
        }
    }

    pub fn produces(&self) -> &[String] {
        match self {
            AnnotationDescriptor::Request(generic) => &generic.produces,
            _ => &[],
        }
    }
}

/// Parses method tokens, skipping unknown ones and collapsing duplicates.
///
/// Qualified tokens such as `RequestMethod.GET` are read by their last segment.
fn parse_methods(tokens: &[String]) -> Vec<HttpMethod> {
    let mut methods = Vec::new();
    for token in tokens {
        match simple_name_of(token).parse::<HttpMethod>() {
            Ok(method) if !methods.contains(&method) => methods.push(method),
            Ok(_) => {}
            Err(e) => warn!("Skipping request method: {}", e),
        }
    }
    methods
}

/// Outcome of normalizing the annotations of one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// Descriptor of the highest-priority mapping kind present
    pub descriptor: Option<AnnotationDescriptor>,
    /// Every mapping kind present, in registration order
    pub candidates: Vec<MappingKind>,
}

impl Normalized {
    /// More than one mapping kind was found on the declaration.
    pub fn is_ambiguous(&self) -> bool {
        self.candidates.len() > 1
    }
}

/// Normalizes the mapping annotations among `annotations`.
///
/// Selection depends only on which kinds are present, never on the order in which they
/// were written.
pub fn normalize(annotations: &[Annotation]) -> Normalized {
    let candidates: Vec<MappingKind> = MappingKind::ALL
        .into_iter()
        .filter(|kind| annotations.iter().any(|a| a.kind == kind.name()))
        .collect();

    let descriptor = candidates.first().and_then(|&kind| {
        annotations
            .iter()
            .find(|a| a.kind == kind.name())
            .map(|a| AnnotationDescriptor::from_annotation(kind, a))
    });

    Normalized {
        descriptor,
        candidates,
    }
}
