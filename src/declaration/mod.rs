//! Read-only view of the declaration tree a resolution pass runs over.
//!
//! A declaration tree is made of classes (which may nest inside other classes) and the
//! methods they declare. Every declaration may carry annotations: named bags of literal
//! values that are either a single string or a list of strings. Classes additionally
//! describe their data members and an optional superclass, which is what the DTO
//! introspector walks.
//!
//! The pass only talks to the tree through [`DeclarationTree`]. Two providers ship with
//! the crate:
//!
//! - [`model::DeclarationModel`] - an in-memory tree, deserializable from YAML or JSON
//! - [`source::SourceCollector`] - builds a [`model::DeclarationModel`] from Rust sources

pub mod model;
pub mod source;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Handle to a declaration inside a [`DeclarationTree`].
///
/// Ordering follows declaration order: classes by position, methods by their class and
/// then by position inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclId {
    Class(usize),
    Method { class: usize, index: usize },
}

/// Provider interface for the host's declaration tree.
///
/// A pass only reads through this trait. Two providers ship with the crate:
/// [`model::DeclarationModel`] and, built on it, [`source::SourceCollector`] for Rust
/// sources. Handles returned by one method are only meaningful to the same tree.
pub trait DeclarationTree {
    /// All method declarations carrying an annotation of the given kind.
    fn methods_annotated_with(&self, kind: &str) -> Vec<DeclId>;

    /// Name of the declaration as written, without any qualification.
    fn simple_name(&self, decl: DeclId) -> &str;

    /// Fully qualified name. Methods are qualified by their class (`Class::method`).
    fn qualified_name(&self, decl: DeclId) -> String;

    /// The declaration this one is nested in, if any.
    fn enclosing(&self, decl: DeclId) -> Option<DeclId>;

    fn annotations(&self, decl: DeclId) -> &[Annotation];

    /// Parameters of a method declaration; empty for classes.
    fn parameters(&self, method: DeclId) -> &[ParamDecl];

    /// Declared return type of a method; `None` means the method returns nothing.
    fn return_type(&self, method: DeclId) -> Option<&TypeRef>;

    /// Resolves a type reference to a structured declaration of the tree.
    fn find_type(&self, ty: &TypeRef) -> Option<DeclId>;

    /// Data members declared directly on a class, in declaration order.
    fn fields(&self, decl: DeclId) -> &[FieldDecl];

    fn superclass(&self, decl: DeclId) -> Option<&TypeRef>;

    /// First annotation of the given kind on a declaration.
    fn annotation(&self, decl: DeclId, kind: &str) -> Option<&Annotation> {
        self.annotations(decl).iter().find(|a| a.kind == kind)
    }

    fn is_deprecated(&self, decl: DeclId) -> bool {
        self.annotation(decl, DEPRECATED).is_some()
    }
}

/// Annotation kind marking a deprecated declaration
pub const DEPRECATED: &str = "deprecated";
/// Annotation kind marking a query/form parameter
pub const REQUEST_PARAM: &str = "request_param";
/// Annotation kind marking the request body parameter
pub const REQUEST_BODY: &str = "request_body";

/// A literal annotation value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Str(String),
    List(Vec<String>),
}

impl AnnotationValue {
    /// The value as a list, with empty strings dropped.
    pub fn values(&self) -> Vec<String> {
        let raw: &[String] = match self {
            AnnotationValue::Str(s) => std::slice::from_ref(s),
            AnnotationValue::List(list) => list,
        };
        raw.iter().filter(|s| !s.is_empty()).cloned().collect()
    }

    /// The first non-empty string of the value.
    pub fn first(&self) -> Option<String> {
        self.values().into_iter().next()
    }
}

/// A named set of literal values attached to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Annotation {
    pub kind: String,
    #[serde(default)]
    pub values: BTreeMap<String, AnnotationValue>,
}

impl Annotation {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            values: BTreeMap::new(),
        }
    }

    /// Builder-style helper to attach a value
    pub fn with(mut self, key: impl Into<String>, value: AnnotationValue) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Non-empty values stored under `key`; empty when the key is absent.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.values.get(key).map(|v| v.values()).unwrap_or_default()
    }

    /// Values of the first key in `keys` that holds at least one non-empty value.
    pub fn first_list(&self, keys: &[&str]) -> Vec<String> {
        keys.iter()
            .map(|k| self.list(k))
            .find(|v| !v.is_empty())
            .unwrap_or_default()
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.values.get(key).and_then(|v| v.first())
    }
}

/// Reference to a type, as written at a use site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "TypeRefRepr")]
pub struct TypeRef {
    /// Qualified (or simple) name without type arguments
    pub name: String,
    /// Type arguments, in order
    pub args: Vec<TypeRef>,
}

/// Model files may write a type either as a bare name or as `{name, args}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TypeRefRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        args: Vec<TypeRef>,
    },
}

impl From<TypeRefRepr> for TypeRef {
    fn from(repr: TypeRefRepr) -> Self {
        match repr {
            TypeRefRepr::Name(name) => TypeRef::new(name),
            TypeRefRepr::Full { name, args } => TypeRef { name, args },
        }
    }
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Last segment of the name, splitting on both `::` and `.`
    pub fn simple_name(&self) -> &str {
        simple_name_of(&self.name)
    }

    /// Whether this reference can name the declaration `candidate`.
    ///
    /// An unqualified reference (`User`) names any declaration with that simple name. A
    /// qualified reference names `candidate` only when it is the whole name or a trailing
    /// run of its path segments, so `models::User` names `crate::models::User` while
    /// `org.external.User` never names `com.example.User`.
    pub fn names(&self, candidate: &str) -> bool {
        if self.name == candidate {
            return true;
        }
        if !is_qualified(&self.name) {
            return self.name == simple_name_of(candidate);
        }
        candidate
            .strip_suffix(self.name.as_str())
            .map(|head| head.ends_with("::") || head.ends_with('.'))
            .unwrap_or(false)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
            write!(f, "<{}>", args.join(", "))?;
        }
        Ok(())
    }
}

/// Whether a type name carries a module or package path.
pub fn is_qualified(name: &str) -> bool {
    name.contains("::") || name.contains('.')
}

/// Returns the part of a qualified name after the last `::` or `.`
pub fn simple_name_of(name: &str) -> &str {
    let tail = name.rsplit("::").next().unwrap_or(name);
    tail.rsplit('.').next().unwrap_or(tail)
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl ParamDecl {
    pub fn annotation(&self, kind: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.kind == kind)
    }
}

/// A data member of a class.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Compiler- or framework-generated member that is not part of the data shape
    #[serde(default)]
    pub synthetic: bool,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: false,
            synthetic: false,
        }
    }
}
