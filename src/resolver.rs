//! Hierarchical resolution of route attributes.
//!
//! A method's route is described partly by its own mapping annotation and partly by the
//! mapping annotations of the declarations enclosing it. Each attribute has its own
//! fallback rule, implemented by a standalone function that takes the method's own value
//! and the value already resolved for its enclosing declaration:
//!
//! | attribute | own only | parent only | both | neither |
//! |-----------|----------|-------------|------|---------|
//! | path | own | parent | every parent joined with every own fragment | failure |
//! | methods | own | parent | own | failure |
//! | consumes / produces | own | parent | own | empty |
//!
//! [`Resolver`] applies these rules along the enclosing chain of a declaration, from the
//! outermost declaration inwards.

use crate::annotation::{normalize, AnnotationDescriptor, HttpMethod};
use crate::declaration::{DeclId, DeclarationTree};
use crate::error::{Error, Result, RouteAttribute, Warning};
use log::{debug, warn};
use std::collections::HashSet;

/// Joins a path fragment onto a parent path with exactly one `/` between them.
pub fn join_paths(parent: &str, fragment: &str) -> String {
    let parent = parent.trim_end_matches('/');
    let fragment = fragment.trim_start_matches('/');
    format!("{}/{}", parent, fragment)
}

/// Path rule. `None` means no path is known at this level or above.
pub fn resolve_paths(own: &[String], parent: Option<Vec<String>>) -> Option<Vec<String>> {
    match (own.is_empty(), parent) {
        (false, Some(parents)) => Some(
            parents
                .iter()
                .flat_map(|p| own.iter().map(move |fragment| join_paths(p, fragment)))
                .collect(),
        ),
        (false, None) => Some(own.to_vec()),
        (true, parent) => parent,
    }
}

/// Request method rule. An empty own list defers to the parent.
pub fn resolve_methods(
    own: Vec<HttpMethod>,
    parent: Option<Vec<HttpMethod>>,
) -> Option<Vec<HttpMethod>> {
    if own.is_empty() {
        parent
    } else {
        Some(own)
    }
}

/// Media type rule for both `consumes` and `produces`. Absence everywhere is empty.
pub fn resolve_media_types(own: &[String], parent: Vec<String>) -> Vec<String> {
    if own.is_empty() {
        parent
    } else {
        own.to_vec()
    }
}

/// The route attributes resolved for one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSchema {
    pub paths: Vec<String>,
    pub methods: Vec<HttpMethod>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub deprecated: bool,
}

/// Walks a declaration tree to resolve route schemas.
///
/// Ambiguity warnings are reported at most once per declaration for the lifetime of the
/// resolver, however often the declaration is consulted as somebody's parent.
pub struct Resolver<'a, T: DeclarationTree + ?Sized> {
    tree: &'a T,
    warnings: Vec<Warning>,
    reported: HashSet<DeclId>,
}

impl<'a, T: DeclarationTree + ?Sized> Resolver<'a, T> {
    pub fn new(tree: &'a T) -> Self {
        Self {
            tree,
            warnings: Vec::new(),
            reported: HashSet::new(),
        }
    }

    /// Warnings collected so far, in the order they were raised.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    /// The normalized mapping of a declaration, if it has one.
    pub fn descriptor(&mut self, decl: DeclId) -> Option<AnnotationDescriptor> {
        let normalized = normalize(self.tree.annotations(decl));

        if normalized.is_ambiguous() && self.reported.insert(decl) {
            if let Some(selected) = normalized.descriptor.as_ref().map(|d| d.kind()) {
                let warning = Warning::AmbiguousAnnotation {
                    declaration: self.tree.qualified_name(decl),
                    found: normalized.candidates.clone(),
                    selected,
                };
                warn!("{}", warning);
                self.warnings.push(warning);
            }
        }

        normalized.descriptor
    }

    /// The declaration followed by its enclosing declarations, innermost first.
    ///
    /// A declaration that shows up twice ends the chain, so malformed trees with
    /// cyclic nesting cannot loop forever.
    fn chain(&self, decl: DeclId) -> Vec<DeclId> {
        let mut chain = vec![decl];
        let mut seen: HashSet<DeclId> = HashSet::from([decl]);
        let mut current = decl;

        while let Some(parent) = self.tree.enclosing(current) {
            if !seen.insert(parent) {
                warn!(
                    "Cyclic nesting at {}, ignoring further enclosing declarations",
                    self.tree.qualified_name(parent)
                );
                break;
            }
            chain.push(parent);
            current = parent;
        }

        chain
    }

    /// Descriptors along the chain, outermost first.
    fn descriptors_outside_in(&mut self, decl: DeclId) -> Vec<Option<AnnotationDescriptor>> {
        let chain = self.chain(decl);
        chain.into_iter().rev().map(|d| self.descriptor(d)).collect()
    }

    pub fn resolve_paths(&mut self, decl: DeclId) -> Result<Vec<String>> {
        let resolved = self
            .descriptors_outside_in(decl)
            .iter()
            .fold(None, |parent, descriptor| {
                let own = descriptor.as_ref().map(|d| d.paths()).unwrap_or_default();
                resolve_paths(own, parent)
            });

        resolved.ok_or_else(|| Error::Resolution {
            declaration: self.tree.qualified_name(decl),
            attribute: RouteAttribute::Path,
        })
    }

    pub fn resolve_methods(&mut self, decl: DeclId) -> Result<Vec<HttpMethod>> {
        let resolved = self
            .descriptors_outside_in(decl)
            .iter()
            .fold(None, |parent, descriptor| {
                let own = descriptor.as_ref().map(|d| d.methods()).unwrap_or_default();
                resolve_methods(own, parent)
            });

        resolved.ok_or_else(|| Error::Resolution {
            declaration: self.tree.qualified_name(decl),
            attribute: RouteAttribute::Methods,
        })
    }

    pub fn resolve_consumes(&mut self, decl: DeclId) -> Vec<String> {
        self.descriptors_outside_in(decl)
            .iter()
            .fold(Vec::new(), |parent, descriptor| {
                let own = descriptor.as_ref().map(|d| d.consumes()).unwrap_or_default();
                resolve_media_types(own, parent)
            })
    }

    pub fn resolve_produces(&mut self, decl: DeclId) -> Vec<String> {
        self.descriptors_outside_in(decl)
            .iter()
            .fold(Vec::new(), |parent, descriptor| {
                let own = descriptor.as_ref().map(|d| d.produces()).unwrap_or_default();
                resolve_media_types(own, parent)
            })
    }

    /// Deprecated if the method or its immediately enclosing declaration is.
    pub fn is_deprecated(&self, decl: DeclId) -> bool {
        self.tree.is_deprecated(decl)
            || self
                .tree
                .enclosing(decl)
                .map(|parent| self.tree.is_deprecated(parent))
                .unwrap_or(false)
    }

    /// Resolves every route attribute of a method.
    pub fn resolve(&mut self, method: DeclId) -> Result<RouteSchema> {
        debug!("Resolving route schema of {}", self.tree.qualified_name(method));

        Ok(RouteSchema {
            paths: self.resolve_paths(method)?,
            methods: self.resolve_methods(method)?,
            consumes: self.resolve_consumes(method),
            produces: self.resolve_produces(method),
            deprecated: self.is_deprecated(method),
        })
    }
}
