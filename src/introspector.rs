//! DTO introspection - describes the data shape of request and response types.

use crate::config::CompassConfig;
use crate::declaration::{DeclId, DeclarationTree, TypeRef};
use crate::route::{Dto, Param};
use log::debug;
use std::collections::HashSet;

/// Describes payload types by walking their declarations.
pub struct Introspector<'a, T: DeclarationTree + ?Sized> {
    tree: &'a T,
    config: &'a CompassConfig,
}

impl<'a, T: DeclarationTree + ?Sized> Introspector<'a, T> {
    pub fn new(tree: &'a T, config: &'a CompassConfig) -> Self {
        Self { tree, config }
    }

    /// Describes the type behind a reference.
    ///
    /// Envelope types are described by the fields of their payload argument but keep
    /// their own name. References that do not resolve to a declaration of the tree
    /// (primitives, collections, external types) yield `None`.
    ///
    /// # Arguments
    ///
    /// * `ty` - The reference as written on a parameter or return type
    ///
    /// # Returns
    ///
    /// A [`Dto`] listing the own fields of the type followed by those of its
    /// superclasses. Static and synthetic fields are left out.
    pub fn describe(&self, ty: &TypeRef) -> Option<Dto> {
        if self.config.is_envelope(&ty.name) {
            return Some(self.describe_envelope(ty));
        }

        let Some(decl) = self.tree.find_type(ty) else {
            debug!("{} is not a structured type, no DTO", ty);
            return None;
        };

        Some(Dto::new(self.tree.qualified_name(decl), self.collect_fields(decl)))
    }

    fn describe_envelope(&self, envelope: &TypeRef) -> Dto {
        let payload = envelope
            .args
            .iter()
            .find(|arg| !self.config.is_top_type(&arg.name));

        let fields = match payload.and_then(|p| self.tree.find_type(p)) {
            Some(decl) => self.collect_fields(decl),
            None => {
                debug!("Envelope {} carries no structured payload", envelope);
                Vec::new()
            }
        };

        Dto::new(envelope.name.clone(), fields)
    }

    /// Own fields of `decl` followed by those of each superclass, most derived first.
    fn collect_fields(&self, decl: DeclId) -> Vec<Param> {
        let mut fields = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(decl);

        while let Some(level) = current {
            if !visited.insert(level) {
                debug!(
                    "Inheritance cycle at {}, stopping",
                    self.tree.qualified_name(level)
                );
                break;
            }

            fields.extend(
                self.tree
                    .fields(level)
                    .iter()
                    .filter(|f| !f.is_static && !f.synthetic)
                    .map(|f| Param::new(f.ty.to_string(), f.name.clone())),
            );

            current = match self.tree.superclass(level) {
                Some(parent) if !self.config.is_top_type(&parent.name) => {
                    let found = self.tree.find_type(parent);
                    if found.is_none() {
                        debug!("Superclass {} is not declared, stopping", parent);
                    }
                    found
                }
                _ => None,
            };
        }

        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::model::{ClassDecl, DeclarationModel};
    use crate::declaration::FieldDecl;

    fn class(name: &str, superclass: Option<&str>, fields: &[(&str, &str)]) -> ClassDecl {
        let mut decl = ClassDecl::new(name);
        decl.superclass = superclass.map(TypeRef::new);
        decl.fields = fields
            .iter()
            .map(|(n, t)| FieldDecl::new(*n, TypeRef::new(*t)))
            .collect();
        decl
    }

    fn names(dto: &Dto) -> Vec<&str> {
        dto.fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_fields_then_superclass_fields() {
        let model = DeclarationModel::new(vec![
            class("com.example.Point", Some("com.example.Base"), &[("x", "int"), ("y", "int")]),
            class("com.example.Base", Some("java.lang.Object"), &[("z", "int")]),
        ]);
        let config = CompassConfig::default();

        let dto = Introspector::new(&model, &config)
            .describe(&TypeRef::new("com.example.Point"))
            .unwrap();

        assert_eq!(dto.fqn, "com.example.Point");
        assert_eq!(names(&dto), vec!["x", "y", "z"]);
        assert!(dto.fields.iter().all(|f| f.default_value.is_none()));
    }

    #[test]
    fn test_envelope_keeps_outer_name_and_inner_fields() {
        let model = DeclarationModel::new(vec![class("com.example.T", None, &[("f", "String")])]);
        let config = CompassConfig::default();
        let ty = TypeRef::generic(
            "org.springframework.http.ResponseEntity",
            vec![TypeRef::new("com.example.T")],
        );

        let dto = Introspector::new(&model, &config).describe(&ty).unwrap();

        assert_eq!(dto.fqn, "org.springframework.http.ResponseEntity");
        assert_eq!(dto.fields, vec![Param::new("String", "f")]);
    }

    #[test]
    fn test_envelope_without_concrete_argument_is_empty() {
        let model = DeclarationModel::default();
        let config = CompassConfig::default();
        let introspector = Introspector::new(&model, &config);

        let bare = introspector.describe(&TypeRef::new("ResponseEntity")).unwrap();
        assert_eq!(bare, Dto::new("ResponseEntity", vec![]));

        let wildcard = TypeRef::generic("ResponseEntity", vec![TypeRef::new("java.lang.Object")]);
        assert_eq!(
            introspector.describe(&wildcard).unwrap(),
            Dto::new("ResponseEntity", vec![])
        );
    }

    #[test]
    fn test_envelope_skips_top_type_arguments() {
        let model = DeclarationModel::new(vec![class("Payload", None, &[("id", "u64")])]);
        let config = CompassConfig::default();
        let ty = TypeRef::generic("HttpEntity", vec![TypeRef::new("_"), TypeRef::new("Payload")]);

        let dto = Introspector::new(&model, &config).describe(&ty).unwrap();
        assert_eq!(names(&dto), vec!["id"]);
    }

    #[test]
    fn test_unresolved_types_yield_none() {
        let model = DeclarationModel::new(vec![class("User", None, &[])]);
        let config = CompassConfig::default();
        let introspector = Introspector::new(&model, &config);

        assert!(introspector.describe(&TypeRef::new("int")).is_none());
        assert!(introspector
            .describe(&TypeRef::generic("Vec", vec![TypeRef::new("User")]))
            .is_none());
    }

    #[test]
    fn test_static_and_synthetic_fields_are_skipped() {
        let mut decl = class("Account", None, &[("id", "long"), ("balance", "long")]);
        let mut constant = FieldDecl::new("MAX", TypeRef::new("long"));
        constant.is_static = true;
        let mut generated = FieldDecl::new("this$0", TypeRef::new("Outer"));
        generated.synthetic = true;
        decl.fields.insert(1, constant);
        decl.fields.push(generated);

        let model = DeclarationModel::new(vec![decl]);
        let config = CompassConfig::default();
        let dto = Introspector::new(&model, &config)
            .describe(&TypeRef::new("Account"))
            .unwrap();

        assert_eq!(names(&dto), vec!["id", "balance"]);
    }

    #[test]
    fn test_duplicate_names_across_chain_are_kept() {
        let model = DeclarationModel::new(vec![
            class("Child", Some("Parent"), &[("id", "String")]),
            class("Parent", Some("Grand"), &[("id", "long")]),
            class("Grand", None, &[("created", "Instant")]),
        ]);
        let config = CompassConfig::default();
        let dto = Introspector::new(&model, &config)
            .describe(&TypeRef::new("Child"))
            .unwrap();

        assert_eq!(names(&dto), vec!["id", "id", "created"]);
        assert_eq!(dto.fields[0].type_fqn, "String");
        assert_eq!(dto.fields[1].type_fqn, "long");
    }

    #[test]
    fn test_undeclared_superclass_and_cycles_stop_the_walk() {
        let model = DeclarationModel::new(vec![
            class("A", Some("B"), &[("a", "int")]),
            class("B", Some("A"), &[("b", "int")]),
            class("C", Some("external.Base"), &[("c", "int")]),
        ]);
        let config = CompassConfig::default();
        let introspector = Introspector::new(&model, &config);

        assert_eq!(names(&introspector.describe(&TypeRef::new("A")).unwrap()), vec!["a", "b"]);
        assert_eq!(names(&introspector.describe(&TypeRef::new("C")).unwrap()), vec!["c"]);
    }

    #[test]
    fn test_foreign_qualified_types_are_not_described() {
        let model = DeclarationModel::new(vec![
            class("com.example.User", None, &[("password", "String")]),
            class("com.example.Admin", Some("org.external.User"), &[("role", "String")]),
        ]);
        let config = CompassConfig::default();
        let introspector = Introspector::new(&model, &config);

        assert!(introspector.describe(&TypeRef::new("org.external.User")).is_none());

        let envelope = TypeRef::generic("ResponseEntity", vec![TypeRef::new("org.external.User")]);
        assert_eq!(
            introspector.describe(&envelope).unwrap(),
            Dto::new("ResponseEntity", vec![])
        );

        let admin = introspector.describe(&TypeRef::new("com.example.Admin")).unwrap();
        assert_eq!(names(&admin), vec!["role"]);
    }

    #[test]
    fn test_simple_name_reference_reports_qualified_name() {
        let model =
            DeclarationModel::new(vec![class("crate::models::User", None, &[("name", "String")])]);
        let config = CompassConfig::default();
        let dto = Introspector::new(&model, &config)
            .describe(&TypeRef::new("User"))
            .unwrap();
        assert_eq!(dto.fqn, "crate::models::User");
    }
}
