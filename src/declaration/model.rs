//! In-memory declaration tree.
//!
//! Hosts that already hold their declarations in some other form can describe them in a
//! YAML or JSON document with this shape:
//!
//! ```yaml
//! classes:
//!   - name: com.example.UserController
//!     annotations:
//!       - kind: request_mapping
//!         values: { path: /users, produces: application/json }
//!     methods:
//!       - name: list
//!         annotations: [{ kind: get_mapping }]
//!         params:
//!           - name: page
//!             type: int
//!             annotations: [{ kind: request_param, values: { default_value: "0" } }]
//!         return_type: { name: ResponseEntity, args: [com.example.UserPage] }
//! ```

use super::{Annotation, DeclId, DeclarationTree, FieldDecl, ParamDecl, TypeRef};
use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use std::path::Path;

/// A complete declaration tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeclarationModel {
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
}

/// A class-level declaration: a controller, a DTO, or both.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClassDecl {
    /// Fully qualified name
    pub name: String,
    /// Qualified name of the class this one is nested in
    #[serde(default)]
    pub enclosing: Option<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub superclass: Option<TypeRef>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enclosing: None,
            annotations: Vec::new(),
            superclass: None,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }
}

/// A method declared on a class.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    /// `None` for methods that return nothing
    #[serde(default)]
    pub return_type: Option<TypeRef>,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: Vec::new(),
            params: Vec::new(),
            return_type: None,
        }
    }
}

impl DeclarationModel {
    pub fn new(classes: Vec<ClassDecl>) -> Self {
        Self { classes }
    }

    /// Loads a model from a `.yaml`, `.yml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading declaration model: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read declaration model: {}", path.display()))?;

        let model = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
        .with_context(|| format!("Failed to decode declaration model: {}", path.display()))?;

        debug!("Loaded {} classes", model.classes.len());
        Ok(model)
    }

    pub fn from_yaml_str(content: &str) -> crate::error::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Total number of methods across all classes
    pub fn method_count(&self) -> usize {
        self.classes.iter().map(|c| c.methods.len()).sum()
    }

    fn class_at(&self, decl: DeclId) -> &ClassDecl {
        match decl {
            DeclId::Class(idx) | DeclId::Method { class: idx, .. } => &self.classes[idx],
        }
    }

    fn method_at(&self, decl: DeclId) -> Option<&MethodDecl> {
        match decl {
            DeclId::Method { class, index } => self.classes[class].methods.get(index),
            DeclId::Class(_) => None,
        }
    }
}

impl DeclarationTree for DeclarationModel {
    fn methods_annotated_with(&self, kind: &str) -> Vec<DeclId> {
        self.classes
            .iter()
            .enumerate()
            .flat_map(|(class, decl)| {
                decl.methods
                    .iter()
                    .enumerate()
                    .filter(|(_, m)| m.annotations.iter().any(|a| a.kind == kind))
                    .map(move |(index, _)| DeclId::Method { class, index })
            })
            .collect()
    }

    fn simple_name(&self, decl: DeclId) -> &str {
        match self.method_at(decl) {
            Some(method) => &method.name,
            None => super::simple_name_of(&self.class_at(decl).name),
        }
    }

    fn qualified_name(&self, decl: DeclId) -> String {
        match self.method_at(decl) {
            Some(method) => format!("{}::{}", self.class_at(decl).name, method.name),
            None => self.class_at(decl).name.clone(),
        }
    }

    fn enclosing(&self, decl: DeclId) -> Option<DeclId> {
        match decl {
            DeclId::Method { class, .. } => Some(DeclId::Class(class)),
            DeclId::Class(idx) => {
                let parent = self.classes[idx].enclosing.as_deref()?;
                self.classes
                    .iter()
                    .position(|c| c.name == parent)
                    .filter(|&p| p != idx)
                    .map(DeclId::Class)
            }
        }
    }

    fn annotations(&self, decl: DeclId) -> &[Annotation] {
        match self.method_at(decl) {
            Some(method) => &method.annotations,
            None => &self.class_at(decl).annotations,
        }
    }

    fn parameters(&self, method: DeclId) -> &[ParamDecl] {
        self.method_at(method).map(|m| m.params.as_slice()).unwrap_or(&[])
    }

    fn return_type(&self, method: DeclId) -> Option<&TypeRef> {
        self.method_at(method)?.return_type.as_ref()
    }

    fn find_type(&self, ty: &TypeRef) -> Option<DeclId> {
        // Exact match wins; otherwise the first declaration the reference can name
        let exact = self.classes.iter().position(|c| c.name == ty.name);
        exact
            .or_else(|| self.classes.iter().position(|c| ty.names(&c.name)))
            .map(DeclId::Class)
    }

    fn fields(&self, decl: DeclId) -> &[FieldDecl] {
        match decl {
            DeclId::Class(idx) => &self.classes[idx].fields,
            DeclId::Method { .. } => &[],
        }
    }

    fn superclass(&self, decl: DeclId) -> Option<&TypeRef> {
        match decl {
            DeclId::Class(idx) => self.classes[idx].superclass.as_ref(),
            DeclId::Method { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"
classes:
  - name: com.example.Outer
    annotations:
      - kind: request_mapping
        values: { path: /outer }
  - name: com.example.Outer.Inner
    enclosing: com.example.Outer
    methods:
      - name: ping
        annotations: [{ kind: get_mapping, values: { value: /ping } }]
      - name: helper
  - name: com.example.User
    superclass: com.example.Entity
    fields:
      - { name: name, type: String }
"#;

    #[test]
    fn test_load_yaml_model() {
        let model = DeclarationModel::from_yaml_str(MODEL).unwrap();
        assert_eq!(model.classes.len(), 3);
        assert_eq!(model.method_count(), 2);
        assert_eq!(
            model.class("com.example.User").unwrap().superclass,
            Some(TypeRef::new("com.example.Entity"))
        );
    }

    #[test]
    fn test_methods_annotated_with_filters_by_kind() {
        let model = DeclarationModel::from_yaml_str(MODEL).unwrap();
        let found = model.methods_annotated_with("get_mapping");
        assert_eq!(found, vec![DeclId::Method { class: 1, index: 0 }]);
        assert!(model.methods_annotated_with("post_mapping").is_empty());
    }

    #[test]
    fn test_enclosing_chain() {
        let model = DeclarationModel::from_yaml_str(MODEL).unwrap();
        let method = DeclId::Method { class: 1, index: 0 };

        assert_eq!(model.enclosing(method), Some(DeclId::Class(1)));
        assert_eq!(model.enclosing(DeclId::Class(1)), Some(DeclId::Class(0)));
        assert_eq!(model.enclosing(DeclId::Class(0)), None);
        assert_eq!(model.qualified_name(method), "com.example.Outer.Inner::ping");
        assert_eq!(model.simple_name(DeclId::Class(1)), "Inner");
    }

    #[test]
    fn test_find_type_prefers_exact_name() {
        let model = DeclarationModel::new(vec![
            ClassDecl::new("a.User"),
            ClassDecl::new("b.User"),
        ]);
        assert_eq!(model.find_type(&TypeRef::new("b.User")), Some(DeclId::Class(1)));
        assert_eq!(model.find_type(&TypeRef::new("User")), Some(DeclId::Class(0)));
        assert_eq!(model.find_type(&TypeRef::new("int")), None);
        assert_eq!(model.find_type(&TypeRef::new("c.User")), None);
    }

    #[test]
    fn test_load_json_model_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tree.json");
        std::fs::write(
            &path,
            r#"{"classes":[{"name":"Ctrl","methods":[{"name":"get","return_type":"Dto"}]}]}"#,
        )
        .unwrap();

        let model = DeclarationModel::load(&path).unwrap();
        let method = DeclId::Method { class: 0, index: 0 };
        assert_eq!(model.return_type(method), Some(&TypeRef::new("Dto")));
    }

    #[test]
    fn test_invalid_model_is_an_error() {
        assert!(DeclarationModel::from_yaml_str("classes: 3").is_err());
    }
}
