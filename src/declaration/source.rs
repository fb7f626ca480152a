//! Builds a [`DeclarationModel`] from parsed Rust source files.
//!
//! Structs and inherent `impl` blocks become classes, keyed by their qualified name
//! (`crate::<module path>::<Type>`). A struct and its `impl` blocks therefore share one
//! class: the struct contributes fields and annotations, the `impl` blocks contribute
//! methods and further annotations.
//!
//! Recognized attributes are converted into annotations:
//!
//! ```ignore
//! #[request_mapping("/users")]
//! pub struct UserController;
//!
//! impl UserController {
//!     #[get_mapping(path = "/{id}", produces = "application/json")]
//!     pub async fn find(&self, #[request_param(default_value = "false")] full: bool) -> Json<User> { .. }
//!
//!     #[request_mapping(method = [POST, PUT])]
//!     #[deprecated]
//!     pub async fn save(&self, #[request_body] user: Json<User>) { .. }
//! }
//! ```
//!
//! An `impl` block may live in another module than its struct (`impl super::Ctrl` in a
//! child module). Such a block is attached to the struct with the same type name when
//! exactly one struct carries that name; otherwise it stays a class of its own.
//!
//! Since Rust has no inheritance, a field marked `#[serde(flatten)]` stands in for the
//! superclass: the first such field names it and is not listed as a field itself.
//! Fields marked `#[serde(skip)]` are synthetic.

use super::model::{ClassDecl, DeclarationModel, MethodDecl};
use super::{
    simple_name_of, Annotation, AnnotationValue, FieldDecl, ParamDecl, TypeRef, DEPRECATED,
    REQUEST_BODY, REQUEST_PARAM,
};
use crate::annotation::MappingKind;
use crate::parser::ParsedFile;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{visit::Visit, Attribute, Expr, Lit, Meta, Token};

/// Collects class and method declarations from Rust syntax trees.
pub struct SourceCollector {
    root_path: PathBuf,
}

impl SourceCollector {
    /// Creates a collector; module paths are derived relative to `root_path`.
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Builds the declaration model for all parsed files.
    pub fn collect(&self, parsed_files: &[ParsedFile]) -> DeclarationModel {
        let mut visitor = DeclarationVisitor::default();

        for parsed_file in parsed_files {
            visitor.module_path = module_segments(&parsed_file.path, &self.root_path);
            debug!(
                "Collecting declarations from {} (module: {})",
                parsed_file.path.display(),
                visitor.module_path.join("::")
            );
            visitor.visit_file(&parsed_file.syntax_tree);
        }

        let classes = attach_detached_impls(visitor.classes, &visitor.structs);
        debug!("Collected {} classes", classes.len());
        DeclarationModel::new(classes)
    }
}

/// Moves the methods and annotations of `impl`-only classes onto the struct they extend.
///
/// An `impl`-only class is matched by simple name against the classes backed by a struct
/// declaration; it is merged only if exactly one of them matches.
fn attach_detached_impls(
    mut classes: Vec<ClassDecl>,
    structs: &HashSet<String>,
) -> Vec<ClassDecl> {
    let targets: Vec<Option<usize>> = classes
        .iter()
        .map(|class| {
            if structs.contains(&class.name) {
                return None;
            }
            let simple = simple_name_of(&class.name);
            let mut candidates = classes
                .iter()
                .enumerate()
                .filter(|(_, c)| structs.contains(&c.name) && simple_name_of(&c.name) == simple)
                .map(|(idx, _)| idx);
            match (candidates.next(), candidates.next()) {
                (Some(idx), None) => Some(idx),
                _ => None,
            }
        })
        .collect();

    for (idx, target) in targets.iter().enumerate() {
        let Some(target) = *target else {
            continue;
        };
        debug!(
            "Attaching impl block {} to {}",
            classes[idx].name, classes[target].name
        );
        let methods = std::mem::take(&mut classes[idx].methods);
        let annotations = std::mem::take(&mut classes[idx].annotations);
        classes[target].methods.extend(methods);
        classes[target].annotations.extend(annotations);
    }

    classes
        .into_iter()
        .zip(targets)
        .filter(|(_, target)| target.is_none())
        .map(|(class, _)| class)
        .collect()
}

/// Module path segments of a file, relative to the project root.
///
/// A leading `src` directory is dropped, as are `lib.rs`, `main.rs` and `mod.rs` file
/// names, which name their parent module.
pub fn module_segments(file: &Path, root: &Path) -> Vec<String> {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let mut segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .filter(|s| !s.is_empty() && s != "/")
        .collect();

    if let Some(last) = segments.last_mut() {
        if let Some(stem) = last.strip_suffix(".rs") {
            *last = stem.to_string();
        }
    }
    if segments.first().map(|s| s == "src").unwrap_or(false) {
        segments.remove(0);
    }
    if let Some(last) = segments.last() {
        if matches!(last.as_str(), "lib" | "main" | "mod") {
            segments.pop();
        }
    }
    segments
}

#[derive(Default)]
struct DeclarationVisitor {
    classes: Vec<ClassDecl>,
    index: HashMap<String, usize>,
    /// Classes declared by a struct, as opposed to only by `impl` blocks
    structs: HashSet<String>,
    module_path: Vec<String>,
}

impl DeclarationVisitor {
    fn qualify(&self, ident: &str) -> String {
        let mut parts = vec!["crate".to_string()];
        parts.extend(self.module_path.iter().cloned());
        parts.push(ident.to_string());
        parts.join("::")
    }

    fn class_mut(&mut self, name: String) -> &mut ClassDecl {
        let idx = match self.index.get(&name) {
            Some(&idx) => idx,
            None => {
                self.classes.push(ClassDecl::new(name.clone()));
                self.index.insert(name, self.classes.len() - 1);
                self.classes.len() - 1
            }
        };
        &mut self.classes[idx]
    }
}

impl<'ast> Visit<'ast> for DeclarationVisitor {
    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        // Out-of-line `mod foo;` declarations are picked up from their own file
        if node.content.is_none() {
            return;
        }
        self.module_path.push(node.ident.to_string());
        syn::visit::visit_item_mod(self, node);
        self.module_path.pop();
    }

    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        let name = self.qualify(&node.ident.to_string());
        let annotations = parse_annotations(&node.attrs);
        let (superclass, fields) = parse_fields(&node.fields);

        self.structs.insert(name.clone());
        let class = self.class_mut(name);
        class.annotations.extend(annotations);
        if class.superclass.is_none() {
            class.superclass = superclass;
        }
        class.fields.extend(fields);
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        if node.trait_.is_some() {
            return;
        }
        let name = match &*node.self_ty {
            syn::Type::Path(type_path) => {
                let segments: Vec<String> = type_path
                    .path
                    .segments
                    .iter()
                    .map(|s| s.ident.to_string())
                    .collect();
                match (segments.first(), segments.last()) {
                    // `impl crate::a::Ctrl` already spells out the qualified name
                    (Some(first), _) if first == "crate" && segments.len() > 1 => {
                        segments.join("::")
                    }
                    (_, Some(last)) => self.qualify(last),
                    _ => return,
                }
            }
            _ => return,
        };

        let annotations = parse_annotations(&node.attrs);
        let methods: Vec<MethodDecl> = node
            .items
            .iter()
            .filter_map(|item| match item {
                syn::ImplItem::Fn(method) => Some(parse_method(method)),
                _ => None,
            })
            .collect();

        let class = self.class_mut(name);
        class.annotations.extend(annotations);
        class.methods.extend(methods);
    }
}

fn parse_method(method: &syn::ImplItemFn) -> MethodDecl {
    let name = method.sig.ident.to_string();

    let params = method
        .sig
        .inputs
        .iter()
        .enumerate()
        .filter_map(|(idx, input)| match input {
            syn::FnArg::Typed(pat_type) => Some(ParamDecl {
                name: match &*pat_type.pat {
                    syn::Pat::Ident(pat_ident) => pat_ident.ident.to_string(),
                    _ => format!("arg{}", idx),
                },
                ty: type_ref(&pat_type.ty),
                annotations: parse_annotations(&pat_type.attrs),
            }),
            syn::FnArg::Receiver(_) => None,
        })
        .collect();

    let return_type = match &method.sig.output {
        syn::ReturnType::Default => None,
        syn::ReturnType::Type(_, ty) => match &**ty {
            syn::Type::Tuple(tuple) if tuple.elems.is_empty() => None,
            other => Some(type_ref(other)),
        },
    };

    MethodDecl {
        name,
        annotations: parse_annotations(&method.attrs),
        params,
        return_type,
    }
}

/// Splits struct fields into the flattened "superclass" and the remaining fields.
fn parse_fields(fields: &syn::Fields) -> (Option<TypeRef>, Vec<FieldDecl>) {
    let mut superclass = None;
    let mut result = Vec::new();

    if let syn::Fields::Named(named) = fields {
        for field in &named.named {
            let Some(ident) = field.ident.as_ref() else {
                continue;
            };
            let serde_flags = serde_flags(&field.attrs);
            let ty = type_ref(&field.ty);

            if serde_flags.flatten && superclass.is_none() {
                superclass = Some(ty);
                continue;
            }

            let mut decl = FieldDecl::new(ident.to_string(), ty);
            decl.synthetic = serde_flags.skip;
            result.push(decl);
        }
    }

    (superclass, result)
}

#[derive(Default)]
struct SerdeFlags {
    skip: bool,
    flatten: bool,
}

fn serde_flags(attrs: &[Attribute]) -> SerdeFlags {
    let mut flags = SerdeFlags::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let parsed = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated);
        let Ok(metas) = parsed else {
            continue;
        };
        for meta in metas {
            if meta.path().is_ident("skip") {
                flags.skip = true;
            } else if meta.path().is_ident("flatten") {
                flags.flatten = true;
            }
        }
    }

    flags
}

/// Converts a `syn::Type` into a [`TypeRef`].
pub fn type_ref(ty: &syn::Type) -> TypeRef {
    match ty {
        syn::Type::Path(type_path) => {
            let name = type_path
                .path
                .segments
                .iter()
                .map(|s| s.ident.to_string())
                .collect::<Vec<_>>()
                .join("::");

            let args = match type_path.path.segments.last().map(|s| &s.arguments) {
                Some(syn::PathArguments::AngleBracketed(bracketed)) => bracketed
                    .args
                    .iter()
                    .filter_map(|arg| match arg {
                        syn::GenericArgument::Type(inner) => Some(type_ref(inner)),
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            };

            TypeRef::generic(name, args)
        }
        syn::Type::Reference(reference) => type_ref(&reference.elem),
        syn::Type::Paren(paren) => type_ref(&paren.elem),
        syn::Type::Group(group) => type_ref(&group.elem),
        syn::Type::Infer(_) => TypeRef::new("_"),
        syn::Type::Tuple(tuple) if tuple.elems.is_empty() => TypeRef::new("()"),
        _ => TypeRef::new("Unknown"),
    }
}

fn is_recognized(kind: &str) -> bool {
    MappingKind::from_name(kind).is_some()
        || matches!(kind, DEPRECATED | REQUEST_PARAM | REQUEST_BODY)
}

/// Converts recognized attributes into annotations; everything else is ignored.
fn parse_annotations(attrs: &[Attribute]) -> Vec<Annotation> {
    attrs
        .iter()
        .filter_map(|attr| {
            let kind = attr.path().segments.last()?.ident.to_string();
            if !is_recognized(&kind) {
                return None;
            }
            Some(parse_annotation(kind, attr))
        })
        .collect()
}

fn parse_annotation(kind: String, attr: &Attribute) -> Annotation {
    let mut annotation = Annotation::new(kind);

    match &attr.meta {
        Meta::Path(_) => {}
        Meta::NameValue(name_value) => {
            annotation
                .values
                .insert("value".to_string(), to_value(expr_strings(&name_value.value)));
        }
        Meta::List(_) => {
            match attr.parse_args_with(Punctuated::<AnnotationArg, Token![,]>::parse_terminated) {
                Ok(args) => {
                    for arg in args {
                        annotation.values.insert(arg.key, to_value(arg.values));
                    }
                }
                Err(e) => warn!("Ignoring malformed #[{}] arguments: {}", annotation.kind, e),
            }
        }
    }

    annotation
}

fn to_value(mut values: Vec<String>) -> AnnotationValue {
    if values.len() == 1 {
        AnnotationValue::Str(values.remove(0))
    } else {
        AnnotationValue::List(values)
    }
}

/// One attribute argument: either `key = expr` or a bare expression for `value`.
struct AnnotationArg {
    key: String,
    values: Vec<String>,
}

impl Parse for AnnotationArg {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(syn::Ident) && input.peek2(Token![=]) {
            let key: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            let expr: Expr = input.parse()?;
            Ok(Self {
                key: key.to_string(),
                values: expr_strings(&expr),
            })
        } else {
            let expr: Expr = input.parse()?;
            Ok(Self {
                key: "value".to_string(),
                values: expr_strings(&expr),
            })
        }
    }
}

/// Flattens a literal-ish expression into strings.
///
/// Paths keep only their last segment, so `RequestMethod::GET` reads as `GET`.
fn expr_strings(expr: &Expr) -> Vec<String> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Str(s) => vec![s.value()],
            Lit::Int(i) => vec![i.base10_digits().to_string()],
            Lit::Bool(b) => vec![b.value.to_string()],
            _ => Vec::new(),
        },
        Expr::Path(expr_path) => expr_path
            .path
            .segments
            .last()
            .map(|s| vec![s.ident.to_string()])
            .unwrap_or_default(),
        Expr::Array(array) => array.elems.iter().flat_map(expr_strings).collect(),
        Expr::Paren(paren) => expr_strings(&paren.expr),
        Expr::Group(group) => expr_strings(&group.expr),
        _ => Vec::new(),
    }
}
