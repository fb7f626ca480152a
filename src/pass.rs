//! One resolution pass over a declaration tree.
//!
//! A pass finds every method carrying a mapping annotation, resolves its route schema,
//! describes its payload types and groups the resulting routes by class. The pass only
//! reads annotations; it never marks them as handled, so the same tree can be handed to
//! other consumers afterwards.

use crate::annotation::MappingKind;
use crate::config::CompassConfig;
use crate::declaration::{DeclId, DeclarationTree, ParamDecl, REQUEST_BODY, REQUEST_PARAM};
use crate::error::{Result, Warning};
use crate::introspector::Introspector;
use crate::registry::RouteRegistry;
use crate::resolver::Resolver;
use crate::route::{Param, Route};
use crate::serializer;
use log::{debug, info};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Default-value marker some hosts use for "no default declared".
pub const VALUE_NONE: &str = "\n\t\t\n\t\t\n\u{E000}\u{E001}\u{E002}\n\t\t\t\t\n";

/// Result of a successful pass.
#[derive(Debug, Clone, Default)]
pub struct PassOutput {
    pub registry: RouteRegistry,
    /// Non-fatal findings, in the order they were raised
    pub warnings: Vec<Warning>,
}

impl PassOutput {
    /// Renders the routes of this pass as report text.
    pub fn render(&self) -> String {
        serializer::render(&self.registry)
    }
}

/// Methods carrying any mapping kind, each once, in declaration order.
pub fn mapped_methods<T: DeclarationTree + ?Sized>(tree: &T) -> Vec<DeclId> {
    let methods: BTreeSet<DeclId> = MappingKind::ALL
        .into_iter()
        .flat_map(|kind| tree.methods_annotated_with(kind.name()))
        .collect();
    methods.into_iter().collect()
}

/// Runs a pass over `tree`.
///
/// Every method carrying a mapping annotation becomes one route. Routes are grouped by
/// their declaring class in declaration order.
///
/// # Arguments
///
/// * `tree` - Any declaration tree provider
/// * `config` - Envelope and top type names used when describing payloads
///
/// # Returns
///
/// The grouped routes together with the warnings raised along the way.
///
/// # Errors
///
/// Returns [`Error::Resolution`](crate::error::Error::Resolution) for the first method
/// whose path or request methods cannot be found on it or any enclosing declaration.
/// The pass is aborted; no partial result is returned.
///
/// # Example
///
/// ```no_run
/// use route_compass::config::CompassConfig;
/// use route_compass::declaration::model::DeclarationModel;
/// use route_compass::pass;
/// use std::path::Path;
///
/// let model = DeclarationModel::load(Path::new("declarations.yaml")).unwrap();
/// let output = pass::run(&model, &CompassConfig::default()).unwrap();
/// print!("{}", output.render());
/// ```
pub fn run<T: DeclarationTree + ?Sized>(tree: &T, config: &CompassConfig) -> Result<PassOutput> {
    let methods = mapped_methods(tree);
    info!("Resolving {} mapped methods", methods.len());

    let mut resolver = Resolver::new(tree);
    let introspector = Introspector::new(tree, config);

    let routes = methods
        .into_iter()
        .map(|method| build_route(tree, &mut resolver, &introspector, method))
        .collect::<Result<Vec<_>>>()?;

    let registry = RouteRegistry::aggregate(routes);
    debug!(
        "Aggregated {} routes into {} groups",
        registry.route_count(),
        registry.groups().len()
    );

    Ok(PassOutput {
        registry,
        warnings: resolver.into_warnings(),
    })
}

/// Runs a pass and merges its report into `output_dir`.
///
/// Returns the pass output together with the path of the report file.
pub fn run_and_write<T: DeclarationTree + ?Sized>(
    tree: &T,
    config: &CompassConfig,
    output_dir: &Path,
) -> Result<(PassOutput, PathBuf)> {
    let output = run(tree, config)?;
    let path = serializer::write_report(output_dir, &config.report_file_name, &output.render())?;
    Ok((output, path))
}

fn build_route<T: DeclarationTree + ?Sized>(
    tree: &T,
    resolver: &mut Resolver<'_, T>,
    introspector: &Introspector<'_, T>,
    method: DeclId,
) -> Result<Route> {
    let schema = resolver.resolve(method)?;
    let declared = tree.parameters(method);

    let class_fqn = tree
        .enclosing(method)
        .map(|class| tree.qualified_name(class))
        .unwrap_or_default();

    let input_type = declared
        .iter()
        .find(|p| p.annotation(REQUEST_BODY).is_some())
        .and_then(|body| introspector.describe(&body.ty));

    let return_type = tree
        .return_type(method)
        .and_then(|ty| introspector.describe(ty));

    Ok(Route {
        class_fqn,
        handler_name: tree.simple_name(method).to_string(),
        paths: schema.paths,
        methods: schema.methods,
        consumes: schema.consumes,
        produces: schema.produces,
        deprecated: schema.deprecated,
        params: declared.iter().filter_map(request_param).collect(),
        input_type,
        return_type,
    })
}

/// Converts a `request_param` parameter into a [`Param`].
///
/// The name comes from the annotation's `name`, then its `value`, then the parameter
/// itself. Parameters without the annotation are not request parameters.
fn request_param(param: &ParamDecl) -> Option<Param> {
    let annotation = param.annotation(REQUEST_PARAM)?;

    let name = annotation
        .string("name")
        .or_else(|| annotation.string("value"))
        .unwrap_or_else(|| param.name.clone());

    let default_value = annotation
        .string("default_value")
        .filter(|value| value != VALUE_NONE);

    Some(Param {
        type_fqn: param.ty.to_string(),
        name,
        default_value,
    })
}
