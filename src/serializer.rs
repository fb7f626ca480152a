//! Report rendering and persistence.
//!
//! The report is plain text, one block per class:
//!
//! ```text
//! crate::users::UserController:
//! 	- [GET] [/users/{id}] (returns: application/json)
//! 		- bool full (default: false)
//! 		output: crate::models::User
//! 			- String name
//! ```
//!
//! Reports accumulate across passes: whatever the report file held before a pass is kept
//! verbatim in front of the newly rendered groups.

use crate::error::{Error, Result};
use crate::registry::RouteRegistry;
use crate::route::{Param, Route};
use log::debug;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Display adapter rendering a registry as report text.
pub struct Report<'a>(pub &'a RouteRegistry);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for group in self.0.groups() {
            writeln!(f, "{}:", group.class_fqn)?;
            for route in &group.routes {
                write_route(f, route)?;
            }
        }
        Ok(())
    }
}

fn write_route(f: &mut fmt::Formatter, route: &Route) -> fmt::Result {
    write!(f, "\t- ")?;
    if route.deprecated {
        write!(f, "[DEPRECATED] ")?;
    }

    let methods: Vec<&str> = route.methods.iter().map(|m| m.as_str()).collect();
    write!(f, "[{}] [{}]", methods.join("|"), route.paths.join("|"))?;

    if !route.consumes.is_empty() {
        write!(f, " (expects: {})", route.consumes.join("|"))?;
    }
    if !route.produces.is_empty() {
        write!(f, " (returns: {})", route.produces.join("|"))?;
    }
    writeln!(f)?;

    for param in &route.params {
        write_param(f, "\t\t", param)?;
    }

    for (label, dto) in [("input", &route.input_type), ("output", &route.return_type)] {
        if let Some(dto) = dto {
            writeln!(f, "\t\t{}: {}", label, dto.fqn)?;
            for field in &dto.fields {
                write_param(f, "\t\t\t", field)?;
            }
        }
    }

    Ok(())
}

fn write_param(f: &mut fmt::Formatter, indent: &str, param: &Param) -> fmt::Result {
    write!(f, "{}- {} {}", indent, param.type_fqn, param.name)?;
    if let Some(default_value) = &param.default_value {
        write!(f, " (default: {})", default_value)?;
    }
    writeln!(f)
}

/// Renders a registry as report text.
pub fn render(registry: &RouteRegistry) -> String {
    debug!("Rendering report for {} routes", registry.route_count());
    Report(registry).to_string()
}

/// Combines a previous report with a freshly rendered one.
///
/// The previous content is kept verbatim, without any deduplication.
pub fn merge_reports(previous: Option<&str>, fresh: &str) -> String {
    match previous {
        Some(previous) => format!("{}{}", previous, fresh),
        None => fresh.to_string(),
    }
}

/// Writes a report into `dir/file_name`, keeping any report already there in front.
///
/// The previous file is read, removed and replaced by the merged content. Returns the
/// path written to.
pub fn write_report(dir: &Path, file_name: &str, fresh: &str) -> Result<PathBuf> {
    let path = dir.join(file_name);
    let io_error = |source| Error::Io {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(dir).map_err(|source| Error::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let previous = if path.exists() {
        let content = fs::read_to_string(&path).map_err(io_error)?;
        fs::remove_file(&path).map_err(io_error)?;
        debug!(
            "Keeping {} bytes of previous report {}",
            content.len(),
            path.display()
        );
        Some(content)
    } else {
        None
    };

    let merged = merge_reports(previous.as_deref(), fresh);
    fs::write(&path, &merged).map_err(io_error)?;

    debug!("Wrote {} bytes to {}", merged.len(), path.display());
    Ok(path)
}
