//! Resolved route records.
//!
//! A [`Route`] is produced once per mapped method and is never modified after the
//! resolution pass has built it.

use crate::annotation::HttpMethod;

/// Complete information about a single endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Qualified name of the class declaring the handler
    pub class_fqn: String,
    /// Simple name of the handler method
    pub handler_name: String,
    /// Fully resolved paths; never empty
    pub paths: Vec<String>,
    /// Request methods, without duplicates; never empty
    pub methods: Vec<HttpMethod>,
    /// Accepted media types
    pub consumes: Vec<String>,
    /// Produced media types
    pub produces: Vec<String>,
    pub deprecated: bool,
    /// Query/form parameters, in declaration order
    pub params: Vec<Param>,
    /// Shape of the request body, if the handler takes one
    pub input_type: Option<Dto>,
    /// Shape of the response, if the handler returns something describable
    pub return_type: Option<Dto>,
}

/// A named, typed value: a request parameter or a DTO field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub type_fqn: String,
    pub name: String,
    /// Absent when the parameter is required; always absent for DTO fields
    pub default_value: Option<String>,
}

impl Param {
    pub fn new(type_fqn: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_fqn: type_fqn.into(),
            name: name.into(),
            default_value: None,
        }
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }
}

/// Structural description of a payload type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dto {
    /// Qualified name of the described type as referenced (envelopes are not unwrapped)
    pub fqn: String,
    /// Own fields first, then each ancestor's fields
    pub fields: Vec<Param>,
}

impl Dto {
    pub fn new(fqn: impl Into<String>, fields: Vec<Param>) -> Self {
        Self {
            fqn: fqn.into(),
            fields,
        }
    }
}
