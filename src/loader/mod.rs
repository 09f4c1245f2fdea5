//! YAML Loader module
//!
//! Parse service model definitions from YAML files.
//!
//! # Overview
//!
//! The loader module provides:
//! - `ServiceDefinition` - Declarative service model
//! - `OperationDefinition` - One command and the operation it invokes
//! - `Catalog` - Command lookup across loaded services
//! - YAML parsing with validation

mod catalog;
mod parser;
mod types;

pub use catalog::{Catalog, CommandRef};
pub use parser::{load_service, load_service_from_str, validate_service};
pub use types::{
    HttpBinding, OperationDefinition, PaginationDefinition, ParameterDefinition,
    ServiceDefinition,
};
