//! Semantic analysis: catalog construction, type checking and layout.
//!
//! Each call to [`analyze`] works on its own [`Catalog`], so nothing
//! carries over from one compiled unit to the next.

mod builder;
mod catalog;
mod error;
mod layout;
mod type_checker;
mod types;

pub use builder::CatalogBuilder;
pub use catalog::{Binding, Catalog, ChainTable, ClassEntry, ClassId, FieldEntry, MethodEntry};
pub use error::{DeclKind, SemanticError, SemanticResult};
pub use layout::{ClassLayout, LayoutReport, Slot, TableLayout, METHOD_SLOT_SIZE};
pub use type_checker::{CheckOptions, TypeChecker};
pub use types::{is_integer_literal, Type};

use tracing::info;

use crate::parser::Program;

/// Build the catalog, type-check the program and compute its layout.
///
/// Returns the first semantic error encountered.
pub fn analyze(program: &Program, options: CheckOptions) -> SemanticResult<LayoutReport> {
    let mut catalog = Catalog::new();

    CatalogBuilder::new(&mut catalog).build(program)?;
    info!(
        target: "pipeline",
        stage = "catalog",
        status = "ok",
        classes = catalog.class_count(),
        tables = catalog.tables().len()
    );

    TypeChecker::new(&catalog, options).check(program)?;
    info!(
        target: "pipeline",
        stage = "check",
        status = "ok",
        strict_conditions = options.strict_conditions
    );

    let report = LayoutReport::compute(&catalog);
    info!(
        target: "pipeline",
        stage = "layout",
        status = "ok",
        entries = report.entries().len()
    );
    Ok(report)
}
