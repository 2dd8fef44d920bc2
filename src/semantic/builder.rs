//! First pass: populate the catalog from the program tree.
//!
//! Declaration rules enforced here:
//! - class names are unique across the whole catalog
//! - a parent must be declared before the class that extends it
//! - fields are unique within their own class (inherited names may be reused)
//! - methods are unique within their own class
//! - parameters are unique, and locals never collide with parameters or each other
//! - an override keeps its ancestor's return type and parameter types

use tracing::debug;

use super::catalog::{Binding, Catalog, ClassEntry, ClassId, FieldEntry, MethodEntry};
use super::error::{DeclKind, SemanticError, SemanticResult};
use super::types::Type;
use crate::parser::{ClassDecl, Ident, MainClass, MethodDecl, Program, VarDecl};

pub struct CatalogBuilder<'c> {
    catalog: &'c mut Catalog,
}

impl<'c> CatalogBuilder<'c> {
    pub fn new(catalog: &'c mut Catalog) -> Self {
        Self { catalog }
    }

    /// Register the main class and then every class in source order
    pub fn build(&mut self, program: &Program) -> SemanticResult<()> {
        self.declare_main(&program.main)?;

        for class in &program.classes {
            self.declare_class(class)?;
        }

        debug!(
            classes = self.catalog.class_count(),
            tables = self.catalog.tables().len(),
            "catalog built"
        );
        Ok(())
    }

    /// The `String[]` argument and the locals of `main` become fields of the main class
    fn declare_main(&mut self, main: &MainClass) -> SemanticResult<()> {
        let id = self.open_root(&main.name)?;

        self.add_field(
            id,
            FieldEntry {
                name: main.arg.name.clone(),
                ty: Type::IntArray,
                synthetic: true,
            },
            &main.arg,
        )?;

        for local in &main.locals {
            self.add_field(id, field(local), &local.name)?;
        }

        debug!(class = %main.name.name, fields = main.locals.len(), "main class registered");
        Ok(())
    }

    fn declare_class(&mut self, class: &ClassDecl) -> SemanticResult<()> {
        let id = match &class.parent {
            None => self.open_root(&class.name)?,
            Some(parent) => self.append_derived(&class.name, parent)?,
        };

        for decl in &class.fields {
            self.add_field(id, field(decl), &decl.name)?;
        }

        for method in &class.methods {
            self.declare_method(id, method)?;
        }

        debug!(
            class = %class.name.name,
            parent = class.parent.as_ref().map(|p| p.name.as_str()).unwrap_or("-"),
            table = id.table,
            index = id.index,
            "class registered"
        );
        Ok(())
    }

    fn open_root(&mut self, name: &Ident) -> SemanticResult<ClassId> {
        self.ensure_class_is_new(name)?;
        Ok(self.catalog.open_table(ClassEntry::new(name.name.clone())))
    }

    fn append_derived(&mut self, name: &Ident, parent: &Ident) -> SemanticResult<ClassId> {
        self.ensure_class_is_new(name)?;
        let parent_id =
            self.catalog
                .find_class(&parent.name)
                .ok_or_else(|| SemanticError::UnknownClass {
                    name: parent.name.clone(),
                    span: parent.span,
                })?;
        Ok(self
            .catalog
            .append(parent_id, ClassEntry::new(name.name.clone())))
    }

    fn ensure_class_is_new(&self, name: &Ident) -> SemanticResult<()> {
        if self.catalog.find_class(&name.name).is_some() {
            return Err(SemanticError::DuplicateDeclaration {
                kind: DeclKind::Class,
                name: name.name.clone(),
                scope: None,
                span: name.span,
            });
        }
        Ok(())
    }

    fn add_field(&mut self, id: ClassId, entry: FieldEntry, at: &Ident) -> SemanticResult<()> {
        let class = self.catalog.class_mut(id);
        if class.field(&entry.name).is_some() {
            return Err(SemanticError::DuplicateDeclaration {
                kind: DeclKind::Field,
                name: entry.name,
                scope: Some(format!("class '{}'", class.name)),
                span: at.span,
            });
        }
        class.fields.push(entry);
        Ok(())
    }

    fn declare_method(&mut self, id: ClassId, method: &MethodDecl) -> SemanticResult<()> {
        let class_name = self.catalog.class(id).name.clone();
        if self.catalog.class(id).method(&method.name.name).is_some() {
            return Err(SemanticError::DuplicateDeclaration {
                kind: DeclKind::Method,
                name: method.name.name.clone(),
                scope: Some(format!("class '{}'", class_name)),
                span: method.name.span,
            });
        }

        let scope = || format!("method '{}.{}'", class_name, method.name.name);

        let mut params: Vec<Binding> = Vec::with_capacity(method.params.len());
        for param in &method.params {
            if params.iter().any(|p| p.name == param.name.name) {
                return Err(SemanticError::DuplicateDeclaration {
                    kind: DeclKind::Parameter,
                    name: param.name.name.clone(),
                    scope: Some(scope()),
                    span: param.name.span,
                });
            }
            params.push(binding(param));
        }

        let mut locals: Vec<Binding> = Vec::with_capacity(method.locals.len());
        for local in &method.locals {
            let name = &local.name.name;
            if params.iter().chain(locals.iter()).any(|b| &b.name == name) {
                return Err(SemanticError::DuplicateDeclaration {
                    kind: DeclKind::Variable,
                    name: name.clone(),
                    scope: Some(scope()),
                    span: local.name.span,
                });
            }
            locals.push(binding(local));
        }

        let entry = MethodEntry {
            name: method.name.name.clone(),
            return_type: Type::from(&method.return_type),
            params,
            locals,
            owner: id.index,
        };

        self.check_override(id, &entry, &method.name)?;

        debug!(
            class = %class_name,
            method = %entry.name,
            params = entry.params.len(),
            locals = entry.locals.len(),
            "method registered"
        );
        self.catalog.class_mut(id).methods.push(entry);
        Ok(())
    }

    /// Parameters are matched by name against the ancestor's parameter list
    fn check_override(&self, id: ClassId, entry: &MethodEntry, at: &Ident) -> SemanticResult<()> {
        let Some(ancestor) = self.catalog.find_inherited_method(id, &entry.name) else {
            return Ok(());
        };

        let params_match = entry.params.iter().all(|param| {
            ancestor
                .param(&param.name)
                .is_some_and(|inherited| inherited.ty == param.ty)
        });

        if ancestor.return_type != entry.return_type || !params_match {
            let tables = self.catalog.tables();
            return Err(SemanticError::OverrideSignatureMismatch {
                class: self.catalog.class(id).name.clone(),
                ancestor: tables[id.table].entries[ancestor.owner].name.clone(),
                method: entry.name.clone(),
                span: at.span,
            });
        }

        debug!(
            method = %entry.name,
            ancestor_index = ancestor.owner,
            "override accepted"
        );
        Ok(())
    }
}

fn binding(decl: &VarDecl) -> Binding {
    Binding::new(decl.name.name.clone(), Type::from(&decl.type_spec))
}

fn field(decl: &VarDecl) -> FieldEntry {
    FieldEntry {
        name: decl.name.name.clone(),
        ty: Type::from(&decl.type_spec),
        synthetic: false,
    }
}
