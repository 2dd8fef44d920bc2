//! Second pass: type every statement and expression against the catalog.
//!
//! Checking stops at the first violation. Assignment requires identical
//! types, while a class argument may name any class on the parameter
//! class's own lineage, above or below it.

use tracing::trace;

use super::catalog::{Catalog, ClassId, MethodEntry};
use super::error::{SemanticError, SemanticResult};
use super::types::Type;
use crate::parser::{BinaryOp, ClassDecl, Expr, Ident, MainClass, MethodDecl, Program, Span, Stmt};

/// Knobs for the type checker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Require `boolean` conditions and `&&`/`!` operands, and `int` operands for `<`.
    /// Off by default: those operands are evaluated but their types are not constrained.
    pub strict_conditions: bool,
}

/// Where a name is being resolved from
#[derive(Clone, Copy)]
struct Scope<'c> {
    class: ClassId,
    /// `None` inside the main class body
    method: Option<&'c MethodEntry>,
}

pub struct TypeChecker<'c> {
    catalog: &'c Catalog,
    options: CheckOptions,
}

impl<'c> TypeChecker<'c> {
    pub fn new(catalog: &'c Catalog, options: CheckOptions) -> Self {
        Self { catalog, options }
    }

    /// Check the main body first, then every method of every class
    pub fn check(&self, program: &Program) -> SemanticResult<()> {
        self.check_main(&program.main)?;

        for class in &program.classes {
            self.check_class(class)?;
        }

        Ok(())
    }

    fn check_main(&self, main: &MainClass) -> SemanticResult<()> {
        let class = self.lookup_class(&main.name)?;
        let scope = Scope {
            class,
            method: None,
        };

        trace!(class = %main.name.name, statements = main.body.len(), "checking main body");
        self.check_statements(&main.body, scope)
    }

    fn check_class(&self, decl: &ClassDecl) -> SemanticResult<()> {
        let class = self.lookup_class(&decl.name)?;

        for method in &decl.methods {
            self.check_method(class, method)?;
        }

        Ok(())
    }

    fn check_method(&self, class: ClassId, decl: &MethodDecl) -> SemanticResult<()> {
        let entry = self
            .catalog
            .class(class)
            .method(&decl.name.name)
            .ok_or_else(|| SemanticError::UnknownMethod {
                class: self.catalog.class(class).name.clone(),
                method: decl.name.name.clone(),
                span: decl.name.span,
            })?;
        let scope = Scope {
            class,
            method: Some(entry),
        };

        trace!(
            class = %self.catalog.class(class).name,
            method = %entry.name,
            "checking method"
        );

        // The return expression is checked ahead of the body.
        let returned = self.check_expr(&decl.return_expr, scope)?;
        self.expect_type(
            &entry.return_type,
            &returned,
            || format!("return value of '{}'", entry.name),
            decl.return_expr.span(),
        )?;

        self.check_statements(&decl.body, scope)
    }

    fn lookup_class(&self, name: &Ident) -> SemanticResult<ClassId> {
        self.catalog
            .find_class(&name.name)
            .ok_or_else(|| SemanticError::UnknownClass {
                name: name.name.clone(),
                span: name.span,
            })
    }

    /// Walks the class and then each ancestor. At every step the
    /// same-named method's locals and parameters come before that class's
    /// fields, so an ancestor's version of the current method is searched
    /// too.
    fn resolve(&self, name: &Ident, scope: Scope<'_>) -> SemanticResult<Type> {
        for class in self.catalog.lineage(scope.class) {
            let entry = self.catalog.class(class);

            if let Some(method) = scope.method.and_then(|current| entry.method(&current.name)) {
                if let Some(binding) = method.local(&name.name).or_else(|| method.param(&name.name)) {
                    return Ok(binding.ty.clone());
                }
            }

            if let Some(field) = entry.field(&name.name) {
                return Ok(field.ty.clone());
            }
        }

        Err(SemanticError::UnknownSymbol {
            name: name.name.clone(),
            scope: Some(self.describe(scope)),
            span: name.span,
        })
    }

    fn describe(&self, scope: Scope<'_>) -> String {
        let class = &self.catalog.class(scope.class).name;
        match scope.method {
            Some(method) => format!("method '{}.{}'", class, method.name),
            None => format!("class '{}'", class),
        }
    }

    // === Statements ===

    fn check_statements(&self, statements: &[Stmt], scope: Scope<'_>) -> SemanticResult<()> {
        statements
            .iter()
            .try_for_each(|stmt| self.check_statement(stmt, scope))
    }

    fn check_statement(&self, stmt: &Stmt, scope: Scope<'_>) -> SemanticResult<()> {
        match stmt {
            Stmt::Block(statements) => self.check_statements(statements, scope),

            Stmt::Assign { target, value } => {
                let expected = self.resolve(target, scope)?;
                let found = self.check_expr(value, scope)?;
                self.expect_type(
                    &expected,
                    &found,
                    || format!("assignment to '{}'", target.name),
                    value.span(),
                )
            }

            Stmt::ArrayAssign {
                target,
                index,
                value,
            } => {
                let array = self.resolve(target, scope)?;
                self.expect_type(
                    &Type::IntArray,
                    &array,
                    || format!("indexed assignment to '{}'", target.name),
                    target.span,
                )?;
                self.expect_expr(&Type::Int, index, scope, || "array index".to_string())?;
                self.expect_expr(&Type::Int, value, scope, || {
                    format!("element assigned to '{}'", target.name)
                })
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_condition(condition, scope, "if")?;
                self.check_statement(then_branch, scope)?;
                self.check_statement(else_branch, scope)
            }

            Stmt::While { condition, body } => {
                self.check_condition(condition, scope, "while")?;
                self.check_statement(body, scope)
            }

            Stmt::Print(value) => {
                self.expect_expr(&Type::Int, value, scope, || "print argument".to_string())
            }
        }
    }

    fn check_condition(&self, condition: &Expr, scope: Scope<'_>, keyword: &str) -> SemanticResult<()> {
        let found = self.check_expr(condition, scope)?;
        if self.options.strict_conditions {
            self.expect_type(
                &Type::Boolean,
                &found,
                || format!("{} condition", keyword),
                condition.span(),
            )?;
        }
        Ok(())
    }

    // === Expressions ===

    /// Compute the type of `expr`
    fn check_expr(&self, expr: &Expr, scope: Scope<'_>) -> SemanticResult<Type> {
        match expr {
            Expr::IntLiteral { .. } => Ok(Type::Int),
            Expr::BoolLiteral { .. } => Ok(Type::Boolean),
            Expr::Identifier(name) => self.resolve(name, scope),
            Expr::This(_) => Ok(Type::ClassRef(
                self.catalog.class(scope.class).name.clone(),
            )),

            Expr::NewArray { size, .. } => {
                self.expect_expr(&Type::Int, size, scope, || "array size".to_string())?;
                Ok(Type::IntArray)
            }

            Expr::NewObject { class, .. } => {
                self.lookup_class(class)?;
                Ok(Type::ClassRef(class.name.clone()))
            }

            Expr::Not { operand, .. } => {
                if self.options.strict_conditions {
                    self.expect_expr(&Type::Boolean, operand, scope, || "operand of '!'".to_string())?;
                } else {
                    self.check_expr(operand, scope)?;
                }
                Ok(Type::Boolean)
            }

            Expr::Paren { inner, .. } => self.check_expr(inner, scope),

            Expr::Binary {
                left, op, right, ..
            } => self.check_binary(left, *op, right, scope),

            Expr::ArrayLookup { array, index, .. } => {
                self.expect_expr(&Type::IntArray, array, scope, || "indexed value".to_string())?;
                self.expect_expr(&Type::Int, index, scope, || "array index".to_string())?;
                Ok(Type::Int)
            }

            Expr::ArrayLength { array, .. } => {
                self.expect_expr(&Type::IntArray, array, scope, || "receiver of 'length'".to_string())?;
                Ok(Type::Int)
            }

            Expr::Call {
                receiver,
                method,
                args,
                span,
            } => self.check_call(receiver, method, args, *span, scope),
        }
    }

    fn check_binary(
        &self,
        left: &Expr,
        op: BinaryOp,
        right: &Expr,
        scope: Scope<'_>,
    ) -> SemanticResult<Type> {
        let operand = || format!("operand of '{}'", op.symbol());

        match op {
            BinaryOp::And | BinaryOp::Lt if !self.options.strict_conditions => {
                self.check_expr(left, scope)?;
                self.check_expr(right, scope)?;
                Ok(Type::Boolean)
            }
            BinaryOp::And => {
                self.expect_expr(&Type::Boolean, left, scope, operand)?;
                self.expect_expr(&Type::Boolean, right, scope, operand)?;
                Ok(Type::Boolean)
            }
            BinaryOp::Lt => {
                self.expect_expr(&Type::Int, left, scope, operand)?;
                self.expect_expr(&Type::Int, right, scope, operand)?;
                Ok(Type::Boolean)
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => {
                self.expect_expr(&Type::Int, left, scope, operand)?;
                self.expect_expr(&Type::Int, right, scope, operand)?;
                Ok(Type::Int)
            }
        }
    }

    fn check_call(
        &self,
        receiver: &Expr,
        method: &Ident,
        args: &[Expr],
        span: Span,
        scope: Scope<'_>,
    ) -> SemanticResult<Type> {
        let receiver_type = self.check_expr(receiver, scope)?;
        let class = receiver_type
            .class_name()
            .and_then(|name| self.catalog.find_class(name))
            .ok_or_else(|| SemanticError::UnknownClass {
                name: receiver_type.to_string(),
                span: receiver.span(),
            })?;
        let class_name = &self.catalog.class(class).name;

        let target = self
            .catalog
            .find_method(class, &method.name)
            .ok_or_else(|| SemanticError::UnknownMethod {
                class: class_name.clone(),
                method: method.name.clone(),
                span: method.span,
            })?;

        if target.params.len() != args.len() {
            return Err(SemanticError::ArityMismatch {
                class: class_name.clone(),
                method: method.name.clone(),
                expected: target.params.len(),
                found: args.len(),
                span,
            });
        }

        for (position, (arg, expected)) in args.iter().zip(target.param_types()).enumerate() {
            let found = self.check_expr(arg, scope)?;
            if !self.accepts_argument(expected, &found) {
                return Err(SemanticError::TypeMismatch {
                    context: format!(
                        "argument {} of '{}.{}'",
                        position + 1,
                        class_name,
                        method.name
                    ),
                    expected: expected.clone(),
                    found,
                    span: arg.span(),
                });
            }
        }

        trace!(class = %class_name, method = %method.name, args = args.len(), "call resolved");
        Ok(target.return_type.clone())
    }

    /// Exact match, or a class argument whose class is an ancestor or a
    /// descendant of the parameter's class
    fn accepts_argument(&self, expected: &Type, found: &Type) -> bool {
        if expected == found {
            return true;
        }

        match (expected.class_name(), found.class_name()) {
            (Some(parameter), Some(argument)) => {
                match (
                    self.catalog.find_class(parameter),
                    self.catalog.find_class(argument),
                ) {
                    (Some(parameter), Some(argument)) => {
                        self.catalog.is_subclass_of(argument, parameter)
                            || self.catalog.is_subclass_of(parameter, argument)
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    fn expect_expr(
        &self,
        expected: &Type,
        expr: &Expr,
        scope: Scope<'_>,
        context: impl Fn() -> String,
    ) -> SemanticResult<()> {
        let found = self.check_expr(expr, scope)?;
        self.expect_type(expected, &found, context, expr.span())
    }

    fn expect_type(
        &self,
        expected: &Type,
        found: &Type,
        context: impl Fn() -> String,
        span: Span,
    ) -> SemanticResult<()> {
        if expected == found {
            return Ok(());
        }

        Err(SemanticError::TypeMismatch {
            context: context(),
            expected: expected.clone(),
            found: found.clone(),
            span,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::parse_source;
    use crate::semantic::builder::CatalogBuilder;

    fn check_with(source: &str, options: CheckOptions) -> SemanticResult<()> {
        let (program, reporter) = parse_source(source);
        assert!(!reporter.has_errors(), "{:?}", reporter.diagnostics());
        let program = program.expect("program");
        let mut catalog = Catalog::new();
        CatalogBuilder::new(&mut catalog).build(&program)?;
        TypeChecker::new(&catalog, options).check(&program)
    }

    fn check(source: &str) -> SemanticResult<()> {
        check_with(source, CheckOptions::default())
    }

    fn strict(source: &str) -> SemanticResult<()> {
        check_with(
            source,
            CheckOptions {
                strict_conditions: true,
            },
        )
    }

    /// Wraps `body` as the single method `int run()` of class `T`, with `decls` as its locals
    fn method_unit(decls: &str, body: &str, ret: &str) -> String {
        format!(
            "class Main {{ public static void main(String[] a) {{ System.out.println(1); }} }}
             class T {{
                 int field;
                 public int run() {{ {decls} {body} return {ret}; }}
                 public int take(Base b) {{ return 1; }}
                 public int take_derived(Derived d) {{ return 1; }}
             }}
             class Base {{ public int id() {{ return 1; }} }}
             class Derived extends Base {{ }}
             class Sibling extends Base {{ }}"
        )
    }

    #[test]
    fn well_typed_program_passes() {
        let source = method_unit(
            "int[] xs; int i; Base b; Derived d;",
            "xs = new int[10];
             i = 0;
             while (i < xs.length) { xs[i] = i * 2; i = i + 1; }
             b = new Base();
             d = new Derived();
             i = this.take(d) + d.id() + field;
             if (!(i < 3) && true) System.out.println(xs[0]); else {}",
            "i",
        );
        assert_eq!(check(&source), Ok(()));
        assert_eq!(strict(&source), Ok(()));
    }

    #[test]
    fn assignment_requires_identical_types() {
        let err = check(&method_unit("int i;", "i = true;", "i")).unwrap_err();
        assert!(matches!(
            err,
            SemanticError::TypeMismatch { expected: Type::Int, found: Type::Boolean, .. }
        ));

        let err = check(&method_unit("Base b;", "b = new Derived();", "1")).unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { .. }));
    }

    #[test]
    fn arguments_accept_subclasses() {
        assert_eq!(check(&method_unit("", "", "this.take(new Derived())")), Ok(()));

        let err = check(&method_unit("", "", "this.take(new T())")).unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { ref context, .. } if context.contains("argument 1")));
    }

    #[test]
    fn arguments_accept_ancestors_of_the_parameter_class() {
        assert_eq!(check(&method_unit("", "", "this.take_derived(new Base())")), Ok(()));
        assert_eq!(check(&method_unit("", "", "this.take_derived(new Derived())")), Ok(()));

        let err = check(&method_unit("", "", "this.take_derived(new Sibling())")).unwrap_err();
        assert!(matches!(
            err,
            SemanticError::TypeMismatch { expected: Type::ClassRef(ref expected), found: Type::ClassRef(ref found), .. }
                if expected == "Derived" && found == "Sibling"
        ));
    }

    #[test]
    fn primitive_argument_mismatch_is_rejected() {
        let err = check(&method_unit("", "", "this.take(1)")).unwrap_err();
        assert!(matches!(
            err,
            SemanticError::TypeMismatch { found: Type::Int, .. }
        ));
    }

    #[test]
    fn unknown_names_are_reported() {
        let err = check(&method_unit("", "missing = 1;", "1")).unwrap_err();
        assert!(matches!(
            err,
            SemanticError::UnknownSymbol { ref name, ref scope, .. }
                if name == "missing" && scope.as_deref() == Some("method 'T.run'")
        ));

        let err = check(&method_unit("", "", "new Nowhere().id()")).unwrap_err();
        assert!(matches!(err, SemanticError::UnknownClass { ref name, .. } if name == "Nowhere"));
    }

    #[test]
    fn calls_resolve_through_ancestors() {
        assert_eq!(check(&method_unit("", "", "new Derived().id()")), Ok(()));

        let err = check(&method_unit("Base b;", "b = new Base();", "b.foo()")).unwrap_err();
        assert!(matches!(
            err,
            SemanticError::UnknownMethod { ref class, ref method, .. }
                if class == "Base" && method == "foo"
        ));
    }

    #[test]
    fn arity_is_checked_before_arguments() {
        let err = check(&method_unit("", "", "this.take(new Base(), undefined)")).unwrap_err();
        assert!(matches!(
            err,
            SemanticError::ArityMismatch { expected: 1, found: 2, .. }
        ));
    }

    #[test]
    fn primitive_receiver_is_not_a_class() {
        let err = check(&method_unit("int i;", "i = 1;", "i.id()")).unwrap_err();
        assert!(matches!(err, SemanticError::UnknownClass { ref name, .. } if name == "int"));
    }

    #[test]
    fn return_type_must_match_exactly() {
        let err = check(&method_unit("", "", "true")).unwrap_err();
        assert!(matches!(
            err,
            SemanticError::TypeMismatch { expected: Type::Int, found: Type::Boolean, .. }
        ));
    }

    #[test]
    fn this_has_the_enclosing_class_type() {
        let source = "class Main { public static void main(String[] a) { System.out.println(1); } }
             class A { public A self() { return this; } }
             class B extends A { public A self() { return this; } }";
        let err = check(source).unwrap_err();
        assert!(matches!(
            err,
            SemanticError::TypeMismatch { found: Type::ClassRef(ref name), .. } if name == "B"
        ));
    }

    #[test]
    fn inherited_fields_are_visible_and_locals_shadow_them() {
        let source = "class Main { public static void main(String[] a) { System.out.println(1); } }
             class A { int x; boolean flag; }
             class B extends A {
                 public int get() { boolean x; x = flag; return 1; }
             }";
        assert_eq!(check(source), Ok(()));
    }

    #[test]
    fn ancestor_method_locals_are_visible_to_its_override() {
        let source = "class Main { public static void main(String[] a) { System.out.println(1); } }
             class A { public int m(int x) { int tmp; tmp = x; return tmp; } }
             class B extends A { public int m(int x) { tmp = x; return tmp; } }";
        assert_eq!(check(source), Ok(()));

        let source = "class Main { public static void main(String[] a) { System.out.println(1); } }
             class A { boolean seen; public int m(int x) { int seen; seen = x; return seen; } }
             class B extends A { public int m(int x) { return seen; } }";
        assert_eq!(check(source), Ok(()));
    }

    #[test]
    fn other_ancestor_methods_are_not_searched() {
        let source = "class Main { public static void main(String[] a) { System.out.println(1); } }
             class A { public int other() { int tmp; tmp = 1; return tmp; } }
             class B extends A { public int m() { tmp = 1; return 1; } }";
        let err = check(source).unwrap_err();
        assert!(matches!(
            err,
            SemanticError::UnknownSymbol { ref name, ref scope, .. }
                if name == "tmp" && scope.as_deref() == Some("method 'B.m'")
        ));
    }

    #[test]
    fn main_body_sees_only_main_fields() {
        let source = "class Main { public static void main(String[] args) { int n; n = 3; System.out.println(n); } }";
        assert_eq!(check(source), Ok(()));

        let err = check(
            "class Main { public static void main(String[] args) { System.out.println(args); } }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { found: Type::IntArray, .. }));
    }

    #[test]
    fn array_operations_require_int_arrays() {
        let err = check(&method_unit("int i;", "i[0] = 1;", "1")).unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { expected: Type::IntArray, .. }));

        let err = check(&method_unit("int[] xs;", "xs = new int[true];", "1")).unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { expected: Type::Int, .. }));

        let err = check(&method_unit("boolean b;", "b = false;", "b.length")).unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { expected: Type::IntArray, .. }));
    }

    #[test]
    fn loose_mode_does_not_constrain_conditions() {
        let source = method_unit(
            "int i;",
            "i = 0; if (i) i = 1; else i = 2; while (i + 1) i = 0; if (3 && new Base()) {} else {}",
            "1",
        );
        assert_eq!(check(&source), Ok(()));

        let err = strict(&source).unwrap_err();
        assert!(matches!(
            err,
            SemanticError::TypeMismatch { ref context, expected: Type::Boolean, .. } if context == "if condition"
        ));
    }

    #[test]
    fn strict_mode_constrains_operands() {
        let less = method_unit("", "if (true < 1) {} else {}", "1");
        assert_eq!(check(&less), Ok(()));
        assert!(matches!(
            strict(&less).unwrap_err(),
            SemanticError::TypeMismatch { expected: Type::Int, found: Type::Boolean, .. }
        ));

        let not = method_unit("", "if (!1) {} else {}", "1");
        assert_eq!(check(&not), Ok(()));
        assert!(matches!(
            strict(&not).unwrap_err(),
            SemanticError::TypeMismatch { expected: Type::Boolean, found: Type::Int, .. }
        ));
    }

    #[test]
    fn arithmetic_requires_ints() {
        let err = check(&method_unit("", "", "1 + true")).unwrap_err();
        assert!(matches!(
            err,
            SemanticError::TypeMismatch { ref context, .. } if context == "operand of '+'"
        ));
    }

    #[test]
    fn checking_stops_at_the_first_error() {
        let err = check(&method_unit("int i;", "i = true; i = undefined;", "1")).unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { .. }));
    }

    #[test]
    fn return_value_is_checked_before_the_body() {
        let err = check(&method_unit("int i;", "i = undefined;", "false")).unwrap_err();
        assert!(matches!(
            err,
            SemanticError::TypeMismatch { ref context, found: Type::Boolean, .. }
                if context == "return value of 'run'"
        ));
    }
}
