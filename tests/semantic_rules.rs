//! Declaration and typing rules exercised through the public analysis API.

use mjc::diagnostics::DiagnosticReporter;
use mjc::lexer::Scanner;
use mjc::parser::{Parser, Program};
use mjc::semantic::{analyze, CheckOptions, DeclKind, LayoutReport, SemanticError, SemanticResult};

fn parse(source: &str) -> Program {
    let mut reporter = DiagnosticReporter::new("rules.java", source);
    let tokens = Scanner::new(source, &mut reporter).scan_tokens();
    let program = Parser::new(tokens, &mut reporter).parse();
    assert!(!reporter.has_errors(), "{:?}", reporter.diagnostics());
    program.expect("program")
}

fn run(source: &str) -> SemanticResult<LayoutReport> {
    analyze(&parse(source), CheckOptions::default())
}

const MAIN: &str = "class Main { public static void main(String[] a) { System.out.println(0); } }\n";

#[test]
fn same_field_name_in_unrelated_classes_is_legal() {
    let source = format!("{MAIN} class A {{ int value; }} class B {{ int[] value; }}");
    assert!(run(&source).is_ok());
}

#[test]
fn two_root_classes_with_one_name_collide() {
    let source = format!("{MAIN} class A {{ }} class A {{ int x; }}");
    match run(&source) {
        Err(SemanticError::DuplicateDeclaration {
            kind: DeclKind::Class,
            name,
            ..
        }) => assert_eq!(name, "A"),
        other => panic!("expected duplicate class, got {:?}", other),
    }
}

#[test]
fn override_with_a_different_return_type_fails() {
    let source = format!(
        "{MAIN} class A {{ public int m(int x) {{ return x; }} }}
         class B extends A {{ public int[] m(int x) {{ return new int[x]; }} }}"
    );
    assert!(matches!(
        run(&source),
        Err(SemanticError::OverrideSignatureMismatch { .. })
    ));
}

#[test]
fn override_with_an_identical_signature_succeeds() {
    let source = format!(
        "{MAIN} class A {{ public int m(int x) {{ return x; }} }}
         class B extends A {{ public int m(int x) {{ return x + 1; }} }}"
    );
    assert!(run(&source).is_ok());
}

#[test]
fn call_with_the_wrong_argument_count_fails() {
    let source = format!(
        "{MAIN} class A {{
             public int two(int x, int y) {{ return x + y; }}
             public int go() {{ return this.two(1); }}
         }}"
    );
    match run(&source) {
        Err(SemanticError::ArityMismatch {
            method,
            expected,
            found,
            ..
        }) => {
            assert_eq!(method, "two");
            assert_eq!((expected, found), (2, 1));
        }
        other => panic!("expected arity mismatch, got {:?}", other),
    }
}

#[test]
fn missing_method_names_the_receiver_class() {
    let source = format!(
        "{MAIN} class Base {{ public int bar() {{ return 1; }} }}
         class Obj extends Base {{ }}
         class User {{
             public int use() {{ Obj obj; obj = new Obj(); return obj.foo(); }}
         }}"
    );
    let err = run(&source).unwrap_err();
    assert_eq!(
        err.to_string(),
        "no method 'foo' in class 'Obj' or its ancestors"
    );
    assert_eq!(err.code(), "E202");
}

#[test]
fn sibling_subclass_is_not_an_ancestor() {
    let source = format!(
        "{MAIN} class Animal {{ }}
         class Dog extends Animal {{ int bones; public int bark() {{ return 1; }} }}
         class Cat extends Animal {{
             public int meow() {{ return bones; }}
         }}"
    );
    assert!(matches!(
        run(&source),
        Err(SemanticError::UnknownSymbol { ref name, .. }) if name == "bones"
    ));

    let source = format!(
        "{MAIN} class Animal {{ }}
         class Dog extends Animal {{ public int bark() {{ return 1; }} }}
         class Cat extends Animal {{ public int meow() {{ return this.bark(); }} }}"
    );
    assert!(matches!(run(&source), Err(SemanticError::UnknownMethod { .. })));
}

#[test]
fn arguments_may_be_upcast_but_assignments_may_not() {
    let classes = "class Shape { public int area() { return 0; } }
         class Square extends Shape { }
         class Canvas {
             public int draw(Shape s) { return s.area(); }";

    let passing = format!("{MAIN} {classes} public int run() {{ return this.draw(new Square()); }} }}");
    assert!(run(&passing).is_ok());

    let assigning = format!(
        "{MAIN} {classes} public int run() {{ Shape s; s = new Square(); return 0; }} }}"
    );
    assert!(matches!(
        run(&assigning),
        Err(SemanticError::TypeMismatch { .. })
    ));
}

#[test]
fn condition_policy_is_selectable() {
    let source = format!(
        "{MAIN} class A {{ public int f(int n) {{ while (n) n = n - 1; return n; }} }}"
    );
    let program = parse(&source);

    assert!(analyze(&program, CheckOptions::default()).is_ok());
    assert!(matches!(
        analyze(
            &program,
            CheckOptions {
                strict_conditions: true
            }
        ),
        Err(SemanticError::TypeMismatch { .. })
    ));
}

#[test]
fn fields_typed_with_undeclared_classes_fail_only_when_allocated() {
    let declared_only = format!("{MAIN} class A {{ Ghost g; }}");
    assert!(run(&declared_only).is_ok());

    let allocated = format!(
        "{MAIN} class A {{ Ghost g; public int f() {{ g = new Ghost(); return 0; }} }}"
    );
    assert!(matches!(
        run(&allocated),
        Err(SemanticError::UnknownClass { ref name, .. }) if name == "Ghost"
    ));
}

#[test]
fn arguments_may_also_name_an_ancestor_of_the_parameter_class() {
    let source = format!(
        "{MAIN} class Shape {{ }}
         class Square extends Shape {{ }}
         class Circle extends Shape {{ }}
         class Canvas {{
             public int fill(Square s) {{ return 1; }}
             public int widen() {{ return this.fill(new Shape()); }}
             public int cross() {{ return this.fill(new Circle()); }}
         }}"
    );
    match run(&source) {
        Err(SemanticError::TypeMismatch { context, .. }) => {
            assert_eq!(context, "argument 1 of 'Canvas.fill'")
        }
        other => panic!("expected the sibling argument to fail, got {:?}", other),
    }
}

#[test]
fn overrides_resolve_names_through_the_inherited_method() {
    let source = format!(
        "{MAIN} class A {{ public int m(int x) {{ int tmp; tmp = x; return tmp; }} }}
         class B extends A {{ public int m(int x) {{ tmp = x; return tmp; }} }}"
    );
    assert!(run(&source).is_ok());
}

#[test]
fn main_parameter_and_local_share_one_scope() {
    let source = "class Main { public static void main(String[] a) { int a; a = 1; } }";
    match run(source) {
        Err(SemanticError::DuplicateDeclaration {
            kind: DeclKind::Field,
            name,
            ..
        }) => assert_eq!(name, "a"),
        other => panic!("expected duplicate main variable, got {:?}", other),
    }
}

#[test]
fn subclass_of_main_continues_its_field_offsets() {
    let source = "class Main { public static void main(String[] a) { int n; n = 1; System.out.println(n); } }
         class Sub extends Main { int y; boolean done; }";
    let report = run(source).expect("report");

    assert_eq!(report.tables.len(), 1);
    assert_eq!(
        report.entries(),
        vec!["Main.n : 0", "Sub.y : 4", "Sub.done : 8"]
    );
}
