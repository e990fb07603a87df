use super::*;
use crate::parser::parse_file;
use crate::program::SessionProgram;

fn check(src: &str) -> Vec<Diagnostic> {
    let file = parse_file(src).unwrap();
    NameChecker.check(&file)
}

/// Check `body` as the statements of `main` in a fresh session program.
fn check_main(body: &str) -> Vec<Diagnostic> {
    let mut program = SessionProgram::new().unwrap();
    program.append_statements(crate::parser::parse_stmts(body).unwrap());
    NameChecker.check(&program.to_file())
}

fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.message.as_str()).collect()
}

#[test]
fn initial_program_is_clean() {
    assert!(check_main("").is_empty());
}

#[test]
fn unused_local_is_soft() {
    let diags = check_main("x := 5");
    assert_eq!(messages(&diags), vec!["x declared but not used"]);
    assert!(diags[0].soft);
    assert_eq!(diags[0].code, Some(DiagnosticCode::UnusedVariable("x".into())));
    assert_eq!(diags[0].func.as_deref(), Some("main"));
    assert_eq!(diags[0].stmt, Some(0));
}

#[test]
fn reading_a_variable_uses_it() {
    assert!(check_main("x := 5\np(x)").is_empty());
    assert!(check_main("x := 5\ny := x + 1\np(y)").is_empty());
}

#[test]
fn plain_assignment_is_not_a_use() {
    let diags = check_main("x := 1\nx = 2");
    assert_eq!(messages(&diags), vec!["x declared but not used"]);
}

#[test]
fn compound_assignment_and_increment_are_uses() {
    assert!(check_main("x := 1\nx += 2").is_empty());
    assert!(check_main("i := 0\ni++").is_empty());
}

#[test]
fn discard_assignment_marks_use() {
    assert!(check_main("x := 1\n_ = x").is_empty());
}

#[test]
fn unused_locals_follow_declaration_order() {
    let diags = check_main("b := 1\na := 2");
    assert_eq!(
        messages(&diags),
        vec!["b declared but not used", "a declared but not used"]
    );
    assert_eq!(diags[1].stmt, Some(1));
}

#[test]
fn undefined_name_is_hard() {
    let diags = check_main("p(y)");
    assert_eq!(messages(&diags), vec!["undefined: y"]);
    assert!(!diags[0].soft);
}

#[test]
fn hard_errors_come_before_unused_locals() {
    let diags = check_main("x := 1\np(missing)");
    assert_eq!(
        messages(&diags),
        vec!["undefined: missing", "x declared but not used"]
    );
}

#[test]
fn redeclaration_with_short_var_decl() {
    let diags = check_main("x := 1\np(x)\nx := 2");
    assert_eq!(messages(&diags), vec!["no new variables on left side of :="]);
    assert_eq!(diags[0].code, Some(DiagnosticCode::NoNewVariables));
    assert!(check_main("x := 1\nx, y := 2, 3\np(x, y)").is_empty());
}

#[test]
fn var_redeclared_in_block() {
    let diags = check_main("var x int\nvar x string\np(x)");
    assert_eq!(messages(&diags), vec!["x redeclared in this block"]);
}

#[test]
fn shadowing_in_inner_block_is_allowed() {
    assert!(check_main("x := 1\np(x)\nif true {\n\tx := 2\n\tp(x)\n}").is_empty());
}

#[test]
fn non_name_on_left_of_define() {
    let diags = check_main("s := []int{1}\ns[0] := 2");
    assert!(messages(&diags).contains(&"non-name s[0] on left side of :="));
}

#[test]
fn value_expression_statement_is_not_used() {
    let diags = check_main("x := 1\nx + 1");
    assert_eq!(messages(&diags), vec!["x + 1 is not used"]);
    assert_eq!(diags[0].code, Some(DiagnosticCode::NotUsed));
}

#[test]
fn unused_import_is_soft_and_last() {
    let diags = check(
        "package main\nimport (\n\t\"fmt\"\n\t\"os\"\n)\nfunc main() {\n\tx := 1\n\tfmt.Println()\n}\n",
    );
    assert_eq!(
        messages(&diags),
        vec!["x declared but not used", "\"os\" imported but not used"]
    );
    assert!(diags[1].soft);
    assert_eq!(diags[1].code, Some(DiagnosticCode::UnusedImport("os".into())));
}

#[test]
fn unused_aliased_import_names_the_alias() {
    let diags = check("package main\nimport mr \"math/rand\"\nfunc main() {\n}\n");
    assert_eq!(
        messages(&diags),
        vec!["\"math/rand\" imported but not used as mr"]
    );
}

#[test]
fn discarded_and_blank_imports_are_not_reported() {
    let mut file = parse_file("package main\nimport (\n\t\"os\"\n\t_ \"net/http/pprof\"\n)\nfunc main() {\n}\n").unwrap();
    file.imports[0].discarded = true;
    assert!(NameChecker.check(&file).is_empty());
}

#[test]
fn discarded_import_is_undefined_when_used() {
    let mut file =
        parse_file("package main\nimport \"os\"\nfunc main() {\n\tos.Exit(0)\n}\n").unwrap();
    file.imports[0].discarded = true;
    assert_eq!(messages(&NameChecker.check(&file)), vec!["undefined: os"]);
}

#[test]
fn import_name_comes_from_path() {
    assert!(check(
        "package main\nimport \"gopkg.in/yaml.v2\"\nfunc main() {\n\tyaml.Marshal(nil)\n}\n"
    )
    .is_empty());
}

#[test]
fn package_without_selector() {
    let diags = check_main("p(fmt)");
    assert_eq!(messages(&diags), vec!["use of package fmt without selector"]);
}

#[test]
fn local_shadows_package_name() {
    assert!(check_main("fmt := \"shadow\"\np(fmt)").is_empty());
}

#[test]
fn package_level_names_resolve_in_any_order() {
    let diags = check(
        "package main\nfunc main() {\n\thelper(limit)\n}\nfunc helper(n int) {\n}\nconst limit = 3\n",
    );
    assert!(diags.is_empty(), "{:?}", diags);
}

#[test]
fn parameters_are_never_unused() {
    assert!(check("package main\nfunc f(a, b int) (c int) {\n\treturn\n}\nfunc main() {\n}\n").is_empty());
}

#[test]
fn closures_use_captured_variables() {
    assert!(check_main("n := 0\nf := func() { n++ }\nf()").is_empty());
    let diags = check_main("f := func(a int) { b := a }\nf(1)");
    assert_eq!(messages(&diags), vec!["b declared but not used"]);
}

#[test]
fn range_variables() {
    let diags = check_main("for i, v := range []int{1} {\n\tp(v)\n}");
    assert_eq!(messages(&diags), vec!["i declared but not used"]);
    assert!(check_main("for _, v := range []int{1} {\n\tp(v)\n}").is_empty());
}

#[test]
fn type_switch_binding_used_in_any_clause() {
    assert!(check_main(
        "var x interface{} = 1\nswitch v := x.(type) {\ncase int:\n\tp(v)\ncase string:\n}"
    )
    .is_empty());
    let diags = check_main("var x interface{} = 1\nswitch v := x.(type) {\ncase int:\n}");
    assert_eq!(messages(&diags), vec!["v declared but not used"]);
}

#[test]
fn if_init_scope() {
    assert!(check_main("if n := 3; n > 2 {\n\tp(n)\n}").is_empty());
    let diags = check_main("if n := 3; true {\n}\np(n)");
    assert_eq!(messages(&diags), vec!["undefined: n", "n declared but not used"]);
}

#[test]
fn struct_literal_keys_are_field_names() {
    assert!(check_main("type point struct {\n\tX, Y int\n}\np(point{X: 1, Y: 2})").is_empty());
}

#[test]
fn constants_and_types_are_never_unused() {
    assert!(check_main("const k = 1\ntype celsius float64").is_empty());
}

#[test]
fn dot_import_suppresses_undefined() {
    assert!(check("package main\nimport . \"math\"\nfunc main() {\n\t_ = Pi\n}\n").is_empty());
}

#[test]
fn blank_is_not_a_value() {
    let diags = check_main("p(_)");
    assert_eq!(messages(&diags), vec!["cannot use _ as value"]);
}
