// Whole programs read from tests/fixtures/ through the file-backed scanner

use minic::parser::{Lexer, ParseOutput, Parser, Scanner};
use std::fs;
use std::path::{Path, PathBuf};

fn fixture_dir(kind: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(kind)
}

fn parse_file(path: &Path) -> ParseOutput {
    let scanner = Scanner::open(path).expect("Failed to open fixture");
    Parser::new(Lexer::new(scanner))
        .parse()
        .expect("Failed to read fixture")
}

fn fixtures(kind: &str) -> Vec<PathBuf> {
    let mut paths: Vec<_> = fs::read_dir(fixture_dir(kind))
        .expect("Failed to list fixtures")
        .map(|entry| entry.expect("Failed to read directory entry").path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "c"))
        .collect();
    paths.sort();
    paths
}

#[test]
fn test_passing_fixtures_have_no_errors() {
    let paths = fixtures("pass");
    assert!(paths.len() >= 3);

    for path in paths {
        let output = parse_file(&path);
        assert_eq!(output.lex_error_count(), 0, "{}", path.display());
        assert!(
            output.is_ok(),
            "{}: {:?}",
            path.display(),
            output.errors.iter().map(ToString::to_string).collect::<Vec<_>>()
        );
        assert!(!output.program.functions.is_empty(), "{}", path.display());
    }
}

#[test]
fn test_file_and_string_sources_agree() {
    for path in fixtures("pass").into_iter().chain(fixtures("fail")) {
        let source = fs::read_to_string(&path).expect("Failed to read fixture");
        let from_string = Parser::from_source(&source).parse().unwrap();
        let from_file = parse_file(&path);

        assert_eq!(from_string.program, from_file.program, "{}", path.display());
        assert_eq!(from_string.errors, from_file.errors, "{}", path.display());
    }
}

#[test]
fn test_fibonacci_shape() {
    let output = parse_file(&fixture_dir("pass").join("fibonacci.c"));
    let main = &output.program.functions[0];
    assert_eq!(main.name, "main");
    assert_eq!(main.body.var_decls.len(), 6);
    assert_eq!(main.body.stmts.len(), 8);
}

#[test]
fn test_missing_semicolon() {
    let output = parse_file(&fixture_dir("fail").join("missing_semicolon.c"));
    assert_eq!(output.error_count(), 1);
    assert_eq!(
        output.errors[0].to_string(),
        "expected (SC) found (RETURN) at 4:2"
    );
    // The statement is kept; only its terminator is missing
    assert_eq!(output.program.functions[0].body.stmts.len(), 2);
}

#[test]
fn test_many_errors_are_all_reported() {
    let output = parse_file(&fixture_dir("fail").join("many_errors.c"));
    let lines: Vec<_> = output.errors.iter().map(|e| e.location().line).collect();
    assert_eq!(lines, [1, 3, 4, 6, 9]);
}
