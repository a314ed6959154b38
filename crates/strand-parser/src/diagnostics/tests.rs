use super::*;

#[test]
fn emits_and_counts_errors() {
    let mut diags = Diagnostics::new();
    diags.error("atom", Span::point(3), "unexpected end of input").emit();
    assert_eq!(diags.len(), 1);
    assert!(!diags.is_empty());
}

#[test]
fn dedup_collapses_identical_failures_from_backtracking() {
    let mut diags = Diagnostics::new();
    diags.error("atom", Span::new(4, 5), "expected expression").emit();
    diags.error("atom", Span::new(4, 5), "expected expression").emit();
    diags.error("atom", Span::new(4, 5), "expected label").emit();
    let diags = diags.dedup();
    assert_eq!(diags.len(), 2);
}

#[test]
fn plain_format_uses_line_col_byte_offset_rule_message() {
    let mut diags = Diagnostics::new();
    diags.error("let-binding", Span::point(7), "expected '='").emit();
    let source = "let x\n  = 1";
    let rendered = diags.printer().path("config.strand").source(source).render();
    assert!(rendered.contains("config.strand"));
}

#[test]
fn expected_set_is_appended() {
    let mut diags = Diagnostics::new();
    diags
        .error("operator-expression", Span::point(0), "no alternative matched")
        .expected(["||", "&&", "+"])
        .emit();
    let msg = diags.iter().next().unwrap();
    assert!(format!("{msg}").contains("expected one of"));
}
