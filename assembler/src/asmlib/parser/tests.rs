use super::*;

fn parse(text: &str) -> Token {
    parse_line(1, text, &Catalog::standard())
}

#[test]
fn test_label_instruction_operand() {
    let token = parse("FIRST   STL     RETADR");
    assert_eq!(token.label.as_deref(), Some("FIRST"));
    assert_eq!(
        token.operation,
        Some(Operation::Instruction("STL".to_string()))
    );
    assert!(!token.extended);
    assert_eq!(token.operands, vec!["RETADR"]);
    assert_eq!(token.comment, None);
}

#[test]
fn test_no_label() {
    let token = parse("        LDA     #3");
    assert_eq!(token.label, None);
    assert_eq!(token.operand(0), Some("#3"));
    assert_eq!(token.operand(1), None);
}

#[test]
fn test_extended_marker() {
    let token = parse("CLOOP   +JSUB   RDREC");
    assert_eq!(token.label.as_deref(), Some("CLOOP"));
    assert_eq!(
        token.operation,
        Some(Operation::Instruction("JSUB".to_string()))
    );
    assert!(token.extended);
}

#[test]
fn test_extended_marker_without_label() {
    let token = parse("        +LDT    #4096");
    assert_eq!(token.label, None);
    assert!(token.extended);
    assert_eq!(token.operands, vec!["#4096"]);
}

#[test]
fn test_directive_lower_case() {
    let token = parse("copy    start   1000");
    assert_eq!(token.label.as_deref(), Some("copy"));
    assert!(token.is_directive(Directive::Start));
    assert_eq!(token.operands, vec!["1000"]);
}

#[test]
fn test_indexed_operand() {
    let token = parse("        STCH    BUFFER, X");
    assert_eq!(token.operands, vec!["BUFFER", "X"]);
}

#[test]
fn test_remarks_join_comment() {
    let token = parse("        RSUB    X   return . done");
    assert_eq!(token.operands, vec!["X"]);
    assert_eq!(token.comment.as_deref(), Some("return done"));
}

#[test]
fn test_unknown_operator_is_a_no_op() {
    let token = parse("HERE    FROB    1");
    assert_eq!(token.label.as_deref(), Some("HERE"));
    assert_eq!(token.operation, None);
    assert!(!token.is_comment_only());
}

#[test]
fn test_comment_only() {
    let token = parse("   . just a comment");
    assert!(token.is_comment_only());
}

#[test]
fn test_operand_limit() {
    let token = parse("        WORD    1,2,3,4");
    assert_eq!(token.operands.len(), MAX_OPERANDS);
}

#[test]
fn test_extref_names_are_not_limited() {
    let token = parse("        EXTREF  A,B,C,D,E");
    assert_eq!(token.operands, vec!["A", "B", "C", "D", "E"]);
}

#[test]
fn test_literal_with_space() {
    let token = parse("        LDA     =C' X'");
    assert_eq!(token.operands, vec!["=C' X'"]);
}
