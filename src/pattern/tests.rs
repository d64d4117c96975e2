use super::*;

#[test]
fn parses_literal() {
    let part = parse("users").unwrap();
    assert!(matches!(&part, Part::Literal(l) if l == "users"));
    assert!(part.matches("users"));
    assert!(!part.matches("user"));
    assert!(part.param_name().is_none());
}

#[test]
fn parses_param() {
    let part = parse("[id]").unwrap();
    assert!(part.matches("123"));
    assert!(part.matches("anything-goes"));
    assert!(!part.matches(""));
    assert_eq!(part.param_name(), Some("id"));
}

#[test]
fn parses_anonymous_regex() {
    let part = parse("{[a-z]+}").unwrap();
    assert!(part.matches("word"));
    assert!(!part.matches("Word"));
    assert!(part.param_name().is_none());
}

#[test]
fn parses_named_regex() {
    let part = parse(r"[id]{[\w]{4}}").unwrap();
    assert_eq!(part.param_name(), Some("id"));
    assert!(part.matches("id01"));
    // The regex must accept the whole token, not a substring.
    assert!(!part.matches("n0tID"));
    assert!(!part.matches("id0"));
}

#[test]
fn regex_with_nested_braces() {
    let part = parse(r"{\w+(?:\.\w+)?}").unwrap();
    assert!(part.matches("README.md"));
    assert!(part.matches("docs"));
    assert!(!part.matches("a/b"));
}

#[test]
fn rejects_unbalanced_bracket() {
    assert!(matches!(
        parse("[name"),
        Err(PatternError::UnbalancedBracket { .. })
    ));
}

#[test]
fn rejects_unbalanced_brace() {
    assert!(matches!(
        parse("{"),
        Err(PatternError::UnbalancedBrace { .. })
    ));
    assert!(matches!(
        parse("[name]{"),
        Err(PatternError::UnbalancedBrace { .. })
    ));
    assert!(matches!(
        parse("[name]junk"),
        Err(PatternError::UnbalancedBrace { .. })
    ));
}

#[test]
fn rejects_invalid_regex() {
    assert!(matches!(
        parse("{(}"),
        Err(PatternError::InvalidRegex { .. })
    ));
}

#[test]
fn bare_plus_is_any_word_tail() {
    let part = parse_tail("+").unwrap();
    assert!(part.is_multi());
    assert!(part.param_name().is_none());
    assert!(part.matches("segment"));
    assert!(!part.matches("has/slash"));
}

#[test]
fn tail_lifts_param_name_onto_multi() {
    let part = parse_tail(r"[f]{\w+(?:\.\w+)?}+").unwrap();
    assert!(part.is_multi());
    assert_eq!(part.param_name(), Some("f"));
    let Part::Multi { inner, .. } = &part else {
        panic!("expected multi part");
    };
    // The inner regex keeps matching but no longer binds on its own.
    assert!(inner.param_name().is_none());
    assert!(part.matches("README.md"));
}

#[test]
fn tail_of_plain_param() {
    let part = parse_tail("[p]+").unwrap();
    assert!(part.is_multi());
    assert_eq!(part.param_name(), Some("p"));
    assert!(part.matches("anything"));
}

#[test]
fn non_tail_token_parses_normally() {
    let part = parse_tail("[id]").unwrap();
    assert!(!part.is_multi());
    assert_eq!(part.param_name(), Some("id"));
}

#[test]
fn shape_identity_ignores_param_names() {
    let a = parse("[a]").unwrap();
    let b = parse("[b]").unwrap();
    assert!(a.same_shape(&b));

    let named = parse("[a]{[a-z]+}").unwrap();
    let anon = parse("{[a-z]+}").unwrap();
    assert!(named.same_shape(&anon));
}

#[test]
fn shape_identity_distinguishes_kinds() {
    let lit = parse("a").unwrap();
    let other_lit = parse("b").unwrap();
    let param = parse("[a]").unwrap();
    let re = parse("{[a-z]+}").unwrap();
    let other_re = parse("{[a-z]*}").unwrap();
    assert!(!lit.same_shape(&other_lit));
    assert!(!lit.same_shape(&param));
    assert!(!param.same_shape(&re));
    assert!(!re.same_shape(&other_re));

    let multi = parse_tail("[p]+").unwrap();
    assert!(!multi.same_shape(&param));
    assert!(multi.same_shape(&parse_tail("[q]+").unwrap()));
}
