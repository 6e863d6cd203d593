use winnow::ascii::{dec_int, till_line_ending};
use winnow::combinator::{alt, cut_err, delimited, preceded, repeat};
use winnow::error::{ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_while};

use crate::{CompareOp, Predicate, Value};

// -- Whitespace & comments --------------------------------------------------

pub(super) fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_ascii_whitespace()).void(),
            ('#', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

// -- Roll option tags -------------------------------------------------------

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ':' | '-' | '_' | '.' | '|' | '@' | '{' | '}')
}

fn tag_token<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., is_tag_char).parse_next(input)
}

/// A bare word that matches `word` case-insensitively and is not the prefix
/// of a longer tag (`nothing` is a tag, not `NOT hing`).
fn keyword(word: &'static str) -> impl FnMut(&mut &str) -> ModalResult<()> {
    move |input: &mut &str| {
        let checkpoint = input.checkpoint();
        let token = tag_token.parse_next(input)?;
        if token.eq_ignore_ascii_case(word) {
            Ok(())
        } else {
            input.reset(&checkpoint);
            Err(ErrMode::from_input(input))
        }
    }
}

fn option_tag(input: &mut &str) -> ModalResult<String> {
    let checkpoint = input.checkpoint();
    let token = tag_token.parse_next(input)?;
    if ["and", "or", "not"]
        .iter()
        .any(|kw| token.eq_ignore_ascii_case(kw))
    {
        input.reset(&checkpoint);
        return Err(ErrMode::from_input(input));
    }
    Ok(token.to_owned())
}

// -- Values -----------------------------------------------------------------

fn string_literal(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            '"' => return Ok(s),
            '\\' => {
                let esc = any.parse_next(input)?;
                match esc {
                    '"' => s.push('"'),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn negative_number(input: &mut &str) -> ModalResult<Value> {
    let neg_str = (
        '-',
        take_while(1.., |c: char| c.is_ascii_digit() || c == '.'),
    )
        .take()
        .parse_next(input)?;
    if neg_str.contains('.') {
        let f: f64 = neg_str
            .parse()
            .map_err(|_| ErrMode::from_input(input).cut())?;
        Ok(Value::Float(f))
    } else {
        let i: i64 = neg_str
            .parse()
            .map_err(|_| ErrMode::from_input(input).cut())?;
        Ok(Value::Int(i))
    }
}

fn float_literal(input: &mut &str) -> ModalResult<f64> {
    (
        take_while(1.., |c: char| c.is_ascii_digit()),
        '.',
        take_while(1.., |c: char| c.is_ascii_digit()),
    )
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .parse_next(input)
}

fn value(input: &mut &str) -> ModalResult<Value> {
    ws.parse_next(input)?;
    alt((
        string_literal.map(Value::String),
        "true".value(Value::Bool(true)),
        "false".value(Value::Bool(false)),
        negative_number,
        float_literal.map(Value::Float),
        dec_int::<_, i64, _>.map(Value::Int),
    ))
    .context(StrContext::Expected(StrContextValue::Description("value")))
    .parse_next(input)
}

// -- Comparison operators ---------------------------------------------------

fn compare_op(input: &mut &str) -> ModalResult<CompareOp> {
    ws.parse_next(input)?;
    alt((
        ">=".value(CompareOp::Gte),
        ">".value(CompareOp::Gt),
        "<=".value(CompareOp::Lte),
        "<".value(CompareOp::Lt),
        "==".value(CompareOp::Eq),
        "!=".value(CompareOp::Neq),
    ))
    .parse_next(input)
}

// -- Statements (precedence: OR < AND < NOT < primary) ----------------------

fn primary(input: &mut &str) -> ModalResult<Predicate> {
    ws.parse_next(input)?;
    alt((
        delimited('(', statement, (ws, cut_err(')'))),
        comparison_or_option,
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "roll option",
    )))
    .parse_next(input)
}

fn comparison_or_option(input: &mut &str) -> ModalResult<Predicate> {
    let tag = option_tag.parse_next(input)?;
    let checkpoint = input.checkpoint();
    if let Ok(op) = compare_op.parse_next(input) {
        let operand = cut_err(value).parse_next(input)?;
        Ok(Predicate::Compare {
            option: tag,
            op,
            value: operand,
        })
    } else {
        input.reset(&checkpoint);
        Ok(Predicate::Atom(tag))
    }
}

/// `NOT` runs collapse by parity, so `NOT NOT a` parses as `a`.
fn unary(input: &mut &str) -> ModalResult<Predicate> {
    let negations: usize = repeat(0.., preceded(ws, keyword("not"))).parse_next(input)?;
    if negations == 0 {
        return primary(input);
    }
    let inner = cut_err(primary).parse_next(input)?;
    Ok(if negations % 2 == 1 { !inner } else { inner })
}

fn and_statement(input: &mut &str) -> ModalResult<Predicate> {
    let first = unary(input)?;
    let rest: Vec<Predicate> =
        repeat(0.., preceded((ws, keyword("and")), cut_err(unary))).parse_next(input)?;
    if rest.is_empty() {
        return Ok(first);
    }
    let mut children = vec![first];
    children.extend(rest);
    Ok(Predicate::And(children))
}

fn or_statement(input: &mut &str) -> ModalResult<Predicate> {
    let first = and_statement(input)?;
    let rest: Vec<Predicate> =
        repeat(0.., preceded((ws, keyword("or")), cut_err(and_statement))).parse_next(input)?;
    if rest.is_empty() {
        return Ok(first);
    }
    let mut children = vec![first];
    children.extend(rest);
    Ok(Predicate::Or(children))
}

fn statement(input: &mut &str) -> ModalResult<Predicate> {
    ws.parse_next(input)?;
    or_statement(input)
}

// -- Top-level parser -------------------------------------------------------

/// A whole predicate; blank input is the always-true predicate.
pub fn parse_predicate(input: &mut &str) -> ModalResult<Predicate> {
    ws.parse_next(input)?;
    if input.is_empty() {
        return Ok(Predicate::always());
    }
    let predicate = statement(input)?;
    ws.parse_next(input)?;
    Ok(predicate)
}

#[cfg(test)]
mod tests {
    use crate::parse::parse_predicate;
    use crate::{option, option_value, RollOptions};

    use super::*;

    #[test]
    fn parse_single_option() {
        let p = parse_predicate("crafting:entry:alchemy").unwrap();
        assert_eq!(p, option("crafting:entry:alchemy"));
    }

    #[test]
    fn parse_blank_is_always() {
        assert!(parse_predicate("  # nothing here\n").unwrap().is_always());
    }

    #[test]
    fn parse_and_or_not() {
        let p = parse_predicate("a AND b").unwrap();
        assert!(matches!(p, Predicate::And(ref c) if c.len() == 2));
        let p = parse_predicate("a or b or c").unwrap();
        assert!(matches!(p, Predicate::Or(ref c) if c.len() == 3));
        let p = parse_predicate("NOT a").unwrap();
        assert_eq!(p, !option("a"));
    }

    #[test]
    fn keywords_are_whole_words() {
        let p = parse_predicate("nothing AND order:first").unwrap();
        assert_eq!(p, option("nothing").and(option("order:first")));
    }

    #[test]
    fn parse_precedence_and_before_or() {
        let p = parse_predicate("a OR b AND c").unwrap();
        match p {
            Predicate::Or(children) => {
                assert_eq!(children[0], option("a"));
                assert!(matches!(children[1], Predicate::And(_)));
            }
            other => panic!("expected Or, got {other:?}"),
        }
    }

    #[test]
    fn parse_parenthesized_grouping() {
        let p = parse_predicate("(a OR b) AND c").unwrap();
        match p {
            Predicate::And(children) => {
                assert!(matches!(children[0], Predicate::Or(_)));
                assert_eq!(children[1], option("c"));
            }
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn parse_all_comparison_ops() {
        let ops = [
            ("==", CompareOp::Eq),
            ("!=", CompareOp::Neq),
            (">", CompareOp::Gt),
            (">=", CompareOp::Gte),
            ("<", CompareOp::Lt),
            ("<=", CompareOp::Lte),
        ];
        for (sym, expected_op) in ops {
            let input = format!("self:level {sym} 1");
            match parse_predicate(&input).unwrap() {
                Predicate::Compare { op, .. } => assert_eq!(op, expected_op, "failed for {sym}"),
                other => panic!("expected Compare for {sym}, got {other:?}"),
            }
        }
    }

    #[test]
    fn parse_value_types() {
        let cases = [
            ("42", Value::Int(42)),
            ("-5", Value::Int(-5)),
            ("3.5", Value::Float(3.5)),
            ("true", Value::Bool(true)),
            (r#""a\"b""#, Value::String("a\"b".into())),
        ];
        for (literal, expected) in cases {
            let input = format!("x == {literal}");
            match parse_predicate(&input).unwrap() {
                Predicate::Compare { value, .. } => assert_eq!(value, expected, "failed for {literal}"),
                other => panic!("expected Compare for {literal}, got {other:?}"),
            }
        }
    }

    #[test]
    fn parsed_predicate_evaluates() {
        let p = parse_predicate("self:level >= 5 AND NOT self:condition:frightened").unwrap();
        assert_eq!(
            p,
            option_value("self:level")
                .gte(5_i64)
                .and(!option("self:condition:frightened"))
        );
        let opts: RollOptions = ["self:level:6"].into_iter().collect();
        assert!(p.test(&opts));
    }

    #[test]
    fn parse_errors() {
        assert!(parse_predicate("a AND").is_err());
        assert!(parse_predicate("(a OR b").is_err());
        assert!(parse_predicate("a >=").is_err());
        assert!(parse_predicate("a b").is_err());
    }

    #[test]
    fn not_runs_collapse() {
        assert_eq!(parse_predicate("NOT NOT a").unwrap(), option("a"));
        assert_eq!(parse_predicate("not NOT not a").unwrap(), !option("a"));

        let long = format!("{}a", "NOT ".repeat(200_001));
        assert_eq!(parse_predicate(&long).unwrap(), !option("a"));
    }

    #[test]
    fn nesting_beyond_limit_is_rejected() {
        let depth = crate::parse::MAX_PREDICATE_DEPTH;
        let ok = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse_predicate(&ok).unwrap(), option("a"));

        let deep = format!("{}a{}", "(".repeat(200_000), ")".repeat(200_000));
        let err = parse_predicate(&deep).unwrap_err();
        assert!(err.to_string().contains("nests deeper than"), "{err}");
    }
}
