//! Pest-backed classification of script units into statements.

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser as PestParser;

use codequest_data::{Action, ActionSet};

use crate::{Argument, MAX_LOOP_ITERATIONS, Script, Statement};

mod segment;

pub use segment::strip_comments;
use segment::{Keyword, LineIndex, Unit, split_units};

#[derive(PestParser)]
#[grammar = "src/grammar.pest"]
struct ScriptParser;

/// Reasons a unit failed to classify. These end up as the `reason` of an unrecognized statement.
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("syntax: {0}")]
    Pest(String),
    #[error("unexpected grammar shape: {0}")]
    Shape(&'static str),
    #[error("'{0}' is not a command available in this level")]
    UnknownAction(String),
    #[error("{action}() {detail}")]
    Arity { action: Action, detail: &'static str },
    #[error("number '{0}' is too large")]
    Number(String),
    #[error("blocks cannot be nested inside another block")]
    Nested,
    #[error("missing closing brace")]
    Unterminated,
}

fn pest_error(err: pest::error::Error<Rule>) -> ShapeError {
    ShapeError::Pest(err.variant.message().into_owned())
}

/// Where a unit sits; bodies only accept flat statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Depth {
    Top,
    Body,
}

/// Recognize every statement in `source`, in order of appearance.
///
/// Recognition never fails: text that matches no form becomes
/// [`Statement::Unrecognized`] and recognition carries on with the next unit.
pub fn recognize(source: &str, allowed: &ActionSet) -> Script {
    let stripped = strip_comments(source);
    let index = LineIndex::new(&stripped);
    let statements = split_units(&stripped, 0)
        .iter()
        .map(|unit| classify(unit, allowed, &index, Depth::Top))
        .collect();
    Script { statements }
}

fn classify(unit: &Unit<'_>, allowed: &ActionSet, index: &LineIndex, depth: Depth) -> Statement {
    let line = index.line_of(unit.offset());
    let unrecognized = |reason: ShapeError| Statement::Unrecognized {
        text: unit.text().to_string(),
        line,
        reason: reason.to_string(),
    };

    match unit {
        Unit::Simple { text, .. } => parse_simple(text, allowed).unwrap_or_else(unrecognized),
        Unit::Unterminated { .. } => unrecognized(ShapeError::Unterminated),
        Unit::Block { .. } if depth == Depth::Body => unrecognized(ShapeError::Nested),
        Unit::Block {
            keyword,
            header,
            body,
            body_offset,
            ..
        } => {
            let parse_body = || -> Vec<Statement> {
                split_units(body, *body_offset)
                    .iter()
                    .map(|inner| classify(inner, allowed, index, Depth::Body))
                    .collect()
            };
            match keyword {
                Keyword::If => match parse_if_header(header) {
                    Ok(condition) => Statement::Conditional {
                        condition,
                        body: parse_body(),
                    },
                    Err(err) => unrecognized(err),
                },
                Keyword::For => match parse_for_header(header) {
                    Ok(LoopHeader::Valid { var, start, end }) => Statement::ForLoop {
                        var,
                        start,
                        end,
                        body: parse_body(),
                    },
                    Ok(LoopHeader::Malformed(reason)) => Statement::MalformedLoop {
                        header: (*header).to_string(),
                        line,
                        reason,
                    },
                    Err(err) => unrecognized(err),
                },
            }
        },
    }
}

fn parse_simple(text: &str, allowed: &ActionSet) -> Result<Statement, ShapeError> {
    let mut pairs = ScriptParser::parse(Rule::simple_statement, text).map_err(pest_error)?;
    let statement = pairs.next().ok_or(ShapeError::Shape("expected statement"))?;
    let inner = statement
        .into_inner()
        .next()
        .ok_or(ShapeError::Shape("empty statement"))?;
    match inner.as_rule() {
        Rule::assignment => parse_assignment(inner),
        Rule::call => parse_call(inner, allowed),
        _ => Err(ShapeError::Shape("unexpected statement")),
    }
}

fn parse_assignment(pair: Pair<'_, Rule>) -> Result<Statement, ShapeError> {
    let mut it = pair.into_inner();
    let name = it.next().ok_or(ShapeError::Shape("assignment name"))?.as_str();
    let value = parse_number(it.next().ok_or(ShapeError::Shape("assignment value"))?.as_str())?;
    Ok(Statement::Assignment {
        name: name.to_string(),
        value,
    })
}

fn parse_call(pair: Pair<'_, Rule>, allowed: &ActionSet) -> Result<Statement, ShapeError> {
    let mut it = pair.into_inner();
    let name = it.next().ok_or(ShapeError::Shape("call name"))?.as_str();
    let action = Action::from_name(name)
        .filter(|action| allowed.contains(action))
        .ok_or_else(|| ShapeError::UnknownAction(name.to_string()))?;
    let argument = it.next().map(parse_argument).transpose()?;

    match (action.takes_argument(), argument.is_some()) {
        (true, false) => Err(ShapeError::Arity {
            action,
            detail: "needs a value",
        }),
        (false, true) => Err(ShapeError::Arity {
            action,
            detail: "takes no value",
        }),
        _ => Ok(Statement::ActionCall { action, argument }),
    }
}

fn parse_argument(pair: Pair<'_, Rule>) -> Result<Argument, ShapeError> {
    let inner = pair.into_inner().next().ok_or(ShapeError::Shape("argument"))?;
    match inner.as_rule() {
        Rule::number => Ok(Argument::Literal(parse_number(inner.as_str())?)),
        Rule::ident => Ok(Argument::Variable(inner.as_str().to_string())),
        _ => Err(ShapeError::Shape("argument kind")),
    }
}

fn parse_number(text: &str) -> Result<i64, ShapeError> {
    text.parse::<i64>().map_err(|_| ShapeError::Number(text.to_string()))
}

fn parse_if_header(header: &str) -> Result<String, ShapeError> {
    let mut pairs = ScriptParser::parse(Rule::if_header, header).map_err(pest_error)?;
    let header = pairs.next().ok_or(ShapeError::Shape("expected if header"))?;
    let condition = header
        .into_inner()
        .find(|pair| pair.as_rule() == Rule::ident)
        .ok_or(ShapeError::Shape("if condition"))?;
    Ok(condition.as_str().to_string())
}

enum LoopHeader {
    Valid { var: String, start: i64, end: i64 },
    Malformed(String),
}

fn parse_for_header(header: &str) -> Result<LoopHeader, ShapeError> {
    let mut pairs = ScriptParser::parse(Rule::for_header, header).map_err(pest_error)?;
    let header = pairs.next().ok_or(ShapeError::Shape("expected for header"))?;
    let mut it = header
        .into_inner()
        .filter(|pair| matches!(pair.as_rule(), Rule::ident | Rule::bound));
    let mut next = |what: &'static str| it.next().map(|pair| pair.as_str()).ok_or(ShapeError::Shape(what));

    let var = next("loop variable")?;
    let start = next("loop start")?;
    let test_var = next("loop test variable")?;
    let end = next("loop end")?;
    let step_var = next("loop step variable")?;

    if test_var != var || step_var != var {
        return Ok(LoopHeader::Malformed(format!(
            "loop declares '{var}' but tests '{test_var}' and increments '{step_var}'"
        )));
    }
    let start = match loop_bound(start) {
        Ok(value) => value,
        Err(reason) => return Ok(LoopHeader::Malformed(reason)),
    };
    let end = match loop_bound(end) {
        Ok(value) => value,
        Err(reason) => return Ok(LoopHeader::Malformed(reason)),
    };
    if start > end {
        return Ok(LoopHeader::Malformed(format!("start {start} is greater than end {end}")));
    }
    if end - start > MAX_LOOP_ITERATIONS {
        return Ok(LoopHeader::Malformed(format!(
            "{} iterations is more than the limit of {MAX_LOOP_ITERATIONS}",
            end - start
        )));
    }

    Ok(LoopHeader::Valid {
        var: var.to_string(),
        start,
        end,
    })
}

fn loop_bound(raw: &str) -> Result<i64, String> {
    if !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("'{raw}' is not a whole number"));
    }
    raw.parse::<i64>().map_err(|_| format!("'{raw}' is too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_actions() -> ActionSet {
        Action::ALL.into_iter().collect()
    }

    #[test]
    fn parses_assignment() {
        let statement = parse_simple("speed = 15;", &all_actions()).expect("assignment");
        assert_eq!(
            statement,
            Statement::Assignment {
                name: "speed".into(),
                value: 15
            }
        );
    }

    #[test]
    fn assignment_needs_semicolon_and_literal() {
        assert!(parse_simple("speed = 15", &all_actions()).is_err());
        assert!(parse_simple("speed = other;", &all_actions()).is_err());
        assert!(parse_simple("speed = -3;", &all_actions()).is_err());
    }

    #[test]
    fn call_argument_can_be_variable_or_literal() {
        let allowed = all_actions();
        assert_eq!(
            parse_simple("setSpeed(speed);", &allowed).expect("variable argument"),
            Statement::ActionCall {
                action: Action::SetSpeed,
                argument: Some(Argument::Variable("speed".into()))
            }
        );
        assert_eq!(
            parse_simple("setSpeed( 12 );", &allowed).expect("literal argument"),
            Statement::ActionCall {
                action: Action::SetSpeed,
                argument: Some(Argument::Literal(12))
            }
        );
    }

    #[test]
    fn calls_outside_allowed_set_are_rejected() {
        let allowed: ActionSet = [Action::MoveLeft].into_iter().collect();
        let err = parse_simple("jump();", &allowed).expect_err("jump not allowed");
        assert!(matches!(err, ShapeError::UnknownAction(name) if name == "jump"));
    }

    #[test]
    fn arity_is_checked() {
        let allowed = all_actions();
        assert!(matches!(
            parse_simple("setSpeed();", &allowed),
            Err(ShapeError::Arity {
                action: Action::SetSpeed,
                ..
            })
        ));
        assert!(matches!(
            parse_simple("moveLeft(3);", &allowed),
            Err(ShapeError::Arity {
                action: Action::MoveLeft,
                ..
            })
        ));
    }

    #[test]
    fn huge_literals_are_rejected() {
        let err = parse_simple("x = 99999999999999999999;", &all_actions()).expect_err("overflow");
        assert!(matches!(err, ShapeError::Number(_)));
    }

    #[test]
    fn if_header_accepts_optional_equals_true() {
        assert_eq!(parse_if_header("if (enemyNear)").expect("bare"), "enemyNear");
        assert_eq!(parse_if_header("if(enemyNear == true)").expect("explicit"), "enemyNear");
        assert!(parse_if_header("if (enemyNear == false)").is_err());
        assert!(parse_if_header("if (a && b)").is_err());
    }

    #[test]
    fn for_header_caps_iterations() {
        let at_limit = format!("for (int i = 0; i < {MAX_LOOP_ITERATIONS}; i++)");
        assert!(matches!(parse_for_header(&at_limit), Ok(LoopHeader::Valid { .. })));
        match parse_for_header("for (int i = 0; i < 2000000; i++)").expect("header") {
            LoopHeader::Malformed(reason) => assert!(reason.contains("2000000"), "{reason}"),
            LoopHeader::Valid { .. } => panic!("oversized loop accepted"),
        }
    }

    #[test]
    fn for_header_reads_bounds() {
        match parse_for_header("for (int i = 0; i < 3; i++)").expect("header") {
            LoopHeader::Valid { var, start, end } => {
                assert_eq!(var, "i");
                assert_eq!((start, end), (0, 3));
            },
            LoopHeader::Malformed(reason) => panic!("unexpected malformed loop: {reason}"),
        }
    }

    #[test]
    fn for_header_reports_bad_bounds() {
        for header in [
            "for (int i = a; i < 3; i++)",
            "for (int i = 0; i < x; i++)",
            "for (int i = 5; i < 2; i++)",
            "for (int i = 0; j < 3; i++)",
        ] {
            assert!(
                matches!(parse_for_header(header), Ok(LoopHeader::Malformed(_))),
                "{header} should be malformed"
            );
        }
    }

    #[test]
    fn for_header_requires_int_keyword() {
        assert!(parse_for_header("for (i = 0; i < 3; i++)").is_err());
        assert!(parse_for_header("for (inti = 0; i < 3; i++)").is_err());
    }
}
