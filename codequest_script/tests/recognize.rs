use codequest_data::{Action, ActionSet};
use codequest_script::{Argument, Statement, recognize};

fn allow(actions: &[Action]) -> ActionSet {
    actions.iter().copied().collect()
}

fn everything() -> ActionSet {
    Action::ALL.into_iter().collect()
}

#[test]
fn commands_script_recognizes_two_calls() {
    let script = recognize("moveLeft();\njump();", &allow(&[Action::MoveLeft, Action::Jump]));
    assert_eq!(
        script.statements(),
        &[
            Statement::ActionCall {
                action: Action::MoveLeft,
                argument: None
            },
            Statement::ActionCall {
                action: Action::Jump,
                argument: None
            },
        ]
    );
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let src = "// Type your commands here\n// Try using moveLeft() and jump()\n\n\nmoveLeft(); // go left\n";
    let script = recognize(src, &everything());
    assert_eq!(script.statements().len(), 1);
    assert!(script.statements()[0].calls(Action::MoveLeft));
}

#[test]
fn variables_script_keeps_source_order() {
    let script = recognize(
        "speed = 15;\nsetSpeed(speed);\nmoveRight();",
        &allow(&[Action::SetSpeed, Action::MoveRight]),
    );
    assert_eq!(
        script.statements(),
        &[
            Statement::Assignment {
                name: "speed".into(),
                value: 15
            },
            Statement::ActionCall {
                action: Action::SetSpeed,
                argument: Some(Argument::Variable("speed".into()))
            },
            Statement::ActionCall {
                action: Action::MoveRight,
                argument: None
            },
        ]
    );
}

#[test]
fn malformed_line_is_reported_and_later_lines_still_recognized() {
    let script = recognize("spee d= 10\nmoveRight();", &everything());
    match &script.statements()[0] {
        Statement::Unrecognized { text, line, .. } => {
            assert_eq!(text, "spee d= 10");
            assert_eq!(*line, 1);
        },
        other => panic!("expected unrecognized, got {other:?}"),
    }
    assert!(script.statements()[1].calls(Action::MoveRight));
}

#[test]
fn conditional_block_with_body() {
    let src = "if (enemyNear) {\n    moveBack();\n}\nmoveRight();";
    let script = recognize(src, &everything());
    assert_eq!(
        script.statements(),
        &[
            Statement::Conditional {
                condition: "enemyNear".into(),
                body: vec![Statement::ActionCall {
                    action: Action::MoveBack,
                    argument: None
                }],
            },
            Statement::ActionCall {
                action: Action::MoveRight,
                argument: None
            },
        ]
    );
}

#[test]
fn for_loop_on_one_line() {
    let script = recognize("for (int i = 0; i < 3; i++) { shoot(); }", &everything());
    assert_eq!(
        script.statements(),
        &[Statement::ForLoop {
            var: "i".into(),
            start: 0,
            end: 3,
            body: vec![Statement::ActionCall {
                action: Action::Shoot,
                argument: None
            }],
        }]
    );
}

#[test]
fn nested_blocks_are_not_supported() {
    let src = "for (int i = 0; i < 2; i++) {\n  if (enemyNear) { moveBack(); }\n  shoot();\n}";
    let script = recognize(src, &everything());
    let body = script.statements()[0].body();
    assert_eq!(body.len(), 2);
    assert!(matches!(&body[0], Statement::Unrecognized { line: 2, .. }));
    assert!(body[1].calls(Action::Shoot));
    assert_eq!(script.problems().len(), 1);
}

#[test]
fn bad_loop_bounds_become_malformed_loop() {
    let script = recognize("for (int i = zero; i < 3; i++) {\n shoot();\n}\njump();", &everything());
    assert!(matches!(
        &script.statements()[0],
        Statement::MalformedLoop { line: 1, reason, .. } if reason.contains("zero")
    ));
    assert!(script.statements()[1].calls(Action::Jump));
}

#[test]
fn oversized_loop_is_malformed() {
    let script = recognize("for (int i = 0; i < 2000000; i++) { shoot(); }\njump();", &everything());
    assert!(matches!(&script.statements()[0], Statement::MalformedLoop { line: 1, .. }));
    assert!(script.statements()[1].calls(Action::Jump));
}

#[test]
fn disallowed_action_is_unrecognized() {
    let script = recognize("shoot();", &allow(&[Action::MoveLeft, Action::Jump]));
    assert!(matches!(
        &script.statements()[0],
        Statement::Unrecognized { reason, .. } if reason.contains("shoot")
    ));
}

#[test]
fn identifiers_are_case_sensitive() {
    let script = recognize("MoveLeft();", &everything());
    assert!(script.statements()[0].is_problem());
}

#[test]
fn several_statements_per_line() {
    let script = recognize("x = 3; setSpeed(x); moveRight();", &everything());
    let kinds: Vec<_> = script.statements().iter().map(Statement::kind_name).collect();
    assert_eq!(kinds, vec!["assignment", "action", "action"]);
}

#[test]
fn unclosed_block_keeps_later_lines() {
    let script = recognize("if (enemyNear) {\nmoveRight();\njump();", &everything());
    let statements = script.statements();
    assert_eq!(statements.len(), 3);
    assert!(matches!(
        &statements[0],
        Statement::Unrecognized { text, line: 1, .. } if text == "if (enemyNear) {"
    ));
    assert!(statements[1].calls(Action::MoveRight));
    assert!(statements[2].calls(Action::Jump));
}

#[test]
fn display_renders_canonical_source() {
    let script = recognize("if(enemyNear==true){moveBack();}", &everything());
    assert_eq!(script.statements()[0].to_string(), "if (enemyNear) { moveBack(); }");
}

#[test]
fn only_comments_yields_empty_script() {
    let script = recognize("// nothing here\n\n   \n", &everything());
    assert!(script.is_empty());
}
