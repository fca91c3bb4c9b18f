//! CLI entry point for codequest_script.
//! Usage: cargo run -p codequest_script -- check solution.cq --allow moveRight,shoot

use std::{env, fs, process};

use codequest_data::{Action, ActionSet};
use codequest_script::{Statement, recognize};

const USAGE: &str = "Usage:\n  codequest_script check <file> [--allow <action,action,...>]";

fn main() {
    let args: Vec<String> = env::args().collect();

    // Accept either:
    // 1) cargo run: <bin> -- check <args>
    // 2) direct:    <bin> check <args>
    let rest: &[String] = match args.as_slice() {
        [_, flag, cmd, tail @ ..] if flag == "--" && cmd == "check" => tail,
        [_, cmd, tail @ ..] if cmd == "check" => tail,
        _ => {
            eprintln!("{USAGE}");
            process::exit(2);
        },
    };
    run_check(rest);
}

fn run_check(args: &[String]) {
    let mut path: Option<&str> = None;
    let mut allowed: ActionSet = Action::ALL.into_iter().collect();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--allow" {
            let Some(list) = args.get(i + 1) else {
                eprintln!("--allow requires a comma-separated list of actions");
                process::exit(2);
            };
            allowed = parse_allow_list(list).unwrap_or_else(|bad| {
                eprintln!("unknown action '{bad}'");
                process::exit(2);
            });
            i += 2;
            continue;
        }
        if path.is_none() {
            path = Some(args[i].as_str());
        }
        i += 1;
    }

    let Some(path) = path else {
        eprintln!("{USAGE}");
        process::exit(2);
    };
    let source = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error: unable to read '{path}': {e}");
        process::exit(1);
    });

    let script = recognize(&source, &allowed);
    for statement in script.statements() {
        if !statement.is_problem() {
            println!("{:<12} {statement}", statement.kind_name());
        }
    }

    let problems = script.problems();
    if problems.is_empty() {
        println!("ok: {} statement(s) recognized", script.statements().len());
        return;
    }
    for problem in &problems {
        match problem {
            Statement::Unrecognized { text, line, reason } => {
                eprintln!("{path}:{line}: unrecognized `{text}`: {reason}");
            },
            Statement::MalformedLoop { header, line, reason } => {
                eprintln!("{path}:{line}: malformed loop `{header}`: {reason}");
            },
            _ => {},
        }
    }
    eprintln!("{} problem(s) found", problems.len());
    process::exit(1);
}

fn parse_allow_list(list: &str) -> Result<ActionSet, String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| Action::from_name(name).ok_or_else(|| name.to_string()))
        .collect()
}
