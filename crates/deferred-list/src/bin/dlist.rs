//! `dlist` — run a JSON edit script against a deferred list.
//!
//! Usage:
//!   dlist [--auto <height>] [--verbose]
//!
//! Reads a JSON array of commands from stdin:
//!   ["insert", <index>, <value>]
//!   ["set", <index>, <value>]
//!   ["remove", <index>]
//!   ["settle"]
//! and prints the settled list as a JSON array on stdout.

use deferred_list::DeferredList;
use serde_json::Value;
use std::io::{self, Read};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut auto: Option<usize> = None;
    let mut verbose = false;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--auto" => {
                i += 1;
                match args.get(i).and_then(|s| s.parse().ok()) {
                    Some(height) => auto = Some(height),
                    None => fail("--auto expects a height"),
                }
            }
            "--verbose" => verbose = true,
            other => fail(&format!("unknown argument: {other}")),
        }
        i += 1;
    }

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        fail(&e.to_string());
    }
    let script: Value = match serde_json::from_str(buf.trim()) {
        Ok(v) => v,
        Err(e) => fail(&format!("invalid script: {e}")),
    };
    let Some(commands) = script.as_array() else {
        fail("script must be a JSON array of commands");
    };

    let mut list = DeferredList::new();
    if let Some(height) = auto {
        list = list.with_auto_settle(height);
    }
    for command in commands {
        if let Err(e) = run(&mut list, command, verbose) {
            fail(&e);
        }
    }
    if verbose && list.pending_edits() > 0 {
        eprintln!("{}", list.dump_tree());
    }
    println!("{}", Value::Array(list.to_vec()));
}

fn run(list: &mut DeferredList<Value>, command: &Value, verbose: bool) -> Result<(), String> {
    let parts = command
        .as_array()
        .ok_or_else(|| format!("command must be an array: {command}"))?;
    let name = parts
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| format!("command must start with a name: {command}"))?;
    let index = || {
        parts
            .get(1)
            .and_then(Value::as_u64)
            .map(|i| i as usize)
            .ok_or_else(|| format!("command needs an index: {command}"))
    };
    match name {
        "insert" => {
            let value = parts
                .get(2)
                .cloned()
                .ok_or_else(|| format!("insert needs a value: {command}"))?;
            list.insert(index()?, value).map_err(|e| e.to_string())
        }
        "set" => {
            let value = parts
                .get(2)
                .cloned()
                .ok_or_else(|| format!("set needs a value: {command}"))?;
            list.set(index()?, value).map_err(|e| e.to_string())
        }
        "remove" => list.remove(index()?).map_err(|e| e.to_string()),
        "settle" => {
            if verbose {
                eprintln!("{}", list.dump_tree());
            }
            list.settle();
            Ok(())
        }
        other => Err(format!("unknown command: {other}")),
    }
}

fn fail(msg: &str) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}
