/*!
 * ragctl - Resource Allocation Graph Driver
 *
 * Reads one command per line from a script file (first argument) or stdin
 * and applies it to an in-memory graph:
 * - process <id> [priority] [runtime]
 * - resource <id>
 * - allocate|request|release|cancel <process> <resource>
 * - remove-process <id> / remove-resource <id>
 * - meta <process> <priority> <runtime>
 * - detect / resolve / check (detect, then resolve if deadlocked)
 * - show (prints the graph snapshot as JSON)
 */

use anyhow::{bail, Context, Result};
use rag_deadlock::{init_tracing, DeadlockSystem};
use std::io::{self, BufRead, BufReader, Write};
use tracing::{info, warn};

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Process {
        id: &'a str,
        priority: &'a str,
        runtime: &'a str,
    },
    Resource(&'a str),
    Allocate(&'a str, &'a str),
    Request(&'a str, &'a str),
    Release(&'a str, &'a str),
    Cancel(&'a str, &'a str),
    RemoveProcess(&'a str),
    RemoveResource(&'a str),
    Meta {
        id: &'a str,
        priority: &'a str,
        runtime: &'a str,
    },
    Detect,
    Resolve,
    Check,
    Show,
}

fn parse_line(line: &str) -> Result<Option<Command<'_>>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    let command = match words[..] {
        ["process", id] => Command::Process {
            id,
            priority: "",
            runtime: "",
        },
        ["process", id, priority] => Command::Process {
            id,
            priority,
            runtime: "",
        },
        ["process", id, priority, runtime] => Command::Process {
            id,
            priority,
            runtime,
        },
        ["resource", id] => Command::Resource(id),
        ["allocate", p, r] => Command::Allocate(p, r),
        ["request", p, r] => Command::Request(p, r),
        ["release", p, r] => Command::Release(p, r),
        ["cancel", p, r] => Command::Cancel(p, r),
        ["remove-process", id] => Command::RemoveProcess(id),
        ["remove-resource", id] => Command::RemoveResource(id),
        ["meta", id, priority, runtime] => Command::Meta {
            id,
            priority,
            runtime,
        },
        ["detect"] => Command::Detect,
        ["resolve"] => Command::Resolve,
        ["check"] => Command::Check,
        ["show"] => Command::Show,
        _ => bail!("unrecognised command: {}", line),
    };
    Ok(Some(command))
}

fn execute(system: &mut DeadlockSystem, command: Command<'_>, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Process {
            id,
            priority,
            runtime,
        } => {
            let metadata = system.add_process_with_metadata(id, priority, runtime)?;
            writeln!(
                out,
                "process {} (priority {}, runtime {})",
                id, metadata.priority, metadata.runtime
            )?;
        }
        Command::Resource(id) => {
            system.add_resource(id)?;
            writeln!(out, "resource {}", id)?;
        }
        Command::Allocate(p, r) => {
            let outcome = system.allocate(p, r)?;
            writeln!(out, "allocate {} {}: {:?}", p, r, outcome)?;
        }
        Command::Request(p, r) => {
            let outcome = system.request(p, r)?;
            writeln!(out, "request {} {}: {:?}", p, r, outcome)?;
        }
        Command::Release(p, r) => {
            let released = system.release(p, r)?;
            writeln!(out, "release {} {}: {}", p, r, released)?;
        }
        Command::Cancel(p, r) => {
            let cancelled = system.cancel_request(p, r)?;
            writeln!(out, "cancel {} {}: {}", p, r, cancelled)?;
        }
        Command::RemoveProcess(id) => {
            let released = system.remove_process(id)?;
            writeln!(out, "removed {} (released {})", id, released.len())?;
        }
        Command::RemoveResource(id) => {
            system.remove_resource(id)?;
            writeln!(out, "removed {}", id)?;
        }
        Command::Meta {
            id,
            priority,
            runtime,
        } => {
            let metadata = system.set_metadata(id, priority, runtime)?;
            writeln!(
                out,
                "meta {} (priority {}, runtime {})",
                id, metadata.priority, metadata.runtime
            )?;
        }
        Command::Detect => {
            report_detection(system, out)?;
        }
        Command::Resolve => report_resolution(system, out)?,
        Command::Check => {
            if report_detection(system, out)? {
                report_resolution(system, out)?;
            }
        }
        Command::Show => {
            let json = serde_json::to_string_pretty(&system.snapshot())
                .context("failed to serialise snapshot")?;
            writeln!(out, "{}", json)?;
        }
    }
    Ok(())
}

fn report_detection(system: &DeadlockSystem, out: &mut impl Write) -> Result<bool> {
    let report = system.detect_deadlock();
    if !report.is_deadlocked() {
        writeln!(out, "no deadlock")?;
        return Ok(false);
    }
    for cycle in &report.cycles {
        let walk: Vec<&str> = cycle.nodes.iter().map(|n| n.as_str()).collect();
        writeln!(out, "deadlock: {}", walk.join(" -> "))?;
    }
    Ok(true)
}

fn report_resolution(system: &mut DeadlockSystem, out: &mut impl Write) -> Result<()> {
    let report = system.resolve_deadlock();
    if !report.resolved_any() {
        writeln!(out, "nothing to resolve")?;
    }
    for victim in &report.victims {
        writeln!(
            out,
            "preempted {} (priority {}, runtime {})",
            victim.process, victim.metadata.priority, victim.metadata.runtime
        )?;
    }
    Ok(())
}

fn run(input: impl BufRead, system: &mut DeadlockSystem, out: &mut impl Write) -> Result<usize> {
    let mut failures = 0;
    for (number, line) in input.lines().enumerate() {
        let line = line.context("failed to read input")?;
        let result = parse_line(&line).and_then(|command| match command {
            Some(command) => execute(system, command, out),
            None => Ok(()),
        });
        if let Err(e) = result {
            failures += 1;
            warn!(line = number + 1, error = %e, "Command failed");
            writeln!(out, "error (line {}): {}", number + 1, e)?;
        }
    }
    Ok(failures)
}

fn main() -> Result<()> {
    init_tracing();

    let mut system = DeadlockSystem::from_env().context("invalid RAG_* configuration")?;
    info!(config = ?system.config(), "ragctl starting");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let failures = match std::env::args().nth(1) {
        Some(path) => {
            let file = std::fs::File::open(&path)
                .with_context(|| format!("failed to open script {}", path))?;
            run(BufReader::new(file), &mut system, &mut out)?
        }
        None => run(io::stdin().lock(), &mut system, &mut out)?,
    };

    if failures > 0 {
        warn!(failures, "Some commands failed");
    }
    Ok(())
}
