use std::io::{self, Write};

use serde::Serialize;

use crate::app::{FetchResult, PathsResult, PlanResult, ProgressEvent, ProgressSink, StatusResult};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_plan(result: &PlanResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_paths(result: &PathsResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_status(result: &StatusResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_fetch(result: &FetchResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_plan(result: &PlanResult) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        for key in &result.keys {
            writeln!(stdout, "{key}")?;
        }
        Ok(())
    }

    pub fn print_paths(result: &PathsResult) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        for path in &result.paths {
            writeln!(stdout, "{path}")?;
        }
        Ok(())
    }

    pub fn print_status(result: &StatusResult) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(
            stdout,
            "subject {}: {} present, {} missing under {}",
            result.subject,
            result.present,
            result.missing.len(),
            result.root
        )?;
        for entry in &result.missing {
            writeln!(stdout, "missing {}", entry.key)?;
        }
        Ok(())
    }

    pub fn print_fetch(result: &FetchResult) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        for item in result.items.iter().filter(|item| item.action != "present") {
            writeln!(stdout, "{:<10} {}", item.action, item.path)?;
        }
        writeln!(
            stdout,
            "subject {}: {} downloaded, {} already present, {} planned",
            result.subject,
            result.count("downloaded"),
            result.count("present"),
            result.count("planned")
        )?;
        Ok(())
    }
}

impl ProgressSink for TextOutput {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => eprintln!("{} ({:.1}s)", event.message, elapsed.as_secs_f64()),
            None => eprintln!("{}", event.message),
        }
    }
}
