use crate::error::Error;
use crate::functions::{self, AwsFunctionSource, FunctionRecord};
use crate::logger::Logger;
use crate::runner::{Runnable, Runner};
use chrono::{DateTime, Utc};
use indicatif::HumanBytes;
use tabled::settings::{peaker::Priority, style::Style, Settings, Width};
use tabled::{Table, Tabled};
use terminal_size::{terminal_size, Width as TerminalWidth};

/// Longer names are cut to keep the table readable
const MAX_NAME_LENGTH: usize = 50;

#[derive(Tabled, Clone)]
struct FunctionRow {
    #[tabled(rename = "region")]
    region: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "runtime")]
    runtime: String,
    #[tabled(rename = "memory")]
    memory: String,
    #[tabled(rename = "code size")]
    code_size: String,
    #[tabled(rename = "last modified")]
    last_modified: String,
    #[tabled(rename = "last used")]
    last_used: String,
}

#[derive(clap::Args, Clone)]
pub(crate) struct ListFunctionsCommand {
    /// Only include functions that are inactive for 30 days
    #[arg(short, long)]
    inactive: bool,

    /// Only include functions in an AWS region, e.g. us-east-1
    #[arg(short, long)]
    region: Option<String>,

    /// AWS CLI profile name
    #[arg(short, long)]
    profile: Option<String>,
}

impl Runnable for ListFunctionsCommand {
    fn runner(&self) -> impl Runner {
        ListFunctionsRunner {
            command: self.clone(),
        }
    }
}

struct ListFunctionsRunner {
    command: ListFunctionsCommand,
}

impl Runner for ListFunctionsRunner {
    /// Prints out functions of all regions as a table
    async fn run(&mut self) -> Result<(), Error> {
        let settings = self.settings()?;
        let profile = settings.profile(self.command.profile.clone());

        let regions = match &self.command.region {
            Some(region) => vec![region.clone()],
            None => settings.regions(),
        };

        let config = self.aws_config(None, profile.as_deref()).await;

        let spinner = Logger::spinner(format!(
            "Fetching functions in {} region(s)",
            regions.len()
        ));

        let now = Utc::now();

        let records = functions::list_in_all_regions(&regions, self.command.inactive, now, |region| {
            AwsFunctionSource::new(&config, region)
        })
        .await;

        spinner.finish_and_clear();
        let records = records?;

        if records.is_empty() {
            println!("{}", console::style("No functions found").yellow());
            return Ok(());
        }

        println!("{}", render(&records, now, terminal_width()));
        Ok(())
    }
}

fn render(records: &[FunctionRecord], now: DateTime<Utc>, width: Option<usize>) -> String {
    let rows: Vec<FunctionRow> = records.iter().map(|r| row(r, now)).collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());

    if let Some(width) = width {
        table.with(Settings::default().with(Width::wrap(width).priority(Priority::max(true))));
    }

    table.to_string()
}

fn row(record: &FunctionRecord, now: DateTime<Utc>) -> FunctionRow {
    FunctionRow {
        region: record.region.clone(),
        name: truncate(&record.name, MAX_NAME_LENGTH),
        runtime: record.runtime.clone(),
        memory: record.memory_size.to_string(),
        code_size: HumanBytes(record.code_size.max(0) as u64).to_string(),
        last_modified: functions::parse_last_modified(&record.last_modified)
            .map(|at| functions::ago(now, at))
            .unwrap_or_else(|| record.last_modified.clone()),
        last_used: record.last_used.clone(),
    }
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }

    let mut truncated: String = value.chars().take(max.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}

fn terminal_width() -> Option<usize> {
    terminal_size().map(|(TerminalWidth(width), _)| width as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::INACTIVE;

    fn record(name: &str) -> FunctionRecord {
        FunctionRecord {
            region: "us-east-1".into(),
            name: name.into(),
            runtime: "nodejs10.x".into(),
            memory_size: 128,
            code_size: 1024,
            last_modified: "2019-10-01T12:00:00.000+0000".into(),
            last_used: INACTIVE.into(),
        }
    }

    #[test]
    fn table_has_all_columns() {
        let output = render(&[record("function-a"), record("function-b")], Utc::now(), None);

        for header in [
            "region",
            "name",
            "runtime",
            "memory",
            "code size",
            "last modified",
            "last used",
        ] {
            assert!(output.contains(header), "missing {header}");
        }

        assert!(output.contains("function-a"));
        assert!(output.contains("function-b"));
        assert!(output.contains("128"));
        assert!(output.contains("1.00 KiB"));
        assert!(output.contains(INACTIVE));
        assert!(output.contains("ago"));
    }

    #[test]
    fn long_names_are_cut() {
        let name = "x".repeat(80);
        let cut = truncate(&name, MAX_NAME_LENGTH);

        assert_eq!(cut.chars().count(), MAX_NAME_LENGTH);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate("short", MAX_NAME_LENGTH), "short");
    }

    #[test]
    fn unparsable_modification_time_is_shown_as_is() {
        let mut unusual = record("f");
        unusual.last_modified = "sometime".into();

        assert_eq!(row(&unusual, Utc::now()).last_modified, "sometime");
    }
}
