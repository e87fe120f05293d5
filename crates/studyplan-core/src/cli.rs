use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "studyplan",
    version,
    about = "studyplan: a local-first study planner",
    disable_help_subcommand = true,
    arg_required_else_help = false
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "rc-file", global = true)]
    pub rc_file: Option<PathBuf>,

    #[arg(long = "data", global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Streak summary, timer defaults and the next few tasks.
    Overview,

    /// Tasks and their deadlines.
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Stored calendar events.
    Event {
        #[command(subcommand)]
        action: EventAction,
    },

    /// One day's agenda: events first, then task deadlines.
    Agenda {
        /// YYYY-MM-DD, defaults to today.
        date: Option<String>,
    },

    /// Month grid with busy days marked.
    Calendar {
        /// YYYY-MM, defaults to the current month.
        month: Option<String>,
    },

    /// Free-form study notes.
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },

    /// Subjects and hours-based progress tracking.
    Subject {
        #[command(subcommand)]
        action: SubjectAction,
    },

    /// Daily study streak.
    Streak {
        #[command(subcommand)]
        action: Option<StreakAction>,
    },

    /// Run one pomodoro countdown session.
    Timer {
        /// work or break (default: work).
        #[arg(long)]
        mode: Option<String>,

        /// Override the session length in minutes.
        #[arg(long)]
        minutes: Option<u8>,
    },

    /// Weekly timetable grid.
    Timetable {
        #[command(subcommand)]
        action: Option<TimetableAction>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TaskAction {
    /// Add a task; the deadline defaults to today.
    Add {
        #[arg(required = true)]
        title: Vec<String>,

        /// Deadline as YYYY-MM-DD (or today/tomorrow).
        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        subject: Option<String>,

        /// low, medium or high.
        #[arg(long)]
        priority: Option<String>,
    },
    /// List tasks, pending first, by deadline.
    List,
    /// Toggle a task's completed flag.
    Done { id: String },
    Delete { id: String },
    /// Swap a task with its neighbor (up or down).
    Move { id: String, direction: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum EventAction {
    Add {
        #[arg(required = true)]
        name: Vec<String>,

        /// Event date as YYYY-MM-DD, defaults to today.
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        subject: Option<String>,

        /// low, medium or high (default: medium).
        #[arg(long)]
        priority: Option<String>,
    },
    List,
    Delete { id: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum NoteAction {
    /// Create a note; new notes go to the front of the list.
    Add {
        title: String,

        #[arg(long)]
        content: String,
    },
    List,
    Show { id: String },
    Delete { id: String },
    Move { id: String, direction: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubjectAction {
    Add {
        #[arg(required = true)]
        name: Vec<String>,
    },
    List,
    /// Log studied hours (negative to take back).
    Log { id: String, hours: i64 },
    /// Change the target hours for a subject.
    Target { id: String, target: u32 },
    Delete { id: String },
    Move { id: String, direction: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum StreakAction {
    Show,
    /// Log today's study session.
    Log,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TimetableAction {
    Show,
    /// Fill a slot; omit the subject to clear it.
    Set {
        /// Monday-Friday (or mon..fri).
        day: String,
        /// One of the fixed lesson times, e.g. 9:00 or 14:00.
        time: String,
        subject: Vec<String>,
    },
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Pulls taskwarrior-style positional `rc.key=value` overrides out of the
/// raw argument list before clap sees it.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> anyhow::Result<PreprocessedArgs> {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut overrides: Vec<(String, String)> = Vec::new();

    let mut iter = raw.iter().cloned();
    if let Some(bin) = iter.next() {
        cleaned.push(bin);
    }

    for arg in iter {
        let s = arg.to_string_lossy();
        if let Some(rest) = s.strip_prefix("rc.") {
            if let Some((k, v)) = rest.split_once('=') {
                debug!(key = %k, value = %v, "captured positional rc override");
                overrides.push((format!("rc.{k}"), v.to_string()));
                continue;
            }
        }

        cleaned.push(arg);
    }

    Ok(PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    })
}

/// Maps the `default.command` config value to a runnable command for
/// invocations that name no subcommand.
pub fn default_command(name: &str) -> anyhow::Result<Command> {
    match name.trim() {
        "overview" => Ok(Command::Overview),
        "agenda" => Ok(Command::Agenda { date: None }),
        "calendar" => Ok(Command::Calendar { month: None }),
        "streak" => Ok(Command::Streak { action: None }),
        "timetable" => Ok(Command::Timetable { action: None }),
        other => Err(anyhow!("unsupported default.command: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn preprocess_extracts_rc_overrides() {
        let raw = os(&["studyplan", "rc.color=off", "task", "list"]);
        let pre = preprocess_args(&raw).expect("preprocess");
        assert_eq!(pre.cleaned_args, os(&["studyplan", "task", "list"]));
        assert_eq!(
            pre.rc_overrides,
            vec![("rc.color".to_string(), "off".to_string())]
        );
    }

    #[test]
    fn parses_task_add_with_flags() {
        let cli = GlobalCli::try_parse_from([
            "studyplan", "task", "add", "Read", "chapter", "4", "--due", "2025-06-01",
        ])
        .expect("parse");

        match cli.command {
            Some(Command::Task {
                action: TaskAction::Add { title, due, .. },
            }) => {
                assert_eq!(title.join(" "), "Read chapter 4");
                assert_eq!(due.as_deref(), Some("2025-06-01"));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn keyval_requires_equals() {
        assert!("color=off".parse::<KeyVal>().is_ok());
        assert!("coloroff".parse::<KeyVal>().is_err());
    }

    #[test]
    fn default_command_names() {
        assert!(matches!(
            default_command("overview").expect("map"),
            Command::Overview
        ));
        assert!(default_command("bogus").is_err());
    }
}
