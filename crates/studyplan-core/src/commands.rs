use std::io::Write as _;

use anyhow::Context;
use chrono::{Datelike, Utc};
use tracing::{debug, info, instrument};

use crate::cli::{
    Command, EventAction, NoteAction, StreakAction, SubjectAction, TaskAction, TimetableAction,
};
use crate::collection::{self, Direction};
use crate::datetime;
use crate::pomodoro::{Mode, Pomodoro, Tick};
use crate::render::{Renderer, short_id};
use crate::store::{self, Store};
use crate::streak::{LogOutcome, Streak};
use crate::tasks::Priority;
use crate::{calendar, notes, subjects, tasks, timetable};

#[instrument(skip(store, renderer, command))]
pub fn dispatch(store: &Store, renderer: &mut Renderer, command: Command) -> anyhow::Result<()> {
    debug!(?command, "dispatching command");

    match command {
        Command::Overview => cmd_overview(store, renderer),
        Command::Task { action } => cmd_task(store, renderer, action),
        Command::Event { action } => cmd_event(store, renderer, action),
        Command::Agenda { date } => cmd_agenda(store, renderer, date.as_deref()),
        Command::Calendar { month } => cmd_calendar(store, renderer, month.as_deref()),
        Command::Note { action } => cmd_note(store, renderer, action),
        Command::Subject { action } => cmd_subject(store, renderer, action),
        Command::Streak { action } => cmd_streak(store, renderer, action),
        Command::Timer { mode, minutes } => cmd_timer(mode.as_deref(), minutes),
        Command::Timetable { action } => cmd_timetable(store, renderer, action),
    }
}

fn load_tasks(store: &Store) -> anyhow::Result<Vec<tasks::Task>> {
    store.load_or_init(store::TASKS, tasks::seed)
}

fn load_events(store: &Store) -> anyhow::Result<Vec<calendar::CalendarEvent>> {
    store.load_or_init(store::CALENDAR_EVENTS, calendar::seed)
}

fn parse_priority(raw: Option<&str>) -> anyhow::Result<Option<Priority>> {
    raw.map(str::parse).transpose()
}

fn parse_direction(raw: &str) -> anyhow::Result<Direction> {
    raw.parse()
}

/// The dashboard overview: streak state, timer defaults and the first
/// three tasks in display order.
#[instrument(skip(store, renderer))]
fn cmd_overview(store: &Store, renderer: &mut Renderer) -> anyhow::Result<()> {
    info!("command overview");
    let today = datetime::today();

    let streak: Streak = store.load_value_or_init(store::STREAK, Streak::default)?;
    renderer.print_streak(&streak, today)?;

    println!();
    println!("Quick timer: work 25:00 / break 05:00 (studyplan timer)");
    println!();

    let tasks = load_tasks(store)?;
    let ordered = tasks::display_order(&tasks);
    let preview: Vec<&tasks::Task> = ordered.into_iter().take(3).collect();
    renderer.print_task_table(&preview, today)?;
    Ok(())
}

#[instrument(skip(store, renderer, action))]
fn cmd_task(store: &Store, renderer: &mut Renderer, action: TaskAction) -> anyhow::Result<()> {
    let today = datetime::today();
    let mut list = load_tasks(store)?;

    match action {
        TaskAction::Add {
            title,
            due,
            subject,
            priority,
        } => {
            info!("command task add");
            let due = due.as_deref().map(datetime::parse_date).transpose()?;
            let priority = parse_priority(priority.as_deref())?;
            let id = tasks::add(&mut list, &title.join(" "), due, subject, priority, today)?;
            store.save(store::TASKS, &list)?;
            println!("Created task {}.", short_id(id));
        }
        TaskAction::List => {
            info!("command task list");
            let ordered = tasks::display_order(&list);
            renderer.print_task_table(&ordered, today)?;
        }
        TaskAction::Done { id } => {
            info!("command task done");
            let id = collection::resolve_id(&list, &id)?;
            let completed = tasks::toggle(&mut list, id)?;
            store.save(store::TASKS, &list)?;
            if completed {
                println!("Completed task {}.", short_id(id));
            } else {
                println!("Reopened task {}.", short_id(id));
            }
        }
        TaskAction::Delete { id } => {
            info!("command task delete");
            let id = collection::resolve_id(&list, &id)?;
            let removed = tasks::delete(&mut list, id)?;
            store.save(store::TASKS, &list)?;
            println!("Deleted task '{}'.", removed.title);
        }
        TaskAction::Move { id, direction } => {
            info!("command task move");
            let id = collection::resolve_id(&list, &id)?;
            let direction = parse_direction(&direction)?;
            if collection::move_item(&mut list, id, direction) {
                store.save(store::TASKS, &list)?;
                println!("Moved task {}.", short_id(id));
            } else {
                println!("No change.");
            }
        }
    }
    Ok(())
}

#[instrument(skip(store, renderer, action))]
fn cmd_event(store: &Store, renderer: &mut Renderer, action: EventAction) -> anyhow::Result<()> {
    let mut events = load_events(store)?;

    match action {
        EventAction::Add {
            name,
            date,
            subject,
            priority,
        } => {
            info!("command event add");
            let date = match date.as_deref() {
                Some(raw) => datetime::parse_date(raw)?,
                None => datetime::today(),
            };
            let priority = parse_priority(priority.as_deref())?;
            let id = calendar::add(&mut events, &name.join(" "), subject, priority, date)?;
            store.save(store::CALENDAR_EVENTS, &events)?;
            println!("Created event {}.", short_id(id));
        }
        EventAction::List => {
            info!("command event list");
            renderer.print_event_table(&events)?;
        }
        EventAction::Delete { id } => {
            info!("command event delete");
            let id = collection::resolve_id(&events, &id)?;
            let removed = calendar::delete(&mut events, id)?;
            store.save(store::CALENDAR_EVENTS, &events)?;
            println!("Deleted event '{}'.", removed.name);
        }
    }
    Ok(())
}

/// The calendar/task join: task data is re-read from the store on every
/// invocation, so deadlines created by `task add` show up here without
/// the calendar ever owning them.
#[instrument(skip(store, renderer, date))]
fn cmd_agenda(store: &Store, renderer: &mut Renderer, date: Option<&str>) -> anyhow::Result<()> {
    info!("command agenda");

    let date = match date {
        Some(raw) => datetime::parse_date(raw)?,
        None => datetime::today(),
    };

    let events = load_events(store)?;
    let task_list = load_tasks(store)?;
    let agenda = calendar::agenda_for(&events, &task_list, date);
    renderer.print_agenda(date, &agenda)?;
    Ok(())
}

#[instrument(skip(store, renderer, month))]
fn cmd_calendar(store: &Store, renderer: &mut Renderer, month: Option<&str>) -> anyhow::Result<()> {
    info!("command calendar");

    let (year, month) = match month {
        Some(raw) => datetime::parse_month(raw)?,
        None => {
            let today = datetime::today();
            (today.year(), today.month())
        }
    };

    let events = load_events(store)?;
    let task_list = load_tasks(store)?;
    renderer.print_month(year, month, |date| {
        calendar::has_entries_on(&events, &task_list, date)
    })?;
    Ok(())
}

#[instrument(skip(store, renderer, action))]
fn cmd_note(store: &Store, renderer: &mut Renderer, action: NoteAction) -> anyhow::Result<()> {
    let mut list: Vec<notes::Note> = store.load_or_init(store::NOTES, notes::seed)?;

    match action {
        NoteAction::Add { title, content } => {
            info!("command note add");
            let id = notes::create(&mut list, &title, &content, Utc::now())?;
            store.save(store::NOTES, &list)?;
            println!("Created note {}.", short_id(id));
        }
        NoteAction::List => {
            info!("command note list");
            renderer.print_note_list(&list)?;
        }
        NoteAction::Show { id } => {
            info!("command note show");
            let id = collection::resolve_id(&list, &id)?;
            let note = notes::find(&list, id)?;
            renderer.print_note(note)?;
        }
        NoteAction::Delete { id } => {
            info!("command note delete");
            let id = collection::resolve_id(&list, &id)?;
            let removed = notes::delete(&mut list, id)?;
            store.save(store::NOTES, &list)?;
            println!("Deleted note '{}'.", removed.title);
        }
        NoteAction::Move { id, direction } => {
            info!("command note move");
            let id = collection::resolve_id(&list, &id)?;
            let direction = parse_direction(&direction)?;
            if collection::move_item(&mut list, id, direction) {
                store.save(store::NOTES, &list)?;
                println!("Moved note {}.", short_id(id));
            } else {
                println!("No change.");
            }
        }
    }
    Ok(())
}

#[instrument(skip(store, renderer, action))]
fn cmd_subject(
    store: &Store,
    renderer: &mut Renderer,
    action: SubjectAction,
) -> anyhow::Result<()> {
    let mut list: Vec<subjects::Subject> = store.load_or_init(store::SUBJECTS, subjects::seed)?;

    match action {
        SubjectAction::Add { name } => {
            info!("command subject add");
            let id = subjects::add(&mut list, &name.join(" "))?;
            store.save(store::SUBJECTS, &list)?;
            println!("Created subject {}.", short_id(id));
        }
        SubjectAction::List => {
            info!("command subject list");
            renderer.print_subject_table(&list)?;
        }
        SubjectAction::Log { id, hours } => {
            info!("command subject log");
            let id = collection::resolve_id(&list, &id)?;
            let progress = subjects::update_progress(&mut list, id, hours)?;
            store.save(store::SUBJECTS, &list)?;
            println!("Progress now {progress}%.");
        }
        SubjectAction::Target { id, target } => {
            info!("command subject target");
            let id = collection::resolve_id(&list, &id)?;
            let progress = subjects::set_target(&mut list, id, target)?;
            store.save(store::SUBJECTS, &list)?;
            println!("Progress now {progress}%.");
        }
        SubjectAction::Delete { id } => {
            info!("command subject delete");
            let id = collection::resolve_id(&list, &id)?;
            let removed = subjects::delete(&mut list, id)?;
            store.save(store::SUBJECTS, &list)?;
            println!("Deleted subject '{}'.", removed.name);
        }
        SubjectAction::Move { id, direction } => {
            info!("command subject move");
            let id = collection::resolve_id(&list, &id)?;
            let direction = parse_direction(&direction)?;
            if collection::move_item(&mut list, id, direction) {
                store.save(store::SUBJECTS, &list)?;
                println!("Moved subject {}.", short_id(id));
            } else {
                println!("No change.");
            }
        }
    }
    Ok(())
}

#[instrument(skip(store, renderer, action))]
fn cmd_streak(
    store: &Store,
    renderer: &mut Renderer,
    action: Option<StreakAction>,
) -> anyhow::Result<()> {
    let today = datetime::today();
    let mut record: Streak = store.load_value_or_init(store::STREAK, Streak::default)?;

    match action.unwrap_or(StreakAction::Show) {
        StreakAction::Show => {
            info!("command streak show");
            renderer.print_streak(&record, today)?;
        }
        StreakAction::Log => {
            info!("command streak log");
            match record.log(today) {
                LogOutcome::AlreadyLogged => {
                    println!("Already logged today!");
                }
                LogOutcome::Extended(days) => {
                    store.save_value(store::STREAK, &record)?;
                    println!("Great job! {days} day streak!");
                }
                LogOutcome::Restarted => {
                    store.save_value(store::STREAK, &record)?;
                    println!("Great job! 1 day streak!");
                }
            }
        }
    }
    Ok(())
}

/// Runs one countdown session in the foreground. The one-second tick is
/// owned by this invocation and stops with it; nothing about the timer is
/// persisted.
#[instrument(skip(mode, minutes))]
fn cmd_timer(mode: Option<&str>, minutes: Option<u8>) -> anyhow::Result<()> {
    info!("command timer");

    let mode: Mode = match mode {
        Some(raw) => raw.parse()?,
        None => Mode::Work,
    };

    let mut timer = Pomodoro::new(mode);
    if let Some(minutes) = minutes {
        timer.minutes = minutes;
        timer.seconds = 0;
    }
    timer.toggle();

    let mut out = std::io::stdout();
    writeln!(out, "{} session, {} remaining", timer.mode, timer.remaining())?;

    loop {
        std::thread::sleep(std::time::Duration::from_secs(1));
        match timer.tick() {
            Tick::Running => {
                write!(out, "\r{}  ", timer.remaining())?;
                out.flush()?;
            }
            Tick::Completed(finished) => {
                writeln!(out)?;
                match finished {
                    Mode::Work => {
                        writeln!(out, "Work session complete! Time for a break.")?;
                    }
                    Mode::Break => {
                        writeln!(out, "Break complete! Ready for another session?")?;
                    }
                }
                writeln!(out, "Next up: {} ({})", timer.mode, timer.remaining())?;
                break;
            }
            Tick::Idle => break,
        }
    }

    Ok(())
}

#[instrument(skip(store, renderer, action))]
fn cmd_timetable(
    store: &Store,
    renderer: &mut Renderer,
    action: Option<TimetableAction>,
) -> anyhow::Result<()> {
    let mut schedule: Vec<timetable::TimeSlot> =
        store.load_or_init(store::TIMETABLE, timetable::seed)?;

    match action.unwrap_or(TimetableAction::Show) {
        TimetableAction::Show => {
            info!("command timetable show");
            renderer.print_timetable(&schedule)?;
        }
        TimetableAction::Set { day, time, subject } => {
            info!("command timetable set");
            let day: timetable::Day = day.parse().context("invalid day")?;
            let time: timetable::SlotTime = time.parse().context("invalid time")?;
            let subject = subject.join(" ");

            match timetable::set(&mut schedule, day, time, &subject) {
                Some(placed) => {
                    store.save(store::TIMETABLE, &schedule)?;
                    println!("Set {day} {time} to '{placed}'.");
                }
                None => {
                    store.save(store::TIMETABLE, &schedule)?;
                    println!("Cleared {day} {time}.");
                }
            }
        }
    }
    Ok(())
}
