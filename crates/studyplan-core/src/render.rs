use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use chrono::{Datelike, NaiveDate};
use unicode_width::UnicodeWidthStr;
use uuid::Uuid;

use crate::calendar::{CalendarEvent, EventKind};
use crate::config::Config;
use crate::datetime::{self, days_in_month};
use crate::notes::Note;
use crate::streak::Streak;
use crate::subjects::Subject;
use crate::tasks::Task;
use crate::timetable::{DAYS, SLOT_TIMES, TimeSlot, subject_at};

const PROGRESS_BAR_WIDTH: u32 = 20;

/// Ids are shown as the first uuid block; any unambiguous prefix is
/// accepted back on the command line.
pub fn short_id(id: Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    #[tracing::instrument(skip(self, tasks))]
    pub fn print_task_table(&mut self, tasks: &[&Task], today: NaiveDate) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        if tasks.is_empty() {
            writeln!(out, "No tasks.")?;
            return Ok(());
        }

        let headers = vec![
            "ID".to_string(),
            "Due".to_string(),
            "Subject".to_string(),
            "Pri".to_string(),
            "Title".to_string(),
        ];

        let mut rows = Vec::with_capacity(tasks.len());
        for task in tasks {
            let due = datetime::format_date(task.deadline);
            let due = if task.is_overdue(today) {
                self.paint(&due, "31")
            } else {
                due
            };

            let id = self.paint(&short_id(task.id), "33");
            let priority = task
                .priority
                .map(|p| p.to_string())
                .unwrap_or_default();
            let title = if task.completed {
                format!("{} (done)", task.title)
            } else {
                task.title.clone()
            };

            rows.push(vec![id, due, task.subject.clone(), priority, title]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, agenda))]
    pub fn print_agenda(&mut self, date: NaiveDate, agenda: &[CalendarEvent]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "{}", datetime::format_date_long(date))?;
        if agenda.is_empty() {
            writeln!(out, "No events or deadlines on this date.")?;
            return Ok(());
        }

        for entry in agenda {
            let badge = match entry.kind {
                EventKind::Event => "event",
                EventKind::Deadline => "deadline",
            };
            let badge = match entry.kind {
                EventKind::Event => self.paint(badge, "36"),
                EventKind::Deadline => self.paint(badge, "35"),
            };
            writeln!(
                out,
                "  {} [{badge}] {} ({}, {})",
                self.paint(&short_id(entry.id), "33"),
                entry.name,
                entry.subject,
                entry.priority
            )?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, events))]
    pub fn print_event_table(&mut self, events: &[CalendarEvent]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        if events.is_empty() {
            writeln!(out, "No events.")?;
            return Ok(());
        }

        let headers = vec![
            "ID".to_string(),
            "Date".to_string(),
            "Subject".to_string(),
            "Pri".to_string(),
            "Name".to_string(),
        ];

        let mut rows = Vec::with_capacity(events.len());
        for event in events {
            rows.push(vec![
                self.paint(&short_id(event.id), "33"),
                datetime::format_date(event.date),
                event.subject.clone(),
                event.priority.to_string(),
                event.name.clone(),
            ]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    /// Month grid with days carrying events or deadlines marked `*`.
    #[tracing::instrument(skip(self, is_marked))]
    pub fn print_month<F>(&mut self, year: i32, month: u32, is_marked: F) -> anyhow::Result<()>
    where
        F: Fn(NaiveDate) -> bool,
    {
        let mut out = io::stdout().lock();

        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| anyhow!("invalid month: {year}-{month:02}"))?;
        let title = first.format("%B %Y").to_string();
        writeln!(out, "{title:^28}")?;
        writeln!(out, " Mon Tue Wed Thu Fri Sat Sun")?;

        let leading = first.weekday().num_days_from_monday();
        let mut column = 0;
        for _ in 0..leading {
            write!(out, "    ")?;
            column += 1;
        }

        for day in 1..=days_in_month(year, month) {
            let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                continue;
            };
            let cell = if is_marked(date) {
                format!("{day:3}*")
            } else {
                format!("{day:3} ")
            };
            let cell = if is_marked(date) {
                self.paint(&cell, "33")
            } else {
                cell
            };
            write!(out, "{cell}")?;
            column += 1;
            if column == 7 {
                writeln!(out)?;
                column = 0;
            }
        }
        if column != 0 {
            writeln!(out)?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, notes))]
    pub fn print_note_list(&mut self, notes: &[Note]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        if notes.is_empty() {
            writeln!(out, "No notes.")?;
            return Ok(());
        }

        let headers = vec![
            "ID".to_string(),
            "Created".to_string(),
            "Title".to_string(),
        ];
        let mut rows = Vec::with_capacity(notes.len());
        for note in notes {
            rows.push(vec![
                self.paint(&short_id(note.id), "33"),
                note.created_at.format("%Y-%m-%d").to_string(),
                note.title.clone(),
            ]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, note))]
    pub fn print_note(&mut self, note: &Note) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "{}", note.title)?;
        writeln!(
            out,
            "Created: {}",
            note.created_at.format("%Y-%m-%d %H:%M")
        )?;
        writeln!(out)?;
        writeln!(out, "{}", note.content)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, subjects))]
    pub fn print_subject_table(&mut self, subjects: &[Subject]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        if subjects.is_empty() {
            writeln!(out, "No subjects.")?;
            return Ok(());
        }

        for subject in subjects {
            writeln!(
                out,
                "{}  {} ({}/{} hours)",
                self.paint(&short_id(subject.id), "33"),
                subject.name,
                subject.completed,
                subject.target
            )?;
            let filled = (subject.progress.min(100) * PROGRESS_BAR_WIDTH / 100) as usize;
            let empty = PROGRESS_BAR_WIDTH as usize - filled;
            let bar = format!("{}{}", "#".repeat(filled), "-".repeat(empty));
            writeln!(out, "          [{}] {}%", self.paint(&bar, "32"), subject.progress)?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, streak))]
    pub fn print_streak(&mut self, streak: &Streak, today: NaiveDate) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let current = streak.current_streak.to_string();
        writeln!(out, "Current streak: {} day(s)", self.paint(&current, "33"))?;
        writeln!(out, "Total study days: {}", streak.total_days)?;
        let today_mark = if streak.logged_on(today) {
            "logged"
        } else {
            "not logged yet"
        };
        writeln!(out, "Today: {today_mark}")?;
        Ok(())
    }

    #[tracing::instrument(skip(self, schedule))]
    pub fn print_timetable(&mut self, schedule: &[TimeSlot]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let mut headers = vec!["Time".to_string()];
        headers.extend(DAYS.iter().map(|day| day.to_string()));

        let mut rows = Vec::with_capacity(SLOT_TIMES.len());
        for time in SLOT_TIMES {
            let mut row = vec![time.to_string()];
            for day in DAYS {
                row.push(
                    subject_at(schedule, day, time)
                        .unwrap_or_default()
                        .to_string(),
                );
            }
            rows.push(row);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_ids_are_first_block() {
        let id = Uuid::new_v4();
        let short = short_id(id);
        assert_eq!(short.len(), 8);
        assert!(id.to_string().starts_with(&short));
    }

    #[test]
    fn strip_ansi_removes_codes() {
        assert_eq!(strip_ansi("\x1b[33mhello\x1b[0m"), "hello");
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[test]
    fn table_pads_to_widest_cell() {
        let mut out = Vec::new();
        write_table(
            &mut out,
            vec!["A".to_string(), "B".to_string()],
            vec![vec!["x".to_string(), "longer".to_string()]],
        )
        .expect("write table");
        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "A B      ");
        assert_eq!(lines[2], "x longer ");
    }
}
