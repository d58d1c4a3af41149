use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{Local, NaiveDate, Utc};
use chrono_english::{Dialect, parse_date_string};
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt};

use lockin_core::analytics::{daily_trend, format_duration, summarize};
use lockin_core::assistant::parse_data_uri;
use lockin_core::calendar::{export_ics, ics_filename};
use lockin_core::filter::total_minutes;
use lockin_core::{
    Assistant, HistoryFilter, Notice, PomodoroSettings, ProfileUpdate, SortOrder, Store,
    StreakChange, SubTaskCandidate, Task, TaskDraft, TaskTemplate, Theme,
};

use crate::cli::{Cli, Commands, ProfileAction, TemplateAction};
use crate::config::Config;
use crate::display::{
    ConsoleObserver, format_profile, format_report, format_schedule_item, format_summary,
    format_task, format_trend, supports_color,
};
use crate::error::{CliError, Result};
use crate::gemini::GeminiAssistant;
use crate::storage::JsonFileStorage;

mod cli;
mod config;
mod display;
mod error;
mod focus;
mod gemini;
mod storage;

type AppStore = Store<JsonFileStorage, ConsoleObserver>;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let use_color = !cli.no_color && supports_color();

    let cfg = Config::load()?;
    let storage = JsonFileStorage::new(cfg.data_dir());
    debug!(dir = %storage.dir().display(), "Using data directory");

    // Backups are restored before anything reads the state files
    if let Commands::Recover { force } = cli.command {
        return recover(&storage, force);
    }

    let mut store = Store::load(storage, ConsoleObserver::new(use_color));
    let today = Local::now().date_naive();
    if store.register_login(today) == StreakChange::Extended {
        println!("Streak: {} day(s). Stay locked in.", store.profile().streak);
    }

    match cli.command {
        Commands::Add {
            title,
            minutes,
            priority,
            category,
            energy,
            deadline,
        } => {
            let deadline = match deadline {
                Some(input) => parse_date_input(&input)?,
                None => None,
            };
            let draft = TaskDraft::new(title.join(" "))
                .with_duration(minutes)
                .with_priority(priority)
                .with_category(category)
                .with_energy(energy)
                .with_deadline(deadline);

            let id = store
                .add_task(draft)
                .ok_or_else(|| CliError::validation("title", "Title cannot be empty"))?;
            println!("Task added: [{}]", id.short());
        }

        Commands::List { all } => {
            let tasks: Vec<&Task> = if all {
                store.tasks().iter().collect()
            } else {
                store.active_tasks()
            };

            if tasks.is_empty() {
                println!("No tasks found.");
            } else {
                for task in &tasks {
                    println!("{}", format_task(task, today, use_color));
                }

                println!();
                let summary = format_summary(
                    store.tasks().len(),
                    store.completed_count(),
                    store.tasks().iter().filter(|t| t.is_overdue(today)).count(),
                    use_color,
                );
                println!("{}", summary);
            }
        }

        Commands::Edit {
            id,
            title,
            minutes,
            priority,
            category,
            energy,
            deadline,
        } => {
            if title.is_none()
                && minutes.is_none()
                && priority.is_none()
                && category.is_none()
                && energy.is_none()
                && deadline.is_none()
            {
                return Err(CliError::validation(
                    "edit",
                    "At least one field to change must be provided",
                ));
            }

            let id = store.resolve_task(&id)?;
            let mut draft = store
                .task(&id)
                .map(Task::to_draft)
                .ok_or_else(|| CliError::TaskNotFound(id.to_string()))?;

            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(minutes) = minutes {
                draft = draft.with_duration(minutes);
            }
            if let Some(priority) = priority {
                draft = draft.with_priority(priority);
            }
            if let Some(category) = category {
                draft = draft.with_category(category);
            }
            if let Some(energy) = energy {
                draft = draft.with_energy(energy);
            }
            if let Some(input) = deadline {
                draft = draft.with_deadline(parse_date_input(&input)?);
            }

            if !store.edit_task(&id, draft) {
                return Err(CliError::validation("title", "Title cannot be empty"));
            }
            if let Some(task) = store.task(&id) {
                println!("{}", format_task(task, today, use_color));
            }
        }

        Commands::Remove { id } => {
            let id = store.resolve_task(&id)?;
            let removed = store
                .delete_task(&id)
                .ok_or_else(|| CliError::TaskNotFound(id.to_string()))?;
            println!("Removed: {}", removed.title);
        }

        Commands::Check { id } => {
            let id = store.resolve_task(&id)?;
            let done = store
                .toggle_task_completion(&id, Utc::now())
                .ok_or_else(|| CliError::TaskNotFound(id.to_string()))?;
            let status = if done { "done" } else { "open" };
            let title = store.task(&id).map(|t| t.title.as_str()).unwrap_or_default();
            println!("Marked [{}] as {}: {}", id.short(), status, title);
        }

        Commands::Log { id, minutes } => {
            let id = store.resolve_task(&id)?;
            if !store.log_time_spent(&id, minutes) {
                return Err(CliError::TaskNotFound(id.to_string()));
            }
            println!("Logged {} on [{}]", format_duration(minutes), id.short());
        }

        Commands::Clear { force } => {
            let count = store.completed_count();
            if count == 0 {
                println!("No completed tasks to remove.");
                return Ok(());
            }

            if !force && !confirm(&format!("Remove {} completed task(s)?", count))? {
                println!("Cancelled.");
                return Ok(());
            }

            store.clear_completed_tasks();
        }

        Commands::Plan { context } => {
            let open: Vec<Task> = store.active_tasks().into_iter().cloned().collect();
            if open.is_empty() {
                println!("No open tasks to plan.");
                return Ok(());
            }

            let assistant = GeminiAssistant::from_config(&cfg)?;
            match assistant
                .generate_schedule(&open, store.profile(), context.as_deref())
                .await
            {
                Ok(items) => {
                    store.replace_schedule(items);
                    store.notify(Notice::success("TIMELINE LOCKED IN"));
                    print_schedule(&store, use_color);
                }
                Err(e) => {
                    warn!(error = %e, "Schedule generation failed");
                    store.notify(Notice::error("SIMULATION FAILED"));
                }
            }
        }

        Commands::Schedule => print_schedule(&store, use_color),

        Commands::Reorder { from, to } => {
            let len = store.schedule().len();
            let moved = match (from.checked_sub(1), to.checked_sub(1)) {
                (Some(from), Some(to)) => store.reorder_schedule(from, to),
                _ => false,
            };
            if !moved {
                return Err(CliError::validation(
                    "position",
                    format!("Positions must be between 1 and {}", len),
                ));
            }
            print_schedule(&store, use_color);
        }

        Commands::Focus { slot, minutes } => {
            let item = slot
                .checked_sub(1)
                .and_then(|index| store.schedule().get(index))
                .cloned()
                .ok_or_else(|| CliError::validation("slot", format!("No schedule slot {}", slot)))?;

            let outcome = focus::run_focus(&item.title, minutes).await?;
            match item.work_task() {
                Some(task_id) => {
                    store.apply_focus_outcome(task_id, outcome, Utc::now());
                }
                None => debug!(minutes = outcome.minutes(), "Break slot, nothing logged"),
            }
        }

        Commands::Pomo => {
            let settings: PomodoroSettings = store.profile().pomodoro_settings;
            let finished = focus::run_pomodoro(settings).await?;
            println!("{} Pomodoro(s) finished.", finished);
        }

        Commands::Stats { range } => {
            let now = Local::now();
            let theme = store.observer().theme();
            let report = summarize(store.tasks(), range, &now);
            let trend = daily_trend(store.tasks(), range, &now);

            println!("{}", format_report(&report, theme, use_color));
            println!();
            println!("{}", format_trend(&trend, theme, use_color));
        }

        Commands::History {
            category,
            priority,
            energy,
            search,
            sort,
            asc,
        } => {
            let order = if asc {
                SortOrder::Ascending
            } else {
                SortOrder::Descending
            };
            let filter = HistoryFilter::new()
                .with_category(category)
                .with_priority(priority)
                .with_energy(energy)
                .with_search(search)
                .sort_by(sort)
                .with_order(order);

            let tasks = filter.apply(store.tasks());
            if tasks.is_empty() {
                println!("No completed tasks found.");
            } else {
                for task in &tasks {
                    println!("{}", format_task(task, today, use_color));
                }
                println!();
                println!(
                    "[{} task(s) | {} focused]",
                    tasks.len(),
                    format_duration(total_minutes(&tasks))
                );
            }
        }

        Commands::Breakdown { id, pick, yes } => {
            let id = store.resolve_task(&id)?;
            let title = store
                .task(&id)
                .map(|t| t.title.clone())
                .ok_or_else(|| CliError::TaskNotFound(id.to_string()))?;

            let assistant = GeminiAssistant::from_config(&cfg)?;
            let candidates = match assistant.break_down_task(&title).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!(error = %e, "Task breakdown failed");
                    store.notify(Notice::error("BREAKDOWN FAILED"));
                    return Ok(());
                }
            };

            for (index, c) in candidates.iter().enumerate() {
                println!(
                    "{:>2}. {} ({} | {} | {} | {} energy)",
                    index + 1,
                    c.title,
                    format_duration(c.duration_minutes),
                    c.priority,
                    c.category,
                    c.energy_required
                );
            }

            let chosen: Vec<&SubTaskCandidate> = candidates
                .iter()
                .enumerate()
                .filter(|(index, _)| pick.as_ref().is_none_or(|p| p.contains(&(index + 1))))
                .map(|(_, c)| c)
                .collect();
            if chosen.is_empty() {
                println!("No sub-tasks selected.");
                return Ok(());
            }

            if !yes && !confirm(&format!("Add {} sub-task(s)?", chosen.len()))? {
                println!("Cancelled.");
                return Ok(());
            }
            store.add_tasks(chosen.into_iter().map(SubTaskCandidate::to_draft));
        }

        Commands::Dump { text } => {
            let text = if text.is_empty() {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer)?;
                buffer
            } else {
                text.join(" ")
            };
            if text.trim().is_empty() {
                return Err(CliError::validation("text", "Nothing to read"));
            }

            let assistant = GeminiAssistant::from_config(&cfg)?;
            let dump = assistant.summarize_free_text(&text).await;
            println!("{}", dump.summary);

            if dump.tasks.is_empty() {
                println!("No tasks found.");
            } else {
                for task in &dump.tasks {
                    println!("  - {} ({})", task.title, task.priority);
                }
                store.add_tasks(dump.to_drafts());
            }
        }

        Commands::Nudge => {
            let assistant = GeminiAssistant::from_config(&cfg)?;
            let line = assistant
                .motivational_line(store.completed_count(), store.active_tasks().len())
                .await;
            println!("{}", line);
        }

        Commands::Roast => {
            let assistant = GeminiAssistant::from_config(&cfg)?;
            println!("{}", assistant.roast_line(store.schedule()).await);
        }

        Commands::Infographic { output } => {
            if store.schedule().is_empty() {
                println!("No schedule yet. Run `lockin plan` first.");
                return Ok(());
            }

            let assistant = GeminiAssistant::from_config(&cfg)?;
            let uri = match assistant.generate_infographic(store.schedule()).await {
                Ok(uri) => uri,
                Err(e) => {
                    warn!(error = %e, "Infographic generation failed");
                    store.notify(Notice::error("VISUALIZATION FAILED"));
                    return Ok(());
                }
            };

            let (_, data) = parse_data_uri(&uri)?;
            let bytes = STANDARD.decode(data)?;
            let path = output.map(PathBuf::from).unwrap_or_else(|| {
                PathBuf::from(format!("lockin-schedule-{}.png", today.format("%Y-%m-%d")))
            });
            fs::write(&path, bytes)
                .map_err(|e| CliError::io(format!("Failed to write {}", path.display()), e))?;
            println!("Saved infographic to {}", path.display());
        }

        Commands::Export { output, date } => {
            if store.schedule().is_empty() {
                println!("No schedule yet. Run `lockin plan` first.");
                return Ok(());
            }

            let date = match date {
                Some(input) => parse_date_input(&input)?
                    .ok_or_else(|| CliError::validation("date", "A date is required"))?,
                None => today,
            };
            let calendar = export_ics(store.schedule(), date, Utc::now());
            let path = output
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(ics_filename(date)));
            fs::write(&path, calendar)
                .map_err(|e| CliError::io(format!("Failed to write {}", path.display()), e))?;
            println!(
                "Exported {} slot(s) to {}",
                store.schedule().len(),
                path.display()
            );
        }

        Commands::Playlist { url, pick, yes } => {
            let assistant = GeminiAssistant::from_config(&cfg)?;
            let playlist = match assistant.import_playlist(&url).await {
                Ok(playlist) => playlist,
                Err(e) => {
                    warn!(error = %e, "Playlist import failed");
                    store.notify(Notice::error("PLAYLIST IMPORT FAILED"));
                    return Ok(());
                }
            };

            println!("{}", playlist.title);
            for video in &playlist.videos {
                println!("{:>3}. {}", video.number, video.title);
            }

            let drafts = playlist.to_drafts(pick.as_deref());
            if drafts.is_empty() {
                println!("No videos selected.");
                return Ok(());
            }

            if !yes && !confirm(&format!("Add {} video(s) as tasks?", drafts.len()))? {
                println!("Cancelled.");
                return Ok(());
            }
            store.add_tasks(drafts);
        }

        Commands::Profile { action } => match action.unwrap_or(ProfileAction::Show) {
            ProfileAction::Show => println!("{}", format_profile(store.profile(), use_color)),

            ProfileAction::Set {
                name,
                wake,
                sleep,
                productive,
                work,
                short_break,
                long_break,
                auto_breaks,
                auto_focus,
            } => {
                let mut update = ProfileUpdate::new();
                if let Some(name) = name {
                    update = update.name(name);
                }
                if let Some(wake) = wake {
                    update = update.wake_up_time(wake);
                }
                if let Some(sleep) = sleep {
                    update = update.sleep_time(sleep);
                }
                if let Some(productive) = productive {
                    update = update.productive_hours(productive);
                }

                let current = store.profile().pomodoro_settings;
                let pomodoro = PomodoroSettings {
                    work_duration: work.unwrap_or(current.work_duration),
                    short_break_duration: short_break.unwrap_or(current.short_break_duration),
                    long_break_duration: long_break.unwrap_or(current.long_break_duration),
                    auto_start_breaks: auto_breaks.unwrap_or(current.auto_start_breaks),
                    auto_start_pomodoros: auto_focus.unwrap_or(current.auto_start_pomodoros),
                };
                if pomodoro != current {
                    update = update.pomodoro(pomodoro);
                }

                if update.is_empty() {
                    return Err(CliError::validation(
                        "profile",
                        "At least one field to change must be provided",
                    ));
                }
                store.update_profile(update)?;
                println!("{}", format_profile(store.profile(), use_color));
            }

            ProfileAction::Theme { theme: Some(theme) } => {
                store.update_profile(ProfileUpdate::new().theme(theme))?;
                println!("Theme set to {}", theme.label());
            }

            ProfileAction::Theme { theme: None } => {
                let current = store.profile().theme;
                for theme in Theme::ALL {
                    let marker = if theme == current { "*" } else { " " };
                    println!("{} {:<8} {}", marker, theme.id(), theme.label());
                }
            }
        },

        Commands::Template { action } => match action {
            TemplateAction::Save { id } => {
                let id = store.resolve_task(&id)?;
                let draft = store
                    .task(&id)
                    .map(Task::to_draft)
                    .ok_or_else(|| CliError::TaskNotFound(id.to_string()))?;
                let template_id = store
                    .save_template(&draft)
                    .ok_or_else(|| CliError::validation("title", "Title cannot be empty"))?;
                println!("Template saved: [{}] {}", short_id(&template_id), draft.title);
            }

            TemplateAction::List => {
                if store.templates().is_empty() {
                    println!("No templates saved.");
                }
                for template in store.templates() {
                    println!(
                        "[{}] {} ({} | {} | {} | {} energy)",
                        short_id(&template.id),
                        template.title,
                        format_duration(template.duration_minutes),
                        template.priority,
                        template.category,
                        template.energy_required
                    );
                }
            }

            TemplateAction::Remove { id } => {
                let id = resolve_template(&store, &id)?;
                store.remove_template(&id);
                println!("Removed template [{}]", short_id(&id));
            }

            TemplateAction::Use { id } => {
                let id = resolve_template(&store, &id)?;
                let task_id = store
                    .add_task_from_template(&id)
                    .ok_or_else(|| CliError::validation("template", "Template has no title"))?;
                println!("Task added: [{}]", task_id.short());
            }
        },

        // Handled before the store is loaded
        Commands::Recover { .. } => {}
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn recover(storage: &JsonFileStorage, force: bool) -> Result<()> {
    if !storage.backup_exists() {
        return Err(CliError::storage("No backup files found"));
    }

    if !force && !confirm("Restore state from backups? Current data will be replaced.")? {
        println!("Cancelled.");
        return Ok(());
    }

    let restored = storage.recover()?;
    let names: Vec<&str> = restored.iter().map(|key| key.as_str()).collect();
    println!("Recovered {} file(s): {}", restored.len(), names.join(", "));
    Ok(())
}

fn print_schedule(store: &AppStore, use_color: bool) {
    if store.schedule().is_empty() {
        println!("No schedule yet. Run `lockin plan` first.");
        return;
    }

    for (index, item) in store.schedule().iter().enumerate() {
        let done = item
            .work_task()
            .and_then(|id| store.task(id))
            .is_some_and(Task::is_complete);
        println!("{}", format_schedule_item(index + 1, item, done, use_color));
    }
}

/// Find a template by full ID or unique prefix
fn resolve_template(store: &AppStore, query: &str) -> Result<String> {
    let query = query.trim();
    let matches: Vec<&TaskTemplate> = store
        .templates()
        .iter()
        .filter(|t| !query.is_empty() && t.id.starts_with(query))
        .collect();

    match matches.as_slice() {
        [template] => Ok(template.id.clone()),
        [] => Err(CliError::validation(
            "template",
            format!("No template matches '{}'", query),
        )),
        _ => Err(CliError::validation(
            "template",
            format!("'{}' matches {} templates", query, matches.len()),
        )),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Parse a date like "2026-11-01", "tomorrow" or "next friday"; "none" clears it
fn parse_date_input(input: &str) -> Result<Option<NaiveDate>> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(Some(date));
    }

    parse_date_string(input, Local::now(), Dialect::Us)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|e| CliError::parse(format!("Could not read date '{}': {}", input, e)))
}

/// Ask user for confirmation
fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_input_iso() {
        assert_eq!(
            parse_date_input("2026-11-01").unwrap(),
            NaiveDate::from_ymd_opt(2026, 11, 1)
        );
    }

    #[test]
    fn test_parse_date_input_none_clears() {
        assert_eq!(parse_date_input("None").unwrap(), None);
    }

    #[test]
    fn test_parse_date_input_relative() {
        let today = Local::now().date_naive();
        let tomorrow = parse_date_input("tomorrow").unwrap().unwrap();
        assert!(tomorrow > today);
    }

    #[test]
    fn test_parse_date_input_garbage() {
        assert!(parse_date_input("whenever i feel like it").is_err());
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }
}
