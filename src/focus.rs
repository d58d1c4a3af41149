//! Terminal countdowns for focus sessions and Pomodoro cycles
//!
//! Ticks once a second on a tokio interval and stops on Ctrl-C. Once a
//! countdown has run, Ctrl-C stays captured for the rest of the process, so
//! the prompts that follow say how to stop without it.

use std::io::{self, Write};

use notify_rust::Notification;
use tokio::time::{self, Duration};
use tracing::{debug, warn};

use lockin_core::timer::format_clock;
use lockin_core::{Countdown, FocusOutcome, PomodoroCycle, PomodoroSettings};

use crate::confirm;
use crate::error::Result;

const NOTIFICATION_SUMMARY: &str = "LOCK IN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerEnd {
    Finished,
    Interrupted,
}

/// Run a focus session until Ctrl-C, then ask whether the task is done
///
/// The countdown keeps counting once it reaches zero so overtime is logged.
pub async fn run_focus(title: &str, minutes: u32) -> Result<FocusOutcome> {
    println!("LOCKED IN: {} ({}m). Ctrl-C to stop.", title, minutes);

    let mut countdown = Countdown::from_minutes(minutes);
    run_countdown(&mut countdown, "FOCUS", true).await?;
    println!();

    let spent = countdown.minutes_spent();
    let outcome = if confirm(&finish_prompt(title))? {
        FocusOutcome::Completed(spent)
    } else {
        FocusOutcome::Abandoned(spent)
    };
    debug!(?outcome, "Focus session ended");
    Ok(outcome)
}

/// Run Pomodoro phases until the user stops; returns finished work phases
pub async fn run_pomodoro(settings: PomodoroSettings) -> Result<u32> {
    let mut cycle = PomodoroCycle::new(settings);

    loop {
        let phase = cycle.phase();
        let minutes = cycle.current_minutes();
        println!("{} ({}m). Ctrl-C to stop.", phase, minutes);

        let mut countdown = Countdown::from_minutes(minutes);
        let end = run_countdown(&mut countdown, phase.label(), false).await?;
        println!();
        if end == TimerEnd::Interrupted {
            break;
        }

        let transition = cycle.advance();
        let body = format!(
            "{} over. Next up: {} ({} min).",
            transition.finished,
            transition.next,
            cycle.current_minutes()
        );
        println!("{}", body);
        notify(&body);

        if !transition.auto_start
            && !confirm(&next_phase_prompt(transition.next))?
        {
            break;
        }
    }

    Ok(cycle.completed_work())
}

// Ctrl-C is no way out here, so each prompt names its exit
fn finish_prompt(title: &str) -> String {
    format!("Did you finish \"{}\"? Either answer ends the session.", title)
}

fn next_phase_prompt(next: impl std::fmt::Display) -> String {
    format!("Start {}? Answer n to stop.", next)
}

/// Drive `countdown` once a second
///
/// Without `overtime` the countdown ends at zero; with it, only Ctrl-C ends it.
async fn run_countdown(countdown: &mut Countdown, label: &str, overtime: bool) -> Result<TimerEnd> {
    // A zero-length phase never crosses zero while ticking
    if !overtime && countdown.is_finished() {
        return Ok(TimerEnd::Finished);
    }

    let mut interval = time::interval(Duration::from_secs(1));
    // First tick completes immediately
    interval.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    draw(&timer_line(label, countdown))?;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let was_finished = countdown.is_finished();
                countdown.tick();
                draw(&timer_line(label, countdown))?;

                if countdown.is_finished() && !was_finished {
                    notify(&format!("{} timer finished.", label));
                    if !overtime {
                        return Ok(TimerEnd::Finished);
                    }
                }
            }
            result = &mut ctrl_c => {
                result?;
                return Ok(TimerEnd::Interrupted);
            }
        }
    }
}

fn timer_line(label: &str, countdown: &Countdown) -> String {
    if countdown.is_finished() {
        format!("{} DONE, {} elapsed", label, format_clock(countdown.elapsed_secs()))
    } else {
        format!(
            "{} {} [{:>3}%]",
            label,
            format_clock(countdown.remaining_secs()),
            countdown.progress_percent()
        )
    }
}

fn draw(line: &str) -> Result<()> {
    print!("\r{:<40}", line);
    io::stdout().flush()?;
    Ok(())
}

fn notify(body: &str) {
    if let Err(e) = Notification::new()
        .summary(NOTIFICATION_SUMMARY)
        .body(body)
        .show()
    {
        warn!(error = %e, "Desktop notification failed");
    }
}
