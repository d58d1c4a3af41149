//! Prompt text and response schemas for the assistant

use serde_json::{Value, json};

use super::DEFAULT_CONTEXT;
use crate::error::Result;
use crate::profile::UserProfile;
use crate::schedule::ScheduleItem;
use crate::task::Task;

/// Sampling temperature for schedule generation
pub const SCHEDULE_TEMPERATURE: f32 = 0.3;
/// Sampling temperature for task breakdowns
pub const BREAKDOWN_TEMPERATURE: f32 = 0.4;
/// Aspect ratio requested for infographics
pub const INFOGRAPHIC_ASPECT_RATIO: &str = "16:9";

pub fn schedule_prompt(tasks: &[Task], profile: &UserProfile, context: Option<&str>) -> Result<String> {
    let context = context
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CONTEXT);
    let tasks_json = serde_json::to_string(tasks)?;

    Ok(format!(
        r#"You are LOCK IN, a productivity scheduler with a Gen Z voice.

User profile:
- Wakes up: {wake}
- Sleeps: {sleep}
- Most productive: {productive}

User strategy:
<context>
{context}
</context>

Pacing follows the strategy. "Deep Work", "Grind" or "Focus" means longer
blocks and fewer breaks. "Chill", "Light" or "Recovery" means more frequent
"Touch Grass" breaks. Anything else gets a balanced day.

Tasks:
<tasks>
{tasks_json}
</tasks>

Build a timeline for today from these tasks:
1. Stay between the wake and sleep times.
2. Put High priority and High energy tasks in the peak hours.
3. Add 5-15 minute breaks between deep work blocks, named "Touch Grass" or "Vibe Check".
4. Batch similar tasks together.
5. Schedule high priority tasks first.
6. If the day is overbooked, suggest pushing low priority tasks to tomorrow.
7. Write each description as short hype in Gen Z slang.

Every work slot must use the id of the task it places as taskId. Break slots
use "break" as taskId and set isBreak to true.

Return a JSON array of schedule items."#,
        wake = profile.wake_up_time,
        sleep = profile.sleep_time,
        productive = profile.productive_hours,
    ))
}

pub fn breakdown_prompt(title: &str) -> String {
    format!(
        r#"This task is too big to start:
<task_description>
{title}
</task_description>

Split it into 3 to 6 smaller sub-tasks that can each be acted on right away.
For each one estimate the duration in minutes, the priority (High, Medium,
Low), the energy required (High, Medium, Low) and the category (Work,
Study, Health, Personal, Break). Keep titles short and concrete."#
    )
}

pub fn nudge_prompt(completed: usize, remaining: usize) -> String {
    format!(
        "The user finished {completed} tasks and has {remaining} to go. \
         Reply with one short motivational sentence in Gen Z slang \
         (locked in, cooked, main character, W, bet, no cap, slay). \
         For example: \"You're entering your academic weapon era, no cap.\""
    )
}

pub fn roast_prompt(schedule: &[ScheduleItem]) -> Result<String> {
    let schedule_json = serde_json::to_string(schedule)?;
    Ok(format!(
        r#"Roast this schedule. Be savage and funny and use Gen Z slang.
Point out bad habits like too many breaks, impossible work blocks or odd
task combinations, and say whether the user is "cooked" or "delusional".

Schedule:
{schedule_json}

Three sentences at most."#
    ))
}

pub fn brain_dump_prompt(text: &str) -> String {
    format!(
        r#"Here is a brain dump:
<yap_text>
{text}
</yap_text>

Sum up the vibe in one sentence of slang, then list any actionable tasks
hidden in it with a priority of High, Medium or Low."#
    )
}

pub fn infographic_prompt(schedule: &[ScheduleItem]) -> String {
    let lines: Vec<String> = schedule
        .iter()
        .map(|s| format!("{}: {} ({})", s.time_slot, s.title, s.category))
        .collect();

    format!(
        r#"Draw a clean infographic timetable for this schedule.

Style: dark background with neon accents, crisp lines, a retro-futuristic
game HUD look, bold sans-serif type, landscape 16:9 with a horizontal
timeline or grid. Title it "LOCK IN DAILY LOG".

Schedule:
{}"#,
        lines.join("\n")
    )
}

pub fn playlist_prompt(url: &str) -> String {
    format!(
        r#"Find the title and the video titles of this YouTube playlist using search:
<playlist_url>
{url}
</playlist_url>

Answer with raw JSON only, no markdown, shaped like:
{{"playlistTitle": "Title", "videos": [{{"title": "First video", "number": 1}}]}}"#
    )
}

pub fn schedule_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "timeSlot": { "type": "STRING", "description": "Start and end, e.g. '09:00 - 10:00'" },
                "taskId": { "type": "STRING", "description": "ID of the placed task, or 'break'" },
                "title": { "type": "STRING" },
                "category": { "type": "STRING" },
                "description": { "type": "STRING", "description": "Short reason for the placement" },
                "isBreak": { "type": "BOOLEAN" }
            },
            "required": ["timeSlot", "title", "category", "description", "isBreak"]
        }
    })
}

pub fn subtask_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "durationMinutes": { "type": "NUMBER" },
                "category": { "type": "STRING" },
                "priority": { "type": "STRING", "description": "High, Medium or Low" },
                "energyRequired": { "type": "STRING", "description": "High, Medium or Low" }
            },
            "required": ["title", "durationMinutes", "category", "priority", "energyRequired"]
        }
    })
}

pub fn brain_dump_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "tasks": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "priority": { "type": "STRING", "description": "High, Medium or Low" }
                    }
                }
            }
        }
    })
}
