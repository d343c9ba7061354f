use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::fmt::Display;
use tera::{Context, Error as TeraError, Tera};

pub const SUPPORT_ASSISTANT_PROMPT: &str = concat!(
    "You are a helpful customer support assistant for a retail store. ",
    " Use the provided tools to search company policies, and other information to assist the user's queries. ",
    " When searching, be persistent. Expand your query bounds if the first search returns no results. ",
    " If a search comes up empty, expand your search before giving up.",
    "\nCurrent time: {{ time }}."
);

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

#[derive(Serialize)]
struct SupportContext {
    time: String,
}

/// Render the support assistant system prompt for the given moment.
pub fn support_system_prompt<Tz>(now: &DateTime<Tz>) -> Result<String, TeraError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let context = SupportContext {
        time: now.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
    };
    load_prompt(SUPPORT_ASSISTANT_PROMPT, &context)
}
