//! Plain-text listings for `hikmat topics`, `hikmat history` and
//! `hikmat favorite`.

use std::error::Error;
use std::io::{self, Write};

use crate::core::app::App;
use crate::core::catalog::{filter_topics, find_topic, icon_glyph};
use crate::core::message::Sender;
use crate::core::preferences::{star_glyph, PreferenceStore};

pub fn list_topics(app: &App, query: Option<&str>) -> Result<(), Box<dyn Error>> {
    write_topics(&mut io::stdout(), &app.prefs, query.unwrap_or(""))?;
    Ok(())
}

pub fn write_topics<W: Write>(
    out: &mut W,
    prefs: &PreferenceStore,
    query: &str,
) -> io::Result<()> {
    let categories = filter_topics(query);
    if categories.is_empty() {
        writeln!(out, "No topics match \"{query}\"")?;
        return Ok(());
    }

    for (index, (category, topics)) in categories.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{category}:")?;
        for topic in topics {
            writeln!(
                out,
                "  {} {} {}",
                star_glyph(prefs.is_favorite(topic.name)),
                icon_glyph(topic.icon),
                topic.name
            )?;
        }
    }

    let favorites = prefs.favorites();
    if !favorites.is_empty() {
        writeln!(out, "\nFavorites: {}", favorites.join(", "))?;
    }
    Ok(())
}

pub fn print_history(app: &App) -> Result<(), Box<dyn Error>> {
    write_history(&mut io::stdout(), app)?;
    Ok(())
}

pub fn write_history<W: Write>(out: &mut W, app: &App) -> io::Result<()> {
    for (index, message) in app.transcript.messages().iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        let label = match message.sender {
            Sender::User => "You",
            Sender::Bot | Sender::BotInitial => "Hikmat",
        };
        writeln!(out, "{label}: {}", message.text)?;
    }
    Ok(())
}

/// Toggle a catalog topic's favorite flag, returning whether it is now a
/// favorite.
pub fn toggle_favorite(app: &mut App, name: &str) -> Result<bool, Box<dyn Error>> {
    let topic = find_topic(name.trim()).ok_or_else(|| format!("Unknown topic: {name}"))?;
    Ok(app.prefs.toggle_favorite(topic.name)?)
}
