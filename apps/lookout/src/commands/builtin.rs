use async_trait::async_trait;
use std::sync::Arc;

use super::profile::{ABOUT, CONTACT, SKILLS, SOCIALS};
use crate::sources::{SourceError, WeatherReport, WeatherSource};
use crate::zones::{format_wall, ZoneConfig};
use lookout_core::{
    format_position, CommandContext, CommandError, CommandHandler, DataState, Output, Theme,
};

const BAR_WIDTH: usize = 24;

pub(super) fn help(args: &[String], ctx: &CommandContext) -> Result<Output, CommandError> {
    if let Some(topic) = args.first() {
        let topic = lookout_core::fold_token(topic);
        let summary = ctx
            .commands()
            .iter()
            .find(|s| s.name == topic || s.aliases.contains(&topic));
        return Ok(match summary {
            Some(summary) => {
                let mut out = Output::new().with_field(&summary.name, &summary.description);
                if !summary.aliases.is_empty() {
                    out = out.with_field("Aliases", summary.aliases.join(", "));
                }
                out
            }
            None => Output::text(format!("No help available for '{topic}'.")),
        });
    }

    let mut out = Output::new().with_heading("Available commands:");
    for summary in ctx.commands() {
        out = out.with_field(&summary.name, &summary.description);
    }
    Ok(out)
}

pub(super) fn about(_: &[String], _: &CommandContext) -> Result<Output, CommandError> {
    Ok(Output::text(ABOUT))
}

pub(super) fn skills(_: &[String], _: &CommandContext) -> Result<Output, CommandError> {
    Ok(SKILLS
        .iter()
        .fold(Output::new(), |out, skill| out.with_item(*skill)))
}

pub(super) fn projects(_: &[String], ctx: &CommandContext) -> Result<Output, CommandError> {
    match ctx.repositories() {
        DataState::Pending => Ok(Output::text("Repositories are still loading, try again in a moment.")),
        DataState::Failed(reason) => Err(CommandError::Unavailable(reason.clone())),
        DataState::Ready(repos) if repos.is_empty() => Ok(Output::text("No public repositories yet.")),
        DataState::Ready(repos) => {
            let mut out = Output::new().with_heading("My top GitHub repositories:");
            for repo in repos {
                out = out.with_link(&repo.name, &repo.url).with_text(format!(
                    "  {}  ★ {}  ⑂ {}",
                    repo.description.as_deref().unwrap_or("No description"),
                    repo.stars,
                    repo.forks
                ));
            }
            Ok(out)
        }
    }
}

pub(super) fn socials(_: &[String], _: &CommandContext) -> Result<Output, CommandError> {
    Ok(SOCIALS.iter().fold(Output::new(), |out, social| {
        out.with_link(format!("{}: {}", social.network, social.handle), social.url)
    }))
}

pub(super) fn clear(_: &[String], ctx: &CommandContext) -> Result<Output, CommandError> {
    ctx.clear_transcript();
    Ok(Output::new())
}

/// `theme light|dark` sets, bare `theme` toggles, and the `light`/`dark`
/// aliases pick their own name.
pub(super) fn theme(args: &[String], ctx: &CommandContext) -> Result<Output, CommandError> {
    let next = match args.first() {
        Some(arg) => Theme::from_arg(arg),
        None => match ctx.invoked_as() {
            alias @ ("light" | "dark") => Theme::from_arg(alias),
            _ => ctx.theme().toggled(),
        },
    };
    ctx.set_theme(next);
    Ok(Output::text(format!("Theme set to {next}.")))
}

pub(super) fn music(_: &[String], ctx: &CommandContext) -> Result<Output, CommandError> {
    let Some(track) = ctx.presence().and_then(|p| p.track.as_ref()) else {
        return Ok(Output::text("No music is currently playing."));
    };

    let mut out = Output::new().with_heading("Now Playing:");
    out = match track.link() {
        Some(link) => out.with_link(track.display(), link),
        None => out.with_text(track.display()),
    };
    if let Some(album) = &track.album {
        out = out.with_field("Album", album);
    }
    if let (Some(percent), Some(total), Some(start)) =
        (ctx.progress(), track.duration_ms(), track.start)
    {
        let elapsed = ctx.now().timestamp_millis().saturating_sub(start);
        out = out.with_preformatted(format!(
            "{} {} ({percent:.0}%)",
            progress_bar(percent, BAR_WIDTH),
            format_position(elapsed, total)
        ));
    }
    Ok(out)
}

/// `[#####-----]` with `width` cells for a 0-100 percentage.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled.min(width)))
}

pub(super) fn ascii(_: &[String], ctx: &CommandContext) -> Result<Output, CommandError> {
    let shown = ctx.toggle_ascii();
    Ok(Output::text(if shown {
        "ASCII art shown."
    } else {
        "ASCII art hidden."
    }))
}

pub(super) fn echo(args: &[String], _: &CommandContext) -> Result<Output, CommandError> {
    Ok(Output::text(args.join(" ")))
}

pub(super) fn date(zones: &ZoneConfig, ctx: &CommandContext) -> Result<Output, CommandError> {
    let now = ctx.now();
    let local = format_wall(zones.local_wall(now));
    let delta = zones.delta(now);
    let place = zones.reference_place();

    if delta.is_same_clock() {
        return Ok(Output::new()
            .with_field("Current time", local)
            .with_text(format!("We're on the same clock! It's {place} time for both of us.")));
    }
    Ok(Output::new()
        .with_field(format!("Time in {place}"), format_wall(zones.reference_wall(now)))
        .with_field("Your time", local)
        .with_text(format!("{place} is {}.", delta.describe())))
}

pub(super) fn welcome(_: &[String], ctx: &CommandContext) -> Result<Output, CommandError> {
    let status = ctx
        .presence()
        .map(|presence| presence.status.label())
        .unwrap_or("Loading...");
    Ok(Output::new()
        .with_text("Welcome to my terminal!")
        .with_text("Type 'help' to see available commands.")
        .with_field("Current Discord status", status)
        .with_field("Contact", CONTACT))
}

/// Looks up current conditions; the only built-in that waits on the network.
pub struct WeatherCommand {
    source: Arc<dyn WeatherSource>,
    default_city: String,
}

impl WeatherCommand {
    pub fn new(source: Arc<dyn WeatherSource>, default_city: String) -> Self {
        Self {
            source,
            default_city,
        }
    }
}

#[async_trait]
impl CommandHandler for WeatherCommand {
    async fn run(&self, args: &[String], _ctx: &CommandContext) -> Result<Output, CommandError> {
        let city = if args.is_empty() {
            self.default_city.clone()
        } else {
            args.join(" ")
        };
        match self.source.current(&city).await {
            Ok(Some(report)) => Ok(render_weather(&report)),
            Ok(None) => Ok(Output::text(format!("Unable to fetch weather data for {city}."))),
            Err(SourceError::MissingApiKey) => Ok(Output::text(
                "Weather lookups are not configured; set OPENWEATHER_API_KEY.",
            )),
            Err(err) => Err(CommandError::Source(err.to_string())),
        }
    }
}

fn render_weather(report: &WeatherReport) -> Output {
    let place = match &report.country {
        Some(country) => format!("{}, {country}", report.city),
        None => report.city.clone(),
    };
    Output::new()
        .with_heading(format!("Weather in {place}"))
        .with_field("Temperature", format!("{}°C", report.temperature.round()))
        .with_field("Feels like", format!("{}°C", report.feels_like.round()))
        .with_field("Description", &report.description)
        .with_field("Humidity", format!("{}%", report.humidity))
        .with_field("Wind speed", format!("{} m/s", report.wind_speed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0, 4), "[----]");
        assert_eq!(progress_bar(50.0, 4), "[##--]");
        assert_eq!(progress_bar(100.0, 4), "[####]");
        assert_eq!(progress_bar(250.0, 4), "[####]");
    }

    #[test]
    fn weather_rounds_temperatures() {
        let out = render_weather(&WeatherReport {
            city: "London".into(),
            country: Some("GB".into()),
            temperature: 11.62,
            feels_like: 10.9,
            description: "light rain".into(),
            humidity: 81,
            wind_speed: 4.63,
        });
        assert_eq!(
            out.to_string(),
            "Weather in London, GB\nTemperature: 12°C\nFeels like: 11°C\nDescription: light rain\nHumidity: 81%\nWind speed: 4.63 m/s"
        );
    }
}
