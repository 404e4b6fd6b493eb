//! The shell's built-in command set.

mod builtin;
pub mod profile;

use std::sync::Arc;

use crate::sources::WeatherSource;
use crate::zones::ZoneConfig;
use lookout_core::{handler_fn, CommandRegistry, RegistryError};

pub use builtin::{progress_bar, WeatherCommand};

/// What the built-in handlers need beyond the command context.
#[derive(Clone)]
pub struct CommandDeps {
    pub weather: Arc<dyn WeatherSource>,
    pub default_city: String,
    pub zones: ZoneConfig,
}

const ALIASES: &[(&str, &str)] = &[
    ("repos", "projects"),
    ("ls", "help"),
    ("info", "about"),
    ("tech", "skills"),
    ("sm", "socials"),
    ("cls", "clear"),
    ("light", "theme"),
    ("dark", "theme"),
    ("np", "music"),
    ("time", "date"),
    ("hi", "welcome"),
];

/// Builds the frozen registry, commands in the order `help` lists them.
pub fn builtin_registry(deps: CommandDeps) -> Result<CommandRegistry, RegistryError> {
    let zones = deps.zones;
    let mut builder = CommandRegistry::builder();
    builder
        .register("help", "Get a list of all available commands", handler_fn(builtin::help))?
        .register("about", "About me", handler_fn(builtin::about))?
        .register("skills", "Check out the skills I have", handler_fn(builtin::skills))?
        .register("projects", "Some of my programming projects", handler_fn(builtin::projects))?
        .register("socials", "My social networks", handler_fn(builtin::socials))?
        .register("clear", "Clear the terminal", handler_fn(builtin::clear))?
        .register(
            "theme",
            "Change terminal theme (light/dark) or toggle if no argument is provided",
            handler_fn(builtin::theme),
        )?
        .register("music", "Display currently playing music", handler_fn(builtin::music))?
        .register("ascii", "Toggle ASCII art", handler_fn(builtin::ascii))?
        .register("echo", "Echo a message", handler_fn(builtin::echo))?
        .register(
            "date",
            "Display current date and time",
            handler_fn(move |_, ctx| builtin::date(&zones, ctx)),
        )?
        .register("welcome", "Display welcome message", handler_fn(builtin::welcome))?
        .register(
            "weather",
            "Get current weather information",
            Arc::new(WeatherCommand::new(deps.weather, deps.default_city)),
        )?;
    for (alias, target) in ALIASES {
        builder.alias(alias, target)?;
    }
    builder.build()
}
