use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::context::{CommandContext, CommandSummary};
use crate::error::{CommandError, RegistryError};
use crate::fold_token;
use crate::output::Output;

/// Behaviour behind a command name.
///
/// Handlers only see their arguments and a read-only [`CommandContext`]; they
/// cannot reach the history, the alias table or the registry.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, args: &[String], ctx: &CommandContext) -> Result<Output, CommandError>;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F> CommandHandler for FnHandler<F>
where
    F: Fn(&[String], &CommandContext) -> Result<Output, CommandError> + Send + Sync,
{
    async fn run(&self, args: &[String], ctx: &CommandContext) -> Result<Output, CommandError> {
        (self.0)(args, ctx)
    }
}

/// Wraps a synchronous closure as a [`CommandHandler`].
pub fn handler_fn<F>(f: F) -> Arc<dyn CommandHandler>
where
    F: Fn(&[String], &CommandContext) -> Result<Output, CommandError> + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}

/// A canonical command as stored in the registry.
#[derive(Clone)]
pub struct RegisteredCommand {
    name: String,
    description: String,
    handler: Arc<dyn CommandHandler>,
}

impl RegisteredCommand {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }
}

impl fmt::Debug for RegisteredCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCommand")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Result of looking a token up. Unknown commands are ordinary input, so this
/// is not an error.
#[derive(Debug, Clone, Copy)]
pub enum Resolution<'a> {
    Command(&'a RegisteredCommand),
    NotFound,
}

impl<'a> Resolution<'a> {
    pub fn command(self) -> Option<&'a RegisteredCommand> {
        match self {
            Resolution::Command(command) => Some(command),
            Resolution::NotFound => None,
        }
    }
}

/// Collects commands and aliases before freezing them into a
/// [`CommandRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    commands: Vec<RegisteredCommand>,
    index: HashMap<String, usize>,
    aliases: HashMap<String, String>,
    alias_order: Vec<String>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a canonical command. Names are compared case-insensitively.
    pub fn register(
        &mut self,
        name: &str,
        description: &str,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<&mut Self, RegistryError> {
        let name = validate_name(name)?;
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateCommand(name));
        }
        if self.aliases.contains_key(&name) {
            return Err(RegistryError::AliasCollision(name));
        }
        self.index.insert(name.clone(), self.commands.len());
        self.commands.push(RegisteredCommand {
            name,
            description: description.to_owned(),
            handler,
        });
        Ok(self)
    }

    /// Maps `alias` onto the canonical command `target`.
    pub fn alias(&mut self, alias: &str, target: &str) -> Result<&mut Self, RegistryError> {
        let alias = validate_name(alias)?;
        let target = fold_token(target);
        if self.index.contains_key(&alias) {
            return Err(RegistryError::AliasCollision(alias));
        }
        if self.aliases.contains_key(&alias) {
            return Err(RegistryError::DuplicateAlias(alias));
        }
        self.alias_order.push(alias.clone());
        self.aliases.insert(alias, target);
        Ok(self)
    }

    /// Freezes the registry. Every alias must point at a canonical command,
    /// which keeps resolution to a single hop.
    pub fn build(self) -> Result<CommandRegistry, RegistryError> {
        for alias in &self.alias_order {
            let target = &self.aliases[alias];
            if !self.index.contains_key(target) {
                return Err(RegistryError::UnknownAliasTarget {
                    alias: alias.clone(),
                    target: target.clone(),
                });
            }
        }
        Ok(CommandRegistry {
            commands: self.commands,
            index: self.index,
            aliases: self.aliases,
            alias_order: self.alias_order,
        })
    }
}

fn validate_name(name: &str) -> Result<String, RegistryError> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(RegistryError::InvalidName(name.to_owned()));
    }
    Ok(fold_token(name))
}

/// Immutable command table shared by the dispatcher.
pub struct CommandRegistry {
    commands: Vec<RegisteredCommand>,
    index: HashMap<String, usize>,
    aliases: HashMap<String, String>,
    alias_order: Vec<String>,
}

impl CommandRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Looks up a token: alias table first, then the canonical commands.
    pub fn resolve(&self, token: &str) -> Resolution<'_> {
        let token = fold_token(token);
        let name = self.aliases.get(&token).unwrap_or(&token);
        match self.index.get(name) {
            Some(&idx) => Resolution::Command(&self.commands[idx]),
            None => Resolution::NotFound,
        }
    }

    /// Canonical commands in registration order. Aliases are not listed.
    pub fn list_visible(&self) -> impl Iterator<Item = &RegisteredCommand> {
        self.commands.iter()
    }

    pub fn summaries(&self) -> Vec<CommandSummary> {
        self.list_visible()
            .map(|command| CommandSummary {
                name: command.name.clone(),
                description: command.description.clone(),
                aliases: self.aliases_of(&command.name),
            })
            .collect()
    }

    /// Aliases pointing at `name`, in the order they were declared.
    pub fn aliases_of(&self, name: &str) -> Vec<String> {
        let name = fold_token(name);
        self.alias_order
            .iter()
            .filter(|alias| self.aliases.get(*alias) == Some(&name))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.commands)
            .field("aliases", &self.aliases)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Arc<dyn CommandHandler> {
        handler_fn(|_, _| Ok(Output::new()))
    }

    fn sample() -> CommandRegistry {
        let mut builder = CommandRegistry::builder();
        builder
            .register("help", "List commands", noop())
            .and_then(|b| b.register("about", "About me", noop()))
            .and_then(|b| b.register("music", "Now playing", noop()))
            .and_then(|b| b.alias("ls", "help"))
            .and_then(|b| b.alias("np", "music"))
            .and_then(|b| b.alias("info", "about"))
            .expect("sample registry");
        builder.build().expect("sample registry builds")
    }

    #[test]
    fn alias_and_canonical_share_handler() {
        let registry = sample();
        for (alias, canonical) in [("ls", "help"), ("np", "music"), ("info", "about")] {
            let via_alias = registry.resolve(alias).command().expect("alias resolves");
            let direct = registry.resolve(canonical).command().expect("command resolves");
            assert_eq!(via_alias.name(), canonical);
            assert!(Arc::ptr_eq(via_alias.handler(), direct.handler()));
        }
    }

    #[test]
    fn resolution_is_case_insensitive() {
        let registry = sample();
        assert_eq!(registry.resolve("HeLp").command().map(|c| c.name()), Some("help"));
        assert_eq!(registry.resolve("NP").command().map(|c| c.name()), Some("music"));
    }

    #[test]
    fn unknown_token_is_not_found() {
        let registry = sample();
        assert!(matches!(registry.resolve("xyz123"), Resolution::NotFound));
    }

    #[test]
    fn duplicate_command_is_rejected_case_insensitively() {
        let mut builder = CommandRegistry::builder();
        builder.register("help", "a", noop()).expect("first registration");
        let err = builder.register("HELP", "b", noop()).err();
        assert_eq!(err, Some(RegistryError::DuplicateCommand("help".into())));
    }

    #[test]
    fn alias_may_not_shadow_a_command() {
        let mut builder = CommandRegistry::builder();
        builder.register("help", "a", noop()).expect("registration");
        builder.register("about", "b", noop()).expect("registration");
        let err = builder.alias("about", "help").err();
        assert_eq!(err, Some(RegistryError::AliasCollision("about".into())));

        builder.alias("ls", "help").expect("alias");
        let err = builder.register("ls", "c", noop()).err();
        assert_eq!(err, Some(RegistryError::AliasCollision("ls".into())));

        let err = builder.alias("LS", "about").err();
        assert_eq!(err, Some(RegistryError::DuplicateAlias("ls".into())));
    }

    #[test]
    fn aliases_must_target_canonical_commands() {
        let mut builder = CommandRegistry::builder();
        builder.register("help", "a", noop()).expect("registration");
        builder.alias("ls", "help").expect("alias");
        builder.alias("dir", "ls").expect("alias accepted until build");
        let err = builder.build().err();
        assert_eq!(
            err,
            Some(RegistryError::UnknownAliasTarget {
                alias: "dir".into(),
                target: "ls".into(),
            })
        );
    }

    #[test]
    fn names_must_be_single_words() {
        let mut builder = CommandRegistry::builder();
        assert!(matches!(
            builder.register("two words", "x", noop()).err(),
            Some(RegistryError::InvalidName(_))
        ));
        assert!(matches!(
            builder.alias("", "x").err(),
            Some(RegistryError::InvalidName(_))
        ));
    }

    #[test]
    fn visible_listing_keeps_registration_order_and_hides_aliases() {
        let registry = sample();
        let names: Vec<_> = registry.list_visible().map(|c| c.name().to_owned()).collect();
        assert_eq!(names, ["help", "about", "music"]);
        let summaries = registry.summaries();
        assert_eq!(summaries[0].aliases, ["ls"]);
        assert_eq!(summaries[2].aliases, ["np"]);
    }
}
