use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionKind {
    Integer,
    String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandOption {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: OptionKind,
    pub required: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub options: Vec<CommandOption>,
}

impl CommandSpec {
    pub fn usage(&self) -> String {
        let mut usage = format!("/{}", self.name);
        for option in &self.options {
            usage.push_str(&format!(" <{}>", option.name));
        }
        usage
    }
}

/// The full command set published to the workspace.
pub fn command_manifest() -> Vec<CommandSpec> {
    vec![
        CommandSpec {
            name: "sync",
            description: "Re-register the bot's commands (owner only)",
            options: Vec::new(),
        },
        CommandSpec {
            name: "info",
            description: "Show price, stock and links for a product",
            options: vec![CommandOption {
                name: "code",
                description: "6 digit product code",
                kind: OptionKind::Integer,
                required: true,
            }],
        },
        CommandSpec {
            name: "storestockcheck",
            description: "Show in-store stock near a location",
            options: vec![
                CommandOption {
                    name: "code",
                    description: "6 digit product code",
                    kind: OptionKind::Integer,
                    required: true,
                },
                CommandOption {
                    name: "location",
                    description: "Town, city or postcode to search around",
                    kind: OptionKind::String,
                    required: true,
                },
            ],
        },
    ]
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrarError {
    #[error("command registration rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait CommandRegistrar: Send + Sync {
    /// Replaces the published command set. Returns how many commands are live.
    async fn register(&self, commands: &[CommandSpec]) -> Result<usize, RegistrarError>;
}

/// Keeps the published command set in process. Slack itself owns the slash
/// command definitions, so this is what `/help` and the health check read.
#[derive(Default)]
pub struct LocalCommandRegistry {
    commands: RwLock<Vec<CommandSpec>>,
}

impl LocalCommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn registered(&self) -> Vec<CommandSpec> {
        self.commands.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.commands.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.commands.read().await.is_empty()
    }
}

#[async_trait]
impl CommandRegistrar for LocalCommandRegistry {
    async fn register(&self, commands: &[CommandSpec]) -> Result<usize, RegistrarError> {
        let mut names = HashSet::new();
        if let Some(duplicate) = commands.iter().find(|command| !names.insert(command.name)) {
            return Err(RegistrarError::Rejected(format!(
                "command `/{}` is declared more than once",
                duplicate.name
            )));
        }

        let mut registered = self.commands.write().await;
        *registered = commands.to_vec();
        info!(
            event_name = "slack.commands.registered",
            command_count = registered.len(),
            "command manifest registered"
        );
        Ok(registered.len())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        command_manifest, CommandRegistrar, LocalCommandRegistry, OptionKind, RegistrarError,
    };

    #[test]
    fn manifest_declares_three_commands_with_typed_options() {
        let manifest = command_manifest();
        let names = manifest.iter().map(|command| command.name).collect::<Vec<_>>();
        assert_eq!(names, vec!["sync", "info", "storestockcheck"]);

        let stock = &manifest[2];
        assert_eq!(stock.options[0].kind, OptionKind::Integer);
        assert_eq!(stock.options[1].kind, OptionKind::String);
        assert!(stock.options.iter().all(|option| option.required));
        assert_eq!(stock.usage(), "/storestockcheck <code> <location>");
    }

    #[tokio::test]
    async fn registering_twice_replaces_rather_than_duplicates() {
        let registry = LocalCommandRegistry::new();
        assert!(registry.is_empty().await);

        let first = registry.register(&command_manifest()).await.expect("first register");
        let second = registry.register(&command_manifest()).await.expect("second register");

        assert_eq!(first, 3);
        assert_eq!(second, 3);
        assert_eq!(registry.len().await, 3);
        assert_eq!(registry.registered().await, command_manifest());
    }

    #[tokio::test]
    async fn duplicate_command_names_are_rejected_and_keep_the_live_set() {
        let registry = LocalCommandRegistry::new();
        registry.register(&command_manifest()).await.expect("register");

        let mut manifest = command_manifest();
        manifest.push(manifest[1].clone());
        let error = registry.register(&manifest).await.expect_err("duplicate");

        assert_eq!(
            error,
            RegistrarError::Rejected("command `/info` is declared more than once".to_owned())
        );
        assert_eq!(registry.registered().await, command_manifest());
    }
}
