//! # Command Surface
//!
//! The complete set of commands the backend services must route, and which
//! service owns each of them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every command the system can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandName {
    Login,
    Registration,
    GetAllUsers,
    GetUser,
    EditUser,
    DeleteUser,
    CreateProfile,
    GetAllProfiles,
    GetProfile,
    EditProfile,
    DeleteProfile,
}

impl CommandName {
    /// All commands, in surface order.
    pub const ALL: [CommandName; 11] = [
        CommandName::Login,
        CommandName::Registration,
        CommandName::GetAllUsers,
        CommandName::GetUser,
        CommandName::EditUser,
        CommandName::DeleteUser,
        CommandName::CreateProfile,
        CommandName::GetAllProfiles,
        CommandName::GetProfile,
        CommandName::EditProfile,
        CommandName::DeleteProfile,
    ];

    /// Wire name of the command.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandName::Login => "login",
            CommandName::Registration => "registration",
            CommandName::GetAllUsers => "get-all-users",
            CommandName::GetUser => "get-user",
            CommandName::EditUser => "edit-user",
            CommandName::DeleteUser => "delete-user",
            CommandName::CreateProfile => "create-profile",
            CommandName::GetAllProfiles => "get-all-profiles",
            CommandName::GetProfile => "get-profile",
            CommandName::EditProfile => "edit-profile",
            CommandName::DeleteProfile => "delete-profile",
        }
    }

    /// Service whose queue this command is published on.
    pub fn service(&self) -> ServiceName {
        match self {
            CommandName::Login
            | CommandName::Registration
            | CommandName::GetAllUsers
            | CommandName::GetUser
            | CommandName::EditUser
            | CommandName::DeleteUser => ServiceName::Auth,
            CommandName::CreateProfile
            | CommandName::GetAllProfiles
            | CommandName::GetProfile
            | CommandName::EditProfile
            | CommandName::DeleteProfile => ServiceName::Profile,
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command name that is not part of the surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command: {0}")]
pub struct UnknownCommandName(pub String);

impl FromStr for CommandName {
    type Err = UnknownCommandName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandName::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCommandName(s.to_string()))
    }
}

/// Backend services reachable over the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceName {
    /// Users, credentials and tokens.
    Auth,
    /// Personal profiles.
    Profile,
}

impl ServiceName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceName::Auth => "auth",
            ServiceName::Profile => "profile",
        }
    }

    /// Queue name used when no override is configured.
    pub fn default_queue(&self) -> &'static str {
        match self {
            ServiceName::Auth => "auth_queue",
            ServiceName::Profile => "profile_queue",
        }
    }

    /// The commands this service must register a handler for.
    pub fn commands(&self) -> Vec<CommandName> {
        CommandName::ALL
            .iter()
            .copied()
            .filter(|c| c.service() == *self)
            .collect()
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
