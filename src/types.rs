//! Core types for guidance projection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GuidanceError;

/// Path of the user-management operation guidance is projected for by default.
pub const DEFAULT_PATH: &str = "/api/users";

/// HTTP verb of an operation within a path item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl Verb {
    pub const ALL: [Verb; 8] = [
        Verb::Get,
        Verb::Put,
        Verb::Post,
        Verb::Delete,
        Verb::Options,
        Verb::Head,
        Verb::Patch,
        Verb::Trace,
    ];

    /// Key used for this verb inside an OpenAPI path item.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Put => "put",
            Verb::Post => "post",
            Verb::Delete => "delete",
            Verb::Options => "options",
            Verb::Head => "head",
            Verb::Patch => "patch",
            Verb::Trace => "trace",
        }
    }

    /// Parse an exact path-item key. Returns `None` for non-operation keys
    /// such as `parameters` or `summary`.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == key)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = String;

    /// Case-insensitive, so `POST` and `post` both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(&s.to_ascii_lowercase()).ok_or_else(|| format!("unknown verb \"{}\"", s))
    }
}

/// Business scenario a guidance contract is tailored for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UseCase {
    /// No adjustments beyond selection and pruning.
    #[default]
    Default,
    /// Strict client creation: the full retail profile is mandatory.
    ClientCreation,
    /// User creation, branching on the caller's first role.
    UserCreation,
    /// Lightweight client without contact or identification details.
    LightweightClient,
}

impl UseCase {
    pub const ALL: [UseCase; 4] = [
        UseCase::Default,
        UseCase::ClientCreation,
        UseCase::UserCreation,
        UseCase::LightweightClient,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UseCase::Default => "default",
            UseCase::ClientCreation => "client-creation",
            UseCase::UserCreation => "user-creation",
            UseCase::LightweightClient => "lightweight-client",
        }
    }
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UseCase {
    type Err = GuidanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|u| u.as_str() == normalized)
            .ok_or_else(|| GuidanceError::UnsupportedUseCase {
                value: s.to_string(),
            })
    }
}

/// Role a user holds. Serialized in camelCase, matching the enum values of
/// the `UserRole` component schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserRole {
    RetailUser,
    TradeSupervisor,
    TradeManager,
    ClientSupervisor,
    ClientManager,
}

impl UserRole {
    pub const ALL: [UserRole; 5] = [
        UserRole::RetailUser,
        UserRole::TradeSupervisor,
        UserRole::TradeManager,
        UserRole::ClientSupervisor,
        UserRole::ClientManager,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::RetailUser => "retailUser",
            UserRole::TradeSupervisor => "tradeSupervisor",
            UserRole::TradeManager => "tradeManager",
            UserRole::ClientSupervisor => "clientSupervisor",
            UserRole::ClientManager => "clientManager",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown role \"{}\"", s))
    }
}

/// Kind of identity document supplied by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdentificationType {
    None,
    DriversLicense,
    Passport,
}

/// Caller context selecting which policy edits apply.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Context {
    #[serde(default)]
    pub use_case: UseCase,
    #[serde(default)]
    pub roles: Vec<UserRole>,
}

impl Context {
    pub fn new(use_case: UseCase, roles: impl Into<Vec<UserRole>>) -> Self {
        Self {
            use_case,
            roles: roles.into(),
        }
    }

    /// The only role consulted by role-dependent policies.
    pub fn first_role(&self) -> Option<UserRole> {
        self.roles.first().copied()
    }
}

/// One atomic, idempotent schema edit addressed by component schema name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "edit", rename_all = "kebab-case")]
pub enum PolicyEdit {
    MarkRequired { schema: String, property: String },
    RemoveProperty { schema: String, property: String },
    LimitEnum { schema: String, allowed: Vec<String> },
}

impl PolicyEdit {
    pub fn mark_required(schema: &str, property: &str) -> Self {
        PolicyEdit::MarkRequired {
            schema: schema.to_string(),
            property: property.to_string(),
        }
    }

    pub fn remove_property(schema: &str, property: &str) -> Self {
        PolicyEdit::RemoveProperty {
            schema: schema.to_string(),
            property: property.to_string(),
        }
    }

    pub fn limit_enum(schema: &str, allowed: &[&str]) -> Self {
        PolicyEdit::LimitEnum {
            schema: schema.to_string(),
            allowed: allowed.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Name of the component schema this edit targets.
    pub fn schema(&self) -> &str {
        match self {
            PolicyEdit::MarkRequired { schema, .. }
            | PolicyEdit::RemoveProperty { schema, .. }
            | PolicyEdit::LimitEnum { schema, .. } => schema,
        }
    }
}

/// Options for a single projection.
#[derive(Debug, Clone)]
pub struct GuidanceOptions {
    /// Path to keep, matched case-insensitively.
    pub path: String,
    /// Operation to keep on that path.
    pub verb: Verb,
    /// Use-case and roles driving the policy edits.
    pub context: Context,
}

impl GuidanceOptions {
    /// Create options for `path`/`verb` with the default context.
    pub fn new(path: impl Into<String>, verb: Verb) -> Self {
        Self {
            path: path.into(),
            verb,
            context: Context::default(),
        }
    }

    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn use_case(mut self, use_case: UseCase) -> Self {
        self.context.use_case = use_case;
        self
    }

    pub fn roles(mut self, roles: impl Into<Vec<UserRole>>) -> Self {
        self.context.roles = roles.into();
        self
    }
}

impl Default for GuidanceOptions {
    fn default() -> Self {
        Self::new(DEFAULT_PATH, Verb::Post)
    }
}
