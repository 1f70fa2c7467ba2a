//! Context-keyed policy table.
//!
//! A table maps (use-case, role predicate) to an ordered list of schema
//! edits. The built-in table encodes the user-management business rules:
//!
//! | Use case | Roles | Edits |
//! |----------|-------|-------|
//! | `default` | any | none |
//! | `client-creation` | any | retail profile required, `retailUser` role only |
//! | `user-creation` | none | `userName`, `email` required |
//! | `user-creation` | first is `retailUser` | retail profile required, `retailUser`, `passport` |
//! | `user-creation` | first is another role | address and identification removed, staff roles |
//! | `lightweight-client` | any | contact and identification removed, `retailUser` only |
//!
//! Only the first role is consulted. A multi-role caller whose first role is
//! `tradeManager` gets the staff branch even if `retailUser` follows.
//!
//! The staff branch of `user-creation` marks nothing required. The legacy
//! service required `userName` and `email` on every `user-creation` request
//! before branching on role; this table leaves that to the retail and
//! no-role rows.
//!
//! Tables can also be loaded from YAML or JSON. Role predicates are written
//! as a bare name (`any`, `no-roles`) or a single-key map:
//!
//! ```yaml
//! rules:
//!   - use-case: user-creation
//!     when:
//!       first-role-is-not: retailUser
//!     edits:
//!       - edit: limit-enum
//!         schema: UserRole
//!         allowed: [tradeManager]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GuidanceError, LoadError};
use crate::loader::read_source;
use crate::types::{Context, PolicyEdit, UseCase, UserRole};

/// Component schema describing a user record.
pub const USER_SCHEMA: &str = "User";
/// Component schema enumerating roles.
pub const USER_ROLE_SCHEMA: &str = "UserRole";
/// Component schema enumerating identification document kinds.
pub const IDENTIFICATION_TYPE_SCHEMA: &str = "IdentificationType";

const RETAIL_PROFILE: [&str; 6] = [
    "userName",
    "email",
    "address",
    "zipCode",
    "identificationType",
    "roles",
];

const STAFF_ROLES: [&str; 4] = [
    "tradeSupervisor",
    "tradeManager",
    "clientSupervisor",
    "clientManager",
];

/// Condition on the caller's roles. Only the first role is inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RolePredicate {
    #[default]
    Any,
    NoRoles,
    FirstRoleIs(UserRole),
    FirstRoleIsNot(UserRole),
}

impl RolePredicate {
    pub fn matches(&self, context: &Context) -> bool {
        match self {
            RolePredicate::Any => true,
            RolePredicate::NoRoles => context.roles.is_empty(),
            RolePredicate::FirstRoleIs(role) => context.first_role() == Some(*role),
            RolePredicate::FirstRoleIsNot(role) => {
                matches!(context.first_role(), Some(first) if first != *role)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolicyRule {
    pub use_case: UseCase,
    #[serde(default)]
    pub when: RolePredicate,
    #[serde(default)]
    pub edits: Vec<PolicyEdit>,
}

impl PolicyRule {
    pub fn new(use_case: UseCase, when: RolePredicate, edits: Vec<PolicyEdit>) -> Self {
        Self {
            use_case,
            when,
            edits,
        }
    }
}

/// Ordered rules; the first rule matching a context wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyTable {
    pub rules: Vec<PolicyRule>,
}

impl PolicyTable {
    /// The user-management rules described in the module docs.
    pub fn builtin() -> Self {
        let required = |props: &[&str]| -> Vec<PolicyEdit> {
            props
                .iter()
                .map(|p| PolicyEdit::mark_required(USER_SCHEMA, p))
                .collect()
        };
        let removed = |props: &[&str]| -> Vec<PolicyEdit> {
            props
                .iter()
                .map(|p| PolicyEdit::remove_property(USER_SCHEMA, p))
                .collect()
        };
        let retail_only = PolicyEdit::limit_enum(USER_ROLE_SCHEMA, &["retailUser"]);

        let mut client_creation = required(&RETAIL_PROFILE);
        client_creation.push(retail_only.clone());

        let mut retail_user = required(&RETAIL_PROFILE);
        retail_user.push(retail_only.clone());
        retail_user.push(PolicyEdit::limit_enum(
            IDENTIFICATION_TYPE_SCHEMA,
            &["passport"],
        ));

        let mut staff_user = removed(&["address", "zipCode", "identificationType"]);
        staff_user.push(PolicyEdit::limit_enum(USER_ROLE_SCHEMA, &STAFF_ROLES));

        let mut lightweight = removed(&["email", "address", "zipCode", "identificationType"]);
        lightweight.push(retail_only);

        Self {
            rules: vec![
                PolicyRule::new(UseCase::Default, RolePredicate::Any, Vec::new()),
                PolicyRule::new(UseCase::ClientCreation, RolePredicate::Any, client_creation),
                PolicyRule::new(
                    UseCase::UserCreation,
                    RolePredicate::NoRoles,
                    required(&["userName", "email"]),
                ),
                PolicyRule::new(
                    UseCase::UserCreation,
                    RolePredicate::FirstRoleIs(UserRole::RetailUser),
                    retail_user,
                ),
                PolicyRule::new(
                    UseCase::UserCreation,
                    RolePredicate::FirstRoleIsNot(UserRole::RetailUser),
                    staff_user,
                ),
                PolicyRule::new(UseCase::LightweightClient, RolePredicate::Any, lightweight),
            ],
        }
    }

    /// Parse a table from YAML.
    ///
    /// The text is read into a JSON value first so that role predicates use
    /// the same single-key map form in both syntaxes.
    pub fn from_yaml_str(content: &str) -> Result<Self, LoadError> {
        let value: serde_json::Value =
            serde_yaml::from_str(content).map_err(|source| LoadError::InvalidYaml { source })?;
        serde_json::from_value(value).map_err(|source| LoadError::InvalidPolicy { source })
    }

    pub fn from_json_str(content: &str) -> Result<Self, LoadError> {
        serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
    }

    /// Edits for `context`, in application order.
    ///
    /// # Errors
    ///
    /// `UnsupportedUseCase` if the table has no rule at all for the
    /// context's use-case. A use-case whose rules all fail their role
    /// predicate resolves to no edits.
    pub fn resolve(&self, context: &Context) -> Result<Vec<PolicyEdit>, GuidanceError> {
        let mut known = false;
        for rule in self.rules.iter().filter(|r| r.use_case == context.use_case) {
            known = true;
            if rule.when.matches(context) {
                debug!(
                    use_case = %context.use_case,
                    when = ?rule.when,
                    edits = rule.edits.len(),
                    "resolved policy"
                );
                return Ok(rule.edits.clone());
            }
        }
        if known {
            Ok(Vec::new())
        } else {
            Err(GuidanceError::UnsupportedUseCase {
                value: context.use_case.to_string(),
            })
        }
    }
}

/// Resolve edits for a use-case and roles against the built-in table.
pub fn resolve(use_case: UseCase, roles: &[UserRole]) -> Result<Vec<PolicyEdit>, GuidanceError> {
    PolicyTable::builtin().resolve(&Context::new(use_case, roles.to_vec()))
}

/// Load a policy table from a YAML (`.yaml`/`.yml`) or JSON file.
pub fn load_policy_table(path: &Path) -> Result<PolicyTable, LoadError> {
    let content = read_source(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => PolicyTable::from_json_str(&content),
        _ => PolicyTable::from_yaml_str(&content),
    }
}
