//! Unvalidated draft of a user record, as posted to the guidance endpoint.

use serde::{Deserialize, Serialize};

use crate::types::{Context, IdentificationType, UseCase, UserRole};

/// Every field is optional: a draft is whatever the caller has so far.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification_type: Option<IdentificationType>,
    /// `null` and absent both mean no roles.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub roles: Vec<UserRole>,
}

impl UserDraft {
    /// Guidance context for this draft under `use_case`.
    pub fn context(&self, use_case: UseCase) -> Context {
        Context::new(use_case, self.roles.clone())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<UserRole>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Vec<UserRole>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
