//! Searchable record kinds.
//!
//! Both kinds are owned by the inventory that created them; Scout only reads
//! their fields. Each exposes its fields through [`SearchRecord`] and ships a
//! default weight table tuned for it.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::config::FieldWeights;
use crate::interface::{Field, FieldValue, SearchRecord};

// ─────────────────────────────────────────────────────────────────────────────
// ACCOUNT MAPPINGS
// ─────────────────────────────────────────────────────────────────────────────

pub mod account_fields {
    pub const SOURCE_USERNAMES: &str = "source_usernames";
    pub const TARGET_HANDLE: &str = "target_handle";
    pub const OWNER: &str = "owner";
    pub const GROUP_NAME: &str = "group_name";
}

/// Identifiers dominate; owner and group only corroborate.
pub static ACCOUNT_WEIGHTS: Lazy<FieldWeights> = Lazy::new(|| {
    FieldWeights::new([
        (account_fields::SOURCE_USERNAMES, 1.24),
        (account_fields::TARGET_HANDLE, 1.2),
        (account_fields::OWNER, 0.92),
        (account_fields::GROUP_NAME, 0.72),
    ])
});

/// Mapping from one or more source-network usernames to a target handle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountCandidate {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub source_usernames: Vec<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
}

impl AccountCandidate {
    pub fn new(owner: impl Into<String>, source_usernames: Vec<String>) -> Self {
        Self {
            owner: owner.into(),
            source_usernames,
            target_handle: None,
            group_name: None,
        }
    }

    pub fn with_target_handle(mut self, handle: impl Into<String>) -> Self {
        self.target_handle = Some(handle.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group_name = Some(group.into());
        self
    }

    /// First source username, used as the record's primary identifier.
    pub fn primary_username(&self) -> &str {
        self.source_usernames.first().map_or("", String::as_str)
    }
}

impl SearchRecord for AccountCandidate {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new(account_fields::SOURCE_USERNAMES, FieldValue::list(&self.source_usernames)),
            Field::new(account_fields::TARGET_HANDLE, FieldValue::optional(self.target_handle.as_deref())),
            Field::new(account_fields::OWNER, FieldValue::Text(&self.owner)),
            Field::new(account_fields::GROUP_NAME, FieldValue::optional(self.group_name.as_deref())),
        ]
    }

    fn tie_break_key(&self) -> String {
        format!("{}-{}", self.owner, self.primary_username())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CROSSPOSTED MESSAGES
// ─────────────────────────────────────────────────────────────────────────────

pub mod post_fields {
    pub const SOURCE_USERNAME: &str = "source_username";
    pub const TEXT: &str = "text";
    pub const TARGET_HANDLE: &str = "target_handle";
    pub const OWNER: &str = "owner";
}

pub static POST_WEIGHTS: Lazy<FieldWeights> = Lazy::new(|| {
    FieldWeights::new([
        (post_fields::SOURCE_USERNAME, 1.24),
        (post_fields::TEXT, 1.2),
        (post_fields::TARGET_HANDLE, 0.92),
        (post_fields::OWNER, 0.72),
    ])
});

/// A message mirrored from a source network to a target account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostCandidate {
    pub source_id: String,
    #[serde(default)]
    pub source_username: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub target_handle: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

impl PostCandidate {
    pub fn new(
        source_id: impl Into<String>,
        source_username: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            source_username: source_username.into(),
            text: text.into(),
            target_handle: None,
            owner: None,
        }
    }

    pub fn with_target_handle(mut self, handle: impl Into<String>) -> Self {
        self.target_handle = Some(handle.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

impl SearchRecord for PostCandidate {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new(post_fields::SOURCE_USERNAME, FieldValue::Text(&self.source_username)),
            Field::new(post_fields::TEXT, FieldValue::Text(&self.text)),
            Field::new(post_fields::TARGET_HANDLE, FieldValue::optional(self.target_handle.as_deref())),
            Field::new(post_fields::OWNER, FieldValue::optional(self.owner.as_deref())),
        ]
    }

    fn tie_break_key(&self) -> String {
        format!("{}-{}", self.source_username, self.source_id)
    }
}
