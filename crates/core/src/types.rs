//! Core types for fieldsnap
//!
//! This module defines the foundational types:
//! - OwnerKind: Which kind of entity a field value is attached to
//! - OwnerRef: Address of a field value inside the field store
//! - parse_owner_id: Validation of raw owner ids taken from a document

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of entity a field value belongs to
///
/// The string form (`"post"`, `"taxonomy"`, ...) is the context name handed
/// to extension points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    /// A post of any post type
    Post,
    /// A term in a taxonomy
    Taxonomy,
    /// A user account
    User,
    /// A comment
    Comment,
    /// The site-wide option scope
    Option,
}

impl OwnerKind {
    /// Context name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::Post => "post",
            OwnerKind::Taxonomy => "taxonomy",
            OwnerKind::User => "user",
            OwnerKind::Comment => "comment",
            OwnerKind::Option => "option",
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of a field value in the field store
///
/// The `Display` form is the store address:
/// - post: `"5"`
/// - term: `"category_3"`
/// - user: `"user_7"`
/// - comment: `"comment_9"`
/// - option: `"option"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OwnerRef {
    /// Post id
    Post {
        /// Post id (positive)
        id: u64,
    },
    /// Term id within a taxonomy
    Term {
        /// Taxonomy name
        taxonomy: String,
        /// Term id (positive)
        id: u64,
    },
    /// User id
    User {
        /// User id (positive)
        id: u64,
    },
    /// Comment id
    Comment {
        /// Comment id (positive)
        id: u64,
    },
    /// Site-wide option scope
    Option,
}

impl OwnerRef {
    /// Reference a post
    pub fn post(id: u64) -> Self {
        OwnerRef::Post { id }
    }

    /// Reference a term in a taxonomy
    pub fn term(taxonomy: impl Into<String>, id: u64) -> Self {
        OwnerRef::Term {
            taxonomy: taxonomy.into(),
            id,
        }
    }

    /// Reference a user
    pub fn user(id: u64) -> Self {
        OwnerRef::User { id }
    }

    /// Reference a comment
    pub fn comment(id: u64) -> Self {
        OwnerRef::Comment { id }
    }

    /// Kind of entity this reference points at
    pub fn kind(&self) -> OwnerKind {
        match self {
            OwnerRef::Post { .. } => OwnerKind::Post,
            OwnerRef::Term { .. } => OwnerKind::Taxonomy,
            OwnerRef::User { .. } => OwnerKind::User,
            OwnerRef::Comment { .. } => OwnerKind::Comment,
            OwnerRef::Option => OwnerKind::Option,
        }
    }

    /// Numeric id, `None` for the option scope
    pub fn id(&self) -> Option<u64> {
        match self {
            OwnerRef::Post { id }
            | OwnerRef::Term { id, .. }
            | OwnerRef::User { id }
            | OwnerRef::Comment { id } => Some(*id),
            OwnerRef::Option => None,
        }
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerRef::Post { id } => write!(f, "{}", id),
            OwnerRef::Term { taxonomy, id } => write!(f, "{}_{}", taxonomy, id),
            OwnerRef::User { id } => write!(f, "user_{}", id),
            OwnerRef::Comment { id } => write!(f, "comment_{}", id),
            OwnerRef::Option => f.write_str("option"),
        }
    }
}

/// Parse an owner id taken from a document key
///
/// # Errors
///
/// Returns `Error::InvalidOwnerId` unless `raw` is a positive integer.
pub fn parse_owner_id(raw: &str) -> Result<u64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id as u64),
        _ => Err(Error::InvalidOwnerId {
            raw: raw.to_string(),
        }),
    }
}
