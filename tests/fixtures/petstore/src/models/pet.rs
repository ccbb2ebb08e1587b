use super::common::{Audit, Tag};
use crate::models::common;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A pet in the store.
///
/// Pets are sold to customers.
///
/// swagger:model pet
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    #[serde(flatten)]
    pub audit: Audit,
    /// The id of the pet
    ///
    /// required: true
    pub id: u64,
    /// The name of the pet
    ///
    /// required: true
    /// minLength: 3
    /// maxLength: 20
    pub name: String,
    /// The photo urls
    ///
    /// minItems: 1
    /// itemsMinLength: 5
    pub photo_urls: Vec<String>,
    /// Tags of the pet
    pub tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<common::Email>,
    #[serde(skip)]
    pub cache: u32,
    pub attributes: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    pub struct Fixture {
        pub id: u64,
    }
}
