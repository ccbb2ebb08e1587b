use serde::{Deserialize, Serialize};

/// Audit information shared by stored records.
#[derive(Debug, Serialize, Deserialize)]
pub struct Audit {
    /// When the record was created
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Version of the record
    ///
    /// minimum: 1
    pub version: u32,
}

/// Email address.
///
/// swagger:strfmt email
#[derive(Debug, Serialize, Deserialize)]
pub struct Email(pub String);

/// A label on a pet.
///
/// swagger:model tag
#[derive(Debug, Serialize, Deserialize)]
pub struct Tag {
    pub id: u64,
    /// pattern: ^[a-z]+$
    pub name: String,
}
