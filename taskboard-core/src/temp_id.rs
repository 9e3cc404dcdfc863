//! Temporary ids for tasks the server has not assigned an id to yet.

use uuid::Uuid;

pub const TEMP_ID_PREFIX: &str = "temp_";

/// A freshly minted placeholder id plus the correlation token it was built from.
///
/// The token is a UUIDv7: 48 bits of millisecond clock followed by random
/// bits, so two mints in one session do not collide in practice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemporaryId {
    token: String,
}

impl TemporaryId {
    pub fn mint() -> Self {
        Self {
            token: Uuid::now_v7().simple().to_string(),
        }
    }

    /// Correlation token carried in the optimistic marker.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The `temp_<token>` id the optimistic entry is stored under.
    pub fn id(&self) -> String {
        format!("{TEMP_ID_PREFIX}{}", self.token)
    }
}

pub fn is_temporary_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}
