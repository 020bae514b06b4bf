// Owner-name resolution.
//
// Upstream user records carry an optional display name and an optional
// username. Rosters point at users by id and may have no owner at all.
// The order in which those sources are tried lives in one place so that
// every report names managers the same way.

use crate::model::TeamId;

/// A field of an upstream user record that can supply a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameField {
    DisplayName,
    Username,
}

/// Order in which user fields are consulted.
pub const OWNER_NAME_ORDER: &[NameField] = &[NameField::DisplayName, NameField::Username];

/// The name-bearing parts of an upstream user.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameSources<'a> {
    pub user_id: &'a str,
    pub display_name: Option<&'a str>,
    pub username: Option<&'a str>,
}

impl<'a> NameSources<'a> {
    fn field(&self, field: NameField) -> Option<&'a str> {
        match field {
            NameField::DisplayName => self.display_name,
            NameField::Username => self.username,
        }
    }
}

/// Resolve a user's name by walking `order`; blank values are skipped.
/// Falls back to `User_<id>`.
pub fn resolve_user_name(sources: &NameSources<'_>, order: &[NameField]) -> String {
    order
        .iter()
        .filter_map(|&field| sources.field(field))
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| user_placeholder(sources.user_id))
}

/// Resolve with the standard [`OWNER_NAME_ORDER`].
pub fn user_name(sources: &NameSources<'_>) -> String {
    resolve_user_name(sources, OWNER_NAME_ORDER)
}

/// Name shown for a roster whose owner is unknown.
pub fn team_placeholder(roster_id: TeamId) -> String {
    format!("Team {roster_id}")
}

pub fn user_placeholder(user_id: &str) -> String {
    format!("User_{user_id}")
}
