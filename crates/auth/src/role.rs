use serde::{Deserialize, Serialize};

/// Globally-scoped capability a principal may hold.
///
/// Manager is deliberately *not* here: the manager capability is scoped to a
/// single group and lives in per-group grant sets on the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Role administration: may grant and revoke global roles.
    Admin,
    /// May replace the deployed code (held alongside ownership).
    Upgrader,
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::Upgrader => f.write_str("upgrader"),
        }
    }
}
