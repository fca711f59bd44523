use serde::Serialize;

/// Conditions that stop a combat request before (or partway through) resolution.
///
/// Blocks, misses and automatic failures are not errors; they are outcomes
/// carried by [`crate::AttackReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CombatError {
    /// No AtR left for the skill; nothing was mutated.
    #[error("{combatant} has no attacks remaining for {skill}")]
    InsufficientResource { combatant: String, skill: String },

    #[error("{combatant} lacks faith ({available} of {needed})")]
    InsufficientFaith {
        combatant: String,
        needed: i32,
        available: i32,
    },

    /// Unknown combatant, weapon skill or mismatched pending attack; nothing was mutated.
    #[error("invalid reference: {message}")]
    InvalidReference { message: String },

    /// The defender declined to choose a defense. The attacker's AtR is still spent.
    #[error("{defender} cancelled the defense choice")]
    UserCancelled { defender: String },
}

impl CombatError {
    pub fn invalid(message: impl Into<String>) -> Self {
        CombatError::InvalidReference {
            message: message.into(),
        }
    }
}
