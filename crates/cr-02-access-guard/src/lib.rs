//! # Access Guard
//!
//! Decides whether a verified caller may act on a resource. Runs strictly
//! after identity verification and strictly before a command is published.
//!
//! ## Policy
//!
//! A caller is authorized when it owns the resource or holds the
//! administrative role. Anything else is `Forbidden`, which is a different
//! outcome from "unauthorized": the caller is known, just not entitled.
//!
//! The guard is pure. Decisions are recomputed for every request because
//! ownership can change between requests.

#![cfg_attr(test, allow(clippy::unwrap_used))]

use shared_types::{IdentityClaim, Role, UserId};
use std::fmt;
use thiserror::Error;

/// Gate applied to an external route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// No credential required.
    Public,
    /// Any valid credential.
    Authenticated,
    /// Valid credential belonging to the resource owner, or an admin.
    OwnerOrAdmin,
}

impl AccessPolicy {
    /// Whether the route needs a verified identity at all.
    pub fn requires_identity(&self) -> bool {
        !matches!(self, AccessPolicy::Public)
    }
}

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    /// Caller owns the resource.
    Owner,
    /// Caller holds the override role.
    AdminOverride,
    /// Resource belongs to someone else.
    NotOwner,
    /// Resource has no owner, so only the override applies.
    Unowned,
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DecisionReason::Owner => "caller owns the resource",
            DecisionReason::AdminOverride => "administrative override",
            DecisionReason::NotOwner => "resource belongs to another user",
            DecisionReason::Unowned => "resource has no owner",
        };
        f.write_str(text)
    }
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: DecisionReason,
}

/// Authenticated but not entitled.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    #[error("forbidden: user {subject} may not act on resource owned by {owner:?} ({reason})")]
    Forbidden {
        subject: UserId,
        owner: Option<UserId>,
        reason: DecisionReason,
    },
}

/// Ownership-or-admin guard.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    override_role: Role,
}

impl AccessGuard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            override_role: Role::Admin,
        }
    }

    /// Guard whose administrative override is granted by `role`.
    #[must_use]
    pub fn with_override_role(role: Role) -> Self {
        Self {
            override_role: role,
        }
    }

    /// Evaluate the policy without turning the result into an error.
    #[must_use]
    pub fn evaluate(&self, claim: &IdentityClaim, owner: Option<UserId>) -> AccessDecision {
        if owner == Some(claim.subject_id) {
            return AccessDecision {
                allowed: true,
                reason: DecisionReason::Owner,
            };
        }
        if claim.has_role(self.override_role) {
            return AccessDecision {
                allowed: true,
                reason: DecisionReason::AdminOverride,
            };
        }
        AccessDecision {
            allowed: false,
            reason: if owner.is_some() {
                DecisionReason::NotOwner
            } else {
                DecisionReason::Unowned
            },
        }
    }

    /// Authorize `claim` against the owner of the target resource.
    pub fn authorize(&self, claim: &IdentityClaim, owner: Option<UserId>) -> Result<(), AccessError> {
        let decision = self.evaluate(claim, owner);
        if decision.allowed {
            Ok(())
        } else {
            Err(AccessError::Forbidden {
                subject: claim.subject_id,
                owner,
                reason: decision.reason,
            })
        }
    }
}

impl Default for AccessGuard {
    fn default() -> Self {
        Self::new()
    }
}
