//! Per-entity access policy and the authorization guard
//!
//! The hosting platform authenticates principals; this module only decides
//! whether a given (possibly anonymous) principal may exercise a capability
//! on one analysis. Handlers call [`authorize`] at the top of each
//! operation instead of wrapping themselves in permission decorators.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Capability required by a resource operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Read the entity (detail pages, payload copy)
    View,
    /// Mutate payload or metadata
    Change,
    /// Remove the entity
    Delete,
}

/// Access policy attached to one analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessPolicy {
    /// Anyone (including anonymous requesters) may view
    pub public_view: bool,
    /// Explicit per-principal grants, in addition to the owner's implicit
    /// full access
    pub grants: HashMap<String, BTreeSet<Capability>>,
}

impl AccessPolicy {
    /// Default policy applied at creation: publicly viewable, no explicit
    /// grants (the owner passes implicitly).
    pub fn default_for_new() -> Self {
        AccessPolicy {
            public_view: true,
            grants: HashMap::new(),
        }
    }

    /// Policy visible only to the owner and explicitly granted principals
    pub fn private() -> Self {
        AccessPolicy {
            public_view: false,
            grants: HashMap::new(),
        }
    }

    /// Grant a capability to a principal
    pub fn grant(mut self, principal: impl Into<String>, cap: Capability) -> Self {
        self.grants.entry(principal.into()).or_default().insert(cap);
        self
    }
}

/// Permission check failure
///
/// `anonymous` distinguishes a requester that never authenticated (browser
/// navigations get a login redirect) from one that authenticated but lacks
/// the capability (plain 401).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenied {
    /// Requester presented no principal at all
    pub anonymous: bool,
    /// Capability that was required
    pub required: Capability,
}

impl std::fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.anonymous {
            write!(f, "login required for {:?} access", self.required)
        } else {
            write!(f, "{:?} permission denied", self.required)
        }
    }
}

impl std::error::Error for AccessDenied {}

/// Check whether `principal` may exercise `required` on an entity owned by
/// `owner` under `policy`.
///
/// The owner always passes. `View` passes for anyone when the policy is
/// public. Everything else requires an explicit grant, so anonymous
/// requesters can only ever pass a public view check.
pub fn authorize(
    principal: Option<&str>,
    owner: &str,
    policy: &AccessPolicy,
    required: Capability,
) -> std::result::Result<(), AccessDenied> {
    if let Some(name) = principal {
        if name == owner {
            return Ok(());
        }
        if required == Capability::View && policy.public_view {
            return Ok(());
        }
        if policy
            .grants
            .get(name)
            .is_some_and(|caps| caps.contains(&required))
        {
            return Ok(());
        }
        return Err(AccessDenied {
            anonymous: false,
            required,
        });
    }

    if required == Capability::View && policy.public_view {
        return Ok(());
    }
    Err(AccessDenied {
        anonymous: true,
        required,
    })
}
