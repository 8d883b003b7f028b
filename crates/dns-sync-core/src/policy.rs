//! Change-set policies
//!
//! A policy is a total, pure `Changes -> Changes` transformation applied
//! after the plan diff and before execution. Policies compose left to
//! right: later policies see the output of earlier ones.
//!
//! A policy may drop entries from any of the four lists, but must not
//! introduce a record key absent from its input, and must keep the
//! update_old/update_new positional pairing intact: filtering one half of
//! a pair means removing the counterpart at the same index.
//!
//! Policies are a closed set of tagged variants rather than a trait
//! hierarchy; arbitrary filtering plugs in through [`Policy::Custom`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::Error;
use crate::plan::Changes;

/// A safety filter applied to a computed change set before execution.
#[derive(Clone)]
pub enum Policy {
    /// Pass-through identity: allow full synchronization, deletes included.
    Sync,

    /// Additive-only convergence: empties the delete list, leaves
    /// create/update untouched.
    ///
    /// Used when the operator must never have the engine remove records it
    /// no longer sees as desired, e.g. under partial source visibility.
    UpsertOnly,

    /// Arbitrary filtering under the same contract.
    Custom(Arc<dyn Fn(Changes) -> Changes + Send + Sync>),
}

impl Policy {
    /// Apply the policy to a change set.
    pub fn apply(&self, changes: Changes) -> Changes {
        match self {
            Policy::Sync => changes,
            Policy::UpsertOnly => Changes {
                delete: Vec::new(),
                ..changes
            },
            Policy::Custom(transform) => transform(changes),
        }
    }

    /// Operator-facing name of the policy (for logging/debugging).
    pub fn name(&self) -> &'static str {
        match self {
            Policy::Sync => "sync",
            Policy::UpsertOnly => "upsert-only",
            Policy::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Policy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sync" => Ok(Policy::Sync),
            "upsert-only" => Ok(Policy::UpsertOnly),
            other => Err(Error::config(format!("unknown policy: {}", other))),
        }
    }
}
