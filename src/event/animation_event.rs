// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::animation::{AnimationId, AnimationKey, RunReport};

/// A change in the lifecycle of one animation run.
///
/// For a given [`AnimationId`], `Started` always comes first and
/// `Finished` last; `Stopping` appears in between only if the run was
/// stopped explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationEvent {
    /// The animation was registered and its loop spawned.
    Started {
        /// Registry key.
        key: AnimationKey,
        /// Run identity.
        id: AnimationId,
        /// Recipe name.
        recipe: &'static str,
    },
    /// Cancellation was requested.
    Stopping {
        /// Registry key.
        key: AnimationKey,
        /// Run identity.
        id: AnimationId,
    },
    /// The loop exited and settle commands were sent.
    Finished {
        /// Registry key.
        key: AnimationKey,
        /// Run identity.
        id: AnimationId,
        /// How the run went.
        report: RunReport,
    },
}

impl AnimationEvent {
    /// Returns the key of the animation this event is about.
    #[must_use]
    pub fn key(&self) -> &AnimationKey {
        match self {
            Self::Started { key, .. } | Self::Stopping { key, .. } | Self::Finished { key, .. } => {
                key
            }
        }
    }

    /// Returns the run identity.
    #[must_use]
    pub fn id(&self) -> AnimationId {
        match self {
            Self::Started { id, .. } | Self::Stopping { id, .. } | Self::Finished { id, .. } => *id,
        }
    }

    /// Returns `true` for [`AnimationEvent::Finished`].
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Outcome;

    #[test]
    fn accessors() {
        let id = AnimationId::new();
        let event = AnimationEvent::Finished {
            key: AnimationKey::new("chase-a-b"),
            id,
            report: RunReport {
                outcome: Outcome::Cancelled,
                sent: 3,
                failed: 0,
            },
        };
        assert_eq!(event.key().as_str(), "chase-a-b");
        assert_eq!(event.id(), id);
        assert!(event.is_finished());
    }

    #[test]
    fn started_is_not_finished() {
        let event = AnimationEvent::Started {
            key: AnimationKey::new("pulse-Desk"),
            id: AnimationId::new(),
            recipe: "pulse",
        };
        assert!(!event.is_finished());
    }
}
