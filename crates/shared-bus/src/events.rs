//! # Sync Events
//!
//! Every notification the light-client sync emits to its consumer flows
//! through the bus as a [`SyncEvent`].

use serde::{Deserialize, Serialize};
use shared_types::entities::VerifiedBlock;

/// Events published by the initial block download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncEvent {
    // =========================================================================
    // SYNC LIFECYCLE
    // =========================================================================
    /// Orchestration was started.
    SyncStarted,

    /// A peer finished downloading; the client is caught up with it.
    SyncFinished,

    /// No usable peer remains.
    SyncStopped {
        /// Why sync stopped.
        reason: String,
    },

    // =========================================================================
    // DOWNLOAD (one per elected peer)
    // =========================================================================
    /// A peer was elected to drive the download.
    DownloadStarted { peer: String },

    /// The elected peer delivered everything it had.
    DownloadCompleted { peer: String },

    /// The elected peer was lost or misbehaved.
    DownloadFailed { peer: String, reason: String },

    /// One batch of filtered blocks was processed.
    DownloadIterationCompleted { peer: String, blocks: usize },

    // =========================================================================
    // PEER STATUS
    // =========================================================================
    /// A peer joined the synced-peers set.
    PeerSynced { peer: String },

    /// A synced peer announced blocks we do not have.
    PeerNotSynced { peer: String },

    // =========================================================================
    // BLOCKS
    // =========================================================================
    /// A filtered block passed header validation and its merkle proof.
    BlockVerified(VerifiedBlock),
}

impl SyncEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::SyncStarted | Self::SyncFinished | Self::SyncStopped { .. } => {
                EventTopic::Lifecycle
            }
            Self::DownloadStarted { .. }
            | Self::DownloadCompleted { .. }
            | Self::DownloadFailed { .. }
            | Self::DownloadIterationCompleted { .. } => EventTopic::Download,
            Self::PeerSynced { .. } | Self::PeerNotSynced { .. } => EventTopic::PeerStatus,
            Self::BlockVerified(_) => EventTopic::Blocks,
        }
    }

    /// Host of the peer this event concerns, if any.
    #[must_use]
    pub fn peer(&self) -> Option<&str> {
        match self {
            Self::DownloadStarted { peer }
            | Self::DownloadCompleted { peer }
            | Self::DownloadFailed { peer, .. }
            | Self::DownloadIterationCompleted { peer, .. }
            | Self::PeerSynced { peer }
            | Self::PeerNotSynced { peer } => Some(peer),
            Self::SyncStarted
            | Self::SyncFinished
            | Self::SyncStopped { .. }
            | Self::BlockVerified(_) => None,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Started / finished / stopped.
    Lifecycle,
    /// Per-peer download progress.
    Download,
    /// Synced / not-synced transitions.
    PeerStatus,
    /// Verified filtered blocks.
    Blocks,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Peer hosts to include. Empty means any peer; events without a peer
    /// only pass when this is empty.
    pub peers: Vec<String>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            peers: Vec::new(),
        }
    }

    /// Create a filter for events about specific peers.
    #[must_use]
    pub fn for_peers(peers: Vec<String>) -> Self {
        Self {
            topics: Vec::new(),
            peers,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &SyncEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let peer_match = self.peers.is_empty()
            || event
                .peer()
                .is_some_and(|peer| self.peers.iter().any(|p| p == peer));

        topic_match && peer_match
    }
}
