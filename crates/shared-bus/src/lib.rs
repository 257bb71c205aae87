//! # Shared Bus - Sync Event Channel
//!
//! Outbound notifications from the light-client sync to whoever embeds it.
//! The orchestrator publishes; wallets, UIs and tests subscribe.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  IBD actor   │                    │   Consumer   │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod bus;
pub mod events;

pub use bus::{EventPublisher, InMemoryEventBus, Subscription};
pub use events::{EventFilter, EventTopic, SyncEvent};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
