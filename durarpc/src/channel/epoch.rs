//
// Copyright 2026 The durarpc Authors. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Cancellation epochs for connectivity periods.
//!
//! Each connectivity period of a channel has its own epoch. The channel
//! bumps the epoch generation on interruption and on restoration, and marks
//! it aborted when reconnection is given up. Every call currently blocked on
//! a response subscribes to the epoch, so a connectivity change wakes all of
//! them at once instead of each paying its full timeout to notice.
//!
//! Cancellation does not mean failure: a waiter woken by an epoch bump must
//! re-check whether its value arrived before deciding what to do.

use tokio::sync::watch;

/// A snapshot of the epoch at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochState {
    /// Monotonically increasing generation. Bumped on every interruption,
    /// restoration, and abort.
    pub generation: u64,
    /// True once the channel has aborted; never reset.
    pub aborted: bool,
}

/// The writer side of a channel's cancellation epoch.
///
/// Owned by the channel state machine. Waiters obtain an [`EpochWaiter`]
/// via [`Epoch::subscribe`].
#[derive(Debug)]
pub struct Epoch {
    tx: watch::Sender<EpochState>,
}

impl Epoch {
    /// Creates a fresh epoch at generation 0, not aborted.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(EpochState {
            generation: 0,
            aborted: false,
        });
        Self { tx }
    }

    /// Returns the current epoch state.
    #[must_use]
    pub fn current(&self) -> EpochState {
        *self.tx.borrow()
    }

    /// Bumps the generation, waking all subscribed waiters.
    ///
    /// Used on interruption and restoration. Waiters observe the bump as a
    /// cancellation of their current wait, not as a failure.
    pub fn bump(&self) {
        self.tx.send_modify(|state| state.generation += 1);
    }

    /// Marks the epoch aborted and bumps the generation.
    ///
    /// Once aborted, an epoch never returns to the active state.
    pub fn abort(&self) {
        self.tx.send_modify(|state| {
            state.generation += 1;
            state.aborted = true;
        });
    }

    /// Creates a waiter observing this epoch from its current state.
    #[must_use]
    pub fn subscribe(&self) -> EpochWaiter {
        EpochWaiter {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for Epoch {
    fn default() -> Self {
        Self::new()
    }
}

/// The reader side of a cancellation epoch, held by one waiting call.
#[derive(Debug)]
pub struct EpochWaiter {
    rx: watch::Receiver<EpochState>,
}

impl EpochWaiter {
    /// Waits for the next epoch change and returns the new state.
    ///
    /// If the epoch writer has been dropped (the channel is gone), this
    /// reports an aborted state rather than hanging.
    pub async fn cancelled(&mut self) -> EpochState {
        match self.rx.changed().await {
            Ok(()) => *self.rx.borrow_and_update(),
            Err(_) => EpochState {
                generation: u64::MAX,
                aborted: true,
            },
        }
    }

    /// Returns the last observed state without waiting.
    #[must_use]
    pub fn last_seen(&self) -> EpochState {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_epoch_state() {
        let epoch = Epoch::new();
        let state = epoch.current();
        assert_eq!(state.generation, 0);
        assert!(!state.aborted);
    }

    #[tokio::test]
    async fn test_bump_wakes_waiter() {
        let epoch = Epoch::new();
        let mut waiter = epoch.subscribe();

        epoch.bump();

        let state = waiter.cancelled().await;
        assert_eq!(state.generation, 1);
        assert!(!state.aborted);
    }

    #[tokio::test]
    async fn test_abort_is_sticky() {
        let epoch = Epoch::new();
        let mut waiter = epoch.subscribe();

        epoch.abort();
        let state = waiter.cancelled().await;
        assert!(state.aborted);

        epoch.bump();
        let state = waiter.cancelled().await;
        assert!(state.aborted);
    }

    #[tokio::test]
    async fn test_multiple_waiters_all_wake() {
        let epoch = Epoch::new();
        let mut w1 = epoch.subscribe();
        let mut w2 = epoch.subscribe();

        epoch.bump();

        let s1 = w1.cancelled().await;
        let s2 = w2.cancelled().await;
        assert_eq!(s1, s2);
    }

    #[tokio::test]
    async fn test_dropped_writer_reports_aborted() {
        let epoch = Epoch::new();
        let mut waiter = epoch.subscribe();
        drop(epoch);

        let state = waiter.cancelled().await;
        assert!(state.aborted);
    }

    #[tokio::test]
    async fn test_waiter_does_not_wake_without_change() {
        let epoch = Epoch::new();
        let mut waiter = epoch.subscribe();

        let woke = tokio::time::timeout(Duration::from_millis(50), waiter.cancelled()).await;
        assert!(woke.is_err());
    }
}
