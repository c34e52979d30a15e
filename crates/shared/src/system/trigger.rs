// BSD 3-Clause License
// Copyright (c) 2026, Virtual Cable S.L.
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice,
//    this list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
//    this list of conditions and the following disclaimer in the documentation
//    and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors
//    may be used to endorse or promote products derived from this software
//    without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

// Authors: Adolfo Gómez, dkmaster at dkmon dot com

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use tokio::sync::Notify;

/// One-shot latch shared between tasks. Once triggered it stays triggered;
/// clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct Trigger {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    triggered: AtomicBool,
    notify: Notify,
}

impl Trigger {
    pub fn new() -> Self {
        Trigger::default()
    }

    pub fn trigger(&self) {
        self.inner.triggered.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::SeqCst)
    }

    pub async fn wait_async(&self) {
        loop {
            if self.is_triggered() {
                return;
            }
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            // notify_waiters only wakes already-registered waiters, so the
            // flag has to be re-checked after registering
            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }

    /// Waits for the trigger, giving up after `timeout`. Returns whether the
    /// trigger actually fired.
    pub async fn wait_timeout_async(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait_async())
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_starts_untriggered() {
        let trigger = Trigger::new();
        assert!(!trigger.is_triggered());
        assert!(
            !trigger
                .wait_timeout_async(Duration::from_millis(50))
                .await
        );
    }

    #[tokio::test]
    async fn test_trigger_wakes_waiter() {
        let trigger = Trigger::new();
        let waiter = tokio::spawn({
            let trigger = trigger.clone();
            async move {
                trigger.wait_async().await;
            }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        trigger.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake up")
            .unwrap();
        assert!(trigger.is_triggered());
    }

    #[tokio::test]
    async fn test_trigger_is_sticky() {
        let trigger = Trigger::new();
        trigger.trigger();
        trigger.trigger();
        // A wait after the fact returns immediately
        trigger.wait_async().await;
        assert!(trigger.wait_timeout_async(Duration::from_millis(1)).await);
    }
}
