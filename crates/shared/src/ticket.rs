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

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::{log, system::trigger::Trigger};

/// Short-lived capability minted by the login proxy and redeemed by the game
/// proxy: the real game server's address plus the opaque credential the real
/// login server issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub host: String,
    pub port: String,
    pub original: String,
    pub server_id: i32,
    pub issued_at: Instant,
}

/// Shared id -> ticket mapping. Redemption is at most once: `use_ticket`
/// removes the entry it returns. Shared across both proxies for the lifetime
/// of the process; no iteration is exposed.
#[derive(Debug, Default)]
pub struct TicketStore {
    tickets: Mutex<HashMap<String, Ticket>>,
}

impl TicketStore {
    pub fn new() -> Self {
        TicketStore::default()
    }

    /// Inserts a ticket. An existing entry under the same id is overwritten,
    /// last writer wins.
    pub fn set_ticket(&self, id: &str, ticket: Ticket) {
        let mut tickets = self.tickets.lock().unwrap();
        tickets.insert(id.to_string(), ticket);
        log::debug!("ticket set: {}", id);
    }

    /// Atomic lookup-and-remove, so no id is ever redeemed twice.
    pub fn use_ticket(&self, id: &str) -> Option<Ticket> {
        let mut tickets = self.tickets.lock().unwrap();
        let ticket = tickets.remove(id);
        if ticket.is_some() {
            log::debug!("ticket used: {}", id);
        }
        ticket
    }

    /// Removes every entry whose deadline (`issued_at + ttl`) has passed.
    pub fn delete_old_tickets(&self, ttl: Duration) {
        let mut tickets = self.tickets.lock().unwrap();
        let now = Instant::now();
        tickets.retain(|id, ticket| {
            let expired = now.duration_since(ticket.issued_at) > ttl;
            if expired {
                log::debug!("old ticket deleted: {}", id);
            }
            !expired
        });
    }

    pub fn count(&self) -> usize {
        self.tickets.lock().unwrap().len()
    }
}

/// Periodic eviction sweep; runs until the trigger fires.
pub async fn sweep_loop(store: Arc<TicketStore>, ttl: Duration, interval: Duration, stop: Trigger) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = stop.wait_async() => break,
            _ = ticker.tick() => store.delete_old_tickets(ttl),
        }
    }
    log::debug!("ticket sweep loop stopped");
}
