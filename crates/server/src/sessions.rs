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
use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;

use shared::{errors::ProtocolViolation, log};

/// How a session finished. `Redirected` is the login session's deliberate
/// end of service after a successful ticket mint, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Redirected,
    Disconnected,
    Cancelled,
}

/// Live sessions of one proxy host, tracked for observability only.
#[derive(Debug, Default)]
pub struct SessionSet {
    next_id: AtomicU64,
    live: Mutex<HashMap<u64, SocketAddr>>,
}

impl SessionSet {
    pub fn new() -> Self {
        SessionSet::default()
    }

    pub fn insert(&self, peer: SocketAddr) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.live.lock().unwrap().insert(id, peer);
        id
    }

    pub fn remove(&self, id: u64) {
        self.live.lock().unwrap().remove(&id);
    }

    pub fn count(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub fn peers(&self) -> Vec<SocketAddr> {
        self.live.lock().unwrap().values().copied().collect()
    }
}

/// One log line per finished session. Protocol violations are worth a
/// warning; transient I/O and deliberate exits stay at debug.
pub fn log_session_end(proxy: &str, peer: SocketAddr, result: &Result<SessionEnd>) {
    match result {
        Ok(SessionEnd::Redirected) => {
            log::debug!("{} session for {} ended after redirect", proxy, peer)
        }
        Ok(SessionEnd::Disconnected) => log::info!("{} client {} disconnected", proxy, peer),
        Ok(SessionEnd::Cancelled) => log::debug!("{} session for {} cancelled", proxy, peer),
        Err(e) => {
            if let Some(violation) = e.downcast_ref::<ProtocolViolation>() {
                log::warn!("{} session for {} failed: {}", proxy, peer, violation);
            } else {
                log::debug!("{} session for {} failed: {:?}", proxy, peer, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_set_tracks_live_sessions() {
        let set = SessionSet::new();
        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        let a = set.insert(peer);
        let b = set.insert("127.0.0.1:4001".parse().unwrap());
        assert_ne!(a, b);
        assert_eq!(set.count(), 2);
        assert!(set.peers().contains(&peer));

        set.remove(a);
        assert_eq!(set.count(), 1);
        // removing twice is a no-op
        set.remove(a);
        assert_eq!(set.count(), 1);
        set.remove(b);
        assert_eq!(set.count(), 0);
    }
}
