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

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::task::JoinSet;

use shared::{log, system::trigger::Trigger, ticket::TicketStore};

use crate::config::RelayConfig;
use crate::sessions::{SessionSet, log_session_end};

mod dialog;
mod session;

#[cfg(test)]
mod tests;

/// Front end the redirected client dials for its game connection. Redeems
/// the minted ticket, dials the real game server it names and replays the
/// original credential, then forwards transparently.
pub struct GameProxy {
    addr: SocketAddr,
    talk_to_every_npc: bool,
    store: Arc<TicketStore>,
    sessions: Arc<SessionSet>,
}

impl GameProxy {
    pub fn new(config: &RelayConfig, store: Arc<TicketStore>) -> Self {
        GameProxy {
            addr: config.game_addr,
            talk_to_every_npc: config.talk_to_every_npc,
            store,
            sessions: Arc::new(SessionSet::new()),
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.count()
    }

    pub async fn listen_and_serve(self: Arc<Self>, stop: Trigger) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        log::info!("game proxy listening on {}", listener.local_addr()?);
        self.serve(listener, stop).await
    }

    pub(crate) async fn serve(self: Arc<Self>, listener: TcpListener, stop: Trigger) -> Result<()> {
        let mut tasks = JoinSet::new();
        loop {
            tokio::select! {
                _ = stop.wait_async() => break,
                accepted = listener.accept() => {
                    let (conn, peer) = accepted?;
                    log::info!("game client connected from {}", peer);
                    let proxy = self.clone();
                    let stop = stop.clone();
                    tasks.spawn(async move {
                        let token = proxy.sessions.insert(peer);
                        let result = session::run(&proxy, conn, peer, stop).await;
                        proxy.sessions.remove(token);
                        log_session_end("game", peer, &result);
                    });
                }
            }
        }
        log::info!(
            "game proxy stopped listening, draining {} sessions",
            self.sessions.count()
        );
        for peer in self.sessions.peers() {
            log::debug!("waiting for game session {}", peer);
        }
        while tasks.join_next().await.is_some() {}
        Ok(())
    }
}
