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
use std::time::Instant;

use anyhow::Result;
use tokio::net::{
    TcpStream,
    tcp::{OwnedReadHalf, OwnedWriteHalf},
};
use uuid::Uuid;

use shared::{
    errors::ProtocolViolation,
    log,
    protocol::{
        self, ClientMsgId, ServerMsgId,
        client::{AccountConfiguredPort, AccountCredential, AccountSendIdentity, AccountSetServer,
            ClientMessage},
        codec::{FrameReader, FrameWriter},
        envelope,
        server::{AccountLoginSuccess, AccountSelectServerPlainSuccess, AccountSelectServerSuccess,
            ServerMessage},
    },
    system::trigger::Trigger,
    ticket::Ticket,
};

use super::LoginProxy;
use crate::consts::FALLBACK_GAME_PORT;
use crate::sessions::SessionEnd;

/// Bridges one client connection to one upstream login connection. The two
/// directions run as concurrent loops joined by the server-id rendezvous;
/// whichever finishes first ends the session.
pub(super) async fn run(
    proxy: &LoginProxy,
    conn: TcpStream,
    peer: SocketAddr,
    stop: Trigger,
) -> Result<SessionEnd> {
    let server_conn = TcpStream::connect(&proxy.server_addr).await?;
    log::info!(
        "login session for {} connected to server {}",
        peer,
        proxy.server_addr
    );

    let (client_rd, client_wr) = conn.into_split();
    let (server_rd, server_wr) = server_conn.into_split();

    let (id_tx, id_rx) = protocol::server_id_pair();

    let mut client_side = ClientLoop {
        proxy,
        peer,
        reader: FrameReader::from_client(client_rd),
        server: FrameWriter::to_server(server_wr),
        username: None,
        server_id: id_tx,
    };
    let mut server_side = ServerLoop {
        proxy,
        peer,
        reader: FrameReader::from_server(server_rd),
        client: FrameWriter::to_client(client_wr),
        server_id: id_rx,
    };

    tokio::select! {
        _ = stop.wait_async() => Ok(SessionEnd::Cancelled),
        result = client_side.run() => result,
        result = server_side.run() => result,
    }
}

struct ClientLoop<'a> {
    proxy: &'a LoginProxy,
    peer: SocketAddr,
    reader: FrameReader<OwnedReadHalf>,
    server: FrameWriter<OwnedWriteHalf>,
    username: Option<String>,
    server_id: flume::Sender<i32>,
}

impl ClientLoop<'_> {
    async fn run(&mut self) -> Result<SessionEnd> {
        loop {
            let Some(frame) = self.reader.next_frame().await? else {
                return Ok(SessionEnd::Disconnected);
            };
            self.handle_frame(&frame).await?;
        }
    }

    async fn handle_frame(&mut self, frame: &str) -> Result<()> {
        // Interpretation works on the unwrapped message; forwarding keeps the
        // original bytes unless the frame is deliberately rewritten.
        let message = envelope::interpret(frame);
        let split = protocol::split_client(message);
        log::debug!(
            "login client {} -> server: {} {}",
            self.peer,
            split.map_or("unknown", |(id, _)| id.name()),
            frame
        );
        match split {
            Some((ClientMsgId::AccountCredential, body)) => {
                let msg = AccountCredential::from_body(body)
                    .map_err(|e| ProtocolViolation::MalformedPacket(e.to_string()))?;
                self.username = Some(msg.username);
                self.server.send(frame).await
            }
            Some((ClientMsgId::AccountSendIdentity, _)) => {
                // Hide the machine identity behind a stable per-account one
                let Some(username) = &self.username else {
                    return self.server.send(frame).await;
                };
                let identity = self.proxy.identities.identity_for(username);
                let rewritten = AccountSendIdentity {
                    identity: identity.to_string(),
                }
                .to_frame();
                self.server.send(&rewritten).await
            }
            Some((ClientMsgId::AccountConfiguredPort, _)) => {
                // The client echoes the port it was configured with; tell the
                // server the port it actually listens on
                let rewritten = AccountConfiguredPort {
                    port: self.proxy.server_port.clone(),
                }
                .to_frame();
                self.server.send(&rewritten).await
            }
            Some((ClientMsgId::AccountSetServer, body)) => {
                let msg = AccountSetServer::from_body(body)
                    .map_err(|e| ProtocolViolation::MalformedPacket(e.to_string()))?;
                self.server.send(frame).await?;
                // Blocks until the server loop consumes the id, pairing this
                // choice with exactly one selection reply
                self.server_id.send_async(msg.id).await?;
                Ok(())
            }
            _ => self.server.send(frame).await,
        }
    }
}

struct ServerLoop<'a> {
    proxy: &'a LoginProxy,
    peer: SocketAddr,
    reader: FrameReader<OwnedReadHalf>,
    client: FrameWriter<OwnedWriteHalf>,
    server_id: flume::Receiver<i32>,
}

impl ServerLoop<'_> {
    async fn run(&mut self) -> Result<SessionEnd> {
        loop {
            let Some(frame) = self.reader.next_frame().await? else {
                return Ok(SessionEnd::Disconnected);
            };
            if let Some(end) = self.handle_frame(&frame).await? {
                return Ok(end);
            }
        }
    }

    async fn handle_frame(&mut self, frame: &str) -> Result<Option<SessionEnd>> {
        let split = protocol::split_server(frame);
        log::debug!(
            "login server -> client {}: {} {}",
            self.peer,
            split.map_or("unknown", |(id, _)| id.name()),
            frame
        );
        match split {
            Some((ServerMsgId::AccountLoginSuccess, body)) if self.proxy.force_admin => {
                let mut msg = AccountLoginSuccess::from_body(body)
                    .map_err(|e| ProtocolViolation::MalformedPacket(e.to_string()))?;
                msg.authorized = true;
                self.client.send(&msg.to_frame()).await?;
                Ok(None)
            }
            Some((ServerMsgId::AccountSelectServerError, _)) => {
                // Consume the pending realm choice so the rendezvous stays
                // paired, then pass the error through
                let _ = self.server_id.recv_async().await?;
                self.client.send(frame).await?;
                Ok(None)
            }
            Some((ServerMsgId::AccountSelectServerSuccess, body)) => {
                let server_id = self.server_id.recv_async().await?;
                let msg = AccountSelectServerSuccess::from_body(body)
                    .map_err(|e| ProtocolViolation::MalformedPacket(e.to_string()))?;
                let id = Uuid::new_v4().to_string();
                let port = if msg.port.is_empty() {
                    FALLBACK_GAME_PORT.to_string()
                } else {
                    msg.port
                };
                self.proxy.store.set_ticket(
                    &id,
                    Ticket {
                        host: msg.host,
                        port,
                        original: msg.ticket,
                        server_id,
                        issued_at: Instant::now(),
                    },
                );
                let reply = AccountSelectServerPlainSuccess {
                    host: self.proxy.public_host.clone(),
                    port: self.proxy.public_port.clone(),
                    ticket: id,
                }
                .to_frame();
                self.client.send(&reply).await?;
                log::info!("login session for {} redirected to game proxy", self.peer);
                Ok(Some(SessionEnd::Redirected))
            }
            _ => {
                self.client.send(frame).await?;
                Ok(None)
            }
        }
    }
}
