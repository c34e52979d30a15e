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

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use futures::future::{Either, pending};
use tokio::net::{
    TcpStream,
    tcp::{OwnedReadHalf, OwnedWriteHalf},
};

use shared::{
    errors::ProtocolViolation,
    log,
    protocol::{
        self, ClientMsgId, FrameReceiver, ServerMsgId,
        client::{AccountSendTicket, ClientMessage},
        codec::{FrameReader, FrameWriter},
        envelope,
        server::{AccountTicketResponseError, AksHelloGame, GameMovement, ServerMessage,
            SpriteKind},
    },
    system::trigger::Trigger,
    ticket::Ticket,
};

use super::GameProxy;
use super::dialog::{DialogMachine, Disposition};
use crate::consts::GAME_DIAL_TIMEOUT_SECS;
use crate::sessions::SessionEnd;

pub(super) async fn run(
    proxy: &GameProxy,
    conn: TcpStream,
    peer: SocketAddr,
    stop: Trigger,
) -> Result<SessionEnd> {
    // Session scope: fired on exit so the socket reader tasks wind down even
    // while their peer keeps the connection open
    let scope = Trigger::new();
    let (client_rd, client_wr) = conn.into_split();
    let client_frames = spawn_reader(
        FrameReader::from_client(client_rd),
        scope.clone(),
        peer,
        "client",
    );

    let mut session = GameSession {
        proxy,
        peer,
        stop,
        scope: scope.clone(),
        client: FrameWriter::to_client(client_wr),
        client_frames,
        server: None,
        connected: Trigger::new(),
        first_packet: true,
        ticket: None,
        held: VecDeque::new(),
        dialogs: DialogMachine::new(),
    };
    let result = session.run().await;
    scope.trigger();
    result
}

fn spawn_reader(
    mut reader: FrameReader<OwnedReadHalf>,
    scope: Trigger,
    peer: SocketAddr,
    side: &'static str,
) -> FrameReceiver {
    let (tx, rx) = protocol::frame_pair();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = scope.wait_async() => break,
                result = reader.next_frame() => match result {
                    Ok(Some(frame)) => {
                        if tx.send_async(frame).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        log::debug!("game {} reader for {} stopped: {:?}", side, peer, e);
                        break;
                    }
                },
            }
        }
    });
    rx
}

struct ServerSide {
    writer: FrameWriter<OwnedWriteHalf>,
    frames: FrameReceiver,
}

/// One accepted game connection. Runs as a single event loop fed by the two
/// socket readers; the upstream side only materializes once the client's
/// ticket has been redeemed.
struct GameSession<'a> {
    proxy: &'a GameProxy,
    peer: SocketAddr,
    stop: Trigger,
    scope: Trigger,
    client: FrameWriter<OwnedWriteHalf>,
    client_frames: FrameReceiver,
    server: Option<ServerSide>,
    // Opens once the upstream hello has been answered; client frames are
    // held until then
    connected: Trigger,
    first_packet: bool,
    ticket: Option<Ticket>,
    held: VecDeque<String>,
    dialogs: DialogMachine,
}

impl GameSession<'_> {
    async fn run(&mut self) -> Result<SessionEnd> {
        // Greet before reading anything from the client
        self.client.send(&AksHelloGame.to_frame()).await?;

        loop {
            let client_rx = self.client_frames.clone();
            let server_rx = self.server.as_ref().map(|side| side.frames.clone());
            let server_recv = match &server_rx {
                Some(rx) => Either::Left(rx.recv_async()),
                None => Either::Right(pending()),
            };
            let stop = self.stop.clone();
            tokio::select! {
                _ = stop.wait_async() => return Ok(SessionEnd::Cancelled),
                frame = client_rx.recv_async() => match frame {
                    Ok(frame) => self.handle_client_frame(frame).await?,
                    Err(_) => return Ok(SessionEnd::Disconnected),
                },
                frame = server_recv => match frame {
                    Ok(frame) => self.handle_server_frame(&frame).await?,
                    Err(_) => return Ok(SessionEnd::Disconnected),
                },
            }
            self.flush_pending().await?;
        }
    }

    async fn handle_client_frame(&mut self, frame: String) -> Result<()> {
        if self.first_packet {
            self.first_packet = false;
            return self.redeem_ticket(&frame).await;
        }
        if !self.can_forward_client_frames() {
            // Mailbox: held until the upstream is ready and no dialog is in
            // flight, then drained in arrival order
            self.held.push_back(frame);
            return Ok(());
        }
        self.forward_to_server(&frame).await
    }

    fn can_forward_client_frames(&self) -> bool {
        self.connected.is_triggered() && self.dialogs.is_settled()
    }

    async fn redeem_ticket(&mut self, frame: &str) -> Result<()> {
        let message = envelope::interpret(frame);
        match protocol::split_client(message) {
            None => Err(ProtocolViolation::InvalidFirstPacket.into()),
            Some((ClientMsgId::AccountSendTicket, body)) => {
                let msg = AccountSendTicket::from_body(body)?;
                let Some(ticket) = self.proxy.store.use_ticket(&msg.ticket) else {
                    self.client
                        .send(&AccountTicketResponseError.to_frame())
                        .await?;
                    return Err(ProtocolViolation::TicketNotFound.into());
                };
                self.connect_to_server(ticket).await
            }
            Some((other, _)) => {
                Err(ProtocolViolation::UnexpectedPacket(other.name().to_string()).into())
            }
        }
    }

    async fn connect_to_server(&mut self, ticket: Ticket) -> Result<()> {
        let addr = format!("{}:{}", ticket.host, ticket.port);
        let conn = tokio::time::timeout(
            Duration::from_secs(GAME_DIAL_TIMEOUT_SECS),
            TcpStream::connect(&addr),
        )
        .await
        .map_err(|_| anyhow::anyhow!("timed out dialing game server {}", addr))??;
        log::info!("game session for {} connected to server {}", self.peer, addr);

        let (server_rd, server_wr) = conn.into_split();
        let frames = spawn_reader(
            FrameReader::from_server(server_rd),
            self.scope.clone(),
            self.peer,
            "server",
        );
        self.server = Some(ServerSide {
            writer: FrameWriter::to_server(server_wr),
            frames,
        });
        self.ticket = Some(ticket);
        Ok(())
    }

    async fn handle_server_frame(&mut self, frame: &str) -> Result<()> {
        let split = protocol::split_server(frame);
        log::debug!(
            "game server -> client {}: {} {}",
            self.peer,
            split.map_or("unknown", |(id, _)| id.name()),
            frame
        );
        match split {
            Some((ServerMsgId::AksHelloGame, _)) if !self.connected.is_triggered() => {
                let original = match &self.ticket {
                    Some(ticket) => ticket.original.clone(),
                    None => anyhow::bail!("server hello before ticket redemption"),
                };
                let reply = AccountSendTicket { ticket: original }.to_frame();
                self.send_to_server(&reply).await?;
                self.connected.trigger();
                Ok(())
            }
            Some((ServerMsgId::GameMovement, body)) if self.proxy.talk_to_every_npc => {
                let msg = GameMovement::from_body(body)
                    .map_err(|e| ProtocolViolation::MalformedPacket(e.to_string()))?;
                for sprite in &msg.sprites {
                    if !msg.fight && sprite.kind >= 1 {
                        log::info!("character spotted: {} ({})", sprite.name, sprite.id);
                    }
                    if sprite.sprite_kind() == SpriteKind::Npc {
                        self.dialogs.enqueue_create(sprite.id);
                    }
                }
                self.client.send(frame).await
            }
            Some((
                id @ (ServerMsgId::DialogCreateError
                | ServerMsgId::DialogCreateSuccess
                | ServerMsgId::DialogQuestion
                | ServerMsgId::DialogLeave),
                _,
            )) if self.proxy.talk_to_every_npc => match self.dialogs.on_server_message(id) {
                Disposition::Consumed => Ok(()),
                Disposition::Forward => self.client.send(frame).await,
            },
            _ => self.client.send(frame).await,
        }
    }

    async fn flush_pending(&mut self) -> Result<()> {
        // Proxy-originated dialog traffic first, then any held client frames
        while let Some(frame) = self.dialogs.next_outbound() {
            self.send_to_server(&frame).await?;
        }
        while self.can_forward_client_frames() {
            let Some(frame) = self.held.pop_front() else {
                break;
            };
            self.forward_to_server(&frame).await?;
        }
        Ok(())
    }

    async fn forward_to_server(&mut self, frame: &str) -> Result<()> {
        log::debug!("game client {} -> server: {}", self.peer, frame);
        self.send_to_server(frame).await
    }

    async fn send_to_server(&mut self, frame: &str) -> Result<()> {
        match &mut self.server {
            Some(side) => side.writer.send(frame).await,
            None => anyhow::bail!("no upstream connection"),
        }
    }
}
