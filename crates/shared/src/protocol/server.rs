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

//! Client-bound messages the proxy parses or mints.

use anyhow::{Context, Result};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::protocol::ServerMsgId;

pub trait ServerMessage {
    fn id(&self) -> ServerMsgId;
    fn serialize_body(&self) -> String;

    fn to_frame(&self) -> String {
        format!("{}{}", self.id().id(), self.serialize_body())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AksHelloGame;

impl ServerMessage for AksHelloGame {
    fn id(&self) -> ServerMsgId {
        ServerMsgId::AksHelloGame
    }

    fn serialize_body(&self) -> String {
        String::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLoginSuccess {
    pub authorized: bool,
    pub extra: String,
}

impl AccountLoginSuccess {
    pub fn from_body(body: &str) -> Result<Self> {
        let (flag, extra) = body
            .split_once('|')
            .context("login success is missing the authorized flag")?;
        let authorized = match flag {
            "1" => true,
            "0" => false,
            other => anyhow::bail!("bad authorized flag: {}", other),
        };
        Ok(AccountLoginSuccess {
            authorized,
            extra: extra.to_string(),
        })
    }
}

impl ServerMessage for AccountLoginSuccess {
    fn id(&self) -> ServerMsgId {
        ServerMsgId::AccountLoginSuccess
    }

    fn serialize_body(&self) -> String {
        format!("{}|{}", if self.authorized { "1" } else { "0" }, self.extra)
    }
}

// The two selection replies share the `h{host};{port};{ticket}` body form
fn parse_address_body(body: &str) -> Result<(String, String, String)> {
    let body = body
        .strip_prefix('h')
        .context("selection reply is missing the address tag")?;
    let mut fields = body.splitn(3, ';');
    let host = fields.next().context("missing host")?;
    let port = fields.next().context("missing port")?;
    let ticket = fields.next().context("missing ticket")?;
    Ok((host.to_string(), port.to_string(), ticket.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSelectServerSuccess {
    pub host: String,
    pub port: String,
    pub ticket: String,
}

impl AccountSelectServerSuccess {
    pub fn from_body(body: &str) -> Result<Self> {
        let (host, port, ticket) = parse_address_body(body)?;
        Ok(AccountSelectServerSuccess { host, port, ticket })
    }
}

impl ServerMessage for AccountSelectServerSuccess {
    fn id(&self) -> ServerMsgId {
        ServerMsgId::AccountSelectServerSuccess
    }

    fn serialize_body(&self) -> String {
        format!("h{};{};{}", self.host, self.port, self.ticket)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSelectServerPlainSuccess {
    pub host: String,
    pub port: String,
    pub ticket: String,
}

impl AccountSelectServerPlainSuccess {
    pub fn from_body(body: &str) -> Result<Self> {
        let (host, port, ticket) = parse_address_body(body)?;
        Ok(AccountSelectServerPlainSuccess { host, port, ticket })
    }
}

impl ServerMessage for AccountSelectServerPlainSuccess {
    fn id(&self) -> ServerMsgId {
        ServerMsgId::AccountSelectServerPlainSuccess
    }

    fn serialize_body(&self) -> String {
        format!("h{};{};{}", self.host, self.port, self.ticket)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountTicketResponseError;

impl ServerMessage for AccountTicketResponseError {
    fn id(&self) -> ServerMsgId {
        ServerMsgId::AccountTicketResponseError
    }

    fn serialize_body(&self) -> String {
        String::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum SpriteKind {
    Unknown = 0,
    Character = 1,
    Npc = 2,
    Monster = 3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    pub id: i64,
    pub kind: i32,
    pub name: String,
}

impl Sprite {
    pub fn sprite_kind(&self) -> SpriteKind {
        SpriteKind::try_from(self.kind).unwrap_or(SpriteKind::Unknown)
    }
}

/// Map movement update: `{fight 0|1}` then one `|{id};{kind};{name}` group
/// per sprite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMovement {
    pub fight: bool,
    pub sprites: Vec<Sprite>,
}

impl GameMovement {
    pub fn from_body(body: &str) -> Result<Self> {
        let mut groups = body.split('|');
        let fight = match groups.next() {
            Some("1") => true,
            Some("0") => false,
            _ => anyhow::bail!("movement is missing the fight flag"),
        };
        let mut sprites = Vec::new();
        for group in groups {
            let mut fields = group.splitn(3, ';');
            let id = fields
                .next()
                .context("missing sprite id")?
                .parse()
                .context("sprite id is not a number")?;
            let kind = fields
                .next()
                .context("missing sprite kind")?
                .parse()
                .context("sprite kind is not a number")?;
            let name = fields.next().unwrap_or_default().to_string();
            sprites.push(Sprite { id, kind, name });
        }
        Ok(GameMovement { fight, sprites })
    }
}

impl ServerMessage for GameMovement {
    fn id(&self) -> ServerMsgId {
        ServerMsgId::GameMovement
    }

    fn serialize_body(&self) -> String {
        let mut body = String::from(if self.fight { "1" } else { "0" });
        for sprite in &self.sprites {
            body.push_str(&format!("|{};{};{}", sprite.id, sprite.kind, sprite.name));
        }
        body
    }
}
