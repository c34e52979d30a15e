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

//! Server-bound messages the proxy actually parses or mints. Everything else
//! in the client catalog is forwarded verbatim and never materialized.

use anyhow::{Context, Result};

use crate::protocol::ClientMsgId;

pub trait ClientMessage {
    fn id(&self) -> ClientMsgId;
    fn serialize_body(&self) -> String;

    fn to_frame(&self) -> String {
        format!("{}{}", self.id().id(), self.serialize_body())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCredential {
    pub username: String,
    pub crypted: String,
}

impl AccountCredential {
    pub fn from_body(body: &str) -> Result<Self> {
        let (username, crypted) = body
            .split_once('#')
            .context("credential is missing the '#' separator")?;
        Ok(AccountCredential {
            username: username.to_string(),
            crypted: crypted.to_string(),
        })
    }
}

impl ClientMessage for AccountCredential {
    fn id(&self) -> ClientMsgId {
        ClientMsgId::AccountCredential
    }

    fn serialize_body(&self) -> String {
        format!("{}#{}", self.username, self.crypted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountSetServer {
    pub id: i32,
}

impl AccountSetServer {
    pub fn from_body(body: &str) -> Result<Self> {
        let id = body
            .strip_prefix("server=")
            .context("realm choice is missing the server= tag")?
            .parse()
            .context("realm choice id is not a number")?;
        Ok(AccountSetServer { id })
    }
}

impl ClientMessage for AccountSetServer {
    fn id(&self) -> ClientMsgId {
        ClientMsgId::AccountSetServer
    }

    fn serialize_body(&self) -> String {
        format!("server={}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSendTicket {
    pub ticket: String,
}

impl AccountSendTicket {
    pub fn from_body(body: &str) -> Result<Self> {
        Ok(AccountSendTicket {
            ticket: body.to_string(),
        })
    }
}

impl ClientMessage for AccountSendTicket {
    fn id(&self) -> ClientMsgId {
        ClientMsgId::AccountSendTicket
    }

    fn serialize_body(&self) -> String {
        self.ticket.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSendIdentity {
    pub identity: String,
}

impl ClientMessage for AccountSendIdentity {
    fn id(&self) -> ClientMsgId {
        ClientMsgId::AccountSendIdentity
    }

    fn serialize_body(&self) -> String {
        self.identity.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountConfiguredPort {
    pub port: String,
}

impl ClientMessage for AccountConfiguredPort {
    fn id(&self) -> ClientMsgId {
        ClientMsgId::AccountConfiguredPort
    }

    fn serialize_body(&self) -> String {
        self.port.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogCreate {
    pub npc_id: i64,
}

impl ClientMessage for DialogCreate {
    fn id(&self) -> ClientMsgId {
        ClientMsgId::DialogCreate
    }

    fn serialize_body(&self) -> String {
        self.npc_id.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogRequestLeave;

impl ClientMessage for DialogRequestLeave {
    fn id(&self) -> ClientMsgId {
        ClientMsgId::DialogRequestLeave
    }

    fn serialize_body(&self) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_body_round_trip() {
        let msg = AccountCredential::from_body("alice#2b7e15").unwrap();
        assert_eq!(msg.username, "alice");
        assert_eq!(msg.crypted, "2b7e15");
        assert_eq!(msg.to_frame(), "1HCalice#2b7e15");

        assert!(AccountCredential::from_body("no-separator").is_err());
    }

    #[test]
    fn test_set_server_body() {
        let msg = AccountSetServer::from_body("server=42").unwrap();
        assert_eq!(msg.id, 42);
        assert_eq!(msg.to_frame(), "AXserver=42");

        assert!(AccountSetServer::from_body("42").is_err());
        assert!(AccountSetServer::from_body("server=forty").is_err());
    }

    #[test]
    fn test_ticket_and_dialog_frames() {
        assert_eq!(
            AccountSendTicket {
                ticket: "abc".to_string()
            }
            .to_frame(),
            "ATabc"
        );
        assert_eq!(DialogCreate { npc_id: 55 }.to_frame(), "DC55");
        assert_eq!(DialogRequestLeave.to_frame(), "DV");
    }
}
