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

use shared::protocol::{
    ServerMsgId,
    client::{ClientMessage, DialogCreate, DialogRequestLeave},
};

/// Auto-dialogue driver: serializes one NPC dialog at a time against the
/// upstream server and tracks how many are still outstanding. Client frames
/// stay in the session mailbox until the machine settles.
#[derive(Debug, Default)]
pub(super) struct DialogMachine {
    state: DialogState,
    outstanding: u32,
    outbound: VecDeque<Outbound>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DialogState {
    #[default]
    Idle,
    AwaitCreateResponse,
    AwaitQuestion,
    AwaitLeave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outbound {
    Create(i64),
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Disposition {
    Consumed,
    Forward,
}

impl DialogMachine {
    pub fn new() -> Self {
        DialogMachine::default()
    }

    /// True when no dialog is in flight and none is queued.
    pub fn is_settled(&self) -> bool {
        self.state == DialogState::Idle && self.outstanding == 0
    }

    pub fn enqueue_create(&mut self, npc_id: i64) {
        self.outstanding += 1;
        self.outbound.push_back(Outbound::Create(npc_id));
    }

    /// Feeds one dialog-family server frame through the machine. Frames that
    /// do not match the expected step are forwarded to the client untouched.
    pub fn on_server_message(&mut self, id: ServerMsgId) -> Disposition {
        match (id, self.state) {
            (ServerMsgId::DialogCreateError, DialogState::AwaitCreateResponse) => {
                self.state = DialogState::Idle;
                self.outstanding -= 1;
                Disposition::Consumed
            }
            (ServerMsgId::DialogCreateSuccess, DialogState::AwaitCreateResponse) => {
                self.state = DialogState::AwaitQuestion;
                Disposition::Consumed
            }
            (ServerMsgId::DialogQuestion, DialogState::AwaitQuestion) => {
                self.state = DialogState::AwaitLeave;
                // Leaving jumps the queue: it belongs to the dialog in flight
                self.outbound.push_front(Outbound::Leave);
                Disposition::Consumed
            }
            (ServerMsgId::DialogLeave, DialogState::AwaitLeave) => {
                self.state = DialogState::Idle;
                self.outstanding -= 1;
                Disposition::Consumed
            }
            _ => Disposition::Forward,
        }
    }

    /// Next frame ready to go upstream. A DialogCreate only leaves the queue
    /// while the machine is idle; the leave request goes out immediately.
    pub fn next_outbound(&mut self) -> Option<String> {
        match *self.outbound.front()? {
            Outbound::Leave => {
                self.outbound.pop_front();
                Some(DialogRequestLeave.to_frame())
            }
            Outbound::Create(npc_id) => {
                if self.state != DialogState::Idle {
                    return None;
                }
                self.outbound.pop_front();
                self.state = DialogState::AwaitCreateResponse;
                Some(DialogCreate { npc_id }.to_frame())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(machine: &mut DialogMachine) -> Vec<String> {
        let mut frames = Vec::new();
        while let Some(frame) = machine.next_outbound() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn test_full_dialog_cycle() {
        let mut machine = DialogMachine::new();
        assert!(machine.is_settled());

        machine.enqueue_create(55);
        assert!(!machine.is_settled());
        assert_eq!(drain(&mut machine), vec!["DC55".to_string()]);

        assert_eq!(
            machine.on_server_message(ServerMsgId::DialogCreateSuccess),
            Disposition::Consumed
        );
        assert_eq!(drain(&mut machine), Vec::<String>::new());

        assert_eq!(
            machine.on_server_message(ServerMsgId::DialogQuestion),
            Disposition::Consumed
        );
        assert_eq!(drain(&mut machine), vec!["DV".to_string()]);

        assert_eq!(
            machine.on_server_message(ServerMsgId::DialogLeave),
            Disposition::Consumed
        );
        assert!(machine.is_settled());
    }

    #[test]
    fn test_create_error_frees_the_machine() {
        let mut machine = DialogMachine::new();
        machine.enqueue_create(1);
        assert_eq!(drain(&mut machine), vec!["DC1".to_string()]);
        assert_eq!(
            machine.on_server_message(ServerMsgId::DialogCreateError),
            Disposition::Consumed
        );
        assert!(machine.is_settled());
    }

    #[test]
    fn test_dialogs_are_serialized() {
        let mut machine = DialogMachine::new();
        machine.enqueue_create(1);
        machine.enqueue_create(2);

        // Only the first create goes out until its dialog finishes
        assert_eq!(drain(&mut machine), vec!["DC1".to_string()]);
        machine.on_server_message(ServerMsgId::DialogCreateSuccess);
        machine.on_server_message(ServerMsgId::DialogQuestion);
        assert_eq!(drain(&mut machine), vec!["DV".to_string()]);
        machine.on_server_message(ServerMsgId::DialogLeave);

        assert!(!machine.is_settled());
        assert_eq!(drain(&mut machine), vec!["DC2".to_string()]);
        machine.on_server_message(ServerMsgId::DialogCreateError);
        assert!(machine.is_settled());
    }

    #[test]
    fn test_unexpected_dialog_frames_are_forwarded() {
        let mut machine = DialogMachine::new();
        assert_eq!(
            machine.on_server_message(ServerMsgId::DialogLeave),
            Disposition::Forward
        );
        assert_eq!(
            machine.on_server_message(ServerMsgId::DialogQuestion),
            Disposition::Forward
        );

        machine.enqueue_create(9);
        drain(&mut machine);
        // A question before the create response does not match the step
        assert_eq!(
            machine.on_server_message(ServerMsgId::DialogQuestion),
            Disposition::Forward
        );
    }
}
