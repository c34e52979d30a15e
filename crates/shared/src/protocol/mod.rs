pub mod client;
pub mod codec;
pub mod consts;
pub mod envelope;
pub mod server;

use self::consts as ids;

/// Server-bound message kinds (client to server direction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMsgId {
    AccountCredential,
    AccountSetServer,
    AccountSendTicket,
    AccountSendIdentity,
    AccountConfiguredPort,
    DialogCreate,
    DialogRequestLeave,
}

impl ClientMsgId {
    pub const ALL: [ClientMsgId; 7] = [
        ClientMsgId::AccountCredential,
        ClientMsgId::AccountSetServer,
        ClientMsgId::AccountSendTicket,
        ClientMsgId::AccountSendIdentity,
        ClientMsgId::AccountConfiguredPort,
        ClientMsgId::DialogCreate,
        ClientMsgId::DialogRequestLeave,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ClientMsgId::AccountCredential => ids::ACCOUNT_CREDENTIAL,
            ClientMsgId::AccountSetServer => ids::ACCOUNT_SET_SERVER,
            ClientMsgId::AccountSendTicket => ids::ACCOUNT_SEND_TICKET,
            ClientMsgId::AccountSendIdentity => ids::ACCOUNT_SEND_IDENTITY,
            ClientMsgId::AccountConfiguredPort => ids::ACCOUNT_CONFIGURED_PORT,
            ClientMsgId::DialogCreate => ids::DIALOG_CREATE,
            ClientMsgId::DialogRequestLeave => ids::DIALOG_REQUEST_LEAVE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ClientMsgId::AccountCredential => "AccountCredential",
            ClientMsgId::AccountSetServer => "AccountSetServer",
            ClientMsgId::AccountSendTicket => "AccountSendTicket",
            ClientMsgId::AccountSendIdentity => "AccountSendIdentity",
            ClientMsgId::AccountConfiguredPort => "AccountConfiguredPort",
            ClientMsgId::DialogCreate => "DialogCreate",
            ClientMsgId::DialogRequestLeave => "DialogRequestLeave",
        }
    }
}

/// Client-bound message kinds (server to client direction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMsgId {
    AksHelloConnect,
    AksHelloGame,
    AccountLoginSuccess,
    AccountSelectServerSuccess,
    AccountSelectServerPlainSuccess,
    AccountSelectServerError,
    AccountTicketResponseSuccess,
    AccountTicketResponseError,
    GameMovement,
    DialogCreateSuccess,
    DialogCreateError,
    DialogQuestion,
    DialogLeave,
}

impl ServerMsgId {
    pub const ALL: [ServerMsgId; 13] = [
        ServerMsgId::AksHelloConnect,
        ServerMsgId::AksHelloGame,
        ServerMsgId::AccountLoginSuccess,
        ServerMsgId::AccountSelectServerSuccess,
        ServerMsgId::AccountSelectServerPlainSuccess,
        ServerMsgId::AccountSelectServerError,
        ServerMsgId::AccountTicketResponseSuccess,
        ServerMsgId::AccountTicketResponseError,
        ServerMsgId::GameMovement,
        ServerMsgId::DialogCreateSuccess,
        ServerMsgId::DialogCreateError,
        ServerMsgId::DialogQuestion,
        ServerMsgId::DialogLeave,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ServerMsgId::AksHelloConnect => ids::AKS_HELLO_CONNECT,
            ServerMsgId::AksHelloGame => ids::AKS_HELLO_GAME,
            ServerMsgId::AccountLoginSuccess => ids::ACCOUNT_LOGIN_SUCCESS,
            ServerMsgId::AccountSelectServerSuccess => ids::ACCOUNT_SELECT_SERVER_SUCCESS,
            ServerMsgId::AccountSelectServerPlainSuccess => {
                ids::ACCOUNT_SELECT_SERVER_PLAIN_SUCCESS
            }
            ServerMsgId::AccountSelectServerError => ids::ACCOUNT_SELECT_SERVER_ERROR,
            ServerMsgId::AccountTicketResponseSuccess => ids::ACCOUNT_TICKET_RESPONSE_SUCCESS,
            ServerMsgId::AccountTicketResponseError => ids::ACCOUNT_TICKET_RESPONSE_ERROR,
            ServerMsgId::GameMovement => ids::GAME_MOVEMENT,
            ServerMsgId::DialogCreateSuccess => ids::DIALOG_CREATE_SUCCESS,
            ServerMsgId::DialogCreateError => ids::DIALOG_CREATE_ERROR,
            ServerMsgId::DialogQuestion => ids::DIALOG_QUESTION,
            ServerMsgId::DialogLeave => ids::DIALOG_LEAVE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ServerMsgId::AksHelloConnect => "AksHelloConnect",
            ServerMsgId::AksHelloGame => "AksHelloGame",
            ServerMsgId::AccountLoginSuccess => "AccountLoginSuccess",
            ServerMsgId::AccountSelectServerSuccess => "AccountSelectServerSuccess",
            ServerMsgId::AccountSelectServerPlainSuccess => "AccountSelectServerPlainSuccess",
            ServerMsgId::AccountSelectServerError => "AccountSelectServerError",
            ServerMsgId::AccountTicketResponseSuccess => "AccountTicketResponseSuccess",
            ServerMsgId::AccountTicketResponseError => "AccountTicketResponseError",
            ServerMsgId::GameMovement => "GameMovement",
            ServerMsgId::DialogCreateSuccess => "DialogCreateSuccess",
            ServerMsgId::DialogCreateError => "DialogCreateError",
            ServerMsgId::DialogQuestion => "DialogQuestion",
            ServerMsgId::DialogLeave => "DialogLeave",
        }
    }
}

/// Longest-prefix match of a frame against the server-bound catalog.
/// Returns the message kind and the body after the id.
pub fn split_client(frame: &str) -> Option<(ClientMsgId, &str)> {
    let mut best: Option<(ClientMsgId, &str)> = None;
    for kind in ClientMsgId::ALL {
        let id = kind.id();
        if frame.starts_with(id)
            && best.is_none_or(|(current, _)| id.len() > current.id().len())
        {
            best = Some((kind, &frame[id.len()..]));
        }
    }
    best
}

/// Longest-prefix match of a frame against the client-bound catalog.
pub fn split_server(frame: &str) -> Option<(ServerMsgId, &str)> {
    let mut best: Option<(ServerMsgId, &str)> = None;
    for kind in ServerMsgId::ALL {
        let id = kind.id();
        if frame.starts_with(id)
            && best.is_none_or(|(current, _)| id.len() > current.id().len())
        {
            best = Some((kind, &frame[id.len()..]));
        }
    }
    best
}

// Channel types between a socket reader task and its session loop
pub type FrameSender = flume::Sender<String>;
pub type FrameReceiver = flume::Receiver<String>;

pub fn frame_pair() -> (FrameSender, FrameReceiver) {
    flume::bounded(crate::consts::CHANNEL_SIZE)
}

/// Un-buffered rendezvous: the sender blocks until the receiver takes the
/// value, pairing each realm choice with exactly one server reply.
pub fn server_id_pair() -> (flume::Sender<i32>, flume::Receiver<i32>) {
    flume::bounded(0)
}
