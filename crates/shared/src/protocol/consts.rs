// Wire ids, server-bound (client to server)
pub const ACCOUNT_CREDENTIAL: &str = "1HC";
pub const ACCOUNT_SET_SERVER: &str = "AX";
pub const ACCOUNT_SEND_TICKET: &str = "AT";
pub const ACCOUNT_SEND_IDENTITY: &str = "Ai";
pub const ACCOUNT_CONFIGURED_PORT: &str = "Ap";
pub const DIALOG_CREATE: &str = "DC";
pub const DIALOG_REQUEST_LEAVE: &str = "DV";

// Wire ids, client-bound (server to client)
pub const AKS_HELLO_CONNECT: &str = "HC";
pub const AKS_HELLO_GAME: &str = "Hg";
pub const ACCOUNT_LOGIN_SUCCESS: &str = "AlK";
pub const ACCOUNT_SELECT_SERVER_SUCCESS: &str = "AYS";
pub const ACCOUNT_SELECT_SERVER_PLAIN_SUCCESS: &str = "AYR";
pub const ACCOUNT_SELECT_SERVER_ERROR: &str = "AYE";
pub const ACCOUNT_TICKET_RESPONSE_SUCCESS: &str = "ATK";
pub const ACCOUNT_TICKET_RESPONSE_ERROR: &str = "ATE";
pub const GAME_MOVEMENT: &str = "GM";
pub const DIALOG_CREATE_SUCCESS: &str = "DCK";
pub const DIALOG_CREATE_ERROR: &str = "DCE";
pub const DIALOG_QUESTION: &str = "DQ";
pub const DIALOG_LEAVE: &str = "DV";

// Some client frames arrive wrapped in a signature envelope delimited by
// this sentinel (Latin-1 byte 0xF9)
pub const ENVELOPE_SENTINEL: char = '\u{f9}';
pub const ENVELOPE_SENTINEL_COUNT: usize = 3;
