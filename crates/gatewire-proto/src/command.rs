//! Command and flag vocabulary.
//!
//! Codes 1-27 cover client events forwarded to workers and the control
//! commands workers push back to the gateway. Codes 200-205 are reserved
//! for the worker/gateway link itself (registration, heartbeat).
//!
//! The codec carries these as opaque tags; their operational meaning is
//! defined by the dispatch layer on either side of the link.

use std::str::FromStr;

use crate::error::ProtoError;

/// Flag bit: the body is a raw scalar and must not be deserialized.
pub const FLAG_BODY_IS_SCALAR: u8 = 0x01;

/// Flag bit: the gateway should skip protocol encoding when fanning the
/// body out to a group or broadcast. Carried opaquely by the codec.
pub const FLAG_NOT_CALL_ENCODE: u8 = 0x02;

/// Packet command code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Cmd {
    /// Gateway -> worker: a new client connection was accepted.
    OnConnect = 1,
    /// Gateway -> worker: a client sent a message.
    OnMessage = 3,
    /// Gateway -> worker: a client connection closed.
    OnClose = 4,
    /// Worker -> gateway: send the body to one connection.
    SendToOne = 5,
    /// Worker -> gateway: send the body to every connection.
    SendToAll = 6,
    /// Worker -> gateway: close a connection after pending sends drain.
    Kick = 7,
    /// Worker -> gateway: destroy a connection immediately.
    Destroy = 8,
    /// Worker -> gateway: merge fields into a connection's session.
    UpdateSession = 9,
    /// Worker -> gateway: fetch every online session.
    GetAllClientSessions = 10,
    /// Worker -> gateway: is this connection online?
    IsOnline = 11,
    /// Worker -> gateway: bind a connection to a uid.
    BindUid = 12,
    /// Worker -> gateway: remove a uid binding.
    UnbindUid = 13,
    /// Worker -> gateway: send the body to every connection bound to a uid.
    SendToUid = 14,
    /// Worker -> gateway: look up the connections bound to a uid.
    GetClientIdByUid = 15,
    /// Worker -> gateway: add a connection to a group.
    JoinGroup = 20,
    /// Worker -> gateway: remove a connection from a group.
    LeaveGroup = 21,
    /// Worker -> gateway: send the body to every group member.
    SendToGroup = 22,
    /// Worker -> gateway: fetch the sessions of a group's members.
    GetClientSessionsByGroup = 23,
    /// Worker -> gateway: count a group's online connections.
    GetClientCountByGroup = 24,
    /// Worker -> gateway: query connections by criteria.
    Select = 25,
    /// Worker -> gateway: list group ids with online members.
    GetGroupIdList = 26,
    /// Worker -> gateway: dissolve a group.
    Ungroup = 27,
    /// Worker -> gateway: a worker registered on the link.
    WorkerConnect = 200,
    /// Heartbeat.
    Ping = 201,
    /// Worker -> gateway: a gateway client registered on the link.
    GatewayClientConnect = 202,
    /// Worker -> gateway: fetch one connection's session.
    GetSessionByClientId = 203,
    /// Worker -> gateway: replace one connection's session.
    SetSession = 204,
    /// Gateway -> worker: a websocket client completed its handshake.
    OnWebSocketConnect = 205,
}

impl Cmd {
    /// Every command in the vocabulary, in code order.
    pub const ALL: [Cmd; 28] = [
        Cmd::OnConnect,
        Cmd::OnMessage,
        Cmd::OnClose,
        Cmd::SendToOne,
        Cmd::SendToAll,
        Cmd::Kick,
        Cmd::Destroy,
        Cmd::UpdateSession,
        Cmd::GetAllClientSessions,
        Cmd::IsOnline,
        Cmd::BindUid,
        Cmd::UnbindUid,
        Cmd::SendToUid,
        Cmd::GetClientIdByUid,
        Cmd::JoinGroup,
        Cmd::LeaveGroup,
        Cmd::SendToGroup,
        Cmd::GetClientSessionsByGroup,
        Cmd::GetClientCountByGroup,
        Cmd::Select,
        Cmd::GetGroupIdList,
        Cmd::Ungroup,
        Cmd::WorkerConnect,
        Cmd::Ping,
        Cmd::GatewayClientConnect,
        Cmd::GetSessionByClientId,
        Cmd::SetSession,
        Cmd::OnWebSocketConnect,
    ];

    /// Returns a human-readable name for the command.
    pub fn name(self) -> &'static str {
        match self {
            Cmd::OnConnect => "ON_CONNECT",
            Cmd::OnMessage => "ON_MESSAGE",
            Cmd::OnClose => "ON_CLOSE",
            Cmd::SendToOne => "SEND_TO_ONE",
            Cmd::SendToAll => "SEND_TO_ALL",
            Cmd::Kick => "KICK",
            Cmd::Destroy => "DESTROY",
            Cmd::UpdateSession => "UPDATE_SESSION",
            Cmd::GetAllClientSessions => "GET_ALL_CLIENT_SESSIONS",
            Cmd::IsOnline => "IS_ONLINE",
            Cmd::BindUid => "BIND_UID",
            Cmd::UnbindUid => "UNBIND_UID",
            Cmd::SendToUid => "SEND_TO_UID",
            Cmd::GetClientIdByUid => "GET_CLIENT_ID_BY_UID",
            Cmd::JoinGroup => "JOIN_GROUP",
            Cmd::LeaveGroup => "LEAVE_GROUP",
            Cmd::SendToGroup => "SEND_TO_GROUP",
            Cmd::GetClientSessionsByGroup => "GET_CLIENT_SESSIONS_BY_GROUP",
            Cmd::GetClientCountByGroup => "GET_CLIENT_COUNT_BY_GROUP",
            Cmd::Select => "SELECT",
            Cmd::GetGroupIdList => "GET_GROUP_ID_LIST",
            Cmd::Ungroup => "UNGROUP",
            Cmd::WorkerConnect => "WORKER_CONNECT",
            Cmd::Ping => "PING",
            Cmd::GatewayClientConnect => "GATEWAY_CLIENT_CONNECT",
            Cmd::GetSessionByClientId => "GET_SESSION_BY_CLIENT_ID",
            Cmd::SetSession => "SET_SESSION",
            Cmd::OnWebSocketConnect => "ON_WEBSOCKET_CONNECT",
        }
    }

    /// Returns true for client events the gateway forwards to workers.
    /// Everything else travels worker -> gateway.
    pub fn is_event(self) -> bool {
        matches!(
            self,
            Cmd::OnConnect | Cmd::OnMessage | Cmd::OnClose | Cmd::OnWebSocketConnect
        )
    }
}

impl TryFrom<u8> for Cmd {
    type Error = ProtoError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        let cmd = match code {
            1 => Cmd::OnConnect,
            3 => Cmd::OnMessage,
            4 => Cmd::OnClose,
            5 => Cmd::SendToOne,
            6 => Cmd::SendToAll,
            7 => Cmd::Kick,
            8 => Cmd::Destroy,
            9 => Cmd::UpdateSession,
            10 => Cmd::GetAllClientSessions,
            11 => Cmd::IsOnline,
            12 => Cmd::BindUid,
            13 => Cmd::UnbindUid,
            14 => Cmd::SendToUid,
            15 => Cmd::GetClientIdByUid,
            20 => Cmd::JoinGroup,
            21 => Cmd::LeaveGroup,
            22 => Cmd::SendToGroup,
            23 => Cmd::GetClientSessionsByGroup,
            24 => Cmd::GetClientCountByGroup,
            25 => Cmd::Select,
            26 => Cmd::GetGroupIdList,
            27 => Cmd::Ungroup,
            200 => Cmd::WorkerConnect,
            201 => Cmd::Ping,
            202 => Cmd::GatewayClientConnect,
            203 => Cmd::GetSessionByClientId,
            204 => Cmd::SetSession,
            205 => Cmd::OnWebSocketConnect,
            other => return Err(ProtoError::UnknownCmd(other)),
        };
        Ok(cmd)
    }
}

impl FromStr for Cmd {
    type Err = ProtoError;

    /// Accepts a decimal code or a command name (any case, `-` or `_`).
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = input.parse::<u8>() {
            return Cmd::try_from(code);
        }
        let normalized = input.to_ascii_uppercase().replace('-', "_");
        Cmd::ALL
            .into_iter()
            .find(|cmd| cmd.name() == normalized)
            .ok_or_else(|| ProtoError::UnknownCmdName(input.to_string()))
    }
}
