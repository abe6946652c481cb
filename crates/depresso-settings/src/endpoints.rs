//! Backend endpoint paths, relative to the active API or WebSocket base URL,
//! or to the peer-support platform's base URL for [`social`].

/// Media analysis endpoints
pub mod analysis {
    pub const UPLOAD_IMAGE: &str = "/analysis/image/";
    pub const UPLOAD_VIDEO: &str = "/analysis/video/";
    pub const GET_RESULTS: &str = "/analysis/results";
}

/// Chat endpoints
pub mod chat {
    /// WebSocket path, relative to the WebSocket base URL.
    pub const WEBSOCKET: &str = "/chat";
    pub const INTENT: &str = "/chat/intent/";
    pub const GENERATE: &str = "/chat/generate/";
}

/// Peer-support platform endpoints
pub mod social {
    pub const FEED: &str = "/feed";
    pub const POSTS: &str = "/posts";
    pub const COMMENTS: &str = "/comments";
    pub const CONVERSATIONS: &str = "/conversations";
    pub const MESSAGES: &str = "/messages";
    pub const MATCHES: &str = "/matches";
    pub const USERS: &str = "/users";
}
