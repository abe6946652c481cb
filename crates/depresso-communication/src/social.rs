//! Peer-support platform client
//!
//! Community feed, comments, one-to-one conversations with peers or the AI
//! companion, peer matching and online status. The platform answers in
//! camelCase JSON, with each payload wrapped in a named field.

use depresso_core::Result;
use depresso_settings::{endpoints, Config};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::http::{read_json, request_error};

/// Sender id the platform reports for companion messages.
pub const AI_SENDER_ID: &str = "ai_assistant";

/// Role a member takes on the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Looking for support
    Needer,
    /// Offering support
    Helper,
}

/// Whether a conversation is with the companion or a person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Ai,
    Human,
}

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    User,
    Ai,
}

/// Feed post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub timestamp: String,
    #[serde(default)]
    pub hearts: u32,
    /// Number of comments
    #[serde(default)]
    pub replies: u32,
    #[serde(default)]
    pub is_anonymous: bool,
}

/// Comment under a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    pub timestamp: String,
    #[serde(default)]
    pub hearts: u32,
}

/// Conversation between a member and a peer or the companion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    /// One participant for companion conversations, two otherwise
    pub participants: Vec<String>,
    #[serde(rename = "type")]
    pub kind: ConversationKind,
    pub created_at: String,
    #[serde(default)]
    pub last_activity: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// Message inside a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerMessage {
    pub id: String,
    pub conversation_id: String,
    /// [`AI_SENDER_ID`] for companion messages
    pub sender_id: String,
    pub sender_type: SenderType,
    pub content: String,
    pub timestamp: String,
}

impl PeerMessage {
    pub fn is_from_ai(&self) -> bool {
        self.sender_type == SenderType::Ai
    }
}

/// Online member offered as a support partner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerMatch {
    pub id: String,
    pub user_type: UserType,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub last_active: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewPost<'a> {
    author_id: &'a str,
    content: &'a str,
    tags: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewComment<'a> {
    post_id: &'a str,
    author_id: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewConversation<'a> {
    user1_id: &'a str,
    user2_id: Option<&'a str>,
    #[serde(rename = "type")]
    kind: ConversationKind,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewMessage<'a> {
    conversation_id: &'a str,
    sender_id: &'a str,
    content: &'a str,
    sender_type: SenderType,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusUpdate {
    is_online: bool,
}

#[derive(Deserialize)]
struct PostsResponse {
    posts: Vec<Post>,
}

#[derive(Deserialize)]
struct PostResponse {
    post: Post,
}

#[derive(Deserialize)]
struct CommentsResponse {
    comments: Vec<Comment>,
}

#[derive(Deserialize)]
struct CommentResponse {
    comment: Comment,
}

#[derive(Deserialize)]
struct ConversationsResponse {
    conversations: Vec<Conversation>,
}

#[derive(Deserialize)]
struct ConversationResponse {
    conversation: Conversation,
}

#[derive(Deserialize)]
struct MessagesResponse {
    messages: Vec<PeerMessage>,
}

#[derive(Deserialize)]
struct MessageResponse {
    message: PeerMessage,
}

#[derive(Deserialize)]
struct MatchesResponse {
    matches: Vec<PeerMatch>,
}

#[derive(Deserialize)]
struct StatusResponse {}

/// HTTP client for the peer-support platform
#[derive(Debug, Clone)]
pub struct SocialClient {
    http: reqwest::Client,
    config: Arc<Config>,
}

impl SocialClient {
    pub fn new(config: Arc<Config>) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: Arc<Config>) -> Self {
        Self { http, config }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.social.anon_key.as_deref() {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.config.build_social_url(path);
        tracing::debug!("GET {}", url);
        let response = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(request_error)?;
        read_json(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let url = self.config.build_social_url(path);
        tracing::debug!("POST {}", url);
        let response = self
            .authorize(self.http.post(url).json(body))
            .send()
            .await
            .map_err(request_error)?;
        read_json(response).await
    }

    /// Latest posts, newest first
    pub async fn feed(&self) -> Result<Vec<Post>> {
        let body: PostsResponse = self.get(endpoints::social::FEED).await?;
        Ok(body.posts)
    }

    pub async fn create_post(&self, author_id: &str, content: &str, tags: &[String]) -> Result<Post> {
        let request = NewPost {
            author_id,
            content,
            tags,
        };
        let body: PostResponse = self.post(endpoints::social::POSTS, &request).await?;
        tracing::info!("Created post {}", body.post.id);
        Ok(body.post)
    }

    /// Comments on a post, oldest first
    pub async fn comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        let path = format!("{}/{}/comments", endpoints::social::POSTS, post_id);
        let body: CommentsResponse = self.get(&path).await?;
        Ok(body.comments)
    }

    pub async fn add_comment(&self, post_id: &str, author_id: &str, content: &str) -> Result<Comment> {
        let request = NewComment {
            post_id,
            author_id,
            content,
        };
        let body: CommentResponse = self.post(endpoints::social::COMMENTS, &request).await?;
        Ok(body.comment)
    }

    /// Conversations the user takes part in, most recently active first
    pub async fn conversations(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let path = format!("{}/{}/conversations", endpoints::social::USERS, user_id);
        let body: ConversationsResponse = self.get(&path).await?;
        Ok(body.conversations)
    }

    /// Open a conversation with a peer, or with the companion when `peer_id`
    /// is `None`.
    pub async fn start_conversation(&self, user_id: &str, peer_id: Option<&str>) -> Result<Conversation> {
        let request = NewConversation {
            user1_id: user_id,
            user2_id: peer_id,
            kind: if peer_id.is_some() {
                ConversationKind::Human
            } else {
                ConversationKind::Ai
            },
        };
        let body: ConversationResponse =
            self.post(endpoints::social::CONVERSATIONS, &request).await?;
        tracing::info!(
            "Started {:?} conversation {}",
            body.conversation.kind,
            body.conversation.id
        );
        Ok(body.conversation)
    }

    /// Messages in a conversation, oldest first
    pub async fn messages(&self, conversation_id: &str) -> Result<Vec<PeerMessage>> {
        let path = format!(
            "{}/{}/messages",
            endpoints::social::CONVERSATIONS,
            conversation_id
        );
        let body: MessagesResponse = self.get(&path).await?;
        Ok(body.messages)
    }

    /// Send a message as the user. In companion conversations the platform
    /// adds its reply shortly afterwards; fetch it with [`Self::messages`].
    pub async fn send_message(
        &self,
        conversation_id: &str,
        sender_id: &str,
        content: &str,
    ) -> Result<PeerMessage> {
        let request = NewMessage {
            conversation_id,
            sender_id,
            content,
            sender_type: SenderType::User,
        };
        let body: MessageResponse = self.post(endpoints::social::MESSAGES, &request).await?;
        Ok(body.message)
    }

    /// Online members who can be paired with the user
    pub async fn matches(&self, user_id: &str) -> Result<Vec<PeerMatch>> {
        let path = format!("{}/{}", endpoints::social::MATCHES, user_id);
        let body: MatchesResponse = self.get(&path).await?;
        Ok(body.matches)
    }

    pub async fn set_online(&self, user_id: &str, is_online: bool) -> Result<()> {
        let path = format!("{}/{}/status", endpoints::social::USERS, user_id);
        let _: StatusResponse = self.post(&path, &StatusUpdate { is_online }).await?;
        tracing::debug!("User {} online: {}", user_id, is_online);
        Ok(())
    }
}
