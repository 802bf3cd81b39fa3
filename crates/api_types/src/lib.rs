//! Wire types shared between the murmur server and its clients.
//!
//! These are explicit input DTOs and outward views: requests carry only the
//! fields a client may set, and no view ever contains password material or
//! unconsumed tokens.

pub mod user {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    /// Signup request.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub name: String,
        pub email: String,
        pub password: String,
    }

    /// Profile edit request; absent fields are left unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserUpdate {
        pub name: Option<String>,
        pub password: Option<String>,
    }

    /// A user as shown to other users.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub activated: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UsersResponse {
        pub users: Vec<UserView>,
    }
}

pub mod follow {
    use serde::{Deserialize, Serialize};

    /// Response body for the membership test endpoint.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FollowState {
        pub following: bool,
    }

    /// Follower/following counters for a profile page.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FollowCounts {
        pub followers: u64,
        pub followings: u64,
    }
}

pub mod status {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    /// Request body for posting a status.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusNew {
        pub content: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusView {
        pub id: Uuid,
        pub user_id: Uuid,
        pub content: String,
        pub created_at: DateTime<Utc>,
    }

    /// One page of a timeline, newest first.
    ///
    /// `next_cursor` is opaque; pass it back verbatim to get the next page.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FeedResponse {
        pub statuses: Vec<StatusView>,
        pub next_cursor: Option<String>,
    }
}

pub mod password {
    use serde::{Deserialize, Serialize};

    /// Request body for mailing a reset link.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ResetRequest {
        pub email: String,
    }

    /// Request body for consuming a reset token.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ResetPerform {
        pub token: String,
        pub password: String,
    }
}
