use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};

pub const JUST_NOW: &str = "Just now";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub content: String,
    /// Already formatted for display ("2 hours ago", "Just now", ...)
    pub timestamp: String,
    /// Styling only, carries no authorization meaning
    pub is_own: bool,
    pub encrypted: bool,
}

/// Append-only list of comments, in display order (oldest first).
#[derive(Clone, Debug, Default)]
pub struct CommentThread {
    comments: Vec<Comment>,
    last_id: i64,
}

impl CommentThread {
    pub fn new() -> Self {
        Self::default()
    }

    /// Thread opened with the three example comments shown on first load.
    pub fn seeded() -> Self {
        let comments = vec![
            Comment {
                id: "1".to_string(),
                author: "Sarah Chen".to_string(),
                content: "The technical approach looks solid, but I'd like to see more details on the security implementation. How will you handle key management across different environments?".to_string(),
                timestamp: "2 hours ago".to_string(),
                is_own: false,
                encrypted: true,
            },
            Comment {
                id: "2".to_string(),
                author: "You".to_string(),
                content: "Great question about key management. We're planning to use hardware security modules (HSMs) for production environments and a secure key derivation system for development.".to_string(),
                timestamp: "1 hour ago".to_string(),
                is_own: true,
                encrypted: true,
            },
            Comment {
                id: "3".to_string(),
                author: "Marcus Rodriguez".to_string(),
                content: "The budget allocation seems reasonable, though I wonder if we should allocate more resources to testing. Given the sensitive nature of this project, extensive security auditing will be crucial.".to_string(),
                timestamp: "45 minutes ago".to_string(),
                is_own: false,
                encrypted: true,
            },
        ];
        Self {
            comments,
            last_id: 3,
        }
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Appends the comment for a feedback that just went through.
    pub fn append_feedback(&mut self, author: &str, content: &str) -> Comment {
        let comment = Comment {
            id: self.next_id().to_string(),
            author: author.to_string(),
            content: content.to_string(),
            timestamp: JUST_NOW.to_string(),
            is_own: false,
            encrypted: true,
        };
        self.comments.push(comment.clone());
        comment
    }

    // Creation time in ms, bumped so ids stay unique within one millisecond
    fn next_id(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        self.last_id = now.max(self.last_id + 1);
        self.last_id
    }
}

/// The page's comment thread, shared by every session.
///
/// Appends are announced on a broadcast channel while the thread lock is
/// held, so a subscriber never misses or duplicates a comment relative to its
/// snapshot.
#[derive(Debug)]
pub struct SharedThread {
    thread: Mutex<CommentThread>,
    added: broadcast::Sender<Comment>,
}

pub const DEFAULT_UPDATE_CAPACITY: usize = 100;

impl SharedThread {
    pub fn new(thread: CommentThread) -> Self {
        Self::with_capacity(thread, DEFAULT_UPDATE_CAPACITY)
    }

    /// `capacity` is how many unread comments a subscriber may fall behind by.
    pub fn with_capacity(thread: CommentThread, capacity: usize) -> Self {
        let (added, _) = broadcast::channel(capacity);
        Self {
            thread: Mutex::new(thread),
            added,
        }
    }

    pub async fn append_feedback(&self, author: &str, content: &str) -> Comment {
        let mut thread = self.thread.lock().await;
        let comment = thread.append_feedback(author, content);
        // No subscriber just means no session is open
        let _ = self.added.send(comment.clone());
        comment
    }

    pub async fn snapshot(&self) -> Vec<Comment> {
        self.thread.lock().await.comments().to_vec()
    }

    pub async fn len(&self) -> usize {
        self.thread.lock().await.len()
    }

    /// Current comments plus a receiver for every comment appended after them.
    pub async fn subscribe(&self) -> (Vec<Comment>, broadcast::Receiver<Comment>) {
        let thread = self.thread.lock().await;
        (thread.comments().to_vec(), self.added.subscribe())
    }

    /// Swaps `receiver` for a fresh one and returns the matching snapshot.
    /// Used once a subscriber has lagged and lost comments.
    pub async fn resubscribe(&self, receiver: &mut broadcast::Receiver<Comment>) -> Vec<Comment> {
        let (comments, fresh) = self.subscribe().await;
        *receiver = fresh;
        comments
    }
}
