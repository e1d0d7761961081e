//! In-Memory Store
//!
//! Process-local implementation of every repository trait, selected with
//! `database.backend = "memory"` and used by the test suites. All tables
//! sit behind one `parking_lot::RwLock`, so each repository call is atomic.
//! Deleting a user cascades the same way the PostgreSQL foreign keys do.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::domain::{
    Comment, DirectMessage, FollowRepository, MessageRepository, NewComment, NewMessage, NewPost,
    NewUser, Notification, NotificationKind, NotificationRepository, Post, PostFilter, PostLike,
    PostRepository, User, UserRepository, DEFAULT_BIO, DEFAULT_LINK,
};
use crate::shared::error::AppError;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    /// (follower, followee) in insertion order
    follows: Vec<(Uuid, Uuid)>,
    posts: HashMap<Uuid, Post>,
    likes: Vec<PostLike>,
    comments: Vec<Comment>,
    notifications: HashMap<Uuid, Notification>,
    messages: HashMap<Uuid, DirectMessage>,
    clock: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing timestamps keep `(created_at, id)` ordering
    /// identical to insertion order.
    fn now(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.clock {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.clock = Some(now);
        now
    }

    fn unique_violation(&self, username: &str, email: &str, except: Option<Uuid>) -> bool {
        self.users.values().any(|u| {
            Some(u.id) != except && (u.username == username || u.email == email)
        })
    }

    fn remove_posts(&mut self, doomed: &HashSet<Uuid>) {
        self.posts.retain(|id, _| !doomed.contains(id));
        self.likes.retain(|l| !doomed.contains(&l.post_id));
        self.comments.retain(|c| !doomed.contains(&c.post_id));
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, Uuid)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

/// In-memory repository backend.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, AppError> {
        let tables = self.tables.read();
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).cloned())
            .collect())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|u| Some(u.username.as_str()) == username || Some(u.email.as_str()) == email)
            .cloned())
    }

    async fn search(&self, fragment: &str, limit: i64) -> Result<Vec<User>, AppError> {
        let needle = fragment.to_lowercase();
        let mut found: Vec<User> = self
            .tables
            .read()
            .users
            .values()
            .filter(|u| u.username.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.username.cmp(&b.username));
        found.truncate(limit.max(0) as usize);
        Ok(found)
    }

    async fn sample_excluding(&self, exclude: &[Uuid], limit: i64) -> Result<Vec<User>, AppError> {
        let mut candidates: Vec<User> = self
            .tables
            .read()
            .users
            .values()
            .filter(|u| !exclude.contains(&u.id))
            .cloned()
            .collect();
        candidates.shuffle(&mut rand::rng());
        candidates.truncate(limit.max(0) as usize);
        Ok(candidates)
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write();
        if tables.unique_violation(&user.username, &user.email, None) {
            return Err(AppError::Conflict(
                "User with this email or username already exists".to_string(),
            ));
        }

        let now = tables.now();
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            bio: DEFAULT_BIO.to_string(),
            link: DEFAULT_LINK.to_string(),
            profile_img: user.profile_img,
            cover_img: user.cover_img,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        let mut tables = self.tables.write();
        if tables.unique_violation(&user.username, &user.email, Some(user.id)) {
            return Err(AppError::Conflict(
                "User with this email or username already exists".to_string(),
            ));
        }

        let now = tables.now();
        let stored = tables
            .users
            .get_mut(&user.id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        *stored = User {
            updated_at: now,
            created_at: stored.created_at,
            ..user.clone()
        };
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.write();
        if tables.users.remove(&id).is_none() {
            return Err(AppError::NotFound("User not found".into()));
        }

        tables.follows.retain(|(a, b)| *a != id && *b != id);

        let authored: HashSet<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        tables.remove_posts(&authored);
        tables.likes.retain(|l| l.user_id != id);
        tables.comments.retain(|c| c.author_id != id);
        tables
            .notifications
            .retain(|_, n| n.from_user_id != id && n.to_user_id != id);
        tables
            .messages
            .retain(|_, m| m.sender_id != id && m.receiver_id != id);
        Ok(())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.tables.read().users.values().any(|u| u.email == email))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .any(|u| u.username == username))
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn is_following(&self, follower: Uuid, followee: Uuid) -> Result<bool, AppError> {
        Ok(self.tables.read().follows.contains(&(follower, followee)))
    }

    async fn follow(&self, follower: Uuid, followee: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write();
        if tables.follows.contains(&(follower, followee)) {
            return Ok(false);
        }
        tables.follows.push((follower, followee));
        Ok(true)
    }

    async fn unfollow(&self, follower: Uuid, followee: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write();
        let before = tables.follows.len();
        tables.follows.retain(|edge| *edge != (follower, followee));
        Ok(tables.follows.len() != before)
    }

    async fn following_ids(&self, user: Uuid) -> Result<Vec<Uuid>, AppError> {
        Ok(self
            .tables
            .read()
            .follows
            .iter()
            .filter(|(a, _)| *a == user)
            .map(|(_, b)| *b)
            .collect())
    }

    async fn follower_ids(&self, user: Uuid) -> Result<Vec<Uuid>, AppError> {
        Ok(self
            .tables
            .read()
            .follows
            .iter()
            .filter(|(_, b)| *b == user)
            .map(|(a, _)| *a)
            .collect())
    }

    async fn followed_by_any(&self, users: &[Uuid]) -> Result<Vec<Uuid>, AppError> {
        let mut seen = HashSet::new();
        Ok(self
            .tables
            .read()
            .follows
            .iter()
            .filter(|(a, _)| users.contains(a))
            .map(|(_, b)| *b)
            .filter(|b| seen.insert(*b))
            .collect())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, post: NewPost) -> Result<Post, AppError> {
        let mut tables = self.tables.write();
        let now = tables.now();
        let post = Post {
            id: Uuid::new_v4(),
            author_id: post.author_id,
            title: post.title,
            description: post.description,
            image: post.image,
            created_at: now,
            updated_at: now,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, AppError> {
        Ok(self.tables.read().posts.get(&id).cloned())
    }

    async fn update(&self, post: &Post) -> Result<Post, AppError> {
        let mut tables = self.tables.write();
        let now = tables.now();
        let stored = tables
            .posts
            .get_mut(&post.id)
            .ok_or_else(|| AppError::NotFound("Post not found".into()))?;
        stored.title = post.title.clone();
        stored.description = post.description.clone();
        stored.image = post.image.clone();
        stored.updated_at = now;
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.tables.write().remove_posts(&HashSet::from([id]));
        Ok(())
    }

    async fn list(&self, filter: PostFilter) -> Result<Vec<Post>, AppError> {
        let tables = self.tables.read();
        let liked: HashSet<Uuid> = match &filter {
            PostFilter::LikedBy(user) => tables
                .likes
                .iter()
                .filter(|l| l.user_id == *user)
                .map(|l| l.post_id)
                .collect(),
            _ => HashSet::new(),
        };

        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| match &filter {
                PostFilter::All => true,
                PostFilter::ByAuthor(author) => p.author_id == *author,
                PostFilter::ByAuthors(authors) => authors.contains(&p.author_id),
                PostFilter::LikedBy(_) => liked.contains(&p.id),
            })
            .cloned()
            .collect();
        newest_first(&mut posts, |p| (p.created_at, p.id));
        Ok(posts)
    }

    async fn is_liked(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        Ok(self
            .tables
            .read()
            .likes
            .contains(&PostLike { post_id, user_id }))
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write();
        if !tables.posts.contains_key(&post_id) {
            return Err(AppError::NotFound("Post not found".into()));
        }
        let like = PostLike { post_id, user_id };
        if tables.likes.contains(&like) {
            return Ok(false);
        }
        tables.likes.push(like);
        Ok(true)
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write();
        let before = tables.likes.len();
        tables
            .likes
            .retain(|l| *l != PostLike { post_id, user_id });
        Ok(tables.likes.len() != before)
    }

    async fn likes_for(&self, post_ids: &[Uuid]) -> Result<Vec<PostLike>, AppError> {
        Ok(self
            .tables
            .read()
            .likes
            .iter()
            .filter(|l| post_ids.contains(&l.post_id))
            .copied()
            .collect())
    }

    async fn add_comment(&self, comment: NewComment) -> Result<Comment, AppError> {
        let mut tables = self.tables.write();
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(AppError::NotFound("Post not found".into()));
        }
        let now = tables.now();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created_at: now,
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn comments_for(&self, post_ids: &[Uuid]) -> Result<Vec<Comment>, AppError> {
        Ok(self
            .tables
            .read()
            .comments
            .iter()
            .filter(|c| post_ids.contains(&c.post_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn create(
        &self,
        from: Uuid,
        to: Uuid,
        kind: NotificationKind,
    ) -> Result<Notification, AppError> {
        let mut tables = self.tables.write();
        let notification = Notification {
            id: Uuid::new_v4(),
            from_user_id: from,
            to_user_id: to,
            kind,
            read: false,
            created_at: tables.now(),
        };
        tables
            .notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>, AppError> {
        Ok(self.tables.read().notifications.get(&id).cloned())
    }

    async fn list_for(&self, recipient: Uuid) -> Result<Vec<Notification>, AppError> {
        let mut found: Vec<Notification> = self
            .tables
            .read()
            .notifications
            .values()
            .filter(|n| n.to_user_id == recipient)
            .cloned()
            .collect();
        newest_first(&mut found, |n| (n.created_at, n.id));
        Ok(found)
    }

    async fn mark_all_read(&self, recipient: Uuid) -> Result<u64, AppError> {
        let mut updated = 0;
        for n in self.tables.write().notifications.values_mut() {
            if n.to_user_id == recipient && !n.read {
                n.read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn count_unread(&self, recipient: Uuid) -> Result<i64, AppError> {
        Ok(self
            .tables
            .read()
            .notifications
            .values()
            .filter(|n| n.to_user_id == recipient && !n.read)
            .count() as i64)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.tables.write().notifications.remove(&id);
        Ok(())
    }

    async fn delete_all_for(&self, recipient: Uuid) -> Result<u64, AppError> {
        let mut tables = self.tables.write();
        let before = tables.notifications.len();
        tables.notifications.retain(|_, n| n.to_user_id != recipient);
        Ok((before - tables.notifications.len()) as u64)
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn create(&self, message: NewMessage) -> Result<DirectMessage, AppError> {
        let mut tables = self.tables.write();
        for participant in [message.sender_id, message.receiver_id] {
            if !tables.users.contains_key(&participant) {
                return Err(AppError::NotFound("User not found".into()));
            }
        }

        let now = tables.now();
        let message = DirectMessage {
            id: Uuid::new_v4(),
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            content: message.content,
            read: false,
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        tables.messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DirectMessage>, AppError> {
        Ok(self.tables.read().messages.get(&id).cloned())
    }

    async fn list_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
        limit: i64,
    ) -> Result<Vec<DirectMessage>, AppError> {
        let mut found: Vec<DirectMessage> = self
            .tables
            .read()
            .messages
            .values()
            .filter(|m| {
                !m.deleted
                    && ((m.sender_id == user_a && m.receiver_id == user_b)
                        || (m.sender_id == user_b && m.receiver_id == user_a))
            })
            .cloned()
            .collect();
        newest_first(&mut found, |m| (m.created_at, m.id));
        found.truncate(limit.max(0) as usize);
        found.reverse();
        Ok(found)
    }

    async fn mark_read(&self, sender: Uuid, receiver: Uuid) -> Result<u64, AppError> {
        let mut tables = self.tables.write();
        let now = tables.now();
        let mut updated = 0;
        for m in tables.messages.values_mut() {
            if m.sender_id == sender && m.receiver_id == receiver && !m.read {
                m.read = true;
                m.updated_at = now;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn soft_delete(&self, id: Uuid, sender: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write();
        let now = tables.now();
        match tables.messages.get_mut(&id) {
            Some(m) if m.sender_id == sender => {
                m.deleted = true;
                m.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn latest_per_peer(&self, user: Uuid) -> Result<Vec<DirectMessage>, AppError> {
        let mut involving: Vec<DirectMessage> = self
            .tables
            .read()
            .messages
            .values()
            .filter(|m| !m.deleted && (m.sender_id == user || m.receiver_id == user))
            .cloned()
            .collect();
        newest_first(&mut involving, |m| (m.created_at, m.id));

        let mut seen = HashSet::new();
        involving.retain(|m| seen.insert(m.peer_of(user)));
        Ok(involving)
    }

    async fn unread_counts_by_sender(&self, user: Uuid) -> Result<Vec<(Uuid, i64)>, AppError> {
        let mut counts: HashMap<Uuid, i64> = HashMap::new();
        for m in self.tables.read().messages.values() {
            if m.is_unread_by(user) {
                *counts.entry(m.sender_id).or_default() += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }

    async fn partner_ids(&self, user: Uuid) -> Result<Vec<Uuid>, AppError> {
        let partners: HashSet<Uuid> = self
            .tables
            .read()
            .messages
            .values()
            .filter(|m| m.sender_id == user || m.receiver_id == user)
            .map(|m| m.peer_of(user))
            .filter(|peer| *peer != user)
            .collect();
        Ok(partners.into_iter().collect())
    }

    async fn count_unread(&self, user: Uuid) -> Result<i64, AppError> {
        Ok(self
            .tables
            .read()
            .messages
            .values()
            .filter(|m| m.is_unread_by(user))
            .count() as i64)
    }
}
