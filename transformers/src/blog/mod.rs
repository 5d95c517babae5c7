//! Blog domain used by the CLI, the HTTP API and the tests.
//!
//! - [`UserRecord`], [`PostRecord`], [`TagRecord`] - stored rows
//! - [`User`], [`Post`], [`Tag`] - entity handles with relations
//! - [`Store`] - in-memory store loaded from JSON seed data
//! - [`strategies`] - the transformers registered for each type
//!
//! Relations:
//!
//! ```text
//! User ──posts──▶ Post ──tags──▶ Tag
//!  ▲               │  ▲            │
//!  └────author─────┘  └───posts────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod entities;
pub mod store;
pub mod strategies;

pub use entities::{Post, Tag, User};
pub use store::{Collection, Store};

// =============================================================================
// Records
// =============================================================================

/// A stored user row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// A stored post row. `user_id` may be unset or point nowhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostRecord {
    pub id: u64,
    #[serde(default)]
    pub user_id: Option<u64>,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A stored tag row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TagRecord {
    pub id: u64,
    pub name: String,
}

/// Post/tag pivot row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostTag {
    pub post_id: u64,
    pub tag_id: u64,
}

/// Everything a seed file contains.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub posts: Vec<PostRecord>,
    #[serde(default)]
    pub tags: Vec<TagRecord>,
    #[serde(default)]
    pub post_tags: Vec<PostTag>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small datasets shared by tests across the crate.

    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    /// Post 5 has no author.
    pub const ORPHAN_POST: u64 = 5;
    /// User 2 wrote nothing.
    pub const USER_WITHOUT_POSTS: u64 = 2;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
    }

    fn user(id: u64, name: &str, birth_year: i32) -> UserRecord {
        UserRecord {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            birth_date: NaiveDate::from_ymd_opt(birth_year, 6, 15).unwrap(),
            is_admin: id == 1,
            created_at: at(id as u32),
        }
    }

    fn post(id: u64, user_id: Option<u64>, title: &str) -> PostRecord {
        PostRecord {
            id,
            user_id,
            title: title.to_string(),
            body: format!("{} body text", title),
            created_at: at(10 + id as u32),
        }
    }

    fn pivot(post_id: u64, tag_ids: &[u64]) -> Vec<PostTag> {
        tag_ids
            .iter()
            .map(|&tag_id| PostTag { post_id, tag_id })
            .collect()
    }

    /// User 1 has three posts with 4, 2 and 0 tags; user 2 has none;
    /// user 3 is a minor; post 4 belongs to user 3; post 5 is orphaned.
    pub fn dataset() -> Dataset {
        let tags = ["rust", "serde", "api", "testing", "unused"];
        Dataset {
            users: vec![user(1, "Ada", 1990), user(2, "Grace", 1985), user(3, "Linus", 2015)],
            posts: vec![
                post(1, Some(1), "Ownership"),
                post(2, Some(1), "Borrowing"),
                post(3, Some(1), "Lifetimes"),
                post(4, Some(3), "Homework"),
                post(ORPHAN_POST, None, "Anonymous"),
            ],
            tags: tags
                .iter()
                .enumerate()
                .map(|(i, name)| TagRecord {
                    id: i as u64 + 1,
                    name: name.to_string(),
                })
                .collect(),
            post_tags: [pivot(1, &[1, 2, 3, 4]), pivot(2, &[1, 3]), pivot(4, &[4])].concat(),
        }
    }

    pub fn store() -> Arc<Store> {
        Store::from_dataset(dataset()).unwrap()
    }

    /// `n` users and nothing else.
    pub fn users(n: u64) -> Arc<Store> {
        Store::from_dataset(Dataset {
            users: (1..=n).map(|id| user(id, &format!("User{}", id), 1990)).collect(),
            ..Dataset::default()
        })
        .unwrap()
    }
}
