//! In-memory store for the blog domain.
//!
//! Loads a [`Dataset`] from JSON (a file, a string, or the embedded seed),
//! checks ids and pivot rows, and hands out entity handles. The store is
//! read-only once loaded and shared through `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::entities::{Post, Tag, User};
use super::{Dataset, PostRecord, TagRecord, UserRecord};
use crate::entity::{EntityRef, EntityType, Page, TypedEntity};
use crate::error::{StoreError, StoreResult};

/// Seed data compiled into the binary
pub const SEED: &str = include_str!("../../data/blog.json");

/// Collections exposed by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Posts,
    Tags,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Users, Collection::Posts, Collection::Tags];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Posts => "posts",
            Collection::Tags => "tags",
        }
    }

    /// Type of the entities in this collection.
    pub fn entity_type(&self) -> EntityType {
        match self {
            Collection::Users => User::TYPE,
            Collection::Posts => Post::TYPE,
            Collection::Tags => Tag::TYPE,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "users" | "user" => Ok(Collection::Users),
            "posts" | "post" => Ok(Collection::Posts),
            "tags" | "tag" => Ok(Collection::Tags),
            other => Err(StoreError::UnknownCollection(other.to_string())),
        }
    }
}

/// Read-only blog data with id indexes.
#[derive(Debug)]
pub struct Store {
    users: Vec<UserRecord>,
    posts: Vec<PostRecord>,
    tags: Vec<TagRecord>,
    user_index: HashMap<u64, usize>,
    post_index: HashMap<u64, usize>,
    tag_index: HashMap<u64, usize>,
    /// post id -> tag ids, in pivot order
    post_tags: HashMap<u64, Vec<u64>>,
    /// tag id -> post ids, in pivot order
    tag_posts: HashMap<u64, Vec<u64>>,
}

impl Store {
    /// Build a store from a dataset. Records are ordered by id.
    pub fn from_dataset(dataset: Dataset) -> StoreResult<Arc<Self>> {
        let Dataset {
            mut users,
            mut posts,
            mut tags,
            post_tags: pivots,
        } = dataset;
        users.sort_by_key(|u| u.id);
        posts.sort_by_key(|p| p.id);
        tags.sort_by_key(|t| t.id);

        let user_index = index("users", users.iter().map(|u| u.id))?;
        let post_index = index("posts", posts.iter().map(|p| p.id))?;
        let tag_index = index("tags", tags.iter().map(|t| t.id))?;

        let mut post_tags: HashMap<u64, Vec<u64>> = HashMap::new();
        let mut tag_posts: HashMap<u64, Vec<u64>> = HashMap::new();
        for pivot in pivots {
            if !post_index.contains_key(&pivot.post_id) || !tag_index.contains_key(&pivot.tag_id) {
                return Err(StoreError::DanglingPivot {
                    post_id: pivot.post_id,
                    tag_id: pivot.tag_id,
                });
            }
            post_tags.entry(pivot.post_id).or_default().push(pivot.tag_id);
            tag_posts.entry(pivot.tag_id).or_default().push(pivot.post_id);
        }

        Ok(Arc::new(Self {
            users,
            posts,
            tags,
            user_index,
            post_index,
            tag_index,
            post_tags,
            tag_posts,
        }))
    }

    pub fn from_json(json: &str) -> StoreResult<Arc<Self>> {
        Self::from_dataset(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> StoreResult<Arc<Self>> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Store built from the embedded seed data.
    pub fn seeded() -> StoreResult<Arc<Self>> {
        Self::from_json(SEED)
    }

    /// Load `path` when given, the embedded seed otherwise.
    pub fn load(path: Option<&Path>) -> StoreResult<Arc<Self>> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::seeded(),
        }
    }

    pub fn len(&self, collection: Collection) -> usize {
        match collection {
            Collection::Users => self.users.len(),
            Collection::Posts => self.posts.len(),
            Collection::Tags => self.tags.len(),
        }
    }

    // -------------------------------------------------------------------------
    // Typed lookups
    // -------------------------------------------------------------------------

    pub fn user(self: &Arc<Self>, id: u64) -> Option<User> {
        let record = &self.users[*self.user_index.get(&id)?];
        Some(User::new(record.clone(), Arc::clone(self)))
    }

    pub fn post(self: &Arc<Self>, id: u64) -> Option<Post> {
        let record = &self.posts[*self.post_index.get(&id)?];
        Some(Post::new(record.clone(), Arc::clone(self)))
    }

    pub fn tag(self: &Arc<Self>, id: u64) -> Option<Tag> {
        let record = &self.tags[*self.tag_index.get(&id)?];
        Some(Tag::new(record.clone(), Arc::clone(self)))
    }

    pub fn user_ref(self: &Arc<Self>, id: u64) -> Option<EntityRef> {
        self.user(id).map(|u| Arc::new(u) as EntityRef)
    }

    pub fn post_ref(self: &Arc<Self>, id: u64) -> Option<EntityRef> {
        self.post(id).map(|p| Arc::new(p) as EntityRef)
    }

    pub fn tag_ref(self: &Arc<Self>, id: u64) -> Option<EntityRef> {
        self.tag(id).map(|t| Arc::new(t) as EntityRef)
    }

    // -------------------------------------------------------------------------
    // Collections
    // -------------------------------------------------------------------------

    pub fn users(self: &Arc<Self>) -> Vec<EntityRef> {
        self.users
            .iter()
            .map(|r| Arc::new(User::new(r.clone(), Arc::clone(self))) as EntityRef)
            .collect()
    }

    pub fn posts(self: &Arc<Self>) -> Vec<EntityRef> {
        self.posts
            .iter()
            .map(|r| Arc::new(Post::new(r.clone(), Arc::clone(self))) as EntityRef)
            .collect()
    }

    pub fn tags(self: &Arc<Self>) -> Vec<EntityRef> {
        self.tags
            .iter()
            .map(|r| Arc::new(Tag::new(r.clone(), Arc::clone(self))) as EntityRef)
            .collect()
    }

    pub fn all(self: &Arc<Self>, collection: Collection) -> Vec<EntityRef> {
        match collection {
            Collection::Users => self.users(),
            Collection::Posts => self.posts(),
            Collection::Tags => self.tags(),
        }
    }

    pub fn find(self: &Arc<Self>, collection: Collection, id: u64) -> StoreResult<EntityRef> {
        let found = match collection {
            Collection::Users => self.user_ref(id),
            Collection::Posts => self.post_ref(id),
            Collection::Tags => self.tag_ref(id),
        };
        found.ok_or(StoreError::NotFound {
            collection: collection.as_str(),
            id,
        })
    }

    /// Page `page` (1-based) of a collection.
    pub fn paginate(self: &Arc<Self>, collection: Collection, page: usize, per_page: usize) -> Page {
        Page::paginate(self.all(collection), page, per_page)
    }

    // -------------------------------------------------------------------------
    // Relations
    // -------------------------------------------------------------------------

    pub(crate) fn posts_by_author(self: &Arc<Self>, user_id: u64) -> Vec<EntityRef> {
        self.posts
            .iter()
            .filter(|p| p.user_id == Some(user_id))
            .map(|r| Arc::new(Post::new(r.clone(), Arc::clone(self))) as EntityRef)
            .collect()
    }

    pub(crate) fn tags_of_post(self: &Arc<Self>, post_id: u64) -> Vec<EntityRef> {
        self.post_tags
            .get(&post_id)
            .map(|ids| ids.iter().filter_map(|&id| self.tag_ref(id)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn posts_with_tag(self: &Arc<Self>, tag_id: u64) -> Vec<EntityRef> {
        self.tag_posts
            .get(&tag_id)
            .map(|ids| ids.iter().filter_map(|&id| self.post_ref(id)).collect())
            .unwrap_or_default()
    }
}

fn index(collection: &'static str, ids: impl Iterator<Item = u64>) -> StoreResult<HashMap<u64, usize>> {
    let mut index = HashMap::new();
    for (position, id) in ids.enumerate() {
        if index.insert(id, position).is_some() {
            return Err(StoreError::DuplicateId { collection, id });
        }
    }
    Ok(index)
}
