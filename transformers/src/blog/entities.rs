//! Entity handles over store records.
//!
//! A handle pairs a record with the store it came from, so relations are
//! loaded lazily when an inclusion asks for them.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::store::Store;
use super::{PostRecord, TagRecord, UserRecord};
use crate::entity::{Entity, EntityType, TypedEntity};
use crate::error::EntityError;
use crate::transform::Shape;

/// Age at which `isOfAge` becomes true
pub const AGE_OF_MAJORITY: u32 = 18;

// =============================================================================
// User
// =============================================================================

#[derive(Clone)]
pub struct User {
    record: UserRecord,
    store: Arc<Store>,
}

impl User {
    pub(crate) fn new(record: UserRecord, store: Arc<Store>) -> Self {
        Self { record, store }
    }

    pub fn id(&self) -> u64 {
        self.record.id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn email(&self) -> &str {
        &self.record.email
    }

    pub fn is_admin(&self) -> bool {
        self.record.is_admin
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.record.created_at
    }

    pub fn record(&self) -> &UserRecord {
        &self.record
    }

    /// Whole years between the birth date and `on`.
    pub fn age_on(&self, on: NaiveDate) -> u32 {
        let birth = self.record.birth_date;
        let mut years = on.year() - birth.year();
        if (on.month(), on.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        years.max(0) as u32
    }

    pub fn age(&self) -> u32 {
        self.age_on(Utc::now().date_naive())
    }

    pub fn is_of_age(&self) -> bool {
        self.age() >= AGE_OF_MAJORITY
    }
}

impl Entity for User {
    fn entity_type(&self) -> EntityType {
        Self::TYPE
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        let r = &self.record;
        match name {
            "id" => Some(r.id.into()),
            "name" => Some(r.name.clone().into()),
            "email" => Some(r.email.clone().into()),
            "birth_date" => Some(r.birth_date.to_string().into()),
            "is_admin" => Some(r.is_admin.into()),
            "created_at" => Some(r.created_at.to_rfc3339().into()),
            _ => None,
        }
    }

    fn accessor(&self, name: &str) -> Option<Value> {
        match name {
            "isOfAge" => Some(self.is_of_age().into()),
            "age" => Some(self.age().into()),
            _ => None,
        }
    }

    fn related(&self, name: &str) -> Result<Option<Shape>, EntityError> {
        match name {
            "posts" => Ok(Some(Shape::Sequence(self.store.posts_by_author(self.id())))),
            _ => Ok(None),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl TypedEntity for User {
    const TYPE: EntityType = EntityType::new("user");
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("User").field(&self.record).finish()
    }
}

// =============================================================================
// Post
// =============================================================================

#[derive(Clone)]
pub struct Post {
    record: PostRecord,
    store: Arc<Store>,
}

impl Post {
    pub(crate) fn new(record: PostRecord, store: Arc<Store>) -> Self {
        Self { record, store }
    }

    pub fn id(&self) -> u64 {
        self.record.id
    }

    pub fn title(&self) -> &str {
        &self.record.title
    }

    pub fn body(&self) -> &str {
        &self.record.body
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.record.created_at
    }

    pub fn record(&self) -> &PostRecord {
        &self.record
    }

    pub fn word_count(&self) -> usize {
        self.record.body.split_whitespace().count()
    }
}

impl Entity for Post {
    fn entity_type(&self) -> EntityType {
        Self::TYPE
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        let r = &self.record;
        match name {
            "id" => Some(r.id.into()),
            "user_id" => Some(r.user_id.map_or(Value::Null, Value::from)),
            "title" => Some(r.title.clone().into()),
            "body" => Some(r.body.clone().into()),
            "created_at" => Some(r.created_at.to_rfc3339().into()),
            _ => None,
        }
    }

    fn accessor(&self, name: &str) -> Option<Value> {
        (name == "wordCount").then(|| self.word_count().into())
    }

    fn related(&self, name: &str) -> Result<Option<Shape>, EntityError> {
        match name {
            "author" => {
                let author = self.record.user_id.and_then(|id| self.store.user_ref(id));
                Ok(Some(Shape::from(author)))
            }
            "tags" => Ok(Some(Shape::Sequence(self.store.tags_of_post(self.id())))),
            _ => Ok(None),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl TypedEntity for Post {
    const TYPE: EntityType = EntityType::new("post");
}

impl fmt::Debug for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Post").field(&self.record).finish()
    }
}

// =============================================================================
// Tag
// =============================================================================

#[derive(Clone)]
pub struct Tag {
    record: TagRecord,
    store: Arc<Store>,
}

impl Tag {
    pub(crate) fn new(record: TagRecord, store: Arc<Store>) -> Self {
        Self { record, store }
    }

    pub fn id(&self) -> u64 {
        self.record.id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// Lowercase, dash-separated form of the name.
    pub fn slug(&self) -> String {
        self.record
            .name
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl Entity for Tag {
    fn entity_type(&self) -> EntityType {
        Self::TYPE
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.record.id.into()),
            "name" => Some(self.record.name.clone().into()),
            _ => None,
        }
    }

    fn accessor(&self, name: &str) -> Option<Value> {
        (name == "slug").then(|| self.slug().into())
    }

    fn related(&self, name: &str) -> Result<Option<Shape>, EntityError> {
        match name {
            "posts" => Ok(Some(Shape::Sequence(self.store.posts_with_tag(self.id())))),
            _ => Ok(None),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl TypedEntity for Tag {
    const TYPE: EntityType = EntityType::new("tag");
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tag").field(&self.record).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::fixtures;

    #[test]
    fn test_age_on_birthday_boundary() {
        let store = fixtures::store();
        let ada = store.user(1).unwrap(); // born 1990-06-15

        assert_eq!(ada.age_on(NaiveDate::from_ymd_opt(2008, 6, 14).unwrap()), 17);
        assert_eq!(ada.age_on(NaiveDate::from_ymd_opt(2008, 6, 15).unwrap()), 18);
        assert!(ada.is_of_age());
    }

    #[test]
    fn test_minor_is_not_of_age() {
        let store = fixtures::store();
        let linus = store.user(3).unwrap();
        assert!(!linus.is_of_age());
        assert_eq!(linus.accessor("isOfAge"), Some(Value::Bool(false)));
    }

    #[test]
    fn test_relation_names() {
        let store = fixtures::store();
        let post = store.post(1).unwrap();

        assert_eq!(post.related("tags").unwrap().unwrap().len(), 4);
        assert_eq!(post.related("author").unwrap().unwrap().kind(), "single");
        assert!(post.related("isOfAge").unwrap().is_none());
    }

    #[test]
    fn test_orphan_author_is_absent() {
        let store = fixtures::store();
        let orphan = store.post(fixtures::ORPHAN_POST).unwrap();
        let author = orphan.related("author").unwrap().unwrap();
        assert_eq!(author.kind(), "absent");
        assert_eq!(orphan.attribute("user_id"), Some(Value::Null));
    }

    #[test]
    fn test_tag_slug_and_posts() {
        let store = fixtures::store();
        let tag = store.tag(4).unwrap();
        assert_eq!(tag.slug(), "testing");
        assert_eq!(tag.related("posts").unwrap().unwrap().len(), 2);
    }
}
