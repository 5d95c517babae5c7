//! Transformers registered for the blog entities.
//!
//! | Type   | Key       | Fields                                  |
//! |--------|-----------|-----------------------------------------|
//! | `user` | `default` | `name`, `email`, `memberSince`          |
//! | `user` | `admin`   | default fields + `isAdmin`              |
//! | `post` | `default` | `title`, `body`, `created`              |
//! | `post` | `summary` | `title`, `wordCount`                    |
//! | `tag`  | `default` | `name`                                  |

use serde_json::Value;

use super::{Post, Tag, User};
use crate::registry::{StrategyRegistry, DEFAULT_KEY};
use crate::transform::Mapping;

/// Registry holding every blog transformer.
pub fn registry() -> StrategyRegistry {
    let mut registry = StrategyRegistry::new();
    registry
        .register_typed::<User, _>(DEFAULT_KEY, user)
        .register_typed::<User, _>("admin", user_admin)
        .register_typed::<Post, _>(DEFAULT_KEY, post)
        .register_typed::<Post, _>("summary", post_summary)
        .register_typed::<Tag, _>(DEFAULT_KEY, tag);
    registry
}

fn user(user: &User) -> Mapping {
    let mut out = Mapping::new();
    out.insert("name".into(), user.name().into());
    out.insert("email".into(), user.email().into());
    out.insert("memberSince".into(), user.created_at().timestamp().into());
    out
}

fn user_admin(user: &User) -> Mapping {
    let mut out = self::user(user);
    out.insert("isAdmin".into(), Value::Bool(user.is_admin()));
    out
}

fn post(post: &Post) -> Mapping {
    let mut out = Mapping::new();
    out.insert("title".into(), post.title().into());
    out.insert("body".into(), post.body().into());
    out.insert("created".into(), post.created_at().timestamp().into());
    out
}

fn post_summary(post: &Post) -> Mapping {
    let mut out = Mapping::new();
    out.insert("title".into(), post.title().into());
    out.insert("wordCount".into(), post.word_count().into());
    out
}

fn tag(tag: &Tag) -> Mapping {
    let mut out = Mapping::new();
    out.insert("name".into(), tag.name().into());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::fixtures;
    use crate::entity::TypedEntity;
    use serde_json::json;

    #[test]
    fn test_registry_is_valid() {
        let registry = registry();
        assert!(registry.validate().is_ok());
        assert_eq!(registry.strategy_keys(User::TYPE), vec!["admin", "default"]);
        assert_eq!(registry.strategy_keys(Post::TYPE), vec!["default", "summary"]);
        assert_eq!(registry.strategy_keys(Tag::TYPE), vec!["default"]);
    }

    #[test]
    fn test_admin_extends_default() {
        let store = fixtures::store();
        let ada = store.user(1).unwrap();

        let mut expected = user(&ada);
        expected.insert("isAdmin".into(), json!(true));
        assert_eq!(user_admin(&ada), expected);
    }

    #[test]
    fn test_post_fields() {
        let store = fixtures::store();
        let post = store.post(1).unwrap();
        assert_eq!(
            Value::Object(self::post(&post)),
            json!({
                "title": "Ownership",
                "body": "Ownership body text",
                "created": post.created_at().timestamp(),
            })
        );
        assert_eq!(post_summary(&post)["wordCount"], 3);
    }
}
