use ideaforge::ForgeError;
use ideaforge::db::{KeyPatch, KeyUpdate, NewApiKey, NewBlogPost};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_database_url(tag: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "ideaforge-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    format!("sqlite:{}", path.display())
}

fn new_key(provider: &str, secret: &str) -> NewApiKey {
    NewApiKey {
        provider: provider.to_string(),
        secret: secret.to_string(),
    }
}

fn new_post(slug: &str, degraded: bool) -> NewBlogPost {
    NewBlogPost {
        slug: slug.to_string(),
        title: "Shipping an MVP".to_string(),
        excerpt: "Short excerpt".to_string(),
        content: "# Shipping an MVP".to_string(),
        topic: "mvp".to_string(),
        cover_url: None,
        cover_credit: None,
        degraded,
    }
}

#[tokio::test]
async fn key_lifecycle_through_db_actor() {
    let db = ideaforge::db::spawn(&temp_database_url("keys"))
        .await
        .expect("db actor spawn");

    assert!(db.list_active_keys("content-gen").await.unwrap().is_empty());

    let first = db
        .create_key(new_key("content-gen", "secret-one"))
        .await
        .unwrap();
    let second = db
        .create_key(new_key("content-gen", "secret-two"))
        .await
        .unwrap();
    let image = db
        .create_key(new_key("image-search", "secret-img"))
        .await
        .unwrap();

    assert!(first.id > 0);
    assert!(first.active);
    assert_eq!(first.daily_usage, 0);
    assert!(second.id > first.id);

    // Duplicate secret returns the stored row, no new row.
    let dup = db
        .create_key(new_key("content-gen", "secret-one"))
        .await
        .unwrap();
    assert_eq!(dup.id, first.id);
    assert_eq!(db.list_keys(None).await.unwrap().len(), 3);

    let active = db.list_active_keys("content-gen").await.unwrap();
    assert_eq!(
        active.iter().map(|k| k.id).collect::<Vec<_>>(),
        vec![first.id, second.id]
    );
    let images = db.list_keys(Some("image-search")).await.unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].id, image.id);

    // Usage bump plus deactivation in one patch.
    db.update_key(KeyUpdate {
        id: first.id,
        patch: KeyPatch {
            daily_usage: Some(50),
            active: Some(false),
            ..Default::default()
        },
    })
    .await
    .unwrap();

    let stored = db.get_key(first.id).await.unwrap();
    assert_eq!(stored.daily_usage, 50);
    assert!(!stored.active);
    assert_eq!(stored.secret, "secret-one");

    let active = db.list_active_keys("content-gen").await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, second.id);

    let by_secret = db.get_key_by_secret("secret-two").await.unwrap();
    assert_eq!(by_secret.map(|k| k.id), Some(second.id));
    assert!(db.get_key_by_secret("missing").await.unwrap().is_none());

    // Unknown ids.
    let err = db
        .update_key(KeyUpdate {
            id: 9_999,
            patch: KeyPatch {
                active: Some(true),
                ..Default::default()
            },
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ForgeError::KeyNotFound(9_999)));
    assert!(matches!(
        db.get_key(9_999).await.unwrap_err(),
        ForgeError::KeyNotFound(9_999)
    ));

    assert!(db.delete_key(second.id).await.unwrap());
    assert!(!db.delete_key(second.id).await.unwrap());
    assert!(db.list_active_keys("content-gen").await.unwrap().is_empty());
}

#[tokio::test]
async fn record_usage_increments_in_place_and_caps() {
    let db = ideaforge::db::spawn(&temp_database_url("usage"))
        .await
        .expect("db actor spawn");
    let key = db
        .create_key(new_key("content-gen", "secret-usage"))
        .await
        .unwrap();

    let mut counts = Vec::new();
    for _ in 0..3 {
        counts.push(db.record_usage(key.id, 4).await.unwrap().daily_usage);
    }
    assert_eq!(counts, vec![1, 2, 3]);
    assert!(db.get_key(key.id).await.unwrap().active);

    let fourth = db.record_usage(key.id, 4).await.unwrap();
    assert_eq!(fourth.daily_usage, 4);
    assert!(!fourth.active);

    // A reset followed by a late success starts over from zero.
    db.update_key(KeyUpdate {
        id: key.id,
        patch: KeyPatch {
            active: Some(true),
            daily_usage: Some(0),
            last_reset: Some(chrono::Utc::now()),
        },
    })
    .await
    .unwrap();
    let late = db.record_usage(key.id, 4).await.unwrap();
    assert_eq!(late.daily_usage, 1);
    assert!(late.active);

    assert!(matches!(
        db.record_usage(9_999, 4).await.unwrap_err(),
        ForgeError::KeyNotFound(9_999)
    ));
}

#[tokio::test]
async fn blog_posts_get_unique_slugs_and_list_newest_first() {
    let db = ideaforge::db::spawn(&temp_database_url("blog"))
        .await
        .expect("db actor spawn");

    let a = db.create_blog_post(new_post("shipping-an-mvp", false)).await.unwrap();
    let b = db.create_blog_post(new_post("shipping-an-mvp", true)).await.unwrap();
    let c = db.create_blog_post(new_post("shipping-an-mvp", false)).await.unwrap();

    assert_eq!(a.slug, "shipping-an-mvp");
    assert_eq!(b.slug, "shipping-an-mvp-2");
    assert_eq!(c.slug, "shipping-an-mvp-3");
    assert!(b.degraded);

    let posts = db.list_blog_posts(2).await.unwrap();
    assert_eq!(
        posts.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![c.id, b.id]
    );
}
