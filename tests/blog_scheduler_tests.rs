use ideaforge::blog::{BlogPipeline, BlogSchedulerHandle};
use ideaforge::db::DbActorHandle;
use ideaforge::keys::KeyStore;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

async fn spawn_scheduler(
    tag: &str,
    topics: &[&str],
    interval: Option<Duration>,
) -> (BlogSchedulerHandle, DbActorHandle) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "ideaforge-blog-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    let db = ideaforge::db::spawn(&format!("sqlite:{}", temp_path.display()))
        .await
        .expect("db actor spawn");

    // No provider keys: drafts and covers come from the offline templates.
    let cfg = ideaforge::config::Config::default();
    let store: Arc<dyn KeyStore> = Arc::new(db.clone());
    let providers = ideaforge::providers::Providers::new(store, &cfg).expect("providers");

    let scheduler = ideaforge::blog::spawn(
        BlogPipeline::from_providers(&providers, db.clone()),
        topics.iter().map(|t| (*t).to_string()).collect(),
        interval,
    )
    .await
    .expect("blog scheduler spawn");
    (scheduler, db)
}

#[tokio::test]
async fn run_once_drains_queue_in_order() {
    let (scheduler, db) = spawn_scheduler(
        "drain",
        &["validating demand", "Validating Demand", "hiring a first engineer"],
        None,
    )
    .await;

    assert_eq!(
        scheduler.queued().await.unwrap(),
        vec![
            "validating demand".to_string(),
            "hiring a first engineer".to_string()
        ]
    );

    let first = scheduler.run_once().await.unwrap().expect("post");
    assert_eq!(first.topic, "validating demand");
    assert!(first.degraded);
    assert!(first.cover_url.is_some());
    assert!(!first.content.trim().is_empty());
    assert!(first.excerpt.chars().count() <= 280);
    assert!(
        first
            .slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    );

    let second = scheduler.run_once().await.unwrap().expect("post");
    assert_eq!(second.topic, "hiring a first engineer");

    assert!(scheduler.run_once().await.unwrap().is_none());
    assert!(scheduler.queued().await.unwrap().is_empty());

    let posts = db.list_blog_posts(10).await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, second.id);
}

#[tokio::test]
async fn same_topic_twice_gets_distinct_slugs() {
    let (scheduler, _db) = spawn_scheduler("slugs", &[], None).await;

    assert_eq!(scheduler.enqueue(vec!["pricing".to_string()]).await.unwrap(), 1);
    let a = scheduler.run_once().await.unwrap().expect("post");

    // Once drained, the topic may be queued again.
    assert_eq!(scheduler.enqueue(vec!["pricing".to_string()]).await.unwrap(), 1);
    let b = scheduler.run_once().await.unwrap().expect("post");

    assert_ne!(a.slug, b.slug);
    assert_eq!(b.slug, format!("{}-2", a.slug));
}

#[tokio::test]
async fn interval_timer_publishes_without_manual_trigger() {
    let (_scheduler, db) = spawn_scheduler(
        "timer",
        &["bootstrapping vs fundraising"],
        Some(Duration::from_millis(50)),
    )
    .await;

    let mut posts = Vec::new();
    for _ in 0..100 {
        posts = db.list_blog_posts(10).await.unwrap();
        if !posts.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].topic, "bootstrapping vs fundraising");
}
