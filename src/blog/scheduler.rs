use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::slug::slugify;
use crate::db::{BlogPost, DbActorHandle, NewBlogPost};
use crate::error::ForgeError;
use crate::providers::Providers;
use crate::providers::content_gen::BlogWriter;
use crate::providers::image_search::CoverImageFinder;

const EXCERPT_MAX_CHARS: usize = 280;

#[derive(Debug)]
enum BlogSchedulerMessage {
    /// Append topics; replies with how many were new.
    Enqueue(Vec<String>, RpcReplyPort<usize>),
    /// Snapshot of the queue, front first.
    Queued(RpcReplyPort<Vec<String>>),
    /// Process the front topic now.
    RunOnce(RpcReplyPort<Result<Option<BlogPost>, ForgeError>>),
    /// Interval timer.
    Tick,
}

/// What one generated post needs.
#[derive(Clone)]
pub struct BlogPipeline {
    pub writer: Arc<BlogWriter>,
    pub images: Arc<CoverImageFinder>,
    pub db: DbActorHandle,
}

impl BlogPipeline {
    pub fn from_providers(providers: &Providers, db: DbActorHandle) -> Self {
        Self {
            writer: providers.blog_writer.clone(),
            images: providers.images.clone(),
            db,
        }
    }

    /// Topic → draft → cover → stored post.
    ///
    /// A missing cover does not fail the post; a failed draft does.
    pub async fn publish(&self, topic: &str) -> Result<BlogPost, ForgeError> {
        let draft = self.writer.invoke(&topic.to_string()).await?;
        let mut degraded = draft.degraded;
        let draft = draft.output;

        let cover = match self.images.find(topic).await {
            Ok(image) => {
                degraded |= image.degraded;
                Some(image.output)
            }
            Err(e) => {
                warn!(topic, error = %e, "cover image lookup failed, storing post without cover");
                None
            }
        };

        let excerpt: String = draft.excerpt.trim().chars().take(EXCERPT_MAX_CHARS).collect();
        let post = NewBlogPost {
            slug: slugify(&draft.title),
            title: draft.title.trim().to_string(),
            excerpt,
            content: draft.to_markdown(),
            topic: topic.to_string(),
            cover_url: cover.as_ref().map(|c| c.url.clone()),
            cover_credit: cover.map(|c| c.credit),
            degraded,
        };
        self.db.create_blog_post(post).await
    }
}

#[derive(Clone)]
pub struct BlogSchedulerHandle {
    actor: ActorRef<BlogSchedulerMessage>,
}

impl BlogSchedulerHandle {
    pub async fn enqueue(&self, topics: Vec<String>) -> Result<usize, ForgeError> {
        ractor::call!(self.actor, BlogSchedulerMessage::Enqueue, topics).map_err(|e| {
            ForgeError::RactorError(format!("BlogScheduler Enqueue RPC failed: {e}"))
        })
    }

    pub async fn queued(&self) -> Result<Vec<String>, ForgeError> {
        ractor::call!(self.actor, BlogSchedulerMessage::Queued).map_err(|e| {
            ForgeError::RactorError(format!("BlogScheduler Queued RPC failed: {e}"))
        })
    }

    /// Generate and store a post for the front topic. `Ok(None)` when the queue is empty.
    pub async fn run_once(&self) -> Result<Option<BlogPost>, ForgeError> {
        ractor::call!(self.actor, BlogSchedulerMessage::RunOnce).map_err(|e| {
            ForgeError::RactorError(format!("BlogScheduler RunOnce RPC failed: {e}"))
        })?
    }
}

struct BlogSchedulerState {
    queue: VecDeque<String>,
    pipeline: BlogPipeline,
}

impl BlogSchedulerState {
    fn push_topics(&mut self, topics: Vec<String>) -> usize {
        let mut added = 0;
        for topic in topics {
            let topic = topic.trim();
            if topic.is_empty() || self.queue.iter().any(|q| q.eq_ignore_ascii_case(topic)) {
                continue;
            }
            self.queue.push_back(topic.to_string());
            added += 1;
        }
        added
    }

    async fn process_next(&mut self) -> Result<Option<BlogPost>, ForgeError> {
        let Some(topic) = self.queue.pop_front() else {
            debug!("blog queue empty, nothing to publish");
            return Ok(None);
        };

        match self.pipeline.publish(&topic).await {
            Ok(post) => {
                info!(
                    topic = %topic,
                    post.id = post.id,
                    slug = %post.slug,
                    degraded = post.degraded,
                    remaining = self.queue.len(),
                    "blog post published"
                );
                Ok(Some(post))
            }
            Err(e) => {
                warn!(topic = %topic, error = %e, "blog generation failed, topic dropped");
                Err(e)
            }
        }
    }
}

struct BlogSchedulerActor;

#[ractor::async_trait]
impl Actor for BlogSchedulerActor {
    type Msg = BlogSchedulerMessage;
    type State = BlogSchedulerState;
    type Arguments = (BlogPipeline, Vec<String>, Option<Duration>);

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        (pipeline, topics, interval): Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let mut state = BlogSchedulerState {
            queue: VecDeque::new(),
            pipeline,
        };
        let queued = state.push_topics(topics);

        if let Some(interval) = interval {
            myself.send_interval(interval, || BlogSchedulerMessage::Tick);
        }
        info!(
            queued,
            interval_secs = interval.map(|d| d.as_secs()),
            "BlogScheduler initialized"
        );
        Ok(state)
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            BlogSchedulerMessage::Enqueue(topics, reply) => {
                let added = state.push_topics(topics);
                let _ = reply.send(added);
            }
            BlogSchedulerMessage::Queued(reply) => {
                let _ = reply.send(state.queue.iter().cloned().collect());
            }
            BlogSchedulerMessage::RunOnce(reply) => {
                let res = state.process_next().await;
                let _ = reply.send(res);
            }
            BlogSchedulerMessage::Tick => {
                // Failures are already logged; the next tick takes the next topic.
                let _ = state.process_next().await;
            }
        }
        Ok(())
    }
}

/// Spawn the scheduler. `interval = None` disables the timer; `run_once` still works.
pub async fn spawn(
    pipeline: BlogPipeline,
    topics: Vec<String>,
    interval: Option<Duration>,
) -> Result<BlogSchedulerHandle, ForgeError> {
    let (actor, _jh) = Actor::spawn(None, BlogSchedulerActor, (pipeline, topics, interval))
        .await
        .map_err(|e| ForgeError::RactorError(format!("failed to spawn BlogScheduler: {e}")))?;
    Ok(BlogSchedulerHandle { actor })
}
