use crate::client::AlbumApi;
use crate::collector::ResultLog;
use crate::retry::RetryPolicy;
use albumload_core::Reaction;
use std::sync::Arc;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Reviews posted after each successful create, in order.
const REVIEWS: [Reaction; 3] = [Reaction::Like, Reaction::Like, Reaction::Dislike];

/// What happened to a single iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iteration {
    /// The album was created and every review was attempted. `failed_reviews` counts the
    /// reviews that still failed after retries.
    Completed { failed_reviews: usize },
    /// Creation never succeeded, so no review was attempted.
    Abandoned,
}

/// Tally of the iterations run by one worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerTally {
    pub completed: usize,
    pub abandoned: usize,
    pub failed_reviews: usize,
}

impl WorkerTally {
    pub fn iterations(&self) -> usize {
        self.completed + self.abandoned
    }

    pub fn merge(&mut self, other: WorkerTally) {
        self.completed += other.completed;
        self.abandoned += other.abandoned;
        self.failed_reviews += other.failed_reviews;
    }
}

/// The session a simulated user runs: create an album, then review it.
pub struct Workflow<A> {
    api: Arc<A>,
    retry: RetryPolicy,
    reviews: &'static [Reaction],
}

impl<A> Clone for Workflow<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            retry: self.retry,
            reviews: self.reviews,
        }
    }
}

impl<A> Workflow<A>
where
    A: AlbumApi + Send + Sync + 'static,
{
    /// Create followed by two likes and a dislike.
    pub fn new(api: Arc<A>, retry: RetryPolicy) -> Self {
        Self {
            api,
            retry,
            reviews: &REVIEWS,
        }
    }

    /// Creation only, used to warm the target up.
    pub fn create_only(api: Arc<A>, retry: RetryPolicy) -> Self {
        Self {
            api,
            retry,
            reviews: &[],
        }
    }

    pub async fn run_iteration(&self, log: &ResultLog) -> Iteration {
        let created = self.retry.attempt(|| self.api.create_album(), log).await;

        let Some(album_id) = created.album_id else {
            trace!("Album creation failed, abandoning iteration");
            return Iteration::Abandoned;
        };

        let mut failed_reviews = 0;
        for reaction in self.reviews.iter().copied() {
            let outcome = self
                .retry
                .attempt(|| self.api.react(&album_id, reaction), log)
                .await;
            if !outcome.is_success() {
                failed_reviews += 1;
            }
        }

        Iteration::Completed { failed_reviews }
    }

    /// Runs `iterations` iterations back to back.
    pub async fn run(&self, iterations: usize, log: &ResultLog) -> WorkerTally {
        let mut tally = WorkerTally::default();
        for _ in 0..iterations {
            match self.run_iteration(log).await {
                Iteration::Completed { failed_reviews } => {
                    tally.completed += 1;
                    tally.failed_reviews += failed_reviews;
                }
                Iteration::Abandoned => tally.abandoned += 1,
            }
        }
        tally
    }
}
