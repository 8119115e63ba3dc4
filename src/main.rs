//! Query Optimizer - workload driver
//!
//! Runs a burst of scattered lookups against an in-memory record store through
//! the batch loader, a cached count query and the pagination helpers, then
//! logs how many backend round trips were actually made.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use futures::future::try_join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use query_optimizer::{
    create_cached_query, create_paginated_result, spawn_purge_task, BatchLoader, CachedQuery,
    Config, PaginationParams,
};

const COURSES: u64 = 12;
const LESSONS: u64 = 240;
const BACKEND_LATENCY: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, Serialize)]
struct Course {
    id: u64,
    title: String,
}

#[derive(Debug, Clone, Serialize)]
struct Lesson {
    id: u64,
    course_id: u64,
    title: String,
}

#[derive(Debug, Clone, Serialize)]
struct LessonView {
    lesson: Lesson,
    course: Course,
}

#[derive(Debug, Error)]
enum StoreError {
    #[error("course {0} does not exist")]
    MissingCourse(u64),
}

/// Stand-in for a database, counting every round trip.
struct RecordStore {
    courses: HashMap<u64, Course>,
    lessons: Vec<Lesson>,
    round_trips: AtomicU64,
}

impl RecordStore {
    fn seeded() -> Self {
        let courses = (1..=COURSES)
            .map(|id| {
                let course = Course {
                    id,
                    title: format!("Course {id}"),
                };
                (id, course)
            })
            .collect();
        let lessons = (1..=LESSONS)
            .map(|id| Lesson {
                id,
                course_id: (id * 7) % COURSES + 1,
                title: format!("Lesson {id}"),
            })
            .collect();

        Self {
            courses,
            lessons,
            round_trips: AtomicU64::new(0),
        }
    }

    async fn courses_by_ids(&self, ids: &[u64]) -> Result<Vec<Course>, StoreError> {
        self.round_trips.fetch_add(1, Ordering::Relaxed);
        tokio::time::sleep(BACKEND_LATENCY).await;
        ids.iter()
            .map(|id| {
                self.courses
                    .get(id)
                    .cloned()
                    .ok_or(StoreError::MissingCourse(*id))
            })
            .collect()
    }

    async fn count_lessons(&self, min_id: u64) -> Result<i64, StoreError> {
        self.round_trips.fetch_add(1, Ordering::Relaxed);
        tokio::time::sleep(BACKEND_LATENCY).await;
        Ok(self.lessons.iter().filter(|l| l.id >= min_id).count() as i64)
    }

    fn lesson_page(&self, offset: i64, limit: i64) -> Vec<Lesson> {
        let offset = usize::try_from(offset).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);
        self.lessons.iter().skip(offset).take(limit).cloned().collect()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "query_optimizer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: query_cache_ttl={}s, batch_delay={}ms, max_batch_size={:?}",
        config.query_cache_ttl, config.batch_delay_ms, config.max_batch_size
    );

    let store = Arc::new(RecordStore::seeded());

    let course_store = Arc::clone(&store);
    let courses = BatchLoader::with_options(
        move |ids: Vec<u64>| {
            let store = Arc::clone(&course_store);
            async move { store.courses_by_ids(&ids).await }
        },
        config.loader_options(),
    );

    let count_store = Arc::clone(&store);
    let lesson_count: CachedQuery<(u64,), i64, StoreError> = CachedQuery::with_options(
        move |(min_id,): (u64,)| {
            let store = Arc::clone(&count_store);
            async move { store.count_lessons(min_id).await }
        },
        config.cache_options(),
    );
    let purge_handle = spawn_purge_task(lesson_count.cache(), config.purge_interval());

    for page in 1..=3 {
        let params = PaginationParams::new(page, 25);
        let bounds = params.bounds();

        let total = lesson_count.call((1,)).await.context("counting lessons")?;
        let lessons = store.lesson_page(bounds.offset, bounds.limit);

        // One lookup per row, coalesced into a single backend call per page
        let course_rows = try_join_all(lessons.iter().map(|l| courses.load(l.course_id)))
            .await
            .context("loading courses for lesson page")?;

        let views: Vec<LessonView> = lessons
            .into_iter()
            .zip(course_rows)
            .map(|(lesson, course)| LessonView { lesson, course })
            .collect();
        let result = create_paginated_result(views, total, params);

        info!(
            page = result.pagination.page,
            rows = result.data.len(),
            total_pages = result.pagination.total_pages,
            has_next_page = result.pagination.has_next_page,
            "Page assembled"
        );
        if page == 1 {
            let preview = serde_json::to_string(&result.pagination)?;
            info!("Page metadata: {}", preview);
        }
    }

    let loader_stats = courses.stats();
    let query_stats = lesson_count.stats().await;
    info!(
        "Loader: {} loads, {} cache hits, {} batches, {:.1} keys/batch",
        loader_stats.loads,
        loader_stats.cache_hits,
        loader_stats.batches,
        loader_stats.mean_batch_size()
    );
    info!(
        "Query cache: hit rate {:.2}, {} entries",
        query_stats.hit_rate(),
        query_stats.total_entries
    );
    info!(
        "Backend round trips: {}",
        store.round_trips.load(Ordering::Relaxed)
    );

    purge_handle.abort();
    Ok(())
}
