//! Post listing, count, and table endpoints.
//!
//! Listings resolve caller filters into one logical engine query: a project
//! name is resolved to a numeric repository id first, an author filter
//! narrows the section. Sorting happens on this side of the upstream so the
//! sort keys can be derived metrics.

use axum::extract::{Path, Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use curata_engine::categories::CATEGORIES;
use curata_engine::pagination::{page_href, page_links};
use curata_engine::projection::{project, sort_posts, vote_queue_status};
use curata_engine::types::{Record, RecordBatch};
use curata_engine::{PostQuery, Section, Status};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::AppResult;
use crate::state::AppState;

/// Caller-facing listing parameters.
#[derive(Debug, Default, Deserialize)]
struct ListingParams {
    limit: Option<i64>,
    skip: Option<i64>,
    #[serde(rename = "sortBy")]
    sort_by: Option<String>,
    author: Option<String>,
    project: Option<String>,
    moderator: Option<String>,
    #[serde(default)]
    shape: ListShape,
}

/// Output shape of a listing response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ListShape {
    #[default]
    Projected,
    Raw,
    Links,
}

async fn review_stats(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let stats = state.posts().review_stats(CATEGORIES).await?;

    let mut categories = serde_json::Map::new();
    for (category, breakdown) in stats {
        categories.insert(category, json!(breakdown));
    }

    Ok(Json(json!({ "categories": categories })))
}

async fn status_counts(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> AppResult<Json<Value>> {
    let status: Status = status.parse()?;
    let counts = state.posts().status_counts(CATEGORIES, status).await?;

    let site = &state.config().site_url;
    let mut categories = serde_json::Map::new();
    for (category, total) in counts {
        let self_link = format!("{site}/posts/{status}/{category}");
        categories.insert(
            category,
            json!({ "total": total, "_links": { "self": self_link } }),
        );
    }

    Ok(Json(json!({ "categories": categories })))
}

/// Resolve caller filters and run the chunked fetch plus local sort.
async fn fetch_listing(
    state: &AppState,
    status: Status,
    category: &str,
    params: &ListingParams,
) -> AppResult<RecordBatch> {
    let mut query = PostQuery {
        limit: params.limit,
        skip: params.skip,
        category: Some(category.to_string()),
        status,
        moderator: params.moderator.clone(),
        ..PostQuery::default()
    };

    if let Some(project) = &params.project {
        query.project_id = Some(state.repos().resolve_repository_id(project).await?);
        query.section = Section::Project;
        query.platform = Some("github".to_string());
    } else if let Some(author) = &params.author {
        query.section = Section::Author;
        query.author = Some(author.clone());
    }

    let mut batch = state.posts().fetch_posts(&query).await?;
    sort_posts(&mut batch.results, params.sort_by.as_deref());

    Ok(batch)
}

async fn list_posts(
    State(state): State<AppState>,
    Path((status, category)): Path<(String, String)>,
    Query(params): Query<ListingParams>,
) -> AppResult<Json<Value>> {
    let status: Status = status.parse()?;
    let batch = fetch_listing(&state, status, &category, &params).await?;

    let query = PostQuery {
        limit: params.limit,
        skip: params.skip,
        ..PostQuery::default()
    };
    let (limit, skip) = (query.wanted(), query.start_skip());

    let base = format!("{}/posts/{status}/{category}", state.config().site_url);
    let cursor_links = page_links(&base, skip, limit, batch.total);

    let mut links = serde_json::Map::new();
    links.insert("self".to_string(), json!(page_href(&base, limit, skip)));
    if let Some(next) = cursor_links.next {
        links.insert("next".to_string(), json!(next));
    }
    if let Some(prev) = cursor_links.prev {
        links.insert("prev".to_string(), json!(prev));
    }

    let mut body = serde_json::Map::new();
    body.insert("category".to_string(), json!(category));
    body.insert("total".to_string(), json!(batch.total));
    match params.shape {
        ListShape::Raw => {
            body.insert("results".to_string(), Value::Array(batch.results));
        }
        ListShape::Projected => {
            let web_base = &state.config().upstream.web_base;
            let projected: Vec<_> = batch
                .results
                .iter()
                .map(|record| project(record, web_base))
                .collect();
            body.insert("results".to_string(), json!(projected));
        }
        ListShape::Links => {}
    }
    body.insert("_links".to_string(), Value::Object(links));

    Ok(Json(Value::Object(body)))
}

/// One row of the HTML table view.
#[derive(Serialize)]
struct TableRow {
    category: String,
    author: String,
    title: String,
    created: String,
    project: String,
    score: f64,
    influence: f64,
    scorers: u64,
    queue: String,
    link: String,
}

impl TableRow {
    fn build(record: &Record, status: Status, web_base: &str) -> Self {
        let post = project(record, web_base);
        Self {
            category: post.category,
            author: post.author,
            title: post.title,
            created: post.created_at,
            project: post.project,
            score: post.score,
            influence: post.influence,
            scorers: post.scorers,
            queue: vote_queue_status(record, status, Utc::now()).to_string(),
            link: post.links.canonical,
        }
    }
}

async fn posts_table(
    State(state): State<AppState>,
    Path((status, category)): Path<(String, String)>,
    Query(params): Query<ListingParams>,
) -> AppResult<Html<String>> {
    let status: Status = status.parse()?;
    let batch = fetch_listing(&state, status, &category, &params).await?;

    let web_base = &state.config().upstream.web_base;
    let rows: Vec<TableRow> = batch
        .results
        .iter()
        .map(|record| TableRow::build(record, status, web_base))
        .collect();

    let mut context = tera::Context::new();
    context.insert("rows", &rows);
    let html = state
        .templates()
        .render("posts_table.html", &context)
        .map_err(anyhow::Error::from)?;

    Ok(Html(html))
}

async fn get_post(
    State(state): State<AppState>,
    Path((author, permlink)): Path<(String, String)>,
) -> AppResult<Json<Record>> {
    Ok(Json(state.posts().fetch_post(&author, &permlink).await?))
}

/// Create the posts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/stats", get(review_stats))
        .route("/posts/{status}", get(status_counts))
        .route("/posts/{status}/{category}", get(list_posts))
        .route("/posts/{status}/{category}/table", get(posts_table))
        .route("/post/{author}/{permlink}", get(get_post))
}
