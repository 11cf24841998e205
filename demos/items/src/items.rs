//! Item routes and their in-memory store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use http::StatusCode;
use indexmap::IndexMap;
use ratify::prelude::*;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Status for an archive request on an unfinished item.
const UNFINISHED: u16 = 442;

/// A to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub title: String,
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub struct ItemPath {
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct NewItem {
    pub title: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub done: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ItemPage {
    pub items: Vec<Item>,
    pub total: usize,
}

/// Items keyed by id, in insertion order.
#[derive(Debug)]
pub struct Store {
    items: RwLock<IndexMap<u64, Item>>,
    next_id: AtomicU64,
}

impl Store {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(IndexMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub async fn insert(&self, title: String, done: bool) -> Item {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let item = Item { id, title, done };
        self.items.write().await.insert(id, item.clone());
        item
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

fn item_field() -> Field {
    Field::object([
        ("id", Field::number()),
        ("title", Field::string()),
        ("done", Field::boolean()),
    ])
}

fn not_found(id: u64) -> AppError {
    AppError::public(StatusCode::NOT_FOUND, format!("Item {id} not found"))
}

/// Builds every route of the service.
pub fn routes(store: &Arc<Store>) -> Vec<Route> {
    let collection = SegmentChain::root().literal("/items");
    let member = collection.literal("/").capture("id", Field::number());

    let mut routes = Resource::new(collection)
        .get(|route| {
            let store = Arc::clone(store);
            route
                .query(Field::object([
                    ("limit", Field::number().optional()),
                    ("offset", Field::number().optional()),
                ]))
                .response(ResponseSpec::data(Field::object([
                    ("items", Field::array(item_field())),
                    ("total", Field::number()),
                ])))
                .handler(move |req: Request<(), ListQuery>| list(Arc::clone(&store), req))
        })
        .post(|route| {
            let store = Arc::clone(store);
            route
                .data(Field::object([
                    ("title", Field::string()),
                    ("done", Field::boolean().optional()),
                ]))
                .response(ResponseSpec::single(
                    ResponseVariant::new(StatusCode::CREATED).data(item_field()),
                ))
                .handler(move |req: Request<(), (), NewItem>| create(Arc::clone(&store), req))
        })
        .into_routes();

    routes.extend(
        Resource::new(member.clone())
            .get(|route| {
                let store = Arc::clone(store);
                route
                    .response(ResponseSpec::data(item_field()))
                    .handler(move |req: Request<ItemPath>| fetch(Arc::clone(&store), req))
            })
            .patch(|route| {
                let store = Arc::clone(store);
                route
                    .data(Field::object([
                        ("title", Field::string().optional()),
                        ("done", Field::boolean().optional()),
                    ]))
                    .response(ResponseSpec::data(item_field()))
                    .handler(move |req: Request<ItemPath, (), ItemPatch>| update(Arc::clone(&store), req))
            })
            .delete(|route| {
                let store = Arc::clone(store);
                route
                    .response(ResponseSpec::single(ResponseVariant::new(StatusCode::NO_CONTENT)))
                    .handler(move |req: Request<ItemPath>| remove(Arc::clone(&store), req))
            })
            .into_routes(),
    );

    let archive_store = Arc::clone(store);
    routes.push(
        Route::post(member.literal("/archive"))
            .response(ResponseSpec::single(ResponseVariant::new(StatusCode::NO_CONTENT)))
            .handler(move |req: Request<ItemPath>| archive(Arc::clone(&archive_store), req)),
    );

    routes.push(
        Route::get(SegmentChain::root().literal("/crash")).handler(|_: Request| async {
            Err::<Reply, _>(
                AppError::internal("storage backend unavailable")
                    .with_source(std::io::Error::other("connection reset")),
            )
        }),
    );

    routes
}

async fn list(store: Arc<Store>, req: Request<(), ListQuery>) -> Result<Reply<ItemPage>, AppError> {
    let items = store.items.read().await;
    let offset = req.query.offset.unwrap_or(0);
    let limit = req.query.limit.unwrap_or(items.len());
    let page = items.values().skip(offset).take(limit).cloned().collect();
    Ok(Reply::new(ItemPage {
        items: page,
        total: items.len(),
    }))
}

async fn create(store: Arc<Store>, req: Request<(), (), NewItem>) -> Result<Reply<Item>, AppError> {
    let item = store.insert(req.data.title, req.data.done).await;
    tracing::info!(id = item.id, "item created");
    Ok(Reply::new(item))
}

async fn fetch(store: Arc<Store>, req: Request<ItemPath>) -> Result<Reply<Item>, AppError> {
    let id = req.path_params.id;
    let items = store.items.read().await;
    items.get(&id).cloned().map(Reply::new).ok_or_else(|| not_found(id))
}

async fn update(store: Arc<Store>, req: Request<ItemPath, (), ItemPatch>) -> Result<Reply<Item>, AppError> {
    let id = req.path_params.id;
    let mut items = store.items.write().await;
    let item = items.get_mut(&id).ok_or_else(|| not_found(id))?;
    if let Some(title) = req.data.title {
        item.title = title;
    }
    if let Some(done) = req.data.done {
        item.done = done;
    }
    Ok(Reply::new(item.clone()))
}

async fn remove(store: Arc<Store>, req: Request<ItemPath>) -> Result<Reply, AppError> {
    let id = req.path_params.id;
    store
        .items
        .write()
        .await
        .shift_remove(&id)
        .map(|_| Reply::empty())
        .ok_or_else(|| not_found(id))
}

async fn archive(store: Arc<Store>, req: Request<ItemPath>) -> Result<Reply, AppError> {
    let id = req.path_params.id;
    let mut items = store.items.write().await;
    let item = items.get(&id).ok_or_else(|| not_found(id))?;
    if !item.done {
        let status = StatusCode::from_u16(UNFINISHED).unwrap_or(StatusCode::CONFLICT);
        return Err(AppError::public(status, "Only finished items can be archived"));
    }
    items.shift_remove(&id);
    tracing::info!(id, "item archived");
    Ok(Reply::empty())
}
