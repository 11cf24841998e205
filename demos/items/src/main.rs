//! Items demo service.
//!
//! Serves a small to-do list through Ratify routes:
//!
//! - `GET /items?limit=&offset=` lists items
//! - `POST /items` creates one (`201`)
//! - `GET|PATCH|DELETE /items/{id}` reads, edits or removes one
//! - `POST /items/{id}/archive` fails with `442` unless the item is done
//! - `GET /crash` raises an unexpected error (`500`, reported, no detail)
//!
//! Settings come from `items.toml` (or the file named by `ITEMS_CONFIG`) and
//! `RATIFY__SECTION__KEY` environment variables.

mod items;

use std::sync::Arc;

use ratify::prelude::*;

use crate::items::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::var("ITEMS_CONFIG").unwrap_or_else(|_| "items.toml".to_string());
    let settings = ConfigLoader::new()
        .with_optional_file(&path)?
        .with_env_prefix("RATIFY")
        .load()?;

    init_logging(&settings.log_config()?)?;

    let config = settings
        .server_config_builder()?
        .error_reporter(|err: ReportedError| async move {
            tracing::error!(kind = err.kind(), error = %err, "unexpected error");
            Ok(())
        })
        .build();

    let store = Arc::new(Store::new());
    store.insert("Try Ratify".to_string(), false).await;

    tracing::info!(base_url = config.base_url(), "starting items service");
    serve(config, items::routes(&store)).await?;
    Ok(())
}
