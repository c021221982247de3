//! Generic HTTP dispatch: one function per CRUD verb, shared by every
//! resource. Each performs exactly one request/response cycle and returns
//! the text to print.

use anyhow::anyhow;
use nbx_api_models::Paged;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cli::{ListArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult, classify_problem};
use crate::commands::data;
use crate::endpoints::Endpoint;
use crate::output::{Palette, render_detail, render_items, render_list};

/// GET a collection endpoint and render the list envelope.
pub(crate) async fn list<T: DeserializeOwned + Serialize>(
    ctx: &AppContext,
    endpoint: &Endpoint,
    args: &ListArgs,
    format: OutputFormat,
    block: fn(&T, &Palette) -> String,
) -> CliResult<String> {
    let mut url = endpoint.collection_url(&ctx.base_url)?;
    {
        let mut pairs = url.query_pairs_mut();
        if let Some(limit) = args.limit {
            pairs.append_pair("limit", &limit.to_string());
        }
        if let Some(offset) = args.offset {
            pairs.append_pair("offset", &offset.to_string());
        }
        if let Some(q) = &args.q {
            pairs.append_pair("q", q);
        }
        let named = [
            ("name", &args.name),
            ("slug", &args.slug),
            ("parent", &args.parent),
            ("region", &args.region),
            ("site", &args.site),
            ("role", &args.role),
        ];
        for (key, value) in named {
            if let Some(value) = value {
                pairs.append_pair(key, value);
            }
        }
        for filter in &args.filters {
            pairs.append_pair(&filter.key, &filter.value);
        }
    }

    let response = ctx.request(Method::GET, url).send().await.map_err(|err| {
        CliError::failure(anyhow!("request to /api/{}/ failed: {err}", endpoint.path))
    })?;

    if response.status().is_success() {
        let paged = response.json::<Paged<T>>().await.map_err(|err| {
            CliError::failure(anyhow!("failed to parse {} list: {err}", endpoint.singular))
        })?;
        let palette = Palette::detect();
        render_list(&paged, endpoint, format, &palette, block)
    } else {
        Err(classify_problem(response).await)
    }
}

/// GET a single object by numeric ID and render it.
pub(crate) async fn show<T: DeserializeOwned + Serialize>(
    ctx: &AppContext,
    endpoint: &Endpoint,
    id: u64,
    format: OutputFormat,
    block: fn(&T, &Palette) -> String,
) -> CliResult<String> {
    let url = endpoint.object_url(&ctx.base_url, id)?;
    let response = ctx.request(Method::GET, url).send().await.map_err(|err| {
        CliError::failure(anyhow!(
            "request to /api/{}/{id}/ failed: {err}",
            endpoint.path
        ))
    })?;

    if response.status().is_success() {
        let record = response.json::<T>().await.map_err(|err| {
            CliError::failure(anyhow!("failed to parse {}: {err}", endpoint.singular))
        })?;
        let palette = Palette::detect();
        render_detail(&record, format, &palette, block)
    } else {
        Err(classify_problem(response).await)
    }
}

/// POST a JSON payload to a collection endpoint and render the created
/// object the server returns.
pub(crate) async fn create<T: DeserializeOwned + Serialize>(
    ctx: &AppContext,
    endpoint: &Endpoint,
    data: &str,
    format: OutputFormat,
    block: fn(&T, &Palette) -> String,
) -> CliResult<String> {
    ctx.require_token()?;
    let payload = data::load_payload(data)?;
    let url = endpoint.collection_url(&ctx.base_url)?;

    let response = ctx
        .request(Method::POST, url)
        .json(&payload)
        .send()
        .await
        .map_err(|err| {
            CliError::failure(anyhow!("request to /api/{}/ failed: {err}", endpoint.path))
        })?;

    if response.status().is_success() {
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        match serde_json::from_value::<T>(body.clone()) {
            Ok(record) => {
                let palette = Palette::detect();
                render_detail(&record, format, &palette, block)
            }
            Err(_) => Ok(format!(
                "Created {} {}.",
                endpoint.singular,
                object_ref(&body)
            )),
        }
    } else {
        Err(classify_problem(response).await)
    }
}

/// PATCH one object by ID and render the updated representation.
pub(crate) async fn update<T: DeserializeOwned + Serialize>(
    ctx: &AppContext,
    endpoint: &Endpoint,
    id: u64,
    data: &str,
    format: OutputFormat,
    block: fn(&T, &Palette) -> String,
) -> CliResult<String> {
    ctx.require_token()?;
    let payload = data::load_payload(data)?;
    let url = endpoint.object_url(&ctx.base_url, id)?;

    let response = ctx
        .request(Method::PATCH, url)
        .json(&payload)
        .send()
        .await
        .map_err(|err| {
            CliError::failure(anyhow!(
                "request to /api/{}/{id}/ failed: {err}",
                endpoint.path
            ))
        })?;

    if response.status().is_success() {
        match response.json::<T>().await {
            Ok(record) => {
                let palette = Palette::detect();
                render_detail(&record, format, &palette, block)
            }
            Err(_) => Ok(format!("Updated {} (id {id}).", endpoint.singular)),
        }
    } else {
        Err(classify_problem(response).await)
    }
}

/// PATCH a collection endpoint with an array of objects carrying their IDs
/// and render the updated representations the server returns.
pub(crate) async fn bulk_update<T: DeserializeOwned + Serialize>(
    ctx: &AppContext,
    endpoint: &Endpoint,
    data: &str,
    format: OutputFormat,
    block: fn(&T, &Palette) -> String,
) -> CliResult<String> {
    ctx.require_token()?;
    let payload = data::load_bulk_payload(data)?;
    let url = endpoint.collection_url(&ctx.base_url)?;

    let response = ctx
        .request(Method::PATCH, url)
        .json(&payload)
        .send()
        .await
        .map_err(|err| {
            CliError::failure(anyhow!("request to /api/{}/ failed: {err}", endpoint.path))
        })?;

    if response.status().is_success() {
        match response.json::<Vec<T>>().await {
            Ok(records) if !records.is_empty() => {
                let palette = Palette::detect();
                render_items(&records, format, &palette, block)
            }
            _ => {
                let count = u64::try_from(payload.len()).unwrap_or(u64::MAX);
                Ok(format!("Updated {count} {}.", endpoint.noun(count)))
            }
        }
    } else {
        Err(classify_problem(response).await)
    }
}

/// DELETE one object by ID.
pub(crate) async fn delete(ctx: &AppContext, endpoint: &Endpoint, id: u64) -> CliResult<String> {
    ctx.require_token()?;
    let url = endpoint.object_url(&ctx.base_url, id)?;

    let response = ctx
        .request(Method::DELETE, url)
        .send()
        .await
        .map_err(|err| {
            CliError::failure(anyhow!(
                "request to /api/{}/{id}/ failed: {err}",
                endpoint.path
            ))
        })?;

    if response.status().is_success() {
        Ok(format!("Deleted {} (id {id}).", endpoint.singular))
    } else {
        Err(classify_problem(response).await)
    }
}

/// DELETE a collection endpoint with an array body of `{"id": N}` objects.
pub(crate) async fn bulk_delete(
    ctx: &AppContext,
    endpoint: &Endpoint,
    data: &str,
) -> CliResult<String> {
    ctx.require_token()?;
    let payload = data::load_bulk_payload(data)?;
    let url = endpoint.collection_url(&ctx.base_url)?;

    let response = ctx
        .request(Method::DELETE, url)
        .json(&payload)
        .send()
        .await
        .map_err(|err| {
            CliError::failure(anyhow!("request to /api/{}/ failed: {err}", endpoint.path))
        })?;

    if response.status().is_success() {
        let count = u64::try_from(payload.len()).unwrap_or(u64::MAX);
        Ok(format!("Deleted {count} {}.", endpoint.noun(count)))
    } else {
        Err(classify_problem(response).await)
    }
}

/// Best-effort reference to a created object from its response body.
fn object_ref(body: &Value) -> String {
    let id = body.get("id").and_then(Value::as_u64);
    let name = body
        .get("display")
        .and_then(Value::as_str)
        .or_else(|| body.get("name").and_then(Value::as_str));
    match (name, id) {
        (Some(name), Some(id)) => format!("'{name}' (id {id})"),
        (None, Some(id)) => format!("(id {id})"),
        (Some(name), None) => format!("'{name}'"),
        (None, None) => "(no body returned)".to_string(),
    }
}
