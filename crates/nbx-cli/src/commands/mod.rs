//! Command handlers: generic CRUD dispatch plus payload loading.

pub(crate) mod crud;
pub(crate) mod data;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cli::{OutputFormat, ResourceVerb};
use crate::client::{AppContext, CliResult};
use crate::endpoints::Endpoint;
use crate::output::Palette;

/// Route one resource verb to the matching generic handler and print its
/// output.
///
/// Every resource shares this table; the per-resource wiring is just an
/// endpoint constant and a block renderer. Handlers return the text to
/// print so their output stays assertable in tests.
pub(crate) async fn dispatch<T: DeserializeOwned + Serialize>(
    ctx: &AppContext,
    endpoint: &Endpoint,
    verb: ResourceVerb,
    format: OutputFormat,
    block: fn(&T, &Palette) -> String,
) -> CliResult<()> {
    let text = match verb {
        ResourceVerb::Ls(args) => crud::list(ctx, endpoint, &args, format, block).await,
        ResourceVerb::Show(args) => crud::show(ctx, endpoint, args.id, format, block).await,
        ResourceVerb::Create(args) => crud::create(ctx, endpoint, &args.data, format, block).await,
        ResourceVerb::Update(args) => {
            crud::update(ctx, endpoint, args.id, &args.data, format, block).await
        }
        ResourceVerb::BulkUpdate(args) => {
            crud::bulk_update(ctx, endpoint, &args.data, format, block).await
        }
        ResourceVerb::Delete(args) => crud::delete(ctx, endpoint, args.id).await,
        ResourceVerb::BulkDelete(args) => crud::bulk_delete(ctx, endpoint, &args.data).await,
    }?;
    println!("{text}");
    Ok(())
}
