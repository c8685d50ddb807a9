//! `larek catalog` - load and list the catalog.

use web_larek_storefront::error::Result;

use super::Session;

/// Load the catalog; the view lists it on `items:changed`.
pub async fn list(session: &Session) -> Result<()> {
    let count = session.checkout.load_catalog().await?;
    tracing::info!(count, "Catalog loaded");
    Ok(())
}
