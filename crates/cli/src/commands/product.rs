//! `larek product <id>` - fetch and show one product.

use web_larek_core::ProductId;
use web_larek_storefront::error::Result;
use web_larek_storefront::{ApiError, AppError, ShopApi};

use super::Session;

pub async fn show(session: &Session, id: &str) -> Result<()> {
    let id = ProductId::new(id);

    let product = match session.checkout.api().product_item(&id).await {
        Ok(product) => product,
        Err(ApiError::Api { status: 404, .. }) => return Err(AppError::NotFound(id.to_string())),
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        id = %product.id,
        title = %product.title,
        category = product.category.label(),
        price = %product.price,
        image = %product.image,
        "{}",
        product.description
    );
    Ok(())
}
