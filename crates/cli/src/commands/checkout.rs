//! `larek checkout` - fill the basket, run both steps and submit.
//!
//! Mirrors what a shopper does in the browser: pick cards, open the basket,
//! complete the address step, complete the contact step, confirm.

use web_larek_core::{Payment, Price, ProductId};
use web_larek_storefront::error::Result;
use web_larek_storefront::{AddressForm, AppError, ContactForm, Event};

use super::Session;

/// Everything the shopper typed.
pub struct OrderInput {
    pub items: Vec<String>,
    pub payment: Payment,
    pub address: String,
    pub email: String,
    pub phone: String,
}

pub async fn place(session: &Session, input: OrderInput) -> Result<()> {
    session.checkout.load_catalog().await?;
    let state = session.state();

    for raw in &input.items {
        let id = ProductId::new(raw.as_str());
        let Some(product) = state.product(&id) else {
            return Err(AppError::NotFound(format!("product {id}")));
        };

        session.bus.publish(&Event::CardSelect { id: id.clone() });
        if product.price.is_priceless() {
            return Err(AppError::BadRequest(format!(
                "{} is not for sale",
                product.title
            )));
        }
        state.add_to_basket(&id);
    }

    session.bus.publish(&Event::BasketOpen);
    session.bus.publish(&Event::OrderOpen);

    let mut address = AddressForm::new(session.bus.clone());
    address.select_payment(input.payment);
    address.set_address(input.address);
    address
        .submit()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut contact = ContactForm::new(session.bus.clone());
    contact.set_email(input.email);
    contact.set_phone(input.phone);
    contact
        .submit()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let result = session.checkout.submit_order().await?;
    session.bus.publish(&Event::ModalClose);

    tracing::info!(
        order_id = %result.id,
        total = %Price::new(result.total),
        "Заказ успешно оформлен"
    );
    Ok(())
}
