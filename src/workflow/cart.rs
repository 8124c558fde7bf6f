//! The cart being assembled for the selected table.

use crate::model::{OrderDetail, Product, ProductId};
use crate::workflow::WorkflowError;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    /// Always at least 1.
    pub quantity: u32,
}

impl CartItem {
    pub fn amount(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Items keep the order in which products were first added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::amount).sum()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Adds one unit of `product`. Returns the new quantity.
    pub fn add(&mut self, product: &Product) -> u32 {
        if let Some(item) = self.item_mut(product.id) {
            item.quantity += 1;
            return item.quantity;
        }
        self.items.push(CartItem {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity: 1,
        });
        1
    }

    pub fn set_quantity(&mut self, product: ProductId, quantity: u32) -> Result<(), WorkflowError> {
        if quantity < 1 {
            return Err(WorkflowError::InvalidQuantity(i64::from(quantity)));
        }
        let item = self
            .item_mut(product)
            .ok_or(WorkflowError::NotInCart(product))?;
        item.quantity = quantity;
        Ok(())
    }

    /// Changes a quantity by `delta`. A result below 1 is rejected and the item is
    /// left as it was; removal is explicit.
    pub fn adjust(&mut self, product: ProductId, delta: i32) -> Result<u32, WorkflowError> {
        let item = self
            .item_mut(product)
            .ok_or(WorkflowError::NotInCart(product))?;
        let quantity = i64::from(item.quantity) + i64::from(delta);
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or(WorkflowError::InvalidQuantity(quantity))?;
        item.quantity = quantity;
        Ok(quantity)
    }

    pub fn remove(&mut self, product: ProductId) -> Result<CartItem, WorkflowError> {
        let index = self
            .items
            .iter()
            .position(|item| item.product_id == product)
            .ok_or(WorkflowError::NotInCart(product))?;
        Ok(self.items.remove(index))
    }

    /// One order line per item, priced at `unit_price * quantity`.
    pub fn order_details(&self) -> Vec<OrderDetail> {
        self.items
            .iter()
            .map(|item| OrderDetail::line(item.product_id, &item.name, item.unit_price, item.quantity))
            .collect()
    }

    fn item_mut(&mut self, product: ProductId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.product_id == product)
    }
}
