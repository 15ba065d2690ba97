//! Shopping cart engine.
//!
//! The engine owns the ordered list of line items, derives totals from it on
//! demand, and mirrors the full list to storage after every change. At most
//! one line exists per `(product, variant)` pair and every stored line has a
//! quantity of at least one.
//!
//! # Stock ceiling
//!
//! Under [`StockPolicy::Clamp`] (the default) a line's quantity never exceeds
//! the product's stock: adds and quantity edits are clamped, adding a product
//! with no stock (or to a line already at the limit) fails, and lines whose
//! stock has run out are dropped. [`StockPolicy::Unchecked`] leaves the ceiling
//! to the presentation layer.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use shopiverse_core::{CurrencyCode, Price, Product, ProductId, ProductVariant, VariantId};

use crate::error::add_breadcrumb;
use crate::events::{CartVisibility, Notice, StorefrontEvent, SubscriptionId, Subscribers};
use crate::storage::{KeyValueStore, keys, snapshot};

/// Cart command errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Quantity below one passed to an add.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// The product has no units left.
    #[error("Out of stock: {0}")]
    OutOfStock(ProductId),

    /// The line already holds every unit in stock.
    #[error("Stock limit of {stock} reached for {product_id}")]
    AtStockLimit { product_id: ProductId, stock: u32 },
}

/// Whether the engine enforces `product.stock` as a quantity ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StockPolicy {
    /// Clamp quantities to stock and refuse out-of-stock adds.
    #[default]
    Clamp,
    /// Accept any positive quantity.
    Unchecked,
}

impl std::fmt::Display for StockPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clamp => write!(f, "clamp"),
            Self::Unchecked => write!(f, "unchecked"),
        }
    }
}

impl std::str::FromStr for StockPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(Self::Clamp),
            "unchecked" => Ok(Self::Unchecked),
            _ => Err(format!("invalid stock policy: {s}")),
        }
    }
}

impl StockPolicy {
    /// Apply the ceiling for `stock` to `quantity`.
    const fn limit(self, quantity: u32, stock: u32) -> u32 {
        match self {
            Self::Clamp if quantity > stock => stock,
            _ => quantity,
        }
    }
}

/// Identity of a cart line: a product plus an optional variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
}

impl LineKey {
    /// Key for `product` with an optional `variant`.
    #[must_use]
    pub fn new(product: &Product, variant: Option<&ProductVariant>) -> Self {
        Self {
            product_id: product.id.clone(),
            variant_id: variant.map(|v| v.id.clone()),
        }
    }
}

/// One product (and optional variant) in the cart.
///
/// The full product record is embedded, so later catalog edits do not change
/// lines that were already added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    product: Product,
    quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    variant: Option<ProductVariant>,
}

impl CartLineItem {
    /// The product as it was when added.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// Units of this line, always at least one.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// The chosen variant, if any.
    #[must_use]
    pub const fn variant(&self) -> Option<&ProductVariant> {
        self.variant.as_ref()
    }

    /// Whether this line belongs to `key`.
    #[must_use]
    pub fn matches(&self, key: &LineKey) -> bool {
        self.product.id == key.product_id
            && self.variant.as_ref().map(|v| &v.id) == key.variant_id.as_ref()
    }

    /// This line's key.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::new(&self.product, self.variant.as_ref())
    }

    /// Price of one unit, including any variant adjustment.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.product.unit_price(self.variant.as_ref())
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity)
    }
}

/// Cart state plus its persistence mirror.
#[derive(Debug)]
pub struct CartEngine {
    store: Arc<dyn KeyValueStore>,
    policy: StockPolicy,
    items: Vec<CartLineItem>,
    visibility: CartVisibility,
    subscribers: Subscribers,
}

impl CartEngine {
    /// Create an engine, rehydrating any cart previously saved in `store`.
    ///
    /// A missing or malformed snapshot yields an empty cart; the failure is
    /// logged and never returned.
    #[must_use]
    pub fn restore(store: Arc<dyn KeyValueStore>, policy: StockPolicy) -> Self {
        let items = match snapshot::load::<Vec<CartLineItem>>(store.as_ref(), keys::CART) {
            Ok(Some(items)) => normalize(items, policy),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to restore cart, starting empty");
                Vec::new()
            }
        };
        tracing::info!(lines = items.len(), %policy, "Cart restored");

        Self {
            store,
            policy,
            items,
            visibility: CartVisibility::default(),
            subscribers: Subscribers::new(),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Line items in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// The line for `key`, if present.
    #[must_use]
    pub fn line(&self, key: &LineKey) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.matches(key))
    }

    /// Whether any line belongs to `product_id`.
    #[must_use]
    pub fn contains_product(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.product.id == product_id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Total price tagged with the cart's currency (the first line's, or USD when empty).
    #[must_use]
    pub fn subtotal(&self) -> Price {
        let currency = self
            .items
            .first()
            .map_or(CurrencyCode::default(), |item| item.product.currency_code);
        Price::new(self.total_price(), currency)
    }

    /// Current stock policy.
    #[must_use]
    pub const fn policy(&self) -> StockPolicy {
        self.policy
    }

    /// Whether the cart drawer is open or closed.
    #[must_use]
    pub const fn visibility(&self) -> CartVisibility {
        self.visibility
    }

    /// Shorthand for `visibility().is_open()`.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.visibility.is_open()
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Add `quantity` units of `product` (and `variant`) to the cart.
    ///
    /// Increments the existing line for the same product and variant, or
    /// appends a new line. Returns the line's resulting quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` if `quantity` is zero. When the
    /// stock ceiling is enforced, returns `CartError::OutOfStock` if the
    /// product has no stock and `CartError::AtStockLimit` if the line already
    /// holds every unit; the cart is left untouched in both cases.
    #[instrument(skip(self, product, variant), fields(product_id = %product.id))]
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: u32,
        variant: Option<&ProductVariant>,
    ) -> Result<u32, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(0));
        }
        if self.policy == StockPolicy::Clamp && !product.in_stock() {
            return Err(CartError::OutOfStock(product.id.clone()));
        }

        let key = LineKey::new(product, variant);
        let policy = self.policy;
        let resulting = if let Some(line) = self.items.iter_mut().find(|item| item.matches(&key)) {
            let wanted = line.quantity.saturating_add(quantity);
            let next = policy.limit(wanted, product.stock);
            if next == line.quantity {
                tracing::info!(quantity = next, "Cart line already at stock limit");
                return Err(CartError::AtStockLimit {
                    product_id: product.id.clone(),
                    stock: product.stock,
                });
            }
            line.quantity = next;
            next
        } else {
            let capped = policy.limit(quantity, product.stock);
            self.items.push(CartLineItem {
                product: product.clone(),
                quantity: capped,
                variant: variant.cloned(),
            });
            capped
        };

        tracing::info!(
            variant_id = ?key.variant_id,
            requested = quantity,
            quantity = resulting,
            "Added to cart"
        );
        add_breadcrumb(
            "cart",
            "Added item to cart",
            Some(&[("product_id", product.id.as_str())]),
        );

        self.changed();
        self.subscribers.notify(Notice::AddedToCart {
            product_name: product.name.clone(),
        });
        Ok(resulting)
    }

    /// Remove every line for `product_id`, whatever the variant.
    ///
    /// Returns `false` (and does nothing) if the product is not in the cart.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        self.remove_where(|item| &item.product.id == product_id)
    }

    /// Remove the single line for `key`.
    ///
    /// Returns `false` (and does nothing) if there is no such line.
    #[instrument(skip(self))]
    pub fn remove_line(&mut self, key: &LineKey) -> bool {
        self.remove_where(|item| item.matches(key))
    }

    /// Set the quantity of every line for `product_id`.
    ///
    /// A quantity below one removes the product instead. Returns whether the
    /// cart changed; an unknown product is a no-op.
    #[instrument(skip(self))]
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> bool {
        if quantity < 1 {
            return self.remove_item(product_id);
        }
        self.set_quantity_where(quantity, |item| &item.product.id == product_id)
    }

    /// Set the quantity of the single line for `key`.
    ///
    /// A quantity below one removes the line instead. Returns whether the
    /// cart changed.
    #[instrument(skip(self))]
    pub fn update_line_quantity(&mut self, key: &LineKey, quantity: i64) -> bool {
        if quantity < 1 {
            return self.remove_line(key);
        }
        self.set_quantity_where(quantity, |item| item.matches(key))
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        let removed = self.items.len();
        self.items.clear();
        tracing::info!(removed, "Cart cleared");
        add_breadcrumb("cart", "Cleared cart", None);

        self.changed();
        self.subscribers.notify(Notice::CartCleared);
    }

    /// Open the cart drawer if closed, close it if open.
    ///
    /// Visibility is session state only and is never persisted.
    pub fn toggle_visibility(&mut self) -> CartVisibility {
        self.visibility = self.visibility.toggled();
        tracing::debug!(visibility = ?self.visibility, "Cart visibility toggled");
        self.subscribers
            .publish(&StorefrontEvent::CartVisibilityChanged(self.visibility));
        self.visibility
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Register a callback for cart events.
    pub fn subscribe(&mut self, callback: impl Fn(&StorefrontEvent) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    /// Remove a callback registered with [`Self::subscribe`].
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn remove_where(&mut self, predicate: impl Fn(&CartLineItem) -> bool) -> bool {
        let before = self.items.len();
        self.items.retain(|item| !predicate(item));
        let removed = before - self.items.len();
        if removed == 0 {
            tracing::debug!("Nothing to remove");
            return false;
        }

        tracing::info!(removed, "Removed from cart");
        add_breadcrumb("cart", "Removed item from cart", None);

        self.changed();
        self.subscribers.notify(Notice::RemovedFromCart);
        true
    }

    fn set_quantity_where(&mut self, quantity: i64, predicate: impl Fn(&CartLineItem) -> bool) -> bool {
        let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
        let policy = self.policy;
        let mut changed = false;

        for item in self.items.iter_mut().filter(|item| predicate(item)) {
            let next = policy.limit(requested, item.product.stock);
            if item.quantity != next {
                item.quantity = next;
                changed = true;
            }
        }
        if !changed {
            return false;
        }

        // Lines whose product has no stock left drop out instead of staying at one.
        let before = self.items.len();
        self.items.retain(|item| item.quantity > 0);
        let removed = before - self.items.len();

        tracing::info!(quantity = requested, removed, "Cart quantity updated");
        self.changed();
        if removed > 0 {
            self.subscribers.notify(Notice::RemovedFromCart);
        }
        true
    }

    /// Persist the line list and tell subscribers it changed.
    fn changed(&self) {
        if let Err(e) = snapshot::save(self.store.as_ref(), keys::CART, &self.items) {
            tracing::error!(error = %e, "Failed to persist cart");
        }
        self.subscribers.publish(&StorefrontEvent::CartChanged);
    }
}

/// Restore the line invariants on a rehydrated snapshot: drop empty lines,
/// merge repeated keys, and apply the stock ceiling.
fn normalize(items: Vec<CartLineItem>, policy: StockPolicy) -> Vec<CartLineItem> {
    let mut merged: Vec<CartLineItem> = Vec::with_capacity(items.len());

    for item in items {
        if item.quantity == 0 {
            tracing::warn!(product_id = %item.product.id, "Dropping empty cart line from snapshot");
            continue;
        }
        let key = item.key();
        if let Some(existing) = merged.iter_mut().find(|line| line.matches(&key)) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            merged.push(item);
        }
    }

    for line in &mut merged {
        line.quantity = policy.limit(line.quantity, line.product.stock);
    }
    merged.retain(|line| {
        let keep = line.quantity > 0;
        if !keep {
            tracing::warn!(product_id = %line.product.id, "Dropping out-of-stock cart line from snapshot");
        }
        keep
    });
    merged
}
