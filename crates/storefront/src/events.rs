//! State-change notifications and user-facing notices.
//!
//! Engines do not know how they are rendered. After every command they
//! publish [`StorefrontEvent`]s to their [`Subscribers`]; the presentation
//! layer decides whether to re-read state, show a toast, or ignore it.
//! Callbacks run synchronously, after the mutation and the snapshot write
//! have both completed.

use std::fmt;

/// How prominently a notice should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Success,
    Info,
}

/// A confirmation message produced by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    AddedToCart { product_name: String },
    RemovedFromCart,
    CartCleared,
    AddedToWishlist { product_name: String },
    RemovedFromWishlist { product_name: String },
    WishlistCleared,
}

impl Notice {
    /// Display level for this notice.
    #[must_use]
    pub const fn level(&self) -> NoticeLevel {
        match self {
            Self::RemovedFromCart | Self::CartCleared => NoticeLevel::Info,
            Self::AddedToCart { .. }
            | Self::AddedToWishlist { .. }
            | Self::RemovedFromWishlist { .. }
            | Self::WishlistCleared => NoticeLevel::Success,
        }
    }

    /// Message shown to the shopper.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddedToCart { product_name } => write!(f, "Added {product_name} to your cart"),
            Self::RemovedFromCart => f.write_str("Item removed from cart"),
            Self::CartCleared => f.write_str("Cart cleared"),
            Self::AddedToWishlist { product_name } => {
                write!(f, "{product_name} added to wishlist")
            }
            Self::RemovedFromWishlist { product_name } => {
                write!(f, "{product_name} removed from wishlist")
            }
            Self::WishlistCleared => f.write_str("Wishlist cleared successfully"),
        }
    }
}

/// Whether the cart drawer is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CartVisibility {
    #[default]
    Closed,
    Open,
}

impl CartVisibility {
    /// The other state.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }

    /// Whether the drawer is open.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Something a subscriber may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorefrontEvent {
    /// A confirmation to surface to the shopper.
    Notice(Notice),
    /// The cart's line items changed.
    CartChanged,
    /// The wishlist's contents changed.
    WishlistChanged,
    /// The cart drawer was opened or closed.
    CartVisibilityChanged(CartVisibility),
}

/// Handle returned by [`Subscribers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn Fn(&StorefrontEvent)>;

/// Registry of event callbacks owned by one engine.
#[derive(Default)]
pub struct Subscribers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

impl Subscribers {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. It stays registered until [`Self::unsubscribe`].
    pub fn subscribe(&mut self, callback: impl Fn(&StorefrontEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Deliver `event` to every callback in subscription order.
    pub fn publish(&self, event: &StorefrontEvent) {
        for (_, callback) in &self.callbacks {
            callback(event);
        }
    }

    /// Publish a notice and log it.
    pub(crate) fn notify(&self, notice: Notice) {
        tracing::info!(level = ?notice.level(), "{notice}");
        self.publish(&StorefrontEvent::Notice(notice));
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_notice_messages() {
        let added = Notice::AddedToCart {
            product_name: "Fitness Tracker".to_string(),
        };
        assert_eq!(added.message(), "Added Fitness Tracker to your cart");
        assert_eq!(added.level(), NoticeLevel::Success);

        assert_eq!(Notice::RemovedFromCart.to_string(), "Item removed from cart");
        assert_eq!(Notice::RemovedFromCart.level(), NoticeLevel::Info);
        assert_eq!(Notice::CartCleared.level(), NoticeLevel::Info);

        let saved = Notice::AddedToWishlist {
            product_name: "Smart Home Speaker".to_string(),
        };
        assert_eq!(saved.to_string(), "Smart Home Speaker added to wishlist");
        assert_eq!(
            Notice::WishlistCleared.to_string(),
            "Wishlist cleared successfully"
        );
    }

    #[test]
    fn test_visibility_toggles() {
        let vis = CartVisibility::default();
        assert_eq!(vis, CartVisibility::Closed);
        assert!(vis.toggled().is_open());
        assert_eq!(vis.toggled().toggled(), CartVisibility::Closed);
    }

    #[test]
    fn test_publish_reaches_all_subscribers_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut subscribers = Subscribers::new();

        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            subscribers.subscribe(move |event| seen.borrow_mut().push((tag, event.clone())));
        }

        subscribers.publish(&StorefrontEvent::CartChanged);

        assert_eq!(
            *seen.borrow(),
            vec![
                ("first", StorefrontEvent::CartChanged),
                ("second", StorefrontEvent::CartChanged),
            ]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut subscribers = Subscribers::new();

        let counter = Rc::clone(&count);
        let id = subscribers.subscribe(move |_| *counter.borrow_mut() += 1);
        assert_eq!(subscribers.len(), 1);

        assert!(subscribers.unsubscribe(id));
        assert!(!subscribers.unsubscribe(id));
        assert!(subscribers.is_empty());

        subscribers.publish(&StorefrontEvent::WishlistChanged);
        assert_eq!(*count.borrow(), 0);
    }
}
