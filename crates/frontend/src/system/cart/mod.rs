pub mod context;
pub mod store;

pub use context::{use_cart, CartContext, CartProvider};
pub use store::{CartError, CartStore, Subscription};
