//! Storefront client: the cart/wishlist store, its local persistence and the
//! catalog service it talks to.

pub mod catalog;
pub mod config;
pub mod error;
pub mod flows;
pub mod storage;
pub mod store;

pub use catalog::{CatalogService, HttpCatalog};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, StorageError};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{Action, Store};
