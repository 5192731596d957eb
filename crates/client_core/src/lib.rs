//! Client-side core of the catalog browser: the HTTP resource client and the
//! pagination/selection coordinator that the view layer observes.

use shared::domain::{ItemId, Pokemon};

pub mod coordinator;
pub mod error;
pub mod navigation;
pub mod resource_client;
pub mod state_channel;

pub use coordinator::{
    resolve_offset_for_identifier, CatalogCoordinator, CoordinatorStatus, PageFetchFailure,
    PokedexCoordinator, MAX_OFFSET, PAGE_SIZE,
};
pub use error::CatalogError;
pub use navigation::{item_path, parse_deep_link, Navigator, NoopNavigator};
pub use resource_client::{HttpResourceClient, ResourceClient};
pub use state_channel::{StateChannel, StateRecvError, StateSubscription};

/// Anything the coordinator can page through. The only thing it needs to
/// know about an item is its stable identifier.
pub trait CatalogItem: Clone + Send + Sync + 'static {
    fn item_id(&self) -> ItemId;
}

impl CatalogItem for Pokemon {
    fn item_id(&self) -> ItemId {
        self.id
    }
}
