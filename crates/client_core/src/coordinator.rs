//! Pagination/selection coordinator.
//!
//! Owns the page offset, the materialized page, the selected item and the
//! loading flag, and publishes each as a [`StateChannel`]. Actions return
//! immediately; page fetches run as spawned tasks and publish their results
//! later. Only the fetch for the most recently requested offset is allowed to
//! publish (last-offset-wins).

use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::try_join_all;
use shared::domain::{ItemId, Pokemon};
use tokio::{runtime::Handle, sync::broadcast};
use tracing::{debug, info, warn};

use crate::{
    error::CatalogError,
    navigation::{Navigator, NoopNavigator},
    resource_client::{HttpResourceClient, ResourceClient},
    state_channel::{StateChannel, StateSubscription},
    CatalogItem,
};

pub const PAGE_SIZE: u32 = 20;
/// Last valid page-start offset.
pub const MAX_OFFSET: u32 = 130;
const ERROR_CHANNEL_CAPACITY: usize = 64;

pub type PokedexCoordinator = CatalogCoordinator<Pokemon, HttpResourceClient>;

/// Page offset that should be shown for a deep-linked identifier.
///
/// An identifier sitting exactly on a page boundary (20, 40, ...) maps to the
/// page *before* it, so `20 -> 0` and `120 -> 100`; `130` is not a boundary
/// and lands on `120`. Identifiers past [`MAX_OFFSET`] clamp to it.
pub fn resolve_offset_for_identifier(item_id: ItemId) -> u32 {
    let id = item_id.0;
    if id > MAX_OFFSET {
        return MAX_OFFSET;
    }
    let rest = id % PAGE_SIZE;
    if rest != 0 {
        id - rest
    } else {
        id.saturating_sub(PAGE_SIZE)
    }
}

pub fn next_offset(offset: u32) -> u32 {
    offset.saturating_add(PAGE_SIZE).min(MAX_OFFSET)
}

pub fn previous_offset(offset: u32) -> u32 {
    offset.saturating_sub(PAGE_SIZE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorStatus {
    Idle,
    Loading,
}

/// Published on the error channel when the current page fetch fails.
#[derive(Debug, Clone)]
pub struct PageFetchFailure {
    pub offset: u32,
    pub error: Arc<CatalogError>,
}

struct PendingSelection {
    generation: u64,
    item_id: ItemId,
}

struct FetchState {
    /// Runtime captured by `initialize`; `Some` once initialized. Fetches are
    /// spawned through it so actions work from any thread.
    runtime: Option<Handle>,
    offset: u32,
    /// Bumped for every fetch started; a completing fetch publishes only if
    /// its generation is still the latest.
    generation: u64,
    pending_selection: Option<PendingSelection>,
}

pub struct CatalogCoordinator<T: CatalogItem, R> {
    resources: R,
    navigator: Arc<dyn Navigator>,
    offset: StateChannel<u32>,
    selected_item: StateChannel<T>,
    items: StateChannel<Vec<T>>,
    is_loading: StateChannel<bool>,
    errors: broadcast::Sender<PageFetchFailure>,
    fetch: Mutex<FetchState>,
}

impl<T, R> CatalogCoordinator<T, R>
where
    T: CatalogItem,
    R: ResourceClient<T> + 'static,
{
    pub fn new(resources: R) -> Arc<Self> {
        Self::new_with_navigator(resources, Arc::new(NoopNavigator))
    }

    pub fn new_with_navigator(resources: R, navigator: Arc<dyn Navigator>) -> Arc<Self> {
        let (errors, _) = broadcast::channel(ERROR_CHANNEL_CAPACITY);
        Arc::new(Self {
            resources,
            navigator,
            offset: StateChannel::new(0),
            selected_item: StateChannel::empty(),
            items: StateChannel::new(Vec::new()),
            is_loading: StateChannel::new(true),
            errors,
            fetch: Mutex::new(FetchState {
                runtime: None,
                offset: 0,
                generation: 0,
                pending_selection: None,
            }),
        })
    }

    /// One-time startup. With a deep-linked identifier, jumps to the page
    /// that contains it and selects the item once that page arrives.
    /// Without one, loads the current offset. Later calls are ignored.
    ///
    /// Must be called from within a Tokio runtime; that runtime runs every
    /// later page fetch. Outside one the call is logged and has no effect.
    pub fn initialize(self: &Arc<Self>, deep_link: Option<ItemId>) {
        let mut state = self.lock_fetch();
        if state.runtime.is_some() {
            warn!("coordinator: initialize called more than once; ignoring");
            return;
        }
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!(
                    error = %err,
                    "coordinator: initialize called outside a Tokio runtime; ignoring"
                );
                return;
            }
        };
        state.runtime = Some(runtime.clone());

        match deep_link {
            Some(item_id) => {
                let start_offset = resolve_offset_for_identifier(item_id);
                info!(
                    item_id = item_id.0,
                    offset = start_offset,
                    "coordinator: starting from deep link"
                );
                self.set_offset(&mut state, start_offset);
                let generation = self.start_fetch(&mut state, &runtime);
                state.pending_selection = Some(PendingSelection {
                    generation,
                    item_id,
                });
            }
            None => {
                info!(offset = state.offset, "coordinator: starting without deep link");
                self.start_fetch(&mut state, &runtime);
            }
        }
    }

    pub fn next_page(self: &Arc<Self>) {
        self.move_to(next_offset, "next");
    }

    pub fn previous_page(self: &Arc<Self>) {
        self.move_to(previous_offset, "previous");
    }

    pub fn select_item(&self, item: T) {
        let item_id = item.item_id();
        debug!(item_id = item_id.0, "coordinator: item selected");
        self.navigator.navigate_to_item(item_id);
        self.selected_item.publish(item);
    }

    pub fn offset(&self) -> u32 {
        self.lock_fetch().offset
    }

    pub fn items(&self) -> Vec<T> {
        self.items.current().unwrap_or_default()
    }

    pub fn selected_item(&self) -> Option<T> {
        self.selected_item.current()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading.current().unwrap_or(false)
    }

    pub fn status(&self) -> CoordinatorStatus {
        if self.is_loading() {
            CoordinatorStatus::Loading
        } else {
            CoordinatorStatus::Idle
        }
    }

    pub fn page_index(&self) -> u32 {
        self.offset() / PAGE_SIZE
    }

    pub fn can_go_previous(&self) -> bool {
        self.offset() > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.offset() < MAX_OFFSET
    }

    pub fn subscribe_offset(&self) -> StateSubscription<u32> {
        self.offset.subscribe()
    }

    pub fn subscribe_selected_item(&self) -> StateSubscription<T> {
        self.selected_item.subscribe()
    }

    pub fn subscribe_items(&self) -> StateSubscription<Vec<T>> {
        self.items.subscribe()
    }

    pub fn subscribe_loading(&self) -> StateSubscription<bool> {
        self.is_loading.subscribe()
    }

    pub fn subscribe_errors(&self) -> broadcast::Receiver<PageFetchFailure> {
        self.errors.subscribe()
    }

    fn move_to(self: &Arc<Self>, step: fn(u32) -> u32, direction: &'static str) {
        let mut state = self.lock_fetch();
        let target = step(state.offset);
        if target == state.offset {
            debug!(offset = target, direction, "coordinator: page unchanged");
            return;
        }

        debug!(from = state.offset, to = target, direction, "coordinator: page change");
        self.set_offset(&mut state, target);
        if let Some(runtime) = state.runtime.clone() {
            self.start_fetch(&mut state, &runtime);
        }
    }

    fn set_offset(&self, state: &mut FetchState, offset: u32) {
        if state.offset != offset {
            state.offset = offset;
            self.offset.publish(offset);
        }
    }

    fn start_fetch(self: &Arc<Self>, state: &mut FetchState, runtime: &Handle) -> u64 {
        state.generation += 1;
        let generation = state.generation;
        let offset = state.offset;

        if let Some(pending) = state.pending_selection.take() {
            debug!(
                item_id = pending.item_id.0,
                generation = pending.generation,
                "coordinator: deep link page superseded; dropping pending selection"
            );
        }

        self.is_loading.publish(true);

        let coordinator = Arc::clone(self);
        runtime.spawn(async move {
            let result = coordinator.load_page(offset).await;
            coordinator.finish_fetch(generation, offset, result);
        });

        generation
    }

    async fn load_page(&self, offset: u32) -> Result<Vec<T>, CatalogError> {
        let references = self.resources.list_references(offset, PAGE_SIZE).await?;
        debug!(
            offset,
            count = references.len(),
            "coordinator: fetching page details"
        );
        try_join_all(
            references
                .iter()
                .map(|reference| self.resources.fetch_item(reference)),
        )
        .await
    }

    fn finish_fetch(&self, generation: u64, offset: u32, result: Result<Vec<T>, CatalogError>) {
        let mut state = self.lock_fetch();
        if generation != state.generation {
            debug!(
                offset,
                generation,
                current_generation = state.generation,
                "coordinator: discarding stale page"
            );
            return;
        }

        let pending = state.pending_selection.take();

        match result {
            Ok(items) => {
                info!(offset, count = items.len(), "coordinator: page loaded");
                let selected = pending.as_ref().and_then(|pending| {
                    items
                        .iter()
                        .find(|item| item.item_id() == pending.item_id)
                        .cloned()
                });

                self.items.publish(items);
                self.is_loading.publish(false);

                match (pending, selected) {
                    (_, Some(item)) => {
                        debug!(item_id = item.item_id().0, "coordinator: deep link resolved");
                        self.selected_item.publish(item);
                    }
                    (Some(pending), None) => {
                        info!(
                            item_id = pending.item_id.0,
                            offset, "coordinator: deep-linked item not on its page"
                        );
                    }
                    (None, None) => {}
                }
            }
            Err(err) => {
                warn!(offset, error = %err, "coordinator: page fetch failed");
                // The failure is visible before the loading flag drops.
                let _ = self.errors.send(PageFetchFailure {
                    offset,
                    error: Arc::new(err),
                });
                self.is_loading.publish(false);
            }
        }
    }

    fn lock_fetch(&self) -> MutexGuard<'_, FetchState> {
        self.fetch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod tests;
