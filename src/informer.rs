//! Event-handler driven informer on top of `kube::runtime`.
//!
//! The runtime watcher takes care of listing, watching, resuming and relisting,
//! and the reflector store keeps the local cache. What it does not provide is
//! the add/update/delete callback shape with the previous snapshot attached,
//! or periodic resync. `Informer` derives both from the store before every
//! write to it.

use futures::{Stream, StreamExt};
use kube::Resource;
use kube::runtime::reflector::{self, ObjectRef, Store, store::Writer};
use kube::runtime::watcher;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Callbacks for a watched resource type. Invoked serially from one task.
pub trait ResourceEventHandler<K>: Send + 'static {
    fn on_add(&self, obj: &K);
    fn on_update(&self, old: &K, new: &K);
    fn on_delete(&self, obj: &K);
}

pub struct Informer<K, H>
where
    K: Resource + Clone + 'static,
    K::DynamicType: Eq + Hash + Clone + Default,
{
    writer: Writer<K>,
    store: Store<K>,
    handler: H,
    relisting: Option<Relist<K>>,
}

/// Bookkeeping for a relist in progress.
struct Relist<K>
where
    K: Resource + 'static,
    K::DynamicType: Eq + Hash + Clone,
{
    /// Keys returned by the current list attempt.
    seen: HashSet<ObjectRef<K>>,
    /// Objects already handed to the handler since the relist began, across retried lists.
    delivered: HashMap<ObjectRef<K>, Arc<K>>,
}

impl<K, H> Informer<K, H>
where
    K: Resource + Clone + Debug + Send + Sync + 'static,
    K::DynamicType: Eq + Hash + Clone + Default,
    H: ResourceEventHandler<K>,
{
    pub fn new(handler: H) -> Self {
        let (store, writer) = reflector::store();
        Self {
            writer,
            store,
            handler,
            relisting: None,
        }
    }

    pub fn store(&self) -> Store<K> {
        self.store.clone()
    }

    /// Apply one watcher event to the cache and notify the handler.
    pub fn handle_event(&mut self, event: watcher::Event<K>) {
        match &event {
            watcher::Event::Init => {
                debug!("Listing objects");
                // an interrupted relist restarts, but what was delivered stays delivered
                let delivered = self.relisting.take().map(|r| r.delivered).unwrap_or_default();
                self.relisting = Some(Relist {
                    seen: HashSet::new(),
                    delivered,
                });
                self.writer.apply_watcher_event(&event);
            }
            watcher::Event::InitApply(obj) => {
                let key = ObjectRef::from_obj(obj);
                // the store still holds the previous list until InitDone
                let old = match self.relisting.as_mut() {
                    Some(relist) => {
                        let old = relist
                            .delivered
                            .get(&key)
                            .cloned()
                            .or_else(|| self.store.get(&key));
                        relist.seen.insert(key.clone());
                        relist.delivered.insert(key, Arc::new(obj.clone()));
                        old
                    }
                    None => self.store.get(&key),
                };
                self.writer.apply_watcher_event(&event);
                match old {
                    Some(old) => self.handler.on_update(&old, obj),
                    None => self.handler.on_add(obj),
                }
            }
            watcher::Event::InitDone => {
                let Some(relist) = self.relisting.take() else {
                    self.writer.apply_watcher_event(&event);
                    return;
                };
                let mut stale: HashMap<ObjectRef<K>, Arc<K>> = self
                    .store
                    .state()
                    .into_iter()
                    .map(|obj| (ObjectRef::from_obj(&*obj), obj))
                    .collect();
                stale.extend(relist.delivered);
                stale.retain(|key, _| !relist.seen.contains(key));
                self.writer.apply_watcher_event(&event);
                for obj in stale.values() {
                    self.handler.on_delete(obj);
                }
                debug!(
                    "List complete: {} objects, {} removed",
                    relist.seen.len(),
                    stale.len()
                );
            }
            watcher::Event::Apply(obj) => {
                let old = self.store.get(&ObjectRef::from_obj(obj));
                self.writer.apply_watcher_event(&event);
                match old {
                    Some(old) => self.handler.on_update(&old, obj),
                    None => self.handler.on_add(obj),
                }
            }
            watcher::Event::Delete(obj) => {
                self.writer.apply_watcher_event(&event);
                self.handler.on_delete(obj);
            }
        }
    }

    /// Replay every cached object through `on_update` with itself as both snapshots.
    pub fn resync(&self) {
        let objects = self.store.state();
        debug!("Resync of {} cached objects", objects.len());
        for obj in objects {
            self.handler.on_update(&obj, &obj);
        }
    }

    /// Drive the informer until `stream` ends or `token` is cancelled.
    ///
    /// A zero `resync` period disables periodic resync.
    pub async fn run<S>(mut self, stream: S, token: CancellationToken, resync: Duration)
    where
        S: Stream<Item = Result<watcher::Event<K>, watcher::Error>>,
    {
        let mut stream = pin!(stream);
        let mut ticker = (!resync.is_zero()).then(|| {
            let mut ticker = interval_at(Instant::now() + resync, resync);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Informer stopped");
                    break;
                }
                _ = tick(&mut ticker) => self.resync(),
                event = stream.next() => match event {
                    Some(Ok(event)) => self.handle_event(event),
                    Some(Err(err)) => warn!("Watch stream error, retrying: {}", err),
                    None => {
                        debug!("Watch stream ended");
                        break;
                    }
                },
            }
        }
    }

    /// Run on the tokio runtime, returning a handle to the cache and the task.
    pub fn spawn<S>(self, stream: S, resync: Duration) -> WatchHandle<K>
    where
        S: Stream<Item = Result<watcher::Event<K>, watcher::Error>> + Send + 'static,
        K::DynamicType: Send + Sync,
    {
        let token = CancellationToken::new();
        let store = self.store();
        let task = tokio::spawn(self.run(stream, token.clone(), resync));
        WatchHandle { store, token, task }
    }
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// A running watch: read access to its cache plus a way to stop it.
pub struct WatchHandle<K>
where
    K: Resource + Clone + 'static,
    K::DynamicType: Eq + Hash + Clone,
{
    store: Store<K>,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl<K> WatchHandle<K>
where
    K: Resource + Clone + 'static,
    K::DynamicType: Eq + Hash + Clone,
{
    pub fn store(&self) -> &Store<K> {
        &self.store
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Wait for the watch task to finish.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!("Watch task failed: {}", e);
        }
    }
}
