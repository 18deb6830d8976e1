// ── State container ──
//
// Owns the canonical ViewState. All mutation goes through `apply`,
// which shallow-merges a patch, commits a new immutable snapshot, and
// synchronously notifies subscribers in subscription order. Re-entrant
// `apply` calls from inside a subscriber are queued and dispatched
// after the current pass, so notifications are never skipped,
// duplicated, or interleaved.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::stream::StateStream;
use super::{CameraCommand, Selection, StatePatch, ViewState};

type SubscriberFn = dyn Fn(&Arc<ViewState>) + Send + Sync;

struct Cells {
    current: Arc<ViewState>,
    /// Startup defaults, restored by a `reset` patch.
    initial: ViewState,
    /// Patches waiting for the active dispatch pass to pick them up.
    queue: VecDeque<StatePatch>,
    dispatching: bool,
}

impl Cells {
    /// Merge a patch and commit the result.
    ///
    /// Returns `None` when the merged state equals the current one —
    /// such transitions are dropped without notification, which also
    /// terminates subscriber loops that keep re-applying the same
    /// transition.
    fn commit(&mut self, patch: StatePatch) -> Option<Arc<ViewState>> {
        let mut next = if patch.reset {
            // Reset short-circuits: other keys in the same patch are
            // deliberately ignored.
            let mut next = self.initial.clone();
            next.version = self.current.version;
            next
        } else {
            let mut next = (*self.current).clone();
            if let Some(opacity) = patch.opacity {
                next.opacity = opacity.clamp(0.0, 1.0);
            }
            if let Some(filter) = patch.filter {
                next.filter = filter;
            }
            if let Some(selection) = patch.selection {
                next.selection = match selection {
                    Selection::None => None,
                    Selection::Group(group) => Some(group),
                };
            }
            if let Some(overlays) = patch.overlays {
                next.overlays = overlays;
            }
            if let Some(camera) = patch.camera {
                next.camera = Some(camera);
            }
            next
        };

        if next == *self.current {
            return None;
        }

        next.version = self.current.version + 1;
        self.current = Arc::new(next);
        Some(Arc::clone(&self.current))
    }
}

/// Owner of the canonical [`ViewState`].
///
/// Synchronous observer dispatch for the render pipeline, plus a
/// `watch` mirror ([`StateStream`]) for async consumers.
pub struct StateContainer {
    cells: Mutex<Cells>,
    subscribers: Mutex<Vec<Arc<SubscriberFn>>>,
    watch_tx: watch::Sender<Arc<ViewState>>,
}

impl StateContainer {
    pub fn new(initial: ViewState) -> Self {
        let current = Arc::new(initial.clone());
        let (watch_tx, _) = watch::channel(Arc::clone(&current));

        Self {
            cells: Mutex::new(Cells {
                current,
                initial,
                queue: VecDeque::new(),
                dispatching: false,
            }),
            subscribers: Mutex::new(Vec::new()),
            watch_tx,
        }
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn get(&self) -> Arc<ViewState> {
        Arc::clone(&lock(&self.cells).current)
    }

    /// Register a subscriber, called on every future committed
    /// transition. There is no unsubscribe.
    pub fn subscribe(&self, subscriber: impl Fn(&Arc<ViewState>) + Send + Sync + 'static) {
        lock(&self.subscribers).push(Arc::new(subscriber));
    }

    /// Shallow-merge `patch` and notify subscribers.
    ///
    /// If called from inside a subscriber, the patch is queued and the
    /// outer dispatch pass picks it up after finishing the current
    /// notification round.
    pub fn apply(&self, patch: StatePatch) {
        {
            let mut cells = lock(&self.cells);
            cells.queue.push_back(patch);
            if cells.dispatching {
                return;
            }
            cells.dispatching = true;
        }

        loop {
            let snapshot = {
                let mut cells = lock(&self.cells);
                let Some(patch) = cells.queue.pop_front() else {
                    cells.dispatching = false;
                    break;
                };
                match cells.commit(patch) {
                    Some(snapshot) => snapshot,
                    None => continue,
                }
            };

            self.watch_tx.send_replace(Arc::clone(&snapshot));

            // Snapshot the subscriber list so callbacks can subscribe
            // or apply re-entrantly without holding any lock.
            let subscribers: Vec<_> = lock(&self.subscribers).iter().map(Arc::clone).collect();
            for subscriber in subscribers {
                subscriber(&snapshot);
            }
        }
    }

    /// Consume the pending one-shot camera command.
    ///
    /// Clears the field silently — same version, no notification — so
    /// the command cannot replay on later unrelated updates.
    pub fn take_camera(&self) -> Option<CameraCommand> {
        let mut cells = lock(&self.cells);
        cells.current.camera.as_ref()?;

        let mut next = (*cells.current).clone();
        let command = next.camera.take();
        cells.current = Arc::new(next);
        command
    }

    /// Subscription handle over the `watch` mirror.
    pub fn stream(&self) -> StateStream {
        StateStream::new(self.watch_tx.subscribe())
    }
}

/// Lock with poison recovery: a panicked subscriber must not wedge the
/// whole container.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex as StdMutex;

    use pretty_assertions::assert_eq;

    use super::super::DEFAULT_OPACITY;
    use super::*;
    use crate::model::LevelFilter;

    fn container() -> Arc<StateContainer> {
        Arc::new(StateContainer::new(ViewState::default()))
    }

    #[test]
    fn shallow_merge_leaves_absent_fields_untouched() {
        let c = container();
        c.apply(StatePatch::select("A"));
        c.apply(StatePatch::opacity(0.3));

        let state = c.get();
        assert_eq!(state.selection.as_deref(), Some("A"));
        assert_eq!(state.opacity, 0.3);
        assert_eq!(state.filter, LevelFilter::All);
    }

    #[test]
    fn explicit_deselect_differs_from_absent() {
        let c = container();
        c.apply(StatePatch::select("A"));

        // Absent selection field: no change.
        c.apply(StatePatch::opacity(0.5));
        assert_eq!(c.get().selection.as_deref(), Some("A"));

        // Explicit none: cleared.
        c.apply(StatePatch::deselect());
        assert_eq!(c.get().selection, None);
    }

    #[test]
    fn reset_short_circuits_other_keys() {
        let c = container();
        c.apply(StatePatch::select("A"));
        c.apply(StatePatch {
            opacity: Some(0.1),
            reset: true,
            ..StatePatch::default()
        });

        let state = c.get();
        assert_eq!(state.selection, None);
        assert_eq!(state.opacity, DEFAULT_OPACITY);
    }

    #[test]
    fn opacity_is_clamped() {
        let c = container();
        c.apply(StatePatch::opacity(7.0));
        assert_eq!(c.get().opacity, 1.0);
    }

    #[test]
    fn subscribers_notified_in_subscription_order() {
        let c = container();
        let order = Arc::new(StdMutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            c.subscribe(move |_| order.lock().unwrap().push(tag));
        }

        c.apply(StatePatch::opacity(0.2));
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn no_change_patch_is_dropped_without_notification() {
        let c = container();
        let count = Arc::new(StdMutex::new(0));
        {
            let count = Arc::clone(&count);
            c.subscribe(move |_| *count.lock().unwrap() += 1);
        }

        c.apply(StatePatch::opacity(0.4));
        c.apply(StatePatch::opacity(0.4));
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn reentrant_apply_is_queued_not_nested() {
        let c = container();
        let seen = Arc::new(StdMutex::new(Vec::new()));

        // First subscriber reacts to the first transition by applying a
        // follow-up patch.
        {
            let c2 = Arc::clone(&c);
            c.subscribe(move |state| {
                if state.selection.as_deref() == Some("A") {
                    c2.apply(StatePatch::select("B"));
                }
            });
        }
        {
            let seen = Arc::clone(&seen);
            c.subscribe(move |state| {
                seen.lock().unwrap().push((state.version, state.selection.clone()));
            });
        }

        c.apply(StatePatch::select("A"));

        // Both transitions observed by the second subscriber, in order,
        // exactly once each.
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(1, Some("A".to_owned())), (2, Some("B".to_owned()))]
        );
    }

    #[test]
    fn self_deselect_loop_terminates() {
        let c = container();
        let notifications = Arc::new(StdMutex::new(0));

        {
            let c2 = Arc::clone(&c);
            let notifications = Arc::clone(&notifications);
            c.subscribe(move |_| {
                *notifications.lock().unwrap() += 1;
                // Blindly re-applies the same transition on every
                // notification.
                c2.apply(StatePatch::deselect());
            });
        }

        c.apply(StatePatch::select("A"));

        // select A → notify (subscriber queues deselect) → deselect →
        // notify (subscriber queues deselect again, dropped as
        // no-change). Exactly two notifications.
        assert_eq!(*notifications.lock().unwrap(), 2);
        assert_eq!(c.get().selection, None);
    }

    #[test]
    fn camera_command_is_one_shot() {
        let c = container();
        let count = Arc::new(StdMutex::new(0));
        {
            let count = Arc::clone(&count);
            c.subscribe(move |_| *count.lock().unwrap() += 1);
        }

        c.apply(StatePatch::fly_to(19.4, -99.1, Some(9.0), None));
        assert_eq!(*count.lock().unwrap(), 1);

        let command = c.take_camera();
        assert!(matches!(command, Some(CameraCommand::FlyTo { .. })));
        assert_eq!(c.take_camera(), None);
        assert_eq!(c.get().camera, None);

        // Consuming the command is silent.
        assert_eq!(*count.lock().unwrap(), 1);

        // The same command can be issued again afterwards.
        c.apply(StatePatch::fly_to(19.4, -99.1, Some(9.0), None));
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn versions_are_strictly_increasing() {
        let c = container();
        c.apply(StatePatch::opacity(0.1));
        c.apply(StatePatch::select("A"));
        c.apply(StatePatch::deselect());
        assert_eq!(c.get().version, 3);
    }

    #[test]
    fn overlays_replace_wholesale() {
        let c = Arc::new(StateContainer::new(ViewState::initial(
            0.8,
            BTreeMap::from([("rivers".to_owned(), false), ("states".to_owned(), true)]),
        )));

        c.apply(StatePatch::overlays(BTreeMap::from([(
            "rivers".to_owned(),
            true,
        )])));

        let state = c.get();
        assert!(state.overlay_enabled("rivers"));
        // Replaced, not merged: the old key is gone.
        assert!(!state.overlay_enabled("states"));
    }

    #[tokio::test]
    async fn watch_stream_adapter_yields_latest_snapshot() {
        use tokio_stream::StreamExt;

        let c = container();
        let mut stream = c.stream().into_stream();
        c.apply(StatePatch::opacity(0.5));

        // The adapter yields the current value on first poll.
        let first = stream.next().await.expect("snapshot");
        assert_eq!(first.opacity, 0.5);
    }

    #[tokio::test]
    async fn watch_mirror_delivers_committed_snapshots() {
        let c = container();
        let mut stream = c.stream();

        assert_eq!(stream.current().version, 0);

        c.apply(StatePatch::select("A"));
        let next = stream.changed().await.expect("sender alive");
        assert_eq!(next.selection.as_deref(), Some("A"));
        assert_eq!(stream.latest().version, 1);
    }
}
