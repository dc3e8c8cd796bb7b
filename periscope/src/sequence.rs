//! Transport sequence numbers.
use std::{
    fmt,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc, PoisonError, RwLock,
    },
};

/// Sequence numbers wrap modulo this value, *not* `2^32`.
///
/// `0xfffffffe` is followed by `0`, and `0xffffffff` is never produced by an
/// increment. Cameras in the field have only ever seen this sequence, so it is
/// kept as is.
pub const SEQUENCE_MODULUS: u64 = 0xffff_ffff;

type Observer = Arc<dyn Fn(u32) + Send + Sync>;

const fn advance(n: u32) -> u32 {
    ((n as u64 + 1) % SEQUENCE_MODULUS) as u32
}

/// Sequence number source shared by every send on a channel.
///
/// [next_sequence][Self::next_sequence] is the only way the counter moves
/// forward, and is called exactly once per datagram.
pub struct SequenceCounter {
    counter: AtomicU32,
    observer: RwLock<Option<Observer>>,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Creates a counter whose next value is `value + 1`.
    pub fn starting_at(value: u32) -> Self {
        Self {
            counter: AtomicU32::new(value),
            observer: RwLock::new(None),
        }
    }

    /// Advances the counter, notifies the observer, and returns the new value.
    ///
    /// The observer runs on the calling task before this returns, so it must
    /// not block.
    pub fn next_sequence(&self) -> u32 {
        let (Ok(prev) | Err(prev)) =
            self.counter
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(advance(n)));
        let next = advance(prev);
        trace!("sequence number {next:#010x}");

        if let Some(observer) = self.observer() {
            observer(next);
        }
        next
    }

    /// The most recently issued sequence number.
    pub fn current(&self) -> u32 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Overwrites the counter without notifying the observer.
    pub fn force(&self, value: u32) {
        self.counter.store(value, Ordering::SeqCst);
    }

    /// Sets the callback invoked with every new sequence number, replacing any
    /// previous one.
    pub fn set_observer(&self, observer: impl Fn(u32) + Send + Sync + 'static) {
        *self
            .observer
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(observer));
    }

    pub fn clear_observer(&self) {
        *self
            .observer
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn observer(&self) -> Option<Observer> {
        self.observer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SequenceCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceCounter")
            .field("counter", &self.current())
            .field("observer", &self.observer().is_some())
            .finish()
    }
}
