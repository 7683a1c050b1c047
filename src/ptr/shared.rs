use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::core::programmer_error;
use crate::error::CoreResult;

/// Shared ownership of a heap object via a strong reference count stored
/// adjacent to the object. Backed by [`std::sync::Arc`], whose `ArcInner<T>`
/// already places the strong/weak counts and the payload in one aligned
/// allocation and pairs the decrement-to-zero with an acquire fence.
pub struct Shared<T: ?Sized> {
    inner: Option<Arc<T>>,
}

impl<T> Shared<T> {
    /// Heap-allocate `value` and take the first strong reference to it.
    pub fn new_with(value: T) -> CoreResult<Self> {
        Ok(Shared {
            inner: Some(Arc::new(value)),
        })
    }
}

impl<T: ?Sized> Shared<T> {
    /// Wrap an already-constructed `Arc<T>`.
    ///
    /// The escape hatch for unsized `T` (trait objects such as `dyn Event`)
    /// where [`Shared::new_with`] doesn't apply: callers build the `Arc`
    /// themselves, coercing it to the trait object at the `Arc::new` call
    /// site, the same way the standard library's own unsizing coercion
    /// works for `Arc`.
    pub fn from_arc(arc: Arc<T>) -> Self {
        Shared { inner: Some(arc) }
    }

    /// An empty pointer, as produced by a failed downcast.
    pub fn empty() -> Self {
        Shared { inner: None }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    /// Release this handle's reference, destroying the payload if this was
    /// the last one.
    pub fn reset(&mut self) {
        self.inner = None;
    }

    /// Number of live `Shared` handles aliasing the same payload. `0` for an
    /// empty pointer.
    pub fn strong_count(&self) -> usize {
        match &self.inner {
            Some(arc) => Arc::strong_count(arc),
            None => 0,
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.inner.as_deref()
    }
}

impl<T: ?Sized> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared {
            inner: self.inner.clone(),
        }
    }
}

impl<T: ?Sized> Deref for Shared<T> {
    type Target = T;

    /// Deref of an empty `Shared<T>` is a programmer error: callers must
    /// test [`Shared::is_empty`] first.
    fn deref(&self) -> &T {
        match &self.inner {
            Some(arc) => arc,
            None => programmer_error("deref of an empty Shared<T>"),
        }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(arc) => f.debug_tuple("Shared").field(&**arc).finish(),
            None => f.write_str("Shared(empty)"),
        }
    }
}

impl<T: ?Sized> Default for Shared<T> {
    fn default() -> Self {
        Shared::empty()
    }
}

/// The trait-object flavor used to carry polymorphic payloads across
/// threads — events and listeners both travel this way through the bus.
pub type SharedAny = Shared<dyn Any + Send + Sync>;

impl Shared<dyn Any + Send + Sync> {
    /// Box `value` as a type-erased, shared object.
    pub fn new_any<T: Any + Send + Sync>(value: T) -> Self {
        Shared {
            inner: Some(Arc::new(value)),
        }
    }

    /// Downcast without consuming `self` (a copy-cast).
    ///
    /// On success, the returned `Shared<U>` is a new alias of the same
    /// allocation (the strong count goes up by one); `self` is left exactly
    /// as it was either way.
    pub fn downcast<U: Any + Send + Sync>(&self) -> Shared<U> {
        match &self.inner {
            Some(arc) => match Arc::clone(arc).downcast::<U>() {
                Ok(concrete) => Shared {
                    inner: Some(concrete),
                },
                Err(_) => Shared::empty(),
            },
            None => Shared::empty(),
        }
    }

    /// Downcast, consuming `self` (a move-cast).
    ///
    /// Destructive either way: on success ownership transfers to the
    /// returned `Shared<U>` without touching the strong count; on failure
    /// the reference `self` held is simply dropped.
    pub fn downcast_move<U: Any + Send + Sync>(mut self) -> Shared<U> {
        match self.inner.take() {
            Some(arc) => match arc.downcast::<U>() {
                Ok(concrete) => Shared {
                    inner: Some(concrete),
                },
                Err(_) => Shared::empty(),
            },
            None => Shared::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_count_tracks_live_aliases() {
        let s1 = Shared::new_with(42).unwrap();
        assert_eq!(s1.strong_count(), 1);
        let s2 = s1.clone();
        assert_eq!(s1.strong_count(), 2);
        assert_eq!(s2.strong_count(), 2);
        drop(s2);
        assert_eq!(s1.strong_count(), 1);
    }

    #[test]
    fn payload_destroyed_when_count_reaches_zero() {
        let dropped = Arc::new(std::sync::atomic::AtomicBool::new(false));
        struct MarkOnDrop(Arc<std::sync::atomic::AtomicBool>);
        impl Drop for MarkOnDrop {
            fn drop(&mut self) {
                self.0.store(true, std::sync::atomic::Ordering::SeqCst);
            }
        }

        let s1 = Shared::new_with(MarkOnDrop(dropped.clone())).unwrap();
        let s2 = s1.clone();
        drop(s1);
        assert!(!dropped.load(std::sync::atomic::Ordering::SeqCst));
        drop(s2);
        assert!(dropped.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    #[should_panic]
    fn deref_empty_is_a_programmer_error() {
        let empty: Shared<i32> = Shared::empty();
        let _ = *empty;
    }

    #[test]
    fn copy_cast_leaves_source_unchanged_on_success_and_failure() {
        let any = Shared::new_any(100i32);

        let ok = any.downcast::<i32>();
        assert!(!ok.is_empty());
        assert!(!any.is_empty());
        assert_eq!(any.strong_count(), 2);

        drop(ok);
        let bad = any.downcast::<String>();
        assert!(bad.is_empty());
        assert!(!any.is_empty());
        assert_eq!(any.strong_count(), 1);
    }

    #[test]
    fn move_cast_consumes_source_on_success_and_failure() {
        let any = Shared::new_any(100i32);
        let ok = any.downcast_move::<i32>();
        assert!(!ok.is_empty());
        assert_eq!(*ok, 100);

        let any2 = Shared::new_any(100i32);
        let bad = any2.downcast_move::<String>();
        assert!(bad.is_empty());
    }
}
