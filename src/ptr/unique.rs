use std::any::Any;
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::core::programmer_error;
use crate::error::CoreResult;

/// Exclusive ownership of a heap object of run-time type `U` where `U` is
/// `T` or a subtype. Transfer is by move only — this is simply Rust
/// ownership, so the compiler enforces "at most one `Unique<T>` names a
/// given object" for free; there is no separate move-flag to maintain.
pub struct Unique<T: ?Sized> {
    inner: Option<Box<T>>,
}

impl<T> Unique<T> {
    /// Heap-allocate `value` and take exclusive ownership of it.
    ///
    /// Never panics: a real allocation failure here is unrepresentable in
    /// safe Rust (the global allocator aborts rather than returning `None`
    /// on OOM), but the `CoreResult` return keeps the call-site shape
    /// consistent with every other fallible constructor in this crate (and
    /// with a future custom-allocator backend, e.g. for the kernel target).
    pub fn new_with(value: T) -> CoreResult<Self> {
        Ok(Unique {
            inner: Some(Box::new(value)),
        })
    }
}

impl<T: ?Sized> Unique<T> {
    /// An empty pointer, as produced by a failed downcast.
    pub fn empty() -> Self {
        Unique { inner: None }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    /// Destroy the held object, if any.
    pub fn reset(&mut self) {
        self.inner = None;
    }

    /// Hand back ownership of the boxed object, leaving this pointer empty.
    pub fn take(&mut self) -> Option<Box<T>> {
        self.inner.take()
    }

    pub fn get(&self) -> Option<&T> {
        self.inner.as_deref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.inner.as_deref_mut()
    }
}

impl<T: ?Sized> Deref for Unique<T> {
    type Target = T;

    /// Deref of an empty `Unique<T>` is a programmer error: callers must
    /// test [`Unique::is_empty`] first.
    fn deref(&self) -> &T {
        match &self.inner {
            Some(b) => b,
            None => programmer_error("deref of an empty Unique<T>"),
        }
    }
}

impl<T: ?Sized> DerefMut for Unique<T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.inner {
            Some(b) => b,
            None => programmer_error("deref of an empty Unique<T>"),
        }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Unique<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(b) => f.debug_tuple("Unique").field(&**b).finish(),
            None => f.write_str("Unique(empty)"),
        }
    }
}

impl<T: ?Sized> Default for Unique<T> {
    fn default() -> Self {
        Unique::empty()
    }
}

/// The trait-object flavor used to carry polymorphic payloads across
/// threads (work-item arguments, anything boxed generically).
pub type UniqueAny = Unique<dyn Any + Send + Sync>;

impl Unique<dyn Any + Send + Sync> {
    /// Box `value` as a type-erased object.
    pub fn new_any<T: Any + Send + Sync>(value: T) -> Self {
        Unique {
            inner: Some(Box::new(value)),
        }
    }

    /// Downcast, consuming `self` (a move-cast).
    ///
    /// On success the object transfers into the returned `Unique<U>`. On
    /// failure the object is dropped along with `self` and an empty
    /// `Unique<U>` comes back — there is nothing to hand back to the caller
    /// since `self` was taken by value, so "reset on move-cast" falls out
    /// directly from move semantics rather than needing separate bookkeeping.
    pub fn downcast<U: Any>(mut self) -> Unique<U> {
        match self.inner.take() {
            Some(boxed) => match boxed.downcast::<U>() {
                Ok(concrete) => Unique {
                    inner: Some(concrete),
                },
                Err(_) => Unique::empty(),
            },
            None => Unique::empty(),
        }
    }
}
