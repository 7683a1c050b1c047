//! Ambient, crate-wide utilities that don't belong to any one component.

use std::fmt;

/// A fallible-construction wrapper.
///
/// Several components in this crate (`Pool`, `Bus`, `Signal`, ...) can fail
/// to come into existence — an OS primitive couldn't be created, an
/// allocation failed — and nothing in this crate ever throws to report that.
/// `Optional<T>` is the construction-site idiom: hold the slot empty until a
/// fallible `new`/`create` call succeeds, then fill it.
///
/// This is deliberately not a re-export of [`std::option::Option`]: it exists
/// only to make the deferred-construction pattern explicit at call sites,
/// e.g. `let mut pool: Optional<Pool> = Optional::empty();` followed by
/// `pool.set(Pool::new(cfg)?);`.
pub struct Optional<T> {
    value: Option<T>,
}

impl<T> Optional<T> {
    /// An empty slot, ready to be filled by a fallible constructor.
    pub const fn empty() -> Self {
        Optional { value: None }
    }

    /// Wrap an already-constructed value.
    pub const fn of(value: T) -> Self {
        Optional { value: Some(value) }
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Fill the slot, dropping whatever was there before.
    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    /// Empty the slot, dropping the held value if any.
    pub fn reset(&mut self) {
        self.value = None;
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    /// Take the value out, leaving the slot empty.
    pub fn take(&mut self) -> Option<T> {
        self.value.take()
    }
}

impl<T> std::ops::Deref for Optional<T> {
    type Target = T;

    /// Deref of an empty `Optional` is a programmer error: the type exists
    /// to defer construction, not to carry absence as a normal case.
    fn deref(&self) -> &T {
        match &self.value {
            Some(v) => v,
            None => programmer_error("deref of an empty Optional<T>"),
        }
    }
}

impl<T> std::ops::DerefMut for Optional<T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.value {
            Some(v) => v,
            None => programmer_error("deref of an empty Optional<T>"),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Optional<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Optional").field(&self.value).finish()
    }
}

impl<T> Default for Optional<T> {
    fn default() -> Self {
        Optional::empty()
    }
}

/// Abort the process for a violated invariant.
///
/// Used for release-without-acquire, deref of an empty smart pointer, push of
/// a null node and similar bugs that the caller could not have recovered
/// from by checking a result code. Never returned as a value: the core has
/// no way to keep running once one of these invariants breaks.
#[cold]
#[inline(never)]
pub fn programmer_error(what: &str) -> ! {
    panic!("xcore: programmer error: {what}");
}

/// Library-wide startup hook.
///
/// User-mode hosts (POSIX or Windows) never need to call this: `Pool`, `Bus`,
/// `Signal` and friends are each independent, self-contained instances with
/// no shared global state, and come up lazily on first use. It exists so
/// that a kernel-mode host, which has no CRT to run static initializers for
/// it, has a single documented place to call into before using the library.
pub fn init() {}

/// The matching teardown hook for [`init`]. A no-op in user mode.
pub fn shutdown() {}
