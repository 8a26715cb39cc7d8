// property.rs

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Handle returned by [`Property::subscribe`], used to unsubscribe later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Box<dyn FnMut(&T, &T) + Send>;
type Constraint<T> = Box<dyn Fn(T) -> T + Send + Sync>;

/// An observable single-value cell.
///
/// Listeners receive `(new, old)` whenever `set` or `reset` actually changes
/// the value. Listeners must not subscribe to the cell that is notifying them.
pub struct Property<T> {
    value: T,
    initial: T,
    constraint: Option<Constraint<T>>,
    listeners: Mutex<ListenerSet<T>>,
}

struct ListenerSet<T> {
    next_id: u64,
    entries: Vec<(ListenerId, Listener<T>)>,
}

impl<T> Property<T>
where
    T: Clone + PartialEq,
{
    /// Create a cell whose reset value is `initial`
    pub fn new(initial: T) -> Self {
        Property {
            value: initial.clone(),
            initial,
            constraint: None,
            listeners: Mutex::new(ListenerSet {
                next_id: 0,
                entries: Vec::new(),
            }),
        }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.value.clone()
    }

    /// Borrow the current value without cloning
    pub fn value(&self) -> &T {
        &self.value
    }

    /// The value restored by [`Property::reset`]
    pub fn initial_value(&self) -> &T {
        &self.initial
    }

    /// Set a new value, passing it through the constraint first.
    /// Returns true if the stored value changed.
    pub fn set(&mut self, value: T) -> bool {
        let value = match &self.constraint {
            Some(constrain) => constrain(value),
            None => value,
        };

        if value == self.value {
            return false;
        }

        let old = std::mem::replace(&mut self.value, value);
        self.notify(&old);
        true
    }

    /// Restore the initial value
    pub fn reset(&mut self) -> bool {
        let initial = self.initial.clone();
        self.set(initial)
    }

    /// Register a change listener, called with `(new, old)`
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut(&T, &T) + Send + 'static,
    {
        let mut set = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let id = ListenerId(set.next_id);
        set.next_id += 1;
        set.entries.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut set = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = set.entries.len();
        set.entries.retain(|(entry, _)| *entry != id);
        set.entries.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    fn notify(&self, old: &T) {
        let mut set = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        for (_, listener) in set.entries.iter_mut() {
            listener(&self.value, old);
        }
    }
}

impl<T> Property<T>
where
    T: Clone + PartialEq + PartialOrd + Send + Sync + 'static,
{
    /// Create a cell that clamps every written value into `[min, max]`
    pub fn with_range(initial: T, min: T, max: T) -> Self {
        debug_assert!(min <= max, "property range is inverted");
        let mut property = Property::new(clamp(initial, &min, &max));
        property.constraint = Some(Box::new(move |value| clamp(value, &min, &max)));
        property
    }
}

fn clamp<T: PartialOrd>(value: T, min: &T, max: &T) -> T
where
    T: Clone,
{
    if value < *min {
        min.clone()
    } else if value > *max {
        max.clone()
    } else {
        value
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.value)
            .field("initial", &self.initial)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_set_notifies_with_new_and_old() {
        let mut gravity = Property::new(9.81_f32);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        gravity.subscribe(move |new, old| sink.lock().unwrap().push((*new, *old)));

        assert!(gravity.set(1.62));
        assert_eq!(seen.lock().unwrap().as_slice(), &[(1.62, 9.81)]);
    }

    #[test]
    fn test_unchanged_value_is_silent() {
        let mut playing = Property::new(true);
        let count = Arc::new(Mutex::new(0));

        let sink = Arc::clone(&count);
        playing.subscribe(move |_, _| *sink.lock().unwrap() += 1);

        assert!(!playing.set(true));
        assert_eq!(*count.lock().unwrap(), 0);
    }

    #[test]
    fn test_range_clamps_both_ends() {
        let mut gravity = Property::with_range(9.81_f32, 0.0, 30.0);

        gravity.set(45.0);
        assert_eq!(gravity.get(), 30.0);

        gravity.set(-3.0);
        assert_eq!(gravity.get(), 0.0);
    }

    #[test]
    fn test_reset_restores_initial() {
        let mut damping = Property::new(0.0_f32);
        damping.set(0.4);
        assert!(damping.reset());
        assert_eq!(damping.get(), 0.0);
        assert!(!damping.reset());
    }

    #[test]
    fn test_unsubscribe() {
        let mut length = Property::new(0.5_f32);
        let count = Arc::new(Mutex::new(0));

        let sink = Arc::clone(&count);
        let id = length.subscribe(move |_, _| *sink.lock().unwrap() += 1);
        length.set(0.3);

        assert!(length.unsubscribe(id));
        assert!(!length.unsubscribe(id));
        length.set(0.2);

        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(length.listener_count(), 0);
    }
}
