//! Signal channels and the typed parse-event bus.
//!
//! The structural parser publishes a stream of [`ParseEvent`] values to an
//! [`EventBus`]; drivers register a [`ParseObserver`] and match on the
//! variants they care about. Everything downstream of the drivers (the line
//! pipeline, the drivers' own output channels) uses the generic
//! multi-subscriber [`Signal`] instead, which carries one payload type per
//! channel.
//!
//! Both hand out [`Subscription`] handles. A subscription disconnects when
//! dropped, so a driver that goes away takes its callbacks with it and can
//! never be invoked dangling. Dispatch is synchronous: publishing runs every
//! subscriber to completion, in subscription order, before returning.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

// ============================================================================
// SUBSCRIPTIONS
// ============================================================================

/// Handle for one registered subscriber.
///
/// Disconnecting is idempotent; dropping the handle disconnects. Channels
/// are held through weak references, so a subscription may safely outlive
/// the channel it came from.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Remove the subscriber from all future dispatches.
    pub fn disconnect(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("connected", &self.is_connected())
            .finish()
    }
}

// ============================================================================
// GENERIC SIGNAL CHANNEL
// ============================================================================

struct SlotList<T: ?Sized> {
    next_id: u64,
    entries: Vec<(u64, Rc<RefCell<dyn FnMut(&T)>>)>,
}

/// A named multi-subscriber channel carrying `&T` payloads.
///
/// Cloning a `Signal` clones the handle, not the subscriber list; a filter
/// can hand its output channel to a closure and keep using it itself.
pub struct Signal<T: ?Sized> {
    slots: Rc<RefCell<SlotList<T>>>,
}

impl<T: ?Sized> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Rc::clone(&self.slots),
        }
    }
}

impl<T: ?Sized + 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(SlotList {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a subscriber. Subscribers run in connection order on every
    /// emit until their subscription is disconnected or dropped.
    pub fn connect(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let id = {
            let mut slots = self.slots.borrow_mut();
            let id = slots.next_id;
            slots.next_id += 1;
            slots.entries.push((id, Rc::new(RefCell::new(callback))));
            id
        };
        let weak: Weak<RefCell<SlotList<T>>> = Rc::downgrade(&self.slots);
        Subscription::new(move || {
            if let Some(slots) = weak.upgrade() {
                slots.borrow_mut().entries.retain(|(slot_id, _)| *slot_id != id);
            }
        })
    }

    /// Run every connected subscriber to completion, in connection order.
    ///
    /// The subscriber list is snapshotted first, so a callback may connect
    /// or disconnect subscribers on this same signal without upsetting the
    /// dispatch in flight; changes take effect on the next emit.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Rc<RefCell<dyn FnMut(&T)>>> = self
            .slots
            .borrow()
            .entries
            .iter()
            .map(|(_, slot)| Rc::clone(slot))
            .collect();
        for slot in snapshot {
            (slot.borrow_mut())(value);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.slots.borrow().entries.len()
    }
}

// ============================================================================
// PARSE EVENTS
// ============================================================================

/// Access keyword as it appears in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    Public,
    Protected,
    #[default]
    Private,
}

/// One structural event from a parse, published in strict source order.
///
/// Payload strings borrow from the input being parsed; observers that need
/// to keep them copy at that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseEvent<'src> {
    /// An opening brace was consumed.
    ScopePush,
    /// A closing brace was consumed.
    ScopePop,
    /// One namespace segment. Compound declarations (`namespace a::b {`)
    /// publish one event per segment, all at the same depth, before the
    /// single scope-push for the brace.
    NamespacePush { name: &'src str, depth: u32 },
    /// An unscoped enumeration. The following scope holds its identifiers.
    EnumPush { name: &'src str, depth: u32 },
    /// A scoped (`enum class`) enumeration.
    EnumClassPush { name: &'src str, depth: u32 },
    /// One identifier inside the current enumeration.
    EnumIdentifier { enum_name: &'src str, name: &'src str },
    /// A class definition opened.
    ClassPush { name: &'src str, depth: u32 },
    /// A struct definition opened.
    StructPush { name: &'src str, depth: u32 },
    /// One parent from an inheritance clause. The access keyword is recorded
    /// when present but otherwise not interpreted.
    ClassParent { access: Option<Access>, name: &'src str },
    /// An access-modifier line inside a class body.
    AccessChange { access: Access },
    /// A data member of the current class.
    MemberFound {
        ty: &'src str,
        name: &'src str,
        is_const: bool,
        is_static: bool,
    },
    /// A method of the current class. `is_virtual` covers both the `virtual`
    /// keyword and a trailing `override`.
    MethodFound {
        ty: &'src str,
        name: &'src str,
        is_const: bool,
        is_static: bool,
        is_virtual: bool,
    },
    /// The inner text of a `[[ ... ]]` annotation.
    AnnotationFound { text: &'src str },
    /// The current class definition closed.
    ClassPop,
}

/// Receiver for the parser's event stream. One call per event.
pub trait ParseObserver {
    fn on_event(&mut self, event: &ParseEvent<'_>);
}

// ============================================================================
// EVENT BUS
// ============================================================================

struct BusInner {
    next_id: u64,
    observers: Vec<(u64, Rc<RefCell<dyn ParseObserver>>)>,
}

/// Registry of parse observers with stable dispatch order.
///
/// Replaces name-keyed channels with a single typed stream: observers match
/// on [`ParseEvent`] exhaustively instead of subscribing per event name.
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(BusInner {
                next_id: 0,
                observers: Vec::new(),
            })),
        }
    }

    /// Register an observer. The bus keeps it alive only while the returned
    /// subscription is connected.
    pub fn attach(&self, observer: Rc<RefCell<dyn ParseObserver>>) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.observers.push((id, observer));
            id
        };
        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().observers.retain(|(obs_id, _)| *obs_id != id);
            }
        })
    }

    /// Publish one event to every attached observer, in attachment order.
    pub fn publish(&self, event: &ParseEvent<'_>) {
        let snapshot: Vec<Rc<RefCell<dyn ParseObserver>>> = self
            .inner
            .borrow()
            .observers
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        for observer in snapshot {
            observer.borrow_mut().on_event(event);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }
}
