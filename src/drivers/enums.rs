//! Enum accumulation driver.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::drivers::NamespaceTracker;
use crate::events::{ParseEvent, ParseObserver, Signal, Subscription};
use crate::model::EnumData;
use crate::syntax::SourceParser;

/// Collects one [`EnumData`] per enumeration seen by a parser.
///
/// A single "current" value is built up while an enumeration is open and
/// committed on the scope-pop that closes it: the fully qualified key is the
/// enclosing namespaces plus the enum's own name, the `enum_available`
/// signal fires, and the snapshot lands in the driver's map. The map
/// survives re-attachment so one driver can accumulate several files.
pub struct EnumDriver {
    state: Rc<RefCell<EnumState>>,
    subscription: Option<Subscription>,
}

#[derive(Default)]
struct EnumState {
    namespaces: NamespaceTracker,
    current: EnumData,
    current_file: String,
    enums: BTreeMap<String, EnumData>,
    available: Signal<(String, EnumData)>,
}

impl Default for EnumDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl EnumDriver {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(EnumState::default())),
            subscription: None,
        }
    }

    /// Register with a parser. Per-parse transients reset; the accumulated
    /// map is kept. Any previous registration is disconnected first.
    pub fn attach(&mut self, parser: &SourceParser) {
        self.detach();
        {
            let mut state = self.state.borrow_mut();
            state.namespaces.clear();
            state.current = EnumData::default();
        }
        self.subscription = Some(parser.attach(self.state.clone()));
    }

    /// Stop listening. Idempotent; dropping the driver does the same.
    pub fn detach(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.disconnect();
        }
    }

    /// Filename stamped into `defined_in` on every commit.
    pub fn set_current_file(&self, path: &str) {
        self.state.borrow_mut().current_file = path.to_string();
    }

    /// Fires `(fully qualified name, snapshot)` on every committed enum.
    pub fn enum_available(&self) -> Signal<(String, EnumData)> {
        self.state.borrow().available.clone()
    }

    /// Snapshot of everything committed so far.
    pub fn enums(&self) -> BTreeMap<String, EnumData> {
        self.state.borrow().enums.clone()
    }

    /// Drain the accumulated map, leaving the driver empty.
    pub fn take_enums(&self) -> BTreeMap<String, EnumData> {
        std::mem::take(&mut self.state.borrow_mut().enums)
    }

    /// Reset everything, including the accumulated map.
    pub fn clear(&mut self) {
        self.detach();
        let mut state = self.state.borrow_mut();
        state.namespaces.clear();
        state.current = EnumData::default();
        state.enums.clear();
        state.current_file.clear();
    }
}

impl EnumState {
    fn open(&mut self, name: &str, is_class: bool) {
        self.current.namespaces = self.namespaces.names();
        self.current.name = name.to_string();
        self.current.is_class_enum = is_class;
    }

    fn commit_if_open(&mut self) {
        if self.current.name.is_empty() {
            return;
        }
        self.current.defined_in = self.current_file.clone();
        let key = self.current.qualified_name();
        let data = std::mem::take(&mut self.current);
        if self.enums.contains_key(&key) {
            eprintln!("WARNING: enum {key} defined more than once, replacing the earlier entry");
        }
        self.available.emit(&(key.clone(), data.clone()));
        self.enums.insert(key, data);
    }
}

impl ParseObserver for EnumState {
    fn on_event(&mut self, event: &ParseEvent<'_>) {
        self.namespaces.observe(event);
        match event {
            ParseEvent::EnumPush { name, .. } => self.open(name, false),
            ParseEvent::EnumClassPush { name, .. } => self.open(name, true),
            ParseEvent::EnumIdentifier { name, .. } => {
                self.current.identifiers.push((*name).to_string());
            }
            // Every scope-pop is a potential enum end; commit only when an
            // enumeration is actually open.
            ParseEvent::ScopePop => self.commit_if_open(),
            _ => {}
        }
    }
}
