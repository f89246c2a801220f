//! Class accumulation driver.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::drivers::NamespaceTracker;
use crate::events::{Access, ParseEvent, ParseObserver, Signal, Subscription};
use crate::model::{ClassData, MemberData, MethodData};
use crate::syntax::SourceParser;

/// Collects one [`ClassData`] per class or struct seen by a parser.
///
/// Tracks the in-class access level and the three annotation-driven request
/// flags between members; commits the current class on class-pop through the
/// `class_available` signal and the driver's map.
pub struct ClassDriver {
    state: Rc<RefCell<ClassState>>,
    subscription: Option<Subscription>,
}

#[derive(Default)]
struct ClassState {
    namespaces: NamespaceTracker,
    current: ClassData,
    current_file: String,
    in_class: bool,
    access: Access,
    // Set by annotations since the previous member or method, attached to
    // the next one, then cleared.
    serializable: bool,
    generate_getter: bool,
    generate_setter: bool,
    classes: BTreeMap<String, ClassData>,
    available: Signal<(String, ClassData)>,
}

impl Default for ClassDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassDriver {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ClassState::default())),
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
            state.current = ClassData::default();
            state.in_class = false;
            state.access = Access::Private;
            state.serializable = false;
            state.generate_getter = false;
            state.generate_setter = false;
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

    /// Fires `(fully qualified name, snapshot)` on every committed class.
    pub fn class_available(&self) -> Signal<(String, ClassData)> {
        self.state.borrow().available.clone()
    }

    /// Snapshot of everything committed so far.
    pub fn classes(&self) -> BTreeMap<String, ClassData> {
        self.state.borrow().classes.clone()
    }

    /// Drain the accumulated map, leaving the driver empty.
    pub fn take_classes(&self) -> BTreeMap<String, ClassData> {
        std::mem::take(&mut self.state.borrow_mut().classes)
    }

    /// Reset everything, including the accumulated map.
    pub fn clear(&mut self) {
        self.detach();
        let mut state = self.state.borrow_mut();
        // Keep the signal so existing subscribers stay connected.
        let available = state.available.clone();
        *state = ClassState {
            available,
            ..ClassState::default()
        };
    }
}

impl ClassState {
    fn open(&mut self, name: &str, is_struct: bool) {
        // The current value may already carry a class-level serializable
        // flag from an annotation seen just before the keyword; everything
        // else starts fresh here.
        self.current.namespaces = self.namespaces.names();
        self.current.name = name.to_string();
        self.current.is_struct = is_struct;
        self.access = if is_struct {
            Access::Public
        } else {
            Access::Private
        };
        self.in_class = true;
    }

    fn push_member(&mut self, ty: &str, name: &str, is_const: bool, is_static: bool) {
        self.current.members.push(MemberData {
            ty: ty.to_string(),
            name: name.to_string(),
            is_public: self.access == Access::Public,
            is_protected: self.access == Access::Protected,
            is_const,
            is_static,
            serializable: self.serializable,
            generate_getter: self.generate_getter,
            generate_setter: self.generate_setter,
        });
        self.reset_request_flags();
    }

    fn push_method(
        &mut self,
        ty: &str,
        name: &str,
        is_const: bool,
        is_static: bool,
        is_virtual: bool,
    ) {
        self.current.methods.push(MethodData {
            return_type: ty.to_string(),
            name: name.to_string(),
            is_public: self.access == Access::Public,
            is_protected: self.access == Access::Protected,
            is_virtual,
            is_const,
            is_static,
        });
        self.reset_request_flags();
    }

    /// Substring matching on the annotation text. A class-level `cereal`
    /// (seen outside any class body) marks the upcoming class; in-class
    /// annotations request per-member treatment for the next member.
    fn apply_annotation(&mut self, text: &str) {
        if text.contains("cereal") {
            if self.in_class {
                self.serializable = true;
            } else {
                self.current.serializable = true;
            }
        }
        if self.in_class && text.contains("get") {
            self.generate_getter = true;
        }
        if self.in_class && text.contains("set") {
            self.generate_setter = true;
        }
    }

    fn commit(&mut self) {
        self.current.defined_in = self.current_file.clone();
        let key = self.current.qualified_name();
        let data = std::mem::take(&mut self.current);
        if self.classes.contains_key(&key) {
            eprintln!("WARNING: class {key} defined more than once, replacing the earlier entry");
        }
        self.available.emit(&(key.clone(), data.clone()));
        self.classes.insert(key, data);
        self.in_class = false;
        self.access = Access::Private;
        self.reset_request_flags();
    }

    fn reset_request_flags(&mut self) {
        self.serializable = false;
        self.generate_getter = false;
        self.generate_setter = false;
    }
}

impl ParseObserver for ClassState {
    fn on_event(&mut self, event: &ParseEvent<'_>) {
        self.namespaces.observe(event);
        match event {
            ParseEvent::ClassPush { name, .. } => self.open(name, false),
            ParseEvent::StructPush { name, .. } => self.open(name, true),
            ParseEvent::ClassParent { name, .. } => {
                // Access qualifiers on parents are recorded by the parser
                // but not kept here.
                self.current.parents.push((*name).to_string());
            }
            ParseEvent::AccessChange { access } => self.access = *access,
            ParseEvent::MemberFound {
                ty,
                name,
                is_const,
                is_static,
            } => self.push_member(ty, name, *is_const, *is_static),
            ParseEvent::MethodFound {
                ty,
                name,
                is_const,
                is_static,
                is_virtual,
            } => self.push_method(ty, name, *is_const, *is_static, *is_virtual),
            ParseEvent::AnnotationFound { text } => self.apply_annotation(text),
            ParseEvent::ClassPop => self.commit(),
            _ => {}
        }
    }
}
