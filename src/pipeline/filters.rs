//! Filters that expand generator sentinels into code.
//!
//! A filter forwards every line it receives unless the line, stripped of
//! whitespace, is exactly its sentinel. In that case the sentinel line is
//! swallowed and the generated lines for the current class are emitted
//! instead. Class context comes from the mini-parser's class-push and
//! class-pop channels, which every filter re-exports so chains share it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::events::{Signal, Subscription};
use crate::model::{Catalog, ClassData};
use crate::pipeline::mini_parser::MiniParser;

const GET_SET_SENTINEL: &str = "[[genGetSetMethods]]";
const CEREAL_SENTINEL: &str = "[[genCerealLoadSave]]";

struct FilterCore {
    // Keyed by bare class name: the mini-parser cannot see namespaces.
    classes: HashMap<String, Rc<ClassData>>,
    current: Option<Rc<ClassData>>,
    sentinel: &'static str,
    expand: fn(&ClassData, &Signal<str>),
    out: Signal<str>,
    class_push: Signal<str>,
    class_pop: Signal<()>,
}

impl FilterCore {
    fn process(&mut self, line: &str) {
        let stripped: String = line.chars().filter(|c| !c.is_whitespace()).collect();
        if stripped != self.sentinel {
            self.out.emit(line);
            return;
        }
        match &self.current {
            Some(class) => (self.expand)(class, &self.out),
            None => {
                eprintln!("WARNING: {} encountered, but not in a class", self.sentinel);
                self.out.emit(line);
            }
        }
    }

    fn on_class_push(&mut self, name: &str) {
        self.current = self.classes.get(name).cloned();
        if self.current.is_none() {
            eprintln!("WARNING: class {name} was not found in class data");
        }
        self.class_push.emit(name);
    }

    fn on_class_pop(&mut self) {
        self.current = None;
        self.class_pop.emit(&());
    }
}

/// A sentinel-expanding line filter over a previously built catalog.
pub struct SentinelFilter {
    core: Rc<RefCell<FilterCore>>,
    subscriptions: Vec<Subscription>,
}

impl SentinelFilter {
    /// Expands `[[genGetSetMethods]]` into accessors for every member that
    /// requested them: per member in source order, the getter then the
    /// setter.
    pub fn get_set_methods(catalog: &Catalog) -> Self {
        Self::new(catalog, GET_SET_SENTINEL, expand_get_set)
    }

    /// Expands `[[genCerealLoadSave]]` into archive save/load functions
    /// covering every serializable member.
    pub fn cereal_load_save(catalog: &Catalog) -> Self {
        Self::new(catalog, CEREAL_SENTINEL, expand_cereal)
    }

    fn new(catalog: &Catalog, sentinel: &'static str, expand: fn(&ClassData, &Signal<str>)) -> Self {
        let mut classes = HashMap::new();
        for data in catalog.classes.values() {
            let previous = classes.insert(data.name.clone(), Rc::new(data.clone()));
            if previous.is_some() {
                eprintln!(
                    "WARNING: more than one class named {} in the catalog, keeping the last",
                    data.name
                );
            }
        }
        Self {
            core: Rc::new(RefCell::new(FilterCore {
                classes,
                current: None,
                sentinel,
                expand,
                out: Signal::new(),
                class_push: Signal::new(),
                class_pop: Signal::new(),
            })),
            subscriptions: Vec::new(),
        }
    }

    /// Rewritten lines.
    pub fn output(&self) -> Signal<str> {
        self.core.borrow().out.clone()
    }

    /// Re-exported class tracking for the next filter in the chain.
    pub fn class_push(&self) -> Signal<str> {
        self.core.borrow().class_push.clone()
    }

    pub fn class_pop(&self) -> Signal<()> {
        self.core.borrow().class_pop.clone()
    }

    /// Chain directly after the mini-parser.
    pub fn subscribe_to(&mut self, upstream: &MiniParser) {
        self.subscribe_to_channels(upstream.output(), upstream.class_push(), upstream.class_pop());
    }

    /// Chain after another filter.
    pub fn subscribe_to_filter(&mut self, upstream: &SentinelFilter) {
        self.subscribe_to_channels(
            &upstream.output(),
            &upstream.class_push(),
            &upstream.class_pop(),
        );
    }

    fn subscribe_to_channels(
        &mut self,
        lines: &Signal<str>,
        class_push: &Signal<str>,
        class_pop: &Signal<()>,
    ) {
        let core = Rc::clone(&self.core);
        self.subscriptions
            .push(lines.connect(move |line: &str| core.borrow_mut().process(line)));
        let core = Rc::clone(&self.core);
        self.subscriptions
            .push(class_push.connect(move |name: &str| core.borrow_mut().on_class_push(name)));
        let core = Rc::clone(&self.core);
        self.subscriptions
            .push(class_pop.connect(move |_| core.borrow_mut().on_class_pop()));
    }
}

fn expand_get_set(class: &ClassData, out: &Signal<str>) {
    for member in &class.members {
        if member.generate_getter {
            out.emit(&format!(
                "{} get{}() const {{ return {}; }}",
                member.ty, member.name, member.name
            ));
        }
        if member.generate_setter {
            out.emit(&format!(
                "void set{}(const {}& val) {{ {} = val; }}",
                member.name, member.ty, member.name
            ));
        }
    }
}

fn expand_cereal(class: &ClassData, out: &Signal<str>) {
    let included = |member: &&crate::model::MemberData| member.serializable || class.serializable;

    out.emit("template <typename Archive>");
    out.emit("void save(Archive& ar) const {");
    for member in class.members.iter().filter(included) {
        // make_nvp gives the field a readable tag in text archives.
        out.emit(&format!(
            "ar(cereal::make_nvp(\"{}\",{}));",
            member.name, member.name
        ));
    }
    out.emit("}");

    out.emit("template <typename Archive>");
    out.emit("void load(Archive& ar) {");
    for member in class.members.iter().filter(included) {
        // Reads bind by position, no tag needed.
        out.emit(&format!("ar({});", member.name));
    }
    out.emit("}");
}
