//! Structural parser for the input dialect.
//!
//! Purely syntactic: the grammar recognizes the subset of the language the
//! scanner cares about, and this module walks the parse tree publishing one
//! [`ParseEvent`] per structural fact, in strict source order. All
//! accumulation happens in observers; the parser keeps no state across a
//! parse call beyond the walk context threaded through the recursion.

use std::cell::RefCell;
use std::rc::Rc;

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::events::{Access, EventBus, ParseEvent, ParseObserver, Subscription};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct DialectParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// What a parse run left behind. The parser is total: failure is reported
/// here, never as an error value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOutcome<'src> {
    /// True when the whole input was consumed.
    pub success: bool,
    /// Unconsumed suffix, starting at the first construct the grammar could
    /// not interpret. Empty on success.
    pub remainder: &'src str,
}

/// Event-producing parser. Observers attach before [`parse`](Self::parse)
/// and see every event of every subsequent run, in source order.
#[derive(Default)]
pub struct SourceParser {
    bus: EventBus,
}

impl SourceParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bus this parser publishes to.
    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    /// Register an observer for subsequent parse runs.
    pub fn attach(&self, observer: Rc<RefCell<dyn ParseObserver>>) -> Subscription {
        self.bus.attach(observer)
    }

    /// Consume `input`, publishing events for everything recognized.
    ///
    /// On failure, events for all constructs before the failure point have
    /// already been published; the failing construct publishes nothing, so
    /// observers never see a half-open enum or class.
    pub fn parse<'src>(&self, input: &'src str) -> ParseOutcome<'src> {
        match DialectParser::parse(Rule::program, input) {
            Ok(mut pairs) => {
                let program = pairs.next().unwrap(); // grammar guarantees a program pair
                let mut ctx = WalkContext::default();
                for item in program.into_inner() {
                    if item.as_rule() != Rule::EOI {
                        self.walk_item(item, &mut ctx);
                    }
                }
                ParseOutcome {
                    success: true,
                    remainder: "",
                }
            }
            Err(_) => {
                // Re-run without the end-of-input anchor to find out how far
                // the grammar got. This variant cannot fail.
                let mut pairs = DialectParser::parse(Rule::program_prefix, input)
                    .unwrap(); // the prefix grammar is total
                let program = pairs.next().unwrap(); // same guarantee as above
                let consumed = program.as_span().end();
                let mut ctx = WalkContext::default();
                for item in program.into_inner() {
                    self.walk_item(item, &mut ctx);
                }
                ParseOutcome {
                    success: false,
                    remainder: &input[consumed..],
                }
            }
        }
    }
}

// ============================================================================
// TREE WALK
// ============================================================================

/// Transient parse state, passed through the recursion rather than stored on
/// the parser so nothing leaks across parse calls.
#[derive(Default)]
struct WalkContext {
    depth: u32,
}

impl SourceParser {
    fn scope_push(&self, ctx: &mut WalkContext) {
        self.bus.publish(&ParseEvent::ScopePush);
        ctx.depth += 1;
    }

    fn scope_pop(&self, ctx: &mut WalkContext) {
        self.bus.publish(&ParseEvent::ScopePop);
        ctx.depth = ctx.depth.saturating_sub(1);
    }

    fn walk_item(&self, pair: Pair<'_, Rule>, ctx: &mut WalkContext) {
        match pair.as_rule() {
            Rule::namespace_def => self.walk_namespace(pair, ctx),
            Rule::enum_def => self.walk_enum(pair, ctx),
            Rule::class_def => self.walk_class(pair, ctx),
            Rule::annotation => self.publish_annotation(pair),
            Rule::stray_scope => self.walk_stray_scope(pair, ctx),
            // Templated classes and using declarations are consumed whole
            // without events.
            Rule::template_decl | Rule::using_decl => {}
            _ => {}
        }
    }

    fn walk_namespace(&self, pair: Pair<'_, Rule>, ctx: &mut WalkContext) {
        let mut opened = false;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::kw_namespace => {}
                // All identifiers at this level are namespace segments; the
                // body items are full rules of their own.
                Rule::identifier => self.bus.publish(&ParseEvent::NamespacePush {
                    name: inner.as_str(),
                    depth: ctx.depth,
                }),
                _ => {
                    if !opened {
                        self.scope_push(ctx);
                        opened = true;
                    }
                    self.walk_item(inner, ctx);
                }
            }
        }
        if !opened {
            self.scope_push(ctx);
        }
        self.scope_pop(ctx);
    }

    fn walk_enum(&self, pair: Pair<'_, Rule>, ctx: &mut WalkContext) {
        let mut is_class = false;
        let mut name: Option<&str> = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::kw_enum => {}
                Rule::kw_class => is_class = true,
                Rule::identifier if name.is_none() => {
                    name = Some(inner.as_str());
                    let event = if is_class {
                        ParseEvent::EnumClassPush {
                            name: inner.as_str(),
                            depth: ctx.depth,
                        }
                    } else {
                        ParseEvent::EnumPush {
                            name: inner.as_str(),
                            depth: ctx.depth,
                        }
                    };
                    self.bus.publish(&event);
                    self.scope_push(ctx);
                }
                Rule::enum_entry => {
                    // Anonymous enums are consumed without any events.
                    let Some(enum_name) = name else { continue };
                    if let Some(ident) = inner
                        .into_inner()
                        .find(|p| p.as_rule() == Rule::identifier)
                    {
                        self.bus.publish(&ParseEvent::EnumIdentifier {
                            enum_name,
                            name: ident.as_str(),
                        });
                    }
                }
                _ => {}
            }
        }
        if name.is_some() {
            self.scope_pop(ctx);
        }
    }

    fn walk_class(&self, pair: Pair<'_, Rule>, ctx: &mut WalkContext) {
        let mut is_struct = false;
        let mut pushed = false;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::kw_class => {}
                Rule::kw_struct => is_struct = true,
                // Annotations before the keyword belong to the class itself
                // and are published ahead of the push event.
                Rule::annotation if !pushed => self.publish_annotation(inner),
                Rule::identifier if !pushed => {
                    pushed = true;
                    let event = if is_struct {
                        ParseEvent::StructPush {
                            name: inner.as_str(),
                            depth: ctx.depth,
                        }
                    } else {
                        ParseEvent::ClassPush {
                            name: inner.as_str(),
                            depth: ctx.depth,
                        }
                    };
                    self.bus.publish(&event);
                }
                Rule::inheritance => self.walk_parents(inner),
                _ => self.walk_class_item(inner),
            }
        }
        self.bus.publish(&ParseEvent::ClassPop);
    }

    fn walk_parents(&self, pair: Pair<'_, Rule>) {
        for parent in pair.into_inner() {
            let mut access = None;
            let mut name = "";
            for inner in parent.into_inner() {
                match inner.as_rule() {
                    Rule::kw_public => access = Some(Access::Public),
                    Rule::kw_protected => access = Some(Access::Protected),
                    Rule::kw_private => access = Some(Access::Private),
                    Rule::type_name => name = inner.as_str(),
                    _ => {}
                }
            }
            self.bus.publish(&ParseEvent::ClassParent { access, name });
        }
    }

    fn walk_class_item(&self, pair: Pair<'_, Rule>) {
        match pair.as_rule() {
            Rule::annotation => self.publish_annotation(pair),
            Rule::access_label => {
                let access = match pair.into_inner().next().map(|kw| kw.as_rule()) {
                    Some(Rule::kw_public) => Access::Public,
                    Some(Rule::kw_protected) => Access::Protected,
                    _ => Access::Private,
                };
                self.bus.publish(&ParseEvent::AccessChange { access });
            }
            Rule::method_decl => self.walk_method(pair),
            Rule::member_decl => self.walk_member(pair),
            // Constructors, destructors, and template introducers are
            // recognized only so they can be skipped.
            Rule::ctor_dtor | Rule::member_template | Rule::using_decl => {}
            _ => {}
        }
    }

    fn walk_method(&self, pair: Pair<'_, Rule>) {
        let mut is_const = false;
        let mut is_static = false;
        let mut is_virtual = false;
        let mut ty = "";
        let mut name = "";
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::qualifier => match inner.into_inner().next().map(|kw| kw.as_rule()) {
                    Some(Rule::kw_const) => is_const = true,
                    Some(Rule::kw_static) => is_static = true,
                    Some(Rule::kw_virtual) => is_virtual = true,
                    _ => {}
                },
                Rule::type_name => ty = inner.as_str(),
                Rule::identifier => name = inner.as_str(),
                Rule::kw_override => is_virtual = true,
                Rule::kw_const => is_const = true,
                _ => {}
            }
        }
        self.bus.publish(&ParseEvent::MethodFound {
            ty,
            name,
            is_const,
            is_static,
            is_virtual,
        });
    }

    fn walk_member(&self, pair: Pair<'_, Rule>) {
        let mut is_const = false;
        let mut is_static = false;
        let mut ty = "";
        let mut name = "";
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::qualifier => match inner.into_inner().next().map(|kw| kw.as_rule()) {
                    Some(Rule::kw_const) => is_const = true,
                    Some(Rule::kw_static) => is_static = true,
                    _ => {}
                },
                Rule::type_name => ty = inner.as_str(),
                Rule::identifier => name = inner.as_str(),
                _ => {}
            }
        }
        self.bus.publish(&ParseEvent::MemberFound {
            ty,
            name,
            is_const,
            is_static,
        });
    }

    fn walk_stray_scope(&self, pair: Pair<'_, Rule>, ctx: &mut WalkContext) {
        self.scope_push(ctx);
        for inner in pair.into_inner() {
            self.walk_item(inner, ctx);
        }
        self.scope_pop(ctx);
    }

    fn publish_annotation(&self, pair: Pair<'_, Rule>) {
        if let Some(text) = pair
            .into_inner()
            .find(|p| p.as_rule() == Rule::annotation_text)
        {
            self.bus.publish(&ParseEvent::AnnotationFound {
                text: text.as_str(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ParseObserver for Recorder {
        fn on_event(&mut self, event: &ParseEvent<'_>) {
            self.events.push(format!("{event:?}"));
        }
    }

    fn record(input: &str) -> (ParseOutcome<'_>, Vec<String>) {
        let parser = SourceParser::new();
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let _sub = parser.attach(recorder.clone());
        let outcome = parser.parse(input);
        let events = recorder.borrow().events.clone();
        (outcome, events)
    }

    #[test]
    fn empty_input_parses_clean() {
        let (outcome, events) = record("");
        assert!(outcome.success);
        assert!(events.is_empty());
    }

    #[test]
    fn directives_and_comments_produce_no_events() {
        let (outcome, events) = record(
            "#pragma once\n#include <string>\n#include \"a/b.h\"\n// line\n/* block */\n",
        );
        assert!(outcome.success);
        assert!(events.is_empty());
    }

    #[test]
    fn unrecognized_input_returns_the_leftover() {
        let (outcome, events) = record("enum Colors { red };\n???");
        assert!(!outcome.success);
        assert!(outcome.remainder.contains("???"));
        // Events up to the failure point were still published.
        assert!(events.iter().any(|e| e.contains("EnumPush")));
    }

    #[test]
    fn stray_braces_emit_scope_events_only() {
        let (outcome, events) = record("{ { } }");
        assert!(outcome.success);
        assert_eq!(events.len(), 4);
        assert!(events[0].contains("ScopePush"));
        assert!(events[3].contains("ScopePop"));
    }
}
