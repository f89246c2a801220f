//! Lightweight class tracker for line pipelines.
//!
//! Some filters need to know which class they are inside while rewriting
//! lines, without paying for the full structural parser. This tracker scans
//! each line for `class IDENT` / `struct IDENT` and `};`, publishes
//! class-push and class-pop on its side channels, and forwards the original
//! line untouched.
//!
//! It is deliberately unaware of scope depth: any `};` counts as a class
//! end. Sources that close other scopes with `};` on their own line will
//! confuse it. String and character literals, comments, and annotations on
//! the line are skipped before matching.

use pest::Parser;
use pest_derive::Parser;

use crate::events::{Signal, Subscription};

#[derive(Parser)]
#[grammar = "pipeline/line.pest"]
struct LineScanner;

/// Line filter that reports class boundaries as it forwards lines.
///
/// Side-channel signals fire before the line itself is forwarded, so a
/// downstream filter has up-to-date class context when the line arrives.
#[derive(Default)]
pub struct MiniParser {
    out: Signal<str>,
    class_push: Signal<str>,
    class_pop: Signal<()>,
    subscriptions: Vec<Subscription>,
}

impl MiniParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forwarded lines.
    pub fn output(&self) -> &Signal<str> {
        &self.out
    }

    /// Fires with the class name when a line opens a class or struct.
    pub fn class_push(&self) -> &Signal<str> {
        &self.class_push
    }

    /// Fires when a line closes a class.
    pub fn class_pop(&self) -> &Signal<()> {
        &self.class_pop
    }

    /// Chain this tracker after an upstream line emitter.
    pub fn subscribe_to(&mut self, upstream: &Signal<str>) {
        let out = self.out.clone();
        let class_push = self.class_push.clone();
        let class_pop = self.class_pop.clone();
        self.subscriptions.push(upstream.connect(move |line: &str| {
            scan(line, &class_push, &class_pop);
            out.emit(line);
        }));
    }

    /// Push one line through directly, without an upstream.
    pub fn process(&self, line: &str) {
        scan(line, &self.class_push, &self.class_pop);
        self.out.emit(line);
    }
}

fn scan(line: &str, class_push: &Signal<str>, class_pop: &Signal<()>) {
    let Ok(mut pairs) = LineScanner::parse(Rule::line, line) else {
        // The scan grammar is total over one line; reaching this means the
        // line had embedded newlines, which the reader never produces.
        return;
    };
    let Some(parsed) = pairs.next() else { return };
    for fragment in parsed.into_inner() {
        match fragment.as_rule() {
            Rule::class_intro => {
                if let Some(name) = fragment
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::identifier)
                {
                    class_push.emit(name.as_str());
                }
            }
            Rule::class_end => class_pop.emit(&()),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scan_line(line: &str) -> (Vec<String>, u32) {
        let parser = MiniParser::new();
        let pushes = Rc::new(RefCell::new(Vec::new()));
        let pops = Rc::new(RefCell::new(0u32));
        let push_log = Rc::clone(&pushes);
        let _p = parser
            .class_push()
            .connect(move |name: &str| push_log.borrow_mut().push(name.to_string()));
        let pop_log = Rc::clone(&pops);
        let _q = parser.class_pop().connect(move |_| *pop_log.borrow_mut() += 1);
        parser.process(line);
        let result = (pushes.borrow().clone(), *pops.borrow());
        result
    }

    #[test]
    fn detects_class_and_struct_introductions() {
        assert_eq!(scan_line("class Point {"), (vec!["Point".to_string()], 0));
        assert_eq!(scan_line("struct Blob {"), (vec!["Blob".to_string()], 0));
    }

    #[test]
    fn detects_class_end_anywhere_on_the_line() {
        assert_eq!(scan_line("};"), (vec![], 1));
        assert_eq!(scan_line("  int x; };"), (vec![], 1));
    }

    #[test]
    fn keywords_inside_identifiers_do_not_match() {
        assert_eq!(scan_line("int subclass Foo;"), (vec![], 0));
        assert_eq!(scan_line("classless code"), (vec![], 0));
    }

    #[test]
    fn literals_comments_and_annotations_are_skipped() {
        assert_eq!(scan_line("auto s = \"class Fake {\";"), (vec![], 0));
        assert_eq!(scan_line("// class Commented"), (vec![], 0));
        assert_eq!(scan_line("auto t = \"};\";"), (vec![], 0));
        assert_eq!(scan_line("[[class Hidden]]"), (vec![], 0));
    }

    #[test]
    fn forwards_every_line_verbatim() {
        let mut parser = MiniParser::new();
        let upstream: Signal<str> = Signal::new();
        parser.subscribe_to(&upstream);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let _s = parser
            .output()
            .connect(move |line: &str| log.borrow_mut().push(line.to_string()));

        upstream.emit("class Point {");
        upstream.emit("};");
        assert_eq!(*seen.borrow(), vec!["class Point {", "};"]);
    }
}
