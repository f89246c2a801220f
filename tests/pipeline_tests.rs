// Line pipeline tests: mini-parser tracking, sentinel expansion, and the
// full reader-to-writer chain.

use std::cell::RefCell;
use std::io::Write as _;
use std::rc::Rc;

use headerforge::drivers::ClassDriver;
use headerforge::events::Signal;
use headerforge::model::Catalog;
use headerforge::pipeline::{LineReader, LineWriter, MiniParser, SentinelFilter};
use headerforge::syntax::SourceParser;

/// Build a catalog the same way the index command does: by parsing.
fn catalog_from(source: &str) -> Catalog {
    let parser = SourceParser::new();
    let mut classes = ClassDriver::new();
    classes.attach(&parser);
    assert!(parser.parse(source).success);
    Catalog {
        classes: classes.take_classes(),
        ..Catalog::default()
    }
}

fn collect(signal: &Signal<str>) -> (Rc<RefCell<Vec<String>>>, headerforge::events::Subscription) {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&lines);
    let sub = signal.connect(move |line: &str| log.borrow_mut().push(line.to_string()));
    (lines, sub)
}

fn run_chain(filter: SentinelFilter, input: &[&str]) -> Vec<String> {
    let mut mini = MiniParser::new();
    let source: Signal<str> = Signal::new();
    mini.subscribe_to(&source);
    let mut filter = filter;
    filter.subscribe_to(&mini);
    let (lines, _sub) = collect(&filter.output());
    for line in input {
        source.emit(line);
    }
    let result = lines.borrow().clone();
    result
}

#[test]
fn get_set_expansion_replaces_the_sentinel() {
    let catalog = catalog_from(
        "class Point { public: [[get,set]] int x; [[get,set]] int y; };",
    );
    let output = run_chain(
        SentinelFilter::get_set_methods(&catalog),
        &["class Point {", "[[genGetSetMethods]]", "};"],
    );
    assert_eq!(
        output,
        vec![
            "class Point {",
            "int getx() const { return x; }",
            "void setx(const int& val) { x = val; }",
            "int gety() const { return y; }",
            "void sety(const int& val) { y = val; }",
            "};",
        ]
    );
}

#[test]
fn sentinel_matches_with_surrounding_whitespace() {
    let catalog = catalog_from("class P { public: [[get]] int x; };");
    let output = run_chain(
        SentinelFilter::get_set_methods(&catalog),
        &["class P {", "    [[genGetSetMethods]]  ", "};"],
    );
    assert_eq!(
        output,
        vec!["class P {", "int getx() const { return x; }", "};"]
    );
}

#[test]
fn members_without_requests_expand_to_nothing() {
    let catalog = catalog_from("class P { public: int plain; [[get]] int tracked; };");
    let output = run_chain(
        SentinelFilter::get_set_methods(&catalog),
        &["class P {", "[[genGetSetMethods]]", "};"],
    );
    assert_eq!(
        output,
        vec![
            "class P {",
            "int gettracked() const { return tracked; }",
            "};"
        ]
    );
}

#[test]
fn sentinel_outside_any_class_is_forwarded() {
    let catalog = catalog_from("class P { public: [[get]] int x; };");
    let output = run_chain(
        SentinelFilter::get_set_methods(&catalog),
        &["[[genGetSetMethods]]"],
    );
    assert_eq!(output, vec!["[[genGetSetMethods]]"]);
}

#[test]
fn unknown_class_clears_the_context() {
    let catalog = catalog_from("class Known { public: [[get]] int x; };");
    let output = run_chain(
        SentinelFilter::get_set_methods(&catalog),
        &["class Stranger {", "[[genGetSetMethods]]", "};"],
    );
    // No class data, so the sentinel passes through untouched.
    assert_eq!(
        output,
        vec!["class Stranger {", "[[genGetSetMethods]]", "};"]
    );
}

#[test]
fn context_ends_at_the_closing_brace() {
    let catalog = catalog_from("class P { public: [[get]] int x; };");
    let output = run_chain(
        SentinelFilter::get_set_methods(&catalog),
        &["class P {", "};", "[[genGetSetMethods]]"],
    );
    assert_eq!(output, vec!["class P {", "};", "[[genGetSetMethods]]"]);
}

#[test]
fn cereal_expansion_covers_tagged_members_only() {
    let catalog = catalog_from(
        "class P { public: [[cereal]] int x; int skipped; [[cereal]] int y; };",
    );
    let output = run_chain(
        SentinelFilter::cereal_load_save(&catalog),
        &["class P {", "[[genCerealLoadSave]]", "};"],
    );
    assert_eq!(
        output,
        vec![
            "class P {",
            "template <typename Archive>",
            "void save(Archive& ar) const {",
            "ar(cereal::make_nvp(\"x\",x));",
            "ar(cereal::make_nvp(\"y\",y));",
            "}",
            "template <typename Archive>",
            "void load(Archive& ar) {",
            "ar(x);",
            "ar(y);",
            "}",
            "};",
        ]
    );
}

#[test]
fn class_level_cereal_includes_every_member() {
    let catalog = catalog_from("[[cereal]] class P { public: int x; int y; };");
    let output = run_chain(
        SentinelFilter::cereal_load_save(&catalog),
        &["class P {", "[[genCerealLoadSave]]", "};"],
    );
    assert!(output.contains(&"ar(cereal::make_nvp(\"x\",x));".to_string()));
    assert!(output.contains(&"ar(cereal::make_nvp(\"y\",y));".to_string()));
}

#[test]
fn filters_chain_and_share_class_tracking() {
    let catalog = catalog_from(
        "[[cereal]] class P { public: [[get,set]] int x; };",
    );
    let mut mini = MiniParser::new();
    let source: Signal<str> = Signal::new();
    mini.subscribe_to(&source);
    let mut get_set = SentinelFilter::get_set_methods(&catalog);
    get_set.subscribe_to(&mini);
    let mut cereal = SentinelFilter::cereal_load_save(&catalog);
    cereal.subscribe_to_filter(&get_set);
    let (lines, _sub) = collect(&cereal.output());

    for line in [
        "class P {",
        "[[genGetSetMethods]]",
        "[[genCerealLoadSave]]",
        "};",
    ] {
        source.emit(line);
    }

    let output = lines.borrow();
    assert!(output.contains(&"int getx() const { return x; }".to_string()));
    assert!(output.contains(&"ar(cereal::make_nvp(\"x\",x));".to_string()));
    assert_eq!(output.first().map(String::as_str), Some("class P {"));
    assert_eq!(output.last().map(String::as_str), Some("};"));
}

#[test]
fn reader_and_writer_move_whole_files_through_a_chain() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("objects.cpp");
    let output_path = dir.path().join("objects_expanded.cpp");
    let mut input = std::fs::File::create(&input_path).unwrap();
    writeln!(input, "#include <string>").unwrap();
    writeln!(input, "class Point {{").unwrap();
    writeln!(input, "public:").unwrap();
    writeln!(input, "  [[genGetSetMethods]]").unwrap();
    writeln!(input, "}};").unwrap();
    drop(input);

    let catalog = catalog_from("class Point { public: [[get,set]] int x; };");

    let reader = LineReader::new(&input_path);
    let mut mini = MiniParser::new();
    mini.subscribe_to(reader.output());
    let mut filter = SentinelFilter::get_set_methods(&catalog);
    filter.subscribe_to(&mini);
    let mut writer = LineWriter::create(&output_path).unwrap();
    writer.subscribe_to(&filter.output());

    reader.run().unwrap();
    writer.finish().unwrap();

    let written = std::fs::read_to_string(&output_path).unwrap();
    assert_eq!(
        written,
        "#include <string>\nclass Point {\npublic:\nint getx() const { return x; }\nvoid setx(const int& val) { x = val; }\n};\n"
    );
}
