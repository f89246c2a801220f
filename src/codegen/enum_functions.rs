//! Renders string-conversion functions for discovered enums.
//!
//! For every enum in the catalog the header declares, and the source
//! defines, a `to_string` overload and a stream-output operator. Both
//! switch over the identifier set; values outside it produce the literal
//! text `UNKNOWN VALUE`.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::model::EnumData;

const BANNER: &str = "/* This is generated code. Do not edit. Unless you really want to. */";

/// Header file with declarations for every enum, including the scanned
/// source so the enum types themselves are in scope.
pub fn render_header(enums: &BTreeMap<String, EnumData>, enum_source: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{BANNER}");
    let _ = writeln!(out, "#pragma once");
    let _ = writeln!(out, "#include <string>");
    let _ = writeln!(out, "#include <iostream>");
    let _ = writeln!(out, "#include <{enum_source}>");
    let _ = writeln!(out);
    for qualified in enums.keys() {
        let _ = writeln!(out, "std::string to_string(const {qualified}& value);");
        let _ = writeln!(
            out,
            "std::ostream& operator<<(std::ostream& stream, const {qualified}& value);"
        );
    }
    out
}

/// Source file implementing everything the header declares.
pub fn render_source(enums: &BTreeMap<String, EnumData>, header: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{BANNER}");
    let _ = writeln!(out, "#include <{header}>");
    let _ = writeln!(out);
    for (qualified, data) in enums {
        render_to_string(&mut out, qualified, data);
        render_stream_operator(&mut out, qualified, data);
    }
    out
}

/// Spelled-out form of one identifier: scoped enums qualify with the enum's
/// own name, unscoped enums only with the enclosing namespace. This is both
/// the case label and the generated string.
fn qualified_identifier(qualified: &str, data: &EnumData, identifier: &str) -> String {
    if data.is_class_enum {
        return format!("{qualified}::{identifier}");
    }
    let namespace = data.namespace();
    if namespace.is_empty() {
        identifier.to_string()
    } else {
        format!("{namespace}::{identifier}")
    }
}

fn render_to_string(out: &mut String, qualified: &str, data: &EnumData) {
    let _ = writeln!(out, "std::string to_string(const {qualified}& value) {{");
    let _ = writeln!(out, "  switch (value) {{");
    for identifier in &data.identifiers {
        let spelled = qualified_identifier(qualified, data, identifier);
        let _ = writeln!(out, "    case {spelled}:");
        let _ = writeln!(out, "      return \"{spelled}\";");
    }
    let _ = writeln!(out, "  }}");
    let _ = writeln!(out, "  return \"UNKNOWN VALUE\";");
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);
}

fn render_stream_operator(out: &mut String, qualified: &str, data: &EnumData) {
    let _ = writeln!(
        out,
        "std::ostream& operator<<(std::ostream& stream, const {qualified}& value) {{"
    );
    let _ = writeln!(out, "  switch (value) {{");
    for identifier in &data.identifiers {
        let spelled = qualified_identifier(qualified, data, identifier);
        let _ = writeln!(out, "    case {spelled}:");
        let _ = writeln!(out, "      stream << \"{spelled}\";");
        let _ = writeln!(out, "      break;");
    }
    let _ = writeln!(out, "    default:");
    let _ = writeln!(out, "      stream << \"UNKNOWN VALUE\";");
    let _ = writeln!(out, "  }}");
    let _ = writeln!(out, "  return stream;");
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);
}
