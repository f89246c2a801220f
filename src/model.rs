//! Data records accumulated from parse events, and the catalog that holds
//! them. Everything here serializes to JSON with the field names the index
//! format promises (`isClassEnum`, `definedIn`, `returnType`, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One active namespace and the scope depth that owns it. Entries are pushed
/// when a namespace declaration is parsed and removed when the owning scope
/// closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceEntry {
    pub name: String,
    pub scope_depth: u32,
}

/// Everything collected about one enumeration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumData {
    /// Enclosing namespace names, outermost first.
    pub namespaces: Vec<String>,
    pub name: String,
    /// True for `enum class`, false for the unscoped form.
    pub is_class_enum: bool,
    /// Filename this enum was discovered in.
    pub defined_in: String,
    /// Identifier names in source order. Generated switches depend on this
    /// order being stable.
    pub identifiers: Vec<String>,
}

impl EnumData {
    /// Enclosing namespaces joined with `::`; empty at global scope.
    pub fn namespace(&self) -> String {
        self.namespaces.join("::")
    }

    /// Catalog key: enclosing namespaces, then the enum's own name.
    pub fn qualified_name(&self) -> String {
        qualify(&self.namespaces, &self.name)
    }
}

/// One data member of a class or struct.
///
/// Access flags are mutually exclusive; private is "neither". The three
/// generation flags record annotations seen since the previous member or
/// method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberData {
    /// Declared type, as source text.
    #[serde(rename = "type")]
    pub ty: String,
    pub name: String,
    pub is_public: bool,
    pub is_protected: bool,
    pub is_const: bool,
    pub is_static: bool,
    /// Include this member in generated serialization functions.
    pub serializable: bool,
    pub generate_getter: bool,
    pub generate_setter: bool,
}

/// One method of a class or struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodData {
    /// Return type, as source text.
    pub return_type: String,
    pub name: String,
    pub is_public: bool,
    pub is_protected: bool,
    /// True when declared `virtual` or marked `override`.
    pub is_virtual: bool,
    pub is_const: bool,
    pub is_static: bool,
}

/// Everything collected about one class or struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassData {
    /// Filename this class was discovered in.
    pub defined_in: String,
    pub namespaces: Vec<String>,
    pub name: String,
    /// Parent names only; access qualifiers are not recorded here.
    pub parents: Vec<String>,
    /// Methods in source order.
    pub methods: Vec<MethodData>,
    /// Members in source order.
    pub members: Vec<MemberData>,
    /// True iff declared with the struct keyword.
    pub is_struct: bool,
    /// Set by a class-level annotation containing `cereal`; makes every
    /// member eligible for generated serialization.
    pub serializable: bool,
}

impl ClassData {
    pub fn namespace(&self) -> String {
        self.namespaces.join("::")
    }

    pub fn qualified_name(&self) -> String {
        qualify(&self.namespaces, &self.name)
    }
}

/// Everything the drivers discovered across one or more parses, keyed by
/// fully qualified name. Ordered maps keep generated output deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub enums: BTreeMap<String, EnumData>,
    pub classes: BTreeMap<String, ClassData>,
}

fn qualify(namespaces: &[String], name: &str) -> String {
    if namespaces.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", namespaces.join("::"), name)
    }
}
