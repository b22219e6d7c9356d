//! Renderer-ready declaration records
//!
//! These are the normalized twins of the reflected entities: every type
//! spelling has been normalized, modifier bitsets are decomposed into plain
//! booleans and comments are filled in. Records are never mutated once they
//! have been handed to a renderer.

use serde::Serialize;

/// Shape of a struct-like declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StructKind {
    /// `struct`
    ValueType,
    /// `class`
    ReferenceType,
    /// `interface`
    Interface,
}

impl StructKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            StructKind::ValueType => "struct",
            StructKind::ReferenceType => "class",
            StructKind::Interface => "interface",
        }
    }

    pub fn is_value_type(&self) -> bool {
        matches!(self, StructKind::ValueType)
    }

    pub fn is_interface(&self) -> bool {
        matches!(self, StructKind::Interface)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CSharpAttribute {
    pub name: String,
    pub arguments: Vec<String>,
    pub conditions: Vec<String>,
    pub inline_comment: String,
}

/// Ordered enum member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameValue {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CSharpEnum {
    pub access: String,
    pub attributes: Vec<CSharpAttribute>,
    pub name: String,
    pub type_name: String,
    pub values: Vec<NameValue>,
    /// Literal base picked by the renderer
    pub hex_values: bool,
    pub conditions: Vec<String>,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CSharpField {
    pub access: String,
    pub attributes: Vec<CSharpAttribute>,
    pub name: String,
    pub type_name: String,
    pub value: Option<String>,
    pub is_static: bool,
    pub is_array: bool,
    pub is_read_only: bool,
    pub is_const: bool,
    pub is_volatile: bool,
    pub inline_comment: String,
    pub conditions: Vec<String>,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CSharpProperty {
    pub access: String,
    pub attributes: Vec<CSharpAttribute>,
    pub name: String,
    pub type_name: String,
    pub value: Option<String>,
    pub is_static: bool,
    pub is_array: bool,
    pub is_abstract: bool,
    pub is_override: bool,
    pub is_virtual: bool,
    pub have_getter: bool,
    pub have_setter: bool,
    pub inline_comment: String,
    pub conditions: Vec<String>,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CSharpParameter {
    pub attributes: Vec<CSharpAttribute>,
    pub name: String,
    pub type_name: String,
    pub is_ref: bool,
    pub conditions: Vec<String>,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CSharpFunction {
    pub access: String,
    pub attributes: Vec<CSharpAttribute>,
    pub name: String,
    /// Return type, taken from the return slot
    pub type_name: String,
    pub generic_params: Vec<String>,
    pub params: Vec<CSharpParameter>,
    pub body: Vec<String>,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_override: bool,
    pub is_virtual: bool,
    pub is_extern: bool,
    pub is_async: bool,
    pub is_unsafe: bool,
    pub conditions: Vec<String>,
    pub comments: Vec<String>,
}

/// Struct, class or interface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CSharpStruct {
    pub kind: StructKind,
    pub access: String,
    pub attributes: Vec<CSharpAttribute>,
    pub name: String,
    /// Primary base type; empty when there is none
    pub super_name: String,
    pub interfaces: Vec<String>,
    pub generic_params: Vec<String>,
    pub fields: Vec<CSharpField>,
    pub properties: Vec<CSharpProperty>,
    pub methods: Vec<CSharpFunction>,
    pub is_static: bool,
    pub is_read_only: bool,
    pub is_abstract: bool,
    pub is_sealed: bool,
    pub inline_comment: String,
    pub conditions: Vec<String>,
    pub comments: Vec<String>,
}

/// Everything the renderer needs for one package
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CSharpPackage {
    pub name: String,
    pub heading_comment: Vec<String>,
    pub namespace: String,
    pub enums: Vec<CSharpEnum>,
    pub structs: Vec<CSharpStruct>,
    pub conditions: Vec<String>,
}
