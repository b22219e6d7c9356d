//! Reflected model produced by the engine analyzer
//!
//! The output stage treats everything here as read-mostly input. The only
//! mutation it performs is the one-time type spelling rewrite and the struct
//! cleanup that runs just before mapping.

use bitflags::bitflags;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Represents a memory address (supports both 32 and 64 bit)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub u64);

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

impl std::fmt::UpperHex for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::UpperHex::fmt(&self.0, f)
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Access level of a reflected item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessModifier {
    #[default]
    Public,
    Private,
    Protected,
    Internal,
}

impl AccessModifier {
    /// Lower-cased keyword form
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessModifier::Public => "public",
            AccessModifier::Private => "private",
            AccessModifier::Protected => "protected",
            AccessModifier::Internal => "internal",
        }
    }
}

impl std::fmt::Display for AccessModifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Declaration modifiers as reported by the analyzer
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct DeclarationModifiers: u32 {
        const STATIC = 0x0001;
        const READONLY = 0x0002;
        const CONST = 0x0004;
        const VOLATILE = 0x0008;
        const ABSTRACT = 0x0010;
        const OVERRIDE = 0x0020;
        const VIRTUAL = 0x0040;
        const EXTERN = 0x0080;
        const SEALED = 0x0100;
    }
}

/// Access and declaration modifiers of an item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemModifiers {
    pub access: AccessModifier,
    pub declaration: DeclarationModifiers,
}

impl ItemModifiers {
    pub fn new(access: AccessModifier, declaration: DeclarationModifiers) -> Self {
        Self { access, declaration }
    }

    /// Bitwise test against the declaration bitset
    pub fn has(&self, flag: DeclarationModifiers) -> bool {
        (self.declaration & flag) == flag && !flag.is_empty()
    }
}

/// Attribute attached to any reflected item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineAttribute {
    pub name: String,
    pub arguments: Vec<String>,
    pub conditions: Vec<String>,
    pub offset: u64,
    pub rva: Address,
    pub va: Address,
}

/// Attributes shared by every reflected entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineItem {
    pub name: String,
    pub full_name: String,
    pub modifiers: ItemModifiers,
    pub attributes: Vec<EngineAttribute>,
    /// Free-form comment lines
    pub comments: Vec<String>,
    /// Compile-time conditions gating emission
    pub conditions: Vec<String>,
    pub offset: u64,
    pub rva: Address,
    pub va: Address,
    pub flags_string: String,
}

impl EngineItem {
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            full_name: name.clone(),
            name,
            ..Default::default()
        }
    }
}

/// Enum declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineEnum {
    #[serde(flatten)]
    pub item: EngineItem,
    /// Underlying integer type
    pub type_name: String,
    /// Declaration-ordered name/value pairs
    pub values: IndexMap<String, i64>,
    pub hex_values: bool,
}

/// Field of a struct/class or a package-level variable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineField {
    #[serde(flatten)]
    pub item: EngineItem,
    pub type_name: String,
    pub value: Option<String>,
    /// Array dimension; blank for scalars
    pub array_dim: String,
    /// Single-line comment kept next to the declaration
    pub comment: String,
}

/// Property of a struct/class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineProperty {
    #[serde(flatten)]
    pub item: EngineItem,
    pub type_name: String,
    pub value: Option<String>,
    pub array_dim: String,
    pub comment: String,
    pub have_getter: bool,
    pub have_setter: bool,
}

/// Function parameter, including the return slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParameter {
    #[serde(flatten)]
    pub item: EngineItem,
    pub type_name: String,
    pub is_reference: bool,
    /// Marks the return slot; exactly one per function
    pub is_return: bool,
}

/// Method or free function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineFunction {
    #[serde(flatten)]
    pub item: EngineItem,
    pub parameters: Vec<EngineParameter>,
    pub template_params: Vec<String>,
    pub body: Vec<String>,
}

impl EngineFunction {
    /// The return slot, if the analyzer provided one
    pub fn return_parameter(&self) -> Option<&EngineParameter> {
        self.parameters.iter().find(|p| p.is_return)
    }

    /// Real parameters in declaration order
    pub fn real_parameters(&self) -> impl Iterator<Item = &EngineParameter> {
        self.parameters.iter().filter(|p| !p.is_return)
    }
}

/// Value type (struct) declaration; also the base shape of classes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineStruct {
    #[serde(flatten)]
    pub item: EngineItem,
    pub fields: Vec<EngineField>,
    pub properties: Vec<EngineProperty>,
    pub methods: Vec<EngineFunction>,
    /// Base types in declaration order; the first entry is the primary base
    pub supers: IndexMap<String, String>,
    pub imp_interfaces: IndexMap<String, String>,
    pub template_params: Vec<String>,
    /// Nested/anonymous type, never emitted at top level
    pub is_sub_type: bool,
    pub object_index: i64,
}

impl EngineStruct {
    /// Primary base type, if any
    pub fn primary_super(&self) -> Option<(&String, &String)> {
        self.supers.first()
    }
}

/// Reference type declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineClass {
    #[serde(flatten)]
    pub base: EngineStruct,
    pub is_interface: bool,
}

/// A named group of declarations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnginePackage {
    pub name: String,
    /// Built-in package: ordered but never written
    pub is_predefined: bool,
    pub enums: Vec<EngineEnum>,
    pub structs: Vec<EngineStruct>,
    pub classes: Vec<EngineClass>,
    pub fields: Vec<EngineField>,
    pub functions: Vec<EngineFunction>,
    pub conditions: Vec<String>,
    /// Names of packages this one depends on
    pub dependencies: Vec<String>,
}

impl EnginePackage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Names of every type declared by this package
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.enums
            .iter()
            .map(|e| e.item.name.as_str())
            .chain(self.structs.iter().map(|s| s.item.name.as_str()))
            .chain(self.classes.iter().map(|c| c.base.item.name.as_str()))
    }

    pub fn struct_count(&self) -> usize {
        self.structs.len() + self.classes.len()
    }
}

/// Whole reflected model for one game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkFile {
    pub game_name: String,
    pub game_version: String,
    pub namespace: String,
    pub packages: Vec<EnginePackage>,
}

impl SdkFile {
    /// Load a model exported by the analyzer as JSON
    pub fn load(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| crate::Error::parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_bit_test() {
        let mods = ItemModifiers::new(
            AccessModifier::Protected,
            DeclarationModifiers::STATIC | DeclarationModifiers::VIRTUAL,
        );
        assert!(mods.has(DeclarationModifiers::STATIC));
        assert!(mods.has(DeclarationModifiers::VIRTUAL));
        assert!(!mods.has(DeclarationModifiers::ABSTRACT));
        assert!(!mods.has(DeclarationModifiers::empty()));
        assert_eq!(mods.access.as_str(), "protected");
    }

    #[test]
    fn test_supers_keep_insertion_order() {
        let mut s = EngineStruct::default();
        s.supers.insert("z".into(), "Zeta".into());
        s.supers.insert("a".into(), "Alpha".into());
        assert_eq!(s.primary_super().map(|(_, v)| v.as_str()), Some("Zeta"));
    }

    #[test]
    fn test_model_from_json() {
        let json = r#"{
            "game_name": "Demo",
            "packages": [{
                "name": "Core",
                "structs": [{
                    "name": "Vector3",
                    "supers": { "0": "ValueType" },
                    "fields": [{ "name": "x", "type_name": "float", "offset": 16 }]
                }],
                "enums": [{
                    "name": "Mode",
                    "modifiers": { "access": "internal", "declaration": "SEALED" },
                    "values": { "Off": 0, "On": 1 }
                }]
            }]
        }"#;
        let sdk: SdkFile = serde_json::from_str(json).unwrap();
        let pack = &sdk.packages[0];
        assert_eq!(pack.structs[0].item.name, "Vector3");
        assert_eq!(pack.structs[0].fields[0].item.offset, 16);
        assert_eq!(pack.enums[0].item.modifiers.access, AccessModifier::Internal);
        assert!(pack.enums[0].item.modifiers.has(DeclarationModifiers::SEALED));
        assert_eq!(pack.type_names().collect::<Vec<_>>(), vec!["Mode", "Vector3"]);
    }

    #[test]
    fn test_function_return_slot() {
        let mut func = EngineFunction::default();
        func.parameters.push(EngineParameter {
            item: EngineItem::named("ret"),
            type_name: "int".into(),
            is_return: true,
            ..Default::default()
        });
        func.parameters.push(EngineParameter {
            item: EngineItem::named("a"),
            type_name: "float".into(),
            ..Default::default()
        });
        assert_eq!(func.return_parameter().map(|p| p.type_name.as_str()), Some("int"));
        assert_eq!(func.real_parameters().count(), 1);
    }
}
