//! Conversion of reflected entities into declaration records

use crate::lang::TypeNormalizer;
use crate::types::*;
use unisdk_core::{
    DeclarationModifiers, EngineAttribute, EngineClass, EngineEnum, EngineField, EngineFunction,
    EngineItem, EngineParameter, EngineProperty, EngineStruct, Error, Result,
};

/// Column width of parameter types in synthetic function comments
pub const PARAM_TYPE_PAD: usize = 50;
/// Column width of parameter names when a flags annotation follows
pub const PARAM_NAME_PAD: usize = 58;

/// Maps reflected entities to declaration records
#[derive(Debug, Clone, Copy)]
pub struct DeclMapper<'a> {
    normalizer: &'a TypeNormalizer,
}

fn has(item: &EngineItem, flag: DeclarationModifiers) -> bool {
    item.modifiers.has(flag)
}

/// Offset, then the free-form comment and the flags string when present
fn member_inline_comment(item: &EngineItem, comment: &str) -> String {
    let mut inline = format!("0x{:04X}", item.offset);
    if !comment.is_empty() {
        inline.push(' ');
        inline.push_str(comment);
    }
    if !item.flags_string.is_empty() {
        inline.push(' ');
        inline.push_str(&item.flags_string);
    }
    inline
}

impl<'a> DeclMapper<'a> {
    pub fn new(normalizer: &'a TypeNormalizer) -> Self {
        Self { normalizer }
    }

    fn ty(&self, raw: &str) -> String {
        self.normalizer.normalize(raw, false)
    }

    fn attributes(&self, attrs: &[EngineAttribute]) -> Vec<CSharpAttribute> {
        attrs.iter().map(|a| self.attribute(a)).collect()
    }

    pub fn attribute(&self, attr: &EngineAttribute) -> CSharpAttribute {
        CSharpAttribute {
            name: attr.name.clone(),
            arguments: attr.arguments.clone(),
            conditions: attr.conditions.clone(),
            inline_comment: format!(
                "RVA: 0x{:X}, Offset: 0x{:X}, VA: 0x{:X}",
                attr.rva, attr.offset, attr.va
            ),
        }
    }

    pub fn enumeration(&self, e: &EngineEnum) -> CSharpEnum {
        let mut comments = vec![e.item.full_name.clone()];
        comments.extend(e.item.comments.iter().cloned());

        CSharpEnum {
            access: e.item.modifiers.access.as_str().to_string(),
            attributes: self.attributes(&e.item.attributes),
            name: e.item.name.clone(),
            type_name: self.ty(&e.type_name),
            values: e
                .values
                .iter()
                .map(|(name, value)| NameValue {
                    name: name.clone(),
                    value: *value,
                })
                .collect(),
            hex_values: e.hex_values,
            conditions: e.item.conditions.clone(),
            comments,
        }
    }

    pub fn field(&self, f: &EngineField) -> CSharpField {
        CSharpField {
            access: f.item.modifiers.access.as_str().to_string(),
            attributes: self.attributes(&f.item.attributes),
            name: f.item.name.clone(),
            type_name: self.ty(&f.type_name),
            value: f.value.clone(),
            is_static: has(&f.item, DeclarationModifiers::STATIC),
            is_array: !f.array_dim.trim().is_empty(),
            is_read_only: has(&f.item, DeclarationModifiers::READONLY),
            is_const: has(&f.item, DeclarationModifiers::CONST),
            is_volatile: has(&f.item, DeclarationModifiers::VOLATILE),
            inline_comment: member_inline_comment(&f.item, &f.comment),
            conditions: f.item.conditions.clone(),
            comments: f.item.comments.clone(),
        }
    }

    pub fn property(&self, p: &EngineProperty) -> CSharpProperty {
        CSharpProperty {
            access: p.item.modifiers.access.as_str().to_string(),
            attributes: self.attributes(&p.item.attributes),
            name: p.item.name.clone(),
            type_name: self.ty(&p.type_name),
            value: p.value.clone(),
            is_static: has(&p.item, DeclarationModifiers::STATIC),
            is_array: !p.array_dim.trim().is_empty(),
            is_abstract: has(&p.item, DeclarationModifiers::ABSTRACT),
            is_override: has(&p.item, DeclarationModifiers::OVERRIDE),
            is_virtual: has(&p.item, DeclarationModifiers::VIRTUAL),
            have_getter: p.have_getter,
            have_setter: p.have_setter,
            inline_comment: member_inline_comment(&p.item, &p.comment),
            conditions: p.item.conditions.clone(),
            comments: p.item.comments.clone(),
        }
    }

    pub fn parameter(&self, p: &EngineParameter) -> CSharpParameter {
        CSharpParameter {
            attributes: self.attributes(&p.item.attributes),
            name: p.item.name.clone(),
            type_name: self.ty(&p.type_name),
            is_ref: p.is_reference,
            conditions: p.item.conditions.clone(),
            comments: p.item.comments.clone(),
        }
    }

    /// Synthetic comment block carrying the binary metadata of a function
    fn function_comment(&self, func: &EngineFunction) -> Vec<String> {
        let mut comments = vec![
            "Function:".to_string(),
            format!("\t\tRVA    -> 0x{:08X}", func.item.rva),
            format!("\t\tName   -> {}", func.item.full_name),
            format!("\t\tFlags  -> ({})", func.item.flags_string),
        ];

        let mut params = func.real_parameters().peekable();
        if params.peek().is_some() {
            comments.push("Parameters:".to_string());
        }
        for param in params {
            let ty = self.ty(&param.type_name);
            let line = if param.item.flags_string.trim().is_empty() {
                format!("\t\t{:<tw$} {}", ty, param.item.name, tw = PARAM_TYPE_PAD)
            } else {
                format!(
                    "\t\t{:<tw$} {:<nw$} ({})",
                    ty,
                    param.item.name,
                    param.item.flags_string,
                    tw = PARAM_TYPE_PAD,
                    nw = PARAM_NAME_PAD
                )
            };
            comments.push(line);
        }

        comments
    }

    /// Map a function. A missing return slot is a contract violation.
    pub fn function(&self, func: &EngineFunction) -> Result<CSharpFunction> {
        let ret = func.return_parameter().ok_or_else(|| {
            Error::contract(&func.item.full_name, "function has no return-marked parameter")
        })?;

        // explicit comments always win over the synthetic block
        let comments = if func.item.comments.is_empty() {
            self.function_comment(func)
        } else {
            func.item.comments.clone()
        };

        Ok(CSharpFunction {
            access: func.item.modifiers.access.as_str().to_string(),
            attributes: self.attributes(&func.item.attributes),
            name: func.item.name.clone(),
            type_name: self.ty(&ret.type_name),
            generic_params: func.template_params.clone(),
            params: func.real_parameters().map(|p| self.parameter(p)).collect(),
            body: func.body.clone(),
            is_static: has(&func.item, DeclarationModifiers::STATIC),
            is_abstract: has(&func.item, DeclarationModifiers::ABSTRACT),
            is_override: has(&func.item, DeclarationModifiers::OVERRIDE),
            is_virtual: has(&func.item, DeclarationModifiers::VIRTUAL),
            is_extern: has(&func.item, DeclarationModifiers::EXTERN),
            is_async: false,
            is_unsafe: false,
            conditions: func.item.conditions.clone(),
            comments,
        })
    }

    /// Map a value type
    pub fn structure(&self, s: &EngineStruct) -> Result<CSharpStruct> {
        let mut comments = vec![s.item.full_name.clone()];
        comments.extend(s.item.comments.iter().cloned());

        let methods = s
            .methods
            .iter()
            .map(|m| self.function(m))
            .collect::<Result<Vec<_>>>()?;

        Ok(CSharpStruct {
            kind: StructKind::ValueType,
            access: s.item.modifiers.access.as_str().to_string(),
            attributes: self.attributes(&s.item.attributes),
            name: s.item.name.clone(),
            super_name: s
                .primary_super()
                .map(|(_, base)| base.clone())
                .unwrap_or_default(),
            interfaces: s.imp_interfaces.values().cloned().collect(),
            generic_params: s.template_params.clone(),
            fields: s.fields.iter().map(|f| self.field(f)).collect(),
            properties: s.properties.iter().map(|p| self.property(p)).collect(),
            methods,
            is_static: has(&s.item, DeclarationModifiers::STATIC),
            is_read_only: has(&s.item, DeclarationModifiers::READONLY),
            is_abstract: has(&s.item, DeclarationModifiers::ABSTRACT),
            is_sealed: has(&s.item, DeclarationModifiers::SEALED),
            inline_comment: format!("TypeDefIndex: {}", s.object_index),
            conditions: s.item.conditions.clone(),
            comments,
        })
    }

    /// Map a class: the struct mapping with the kind switched afterwards
    pub fn class(&self, c: &EngineClass) -> Result<CSharpStruct> {
        let mut decl = self.structure(&c.base)?;
        decl.kind = if c.is_interface {
            StructKind::Interface
        } else {
            StructKind::ReferenceType
        };
        Ok(decl)
    }
}
