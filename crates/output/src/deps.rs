//! Derives package dependencies from type references

use std::collections::HashMap;
use tracing::debug;
use unisdk_core::{EngineFunction, EnginePackage, EngineStruct};

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Identifier tokens of a type spelling, e.g. `Dictionary<Key, Foo[]>`
/// yields `Dictionary`, `Key` and `Foo`
pub fn type_tokens(ty: &str) -> impl Iterator<Item = &str> {
    ty.split(|c: char| !is_ident_char(c)).filter(|t| !t.is_empty())
}

fn function_types(func: &EngineFunction) -> impl Iterator<Item = &str> {
    func.parameters.iter().map(|p| p.type_name.as_str())
}

fn struct_types(s: &EngineStruct) -> Vec<&str> {
    let mut types: Vec<&str> = Vec::new();
    types.extend(s.supers.values().map(String::as_str));
    types.extend(s.imp_interfaces.values().map(String::as_str));
    types.extend(s.fields.iter().map(|f| f.type_name.as_str()));
    types.extend(s.properties.iter().map(|p| p.type_name.as_str()));
    for method in &s.methods {
        types.extend(function_types(method));
    }
    types
}

/// Every type spelling referenced by a package's declarations
pub fn referenced_types(pack: &EnginePackage) -> Vec<&str> {
    let mut types: Vec<&str> = pack.enums.iter().map(|e| e.type_name.as_str()).collect();
    for s in &pack.structs {
        types.extend(struct_types(s));
    }
    for c in &pack.classes {
        types.extend(struct_types(&c.base));
    }
    types.extend(pack.fields.iter().map(|f| f.type_name.as_str()));
    for func in &pack.functions {
        types.extend(function_types(func));
    }
    types
}

/// Append inferred dependencies to every package.
///
/// The first package declaring a type name owns it. Existing entries keep
/// their position; new ones are appended in discovery order.
pub fn infer_dependencies(packages: &mut [EnginePackage]) {
    let mut owners: HashMap<&str, usize> = HashMap::new();
    for (i, pack) in packages.iter().enumerate() {
        for name in pack.type_names() {
            owners.entry(name).or_insert(i);
        }
    }

    let inferred: Vec<Vec<String>> = packages
        .iter()
        .enumerate()
        .map(|(i, pack)| {
            let mut found: Vec<String> = Vec::new();
            for token in referenced_types(pack).into_iter().flat_map(type_tokens) {
                let Some(&owner) = owners.get(token) else {
                    continue;
                };
                let owner_name = &packages[owner].name;
                if owner != i
                    && !pack.dependencies.contains(owner_name)
                    && !found.contains(owner_name)
                {
                    found.push(owner_name.clone());
                }
            }
            found
        })
        .collect();

    for (pack, found) in packages.iter_mut().zip(inferred) {
        if !found.is_empty() {
            debug!("{}: inferred dependencies {:?}", pack.name, found);
            pack.dependencies.extend(found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unisdk_core::{EngineClass, EngineEnum, EngineField, EngineItem, EngineParameter};

    fn field(ty: &str) -> EngineField {
        EngineField {
            item: EngineItem::named("f"),
            type_name: ty.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_type_tokens() {
        let tokens: Vec<_> = type_tokens("Dictionary<Key, Foo[]>*").collect();
        assert_eq!(tokens, vec!["Dictionary", "Key", "Foo"]);
    }

    #[test]
    fn test_inference_from_references() {
        let mut core = EnginePackage::new("Core");
        core.structs.push(EngineStruct {
            item: EngineItem::named("Vector3"),
            ..Default::default()
        });
        core.enums.push(EngineEnum {
            item: EngineItem::named("Layer"),
            ..Default::default()
        });

        let mut ui = EnginePackage::new("Ui");
        let mut widget = EngineClass::default();
        widget.base.item = EngineItem::named("Widget");
        widget.base.fields.push(field("Vector3[]"));
        widget.base.fields.push(field("Widget"));
        ui.classes.push(widget);

        let mut game = EnginePackage::new("Game");
        game.dependencies.push("Ui".into());
        let mut spawn = EngineFunction::default();
        spawn.parameters.push(EngineParameter {
            item: EngineItem::named("layer"),
            type_name: "List<Layer>".into(),
            ..Default::default()
        });
        game.functions.push(spawn);
        game.fields.push(field("Widget"));

        let mut packs = vec![core, ui, game];
        infer_dependencies(&mut packs);

        assert!(packs[0].dependencies.is_empty());
        assert_eq!(packs[1].dependencies, vec!["Core".to_string()]);
        assert_eq!(packs[2].dependencies, vec!["Ui".to_string(), "Core".to_string()]);
    }

    #[test]
    fn test_first_owner_wins() {
        let mut a = EnginePackage::new("A");
        a.structs.push(EngineStruct {
            item: EngineItem::named("Shared"),
            ..Default::default()
        });
        let mut b = EnginePackage::new("B");
        b.structs.push(EngineStruct {
            item: EngineItem::named("Shared"),
            ..Default::default()
        });
        let mut c = EnginePackage::new("C");
        c.fields.push(field("Shared"));

        let mut packs = vec![a, b, c];
        infer_dependencies(&mut packs);
        assert_eq!(packs[2].dependencies, vec!["A".to_string()]);
        // declaring a type is not a reference to it
        assert_eq!(packs[1].dependencies, Vec::<String>::new());
    }
}
