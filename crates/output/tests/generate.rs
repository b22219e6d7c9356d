use std::sync::{Arc, Mutex};
use unisdk_core::config::NewLine;
use unisdk_core::{
    Config, EngineClass, EngineField, EngineFunction, EngineItem, EnginePackage, EngineParameter,
    EngineStruct, Error, GenerationEvent, SdkFile,
};
use unisdk_output::SdkGenerator;

fn config() -> Config {
    let mut config = Config::default();
    config.lang.new_line = NewLine::Lf;
    config.lang.field_type_pad = 0;
    config.lang.inline_comment_pad = 0;
    config
}

fn field(name: &str, ty: &str) -> EngineField {
    EngineField {
        item: EngineItem::named(name),
        type_name: ty.into(),
        ..Default::default()
    }
}

fn value_type(name: &str, fields: Vec<EngineField>) -> EngineStruct {
    EngineStruct {
        item: EngineItem::named(name),
        fields,
        ..Default::default()
    }
}

fn class(name: &str, fields: Vec<EngineField>) -> EngineClass {
    EngineClass {
        base: value_type(name, fields),
        is_interface: false,
    }
}

fn model() -> SdkFile {
    let mut corlib = EnginePackage::new("mscorlib");
    corlib.is_predefined = true;
    corlib.structs.push(value_type("Int32Box", vec![field("m_value", "int32_t")]));

    let mut core = EnginePackage::new("Core");
    core.structs.push(value_type(
        "Vector3",
        vec![field("x", "float"), field("y", "float"), field("z", "float")],
    ));
    let mut nested = value_type("Enumerator", Vec::new());
    nested.is_sub_type = true;
    core.structs.push(nested);

    let mut game = EnginePackage::new("Game");
    let mut player = class("Player", vec![field("position", "Vector3"), field("ids", "int64_t_Array")]);
    player.base.supers.insert("0".into(), "Il2CppObject".into());
    game.classes.push(player);
    game.structs.push(value_type("Stats", vec![field("box", "Int32Box*")]));

    SdkFile {
        game_name: "Demo".into(),
        game_version: "1.0.0".into(),
        namespace: "SDK".into(),
        packages: vec![game, core, corlib],
    }
}

#[test]
fn test_full_run_writes_packages_and_aggregate() {
    let dir = tempfile::tempdir().unwrap();
    let generator = SdkGenerator::new(config()).unwrap();
    let mut sdk = model();

    let report = generator.generate(&mut sdk, dir.path()).unwrap();

    assert_eq!(report.packages, 3);
    assert_eq!(report.generated_packages, 2);
    assert_eq!(report.structs, 3);
    assert!(report.cycles.is_empty());
    assert_eq!(report.sorted_packages, vec!["Core", "mscorlib", "Game"]);
    assert_eq!(report.written_files.len(), 3);

    let game = std::fs::read_to_string(dir.path().join("SDK/Game_Package.cs")).unwrap();
    assert!(game.starts_with("// Name: Demo\n// Version: 1.0.0\n"));
    assert!(game.contains("namespace SDK"));
    assert!(game.contains("public class Player"));
    assert!(!game.contains("Il2CppObject"));
    assert!(game.contains("public long[] ids;"));
    assert!(game.contains("public Vector3 position;"));

    let core = std::fs::read_to_string(dir.path().join("SDK/Core_Package.cs")).unwrap();
    assert!(core.contains("public struct Vector3"));
    assert!(!core.contains("Enumerator"));

    assert!(!dir.path().join("SDK/mscorlib_Package.cs").exists());

    let aggregate = std::fs::read_to_string(dir.path().join("SDK.h")).unwrap();
    assert!(aggregate.starts_with("#pragma once\n"));
    assert!(aggregate.ends_with(
        "#include \"SDK/mscorlib_Package.h\"\n#include \"SDK/Core_Package.h\"\n#include \"SDK/Game_Package.h\"\n"
    ));

    // the model was normalized and dependencies inferred in place
    assert_eq!(sdk.packages[0].dependencies, vec!["mscorlib".to_string(), "Core".to_string()]);
}

#[test]
fn test_cycle_is_reported_and_included() {
    let dir = tempfile::tempdir().unwrap();
    let generator = SdkGenerator::new(config()).unwrap();

    let mut a = EnginePackage::new("A");
    a.structs.push(value_type("Left", vec![field("right", "Right")]));
    let mut b = EnginePackage::new("B");
    b.structs.push(value_type("Right", vec![field("left", "Left*")]));
    let mut sdk = SdkFile {
        packages: vec![a, b],
        ..Default::default()
    };

    let report = generator.generate(&mut sdk, dir.path()).unwrap();
    assert_eq!(
        report.cycles,
        vec![("A".to_string(), "B".to_string()), ("B".to_string(), "A".to_string())]
    );
    assert_eq!(report.sorted_packages.len(), 2);

    let aggregate = std::fs::read_to_string(dir.path().join("SDK.h")).unwrap();
    assert!(aggregate.contains("// # (Sorted: 2, Cycle: 2)"));
    assert!(aggregate.contains("// A <-> B\n#include \"SDK/A_Package.h\"\n"));
    assert_eq!(aggregate.matches("#include \"SDK/A_Package.h\"").count(), 1);
    assert_eq!(aggregate.matches("#include \"SDK/B_Package.h\"").count(), 1);
}

#[test]
fn test_progress_reported_per_package() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = SdkGenerator::new(config()).unwrap();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    generator.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

    let mut sdk = model();
    generator.generate(&mut sdk, dir.path()).unwrap();

    let events = events.lock().unwrap();
    let progress: Vec<(usize, usize)> = events
        .iter()
        .filter_map(|e| match e {
            GenerationEvent::Progress { processed, remaining, .. } => Some((*processed, *remaining)),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![(0, 3), (1, 2), (2, 1)]);
    assert!(events.contains(&GenerationEvent::Status("Sort packages depend on dependencies".into())));
}

#[test]
fn test_missing_return_slot_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let generator = SdkGenerator::new(config()).unwrap();

    let mut broken = class("Broken", Vec::new());
    let mut method = EngineFunction {
        item: EngineItem::named("Tick"),
        ..Default::default()
    };
    method.item.full_name = "Broken.Tick".into();
    method.parameters.push(EngineParameter {
        item: EngineItem::named("dt"),
        type_name: "float".into(),
        ..Default::default()
    });
    broken.base.methods.push(method);

    let mut pack = EnginePackage::new("Game");
    pack.classes.push(broken);
    let mut sdk = SdkFile {
        packages: vec![pack],
        ..Default::default()
    };

    let err = generator.generate(&mut sdk, dir.path()).unwrap_err();
    assert!(matches!(err, Error::ContractViolation { .. }));
    assert!(!dir.path().join("SDK.h").exists());
}

#[test]
fn test_generate_from_model_file() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("model.json");
    std::fs::write(
        &model_path,
        r#"{
            "game_name": "Demo",
            "game_version": "2.0",
            "packages": [
                {
                    "name": "Core",
                    "structs": [
                        { "name": "Color", "fields": [ { "name": "r", "type_name": "uint8_t" } ] }
                    ]
                }
            ]
        }"#,
    )
    .unwrap();

    let out = dir.path().join("out");
    let report = unisdk_output::generate(&model_path, &out, config()).unwrap();
    assert_eq!(report.sorted_packages, vec!["Core"]);

    let core = std::fs::read_to_string(out.join("SDK/Core_Package.cs")).unwrap();
    assert!(core.contains("public byte r;"));
}

#[test]
fn test_duplicate_package_names_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let generator = SdkGenerator::new(config()).unwrap();

    let mut first = EnginePackage::new("A");
    first.structs.push(value_type("First", Vec::new()));
    let mut second = EnginePackage::new("A");
    second.structs.push(value_type("Second", Vec::new()));
    let mut sdk = SdkFile {
        packages: vec![first, second],
        ..Default::default()
    };

    let err = generator.generate(&mut sdk, dir.path()).unwrap_err();
    match err {
        Error::ContractViolation { entity, reason } => {
            assert_eq!(entity, "A");
            assert!(reason.contains("duplicate"));
        }
        other => panic!("expected contract violation, got {:?}", other),
    }
    assert!(!dir.path().join("SDK/A_Package.cs").exists());
    assert!(!dir.path().join("SDK.h").exists());
}

#[test]
fn test_write_failure_is_surfaced() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "occupied").unwrap();

    let generator = SdkGenerator::new(config()).unwrap();
    let mut sdk = model();

    let err = generator.generate(&mut sdk, &blocker).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "occupied");
}
