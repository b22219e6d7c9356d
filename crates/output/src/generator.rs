//! SDK generator - drives mapping, rendering and the aggregate header

use crate::deps::infer_dependencies;
use crate::lang::TypeNormalizer;
use crate::mapper::DeclMapper;
use crate::output::{CSharpRenderer, PackageRenderer};
use crate::prepare::StructPreparer;
use crate::sorter::{self, SortResult};
use crate::types::CSharpPackage;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use unisdk_core::{Config, EnginePackage, Error, EventBus, GenerationEvent, Result, SdkFile};

/// Standard headers every aggregate file pulls in
pub const STD_INCLUDES: &[&str] = &[
    "set",
    "string",
    "vector",
    "locale",
    "unordered_set",
    "unordered_map",
    "iostream",
    "sstream",
    "cstdint",
    "Windows.h",
];

/// Include directive for a package header
pub fn package_include(package: &str) -> String {
    format!("#include \"SDK/{}_Package.h\"", package.replace('\\', "/"))
}

/// Summary of a generation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub written_files: Vec<PathBuf>,
    pub sorted_packages: Vec<String>,
    pub cycles: Vec<(String, String)>,
    pub packages: usize,
    pub generated_packages: usize,
    pub enums: usize,
    pub structs: usize,
}

/// Output stage for one reflected model
pub struct SdkGenerator<R = CSharpRenderer> {
    config: Config,
    normalizer: TypeNormalizer,
    preparer: StructPreparer,
    renderer: R,
    events: EventBus,
}

impl SdkGenerator<CSharpRenderer> {
    /// Generator with the default C# renderer
    pub fn new(config: Config) -> Result<Self> {
        let renderer = CSharpRenderer::new(config.lang.clone());
        Self::with_renderer(config, renderer)
    }
}

impl<R: PackageRenderer> SdkGenerator<R> {
    pub fn with_renderer(config: Config, renderer: R) -> Result<Self> {
        config.validate()?;
        let normalizer = TypeNormalizer::from_config(&config)?;
        let preparer = StructPreparer::new(config.synthetic_roots.iter().cloned());

        Ok(Self {
            config,
            normalizer,
            preparer,
            renderer,
            events: EventBus::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a progress/status subscriber
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: Fn(&GenerationEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(callback);
    }

    /// One-time pass over the model: type spellings and dependency edges
    pub fn prepare_model(&self, sdk: &mut SdkFile) {
        self.normalizer.normalize_all(&mut sdk.packages);
        if self.config.infer_dependencies {
            infer_dependencies(&mut sdk.packages);
        }
    }

    /// Prepare and map one package. Predefined packages yield `None`.
    pub fn build_package(
        &self,
        pack: &mut EnginePackage,
        heading: &[String],
        namespace: &str,
    ) -> Result<Option<CSharpPackage>> {
        if pack.is_predefined {
            return Ok(None);
        }

        let mapper = DeclMapper::new(&self.normalizer);
        let enums = pack.enums.iter().map(|e| mapper.enumeration(e)).collect();

        let mut structs = Vec::with_capacity(pack.struct_count());
        for s in pack.structs.iter_mut().filter(|s| !s.is_sub_type) {
            self.preparer.prepare(s);
            structs.push(mapper.structure(s)?);
        }
        for c in pack.classes.iter_mut().filter(|c| !c.base.is_sub_type) {
            self.preparer.prepare(&mut c.base);
            structs.push(mapper.class(c)?);
        }

        Ok(Some(CSharpPackage {
            name: pack.name.clone(),
            heading_comment: heading.to_vec(),
            namespace: namespace.to_string(),
            enums,
            structs,
            conditions: pack.conditions.clone(),
        }))
    }

    /// Compose the aggregate include file from the sorted packages
    pub fn aggregate_header(&self, sdk: &SdkFile, result: &SortResult<'_, EnginePackage>) -> String {
        let nl = self.config.lang.new_line.as_str();
        let mut out = String::new();
        let mut line = |text: &str| {
            out.push_str(text);
            out.push_str(nl);
        };

        let rule = format!("// {} \\\\", "-".repeat(39));
        line("#pragma once");
        line("");
        line(&rule);
        line(&format!(
            "// {:^39} \\\\",
            format!("Sdk Generated By ( {} )", self.config.generator_name)
        ));
        line(&rule);
        line(&format!(
            "// Name: {}, Version: {}",
            sdk.game_name.trim(),
            sdk.game_version
        ));
        line("");
        for header in STD_INCLUDES {
            line(&format!("#include <{}>", header));
        }
        line("");

        let mut forced: Vec<&str> = Vec::new();
        if !result.cycles.is_empty() {
            line("// # Dependency cycle headers");
            line(&format!(
                "// # (Sorted: {}, Cycle: {})",
                result.sorted.len(),
                result.cycles.len()
            ));
            line("");

            for (package, depend) in &result.cycles {
                line(&format!("// {} <-> {}", package.name, depend.name));
                if !forced.contains(&package.name.as_str()) {
                    line(&package_include(&package.name));
                    forced.push(&package.name);
                }
            }
            for (_, depend) in &result.cycles {
                if !forced.contains(&depend.name.as_str()) {
                    line(&package_include(&depend.name));
                    forced.push(&depend.name);
                }
            }

            line("");
            line("");
        }

        let remaining = |p: &&&EnginePackage| !forced.contains(&p.name.as_str());
        for package in result.sorted.iter().filter(|p| p.is_predefined).filter(remaining) {
            line(&package_include(&package.name));
        }
        for package in result.sorted.iter().filter(|p| !p.is_predefined).filter(remaining) {
            line(&package_include(&package.name));
        }

        out
    }

    /// Run the whole stage and write everything below `save_dir`
    pub fn generate(&self, sdk: &mut SdkFile, save_dir: &Path) -> Result<GenerationReport> {
        info!(
            "Generating SDK for {} ({} packages) into {:?}",
            sdk.game_name,
            sdk.packages.len(),
            save_dir
        );

        ensure_unique_names(&sdk.packages)?;
        self.prepare_model(sdk);
        std::fs::create_dir_all(save_dir)?;

        let heading = vec![
            format!("Name: {}", sdk.game_name),
            format!("Version: {}", sdk.game_version),
        ];
        let mut report = GenerationReport {
            packages: sdk.packages.len(),
            ..Default::default()
        };

        let total = sdk.packages.len();
        for (processed, pack) in sdk.packages.iter_mut().enumerate() {
            if let Some(decl) = self.build_package(pack, &heading, &sdk.namespace)? {
                debug!(
                    "{}: {} enums, {} structs",
                    decl.name,
                    decl.enums.len(),
                    decl.structs.len()
                );
                report.generated_packages += 1;
                report.enums += decl.enums.len();
                report.structs += decl.structs.len();

                for (name, content) in self.renderer.render(&decl)? {
                    report.written_files.push(write_file(save_dir, &name, &content)?);
                }
            }

            self.events.progress(pack.name.clone(), processed, total - processed);
        }

        self.events.status("Sort packages depend on dependencies");
        let result = sorter::sort(&sdk.packages);
        for (package, depend) in result.cycle_names() {
            debug!("Dependency cycle: {} <-> {}", package, depend);
        }

        let header = self.aggregate_header(sdk, &result);
        report
            .written_files
            .push(write_file(save_dir, &self.config.aggregate_file_name, &header)?);
        report.sorted_packages = result.sorted_names().into_iter().map(String::from).collect();
        report.cycles = result
            .cycle_names()
            .into_iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();

        info!(
            "Generation complete: {} packages written, {} enums, {} structs, {} cycle edge(s)",
            report.generated_packages,
            report.enums,
            report.structs,
            report.cycles.len()
        );

        Ok(report)
    }
}

impl<R> std::fmt::Debug for SdkGenerator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkGenerator")
            .field("config", &self.config)
            .field("events", &self.events)
            .finish()
    }
}

/// Every package owns its output file, so names must not repeat
fn ensure_unique_names(packages: &[EnginePackage]) -> Result<()> {
    let mut seen = HashSet::with_capacity(packages.len());
    for pack in packages {
        if !seen.insert(pack.name.as_str()) {
            return Err(Error::contract(&pack.name, "duplicate package name"));
        }
    }
    Ok(())
}

/// Write one generated file, creating parent directories as needed
fn write_file(save_dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = save_dir.join(name.replace('\\', "/"));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content)?;
    debug!("Wrote {:?}", path);
    Ok(path)
}
