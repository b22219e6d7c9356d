//! C# SDK output stage
//!
//! Takes a reflected engine model, normalizes its type spellings, maps every
//! entity to a renderer-ready declaration, writes one source file per package
//! and finishes with an aggregate include file ordered by package dependencies.

pub mod lang;
pub mod types;
pub mod prepare;
pub mod mapper;
pub mod sorter;
pub mod deps;
pub mod output;
pub mod generator;

pub use generator::{GenerationReport, SdkGenerator};
pub use lang::TypeNormalizer;
pub use mapper::DeclMapper;
pub use output::{CSharpRenderer, PackageRenderer};
pub use prepare::StructPreparer;
pub use sorter::{sort, PackageNode, SortResult};
pub use types::*;

use std::path::Path;
use unisdk_core::{Config, Result, SdkFile};

/// Load a model file and generate the SDK with the default renderer
pub fn generate(model_path: &Path, save_dir: &Path, config: Config) -> Result<GenerationReport> {
    let mut sdk = SdkFile::load(model_path)?;
    SdkGenerator::new(config)?.generate(&mut sdk, save_dir)
}
