//! Generator configuration

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Base type names that stand for the runtime's universal object root
pub const DEFAULT_SYNTHETIC_ROOTS: &[&str] = &["UObject", "Il2CppObject"];

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Renderer layout options
    pub lang: LangOptions,
    /// Extra type aliases merged over the built-in table
    pub type_aliases: IndexMap<String, String>,
    /// Base type names the preparer strips from the primary base slot
    pub synthetic_roots: Vec<String>,
    /// Derive package dependencies from type references
    pub infer_dependencies: bool,
    /// Name of the aggregate include file
    pub aggregate_file_name: String,
    /// Name printed in the aggregate file banner
    pub generator_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lang: LangOptions::default(),
            type_aliases: IndexMap::new(),
            synthetic_roots: DEFAULT_SYNTHETIC_ROOTS.iter().map(|s| s.to_string()).collect(),
            infer_dependencies: true,
            aggregate_file_name: "SDK.h".to_string(),
            generator_name: "UniSdk".to_string(),
        }
    }
}

/// Line ending used in generated files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewLine {
    Crlf,
    Lf,
}

impl NewLine {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewLine::Crlf => "\r\n",
            NewLine::Lf => "\n",
        }
    }
}

/// Renderer layout options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LangOptions {
    pub new_line: NewLine,
    /// Column at which inline comments start
    pub inline_comment_pad: usize,
    /// Column width reserved for member types
    pub field_type_pad: usize,
    /// Print `// Enums`, `// Structs` section banners
    pub print_section_name: bool,
}

impl Default for LangOptions {
    fn default() -> Self {
        Self {
            new_line: NewLine::Crlf,
            inline_comment_pad: 40,
            field_type_pad: 50,
            print_section_name: true,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| crate::Error::parse(e.to_string()))
    }

    /// Check values the generator cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        if self.aggregate_file_name.trim().is_empty() {
            return Err(crate::Error::config("aggregate_file_name is empty"));
        }
        if let Some((from, _)) = self.type_aliases.iter().find(|(k, v)| k.is_empty() || v.is_empty()) {
            return Err(crate::Error::config(format!("blank type alias entry `{}`", from)));
        }
        Ok(())
    }
}
