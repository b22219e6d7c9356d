//! Type spelling normalization
//!
//! Raw spellings coming from the analyzer look like `const Il2CppString*`,
//! `uint8_t_Array` or `System_Int32_Array_Array`. The normalizer isolates the
//! clear type core, peels array ranks off it, maps the element through the
//! primitive alias table and re-attaches the ranks as `[]` pairs.
//!
//! Both passes are idempotent, which is what allows the generator to run the
//! whole-model pass first and still normalize again while mapping.

use indexmap::IndexMap;
use rayon::prelude::*;
use unisdk_core::{Config, EngineFunction, EnginePackage, EngineStruct, Error, Result};

/// Array suffix convention used by the analyzer
pub const ARRAY_SUFFIX: &str = "_Array";

/// Target bracket-array suffix
pub const ARRAY_BRACKETS: &str = "[]";

const LEADING_QUALIFIERS: &[&str] = &["const", "volatile", "struct", "class", "enum"];

/// Built-in primitive alias table
pub fn default_aliases() -> IndexMap<String, String> {
    [
        ("int64_t", "long"),
        ("int32_t", "int"),
        ("int16_t", "short"),
        ("int8_t", "sbyte"),
        ("uint64_t", "ulong"),
        ("uint32_t", "uint"),
        ("uint16_t", "ushort"),
        ("uint8_t", "byte"),
        ("intptr_t", "IntPtr"),
        ("Il2CppString", "string"),
        ("Il2CppObject", "Object"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte range of the clear type core inside a raw spelling.
///
/// Returns an empty range when the spelling has no identifier at all.
pub fn clear_type_name_pos(ty: &str) -> (usize, usize) {
    let mut start = 0;
    loop {
        let rest = &ty[start..];
        let trimmed = rest.trim_start();
        start += rest.len() - trimmed.len();

        let keyword = LEADING_QUALIFIERS.iter().find(|kw| {
            trimmed.starts_with(*kw)
                && trimmed[kw.len()..].chars().next().map_or(false, char::is_whitespace)
        });
        match keyword {
            Some(kw) => start += kw.len(),
            None => break,
        }
    }

    // skip stray leading decoration such as `::`
    start += ty[start..]
        .char_indices()
        .find(|(_, c)| is_ident_char(*c))
        .map_or(ty.len() - start, |(i, _)| i);

    let mut end = ty.len();
    loop {
        let head = ty[start..end].trim_end_matches(|c: char| c.is_whitespace() || c == '*' || c == '&');
        let mut new_end = start + head.len();
        if head.ends_with("const") {
            let before = &head[..head.len() - "const".len()];
            if before.chars().last().map_or(false, |c| !is_ident_char(c)) {
                new_end = start + before.len();
            }
        }
        if new_end == end {
            break;
        }
        end = new_end;
    }

    let core = &ty[start..end];
    let tail = core
        .char_indices()
        .rev()
        .find(|(_, c)| is_ident_char(*c) || *c == ']' || *c == '>')
        .map_or(0, |(i, c)| i + c.len_utf8());
    end = start + tail;

    if end <= start {
        (start, start)
    } else {
        (start, end)
    }
}

/// Split a type core into its element spelling and array rank
pub fn split_array_rank(core: &str) -> (&str, usize) {
    let mut element = core;
    let mut rank = 0;
    loop {
        if let Some(stripped) = element.strip_suffix(ARRAY_BRACKETS) {
            element = stripped;
        } else if element.len() > ARRAY_SUFFIX.len() && element.ends_with(ARRAY_SUFFIX) {
            element = &element[..element.len() - ARRAY_SUFFIX.len()];
        } else {
            break;
        }
        rank += 1;
    }
    (element, rank)
}

/// Maps raw type spellings to C# spellings
#[derive(Debug, Clone)]
pub struct TypeNormalizer {
    aliases: IndexMap<String, String>,
}

impl Default for TypeNormalizer {
    fn default() -> Self {
        Self {
            aliases: default_aliases(),
        }
    }
}

impl TypeNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in table with `extra` entries merged over it.
    ///
    /// Rejects tables that would make normalization non-idempotent: decorated
    /// keys or targets, array-shaped targets, and targets that are themselves
    /// alias sources.
    pub fn with_aliases(extra: &IndexMap<String, String>) -> Result<Self> {
        let mut aliases = default_aliases();
        for (from, to) in extra {
            aliases.insert(from.clone(), to.clone());
        }

        for (from, to) in &aliases {
            if !is_bare_core(from) {
                return Err(Error::config(format!("type alias source `{}` is not a bare type name", from)));
            }
            if !is_bare_core(to) || split_array_rank(to).1 != 0 {
                return Err(Error::config(format!("type alias target `{}` is not a bare type name", to)));
            }
            if to != from && aliases.contains_key(to) {
                return Err(Error::config(format!(
                    "type alias `{}` -> `{}` chains into another alias",
                    from, to
                )));
            }
        }

        Ok(Self { aliases })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_aliases(&config.type_aliases)
    }

    pub fn aliases(&self) -> &IndexMap<String, String> {
        &self.aliases
    }

    /// Exact, case-sensitive alias lookup
    pub fn lang_type<'a>(&'a self, core: &'a str) -> &'a str {
        self.aliases.get(core).map_or(core, String::as_str)
    }

    /// Normalize a raw type spelling.
    ///
    /// With `preserve_qualifiers` the decoration around the core (`const`,
    /// `*`, `&`) is kept, otherwise only the rewritten core is returned.
    pub fn normalize(&self, raw: &str, preserve_qualifiers: bool) -> String {
        let (start, end) = clear_type_name_pos(raw);
        if start >= end {
            return raw.to_string();
        }

        let (element, rank) = split_array_rank(&raw[start..end]);
        let mapped = self.lang_type(element);

        let mut out = String::with_capacity(raw.len() + rank * ARRAY_BRACKETS.len());
        if preserve_qualifiers {
            out.push_str(&raw[..start]);
        }
        out.push_str(mapped);
        for _ in 0..rank {
            out.push_str(ARRAY_BRACKETS);
        }
        if preserve_qualifiers {
            out.push_str(&raw[end..]);
        }
        out
    }

    fn fix(&self, ty: &mut String) {
        let fixed = self.normalize(ty, false);
        if *ty != fixed {
            *ty = fixed;
        }
    }

    fn fix_function(&self, func: &mut EngineFunction) {
        for param in &mut func.parameters {
            self.fix(&mut param.type_name);
        }
    }

    fn fix_struct(&self, s: &mut EngineStruct) {
        for field in &mut s.fields {
            self.fix(&mut field.type_name);
        }
        for prop in &mut s.properties {
            self.fix(&mut prop.type_name);
        }
        for method in &mut s.methods {
            self.fix_function(method);
        }
    }

    /// Rewrite every type spelling of a package in place
    pub fn normalize_package(&self, pack: &mut EnginePackage) {
        for e in &mut pack.enums {
            self.fix(&mut e.type_name);
        }
        for s in &mut pack.structs {
            self.fix_struct(s);
        }
        for c in &mut pack.classes {
            self.fix_struct(&mut c.base);
        }
        for field in &mut pack.fields {
            self.fix(&mut field.type_name);
        }
        for func in &mut pack.functions {
            self.fix_function(func);
        }
    }

    /// One-time pass over the whole model; packages are independent
    pub fn normalize_all(&self, packages: &mut [EnginePackage]) {
        packages
            .par_iter_mut()
            .for_each(|pack| self.normalize_package(pack));
    }
}

fn is_bare_core(ty: &str) -> bool {
    !ty.is_empty() && clear_type_name_pos(ty) == (0, ty.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use unisdk_core::{EngineField, EngineItem, EngineParameter};

    #[test]
    fn test_primitive_aliases() {
        let n = TypeNormalizer::new();
        assert_eq!(n.normalize("int64_t", false), "long");
        assert_eq!(n.normalize("uint8_t", false), "byte");
        assert_eq!(n.normalize("intptr_t", false), "IntPtr");
        assert_eq!(n.normalize("Il2CppString*", false), "string");
        assert_eq!(n.normalize("Il2CppObject", false), "Object");
    }

    #[test]
    fn test_unknown_core_passes_through() {
        let n = TypeNormalizer::new();
        assert_eq!(n.normalize("PlayerController", false), "PlayerController");
        assert_eq!(n.normalize("List<int32_t>", false), "List<int32_t>");
        assert_eq!(n.normalize("INT32_T", false), "INT32_T");
        assert_eq!(n.normalize("int32_tx", false), "int32_tx");
    }

    #[test]
    fn test_array_suffix() {
        let n = TypeNormalizer::new();
        assert_eq!(n.normalize("Unknown_Array", false), "Unknown[]");
        assert_eq!(n.normalize("uint8_t_Array", false), "byte[]");
        assert_eq!(n.normalize("Foo_Array_Array", false), "Foo[][]");
        assert_eq!(n.normalize("_Array", false), "_Array");
        assert_eq!(n.normalize("Vector3_Array", true), "Vector3[]");
    }

    #[test]
    fn test_decoration_stripped_or_kept() {
        let n = TypeNormalizer::new();
        assert_eq!(n.normalize("const Il2CppString*", false), "string");
        assert_eq!(n.normalize("const Il2CppString*", true), "const string*");
        assert_eq!(n.normalize("struct Foo_Array&", true), "struct Foo[]&");
        assert_eq!(n.normalize("int32_t* const", true), "int* const");
        assert_eq!(n.normalize("constant_t", false), "constant_t");
        assert_eq!(n.normalize("", false), "");
        assert_eq!(n.normalize("**", false), "**");
    }

    #[test]
    fn test_clear_type_name_pos() {
        assert_eq!(clear_type_name_pos("Foo"), (0, 3));
        assert_eq!(clear_type_name_pos("const Foo*"), (6, 9));
        assert_eq!(clear_type_name_pos("  ::Ns::Foo&"), (4, 11));
        assert_eq!(clear_type_name_pos("Foo[] *"), (0, 5));
    }

    #[test]
    fn test_idempotent() {
        let n = TypeNormalizer::new();
        let inputs = [
            "int64_t",
            "Il2CppString*",
            "const uint16_t_Array*",
            "Foo_Array_Array",
            "Dictionary<int32_t, Il2CppString>",
            "struct Bar& ",
            "volatile int8_t",
            "",
            "&",
        ];
        for raw in inputs {
            for keep in [false, true] {
                let once = n.normalize(raw, keep);
                assert_eq!(n.normalize(&once, keep), once, "input {:?}", raw);
                assert!(!once.contains(ARRAY_SUFFIX));
            }
        }
    }

    #[test]
    fn test_alias_table_validation() {
        let mut extra = IndexMap::new();
        extra.insert("float32_t".to_string(), "float".to_string());
        let n = TypeNormalizer::with_aliases(&extra).unwrap();
        assert_eq!(n.normalize("float32_t_Array", false), "float[]");

        let mut chained = IndexMap::new();
        chained.insert("myint".to_string(), "int32_t".to_string());
        assert!(TypeNormalizer::with_aliases(&chained).is_err());

        let mut decorated = IndexMap::new();
        decorated.insert("handle_t".to_string(), "void*".to_string());
        assert!(TypeNormalizer::with_aliases(&decorated).is_err());

        let mut array_target = IndexMap::new();
        array_target.insert("bytes_t".to_string(), "byte_Array".to_string());
        assert!(TypeNormalizer::with_aliases(&array_target).is_err());
    }

    #[test]
    fn test_normalize_package_in_place() {
        let mut s = EngineStruct::default();
        s.fields.push(EngineField {
            item: EngineItem::named("data"),
            type_name: "uint8_t_Array".into(),
            ..Default::default()
        });
        let mut method = EngineFunction::default();
        method.parameters.push(EngineParameter {
            item: EngineItem::named("ret"),
            type_name: "Il2CppString*".into(),
            is_return: true,
            ..Default::default()
        });
        s.methods.push(method);

        let mut pack = EnginePackage::new("Core");
        pack.structs.push(s);
        let mut packs = vec![pack];
        TypeNormalizer::new().normalize_all(&mut packs);

        let s = &packs[0].structs[0];
        assert_eq!(s.fields[0].type_name, "byte[]");
        assert_eq!(s.methods[0].parameters[0].type_name, "string");
    }
}
