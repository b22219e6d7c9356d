//! Text renderers for prepared packages

use crate::types::*;
use indexmap::IndexMap;
use unisdk_core::config::LangOptions;
use unisdk_core::{Error, Result};

/// Turns one prepared package into named file contents
pub trait PackageRenderer {
    fn render(&self, package: &CSharpPackage) -> Result<IndexMap<String, String>>;
}

/// Relative path of a package's source file
pub fn package_file_name(package: &str) -> String {
    format!("SDK/{}_Package.cs", package)
}

/// Indentation-aware line buffer
struct CodeWriter {
    lines: Vec<String>,
    indent: usize,
}

impl CodeWriter {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            indent: 0,
        }
    }

    fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{}", "    ".repeat(self.indent), text));
        }
    }

    fn blank(&mut self) {
        if self.lines.last().map_or(false, |l| !l.is_empty()) {
            self.lines.push(String::new());
        }
    }

    fn open(&mut self) {
        self.line("{");
        self.indent += 1;
    }

    fn close(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.line("}");
    }

    fn comments(&mut self, comments: &[String]) {
        for c in comments {
            self.line(format!("// {}", c));
        }
    }

    fn trim_trailing_blanks(&mut self) {
        while self.lines.last().map_or(false, |l| l.is_empty()) {
            self.lines.pop();
        }
    }

    fn finish(mut self, new_line: &str) -> String {
        self.trim_trailing_blanks();
        let mut out = self.lines.join(new_line);
        out.push_str(new_line);
        out
    }
}

/// C# source renderer
#[derive(Debug, Clone, Default)]
pub struct CSharpRenderer {
    options: LangOptions,
}

impl CSharpRenderer {
    pub fn new(options: LangOptions) -> Self {
        Self { options }
    }

    fn with_inline(&self, decl: String, inline: &str) -> String {
        if inline.is_empty() {
            decl
        } else {
            format!("{:<w$} // {}", decl, inline, w = self.options.inline_comment_pad)
        }
    }

    fn pad_type(&self, ty: String) -> String {
        format!("{:<w$}", ty, w = self.options.field_type_pad)
    }

    fn section(&self, w: &mut CodeWriter, name: &str) {
        if self.options.print_section_name {
            w.line(format!("// {}", name));
        }
    }

    fn open_conditions(w: &mut CodeWriter, conditions: &[String]) {
        if !conditions.is_empty() {
            w.line(format!("#if {}", conditions.join(" && ")));
        }
    }

    fn close_conditions(w: &mut CodeWriter, conditions: &[String]) {
        if !conditions.is_empty() {
            w.line("#endif");
        }
    }

    fn attributes(&self, w: &mut CodeWriter, attrs: &[CSharpAttribute]) {
        for attr in attrs {
            Self::open_conditions(w, &attr.conditions);
            let decl = if attr.arguments.is_empty() {
                format!("[{}]", attr.name)
            } else {
                format!("[{}({})]", attr.name, attr.arguments.join(", "))
            };
            w.line(self.with_inline(decl, &attr.inline_comment));
            Self::close_conditions(w, &attr.conditions);
        }
    }

    fn enum_literal(value: i64, hex: bool) -> String {
        if hex && value >= 0 {
            format!("0x{:X}", value)
        } else {
            value.to_string()
        }
    }

    fn write_enum(&self, w: &mut CodeWriter, e: &CSharpEnum) {
        Self::open_conditions(w, &e.conditions);
        w.comments(&e.comments);
        self.attributes(w, &e.attributes);
        if e.type_name.is_empty() {
            w.line(format!("{} enum {}", e.access, e.name));
        } else {
            w.line(format!("{} enum {} : {}", e.access, e.name, e.type_name));
        }
        w.open();
        let last = e.values.len().saturating_sub(1);
        for (i, v) in e.values.iter().enumerate() {
            let sep = if i == last { "" } else { "," };
            w.line(format!("{} = {}{}", v.name, Self::enum_literal(v.value, e.hex_values), sep));
        }
        w.close();
        Self::close_conditions(w, &e.conditions);
    }

    fn write_field(&self, w: &mut CodeWriter, f: &CSharpField) {
        Self::open_conditions(w, &f.conditions);
        w.comments(&f.comments);
        self.attributes(w, &f.attributes);

        let mut prefix = f.access.clone();
        if f.is_const {
            prefix.push_str(" const");
        } else {
            if f.is_static {
                prefix.push_str(" static");
            }
            if f.is_read_only {
                prefix.push_str(" readonly");
            }
        }
        if f.is_volatile {
            prefix.push_str(" volatile");
        }

        let mut ty = f.type_name.clone();
        if f.is_array && !ty.ends_with("[]") {
            ty.push_str("[]");
        }
        let value = f.value.as_ref().map(|v| format!(" = {}", v)).unwrap_or_default();
        let decl = format!("{} {}{};", self.pad_type(format!("{} {}", prefix, ty)), f.name, value);
        w.line(self.with_inline(decl, &f.inline_comment));
        Self::close_conditions(w, &f.conditions);
    }

    fn write_property(&self, w: &mut CodeWriter, p: &CSharpProperty) {
        Self::open_conditions(w, &p.conditions);
        w.comments(&p.comments);
        self.attributes(w, &p.attributes);

        let mut prefix = p.access.clone();
        for (set, word) in [
            (p.is_static, " static"),
            (p.is_abstract, " abstract"),
            (p.is_override, " override"),
            (p.is_virtual, " virtual"),
        ] {
            if set {
                prefix.push_str(word);
            }
        }

        let mut ty = p.type_name.clone();
        if p.is_array && !ty.ends_with("[]") {
            ty.push_str("[]");
        }
        let mut accessors = String::new();
        if p.have_getter {
            accessors.push_str(" get;");
        }
        if p.have_setter {
            accessors.push_str(" set;");
        }
        let mut decl = format!("{} {} {{{} }}", self.pad_type(format!("{} {}", prefix, ty)), p.name, accessors);
        if let Some(v) = &p.value {
            decl.push_str(&format!(" = {};", v));
        }
        w.line(self.with_inline(decl, &p.inline_comment));
        Self::close_conditions(w, &p.conditions);
    }

    fn parameter(p: &CSharpParameter) -> String {
        let mut out = String::new();
        for attr in &p.attributes {
            out.push_str(&format!("[{}] ", attr.name));
        }
        if p.is_ref {
            out.push_str("ref ");
        }
        out.push_str(&format!("{} {}", p.type_name, p.name));
        out
    }

    fn write_function(&self, w: &mut CodeWriter, f: &CSharpFunction, in_interface: bool) {
        Self::open_conditions(w, &f.conditions);
        w.comments(&f.comments);
        self.attributes(w, &f.attributes);

        let mut prefix = if in_interface { String::new() } else { format!("{} ", f.access) };
        for (set, word) in [
            (f.is_static, "static "),
            (f.is_abstract && !in_interface, "abstract "),
            (f.is_override && !in_interface, "override "),
            (f.is_virtual && !in_interface, "virtual "),
            (f.is_extern, "extern "),
            (f.is_unsafe, "unsafe "),
            (f.is_async, "async "),
        ] {
            if set {
                prefix.push_str(word);
            }
        }

        let generics = if f.generic_params.is_empty() {
            String::new()
        } else {
            format!("<{}>", f.generic_params.join(", "))
        };
        let params = f.params.iter().map(Self::parameter).collect::<Vec<_>>().join(", ");
        let signature = format!("{}{} {}{}({})", prefix, f.type_name, f.name, generics, params);

        if in_interface || f.is_abstract || f.is_extern {
            w.line(format!("{};", signature));
        } else if f.body.is_empty() {
            w.line(format!("{} {{ }}", signature));
        } else {
            w.line(signature);
            w.open();
            for body_line in &f.body {
                w.line(body_line);
            }
            w.close();
        }
        Self::close_conditions(w, &f.conditions);
    }

    fn write_struct(&self, w: &mut CodeWriter, s: &CSharpStruct) {
        Self::open_conditions(w, &s.conditions);
        w.comments(&s.comments);
        self.attributes(w, &s.attributes);

        let mut header = s.access.clone();
        for (set, word) in [
            (s.is_static, " static"),
            (s.is_abstract && !s.kind.is_interface(), " abstract"),
            (s.is_sealed && s.kind == StructKind::ReferenceType, " sealed"),
            (s.is_read_only && s.kind.is_value_type(), " readonly"),
        ] {
            if set {
                header.push_str(word);
            }
        }
        header.push_str(&format!(" {} {}", s.kind.keyword(), s.name));
        if !s.generic_params.is_empty() {
            header.push_str(&format!("<{}>", s.generic_params.join(", ")));
        }

        let mut bases: Vec<&str> = Vec::new();
        if !s.super_name.is_empty() {
            bases.push(&s.super_name);
        }
        bases.extend(s.interfaces.iter().map(String::as_str));
        if !bases.is_empty() {
            header.push_str(&format!(" : {}", bases.join(", ")));
        }

        w.line(self.with_inline(header, &s.inline_comment));
        w.open();

        if !s.fields.is_empty() {
            self.section(w, "Fields");
            for f in &s.fields {
                self.write_field(w, f);
            }
            w.blank();
        }
        if !s.properties.is_empty() {
            self.section(w, "Properties");
            for p in &s.properties {
                self.write_property(w, p);
            }
            w.blank();
        }
        if !s.methods.is_empty() {
            self.section(w, "Functions");
            for (i, m) in s.methods.iter().enumerate() {
                if i > 0 {
                    w.blank();
                }
                self.write_function(w, m, s.kind.is_interface());
            }
        }
        w.trim_trailing_blanks();

        w.close();
        Self::close_conditions(w, &s.conditions);
    }

    /// Render a whole package as one source file
    pub fn render_package(&self, package: &CSharpPackage) -> Result<String> {
        if package.name.trim().is_empty() {
            return Err(Error::render("package has no name"));
        }

        let mut w = CodeWriter::new();
        w.comments(&package.heading_comment);
        w.blank();
        Self::open_conditions(&mut w, &package.conditions);

        let namespaced = !package.namespace.is_empty();
        if namespaced {
            w.line(format!("namespace {}", package.namespace));
            w.open();
        }

        if !package.enums.is_empty() {
            self.section(&mut w, "Enums");
            for e in &package.enums {
                self.write_enum(&mut w, e);
                w.blank();
            }
        }
        if !package.structs.is_empty() {
            self.section(&mut w, "Structs");
            for s in &package.structs {
                self.write_struct(&mut w, s);
                w.blank();
            }
        }
        w.trim_trailing_blanks();

        if namespaced {
            w.close();
        }
        Self::close_conditions(&mut w, &package.conditions);

        Ok(w.finish(self.options.new_line.as_str()))
    }
}

impl PackageRenderer for CSharpRenderer {
    fn render(&self, package: &CSharpPackage) -> Result<IndexMap<String, String>> {
        let mut files = IndexMap::new();
        files.insert(package_file_name(&package.name), self.render_package(package)?);
        Ok(files)
    }
}
