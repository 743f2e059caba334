//! Universal Code Entity model
//!
//! Language-agnostic representation of the structure of one source file. Every
//! entity is built once per transform call and handed to the caller; nothing in
//! this crate mutates an entity after it is returned.
//!
//! Field names serialize in camelCase. Optional fields use `None` for "absent
//! in source": a `None` return type means untyped or inferred, not "returns
//! nothing".

use crate::language::SupportedLanguage;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Recognized modifier keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Export,
    Async,
    Static,
    Abstract,
    Readonly,
    Public,
    Private,
    Protected,
    Override,
    Final,
    Const,
}

impl Modifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Export => "export",
            Modifier::Async => "async",
            Modifier::Static => "static",
            Modifier::Abstract => "abstract",
            Modifier::Readonly => "readonly",
            Modifier::Public => "public",
            Modifier::Private => "private",
            Modifier::Protected => "protected",
            Modifier::Override => "override",
            Modifier::Final => "final",
            Modifier::Const => "const",
        }
    }

    /// Map a source keyword to a modifier.
    ///
    /// Keywords from languages without an exact counterpart map to the
    /// closest equivalent (`sealed` → final, `val` → readonly).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let modifier = match keyword {
            "export" | "pub" => Modifier::Export,
            "async" | "suspend" => Modifier::Async,
            "static" => Modifier::Static,
            "abstract" => Modifier::Abstract,
            "readonly" | "val" => Modifier::Readonly,
            "public" | "open" => Modifier::Public,
            "private" | "fileprivate" => Modifier::Private,
            "protected" => Modifier::Protected,
            "override" => Modifier::Override,
            "final" | "sealed" => Modifier::Final,
            "const" | "constexpr" => Modifier::Const,
            _ => return None,
        };
        Some(modifier)
    }
}

impl std::fmt::Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed, ordered set of modifiers; serializes as a list of keywords
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modifiers(BTreeSet<Modifier>);

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, modifier: Modifier) -> bool {
        self.0.insert(modifier)
    }

    pub fn with(mut self, modifier: Modifier) -> Self {
        self.0.insert(modifier);
        self
    }

    pub fn contains(&self, modifier: Modifier) -> bool {
        self.0.contains(&modifier)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Modifier> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Modifier> for Modifiers {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Modifier> for Modifiers {
    fn extend<I: IntoIterator<Item = Modifier>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

/// Member visibility.
///
/// Inferred from keywords where the language has them and from naming
/// conventions elsewhere (Go capitalization, Python underscores). The
/// convention-based cases are a heuristic, not a guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
    /// Package/assembly/module scoped (Java package-private, Kotlin and C# `internal`)
    Internal,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Internal => "internal",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "public" | "pub" | "open" => Some(Visibility::Public),
            "private" | "fileprivate" => Some(Visibility::Private),
            "protected" => Some(Visibility::Protected),
            "internal" => Some(Visibility::Internal),
            _ => None,
        }
    }

    pub fn as_modifier(&self) -> Option<Modifier> {
        match self {
            Visibility::Public => Some(Modifier::Public),
            Visibility::Private => Some(Modifier::Private),
            Visibility::Protected => Some(Modifier::Protected),
            Visibility::Internal => None,
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UceLocation {
    pub file_path: String,
    /// 1-indexed
    pub start_line: usize,
    /// 1-indexed, inclusive
    pub end_line: usize,
    /// 0-indexed byte column
    pub start_column: usize,
    pub end_column: usize,
}

impl UceLocation {
    pub fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    pub fn contains_line(&self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UceParameter {
    pub name: String,
    /// `None` when the parameter is untyped
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    pub is_optional: bool,
    /// Variadic/rest parameter; expected last in its list
    pub is_rest: bool,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UceFunction {
    pub name: String,
    pub params: Vec<UceParameter>,
    /// `None` means inferred or not annotated
    pub return_type: Option<String>,
    pub type_params: Vec<String>,
    /// Source text of the whole declaration (possibly truncated by options)
    pub body: String,
    pub location: UceLocation,
    pub modifiers: Modifiers,
    pub doc_comment: Option<String>,
    pub signature: String,
    pub complexity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UceMethod {
    #[serde(flatten)]
    pub function: UceFunction,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_getter: bool,
    pub is_setter: bool,
}

impl UceMethod {
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Struct,
    Enum,
    /// Singleton declarations (Kotlin/Scala `object`)
    Object,
    Record,
    /// Namespacing containers (Ruby, Elixir and Lua modules)
    Module,
    /// Methods attached to a type declared elsewhere
    Extension,
}

impl ClassKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Struct => "struct",
            ClassKind::Enum => "enum",
            ClassKind::Object => "object",
            ClassKind::Record => "record",
            ClassKind::Module => "module",
            ClassKind::Extension => "extension",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UceProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_readonly: bool,
    pub is_optional: bool,
    pub initializer: Option<String>,
    pub location: UceLocation,
    pub doc_comment: Option<String>,
}

/// Class-like declaration. `extends` holds at most one supertype; a class
/// with no members is still valid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UceClass {
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<String>,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub methods: Vec<UceMethod>,
    pub properties: Vec<UceProperty>,
    pub constructor: Option<UceMethod>,
    pub location: UceLocation,
    pub modifiers: Modifiers,
    pub doc_comment: Option<String>,
    pub is_abstract: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UceInterface {
    pub name: String,
    pub type_params: Vec<String>,
    pub extends: Vec<String>,
    pub properties: Vec<UceProperty>,
    pub methods: Vec<UceMethod>,
    pub location: UceLocation,
    pub modifiers: Modifiers,
    pub doc_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UceTypeAlias {
    pub name: String,
    pub type_params: Vec<String>,
    pub aliased_type: String,
    pub location: UceLocation,
    pub modifiers: Modifiers,
    pub doc_comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Const,
    Let,
    #[default]
    Var,
    Static,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UceVariable {
    pub name: String,
    pub kind: VariableKind,
    #[serde(rename = "type")]
    pub var_type: Option<String>,
    pub initializer: Option<String>,
    pub location: UceLocation,
    pub modifiers: Modifiers,
    pub doc_comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecifierKind {
    Default,
    Named,
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSpecifier {
    pub local: String,
    pub imported: String,
    #[serde(rename = "type")]
    pub kind: SpecifierKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UceImport {
    pub source: String,
    pub specifiers: Vec<ImportSpecifier>,
    pub is_type_only: bool,
    /// Imported only for its side effects (`import "./polyfill"`)
    pub is_side_effect: bool,
    pub location: UceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportKind {
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "named")]
    Named,
    #[serde(rename = "namespace")]
    Namespace,
    #[serde(rename = "re-export")]
    ReExport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UceExport {
    pub name: String,
    pub local_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: ExportKind,
    /// Module re-exported from, if any
    pub source: Option<String>,
    pub is_type_only: bool,
    pub location: UceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UceParseError {
    pub message: String,
    pub location: UceLocation,
    pub severity: Severity,
}

/// Aggregate root: everything extracted from one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UceFile {
    pub file_path: String,
    pub language: SupportedLanguage,
    pub functions: Vec<UceFunction>,
    pub classes: Vec<UceClass>,
    pub interfaces: Vec<UceInterface>,
    pub type_aliases: Vec<UceTypeAlias>,
    pub variables: Vec<UceVariable>,
    pub imports: Vec<UceImport>,
    pub exports: Vec<UceExport>,
    pub errors: Vec<UceParseError>,
}

/// Kind tag used in entity summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Function,
    Method,
    Class,
    Interface,
    Type,
    Variable,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Function => "function",
            EntityKind::Method => "method",
            EntityKind::Class => "class",
            EntityKind::Interface => "interface",
            EntityKind::Type => "type",
            EntityKind::Variable => "variable",
        }
    }
}

/// Lightweight entity info for triviality and documentation heuristics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySummary {
    pub name: String,
    pub kind: EntityKind,
    pub file_path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub signature: Option<String>,
    pub doc_comment: Option<String>,
    pub is_exported: bool,
}

impl EntitySummary {
    pub fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

impl UceFile {
    pub fn new(file_path: impl Into<String>, language: SupportedLanguage) -> Self {
        Self {
            file_path: file_path.into(),
            language,
            functions: Vec::new(),
            classes: Vec::new(),
            interfaces: Vec::new(),
            type_aliases: Vec::new(),
            variables: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Total number of top-level entities (methods counted with their class)
    pub fn entity_count(&self) -> usize {
        self.functions.len()
            + self.classes.len()
            + self.interfaces.len()
            + self.type_aliases.len()
            + self.variables.len()
    }

    pub fn find_function(&self, name: &str) -> Option<&UceFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn find_class(&self, name: &str) -> Option<&UceClass> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn find_interface(&self, name: &str) -> Option<&UceInterface> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    /// Flatten the file into summaries, methods named `Type.method`
    pub fn entity_summaries(&self) -> Vec<EntitySummary> {
        let exported: HashSet<&str> = self
            .exports
            .iter()
            .filter(|e| e.source.is_none())
            .map(|e| e.local_name.as_deref().unwrap_or(&e.name))
            .collect();
        let is_exported =
            |name: &str, modifiers: &Modifiers| modifiers.contains(Modifier::Export) || exported.contains(name);

        let summary = |name: String, kind, location: &UceLocation, signature: Option<&str>, doc: &Option<String>, exported| {
            EntitySummary {
                name,
                kind,
                file_path: self.file_path.clone(),
                start_line: location.start_line,
                end_line: location.end_line,
                signature: signature.map(str::to_string),
                doc_comment: doc.clone(),
                is_exported: exported,
            }
        };

        let mut out = Vec::new();
        for f in &self.functions {
            out.push(summary(
                f.name.clone(),
                EntityKind::Function,
                &f.location,
                Some(f.signature.as_str()),
                &f.doc_comment,
                is_exported(&f.name, &f.modifiers),
            ));
        }
        for c in &self.classes {
            let class_exported = is_exported(&c.name, &c.modifiers);
            out.push(summary(
                c.name.clone(),
                EntityKind::Class,
                &c.location,
                None,
                &c.doc_comment,
                class_exported,
            ));
            for m in c.constructor.iter().chain(&c.methods) {
                out.push(summary(
                    format!("{}.{}", c.name, m.name()),
                    EntityKind::Method,
                    &m.function.location,
                    Some(m.function.signature.as_str()),
                    &m.function.doc_comment,
                    class_exported && m.visibility == Visibility::Public,
                ));
            }
        }
        for i in &self.interfaces {
            out.push(summary(
                i.name.clone(),
                EntityKind::Interface,
                &i.location,
                None,
                &i.doc_comment,
                is_exported(&i.name, &i.modifiers),
            ));
        }
        for t in &self.type_aliases {
            out.push(summary(
                t.name.clone(),
                EntityKind::Type,
                &t.location,
                None,
                &t.doc_comment,
                is_exported(&t.name, &t.modifiers),
            ));
        }
        for v in &self.variables {
            out.push(summary(
                v.name.clone(),
                EntityKind::Variable,
                &v.location,
                None,
                &v.doc_comment,
                is_exported(&v.name, &v.modifiers),
            ));
        }
        out
    }
}
