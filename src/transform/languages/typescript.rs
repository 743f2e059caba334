//! TypeScript, TSX, JavaScript and JSX

use crate::transform::helpers::{
    Cx, child_of_kind, children, clean_type, descendants_of_kind, has_token, method, module_level,
    named_children, unquote, visibility_from,
};
use crate::transform::kinds::{NodeKinds, node_kinds};
use crate::transform::strategy::{LanguageStrategy, class_body};
use crate::language::SupportedLanguage;
use crate::uce::{
    ClassKind, ExportKind, ImportSpecifier, Modifier, Modifiers, SpecifierKind, UceClass, UceExport, UceFunction,
    UceImport, UceInterface, UceMethod, UceProperty, UceVariable, VariableKind, Visibility,
};
use tree_sitter::Node;

/// Values that make a binding a function
const FUNCTION_VALUES: &[&str] = &["arrow_function", "function_expression", "function", "generator_function"];

const PATTERN_NAMES: &[&str] = &["identifier", "shorthand_property_identifier_pattern"];

pub struct TypeScriptStrategy;

fn is_exported(node: Node) -> bool {
    node.parent().is_some_and(|p| p.kind() == "export_statement")
}

fn declaration_modifiers(cx: &Cx, node: Node) -> Modifiers {
    let mut mods = cx.modifiers(node);
    if is_exported(node) {
        mods.insert(Modifier::Export);
    }
    mods
}

fn declarators<'t>(decl: Node<'t>) -> Vec<Node<'t>> {
    named_children(decl)
        .into_iter()
        .filter(|c| c.kind() == "variable_declarator")
        .collect()
}

fn variable_kind(cx: &Cx, decl: Node) -> VariableKind {
    match children(decl).first().map(|c| cx.text(*c)) {
        Some("const") => VariableKind::Const,
        Some("let") => VariableKind::Let,
        _ => VariableKind::Var,
    }
}

/// `require("x")` call inside a declarator value
fn required_module(cx: &Cx, value: Node) -> Option<String> {
    if value.kind() != "call_expression" {
        return None;
    }
    let function = value.child_by_field_name("function")?;
    if cx.text(function) != "require" {
        return None;
    }
    let args = value.child_by_field_name("arguments")?;
    let first = named_children(args).into_iter().next()?;
    (first.kind() == "string").then(|| unquote(cx.text(first)))
}

/// Names bound by a declarator's left-hand side
fn bound_names(cx: &Cx, declarator: Node) -> Vec<String> {
    let Some(name) = declarator.child_by_field_name("name") else {
        return Vec::new();
    };
    if name.kind() == "identifier" {
        return vec![cx.text(name).to_string()];
    }
    descendants_of_kind(name, PATTERN_NAMES, &[])
        .into_iter()
        .map(|n| cx.text(n).to_string())
        .collect()
}

impl TypeScriptStrategy {
    /// A top-level `const f = () => {}` promoted to a function
    fn promoted(&self, cx: &Cx, decl: Node, declarator: Node, value: Node) -> Option<UceFunction> {
        let name_node = declarator.child_by_field_name("name")?;
        if name_node.kind() != "identifier" {
            return None;
        }
        let mut parts = cx.fn_parts(value);
        if parts.params.is_empty() {
            if let Some(single) = value.child_by_field_name("parameter") {
                parts.params = cx.param(single);
            }
        }
        parts.modifiers.extend(declaration_modifiers(cx, decl).iter());
        if variable_kind(cx, decl) == VariableKind::Const {
            parts.modifiers.insert(Modifier::Const);
        }
        Some(cx.function(decl, cx.text(name_node).to_string(), parts))
    }

    fn member(&self, cx: &Cx, node: Node) -> Option<UceMethod> {
        let name = cx.name(node)?;
        let mut parts = cx.fn_parts(node);
        if node.kind() == "abstract_method_signature" {
            parts.modifiers.insert(Modifier::Abstract);
        }
        let private_name = node
            .child_by_field_name("name")
            .is_some_and(|n| n.kind() == "private_property_identifier");
        let default = if private_name { Visibility::Private } else { Visibility::Public };
        let visibility = visibility_from(&parts.modifiers, default);

        let function = cx.function(node, name, parts);
        let mut m = method(function, visibility);
        m.is_getter = has_token(node, "get");
        m.is_setter = has_token(node, "set");
        Some(m)
    }

    fn field(&self, cx: &Cx, node: Node) -> Option<UceProperty> {
        let name_node = node
            .child_by_field_name("name")
            .or_else(|| node.child_by_field_name("property"))?;
        let name = cx.text(name_node).trim().to_string();
        if name.is_empty() {
            return None;
        }
        let mut prop = cx.property(
            node,
            name,
            node.child_by_field_name("type").map(|t| clean_type(cx.text(t))),
            if name_node.kind() == "private_property_identifier" {
                Visibility::Private
            } else {
                Visibility::Public
            },
        );
        prop.is_optional = has_token(node, "?");
        prop.initializer = cx.field_text(node, "value");
        Some(prop)
    }

    fn enum_class(&self, cx: &Cx, node: Node, name: String) -> UceClass {
        let properties = class_body(node)
            .map(|body| {
                named_children(body)
                    .into_iter()
                    .filter_map(|member| {
                        let (name, initializer) = match member.kind() {
                            "enum_assignment" => (cx.field_text(member, "name")?, cx.field_text(member, "value")),
                            "property_identifier" | "string" => (unquote(cx.text(member)), None),
                            _ => return None,
                        };
                        let mut prop = cx.property(member, name, None, Visibility::Public);
                        prop.is_static = true;
                        prop.is_readonly = true;
                        prop.initializer = initializer;
                        Some(prop)
                    })
                    .collect()
            })
            .unwrap_or_default();
        UceClass {
            name,
            kind: ClassKind::Enum,
            properties,
            location: cx.location(node),
            modifiers: declaration_modifiers(cx, node),
            doc_comment: cx.doc(node),
            ..Default::default()
        }
    }
}

impl LanguageStrategy for TypeScriptStrategy {
    fn kinds(&self) -> &'static NodeKinds {
        node_kinds(SupportedLanguage::TypeScript)
    }

    fn extract_functions(&self, cx: &Cx, root: Node) -> Vec<UceFunction> {
        let kinds = self.kinds();
        let mut out = Vec::new();
        for node in module_level(root, kinds.functions, kinds.wrappers) {
            match node.kind() {
                "lexical_declaration" | "variable_declaration" => {
                    for declarator in declarators(node) {
                        let Some(value) = declarator.child_by_field_name("value") else {
                            continue;
                        };
                        if FUNCTION_VALUES.contains(&value.kind()) {
                            out.extend(self.promoted(cx, node, declarator, value));
                        }
                    }
                }
                _ => out.extend(self.parse_function(cx, node)),
            }
        }
        out
    }

    fn parse_function(&self, cx: &Cx, node: Node) -> Option<UceFunction> {
        let name = cx.name(node)?;
        let mut parts = cx.fn_parts(node);
        parts.modifiers.extend(declaration_modifiers(cx, node).iter());
        Some(cx.function(node, name, parts))
    }

    fn parse_class(&self, cx: &Cx, node: Node) -> Option<UceClass> {
        let name = cx.name(node)?;
        if node.kind() == "enum_declaration" {
            return Some(self.enum_class(cx, node, name));
        }

        let mut extends = None;
        let mut implements = Vec::new();
        if let Some(heritage) = child_of_kind(node, &["class_heritage"]) {
            for clause in named_children(heritage) {
                match clause.kind() {
                    "extends_clause" => {
                        extends = clause
                            .child_by_field_name("value")
                            .or_else(|| named_children(clause).into_iter().next())
                            .map(|v| cx.text(v).to_string());
                    }
                    "implements_clause" => {
                        implements.extend(named_children(clause).into_iter().map(|t| cx.text(t).to_string()));
                    }
                    // JavaScript: `class A extends B` has the expression directly
                    _ if extends.is_none() => extends = Some(cx.text(clause).to_string()),
                    _ => {}
                }
            }
        }

        let mut methods = Vec::new();
        let mut properties = Vec::new();
        let mut constructor = None;
        for member in class_body(node).map(named_children).unwrap_or_default() {
            match member.kind() {
                "method_definition" | "method_signature" | "abstract_method_signature" => {
                    let Some(m) = self.member(cx, member) else { continue };
                    if m.name() == "constructor" {
                        // TS parameter properties: `constructor(private x: number)`
                        if let Some(params) = cx.params_node(member) {
                            for p in named_children(params) {
                                if child_of_kind(p, &["accessibility_modifier", "readonly"]).is_some() {
                                    let Some(pname) = cx.param(p).into_iter().next() else { continue };
                                    let mut prop = cx.property(p, pname.name, pname.param_type, Visibility::Public);
                                    prop.is_optional = pname.is_optional;
                                    properties.push(prop);
                                }
                            }
                        }
                        if constructor.is_none() {
                            constructor = Some(m);
                        }
                    } else {
                        methods.push(m);
                    }
                }
                "public_field_definition" | "field_definition" => {
                    let value = member.child_by_field_name("value");
                    if let Some(value) = value.filter(|v| FUNCTION_VALUES.contains(&v.kind())) {
                        let Some(name) = self.field(cx, member).map(|p| p.name) else { continue };
                        let mut parts = cx.fn_parts(value);
                        parts.modifiers.extend(cx.modifiers(member).iter());
                        let visibility = visibility_from(&parts.modifiers, Visibility::Public);
                        methods.push(method(cx.function(member, name, parts), visibility));
                    } else {
                        properties.extend(self.field(cx, member));
                    }
                }
                _ => {}
            }
        }

        let mut modifiers = declaration_modifiers(cx, node);
        if node.kind() == "abstract_class_declaration" {
            modifiers.insert(Modifier::Abstract);
        }
        Some(UceClass {
            name,
            kind: ClassKind::Class,
            type_params: cx.type_params(node),
            extends,
            implements,
            methods,
            properties,
            constructor,
            location: cx.location(node),
            doc_comment: cx.doc(node),
            is_abstract: modifiers.contains(Modifier::Abstract),
            modifiers,
        })
    }

    fn parse_interface(&self, cx: &Cx, node: Node) -> Option<UceInterface> {
        let name = cx.name(node)?;
        let extends = child_of_kind(node, &["extends_type_clause"])
            .map(|clause| named_children(clause).into_iter().map(|t| cx.text(t).to_string()).collect())
            .unwrap_or_default();

        let mut properties = Vec::new();
        let mut methods = Vec::new();
        for member in class_body(node).map(named_children).unwrap_or_default() {
            match member.kind() {
                "property_signature" => {
                    if let Some(mut prop) = self.field(cx, member) {
                        prop.is_readonly = has_token(member, "readonly");
                        properties.push(prop);
                    }
                }
                "method_signature" => methods.extend(self.member(cx, member)),
                _ => {}
            }
        }

        Some(UceInterface {
            name,
            type_params: cx.type_params(node),
            extends,
            properties,
            methods,
            location: cx.location(node),
            modifiers: declaration_modifiers(cx, node),
            doc_comment: cx.doc(node),
        })
    }

    fn parse_type_alias(&self, cx: &Cx, node: Node) -> Option<crate::uce::UceTypeAlias> {
        Some(crate::uce::UceTypeAlias {
            name: cx.name(node)?,
            type_params: cx.type_params(node),
            aliased_type: cx.field_text(node, "value").unwrap_or_default(),
            location: cx.location(node),
            modifiers: declaration_modifiers(cx, node),
            doc_comment: cx.doc(node),
        })
    }

    fn parse_variables(&self, cx: &Cx, node: Node) -> Vec<UceVariable> {
        let kind = variable_kind(cx, node);
        let mut modifiers = declaration_modifiers(cx, node);
        if kind == VariableKind::Const {
            modifiers.insert(Modifier::Const);
        }
        let doc = cx.doc(node);

        let mut out = Vec::new();
        for declarator in declarators(node) {
            let value = declarator.child_by_field_name("value");
            if value.is_some_and(|v| FUNCTION_VALUES.contains(&v.kind()) || required_module(cx, v).is_some()) {
                continue;
            }
            for name in bound_names(cx, declarator) {
                out.push(UceVariable {
                    name,
                    kind,
                    var_type: declarator.child_by_field_name("type").map(|t| clean_type(cx.text(t))),
                    initializer: value.map(|v| cx.text(v).to_string()),
                    location: cx.location(node),
                    modifiers: modifiers.clone(),
                    doc_comment: doc.clone(),
                });
            }
        }
        out
    }

    fn parse_imports(&self, cx: &Cx, node: Node) -> Vec<UceImport> {
        if node.kind() != "import_statement" {
            // CommonJS: const x = require("x")
            return declarators(node)
                .into_iter()
                .filter_map(|declarator| {
                    let source = required_module(cx, declarator.child_by_field_name("value")?)?;
                    let name = declarator.child_by_field_name("name")?;
                    let specifiers = if name.kind() == "identifier" {
                        vec![ImportSpecifier {
                            local: cx.text(name).to_string(),
                            imported: "default".to_string(),
                            kind: SpecifierKind::Default,
                        }]
                    } else {
                        bound_names(cx, declarator)
                            .into_iter()
                            .map(|n| ImportSpecifier {
                                local: n.clone(),
                                imported: n,
                                kind: SpecifierKind::Named,
                            })
                            .collect()
                    };
                    Some(UceImport {
                        source,
                        specifiers,
                        is_type_only: false,
                        is_side_effect: false,
                        location: cx.location(node),
                    })
                })
                .collect();
        }

        let Some(source) = node.child_by_field_name("source").map(|s| unquote(cx.text(s))) else {
            return Vec::new();
        };
        let clause = child_of_kind(node, &["import_clause"]);
        let mut specifiers = Vec::new();
        for part in clause.map(named_children).unwrap_or_default() {
            match part.kind() {
                "identifier" => specifiers.push(ImportSpecifier {
                    local: cx.text(part).to_string(),
                    imported: "default".to_string(),
                    kind: SpecifierKind::Default,
                }),
                "namespace_import" => {
                    if let Some(id) = named_children(part).into_iter().next() {
                        specifiers.push(ImportSpecifier {
                            local: cx.text(id).to_string(),
                            imported: "*".to_string(),
                            kind: SpecifierKind::Namespace,
                        });
                    }
                }
                "named_imports" => {
                    for spec in named_children(part).into_iter().filter(|s| s.kind() == "import_specifier") {
                        let Some(imported) = cx.field_text(spec, "name") else { continue };
                        let local = cx.field_text(spec, "alias").unwrap_or_else(|| imported.clone());
                        specifiers.push(ImportSpecifier {
                            local,
                            imported,
                            kind: SpecifierKind::Named,
                        });
                    }
                }
                _ => {}
            }
        }

        vec![UceImport {
            source,
            specifiers,
            is_type_only: has_token(node, "type"),
            is_side_effect: clause.is_none(),
            location: cx.location(node),
        }]
    }

    fn extract_exports(&self, cx: &Cx, root: Node) -> Vec<UceExport> {
        let mut out = Vec::new();
        for node in module_level(root, &["export_statement"], &[]) {
            let source = node.child_by_field_name("source").map(|s| unquote(cx.text(s)));
            let is_type_only = has_token(node, "type");
            let location = cx.location(node);
            let export = |name: String, local_name: Option<String>, kind: ExportKind, type_only: bool| UceExport {
                name,
                local_name,
                kind,
                source: source.clone(),
                is_type_only: type_only,
                location: location.clone(),
            };

            if has_token(node, "default") {
                let local = node
                    .child_by_field_name("declaration")
                    .and_then(|d| cx.name(d))
                    .or_else(|| {
                        node.child_by_field_name("value")
                            .filter(|v| v.kind() == "identifier")
                            .map(|v| cx.text(v).to_string())
                    });
                out.push(export("default".to_string(), local, ExportKind::Default, false));
            } else if let Some(decl) = node.child_by_field_name("declaration") {
                let type_only = matches!(decl.kind(), "interface_declaration" | "type_alias_declaration");
                let names = match decl.kind() {
                    "lexical_declaration" | "variable_declaration" => {
                        declarators(decl).into_iter().flat_map(|d| bound_names(cx, d)).collect()
                    }
                    _ => cx.name(decl).into_iter().collect::<Vec<_>>(),
                };
                for name in names {
                    out.push(export(name, None, ExportKind::Named, type_only));
                }
            } else if let Some(clause) = child_of_kind(node, &["export_clause"]) {
                let kind = if source.is_some() { ExportKind::ReExport } else { ExportKind::Named };
                for spec in named_children(clause).into_iter().filter(|s| s.kind() == "export_specifier") {
                    let Some(local) = cx.field_text(spec, "name") else { continue };
                    match cx.field_text(spec, "alias") {
                        Some(alias) => out.push(export(unquote(&alias), Some(local), kind, is_type_only)),
                        None => out.push(export(unquote(&local), None, kind, is_type_only)),
                    }
                }
            } else if let Some(ns) = child_of_kind(node, &["namespace_export"]) {
                let name = named_children(ns)
                    .into_iter()
                    .next()
                    .map(|n| cx.text(n).to_string())
                    .unwrap_or_else(|| "*".to_string());
                out.push(export(name, None, ExportKind::Namespace, is_type_only));
            } else if source.is_some() {
                out.push(export("*".to_string(), None, ExportKind::ReExport, is_type_only));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::SupportedLanguage;
    use crate::test_support::transform;
    use crate::uce::{ClassKind, ExportKind, Modifier, SpecifierKind, VariableKind, Visibility};

    const SERVICE: &str = r#"
import { Injectable, Inject as In } from "@core/di";
import type { User } from "./types";
import * as path from "path";
import Default from "./default";
import "./polyfill";

/** Loads users. */
export class UserService extends BaseService implements Loader, Disposable {
  private readonly cache: Map<string, User> = new Map();
  static instances = 0;
  #secret = 1;

  constructor(private db: Database, public name?: string) {
    super();
  }

  async load(id: string): Promise<User> {
    return this.db.find(id);
  }

  protected get size(): number { return this.cache.size; }

  handle = (e: Event) => { this.load(e.id); };
}

export interface Loader<T> extends Base, Other {
  readonly name: string;
  count?: number;
  load(id: string): Promise<T>;
}

export type Id = string | number;

export const helper = async (x: number): Promise<number> => x * 2;
function plain(a, b = 2) { return a + b; }
const LIMIT = 10, other = 'x';
let { a, b } = obj;

export enum Color { Red, Green = "g" }
export { plain, LIMIT as MAX };
export * from "./reexported";
export default UserService;
"#;

    #[test]
    fn test_functions_include_promoted_arrows() {
        let file = transform(SERVICE, SupportedLanguage::TypeScript);
        let names: Vec<_> = file.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["helper", "plain"]);

        let helper = &file.functions[0];
        assert!(helper.modifiers.contains(Modifier::Async));
        assert!(helper.modifiers.contains(Modifier::Export));
        assert_eq!(helper.return_type.as_deref(), Some("Promise<number>"));
        assert_eq!(helper.signature, "async helper(x: number): Promise<number>");

        let plain = &file.functions[1];
        assert_eq!(plain.params.len(), 2);
        assert!(plain.params[1].is_optional);
    }

    #[test]
    fn test_class_members() {
        let file = transform(SERVICE, SupportedLanguage::TypeScript);
        let svc = file.find_class("UserService").unwrap();
        assert_eq!(svc.extends.as_deref(), Some("BaseService"));
        assert_eq!(svc.implements, ["Loader", "Disposable"]);
        assert_eq!(svc.doc_comment.as_deref(), Some("Loads users."));
        assert!(svc.modifiers.contains(Modifier::Export));

        let ctor = svc.constructor.as_ref().unwrap();
        assert_eq!(ctor.function.params.len(), 2);

        let methods: Vec<_> = svc.methods.iter().map(|m| m.name()).collect();
        assert_eq!(methods, ["load", "size", "handle"]);
        assert!(svc.methods[0].function.modifiers.contains(Modifier::Async));
        assert!(svc.methods[1].is_getter);
        assert_eq!(svc.methods[1].visibility, Visibility::Protected);

        let cache = svc.properties.iter().find(|p| p.name == "cache").unwrap();
        assert_eq!(cache.visibility, Visibility::Private);
        assert!(cache.is_readonly);
        assert_eq!(cache.property_type.as_deref(), Some("Map<string, User>"));
        assert!(svc.properties.iter().find(|p| p.name == "instances").unwrap().is_static);
        assert_eq!(svc.properties.iter().find(|p| p.name == "#secret").unwrap().visibility, Visibility::Private);
        assert!(svc.properties.iter().any(|p| p.name == "db"));
    }

    #[test]
    fn test_interface_and_alias() {
        let file = transform(SERVICE, SupportedLanguage::TypeScript);
        let loader = file.find_interface("Loader").unwrap();
        assert_eq!(loader.type_params, ["T"]);
        assert_eq!(loader.extends, ["Base", "Other"]);
        assert_eq!(loader.properties.len(), 2);
        assert!(loader.properties[0].is_readonly);
        assert!(loader.properties[1].is_optional);
        assert_eq!(loader.methods[0].name(), "load");

        assert_eq!(file.type_aliases[0].name, "Id");
        assert_eq!(file.type_aliases[0].aliased_type, "string | number");
    }

    #[test]
    fn test_enum_is_class_of_kind_enum() {
        let file = transform(SERVICE, SupportedLanguage::TypeScript);
        let color = file.find_class("Color").unwrap();
        assert_eq!(color.kind, ClassKind::Enum);
        let members: Vec<_> = color.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(members, ["Red", "Green"]);
    }

    #[test]
    fn test_variables() {
        let file = transform(SERVICE, SupportedLanguage::TypeScript);
        let names: Vec<_> = file.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["LIMIT", "other", "a", "b"]);
        assert_eq!(file.variables[0].kind, VariableKind::Const);
        assert_eq!(file.variables[2].kind, VariableKind::Let);
    }

    #[test]
    fn test_imports() {
        let file = transform(SERVICE, SupportedLanguage::TypeScript);
        assert_eq!(file.imports.len(), 5);

        let di = &file.imports[0];
        assert_eq!(di.source, "@core/di");
        assert_eq!(di.specifiers[1].local, "In");
        assert_eq!(di.specifiers[1].imported, "Inject");

        assert!(file.imports[1].is_type_only);
        assert_eq!(file.imports[2].specifiers[0].kind, SpecifierKind::Namespace);
        assert_eq!(file.imports[3].specifiers[0].kind, SpecifierKind::Default);
        assert!(file.imports[4].is_side_effect);
    }

    #[test]
    fn test_exports() {
        let file = transform(SERVICE, SupportedLanguage::TypeScript);
        let names: Vec<_> = file.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            ["UserService", "Loader", "Id", "helper", "Color", "plain", "MAX", "*", "default"]
        );
        let max = file.exports.iter().find(|e| e.name == "MAX").unwrap();
        assert_eq!(max.local_name.as_deref(), Some("LIMIT"));
        assert!(file.exports[1].is_type_only);
        assert_eq!(file.exports[7].kind, ExportKind::ReExport);
        assert_eq!(file.exports[8].kind, ExportKind::Default);
        assert_eq!(file.exports[8].local_name.as_deref(), Some("UserService"));
    }

    #[test]
    fn test_commonjs_require() {
        let source = "const fs = require('fs');\nconst { join, resolve } = require(\"path\");\nfunction main() {}\n";
        let file = transform(source, SupportedLanguage::JavaScript);
        assert_eq!(file.imports.len(), 2);
        assert_eq!(file.imports[0].source, "fs");
        assert_eq!(file.imports[1].specifiers.len(), 2);
        assert!(file.variables.is_empty());
    }

    #[test]
    fn test_javascript_class_extends() {
        let source = "class Dog extends Animal {\n  bark() { return 'woof'; }\n  static create() { return new Dog(); }\n}\n";
        let file = transform(source, SupportedLanguage::JavaScript);
        let dog = file.find_class("Dog").unwrap();
        assert_eq!(dog.extends.as_deref(), Some("Animal"));
        assert!(dog.methods[1].is_static);
    }

    #[test]
    fn test_methods_are_not_functions() {
        let source = "class A { run() {} }\nfunction top() { function inner() {} }\n";
        let file = transform(source, SupportedLanguage::JavaScript);
        let names: Vec<_> = file.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["top"]);
    }

    #[test]
    fn test_tsx_component() {
        let source = "export const App = ({ title }: Props) => <div>{title}</div>;\n";
        let file = transform(source, SupportedLanguage::Tsx);
        assert_eq!(file.functions[0].name, "App");
        assert!(file.errors.is_empty());
    }
}
