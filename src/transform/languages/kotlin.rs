//! Kotlin
//!
//! `class_declaration` covers classes, data/enum classes and interfaces;
//! the `interface` keyword token tells them apart.

use super::java::qualified_import;
use crate::transform::helpers::{Cx, FnParts, child_of_kind, children, descendants_of_kind, has_token, method, named_children};
use crate::transform::kinds::{NodeKinds, node_kinds};
use crate::transform::strategy::{LanguageStrategy, class_body};
use crate::language::SupportedLanguage;
use crate::uce::{
    ClassKind, Modifier, Modifiers, SpecifierKind, UceClass, UceFunction, UceImport, UceInterface, UceMethod,
    UceParameter, UceProperty, UceTypeAlias, UceVariable, VariableKind, Visibility,
};
use tree_sitter::Node;

pub struct KotlinStrategy;

const TYPE_KINDS: &[&str] = &["user_type", "nullable_type", "function_type", "parenthesized_type", "type"];

fn is_interface(node: Node) -> bool {
    node.kind() == "class_declaration" && has_token(node, "interface")
}

fn modifier_words<'a>(cx: &Cx<'a>, node: Node) -> Vec<&'a str> {
    child_of_kind(node, &["modifiers"])
        .map(|m| cx.text(m).split_whitespace().collect())
        .unwrap_or_default()
}

fn visibility(cx: &Cx, node: Node) -> Visibility {
    let words = modifier_words(cx, node);
    if words.contains(&"private") {
        Visibility::Private
    } else if words.contains(&"protected") {
        Visibility::Protected
    } else if words.contains(&"internal") {
        Visibility::Internal
    } else {
        Visibility::Public
    }
}

fn declaration_modifiers(cx: &Cx, node: Node) -> Modifiers {
    let mut mods = cx.modifiers(node);
    if visibility(cx, node) == Visibility::Public {
        mods.insert(Modifier::Export);
    }
    mods
}

/// First type node after `after`
fn type_after(cx: &Cx, node: Node, after: Option<Node>) -> Option<String> {
    let start = after.map(|a| a.end_byte()).unwrap_or(0);
    named_children(node)
        .into_iter()
        .find(|c| c.start_byte() >= start && TYPE_KINDS.contains(&c.kind()))
        .map(|t| cx.text(t).trim().to_string())
}

/// `val`/`var` binding and its name/type
fn binding(cx: &Cx, node: Node) -> Option<(String, Option<String>)> {
    let decl = child_of_kind(node, &["variable_declaration"]).unwrap_or(node);
    let name = named_children(decl)
        .into_iter()
        .find(|c| c.kind() == "identifier" || c.kind() == "simple_identifier")
        .map(|n| cx.text(n).to_string())?;
    Some((name, type_after(cx, decl, None)))
}

fn is_val(cx: &Cx, node: Node) -> bool {
    children(node).into_iter().any(|c| {
        c.kind() == "val" || (c.kind() == "binding_pattern_kind" && cx.text(c) == "val")
    })
}

/// Initializer expression after `=`
fn initializer(cx: &Cx, node: Node) -> Option<String> {
    let kids = children(node);
    let eq = kids.iter().position(|c| c.kind() == "=")?;
    kids.get(eq + 1).map(|v| cx.text(*v).trim().to_string())
}

impl KotlinStrategy {
    /// Parameters with `vararg` modifiers and `= default` tails
    fn params(&self, cx: &Cx, list: Node) -> Vec<UceParameter> {
        let mut out: Vec<UceParameter> = Vec::new();
        let mut vararg = false;
        let mut pending_default = false;
        for child in children(list) {
            match child.kind() {
                "parameter_modifiers" | "parameter_modifier" => vararg |= cx.text(child).contains("vararg"),
                "parameter" | "class_parameter" => {
                    for mut p in cx.param(child) {
                        p.is_rest |= vararg;
                        if p.default_value.is_none() {
                            p.default_value = initializer(cx, child);
                            p.is_optional |= p.default_value.is_some();
                        }
                        out.push(p);
                    }
                    vararg = false;
                }
                "=" => pending_default = true,
                _ if pending_default && child.is_named() => {
                    if let Some(last) = out.last_mut() {
                        last.default_value = Some(cx.text(child).trim().to_string());
                        last.is_optional = true;
                    }
                    pending_default = false;
                }
                _ => {}
            }
        }
        out
    }

    fn parts(&self, cx: &Cx, node: Node) -> FnParts {
        let list = cx.params_node(node);
        FnParts {
            params: list.map(|l| self.params(cx, l)).unwrap_or_default(),
            return_type: type_after(cx, node, list),
            type_params: cx.type_params(node),
            modifiers: declaration_modifiers(cx, node),
            doc: None,
        }
    }

    fn member(&self, cx: &Cx, node: Node, static_member: bool) -> Option<UceMethod> {
        let name = cx.name(node)?;
        let mut parts = self.parts(cx, node);
        if static_member {
            parts.modifiers.insert(Modifier::Static);
        }
        let vis = visibility(cx, node);
        let mut m = method(cx.function(node, name, parts), vis);
        m.is_abstract |= child_of_kind(node, &["function_body"]).is_none();
        Some(m)
    }

    fn property(&self, cx: &Cx, node: Node) -> Option<UceProperty> {
        let (name, ty) = binding(cx, node)?;
        let mut prop = cx.property(node, name, ty, visibility(cx, node));
        prop.is_readonly |= is_val(cx, node);
        prop.initializer = initializer(cx, node);
        Some(prop)
    }

    fn body_members(&self, cx: &Cx, body: Node, static_member: bool, class: &mut UceClass) {
        for member in named_children(body) {
            match member.kind() {
                "function_declaration" => class.methods.extend(self.member(cx, member, static_member)),
                "property_declaration" => {
                    if let Some(mut prop) = self.property(cx, member) {
                        prop.is_static |= static_member;
                        class.properties.push(prop);
                    }
                }
                "secondary_constructor" if class.constructor.is_none() => {
                    let parts = self.parts(cx, member);
                    class.constructor = Some(method(cx.function(member, "constructor".to_string(), parts), visibility(cx, member)));
                }
                "companion_object" => {
                    if let Some(inner) = class_body(member) {
                        self.body_members(cx, inner, true, class);
                    }
                }
                "enum_entry" => {
                    if let Some(name) = cx.name(member) {
                        let mut prop = cx.property(member, name, None, Visibility::Public);
                        prop.is_static = true;
                        prop.is_readonly = true;
                        class.properties.push(prop);
                    }
                }
                _ => {}
            }
        }
    }
}

impl LanguageStrategy for KotlinStrategy {
    fn kinds(&self) -> &'static NodeKinds {
        node_kinds(SupportedLanguage::Kotlin)
    }

    fn parse_function(&self, cx: &Cx, node: Node) -> Option<UceFunction> {
        let name = cx.name(node)?;
        Some(cx.function(node, name, self.parts(cx, node)))
    }

    fn parse_class(&self, cx: &Cx, node: Node) -> Option<UceClass> {
        if is_interface(node) {
            return None;
        }
        let name = cx.name(node)?;
        let words = modifier_words(cx, node);
        let kind = if node.kind() == "object_declaration" {
            ClassKind::Object
        } else if words.contains(&"enum") {
            ClassKind::Enum
        } else if words.contains(&"data") {
            ClassKind::Record
        } else {
            ClassKind::Class
        };

        let mut extends = None;
        let mut implements = Vec::new();
        if let Some(specs) = child_of_kind(node, &["delegation_specifiers"]) {
            for spec in descendants_of_kind(
                specs,
                &["constructor_invocation", "user_type", "explicit_delegation"],
                &[],
            ) {
                if spec.kind() == "constructor_invocation" && extends.is_none() {
                    extends = named_children(spec).into_iter().next().map(|t| cx.text(t).to_string());
                } else {
                    implements.push(cx.text(spec).to_string());
                }
            }
        }

        let modifiers = declaration_modifiers(cx, node);
        let mut class = UceClass {
            name,
            kind,
            type_params: cx.type_params(node),
            extends,
            implements,
            location: cx.location(node),
            doc_comment: cx.doc(node),
            is_abstract: modifiers.contains(Modifier::Abstract),
            modifiers,
            ..Default::default()
        };

        if let Some(primary) = child_of_kind(node, &["primary_constructor"]) {
            let list = child_of_kind(primary, &["class_parameters"]).unwrap_or(primary);
            let params = self.params(cx, list);
            for param in named_children(list).into_iter().filter(|p| p.kind() == "class_parameter") {
                let declares = children(param).iter().any(|c| {
                    matches!(c.kind(), "val" | "var") || (c.kind() == "binding_pattern_kind")
                });
                if !declares {
                    continue;
                }
                let Some(p) = cx.param(param).into_iter().next() else { continue };
                let mut prop = cx.property(param, p.name, p.param_type, visibility(cx, param));
                prop.is_readonly |= is_val(cx, param);
                prop.initializer = p.default_value;
                class.properties.push(prop);
            }
            let parts = FnParts {
                params,
                modifiers: cx.modifiers(primary),
                ..Default::default()
            };
            let vis = visibility(cx, primary);
            class.constructor = Some(method(cx.function(primary, "constructor".to_string(), parts), vis));
        }

        if let Some(body) = class_body(node) {
            self.body_members(cx, body, kind == ClassKind::Object, &mut class);
        }
        Some(class)
    }

    fn parse_interface(&self, cx: &Cx, node: Node) -> Option<UceInterface> {
        if !is_interface(node) {
            return None;
        }
        let name = cx.name(node)?;
        let extends = child_of_kind(node, &["delegation_specifiers"])
            .map(|specs| {
                named_children(specs)
                    .into_iter()
                    .map(|s| cx.text(s).trim().to_string())
                    .collect()
            })
            .unwrap_or_default();
        let mut shell = UceClass::default();
        if let Some(body) = class_body(node) {
            self.body_members(cx, body, false, &mut shell);
        }
        Some(UceInterface {
            type_params: cx.type_params(node),
            extends,
            properties: shell.properties,
            methods: shell.methods,
            location: cx.location(node),
            modifiers: declaration_modifiers(cx, node),
            doc_comment: cx.doc(node),
            name,
        })
    }

    fn parse_type_alias(&self, cx: &Cx, node: Node) -> Option<UceTypeAlias> {
        let name = cx.name(node)?;
        let aliased_type = cx.text(node).split_once('=').map(|(_, t)| t.trim().to_string()).unwrap_or_default();
        Some(UceTypeAlias {
            name,
            type_params: cx.type_params(node),
            aliased_type,
            location: cx.location(node),
            modifiers: declaration_modifiers(cx, node),
            doc_comment: cx.doc(node),
        })
    }

    fn parse_variables(&self, cx: &Cx, node: Node) -> Vec<UceVariable> {
        let Some((name, var_type)) = binding(cx, node) else {
            return Vec::new();
        };
        let mut modifiers = declaration_modifiers(cx, node);
        let kind = if modifier_words(cx, node).contains(&"const") || is_val(cx, node) {
            modifiers.insert(Modifier::Const);
            VariableKind::Const
        } else {
            VariableKind::Var
        };
        vec![UceVariable {
            name,
            kind,
            var_type,
            initializer: initializer(cx, node),
            location: cx.location(node),
            modifiers,
            doc_comment: cx.doc(node),
        }]
    }

    fn parse_imports(&self, cx: &Cx, node: Node) -> Vec<UceImport> {
        let text = cx.text(node).trim().trim_start_matches("import").trim().trim_end_matches(';');
        let (path, alias) = match text.split_once(" as ") {
            Some((path, alias)) => (path.trim(), Some(alias.trim())),
            None => (text.trim(), None),
        };
        if path.is_empty() {
            return Vec::new();
        }
        let mut import = qualified_import(cx, node, path);
        if let (Some(alias), Some(spec)) = (alias, import.specifiers.first_mut()) {
            if spec.kind == SpecifierKind::Named {
                spec.local = alias.to_string();
            }
        }
        vec![import]
    }
}

#[cfg(test)]
mod tests {
    use crate::SupportedLanguage;
    use crate::test_support::transform;
    use crate::uce::{ClassKind, Modifier, Visibility};

    const SOURCE: &str = r#"
package com.example

import kotlinx.coroutines.launch
import com.example.model.*
import java.util.Date as JDate

const val MAX = 10
var counter = 0

typealias UserMap = Map<String, User>

interface Repository : Closeable {
    val name: String
    fun find(id: Int): User?
    fun all(): List<User> = emptyList()
}

/** Default repository. */
class UserRepository(private val db: Database, val label: String = "users") : BaseRepository(db), Repository {
    private val cache = mutableMapOf<Int, User>()

    override fun find(id: Int): User? {
        return cache[id] ?: db.load(id)
    }

    suspend fun refresh(vararg ids: Int) {
        for (id in ids) {
            if (id > 0) cache.remove(id)
        }
    }

    internal fun reset() {}

    companion object {
        fun create(): UserRepository = UserRepository(Database(), "x")
    }
}

data class User(val id: Int, var name: String)

enum class Color { RED, GREEN }

object Registry {
    fun register(user: User) {}
}

fun topLevel(a: Int, b: Int = 2): Int = a + b
"#;

    #[test]
    fn test_interface_vs_class() {
        let file = transform(SOURCE, SupportedLanguage::Kotlin);
        let interfaces: Vec<_> = file.interfaces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(interfaces, ["Repository"]);
        assert!(file.find_class("Repository").is_none());

        let repo = &file.interfaces[0];
        assert_eq!(repo.extends, ["Closeable"]);
        assert_eq!(repo.properties[0].name, "name");
        assert!(repo.methods[0].is_abstract);
        assert!(!repo.methods[1].is_abstract);

        let classes: Vec<_> = file.classes.iter().map(|c| (c.name.as_str(), c.kind)).collect();
        assert_eq!(
            classes,
            [
                ("UserRepository", ClassKind::Class),
                ("User", ClassKind::Record),
                ("Color", ClassKind::Enum),
                ("Registry", ClassKind::Object)
            ]
        );
    }

    #[test]
    fn test_class_members() {
        let file = transform(SOURCE, SupportedLanguage::Kotlin);
        let repo = file.find_class("UserRepository").unwrap();
        assert_eq!(repo.extends.as_deref(), Some("BaseRepository"));
        assert_eq!(repo.implements, ["Repository"]);
        assert_eq!(repo.doc_comment.as_deref(), Some("Default repository."));

        let ctor = repo.constructor.as_ref().unwrap();
        assert_eq!(ctor.function.params.len(), 2);
        assert!(ctor.function.params[1].is_optional);

        let props: Vec<_> = repo.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(props, ["db", "label", "cache"]);
        assert_eq!(repo.properties[0].visibility, Visibility::Private);
        assert!(repo.properties[0].is_readonly);

        let methods: Vec<_> = repo.methods.iter().map(|m| m.name()).collect();
        assert_eq!(methods, ["find", "refresh", "reset", "create"]);
        assert!(repo.methods[0].function.modifiers.contains(Modifier::Override));
        assert_eq!(repo.methods[0].function.return_type.as_deref(), Some("User?"));
        assert!(repo.methods[1].function.modifiers.contains(Modifier::Async));
        assert!(repo.methods[1].function.params[0].is_rest);
        assert_eq!(repo.methods[2].visibility, Visibility::Internal);
        assert!(repo.methods[3].is_static);
    }

    #[test]
    fn test_top_level_declarations() {
        let file = transform(SOURCE, SupportedLanguage::Kotlin);
        let names: Vec<_> = file.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["topLevel"]);
        assert_eq!(file.functions[0].return_type.as_deref(), Some("Int"));
        assert_eq!(file.functions[0].params[1].default_value.as_deref(), Some("2"));

        let vars: Vec<_> = file.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(vars, ["MAX", "counter"]);
        assert_eq!(file.type_aliases[0].aliased_type, "Map<String, User>");

        assert_eq!(file.imports.len(), 3);
        assert_eq!(file.imports[0].source, "kotlinx.coroutines");
        assert_eq!(file.imports[2].specifiers[0].local, "JDate");
    }
}
