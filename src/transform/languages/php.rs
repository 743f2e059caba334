use super::scala::split_clauses;
use crate::transform::helpers::{Cx, FnParts, child_of_kind, children, method, named_children, visibility_from};
use crate::transform::kinds::{NodeKinds, node_kinds};
use crate::transform::strategy::{LanguageStrategy, class_body};
use crate::language::SupportedLanguage;
use crate::uce::{
    ClassKind, ImportSpecifier, Modifier, SpecifierKind, UceClass, UceFunction, UceImport, UceInterface, UceMethod,
    UceParameter, UceProperty, UceVariable, VariableKind, Visibility,
};
use tree_sitter::Node;

pub struct PhpStrategy;

fn strip_sigil(name: String) -> String {
    match name.strip_prefix('$') {
        Some(rest) => rest.to_string(),
        None => name,
    }
}

/// Expression following a direct `=` child
fn after_equals(cx: &Cx, node: Node) -> Option<String> {
    let kids = children(node);
    let eq = kids.iter().position(|c| c.kind() == "=")?;
    kids.get(eq + 1).map(|v| cx.text(*v).trim().to_string())
}

fn names_in(cx: &Cx, clause: Option<Node>) -> Vec<String> {
    clause
        .map(|c| {
            named_children(c)
                .into_iter()
                .map(|n| cx.text(n).trim().to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// `App\Models\User` → (`App\Models`, `User`)
fn split_namespace(path: &str) -> (String, String) {
    let path = path.trim().trim_start_matches('\\');
    match path.rsplit_once('\\') {
        Some((ns, member)) => (ns.to_string(), member.to_string()),
        None => (String::new(), path.to_string()),
    }
}

fn named(imported: &str, alias: Option<&str>) -> ImportSpecifier {
    ImportSpecifier {
        imported: imported.to_string(),
        local: alias.unwrap_or(imported).to_string(),
        kind: SpecifierKind::Named,
    }
}

fn split_alias(item: &str) -> (&str, Option<&str>) {
    match item.split_once(" as ") {
        Some((path, alias)) => (path.trim(), Some(alias.trim())),
        None => (item.trim(), None),
    }
}

impl PhpStrategy {
    fn params(&self, cx: &Cx, node: Node) -> Vec<UceParameter> {
        let Some(list) = cx.params_node(node) else {
            return Vec::new();
        };
        cx.params(list)
            .into_iter()
            .map(|mut p| {
                p.name = strip_sigil(p.name);
                p
            })
            .collect()
    }

    fn parts(&self, cx: &Cx, node: Node) -> FnParts {
        FnParts {
            params: self.params(cx, node),
            ..cx.fn_parts(node)
        }
    }

    fn member(&self, cx: &Cx, node: Node, interface: bool) -> Option<UceMethod> {
        let name = cx.name(node)?;
        let parts = self.parts(cx, node);
        let visibility = visibility_from(&parts.modifiers, Visibility::Public);
        let mut m = method(cx.function(node, name, parts), visibility);
        if interface && node.child_by_field_name("body").is_none() {
            m.is_abstract = true;
        }
        Some(m)
    }

    /// Constructor parameters carrying a visibility become properties
    fn promoted(&self, cx: &Cx, ctor: Node) -> Vec<UceProperty> {
        let Some(list) = cx.params_node(ctor) else {
            return Vec::new();
        };
        named_children(list)
            .into_iter()
            .filter(|p| p.kind() == "property_promotion_parameter")
            .filter_map(|p| {
                let param = cx.param(p).into_iter().next()?;
                let mut prop = cx.property(p, strip_sigil(param.name), param.param_type, Visibility::Public);
                prop.initializer = param.default_value;
                prop.doc_comment = None;
                Some(prop)
            })
            .collect()
    }

    fn members(&self, cx: &Cx, node: Node, interface: bool, class: &mut UceClass) {
        for member in class_body(node).map(named_children).unwrap_or_default() {
            match member.kind() {
                "method_declaration" if cx.name(member).as_deref() == Some("__construct") => {
                    class.properties.extend(self.promoted(cx, member));
                    class.constructor = self.member(cx, member, interface);
                }
                "method_declaration" => class.methods.extend(self.member(cx, member, interface)),
                "property_declaration" => {
                    let ty = cx.field_text(member, "type");
                    for element in named_children(member).into_iter().filter(|e| e.kind() == "property_element") {
                        let Some(name) = cx.name(element) else { continue };
                        let mut prop = cx.property(member, strip_sigil(name), ty.clone(), Visibility::Public);
                        prop.initializer = cx.field_text(element, "default_value").or_else(|| after_equals(cx, element));
                        class.properties.push(prop);
                    }
                }
                "const_declaration" => {
                    for element in named_children(member).into_iter().filter(|e| e.kind() == "const_element") {
                        let Some(name) = cx.name(element) else { continue };
                        let mut prop = cx.property(member, name, None, Visibility::Public);
                        prop.is_static = true;
                        prop.is_readonly = true;
                        prop.initializer = after_equals(cx, element);
                        class.properties.push(prop);
                    }
                }
                "enum_case" => {
                    if let Some(name) = cx.name(member) {
                        let mut prop = cx.property(member, name, None, Visibility::Public);
                        prop.is_static = true;
                        prop.is_readonly = true;
                        prop.initializer = cx.field_text(member, "value").or_else(|| after_equals(cx, member));
                        class.properties.push(prop);
                    }
                }
                "use_declaration" => class.implements.extend(names_in(cx, Some(member))),
                _ => {}
            }
        }
    }

    /// One `use` clause, possibly a `{...}` group
    fn use_clause(&self, cx: &Cx, node: Node, clause: &str) -> Option<UceImport> {
        let clause = clause.trim();
        if clause.is_empty() {
            return None;
        }
        let (source, specifiers) = match clause.split_once('{') {
            Some((prefix, group)) => {
                let specifiers = group
                    .trim_end_matches('}')
                    .split(',')
                    .filter(|item| !item.trim().is_empty())
                    .map(|item| {
                        let (path, alias) = split_alias(item);
                        named(path, alias)
                    })
                    .collect();
                (prefix.trim().trim_start_matches('\\').trim_end_matches('\\').to_string(), specifiers)
            }
            None => {
                let (path, alias) = split_alias(clause);
                let (ns, member) = split_namespace(path);
                (ns, vec![named(&member, alias)])
            }
        };
        Some(UceImport {
            source,
            specifiers,
            is_type_only: false,
            is_side_effect: false,
            location: cx.location(node),
        })
    }
}

impl LanguageStrategy for PhpStrategy {
    fn kinds(&self) -> &'static NodeKinds {
        node_kinds(SupportedLanguage::Php)
    }

    fn parse_function(&self, cx: &Cx, node: Node) -> Option<UceFunction> {
        let name = cx.name(node)?;
        let mut parts = self.parts(cx, node);
        parts.modifiers.insert(Modifier::Export);
        Some(cx.function(node, name, parts))
    }

    fn parse_class(&self, cx: &Cx, node: Node) -> Option<UceClass> {
        let name = cx.name(node)?;
        let kind = match node.kind() {
            "enum_declaration" => ClassKind::Enum,
            // traits are mixins
            "trait_declaration" => ClassKind::Module,
            _ => ClassKind::Class,
        };
        let mut modifiers = cx.modifiers(node);
        modifiers.insert(Modifier::Export);
        let mut class = UceClass {
            name,
            kind,
            extends: names_in(cx, child_of_kind(node, &["base_clause"])).into_iter().next(),
            implements: names_in(cx, child_of_kind(node, &["class_interface_clause"])),
            location: cx.location(node),
            doc_comment: cx.doc(node),
            is_abstract: modifiers.contains(Modifier::Abstract),
            modifiers,
            ..Default::default()
        };
        self.members(cx, node, false, &mut class);
        Some(class)
    }

    fn parse_interface(&self, cx: &Cx, node: Node) -> Option<UceInterface> {
        let name = cx.name(node)?;
        let mut shell = UceClass::default();
        self.members(cx, node, true, &mut shell);
        Some(UceInterface {
            type_params: Vec::new(),
            extends: names_in(cx, child_of_kind(node, &["base_clause"])),
            properties: shell.properties,
            methods: shell.methods,
            location: cx.location(node),
            modifiers: cx.modifiers(node).with(Modifier::Export),
            doc_comment: cx.doc(node),
            name,
        })
    }

    fn parse_variables(&self, cx: &Cx, node: Node) -> Vec<UceVariable> {
        named_children(node)
            .into_iter()
            .filter(|e| e.kind() == "const_element")
            .filter_map(|element| {
                Some(UceVariable {
                    name: cx.name(element)?,
                    kind: VariableKind::Const,
                    var_type: None,
                    initializer: after_equals(cx, element),
                    location: cx.location(node),
                    modifiers: cx.modifiers(node).with(Modifier::Const).with(Modifier::Export),
                    doc_comment: cx.doc(node),
                })
            })
            .collect()
    }

    fn parse_imports(&self, cx: &Cx, node: Node) -> Vec<UceImport> {
        let text = cx.text(node).trim().trim_start_matches("use").trim().trim_end_matches(';');
        let text = text
            .strip_prefix("function ")
            .or_else(|| text.strip_prefix("const "))
            .unwrap_or(text);
        split_clauses(text)
            .into_iter()
            .filter_map(|clause| self.use_clause(cx, node, clause))
            .collect()
    }
}
