use crate::transform::helpers::{Cx, children_by_field, child_of_kind, method, named_children, visibility_from};
use crate::transform::kinds::{NodeKinds, node_kinds};
use crate::transform::strategy::LanguageStrategy;
use crate::language::SupportedLanguage;
use crate::uce::{
    ClassKind, ImportSpecifier, Modifier, SpecifierKind, UceClass, UceImport, UceInterface, UceMethod, UceProperty,
    Visibility,
};
use tree_sitter::Node;

pub struct JavaStrategy;

/// Members of a class, enum or record body
#[derive(Default)]
struct Members {
    methods: Vec<UceMethod>,
    properties: Vec<UceProperty>,
    constructor: Option<UceMethod>,
}

fn type_list(cx: &Cx, clause: Option<Node>) -> Vec<String> {
    let Some(clause) = clause else {
        return Vec::new();
    };
    let list = child_of_kind(clause, &["type_list"]).unwrap_or(clause);
    named_children(list).into_iter().map(|t| cx.text(t).to_string()).collect()
}

/// Split `java.util.List` / `java.util.*` into (package, member)
pub(super) fn split_qualified(path: &str) -> (String, Option<String>) {
    match path.strip_suffix(".*") {
        Some(package) => (package.to_string(), None),
        None => match path.rsplit_once('.') {
            Some((package, member)) => (package.to_string(), Some(member.to_string())),
            None => (path.to_string(), Some(path.to_string())),
        },
    }
}

pub(super) fn qualified_import(cx: &Cx, node: Node, path: &str) -> UceImport {
    let (source, member) = split_qualified(path);
    let specifier = match member {
        Some(member) => ImportSpecifier {
            local: member.clone(),
            imported: member,
            kind: SpecifierKind::Named,
        },
        None => ImportSpecifier {
            local: "*".to_string(),
            imported: "*".to_string(),
            kind: SpecifierKind::Namespace,
        },
    };
    UceImport {
        source,
        specifiers: vec![specifier],
        is_type_only: false,
        is_side_effect: false,
        location: cx.location(node),
    }
}

impl JavaStrategy {
    fn member_method(&self, cx: &Cx, node: Node, default: Visibility) -> Option<UceMethod> {
        let name = cx.name(node)?;
        let mut parts = cx.fn_parts(node);
        parts.return_type = cx.field_text(node, "type");
        let visibility = visibility_from(&parts.modifiers, default);
        Some(method(cx.function(node, name, parts), visibility))
    }

    fn fields(&self, cx: &Cx, node: Node, default: Visibility) -> Vec<UceProperty> {
        let ty = cx.field_text(node, "type");
        children_by_field(node, "declarator")
            .into_iter()
            .filter_map(|d| {
                let name = cx.field_text(d, "name")?;
                let mut prop = cx.property(node, name, ty.clone(), default);
                prop.initializer = cx.field_text(d, "value");
                Some(prop)
            })
            .collect()
    }

    fn members(&self, cx: &Cx, body: Node, default: Visibility, interface: bool) -> Members {
        let mut members = Members::default();
        let mut queue = named_children(body);
        queue.reverse();
        while let Some(member) = queue.pop() {
            match member.kind() {
                "method_declaration" => {
                    let Some(mut m) = self.member_method(cx, member, default) else { continue };
                    // interface methods without a body are implicitly abstract
                    if interface && member.child_by_field_name("body").is_none() && !m.is_static {
                        m.is_abstract = true;
                    }
                    members.methods.push(m);
                }
                "constructor_declaration" | "compact_constructor_declaration" => {
                    let ctor = self.member_method(cx, member, default);
                    if members.constructor.is_none() {
                        members.constructor = ctor;
                    } else {
                        // overloads beyond the first are kept as methods
                        members.methods.extend(ctor);
                    }
                }
                "field_declaration" | "constant_declaration" => {
                    members.properties.extend(self.fields(cx, member, default));
                }
                "enum_constant" => {
                    if let Some(name) = cx.field_text(member, "name") {
                        let mut prop = cx.property(member, name, None, Visibility::Public);
                        prop.is_static = true;
                        prop.is_readonly = true;
                        prop.initializer = cx.field_text(member, "arguments");
                        members.properties.push(prop);
                    }
                }
                "enum_body_declarations" => {
                    let mut nested = named_children(member);
                    nested.reverse();
                    queue.extend(nested);
                }
                _ => {}
            }
        }
        members
    }
}

impl LanguageStrategy for JavaStrategy {
    fn kinds(&self) -> &'static NodeKinds {
        node_kinds(SupportedLanguage::Java)
    }

    /// Package-private
    fn default_visibility(&self) -> Visibility {
        Visibility::Internal
    }

    fn parse_class(&self, cx: &Cx, node: Node) -> Option<UceClass> {
        let name = cx.name(node)?;
        let kind = match node.kind() {
            "enum_declaration" => ClassKind::Enum,
            "record_declaration" => ClassKind::Record,
            _ => ClassKind::Class,
        };
        let mut members = node
            .child_by_field_name("body")
            .map(|b| self.members(cx, b, self.default_visibility(), false))
            .unwrap_or_default();

        if kind == ClassKind::Record {
            let components = cx.params_node(node).map(|p| cx.params(p)).unwrap_or_default();
            let location = cx.location(node);
            members.properties.splice(
                0..0,
                components.into_iter().map(|p| UceProperty {
                    name: p.name,
                    property_type: p.param_type,
                    visibility: Visibility::Private,
                    is_readonly: true,
                    location: location.clone(),
                    ..Default::default()
                }),
            );
        }

        let modifiers = cx.modifiers(node);
        Some(UceClass {
            name,
            kind,
            type_params: cx.type_params(node),
            extends: node
                .child_by_field_name("superclass")
                .and_then(|s| named_children(s).into_iter().next())
                .map(|t| cx.text(t).to_string()),
            implements: type_list(cx, node.child_by_field_name("interfaces")),
            methods: members.methods,
            properties: members.properties,
            constructor: members.constructor,
            location: cx.location(node),
            doc_comment: cx.doc(node),
            is_abstract: modifiers.contains(Modifier::Abstract),
            modifiers,
        })
    }

    fn parse_interface(&self, cx: &Cx, node: Node) -> Option<UceInterface> {
        let name = cx.name(node)?;
        let members = node
            .child_by_field_name("body")
            .map(|b| self.members(cx, b, Visibility::Public, true))
            .unwrap_or_default();
        let properties = members
            .properties
            .into_iter()
            .map(|mut p| {
                p.is_static = true;
                p.is_readonly = true;
                p
            })
            .collect();
        Some(UceInterface {
            type_params: cx.type_params(node),
            extends: type_list(cx, child_of_kind(node, &["extends_interfaces"])),
            properties,
            methods: members.methods,
            location: cx.location(node),
            modifiers: cx.modifiers(node),
            doc_comment: cx.doc(node),
            name,
        })
    }

    fn parse_imports(&self, cx: &Cx, node: Node) -> Vec<UceImport> {
        let path: String = cx
            .text(node)
            .trim_start_matches("import")
            .trim_end_matches(';')
            .trim()
            .trim_start_matches("static ")
            .split_whitespace()
            .collect();
        if path.is_empty() {
            return Vec::new();
        }
        vec![qualified_import(cx, node, &path)]
    }
}

#[cfg(test)]
mod tests {
    use crate::SupportedLanguage;
    use crate::test_support::transform;
    use crate::uce::{ClassKind, Modifier, SpecifierKind, Visibility};

    const SOURCE: &str = r#"
package com.example;

import java.util.List;
import java.util.*;
import static org.junit.Assert.assertEquals;

/**
 * Manages users.
 */
public class UserService extends BaseService implements Service, Closeable {
    private final List<User> users = new ArrayList<>();
    static int count;
    String name;

    public UserService(String name) {
        this.name = name;
    }

    @Override
    public void close() {
        users.clear();
    }

    protected User find(int id) {
        for (User u : users) {
            if (u.id == id) return u;
        }
        return null;
    }

    void reset() {}
}

interface Service extends AutoCloseable {
    int VERSION = 1;
    void start(String... args);
    default void stop() { }
}

enum Color {
    RED, GREEN;
    public String lower() { return name().toLowerCase(); }
}

record Pair(String left, int right) {}

abstract class Base {
    abstract void run();
}
"#;

    #[test]
    fn test_constructor_separate_from_methods() {
        let file = transform(SOURCE, SupportedLanguage::Java);
        let svc = file.find_class("UserService").unwrap();
        let ctor = svc.constructor.as_ref().unwrap();
        assert_eq!(ctor.name(), "UserService");
        assert_eq!(ctor.function.params[0].param_type.as_deref(), Some("String"));

        let methods: Vec<_> = svc.methods.iter().map(|m| m.name()).collect();
        assert_eq!(methods, ["close", "find", "reset"]);
    }

    #[test]
    fn test_class_details() {
        let file = transform(SOURCE, SupportedLanguage::Java);
        let svc = file.find_class("UserService").unwrap();
        assert_eq!(svc.extends.as_deref(), Some("BaseService"));
        assert_eq!(svc.implements, ["Service", "Closeable"]);
        assert_eq!(svc.doc_comment.as_deref(), Some("Manages users."));

        assert!(svc.methods[0].function.modifiers.contains(Modifier::Override));
        assert_eq!(svc.methods[0].function.return_type.as_deref(), Some("void"));
        assert_eq!(svc.methods[1].visibility, Visibility::Protected);
        assert_eq!(svc.methods[2].visibility, Visibility::Internal);
        assert_eq!(svc.methods[1].function.complexity, 3);

        let users = &svc.properties[0];
        assert_eq!(users.name, "users");
        assert_eq!(users.visibility, Visibility::Private);
        assert!(users.is_readonly);
        assert_eq!(users.property_type.as_deref(), Some("List<User>"));
        assert!(svc.properties[1].is_static);
    }

    #[test]
    fn test_interface() {
        let file = transform(SOURCE, SupportedLanguage::Java);
        let service = file.find_interface("Service").unwrap();
        assert_eq!(service.extends, ["AutoCloseable"]);
        assert_eq!(service.properties[0].name, "VERSION");
        assert_eq!(service.methods.len(), 2);
        assert_eq!(service.methods[0].visibility, Visibility::Public);
        assert!(service.methods[0].is_abstract);
        assert!(service.methods[0].function.params[0].is_rest);
        assert!(!service.methods[1].is_abstract);
    }

    #[test]
    fn test_enum_record_abstract() {
        let file = transform(SOURCE, SupportedLanguage::Java);
        let color = file.find_class("Color").unwrap();
        assert_eq!(color.kind, ClassKind::Enum);
        assert_eq!(color.properties.len(), 2);
        assert_eq!(color.methods[0].name(), "lower");

        let pair = file.find_class("Pair").unwrap();
        assert_eq!(pair.kind, ClassKind::Record);
        let fields: Vec<_> = pair.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(fields, ["left", "right"]);

        let base = file.find_class("Base").unwrap();
        assert!(base.is_abstract);
        assert!(base.methods[0].is_abstract);
    }

    #[test]
    fn test_imports() {
        let file = transform(SOURCE, SupportedLanguage::Java);
        assert_eq!(file.imports.len(), 3);
        assert_eq!(file.imports[0].source, "java.util");
        assert_eq!(file.imports[0].specifiers[0].imported, "List");
        assert_eq!(file.imports[1].specifiers[0].kind, SpecifierKind::Namespace);
        assert_eq!(file.imports[2].source, "org.junit.Assert");
        assert!(file.functions.is_empty());
    }
}
