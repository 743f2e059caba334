use crate::transform::helpers::{Cx, child_of_kind, children, method, named_children};
use crate::transform::kinds::{NodeKinds, node_kinds};
use crate::transform::strategy::LanguageStrategy;
use crate::language::SupportedLanguage;
use crate::uce::{
    ClassKind, ImportSpecifier, Modifier, Modifiers, SpecifierKind, UceClass, UceImport, UceInterface, UceMethod,
    UceProperty, Visibility,
};
use tree_sitter::Node;

pub struct CSharpStrategy;

/// Explicit access keywords; `protected internal` reads as protected
fn visibility(cx: &Cx, node: Node, default: Visibility) -> Visibility {
    let words: Vec<&str> = children(node)
        .into_iter()
        .filter(|c| c.kind() == "modifier")
        .map(|c| cx.text(c).trim())
        .collect();
    if words.contains(&"public") {
        Visibility::Public
    } else if words.contains(&"protected") {
        Visibility::Protected
    } else if words.contains(&"internal") {
        Visibility::Internal
    } else if words.contains(&"private") {
        Visibility::Private
    } else {
        default
    }
}

/// .NET naming convention: `IDisposable`, `IEnumerable<T>`
fn is_interface_name(name: &str) -> bool {
    let mut chars = name.rsplit('.').next().unwrap_or(name).chars();
    chars.next() == Some('I') && chars.next().is_some_and(char::is_uppercase)
}

fn type_modifiers(cx: &Cx, node: Node) -> Modifiers {
    let mut mods = cx.modifiers(node);
    if visibility(cx, node, Visibility::Internal) == Visibility::Public {
        mods.insert(Modifier::Export);
    }
    mods
}

fn bases(cx: &Cx, node: Node) -> Vec<String> {
    child_of_kind(node, &["base_list"])
        .map(|list| {
            named_children(list)
                .into_iter()
                .filter(|b| b.kind() != "argument_list")
                .map(|b| cx.text(b).trim().to_string())
                .collect()
        })
        .unwrap_or_default()
}

impl CSharpStrategy {
    fn member_method(&self, cx: &Cx, node: Node, default: Visibility) -> Option<UceMethod> {
        let name = cx.name(node)?;
        let parts = cx.fn_parts(node);
        let vis = visibility(cx, node, default);
        Some(method(cx.function(node, name, parts), vis))
    }

    fn property(&self, cx: &Cx, node: Node, default: Visibility) -> Option<UceProperty> {
        let name = cx.field_text(node, "name")?;
        let mut prop = cx.property(node, name, cx.field_text(node, "type"), default);
        prop.visibility = visibility(cx, node, default);
        let accessors = child_of_kind(node, &["accessor_list"]).map(|a| cx.text(a)).unwrap_or("");
        if !accessors.is_empty() && !accessors.contains("set") {
            prop.is_readonly = true;
        }
        prop.initializer = cx.field_text(node, "value");
        Some(prop)
    }

    fn fields(&self, cx: &Cx, node: Node, default: Visibility) -> Vec<UceProperty> {
        let Some(decl) = child_of_kind(node, &["variable_declaration"]) else {
            return Vec::new();
        };
        let ty = cx.field_text(decl, "type");
        named_children(decl)
            .into_iter()
            .filter(|d| d.kind() == "variable_declarator")
            .filter_map(|d| {
                let name = cx.name(d)?;
                let mut prop = cx.property(node, name, ty.clone(), default);
                prop.visibility = visibility(cx, node, default);
                prop.initializer = child_of_kind(d, &["equals_value_clause"])
                    .map(|v| cx.text(v).trim_start_matches('=').trim().to_string());
                Some(prop)
            })
            .collect()
    }

    fn members(&self, cx: &Cx, node: Node, default: Visibility, interface: bool) -> (Vec<UceMethod>, Vec<UceProperty>, Option<UceMethod>) {
        let mut methods = Vec::new();
        let mut properties = Vec::new();
        let mut constructor = None;
        let body = node.child_by_field_name("body");
        for member in body.map(named_children).unwrap_or_default() {
            match member.kind() {
                "method_declaration" => {
                    let Some(mut m) = self.member_method(cx, member, default) else { continue };
                    if interface && member.child_by_field_name("body").is_none() && !m.is_static {
                        m.is_abstract = true;
                    }
                    methods.push(m);
                }
                "constructor_declaration" => {
                    let ctor = self.member_method(cx, member, default);
                    if constructor.is_none() {
                        constructor = ctor;
                    } else {
                        methods.extend(ctor);
                    }
                }
                "property_declaration" => properties.extend(self.property(cx, member, default)),
                "field_declaration" | "event_field_declaration" => properties.extend(self.fields(cx, member, default)),
                "enum_member_declaration" => {
                    if let Some(name) = cx.field_text(member, "name") {
                        let mut prop = cx.property(member, name, None, Visibility::Public);
                        prop.is_static = true;
                        prop.is_readonly = true;
                        prop.initializer = cx.field_text(member, "value");
                        properties.push(prop);
                    }
                }
                _ => {}
            }
        }
        (methods, properties, constructor)
    }
}

impl LanguageStrategy for CSharpStrategy {
    fn kinds(&self) -> &'static NodeKinds {
        node_kinds(SupportedLanguage::CSharp)
    }

    fn default_visibility(&self) -> Visibility {
        Visibility::Private
    }

    fn parse_class(&self, cx: &Cx, node: Node) -> Option<UceClass> {
        let name = cx.name(node)?;
        let kind = match node.kind() {
            "struct_declaration" => ClassKind::Struct,
            "record_declaration" | "record_struct_declaration" => ClassKind::Record,
            "enum_declaration" => ClassKind::Enum,
            _ => ClassKind::Class,
        };
        let (methods, mut properties, constructor) = self.members(cx, node, Visibility::Private, false);

        // record Person(string Name, int Age)
        if kind == ClassKind::Record {
            if let Some(params) = cx.params_node(node) {
                let location = cx.location(params);
                let components = cx.params(params).into_iter().map(|p| UceProperty {
                    name: p.name,
                    property_type: p.param_type,
                    visibility: Visibility::Public,
                    is_readonly: true,
                    location: location.clone(),
                    ..Default::default()
                });
                properties.splice(0..0, components);
            }
        }

        let (mut extends, mut implements) = (None, Vec::new());
        if kind != ClassKind::Enum {
            for base in bases(cx, node) {
                if extends.is_none() && implements.is_empty() && kind == ClassKind::Class && !is_interface_name(&base) {
                    extends = Some(base);
                } else {
                    implements.push(base);
                }
            }
        }

        let modifiers = type_modifiers(cx, node);
        Some(UceClass {
            name,
            kind,
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
        let (methods, properties, _) = self.members(cx, node, Visibility::Public, true);
        Some(UceInterface {
            type_params: cx.type_params(node),
            extends: bases(cx, node),
            properties,
            methods,
            location: cx.location(node),
            modifiers: type_modifiers(cx, node),
            doc_comment: cx.doc(node),
            name,
        })
    }

    fn parse_imports(&self, cx: &Cx, node: Node) -> Vec<UceImport> {
        let text = cx
            .text(node)
            .trim()
            .trim_start_matches("global")
            .trim_start()
            .trim_start_matches("using")
            .trim_end_matches(';')
            .trim();
        let text = text.strip_prefix("static ").unwrap_or(text).trim();
        let (local, source) = match text.split_once('=') {
            Some((alias, target)) => (alias.trim().to_string(), target.trim().to_string()),
            None => ("*".to_string(), text.to_string()),
        };
        if source.is_empty() {
            return Vec::new();
        }
        vec![UceImport {
            specifiers: vec![ImportSpecifier {
                imported: if local == "*" { "*".to_string() } else { source.clone() },
                local,
                kind: SpecifierKind::Namespace,
            }],
            source,
            is_type_only: false,
            is_side_effect: false,
            location: cx.location(node),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::is_interface_name;
    use crate::SupportedLanguage;
    use crate::test_support::transform;
    use crate::uce::{ClassKind, Modifier, Visibility};

    const SOURCE: &str = r#"
using System;
using System.Collections.Generic;
using Json = System.Text.Json;

namespace App.Services
{
    /// <summary>Stores users.</summary>
    public sealed class UserRepository : RepositoryBase<User>, IRepository, IDisposable
    {
        private readonly List<User> _users = new List<User>();
        public int Count { get; }
        public string Name { get; set; } = "repo";
        internal static int Instances;

        public UserRepository(string name)
        {
            Name = name;
        }

        public User Find(int id)
        {
            foreach (var u in _users)
            {
                if (u.Id == id) return u;
            }
            return null;
        }

        void Reset() { }

        protected internal virtual void Log(params string[] lines) { }
    }

    public interface IRepository : IBase
    {
        int Count { get; }
        User Find(int id);
    }

    public struct Point { public int X; public int Y; }

    public record Person(string Name, int Age);

    enum Color { Red, Green = 2 }
}
"#;

    #[test]
    fn test_class_members_and_visibility() {
        let file = transform(SOURCE, SupportedLanguage::CSharp);
        let repo = file.find_class("UserRepository").unwrap();
        assert_eq!(repo.extends.as_deref(), Some("RepositoryBase<User>"));
        assert_eq!(repo.implements, ["IRepository", "IDisposable"]);
        assert!(repo.modifiers.contains(Modifier::Final));
        assert!(repo.modifiers.contains(Modifier::Export));

        assert_eq!(repo.constructor.as_ref().unwrap().function.params[0].name, "name");
        let methods: Vec<_> = repo.methods.iter().map(|m| (m.name(), m.visibility)).collect();
        assert_eq!(
            methods,
            [
                ("Find", Visibility::Public),
                ("Reset", Visibility::Private),
                ("Log", Visibility::Protected)
            ]
        );
        assert_eq!(repo.methods[0].function.return_type.as_deref(), Some("User"));
        assert_eq!(repo.methods[0].function.complexity, 3);
        let log_params = &repo.methods[2].function.params;
        assert_eq!(log_params.len(), 1);
        assert_eq!(log_params[0].name, "lines");
        assert_eq!(log_params[0].param_type.as_deref(), Some("string[]"));
        assert!(log_params[0].is_rest);

        let props: Vec<_> = repo.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(props, ["_users", "Count", "Name", "Instances"]);
        assert_eq!(repo.properties[0].visibility, Visibility::Private);
        assert!(repo.properties[1].is_readonly);
        assert!(!repo.properties[2].is_readonly);
        assert_eq!(repo.properties[3].visibility, Visibility::Internal);
        assert!(repo.properties[3].is_static);
    }

    #[test]
    fn test_interface_struct_record_enum() {
        let file = transform(SOURCE, SupportedLanguage::CSharp);
        let repo = file.find_interface("IRepository").unwrap();
        assert_eq!(repo.extends, ["IBase"]);
        assert!(repo.methods[0].is_abstract);
        assert_eq!(repo.methods[0].visibility, Visibility::Public);

        assert_eq!(file.find_class("Point").unwrap().kind, ClassKind::Struct);
        let person = file.find_class("Person").unwrap();
        assert_eq!(person.kind, ClassKind::Record);
        assert_eq!(person.properties.len(), 2);
        let color = file.find_class("Color").unwrap();
        assert_eq!(color.kind, ClassKind::Enum);
        assert_eq!(color.properties.len(), 2);
    }

    #[test]
    fn test_usings() {
        let file = transform(SOURCE, SupportedLanguage::CSharp);
        let sources: Vec<_> = file.imports.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, ["System", "System.Collections.Generic", "System.Text.Json"]);
        assert_eq!(file.imports[2].specifiers[0].local, "Json");
    }

    #[test]
    fn test_interface_name_convention() {
        assert!(is_interface_name("IDisposable"));
        assert!(is_interface_name("System.IDisposable"));
        assert!(!is_interface_name("Item"));
        assert!(!is_interface_name("I"));
    }
}
