use crate::transform::helpers::{Cx, FnParts, child_of_kind, children, clean_type, find_descendant, has_token, method, named_children};
use crate::transform::kinds::{NodeKinds, node_kinds};
use crate::transform::strategy::{LanguageStrategy, class_body};
use crate::language::SupportedLanguage;
use crate::uce::{
    ClassKind, ImportSpecifier, Modifier, Modifiers, SpecifierKind, UceClass, UceFunction, UceImport, UceInterface,
    UceMethod, UceParameter, UceProperty, UceTypeAlias, UceVariable, VariableKind, Visibility,
};
use tree_sitter::Node;

pub struct SwiftStrategy;

/// `class`, `struct`, `enum`, `actor` or `extension`
fn declaration_kind<'a>(cx: &Cx<'a>, node: Node) -> &'a str {
    node.child_by_field_name("declaration_kind")
        .map(|k| cx.text(k))
        .or_else(|| {
            ["class", "struct", "enum", "actor", "extension"]
                .into_iter()
                .find(|k| has_token(node, k))
        })
        .unwrap_or("class")
}

fn visibility(cx: &Cx, node: Node) -> Visibility {
    let words: Vec<&str> = child_of_kind(node, &["modifiers"])
        .map(|m| cx.text(m).split_whitespace().collect())
        .unwrap_or_default();
    if words.iter().any(|w| *w == "private" || *w == "fileprivate") {
        Visibility::Private
    } else if words.iter().any(|w| *w == "public" || *w == "open") {
        Visibility::Public
    } else {
        Visibility::Internal
    }
}

fn declaration_modifiers(cx: &Cx, node: Node) -> Modifiers {
    let mut mods = cx.modifiers(node);
    if visibility(cx, node) == Visibility::Public {
        mods.insert(Modifier::Export);
    }
    mods
}

fn inherited(cx: &Cx, node: Node) -> Vec<String> {
    named_children(node)
        .into_iter()
        .filter(|c| c.kind() == "inheritance_specifier")
        .map(|c| cx.text(c).trim().to_string())
        .collect()
}

fn binding_is_let(cx: &Cx, node: Node) -> bool {
    child_of_kind(node, &["value_binding_pattern"])
        .map(|b| cx.text(b).trim_start().starts_with("let"))
        .unwrap_or_else(|| has_token(node, "let"))
}

/// Bound identifier; protocol requirements wrap `var name` in one pattern node
fn binding_name(cx: &Cx, node: Node) -> Option<String> {
    let pattern = node.child_by_field_name("name")?;
    let ident = match pattern.kind() {
        "simple_identifier" => pattern,
        _ => find_descendant(pattern, &["simple_identifier"]).unwrap_or(pattern),
    };
    let text = cx.text(ident).trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn annotation(cx: &Cx, node: Node) -> Option<String> {
    child_of_kind(node, &["type_annotation"])
        .map(|t| clean_type(cx.text(t)))
        .filter(|t| !t.is_empty())
}

impl SwiftStrategy {
    /// Parameters are direct children; defaults follow as `= expr`
    fn params(&self, cx: &Cx, node: Node) -> Vec<UceParameter> {
        let mut out: Vec<UceParameter> = Vec::new();
        let mut pending_default = false;
        for child in children(node) {
            match child.kind() {
                "parameter" => {
                    for mut p in cx.param(child) {
                        p.is_rest |= cx.text(child).trim_end().ends_with("...");
                        out.push(p);
                    }
                }
                "=" => pending_default = true,
                _ if pending_default && child.is_named() => {
                    if let Some(last) = out.last_mut() {
                        last.default_value = Some(cx.text(child).trim().to_string());
                        last.is_optional = true;
                    }
                    pending_default = false;
                }
                "->" | "function_body" => break,
                _ => {}
            }
        }
        out
    }

    fn parts(&self, cx: &Cx, node: Node) -> FnParts {
        FnParts {
            params: self.params(cx, node),
            modifiers: declaration_modifiers(cx, node),
            ..cx.fn_parts(node)
        }
    }

    fn property(&self, cx: &Cx, node: Node) -> Option<UceProperty> {
        let name = binding_name(cx, node)?;
        let mut prop = cx.property(node, name, annotation(cx, node), visibility(cx, node));
        prop.is_readonly |= binding_is_let(cx, node);
        prop.is_optional = prop.property_type.as_deref().is_some_and(|t| t.ends_with('?'));
        prop.initializer = cx.field_text(node, "value");
        Some(prop)
    }

    fn members(&self, cx: &Cx, body: Node, interface: bool) -> (Vec<UceMethod>, Vec<UceProperty>, Option<UceMethod>) {
        let mut methods = Vec::new();
        let mut properties = Vec::new();
        let mut constructor = None;
        for member in named_children(body) {
            match member.kind() {
                "function_declaration" | "protocol_function_declaration" => {
                    let Some(name) = cx.name(member) else { continue };
                    let vis = if interface { Visibility::Public } else { visibility(cx, member) };
                    let mut m = method(cx.function(member, name, self.parts(cx, member)), vis);
                    m.is_abstract |= member.kind() == "protocol_function_declaration";
                    methods.push(m);
                }
                "init_declaration" => {
                    let ctor = method(cx.function(member, "init".to_string(), self.parts(cx, member)), visibility(cx, member));
                    if constructor.is_none() {
                        constructor = Some(ctor);
                    } else {
                        methods.push(ctor);
                    }
                }
                "property_declaration" | "protocol_property_declaration" => {
                    if let Some(mut prop) = self.property(cx, member) {
                        if interface {
                            prop.visibility = Visibility::Public;
                            prop.is_readonly = !child_of_kind(member, &["protocol_property_requirements"])
                                .is_some_and(|r| cx.text(r).split(|c: char| !c.is_alphanumeric()).any(|w| w == "set"));
                        }
                        properties.push(prop);
                    }
                }
                "enum_entry" => {
                    for case in children_named(member) {
                        let mut prop = cx.property(member, cx.text(case).to_string(), None, Visibility::Public);
                        prop.is_static = true;
                        prop.is_readonly = true;
                        properties.push(prop);
                    }
                }
                _ => {}
            }
        }
        (methods, properties, constructor)
    }
}

/// Case names of an `enum_entry`
fn children_named(entry: Node) -> Vec<Node> {
    let mut cursor = entry.walk();
    let names: Vec<Node> = entry.children_by_field_name("name", &mut cursor).collect();
    if names.is_empty() {
        named_children(entry)
            .into_iter()
            .filter(|c| c.kind() == "simple_identifier")
            .collect()
    } else {
        names
    }
}

impl LanguageStrategy for SwiftStrategy {
    fn kinds(&self) -> &'static NodeKinds {
        node_kinds(SupportedLanguage::Swift)
    }

    fn default_visibility(&self) -> Visibility {
        Visibility::Internal
    }

    fn parse_function(&self, cx: &Cx, node: Node) -> Option<UceFunction> {
        let name = cx.name(node)?;
        Some(cx.function(node, name, self.parts(cx, node)))
    }

    fn parse_class(&self, cx: &Cx, node: Node) -> Option<UceClass> {
        let name = cx.name(node)?;
        let kind = match declaration_kind(cx, node) {
            "struct" => ClassKind::Struct,
            "enum" => ClassKind::Enum,
            "extension" => ClassKind::Extension,
            _ => ClassKind::Class,
        };
        let (methods, properties, constructor) = class_body(node)
            .map(|b| self.members(cx, b, false))
            .unwrap_or_default();

        // only classes inherit; the first entry may still be a protocol
        let mut parents = inherited(cx, node);
        let extends = if kind == ClassKind::Class && !parents.is_empty() {
            Some(parents.remove(0))
        } else {
            None
        };

        let modifiers = declaration_modifiers(cx, node);
        Some(UceClass {
            name,
            kind,
            type_params: cx.type_params(node),
            extends,
            implements: parents,
            methods,
            properties,
            constructor,
            location: cx.location(node),
            doc_comment: cx.doc(node),
            is_abstract: false,
            modifiers,
        })
    }

    fn parse_interface(&self, cx: &Cx, node: Node) -> Option<UceInterface> {
        let name = cx.name(node)?;
        let (methods, properties, _) = class_body(node)
            .map(|b| self.members(cx, b, true))
            .unwrap_or_default();
        Some(UceInterface {
            type_params: cx.type_params(node),
            extends: inherited(cx, node),
            properties,
            methods,
            location: cx.location(node),
            modifiers: declaration_modifiers(cx, node),
            doc_comment: cx.doc(node),
            name,
        })
    }

    fn parse_type_alias(&self, cx: &Cx, node: Node) -> Option<UceTypeAlias> {
        let name = cx.name(node)?;
        Some(UceTypeAlias {
            name,
            type_params: cx.type_params(node),
            aliased_type: cx.field_text(node, "value").unwrap_or_default(),
            location: cx.location(node),
            modifiers: declaration_modifiers(cx, node),
            doc_comment: cx.doc(node),
        })
    }

    fn parse_variables(&self, cx: &Cx, node: Node) -> Vec<UceVariable> {
        let Some(name) = binding_name(cx, node) else {
            return Vec::new();
        };
        let mut modifiers = declaration_modifiers(cx, node);
        let kind = if binding_is_let(cx, node) {
            modifiers.insert(Modifier::Const);
            VariableKind::Const
        } else {
            VariableKind::Var
        };
        vec![UceVariable {
            name,
            kind,
            var_type: annotation(cx, node),
            initializer: cx.field_text(node, "value"),
            location: cx.location(node),
            modifiers,
            doc_comment: cx.doc(node),
        }]
    }

    /// `import Foundation`, `import struct Foo.Bar`
    fn parse_imports(&self, cx: &Cx, node: Node) -> Vec<UceImport> {
        let Some(path) = cx.text(node).split_whitespace().last().filter(|p| *p != "import") else {
            return Vec::new();
        };
        let (source, specifier) = match path.rsplit_once('.') {
            Some((module, member)) if cx.text(node).split_whitespace().count() > 2 => (
                module.to_string(),
                ImportSpecifier {
                    imported: member.to_string(),
                    local: member.to_string(),
                    kind: SpecifierKind::Named,
                },
            ),
            _ => (
                path.to_string(),
                ImportSpecifier {
                    imported: "*".to_string(),
                    local: "*".to_string(),
                    kind: SpecifierKind::Namespace,
                },
            ),
        };
        vec![UceImport {
            source,
            specifiers: vec![specifier],
            is_type_only: false,
            is_side_effect: false,
            location: cx.location(node),
        }]
    }
}

#[cfg(test)]
mod tests {
    use crate::SupportedLanguage;
    use crate::test_support::transform;
    use crate::uce::{ClassKind, Modifier, SpecifierKind, Visibility};

    const SOURCE: &str = r#"
import Foundation
import struct Models.User

let maxUsers = 100
var cache: [Int: String] = [:]

typealias Handler = (Int) -> Void

/// Loads things.
protocol Loader: AnyObject {
    var name: String { get }
    var offset: Int { get set }
    func load(id: Int) async throws -> Data
}

public class UserStore: BaseStore, Loader {
    private let db: Database
    public var name: String = "users"
    static var shared: UserStore?

    init(db: Database) {
        self.db = db
    }

    public func load(id: Int) async throws -> Data {
        if id < 0 {
            throw StoreError.invalid
        }
        return try await db.fetch(id)
    }

    private func reset(all: Bool = true) {}
}

struct Point {
    var x: Double
    var y: Double
}

enum Direction {
    case north, south
    case east
}

extension UserStore {
    func count() -> Int { return 0 }
}

func greet(_ name: String, times: Int = 1) -> String {
    return "hi"
}
"#;

    #[test]
    fn test_class_and_members() {
        let file = transform(SOURCE, SupportedLanguage::Swift);
        let store = file.find_class("UserStore").unwrap();
        assert_eq!(store.kind, ClassKind::Class);
        assert_eq!(store.extends.as_deref(), Some("BaseStore"));
        assert_eq!(store.implements, ["Loader"]);
        assert!(store.modifiers.contains(Modifier::Export));

        let ctor = store.constructor.as_ref().unwrap();
        assert_eq!(ctor.name(), "init");
        assert_eq!(ctor.function.params[0].name, "db");

        let methods: Vec<_> = store.methods.iter().map(|m| (m.name(), m.visibility)).collect();
        assert_eq!(methods, [("load", Visibility::Public), ("reset", Visibility::Private)]);
        let load = &store.methods[0].function;
        assert!(load.modifiers.contains(Modifier::Async));
        assert_eq!(load.return_type.as_deref(), Some("Data"));
        assert_eq!(load.complexity, 2);
        assert_eq!(store.methods[1].function.params[0].default_value.as_deref(), Some("true"));

        let props: Vec<_> = store.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(props, ["db", "name", "shared"]);
        assert!(store.properties[0].is_readonly);
        assert_eq!(store.properties[0].visibility, Visibility::Private);
        assert!(!store.properties[1].is_readonly);
        assert!(store.properties[2].is_static);
        assert_eq!(store.properties[2].visibility, Visibility::Internal);
    }

    #[test]
    fn test_struct_enum_extension() {
        let file = transform(SOURCE, SupportedLanguage::Swift);
        let kinds: Vec<_> = file.classes.iter().map(|c| (c.name.as_str(), c.kind)).collect();
        assert_eq!(
            kinds,
            [
                ("UserStore", ClassKind::Class),
                ("Point", ClassKind::Struct),
                ("Direction", ClassKind::Enum),
                ("UserStore", ClassKind::Extension)
            ]
        );
        assert_eq!(file.classes[1].properties.len(), 2);
        assert_eq!(file.classes[2].properties.len(), 3);
        assert_eq!(file.classes[3].methods[0].name(), "count");
    }

    #[test]
    fn test_protocol() {
        let file = transform(SOURCE, SupportedLanguage::Swift);
        let loader = file.find_interface("Loader").unwrap();
        assert_eq!(loader.extends, ["AnyObject"]);
        assert_eq!(loader.doc_comment.as_deref(), Some("Loads things."));
        assert_eq!(loader.properties[0].name, "name");
        assert!(loader.properties[0].is_readonly);
        assert_eq!(loader.properties[1].name, "offset");
        assert!(!loader.properties[1].is_readonly);
        assert!(loader.methods[0].is_abstract);
    }

    #[test]
    fn test_top_level() {
        let file = transform(SOURCE, SupportedLanguage::Swift);
        let greet = file.find_function("greet").unwrap();
        assert_eq!(greet.params.len(), 2);
        assert_eq!(greet.params[1].default_value.as_deref(), Some("1"));
        assert_eq!(greet.return_type.as_deref(), Some("String"));

        let vars: Vec<_> = file.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(vars, ["maxUsers", "cache"]);
        assert_eq!(file.type_aliases[0].name, "Handler");

        assert_eq!(file.imports[0].source, "Foundation");
        assert_eq!(file.imports[0].specifiers[0].kind, SpecifierKind::Namespace);
        assert_eq!(file.imports[1].source, "Models");
        assert_eq!(file.imports[1].specifiers[0].imported, "User");
    }
}
