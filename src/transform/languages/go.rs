//! Go
//!
//! `type_spec` carries structs, interfaces and defined types alike; the
//! inner type node decides which entity it becomes. Methods are declared
//! at top level with a receiver and attach to the receiver's struct.

use crate::transform::helpers::{
    Cx, children_by_field, descendants_of_kind, is_capitalized, method, module_level, named_children, unquote,
};
use crate::transform::kinds::{NodeKinds, node_kinds};
use crate::transform::strategy::LanguageStrategy;
use crate::language::SupportedLanguage;
use crate::uce::{
    ClassKind, ImportSpecifier, Modifier, Modifiers, SpecifierKind, UceClass, UceFunction, UceImport, UceInterface,
    UceMethod, UceProperty, UceTypeAlias, UceVariable, VariableKind, Visibility,
};
use tree_sitter::Node;

pub struct GoStrategy;

fn visibility(name: &str) -> Visibility {
    if is_capitalized(name) { Visibility::Public } else { Visibility::Private }
}

fn export_modifiers(name: &str) -> Modifiers {
    if is_capitalized(name) {
        Modifiers::new().with(Modifier::Export)
    } else {
        Modifiers::new()
    }
}

/// `type_spec` nodes of every module-level `type` declaration
fn type_specs<'t>(root: Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    module_level(root, &["type_declaration"], &[])
        .into_iter()
        .flat_map(|decl| named_children(decl).into_iter().filter(|s| kinds.contains(&s.kind())))
        .collect()
}

fn spec_type(spec: Node) -> Option<&'static str> {
    spec.child_by_field_name("type").map(|t| t.kind())
}

/// `(s *Server)` → `Server`; `(l List[T])` → `List`
fn receiver_type(cx: &Cx, method: Node) -> Option<String> {
    let receiver = method.child_by_field_name("receiver")?;
    let param = named_children(receiver).into_iter().next()?;
    let ty = param.child_by_field_name("type")?;
    let name = descendants_of_kind(ty, &["type_identifier"], &["type_arguments"])
        .into_iter()
        .next()
        .map(|n| cx.text(n).to_string())
        .unwrap_or_else(|| cx.text(ty).trim_start_matches('*').to_string());
    (!name.is_empty()).then_some(name)
}

impl GoStrategy {
    fn struct_class(&self, cx: &Cx, spec: Node, name: String) -> UceClass {
        let mut properties = Vec::new();
        let fields = spec
            .child_by_field_name("type")
            .and_then(|t| named_children(t).into_iter().find(|c| c.kind() == "field_declaration_list"));
        for field in fields.map(named_children).unwrap_or_default() {
            if field.kind() != "field_declaration" {
                continue;
            }
            let field_type = cx.field_text(field, "type");
            let names = children_by_field(field, "name");
            if names.is_empty() {
                // embedded type
                let Some(ty) = field_type.clone() else { continue };
                let embedded = ty.trim_start_matches('*').rsplit('.').next().unwrap_or(&ty).to_string();
                properties.push(self.field_property(cx, field, embedded, field_type));
                continue;
            }
            for n in names {
                properties.push(self.field_property(cx, field, cx.text(n).to_string(), field_type.clone()));
            }
        }

        let decl = spec.parent().filter(|p| p.kind() == "type_declaration").unwrap_or(spec);
        UceClass {
            kind: ClassKind::Struct,
            type_params: cx.type_params(spec),
            properties,
            location: cx.location(spec),
            modifiers: export_modifiers(&name),
            doc_comment: cx.doc(spec).or_else(|| cx.doc(decl)),
            name,
            ..Default::default()
        }
    }

    fn field_property(&self, cx: &Cx, field: Node, name: String, ty: Option<String>) -> UceProperty {
        let visibility = visibility(&name);
        let mut prop = cx.property(field, name, ty, visibility);
        prop.initializer = None;
        prop
    }

    fn go_method(&self, cx: &Cx, node: Node) -> Option<UceMethod> {
        let name = cx.name(node)?;
        let mut parts = cx.fn_parts(node);
        parts.modifiers.extend(export_modifiers(&name).iter());
        let visibility = visibility(&name);
        Some(method(cx.function(node, name, parts), visibility))
    }
}

impl LanguageStrategy for GoStrategy {
    fn kinds(&self) -> &'static NodeKinds {
        node_kinds(SupportedLanguage::Go)
    }

    fn parse_function(&self, cx: &Cx, node: Node) -> Option<UceFunction> {
        let name = cx.name(node)?;
        let mut parts = cx.fn_parts(node);
        parts.modifiers.extend(export_modifiers(&name).iter());
        Some(cx.function(node, name, parts))
    }

    fn extract_classes(&self, cx: &Cx, root: Node) -> Vec<UceClass> {
        let mut classes: Vec<UceClass> = type_specs(root, &["type_spec"])
            .into_iter()
            .filter(|spec| spec_type(*spec) == Some("struct_type"))
            .filter_map(|spec| Some(self.struct_class(cx, spec, cx.name(spec)?)))
            .collect();

        for decl in module_level(root, self.kinds().methods, &[]) {
            let Some(m) = self.go_method(cx, decl) else { continue };
            let Some(owner) = receiver_type(cx, decl) else { continue };
            match classes.iter_mut().find(|c| c.name == owner) {
                Some(class) => class.methods.push(m),
                None => classes.push(UceClass {
                    kind: ClassKind::Extension,
                    location: m.function.location.clone(),
                    modifiers: export_modifiers(&owner),
                    name: owner,
                    methods: vec![m],
                    ..Default::default()
                }),
            }
        }
        classes
    }

    fn extract_interfaces(&self, cx: &Cx, root: Node) -> Vec<UceInterface> {
        type_specs(root, &["type_spec"])
            .into_iter()
            .filter(|spec| spec_type(*spec) == Some("interface_type"))
            .filter_map(|spec| {
                let name = cx.name(spec)?;
                let body = spec.child_by_field_name("type")?;
                let mut methods = Vec::new();
                let mut extends = Vec::new();
                for elem in named_children(body) {
                    match elem.kind() {
                        "method_elem" | "method_spec" => methods.extend(self.go_method(cx, elem)),
                        _ => extends.push(cx.text(elem).trim().to_string()),
                    }
                }
                let decl = spec.parent().unwrap_or(spec);
                Some(UceInterface {
                    type_params: cx.type_params(spec),
                    extends,
                    methods,
                    location: cx.location(spec),
                    modifiers: export_modifiers(&name),
                    doc_comment: cx.doc(spec).or_else(|| cx.doc(decl)),
                    name,
                    ..Default::default()
                })
            })
            .collect()
    }

    fn extract_type_aliases(&self, cx: &Cx, root: Node) -> Vec<UceTypeAlias> {
        type_specs(root, &["type_spec", "type_alias"])
            .into_iter()
            .filter(|spec| !matches!(spec_type(*spec), Some("struct_type" | "interface_type")))
            .filter_map(|spec| {
                let name = cx.name(spec)?;
                Some(UceTypeAlias {
                    type_params: cx.type_params(spec),
                    aliased_type: cx.field_text(spec, "type").unwrap_or_default(),
                    location: cx.location(spec),
                    modifiers: export_modifiers(&name),
                    doc_comment: cx.doc(spec),
                    name,
                })
            })
            .collect()
    }

    fn parse_variables(&self, cx: &Cx, node: Node) -> Vec<UceVariable> {
        let kind = if node.kind() == "const_declaration" { VariableKind::Const } else { VariableKind::Var };
        let mut out = Vec::new();
        for spec in descendants_of_kind(node, &["var_spec", "const_spec"], &[]) {
            let values: Vec<String> = spec
                .child_by_field_name("value")
                .map(|list| named_children(list).into_iter().map(|v| cx.text(v).to_string()).collect())
                .unwrap_or_default();
            for (i, n) in children_by_field(spec, "name").into_iter().enumerate() {
                let name = cx.text(n).to_string();
                if name == "_" {
                    continue;
                }
                let mut modifiers = export_modifiers(&name);
                if kind == VariableKind::Const {
                    modifiers.insert(Modifier::Const);
                }
                out.push(UceVariable {
                    kind,
                    var_type: cx.field_text(spec, "type"),
                    initializer: values.get(i).cloned(),
                    location: cx.location(spec),
                    modifiers,
                    doc_comment: cx.doc(spec).or_else(|| cx.doc(node)),
                    name,
                });
            }
        }
        out
    }

    fn parse_imports(&self, cx: &Cx, node: Node) -> Vec<UceImport> {
        descendants_of_kind(node, &["import_spec"], &[])
            .into_iter()
            .filter_map(|spec| {
                let source = unquote(&cx.field_text(spec, "path")?);
                let alias = cx.field_text(spec, "name");
                let package = source.rsplit('/').next().unwrap_or(&source).to_string();
                let is_side_effect = alias.as_deref() == Some("_");
                let specifiers = if is_side_effect {
                    Vec::new()
                } else {
                    vec![ImportSpecifier {
                        local: alias.unwrap_or(package),
                        imported: source.clone(),
                        kind: SpecifierKind::Namespace,
                    }]
                };
                Some(UceImport {
                    source,
                    specifiers,
                    is_type_only: false,
                    is_side_effect,
                    location: cx.location(spec),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::SupportedLanguage;
    use crate::test_support::transform;
    use crate::uce::{ClassKind, Modifier, VariableKind, Visibility};

    const USER: &str = r#"package users

import (
	"fmt"
	str "strings"
	_ "net/http/pprof"
)

const MaxUsers = 100

var (
	registry, count = map[string]*User{}, 0
)

// User is an account.
type User struct {
	ID       int
	isActive bool
}

type Store interface {
	io.Closer
	Get(id int) (*User, error)
	put(u *User) error
}

type UserID = int

type Celsius float64

// NewUser builds a user.
func NewUser(id int) *User {
	return &User{ID: id}
}

func (u *User) Activate() {
	u.isActive = true
}

func (u User) name() string {
	return fmt.Sprint(u.ID)
}

func (c Celsius) String() string {
	return str.TrimSpace(fmt.Sprint(float64(c)))
}
"#;

    #[test]
    fn test_struct_fields_visibility() {
        let file = transform(USER, SupportedLanguage::Go);
        let structs: Vec<_> = file.classes.iter().filter(|c| c.kind == ClassKind::Struct).collect();
        assert_eq!(structs.len(), 1);

        let user = structs[0];
        assert_eq!(user.name, "User");
        assert_eq!(user.properties.len(), 2);
        assert_eq!(user.properties[0].name, "ID");
        assert_eq!(user.properties[0].visibility, Visibility::Public);
        assert_eq!(user.properties[1].name, "isActive");
        assert_eq!(user.properties[1].visibility, Visibility::Private);
        assert_eq!(user.doc_comment.as_deref(), Some("User is an account."));
        assert!(user.modifiers.contains(Modifier::Export));
    }

    #[test]
    fn test_one_line_struct_without_package() {
        let file = transform("type User struct { ID string; isActive bool }", SupportedLanguage::Go);
        let user = file.find_class("User").unwrap();
        assert_eq!(user.kind, ClassKind::Struct);
        let fields: Vec<_> = user.properties.iter().map(|p| (p.name.as_str(), p.visibility)).collect();
        assert_eq!(fields, [("ID", Visibility::Public), ("isActive", Visibility::Private)]);
        assert_eq!(user.properties[0].property_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_methods_attach_to_receiver() {
        let file = transform(USER, SupportedLanguage::Go);
        let user = file.find_class("User").unwrap();
        let methods: Vec<_> = user.methods.iter().map(|m| m.name()).collect();
        assert_eq!(methods, ["Activate", "name"]);
        assert_eq!(user.methods[0].visibility, Visibility::Public);
        assert_eq!(user.methods[1].visibility, Visibility::Private);

        let celsius = file.find_class("Celsius").unwrap();
        assert_eq!(celsius.kind, ClassKind::Extension);
        assert_eq!(celsius.methods[0].name(), "String");
    }

    #[test]
    fn test_functions_exclude_methods() {
        let file = transform(USER, SupportedLanguage::Go);
        let names: Vec<_> = file.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["NewUser"]);
        assert!(file.functions[0].modifiers.contains(Modifier::Export));
        assert_eq!(file.functions[0].return_type.as_deref(), Some("*User"));
    }

    #[test]
    fn test_interface_from_type_spec() {
        let file = transform(USER, SupportedLanguage::Go);
        assert_eq!(file.interfaces.len(), 1);
        let store = &file.interfaces[0];
        assert_eq!(store.name, "Store");
        assert_eq!(store.extends, ["io.Closer"]);
        assert_eq!(store.methods.len(), 2);
        assert_eq!(store.methods[1].visibility, Visibility::Private);
    }

    #[test]
    fn test_type_aliases_and_variables() {
        let file = transform(USER, SupportedLanguage::Go);
        let aliases: Vec<_> = file.type_aliases.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(aliases, ["UserID", "Celsius"]);

        let vars: Vec<_> = file.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(vars, ["MaxUsers", "registry", "count"]);
        assert_eq!(file.variables[0].kind, VariableKind::Const);
        assert_eq!(file.variables[2].initializer.as_deref(), Some("0"));
    }

    #[test]
    fn test_imports() {
        let file = transform(USER, SupportedLanguage::Go);
        assert_eq!(file.imports.len(), 3);
        assert_eq!(file.imports[0].specifiers[0].local, "fmt");
        assert_eq!(file.imports[1].specifiers[0].local, "str");
        assert!(file.imports[2].is_side_effect);
    }
}
