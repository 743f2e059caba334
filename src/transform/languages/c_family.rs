//! C and C++
//!
//! Names live at the bottom of declarator chains
//! (`pointer_declarator → function_declarator → identifier`), so most of
//! this module is about walking those chains. C++ adds access-specifier
//! sections and out-of-class method definitions (`Widget::draw`).

use crate::transform::helpers::{
    Cx, FnParts, children_by_field, child_of_kind, method, module_level, named_children, unquote,
};
use crate::transform::kinds::{NodeKinds, node_kinds};
use crate::transform::strategy::LanguageStrategy;
use crate::language::SupportedLanguage;
use crate::uce::{
    ClassKind, ImportSpecifier, Modifier, Modifiers, SpecifierKind, UceClass, UceFunction, UceImport, UceMethod,
    UceTypeAlias, UceVariable, VariableKind, Visibility,
};
use tree_sitter::Node;

pub struct CFamilyStrategy {
    pub cpp: bool,
}

const SPECIFIERS: &[&str] = &["struct_specifier", "class_specifier", "union_specifier", "enum_specifier"];

/// What a declarator chain resolves to
#[derive(Debug, Default)]
struct Declarator<'t> {
    name: String,
    /// Enclosing class of a qualified name, `Widget` in `ui::Widget::draw`
    scope: Option<String>,
    function: Option<Node<'t>>,
    pointers: usize,
}

fn resolve<'t>(cx: &Cx, node: Node<'t>) -> Option<Declarator<'t>> {
    let mut out = Declarator::default();
    let mut current = node;
    loop {
        match current.kind() {
            "function_declarator" => out.function = Some(current),
            "pointer_declarator" | "reference_declarator" => out.pointers += 1,
            "qualified_identifier" => {
                let scope = current.child_by_field_name("scope").map(|s| cx.text(s).to_string());
                let name = current.child_by_field_name("name")?;
                if name.kind() == "qualified_identifier" {
                    current = name;
                    continue;
                }
                out.scope = scope.map(|s| s.rsplit("::").next().unwrap_or(&s).to_string());
                out.name = cx.text(name).trim().to_string();
                break;
            }
            "identifier" | "field_identifier" | "type_identifier" | "destructor_name" | "operator_name" => {
                out.name = cx.text(current).trim().to_string();
                break;
            }
            _ => {}
        }
        current = current
            .child_by_field_name("declarator")
            .or_else(|| named_children(current).into_iter().find(|c| c.kind() != "attribute_declaration"))?;
    }
    (!out.name.is_empty()).then_some(out)
}

fn declarators<'t>(cx: &Cx, node: Node<'t>) -> Vec<(Declarator<'t>, Node<'t>)> {
    children_by_field(node, "declarator")
        .into_iter()
        .filter_map(|d| Some((resolve(cx, d)?, d)))
        .collect()
}

fn access(cx: &Cx, node: Node) -> Option<Visibility> {
    match cx.text(node).trim().trim_end_matches(':').trim() {
        "public" => Some(Visibility::Public),
        "private" => Some(Visibility::Private),
        "protected" => Some(Visibility::Protected),
        _ => None,
    }
}

/// Has a `{ ... }` body, as opposed to a forward reference
fn bodied_specifier(node: Node) -> Option<Node> {
    let spec = if SPECIFIERS.contains(&node.kind()) {
        node
    } else {
        node.child_by_field_name("type").filter(|t| SPECIFIERS.contains(&t.kind()))?
    };
    spec.child_by_field_name("body").map(|_| spec)
}

impl CFamilyStrategy {
    fn language(&self) -> SupportedLanguage {
        if self.cpp { SupportedLanguage::Cpp } else { SupportedLanguage::C }
    }

    fn parts(&self, cx: &Cx, node: Node, decl: &Declarator) -> FnParts {
        let mut parts = FnParts {
            params: decl
                .function
                .and_then(|f| f.child_by_field_name("parameters"))
                .map(|p| cx.params(p))
                .unwrap_or_default(),
            return_type: cx
                .field_text(node, "type")
                .map(|t| format!("{}{}", t, "*".repeat(decl.pointers))),
            type_params: node
                .parent()
                .filter(|p| p.kind() == "template_declaration")
                .map(|t| cx.type_params(t))
                .unwrap_or_default(),
            modifiers: cx.modifiers(node),
            doc: None,
        };
        if let Some(f) = decl.function {
            parts.modifiers.extend(cx.modifiers(f).iter());
        }
        parts
    }

    fn top_level_function(&self, cx: &Cx, node: Node) -> Option<(UceFunction, Option<String>)> {
        let decl = resolve(cx, node.child_by_field_name("declarator")?)?;
        let mut parts = self.parts(cx, node, &decl);
        // external linkage unless `static`
        if decl.scope.is_none() && !parts.modifiers.contains(Modifier::Static) {
            parts.modifiers.insert(Modifier::Export);
        }
        let anchor = node.parent().filter(|p| p.kind() == "template_declaration").unwrap_or(node);
        let function = cx.function(anchor, decl.name.clone(), parts);
        Some((function, decl.scope))
    }

    fn member_method(&self, cx: &Cx, node: Node, decl: &Declarator, visibility: Visibility) -> UceMethod {
        let mut parts = self.parts(cx, node, decl);
        let text = cx.text(node).trim_end_matches(';').trim_end();
        let pure = text.ends_with("= 0") || text.ends_with("=0");
        if pure {
            parts.modifiers.insert(Modifier::Abstract);
        }
        method(cx.function(node, decl.name.clone(), parts), visibility)
    }

    fn members(&self, cx: &Cx, class_name: &str, body: Node, default: Visibility, class: &mut UceClass) {
        let mut current = default;
        let mut queue = named_children(body);
        queue.reverse();
        while let Some(member) = queue.pop() {
            match member.kind() {
                "access_specifier" => current = access(cx, member).unwrap_or(current),
                "template_declaration" => {
                    if let Some(inner) = named_children(member).into_iter().last() {
                        queue.push(inner);
                    }
                }
                "function_definition" | "field_declaration" | "declaration" => {
                    for (decl, node) in declarators(cx, member) {
                        if decl.function.is_some() {
                            let m = self.member_method(cx, member, &decl, current);
                            if m.name() == class_name && class.constructor.is_none() {
                                class.constructor = Some(m);
                            } else {
                                class.methods.push(m);
                            }
                        } else {
                            let ty = cx.field_text(member, "type").map(|t| format!("{}{}", t, "*".repeat(decl.pointers)));
                            let mut prop = cx.property(member, decl.name, ty, current);
                            prop.initializer = cx
                                .field_text(member, "default_value")
                                .or_else(|| cx.field_text(node, "value"));
                            class.properties.push(prop);
                        }
                    }
                }
                "enumerator" => {
                    if let Some(name) = cx.field_text(member, "name") {
                        let mut prop = cx.property(member, name, None, Visibility::Public);
                        prop.is_static = true;
                        prop.is_readonly = true;
                        prop.initializer = cx.field_text(member, "value");
                        class.properties.push(prop);
                    }
                }
                _ => {}
            }
        }
    }

    fn class(&self, cx: &Cx, spec: Node, name: String, anchor: Node) -> UceClass {
        let (kind, default) = match spec.kind() {
            "class_specifier" => (ClassKind::Class, Visibility::Private),
            "enum_specifier" => (ClassKind::Enum, Visibility::Public),
            _ => (ClassKind::Struct, Visibility::Public),
        };
        let mut implements = Vec::new();
        if let Some(bases) = child_of_kind(spec, &["base_class_clause"]) {
            implements.extend(
                named_children(bases)
                    .into_iter()
                    .filter(|b| b.kind() != "access_specifier" && b.kind() != "virtual")
                    .map(|b| cx.text(b).to_string()),
            );
        }
        let extends = (!implements.is_empty()).then(|| implements.remove(0));

        let mut class = UceClass {
            name: name.clone(),
            kind,
            type_params: anchor
                .parent()
                .filter(|p| p.kind() == "template_declaration")
                .map(|t| cx.type_params(t))
                .unwrap_or_default(),
            extends,
            implements,
            location: cx.location(anchor),
            modifiers: cx.modifiers(anchor),
            doc_comment: cx.doc(anchor),
            ..Default::default()
        };
        if let Some(body) = spec.child_by_field_name("body") {
            self.members(cx, &name, body, default, &mut class);
        }
        class.is_abstract = class.methods.iter().any(|m| m.is_abstract);
        if class.is_abstract {
            class.modifiers.insert(Modifier::Abstract);
        }
        class
    }
}

impl LanguageStrategy for CFamilyStrategy {
    fn kinds(&self) -> &'static NodeKinds {
        node_kinds(self.language())
    }

    fn extract_functions(&self, cx: &Cx, root: Node) -> Vec<UceFunction> {
        let kinds = self.kinds();
        module_level(root, kinds.functions, kinds.wrappers)
            .into_iter()
            .filter_map(|n| self.top_level_function(cx, n))
            .filter(|(_, scope)| scope.is_none())
            .map(|(f, _)| f)
            .collect()
    }

    fn extract_classes(&self, cx: &Cx, root: Node) -> Vec<UceClass> {
        let kinds = self.kinds();
        let mut classes: Vec<UceClass> = module_level(root, kinds.classes, kinds.wrappers)
            .into_iter()
            .filter_map(|node| {
                let spec = bodied_specifier(node)?;
                let name = if node.kind() == "type_definition" {
                    declarators(cx, node).into_iter().next().map(|(d, _)| d.name)
                } else {
                    None
                }
                .or_else(|| cx.field_text(spec, "name"))?;
                Some(self.class(cx, spec, name, node))
            })
            .collect();

        // `void Widget::draw() { ... }`
        for node in module_level(root, kinds.functions, kinds.wrappers) {
            let Some((function, Some(owner))) = self.top_level_function(cx, node) else { continue };
            let visibility = Visibility::Public;
            let existing = classes.iter_mut().find(|c| c.name == owner);
            let m = method(function, visibility);
            match existing {
                Some(class) => match class.methods.iter_mut().find(|d| d.name() == m.name()) {
                    // replace the in-class prototype with the definition
                    Some(declared) => {
                        let visibility = declared.visibility;
                        *declared = UceMethod { visibility, ..m };
                    }
                    None if m.name() == owner => class.constructor = Some(m),
                    None => class.methods.push(m),
                },
                None => classes.push(UceClass {
                    kind: ClassKind::Extension,
                    location: m.function.location.clone(),
                    name: owner,
                    methods: vec![m],
                    ..Default::default()
                }),
            }
        }
        classes
    }

    fn extract_type_aliases(&self, cx: &Cx, root: Node) -> Vec<UceTypeAlias> {
        let kinds = self.kinds();
        let mut out = Vec::new();
        for node in module_level(root, kinds.type_aliases, kinds.wrappers) {
            if node.kind() == "alias_declaration" {
                if let Some(name) = cx.field_text(node, "name") {
                    out.push(UceTypeAlias {
                        name,
                        type_params: Vec::new(),
                        aliased_type: cx.field_text(node, "type").unwrap_or_default(),
                        location: cx.location(node),
                        modifiers: Modifiers::new(),
                        doc_comment: cx.doc(node),
                    });
                }
                continue;
            }
            if bodied_specifier(node).is_some() {
                continue;
            }
            let target = cx.field_text(node, "type").unwrap_or_default();
            for (decl, _) in declarators(cx, node) {
                out.push(UceTypeAlias {
                    name: decl.name,
                    type_params: Vec::new(),
                    aliased_type: format!("{}{}", target, "*".repeat(decl.pointers)),
                    location: cx.location(node),
                    modifiers: Modifiers::new(),
                    doc_comment: cx.doc(node),
                });
            }
        }
        out
    }

    fn parse_variables(&self, cx: &Cx, node: Node) -> Vec<UceVariable> {
        let mods = cx.modifiers(node);
        let kind = if mods.contains(Modifier::Static) {
            VariableKind::Static
        } else if mods.contains(Modifier::Const) {
            VariableKind::Const
        } else {
            VariableKind::Var
        };
        let has_extern = named_children(node)
            .iter()
            .any(|c| c.kind() == "storage_class_specifier" && cx.text(*c) == "extern");
        declarators(cx, node)
            .into_iter()
            .filter(|(decl, _)| decl.function.is_none())
            .map(|(decl, d)| {
                let mut modifiers = mods.clone();
                if kind != VariableKind::Static && !has_extern {
                    modifiers.insert(Modifier::Export);
                }
                UceVariable {
                    var_type: cx.field_text(node, "type").map(|t| format!("{}{}", t, "*".repeat(decl.pointers))),
                    initializer: cx.field_text(d, "value"),
                    location: cx.location(node),
                    modifiers,
                    doc_comment: cx.doc(node),
                    name: decl.name,
                    kind,
                }
            })
            .collect()
    }

    fn parse_imports(&self, cx: &Cx, node: Node) -> Vec<UceImport> {
        if node.kind() == "preproc_include" {
            let Some(path) = cx.field_text(node, "path") else {
                return Vec::new();
            };
            let source = unquote(path.trim_start_matches('<').trim_end_matches('>'));
            return vec![UceImport {
                source,
                specifiers: Vec::new(),
                is_type_only: false,
                is_side_effect: true,
                location: cx.location(node),
            }];
        }

        // using namespace std; / using std::string;
        let text = cx.text(node).trim_start_matches("using").trim_end_matches(';').trim();
        let (source, specifier) = match text.strip_prefix("namespace") {
            Some(ns) => {
                let ns = ns.trim().to_string();
                (
                    ns.clone(),
                    ImportSpecifier {
                        local: "*".to_string(),
                        imported: "*".to_string(),
                        kind: SpecifierKind::Namespace,
                    },
                )
            }
            None => {
                let (scope, member) = text.rsplit_once("::").unwrap_or(("", text));
                (
                    scope.to_string(),
                    ImportSpecifier {
                        local: member.to_string(),
                        imported: member.to_string(),
                        kind: SpecifierKind::Named,
                    },
                )
            }
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
    use crate::uce::{ClassKind, Modifier, VariableKind, Visibility};

    const C_SOURCE: &str = r#"
#include <stdio.h>
#include "point.h"

#define MAX 10

static int counter = 0;
const char *name = "demo";

typedef unsigned long size_type;

/* A 2D point. */
typedef struct {
    int x;
    int y;
} Point;

struct Node {
    struct Node *next;
    int value;
};

enum Color { RED, GREEN = 2 };

int add(int a, int b);

/* Adds two numbers. */
int add(int a, int b) {
    return a + b;
}

static char *dup(const char *s, size_t n) {
    if (n == 0 || s == NULL) {
        return NULL;
    }
    return strdup(s);
}
"#;

    #[test]
    fn test_c_functions() {
        let file = transform(C_SOURCE, SupportedLanguage::C);
        let names: Vec<_> = file.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["add", "dup"]);

        let add = &file.functions[0];
        assert_eq!(add.doc_comment.as_deref(), Some("Adds two numbers."));
        assert_eq!(add.params.len(), 2);
        assert_eq!(add.params[0].param_type.as_deref(), Some("int"));
        assert!(add.modifiers.contains(Modifier::Export));

        let dup = &file.functions[1];
        assert!(dup.modifiers.contains(Modifier::Static));
        assert!(!dup.modifiers.contains(Modifier::Export));
        assert_eq!(dup.return_type.as_deref(), Some("char*"));
        assert_eq!(dup.complexity, 3);
    }

    #[test]
    fn test_c_structs_and_typedefs() {
        let file = transform(C_SOURCE, SupportedLanguage::C);
        let classes: Vec<_> = file.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(classes, ["Point", "Node", "Color"]);

        let point = &file.classes[0];
        assert_eq!(point.kind, ClassKind::Struct);
        assert_eq!(point.properties.len(), 2);
        assert_eq!(point.doc_comment.as_deref(), Some("A 2D point."));
        assert_eq!(file.classes[1].properties[0].name, "next");
        assert_eq!(file.classes[2].kind, ClassKind::Enum);

        let aliases: Vec<_> = file.type_aliases.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(aliases, ["size_type"]);
    }

    #[test]
    fn test_c_variables_and_includes() {
        let file = transform(C_SOURCE, SupportedLanguage::C);
        let vars: Vec<_> = file.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(vars, ["counter", "name"]);
        assert_eq!(file.variables[0].kind, VariableKind::Static);
        assert_eq!(file.variables[1].kind, VariableKind::Const);

        let sources: Vec<_> = file.imports.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, ["stdio.h", "point.h"]);
        assert!(file.imports[0].is_side_effect);
    }

    const CPP_SOURCE: &str = r#"
#include <vector>
using namespace std;
using std::string;

namespace ui {

class Shape {
public:
    virtual double area() const = 0;
    virtual ~Shape() {}
};

class Widget : public Shape, private Drawable {
    int width;
public:
    Widget(int w);
    double area() const override { return width; }
    void draw();
    static Widget *create();
protected:
    string label;
};

Widget::Widget(int w) : width(w) {}

void Widget::draw() {
    for (int i = 0; i < width; i++) {}
}

void Orphan::run() {}

template <typename T>
T clamp(T v, T lo, T hi) {
    return v < lo ? lo : (v > hi ? hi : v);
}

using Widgets = vector<Widget>;

}
"#;

    #[test]
    fn test_cpp_classes() {
        let file = transform(CPP_SOURCE, SupportedLanguage::Cpp);
        let shape = file.find_class("Shape").unwrap();
        assert!(shape.is_abstract);
        assert_eq!(shape.methods[0].visibility, Visibility::Public);

        let widget = file.find_class("Widget").unwrap();
        assert_eq!(widget.kind, ClassKind::Class);
        assert_eq!(widget.extends.as_deref(), Some("Shape"));
        assert_eq!(widget.implements, ["Drawable"]);
        assert!(widget.constructor.is_some());

        let width = widget.properties.iter().find(|p| p.name == "width").unwrap();
        assert_eq!(width.visibility, Visibility::Private);
        let label = widget.properties.iter().find(|p| p.name == "label").unwrap();
        assert_eq!(label.visibility, Visibility::Protected);

        let methods: Vec<_> = widget.methods.iter().map(|m| m.name()).collect();
        assert_eq!(methods, ["area", "draw", "create"]);
        let draw = &widget.methods[1];
        assert_eq!(draw.visibility, Visibility::Public);
        assert_eq!(draw.function.complexity, 2);
        assert!(widget.methods[2].is_static);

        let orphan = file.find_class("Orphan").unwrap();
        assert_eq!(orphan.kind, ClassKind::Extension);
    }

    #[test]
    fn test_cpp_functions_and_imports() {
        let file = transform(CPP_SOURCE, SupportedLanguage::Cpp);
        let names: Vec<_> = file.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["clamp"]);
        assert_eq!(file.functions[0].type_params, ["T"]);
        assert_eq!(file.functions[0].complexity, 3);

        assert_eq!(file.type_aliases[0].name, "Widgets");

        let sources: Vec<_> = file.imports.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, ["vector", "std", "std"]);
        assert_eq!(file.imports[2].specifiers[0].local, "string");
    }
}
