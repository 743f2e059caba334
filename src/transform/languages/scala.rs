use super::java::qualified_import;
use crate::transform::helpers::{Cx, FnParts, child_of_kind, children_by_field, has_token, method, named_children};
use crate::transform::kinds::{NodeKinds, node_kinds};
use crate::transform::strategy::{LanguageStrategy, class_body};
use crate::language::SupportedLanguage;
use crate::uce::{
    ClassKind, ImportSpecifier, Modifier, Modifiers, SpecifierKind, UceClass, UceFunction, UceImport, UceInterface,
    UceMethod, UceProperty, UceVariable, VariableKind, Visibility,
};
use tree_sitter::Node;

pub struct ScalaStrategy;

fn modifier_words<'a>(cx: &Cx<'a>, node: Node) -> Vec<&'a str> {
    child_of_kind(node, &["modifiers"])
        .map(|m| cx.text(m).split(|c: char| c.is_whitespace() || c == '[').collect())
        .unwrap_or_default()
}

fn visibility(cx: &Cx, node: Node) -> Visibility {
    let words = modifier_words(cx, node);
    if words.contains(&"private") {
        Visibility::Private
    } else if words.contains(&"protected") {
        Visibility::Protected
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

/// `extends A(x) with B with C`
fn parents(cx: &Cx, node: Node) -> Vec<String> {
    let Some(clause) = node
        .child_by_field_name("extend")
        .or_else(|| child_of_kind(node, &["extends_clause"]))
    else {
        return Vec::new();
    };
    let types = children_by_field(clause, "type");
    let types = if types.is_empty() {
        named_children(clause)
            .into_iter()
            .filter(|t| t.kind() != "arguments")
            .collect()
    } else {
        types
    };
    types
        .into_iter()
        .flat_map(|t| cx.text(t).split(" with "))
        .map(|text| {
            let text = text.trim();
            text.split_once('(').map(|(head, _)| head.trim()).unwrap_or(text)
        })
        .filter(|text| !text.is_empty() && *text != "with")
        .map(str::to_string)
        .collect()
}

/// One import clause: `a.b.C`, `a.b._`, `a.b.{C, D => E}`
fn import_clause(cx: &Cx, node: Node, clause: &str) -> Option<UceImport> {
    let clause = clause.trim();
    if clause.is_empty() {
        return None;
    }
    if let Some((prefix, selectors)) = clause.split_once('{') {
        let source = prefix.trim().trim_end_matches('.').to_string();
        let specifiers = selectors
            .trim_end_matches('}')
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.starts_with("given"))
            .map(|s| {
                let renamed = s.split_once("=>").or_else(|| s.split_once(" as "));
                match renamed {
                    Some((imported, local)) => ImportSpecifier {
                        imported: imported.trim().to_string(),
                        local: local.trim().to_string(),
                        kind: SpecifierKind::Named,
                    },
                    None if s == "_" || s == "*" => ImportSpecifier {
                        imported: "*".to_string(),
                        local: "*".to_string(),
                        kind: SpecifierKind::Namespace,
                    },
                    None => ImportSpecifier {
                        imported: s.to_string(),
                        local: s.to_string(),
                        kind: SpecifierKind::Named,
                    },
                }
            })
            .collect();
        return Some(UceImport {
            source,
            specifiers,
            is_type_only: false,
            is_side_effect: false,
            location: cx.location(node),
        });
    }
    let normalized = clause.strip_suffix("._").map(|p| format!("{}.*", p));
    Some(qualified_import(cx, node, normalized.as_deref().unwrap_or(clause)))
}

/// Split on commas outside `{}`
pub(super) fn split_clauses(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                out.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&text[start..]);
    out
}

impl ScalaStrategy {
    fn parts(&self, cx: &Cx, node: Node) -> FnParts {
        let mut parts = cx.fn_parts(node);
        for p in parts.params.iter_mut() {
            if p.param_type.as_deref().is_some_and(|t| t.ends_with('*')) {
                p.is_rest = true;
            }
        }
        parts.modifiers = declaration_modifiers(cx, node);
        parts
    }

    fn property(&self, cx: &Cx, node: Node) -> Option<UceProperty> {
        let name = node
            .child_by_field_name("pattern")
            .or_else(|| node.child_by_field_name("name"))
            .map(|p| cx.text(p).trim().to_string())?;
        let mut prop = cx.property(node, name, cx.field_text(node, "type"), visibility(cx, node));
        prop.is_readonly |= matches!(node.kind(), "val_definition" | "val_declaration");
        prop.initializer = cx.field_text(node, "value");
        Some(prop)
    }

    fn members(&self, cx: &Cx, body: Node, static_members: bool) -> (Vec<UceMethod>, Vec<UceProperty>) {
        let mut methods = Vec::new();
        let mut properties = Vec::new();
        for member in named_children(body) {
            match member.kind() {
                "function_definition" | "function_declaration" => {
                    let Some(name) = cx.name(member) else { continue };
                    let mut m = method(cx.function(member, name, self.parts(cx, member)), visibility(cx, member));
                    m.is_abstract |= member.kind() == "function_declaration";
                    m.is_static |= static_members;
                    methods.push(m);
                }
                "val_definition" | "var_definition" | "val_declaration" | "var_declaration" => {
                    if let Some(mut prop) = self.property(cx, member) {
                        prop.is_static |= static_members;
                        properties.push(prop);
                    }
                }
                _ => {}
            }
        }
        (methods, properties)
    }
}

impl LanguageStrategy for ScalaStrategy {
    fn kinds(&self) -> &'static NodeKinds {
        node_kinds(SupportedLanguage::Scala)
    }

    fn parse_function(&self, cx: &Cx, node: Node) -> Option<UceFunction> {
        let name = cx.name(node)?;
        Some(cx.function(node, name, self.parts(cx, node)))
    }

    fn parse_class(&self, cx: &Cx, node: Node) -> Option<UceClass> {
        let name = cx.name(node)?;
        let is_case = has_token(node, "case");
        let kind = match node.kind() {
            "object_definition" => ClassKind::Object,
            "enum_definition" => ClassKind::Enum,
            _ if is_case => ClassKind::Record,
            _ => ClassKind::Class,
        };
        let (methods, mut properties) = class_body(node)
            .map(|b| self.members(cx, b, kind == ClassKind::Object))
            .unwrap_or_default();

        let mut constructor = None;
        if let Some(list) = child_of_kind(node, &["class_parameters"]) {
            let mut fields = Vec::new();
            for param in named_children(list).into_iter().filter(|p| p.kind() == "class_parameter") {
                let declares = is_case || has_token(param, "val") || has_token(param, "var");
                let Some(p) = cx.param(param).into_iter().next() else { continue };
                if declares {
                    let mut prop = cx.property(param, p.name.clone(), p.param_type.clone(), visibility(cx, param));
                    prop.is_readonly = !has_token(param, "var");
                    prop.initializer = p.default_value.clone();
                    fields.push(prop);
                }
            }
            properties.splice(0..0, fields);
            let parts = FnParts {
                params: cx.params(list),
                ..Default::default()
            };
            constructor = Some(method(cx.function(list, "this".to_string(), parts), Visibility::Public));
        }

        let mut inherited = parents(cx, node);
        let extends = (!inherited.is_empty()).then(|| inherited.remove(0));
        let modifiers = declaration_modifiers(cx, node);
        Some(UceClass {
            name,
            kind,
            type_params: cx.type_params(node),
            extends,
            implements: inherited,
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
        let (methods, properties) = class_body(node)
            .map(|b| self.members(cx, b, false))
            .unwrap_or_default();
        Some(UceInterface {
            type_params: cx.type_params(node),
            extends: parents(cx, node),
            properties,
            methods,
            location: cx.location(node),
            modifiers: declaration_modifiers(cx, node),
            doc_comment: cx.doc(node),
            name,
        })
    }

    fn parse_variables(&self, cx: &Cx, node: Node) -> Vec<UceVariable> {
        let Some(prop) = self.property(cx, node) else {
            return Vec::new();
        };
        let mut modifiers = declaration_modifiers(cx, node);
        let kind = if node.kind() == "val_definition" {
            modifiers.insert(Modifier::Const);
            VariableKind::Const
        } else {
            VariableKind::Var
        };
        vec![UceVariable {
            name: prop.name,
            kind,
            var_type: prop.property_type,
            initializer: prop.initializer,
            location: prop.location,
            modifiers,
            doc_comment: prop.doc_comment,
        }]
    }

    fn parse_imports(&self, cx: &Cx, node: Node) -> Vec<UceImport> {
        let text = cx.text(node).trim().trim_start_matches("import").trim();
        split_clauses(text)
            .into_iter()
            .filter_map(|clause| import_clause(cx, node, clause))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::SupportedLanguage;
    use crate::test_support::transform;
    use crate::uce::{ClassKind, SpecifierKind, Visibility};

    const SOURCE: &str = r#"
package com.example

import scala.collection.mutable
import scala.concurrent._
import akka.actor.{ActorSystem, Props => P}

trait Repository[T] extends Closeable {
  def find(id: Int): Option[T]
  def all(): List[T] = Nil
}

/** Stores users. */
class UserRepository(val db: Database, name: String) extends BaseRepository(db) with Repository[User] with Logging {
  private val cache = mutable.Map.empty[Int, User]
  var hits: Int = 0

  override def find(id: Int): Option[User] = {
    if (id < 0) None else cache.get(id)
  }

  protected def log(parts: String*): Unit = println(parts.mkString)
}

case class User(id: Int, name: String)

object Registry {
  val Default = "main"
  def register(user: User): Unit = ()
}
"#;

    #[test]
    fn test_class_hierarchy() {
        let file = transform(SOURCE, SupportedLanguage::Scala);
        let repo = file.find_class("UserRepository").unwrap();
        assert_eq!(repo.extends.as_deref(), Some("BaseRepository"));
        assert_eq!(repo.implements, ["Repository[User]", "Logging"]);
        assert_eq!(repo.doc_comment.as_deref(), Some("Stores users."));

        let props: Vec<_> = repo.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(props, ["db", "cache", "hits"]);
        assert_eq!(repo.properties[1].visibility, Visibility::Private);
        assert!(repo.properties[1].is_readonly);
        assert!(!repo.properties[2].is_readonly);
        assert_eq!(repo.constructor.as_ref().unwrap().function.params.len(), 2);

        let methods: Vec<_> = repo.methods.iter().map(|m| (m.name(), m.visibility)).collect();
        assert_eq!(methods, [("find", Visibility::Public), ("log", Visibility::Protected)]);
        assert_eq!(repo.methods[0].function.return_type.as_deref(), Some("Option[User]"));
        assert!(repo.methods[1].function.params[0].is_rest);
    }

    #[test]
    fn test_mixins_without_constructor_args() {
        let file = transform("class Cache extends Store with Serializable with Ordered[Cache]\n", SupportedLanguage::Scala);
        let cache = file.find_class("Cache").unwrap();
        assert_eq!(cache.extends.as_deref(), Some("Store"));
        assert_eq!(cache.implements, ["Serializable", "Ordered[Cache]"]);
    }

    #[test]
    fn test_trait_case_class_object() {
        let file = transform(SOURCE, SupportedLanguage::Scala);
        let repo = file.find_interface("Repository").unwrap();
        assert_eq!(repo.type_params, ["T"]);
        assert_eq!(repo.extends, ["Closeable"]);
        assert!(repo.methods[0].is_abstract);
        assert!(!repo.methods[1].is_abstract);

        let user = file.find_class("User").unwrap();
        assert_eq!(user.kind, ClassKind::Record);
        assert_eq!(user.properties.len(), 2);

        let registry = file.find_class("Registry").unwrap();
        assert_eq!(registry.kind, ClassKind::Object);
        assert!(registry.methods[0].is_static);
        assert!(registry.properties[0].is_static);
        assert!(file.functions.is_empty());
    }

    #[test]
    fn test_imports() {
        let file = transform(SOURCE, SupportedLanguage::Scala);
        assert_eq!(file.imports.len(), 3);
        assert_eq!(file.imports[0].source, "scala.collection");
        assert_eq!(file.imports[0].specifiers[0].imported, "mutable");
        assert_eq!(file.imports[1].source, "scala.concurrent");
        assert_eq!(file.imports[1].specifiers[0].kind, SpecifierKind::Namespace);
        let selectors: Vec<_> = file.imports[2]
            .specifiers
            .iter()
            .map(|s| (s.imported.as_str(), s.local.as_str()))
            .collect();
        assert_eq!(selectors, [("ActorSystem", "ActorSystem"), ("Props", "P")]);
    }
}
