//! Elixir
//!
//! Every declaration is a macro call: `defmodule`, `def`/`defp`,
//! `defprotocol`, `defstruct`, `alias`. Module attributes carry the
//! metadata other languages spell as syntax (`@doc`, `@spec`,
//! `@behaviour`), so module bodies are read in order with the pending
//! attributes applied to the next definition.

use crate::transform::docs::clean_docstring;
use crate::transform::helpers::{Cx, FnParts, child_of_kind, children, method, named_children};
use crate::transform::kinds::{NodeKinds, node_kinds};
use crate::transform::strategy::LanguageStrategy;
use crate::language::SupportedLanguage;
use crate::uce::{
    ClassKind, ImportSpecifier, Modifier, Modifiers, SpecifierKind, UceClass, UceFunction, UceImport, UceInterface,
    UceMethod, UceParameter, Visibility,
};
use tree_sitter::Node;

pub struct ElixirStrategy;

const DEFINITIONS: &[&str] = &["def", "defp", "defmacro", "defmacrop", "defguard", "defguardp"];
const IMPORT_MACROS: &[&str] = &["alias", "import", "require", "use"];
/// Attributes that are metadata rather than module constants
const RESERVED_ATTRIBUTES: &[&str] = &[
    "doc", "moduledoc", "typedoc", "spec", "type", "typep", "opaque", "callback", "macrocallback", "impl",
    "behaviour", "derive", "enforce_keys", "compile", "dialyzer", "deprecated", "since",
];

fn target<'a>(cx: &Cx<'a>, node: Node) -> Option<&'a str> {
    if node.kind() != "call" {
        return None;
    }
    node.child_by_field_name("target").map(|t| cx.text(t))
}

fn arguments(node: Node) -> Vec<Node> {
    child_of_kind(node, &["arguments"]).map(named_children).unwrap_or_default()
}

fn do_block(node: Node) -> Option<Node> {
    child_of_kind(node, &["do_block"])
}

/// `@name value` as (name, value)
fn attribute<'t>(cx: &Cx<'t>, node: Node<'t>) -> Option<(&'t str, Option<Node<'t>>)> {
    if node.kind() != "unary_operator" || !cx.text(node).starts_with('@') {
        return None;
    }
    let operand = node.child_by_field_name("operand")?;
    match operand.kind() {
        "call" => Some((target(cx, operand)?, arguments(operand).into_iter().next())),
        "identifier" => Some((cx.text(operand), None)),
        _ => None,
    }
}

/// `@doc "..."`; `@doc false` hides the definition
fn doc_value(cx: &Cx, value: Option<Node>) -> Option<String> {
    let value = value?;
    if value.kind() != "string" && value.kind() != "sigil" {
        return None;
    }
    let text = clean_docstring(cx.text(value));
    (!text.is_empty()).then_some(text)
}

/// Split on commas outside brackets
fn split_top_level(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                out.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if !current.trim().is_empty() {
        out.push(current.trim().to_string());
    }
    out
}

/// `@spec name(a, b) :: ret` as (argument types, return type)
fn spec_types(spec: &str) -> (Vec<String>, Option<String>) {
    let Some((head, ret)) = spec.split_once("::") else {
        return (Vec::new(), None);
    };
    let args = head
        .split_once('(')
        .map(|(_, rest)| split_top_level(rest.trim().trim_end_matches(')')))
        .unwrap_or_default();
    let ret = ret.trim();
    (args, (!ret.is_empty()).then(|| ret.to_string()))
}

/// Attributes seen since the last definition
#[derive(Default)]
struct Pending {
    doc: Option<String>,
    hidden: bool,
    spec: Option<String>,
}

impl ElixirStrategy {
    /// Name, argument nodes and guard of a `def` head
    fn head<'t>(&self, cx: &Cx<'t>, def: Node<'t>) -> Option<(String, Vec<Node<'t>>)> {
        let first = arguments(def).into_iter().next()?;
        let call = if first.kind() == "binary_operator"
            && first.child_by_field_name("operator").is_some_and(|o| cx.text(o) == "when")
        {
            first.child_by_field_name("left")?
        } else {
            first
        };
        match call.kind() {
            "call" => Some((target(cx, call)?.to_string(), arguments(call))),
            "identifier" => Some((cx.text(call).to_string(), Vec::new())),
            _ => None,
        }
    }

    fn param(&self, cx: &Cx, arg: Node) -> UceParameter {
        // `opts \\ []`
        if arg.kind() == "binary_operator" && arg.child_by_field_name("operator").is_some_and(|o| cx.text(o) == "\\\\") {
            let name = arg.child_by_field_name("left").map(|l| cx.text(l)).unwrap_or("");
            let default = arg.child_by_field_name("right").map(|r| cx.text(r).trim().to_string());
            return UceParameter {
                name: name.trim().to_string(),
                is_optional: true,
                default_value: default,
                ..Default::default()
            };
        }
        UceParameter {
            name: cx.text(arg).trim().to_string(),
            ..Default::default()
        }
    }

    fn definition(&self, cx: &Cx, node: Node, pending: &Pending) -> Option<UceMethod> {
        let macro_name = target(cx, node)?;
        let (name, args) = self.head(cx, node)?;
        let (types, return_type) = pending.spec.as_deref().map(spec_types).unwrap_or_default();
        let params = args
            .into_iter()
            .enumerate()
            .map(|(i, a)| {
                let mut p = self.param(cx, a);
                p.param_type = types.get(i).cloned();
                p
            })
            .collect();
        let private = macro_name.ends_with('p');
        let mut modifiers = Modifiers::new().with(Modifier::Static);
        if !private {
            modifiers.insert(Modifier::Export);
        }
        let parts = FnParts {
            params,
            return_type,
            modifiers,
            doc: if pending.hidden { None } else { pending.doc.clone() },
            ..Default::default()
        };
        let visibility = if private { Visibility::Private } else { Visibility::Public };
        let mut m = method(cx.function(node, name, parts), visibility);
        m.is_abstract = do_block(node).is_none() && !arguments(node).iter().any(|a| a.kind() == "keywords");
        Some(m)
    }

    /// Append a clause, merging with an earlier clause of the same name and arity
    fn push_clause(&self, cx: &Cx, methods: &mut Vec<UceMethod>, mut m: UceMethod) {
        let arity = m.function.params.len();
        match methods
            .iter_mut()
            .find(|e| e.function.name == m.function.name && e.function.params.len() == arity)
        {
            Some(existing) => {
                existing.function.location.end_line = m.function.location.end_line;
                existing.function.location.end_column = m.function.location.end_column;
                if cx.options.complexity {
                    existing.function.complexity += m.function.complexity;
                }
                if existing.function.doc_comment.is_none() {
                    existing.function.doc_comment = m.function.doc_comment.take();
                }
            }
            None => methods.push(m),
        }
    }

    fn struct_fields(&self, cx: &Cx, node: Node, class: &mut UceClass) {
        let mut stack: Vec<Node> = arguments(node).into_iter().rev().collect();
        while let Some(item) = stack.pop() {
            match item.kind() {
                "list" | "keywords" => stack.extend(named_children(item).into_iter().rev()),
                "atom" => {
                    let name = cx.text(item).trim_start_matches(':').to_string();
                    class.properties.push(cx.property(item, name, None, Visibility::Public));
                }
                "pair" => {
                    let Some(key) = item.child_by_field_name("key") else { continue };
                    let name = cx.text(key).trim().trim_end_matches(':').to_string();
                    let mut prop = cx.property(item, name, None, Visibility::Public);
                    prop.initializer = item.child_by_field_name("value").map(|v| cx.text(v).trim().to_string());
                    class.properties.push(prop);
                }
                _ => {}
            }
        }
    }

    fn module(&self, cx: &Cx, node: Node) -> Option<UceClass> {
        let name = arguments(node).first().map(|a| cx.text(*a).trim().to_string())?;
        let mut class = UceClass {
            name,
            kind: ClassKind::Module,
            location: cx.location(node),
            modifiers: Modifiers::new().with(Modifier::Export),
            ..Default::default()
        };
        let mut pending = Pending::default();
        for stmt in do_block(node).map(named_children).unwrap_or_default() {
            if let Some((attr, value)) = attribute(cx, stmt) {
                match attr {
                    "moduledoc" => class.doc_comment = doc_value(cx, value),
                    "doc" => {
                        pending.hidden = value.is_some_and(|v| cx.text(v) == "false");
                        pending.doc = doc_value(cx, value);
                    }
                    "spec" => pending.spec = value.map(|v| cx.text(v).to_string()),
                    "behaviour" => class.implements.extend(value.map(|v| cx.text(v).trim().to_string())),
                    _ if RESERVED_ATTRIBUTES.contains(&attr) => {}
                    _ => {
                        let mut prop = cx.property(stmt, attr.to_string(), None, Visibility::Private);
                        prop.is_static = true;
                        prop.is_readonly = true;
                        prop.initializer = value.map(|v| cx.text(v).trim().to_string());
                        class.properties.push(prop);
                    }
                }
                continue;
            }
            match target(cx, stmt) {
                Some(t) if DEFINITIONS.contains(&t) => {
                    if let Some(m) = self.definition(cx, stmt, &pending) {
                        self.push_clause(cx, &mut class.methods, m);
                    }
                    pending = Pending::default();
                }
                Some("defstruct") => self.struct_fields(cx, stmt, &mut class),
                _ => {}
            }
        }
        Some(class)
    }

    /// Module and protocol calls, including nested modules, in document order
    fn containers<'t>(&self, cx: &Cx, root: Node<'t>, kind: &str) -> Vec<Node<'t>> {
        let mut out = Vec::new();
        let mut stack: Vec<Node<'t>> = children(root).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            let Some(t) = target(cx, node) else { continue };
            if t == kind {
                out.push(node);
            }
            if t == "defmodule" {
                if let Some(body) = do_block(node) {
                    stack.extend(children(body).into_iter().rev());
                }
            }
        }
        out
    }

    fn import(&self, cx: &Cx, node: Node, macro_name: &str) -> Vec<UceImport> {
        let args = arguments(node);
        let Some(first) = args.first() else {
            return Vec::new();
        };
        let path = cx.text(*first).trim();
        let location = cx.location(node);
        let build = |source: String, specifiers: Vec<ImportSpecifier>, side_effect: bool| UceImport {
            source,
            specifiers,
            is_type_only: false,
            is_side_effect: side_effect,
            location: location.clone(),
        };

        match macro_name {
            "alias" => {
                // alias Foo.{A, B}
                if let Some((prefix, group)) = path.split_once(".{") {
                    let specifiers = group
                        .trim_end_matches('}')
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(|s| ImportSpecifier {
                            local: s.rsplit('.').next().unwrap_or(s).to_string(),
                            imported: s.to_string(),
                            kind: SpecifierKind::Named,
                        })
                        .collect();
                    return vec![build(prefix.to_string(), specifiers, false)];
                }
                let last = path.rsplit('.').next().unwrap_or(path).to_string();
                let local = args
                    .iter()
                    .skip(1)
                    .flat_map(|k| named_children(*k))
                    .find(|p| p.child_by_field_name("key").is_some_and(|k| cx.text(k).trim().starts_with("as")))
                    .and_then(|p| p.child_by_field_name("value"))
                    .map(|v| cx.text(v).trim().to_string())
                    .unwrap_or_else(|| last.clone());
                vec![build(
                    path.to_string(),
                    vec![ImportSpecifier {
                        local,
                        imported: last,
                        kind: SpecifierKind::Named,
                    }],
                    false,
                )]
            }
            "use" => vec![build(path.to_string(), Vec::new(), true)],
            _ => {
                let local = if macro_name == "require" { path.to_string() } else { "*".to_string() };
                vec![build(
                    path.to_string(),
                    vec![ImportSpecifier {
                        local,
                        imported: "*".to_string(),
                        kind: SpecifierKind::Namespace,
                    }],
                    false,
                )]
            }
        }
    }
}

impl LanguageStrategy for ElixirStrategy {
    fn kinds(&self) -> &'static NodeKinds {
        node_kinds(SupportedLanguage::Elixir)
    }

    /// Definitions outside any module (scripts)
    fn extract_functions(&self, cx: &Cx, root: Node) -> Vec<UceFunction> {
        let mut methods = Vec::new();
        for node in named_children(root) {
            if target(cx, node).is_some_and(|t| DEFINITIONS.contains(&t)) {
                if let Some(m) = self.definition(cx, node, &Pending::default()) {
                    self.push_clause(cx, &mut methods, m);
                }
            }
        }
        methods
            .into_iter()
            .map(|m| {
                let mut f = m.function;
                f.modifiers = Modifiers::new().with(Modifier::Export);
                f
            })
            .collect()
    }

    fn extract_classes(&self, cx: &Cx, root: Node) -> Vec<UceClass> {
        self.containers(cx, root, "defmodule")
            .into_iter()
            .filter_map(|n| self.module(cx, n))
            .collect()
    }

    fn extract_interfaces(&self, cx: &Cx, root: Node) -> Vec<UceInterface> {
        self.containers(cx, root, "defprotocol")
            .into_iter()
            .filter_map(|n| {
                let module = self.module(cx, n)?;
                Some(UceInterface {
                    name: module.name,
                    type_params: Vec::new(),
                    extends: Vec::new(),
                    properties: Vec::new(),
                    methods: module.methods,
                    location: module.location,
                    modifiers: module.modifiers,
                    doc_comment: module.doc_comment,
                })
            })
            .collect()
    }

    fn extract_imports(&self, cx: &Cx, root: Node) -> Vec<UceImport> {
        let mut out = Vec::new();
        let mut stack: Vec<Node> = children(root).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            match target(cx, node) {
                Some(t) if IMPORT_MACROS.contains(&t) => out.extend(self.import(cx, node, t)),
                Some("defmodule") => {
                    if let Some(body) = do_block(node) {
                        stack.extend(children(body).into_iter().rev());
                    }
                }
                _ => {}
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::spec_types;
    use crate::SupportedLanguage;
    use crate::test_support::transform;
    use crate::uce::{ClassKind, Visibility};

    const SOURCE: &str = r#"
defmodule MyApp.Accounts do
  @moduledoc """
  Account management.
  """
  @behaviour MyApp.Store
  @timeout 5000

  alias MyApp.Repo
  alias MyApp.Accounts.{User, Team}
  import Ecto.Query, only: [from: 2]
  require Logger
  use GenServer

  defstruct [:name, age: 0]

  @doc "Fetches a user."
  @spec get_user(integer, keyword) :: map
  def get_user(id, opts \\ []) do
    if id > 0 do
      Repo.get(User, id)
    else
      nil
    end
  end

  def greet(%User{name: name}), do: "hi " <> name
  def greet(_), do: "hi"

  defp secret, do: :ok

  defmodule Helpers do
    def slug(text) when is_binary(text), do: String.downcase(text)
  end
end

defprotocol Sizeable do
  @doc "Size of a thing."
  def size(data)
end
"#;

    #[test]
    fn test_module_structure() {
        let file = transform(SOURCE, SupportedLanguage::Elixir);
        let names: Vec<_> = file.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["MyApp.Accounts", "Helpers"]);

        let accounts = &file.classes[0];
        assert_eq!(accounts.kind, ClassKind::Module);
        assert_eq!(accounts.doc_comment.as_deref(), Some("Account management."));
        assert_eq!(accounts.implements, ["MyApp.Store"]);
        let props: Vec<_> = accounts.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(props, ["timeout", "name", "age"]);
        assert_eq!(accounts.properties[2].initializer.as_deref(), Some("0"));
        assert!(file.functions.is_empty());
    }

    #[test]
    fn test_definitions() {
        let file = transform(SOURCE, SupportedLanguage::Elixir);
        let accounts = &file.classes[0];
        let methods: Vec<_> = accounts.methods.iter().map(|m| (m.name(), m.visibility)).collect();
        assert_eq!(
            methods,
            [
                ("get_user", Visibility::Public),
                ("greet", Visibility::Public),
                ("secret", Visibility::Private)
            ]
        );

        let get_user = &accounts.methods[0].function;
        assert_eq!(get_user.doc_comment.as_deref(), Some("Fetches a user."));
        assert_eq!(get_user.params[1].name, "opts");
        assert_eq!(get_user.params[1].default_value.as_deref(), Some("[]"));
        assert_eq!(get_user.params[0].param_type.as_deref(), Some("integer"));
        assert_eq!(get_user.return_type.as_deref(), Some("map"));
        assert_eq!(get_user.complexity, 2);

        // two clauses, one entity
        assert_eq!(accounts.methods[1].function.complexity, 2);
        assert_eq!(file.classes[1].methods[0].function.params[0].name, "text");
    }

    #[test]
    fn test_protocol_and_imports() {
        let file = transform(SOURCE, SupportedLanguage::Elixir);
        let sizeable = file.find_interface("Sizeable").unwrap();
        assert!(sizeable.methods[0].is_abstract);
        assert_eq!(sizeable.methods[0].function.doc_comment.as_deref(), Some("Size of a thing."));

        let sources: Vec<_> = file.imports.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, ["MyApp.Repo", "MyApp.Accounts", "Ecto.Query", "Logger", "GenServer"]);
        let group: Vec<_> = file.imports[1].specifiers.iter().map(|s| s.local.as_str()).collect();
        assert_eq!(group, ["User", "Team"]);
        assert!(file.imports[4].is_side_effect);
    }

    #[test]
    fn test_spec_types() {
        let (args, ret) = spec_types("get(map(atom, term), integer) :: {:ok, term} | :error");
        assert_eq!(args, ["map(atom, term)", "integer"]);
        assert_eq!(ret.as_deref(), Some("{:ok, term} | :error"));
    }
}
