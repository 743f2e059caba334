//! Scope-aware traversal of call sites
//!
//! One explicit-stack pass over the tree. Each stack frame carries the caller
//! scope it belongs to; entering a named definition pushes its children under
//! a new scope, so a nested function's calls are never seen by its parent.

use super::FunctionCall;
use super::syntax::{CallSyntax, MEMBER_FIELDS, MEMBER_KINDS, PAREN_KINDS, RECEIVER_FIELDS, SELF_RECEIVERS};
use crate::transform::helpers::{IDENTIFIER_KINDS, child_of_kind, children, children_by_field, find_descendant, is_capitalized, named_children};
use std::collections::{HashMap, HashSet};
use tree_sitter::Node;

/// Synthetic caller for top-level calls
pub const MODULE_SCOPE: &str = "<module>";

const ARGUMENT_LISTS: &[&str] = &["arguments", "argument_list", "value_arguments", "actual_arguments", "call_suffix"];

/// Elixir macros that are structure or control flow, not calls
const ELIXIR_KEYWORDS: &[&str] = &[
    "if", "unless", "case", "cond", "with", "for", "receive", "try", "quote", "unquote", "fn", "alias", "import",
    "require", "use", "defstruct", "defexception", "defdelegate", "defoverridable", "defimpl",
];
const ELIXIR_DEFINITIONS: &[&str] = &["def", "defp", "defmacro", "defmacrop", "defguard", "defguardp"];
const ELIXIR_CONTAINERS: &[&str] = &["defmodule", "defprotocol"];

/// Parents that give an anonymous function its name
const BINDINGS: &[&str] = &[
    "variable_declarator",
    "assignment_expression",
    "assignment",
    "public_field_definition",
    "field_definition",
    "let_declaration",
];

enum Role<'t> {
    /// Named definition; `skip` is a subtree that belongs to the signature
    Function { name: String, skip: Option<Node<'t>> },
    Class(String),
    Call,
    Other,
}

/// Pending node with the context its ancestors established
struct Frame<'t> {
    node: Node<'t>,
    parent: Option<Node<'t>>,
    scope: usize,
    class: Option<usize>,
    /// Under an await, possibly through parentheses
    awaited: bool,
}

struct Site {
    callee: String,
    receiver: Option<String>,
    constructor: bool,
}

/// A receiver worth folding into the callee name (`obj`, `pkg.sub`)
fn is_simple(text: &str) -> bool {
    !text.is_empty()
        && text.len() <= 64
        && text.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | ':' | '$' | '@'))
}

/// Cut generic arguments, call parens and literal bodies off a type name
fn base_name(text: &str) -> &str {
    let end = text.find(['<', '(', '{', '[']).unwrap_or(text.len());
    text[..end].trim()
}

pub struct Walker<'a> {
    source: &'a str,
    file_path: &'a str,
    syntax: &'static CallSyntax,
    /// Caller names by definition start (row, column)
    declared: HashMap<(usize, usize), String>,
    scopes: Vec<String>,
    calls: Vec<FunctionCall>,
}

impl<'a> Walker<'a> {
    pub fn new(source: &'a str, file_path: &'a str, syntax: &'static CallSyntax) -> Self {
        Self {
            source,
            file_path,
            syntax,
            declared: HashMap::new(),
            scopes: vec![MODULE_SCOPE.to_string()],
            calls: Vec::new(),
        }
    }

    /// Use already-resolved names for definitions starting at these positions
    pub fn with_declared(mut self, declared: HashMap<(usize, usize), String>) -> Self {
        self.declared = declared;
        self
    }

    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Walk the whole tree and return call sites in document order
    pub fn walk(mut self, root: Node) -> Vec<FunctionCall> {
        let mut skipped: HashSet<usize> = HashSet::new();
        let mut stack = vec![Frame {
            node: root,
            parent: None,
            scope: 0,
            class: None,
            awaited: false,
        }];

        while let Some(Frame {
            node,
            parent,
            scope,
            class,
            awaited,
        }) = stack.pop()
        {
            if skipped.contains(&node.id()) {
                continue;
            }
            let (scope, class) = match self.role(node, parent) {
                Role::Function { name, skip } => {
                    let pos = node.start_position();
                    let name = match (self.declared.get(&(pos.row, pos.column)), class) {
                        (Some(declared), _) => declared.clone(),
                        (None, Some(c)) => format!("{}.{}", self.scopes[c], name),
                        (None, None) => name,
                    };
                    if let Some(skip) = skip {
                        skipped.insert(skip.id());
                    }
                    self.scopes.push(name);
                    (self.scopes.len() - 1, None)
                }
                Role::Class(name) => {
                    self.scopes.push(name);
                    let idx = self.scopes.len() - 1;
                    (idx, Some(idx))
                }
                Role::Call => {
                    self.record(node, scope, awaited);
                    (scope, class)
                }
                Role::Other => (scope, class),
            };
            let kind = node.kind();
            let child_awaited = self.syntax.awaits.contains(&kind) || (awaited && PAREN_KINDS.contains(&kind));
            for child in children(node).into_iter().rev() {
                stack.push(Frame {
                    node: child,
                    parent: Some(node),
                    scope,
                    class,
                    awaited: child_awaited,
                });
            }
        }

        self.calls.sort_by_key(|c| (c.line_number, c.column));
        self.calls
    }

    fn role<'t>(&self, node: Node<'t>, parent: Option<Node<'t>>) -> Role<'t> {
        let kind = node.kind();
        if self.syntax.macro_calls && kind == "call" {
            return self.macro_role(node, parent);
        }
        if self.syntax.functions.contains(&kind) {
            if let Some(name) = self.definition_name(node) {
                return Role::Function { name, skip: None };
            }
        }
        if self.syntax.lambdas.contains(&kind) {
            if let Some(name) = parent.and_then(|p| self.binding_name(node, p)) {
                return Role::Function { name, skip: None };
            }
        }
        if self.syntax.classes.contains(&kind) {
            if let Some(name) = self.class_name(node) {
                return Role::Class(name);
            }
        }
        if self.syntax.calls.contains(&kind) || self.syntax.constructors.contains(&kind) {
            return Role::Call;
        }
        Role::Other
    }

    /// Elixir: `def`/`defmodule` calls open scopes, keyword macros are skipped
    fn macro_role<'t>(&self, node: Node<'t>, parent: Option<Node<'t>>) -> Role<'t> {
        if parent.is_some_and(|p| p.kind() == "unary_operator" && self.text(p).starts_with('@')) {
            return Role::Other;
        }
        let Some(target) = node.child_by_field_name("target") else {
            return Role::Other;
        };
        let target_text = self.text(target);
        let head = child_of_kind(node, &["arguments"]).and_then(|a| named_children(a).into_iter().next());

        if ELIXIR_DEFINITIONS.contains(&target_text) {
            let Some(head) = head else { return Role::Other };
            let call = if head.kind() == "binary_operator" {
                head.child_by_field_name("left").unwrap_or(head)
            } else {
                head
            };
            let name = match call.kind() {
                "call" => call.child_by_field_name("target").map(|t| self.text(t)),
                "identifier" => Some(self.text(call)),
                _ => None,
            };
            return match name {
                Some(name) => Role::Function {
                    name: name.to_string(),
                    skip: Some(head),
                },
                None => Role::Other,
            };
        }
        if ELIXIR_CONTAINERS.contains(&target_text) {
            return match head {
                Some(h) => Role::Class(self.text(h).trim().to_string()),
                None => Role::Other,
            };
        }
        if ELIXIR_KEYWORDS.contains(&target_text) || target_text.starts_with("def") {
            return Role::Other;
        }
        Role::Call
    }

    fn definition_name(&self, node: Node) -> Option<String> {
        // Go: func (s *Server) Start()
        if node.kind() == "method_declaration" {
            if let Some(receiver) = node.child_by_field_name("receiver") {
                let owner = find_descendant(receiver, &["type_identifier"]).map(|t| self.text(t))?;
                let name = self.text(node.child_by_field_name("name")?);
                return Some(format!("{}.{}", owner, name));
            }
        }
        let mut candidate = node.child_by_field_name("name");
        if candidate.is_none() {
            // C/C++ declarator chain down to the identifier
            let mut current = node.child_by_field_name("declarator");
            while let Some(d) = current {
                if matches!(
                    d.kind(),
                    "identifier" | "field_identifier" | "qualified_identifier" | "destructor_name" | "operator_name"
                ) {
                    break;
                }
                current = d.child_by_field_name("declarator");
            }
            candidate = current;
        }
        let candidate =
            candidate.or_else(|| named_children(node).into_iter().find(|c| IDENTIFIER_KINDS.contains(&c.kind())))?;
        let name = self.text(candidate).trim().replace("::", ".");
        (!name.is_empty()).then_some(name)
    }

    fn class_name(&self, node: Node) -> Option<String> {
        let candidate = ["type", "name"]
            .iter()
            .find_map(|f| node.child_by_field_name(f))
            .or_else(|| named_children(node).into_iter().find(|c| IDENTIFIER_KINDS.contains(&c.kind())))?;
        let name = base_name(self.text(candidate));
        (!name.is_empty()).then(|| name.replace("::", "."))
    }

    /// `const f = () => ...`, `self.handler = lambda: ...`
    fn binding_name(&self, node: Node, parent: Node) -> Option<String> {
        if !BINDINGS.contains(&parent.kind()) {
            return None;
        }
        let name = ["name", "left", "property", "pattern"]
            .iter()
            .find_map(|f| parent.child_by_field_name(f))
            .filter(|n| n.id() != node.id())?;
        let text = self.text(name).trim();
        is_simple(text).then(|| text.to_string())
    }

    fn record(&mut self, node: Node, scope: usize, awaited: bool) {
        let Some(site) = self.site(node) else { return };
        let pos = node.start_position();
        let caller = self.scopes[scope].clone();
        self.calls.push(FunctionCall {
            caller_id: format!("{}:{}", self.file_path, caller),
            caller_name: caller,
            callee_name: site.callee,
            line_number: pos.row + 1,
            column: pos.column,
            is_direct_call: site.receiver.is_none() && !site.constructor,
            is_await: awaited,
            is_constructor_call: site.constructor,
            receiver: site.receiver,
            arguments: self.arguments(node),
        });
    }

    fn site(&self, node: Node) -> Option<Site> {
        if self.syntax.constructors.contains(&node.kind()) {
            let ty = ["constructor", "type", "name"]
                .iter()
                .find_map(|f| node.child_by_field_name(f))
                .or_else(|| named_children(node).into_iter().next())?;
            let name = base_name(self.text(ty));
            return (!name.is_empty()).then(|| Site {
                callee: name.to_string(),
                receiver: None,
                constructor: true,
            });
        }

        // Receiver held directly on the call node (Java, PHP, Ruby)
        if let Some(receiver) = ["object", "receiver", "scope"].iter().find_map(|f| node.child_by_field_name(f)) {
            let name = ["name", "method"].iter().find_map(|f| node.child_by_field_name(f))?;
            let separator = if node.kind() == "scoped_call_expression" { "::" } else { "." };
            return self.member_site(self.text(receiver), self.text(name), separator);
        }

        let callee = ["function", "method", "target", "name", "macro"]
            .iter()
            .find_map(|f| node.child_by_field_name(f))
            .or_else(|| named_children(node).into_iter().next())?;
        // Curried application counts once, at the innermost call
        if self.syntax.calls.contains(&callee.kind()) {
            return None;
        }
        if MEMBER_KINDS.contains(&callee.kind()) {
            let receiver = RECEIVER_FIELDS
                .iter()
                .find_map(|f| callee.child_by_field_name(f))
                .or_else(|| named_children(callee).into_iter().next())?;
            let member = MEMBER_FIELDS
                .iter()
                .find_map(|f| callee.child_by_field_name(f))
                .or_else(|| named_children(callee).into_iter().last())?;
            if member.id() == receiver.id() {
                return None;
            }
            let separator = match callee.kind() {
                "scoped_identifier" | "qualified_identifier" => "::",
                "method_index_expression" => ":",
                _ => ".",
            };
            return self.member_site(self.text(receiver), self.text(member), separator);
        }

        let mut name = self.text(callee).trim().to_string();
        if !is_simple(&name) {
            return None;
        }
        if node.kind() == "macro_invocation" {
            name.push('!');
        }
        let constructor = self.syntax.capitalized_constructors && is_capitalized(&name);
        Some(Site {
            callee: name,
            receiver: None,
            constructor,
        })
    }

    fn member_site(&self, receiver: &str, member: &str, separator: &str) -> Option<Site> {
        let receiver = receiver.trim();
        let member = member.trim().trim_start_matches(['?', '.', ':']).trim();
        if member.is_empty() {
            return None;
        }
        if SELF_RECEIVERS.contains(&receiver) {
            return Some(Site {
                callee: member.to_string(),
                receiver: Some(receiver.to_string()),
                constructor: false,
            });
        }
        // `Logger.new` / `Vec::new`
        if member == "new" && is_capitalized(receiver) && is_simple(receiver) {
            return Some(Site {
                callee: receiver.replace("::", "."),
                receiver: None,
                constructor: true,
            });
        }
        let callee = if is_simple(receiver) {
            format!("{}{}{}", receiver, separator, member)
        } else {
            member.to_string()
        };
        Some(Site {
            callee,
            receiver: Some(receiver.to_string()),
            constructor: false,
        })
    }

    fn arguments(&self, node: Node) -> Vec<String> {
        let list = node
            .child_by_field_name("arguments")
            .or_else(|| child_of_kind(node, ARGUMENT_LISTS))
            .map(|l| {
                if l.kind() == "call_suffix" {
                    child_of_kind(l, &["value_arguments"]).unwrap_or(l)
                } else {
                    l
                }
            });
        let nodes = match list {
            Some(l) if ARGUMENT_LISTS.contains(&l.kind()) => named_children(l),
            // unparenthesized single argument: `require "x"`
            Some(l) => vec![l],
            None => children_by_field(node, "argument"),
        };
        nodes
            .into_iter()
            .map(|n| self.text(n).trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}
