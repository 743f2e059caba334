//! Call extraction
//!
//! Finds every call and constructor-invocation site in a syntax tree and
//! attributes it to the innermost named function, method or class that
//! contains it. Calls outside any definition belong to the synthetic
//! `<module>` caller.

mod syntax;
mod walker;

pub use syntax::{CallSyntax, call_syntax};
pub use walker::MODULE_SCOPE;

use crate::language::{SupportedLanguage, detect_language};
use crate::uce::UceFile;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tree_sitter::Tree;
use walker::Walker;

/// One call site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCall {
    /// `{file_path}:{caller_name}`
    pub caller_id: String,
    pub caller_name: String,
    pub callee_name: String,
    /// 1-indexed
    pub line_number: usize,
    pub column: usize,
    pub is_direct_call: bool,
    pub is_await: bool,
    pub is_constructor_call: bool,
    /// Object of a member call; `None` for direct and constructor calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    /// Raw source text of each argument
    pub arguments: Vec<String>,
}

/// Calls of one file with caller → callee and callee → caller indexes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCallGraph {
    pub file_path: String,
    pub calls: Vec<FunctionCall>,
    pub calls_from: BTreeMap<String, Vec<String>>,
    pub calls_to: BTreeMap<String, Vec<String>>,
}

impl FileCallGraph {
    /// Derive both indexes from `calls`; each list keeps first-seen order
    /// without duplicates
    pub fn from_calls(file_path: &str, calls: Vec<FunctionCall>) -> Self {
        let mut calls_from: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut calls_to: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for call in &calls {
            let callees = calls_from.entry(call.caller_name.clone()).or_default();
            if !callees.contains(&call.callee_name) {
                callees.push(call.callee_name.clone());
            }
            let callers = calls_to.entry(call.callee_name.clone()).or_default();
            if !callers.contains(&call.caller_name) {
                callers.push(call.caller_name.clone());
            }
        }
        Self {
            file_path: file_path.to_string(),
            calls,
            calls_from,
            calls_to,
        }
    }

    pub fn callees(&self, caller: &str) -> &[String] {
        self.calls_from.get(caller).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn callers(&self, callee: &str) -> &[String] {
        self.calls_to.get(callee).map(Vec::as_slice).unwrap_or_default()
    }
}

/// A line range owned by a declared entity
struct Span {
    start: usize,
    end: usize,
    name: String,
}

/// Stateless call-site extractor
#[derive(Debug, Default, Clone, Copy)]
pub struct CallExtractor;

impl CallExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Whole-file extraction; the language comes from the path and unknown
    /// files fall back to every grammar's call syntax
    pub fn extract_from_tree(&self, tree: &Tree, source: &str, file_path: &str) -> FileCallGraph {
        let syntax = match detect_language(file_path) {
            Some(language) => call_syntax(language),
            None => {
                tracing::debug!("No language for {}, using union call syntax", file_path);
                &syntax::UNION
            }
        };
        let calls = Walker::new(source, file_path, syntax).walk(tree.root_node());
        FileCallGraph::from_calls(file_path, calls)
    }

    pub fn extract_from_tree_as(
        &self,
        tree: &Tree,
        source: &str,
        file_path: &str,
        language: SupportedLanguage,
    ) -> FileCallGraph {
        let calls = Walker::new(source, file_path, call_syntax(language)).walk(tree.root_node());
        FileCallGraph::from_calls(file_path, calls)
    }

    /// Attribute calls to the entities of an already transformed file.
    ///
    /// Definitions keep the names the transformer resolved for them
    /// (`Class.method`). A call the tree walk leaves at module level but that
    /// lies inside a declared entity's lines is moved to the innermost such
    /// entity, so nothing inside a function or class body is reported as a
    /// module-level call.
    pub fn extract_from_uce(&self, file: &UceFile, tree: &Tree, source: &str) -> Vec<FunctionCall> {
        let mut declared = HashMap::new();
        let mut spans = Vec::new();
        let mut declare = |location: &crate::uce::UceLocation, name: String| {
            declared.insert((location.start_line - 1, location.start_column), name.clone());
            spans.push(Span {
                start: location.start_line,
                end: location.end_line,
                name,
            });
        };

        for function in &file.functions {
            declare(&function.location, function.name.clone());
        }
        for class in &file.classes {
            declare(&class.location, class.name.clone());
            for method in class.methods.iter().chain(class.constructor.as_ref()) {
                declare(&method.function.location, format!("{}.{}", class.name, method.name()));
            }
        }
        // The class itself is a scope, not a definition to rename
        for class in &file.classes {
            declared.remove(&(class.location.start_line - 1, class.location.start_column));
        }

        let mut calls = Walker::new(source, &file.file_path, call_syntax(file.language))
            .with_declared(declared)
            .walk(tree.root_node());

        for call in calls.iter_mut().filter(|c| c.caller_name == MODULE_SCOPE) {
            let owner = spans
                .iter()
                .filter(|s| s.start <= call.line_number && call.line_number <= s.end)
                .min_by_key(|s| s.end - s.start);
            if let Some(owner) = owner {
                call.caller_name = owner.name.clone();
                call.caller_id = format!("{}:{}", file.file_path, owner.name);
            }
        }
        tracing::trace!("{} calls in {}", calls.len(), file.file_path);
        calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{call_graph, uce_call_graph};

    fn calls_named<'g>(graph: &'g FileCallGraph, callee: &str) -> Vec<&'g FunctionCall> {
        graph.calls.iter().filter(|c| c.callee_name == callee).collect()
    }

    #[test]
    fn test_nested_function_calls_are_not_duplicated() {
        let source = "function f() {\n  a();\n  function g() {\n    h();\n  }\n  g();\n}\n";
        let graph = call_graph(source, SupportedLanguage::JavaScript);
        assert_eq!(graph.callees("f"), ["a", "g"]);
        assert_eq!(graph.callees("g"), ["h"]);
        assert_eq!(graph.callers("h"), ["g"]);
    }

    #[test]
    fn test_nested_python_function() {
        let source = "def f():\n    def g():\n        h()\n    g()\n";
        let graph = call_graph(source, SupportedLanguage::Python);
        assert!(!graph.callees("f").contains(&"h".to_string()));
        assert!(graph.callees("g").contains(&"h".to_string()));
    }

    #[test]
    fn test_call_classification() {
        let source = r#"
class Service {
  async load(id) {
    const user = await this.fetch(id);
    const repo = new Repo(id);
    console.log(user, repo);
    return await (fetchAll());
  }
}
setup();
"#;
        let graph = call_graph(source, SupportedLanguage::JavaScript);

        let fetch = calls_named(&graph, "fetch")[0];
        assert_eq!(fetch.caller_name, "Service.load");
        assert_eq!(fetch.caller_id, "test.js:Service.load");
        assert_eq!(fetch.receiver.as_deref(), Some("this"));
        assert!(fetch.is_await);
        assert!(!fetch.is_direct_call);

        let repo = calls_named(&graph, "Repo")[0];
        assert!(repo.is_constructor_call);
        assert_eq!(repo.arguments, ["id"]);

        let log = calls_named(&graph, "console.log")[0];
        assert_eq!(log.receiver.as_deref(), Some("console"));
        assert_eq!(log.arguments, ["user", "repo"]);
        assert!(!log.is_await);

        assert!(calls_named(&graph, "fetchAll")[0].is_await);

        let setup = calls_named(&graph, "setup")[0];
        assert_eq!(setup.caller_name, MODULE_SCOPE);
        assert!(setup.is_direct_call);

        let lines: Vec<_> = graph.calls.iter().map(|c| c.line_number).collect();
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
    }

    #[test]
    fn test_await_does_not_reach_arguments() {
        let graph = call_graph("async function f() { await save(build()); }\n", SupportedLanguage::JavaScript);
        assert!(calls_named(&graph, "save")[0].is_await);
        assert!(!calls_named(&graph, "build")[0].is_await);
    }

    #[test]
    fn test_deeply_parenthesized_call_is_linear() {
        let depth = 20_000;
        let source = format!(
            "async function f() {{ return await {}g(){}; }}\n",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let started = std::time::Instant::now();
        let graph = call_graph(&source, SupportedLanguage::JavaScript);
        assert!(started.elapsed() < std::time::Duration::from_secs(10));

        let g = calls_named(&graph, "g");
        assert_eq!(g.len(), 1);
        assert_eq!(g[0].caller_name, "f");
        assert!(g[0].is_await);
    }

    #[test]
    fn test_lambdas_bound_and_transparent() {
        let source = "const run = () => { go(); };\nfunction each(items) {\n  items.forEach(x => process(x));\n}\n";
        let graph = call_graph(source, SupportedLanguage::JavaScript);
        assert_eq!(graph.callees("run"), ["go"]);
        assert_eq!(graph.callees("each"), ["items.forEach", "process"]);
    }

    #[test]
    fn test_python_self_and_constructors() {
        let source = "class Store:\n    def save(self, item):\n        self.validate(item)\n        record = Record(item)\n        db.insert(record)\n\ndef main():\n    s = Store()\n    s.save(1)\n";
        let graph = call_graph(source, SupportedLanguage::Python);
        assert_eq!(graph.callees("Store.save"), ["validate", "Record", "db.insert"]);
        assert!(calls_named(&graph, "Record")[0].is_constructor_call);
        assert_eq!(graph.callees("main"), ["Store", "s.save"]);
    }

    #[test]
    fn test_ruby_new_is_constructor() {
        let source = "class Account\n  def open\n    log = Logger.new(STDOUT)\n    log.info(\"x\")\n    notify()\n  end\nend\n";
        let graph = call_graph(source, SupportedLanguage::Ruby);
        let logger = calls_named(&graph, "Logger")[0];
        assert!(logger.is_constructor_call);
        assert_eq!(logger.caller_name, "Account.open");
        assert_eq!(graph.callees("Account.open"), ["Logger", "log.info", "notify"]);
    }

    #[test]
    fn test_go_method_receiver_naming() {
        let source = "package main\n\nfunc (s *Server) Start() error {\n\ts.listen()\n\treturn fmt.Errorf(\"x\")\n}\n\nfunc main() {\n\tsrv := &Server{}\n\tsrv.Start()\n}\n";
        let graph = call_graph(source, SupportedLanguage::Go);
        assert_eq!(graph.callees("Server.Start"), ["s.listen", "fmt.Errorf"]);
        assert_eq!(graph.callees("main"), ["Server", "srv.Start"]);
        assert!(calls_named(&graph, "Server")[0].is_constructor_call);
    }

    #[test]
    fn test_elixir_definitions_are_scopes() {
        let source = "defmodule MyApp.Worker do\n  @doc \"Runs.\"\n  def run(x) do\n    x |> normalize() |> Repo.insert()\n  end\n\n  defp normalize(x), do: String.trim(x)\nend\n";
        let graph = call_graph(source, SupportedLanguage::Elixir);
        assert_eq!(graph.callees("MyApp.Worker.run"), ["normalize", "Repo.insert"]);
        assert_eq!(graph.callees("MyApp.Worker.normalize"), ["String.trim"]);
        assert!(calls_named(&graph, "run").is_empty());
        assert!(calls_named(&graph, "doc").is_empty());
    }

    #[test]
    fn test_uce_attribution() {
        let source = "class A {\n  x = make();\n  run() {\n    this.step();\n  }\n}\nfunction f() {\n  function g() { h(); }\n  g();\n}\ninit();\n";
        let graph = uce_call_graph(source, SupportedLanguage::JavaScript);
        assert_eq!(graph.callees("A.run"), ["step"]);
        assert_eq!(graph.callees("f"), ["g"]);
        assert_eq!(graph.callees("g"), ["h"]);
        assert_eq!(graph.callees(MODULE_SCOPE), ["init"]);
        assert_ne!(calls_named(&graph, "make")[0].caller_name, MODULE_SCOPE);
    }

    #[test]
    fn test_unknown_extension_uses_union() {
        let source = "function f() { g(); }\n";
        let tree = crate::test_support::parse(source, SupportedLanguage::JavaScript);
        let graph = CallExtractor::new().extract_from_tree(&tree, source, "script.unknown");
        assert_eq!(graph.callees("f"), ["g"]);
    }

    #[test]
    fn test_graph_indexes_dedupe() {
        let call = |caller: &str, callee: &str, line: usize| FunctionCall {
            caller_id: format!("a.ts:{}", caller),
            caller_name: caller.to_string(),
            callee_name: callee.to_string(),
            line_number: line,
            column: 0,
            is_direct_call: true,
            is_await: false,
            is_constructor_call: false,
            receiver: None,
            arguments: Vec::new(),
        };
        let graph = FileCallGraph::from_calls("a.ts", vec![call("f", "g", 1), call("f", "g", 2), call("h", "g", 3)]);
        assert_eq!(graph.calls.len(), 3);
        assert_eq!(graph.callees("f"), ["g"]);
        assert_eq!(graph.callers("g"), ["f", "h"]);
        assert!(graph.callees("missing").is_empty());

        let json = serde_json::to_value(&graph.calls[0]).unwrap();
        assert_eq!(json["callerId"], "a.ts:f");
        assert!(json.get("receiver").is_none());
    }
}
