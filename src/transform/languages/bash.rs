use crate::transform::helpers::{Cx, children, named_children, unquote};
use crate::transform::kinds::{NodeKinds, node_kinds};
use crate::transform::strategy::LanguageStrategy;
use crate::language::SupportedLanguage;
use crate::uce::{Modifier, Modifiers, UceImport, UceVariable, VariableKind};
use tree_sitter::Node;

pub struct BashStrategy;

impl BashStrategy {
    fn assignment(&self, cx: &Cx, node: Node, decl: Node, kind: VariableKind, modifiers: Modifiers) -> Option<UceVariable> {
        let name = cx.field_text(node, "name")?;
        Some(UceVariable {
            name,
            kind,
            var_type: None,
            initializer: node.child_by_field_name("value").map(|v| unquote(cx.text(v))),
            location: cx.location(decl),
            modifiers,
            doc_comment: cx.doc(decl),
        })
    }
}

impl LanguageStrategy for BashStrategy {
    fn kinds(&self) -> &'static NodeKinds {
        node_kinds(SupportedLanguage::Bash)
    }

    /// `export`, `readonly`, `declare -r`, `local` and plain `X=1`
    fn parse_variables(&self, cx: &Cx, node: Node) -> Vec<UceVariable> {
        if node.kind() == "variable_assignment" {
            return self
                .assignment(cx, node, node, VariableKind::Var, Modifiers::new())
                .into_iter()
                .collect();
        }

        let keyword = children(node).first().map(|c| cx.text(*c)).unwrap_or("");
        let flags: Vec<&str> = named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "word" && cx.text(*c).starts_with('-'))
            .map(|c| cx.text(c))
            .collect();
        let readonly = keyword == "readonly" || flags.iter().any(|f| f.contains('r'));
        let exported = keyword == "export" || flags.iter().any(|f| f.contains('x'));

        let mut modifiers = Modifiers::new();
        if exported {
            modifiers.insert(Modifier::Export);
        }
        let kind = if readonly {
            modifiers.insert(Modifier::Const);
            VariableKind::Const
        } else if keyword == "local" {
            VariableKind::Let
        } else {
            VariableKind::Var
        };

        named_children(node)
            .into_iter()
            .filter_map(|child| match child.kind() {
                "variable_assignment" => self.assignment(cx, child, node, kind, modifiers.clone()),
                // `export NAME` without a value
                "variable_name" => Some(UceVariable {
                    name: cx.text(child).to_string(),
                    kind,
                    var_type: None,
                    initializer: None,
                    location: cx.location(node),
                    modifiers: modifiers.clone(),
                    doc_comment: cx.doc(node),
                }),
                _ => None,
            })
            .collect()
    }

    /// `source file` and `. file`
    fn parse_imports(&self, cx: &Cx, node: Node) -> Vec<UceImport> {
        let name = node.child_by_field_name("name").map(|n| cx.text(n).trim()).unwrap_or("");
        if name != "source" && name != "." {
            return Vec::new();
        }
        let Some(path) = node.child_by_field_name("argument") else {
            return Vec::new();
        };
        vec![UceImport {
            source: unquote(cx.text(path)),
            specifiers: Vec::new(),
            is_type_only: false,
            is_side_effect: true,
            location: cx.location(node),
        }]
    }
}

#[cfg(test)]
mod tests {
    use crate::SupportedLanguage;
    use crate::test_support::transform;
    use crate::uce::{Modifier, VariableKind};

    const SOURCE: &str = r#"#!/bin/bash
source ./lib/common.sh
. "$HOME/.env"

export PATH="/usr/bin:$PATH"
readonly VERSION=1.2
COUNT=0
declare -r LIMIT=5

# Greets a user.
greet() {
  local name="$1"
  if [ -z "$name" ]; then
    echo "hi"
  fi
}

function cleanup {
  rm -rf /tmp/x
}
"#;

    #[test]
    fn test_functions() {
        let file = transform(SOURCE, SupportedLanguage::Bash);
        let names: Vec<_> = file.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["greet", "cleanup"]);
        assert_eq!(file.functions[0].doc_comment.as_deref(), Some("Greets a user."));
        assert_eq!(file.functions[0].complexity, 2);
        assert!(file.classes.is_empty());
    }

    #[test]
    fn test_variables() {
        let file = transform(SOURCE, SupportedLanguage::Bash);
        let vars: Vec<_> = file.variables.iter().map(|v| (v.name.as_str(), v.kind)).collect();
        assert_eq!(
            vars,
            [
                ("PATH", VariableKind::Var),
                ("VERSION", VariableKind::Const),
                ("COUNT", VariableKind::Var),
                ("LIMIT", VariableKind::Const)
            ]
        );
        assert!(file.variables[0].modifiers.contains(Modifier::Export));
        assert_eq!(file.variables[0].initializer.as_deref(), Some("/usr/bin:$PATH"));
        assert!(!file.variables.iter().any(|v| v.name == "name"));
    }

    #[test]
    fn test_sourced_files() {
        let file = transform(SOURCE, SupportedLanguage::Bash);
        let sources: Vec<_> = file.imports.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, ["./lib/common.sh", "$HOME/.env"]);
        assert!(file.imports.iter().all(|i| i.is_side_effect));
    }
}
