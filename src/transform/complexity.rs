//! Cyclomatic complexity
//!
//! 1 + one per branching construct found anywhere under the function node.
//! The branch table is the union of every grammar's names for the same
//! constructs; a language simply never produces the names it lacks.

use super::helpers::children;
use tree_sitter::Node;

const BRANCH_KINDS: &[&str] = &[
    // conditionals
    "if_statement",
    "if_expression",
    "if_let_expression",
    "elif_clause",
    "elseif_statement",
    "elsif",
    "if",
    "unless",
    "if_modifier",
    "unless_modifier",
    "guard_statement",
    // loops
    "while_statement",
    "while_expression",
    "while",
    "while_modifier",
    "until",
    "until_modifier",
    "for_statement",
    "for_in_statement",
    "for_expression",
    "for_in_clause",
    "for",
    "enhanced_for_statement",
    "foreach_statement",
    "c_style_for_statement",
    "do_statement",
    "do_while_statement",
    "repeat_statement",
    "repeat_while_statement",
    "loop_expression",
    // ternaries
    "ternary_expression",
    "conditional_expression",
    "conditional",
    // case arms
    "switch_case",
    "case_clause",
    "case_statement",
    "case_item",
    "expression_case",
    "type_case",
    "communication_case",
    "switch_label",
    "switch_section",
    "switch_entry",
    "match_arm",
    "when_entry",
    "when",
    "alternative",
    // exception handlers
    "catch_clause",
    "catch_block",
    "except_clause",
    "except_group_clause",
    "rescue",
];

/// Node kinds whose operator tokens are inspected for `&&`/`||`/`and`/`or`
const BOOLEAN_CONTAINERS: &[&str] = &[
    "binary_expression",
    "boolean_operator",
    "binary",
    "binary_operator",
    "infix_expression",
    "conjunction_expression",
    "disjunction_expression",
    "list",
];

const BOOLEAN_OPERATORS: &[&str] = &["&&", "||", "and", "or"];

/// Elixir control flow is macro calls; these targets count as branches
const BRANCHING_CALL_TARGETS: &[&str] = &["if", "unless", "case", "cond", "with", "for", "receive", "try"];

fn is_branching_call(node: Node, source: &str) -> bool {
    node.kind() == "call"
        && node
            .child_by_field_name("target")
            .and_then(|t| t.utf8_text(source.as_bytes()).ok())
            .is_some_and(|t| BRANCHING_CALL_TARGETS.contains(&t))
}

fn boolean_operators(node: Node) -> u32 {
    if !BOOLEAN_CONTAINERS.contains(&node.kind()) {
        return 0;
    }
    children(node)
        .into_iter()
        .filter(|c| !c.is_named() && BOOLEAN_OPERATORS.contains(&c.kind()))
        .count() as u32
}

/// Cyclomatic complexity of the function rooted at `node`
pub fn cyclomatic(node: Node, source: &str) -> u32 {
    let mut score = 1;
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        // Ruby names its `if` keyword token `if` too; only named nodes count
        if current.is_named() && (BRANCH_KINDS.contains(&current.kind()) || is_branching_call(current, source)) {
            score += 1;
        }
        score += boolean_operators(current);
        stack.extend(children(current));
    }
    score
}
