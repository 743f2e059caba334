//! Per-language call syntax
//!
//! Which node kinds are call sites, which open a new caller scope, and which
//! wrap a call in `await`. Files with no detectable language use [`UNION`].

use crate::language::SupportedLanguage;

#[derive(Debug)]
pub struct CallSyntax {
    /// Call-site kinds
    pub calls: &'static [&'static str],
    /// `new X()` and struct/composite literals
    pub constructors: &'static [&'static str],
    /// Named definitions; each is its own caller scope
    pub functions: &'static [&'static str],
    /// Anonymous functions that take the name of the binding they are
    /// assigned to (`const f = () => ...`); unbound ones are transparent
    pub lambdas: &'static [&'static str],
    /// Class-like containers; methods inside are named `Type.method`
    pub classes: &'static [&'static str],
    pub awaits: &'static [&'static str],
    /// A capitalized direct call builds an object (`User(...)`)
    pub capitalized_constructors: bool,
    /// Definitions and control flow are themselves calls (Elixir)
    pub macro_calls: bool,
}

impl CallSyntax {
    const EMPTY: CallSyntax = CallSyntax {
        calls: &[],
        constructors: &[],
        functions: &[],
        lambdas: &[],
        classes: &[],
        awaits: &[],
        capitalized_constructors: false,
        macro_calls: false,
    };

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.constructors.is_empty()
    }
}

/// Member-access kinds: `obj.method`, `Type::f`, `tbl:m`
pub const MEMBER_KINDS: &[&str] = &[
    "member_expression",
    "attribute",
    "selector_expression",
    "field_expression",
    "member_access_expression",
    "navigation_expression",
    "dot_index_expression",
    "method_index_expression",
    "scoped_identifier",
    "qualified_identifier",
    "dot",
];

/// Fields naming the object side of a member access
pub const RECEIVER_FIELDS: &[&str] = &[
    "object", "value", "operand", "argument", "expression", "table", "path", "scope", "target", "left",
];

/// Fields naming the member side of a member access
pub const MEMBER_FIELDS: &[&str] = &["property", "attribute", "field", "name", "method", "suffix", "right"];

/// Receivers that refer to the enclosing instance or type
pub const SELF_RECEIVERS: &[&str] = &["this", "self", "cls", "$this", "Self"];

/// Wrappers looked through when searching for an enclosing `await`
pub const PAREN_KINDS: &[&str] = &["parenthesized_expression", "parenthesized", "tuple_expression"];

static TYPESCRIPT: CallSyntax = CallSyntax {
    calls: &["call_expression"],
    constructors: &["new_expression"],
    functions: &[
        "function_declaration",
        "generator_function_declaration",
        "method_definition",
        "method_signature",
    ],
    lambdas: &["arrow_function", "function_expression", "function", "generator_function"],
    classes: &["class_declaration", "abstract_class_declaration", "class"],
    awaits: &["await_expression"],
    ..CallSyntax::EMPTY
};

static PYTHON: CallSyntax = CallSyntax {
    calls: &["call"],
    functions: &["function_definition"],
    lambdas: &["lambda"],
    classes: &["class_definition"],
    awaits: &["await"],
    capitalized_constructors: true,
    ..CallSyntax::EMPTY
};

static GO: CallSyntax = CallSyntax {
    calls: &["call_expression"],
    constructors: &["composite_literal"],
    functions: &["function_declaration", "method_declaration"],
    lambdas: &["func_literal"],
    ..CallSyntax::EMPTY
};

static RUST: CallSyntax = CallSyntax {
    calls: &["call_expression", "macro_invocation"],
    constructors: &["struct_expression"],
    functions: &["function_item", "function_signature_item"],
    lambdas: &["closure_expression"],
    classes: &["impl_item", "trait_item"],
    awaits: &["await_expression"],
    ..CallSyntax::EMPTY
};

static JAVA: CallSyntax = CallSyntax {
    calls: &["method_invocation"],
    constructors: &["object_creation_expression"],
    functions: &["method_declaration", "constructor_declaration", "compact_constructor_declaration"],
    lambdas: &["lambda_expression"],
    classes: &[
        "class_declaration",
        "interface_declaration",
        "enum_declaration",
        "record_declaration",
    ],
    ..CallSyntax::EMPTY
};

static C_FAMILY: CallSyntax = CallSyntax {
    calls: &["call_expression"],
    constructors: &["new_expression"],
    functions: &["function_definition"],
    lambdas: &["lambda_expression"],
    classes: &["class_specifier", "struct_specifier"],
    awaits: &["co_await_expression"],
    ..CallSyntax::EMPTY
};

static CSHARP: CallSyntax = CallSyntax {
    calls: &["invocation_expression"],
    constructors: &["object_creation_expression"],
    functions: &[
        "method_declaration",
        "constructor_declaration",
        "local_function_statement",
        "operator_declaration",
    ],
    lambdas: &["lambda_expression", "anonymous_method_expression"],
    classes: &[
        "class_declaration",
        "struct_declaration",
        "interface_declaration",
        "record_declaration",
    ],
    awaits: &["await_expression"],
    ..CallSyntax::EMPTY
};

static KOTLIN: CallSyntax = CallSyntax {
    calls: &["call_expression"],
    functions: &["function_declaration", "secondary_constructor"],
    lambdas: &["lambda_literal", "anonymous_function"],
    classes: &["class_declaration", "object_declaration", "companion_object"],
    capitalized_constructors: true,
    ..CallSyntax::EMPTY
};

static SWIFT: CallSyntax = CallSyntax {
    calls: &["call_expression"],
    functions: &["function_declaration", "init_declaration", "protocol_function_declaration"],
    lambdas: &["lambda_literal"],
    classes: &["class_declaration", "protocol_declaration"],
    awaits: &["await_expression"],
    capitalized_constructors: true,
    ..CallSyntax::EMPTY
};

static RUBY: CallSyntax = CallSyntax {
    calls: &["call"],
    functions: &["method", "singleton_method"],
    lambdas: &["lambda", "block", "do_block"],
    classes: &["class", "module", "singleton_class"],
    ..CallSyntax::EMPTY
};

static PHP: CallSyntax = CallSyntax {
    calls: &[
        "function_call_expression",
        "member_call_expression",
        "nullsafe_member_call_expression",
        "scoped_call_expression",
    ],
    constructors: &["object_creation_expression"],
    functions: &["function_definition", "method_declaration"],
    lambdas: &["anonymous_function", "arrow_function"],
    classes: &[
        "class_declaration",
        "interface_declaration",
        "trait_declaration",
        "enum_declaration",
    ],
    ..CallSyntax::EMPTY
};

static BASH: CallSyntax = CallSyntax {
    calls: &["command"],
    functions: &["function_definition"],
    ..CallSyntax::EMPTY
};

static SCALA: CallSyntax = CallSyntax {
    calls: &["call_expression"],
    constructors: &["instance_expression"],
    functions: &["function_definition", "function_declaration"],
    lambdas: &["lambda_expression"],
    classes: &["class_definition", "object_definition", "trait_definition", "enum_definition"],
    ..CallSyntax::EMPTY
};

static HASKELL: CallSyntax = CallSyntax {
    calls: &["apply"],
    functions: &["function", "bind"],
    lambdas: &["lambda"],
    classes: &["instance", "class"],
    ..CallSyntax::EMPTY
};

static ELIXIR: CallSyntax = CallSyntax {
    calls: &["call"],
    lambdas: &["anonymous_function"],
    macro_calls: true,
    ..CallSyntax::EMPTY
};

static LUA: CallSyntax = CallSyntax {
    calls: &["function_call"],
    functions: &["function_declaration"],
    lambdas: &["function_definition"],
    ..CallSyntax::EMPTY
};

static NONE: CallSyntax = CallSyntax::EMPTY;

/// Every grammar's call syntax at once
pub static UNION: CallSyntax = CallSyntax {
    calls: &[
        "call_expression",
        "call",
        "method_invocation",
        "invocation_expression",
        "function_call_expression",
        "member_call_expression",
        "scoped_call_expression",
        "function_call",
    ],
    constructors: &["new_expression", "object_creation_expression", "instance_expression"],
    functions: &[
        "function_declaration",
        "function_definition",
        "function_item",
        "method_definition",
        "method_declaration",
        "constructor_declaration",
        "method",
        "singleton_method",
    ],
    lambdas: &["arrow_function", "function_expression", "lambda_expression", "func_literal"],
    classes: &[
        "class_declaration",
        "class_definition",
        "class_specifier",
        "struct_specifier",
        "impl_item",
        "class",
    ],
    awaits: &["await_expression", "await"],
    ..CallSyntax::EMPTY
};

pub fn call_syntax(language: SupportedLanguage) -> &'static CallSyntax {
    use SupportedLanguage::*;
    match language {
        TypeScript | Tsx | JavaScript | Jsx => &TYPESCRIPT,
        Python => &PYTHON,
        Go => &GO,
        Rust => &RUST,
        Java => &JAVA,
        C | Cpp => &C_FAMILY,
        CSharp => &CSHARP,
        Kotlin => &KOTLIN,
        Swift => &SWIFT,
        Ruby => &RUBY,
        Php => &PHP,
        Bash => &BASH,
        Scala => &SCALA,
        Haskell => &HASKELL,
        Elixir => &ELIXIR,
        Lua => &LUA,
        Dart | Json | Yaml | Toml => &NONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_languages_have_no_calls() {
        for lang in [SupportedLanguage::Json, SupportedLanguage::Yaml, SupportedLanguage::Toml] {
            assert!(call_syntax(lang).is_empty());
        }
        assert!(!call_syntax(SupportedLanguage::Python).is_empty());
    }

    #[test]
    fn test_scope_and_call_kinds_are_disjoint() {
        for lang in SupportedLanguage::all() {
            let syntax = call_syntax(*lang);
            if syntax.macro_calls {
                continue;
            }
            for kind in syntax.calls {
                assert!(!syntax.functions.contains(kind), "{} {}", lang, kind);
                assert!(!syntax.classes.contains(kind), "{} {}", lang, kind);
            }
        }
    }
}
