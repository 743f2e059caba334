//! Per-language node-kind tables
//!
//! Each table lists which tree-sitter node kinds are candidates for an entity
//! kind. `wrappers` are containers searched through when looking for
//! module-level declarations (export statements, namespaces, preprocessor
//! blocks); anything else stops the search, so members nested in classes or
//! functions are never reported at module level.

use crate::language::SupportedLanguage;

#[derive(Debug)]
pub struct NodeKinds {
    pub functions: &'static [&'static str],
    pub classes: &'static [&'static str],
    pub interfaces: &'static [&'static str],
    pub type_aliases: &'static [&'static str],
    pub variables: &'static [&'static str],
    pub imports: &'static [&'static str],
    /// Members extracted as methods inside class and interface bodies
    pub methods: &'static [&'static str],
    pub wrappers: &'static [&'static str],
}

impl NodeKinds {
    const EMPTY: NodeKinds = NodeKinds {
        functions: &[],
        classes: &[],
        interfaces: &[],
        type_aliases: &[],
        variables: &[],
        imports: &[],
        methods: &[],
        wrappers: &[],
    };
}

static TYPESCRIPT: NodeKinds = NodeKinds {
    functions: &["function_declaration", "generator_function_declaration", "lexical_declaration", "variable_declaration"],
    classes: &["class_declaration", "abstract_class_declaration", "enum_declaration"],
    interfaces: &["interface_declaration"],
    type_aliases: &["type_alias_declaration"],
    variables: &["lexical_declaration", "variable_declaration"],
    imports: &["import_statement", "lexical_declaration", "variable_declaration"],
    methods: &["method_definition", "method_signature", "abstract_method_signature"],
    wrappers: &["export_statement", "ambient_declaration"],
};

static PYTHON: NodeKinds = NodeKinds {
    functions: &["function_definition"],
    classes: &["class_definition"],
    type_aliases: &["type_alias_statement"],
    variables: &["expression_statement"],
    imports: &["import_statement", "import_from_statement"],
    methods: &["function_definition"],
    wrappers: &["decorated_definition"],
    ..NodeKinds::EMPTY
};

static GO: NodeKinds = NodeKinds {
    functions: &["function_declaration"],
    classes: &["type_declaration"],
    interfaces: &["type_declaration"],
    type_aliases: &["type_declaration"],
    variables: &["var_declaration", "const_declaration"],
    imports: &["import_declaration"],
    methods: &["method_declaration"],
    ..NodeKinds::EMPTY
};

static RUST: NodeKinds = NodeKinds {
    functions: &["function_item"],
    classes: &["struct_item", "enum_item", "union_item", "impl_item"],
    interfaces: &["trait_item"],
    type_aliases: &["type_item"],
    variables: &["const_item", "static_item"],
    imports: &["use_declaration"],
    methods: &["function_item", "function_signature_item"],
    wrappers: &["mod_item", "declaration_list"],
};

static JAVA: NodeKinds = NodeKinds {
    classes: &["class_declaration", "enum_declaration", "record_declaration"],
    interfaces: &["interface_declaration", "annotation_type_declaration"],
    imports: &["import_declaration"],
    methods: &["method_declaration", "constructor_declaration", "compact_constructor_declaration"],
    ..NodeKinds::EMPTY
};

static C_LANG: NodeKinds = NodeKinds {
    functions: &["function_definition"],
    classes: &["struct_specifier", "union_specifier", "enum_specifier", "type_definition"],
    type_aliases: &["type_definition"],
    variables: &["declaration"],
    imports: &["preproc_include"],
    methods: &["function_definition", "field_declaration", "declaration"],
    wrappers: &["preproc_ifdef", "preproc_if", "preproc_else", "preproc_elif", "linkage_specification", "declaration_list"],
    ..NodeKinds::EMPTY
};

static CPP: NodeKinds = NodeKinds {
    functions: &["function_definition"],
    classes: &["class_specifier", "struct_specifier", "union_specifier", "enum_specifier", "type_definition"],
    type_aliases: &["type_definition", "alias_declaration"],
    variables: &["declaration"],
    imports: &["preproc_include", "using_declaration"],
    methods: &["function_definition", "field_declaration", "declaration"],
    wrappers: &[
        "preproc_ifdef",
        "preproc_if",
        "preproc_else",
        "preproc_elif",
        "linkage_specification",
        "declaration_list",
        "namespace_definition",
        "template_declaration",
    ],
    ..NodeKinds::EMPTY
};

static CSHARP: NodeKinds = NodeKinds {
    functions: &["local_function_statement"],
    classes: &["class_declaration", "struct_declaration", "record_declaration", "enum_declaration"],
    interfaces: &["interface_declaration"],
    imports: &["using_directive"],
    methods: &["method_declaration", "constructor_declaration"],
    wrappers: &["namespace_declaration", "file_scoped_namespace_declaration", "declaration_list", "global_statement"],
    ..NodeKinds::EMPTY
};

static KOTLIN: NodeKinds = NodeKinds {
    functions: &["function_declaration"],
    classes: &["class_declaration", "object_declaration"],
    interfaces: &["class_declaration"],
    type_aliases: &["type_alias"],
    variables: &["property_declaration"],
    imports: &["import", "import_header"],
    methods: &["function_declaration"],
    wrappers: &["import_list"],
    ..NodeKinds::EMPTY
};

static SWIFT: NodeKinds = NodeKinds {
    functions: &["function_declaration"],
    classes: &["class_declaration"],
    interfaces: &["protocol_declaration"],
    type_aliases: &["typealias_declaration"],
    variables: &["property_declaration"],
    imports: &["import_declaration"],
    methods: &["function_declaration", "protocol_function_declaration"],
    ..NodeKinds::EMPTY
};

pub(super) static DART: NodeKinds = NodeKinds {
    functions: &["function_signature"],
    classes: &["class_definition", "enum_declaration", "mixin_declaration"],
    type_aliases: &["type_alias"],
    imports: &["import_or_export"],
    methods: &["method_signature", "declaration"],
    ..NodeKinds::EMPTY
};

static RUBY: NodeKinds = NodeKinds {
    functions: &["method"],
    classes: &["class", "module"],
    variables: &["assignment"],
    imports: &["call"],
    methods: &["method", "singleton_method"],
    ..NodeKinds::EMPTY
};

static PHP: NodeKinds = NodeKinds {
    functions: &["function_definition"],
    classes: &["class_declaration", "trait_declaration", "enum_declaration"],
    interfaces: &["interface_declaration"],
    variables: &["const_declaration"],
    imports: &["namespace_use_declaration"],
    methods: &["method_declaration"],
    wrappers: &["namespace_definition", "compound_statement"],
    ..NodeKinds::EMPTY
};

static BASH: NodeKinds = NodeKinds {
    functions: &["function_definition"],
    variables: &["variable_assignment", "declaration_command"],
    imports: &["command"],
    ..NodeKinds::EMPTY
};

static SCALA: NodeKinds = NodeKinds {
    functions: &["function_definition"],
    classes: &["class_definition", "object_definition", "enum_definition"],
    interfaces: &["trait_definition"],
    type_aliases: &["type_definition"],
    variables: &["val_definition", "var_definition"],
    imports: &["import_declaration"],
    methods: &["function_definition", "function_declaration"],
    wrappers: &["package_clause", "template_body"],
};

static HASKELL: NodeKinds = NodeKinds {
    functions: &["function"],
    classes: &["data_type", "newtype"],
    interfaces: &["class"],
    type_aliases: &["type_synomym", "type_synonym"],
    variables: &["bind"],
    imports: &["import"],
    methods: &["signature"],
    wrappers: &["declarations", "imports"],
};

static ELIXIR: NodeKinds = NodeKinds {
    functions: &["call"],
    classes: &["call"],
    interfaces: &["call"],
    imports: &["call"],
    methods: &["call"],
    ..NodeKinds::EMPTY
};

static LUA: NodeKinds = NodeKinds {
    functions: &["function_declaration"],
    classes: &["function_declaration"],
    variables: &["variable_declaration", "assignment_statement"],
    imports: &["variable_declaration", "function_call"],
    ..NodeKinds::EMPTY
};

static JSON: NodeKinds = NodeKinds {
    variables: &["pair"],
    ..NodeKinds::EMPTY
};

static YAML: NodeKinds = NodeKinds {
    variables: &["block_mapping_pair", "flow_pair"],
    ..NodeKinds::EMPTY
};

static TOML: NodeKinds = NodeKinds {
    variables: &["pair", "table", "table_array_element"],
    ..NodeKinds::EMPTY
};

/// Node-kind table for a language
pub fn node_kinds(language: SupportedLanguage) -> &'static NodeKinds {
    use SupportedLanguage::*;
    match language {
        TypeScript | Tsx | JavaScript | Jsx => &TYPESCRIPT,
        Python => &PYTHON,
        Go => &GO,
        Rust => &RUST,
        Java => &JAVA,
        C => &C_LANG,
        Cpp => &CPP,
        CSharp => &CSHARP,
        Kotlin => &KOTLIN,
        Swift => &SWIFT,
        Dart => &DART,
        Ruby => &RUBY,
        Php => &PHP,
        Bash => &BASH,
        Scala => &SCALA,
        Haskell => &HASKELL,
        Elixir => &ELIXIR,
        Lua => &LUA,
        Json => &JSON,
        Yaml => &YAML,
        Toml => &TOML,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_languages_only_have_variables() {
        for lang in [SupportedLanguage::Json, SupportedLanguage::Yaml, SupportedLanguage::Toml] {
            let kinds = node_kinds(lang);
            assert!(kinds.functions.is_empty());
            assert!(kinds.classes.is_empty());
            assert!(!kinds.variables.is_empty());
        }
    }

    #[test]
    fn test_every_code_language_has_functions_or_classes() {
        for lang in SupportedLanguage::all().iter().filter(|l| !l.is_data()) {
            let kinds = node_kinds(*lang);
            assert!(
                !kinds.functions.is_empty() || !kinds.classes.is_empty(),
                "{} has no function or class kinds",
                lang
            );
        }
    }

    #[test]
    fn test_c_has_its_own_table() {
        let c = node_kinds(SupportedLanguage::C);
        assert_eq!(c.imports, ["preproc_include"]);
        assert!(c.classes.contains(&"struct_specifier"));
        assert!(!std::ptr::eq(c, node_kinds(SupportedLanguage::Cpp)));
    }
}
