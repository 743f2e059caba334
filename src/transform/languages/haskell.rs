//! Haskell
//!
//! A function is a run of equations sharing a name, optionally preceded by
//! a type signature. Equations are merged into one entity and parameter and
//! return types are read off the signature.

use crate::transform::helpers::{Cx, FnParts, descendants_of_kind, find_descendant, method, module_level, named_children};
use crate::transform::kinds::{NodeKinds, node_kinds};
use crate::transform::strategy::LanguageStrategy;
use crate::language::SupportedLanguage;
use crate::uce::{
    ClassKind, ImportSpecifier, Modifier, Modifiers, SpecifierKind, UceClass, UceFunction, UceImport, UceInterface,
    UceParameter, UceVariable, VariableKind, Visibility,
};
use std::collections::{HashMap, HashSet};
use tree_sitter::Node;

pub struct HaskellStrategy;

/// Split a signature on top-level `->`, dropping any `Ctx =>` prefix
fn arrow_parts(signature: &str) -> Vec<String> {
    let mut depth = 0i32;
    let bytes = signature.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'=' if depth == 0 && bytes.get(i + 1) == Some(&b'>') => {
                parts.clear();
                start = i + 2;
                i += 1;
            }
            b'-' if depth == 0 && bytes.get(i + 1) == Some(&b'>') => {
                parts.push(signature[start..i].trim().to_string());
                start = i + 2;
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(signature[start..].trim().to_string());
    parts.retain(|p| !p.is_empty());
    parts
}

/// Names listed in `module M (a, B(..)) where`; `None` exports everything
fn export_list(cx: &Cx, root: Node) -> Option<HashSet<String>> {
    let header = find_descendant(root, &["header"])?;
    let exports = find_descendant(header, &["exports"])?;
    Some(
        descendants_of_kind(exports, &["variable", "name", "constructor", "qualified"], &[])
            .into_iter()
            .map(|n| cx.text(n).trim().to_string())
            .collect(),
    )
}

fn modifiers_for(exports: &Option<HashSet<String>>, name: &str) -> Modifiers {
    match exports {
        Some(list) if !list.contains(name) => Modifiers::new(),
        _ => Modifiers::new().with(Modifier::Export),
    }
}

fn signature_type(cx: &Cx, signature: Node) -> Option<String> {
    signature
        .child_by_field_name("type")
        .map(|t| cx.text(t).trim().to_string())
        .or_else(|| cx.text(signature).split_once("::").map(|(_, t)| t.trim().to_string()))
}

fn signature_names(cx: &Cx, signature: Node) -> Vec<String> {
    let head = cx.text(signature).split_once("::").map(|(h, _)| h).unwrap_or("");
    head.split(',').map(|n| n.trim().to_string()).filter(|n| !n.is_empty()).collect()
}

impl HaskellStrategy {
    /// Merge equations into functions, in order of first appearance
    fn functions(&self, cx: &Cx, root: Node) -> Vec<UceFunction> {
        let exports = export_list(cx, root);
        let kinds = self.kinds();
        let mut sigs: HashMap<String, Node> = HashMap::new();
        for sig in module_level(root, &["signature"], kinds.wrappers) {
            for name in signature_names(cx, sig) {
                sigs.entry(name).or_insert(sig);
            }
        }

        let mut order: Vec<String> = Vec::new();
        let mut equations: HashMap<String, Vec<Node>> = HashMap::new();
        for eq in module_level(root, kinds.functions, kinds.wrappers) {
            let Some(name) = cx.name(eq) else { continue };
            if !equations.contains_key(&name) {
                order.push(name.clone());
            }
            equations.entry(name).or_default().push(eq);
        }

        order
            .into_iter()
            .filter_map(|name| {
                let eqs = equations.remove(&name)?;
                let first = *eqs.first()?;
                let last = *eqs.last()?;
                let sig = sigs.get(&name).copied();
                let types = sig.and_then(|s| signature_type(cx, s)).map(|t| arrow_parts(&t)).unwrap_or_default();

                let patterns = first
                    .child_by_field_name("patterns")
                    .map(named_children)
                    .unwrap_or_default();
                let params = patterns
                    .iter()
                    .enumerate()
                    .map(|(i, p)| UceParameter {
                        name: cx.text(*p).trim().to_string(),
                        param_type: types.get(i).filter(|_| i + 1 < types.len()).cloned(),
                        ..Default::default()
                    })
                    .collect();
                let return_type = if types.len() > patterns.len() { types.last().cloned() } else { None };

                let parts = FnParts {
                    params,
                    return_type,
                    modifiers: modifiers_for(&exports, &name),
                    doc: sig.and_then(|s| cx.doc(s)),
                    ..Default::default()
                };
                let mut function = cx.function(first, name, parts);
                let end = cx.location(last);
                function.location.end_line = end.end_line;
                function.location.end_column = end.end_column;
                // each extra equation is another pattern-match branch
                if cx.options.complexity {
                    function.complexity += eqs[1..].iter().map(|e| cx.complexity(*e)).sum::<u32>();
                }
                Some(function)
            })
            .collect()
    }

    fn data_type(&self, cx: &Cx, node: Node, exports: &Option<HashSet<String>>) -> Option<UceClass> {
        let name = cx.name(node)?;
        let constructors = descendants_of_kind(node, &["data_constructor", "newtype_constructor"], &["deriving"]);

        let mut properties = Vec::new();
        let records: Vec<Node> = constructors
            .iter()
            .flat_map(|c| descendants_of_kind(*c, &["field"], &[]))
            .collect();
        let nullary = constructors.iter().all(|c| {
            find_descendant(*c, &["constructor"]).is_some_and(|n| cx.text(n).trim() == cx.text(*c).trim())
        });

        if constructors.len() == 1 && !records.is_empty() {
            for field in records {
                let text = cx.text(field);
                let (names, ty) = text.split_once("::").unwrap_or((text, ""));
                for field_name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                    let mut prop = cx.property(field, field_name.to_string(), None, Visibility::Public);
                    prop.property_type = (!ty.trim().is_empty()).then(|| ty.trim().to_string());
                    prop.is_readonly = true;
                    properties.push(prop);
                }
            }
        } else {
            for ctor in &constructors {
                let Some(ctor_name) = find_descendant(*ctor, &["constructor"]) else { continue };
                let mut prop = cx.property(*ctor, cx.text(ctor_name).to_string(), None, Visibility::Public);
                prop.is_static = true;
                prop.is_readonly = true;
                properties.push(prop);
            }
        }

        let implements = find_descendant(node, &["deriving"])
            .map(|d| {
                cx.text(d)
                    .trim_start_matches("deriving")
                    .replace(['(', ')'], "")
                    .split(',')
                    .map(|c| c.trim().trim_start_matches("stock ").trim_start_matches("anyclass ").trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Some(UceClass {
            kind: if constructors.len() > 1 && nullary { ClassKind::Enum } else { ClassKind::Struct },
            modifiers: modifiers_for(exports, &name),
            implements,
            properties,
            location: cx.location(node),
            doc_comment: cx.doc(node),
            name,
            ..Default::default()
        })
    }
}

impl LanguageStrategy for HaskellStrategy {
    fn kinds(&self) -> &'static NodeKinds {
        node_kinds(SupportedLanguage::Haskell)
    }

    fn extract_functions(&self, cx: &Cx, root: Node) -> Vec<UceFunction> {
        self.functions(cx, root)
    }

    fn extract_classes(&self, cx: &Cx, root: Node) -> Vec<UceClass> {
        let exports = export_list(cx, root);
        let kinds = self.kinds();
        module_level(root, kinds.classes, kinds.wrappers)
            .into_iter()
            .filter_map(|n| self.data_type(cx, n, &exports))
            .collect()
    }

    /// Type classes
    fn parse_interface(&self, cx: &Cx, node: Node) -> Option<UceInterface> {
        let name = cx.name(node)?;
        let decls = descendants_of_kind(node, &["signature", "function", "bind"], &[]);
        let defaults: HashSet<String> = decls
            .iter()
            .filter(|d| d.kind() != "signature")
            .filter_map(|d| cx.name(*d))
            .collect();

        let mut methods = Vec::new();
        for sig in decls.iter().filter(|d| d.kind() == "signature") {
            let types = signature_type(cx, *sig).map(|t| arrow_parts(&t)).unwrap_or_default();
            for method_name in signature_names(cx, *sig) {
                let (ret, args) = types.split_last().map(|(r, a)| (Some(r.clone()), a.to_vec())).unwrap_or((None, Vec::new()));
                let parts = FnParts {
                    params: args
                        .iter()
                        .enumerate()
                        .map(|(i, t)| UceParameter {
                            name: format!("arg{}", i),
                            param_type: Some(t.clone()),
                            ..Default::default()
                        })
                        .collect(),
                    return_type: ret,
                    ..Default::default()
                };
                let mut m = method(cx.function(*sig, method_name.clone(), parts), Visibility::Public);
                m.is_abstract = !defaults.contains(&method_name);
                methods.push(m);
            }
        }

        Some(UceInterface {
            name,
            type_params: node
                .child_by_field_name("patterns")
                .map(|p| named_children(p).into_iter().map(|v| cx.text(v).to_string()).collect())
                .unwrap_or_default(),
            extends: Vec::new(),
            properties: Vec::new(),
            methods,
            location: cx.location(node),
            modifiers: Modifiers::new().with(Modifier::Export),
            doc_comment: cx.doc(node),
        })
    }

    fn parse_variables(&self, cx: &Cx, node: Node) -> Vec<UceVariable> {
        let Some(name) = cx.name(node) else {
            return Vec::new();
        };
        let root = {
            let mut top = node;
            while let Some(parent) = top.parent() {
                top = parent;
            }
            top
        };
        let exports = export_list(cx, root);
        let sig = module_level(root, &["signature"], self.kinds().wrappers)
            .into_iter()
            .find(|s| signature_names(cx, *s).contains(&name));
        let initializer = cx
            .text(node)
            .split_once('=')
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty());
        vec![UceVariable {
            modifiers: modifiers_for(&exports, &name).with(Modifier::Const),
            kind: VariableKind::Const,
            var_type: sig.and_then(|s| signature_type(cx, s)),
            initializer,
            location: cx.location(node),
            doc_comment: sig.and_then(|s| cx.doc(s)).or_else(|| cx.doc(node)),
            name,
        }]
    }

    /// `import qualified Data.Map as M`, `import Data.List (nub)`
    fn parse_imports(&self, cx: &Cx, node: Node) -> Vec<UceImport> {
        let text = cx.text(node).trim().trim_start_matches("import").trim();
        let (head, list) = match text.split_once('(') {
            Some((head, rest)) => (head, Some(rest.trim_end().trim_end_matches(')'))),
            None => (text, None),
        };
        let mut words: Vec<&str> = head.split_whitespace().collect();
        let qualified = words.first() == Some(&"qualified");
        words.retain(|w| *w != "qualified" && *w != "safe");
        let hiding = words.last() == Some(&"hiding");
        if hiding {
            words.pop();
        }
        let Some(module) = words.first().map(|m| m.to_string()) else {
            return Vec::new();
        };
        let alias = words
            .iter()
            .position(|w| *w == "as")
            .and_then(|i| words.get(i + 1))
            .map(|a| a.to_string());

        let specifiers = match list {
            Some(list) if !hiding => list
                .split(',')
                .map(|s| s.trim().split('(').next().unwrap_or("").trim().to_string())
                .filter(|s| !s.is_empty())
                .map(|s| ImportSpecifier {
                    local: s.clone(),
                    imported: s,
                    kind: SpecifierKind::Named,
                })
                .collect(),
            _ => {
                let local = alias.clone().unwrap_or_else(|| if qualified { module.clone() } else { "*".to_string() });
                vec![ImportSpecifier {
                    local,
                    imported: "*".to_string(),
                    kind: SpecifierKind::Namespace,
                }]
            }
        };
        vec![UceImport {
            source: module,
            specifiers,
            is_type_only: false,
            is_side_effect: false,
            location: cx.location(node),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::arrow_parts;
    use crate::SupportedLanguage;
    use crate::test_support::transform;
    use crate::uce::{ClassKind, Modifier, SpecifierKind};

    const SOURCE: &str = r#"module Shapes (area, Shape(..), origin) where

import qualified Data.Map as M
import Data.List (sortBy, nub)
import Control.Monad

-- | A shape.
data Shape = Circle Double | Rect Double Double
  deriving (Show, Eq)

data Color = Red | Green | Blue

data Point = Point { px :: Double, py :: Double }

newtype Name = Name String

type Table = M.Map String Int

-- | Things with an area.
class HasArea a where
  areaOf :: a -> Double
  describe :: a -> String
  describe _ = "shape"

-- | Computes the area.
area :: Shape -> Double
area (Circle r) = pi * r * r
area (Rect w h) = w * h

helper :: Int -> Int -> Int
helper x y = x + y

origin :: Point
origin = Point 0 0
"#;

    #[test]
    fn test_equations_merge_with_signature() {
        let file = transform(SOURCE, SupportedLanguage::Haskell);
        let names: Vec<_> = file.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["area", "helper"]);

        let area = &file.functions[0];
        assert_eq!(area.params.len(), 1);
        assert_eq!(area.params[0].param_type.as_deref(), Some("Shape"));
        assert_eq!(area.return_type.as_deref(), Some("Double"));
        assert_eq!(area.doc_comment.as_deref(), Some("Computes the area."));
        assert_eq!(area.complexity, 2);
        assert!(area.modifiers.contains(Modifier::Export));

        let helper = &file.functions[1];
        let params: Vec<_> = helper.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(params, ["x", "y"]);
        assert_eq!(helper.return_type.as_deref(), Some("Int"));
        assert!(!helper.modifiers.contains(Modifier::Export));
    }

    #[test]
    fn test_data_types() {
        let file = transform(SOURCE, SupportedLanguage::Haskell);
        let kinds: Vec<_> = file.classes.iter().map(|c| (c.name.as_str(), c.kind)).collect();
        assert_eq!(
            kinds,
            [
                ("Shape", ClassKind::Struct),
                ("Color", ClassKind::Enum),
                ("Point", ClassKind::Struct),
                ("Name", ClassKind::Struct)
            ]
        );
        let shape = &file.classes[0];
        assert_eq!(shape.implements, ["Show", "Eq"]);
        let ctors: Vec<_> = shape.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(ctors, ["Circle", "Rect"]);
        assert_eq!(file.classes[1].properties.len(), 3);

        let point = &file.classes[2];
        let fields: Vec<_> = point.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(fields, ["px", "py"]);
        assert_eq!(point.properties[0].property_type.as_deref(), Some("Double"));
    }

    #[test]
    fn test_type_class_and_synonym() {
        let file = transform(SOURCE, SupportedLanguage::Haskell);
        let class = file.find_interface("HasArea").unwrap();
        assert_eq!(class.doc_comment.as_deref(), Some("Things with an area."));
        let methods: Vec<_> = class.methods.iter().map(|m| (m.name(), m.is_abstract)).collect();
        assert_eq!(methods, [("areaOf", true), ("describe", false)]);
        assert_eq!(class.methods[0].function.return_type.as_deref(), Some("Double"));

        assert_eq!(file.type_aliases[0].name, "Table");
        assert_eq!(file.variables[0].name, "origin");
        assert_eq!(file.variables[0].var_type.as_deref(), Some("Point"));
    }

    #[test]
    fn test_imports() {
        let file = transform(SOURCE, SupportedLanguage::Haskell);
        assert_eq!(file.imports.len(), 3);
        assert_eq!(file.imports[0].source, "Data.Map");
        assert_eq!(file.imports[0].specifiers[0].local, "M");
        assert_eq!(file.imports[0].specifiers[0].kind, SpecifierKind::Namespace);
        let list: Vec<_> = file.imports[1].specifiers.iter().map(|s| s.imported.as_str()).collect();
        assert_eq!(list, ["sortBy", "nub"]);
        assert_eq!(file.imports[2].specifiers[0].local, "*");
    }

    #[test]
    fn test_arrow_parts() {
        assert_eq!(arrow_parts("Int -> Int -> Int"), ["Int", "Int", "Int"]);
        assert_eq!(arrow_parts("Ord a => [a] -> [a]"), ["[a]", "[a]"]);
        assert_eq!(arrow_parts("(a -> b) -> [a] -> [b]"), ["(a -> b)", "[a]", "[b]"]);
    }
}
