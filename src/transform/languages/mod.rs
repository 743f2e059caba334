//! Language strategies
//!
//! One unit struct per grammar family. Dart has no grammar crate and runs on
//! the plain node-kind table.

mod bash;
mod c_family;
mod csharp;
mod data;
mod elixir;
mod go;
mod haskell;
mod java;
mod kotlin;
mod lua;
mod php;
mod python;
mod ruby;
mod rust;
mod scala;
mod swift;
mod typescript;

use super::strategy::{LanguageStrategy, TableStrategy};
use crate::language::SupportedLanguage;

static DART: TableStrategy = TableStrategy(&super::kinds::DART);

pub fn strategy(language: SupportedLanguage) -> &'static dyn LanguageStrategy {
    use SupportedLanguage::*;
    match language {
        TypeScript | Tsx | JavaScript | Jsx => &typescript::TypeScriptStrategy,
        Python => &python::PythonStrategy,
        Go => &go::GoStrategy,
        Rust => &rust::RustStrategy,
        Java => &java::JavaStrategy,
        C => &c_family::CFamilyStrategy { cpp: false },
        Cpp => &c_family::CFamilyStrategy { cpp: true },
        CSharp => &csharp::CSharpStrategy,
        Kotlin => &kotlin::KotlinStrategy,
        Swift => &swift::SwiftStrategy,
        Dart => &DART,
        Ruby => &ruby::RubyStrategy,
        Php => &php::PhpStrategy,
        Bash => &bash::BashStrategy,
        Scala => &scala::ScalaStrategy,
        Haskell => &haskell::HaskellStrategy,
        Elixir => &elixir::ElixirStrategy,
        Lua => &lua::LuaStrategy,
        Json => &data::DataStrategy(Json),
        Yaml => &data::DataStrategy(Yaml),
        Toml => &data::DataStrategy(Toml),
    }
}
