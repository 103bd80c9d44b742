//! Import extraction from module source text.
//!
//! The builder only needs the import occurrences of a module and two flags,
//! so the [`Lexer`] contract is kept that small. [`OxcLexer`] is the default
//! implementation; hosts with their own parser can plug in another one.

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ExportAllDeclaration, ExportNamedDeclaration, Expression, ImportDeclaration,
    ImportExpression, MetaProperty, ModuleDeclaration, Program, Statement,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::{Parser, ParserReturn};
use oxc_span::{GetSpan, SourceType};
use serde::Serialize;

/// Syntactic form of an import occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// `import ... from`, `export ... from`, `export * from`.
    Static,
    /// `import(...)`.
    Dynamic,
}

/// One import occurrence, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRecord {
    /// The specifier text, or `None` when it is not a static string
    /// (e.g. `import(name)`).
    pub specifier: Option<String>,
    /// Byte offset where the specifier starts.
    pub start: u32,
    /// Byte offset where the specifier ends.
    pub end: u32,
    pub kind: ImportKind,
}

impl ImportRecord {
    pub fn is_dynamic(&self) -> bool {
        self.kind == ImportKind::Dynamic
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexOutput {
    pub imports: Vec<ImportRecord>,
    /// The module consists only of imports and re-exports.
    pub facade: bool,
    /// The module uses `import`/`export` declarations or `import.meta`.
    pub has_module_syntax: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LexError {
    pub message: String,
}

impl LexError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Extracts import occurrences from source text.
pub trait Lexer: Send + Sync + std::fmt::Debug {
    /// Lex `source`, the contents of the file at `path`.
    ///
    /// `path` only selects the dialect (JS, TS, JSX). Files the lexer has no
    /// dialect for yield an empty [`LexOutput`].
    fn lex(&self, path: &Path, source: &str) -> Result<LexOutput, LexError>;
}

/// Default lexer built on the oxc parser.
///
/// Type-only imports and exports are ignored, and so is `require()`.
/// Dynamic imports are reported in ES modules and scripts alike.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxcLexer;

impl OxcLexer {
    pub fn new() -> Self {
        Self
    }
}

impl Lexer for OxcLexer {
    fn lex(&self, path: &Path, source: &str) -> Result<LexOutput, LexError> {
        let Ok(source_type) = SourceType::from_path(path) else {
            return Ok(LexOutput::default());
        };

        let allocator = Allocator::default();
        let ParserReturn {
            program,
            errors,
            panicked,
            ..
        } = Parser::new(&allocator, source, source_type).parse();

        if panicked {
            return Err(LexError::new("parser aborted"));
        }
        if let Some(first) = errors.first() {
            return Err(LexError::new(first.to_string()));
        }

        let mut collector = ImportCollector::default();
        collector.visit_program(&program);
        collector.imports.sort_by_key(|record| record.start);

        Ok(LexOutput {
            imports: collector.imports,
            facade: is_facade(&program),
            has_module_syntax: collector.has_module_syntax,
        })
    }
}

#[derive(Default)]
struct ImportCollector {
    imports: Vec<ImportRecord>,
    has_module_syntax: bool,
}

impl ImportCollector {
    fn push_static(&mut self, specifier: &str, start: u32, end: u32) {
        self.imports.push(ImportRecord {
            specifier: Some(specifier.to_string()),
            start,
            end,
            kind: ImportKind::Static,
        });
    }
}

impl<'a> Visit<'a> for ImportCollector {
    fn visit_module_declaration(&mut self, decl: &ModuleDeclaration<'a>) {
        self.has_module_syntax = true;
        walk::walk_module_declaration(self, decl);
    }

    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'a>) {
        if !decl.import_kind.is_type() {
            let span = decl.source.span;
            self.push_static(decl.source.value.as_str(), span.start, span.end);
        }
        walk::walk_import_declaration(self, decl);
    }

    fn visit_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &decl.source {
            if !decl.export_kind.is_type() {
                self.push_static(source.value.as_str(), source.span.start, source.span.end);
            }
        }
        walk::walk_export_named_declaration(self, decl);
    }

    fn visit_export_all_declaration(&mut self, decl: &ExportAllDeclaration<'a>) {
        if !decl.export_kind.is_type() {
            let span = decl.source.span;
            self.push_static(decl.source.value.as_str(), span.start, span.end);
        }
        walk::walk_export_all_declaration(self, decl);
    }

    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        let span = expr.source.span();
        self.imports.push(ImportRecord {
            specifier: static_specifier(&expr.source),
            start: span.start,
            end: span.end,
            kind: ImportKind::Dynamic,
        });
        walk::walk_import_expression(self, expr);
    }

    fn visit_meta_property(&mut self, meta: &MetaProperty<'a>) {
        if meta.meta.name.as_str() == "import" {
            self.has_module_syntax = true;
        }
        walk::walk_meta_property(self, meta);
    }
}

/// String value of a dynamic import argument, if it is static.
fn static_specifier(expr: &Expression<'_>) -> Option<String> {
    match expr {
        Expression::StringLiteral(lit) => Some(lit.value.to_string()),
        Expression::TemplateLiteral(tpl) if tpl.expressions.is_empty() => tpl
            .quasis
            .first()
            .and_then(|quasi| quasi.value.cooked.as_ref())
            .map(|cooked| cooked.to_string()),
        _ => None,
    }
}

fn is_facade(program: &Program<'_>) -> bool {
    !program.body.is_empty() && program.body.iter().all(is_reexport_statement)
}

fn is_reexport_statement(stmt: &Statement<'_>) -> bool {
    match stmt.as_module_declaration() {
        Some(ModuleDeclaration::ImportDeclaration(_))
        | Some(ModuleDeclaration::ExportAllDeclaration(_)) => true,
        Some(ModuleDeclaration::ExportNamedDeclaration(decl)) => decl.declaration.is_none(),
        _ => false,
    }
}
