//! PHP language analyzer using tree-sitter.

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use crate::analysis::names::NameResolver;
use crate::analysis::{
    ArrayEntry, ClassDecl, ClassKind, FileFacts, Literal, MethodDecl, Param, TypeHint,
    Visibility, BUILTIN_TYPES,
};
use crate::error::{Error, Result};

/// Tree-sitter query for the top-level structure of a file.
///
/// Captures come back in document order once sorted by start byte, which is
/// what namespace and import tracking relies on.
const DECLARATION_QUERY: &str = r#"
(namespace_definition) @namespace
(namespace_use_declaration) @use
(class_declaration) @class
(interface_declaration) @interface
(trait_declaration) @trait
(enum_declaration) @enum
"#;

/// Holds a parsed tree-sitter tree and associated metadata.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file path (for error reporting).
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }
}

/// Names that are in scope while reading a class body.
struct Scope<'a> {
    resolver: &'a NameResolver,
    class: &'a str,
    parent: Option<&'a str>,
}

pub struct PhpAnalyzer {
    language: Language,
}

impl Default for PhpAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PhpAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_php::LANGUAGE_PHP.into(),
        }
    }

    pub fn parse(&self, path: &str, source: Vec<u8>) -> Result<ParsedFile> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| parse_error(path, e))?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| parse_error(path, "parser returned no tree"))?;
        Ok(ParsedFile {
            tree,
            source,
            path: path.to_string(),
        })
    }

    /// Parse and extract facts in one step.
    pub fn analyze_source(&self, path: &str, source: Vec<u8>) -> Result<FileFacts> {
        let parsed = self.parse(path, source)?;
        self.extract_facts(&parsed)
    }

    pub fn extract_facts(&self, parsed: &ParsedFile) -> Result<FileFacts> {
        let query =
            Query::new(&self.language, DECLARATION_QUERY).map_err(|e| parse_error(&parsed.path, e))?;
        let root = parsed.tree.root_node();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, root, &parsed.source[..]);

        let mut nodes: Vec<(&str, Node)> = Vec::new();
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let capture_name = query.capture_names()[capture.index as usize];
                nodes.push((capture_name, capture.node));
            }
        }
        nodes.sort_by_key(|(_, node)| node.start_byte());

        let mut facts = FileFacts::empty(&parsed.path);
        facts.has_parse_errors = root.has_error();

        let mut resolver = NameResolver::new(None);
        let mut seen_namespace = false;

        for (capture_name, node) in nodes {
            match capture_name {
                "namespace" => {
                    let namespace = field_or_kind(node, "name", "namespace_name")
                        .map(|n| parsed.node_text(n).trim_start_matches('\\').to_string());
                    if !seen_namespace {
                        facts.namespace = namespace.clone();
                        seen_namespace = true;
                    }
                    resolver.enter_namespace(namespace);
                }
                "use" => resolver.add_use_statement(parsed.node_text(node)),
                "class" => facts.classes.extend(self.class_decl(parsed, node, ClassKind::Class, &resolver)),
                "interface" => facts
                    .classes
                    .extend(self.class_decl(parsed, node, ClassKind::Interface, &resolver)),
                "trait" => facts.classes.extend(self.class_decl(parsed, node, ClassKind::Trait, &resolver)),
                "enum" => facts.classes.extend(self.class_decl(parsed, node, ClassKind::Enum, &resolver)),
                _ => {}
            }
        }

        Ok(facts)
    }

    fn class_decl(
        &self,
        parsed: &ParsedFile,
        node: Node,
        kind: ClassKind,
        resolver: &NameResolver,
    ) -> Option<ClassDecl> {
        let name = parsed.node_text(node.child_by_field_name("name")?).to_string();
        if name.is_empty() {
            return None;
        }

        let mut decl = ClassDecl {
            kind,
            namespace: resolver.namespace().map(str::to_string),
            name,
            is_abstract: false,
            extends: Vec::new(),
            implements: Vec::new(),
            traits: Vec::new(),
            constants: Vec::new(),
            methods: Vec::new(),
            path: parsed.path.clone(),
            line: node.start_position().row + 1,
        };

        let mut body = None;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "base_clause" => decl.extends = self.class_names(parsed, child, resolver),
                "class_interface_clause" => decl.implements = self.class_names(parsed, child, resolver),
                "declaration_list" | "enum_declaration_list" => body = Some(child),
                k if k.ends_with("_modifier") => {
                    if parsed.node_text(child).eq_ignore_ascii_case("abstract") {
                        decl.is_abstract = true;
                    }
                }
                _ => {}
            }
        }

        let Some(body) = body else {
            return Some(decl);
        };

        let fqn = decl.fqn();
        let parent = decl.extends.first().cloned();
        let scope = Scope {
            resolver,
            class: &fqn,
            parent: if kind == ClassKind::Class { parent.as_deref() } else { None },
        };

        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "method_declaration" => {
                    if let Some(mut method) = self.method_decl(parsed, member, &scope) {
                        if kind == ClassKind::Interface {
                            method.is_abstract = true;
                        }
                        decl.methods.push(method);
                    }
                }
                "const_declaration" => decl.constants.extend(self.constants(parsed, member, &scope)),
                "use_declaration" => decl.traits.extend(self.class_names(parsed, member, resolver)),
                _ => {}
            }
        }

        Some(decl)
    }

    /// Resolved names listed directly under an `extends`, `implements` or
    /// trait `use` clause.
    fn class_names(&self, parsed: &ParsedFile, clause: Node, resolver: &NameResolver) -> Vec<String> {
        let mut cursor = clause.walk();
        clause
            .named_children(&mut cursor)
            .filter(|n| matches!(n.kind(), "name" | "qualified_name"))
            .map(|n| resolver.resolve_class(parsed.node_text(n)))
            .collect()
    }

    fn constants(&self, parsed: &ParsedFile, node: Node, scope: &Scope) -> Vec<(String, Literal)> {
        let mut constants = Vec::new();
        let mut cursor = node.walk();
        for element in node.named_children(&mut cursor) {
            if element.kind() != "const_element" {
                continue;
            }
            let mut element_cursor = element.walk();
            let parts: Vec<Node> = element
                .named_children(&mut element_cursor)
                .filter(|n| n.kind() != "comment")
                .collect();
            if let (Some(name), Some(value)) = (parts.first(), parts.last()) {
                if parts.len() >= 2 {
                    constants.push((
                        parsed.node_text(*name).to_string(),
                        self.literal(parsed, *value, scope),
                    ));
                }
            }
        }
        constants
    }

    fn method_decl(&self, parsed: &ParsedFile, node: Node, scope: &Scope) -> Option<MethodDecl> {
        let name = parsed.node_text(node.child_by_field_name("name")?).to_string();

        let mut method = MethodDecl {
            name,
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            params: Vec::new(),
            return_type: None,
            constant_return: None,
            line: node.start_position().row + 1,
        };

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "visibility_modifier" => {
                    method.visibility = Visibility::from_keyword(parsed.node_text(child))
                }
                "static_modifier" => method.is_static = true,
                "abstract_modifier" => method.is_abstract = true,
                _ => {}
            }
        }

        if let Some(params) = node.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            method.params = params
                .named_children(&mut cursor)
                .filter_map(|p| self.param(parsed, p, scope))
                .collect();
        }

        method.return_type = return_type_node(node).map(|t| self.type_hint(parsed, t, scope.resolver));

        if let Some(body) = node.child_by_field_name("body") {
            method.constant_return = self.first_return(parsed, body, scope);
        }

        Some(method)
    }

    fn param(&self, parsed: &ParsedFile, node: Node, scope: &Scope) -> Option<Param> {
        if !matches!(
            node.kind(),
            "simple_parameter" | "variadic_parameter" | "property_promotion_parameter"
        ) {
            return None;
        }

        let name_text = parsed.node_text(node.child_by_field_name("name")?);
        let by_ref = name_text.starts_with('&') || {
            let mut cursor = node.walk();
            let found = node
                .children(&mut cursor)
                .any(|c| c.kind() == "reference_modifier");
            found
        };
        let name = name_text
            .trim_start_matches('&')
            .trim()
            .trim_start_matches('$')
            .to_string();

        Some(Param {
            name,
            type_hint: node
                .child_by_field_name("type")
                .map(|t| self.type_hint(parsed, t, scope.resolver)),
            default: node
                .child_by_field_name("default_value")
                .map(|d| self.literal(parsed, d, scope)),
            variadic: node.kind() == "variadic_parameter",
            by_ref,
        })
    }

    fn type_hint(&self, parsed: &ParsedFile, node: Node, resolver: &NameResolver) -> TypeHint {
        let text = parsed.node_text(node).trim();
        let mut cursor = node.walk();
        let members: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|n| n.kind() != "comment")
            .collect();

        match node.kind() {
            "optional_type" => match members.first() {
                Some(inner) => TypeHint::Nullable(Box::new(self.type_hint(parsed, *inner, resolver))),
                None => classify_type(text.trim_start_matches('?'), resolver),
            },
            "union_type" | "disjunctive_normal_form_type" => TypeHint::Union(
                members
                    .iter()
                    .map(|m| self.type_hint(parsed, *m, resolver))
                    .collect(),
            ),
            "intersection_type" => TypeHint::Intersection(
                members
                    .iter()
                    .map(|m| self.type_hint(parsed, *m, resolver))
                    .collect(),
            ),
            "primitive_type" | "bottom_type" => TypeHint::Builtin(text.to_ascii_lowercase()),
            "named_type" | "name" | "qualified_name" => classify_type(text, resolver),
            _ if members.len() > 1 && text.contains('|') => TypeHint::Union(
                members
                    .iter()
                    .map(|m| self.type_hint(parsed, *m, resolver))
                    .collect(),
            ),
            _ if members.len() > 1 && text.contains('&') => TypeHint::Intersection(
                members
                    .iter()
                    .map(|m| self.type_hint(parsed, *m, resolver))
                    .collect(),
            ),
            _ if members.len() == 1 && text.starts_with('(') => {
                self.type_hint(parsed, members[0], resolver)
            }
            _ => classify_type(text, resolver),
        }
    }

    fn first_return(&self, parsed: &ParsedFile, body: Node, scope: &Scope) -> Option<Literal> {
        let mut cursor = body.walk();
        let statement = body
            .named_children(&mut cursor)
            .find(|n| n.kind() == "return_statement")?;
        let mut cursor = statement.walk();
        let expr = statement
            .named_children(&mut cursor)
            .find(|n| n.kind() != "comment")?;
        Some(self.literal(parsed, expr, scope))
    }

    /// Evaluate a constant expression node.
    fn literal(&self, parsed: &ParsedFile, node: Node, scope: &Scope) -> Literal {
        let text = parsed.node_text(node).trim();
        let verbatim = || Literal::Expr(qualified_source(parsed, node, scope));

        let mut cursor = node.walk();
        let children: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|n| n.kind() != "comment")
            .collect();

        match node.kind() {
            "null" => Literal::Null,
            "boolean" => Literal::Bool(text.eq_ignore_ascii_case("true")),
            "integer" => parse_int(text).map(Literal::Int).unwrap_or_else(verbatim),
            "float" => text
                .replace('_', "")
                .parse::<f64>()
                .map(Literal::Float)
                .unwrap_or_else(|_| verbatim()),
            "string" | "encapsed_string" => decode_string(text)
                .map(Literal::String)
                .unwrap_or_else(verbatim),
            "name" => match text.to_ascii_lowercase().as_str() {
                "true" => Literal::Bool(true),
                "false" => Literal::Bool(false),
                "null" => Literal::Null,
                _ => verbatim(),
            },
            "parenthesized_expression" => match children.first() {
                Some(inner) => self.literal(parsed, *inner, scope),
                None => verbatim(),
            },
            "unary_op_expression" => {
                let operand = match children.last() {
                    Some(operand) => self.literal(parsed, *operand, scope),
                    None => return verbatim(),
                };
                match (text.chars().next(), operand) {
                    (Some('-'), Literal::Int(i)) => i.checked_neg().map(Literal::Int).unwrap_or_else(verbatim),
                    (Some('-'), Literal::Float(f)) => Literal::Float(-f),
                    (Some('+'), value @ (Literal::Int(_) | Literal::Float(_))) => value,
                    (_, Literal::Expr(_)) => verbatim(),
                    (Some(op @ ('-' | '+' | '!' | '~')), operand) => Literal::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    _ => verbatim(),
                }
            }
            "binary_expression" => {
                let (Some(left), Some(op), Some(right)) = (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("operator"),
                    node.child_by_field_name("right"),
                ) else {
                    return verbatim();
                };
                let left = self.literal(parsed, left, scope);
                let right = self.literal(parsed, right, scope);
                if matches!((&left, &right), (Literal::Expr(_), Literal::Expr(_))) {
                    return verbatim();
                }
                Literal::Binary {
                    op: parsed.node_text(op).to_ascii_lowercase(),
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            "array_creation_expression" => {
                let mut entries = Vec::new();
                for element in children.iter().filter(|n| n.kind() == "array_element_initializer") {
                    let mut element_cursor = element.walk();
                    let parts: Vec<Node> = element
                        .named_children(&mut element_cursor)
                        .filter(|n| n.kind() != "comment")
                        .collect();
                    match parts.as_slice() {
                        [value] if value.kind() != "variadic_unpacking" && value.kind() != "by_ref" => {
                            entries.push(ArrayEntry {
                                key: None,
                                value: self.literal(parsed, *value, scope),
                            })
                        }
                        [key, value] if value.kind() != "by_ref" => entries.push(ArrayEntry {
                            key: Some(self.literal(parsed, *key, scope)),
                            value: self.literal(parsed, *value, scope),
                        }),
                        _ => return verbatim(),
                    }
                }
                Literal::Array(entries)
            }
            "class_constant_access_expression" => {
                let [qualifier, member] = children.as_slice() else {
                    return verbatim();
                };
                let qualifier = parsed.node_text(*qualifier);
                let member = parsed.node_text(*member);
                let class = match qualifier.to_ascii_lowercase().as_str() {
                    "static" => {
                        return Literal::LateStaticConstant {
                            class: scope.class.to_string(),
                            name: member.to_string(),
                        }
                    }
                    "self" => Some(scope.class.to_string()),
                    "parent" => scope.parent.map(str::to_string),
                    _ => Some(scope.resolver.resolve_class(qualifier)),
                };
                match class {
                    Some(class) if member.eq_ignore_ascii_case("class") => Literal::String(class),
                    Some(class) => Literal::ClassConstant {
                        class,
                        name: member.to_string(),
                    },
                    None => verbatim(),
                }
            }
            _ => verbatim(),
        }
    }
}

fn parse_error(path: &str, message: impl std::fmt::Display) -> Error {
    Error::Parse {
        path: path.to_string(),
        message: message.to_string(),
    }
}

/// Source text of `node` with `self`, `static`, `parent` and relative class
/// names made absolute, so it keeps its meaning outside the declaring class.
fn qualified_source(parsed: &ParsedFile, node: Node, scope: &Scope) -> String {
    let mut rewrites = Vec::new();
    collect_class_references(parsed, node, scope, &mut rewrites);

    let source = parsed.source.as_slice();
    let slice = |from: usize, to: usize| String::from_utf8_lossy(&source[from..to]).into_owned();
    let mut out = String::new();
    let mut pos = node.start_byte();
    for (from, to, replacement) in rewrites {
        out.push_str(&slice(pos, from));
        out.push_str(&replacement);
        pos = to;
    }
    out.push_str(&slice(pos, node.end_byte()));
    out.trim().to_string()
}

/// Byte ranges naming a class, in document order, with their absolute form.
fn collect_class_references(
    parsed: &ParsedFile,
    node: Node,
    scope: &Scope,
    out: &mut Vec<(usize, usize, String)>,
) {
    match node.kind() {
        "relative_scope" => {
            let target = match parsed.node_text(node).to_ascii_lowercase().as_str() {
                "self" | "static" => Some(scope.class),
                "parent" => scope.parent,
                _ => None,
            };
            if let Some(target) = target {
                out.push((node.start_byte(), node.end_byte(), format!("\\{}", target)));
            }
            return;
        }
        "class_constant_access_expression"
        | "scoped_call_expression"
        | "scoped_property_access_expression"
        | "object_creation_expression" => {
            let mut cursor = node.walk();
            let class_ref = node
                .named_children(&mut cursor)
                .find(|n| n.kind() != "comment")
                .filter(|n| matches!(n.kind(), "name" | "qualified_name"));
            if let Some(class_ref) = class_ref {
                let fqn = scope.resolver.resolve_class(parsed.node_text(class_ref));
                out.push((class_ref.start_byte(), class_ref.end_byte(), format!("\\{}", fqn)));
                collect_children(parsed, node, Some(class_ref), scope, out);
                return;
            }
        }
        _ => {}
    }
    collect_children(parsed, node, None, scope, out);
}

fn collect_children(
    parsed: &ParsedFile,
    node: Node,
    skip: Option<Node>,
    scope: &Scope,
    out: &mut Vec<(usize, usize, String)>,
) {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    for child in children.into_iter().filter(|c| Some(*c) != skip) {
        collect_class_references(parsed, child, scope, out);
    }
}

fn field_or_kind<'a>(node: Node<'a>, field: &str, kind: &str) -> Option<Node<'a>> {
    node.child_by_field_name(field).or_else(|| {
        let mut cursor = node.walk();
        let found = node.named_children(&mut cursor).find(|n| n.kind() == kind);
        found
    })
}

/// The node after `:` in a method header.
fn return_type_node(method: Node) -> Option<Node> {
    if let Some(node) = method.child_by_field_name("return_type") {
        return Some(node);
    }
    let mut cursor = method.walk();
    let mut after_colon = false;
    for child in method.children(&mut cursor) {
        if child.kind() == ":" {
            after_colon = true;
        } else if after_colon && child.is_named() {
            return Some(child);
        }
    }
    None
}

fn classify_type(text: &str, resolver: &NameResolver) -> TypeHint {
    let lower = text.to_ascii_lowercase();
    if BUILTIN_TYPES.contains(&lower.as_str()) {
        TypeHint::Builtin(lower)
    } else {
        TypeHint::Class(resolver.resolve_class(text))
    }
}

/// Parse a PHP integer literal (decimal, hex, octal, binary, with `_`).
fn parse_int(text: &str) -> Option<i64> {
    let digits = text.replace('_', "");
    let lower = digits.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()
    } else if lower.len() > 1 && lower.starts_with('0') {
        i64::from_str_radix(&lower[1..], 8).ok()
    } else {
        lower.parse().ok()
    }
}

/// Decode a quoted string literal. Returns `None` for interpolated strings.
fn decode_string(text: &str) -> Option<String> {
    let text = match text.strip_prefix(['b', 'B']) {
        Some(rest) if rest.starts_with(['\'', '"']) => rest,
        _ => text,
    };

    if let Some(inner) = text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
        return Some(unescape_single(inner));
    }
    if let Some(inner) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        return unescape_double(inner);
    }
    None
}

fn unescape_single(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('\\') | Some('\'') => {
                    out.push(chars.next().unwrap_or(c));
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

fn unescape_double(inner: &str) -> Option<String> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' if chars
                .peek()
                .is_some_and(|n| n.is_ascii_alphabetic() || *n == '_' || *n == '{') =>
            {
                return None;
            }
            '{' if chars.peek() == Some(&'$') => return None,
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('v') => out.push('\u{0b}'),
                Some('e') => out.push('\u{1b}'),
                Some('f') => out.push('\u{0c}'),
                Some('\\') => out.push('\\'),
                Some('$') => out.push('$'),
                Some('"') => out.push('"'),
                Some('x') => {
                    let mut hex = String::new();
                    while hex.len() < 2 && chars.peek().is_some_and(|h| h.is_ascii_hexdigit()) {
                        hex.extend(chars.next());
                    }
                    match u8::from_str_radix(&hex, 16) {
                        Ok(byte) => out.push(ascii_byte(byte)?),
                        Err(_) => out.push_str("\\x"),
                    }
                }
                Some(d @ '0'..='7') => {
                    let mut oct = String::from(d);
                    while oct.len() < 3 && chars.peek().is_some_and(|o| ('0'..='7').contains(o)) {
                        oct.extend(chars.next());
                    }
                    let value = u32::from_str_radix(&oct, 8).unwrap_or(0) & 0xff;
                    out.push(ascii_byte(value as u8)?);
                }
                Some('u') if chars.peek() == Some(&'{') => {
                    chars.next();
                    let mut hex = String::new();
                    while let Some(h) = chars.next_if(|h| *h != '}') {
                        hex.push(h);
                    }
                    chars.next_if_eq(&'}')?;
                    let code = u32::from_str_radix(&hex, 16).ok()?;
                    out.push(char::from_u32(code)?);
                }
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            _ => out.push(c),
        }
    }
    Some(out)
}

/// Raw bytes above ASCII are not characters on their own; strings holding
/// them stay as source text.
fn ascii_byte(byte: u8) -> Option<char> {
    byte.is_ascii().then(|| char::from(byte))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(source: &str) -> FileFacts {
        PhpAnalyzer::new()
            .analyze_source("test.php", source.as_bytes().to_vec())
            .unwrap()
    }

    #[test]
    fn test_class_structure() {
        let facts = analyze(
            r#"<?php

namespace App\Facade;

use Flawlol\Facade\Abstract\Facade;
use App\Contracts\Marker as M;

final class MailFacade extends Facade implements M, \Countable
{
    use \App\Concerns\Forwarding;

    public static function getFacadeAccessor(): string
    {
        return 'mailer';
    }
}
"#,
        );

        assert_eq!(facts.namespace.as_deref(), Some("App\\Facade"));
        assert_eq!(facts.classes.len(), 1);

        let class = &facts.classes[0];
        assert_eq!(class.fqn(), "App\\Facade\\MailFacade");
        assert_eq!(class.kind, ClassKind::Class);
        assert!(!class.is_abstract);
        assert_eq!(class.extends, vec!["Flawlol\\Facade\\Abstract\\Facade"]);
        assert_eq!(class.implements, vec!["App\\Contracts\\Marker", "Countable"]);
        assert_eq!(class.traits, vec!["App\\Concerns\\Forwarding"]);

        let accessor = class.method("getFacadeAccessor").unwrap();
        assert!(accessor.is_static);
        assert_eq!(accessor.constant_return, Some(Literal::String("mailer".to_string())));
    }

    #[test]
    fn test_kinds_and_abstract() {
        let facts = analyze(
            r#"<?php
namespace App;

abstract class Base {}
interface Contract extends \Stringable, Other {}
trait Helpers {}
enum Suit { case Hearts; }
"#,
        );

        let kinds: Vec<_> = facts.classes.iter().map(|c| (c.name.as_str(), c.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("Base", ClassKind::Class),
                ("Contract", ClassKind::Interface),
                ("Helpers", ClassKind::Trait),
                ("Suit", ClassKind::Enum),
            ]
        );
        assert!(facts.classes[0].is_abstract);
        assert!(!facts.classes[0].is_instantiable());
        assert_eq!(facts.classes[1].extends, vec!["Stringable", "App\\Other"]);
    }

    #[test]
    fn test_method_signatures() {
        let facts = analyze(
            r#"<?php
namespace App\Service;

use App\Mail\Message;

class Mailer
{
    const RETRIES = 3;

    public function send(string $to, bool $cc = false): bool { return true; }
    protected function build(Message $message): Message { return $message; }
    private function secret() {}
    public static function create(): self { return new self(); }
    function legacy(?int $count = null, array $opts = [], &$out = null, string ...$tags): ?self {}
    public function retry(int $times = self::RETRIES): void {}
}
"#,
        );

        let class = &facts.classes[0];
        let names: Vec<_> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["send", "build", "secret", "create", "legacy", "retry"]);

        let send = class.method("send").unwrap();
        assert!(send.is_forwardable());
        assert_eq!(send.params.len(), 2);
        assert_eq!(send.params[0].name, "to");
        assert_eq!(send.params[0].type_hint, Some(TypeHint::Builtin("string".to_string())));
        assert_eq!(send.params[1].default, Some(Literal::Bool(false)));
        assert_eq!(send.return_type, Some(TypeHint::Builtin("bool".to_string())));

        let build = class.method("build").unwrap();
        assert_eq!(build.visibility, Visibility::Protected);
        assert_eq!(
            build.return_type,
            Some(TypeHint::Class("App\\Mail\\Message".to_string()))
        );

        assert_eq!(class.method("secret").unwrap().visibility, Visibility::Private);
        assert!(class.method("create").unwrap().is_static);

        let legacy = class.method("legacy").unwrap();
        assert_eq!(legacy.visibility, Visibility::Public);
        assert_eq!(
            legacy.params[0].type_hint,
            Some(TypeHint::Nullable(Box::new(TypeHint::Builtin("int".to_string()))))
        );
        assert_eq!(legacy.params[1].default, Some(Literal::Array(vec![])));
        assert!(legacy.params[2].by_ref);
        assert_eq!(legacy.params[2].name, "out");
        assert!(legacy.params[3].variadic);
        assert_eq!(legacy.params[3].name, "tags");

        let retry = class.method("retry").unwrap();
        assert_eq!(
            retry.params[0].default,
            Some(Literal::ClassConstant {
                class: "App\\Service\\Mailer".to_string(),
                name: "RETRIES".to_string(),
            })
        );
        assert_eq!(class.constant("RETRIES"), Some(&Literal::Int(3)));
    }

    #[test]
    fn test_accessor_class_constant() {
        let facts = analyze(
            r#"<?php
namespace App\Facade;

use App\Service\Mailer;

class Mail extends Facade
{
    protected static function getFacadeAccessor(): string
    {
        return Mailer::class;
    }
}
"#,
        );
        let accessor = facts.classes[0].method("getFacadeAccessor").unwrap();
        assert_eq!(
            accessor.constant_return,
            Some(Literal::String("App\\Service\\Mailer".to_string()))
        );
    }

    #[test]
    fn test_braced_namespaces() {
        let facts = analyze(
            r#"<?php
namespace First {
    class A {}
}
namespace Second {
    class B {}
}
"#,
        );
        let fqns: Vec<_> = facts.classes.iter().map(|c| c.fqn()).collect();
        assert_eq!(fqns, vec!["First\\A", "Second\\B"]);
        assert_eq!(facts.namespace.as_deref(), Some("First"));
    }

    #[test]
    fn test_parse_int_forms() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("0x1F"), Some(31));
        assert_eq!(parse_int("0b101"), Some(5));
        assert_eq!(parse_int("017"), Some(15));
        assert_eq!(parse_int("1_000"), Some(1000));
        assert_eq!(parse_int("0"), Some(0));
    }

    #[test]
    fn test_decode_string() {
        assert_eq!(decode_string(r"'it\'s'"), Some("it's".to_string()));
        assert_eq!(decode_string(r"'a\b'"), Some(r"a\b".to_string()));
        assert_eq!(decode_string(r#""tab\there""#), Some("tab\there".to_string()));
        assert_eq!(decode_string(r#""hi $name""#), None);
        assert_eq!(decode_string(r#""cost \$5""#), Some("cost $5".to_string()));
    }

    #[test]
    fn test_decode_string_byte_and_unicode_escapes() {
        assert_eq!(decode_string(r#""\x41\101""#), Some("AA".to_string()));
        assert_eq!(decode_string(r#""smile \u{1F600}""#), Some("smile \u{1F600}".to_string()));
        assert_eq!(decode_string(r#""\u{e9}t\u{E9}""#), Some("\u{e9}t\u{e9}".to_string()));
        // Not valid UTF-8 on their own, so the literal is kept as written.
        assert_eq!(decode_string(r#""\xff""#), None);
        assert_eq!(decode_string(r#""\377""#), None);
        assert_eq!(decode_string(r#""\u{110000}""#), None);
    }

    #[test]
    fn test_high_byte_default_kept_as_source() {
        let facts = analyze(
            r#"<?php
namespace App;

class Bytes
{
    public function pad(string $fill = "\xff\xfe"): string {}
}
"#,
        );
        let pad = facts.classes[0].method("pad").unwrap();
        assert_eq!(
            pad.params[0].default,
            Some(Literal::Expr(r#""\xff\xfe""#.to_string()))
        );
    }

    #[test]
    fn test_static_constant_stays_late_bound() {
        let facts = analyze(
            r#"<?php
namespace App\Facade;

abstract class Base extends Facade
{
    protected static function getFacadeAccessor(): string
    {
        return static::SERVICE;
    }
}

abstract class Named extends Facade
{
    protected static function getFacadeAccessor(): string
    {
        return static::class;
    }
}
"#,
        );
        let base = facts.classes[0].method("getFacadeAccessor").unwrap();
        assert_eq!(
            base.constant_return,
            Some(Literal::LateStaticConstant {
                class: "App\\Facade\\Base".to_string(),
                name: "SERVICE".to_string(),
            })
        );
        let named = facts.classes[1].method("getFacadeAccessor").unwrap();
        assert_eq!(
            named.constant_return,
            Some(Literal::LateStaticConstant {
                class: "App\\Facade\\Named".to_string(),
                name: "class".to_string(),
            })
        );
    }

    #[test]
    fn test_constant_expression_defaults() {
        let facts = analyze(
            r#"<?php
namespace App\Service;

use Acme\Clock\SystemClock;

class Worker extends Base
{
    const BASE = 10;

    public function retry(int $n = self::BASE * 2, string $tag = 'job-' . self::BASE, int $mask = -self::BASE): void {}
    public function tick(SystemClock $clock = new SystemClock(self::BASE), int $size = parent::SIZE + strlen(PHP_EOL)): void {}
}
"#,
        );
        let class = &facts.classes[0];
        let base = || {
            Box::new(Literal::ClassConstant {
                class: "App\\Service\\Worker".to_string(),
                name: "BASE".to_string(),
            })
        };

        let retry = class.method("retry").unwrap();
        assert_eq!(
            retry.params[0].default,
            Some(Literal::Binary {
                op: "*".to_string(),
                left: base(),
                right: Box::new(Literal::Int(2)),
            })
        );
        assert_eq!(
            retry.params[1].default,
            Some(Literal::Binary {
                op: ".".to_string(),
                left: Box::new(Literal::String("job-".to_string())),
                right: base(),
            })
        );
        assert_eq!(
            retry.params[2].default,
            Some(Literal::Unary { op: '-', operand: base() })
        );

        // Expressions that cannot be folded keep absolute class names.
        let tick = class.method("tick").unwrap();
        assert_eq!(
            tick.params[0].default,
            Some(Literal::Expr(
                "new \\Acme\\Clock\\SystemClock(\\App\\Service\\Worker::BASE)".to_string()
            ))
        );
        match &tick.params[1].default {
            Some(Literal::Binary { op, left, right }) => {
                assert_eq!(op, "+");
                assert_eq!(
                    **left,
                    Literal::ClassConstant {
                        class: "App\\Service\\Base".to_string(),
                        name: "SIZE".to_string(),
                    }
                );
                assert_eq!(**right, Literal::Expr("strlen(PHP_EOL)".to_string()));
            }
            other => panic!("expected a binary expression, got {:?}", other),
        }
    }
}
