//! Fact structures extracted from PHP sources.

use std::fmt;

/// Kind of class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
    Enum,
}

impl ClassKind {
    /// Convert to a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Trait => "trait",
            ClassKind::Enum => "enum",
        }
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Member visibility. Methods without a modifier are public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.to_ascii_lowercase().as_str() {
            "private" => Visibility::Private,
            "protected" => Visibility::Protected,
            _ => Visibility::Public,
        }
    }
}

/// Built-in type keywords that are never namespace-resolved.
pub const BUILTIN_TYPES: &[&str] = &[
    "array", "bool", "callable", "false", "float", "int", "iterable", "mixed", "never", "null",
    "object", "parent", "self", "static", "string", "true", "void",
];

/// A declared parameter or return type.
///
/// Class names are stored fully qualified, without the leading `\`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeHint {
    Builtin(String),
    Class(String),
    Nullable(Box<TypeHint>),
    Union(Vec<TypeHint>),
    Intersection(Vec<TypeHint>),
}

impl TypeHint {
    /// Render the type as PHP source.
    ///
    /// `self_class` replaces `self` and `static`, which would otherwise bind
    /// to whatever class the rendered text ends up in.
    pub fn render(&self, self_class: Option<&str>) -> String {
        match self {
            TypeHint::Builtin(name) => match (name.as_str(), self_class) {
                ("self" | "static", Some(fqn)) => format!("\\{}", fqn),
                _ => name.clone(),
            },
            TypeHint::Class(fqn) => format!("\\{}", fqn),
            TypeHint::Nullable(inner) => format!("?{}", inner.render(self_class)),
            TypeHint::Union(members) => members
                .iter()
                .map(|m| match m {
                    TypeHint::Intersection(_) => format!("({})", m.render(self_class)),
                    _ => m.render(self_class),
                })
                .collect::<Vec<_>>()
                .join("|"),
            TypeHint::Intersection(members) => members
                .iter()
                .map(|m| m.render(self_class))
                .collect::<Vec<_>>()
                .join("&"),
        }
    }

    /// Whether a method returning this type produces no value.
    pub fn is_bottom(&self) -> bool {
        matches!(self, TypeHint::Builtin(name) if name == "void" || name == "never")
    }
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(None))
    }
}

/// A constant expression: parameter defaults, class constants, and the
/// value returned by `getFacadeAccessor()`.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<ArrayEntry>),
    /// `Foo::BAR`, with `self` and `parent` already bound.
    ClassConstant { class: String, name: String },
    /// `static::BAR` or `static::class`. Binds to the called class; `class`
    /// is the declaring class, used when no called class is known.
    LateStaticConstant { class: String, name: String },
    /// `left op right`, folded once constants are resolvable.
    Binary {
        op: String,
        left: Box<Literal>,
        right: Box<Literal>,
    },
    /// `-x`, `+x`, `!x` or `~x` over a value that is not a plain literal.
    Unary { op: char, operand: Box<Literal> },
    /// Anything that cannot be evaluated statically, kept as source text
    /// with class references made absolute.
    Expr(String),
}

/// One `key => value` pair of an array literal. Keys are optional.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayEntry {
    pub key: Option<Literal>,
    pub value: Literal,
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Name without the `$` sigil.
    pub name: String,
    pub type_hint: Option<TypeHint>,
    pub default: Option<Literal>,
    pub variadic: bool,
    pub by_ref: bool,
}

/// A method declared in a class, interface or trait body.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub params: Vec<Param>,
    pub return_type: Option<TypeHint>,
    /// Value of the first `return` statement when it is a constant expression.
    pub constant_return: Option<Literal>,
    /// Line number (1-indexed).
    pub line: usize,
}

impl MethodDecl {
    /// Public, non-static methods are the ones a facade forwards to.
    pub fn is_forwardable(&self) -> bool {
        self.visibility == Visibility::Public && !self.is_static
    }

    /// Whether parameter `i` is optional the way reflection reports it: it
    /// has a default and nothing after it is required.
    pub fn is_param_optional(&self, i: usize) -> bool {
        match self.params.get(i) {
            Some(p) if p.default.is_some() => self.params[i + 1..]
                .iter()
                .all(|later| later.default.is_some() || later.variadic),
            _ => false,
        }
    }
}

/// A class, interface, trait or enum declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub kind: ClassKind,
    pub namespace: Option<String>,
    pub name: String,
    pub is_abstract: bool,
    /// Parent class for classes, parent interfaces for interfaces.
    pub extends: Vec<String>,
    pub implements: Vec<String>,
    /// Traits pulled in with `use` inside the body.
    pub traits: Vec<String>,
    pub constants: Vec<(String, Literal)>,
    pub methods: Vec<MethodDecl>,
    /// Source file, relative to the scan root where possible.
    pub path: String,
    pub line: usize,
}

impl ClassDecl {
    /// Fully qualified name without a leading `\`.
    pub fn fqn(&self) -> String {
        match &self.namespace {
            Some(ns) if !ns.is_empty() => format!("{}\\{}", ns, self.name),
            _ => self.name.clone(),
        }
    }

    /// Abstract classes, interfaces, traits and enums cannot back a facade.
    pub fn is_instantiable(&self) -> bool {
        self.kind == ClassKind::Class && !self.is_abstract
    }

    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn constant(&self, name: &str) -> Option<&Literal> {
        self.constants
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }
}

/// All facts extracted from a single file.
#[derive(Debug, Clone, Default)]
pub struct FileFacts {
    pub path: String,
    /// First namespace declared in the file.
    pub namespace: Option<String>,
    pub classes: Vec<ClassDecl>,
    pub has_parse_errors: bool,
}

impl FileFacts {
    pub fn empty(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Default::default()
        }
    }
}
