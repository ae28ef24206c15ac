//! Rendering of method signatures and default values as PHP source.

use crate::analysis::{ArrayEntry, ClassIndex, Literal, MethodDecl};

/// Constant references are followed at most this many times.
const MAX_CONSTANT_DEPTH: usize = 8;

/// One generated static method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubMethod {
    pub name: String,
    /// Parameter list for the stub signature, e.g. `string $to, bool $cc = false`.
    pub params: String,
    /// Argument list for the forwarded call, e.g. `$to, $cc`.
    pub args: String,
    /// `@param` lines without the leading ` * `.
    pub doc_params: Vec<String>,
    pub return_type: String,
    /// False for `void` and `never`, which forward without `return`.
    pub returns_value: bool,
}

impl StubMethod {
    /// Build the stub for a method of `service_class`.
    pub fn from_decl(method: &MethodDecl, service_class: &str, index: &ClassIndex) -> Self {
        let exporter = Exporter { index };

        let mut params = Vec::with_capacity(method.params.len());
        let mut args = Vec::with_capacity(method.params.len());
        let mut doc_params = Vec::with_capacity(method.params.len());

        for (i, param) in method.params.iter().enumerate() {
            let type_str = param
                .type_hint
                .as_ref()
                .map(|t| format!("{} ", t.render(Some(service_class))))
                .unwrap_or_default();
            let spread = if param.variadic { "..." } else { "" };
            let by_ref = if param.by_ref { "&" } else { "" };

            let default = match &param.default {
                Some(value) if !param.variadic && method.is_param_optional(i) => {
                    format!(" = {}", exporter.export(value))
                }
                _ => String::new(),
            };

            params.push(format!("{}{}{}${}{}", type_str, by_ref, spread, param.name, default));
            args.push(format!("{}${}", spread, param.name));
            doc_params.push(format!("@param {}{}${}", type_str, spread, param.name));
        }

        let (return_type, returns_value) = match &method.return_type {
            Some(ty) => (ty.render(Some(service_class)), !ty.is_bottom()),
            None => ("mixed".to_string(), true),
        };

        Self {
            name: method.name.clone(),
            params: params.join(", "),
            args: args.join(", "),
            doc_params,
            return_type,
            returns_value,
        }
    }
}

/// Renders literals the way PHP's `var_export` prints them.
pub struct Exporter<'a> {
    pub index: &'a ClassIndex,
}

/// A normalized array key.
#[derive(Debug, Clone, PartialEq)]
enum ArrayKey {
    Int(i64),
    Str(String),
    Verbatim(String),
}

impl<'a> Exporter<'a> {
    pub fn export(&self, value: &Literal) -> String {
        self.export_at(value, 0, 0)
    }

    fn export_at(&self, value: &Literal, indent: usize, depth: usize) -> String {
        match value {
            Literal::Null => "NULL".to_string(),
            Literal::Bool(b) => b.to_string(),
            Literal::Int(i) => i.to_string(),
            Literal::Float(f) => export_float(*f),
            Literal::String(s) => export_string(s),
            Literal::Array(entries) => self.export_array(entries, indent, depth),
            Literal::ClassConstant { class, name } | Literal::LateStaticConstant { class, name } => {
                match self.constant(class, name, depth) {
                    Some(resolved) => self.export_at(resolved, indent, depth + 1),
                    None if name.eq_ignore_ascii_case("class") => export_string(class),
                    None => format!("\\{}::{}", class, name),
                }
            }
            Literal::Binary { .. } | Literal::Unary { .. } => match self.fold(value, depth) {
                Some(folded) => self.export_at(&folded, indent, depth),
                None => self.source(value, depth),
            },
            Literal::Expr(text) => text.clone(),
        }
    }

    /// Evaluate `value` to a scalar, following constants through the index.
    fn fold(&self, value: &Literal, depth: usize) -> Option<Literal> {
        match value {
            Literal::Null
            | Literal::Bool(_)
            | Literal::Int(_)
            | Literal::Float(_)
            | Literal::String(_) => Some(value.clone()),
            Literal::ClassConstant { class, name } | Literal::LateStaticConstant { class, name } => {
                if name.eq_ignore_ascii_case("class") {
                    return Some(Literal::String(class.clone()));
                }
                self.fold(self.constant(class, name, depth)?, depth + 1)
            }
            Literal::Binary { op, left, right } => {
                fold_binary(op, self.fold(left, depth)?, self.fold(right, depth)?)
            }
            Literal::Unary { op, operand } => fold_unary(*op, self.fold(operand, depth)?),
            Literal::Array(_) | Literal::Expr(_) => None,
        }
    }

    /// PHP source for an expression that does not fold. Operands that do
    /// fold are printed as their values.
    fn source(&self, value: &Literal, depth: usize) -> String {
        if let Some(folded) = self.fold(value, depth) {
            return self.export_at(&folded, 0, depth);
        }
        match value {
            Literal::Binary { op, left, right } => format!(
                "{} {} {}",
                self.operand(left, depth),
                op,
                self.operand(right, depth)
            ),
            Literal::Unary { op, operand } => format!("{}{}", op, self.operand(operand, depth)),
            _ => self.export_at(value, 0, depth),
        }
    }

    fn operand(&self, value: &Literal, depth: usize) -> String {
        match value {
            Literal::Binary { .. } | Literal::Unary { .. } if self.fold(value, depth).is_none() => {
                format!("({})", self.source(value, depth))
            }
            _ => self.source(value, depth),
        }
    }

    fn constant(&self, class: &str, name: &str, depth: usize) -> Option<&'a Literal> {
        if depth >= MAX_CONSTANT_DEPTH {
            return None;
        }
        self.index.constant(class, name)
    }

    fn export_array(&self, entries: &[ArrayEntry], indent: usize, depth: usize) -> String {
        // PHP assigns implicit keys after the largest integer key so far and
        // lets a repeated key overwrite the earlier value in place.
        let mut pairs: Vec<(ArrayKey, &Literal)> = Vec::with_capacity(entries.len());
        let mut next_index: i64 = 0;

        for entry in entries {
            let key = match &entry.key {
                Some(key) => self.array_key(key, depth),
                None => ArrayKey::Int(next_index),
            };
            if let ArrayKey::Int(k) = key {
                if k >= next_index {
                    next_index = k.saturating_add(1);
                }
            }
            match pairs.iter_mut().find(|(existing, _)| *existing == key) {
                Some(pair) => pair.1 = &entry.value,
                None => pairs.push((key, &entry.value)),
            }
        }

        let pad = " ".repeat(indent);
        let mut out = String::from("array (\n");
        for (key, value) in pairs {
            let key = match key {
                ArrayKey::Int(i) => i.to_string(),
                ArrayKey::Str(s) => export_string(&s),
                ArrayKey::Verbatim(text) => text,
            };
            match value {
                Literal::Array(inner) => {
                    out.push_str(&format!(
                        "{pad}  {key} => \n{pad}  {},\n",
                        self.export_array(inner, indent + 2, depth)
                    ));
                }
                _ => {
                    out.push_str(&format!(
                        "{pad}  {key} => {},\n",
                        self.export_at(value, indent + 2, depth)
                    ));
                }
            }
        }
        out.push_str(&pad);
        out.push(')');
        out
    }

    fn array_key(&self, key: &Literal, depth: usize) -> ArrayKey {
        match key {
            Literal::Int(i) => ArrayKey::Int(*i),
            Literal::Bool(b) => ArrayKey::Int(i64::from(*b)),
            Literal::Null => ArrayKey::Str(String::new()),
            Literal::Float(f) => ArrayKey::Int(f.trunc() as i64),
            Literal::String(s) => match canonical_int(s) {
                Some(i) => ArrayKey::Int(i),
                None => ArrayKey::Str(s.clone()),
            },
            Literal::ClassConstant { class, name } | Literal::LateStaticConstant { class, name } => {
                match self.constant(class, name, depth) {
                    Some(resolved) => self.array_key(resolved, depth + 1),
                    None if name.eq_ignore_ascii_case("class") => ArrayKey::Str(class.clone()),
                    None => ArrayKey::Verbatim(format!("\\{}::{}", class, name)),
                }
            }
            Literal::Binary { .. } | Literal::Unary { .. } => match self.fold(key, depth) {
                Some(folded) => self.array_key(&folded, depth),
                None => ArrayKey::Verbatim(self.source(key, depth)),
            },
            Literal::Array(_) | Literal::Expr(_) => ArrayKey::Verbatim(self.export(key)),
        }
    }
}

/// Constant-expression operators on already folded operands. Anything
/// PHP would reject or warn about yields `None`.
fn fold_binary(op: &str, left: Literal, right: Literal) -> Option<Literal> {
    match op {
        "." => Some(Literal::String(string_operand(&left)? + &string_operand(&right)?)),
        "??" => Some(if left == Literal::Null { right } else { left }),
        "+" | "-" | "*" | "/" | "**" => fold_arithmetic(op, &left, &right),
        "%" | "|" | "&" | "^" | "<<" | ">>" => {
            let (Literal::Int(a), Literal::Int(b)) = (left, right) else {
                return None;
            };
            let value = match op {
                "%" => a.checked_rem(b)?,
                "|" => a | b,
                "&" => a & b,
                "^" => a ^ b,
                "<<" => a.checked_shl(u32::try_from(b).ok()?)?,
                _ => a.checked_shr(u32::try_from(b).ok()?)?,
            };
            Some(Literal::Int(value))
        }
        _ => None,
    }
}

/// Integer results stay integers unless they overflow or divide unevenly.
fn fold_arithmetic(op: &str, left: &Literal, right: &Literal) -> Option<Literal> {
    if let (Literal::Int(a), Literal::Int(b)) = (left, right) {
        let exact = match op {
            "+" => a.checked_add(*b),
            "-" => a.checked_sub(*b),
            "*" => a.checked_mul(*b),
            "/" if a.checked_rem(*b) == Some(0) => a.checked_div(*b),
            "**" => u32::try_from(*b).ok().and_then(|e| a.checked_pow(e)),
            _ => None,
        };
        if let Some(value) = exact {
            return Some(Literal::Int(value));
        }
    }

    let (a, b) = (number(left)?, number(right)?);
    let value = match op {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        "/" if b != 0.0 => a / b,
        "**" => a.powf(b),
        _ => return None,
    };
    Some(Literal::Float(value))
}

fn fold_unary(op: char, operand: Literal) -> Option<Literal> {
    match (op, operand) {
        ('-', Literal::Int(i)) => i.checked_neg().map(Literal::Int),
        ('-', Literal::Float(f)) => Some(Literal::Float(-f)),
        ('+', value @ (Literal::Int(_) | Literal::Float(_))) => Some(value),
        ('!', Literal::Bool(b)) => Some(Literal::Bool(!b)),
        ('~', Literal::Int(i)) => Some(Literal::Int(!i)),
        _ => None,
    }
}

fn number(value: &Literal) -> Option<f64> {
    match value {
        Literal::Int(i) => Some(*i as f64),
        Literal::Float(f) => Some(*f),
        _ => None,
    }
}

/// String conversion for `.`; floats are left alone since PHP prints them
/// differently from `var_export`.
fn string_operand(value: &Literal) -> Option<String> {
    match value {
        Literal::String(s) => Some(s.clone()),
        Literal::Int(i) => Some(i.to_string()),
        Literal::Bool(true) => Some("1".to_string()),
        Literal::Bool(false) | Literal::Null => Some(String::new()),
        _ => None,
    }
}

/// `'...'` with backslashes and quotes escaped, NUL bytes spliced in.
pub fn export_string(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\0', "' . \"\\0\" . '");
    format!("'{}'", escaped)
}

/// Floats always carry a decimal point, exponents use `E+NN`.
pub fn export_float(f: f64) -> String {
    if f.is_nan() {
        return "NAN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "INF".to_string() } else { "-INF".to_string() };
    }

    let repr = format!("{:?}", f);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let mantissa = if mantissa.contains('.') {
                mantissa.to_string()
            } else {
                format!("{}.0", mantissa)
            };
            let exponent = if exponent.starts_with('-') {
                exponent.to_string()
            } else {
                format!("+{}", exponent)
            };
            format!("{}E{}", mantissa, exponent)
        }
        None => repr,
    }
}

/// PHP treats decimal strings like `"12"` as integer keys.
fn canonical_int(s: &str) -> Option<i64> {
    let value: i64 = s.parse().ok()?;
    (value.to_string() == s).then_some(value)
}
