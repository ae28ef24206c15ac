//! PHP class-name resolution against the current namespace and `use` imports.

use std::collections::HashMap;

/// Resolves class names as written in a file to fully qualified names.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    namespace: Option<String>,
    /// Lowercased alias to fully qualified name.
    imports: HashMap<String, String>,
}

impl NameResolver {
    pub fn new(namespace: Option<String>) -> Self {
        Self {
            namespace: namespace.filter(|ns| !ns.is_empty()),
            imports: HashMap::new(),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Enter a new namespace. Imports do not carry across namespaces.
    pub fn enter_namespace(&mut self, namespace: Option<String>) {
        self.namespace = namespace.filter(|ns| !ns.is_empty());
        self.imports.clear();
    }

    /// Register the class imports of a `use ...;` statement given its
    /// source text. Function and const imports are ignored.
    pub fn add_use_statement(&mut self, text: &str) {
        let body = text.trim();
        let body = strip_keyword(body, "use").unwrap_or(body);
        let body = body.trim().trim_end_matches(';').trim();

        if strip_keyword(body, "function").is_some() || strip_keyword(body, "const").is_some() {
            return;
        }

        if let (Some(open), Some(close)) = (body.find('{'), body.rfind('}')) {
            let prefix = body[..open].trim().trim_end_matches('\\');
            for item in body[open + 1..close].split(',') {
                let item = item.trim();
                if item.is_empty()
                    || strip_keyword(item, "function").is_some()
                    || strip_keyword(item, "const").is_some()
                {
                    continue;
                }
                self.add_import(&format!("{}\\{}", prefix, item));
            }
            return;
        }

        for item in body.split(',') {
            let item = item.trim();
            if !item.is_empty() {
                self.add_import(item);
            }
        }
    }

    /// Add one `Name\Space\Class [as Alias]` clause.
    fn add_import(&mut self, clause: &str) {
        let mut parts = clause.split_whitespace();
        let Some(name) = parts.next() else {
            return;
        };
        let name = name.trim_start_matches('\\');

        let alias = match (parts.next(), parts.next()) {
            (Some(kw), Some(alias)) if kw.eq_ignore_ascii_case("as") => alias.to_string(),
            _ => last_segment(name).to_string(),
        };

        self.imports.insert(alias.to_ascii_lowercase(), name.to_string());
    }

    /// Resolve a class name to its fully qualified form (no leading `\`).
    pub fn resolve_class(&self, name: &str) -> String {
        let name = name.trim();
        if let Some(absolute) = name.strip_prefix('\\') {
            return absolute.to_string();
        }

        if let Some(relative) = strip_namespace_keyword(name) {
            return self.qualify(relative);
        }

        let (first, rest) = match name.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };

        if let Some(imported) = self.imports.get(&first.to_ascii_lowercase()) {
            return match rest {
                Some(rest) => format!("{}\\{}", imported, rest),
                None => imported.clone(),
            };
        }

        self.qualify(name)
    }

    fn qualify(&self, name: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{}\\{}", ns, name),
            None => name.to_string(),
        }
    }
}

/// Last `\`-separated segment of a qualified name.
pub fn last_segment(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let head = text.get(..keyword.len())?;
    let rest = &text[keyword.len()..];
    if head.eq_ignore_ascii_case(keyword) && rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn strip_namespace_keyword(name: &str) -> Option<&str> {
    let head = name.get(..10)?;
    if head.eq_ignore_ascii_case("namespace\\") {
        Some(&name[10..])
    } else {
        None
    }
}
