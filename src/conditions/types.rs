//! core types for rule expressions

use std::fmt;

/// the expression AST - represents a parsed rule expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// all children must be true (AND)
    All(Vec<Expr>),
    /// any child must be true (OR)
    Any(Vec<Expr>),
    /// negate a child (NOT)
    Not(Box<Expr>),
    /// reference to a named rule, lower-cased
    Ident(String),
}

impl Expr {
    /// create an AND expression
    pub fn all(children: Vec<Expr>) -> Self {
        Expr::All(children)
    }

    /// create an OR expression
    pub fn any(children: Vec<Expr>) -> Self {
        Expr::Any(children)
    }

    /// create a NOT expression
    #[allow(clippy::should_implement_trait)]
    pub fn negate(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    /// create a rule reference
    pub fn ident(name: impl AsRef<str>) -> Self {
        Expr::Ident(name.as_ref().to_lowercase())
    }

    /// rule names referenced by this expression, in evaluation order
    pub fn identifiers(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_identifiers(&mut names);
        names
    }

    fn collect_identifiers<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::All(children) | Expr::Any(children) => {
                for child in children {
                    child.collect_identifiers(names);
                }
            }
            Expr::Not(inner) => inner.collect_identifiers(names),
            Expr::Ident(name) => names.push(name),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::All(children) => write_call(f, "all", children),
            Expr::Any(children) => write_call(f, "any", children),
            Expr::Not(inner) => write!(f, "not({})", inner),
            Expr::Ident(name) => write!(f, "{}", name),
        }
    }
}

fn write_call(f: &mut fmt::Formatter<'_>, name: &str, children: &[Expr]) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (i, c) in children.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", c)?;
    }
    write!(f, ")")
}
