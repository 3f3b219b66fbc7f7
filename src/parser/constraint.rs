//! Build constraint evaluation for Go source files.
//!
//! A file is kept when its `//go:build` expression holds for the target
//! platform or, lacking one, when its `_GOOS`/`_GOARCH` file-name suffixes
//! match. Test files are never kept.

use std::path::Path;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "arm", "arm64", "loong64", "mips", "mips64", "mips64le", "mipsle", "ppc64",
    "ppc64le", "riscv64", "s390x", "sparc64", "wasm",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

/// The platform files are filtered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub goos: String,
    pub goarch: String,
}

impl Platform {
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
        }
    }

    /// Whether a single build tag is satisfied.
    pub fn satisfies(&self, tag: &str) -> bool {
        tag == self.goos
            || tag == self.goarch
            || tag == "gc"
            || (tag == "unix" && UNIX_OS.contains(&self.goos.as_str()))
            || tag
                .strip_prefix("go1.")
                .is_some_and(|minor| !minor.is_empty() && minor.bytes().all(|b| b.is_ascii_digit()))
    }

    /// Whether a file should be extracted.
    pub fn includes(&self, path: &Path, build_constraint: Option<&str>) -> bool {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy())
            .unwrap_or_default();
        if stem.ends_with("_test") {
            return false;
        }

        match build_constraint {
            Some(line) => self.eval_line(line),
            None => self.matches_file_name(&stem),
        }
    }

    /// Evaluate a `//go:build` line. An expression that fails to parse
    /// excludes the file.
    pub fn eval_line(&self, line: &str) -> bool {
        let expr = line.trim().trim_start_matches("//go:build");
        match Expr::parse(expr) {
            Some(expr) => expr.eval(&|tag| self.satisfies(tag)),
            None => false,
        }
    }

    /// Apply the `name_GOOS_GOARCH.go` file-name convention.
    fn matches_file_name(&self, stem: &str) -> bool {
        let parts: Vec<&str> = stem.split('_').collect();
        if parts.len() < 2 {
            return true;
        }
        let last = parts[parts.len() - 1];
        let prev = parts[parts.len() - 2];

        if parts.len() >= 3 && KNOWN_OS.contains(&prev) && KNOWN_ARCH.contains(&last) {
            return prev == self.goos && last == self.goarch;
        }
        if KNOWN_OS.contains(&last) {
            return last == self.goos;
        }
        if KNOWN_ARCH.contains(&last) {
            return last == self.goarch;
        }
        true
    }
}

/// Parsed `//go:build` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Tag(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Tag(String),
    Not,
    And,
    Or,
    Open,
    Close,
}

impl Expr {
    fn parse(text: &str) -> Option<Expr> {
        let tokens = tokenize(text)?;
        let mut pos = 0;
        let expr = parse_or(&tokens, &mut pos)?;
        (pos == tokens.len()).then_some(expr)
    }

    fn eval(&self, tag: &dyn Fn(&str) -> bool) -> bool {
        match self {
            Expr::Tag(name) => tag(name),
            Expr::Not(inner) => !inner.eval(tag),
            Expr::And(lhs, rhs) => lhs.eval(tag) && rhs.eval(tag),
            Expr::Or(lhs, rhs) => lhs.eval(tag) || rhs.eval(tag),
        }
    }
}

fn tokenize(text: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' => {}
            '!' => tokens.push(Token::Not),
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            '&' if chars.next_if_eq(&'&').is_some() => tokens.push(Token::And),
            '|' if chars.next_if_eq(&'|').is_some() => tokens.push(Token::Or),
            c if c.is_alphanumeric() || c == '_' || c == '.' => {
                let mut tag = String::from(c);
                while let Some(next) =
                    chars.next_if(|n| n.is_alphanumeric() || *n == '_' || *n == '.')
                {
                    tag.push(next);
                }
                tokens.push(Token::Tag(tag));
            }
            _ => return None,
        }
    }

    Some(tokens)
}

fn parse_or(tokens: &[Token], pos: &mut usize) -> Option<Expr> {
    let mut lhs = parse_and(tokens, pos)?;
    while tokens.get(*pos) == Some(&Token::Or) {
        *pos += 1;
        let rhs = parse_and(tokens, pos)?;
        lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
    }
    Some(lhs)
}

fn parse_and(tokens: &[Token], pos: &mut usize) -> Option<Expr> {
    let mut lhs = parse_not(tokens, pos)?;
    while tokens.get(*pos) == Some(&Token::And) {
        *pos += 1;
        let rhs = parse_not(tokens, pos)?;
        lhs = Expr::And(Box::new(lhs), Box::new(rhs));
    }
    Some(lhs)
}

fn parse_not(tokens: &[Token], pos: &mut usize) -> Option<Expr> {
    match tokens.get(*pos)? {
        Token::Not => {
            *pos += 1;
            Some(Expr::Not(Box::new(parse_not(tokens, pos)?)))
        }
        Token::Open => {
            *pos += 1;
            let expr = parse_or(tokens, pos)?;
            if tokens.get(*pos) != Some(&Token::Close) {
                return None;
            }
            *pos += 1;
            Some(expr)
        }
        Token::Tag(name) => {
            *pos += 1;
            Some(Expr::Tag(name.clone()))
        }
        _ => None,
    }
}
