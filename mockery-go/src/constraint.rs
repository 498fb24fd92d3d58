//! Build constraints: `//go:build` lines, legacy `// +build` lines and
//! `_GOOS_GOARCH` file name suffixes.

use std::collections::HashSet;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

/// Highest `go1.N` release tag considered satisfied.
const MAX_GO_MINOR: u32 = 40;

/// The set of build tags a file is matched against.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub goos: String,
    pub goarch: String,
    tags: HashSet<String>,
}

impl BuildContext {
    pub fn new(goos: &str, goarch: &str, extra_tags: &[String]) -> Self {
        let mut tags: HashSet<String> = extra_tags.iter().cloned().collect();
        tags.insert(goos.to_string());
        tags.insert(goarch.to_string());
        tags.insert("gc".to_string());
        if UNIX_OS.contains(&goos) {
            tags.insert("unix".to_string());
        }
        if goos == "ios" {
            tags.insert("darwin".to_string());
        }
        if goos == "android" {
            tags.insert("linux".to_string());
        }
        if goos == "illumos" {
            tags.insert("solaris".to_string());
        }
        Self {
            goos: goos.to_string(),
            goarch: goarch.to_string(),
            tags,
        }
    }

    /// Context of the host, honouring `GOOS`, `GOARCH` and `CGO_ENABLED`.
    pub fn host(extra_tags: &[String]) -> Self {
        let goos = std::env::var("GOOS").unwrap_or_else(|_| host_os().to_string());
        let goarch = std::env::var("GOARCH").unwrap_or_else(|_| host_arch().to_string());
        let mut ctx = Self::new(&goos, &goarch, extra_tags);
        if std::env::var("CGO_ENABLED").map_or(true, |v| v != "0") {
            ctx.tags.insert("cgo".to_string());
        }
        ctx
    }

    fn has(&self, tag: &str) -> bool {
        if self.tags.contains(tag) {
            return true;
        }
        tag.strip_prefix("go1.")
            .and_then(|minor| minor.parse::<u32>().ok())
            .is_some_and(|minor| minor <= MAX_GO_MINOR)
    }

    /// Whether a file with this name and content belongs to the build.
    pub fn matches_file(&self, file_name: &str, src: &str) -> bool {
        self.matches_name(file_name) && self.matches_header(src)
    }

    /// Check `name_GOOS_GOARCH.go` style suffixes.
    pub fn matches_name(&self, file_name: &str) -> bool {
        let stem = file_name.strip_suffix(".go").unwrap_or(file_name);
        let stem = stem.strip_suffix("_test").unwrap_or(stem);
        let parts: Vec<&str> = stem.split('_').collect();
        if parts.len() < 2 {
            return true;
        }

        let last = parts[parts.len() - 1];
        let prev = parts[parts.len() - 2];
        if parts.len() >= 3 && KNOWN_OS.contains(&prev) && KNOWN_ARCH.contains(&last) {
            return self.has(prev) && self.has(last);
        }
        if KNOWN_OS.contains(&last) || KNOWN_ARCH.contains(&last) {
            return self.has(last);
        }
        true
    }

    /// Evaluate the constraint comments above the package clause.
    pub fn matches_header(&self, src: &str) -> bool {
        let mut plus_build = Vec::new();
        for line in header_lines(src) {
            if let Some(expr) = line.strip_prefix("//go:build") {
                return self.eval(expr.trim()).unwrap_or(false);
            }
            if let Some(expr) = line.strip_prefix("// +build") {
                plus_build.push(expr.trim());
            }
        }
        plus_build.iter().all(|line| self.eval_plus_build(line))
    }

    fn eval(&self, expr: &str) -> Option<bool> {
        let tokens = expr_tokens(expr);
        let mut pos = 0;
        let value = self.or_expr(&tokens, &mut pos)?;
        (pos == tokens.len()).then_some(value)
    }

    fn or_expr(&self, tokens: &[String], pos: &mut usize) -> Option<bool> {
        let mut value = self.and_expr(tokens, pos)?;
        while tokens.get(*pos).is_some_and(|t| t == "||") {
            *pos += 1;
            let rhs = self.and_expr(tokens, pos)?;
            value = value || rhs;
        }
        Some(value)
    }

    fn and_expr(&self, tokens: &[String], pos: &mut usize) -> Option<bool> {
        let mut value = self.unary(tokens, pos)?;
        while tokens.get(*pos).is_some_and(|t| t == "&&") {
            *pos += 1;
            let rhs = self.unary(tokens, pos)?;
            value = value && rhs;
        }
        Some(value)
    }

    fn unary(&self, tokens: &[String], pos: &mut usize) -> Option<bool> {
        let token = tokens.get(*pos)?;
        *pos += 1;
        match token.as_str() {
            "!" => self.unary(tokens, pos).map(|v| !v),
            "(" => {
                let value = self.or_expr(tokens, pos)?;
                if tokens.get(*pos).map(String::as_str) != Some(")") {
                    return None;
                }
                *pos += 1;
                Some(value)
            }
            ")" | "&&" | "||" => None,
            tag => Some(self.has(tag)),
        }
    }

    /// `// +build a,b c` means `(a && b) || c`.
    fn eval_plus_build(&self, line: &str) -> bool {
        line.split_whitespace().any(|option| {
            option.split(',').all(|term| match term.strip_prefix('!') {
                Some(tag) => !self.has(tag),
                None => self.has(term),
            })
        })
    }
}

/// Comment lines before the package clause.
fn header_lines(src: &str) -> impl Iterator<Item = &str> {
    let mut in_block = false;
    src.lines()
        .map(str::trim)
        .take_while(move |line| {
            if in_block {
                in_block = !line.contains("*/");
                return true;
            }
            if line.starts_with("/*") {
                in_block = !line.contains("*/");
                return true;
            }
            line.is_empty() || line.starts_with("//")
        })
}

fn expr_tokens(expr: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' => {}
            '(' | ')' | '!' => tokens.push(c.to_string()),
            '&' | '|' => {
                if chars.peek() == Some(&c) {
                    chars.next();
                }
                tokens.push(format!("{c}{c}"));
            }
            _ => {
                let mut tag = c.to_string();
                while let Some(&next) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' || next == '.' {
                        tag.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(tag);
            }
        }
    }
    tokens
}

/// Whether the file header marks it as generated (`// Code generated ... DO NOT EDIT.`).
pub fn is_generated(src: &str) -> bool {
    header_lines(src).any(|line| {
        line.starts_with("// Code generated ") && line.ends_with(" DO NOT EDIT.")
    })
}

fn host_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux(tags: &[&str]) -> BuildContext {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        BuildContext::new("linux", "amd64", &tags)
    }

    #[test]
    fn test_file_name_suffixes() {
        let ctx = linux(&[]);
        assert!(ctx.matches_name("client.go"));
        assert!(ctx.matches_name("client_linux.go"));
        assert!(ctx.matches_name("client_linux_amd64.go"));
        assert!(ctx.matches_name("client_amd64.go"));
        assert!(!ctx.matches_name("client_windows.go"));
        assert!(!ctx.matches_name("client_linux_arm64.go"));
        assert!(!ctx.matches_name("client_darwin_test.go"));
        assert!(ctx.matches_name("linux.go"));
    }

    #[test]
    fn test_go_build_expressions() {
        let ctx = linux(&["integration"]);
        assert!(ctx.matches_header("//go:build linux\n\npackage x\n"));
        assert!(ctx.matches_header("//go:build integration && !windows\n\npackage x\n"));
        assert!(ctx.matches_header("//go:build (darwin || linux) && go1.21\npackage x\n"));
        assert!(ctx.matches_header("//go:build unix\npackage x\n"));
        assert!(!ctx.matches_header("//go:build ignore\npackage x\n"));
        assert!(!ctx.matches_header("//go:build windows || (darwin && cgo)\npackage x\n"));
    }

    #[test]
    fn test_constraint_after_package_is_ignored() {
        let ctx = linux(&[]);
        assert!(ctx.matches_header("package x\n\n//go:build ignore\n"));
    }

    #[test]
    fn test_plus_build_lines() {
        let ctx = linux(&[]);
        assert!(ctx.matches_header("// +build linux,amd64 darwin\n\npackage x\n"));
        assert!(!ctx.matches_header("// +build !linux\n\npackage x\n"));
        assert!(!ctx.matches_header("// +build linux\n// +build arm64\n\npackage x\n"));
    }

    #[test]
    fn test_generated_marker() {
        assert!(is_generated(
            "// Code generated by mockery. DO NOT EDIT.\n\npackage x\n"
        ));
        assert!(!is_generated("// Package x is handwritten.\npackage x\n"));
        assert!(!is_generated(
            "package x\n\n// Code generated by hand. DO NOT EDIT.\n"
        ));
    }
}
