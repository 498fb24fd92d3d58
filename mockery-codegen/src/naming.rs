//! Go identifier rules and variable name hints derived from types.

use mockery_core::first_upper;
use mockery_go::{Type, UNSAFE_POINTER};

/// Go keywords.
pub const GO_KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Predeclared type names a variable must not shadow.
pub const GO_PREDECLARED_TYPES: &[&str] = &[
    "any",
    "bool",
    "byte",
    "comparable",
    "complex64",
    "complex128",
    "error",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
];

pub fn is_keyword(name: &str) -> bool {
    GO_KEYWORDS.contains(&name)
}

/// Whether a variable called `name` would be rejected or shadow a type.
pub fn is_reserved(name: &str) -> bool {
    is_keyword(name) || GO_PREDECLARED_TYPES.contains(&name)
}

/// A variable name suggested by a parameter's type.
///
/// `context.Context` becomes `context`, `[]string` becomes `ss`,
/// `map[string]int` becomes `sToN` and `error` becomes `err`.
pub fn type_hint(ty: &Type) -> String {
    match ty {
        Type::Named(named) if named.package.is_none() && named.name == "error" => "err".into(),
        Type::Named(named) => named_hint(&named.name),
        Type::TypeParam(name) => named_hint(name),
        Type::Basic(name) => basic_hint(name).into(),
        Type::Pointer(elem) => type_hint(elem),
        Type::Slice(elem) | Type::Array { elem, .. } => format!("{}s", type_hint(elem)),
        Type::Map { key, value } => {
            format!("{}To{}", type_hint(key), first_upper(&type_hint(value)))
        }
        Type::Chan { elem, .. } => format!("{}Ch", type_hint(elem)),
        Type::Signature(_) => "fn".into(),
        Type::Struct(_) => "val".into(),
        Type::Interface(_) => "ifaceVal".into(),
        Type::Union(_) => "v".into(),
    }
}

/// Lower-case the leading upper-case run: `HTTPClient` becomes
/// `httpClient`, `Context` becomes `context`. Names already lower case
/// get a `Val` suffix so they do not shadow the type they describe.
fn named_hint(name: &str) -> String {
    if !name.starts_with(|c: char| c.is_uppercase()) {
        return format!("{name}Val");
    }

    let chars: Vec<char> = name.chars().collect();
    let upper_run = chars.iter().take_while(|c| c.is_uppercase()).count();
    // In `HTTPClient` the `C` starts the next word.
    let lower_len = if upper_run > 1 && upper_run < chars.len() {
        upper_run - 1
    } else {
        upper_run
    };

    chars
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i < lower_len {
                c.to_lowercase().next().unwrap_or(*c)
            } else {
                *c
            }
        })
        .collect()
}

fn basic_hint(name: &str) -> &'static str {
    match name {
        "bool" => "b",
        "string" => "s",
        "float32" | "float64" => "f",
        "complex64" | "complex128" => "c",
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32"
        | "uint64" | "uintptr" | "byte" | "rune" => "n",
        UNSAFE_POINTER => "ptr",
        _ => "v",
    }
}

#[cfg(test)]
mod tests {
    use mockery_go::{InterfaceType, PackageRef, Signature};

    use super::*;

    fn named(name: &str) -> Type {
        Type::named(Some(PackageRef::new("example.com/x", "x")), name)
    }

    fn basic(name: &str) -> Type {
        Type::Basic(name.into())
    }

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved("type"));
        assert!(is_reserved("string"));
        assert!(is_reserved("error"));
        assert!(!is_reserved("err"));
    }

    #[test]
    fn test_type_hints() {
        assert_eq!(type_hint(&named("Context")), "context");
        assert_eq!(type_hint(&named("HTTPClient")), "httpClient");
        assert_eq!(type_hint(&named("ID")), "id");
        assert_eq!(type_hint(&named("config")), "configVal");
        assert_eq!(type_hint(&Type::named(None, "error")), "err");
        assert_eq!(type_hint(&basic("int64")), "n");
        assert_eq!(type_hint(&basic("bool")), "b");
        assert_eq!(type_hint(&basic("float64")), "f");
        assert_eq!(type_hint(&basic(UNSAFE_POINTER)), "ptr");
        assert_eq!(type_hint(&Type::Pointer(Box::new(named("User")))), "user");
        assert_eq!(type_hint(&Type::Slice(Box::new(basic("string")))), "ss");
        assert_eq!(
            type_hint(&Type::Map {
                key: Box::new(basic("string")),
                value: Box::new(basic("int")),
            }),
            "sToN"
        );
        assert_eq!(
            type_hint(&Type::Chan {
                dir: mockery_go::ChanDir::Recv,
                elem: Box::new(named("Event")),
            }),
            "eventCh"
        );
        assert_eq!(type_hint(&Type::Signature(Signature::default())), "fn");
        assert_eq!(type_hint(&Type::Struct(Vec::new())), "val");
        assert_eq!(
            type_hint(&Type::Interface(InterfaceType::default())),
            "ifaceVal"
        );
        assert_eq!(type_hint(&Type::TypeParam("T".into())), "t");
    }
}
