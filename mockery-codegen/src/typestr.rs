//! Printing resolved types as Go source.

use mockery_go::{ChanDir, PackageRef, Signature, Type, UNSAFE_POINTER, Var};

use crate::imports::ImportRegistry;

/// Packages a type refers to, in first-seen order without duplicates.
pub fn required_imports(ty: &Type) -> Vec<PackageRef> {
    let mut packages: Vec<PackageRef> = Vec::new();
    ty.walk(&mut |t| {
        let package = match t {
            Type::Named(named) => named.package.clone(),
            Type::Basic(name) if name == UNSAFE_POINTER => Some(unsafe_package()),
            _ => None,
        };
        if let Some(package) = package {
            if !packages.contains(&package) {
                packages.push(package);
            }
        }
    });
    packages
}

pub(crate) fn unsafe_package() -> PackageRef {
    PackageRef::new("unsafe", "unsafe")
}

/// Go source text for `ty`, qualifying packages through `registry`.
pub fn type_string(ty: &Type, registry: &ImportRegistry) -> String {
    let mut out = String::new();
    write_type(&mut out, ty, registry);
    out
}

/// `(a int, b ...string)` style parameter text without names:
/// `int, ...string`.
pub fn param_types(vars: &[Var], variadic: bool, registry: &ImportRegistry) -> Vec<String> {
    vars.iter()
        .enumerate()
        .map(|(i, var)| {
            if variadic && i + 1 == vars.len() {
                variadic_string(&var.ty, registry)
            } else {
                type_string(&var.ty, registry)
            }
        })
        .collect()
}

/// `...T` for a variadic parameter whose type is `[]T`.
pub fn variadic_string(ty: &Type, registry: &ImportRegistry) -> String {
    match ty {
        Type::Slice(elem) => format!("...{}", type_string(elem, registry)),
        other => format!("...{}", type_string(other, registry)),
    }
}

fn write_type(out: &mut String, ty: &Type, registry: &ImportRegistry) {
    match ty {
        Type::Basic(name) if name == UNSAFE_POINTER => {
            out.push_str(&registry.prefix(&unsafe_package()));
            out.push_str("Pointer");
        }
        Type::Basic(name) | Type::TypeParam(name) => out.push_str(name),
        Type::Named(named) => {
            if let Some(package) = &named.package {
                out.push_str(&registry.prefix(package));
            }
            out.push_str(&named.name);
            if !named.args.is_empty() {
                out.push('[');
                write_list(out, &named.args, registry);
                out.push(']');
            }
        }
        Type::Pointer(elem) => {
            out.push('*');
            write_type(out, elem, registry);
        }
        Type::Slice(elem) => {
            out.push_str("[]");
            write_type(out, elem, registry);
        }
        Type::Array { len, elem } => {
            out.push('[');
            out.push_str(len);
            out.push(']');
            write_type(out, elem, registry);
        }
        Type::Map { key, value } => {
            out.push_str("map[");
            write_type(out, key, registry);
            out.push(']');
            write_type(out, value, registry);
        }
        Type::Chan { dir, elem } => {
            out.push_str(match dir {
                ChanDir::Both => "chan ",
                ChanDir::Send => "chan<- ",
                ChanDir::Recv => "<-chan ",
            });
            // `chan (<-chan T)` must keep its parentheses.
            let needs_parens = *dir == ChanDir::Both
                && matches!(**elem, Type::Chan { dir: ChanDir::Recv, .. });
            if needs_parens {
                out.push('(');
            }
            write_type(out, elem, registry);
            if needs_parens {
                out.push(')');
            }
        }
        Type::Signature(sig) => {
            out.push_str("func");
            write_signature(out, sig, registry);
        }
        Type::Struct(fields) => {
            if fields.is_empty() {
                out.push_str("struct{}");
                return;
            }
            out.push_str("struct{ ");
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                if let Some(name) = &field.name {
                    out.push_str(name);
                    out.push(' ');
                }
                write_type(out, &field.ty, registry);
                if let Some(tag) = &field.tag {
                    out.push(' ');
                    out.push_str(tag);
                }
            }
            out.push_str(" }");
        }
        Type::Interface(iface) => {
            if iface.methods.is_empty() && iface.embeds.is_empty() {
                out.push_str("interface{}");
                return;
            }
            out.push_str("interface{ ");
            let mut first = true;
            for embed in &iface.embeds {
                if !first {
                    out.push_str("; ");
                }
                first = false;
                write_type(out, embed, registry);
            }
            for method in &iface.methods {
                if !first {
                    out.push_str("; ");
                }
                first = false;
                out.push_str(&method.name);
                write_signature(out, &method.sig, registry);
            }
            out.push_str(" }");
        }
        Type::Union(terms) => {
            for (i, term) in terms.iter().enumerate() {
                if i > 0 {
                    out.push_str(" | ");
                }
                if term.tilde {
                    out.push('~');
                }
                write_type(out, &term.ty, registry);
            }
        }
    }
}

fn write_list(out: &mut String, types: &[Type], registry: &ImportRegistry) {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_type(out, ty, registry);
    }
}

fn write_signature(out: &mut String, sig: &Signature, registry: &ImportRegistry) {
    out.push('(');
    out.push_str(&param_types(&sig.params, sig.variadic, registry).join(", "));
    out.push(')');

    let results = param_types(&sig.results, false, registry);
    match results.len() {
        0 => {}
        1 => {
            out.push(' ');
            out.push_str(&results[0]);
        }
        _ => {
            out.push_str(" (");
            out.push_str(&results.join(", "));
            out.push(')');
        }
    }
}
