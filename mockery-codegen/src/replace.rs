//! `replace-type` redirection of named types.

use mockery_config::ReplaceTypes;
use mockery_core::{Error, Result};
use mockery_go::{
    InterfaceType, Method, Named, PackageLoader, PackageRef, Signature, StructField, Term, Type,
    Var,
};
use tracing::debug;

/// Rewrites named types according to a `replace-type` table.
pub struct TypeReplacer<'a> {
    rules: Option<&'a ReplaceTypes>,
    loader: &'a dyn PackageLoader,
}

impl<'a> TypeReplacer<'a> {
    pub fn new(rules: Option<&'a ReplaceTypes>, loader: &'a dyn PackageLoader) -> Self {
        Self { rules, loader }
    }

    /// The replacement for `package.name`, if one is configured.
    ///
    /// The target package is loaded and must declare the target type.
    pub fn lookup(&self, package: &str, name: &str) -> Result<Option<Type>> {
        let Some(rule) = self
            .rules
            .and_then(|rules| rules.get(package))
            .and_then(|types| types.get(name))
        else {
            return Ok(None);
        };

        let target = self.loader.load(&rule.target_package_path)?;
        if target.lookup(&rule.target_type_name).is_none() {
            return Err(Error::TypeReplacementMissing {
                package: rule.target_package_path.clone(),
                type_name: rule.target_type_name.clone(),
            });
        }
        debug!(
            from = %format!("{package}.{name}"),
            to = %format!("{}.{}", rule.target_package_path, rule.target_type_name),
            "replacing type"
        );
        Ok(Some(Type::named(
            Some(PackageRef::new(
                rule.target_package_path.clone(),
                target.name.clone(),
            )),
            rule.target_type_name.clone(),
        )))
    }

    /// Replace every matching named type inside `ty`.
    pub fn replace(&self, ty: &Type) -> Result<Type> {
        if self.rules.is_none_or(|rules| rules.is_empty()) {
            return Ok(ty.clone());
        }

        let boxed = |t: &Type| self.replace(t).map(Box::new);
        Ok(match ty {
            Type::Basic(_) | Type::TypeParam(_) => ty.clone(),
            Type::Named(named) => {
                let args = named
                    .args
                    .iter()
                    .map(|a| self.replace(a))
                    .collect::<Result<Vec<_>>>()?;
                let replaced = match &named.package {
                    Some(package) => self.lookup(&package.path, &named.name)?,
                    None => None,
                };
                match replaced {
                    Some(Type::Named(target)) => Type::Named(Named { args, ..target }),
                    _ => Type::Named(Named {
                        args,
                        ..named.clone()
                    }),
                }
            }
            Type::Pointer(elem) => Type::Pointer(boxed(elem)?),
            Type::Slice(elem) => Type::Slice(boxed(elem)?),
            Type::Array { len, elem } => Type::Array {
                len: len.clone(),
                elem: boxed(elem)?,
            },
            Type::Map { key, value } => Type::Map {
                key: boxed(key)?,
                value: boxed(value)?,
            },
            Type::Chan { dir, elem } => Type::Chan {
                dir: *dir,
                elem: boxed(elem)?,
            },
            Type::Signature(sig) => Type::Signature(self.signature(sig)?),
            Type::Struct(fields) => Type::Struct(
                fields
                    .iter()
                    .map(|f| {
                        Ok(StructField {
                            name: f.name.clone(),
                            ty: self.replace(&f.ty)?,
                            tag: f.tag.clone(),
                        })
                    })
                    .collect::<Result<_>>()?,
            ),
            Type::Interface(iface) => Type::Interface(InterfaceType {
                methods: iface
                    .methods
                    .iter()
                    .map(|m| {
                        Ok(Method {
                            name: m.name.clone(),
                            sig: self.signature(&m.sig)?,
                        })
                    })
                    .collect::<Result<_>>()?,
                embeds: iface
                    .embeds
                    .iter()
                    .map(|e| self.replace(e))
                    .collect::<Result<_>>()?,
            }),
            Type::Union(terms) => Type::Union(
                terms
                    .iter()
                    .map(|t| {
                        Ok(Term {
                            tilde: t.tilde,
                            ty: self.replace(&t.ty)?,
                        })
                    })
                    .collect::<Result<_>>()?,
            ),
        })
    }

    fn signature(&self, sig: &Signature) -> Result<Signature> {
        let vars = |vars: &[Var]| {
            vars.iter()
                .map(|v| {
                    Ok(Var {
                        name: v.name.clone(),
                        ty: self.replace(&v.ty)?,
                    })
                })
                .collect::<Result<Vec<_>>>()
        };
        Ok(Signature {
            params: vars(&sig.params)?,
            results: vars(&sig.results)?,
            variadic: sig.variadic,
        })
    }
}
