//! Rendering an output bucket into Go source.
//!
//! For each bucket the renderer builds a fresh [`ImportRegistry`], allocates
//! one [`MethodScope`] per method, and only after every method of every mock
//! has registered its imports does it settle variable names and print types.
//! The resulting [`TemplateContext`] is handed to the bucket's template.

mod data;
mod schema;
mod store;

use std::path::{Component, Path, PathBuf};

use minijinja::Environment;
use mockery_core::{Error, ErrorKind, Result, template};
use mockery_go::{PackageLoader, PackageRef, TypeParam};
use serde_json::Value;
use tracing::{debug, warn};

pub use data::{MethodData, MockData, ParamData, TemplateContext, TypeParamData};
pub use schema::validate;
pub use store::{
    BUILTIN_TEMPLATES, BuiltinTemplate, Fetcher, HttpFetcher, Template, TemplateStore, builtin,
};

use crate::{
    grouping::{InterfaceDescriptor, OutputBucket},
    imports::ImportRegistry,
    replace::TypeReplacer,
    scope::MethodScope,
    typestr::{required_imports, type_string},
};

/// Locals every generated method may declare, as (label, hint).
const LOCALS: &[(&str, &str)] = &[
    ("Receiver", "_mock"),
    ("Ret", "ret"),
    ("ReturnFunc", "returnFunc"),
    ("Ok", "ok"),
    ("CallArgs", "_ca"),
    ("Arg", "_va"),
    ("CallInfo", "callInfo"),
    ("Calls", "calls"),
    ("Run", "run"),
    ("Args", "args"),
    ("Variadic", "_variadic"),
    ("Index", "_i"),
    ("Value", "_a"),
];

pub struct Renderer<'a> {
    env: Environment<'static>,
    store: &'a TemplateStore,
    loader: &'a dyn PackageLoader,
}

/// A method's scope before names are settled.
struct PendingMethod {
    name: String,
    scope: MethodScope,
    param_count: usize,
}

struct PendingMock<'d> {
    descriptor: &'d InterfaceDescriptor,
    type_params: Vec<TypeParam>,
    methods: Vec<PendingMethod>,
}

impl<'a> Renderer<'a> {
    pub fn new(store: &'a TemplateStore, loader: &'a dyn PackageLoader) -> Self {
        Self {
            env: template::environment(),
            store,
            loader,
        }
    }

    /// Render `bucket` to unformatted Go source.
    pub fn render(&self, bucket: &OutputBucket) -> Result<String> {
        let template = self.store.template(&bucket.template)?;
        template::check_syntax(&self.env, &template.name, &template.source)?;
        for descriptor in &bucket.interfaces {
            self.validate_template_data(descriptor)?;
        }

        let context = self.context(bucket, &template)?;
        debug!(
            path = %bucket.path.display(),
            mocks = context.mocks.len(),
            imports = context.imports.len(),
            "rendering"
        );
        template::render_str(&self.env, &template.name, &template.source, &context)
    }

    fn validate_template_data(&self, descriptor: &InterfaceDescriptor) -> Result<()> {
        let Some(location) = descriptor
            .config
            .template_schema
            .as_deref()
            .filter(|s| !s.is_empty())
        else {
            return Ok(());
        };

        let schema = match self.store.schema(location) {
            Ok(schema) => schema,
            Err(e)
                if e.kind() == ErrorKind::TemplateFetch
                    && !descriptor.config.require_template_schema_exists() =>
            {
                warn!(schema = location, error = %e, "template schema not found, skipping validation");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        schema::validate(location, &schema, &template_data(descriptor))
    }

    /// Assemble the template context for `bucket`.
    pub fn context(&self, bucket: &OutputBucket, template: &Template) -> Result<TemplateContext> {
        let src = bucket.src_package.package_ref();
        let in_package = is_in_package(bucket);
        let mut registry = if in_package {
            ImportRegistry::in_package(&src)
        } else {
            ImportRegistry::new()
        };

        for (path, name) in template.imports() {
            registry.add(&PackageRef::new(*path, *name));
        }
        let refers_to_source = bucket
            .interfaces
            .iter()
            .any(|d| d.interface.type_params.is_empty());
        if template.uses_source_package() && refers_to_source {
            registry.add(&src);
        }

        let first = &bucket.interfaces[0];
        let data = template_data(first);
        let unroll_variadic = data
            .get("unroll-variadic")
            .and_then(Value::as_bool)
            .unwrap_or(true);

        // First pass: allocate names while imports are still being added.
        let mut pending = Vec::with_capacity(bucket.interfaces.len());
        for descriptor in &bucket.interfaces {
            pending.push(self.allocate(descriptor, &mut registry)?);
        }

        // Second pass: every import is known now.
        let mut mocks = Vec::with_capacity(pending.len());
        for mut mock in pending {
            let type_params = mock
                .type_params
                .iter()
                .map(|p| TypeParamData {
                    name: p.name.clone(),
                    constraint: type_string(&p.constraint, &registry),
                })
                .collect();
            let methods = mock
                .methods
                .iter_mut()
                .map(|m| {
                    m.scope.resolve_collisions(&registry);
                    MethodData::new(
                        &m.name,
                        &m.scope,
                        m.param_count,
                        &registry,
                        unroll_variadic,
                    )
                })
                .collect();
            mocks.push(MockData::new(
                &mock.descriptor.interface.name,
                mock.descriptor.config.structname(),
                type_params,
                methods,
                template_data(mock.descriptor),
            ));
        }

        let src_pkg_qualifier = if in_package {
            String::new()
        } else {
            registry.prefix(&src)
        };
        let imports = registry.sorted();
        let qualifiers = imports
            .iter()
            .map(|i| (i.path.clone(), i.qualifier.clone()))
            .collect();

        Ok(TemplateContext {
            pkg_name: bucket.pkgname.clone(),
            src_pkg_qualifier,
            imports,
            qualifiers,
            mocks,
            boilerplate: boilerplate(first)?,
            build_tags: first
                .config
                .template_data_str("mock-build-tags")
                .unwrap_or_default()
                .to_string(),
            template_data: data,
            unroll_variadic,
        })
    }

    fn allocate<'d>(
        &self,
        descriptor: &'d InterfaceDescriptor,
        registry: &mut ImportRegistry,
    ) -> Result<PendingMock<'d>> {
        let replacer = TypeReplacer::new(descriptor.config.replace_type.as_ref(), self.loader);
        let interface = &descriptor.interface;

        let mut type_params = Vec::with_capacity(interface.type_params.len());
        for param in &interface.type_params {
            let constraint = replacer.replace(&param.constraint)?;
            for package in required_imports(&constraint) {
                registry.add(&package);
            }
            type_params.push(TypeParam {
                name: param.name.clone(),
                constraint,
            });
        }

        let mut methods = Vec::with_capacity(interface.methods.len());
        for method in &interface.methods {
            let mut scope = MethodScope::new();
            scope.reserve(descriptor.config.structname());
            scope.reserve(interface.name.clone());
            for param in &type_params {
                scope.reserve(param.name.clone());
            }

            let sig = &method.sig;
            for (i, param) in sig.params.iter().enumerate() {
                let variadic = sig.variadic && i + 1 == sig.params.len();
                scope.add_var(param, variadic, "", &replacer, registry)?;
            }
            for result in &sig.results {
                scope.add_var(result, false, "", &replacer, registry)?;
            }
            for (label, hint) in LOCALS {
                scope.allocate(label, hint, registry);
            }

            methods.push(PendingMethod {
                name: method.name.clone(),
                scope,
                param_count: sig.params.len(),
            });
        }

        Ok(PendingMock {
            descriptor,
            type_params,
            methods,
        })
    }
}

fn template_data(descriptor: &InterfaceDescriptor) -> Value {
    Value::Object(descriptor.config.template_data.clone().unwrap_or_default())
}

/// Contents of `template-data.boilerplate-file`, without trailing newlines.
fn boilerplate(descriptor: &InterfaceDescriptor) -> Result<String> {
    let Some(path) = descriptor.config.template_data_str("boilerplate-file") else {
        return Ok(String::new());
    };
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(text.trim_end().to_string())
}

/// The file is written into the source package itself.
fn is_in_package(bucket: &OutputBucket) -> bool {
    bucket.src_package.name == bucket.pkgname
        && normalize(&bucket.src_package.dir) == normalize(bucket.dir())
}

fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
