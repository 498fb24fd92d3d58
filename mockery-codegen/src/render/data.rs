//! Values exposed to output templates.

use indexmap::IndexMap;
use mockery_core::{first_upper, is_exported};
use serde::Serialize;
use serde_json::Value;

use crate::{
    imports::{Import, ImportRegistry},
    scope::{MethodScope, Variable},
    typestr::{type_string, variadic_string},
};

/// Top-level template context of one output file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateContext {
    pub pkg_name: String,
    /// `""` for in-package files, otherwise `<qualifier>.`.
    pub src_pkg_qualifier: String,
    /// Sorted by path.
    pub imports: Vec<Import>,
    /// Import path to qualifier.
    pub qualifiers: IndexMap<String, String>,
    pub mocks: Vec<MockData>,
    pub template_data: Value,
    pub boilerplate: String,
    pub build_tags: String,
    pub unroll_variadic: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MockData {
    pub interface_name: String,
    pub mock_name: String,
    /// `NewMockFoo`, or `newMockFoo` for unexported mocks.
    pub constructor: String,
    pub type_params: Vec<TypeParamData>,
    /// `[T any, K comparable]`, empty when not generic.
    pub type_params_decl: String,
    /// `[T, K]`, empty when not generic.
    pub type_params_names: String,
    pub methods: Vec<MethodData>,
    pub template_data: Value,
}

impl MockData {
    pub fn new(
        interface_name: &str,
        mock_name: &str,
        type_params: Vec<TypeParamData>,
        methods: Vec<MethodData>,
        template_data: Value,
    ) -> Self {
        let constructor = if is_exported(mock_name) {
            format!("New{mock_name}")
        } else {
            format!("new{}", first_upper(mock_name))
        };
        let (type_params_decl, type_params_names) = if type_params.is_empty() {
            (String::new(), String::new())
        } else {
            let decl: Vec<String> = type_params
                .iter()
                .map(|p| format!("{} {}", p.name, p.constraint))
                .collect();
            let names: Vec<&str> = type_params.iter().map(|p| p.name.as_str()).collect();
            (
                format!("[{}]", decl.join(", ")),
                format!("[{}]", names.join(", ")),
            )
        };
        Self {
            interface_name: interface_name.to_string(),
            mock_name: mock_name.to_string(),
            constructor,
            type_params,
            type_params_decl,
            type_params_names,
            methods,
            template_data,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TypeParamData {
    pub name: String,
    pub constraint: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParamData {
    pub name: String,
    /// As written in a parameter list: `...T` for a variadic parameter.
    #[serde(rename = "Type")]
    pub declared: String,
    /// The value type: `[]T` for a variadic parameter.
    pub type_string: String,
    /// `T` for a variadic parameter, otherwise the value type.
    pub elem_type: String,
    pub variadic: bool,
    pub is_error: bool,
}

impl ParamData {
    fn new(var: &Variable, registry: &ImportRegistry) -> Self {
        let type_string = type_string(&var.ty, registry);
        let (declared, elem_type) = if var.variadic {
            let declared = variadic_string(&var.ty, registry);
            let elem = declared.trim_start_matches("...").to_string();
            (declared, elem)
        } else {
            (type_string.clone(), type_string.clone())
        };
        Self {
            name: var.name.clone(),
            declared,
            type_string,
            elem_type,
            variadic: var.variadic,
            is_error: var.ty.is_error(),
        }
    }
}

/// A method with its signature pre-rendered in the forms templates need.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MethodData {
    pub name: String,
    pub params: Vec<ParamData>,
    pub returns: Vec<ParamData>,
    /// `p []byte, opts ...Option`
    pub arg_list: String,
    /// `p, opts...`
    pub arg_call_list: String,
    /// `p, opts`
    pub arg_name_list: String,
    /// `[]byte, ...Option`
    pub arg_type_list: String,
    /// `n int, err error`
    pub return_arg_list: String,
    pub return_arg_type_list: String,
    pub return_arg_name_list: String,
    /// `(p []byte) (int, error)`
    pub signature: String,
    /// `func([]byte) (int, error)`
    pub func_type: String,
    /// Parameters of the testify expecter method.
    pub expecter_arg_list: String,
    /// Arguments of `mock.On` in the testify expecter method.
    pub expecter_on_args: String,
    /// Arguments `Run` forwards to the user callback.
    pub run_call_list: String,
    pub has_params: bool,
    pub has_returns: bool,
    pub is_variadic: bool,
    pub returns_error: bool,
    /// Local variable names by label, free of collisions with the
    /// parameters and every import of the file.
    pub locals: IndexMap<String, String>,
}

impl MethodData {
    /// Build from a scope whose first `param_count` variables are the
    /// parameters and the rest the results.
    pub fn new(
        name: &str,
        scope: &MethodScope,
        param_count: usize,
        registry: &ImportRegistry,
        unroll_variadic: bool,
    ) -> Self {
        let (params, returns) = scope.vars().split_at(param_count);
        let params: Vec<ParamData> = params.iter().map(|v| ParamData::new(v, registry)).collect();
        let returns: Vec<ParamData> = returns.iter().map(|v| ParamData::new(v, registry)).collect();
        let is_variadic = params.last().is_some_and(|p| p.variadic);

        let arg_list = join(params.iter().map(|p| format!("{} {}", p.name, p.declared)));
        let arg_call_list = join(params.iter().map(|p| {
            if p.variadic {
                format!("{}...", p.name)
            } else {
                p.name.clone()
            }
        }));
        let arg_name_list = join(params.iter().map(|p| p.name.clone()));
        let arg_type_list = join(params.iter().map(|p| p.declared.clone()));

        let return_arg_list = join(returns.iter().map(|r| format!("{} {}", r.name, r.declared)));
        let return_arg_type_list = join(returns.iter().map(|r| r.declared.clone()));
        let return_arg_name_list = join(returns.iter().map(|r| r.name.clone()));
        let results = match returns.len() {
            0 => String::new(),
            1 => format!(" {return_arg_type_list}"),
            _ => format!(" ({return_arg_type_list})"),
        };

        let unrolled = unroll_variadic && is_variadic;
        let expecter_arg_list = join(params.iter().map(|p| {
            if unrolled && p.variadic {
                format!("{} ...interface{{}}", p.name)
            } else {
                format!("{} interface{{}}", p.name)
            }
        }));
        let quoted = format!("\"{name}\"");
        let expecter_on_args = if params.is_empty() {
            quoted
        } else if unrolled {
            let fixed = join(params.iter().filter(|p| !p.variadic).map(|p| p.name.clone()));
            let rest = params.last().map_or("", |p| p.name.as_str());
            format!("{quoted}, append([]interface{{}}{{{fixed}}}, {rest}...)...")
        } else {
            format!("{quoted}, {arg_name_list}")
        };
        let run_call_list = join(params.iter().enumerate().map(|(i, p)| {
            if p.variadic {
                format!("_arg{i}...")
            } else {
                format!("_arg{i}")
            }
        }));

        Self {
            name: name.to_string(),
            signature: format!("({arg_list}){results}"),
            func_type: format!("func({arg_type_list}){results}"),
            has_params: !params.is_empty(),
            has_returns: !returns.is_empty(),
            returns_error: returns.last().is_some_and(|r| r.is_error),
            is_variadic,
            params,
            returns,
            arg_list,
            arg_call_list,
            arg_name_list,
            arg_type_list,
            return_arg_list,
            return_arg_type_list,
            return_arg_name_list,
            expecter_arg_list,
            expecter_on_args,
            run_call_list,
            locals: scope.locals(),
        }
    }
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(", ")
}
