//! Service interfaces and RPC client generation.
//!
//! Each service becomes an interface with one promise-returning signature per
//! method and, optionally, a `XClientImpl` class that encodes the request,
//! hands the bytes to a user-supplied `Rpc` transport, and decodes the reply.
//! With `context=true` the client also gets DataLoader-backed methods:
//! single-key companions for batch methods and per-context caching for
//! `GetXxx` methods.

pub mod batch;

use prost_types::{FileDescriptorProto, MethodDescriptorProto, ServiceDescriptorProto};
use tracing::{debug, warn};

use crate::classify::{classify, FieldKind};
use crate::code::{
    ClassSpec, CodeBlock, FunctionSpec, InterfaceSpec, Item, PropertySpec, Symbol, TypeName,
};
use crate::error::GenerateError;
use crate::options::GenerationOptions;
use crate::registry::TypeMap;
use crate::runtime;
use crate::source_info::{fields, SourceInfo};

pub use batch::{companion_name, detect_batch_method, is_cacheable, singular, BatchMethod};

const CONTEXT_PARAM: &str = "Context extends DataLoaders";

/// Generator state shared by every method of one service.
struct ServiceGen<'r, 'a> {
    package: &'a str,
    service: &'a ServiceDescriptorProto,
    registry: &'r TypeMap<'a>,
    options: &'r GenerationOptions,
}

/// Request/response types of one unary method.
struct MethodTypes {
    request: Symbol,
    response: Symbol,
}

/// A resolved batch method with the types its companion needs.
struct BatchPlan<'a> {
    batch: BatchMethod<'a>,
    /// Camel-cased name of the request's key list.
    input_name: String,
    /// Camel-cased name of the response's result field.
    output_name: String,
    key_type: TypeName,
    value_type: TypeName,
    map_response: bool,
}

/// The interface, and the client class when enabled, for one service.
pub fn generate_service<'a>(
    file: &'a FileDescriptorProto,
    service: &'a ServiceDescriptorProto,
    source: &SourceInfo<'_>,
    registry: &TypeMap<'a>,
    options: &GenerationOptions,
) -> Result<Vec<Item>, GenerateError> {
    let gen = ServiceGen {
        package: file.package(),
        service,
        registry,
        options,
    };
    for method in &service.method {
        gen.check_unary(method)?;
    }

    let mut items = vec![Item::Interface(gen.interface(source)?)];
    if options.output_client_impl {
        if options.output_encode_methods {
            items.push(Item::Class(gen.client()?));
        } else {
            warn!(
                service = service.name(),
                "client implementation needs binary codecs; skipping with outputEncodeMethods=false"
            );
        }
    }
    Ok(items)
}

impl<'r, 'a> ServiceGen<'r, 'a> {
    fn name(&self) -> &'a str {
        self.service.name()
    }

    fn check_unary(&self, method: &MethodDescriptorProto) -> Result<(), GenerateError> {
        if method.client_streaming() || method.server_streaming() {
            return Err(GenerateError::UnsupportedMethod {
                service: self.name().to_string(),
                method: method.name().to_string(),
                reason: "streaming methods are not supported".to_string(),
            });
        }
        Ok(())
    }

    fn types(&self, method: &MethodDescriptorProto) -> Result<MethodTypes, GenerateError> {
        Ok(MethodTypes {
            request: self.registry.symbol(method.input_type())?,
            response: self.registry.symbol(method.output_type())?,
        })
    }

    /// `pkg.Service`, used as the `service` argument of `Rpc.request`.
    fn service_path(&self) -> String {
        join_non_empty(&[self.package, self.name()])
    }

    /// `pkg.Service.Method`, the DataLoader cache identifier.
    fn identifier(&self, method: &MethodDescriptorProto) -> String {
        join_non_empty(&[self.package, self.name(), method.name()])
    }

    fn has_method(&self, name: &str) -> bool {
        self.service.method.iter().any(|m| m.name() == name)
    }

    /// The batch plan for `method`, unless it is not a batch method or the
    /// service already declares a method with the companion's name.
    fn batch_plan(&self, method: &'a MethodDescriptorProto) -> Result<Option<BatchPlan<'a>>, GenerateError> {
        if !self.options.use_context {
            return Ok(None);
        }
        let input = self.registry.message(method.input_type())?;
        let output = self.registry.message(method.output_type())?;
        let Some(batch) = detect_batch_method(method, input, output) else {
            return Ok(None);
        };
        if self.has_method(&batch.single_method_name) {
            debug!(
                method = method.name(),
                companion = %batch.single_method_name,
                "companion already declared; not synthesizing"
            );
            return Ok(None);
        }

        let input_class = classify(input, batch.input_field, self.registry, self.options)?;
        let output_class = classify(output, batch.output_field, self.registry, self.options)?;
        let (value_type, map_response) = match &output_class.kind {
            FieldKind::Map(map) => (map.value.element_type(self.options), true),
            kind => (kind.element_type(self.options), false),
        };

        Ok(Some(BatchPlan {
            key_type: input_class.kind.element_type(self.options),
            input_name: input_class.name,
            output_name: output_class.name,
            value_type,
            map_response,
            batch,
        }))
    }

    fn with_context(&self, function: FunctionSpec) -> FunctionSpec {
        if self.options.use_context {
            function.param("ctx", TypeName::simple("Context"))
        } else {
            function
        }
    }

    fn interface(&self, source: &SourceInfo<'_>) -> Result<InterfaceSpec, GenerateError> {
        let mut interface = InterfaceSpec::new(self.name())
            .exported()
            .doc(source.description().text());
        if self.options.use_context {
            interface = interface.type_param(CONTEXT_PARAM);
        }

        let service = self.service;
        for (index, method) in service.method.iter().enumerate() {
            let types = self.types(method)?;
            let doc = source.lookup(fields::service::METHOD, index).text();
            let signature = self
                .with_context(FunctionSpec::new(method.name()).doc(doc))
                .param("request", types.request)
                .returns(TypeName::promise(types.response.into()));
            interface = interface.method(signature);

            if let Some(plan) = self.batch_plan(method)? {
                interface = interface.method(self.companion_signature(&plan));
            }
        }
        Ok(interface)
    }

    fn companion_signature(&self, plan: &BatchPlan<'_>) -> FunctionSpec {
        self.with_context(FunctionSpec::new(plan.batch.single_method_name.clone()))
            .param(singular(&plan.input_name), plan.key_type.clone())
            .returns(TypeName::promise(plan.value_type.clone()))
    }

    fn client(&self) -> Result<ClassSpec, GenerateError> {
        let (rpc_type, implements) = if self.options.use_context {
            ("Rpc<Context>", format!("{}<Context>", self.name()))
        } else {
            ("Rpc", self.name().to_string())
        };

        let mut constructor_body = CodeBlock::new();
        constructor_body.statement("this.rpc = rpc");

        let mut class = ClassSpec::new(format!("{}ClientImpl", self.name()))
            .exported()
            .implements(TypeName::simple(implements))
            .property(
                PropertySpec::new("rpc", TypeName::simple(rpc_type))
                    .modifier("private")
                    .modifier("readonly"),
            )
            .constructor(
                FunctionSpec::constructor()
                    .param("rpc", TypeName::simple(rpc_type))
                    .body(constructor_body),
            );
        if self.options.use_context {
            class = class.type_param(CONTEXT_PARAM);
        }

        let service = self.service;
        for method in &service.method {
            if let Some(plan) = self.batch_plan(method)? {
                class = class.method(self.batching_method(&plan));
            }
            if self.options.use_context && is_cacheable(method.name()) {
                class = class.method(self.caching_method(method)?);
            } else {
                class = class.method(self.regular_method(method)?);
            }
        }
        Ok(class)
    }

    /// Encode, send, decode.
    fn regular_method(&self, method: &MethodDescriptorProto) -> Result<FunctionSpec, GenerateError> {
        let types = self.types(method)?;
        let mut body = CodeBlock::new();
        let request = body.sym(&types.request);
        let response = body.sym(&types.response);
        let reader = body.sym(&runtime::reader());
        let ctx = if self.options.use_context { "ctx, " } else { "" };

        body.statement(format!("const data = {}.encode(request).finish()", request))
            .statement(format!(
                "const promise = this.rpc.request({}\"{}\", \"{}\", data)",
                ctx,
                self.service_path(),
                method.name()
            ))
            .statement(format!(
                "return promise.then((data) => {}.decode(new {}(data)))",
                response, reader
            ));

        Ok(self
            .with_context(FunctionSpec::new(method.name()))
            .param("request", types.request)
            .returns(TypeName::promise(types.response.into()))
            .body(body))
    }

    /// A single-key method that coalesces calls into one batch request.
    fn batching_method(&self, plan: &BatchPlan<'_>) -> FunctionSpec {
        let method = plan.batch.method;
        let keys = &plan.input_name;
        let key = singular(keys);

        let mut body = CodeBlock::new();
        let mut lambda = CodeBlock::new();
        lambda.statement(format!("const request = {{ {k}: [...{k}] }}", k = keys));
        if plan.map_response {
            lambda.statement(format!(
                "return this.{}(ctx, request).then((res) => {}.map((key) => res.{}[key]))",
                method.name(),
                keys,
                plan.output_name
            ));
        } else {
            // Results are assumed to come back in request order.
            lambda.statement(format!(
                "return this.{}(ctx, request).then((res) => res.{})",
                method.name(),
                plan.output_name
            ));
        }

        data_loader(
            &mut body,
            &self.identifier(method),
            &plan.key_type,
            &plan.value_type,
            keys,
            &lambda,
        );
        body.statement(format!("return dl.load({})", key));

        FunctionSpec::new(plan.batch.single_method_name.clone())
            .param("ctx", TypeName::simple("Context"))
            .param(key, plan.key_type.clone())
            .returns(TypeName::promise(plan.value_type.clone()))
            .body(body)
    }

    /// Deduplicates identical requests issued against the same context.
    fn caching_method(&self, method: &MethodDescriptorProto) -> Result<FunctionSpec, GenerateError> {
        let types = self.types(method)?;
        let mut body = CodeBlock::new();
        let mut lambda = CodeBlock::new();
        let request = lambda.sym(&types.request);
        let response = lambda.sym(&types.response);
        let reader = lambda.sym(&runtime::reader());

        lambda
            .begin_lambda("const responses = requests.map(async (request) =>")
            .statement(format!("const data = {}.encode(request).finish()", request))
            .statement(format!(
                "const response = await this.rpc.request(ctx, \"{}\", \"{}\", data)",
                self.service_path(),
                method.name()
            ))
            .statement(format!("return {}.decode(new {}(response))", response, reader))
            .end_lambda(");")
            .statement("return Promise.all(responses)");

        data_loader(
            &mut body,
            &self.identifier(method),
            &TypeName::from(types.request.clone()),
            &TypeName::from(types.response.clone()),
            "requests",
            &lambda,
        );
        body.statement("return dl.load(request)");

        Ok(FunctionSpec::new(method.name())
            .param("ctx", TypeName::simple("Context"))
            .param("request", types.request)
            .returns(TypeName::promise(types.response.into()))
            .body(body))
    }
}

/// `const dl = ctx.getDataLoader(identifier, () => new DataLoader<K, V>(...))`
fn data_loader(
    body: &mut CodeBlock,
    identifier: &str,
    key: &TypeName,
    value: &TypeName,
    batch_param: &str,
    batch_body: &CodeBlock,
) {
    let data_loader = body.sym(&runtime::data_loader());
    let hash = body.sym(&runtime::hash());
    let key = body.ty(key);
    let value = body.ty(value);

    body.begin_lambda(format!("const dl = ctx.getDataLoader(\"{}\", () =>", identifier))
        .line(format!("return new {}<{}, {}>(", data_loader, key, value))
        .indent()
        .begin_lambda(format!("({}) =>", batch_param))
        .add_code(batch_body)
        .end_lambda(",")
        .line(format!("{{ cacheKeyFn: {}, ...ctx.rpcDataLoaderOptions }}", hash))
        .dedent()
        .statement(")")
        .end_lambda(");");
}

/// The transport interface client implementations are built on. Not exported,
/// so several generated units can be re-exported from one barrel.
pub fn generate_rpc_interface(options: &GenerationOptions) -> InterfaceSpec {
    let data = TypeName::simple("Uint8Array");
    let mut request = FunctionSpec::new("request");
    let mut rpc = InterfaceSpec::new("Rpc");
    if options.use_context {
        request = request.param("ctx", TypeName::simple("Context"));
        rpc = rpc.type_param("Context");
    }
    request = request
        .param("service", TypeName::string())
        .param("method", TypeName::string())
        .param("data", data.clone())
        .returns(TypeName::promise(data));
    rpc.method(request)
}

/// `DataLoaderOptions` and `DataLoaders`, the context contract of
/// context-aware clients.
pub fn generate_data_loaders() -> Vec<Item> {
    let options = InterfaceSpec::new("DataLoaderOptions")
        .exported()
        .property(PropertySpec::new("cache", TypeName::boolean()).optional());

    let loaders = InterfaceSpec::new("DataLoaders")
        .exported()
        .property(PropertySpec::new("rpcDataLoaderOptions", TypeName::simple("DataLoaderOptions")).optional())
        .method(
            FunctionSpec::new("getDataLoader")
                .type_param("T")
                .param("identifier", TypeName::string())
                .param("constructorFn", TypeName::simple("() => T"))
                .returns(TypeName::simple("T")),
        );

    vec![Item::Interface(options), Item::Interface(loaders)]
}

fn join_non_empty(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::FileSpec;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rpc_interface() {
        let mut file = FileSpec::new("a");
        file.add(Item::Interface(generate_rpc_interface(&GenerationOptions::default())));
        assert_eq!(
            file.render(),
            "interface Rpc {\n  request(service: string, method: string, data: Uint8Array): Promise<Uint8Array>;\n}\n"
        );
    }

    #[test]
    fn test_rpc_interface_with_context() {
        let options = GenerationOptions {
            use_context: true,
            ..Default::default()
        };
        let mut file = FileSpec::new("a");
        file.add(Item::Interface(generate_rpc_interface(&options)));
        assert!(file
            .render()
            .starts_with("interface Rpc<Context> {\n  request(ctx: Context, service: string,"));
    }

    #[test]
    fn test_data_loaders() {
        let mut file = FileSpec::new("a");
        for item in generate_data_loaders() {
            file.add(item);
        }
        assert_eq!(
            file.render(),
            "export interface DataLoaderOptions {\n  cache?: boolean;\n}\n\n\
             export interface DataLoaders {\n  rpcDataLoaderOptions?: DataLoaderOptions;\n  \
             getDataLoader<T>(identifier: string, constructorFn: () => T): T;\n}\n"
        );
    }

    #[test]
    fn test_join_non_empty() {
        assert_eq!(join_non_empty(&["pkg", "Svc", "M"]), "pkg.Svc.M");
        assert_eq!(join_non_empty(&["", "Svc", "M"]), "Svc.M");
    }
}
