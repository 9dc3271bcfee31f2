//! Build-list resolution from requested namespaces and entry files

pub mod resolver;

pub use resolver::{
    resolve_project, DependencyList, DependencyResolver, ResolvedProject, ResolverOptions,
    BASE_JS_RELATIVE, SOYUTILS, SOYUTILS_USEGOOG, TEMPLATE_RUNTIME_GOOG_NAMESPACE,
    TEMPLATE_RUNTIME_NAMESPACE,
};
