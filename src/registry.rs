//! Cross-file type registry.
//!
//! Built once from every file in the request before any code is generated,
//! so fields may reference types declared later or in other files.

use std::collections::{HashMap, HashSet};

use prost_types::{DescriptorProto, EnumDescriptorProto, FileDescriptorProto};
use tracing::debug;

use crate::code::Symbol;
use crate::error::GenerateError;
use crate::options::GenerationOptions;
use crate::source_info::SourceInfo;
use crate::walker;

/// The descriptor that owns a registered name.
#[derive(Debug, Clone, Copy)]
pub enum TypeDescriptor<'a> {
    Message(&'a DescriptorProto),
    Enum(&'a EnumDescriptorProto),
}

/// Where a schema type lives in the generated output.
#[derive(Debug, Clone)]
pub struct TypeEntry<'a> {
    /// Module path of the owning unit, e.g. `google/protobuf/timestamp`.
    pub module: String,
    /// Canonical target name, e.g. `Outer_Inner`.
    pub ts_name: String,
    pub descriptor: TypeDescriptor<'a>,
}

impl TypeEntry<'_> {
    /// A symbol that imports this type from its owning unit.
    pub fn symbol(&self) -> Symbol {
        Symbol::generated(self.ts_name.clone(), self.module.clone())
    }
}

/// Fully-qualified schema names (`.pkg.Outer.Inner`) to [`TypeEntry`].
#[derive(Debug, Default)]
pub struct TypeMap<'a> {
    entries: HashMap<String, TypeEntry<'a>>,
    /// (module, ts_name) pairs already taken; `Foo_Bar` and `Foo.Bar` collide.
    targets: HashSet<(String, String)>,
}

impl<'a> TypeMap<'a> {
    /// Register every enum and message of every file.
    pub fn build(
        files: &'a [FileDescriptorProto],
        options: &GenerationOptions,
    ) -> Result<Self, GenerateError> {
        let mut map = TypeMap::default();
        for file in files {
            map.register_file(file, options)?;
        }
        debug!(types = map.entries.len(), "built type registry");
        Ok(map)
    }

    fn register_file(
        &mut self,
        file: &'a FileDescriptorProto,
        options: &GenerationOptions,
    ) -> Result<(), GenerateError> {
        let file_name = file.name();
        let module = module_name(file_name);
        let prefix = match file.package() {
            "" => String::new(),
            package => format!(".{}", package),
        };

        // Collected first: both callbacks cannot borrow `self` at once.
        let mut found: Vec<(String, String, TypeDescriptor<'a>)> = Vec::new();
        let mut enums: Vec<(String, String, TypeDescriptor<'a>)> = Vec::new();
        walker::visit(
            file,
            &SourceInfo::empty(),
            options,
            &mut |v| {
                found.push((v.proto_name, v.ts_name, TypeDescriptor::Message(v.descriptor)));
                Ok(())
            },
            &mut |v| {
                enums.push((v.proto_name, v.ts_name, TypeDescriptor::Enum(v.descriptor)));
                Ok(())
            },
        )?;

        for (proto_name, ts_name, descriptor) in found.into_iter().chain(enums) {
            let full_name = format!("{}.{}", prefix, proto_name);
            let target = (module.clone(), ts_name.clone());
            if self.entries.contains_key(&full_name) || self.targets.contains(&target) {
                return Err(GenerateError::DuplicateType {
                    file: file_name.to_string(),
                    name: full_name,
                });
            }
            self.targets.insert(target);
            self.entries.insert(
                full_name,
                TypeEntry {
                    module: module.clone(),
                    ts_name,
                    descriptor,
                },
            );
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&TypeEntry<'a>, GenerateError> {
        self.entries
            .get(name)
            .ok_or_else(|| GenerateError::NoTypeFound(name.to_string()))
    }

    /// The message registered under `name`.
    pub fn message(&self, name: &str) -> Result<&'a DescriptorProto, GenerateError> {
        match self.get(name)?.descriptor {
            TypeDescriptor::Message(message) => Ok(message),
            TypeDescriptor::Enum(_) => Err(GenerateError::NoTypeFound(name.to_string())),
        }
    }

    pub fn symbol(&self, name: &str) -> Result<Symbol, GenerateError> {
        self.get(name).map(TypeEntry::symbol)
    }

    /// Target names of the types generated into `module`.
    pub fn names_in<'m>(&'m self, module: &'m str) -> impl Iterator<Item = &'m str> + 'm {
        self.targets
            .iter()
            .filter(move |(m, _)| m == module)
            .map(|(_, name)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `company/foo.proto` -> `company/foo`.
pub fn module_name(file_name: &str) -> String {
    file_name
        .strip_suffix(".proto")
        .unwrap_or(file_name)
        .to_string()
}
