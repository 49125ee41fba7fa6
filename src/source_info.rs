//! Documentation lookup over `SourceCodeInfo`.
//!
//! protoc records comments per location path: a list of field numbers and
//! indices leading from the `FileDescriptorProto` to an element, e.g.
//! `[4, 0, 2, 1]` is "message_type[0].field[1]". A [`SourceInfo`] is a cursor
//! at one such path; [`SourceInfo::open`] descends and
//! [`SourceInfo::lookup`] fetches a child's comments.

use std::collections::HashMap;

use prost_types::FileDescriptorProto;

/// Field numbers from `descriptor.proto` used to build location paths.
pub mod fields {
    pub mod file {
        pub const MESSAGE_TYPE: i32 = 4;
        pub const ENUM_TYPE: i32 = 5;
        pub const SERVICE: i32 = 6;
        pub const SYNTAX: i32 = 12;
    }

    pub mod message {
        pub const FIELD: i32 = 2;
        pub const NESTED_TYPE: i32 = 3;
        pub const ENUM_TYPE: i32 = 4;
    }

    pub mod enumeration {
        pub const VALUE: i32 = 2;
    }

    pub mod service {
        pub const METHOD: i32 = 2;
    }
}

/// Comments attached to one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Description {
    pub leading: Option<String>,
    pub trailing: Option<String>,
}

impl Description {
    /// The text to emit as a doc comment: leading comments win over trailing.
    ///
    /// Returns `None` when both are absent or blank. The result is sanitized so
    /// it can be embedded in a `/** ... */` block.
    pub fn text(&self) -> Option<String> {
        let raw = self
            .leading
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.trailing.as_deref().filter(|s| !s.trim().is_empty()))?;
        Some(sanitize_comment(raw))
    }
}

/// Strip per-line whitespace and neutralize comment terminators.
pub fn sanitize_comment(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().map(|l| l.trim()).collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(0);
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(start, |i| i + 1);
    lines[start..end].join("\n").replace("*/", "* /")
}

/// A cursor into a file's source locations.
#[derive(Debug, Clone)]
pub struct SourceInfo<'a> {
    locations: Option<&'a Locations>,
    path: Vec<i32>,
}

/// All comment-bearing locations of one file, keyed by path.
#[derive(Debug, Default)]
pub struct Locations {
    by_path: HashMap<Vec<i32>, Description>,
}

impl Locations {
    pub fn from_file(file: &FileDescriptorProto) -> Self {
        let mut by_path = HashMap::new();
        if let Some(info) = &file.source_code_info {
            for location in &info.location {
                if location.leading_comments.is_none() && location.trailing_comments.is_none() {
                    continue;
                }
                by_path.insert(
                    location.path.clone(),
                    Description {
                        leading: location.leading_comments.clone(),
                        trailing: location.trailing_comments.clone(),
                    },
                );
            }
        }
        Locations { by_path }
    }

    /// A cursor at the file root.
    pub fn root(&self) -> SourceInfo<'_> {
        SourceInfo {
            locations: Some(self),
            path: Vec::new(),
        }
    }
}

impl<'a> SourceInfo<'a> {
    /// A cursor that never finds anything; used when building the registry.
    pub fn empty() -> SourceInfo<'static> {
        SourceInfo {
            locations: None,
            path: Vec::new(),
        }
    }

    /// Comments attached to the element this cursor points at.
    pub fn description(&self) -> Description {
        self.get(&self.path)
    }

    /// Comments attached to child `index` of repeated field `field`.
    pub fn lookup(&self, field: i32, index: usize) -> Description {
        self.get(&self.child_path(field, Some(index)))
    }

    /// Comments attached to a singular field of the current element, such as
    /// the file's `syntax` statement.
    pub fn lookup_singular(&self, field: i32) -> Description {
        self.get(&self.child_path(field, None))
    }

    /// Descend into child `index` of repeated field `field`.
    pub fn open(&self, field: i32, index: usize) -> SourceInfo<'a> {
        match self.locations {
            None => self.clone(),
            Some(locations) => SourceInfo {
                locations: Some(locations),
                path: self.child_path(field, Some(index)),
            },
        }
    }

    fn child_path(&self, field: i32, index: Option<usize>) -> Vec<i32> {
        let mut path = Vec::with_capacity(self.path.len() + 2);
        path.extend_from_slice(&self.path);
        path.push(field);
        if let Some(index) = index {
            path.push(index as i32);
        }
        path
    }

    fn get(&self, path: &[i32]) -> Description {
        self.locations
            .and_then(|l| l.by_path.get(path))
            .cloned()
            .unwrap_or_default()
    }
}
