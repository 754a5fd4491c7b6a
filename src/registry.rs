//! Package namespace tree used to resolve message type references.
//!
//! Nodes live in an arena and refer to their parent by index, so the tree has
//! a single owner and no reference cycles. The registry borrows the message
//! descriptors it indexes; once registration is done it is only read.

use std::collections::BTreeMap;

use crate::descriptor::MessageDescriptor;

/// Handle to a namespace node inside a [`PackageRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackageId(usize);

/// One namespace: a proto package or one prefix of a dotted package name.
#[derive(Debug)]
pub struct PackageNode<'a> {
    /// Fully-qualified name with a leading dot (`.foo.bar`); empty for root.
    pub name: String,
    pub parent: Option<PackageId>,
    pub children: BTreeMap<String, PackageId>,
    pub types: BTreeMap<String, &'a MessageDescriptor>,
}

impl<'a> PackageNode<'a> {
    fn new(name: String, parent: Option<PackageId>) -> Self {
        Self {
            name,
            parent,
            children: BTreeMap::new(),
            types: BTreeMap::new(),
        }
    }
}

#[derive(Debug)]
pub struct PackageRegistry<'a> {
    nodes: Vec<PackageNode<'a>>,
}

impl<'a> Default for PackageRegistry<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> PackageRegistry<'a> {
    /// Registry holding only the unnamed root namespace.
    pub fn new() -> Self {
        Self {
            nodes: vec![PackageNode::new(String::new(), None)],
        }
    }

    pub fn root(&self) -> PackageId {
        PackageId(0)
    }

    pub fn node(&self, id: PackageId) -> &PackageNode<'a> {
        &self.nodes[id.0]
    }

    /// Register `message` under the dotted `package`.
    ///
    /// Missing namespaces are created on the way down; empty segments (an
    /// empty package or a leading dot) are skipped. A message with the same
    /// name in the same namespace is replaced. Returns the namespace the
    /// message was stored in.
    pub fn register(&mut self, package: &str, message: &'a MessageDescriptor) -> PackageId {
        let mut current = self.root();

        for segment in package.split('.').filter(|s| !s.is_empty()) {
            current = match self.nodes[current.0].children.get(segment) {
                Some(&child) => child,
                None => {
                    let child = PackageId(self.nodes.len());
                    let name = format!("{}.{}", self.nodes[current.0].name, segment);
                    self.nodes.push(PackageNode::new(name, Some(current)));
                    self.nodes[current.0]
                        .children
                        .insert(segment.to_string(), child);
                    child
                }
            };
        }

        self.nodes[current.0]
            .types
            .insert(message.name.clone(), message);
        current
    }

    /// Find the namespace for a dotted package name below `start`.
    pub fn lookup_package(&self, start: PackageId, package: &str) -> Option<PackageId> {
        package
            .split('.')
            .filter(|s| !s.is_empty())
            .try_fold(start, |current, segment| {
                self.node(current).children.get(segment).copied()
            })
    }

    /// Resolve a message type name as protoc scoping rules do.
    ///
    /// Names with a leading dot are absolute and resolved from the root.
    /// Relative names are tried from `current` outward through each ancestor;
    /// the innermost match wins. Returns the message and the namespace it was
    /// found in.
    pub fn lookup_type(
        &self,
        current: PackageId,
        type_name: &str,
    ) -> Option<(&'a MessageDescriptor, PackageId)> {
        if let Some(absolute) = type_name.strip_prefix('.') {
            return self.relatively_lookup_type(self.root(), absolute);
        }

        let mut scope = Some(current);
        while let Some(package) = scope {
            if let Some(found) = self.relatively_lookup_type(package, type_name) {
                return Some(found);
            }
            scope = self.node(package).parent;
        }
        None
    }

    fn relatively_lookup_type(
        &self,
        package: PackageId,
        name: &str,
    ) -> Option<(&'a MessageDescriptor, PackageId)> {
        if name.is_empty() {
            tracing::debug!("empty message name");
            return None;
        }

        let node = self.node(package);
        match name.split_once('.') {
            None => node.types.get(name).map(|&message| (message, package)),
            Some((head, rest)) => {
                tracing::trace!(
                    looking_for = rest,
                    within = head,
                    package_name = %node.name,
                    "relative type lookup"
                );
                if let Some(&child) = node.children.get(head) {
                    return self.relatively_lookup_type(child, rest);
                }
                if let Some(&message) = node.types.get(head) {
                    return lookup_nested_type(message, rest).map(|nested| (nested, package));
                }
                tracing::info!(
                    component = head,
                    package_name = %node.name,
                    "no such package nor message in package"
                );
                None
            }
        }
    }
}

/// Walk a dotted path through the nested types of `message`.
///
/// Only declared nested messages are searched; namespaces are never crossed.
pub fn lookup_nested_type<'a>(
    message: &'a MessageDescriptor,
    dotted_name: &str,
) -> Option<&'a MessageDescriptor> {
    let mut current = message;

    for component in dotted_name.split('.') {
        match current.nested_types.iter().find(|n| n.name == component) {
            Some(nested) => current = nested,
            None => {
                tracing::info!(
                    component,
                    message_name = %current.name,
                    "no such nested message"
                );
                return None;
            }
        }
    }

    Some(current)
}
