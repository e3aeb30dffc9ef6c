//! Tree widget model rendered as a flat, indented list
//!
//! Nodes live in an arena keyed by handle. Rows are derived on demand from
//! the root, skipping the children of collapsed nodes.

use std::collections::HashMap;

use sceneterm_protocol::NodeId;

use crate::mirror::TreeWidget;

#[derive(Debug, Clone)]
struct TreeItem {
    label: String,
    payload: NodeId,
    children: Vec<usize>,
    parent: Option<usize>,
    expanded: bool,
}

/// One visible line of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub handle: usize,
    pub depth: usize,
    pub label: String,
}

#[derive(Debug, Default)]
pub struct TreeModel {
    items: HashMap<usize, TreeItem>,
    next_handle: usize,
    root: Option<usize>,
    current: Option<usize>,
}

impl TreeModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible rows in display order
    pub fn rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        let Some(root) = self.root else {
            return rows;
        };
        let mut stack = vec![(root, 0)];
        while let Some((handle, depth)) = stack.pop() {
            let Some(item) = self.items.get(&handle) else {
                continue;
            };
            rows.push(TreeRow {
                handle,
                depth,
                label: item.label.clone(),
            });
            if item.expanded {
                stack.extend(item.children.iter().rev().map(|c| (*c, depth + 1)));
            }
        }
        rows
    }

    /// Row index of the cursor, if the cursor is visible
    pub fn current_row(&self, rows: &[TreeRow]) -> Option<usize> {
        let current = self.current?;
        rows.iter().position(|r| r.handle == current)
    }

    /// Move the cursor by `delta` visible rows; returns whether it moved
    pub fn step(&mut self, delta: isize) -> bool {
        let rows = self.rows();
        if rows.is_empty() {
            return false;
        }
        let index = match self.current_row(&rows) {
            Some(i) => i.saturating_add_signed(delta).min(rows.len() - 1),
            None => 0,
        };
        self.move_to(rows[index].handle)
    }

    /// Cursor to the parent row
    pub fn to_parent(&mut self) -> bool {
        match self.current.and_then(|c| self.items.get(&c)).and_then(|i| i.parent) {
            Some(parent) if self.is_visible(parent) => self.move_to(parent),
            _ => false,
        }
    }

    /// Cursor to the first child, expanding the node if needed
    pub fn to_first_child(&mut self) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        let Some(first) = self.items.get(&current).and_then(|i| i.children.first().copied()) else {
            return false;
        };
        if let Some(item) = self.items.get_mut(&current) {
            item.expanded = true;
        }
        self.move_to(first)
    }

    fn move_to(&mut self, handle: usize) -> bool {
        let moved = self.current != Some(handle);
        self.current = Some(handle);
        moved
    }

    fn is_visible(&self, handle: usize) -> bool {
        self.rows().iter().any(|r| r.handle == handle)
    }

    fn detach(&mut self, handle: usize) {
        let parent = self.items.get(&handle).and_then(|i| i.parent);
        if let Some(parent) = parent.and_then(|p| self.items.get_mut(&p)) {
            parent.children.retain(|c| *c != handle);
        }
        if let Some(item) = self.items.get_mut(&handle) {
            item.parent = None;
        }
    }
}

impl TreeWidget for TreeModel {
    type Handle = usize;

    fn create_node(&mut self, label: &str, id: NodeId) -> usize {
        self.next_handle += 1;
        self.items.insert(
            self.next_handle,
            TreeItem {
                label: label.to_string(),
                payload: id,
                children: Vec::new(),
                parent: None,
                expanded: true,
            },
        );
        self.next_handle
    }

    fn set_label(&mut self, node: usize, label: &str) {
        if let Some(item) = self.items.get_mut(&node) {
            item.label = label.to_string();
        }
    }

    fn set_children(&mut self, node: usize, children: &[usize]) {
        let old = self
            .items
            .get(&node)
            .map(|i| i.children.clone())
            .unwrap_or_default();
        for child in old {
            if let Some(item) = self.items.get_mut(&child) {
                if item.parent == Some(node) {
                    item.parent = None;
                }
            }
        }
        for child in children {
            self.detach(*child);
            if let Some(item) = self.items.get_mut(child) {
                item.parent = Some(node);
            }
        }
        if let Some(item) = self.items.get_mut(&node) {
            item.children = children.to_vec();
        }
    }

    fn set_root(&mut self, node: usize) {
        self.root = Some(node);
    }

    fn current(&self) -> Option<usize> {
        self.current
    }

    fn set_current(&mut self, node: usize) {
        self.current = Some(node);
    }

    fn is_expanded(&self, node: usize) -> bool {
        self.items.get(&node).is_some_and(|i| i.expanded)
    }

    fn set_expanded(&mut self, node: usize, expanded: bool) {
        if let Some(item) = self.items.get_mut(&node) {
            item.expanded = expanded;
        }
    }

    fn payload(&self, node: usize) -> Option<NodeId> {
        self.items.get(&node).map(|i| i.payload)
    }

    fn remove_node(&mut self, node: usize) {
        self.detach(node);
        if let Some(item) = self.items.remove(&node) {
            for child in item.children {
                if let Some(c) = self.items.get_mut(&child) {
                    c.parent = None;
                }
            }
        }
        if self.current == Some(node) {
            self.current = None;
        }
        if self.root == Some(node) {
            self.root = None;
        }
    }
}
