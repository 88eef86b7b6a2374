//! An in-order-linked, self-balancing binary search tree.
//!
//! This is the one abstraction the rest of the crate builds on: the same
//! type backs both the beachline (ordered left-to-right along the sweep)
//! and the circle-event queue (ordered by `(y, x)`). Every node carries
//! explicit predecessor/successor links maintained on every mutation, so
//! `prev`/`next` are O(1) — the sweep leans on that constantly to find the
//! arc immediately left or right of another.
//!
//! Nodes are stored in an arena (`Vec<Slot<T>>`) instead of being heap
//! allocated and linked by raw pointer. `remove` only unlinks a node from
//! the tree's structure; its slot and payload stay put, so a [`NodeId`]
//! handed out once (e.g. a circle event's back-reference to its arc)
//! remains valid for the arena's whole lifetime even after the node has
//! left the tree. That sidesteps the reference counting the arcs would
//! otherwise need to survive being referenced from two structures at once.
//!
//! `insert` does not take a comparator: callers locate the insertion point
//! themselves (by walking the tree with their own ordering) and tell
//! `insert` which existing node the new one goes immediately after.

use std::fmt;
use std::marker::PhantomData;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

struct Slot<T> {
    value: T,
    color: Color,
    parent: Option<usize>,
    left: Option<usize>,
    right: Option<usize>,
    prev: Option<usize>,
    next: Option<usize>,
}

pub struct NodeId<T> {
    index: usize,
    phantom: PhantomData<T>,
}

impl<T> NodeId<T> {
    fn new(index: usize) -> Self {
        NodeId {
            index,
            phantom: PhantomData,
        }
    }
}

impl<T> Clone for NodeId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeId<T> {}

impl<T> PartialEq for NodeId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for NodeId<T> {}

impl<T> fmt::Debug for NodeId<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NodeId({})", self.index)
    }
}

pub struct Tree<T> {
    slots: Vec<Slot<T>>,
    root: Option<usize>,
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Tree {
            slots: Vec::new(),
            root: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<NodeId<T>> {
        self.root.map(NodeId::new)
    }

    pub fn first(&self) -> Option<NodeId<T>> {
        self.root.map(|r| NodeId::new(self.first_from(r)))
    }

    pub fn get(&self, id: NodeId<T>) -> &T {
        &self.slots[id.index].value
    }

    pub fn get_mut(&mut self, id: NodeId<T>) -> &mut T {
        &mut self.slots[id.index].value
    }

    pub fn prev(&self, id: NodeId<T>) -> Option<NodeId<T>> {
        self.slots[id.index].prev.map(NodeId::new)
    }

    pub fn next(&self, id: NodeId<T>) -> Option<NodeId<T>> {
        self.slots[id.index].next.map(NodeId::new)
    }

    pub fn left(&self, id: NodeId<T>) -> Option<NodeId<T>> {
        self.slots[id.index].left.map(NodeId::new)
    }

    pub fn right(&self, id: NodeId<T>) -> Option<NodeId<T>> {
        self.slots[id.index].right.map(NodeId::new)
    }

    fn first_from(&self, mut n: usize) -> usize {
        while let Some(l) = self.slots[n].left {
            n = l;
        }
        n
    }

    fn is_red(&self, n: Option<usize>) -> bool {
        n.is_some_and(|i| self.slots[i].color == Color::Red)
    }

    fn is_black(&self, n: Option<usize>) -> bool {
        !self.is_red(n)
    }

    /// Places `value` immediately after `after` in in-order sequence. If
    /// `after` is `None`, `value` becomes the leftmost node (the root, if
    /// the tree was empty).
    pub fn insert(&mut self, after: Option<NodeId<T>>, value: T) -> NodeId<T> {
        let new_idx = self.slots.len();
        self.slots.push(Slot {
            value,
            color: Color::Red,
            parent: None,
            left: None,
            right: None,
            prev: None,
            next: None,
        });

        let parent;
        if let Some(after) = after {
            let node = after.index;
            let node_next = self.slots[node].next;
            self.slots[new_idx].prev = Some(node);
            self.slots[new_idx].next = node_next;
            if let Some(nn) = node_next {
                self.slots[nn].prev = Some(new_idx);
            }
            self.slots[node].next = Some(new_idx);

            if self.slots[node].right.is_none() {
                self.slots[node].right = Some(new_idx);
                parent = Some(node);
            } else {
                let mut n = self.slots[node].right.unwrap();
                while let Some(l) = self.slots[n].left {
                    n = l;
                }
                self.slots[n].left = Some(new_idx);
                parent = Some(n);
            }
        } else if let Some(root) = self.root {
            let first = self.first_from(root);
            self.slots[new_idx].next = Some(first);
            self.slots[first].prev = Some(new_idx);
            self.slots[first].left = Some(new_idx);
            parent = Some(first);
        } else {
            self.root = Some(new_idx);
            parent = None;
        }

        self.slots[new_idx].parent = parent;
        self.fixup_insert(new_idx);

        NodeId::new(new_idx)
    }

    /// Detaches `id` from the tree's structure and repairs red-black
    /// invariants. The node's payload remains reachable through `get`.
    pub fn remove(&mut self, id: NodeId<T>) {
        let node0 = id.index;

        let node_next = self.slots[node0].next;
        let node_prev = self.slots[node0].prev;
        if let Some(nn) = node_next {
            self.slots[nn].prev = node_prev;
        }
        if let Some(pp) = node_prev {
            self.slots[pp].next = node_next;
        }
        self.slots[node0].next = None;
        self.slots[node0].prev = None;

        let parent0 = self.slots[node0].parent;
        let left0 = self.slots[node0].left;
        let right0 = self.slots[node0].right;

        let next0 = if left0.is_none() {
            right0
        } else if right0.is_none() {
            left0
        } else {
            Some(self.first_from(right0.unwrap()))
        };

        if let Some(p) = parent0 {
            if self.slots[p].left == Some(node0) {
                self.slots[p].left = next0;
            } else {
                self.slots[p].right = next0;
            }
        } else {
            self.root = next0;
        }

        let is_red;
        let mut node;
        let mut parent;

        if left0.is_some() && right0.is_some() {
            let next_idx = next0.unwrap();
            is_red = self.slots[next_idx].color == Color::Red;
            self.slots[next_idx].color = self.slots[node0].color;
            self.slots[next_idx].left = left0;
            self.slots[left0.unwrap()].parent = Some(next_idx);

            if next_idx == right0.unwrap() {
                self.slots[next_idx].parent = parent0;
                parent = Some(next_idx);
                node = self.slots[next_idx].right;
            } else {
                let next_parent = self.slots[next_idx].parent;
                self.slots[next_idx].parent = parent0;
                node = self.slots[next_idx].right;
                parent = next_parent;
                if let Some(pp) = parent {
                    self.slots[pp].left = node;
                }
                self.slots[next_idx].right = right0;
                self.slots[right0.unwrap()].parent = Some(next_idx);
            }
        } else {
            is_red = self.slots[node0].color == Color::Red;
            node = next0;
            parent = parent0;
        }

        if let Some(n) = node {
            self.slots[n].parent = parent;
        }

        if is_red {
            return;
        }
        if let Some(n) = node {
            if self.slots[n].color == Color::Red {
                self.slots[n].color = Color::Black;
                return;
            }
        }

        loop {
            if node == self.root {
                break;
            }
            let p = parent.expect("double-black fixup requires a parent until node reaches root");
            if node == self.slots[p].left {
                let mut sibling = self.slots[p].right.expect("red-black tree sibling must exist");
                if self.slots[sibling].color == Color::Red {
                    self.slots[sibling].color = Color::Black;
                    self.slots[p].color = Color::Red;
                    self.rotate_left(p);
                    sibling = self.slots[p].right.unwrap();
                }
                if self.is_red(self.slots[sibling].left) || self.is_red(self.slots[sibling].right) {
                    if self.is_black(self.slots[sibling].right) {
                        let l = self.slots[sibling].left.unwrap();
                        self.slots[l].color = Color::Black;
                        self.slots[sibling].color = Color::Red;
                        self.rotate_right(sibling);
                        sibling = self.slots[p].right.unwrap();
                    }
                    self.slots[sibling].color = self.slots[p].color;
                    self.slots[p].color = Color::Black;
                    if let Some(r) = self.slots[sibling].right {
                        self.slots[r].color = Color::Black;
                    }
                    self.rotate_left(p);
                    node = self.root;
                    break;
                }
                self.slots[sibling].color = Color::Red;
            } else {
                let mut sibling = self.slots[p].left.expect("red-black tree sibling must exist");
                if self.slots[sibling].color == Color::Red {
                    self.slots[sibling].color = Color::Black;
                    self.slots[p].color = Color::Red;
                    self.rotate_right(p);
                    sibling = self.slots[p].left.unwrap();
                }
                if self.is_red(self.slots[sibling].left) || self.is_red(self.slots[sibling].right) {
                    if self.is_black(self.slots[sibling].left) {
                        let r = self.slots[sibling].right.unwrap();
                        self.slots[r].color = Color::Black;
                        self.slots[sibling].color = Color::Red;
                        self.rotate_left(sibling);
                        sibling = self.slots[p].left.unwrap();
                    }
                    self.slots[sibling].color = self.slots[p].color;
                    self.slots[p].color = Color::Black;
                    if let Some(l) = self.slots[sibling].left {
                        self.slots[l].color = Color::Black;
                    }
                    self.rotate_right(p);
                    node = self.root;
                    break;
                }
                self.slots[sibling].color = Color::Red;
            }
            node = Some(p);
            parent = self.slots[p].parent;
            if self.is_black(node) {
                continue;
            }
            break;
        }
        if let Some(n) = node {
            self.slots[n].color = Color::Black;
        }
    }

    fn fixup_insert(&mut self, mut node: usize) {
        while let Some(mut parent) = self.slots[node].parent {
            if self.slots[parent].color != Color::Red {
                break;
            }
            let grandpa = self.slots[parent]
                .parent
                .expect("a red node always has a black grandparent");
            if Some(parent) == self.slots[grandpa].left {
                let uncle = self.slots[grandpa].right;
                if self.is_red(uncle) {
                    self.slots[parent].color = Color::Black;
                    self.slots[uncle.unwrap()].color = Color::Black;
                    self.slots[grandpa].color = Color::Red;
                    node = grandpa;
                } else {
                    if Some(node) == self.slots[parent].right {
                        self.rotate_left(parent);
                        node = parent;
                        parent = self.slots[node].parent.unwrap();
                    }
                    self.slots[parent].color = Color::Black;
                    self.slots[grandpa].color = Color::Red;
                    self.rotate_right(grandpa);
                }
            } else {
                let uncle = self.slots[grandpa].left;
                if self.is_red(uncle) {
                    self.slots[parent].color = Color::Black;
                    self.slots[uncle.unwrap()].color = Color::Black;
                    self.slots[grandpa].color = Color::Red;
                    node = grandpa;
                } else {
                    if Some(node) == self.slots[parent].left {
                        self.rotate_right(parent);
                        node = parent;
                        parent = self.slots[node].parent.unwrap();
                    }
                    self.slots[parent].color = Color::Black;
                    self.slots[grandpa].color = Color::Red;
                    self.rotate_left(grandpa);
                }
            }
        }
        self.slots[self.root.unwrap()].color = Color::Black;
    }

    fn rotate_left(&mut self, p: usize) {
        let q = self.slots[p].right.expect("rotate_left requires a right child");
        let parent = self.slots[p].parent;
        if let Some(pp) = parent {
            if self.slots[pp].left == Some(p) {
                self.slots[pp].left = Some(q);
            } else {
                self.slots[pp].right = Some(q);
            }
        } else {
            self.root = Some(q);
        }
        self.slots[q].parent = parent;
        self.slots[p].parent = Some(q);
        self.slots[p].right = self.slots[q].left;
        if let Some(r) = self.slots[p].right {
            self.slots[r].parent = Some(p);
        }
        self.slots[q].left = Some(p);
    }

    fn rotate_right(&mut self, p: usize) {
        let q = self.slots[p].left.expect("rotate_right requires a left child");
        let parent = self.slots[p].parent;
        if let Some(pp) = parent {
            if self.slots[pp].left == Some(p) {
                self.slots[pp].left = Some(q);
            } else {
                self.slots[pp].right = Some(q);
            }
        } else {
            self.root = Some(q);
        }
        self.slots[q].parent = parent;
        self.slots[p].parent = Some(q);
        self.slots[p].left = self.slots[q].right;
        if let Some(l) = self.slots[p].left {
            self.slots[l].parent = Some(p);
        }
        self.slots[q].right = Some(p);
    }
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Tree::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(tree: &Tree<i32>) -> Vec<i32> {
        let mut out = Vec::new();
        let mut cur = tree.first();
        while let Some(n) = cur {
            out.push(*tree.get(n));
            cur = tree.next(n);
        }
        out
    }

    fn insert_sorted(tree: &mut Tree<i32>, value: i32) -> NodeId<i32> {
        let mut after = None;
        let mut cur = tree.root();
        while let Some(n) = cur {
            if value < *tree.get(n) {
                match tree.left(n) {
                    Some(l) => cur = Some(l),
                    None => {
                        after = tree.prev(n);
                        break;
                    }
                }
            } else {
                match tree.right(n) {
                    Some(r) => cur = Some(r),
                    None => {
                        after = Some(n);
                        break;
                    }
                }
            }
        }
        tree.insert(after, value)
    }

    #[test]
    fn empty_tree_has_no_first() {
        let tree: Tree<i32> = Tree::new();
        assert!(tree.first().is_none());
        assert!(tree.is_empty());
    }

    #[test]
    fn insert_after_none_becomes_leftmost() {
        let mut tree = Tree::new();
        let five = tree.insert(None, 5);
        tree.insert(None, 1);
        assert_eq!(collect(&tree), vec![1, 5]);
        assert_eq!(*tree.get(five), 5);
    }

    #[test]
    fn insert_maintains_order_for_many_values() {
        let mut tree = Tree::new();
        let values = [5, 3, 8, 1, 4, 7, 9, 2, 6, 0, -1, 42, 17];
        for &v in &values {
            insert_sorted(&mut tree, v);
        }
        let mut expected = values.to_vec();
        expected.sort_unstable();
        assert_eq!(collect(&tree), expected);
    }

    #[test]
    fn remove_preserves_order_of_remaining_nodes() {
        let mut tree = Tree::new();
        let ids: Vec<_> = (0..20).map(|v| insert_sorted(&mut tree, v)).collect();
        for &i in &[3, 7, 11, 0, 19] {
            tree.remove(ids[i]);
        }
        let expected: Vec<i32> = (0..20).filter(|v| ![3, 7, 11, 0, 19].contains(v)).collect();
        assert_eq!(collect(&tree), expected);
    }

    #[test]
    fn removed_node_payload_remains_readable() {
        let mut tree = Tree::new();
        let a = tree.insert(None, 10);
        let b = tree.insert(Some(a), 20);
        tree.remove(a);
        assert_eq!(*tree.get(a), 10);
        assert_eq!(collect(&tree), vec![20]);
        let _ = b;
    }

    #[test]
    fn prev_next_are_consistent_after_many_mutations() {
        let mut tree = Tree::new();
        let mut ids = Vec::new();
        for v in 0..50 {
            ids.push(insert_sorted(&mut tree, v * 7 % 53));
        }
        for &i in &[2, 9, 30, 41, 5] {
            tree.remove(ids[i]);
        }
        let mut node = tree.first();
        let mut prev = None;
        let mut count = 0;
        while let Some(n) = node {
            assert_eq!(tree.prev(n), prev);
            prev = Some(n);
            node = tree.next(n);
            count += 1;
        }
        assert_eq!(count, 45);
    }
}
