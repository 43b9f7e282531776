//! A height-balanced binary search tree whose order is supplied by an
//! external, possibly time-varying, [`Comparator`] rather than `K: Ord`.
//!
//! The sweep-line status structure needs exactly this: segments have no
//! intrinsic order, only an order relative to where the sweep line
//! currently sits. Nodes carry parent pointers (maintained through
//! rotations) so that [`AvlTree::left_neighbor`]/[`AvlTree::right_neighbor`]
//! run in `O(height)` via a single root-to-leaf descent rather than an
//! in-order traversal.
//!
//! Nodes live in an [`Arena`] rather than behind `Box`/`Rc`, which is what
//! lets deletion recycle storage and keeps parent pointers as plain indices
//! instead of weak references.

use crate::utils::{Arena, ArenaIndex};
use crate::Error;
use std::cmp::Ordering;

/// Supplies the order relation an [`AvlTree`] is built against. Unlike
/// `Ord`, the comparator is a value the tree holds onto, so it can carry
/// mutable state (see `SweepLineComparator`).
pub trait Comparator<K> {
  fn compare(&self, a: &K, b: &K) -> Ordering;
}

#[derive(Debug, Clone)]
struct Node<K> {
  key: K,
  left: Option<ArenaIndex>,
  right: Option<ArenaIndex>,
  parent: Option<ArenaIndex>,
  height: i64,
}

#[derive(Debug, Clone)]
pub struct AvlTree<K, C> {
  arena: Arena<Node<K>>,
  root: Option<ArenaIndex>,
  size: usize,
  comparator: C,
}

impl<K: Clone, C: Comparator<K>> AvlTree<K, C> {
  pub fn new(comparator: C) -> AvlTree<K, C> {
    AvlTree { arena: Arena::new(), root: None, size: 0, comparator }
  }

  pub fn len(&self) -> usize {
    self.size
  }

  pub fn is_empty(&self) -> bool {
    self.size == 0
  }

  pub fn comparator(&self) -> &C {
    &self.comparator
  }

  pub fn comparator_mut(&mut self) -> &mut C {
    &mut self.comparator
  }

  /// Inserts `key`. Fails without modifying the tree if an equal key is
  /// already present.
  pub fn insert(&mut self, key: K) -> Result<(), Error> {
    let new_root = self.insert_rec(self.root, key)?;
    self.set_parent(new_root, None);
    self.root = Some(new_root);
    self.size += 1;
    Ok(())
  }

  fn insert_rec(&mut self, idx: Option<ArenaIndex>, key: K) -> Result<ArenaIndex, Error> {
    match idx {
      None => Ok(self.arena.push(Node { key, left: None, right: None, parent: None, height: 1 })),
      Some(i) => {
        match self.comparator.compare(&key, &self.arena[i].key) {
          Ordering::Equal => Err(Error::DuplicateKey),
          Ordering::Less => {
            let new_left = self.insert_rec(self.arena[i].left, key)?;
            self.arena[i].left = Some(new_left);
            self.set_parent(new_left, Some(i));
            self.update_height(i);
            Ok(self.rebalance(i))
          }
          Ordering::Greater => {
            let new_right = self.insert_rec(self.arena[i].right, key)?;
            self.arena[i].right = Some(new_right);
            self.set_parent(new_right, Some(i));
            self.update_height(i);
            Ok(self.rebalance(i))
          }
        }
      }
    }
  }

  /// Removes the (unique) node equal to `key`.
  pub fn delete(&mut self, key: &K) -> Result<(), Error> {
    let (new_root, found) = self.delete_rec(self.root, key);
    if !found {
      return Err(Error::MissingKey);
    }
    self.root = new_root;
    if let Some(r) = self.root {
      self.set_parent(r, None);
    }
    self.size -= 1;
    Ok(())
  }

  fn delete_rec(&mut self, idx: Option<ArenaIndex>, key: &K) -> (Option<ArenaIndex>, bool) {
    let i = match idx {
      None => return (None, false),
      Some(i) => i,
    };
    match self.comparator.compare(key, &self.arena[i].key) {
      Ordering::Less => {
        let (new_left, found) = self.delete_rec(self.arena[i].left, key);
        if !found {
          return (Some(i), false);
        }
        self.arena[i].left = new_left;
        if let Some(nl) = new_left {
          self.set_parent(nl, Some(i));
        }
        self.update_height(i);
        (Some(self.rebalance(i)), true)
      }
      Ordering::Greater => {
        let (new_right, found) = self.delete_rec(self.arena[i].right, key);
        if !found {
          return (Some(i), false);
        }
        self.arena[i].right = new_right;
        if let Some(nr) = new_right {
          self.set_parent(nr, Some(i));
        }
        self.update_height(i);
        (Some(self.rebalance(i)), true)
      }
      Ordering::Equal => (self.delete_node(i), true),
    }
  }

  fn delete_node(&mut self, i: ArenaIndex) -> Option<ArenaIndex> {
    match (self.arena[i].left, self.arena[i].right) {
      (None, None) => {
        self.arena.remove(i);
        None
      }
      (Some(l), None) => {
        self.arena.remove(i);
        Some(l)
      }
      (None, Some(r)) => {
        self.arena.remove(i);
        Some(r)
      }
      (Some(_), Some(r)) => {
        let succ = self.min_index(r);
        let succ_key = self.arena[succ].key.clone();
        let (new_right, _) = self.delete_rec(Some(r), &succ_key);
        self.arena[i].key = succ_key;
        self.arena[i].right = new_right;
        if let Some(nr) = new_right {
          self.set_parent(nr, Some(i));
        }
        self.update_height(i);
        Some(self.rebalance(i))
      }
    }
  }

  /// Swaps the key values held by the nodes currently equal to `a` and `b`,
  /// without otherwise touching the tree's shape.
  ///
  /// Used by the sweep-line status structure when two adjacent segments
  /// cross: the segments' positions in the order reverse, but the *nodes*
  /// that were each other's neighbors stay each other's neighbors, so only
  /// the keys need to change hands.
  pub fn swap_keys(&mut self, a: &K, b: &K) -> Result<(), Error> {
    let ia = self.search(a).ok_or(Error::MissingKey)?;
    let ib = self.search(b).ok_or(Error::MissingKey)?;
    self.arena[ia].key = b.clone();
    self.arena[ib].key = a.clone();
    Ok(())
  }

  fn search(&self, key: &K) -> Option<ArenaIndex> {
    let mut cur = self.root;
    while let Some(i) = cur {
      match self.comparator.compare(key, &self.arena[i].key) {
        Ordering::Equal => return Some(i),
        Ordering::Less => cur = self.arena[i].left,
        Ordering::Greater => cur = self.arena[i].right,
      }
    }
    None
  }

  pub fn contains(&self, key: &K) -> bool {
    self.search(key).is_some()
  }

  /// The in-order predecessor of `key`: if `key` is in the tree, the
  /// largest key less than it; otherwise the largest key less than `key`
  /// among those present.
  pub fn left_neighbor(&self, key: &K) -> Option<&K> {
    let mut comp1 = None;
    let mut comp2 = None;
    let mut cur = self.root;
    while let Some(i) = cur {
      match self.comparator.compare(key, &self.arena[i].key) {
        Ordering::Equal => {
          if let Some(l) = self.arena[i].left {
            comp1 = Some(self.max_index(l));
          }
          break;
        }
        Ordering::Less => cur = self.arena[i].left,
        Ordering::Greater => {
          comp2 = Some(i);
          cur = self.arena[i].right;
        }
      }
    }
    comp1.or(comp2).map(|idx| &self.arena[idx].key)
  }

  /// The in-order successor of `key`; see [`AvlTree::left_neighbor`].
  pub fn right_neighbor(&self, key: &K) -> Option<&K> {
    let mut comp1 = None;
    let mut comp2 = None;
    let mut cur = self.root;
    while let Some(i) = cur {
      match self.comparator.compare(key, &self.arena[i].key) {
        Ordering::Equal => {
          if let Some(r) = self.arena[i].right {
            comp1 = Some(self.min_index(r));
          }
          break;
        }
        Ordering::Greater => cur = self.arena[i].right,
        Ordering::Less => {
          comp2 = Some(i);
          cur = self.arena[i].left;
        }
      }
    }
    comp1.or(comp2).map(|idx| &self.arena[idx].key)
  }

  pub fn in_order(&self) -> Vec<&K> {
    let mut out = Vec::with_capacity(self.size);
    self.in_order_rec(self.root, &mut out);
    out
  }

  fn in_order_rec<'a>(&'a self, idx: Option<ArenaIndex>, out: &mut Vec<&'a K>) {
    if let Some(i) = idx {
      self.in_order_rec(self.arena[i].left, out);
      out.push(&self.arena[i].key);
      self.in_order_rec(self.arena[i].right, out);
    }
  }

  /// Debug invariant check: every subtree's height field is consistent with
  /// its children's, and the AVL balance condition holds everywhere.
  pub fn validate(&self) -> Result<(), Error> {
    self.validate_rec(self.root).map(|_| ())
  }

  fn validate_rec(&self, idx: Option<ArenaIndex>) -> Result<i64, Error> {
    match idx {
      None => Ok(0),
      Some(i) => {
        let lh = self.validate_rec(self.arena[i].left)?;
        let rh = self.validate_rec(self.arena[i].right)?;
        if (lh - rh).abs() > 1 {
          return Err(Error::MalformedTree("balance factor exceeds 1"));
        }
        let expected = 1 + lh.max(rh);
        if expected != self.arena[i].height {
          return Err(Error::MalformedTree("stored height does not match subtree"));
        }
        Ok(expected)
      }
    }
  }

  fn set_parent(&mut self, i: ArenaIndex, parent: Option<ArenaIndex>) {
    self.arena[i].parent = parent;
  }

  fn height(&self, idx: Option<ArenaIndex>) -> i64 {
    idx.map(|i| self.arena[i].height).unwrap_or(0)
  }

  fn update_height(&mut self, i: ArenaIndex) {
    let h = 1 + self.height(self.arena[i].left).max(self.height(self.arena[i].right));
    self.arena[i].height = h;
  }

  fn balance_factor(&self, i: ArenaIndex) -> i64 {
    self.height(self.arena[i].left) - self.height(self.arena[i].right)
  }

  fn min_index(&self, mut i: ArenaIndex) -> ArenaIndex {
    while let Some(l) = self.arena[i].left {
      i = l;
    }
    i
  }

  fn max_index(&self, mut i: ArenaIndex) -> ArenaIndex {
    while let Some(r) = self.arena[i].right {
      i = r;
    }
    i
  }

  fn rotate_left(&mut self, x: ArenaIndex) -> ArenaIndex {
    let y = self.arena[x].right.expect("rotate_left requires a right child");
    let t2 = self.arena[y].left;
    self.arena[x].right = t2;
    if let Some(t2i) = t2 {
      self.set_parent(t2i, Some(x));
    }
    self.arena[y].left = Some(x);
    let x_parent = self.arena[x].parent;
    self.arena[y].parent = x_parent;
    self.arena[x].parent = Some(y);
    self.update_height(x);
    self.update_height(y);
    y
  }

  fn rotate_right(&mut self, x: ArenaIndex) -> ArenaIndex {
    let y = self.arena[x].left.expect("rotate_right requires a left child");
    let t2 = self.arena[y].right;
    self.arena[x].left = t2;
    if let Some(t2i) = t2 {
      self.set_parent(t2i, Some(x));
    }
    self.arena[y].right = Some(x);
    let x_parent = self.arena[x].parent;
    self.arena[y].parent = x_parent;
    self.arena[x].parent = Some(y);
    self.update_height(x);
    self.update_height(y);
    y
  }

  fn rebalance(&mut self, i: ArenaIndex) -> ArenaIndex {
    let bf = self.balance_factor(i);
    if bf > 1 {
      let left = self.arena[i].left.unwrap();
      if self.balance_factor(left) < 0 {
        let new_left = self.rotate_left(left);
        self.arena[i].left = Some(new_left);
        self.set_parent(new_left, Some(i));
      }
      self.rotate_right(i)
    } else if bf < -1 {
      let right = self.arena[i].right.unwrap();
      if self.balance_factor(right) > 0 {
        let new_right = self.rotate_right(right);
        self.arena[i].right = Some(new_right);
        self.set_parent(new_right, Some(i));
      }
      self.rotate_left(i)
    } else {
      i
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct NumericComparator;
  impl Comparator<i32> for NumericComparator {
    fn compare(&self, a: &i32, b: &i32) -> Ordering {
      a.cmp(b)
    }
  }

  fn naive_left_neighbor(present: &[i32], key: i32) -> Option<i32> {
    present.iter().copied().filter(|&k| k < key).max()
  }

  fn naive_right_neighbor(present: &[i32], key: i32) -> Option<i32> {
    present.iter().copied().filter(|&k| k > key).min()
  }

  #[test]
  fn insert_rejects_duplicates_without_growing_size() {
    let mut tree = AvlTree::new(NumericComparator);
    tree.insert(5).unwrap();
    assert_eq!(tree.insert(5), Err(Error::DuplicateKey));
    assert_eq!(tree.len(), 1);
  }

  #[test]
  fn neighbors_match_naive_search_over_random_permutation() {
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    let mut rng = rand::rngs::SmallRng::seed_from_u64(42);
    let mut values: Vec<i32> = (0..500).collect();
    values.shuffle(&mut rng);

    let mut tree = AvlTree::new(NumericComparator);
    let mut present = Vec::new();
    for &v in &values {
      tree.insert(v).unwrap();
      present.push(v);
      tree.validate().unwrap();
      for &probe in &[v, v + 1, v - 1] {
        assert_eq!(tree.left_neighbor(&probe).copied(), naive_left_neighbor(&present, probe));
        assert_eq!(tree.right_neighbor(&probe).copied(), naive_right_neighbor(&present, probe));
      }
    }
  }

  #[test]
  fn delete_maintains_balance_and_order() {
    let mut tree = AvlTree::new(NumericComparator);
    for v in [5, 3, 8, 1, 4, 7, 9, 2, 6, 0] {
      tree.insert(v).unwrap();
    }
    tree.delete(&8).unwrap();
    tree.validate().unwrap();
    assert_eq!(tree.in_order(), vec![&0, &1, &2, &3, &4, &5, &6, &7, &9]);
    assert_eq!(tree.delete(&100), Err(Error::MissingKey));
  }

  #[test]
  fn swap_keys_exchanges_without_reshaping() {
    let mut tree = AvlTree::new(NumericComparator);
    for v in [10, 20, 30] {
      tree.insert(v).unwrap();
    }
    tree.swap_keys(&10, &20).unwrap();
    assert!(tree.contains(&20));
    assert!(tree.contains(&10));
    tree.validate().unwrap();
  }
}
