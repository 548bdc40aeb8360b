//! `OrderedMap`, the insertion-ordered map backing `JsonValue::Object`.
//!
//! Mirrors `LinkedHashMap`'s internal shape rather than a flat hash
//! index: each bucket of the hash table roots an AVL tree keyed by the
//! natural (`Ord`) comparator on the key, and a doubly linked list
//! threaded through every node carries the insertion order independent
//! of however the buckets get rearranged by a resize. Node identity
//! (its slot in the arena) is what the linked list tracks, so AVL
//! rebalancing and rehashing never have to touch `prev`/`next`.

use fxhash::FxHasher;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

const INITIAL_BUCKETS: usize = 8;
const LOAD_FACTOR_NUM: usize = 3;
const LOAD_FACTOR_DEN: usize = 4;

#[derive(Debug, Clone)]
struct Node<V> {
    key: String,
    value: V,
    hash: u64,
    left: Option<usize>,
    right: Option<usize>,
    height: u8,
    prev: Option<usize>,
    next: Option<usize>,
}

/// A `String`-keyed map that iterates in insertion order.
/// Re-inserting an existing key updates its value in place without
/// moving it to the end, matching `LinkedHashMap`'s default
/// (non-access-order) behavior.
#[derive(Debug, Clone)]
pub struct OrderedMap<V> {
    nodes: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    buckets: Vec<Option<usize>>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        OrderedMap {
            nodes: Vec::new(),
            free: Vec::new(),
            buckets: vec![None; INITIAL_BUCKETS],
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let idx = self.find(key)?;
        Some(&self.nodes[idx].as_ref().unwrap().value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let idx = self.find(key)?;
        Some(&mut self.nodes[idx].as_mut().unwrap().value)
    }

    /// Inserts `value` under `key`, returning the prior value if the key
    /// was already present. A re-inserted key keeps its original
    /// position in iteration order.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        let hash = hash_of(&key);
        let bucket = bucket_of(hash, self.buckets.len());
        if let Some(idx) = self.avl_find(self.buckets[bucket], &key) {
            let slot = self.nodes[idx].as_mut().unwrap();
            return Some(std::mem::replace(&mut slot.value, value));
        }

        self.maybe_grow();
        let bucket = bucket_of(hash, self.buckets.len());
        let node = Node {
            key,
            value,
            hash,
            left: None,
            right: None,
            height: 1,
            prev: None,
            next: None,
        };
        let idx = self.allocate(node);
        self.buckets[bucket] = Some(self.avl_insert(self.buckets[bucket], idx));
        self.link_at_tail(idx);
        self.len += 1;
        None
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        let hash = hash_of(key);
        let bucket = bucket_of(hash, self.buckets.len());
        let root = self.buckets[bucket]?;
        self.avl_find(Some(root), key)?;
        let (new_root, removed) = self.avl_delete(root, key);
        self.buckets[bucket] = new_root;
        self.unlink(removed);
        self.len -= 1;
        let node = self.nodes[removed].take().unwrap();
        self.free.push(removed);
        Some(node.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        Iter {
            map: self,
            cur: self.head,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    fn find(&self, key: &str) -> Option<usize> {
        let hash = hash_of(key);
        let bucket = bucket_of(hash, self.buckets.len());
        self.avl_find(self.buckets[bucket], key)
    }

    fn avl_find(&self, root: Option<usize>, key: &str) -> Option<usize> {
        let mut cur = root;
        while let Some(idx) = cur {
            let node = self.nodes[idx].as_ref().unwrap();
            cur = match key.cmp(node.key.as_str()) {
                Ordering::Equal => return Some(idx),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        None
    }

    /// Inserts arena slot `idx` (whose key is known absent from this
    /// subtree — callers check via `avl_find` first) and returns the
    /// rebalanced subtree root.
    fn avl_insert(&mut self, root: Option<usize>, idx: usize) -> usize {
        let Some(root_idx) = root else { return idx };
        let new_key = self.nodes[idx].as_ref().unwrap().key.as_str().to_owned();
        let root_key = self.nodes[root_idx].as_ref().unwrap().key.as_str();
        if new_key.as_str() < root_key {
            let left = self.nodes[root_idx].as_ref().unwrap().left;
            let new_left = self.avl_insert(left, idx);
            self.nodes[root_idx].as_mut().unwrap().left = Some(new_left);
        } else {
            let right = self.nodes[root_idx].as_ref().unwrap().right;
            let new_right = self.avl_insert(right, idx);
            self.nodes[root_idx].as_mut().unwrap().right = Some(new_right);
        }
        self.rebalance(root_idx)
    }

    /// Deletes `key` from the subtree rooted at `root` (which must
    /// contain it). Returns the new subtree root and the arena index
    /// that was logically removed — physically spliced out of the tree
    /// rather than overwritten, so the doubly linked list can unlink it
    /// by identity afterward.
    fn avl_delete(&mut self, root: usize, key: &str) -> (Option<usize>, usize) {
        match key.cmp(self.nodes[root].as_ref().unwrap().key.as_str()) {
            Ordering::Less => {
                let left = self.nodes[root].as_ref().unwrap().left.unwrap();
                let (new_left, removed) = self.avl_delete(left, key);
                self.nodes[root].as_mut().unwrap().left = new_left;
                (Some(self.rebalance(root)), removed)
            }
            Ordering::Greater => {
                let right = self.nodes[root].as_ref().unwrap().right.unwrap();
                let (new_right, removed) = self.avl_delete(right, key);
                self.nodes[root].as_mut().unwrap().right = new_right;
                (Some(self.rebalance(root)), removed)
            }
            Ordering::Equal => {
                let left = self.nodes[root].as_ref().unwrap().left;
                let right = self.nodes[root].as_ref().unwrap().right;
                match (left, right) {
                    (None, None) => (None, root),
                    (Some(l), None) => (Some(l), root),
                    (None, Some(r)) => (Some(r), root),
                    (Some(l), Some(r)) => {
                        let (new_right, successor) = self.splice_leftmost(r);
                        self.nodes[successor].as_mut().unwrap().left = Some(l);
                        self.nodes[successor].as_mut().unwrap().right = new_right;
                        (Some(self.rebalance(successor)), root)
                    }
                }
            }
        }
    }

    /// Removes the leftmost node of the subtree rooted at `root`
    /// without touching its key/value, returning the rebalanced subtree
    /// and the leftmost node's index so a caller can splice it in
    /// elsewhere.
    fn splice_leftmost(&mut self, root: usize) -> (Option<usize>, usize) {
        match self.nodes[root].as_ref().unwrap().left {
            None => (self.nodes[root].as_ref().unwrap().right, root),
            Some(l) => {
                let (new_left, leftmost) = self.splice_leftmost(l);
                self.nodes[root].as_mut().unwrap().left = new_left;
                (Some(self.rebalance(root)), leftmost)
            }
        }
    }

    fn height(&self, idx: Option<usize>) -> i32 {
        idx.map(|i| self.nodes[i].as_ref().unwrap().height as i32)
            .unwrap_or(0)
    }

    fn update_height(&mut self, idx: usize) {
        let (left, right) = {
            let node = self.nodes[idx].as_ref().unwrap();
            (node.left, node.right)
        };
        let h = 1 + self.height(left).max(self.height(right));
        self.nodes[idx].as_mut().unwrap().height = h as u8;
    }

    fn balance_factor(&self, idx: usize) -> i32 {
        let node = self.nodes[idx].as_ref().unwrap();
        self.height(node.left) - self.height(node.right)
    }

    fn rebalance(&mut self, idx: usize) -> usize {
        self.update_height(idx);
        let balance = self.balance_factor(idx);
        if balance > 1 {
            let left = self.nodes[idx].as_ref().unwrap().left.unwrap();
            if self.balance_factor(left) < 0 {
                let new_left = self.rotate_left(left);
                self.nodes[idx].as_mut().unwrap().left = Some(new_left);
            }
            return self.rotate_right(idx);
        }
        if balance < -1 {
            let right = self.nodes[idx].as_ref().unwrap().right.unwrap();
            if self.balance_factor(right) > 0 {
                let new_right = self.rotate_right(right);
                self.nodes[idx].as_mut().unwrap().right = Some(new_right);
            }
            return self.rotate_left(idx);
        }
        idx
    }

    fn rotate_left(&mut self, idx: usize) -> usize {
        let pivot = self.nodes[idx].as_ref().unwrap().right.unwrap();
        let pivot_left = self.nodes[pivot].as_ref().unwrap().left;
        self.nodes[idx].as_mut().unwrap().right = pivot_left;
        self.nodes[pivot].as_mut().unwrap().left = Some(idx);
        self.update_height(idx);
        self.update_height(pivot);
        pivot
    }

    fn rotate_right(&mut self, idx: usize) -> usize {
        let pivot = self.nodes[idx].as_ref().unwrap().left.unwrap();
        let pivot_right = self.nodes[pivot].as_ref().unwrap().right;
        self.nodes[idx].as_mut().unwrap().left = pivot_right;
        self.nodes[pivot].as_mut().unwrap().right = Some(idx);
        self.update_height(idx);
        self.update_height(pivot);
        pivot
    }

    fn allocate(&mut self, node: Node<V>) -> usize {
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = Some(node);
            idx
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        }
    }

    fn link_at_tail(&mut self, idx: usize) {
        {
            let node = self.nodes[idx].as_mut().unwrap();
            node.prev = self.tail;
            node.next = None;
        }
        match self.tail {
            Some(t) => self.nodes[t].as_mut().unwrap().next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.nodes[idx].as_ref().unwrap();
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.nodes[p].as_mut().unwrap().next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].as_mut().unwrap().prev = prev,
            None => self.tail = prev,
        }
    }

    fn maybe_grow(&mut self) {
        if (self.len + 1) * LOAD_FACTOR_DEN > self.buckets.len() * LOAD_FACTOR_NUM {
            self.rehash(self.buckets.len() * 2);
        }
    }

    /// Doubles the bucket table. Each old bucket's AVL subtree is
    /// walked in sorted (in-order) order, partitioned into the entries
    /// that keep their bucket and the ones that move to `old_cap +
    /// bucket` (the standard hash-resize split, decided by the newly
    /// significant bit of the hash), and each partition is rebuilt
    /// bottom-up into a minimal-height AVL tree from its already-sorted
    /// sequence. Node identities — and therefore the linked list that
    /// carries insertion order — are untouched.
    fn rehash(&mut self, new_len: usize) {
        let old_cap = self.buckets.len();
        let old_buckets = std::mem::replace(&mut self.buckets, vec![None; new_len]);
        for (b, root) in old_buckets.into_iter().enumerate() {
            let Some(root) = root else { continue };
            let mut sorted = Vec::new();
            self.inorder(root, &mut sorted);
            let mut low = Vec::new();
            let mut high = Vec::new();
            for idx in sorted {
                let hash = self.nodes[idx].as_ref().unwrap().hash;
                if hash as usize & old_cap == 0 {
                    low.push(idx);
                } else {
                    high.push(idx);
                }
            }
            self.buckets[b] = self.build_balanced(&low);
            self.buckets[b + old_cap] = self.build_balanced(&high);
        }
    }

    fn inorder(&self, root: usize, out: &mut Vec<usize>) {
        let (left, right) = {
            let node = self.nodes[root].as_ref().unwrap();
            (node.left, node.right)
        };
        if let Some(l) = left {
            self.inorder(l, out);
        }
        out.push(root);
        if let Some(r) = right {
            self.inorder(r, out);
        }
    }

    fn build_balanced(&mut self, sorted: &[usize]) -> Option<usize> {
        if sorted.is_empty() {
            return None;
        }
        let mid = sorted.len() / 2;
        let root = sorted[mid];
        let left = self.build_balanced(&sorted[..mid]);
        let right = self.build_balanced(&sorted[mid + 1..]);
        {
            let node = self.nodes[root].as_mut().unwrap();
            node.left = left;
            node.right = right;
        }
        self.update_height(root);
        Some(root)
    }
}

struct Iter<'a, V> {
    map: &'a OrderedMap<V>,
    cur: Option<usize>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cur?;
        let node = self.map.nodes[idx].as_ref().unwrap();
        self.cur = node.next;
        Some((node.key.as_str(), &node.value))
    }
}

fn hash_of(key: &str) -> u64 {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

fn bucket_of(hash: u64, buckets_len: usize) -> usize {
    (hash as usize) % buckets_len
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<'a, V> IntoIterator for &'a OrderedMap<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a V)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
