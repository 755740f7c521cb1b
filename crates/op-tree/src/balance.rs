//! Rotations and red-black repair.
//!
//! Every rotation pushes the lazy shift out of both pivots before
//! relinking, then re-derives their subtree balances from the new child
//! subtrees. The delete fix-up tracks the spliced child's parent
//! explicitly because the replacing child may be the sentinel, whose
//! parent link is never written.

use crate::error::TreeError;
use crate::node::NIL;
use crate::tree::OpTree;

impl<T> OpTree<T> {
    /// Left rotation promoting `right(x)`.
    pub(crate) fn rotate_left(&mut self, x: u32) -> Result<(), TreeError> {
        let y = self.r(x);
        if x == NIL || y == NIL {
            return Err(TreeError::RotateSentinel);
        }
        self.push_down(x);
        self.push_down(y);
        let bx = self.node(x).balance;
        let by = self.node(y).balance;
        let byl = self.node(self.l(y)).balance;
        self.set_balance(x, bx + byl - by);
        self.set_balance(y, bx);
        let yl = self.l(y);
        self.set_r(x, yl);
        self.set_p(yl, x);
        let p = self.p(x);
        self.set_p(y, p);
        if p == NIL {
            self.root = y;
        } else if self.l(p) == x {
            self.set_l(p, y);
        } else {
            self.set_r(p, y);
        }
        self.set_l(y, x);
        self.set_p(x, y);
        Ok(())
    }

    /// Right rotation promoting `left(x)`.
    pub(crate) fn rotate_right(&mut self, x: u32) -> Result<(), TreeError> {
        let y = self.l(x);
        if x == NIL || y == NIL {
            return Err(TreeError::RotateSentinel);
        }
        self.push_down(x);
        self.push_down(y);
        let bx = self.node(x).balance;
        let by = self.node(y).balance;
        let byr = self.node(self.r(y)).balance;
        self.set_balance(x, bx + byr - by);
        self.set_balance(y, bx);
        let yr = self.r(y);
        self.set_l(x, yr);
        self.set_p(yr, x);
        let p = self.p(x);
        self.set_p(y, p);
        if p == NIL {
            self.root = y;
        } else if self.l(p) == x {
            self.set_l(p, y);
        } else {
            self.set_r(p, y);
        }
        self.set_r(y, x);
        self.set_p(x, y);
        Ok(())
    }

    pub(crate) fn fix_insert(&mut self, mut z: u32) -> Result<(), TreeError> {
        while !self.is_black(self.p(z)) {
            let p = self.p(z);
            let g = self.p(p);
            if self.l(g) == p {
                let u = self.r(g);
                if !self.is_black(u) {
                    self.set_black(p, true);
                    self.set_black(u, true);
                    self.set_black(g, false);
                    z = g;
                } else {
                    if self.r(p) == z {
                        z = p;
                        self.rotate_left(z)?;
                    }
                    let p = self.p(z);
                    let g = self.p(p);
                    self.set_black(p, true);
                    self.set_black(g, false);
                    self.rotate_right(g)?;
                }
            } else {
                let u = self.l(g);
                if !self.is_black(u) {
                    self.set_black(p, true);
                    self.set_black(u, true);
                    self.set_black(g, false);
                    z = g;
                } else {
                    if self.l(p) == z {
                        z = p;
                        self.rotate_right(z)?;
                    }
                    let p = self.p(z);
                    let g = self.p(p);
                    self.set_black(p, true);
                    self.set_black(g, false);
                    self.rotate_left(g)?;
                }
            }
        }
        let root = self.root;
        self.set_black(root, true);
        Ok(())
    }

    /// Removes `z` from the tree, keeping colors, keys and balances
    /// consistent. In the two-children case the in-order successor's key
    /// and operations move into `z` and the successor is spliced out.
    pub(crate) fn delete_node(&mut self, z: u32) -> Result<(), TreeError> {
        self.push_down(z);
        let victim = if self.l(z) != NIL && self.r(z) != NIL {
            let s = self.scan_min(self.r(z));
            if self.node(z).shift != 0 {
                return Err(TreeError::StaleShiftInDelete(z));
            }
            if self.node(s).shift != 0 {
                return Err(TreeError::StaleShiftInDelete(s));
            }
            let w_z = self.node(z).weight();
            let w_s = self.node(s).weight();
            let key = self.node(s).key;
            let slot = self.take_slot(s);
            self.set_key(z, key);
            self.set_slot(z, slot);
            self.propagate_balance(z, w_s - w_z);
            self.propagate_balance(s, -w_s);
            s
        } else {
            let w_z = self.node(z).weight();
            self.propagate_balance(z, -w_z);
            z
        };
        self.splice(victim)
    }

    /// Replaces `n` (which has at most one live child) by that child.
    fn splice(&mut self, n: u32) -> Result<(), TreeError> {
        let l = self.l(n);
        let child = if l != NIL { l } else { self.r(n) };
        let p = self.p(n);
        self.set_p(child, p);
        if p == NIL {
            self.root = child;
        } else if self.l(p) == n {
            self.set_l(p, child);
        } else {
            self.set_r(p, child);
        }
        let was_black = self.is_black(n);
        self.free_node(n);
        if was_black {
            if child != NIL && !self.is_black(child) {
                self.set_black(child, true);
            } else if self.root != NIL {
                self.fix_delete(child, p)?;
            }
        }
        Ok(())
    }

    fn fix_delete(&mut self, mut x: u32, mut p: u32) -> Result<(), TreeError> {
        while x != self.root && self.is_black(x) {
            if self.l(p) == x {
                let mut s = self.r(p);
                if !self.is_black(s) {
                    self.set_black(s, true);
                    self.set_black(p, false);
                    self.rotate_left(p)?;
                    s = self.r(p);
                }
                if self.is_black(self.l(s)) && self.is_black(self.r(s)) {
                    self.set_black(s, false);
                    x = p;
                    p = self.p(x);
                } else {
                    if self.is_black(self.r(s)) {
                        let sl = self.l(s);
                        self.set_black(sl, true);
                        self.set_black(s, false);
                        self.rotate_right(s)?;
                        s = self.r(p);
                    }
                    let parent_black = self.is_black(p);
                    self.set_black(s, parent_black);
                    self.set_black(p, true);
                    let sr = self.r(s);
                    self.set_black(sr, true);
                    self.rotate_left(p)?;
                    x = self.root;
                    p = NIL;
                }
            } else {
                let mut s = self.l(p);
                if !self.is_black(s) {
                    self.set_black(s, true);
                    self.set_black(p, false);
                    self.rotate_right(p)?;
                    s = self.l(p);
                }
                if self.is_black(self.l(s)) && self.is_black(self.r(s)) {
                    self.set_black(s, false);
                    x = p;
                    p = self.p(x);
                } else {
                    if self.is_black(self.l(s)) {
                        let sr = self.r(s);
                        self.set_black(sr, true);
                        self.set_black(s, false);
                        self.rotate_left(s)?;
                        s = self.l(p);
                    }
                    let parent_black = self.is_black(p);
                    self.set_black(s, parent_black);
                    self.set_black(p, true);
                    let sl = self.l(s);
                    self.set_black(sl, true);
                    self.rotate_right(p)?;
                    x = self.root;
                    p = NIL;
                }
            }
        }
        self.set_black(x, true);
        Ok(())
    }
}
