//! Debug printer for the operation tree.

use std::fmt::Debug;

use crate::node::NIL;
use crate::tree::OpTree;

impl<T: Debug> OpTree<T> {
    /// Recursive dump of the tree with raw (unpushed) keys, for
    /// debugging only.
    pub fn print(&self) -> String {
        self.print_node(self.root, "")
    }

    fn print_node(&self, n: u32, tab: &str) -> String {
        if n == NIL {
            return "∅".to_string();
        }
        let node = self.node(n);
        let color = if node.black { "black" } else { "red" };
        let left = self.print_node(node.l, &format!("{tab}  "));
        let right = self.print_node(node.r, &format!("{tab}  "));
        format!(
            "Node[{n}] {color} {{ key: {}, shift: {}, balance: {}, {:?} }}\n{tab}L={left}\n{tab}R={right}",
            node.key, node.shift, node.balance, node.slot
        )
    }
}
