//! The chart of accounts, stored as an arena.
//!
//! Accounts form a tree rooted at a single unnamed node. Nodes are addressed
//! by [`AccountId`] indices into the arena; a node records its parent index
//! and its children, so there are no shared back pointers. Parents are
//! always created before their children, which makes the tree acyclic by
//! construction and lets post-order folds run over plain index ranges.

use serde::{Deserialize, Serialize};

use crate::balance::Balance;
use crate::intern::Symbol;

/// Index of an account in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub usize);

/// One node of the account tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Fully qualified name, e.g. `Expenses:Food`. Empty for the root.
    pub full_name: Symbol,
    /// Final name segment, e.g. `Food`.
    pub name: String,
    /// Parent index; `None` only for the root.
    pub parent: Option<AccountId>,
    /// Child indices in creation order.
    pub children: Vec<AccountId>,
    /// Accumulated value including descendants. Recomputed per report.
    #[serde(skip)]
    pub total: Balance,
    /// Accumulated value of directly attached postings only.
    #[serde(skip)]
    pub self_total: Balance,
}

impl Account {
    /// Depth below the root (root is 0).
    pub fn depth(&self) -> usize {
        if self.full_name.is_empty() {
            0
        } else {
            self.full_name.matches(':').count() + 1
        }
    }
}

/// Arena-backed account tree with exactly one root at index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountTree {
    nodes: Vec<Account>,
}

impl AccountTree {
    /// Create a tree holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Account {
                full_name: Symbol::from(""),
                name: String::new(),
                parent: None,
                children: Vec::new(),
                total: Balance::new(),
                self_total: Balance::new(),
            }],
        }
    }

    /// The root account.
    pub const fn root(&self) -> AccountId {
        AccountId(0)
    }

    /// Number of accounts, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Borrow an account.
    pub fn get(&self, id: AccountId) -> &Account {
        &self.nodes[id.0]
    }

    /// Borrow an account mutably.
    pub fn get_mut(&mut self, id: AccountId) -> &mut Account {
        &mut self.nodes[id.0]
    }

    /// Look up an account by fully qualified name.
    pub fn find(&self, full_name: &str) -> Option<AccountId> {
        self.nodes
            .iter()
            .position(|a| a.full_name == full_name)
            .map(AccountId)
    }

    /// Find an account by colon-separated path, creating missing segments.
    pub fn find_or_create(&mut self, full_name: &str) -> AccountId {
        let mut current = self.root();
        if full_name.is_empty() {
            return current;
        }
        let mut path = String::new();
        for segment in full_name.split(':') {
            if !path.is_empty() {
                path.push(':');
            }
            path.push_str(segment);
            current = match self.child_named(current, segment) {
                Some(child) => child,
                None => {
                    let id = AccountId(self.nodes.len());
                    self.nodes.push(Account {
                        full_name: Symbol::from(path.as_str()),
                        name: segment.to_string(),
                        parent: Some(current),
                        children: Vec::new(),
                        total: Balance::new(),
                        self_total: Balance::new(),
                    });
                    self.nodes[current.0].children.push(id);
                    id
                }
            };
        }
        current
    }

    fn child_named(&self, parent: AccountId, name: &str) -> Option<AccountId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c.0].name == name)
    }

    /// Iterate every account id in arena (creation) order.
    pub fn ids(&self) -> impl Iterator<Item = AccountId> {
        (0..self.nodes.len()).map(AccountId)
    }

    /// Zero every account's accumulated values.
    pub fn clear_totals(&mut self) {
        for node in &mut self.nodes {
            node.total = Balance::new();
            node.self_total = Balance::new();
        }
    }

    /// Fold each child's `total` into its parent, post-order.
    ///
    /// Children always have larger indices than their parents, so a single
    /// reverse index sweep visits every child before its parent.
    pub fn sum_children_into_parents(&mut self) {
        for idx in (0..self.nodes.len()).rev() {
            let own = self.nodes[idx].self_total.clone();
            self.nodes[idx].total.add_balance(&own);
            if let Some(parent) = self.nodes[idx].parent {
                let child_total = self.nodes[idx].total.clone();
                self.nodes[parent.0].total.add_balance(&child_total);
            }
        }
    }
}

impl Default for AccountTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use rust_decimal_macros::dec;

    #[test]
    fn test_find_or_create_builds_path() {
        let mut tree = AccountTree::new();
        let food = tree.find_or_create("Expenses:Food");
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get(food).full_name, "Expenses:Food");
        assert_eq!(tree.get(food).name, "Food");

        let expenses = tree.get(food).parent.unwrap();
        assert_eq!(tree.get(expenses).full_name, "Expenses");
        assert_eq!(tree.get(expenses).parent, Some(tree.root()));

        // Idempotent
        assert_eq!(tree.find_or_create("Expenses:Food"), food);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_parent_index_precedes_child() {
        let mut tree = AccountTree::new();
        tree.find_or_create("A:B:C");
        tree.find_or_create("A:D");
        for id in tree.ids() {
            if let Some(parent) = tree.get(id).parent {
                assert!(parent.0 < id.0);
            }
        }
    }

    #[test]
    fn test_depth() {
        let mut tree = AccountTree::new();
        let c = tree.find_or_create("A:B:C");
        assert_eq!(tree.get(tree.root()).depth(), 0);
        assert_eq!(tree.get(c).depth(), 3);
    }

    #[test]
    fn test_sum_children_into_parents() {
        let mut tree = AccountTree::new();
        let food = tree.find_or_create("Expenses:Food");
        let rent = tree.find_or_create("Expenses:Rent");
        tree.get_mut(food)
            .self_total
            .add_amount(&Amount::new(dec!(15), "USD"));
        tree.get_mut(rent)
            .self_total
            .add_amount(&Amount::new(dec!(100), "USD"));

        tree.sum_children_into_parents();

        let expenses = tree.find("Expenses").unwrap();
        assert_eq!(
            tree.get(expenses).total.amount("USD").unwrap().number,
            dec!(115)
        );
        assert_eq!(
            tree.get(tree.root()).total.amount("USD").unwrap().number,
            dec!(115)
        );
        assert_eq!(tree.get(food).total.amount("USD").unwrap().number, dec!(15));
    }
}
