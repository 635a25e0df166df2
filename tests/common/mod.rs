//! Shared test utilities for integration tests.
//!
//! This module provides the farm fixture used across test files: a small
//! document tree with one `cow`, two `pig`s and one `goat`, all marked via
//! the default `ref` attribute.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then build the fixture:
//!
//! ```rust,ignore
//! mod common;
//! use common::FarmFixture;
//!
//! #[test]
//! fn test_example() {
//!     let farm = FarmFixture::new();
//!     // ... test code
//! }
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use treeref::tree::{ElementTree, NodeId};

/// The farm scenario: a root containing a `farm` element whose children are
/// one cow, two pigs and one goat. The farm element itself carries
/// `ref="farm"`.
#[allow(dead_code)]
pub struct FarmFixture {
    pub doc: Rc<RefCell<ElementTree>>,
    pub root: NodeId,
    pub farm: NodeId,
    pub cow: NodeId,
    pub pigs: [NodeId; 2],
    pub goat: NodeId,
}

#[allow(dead_code)]
impl FarmFixture {
    pub fn new() -> Self {
        let mut tree = ElementTree::new();
        let root = tree.create_element("root");
        let farm = tree.create_element_with("farm", &[("ref", "farm")]);
        let cow = tree.create_element_with("animal", &[("ref", "cow")]);
        let pig_a = tree.create_element_with("animal", &[("ref", "pig")]);
        let pig_b = tree.create_element_with("animal", &[("ref", "pig")]);
        let goat = tree.create_element_with("animal", &[("ref", "goat")]);

        tree.append(root, farm).expect("attach farm");
        for animal in [cow, pig_a, pig_b, goat] {
            tree.append(farm, animal).expect("attach animal");
        }

        Self {
            doc: Rc::new(RefCell::new(tree)),
            root,
            farm,
            cow,
            pigs: [pig_a, pig_b],
            goat,
        }
    }

    /// Detach the goat and attach a replacement carrying the same marker.
    pub fn replace_goat(&self) -> NodeId {
        let mut tree = self.doc.borrow_mut();
        tree.detach(self.goat);
        let replacement = tree.create_element_with("animal", &[("ref", "goat")]);
        tree.append(self.farm, replacement).expect("attach replacement");
        replacement
    }
}
