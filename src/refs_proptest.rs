//! Property-based tests for the reference-resolution engine.
//!
//! These tests use proptest to generate random trees and verify that
//! resolution invariants hold for all possible shapes.

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use crate::config::Options;
    use crate::document::Document;
    use crate::refs::Refs;
    use crate::selector::Selector;
    use crate::tree::{ElementTree, NodeId};

    /// Blueprint entry: parent picked among already-created nodes, plus
    /// whether the node carries the `ref="target"` marker.
    fn tree_blueprint() -> impl Strategy<Value = Vec<(prop::sample::Index, bool)>> {
        prop::collection::vec((any::<prop::sample::Index>(), any::<bool>()), 0..24)
    }

    struct Built {
        doc: Rc<RefCell<ElementTree>>,
        root: NodeId,
        nodes: Vec<NodeId>,
        marked: Vec<NodeId>,
    }

    fn build(blueprint: &[(prop::sample::Index, bool)]) -> Built {
        let mut tree = ElementTree::new();
        let root = tree.create_element("root");
        let mut nodes = vec![root];
        for (parent_index, marked) in blueprint {
            let parent = nodes[parent_index.index(nodes.len())];
            let node = tree.create_element("div");
            if *marked {
                tree.set_attribute(node, "ref", "target");
            }
            tree.append(parent, node).expect("fresh node cannot form a cycle");
            nodes.push(node);
        }
        let marked = tree
            .descendants(root)
            .into_iter()
            .filter(|node| tree.attribute(*node, "ref") == Some("target"))
            .collect();
        Built {
            doc: Rc::new(RefCell::new(tree)),
            root,
            nodes,
            marked,
        }
    }

    // ============================================================================
    // Resolution order properties
    // ============================================================================

    proptest! {
        /// Property: a list read returns every marked node in document order
        #[test]
        fn list_read_matches_document_order(blueprint in tree_blueprint()) {
            let built = build(&blueprint);
            let refs = Refs::new(built.doc, built.root, Options::new());
            prop_assert_eq!(refs.list().get("target").nodes(), built.marked);
        }

        /// Property: a singular read is exactly the first element of the list read
        #[test]
        fn singular_read_is_first_of_list(blueprint in tree_blueprint()) {
            let built = build(&blueprint);
            let refs = Refs::new(built.doc, built.root, Options::new());
            prop_assert_eq!(refs.get("target").node(), built.marked.first().copied());
        }

        /// Property: absence surfaces as an empty list, never a failure
        #[test]
        fn unmatched_names_resolve_empty(blueprint in tree_blueprint()) {
            let built = build(&blueprint);
            let refs = Refs::new(built.doc, built.root, Options::new());
            prop_assert!(!refs.get("no-such-name").is_present());
            prop_assert!(refs.list().get("no-such-name").nodes().is_empty());
        }
    }

    // ============================================================================
    // Caching properties
    // ============================================================================

    proptest! {
        /// Property: a valid cached name is not re-resolved; an absent one is
        /// re-resolved on every read
        #[test]
        fn cached_reads_do_not_re_resolve(blueprint in tree_blueprint()) {
            let built = build(&blueprint);
            let calls = Rc::new(Cell::new(0usize));
            let counter = Rc::clone(&calls);
            let options: Options<ElementTree> = Options::new().with_single_query(Rc::new(
                move |doc: &ElementTree, root: NodeId, selector: &Selector| {
                    counter.set(counter.get() + 1);
                    doc.query_first(root, selector)
                },
            ));
            let refs = Refs::new(built.doc, built.root, options);

            let first = refs.get("target").node();
            let second = refs.get("target").node();
            prop_assert_eq!(first, second);
            if built.marked.is_empty() {
                prop_assert_eq!(calls.get(), 2);
            } else {
                prop_assert_eq!(calls.get(), 1);
            }
        }
    }

    // ============================================================================
    // Scoping properties
    // ============================================================================

    proptest! {
        /// Property: a scoped read only ever yields strict descendants of the
        /// scope root, and agrees with filtering the subtree manually
        #[test]
        fn scoped_reads_stay_inside_subtree(
            blueprint in tree_blueprint(),
            pick in any::<prop::sample::Index>(),
        ) {
            let built = build(&blueprint);
            let scope_root = built.nodes[pick.index(built.nodes.len())];

            let expected: Vec<NodeId> = {
                let tree = built.doc.borrow();
                tree.descendants(scope_root)
                    .into_iter()
                    .filter(|node| tree.attribute(*node, "ref") == Some("target"))
                    .collect()
            };

            let refs = Refs::new(Rc::clone(&built.doc), built.root, Options::new());
            let scoped = refs.scope(scope_root).list().get("target").nodes();

            {
                let tree = built.doc.borrow();
                for node in &scoped {
                    prop_assert!(tree.contains(scope_root, *node));
                }
            }
            prop_assert_eq!(scoped, expected);
        }
    }
}
