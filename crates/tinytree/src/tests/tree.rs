// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Error;
use crate::node::Node;
use crate::op::Operation;
use crate::tree::Tree;

use std::sync::Arc;
use std::thread;

fn geese() -> Tree {
    Tree::new(Node::dir([(
        "geese",
        Node::dir([("goose", Node::value("honk"))]),
    )]))
    .unwrap()
}

#[test]
fn test_add_creates_node() {
    let tree = Tree::empty();
    tree.put("/child", Some(Node::value("something"))).unwrap();

    assert_eq!(
        tree.root(),
        Node::dir([("child", Node::value("something"))])
    );
}

#[test]
fn test_put_then_get_strips_children() {
    let tree = Tree::empty();
    let supplied = Node::dir([("ghost", Node::value("boo"))]);
    tree.put("/d", Some(supplied)).unwrap();

    assert_eq!(tree.get("/d").unwrap(), Node::empty_dir());
    assert!(matches!(tree.get("/d/ghost"), Err(Error::NotFound(p)) if p == "d/ghost"));
}

#[test]
fn test_put_replaces_existing() {
    let tree = geese();
    tree.put("/geese/goose", Some(Node::value("hiss"))).unwrap();
    assert_eq!(tree.get("geese/goose").unwrap(), Node::value("hiss"));

    // Replacing a directory drops its subtree
    tree.put("/geese", Some(Node::empty_dir())).unwrap();
    assert!(matches!(tree.get("/geese/goose"), Err(Error::NotFound(p)) if p == "geese/goose"));
}

#[test]
fn test_add_requires_parent_to_be_dir() {
    let tree = Tree::new(Node::dir([("child", Node::value(""))])).unwrap();

    let err = tree
        .put("/child/grandchild", Some(Node::value("something")))
        .unwrap_err();
    assert!(matches!(err, Error::NotADirectory(p) if p == "child"));
}

#[test]
fn test_add_requires_all_parents_to_exist() {
    let tree = Tree::new(Node::dir([("child", Node::empty_dir())])).unwrap();

    let err = tree
        .put("/child/not-here/child", Some(Node::value("something")))
        .unwrap_err();
    assert_eq!(err.path(), Some("child/not-here"));
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_add_none_removes_node() {
    let tree = Tree::new(Node::dir([("child", Node::value(""))])).unwrap();
    tree.put("/child", None).unwrap();

    assert_eq!(tree.root(), Node::empty_dir());
    assert!(matches!(tree.get("/child"), Err(Error::NotFound(p)) if p == "child"));
}

#[test]
fn test_remove_absent_is_noop() {
    let tree = geese();
    tree.put("/geese/gander", None).unwrap();
    assert_eq!(tree.root(), geese().root());

    // The parent must still resolve
    assert!(matches!(
        tree.put("/ducks/duck", None),
        Err(Error::NotFound(p)) if p == "ducks"
    ));
}

#[test]
fn test_get_node() {
    let tree = Tree::new(Node::dir([(
        "child",
        Node::dir([("grandchild", Node::value("honk"))]),
    )]))
    .unwrap();

    let node = tree.get("/child/grandchild").unwrap();
    assert_eq!(node.as_value(), Some("honk"));
}

#[test]
fn test_get_root() {
    let tree = geese();
    assert_eq!(tree.get("").unwrap(), tree.root());
    assert_eq!(tree.get("/").unwrap(), tree.root());
}

#[test]
fn test_get_reports_traversed_prefix() {
    let tree = Tree::new(Node::dir([("a", Node::value("leaf"))])).unwrap();

    let err = tree.get("/a/b/c").unwrap_err();
    assert!(matches!(err, Error::NotADirectory(p) if p == "a"));

    let err = tree.get("/x/y").unwrap_err();
    assert!(matches!(err, Error::NotFound(p) if p == "x"));
}

#[test]
fn test_root_must_be_directory() {
    assert!(matches!(
        Tree::new(Node::value("root")),
        Err(Error::RootNotADirectory)
    ));
}

#[test]
fn test_root_is_not_a_target() {
    let tree = geese();
    assert!(matches!(tree.put("/", None), Err(Error::InvalidPath(_))));
    assert!(matches!(
        tree.put("", Some(Node::value("x"))),
        Err(Error::InvalidPath(_))
    ));
    assert!(matches!(
        tree.put("geese//", Some(Node::value("x"))),
        Err(Error::InvalidPath(p)) if p == "geese/"
    ));
}

#[test]
fn test_get_returns_copy() {
    let tree = geese();
    let mut copy = tree.get("/geese").unwrap();
    if let Node::Directory(children) = &mut copy {
        _ = children.insert("impostor".to_string(), Node::value("quack"));
    }
    assert!(tree.get("/geese/impostor").is_err());
}

#[test]
fn test_failed_commit_leaves_tree_untouched() {
    let tree = geese();
    let err = tree
        .apply_with(Operation::put("/geese/goose2", Node::value("honk")), |_| {
            Err(Error::invalid_path("refused"))
        })
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPath(p) if p == "refused"));
    assert_eq!(tree.root(), geese().root());
}

#[test]
fn test_commit_not_called_for_invalid_op() {
    let tree = geese();
    let mut called = false;
    let result = tree.apply_with(Operation::put("/nope/x", Node::value("y")), |_| {
        called = true;
        Ok(())
    });
    assert!(result.is_err());
    assert!(!called);

    let result = tree.apply_with(Operation::delete("/geese/absent"), |_| {
        called = true;
        Ok(())
    });
    assert!(result.is_ok());
    assert!(!called);
}

#[test]
fn test_concurrent_writers_and_readers() {
    let tree = Arc::new(Tree::empty());
    tree.put("/w", Some(Node::empty_dir())).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || {
                for i in 0..50 {
                    let path = format!("/w/{t}-{i}");
                    tree.put(path.clone(), Some(Node::value(i.to_string())))
                        .unwrap();
                    assert_eq!(tree.get(&path).unwrap(), Node::value(i.to_string()));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let root = tree.get("/w").unwrap();
    assert_eq!(root.as_dir().map(|c| c.len()), Some(200));
}
