/*
 * SPDX-FileCopyrightText: 2026 The WebRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use webrank::graph::GraphError;
use webrank::loader::{self, LoadError};

const SINK: &str = "0.85
3
A
B
C
2
A C
B C
";

#[test]
fn test_sink() -> Result<()> {
    let input = loader::parse(SINK)?;
    assert_eq!(input.dampening_factor, 0.85);
    let graph = &input.graph;
    assert_eq!(graph.num_pages(), 3);
    assert_eq!(graph.num_arcs(), 2);
    assert_eq!(graph.names().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    for (i, page) in graph.pages().iter().enumerate() {
        assert_eq!(page.index(), i);
    }
    assert_eq!(graph.page(0).outlink_count(), 1);
    assert_eq!(graph.page(1).outlink_count(), 1);
    assert_eq!(graph.page(2).outlink_count(), 0);
    assert_eq!(graph.page(2).inlinks(), &[0, 1]);
    assert_eq!(graph.num_dangling(), 1);
    Ok(())
}

#[test]
fn test_extra_tokens_are_ignored() -> Result<()> {
    let input = loader::parse("1 damping\n2 pages\nfoo bar\nbaz\n1\n  foo   baz  extra\n")?;
    assert_eq!(input.dampening_factor, 1.0);
    assert_eq!(input.graph.names().collect::<Vec<_>>(), vec!["foo", "baz"]);
    assert_eq!(input.graph.page(1).inlinks(), &[0]);
    Ok(())
}

#[test]
fn test_from_path() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sink.txt");
    std::fs::write(&path, SINK)?;
    let input = loader::from_path(&path)?;
    assert_eq!(input, loader::parse(SINK)?);

    let err = loader::from_path(dir.path().join("missing.txt")).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
    Ok(())
}

#[test]
fn test_invalid_dampening() {
    for text in ["", "x\n", "-0.1\n", "1.5\n", "NaN\n"] {
        let err = loader::parse(text).unwrap_err();
        match text {
            "" => assert!(matches!(err, LoadError::UnexpectedEof(_)), "{err}"),
            _ => assert!(
                matches!(err, LoadError::InvalidDampening { line: 1, .. }),
                "{text:?}: {err}"
            ),
        }
    }
}

#[test]
fn test_invalid_counts() {
    let err = loader::parse("0.5\n0\n").unwrap_err();
    assert!(matches!(err, LoadError::InvalidPageCount { line: 2, .. }));

    let err = loader::parse("0.5\nmany\n").unwrap_err();
    assert!(matches!(err, LoadError::InvalidPageCount { line: 2, .. }));

    let err = loader::parse("0.5\n1\nA\n0\n").unwrap_err();
    assert!(matches!(err, LoadError::InvalidEdgeCount { line: 4, .. }));
}

#[test]
fn test_truncated_input() {
    let err = loader::parse("0.5\n3\nA\nB\n").unwrap_err();
    assert!(matches!(err, LoadError::UnexpectedEof("page names")));

    let err = loader::parse("0.5\n2\nA\nB\n").unwrap_err();
    assert!(matches!(err, LoadError::UnexpectedEof("the number of edges")));

    let err = loader::parse("0.5\n2\nA\nB\n2\nA B\n").unwrap_err();
    assert!(matches!(err, LoadError::UnexpectedEof("edges")));
}

#[test]
fn test_bad_edges() {
    let err = loader::parse("0.5\n2\nA\nB\n1\nA\n").unwrap_err();
    assert!(matches!(err, LoadError::InvalidEdge { line: 6, .. }));

    let err = loader::parse("0.5\n2\nA\nB\n1\nA C\n").unwrap_err();
    match err {
        LoadError::Graph { line, source } => {
            assert_eq!(line, 6);
            assert_eq!(source, GraphError::UnknownPage("C".into()));
        }
        err => panic!("Unexpected error {err}"),
    }
}

#[test]
fn test_bad_names() {
    let err = loader::parse("0.5\n2\nA\nA\n1\nA A\n").unwrap_err();
    match err {
        LoadError::Graph { line, source } => {
            assert_eq!(line, 4);
            assert_eq!(source, GraphError::DuplicatePage("A".into()));
        }
        err => panic!("Unexpected error {err}"),
    }

    let err = loader::parse("0.5\n2\nA\n\n1\nA A\n").unwrap_err();
    assert!(matches!(
        err,
        LoadError::Graph {
            line: 4,
            source: GraphError::InvalidName(_)
        }
    ));

    let err = loader::parse("0.5\n1\nabcdefghijklmnopqrstuvwxyz\n1\na a\n").unwrap_err();
    assert!(matches!(
        err,
        LoadError::Graph {
            line: 3,
            source: GraphError::NameTooLong { max: 20, .. }
        }
    ));
}
