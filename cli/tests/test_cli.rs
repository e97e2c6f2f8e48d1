/*
 * SPDX-FileCopyrightText: 2026 The WebRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use std::path::Path;
use webrank_cli::cli_main;

const SINK: &str = "0.85\n3\nA\nB\nC\n2\nA C\nB C\n";

fn run(dir: &Path, input: &str, extra: &[&str]) -> Result<String> {
    let input_path = dir.join("graph.txt");
    let output_path = dir.join("out").join("ranks");
    std::fs::write(&input_path, input)?;
    let mut args = vec![
        "webrank".to_owned(),
        "-i".to_owned(),
        input_path.display().to_string(),
        "-o".to_owned(),
        output_path.display().to_string(),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    cli_main(args)?;
    Ok(std::fs::read_to_string(output_path)?)
}

#[test]
fn test_text_output() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let out = run(dir.path(), SINK, &["2"])?;
    let lines = out.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 3);
    // A and B have no inlinks: (1 - 0.85) / 3 = 0.05
    assert_eq!(lines[0], "A 0.0500");
    assert_eq!(lines[1], "B 0.0500");
    assert!(lines[2].starts_with("C "));
    let c: f64 = lines[2][2..].parse()?;
    assert!(c > 0.05);
    Ok(())
}

#[test]
fn test_json_sorted_output() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let out = run(dir.path(), SINK, &["3", "--fmt", "json", "--sort", "rank"])?;
    let parsed: serde_json::Value = serde_json::from_str(&out)?;
    let names = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["name"].as_str().unwrap().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(names, ["C", "A", "B"]);
    Ok(())
}

#[test]
fn test_overrides() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let two_pages = "0.85\n2\nA\nB\n2\nA B\nB A\n";
    let out = run(
        dir.path(),
        two_pages,
        &[
            "4",
            "--dampening-factor",
            "0.5",
            "-t",
            "1e-9",
            "--dangling",
            "redistribute",
            "--fmt",
            "ascii",
            "--precision",
            "3",
        ],
    )?;
    assert_eq!(out, "0.500\n0.500\n");
    Ok(())
}

#[test]
fn test_max_iter() -> Result<()> {
    let dir = tempfile::tempdir()?;
    // After one iteration C = 0.15 / 3 + 0.85 · (1/3 + 1/3); stopping before
    // convergence still writes that vector
    let out = run(dir.path(), SINK, &["1", "-t", "1e-15", "--max-iter", "1"])?;
    assert_eq!(out, "A 0.0500\nB 0.0500\nC 0.6167\n");

    // Without the cap, C converges to 0.05 + 0.85 · (0.05 + 0.05)
    let out = run(dir.path(), SINK, &["1", "-t", "1e-15"])?;
    assert_eq!(out, "A 0.0500\nB 0.0500\nC 0.1350\n");
    Ok(())
}

#[test]
fn test_invalid_input() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let err = run(dir.path(), "0.85\n2\nA\nB\n1\nA Z\n", &["2"]).unwrap_err();
    assert!(format!("{err:#}").contains("Z"), "{err:#}");

    let err = run(dir.path(), SINK, &["2", "--dampening-factor", "1.5"]).unwrap_err();
    assert!(format!("{err:#}").contains("1.5"), "{err:#}");
    Ok(())
}
