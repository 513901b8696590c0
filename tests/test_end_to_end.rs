/// End-to-end tests of the filtering run
///
/// Runs the library pipeline and the `blastsieve` binary on small synthetic
/// inputs and checks every output file.
use anyhow::Result;
use blastsieve::compare::Dominance;
use blastsieve::config::RunConfig;
use blastsieve::pipeline::run;
use pretty_assertions::assert_eq;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

use synthetic_hits::{parse_fasta, protein_sequence, write_blast_table, write_fasta};

/// The two-row scenario: A1 passes both criteria, A2 neither
#[test]
fn test_two_row_scenario() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let blast = temp_dir.path().join("hits.tsv");
    let db = temp_dir.path().join("db.faa");
    let outdir = temp_dir.path().join("results");

    write_blast_table(&blast, &[("A1", 40.0, 1e-9), ("A2", 20.0, 1e-2)]);
    write_fasta(
        &db,
        &[
            ("A1", "alpha protein [Olea europaea var. sylvestris]", protein_sequence(130, 1).as_str()),
            ("A2", "beta protein", protein_sequence(50, 2).as_str()),
        ],
        80,
    );

    let summary = run(&RunConfig::new(&blast, &db, &outdir))?;
    let out = &summary.outputs;

    assert_eq!(fs::read_to_string(&out.first_list)?, "A1\n");
    assert_eq!(fs::read_to_string(&out.second_list)?, "A1\n");
    assert_eq!(fs::read_to_string(&out.shared_list)?, "A1\n");
    assert_eq!(fs::read_to_string(&out.only_first)?, "");
    assert_eq!(fs::read_to_string(&out.only_second)?, "");
    assert_eq!(summary.dominance, Dominance::Equal);
    assert!(out.heatmap.exists());

    let extracted = parse_fasta(&fs::read_to_string(&out.sequences)?);
    assert_eq!(extracted.len(), 1);
    assert_eq!(extracted[0].0, "A1 alpha protein [Olea europaea var. sylvestris]");
    assert_eq!(extracted[0].1, protein_sequence(130, 1));
    let line_lengths: Vec<usize> = extracted[0].2.iter().map(String::len).collect();
    assert_eq!(line_lengths, vec![60, 60, 10]);

    let report = summary.extraction.expect("shared hits were extracted");
    assert!(report.missing.is_empty());
    Ok(())
}

/// Lists keep table order, comparison lists are sorted, sequences follow
/// descending identity and missing sequences are only reported
#[test]
fn test_lists_order_and_missing_sequence() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let blast = temp_dir.path().join("hits.tsv");
    let db = temp_dir.path().join("db.faa");
    let outdir = temp_dir.path().join("nested").join("results");

    write_blast_table(
        &blast,
        &[
            ("XP_9", 50.0, 1e-30),  // both
            ("XP_3", 90.0, 1e-3),   // identity only
            ("XP_5", 20.0, 1e-40),  // evalue only
            ("XP_1", 70.0, 1e-60),  // both, missing from the database
            ("XP_9", 99.0, 1e-90),  // duplicate, first row wins
            ("XP_7", 36.0, 1e-8),   // both
        ],
    );
    write_fasta(
        &db,
        &[
            ("XP_7", "seven", "MKV"),
            ("XP_9", "nine", "GGG"),
            ("XP_3", "three", "PPP"),
        ],
        60,
    );

    let summary = run(&RunConfig::new(&blast, &db, &outdir))?;
    let out = &summary.outputs;

    assert_eq!(fs::read_to_string(&out.first_list)?, "XP_9\nXP_3\nXP_1\nXP_7\n");
    assert_eq!(fs::read_to_string(&out.second_list)?, "XP_9\nXP_5\nXP_1\nXP_7\n");
    assert_eq!(fs::read_to_string(&out.shared_list)?, "XP_1\nXP_7\nXP_9\n");
    assert_eq!(fs::read_to_string(&out.only_first)?, "XP_3\n");
    assert_eq!(fs::read_to_string(&out.only_second)?, "XP_5\n");

    // descending identity of first occurrences: XP_1 (70), XP_9 (50), XP_7 (36)
    assert_eq!(
        fs::read_to_string(&out.sequences)?,
        ">XP_9 nine\nGGG\n>XP_7 seven\nMKV\n"
    );

    let svg = fs::read_to_string(&out.heatmap)?;
    let rows: Vec<usize> = ["XP_1", "XP_9", "XP_7"]
        .iter()
        .map(|id| svg.find(&format!(">{id}</text>")).expect("row label present"))
        .collect();
    assert!(rows[0] < rows[1] && rows[1] < rows[2]);
    assert!(svg.contains("<title>XP_9: 50.0</title>"));

    let report = summary.extraction.expect("shared hits were extracted");
    assert_eq!(report.missing, vec!["XP_1".to_string()]);
    assert_eq!(report.written, 2);
    Ok(())
}

/// With no shared hits the run stops after writing the lists
#[test]
fn test_no_shared_hits() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let blast = temp_dir.path().join("hits.tsv");
    let db = temp_dir.path().join("db.faa");
    let outdir = temp_dir.path().join("results");

    write_blast_table(&blast, &[("A1", 90.0, 1.0), ("A2", 10.0, 1e-20), ("A3", 12.0, 1e-12)]);
    write_fasta(&db, &[("A1", "", "MK")], 60);

    let summary = run(&RunConfig::new(&blast, &db, &outdir))?;
    assert!(summary.extraction.is_none());
    assert_eq!(summary.dominance, Dominance::Second);
    assert_eq!(fs::read_to_string(&summary.outputs.shared_list)?, "");
    assert!(!summary.outputs.heatmap.exists());
    assert!(!summary.outputs.sequences.exists());
    Ok(())
}

/// Custom thresholds change labels, file names and membership
#[test]
fn test_binary_with_custom_thresholds() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let blast = temp_dir.path().join("hits.tsv");
    let db = temp_dir.path().join("db.faa");
    let outdir = temp_dir.path().join("out");

    write_blast_table(&blast, &[("B1", 96.0, 1e-3), ("B2", 99.0, 1e-12), ("B3", 50.0, 1e-12)]);
    write_fasta(&db, &[("B2", "two", protein_sequence(25, 9).as_str()), ("B1", "one", "MK")], 60);

    let output = Command::new(env!("CARGO_BIN_EXE_blastsieve"))
        .arg("--blast")
        .arg(&blast)
        .arg("--fasta")
        .arg(&db)
        .arg("--outdir")
        .arg(&outdir)
        .args(["--min-identity", "95", "--max-evalue", "1e-10", "--wrap", "10", "--quiet"])
        .output()?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "blastsieve failed: {stderr}");

    assert_eq!(fs::read_to_string(outdir.join("list1_identity_ge95.txt"))?, "B1\nB2\n");
    assert_eq!(fs::read_to_string(outdir.join("list2_evalue_le1e-10.txt"))?, "B2\nB3\n");
    assert_eq!(fs::read_to_string(outdir.join("only_identity_ge95.txt"))?, "B1\n");
    assert_eq!(fs::read_to_string(outdir.join("only_evalue_le1e-10.txt"))?, "B3\n");

    let extracted = parse_fasta(&fs::read_to_string(outdir.join("shared_hits_sequences.fasta"))?);
    assert_eq!(extracted.len(), 1);
    assert_eq!(extracted[0].0, "B2 two");
    let line_lengths: Vec<usize> = extracted[0].2.iter().map(String::len).collect();
    assert_eq!(line_lengths, vec![10, 10, 5]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Hits fulfilling both criteria"), "got: {stdout}");
    Ok(())
}

/// A missing sequence is a warning, not a failure
#[test]
fn test_binary_warns_about_missing_sequence() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let blast = temp_dir.path().join("hits.tsv");
    let db = temp_dir.path().join("db.faa");
    let outdir = temp_dir.path().join("out");

    write_blast_table(&blast, &[("A1", 40.0, 1e-9), ("GONE_1", 80.0, 1e-20)]);
    write_fasta(&db, &[("A1", "present", "MKV")], 60);

    let output = Command::new(env!("CARGO_BIN_EXE_blastsieve"))
        .arg("-b")
        .arg(&blast)
        .arg("-f")
        .arg(&db)
        .arg("-o")
        .arg(&outdir)
        .output()?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "blastsieve failed: {stderr}");
    assert!(stderr.contains("GONE_1"), "warning should name the identifier: {stderr}");
    assert_eq!(
        fs::read_to_string(outdir.join("shared_hits_sequences.fasta"))?,
        ">A1 present\nMKV\n"
    );
    Ok(())
}

/// Headerless outfmt 6 tables are read with --no-header
#[test]
fn test_binary_headerless_table() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let blast = temp_dir.path().join("hits.m8");
    let db = temp_dir.path().join("db.faa");
    let outdir = temp_dir.path().join("out");

    let table = synthetic_hits::blast_table(&[("C1", 88.0, 1e-44)]);
    let body: String = table.lines().skip(1).map(|line| format!("{line}\n")).collect();
    fs::write(&blast, body)?;
    write_fasta(&db, &[("C1", "", "WWW")], 60);

    let output = Command::new(env!("CARGO_BIN_EXE_blastsieve"))
        .arg("--blast")
        .arg(&blast)
        .arg("--fasta")
        .arg(&db)
        .arg("--outdir")
        .arg(&outdir)
        .arg("--no-header")
        .output()?;

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(fs::read_to_string(outdir.join("shared_hits.txt"))?, "C1\n");
    Ok(())
}
