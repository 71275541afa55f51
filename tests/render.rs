use std::fs;
use std::path::{Path, PathBuf};

use pulldown_cmark_gemtext::{render_markdown, RenderOptions};
use similar::{ChangeTag, TextDiff};

fn collect_md_files(dir: &Path, out: &mut Vec<PathBuf>) {
    if dir.is_dir() {
        for entry in fs::read_dir(dir).unwrap() {
            let p = entry.unwrap().path();
            if p.is_dir() {
                collect_md_files(&p, out);
            } else if p.extension().is_some_and(|ext| ext == "md") {
                out.push(p);
            }
        }
    }
}

/// Every `tests/testdata/*.md` fixture must render byte-for-byte to its
/// `.gmi` sibling.
#[test]
fn fixtures_render_to_expected_gemtext() {
    let mut files = Vec::new();
    collect_md_files(Path::new("tests/testdata"), &mut files);
    assert!(!files.is_empty(), "no fixture files found");

    let mut failures = 0;
    for f in files {
        let source = fs::read_to_string(&f).unwrap();
        let expected = fs::read_to_string(f.with_extension("gmi")).unwrap();
        let rendered = render_markdown(&source, &RenderOptions::default())
            .unwrap_or_else(|e| panic!("rendering {f:?} failed: {e}"));

        if rendered != expected {
            failures += 1;
            let diff = TextDiff::from_lines(&expected, &rendered);
            eprintln!("Output diff for {f:?} (expected vs rendered):\n");
            for op in diff.ops() {
                for change in diff.iter_changes(op) {
                    match change.tag() {
                        ChangeTag::Delete => eprint!("- {change}"),
                        ChangeTag::Insert => eprint!("+ {change}"),
                        ChangeTag::Equal => eprint!("  {change}"),
                    }
                }
            }
            eprintln!();
        }
    }
    assert_eq!(failures, 0, "fixture mismatches, see diffs above");
}

/// Rendering the same parsed document twice must be deterministic; shared
/// footnote state or hoister bookkeeping must not leak between calls.
#[test]
fn rendering_is_deterministic_across_calls() {
    let source = "Note[^1] and [link](gemini://example.com/).\n\n[^1]: Text.\n";
    let first = render_markdown(source, &RenderOptions::default()).unwrap();
    let second = render_markdown(source, &RenderOptions::default()).unwrap();
    assert_eq!(first, second);
}
