use super::*;
use tempfile::TempDir;

const PAPER: &str = "Grasping in Clutter\nA. Author, B. Author\nSome University\n\nAbstract\nWe present a method for robotic grasping.\nIt works well.\n\n1 Introduction\nRobots grasp things.\n";

#[test]
fn splits_title_block_and_abstract() {
    let extracted = extract_front_matter(PAPER);

    assert_eq!(
        extracted.front_matter,
        "Grasping in Clutter\nA. Author, B. Author\nSome University"
    );
    assert_eq!(
        extracted.abstract_text,
        "We present a method for robotic grasping.\nIt works well."
    );
}

#[test]
fn heading_variants_are_recognized() {
    let cases = [
        "Title\nABSTRACT\nBody text.\nKeywords: robots",
        "Title\nAbstract: Body text.\nKeywords: robots",
        "Title\n1. Abstract\nBody text.\n2. Method",
    ];

    for text in cases {
        let extracted = extract_front_matter(text);
        assert_eq!(extracted.front_matter, "Title", "case: {text:?}");
        assert_eq!(extracted.abstract_text, "Body text.", "case: {text:?}");
    }
}

#[test]
fn abstract_runs_to_end_without_section_marker() {
    let extracted = extract_front_matter("Title\nAbstract\nOnly an abstract here.  ");
    assert_eq!(extracted.abstract_text, "Only an abstract here.");
}

#[test]
fn missing_heading_keeps_whole_text() {
    let text = "Just a title\nand some prose without headings.";
    let extracted = extract_front_matter(text);

    assert_eq!(extracted.front_matter, text);
    assert!(extracted.abstract_text.is_empty());
}

#[test]
fn abstraction_is_not_a_heading() {
    let extracted = extract_front_matter("Title\nAbstraction layers\nmore");
    assert!(extracted.abstract_text.is_empty());
}

#[test]
fn render_uses_section_markers() {
    let rendered = render(&FrontMatter {
        front_matter: "Title".to_string(),
        abstract_text: "Body.".to_string(),
    });
    assert_eq!(
        rendered,
        "=== FRONT MATTER ===\n\nTitle\n\n=== ABSTRACT ===\n\nBody."
    );
}

#[test]
fn processes_folder_and_writes_summary() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let input = temp_dir.path().join("documents");
    let output = temp_dir.path().join("front_matter");
    fs::create_dir_all(&input).expect("should create input dir");
    fs::write(input.join("paper.txt"), PAPER).expect("should write paper");
    fs::write(input.join("ignored.pdf"), "binary").expect("should write pdf");

    let report = process_document_folder(&input, &output).expect("processing should succeed");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.records[0].filename, "paper.txt");

    let written =
        fs::read_to_string(output.join("paper_front_matter.txt")).expect("output should exist");
    assert!(written.starts_with("=== FRONT MATTER ===\n\nGrasping in Clutter"));
    assert!(written.contains("=== ABSTRACT ===\n\nWe present a method"));

    let summary: Vec<serde_json::Value> = serde_json::from_str(
        &fs::read_to_string(output.join(SUMMARY_FILE_NAME)).expect("summary should exist"),
    )
    .expect("summary should be JSON");
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0]["filename"], "paper.txt");
    assert!(
        summary[0]["abstract"]
            .as_str()
            .is_some_and(|text| text.starts_with("We present"))
    );
}

#[test]
fn unreadable_file_is_counted_and_skipped() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let input = temp_dir.path().join("documents");
    let output = temp_dir.path().join("out");
    fs::create_dir_all(&input).expect("should create input dir");
    fs::write(input.join("good.txt"), PAPER).expect("should write paper");
    fs::write(input.join("bad.txt"), [0xff, 0xfe, 0x00]).expect("should write bytes");

    let report = process_document_folder(&input, &output).expect("processing should succeed");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.failed, 1);
}
