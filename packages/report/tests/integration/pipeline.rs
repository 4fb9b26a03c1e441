use std::io::Read;

use common::Submission;
use report::{Block, HeadlessBrowser, docx};
use runner::DefaultInputs;

use crate::require;
use crate::support::{BrokenBrowser, FakeBrowser, builder_in, metadata, write_source};

#[tokio::test]
async fn three_files_make_three_sections() {
    require!("python3", "gcc");
    let dir = tempfile::tempdir().unwrap();
    let files = vec![
        write_source(dir.path(), "hello.py", "print('Hello, report')\n"),
        write_source(dir.path(), "broken.c", "int main(void) { return missing_symbol; }\n"),
        write_source(dir.path(), "index.html", "<h1>Preview</h1>\n"),
    ];
    let builder = builder_in(dir.path()).with_screenshotter(Box::new(FakeBrowser));
    let submission = Submission::new(files, metadata());

    let report = builder.build(&submission, &mut DefaultInputs).await;
    assert_eq!(report.title, "Computing Experiment 7");
    assert_eq!(report.sections.len(), 3);

    let passing = &report.sections[0];
    assert_eq!(passing.file_name, "hello.py");
    assert!(passing.has_heading("Output:"));
    assert!(!passing.has_heading("Errors:"));
    assert!(
        passing
            .blocks
            .iter()
            .any(|b| matches!(b, Block::Paragraph(t) if t == "Hello, report\n"))
    );

    let failing = &report.sections[1];
    assert!(failing.has_heading("Compilation Error:"));
    assert!(!failing.has_heading("Output:"));
    assert!(matches!(failing.blocks[0], Block::PageBreak));

    let markup = &report.sections[2];
    assert!(markup.has_heading("Frontend Preview:"));
    assert!(
        markup
            .blocks
            .iter()
            .any(|b| matches!(b, Block::Image(img) if img.width == 1920))
    );
    let leftover = builder
        .runner()
        .scratch_dir()
        .join("index_screenshot_00.png");
    assert!(!leftover.exists());

    let out = dir.path().join("report.docx");
    docx::write_docx(&report, &out).unwrap();
    let mut archive = zip::ZipArchive::new(std::fs::File::open(&out).unwrap()).unwrap();
    let mut document = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut document)
        .unwrap();
    assert!(document.contains("File: hello.py"));
    assert!(document.contains("Compilation Error:"));
    assert!(document.contains("Frontend Preview:"));
    assert!(archive.by_name("word/media/image1.png").is_ok());
}

#[tokio::test]
async fn per_file_failures_do_not_abort_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![
        dir.path().join("missing.py"),
        write_source(dir.path(), "script.rb", "puts 'hi'\n"),
        write_source(dir.path(), "style.css", "body { color: red; }\n"),
    ];
    let builder = builder_in(dir.path()).with_screenshotter(Box::new(BrokenBrowser));
    let submission = Submission::new(files, metadata());

    let report = builder.build(&submission, &mut DefaultInputs).await;
    assert_eq!(report.sections.len(), 2);

    let unsupported = &report.sections[0];
    assert_eq!(unsupported.file_name, "script.rb");
    assert!(unsupported.has_heading("Execution Error:"));
    assert!(unsupported.blocks.iter().any(
        |b| matches!(b, Block::Paragraph(t) if t.starts_with("Unsupported file type: .rb"))
    ));
    assert!(!matches!(unsupported.blocks[0], Block::PageBreak));

    let stylesheet = &report.sections[1];
    assert!(stylesheet.blocks.iter().any(|b| matches!(
        b,
        Block::Placeholder(t) if t.starts_with("[Screenshot unavailable:")
    )));

    assert_eq!(
        report.info,
        vec![
            ("Name".to_string(), "Ada Lovelace".to_string()),
            ("Registration Number".to_string(), "REG-001".to_string()),
            ("Semester".to_string(), "3".to_string()),
            ("Group".to_string(), "A".to_string()),
        ]
    );
}

#[tokio::test]
async fn markup_without_browser_is_marked_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![write_source(dir.path(), "index.html", "<p>hi</p>\n")];
    let builder = builder_in(dir.path());

    let report = builder
        .build(&Submission::new(files, metadata()), &mut DefaultInputs)
        .await;
    assert!(report.sections[0].blocks.iter().any(
        |b| matches!(b, Block::Placeholder(t) if t == "[Screenshots disabled]")
    ));
}

#[tokio::test]
async fn crashing_program_lists_how_it_ended() {
    require!("gcc");
    let dir = tempfile::tempdir().unwrap();
    let files = vec![write_source(
        dir.path(),
        "crash.c",
        "#include <stdlib.h>\nint main(void) { abort(); }\n",
    )];
    let builder = builder_in(dir.path());

    let report = builder
        .build(&Submission::new(files, metadata()), &mut DefaultInputs)
        .await;
    let section = &report.sections[0];
    assert!(section.has_heading("Output:"));
    assert!(section.has_heading("Errors:"));
    assert!(section.blocks.iter().any(|b| matches!(
        b,
        Block::Paragraph(t) if t.starts_with("Process terminated") || t.starts_with("Process exited")
    )));
}

#[tokio::test]
async fn long_page_is_captured_per_viewport() {
    require!("chromium");
    let dir = tempfile::tempdir().unwrap();
    let files = vec![write_source(
        dir.path(),
        "long.html",
        "<body style=\"margin:0\"><div style=\"height:2000px;background:#48c\">tall</div></body>\n",
    )];
    let builder = builder_in(dir.path())
        .with_screenshotter(Box::new(HeadlessBrowser::new("chromium", 800, 600)));

    let report = builder
        .build(&Submission::new(files, metadata()), &mut DefaultInputs)
        .await;
    let images = report.sections[0]
        .blocks
        .iter()
        .filter(|b| matches!(b, Block::Image(img) if img.width == 800))
        .count();
    assert!(images >= 2, "expected several viewport captures, got {images}");

    let leftovers = std::fs::read_dir(builder.runner().scratch_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".png"))
        .count();
    assert_eq!(leftovers, 0);
}
