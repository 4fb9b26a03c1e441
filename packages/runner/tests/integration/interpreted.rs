use runner::{DefaultInputs, InputRequest, RunError, ScriptedInputs};

use crate::support::{python_module, runner_in, write_source};
use crate::require;

#[tokio::test]
async fn fixed_output_is_identical_across_runs() {
    require!("python3");
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(dir.path(), "hello.py", "print('Hello')\nprint(2 + 3)\n");
    let runner = runner_in(dir.path());

    let first = runner.run(&file, &mut DefaultInputs).await.unwrap();
    let second = runner.run(&file, &mut DefaultInputs).await.unwrap();
    assert_eq!(first.stdout.as_deref(), Some("Hello\n5\n"));
    assert_eq!(first.stdout, second.stdout);
    assert!(first.stderr.is_none());
    assert!(first.inputs.is_empty());
}

#[tokio::test]
async fn interactive_program_receives_scripted_values() {
    require!("python3");
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(
        dir.path(),
        "add.py",
        "a = int(input('First number: '))\nb = int(input('Second number: '))\nprint('Sum:', a + b)\n",
    );
    let mut provider = ScriptedInputs::new(["4", "6"]);

    let result = runner_in(dir.path()).run(&file, &mut provider).await.unwrap();
    assert_eq!(result.inputs, vec!["4".to_string(), "6".to_string()]);
    let stdout = result.stdout.unwrap();
    assert!(stdout.contains("User entered: 4"));
    assert!(stdout.contains("User entered: 6"));
    assert!(stdout.contains("Sum: 10"));
}

#[tokio::test]
async fn declined_inputs_fall_back_to_placeholders() {
    require!("python3");
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(dir.path(), "twice.py", "n = int(input('n: '))\nprint(n * 2)\n");
    let mut decline = |_: &InputRequest<'_>| -> runner::Result<Option<String>> { Ok(None) };

    let result = runner_in(dir.path()).run(&file, &mut decline).await.unwrap();
    assert_eq!(result.inputs, vec!["5".to_string()]);
    assert!(result.stdout.unwrap().ends_with("10\n"));
}

#[tokio::test]
async fn runtime_failure_is_captured_not_raised() {
    require!("python3");
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(dir.path(), "boom.py", "print('before')\nraise ValueError('bad')\n");

    let result = runner_in(dir.path()).run(&file, &mut DefaultInputs).await.unwrap();
    assert_eq!(result.stdout.as_deref(), Some("before\n"));
    assert!(result.stderr.unwrap().contains("ValueError: bad"));
    assert_ne!(result.exit_code, Some(0));
}

#[tokio::test]
async fn unsupported_extension_never_spawns() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(dir.path(), "script.rb", "puts 'hi'\n");

    let err = runner_in(dir.path())
        .run(&file, &mut DefaultInputs)
        .await
        .unwrap_err();
    assert!(matches!(err, RunError::UnsupportedFileType(_)));
    assert!(err.to_string().starts_with("Unsupported file type"));
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = runner_in(dir.path())
        .run(&dir.path().join("gone.py"), &mut DefaultInputs)
        .await
        .unwrap_err();
    assert!(matches!(err, RunError::Io(_)));
}

#[tokio::test]
async fn javascript_runs_under_node() {
    require!("node");
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(
        dir.path(),
        "greet.js",
        "const parts = ['Hello', 'from', 'node'];\nconsole.log(parts.join(' '));\n",
    );

    let result = runner_in(dir.path()).run(&file, &mut DefaultInputs).await.unwrap();
    assert_eq!(result.stdout.as_deref(), Some("Hello from node\n"));
    assert!(result.success());
}

#[tokio::test]
async fn php_reads_stdin_line() {
    require!("php");
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(
        dir.path(),
        "hello.php",
        "<?php\necho \"Enter name: \";\n$name = trim(fgets(STDIN));\necho \"Hello, $name\\n\";\n",
    );
    let mut provider = ScriptedInputs::new(["Ada"]);

    let result = runner_in(dir.path()).run(&file, &mut provider).await.unwrap();
    assert_eq!(result.inputs, vec!["Ada".to_string()]);
    assert_eq!(
        result.stdout.as_deref(),
        Some("Enter name:\nUser entered: Ada\nHello, Ada\n")
    );
}

#[tokio::test]
async fn plotting_script_renders_image_and_cleans_up() {
    require!("python3");
    if !python_module("matplotlib") {
        eprintln!("skipping: matplotlib not importable");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(
        dir.path(),
        "chart.py",
        "import matplotlib.pyplot as plt\nplt.plot([1, 2, 3], [2, 4, 1])\nplt.show()\nprint('plotted')\n",
    );
    let runner = runner_in(dir.path());

    let result = runner.run(&file, &mut DefaultInputs).await.unwrap();
    assert_eq!(result.stdout.as_deref(), Some("plotted\n"));
    let image = result.image.expect("plot image rendered");
    assert!(image.is_file());

    let scripts = std::fs::read_dir(runner.scratch_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".py"))
        .count();
    assert_eq!(scripts, 0);
}
