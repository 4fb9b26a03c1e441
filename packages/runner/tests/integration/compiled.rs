use std::fs;

use common::Fingerprint;
use runner::{DefaultInputs, Language, RunError, ScriptedInputs};

use crate::support::{runner_in, write_source};
use crate::require;

const HELLO_C: &str = "#include <stdio.h>\nint main(void) {\n    printf(\"Hello from C\\n\");\n    return 0;\n}\n";

#[tokio::test]
async fn unchanged_source_reuses_cached_binary() {
    require!("gcc");
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(dir.path(), "hello.c", HELLO_C);
    let runner = runner_in(dir.path());
    let toolchain = common::config::ToolchainConfig::default();

    let first = runner.cache().build(&file, Language::C, &toolchain).await.unwrap();
    assert!(!first.reused);
    let second = runner.cache().build(&file, Language::C, &toolchain).await.unwrap();
    assert!(second.reused);
    assert_eq!(first.artifact, second.artifact);
    assert_eq!(first.fingerprint, Fingerprint::of_file(&file).unwrap());

    let result = runner.run(&file, &mut DefaultInputs).await.unwrap();
    assert_eq!(result.stdout.as_deref(), Some("Hello from C\n"));
    assert_eq!(fs::read_dir(runner.cache().dir()).unwrap().count(), 1);
}

#[tokio::test]
async fn changed_source_is_recompiled() {
    require!("gcc");
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(dir.path(), "hello.c", HELLO_C);
    let runner = runner_in(dir.path());
    let toolchain = common::config::ToolchainConfig::default();

    let first = runner.cache().build(&file, Language::C, &toolchain).await.unwrap();
    fs::write(&file, HELLO_C.replace("Hello from C", "Changed output")).unwrap();
    let second = runner.cache().build(&file, Language::C, &toolchain).await.unwrap();
    assert!(!second.reused);
    assert_ne!(first.artifact, second.artifact);

    let result = runner.run(&file, &mut DefaultInputs).await.unwrap();
    assert_eq!(result.stdout.as_deref(), Some("Changed output\n"));
}

#[tokio::test]
async fn compile_error_carries_compiler_diagnostics() {
    require!("gcc");
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(dir.path(), "broken.c", "int main(void) { return undefined_name; }\n");
    let runner = runner_in(dir.path());

    let err = runner.run(&file, &mut DefaultInputs).await.unwrap_err();
    match err {
        RunError::CompilationFailed(message) => assert!(message.contains("undefined_name")),
        other => panic!("expected compilation failure, got {other:?}"),
    }
    let leftovers = fs::read_dir(runner.cache().dir()).unwrap().count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn scanf_program_gets_one_value_per_conversion() {
    require!("gcc");
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(
        dir.path(),
        "area.c",
        "#include <stdio.h>\nint main(void) {\n    int w, h;\n    printf(\"Enter width and height: \");\n    scanf(\"%d %d\", &w, &h);\n    printf(\"Area = %d\\n\", w * h);\n    return 0;\n}\n",
    );
    let mut provider = ScriptedInputs::new(["3", "7"]);

    let result = runner_in(dir.path()).run(&file, &mut provider).await.unwrap();
    assert_eq!(result.inputs, vec!["3".to_string(), "7".to_string()]);
    let stdout = result.stdout.unwrap();
    assert!(stdout.contains("Area = 21"));
    assert!(stdout.contains("User entered: 3\nUser entered: 7"));
}

#[tokio::test]
async fn java_class_runs_from_cached_class_dir() {
    require!("javac", "java");
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(
        dir.path(),
        "Greeter.java",
        "public class Greeter {\n    public static void main(String[] args) {\n        System.out.println(\"Hi from Java\");\n    }\n}\n",
    );
    let runner = runner_in(dir.path());

    let result = runner.run(&file, &mut DefaultInputs).await.unwrap();
    assert_eq!(result.stdout.as_deref(), Some("Hi from Java\n"));
    let again = runner
        .cache()
        .lookup(&file, Language::Java)
        .unwrap()
        .expect("class dir cached");
    assert!(again.artifact.join("Greeter.class").is_file());
}

#[tokio::test]
async fn crashing_program_reports_how_it_ended() {
    require!("gcc");
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(
        dir.path(),
        "crash.c",
        "#include <stdlib.h>\nint main(void) {\n    abort();\n}\n",
    );

    let result = runner_in(dir.path()).run(&file, &mut DefaultInputs).await.unwrap();
    assert!(result.stdout.is_none());
    assert!(!result.success());
    assert!(result.failure_reason().is_some());
    #[cfg(unix)]
    {
        assert_eq!(result.exit_code, None);
        assert_eq!(result.signal, Some(6));
    }
}

#[tokio::test]
async fn non_utf8_source_still_runs() {
    require!("gcc");
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("temp.c");
    let mut source = b"#include <stdio.h>\n/* boils at 100".to_vec();
    source.push(0xB0);
    source.extend_from_slice(b"C */\nint main(void) {\n    printf(\"Temp ok\\n\");\n    return 0;\n}\n");
    fs::write(&file, source).unwrap();

    let result = runner_in(dir.path()).run(&file, &mut DefaultInputs).await.unwrap();
    assert_eq!(result.stdout.as_deref(), Some("Temp ok\n"));
    assert!(result.success());
}

#[tokio::test]
async fn cpp_cin_prompts_are_interleaved() {
    require!("g++");
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(
        dir.path(),
        "sum.cpp",
        "#include <iostream>\nint main() {\n    int a, b;\n    std::cout << \"Enter a: \";\n    std::cin >> a;\n    std::cout << \"Enter b: \";\n    std::cin >> b;\n    std::cout << \"Sum = \" << a + b << std::endl;\n    return 0;\n}\n",
    );
    let mut provider = ScriptedInputs::new(["2", "9"]);

    let result = runner_in(dir.path()).run(&file, &mut provider).await.unwrap();
    assert_eq!(result.inputs, vec!["2".to_string(), "9".to_string()]);
    assert_eq!(
        result.stdout.as_deref(),
        Some("Enter a:\nUser entered: 2\nEnter b:\nUser entered: 9\nSum = 11\n")
    );
}

#[tokio::test]
async fn java_scanner_prompts_are_interleaved() {
    require!("javac", "java");
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(
        dir.path(),
        "Ages.java",
        "import java.util.Scanner;\n\npublic class Ages {\n    public static void main(String[] args) {\n        Scanner in = new Scanner(System.in);\n        System.out.print(\"Name: \");\n        String name = in.nextLine();\n        System.out.print(\"Age: \");\n        int age = in.nextInt();\n        System.out.println(name + \" is \" + age);\n    }\n}\n",
    );
    let mut provider = ScriptedInputs::new(["Ada", "36"]);

    let result = runner_in(dir.path()).run(&file, &mut provider).await.unwrap();
    assert_eq!(result.inputs, vec!["Ada".to_string(), "36".to_string()]);
    assert_eq!(
        result.stdout.as_deref(),
        Some("Name:\nUser entered: Ada\nAge:\nUser entered: 36\nAda is 36\n")
    );
}
