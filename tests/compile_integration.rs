//! Compile pipeline integration tests
//!
//! A shell script stands in for the Java runtime: it writes generated code for
//! template jobs and emits canned diagnostics for optimizer jobs.

#![cfg(unix)]

use nsbuild::{
    BuildError, ClosureCompiler, CompilationMode, ProcessRunner, ProjectSpec, Settings, Severity,
    TemplateCompiler,
};
use serial_test::serial;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FAKE_JAVA: &str = r#"#!/bin/sh
jar="$2"
case "$jar" in
  *template.jar)
    out=""
    prev=""
    for arg in "$@"; do
      if [ "$prev" = "--outputPathFormat" ]; then out="$arg"; fi
      prev="$arg"
    done
    case "$*" in
      *broken.soy*) echo "template syntax error" >&2; exit 3 ;;
    esac
    echo "// generated" > "$out"
    ;;
  *)
    echo "$@" > "__ARGS_LOG__"
    echo "compiled"
    printf 'a.js:3: ERROR - Parse error. missing ; before statement\n\tvar x = 1\n\t         ^\n\n' >&2
    printf 'b.js:7: WARNING - unreachable code\nreturn;\n^\n\n' >&2
    exit 1
    ;;
esac
"#;

struct Fixture {
    dir: TempDir,
    settings: Settings,
    args_log: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let args_log = dir.path().join("args.log");
        let java = dir.path().join("java");
        fs::write(&java, FAKE_JAVA.replace("__ARGS_LOG__", &args_log.display().to_string())).unwrap();
        fs::set_permissions(&java, fs::Permissions::from_mode(0o755)).unwrap();

        let settings = Settings {
            java_path: java,
            compiler_jar: PathBuf::from("compiler.jar"),
            template_jar: PathBuf::from("template.jar"),
            template_support_dir: dir.path().join("support"),
            base_js_fallback: dir.path().join("base.js"),
        };

        Self {
            dir,
            settings,
            args_log,
        }
    }

    fn source_root(&self) -> PathBuf {
        let root = self.dir.path().join("js");
        fs::create_dir_all(&root).unwrap();
        root
    }
}

fn write(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
}

#[tokio::test]
#[serial]
async fn test_compile_reports_diagnostics() {
    let fixture = Fixture::new();
    let root = fixture.source_root();
    write(&root.join("a.js"), "goog.provide('a');");
    write(&root.join("b.js"), "goog.provide('b');\ngoog.require('a');");

    let spec = ProjectSpec::new(vec![root])
        .with_namespaces(["b"])
        .with_mode(CompilationMode::Advanced)
        .with_externs(vec![PathBuf::from("/externs/jquery.js")]);

    let output = ClosureCompiler::new(&fixture.settings, &spec)
        .build()
        .await
        .unwrap();

    assert_eq!(output.exit_code, 1);
    assert!(!output.success());
    assert_eq!(output.stdout.trim(), "compiled");
    assert_eq!(output.error_count, 1);
    assert_eq!(output.warning_count, 1);

    let first = &output.diagnostics[0];
    assert_eq!(first.severity, Severity::Error);
    assert_eq!(first.file, "a.js");
    assert_eq!(first.line, 3);
    assert_eq!(first.message, "Parse error. missing ; before statement");
    assert_eq!(first.snippet, "    var x = 1");
    assert_eq!(first.offset, 13);

    let args = fs::read_to_string(&fixture.args_log).unwrap();
    assert!(args.starts_with("-jar compiler.jar --js "));
    assert!(args.contains("--externs /externs/jquery.js"));
    assert!(args.trim_end().ends_with("--compilation_level ADVANCED_OPTIMIZATIONS"));
}

#[tokio::test]
#[serial]
async fn test_templates_compiled_before_optimizer() {
    let fixture = Fixture::new();
    let root = fixture.source_root();
    write(&root.join("page.soy"), "{namespace app.views}");
    write(&root.join("main.js"), "goog.provide('app');\ngoog.require('app.views');");

    let spec = ProjectSpec::new(vec![root]).with_namespaces(["app"]);
    ClosureCompiler::new(&fixture.settings, &spec)
        .build()
        .await
        .unwrap();

    let args = fs::read_to_string(&fixture.args_log).unwrap();
    assert!(!args.contains("page.soy"));
    assert!(args.contains("nsbuild-"));
    assert!(args.contains("soyutils.js"));
    assert!(args.contains("main.js"));
}

#[tokio::test]
#[serial]
async fn test_template_render() {
    let fixture = Fixture::new();
    let template = fixture.dir.path().join("page.soy");
    write(&template, "{namespace app.views}");

    let compiler = TemplateCompiler::new(&fixture.settings, "", ProcessRunner::new());
    let js = compiler.render(&template).await.unwrap();

    assert_eq!(js, "// generated\n");
}

#[tokio::test]
#[serial]
async fn test_template_failure() {
    let fixture = Fixture::new();
    let template = fixture.dir.path().join("broken.soy");
    write(&template, "{namespace");

    let compiler = TemplateCompiler::new(&fixture.settings, "", ProcessRunner::new());
    match compiler.render(&template).await {
        Err(BuildError::TemplateCompile {
            exit_code, stderr, ..
        }) => {
            assert_eq!(exit_code, 3);
            assert!(stderr.contains("template syntax error"));
        }
        other => panic!("Expected TemplateCompile error, got {:?}", other),
    }
}

#[tokio::test]
#[serial]
async fn test_missing_java_is_launch_error() {
    let fixture = Fixture::new();
    let root = fixture.source_root();
    write(&root.join("a.js"), "goog.provide('a');");

    let mut settings = fixture.settings.clone();
    settings.java_path = fixture.dir.path().join("no-such-java");

    let spec = ProjectSpec::new(vec![root]).with_namespaces(["a"]);
    let result = ClosureCompiler::new(&settings, &spec).build().await;

    assert!(matches!(result, Err(BuildError::Launch { .. })));
}
