use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "heap_navigator_it_{}_{}_{}",
        std::process::id(),
        nanos,
        name
    ))
}

fn write_snapshot(path: &Path) -> anyhow::Result<()> {
    let snapshot = json!({
        "classes": [
            {"id": 1, "name": "java.lang.Object"},
            {"id": 2, "name": "java.lang.Class", "super": 1},
            {"id": 3, "name": "java.lang.ref.Reference", "super": 1,
             "fields": [
                {"name": "referent", "type": "java.lang.Object"},
                {"name": "next", "type": "java.lang.ref.Reference"}
             ]},
            {"id": 4, "name": "java.lang.ref.WeakReference", "super": 3},
            {"id": 5, "name": "java.lang.ref.Finalizer", "super": 3,
             "statics": [{"name": "queue", "value": {"object": 60}}]},
            {"id": 6, "name": "java.lang.ref.ReferenceQueue", "super": 1},
            {"id": 7, "name": "java.lang.String", "super": 1},
            {"id": 8, "name": "char[]", "super": 1},
            {"id": 9, "name": "int[]", "super": 1},
            {"id": 10, "name": "com.acme.Service", "super": 1,
             "statics": [{"name": "INSTANCE", "value": {"object": 100}}]}
        ],
        "instances": [
            {"id": 10, "class": 2},
            {"id": 60, "class": 6, "fields": [{"name": "head", "value": {"object": 70}}]},
            {"id": 70, "class": 5, "fields": [
                {"name": "referent", "value": {"object": 101}},
                {"name": "next", "value": {"object": 71}}
            ]},
            {"id": 71, "class": 5, "fields": [
                {"name": "referent", "value": {"object": 100}},
                {"name": "next", "value": {"object": 71}}
            ]},
            {"id": 100, "class": 10, "fields": [
                {"name": "cache", "value": {"object": 101}},
                {"name": "name", "value": {"object": 120}},
                {"name": "hits", "value": {"int": 7}}
            ]},
            {"id": 101, "class": 1},
            {"id": 102, "class": 4, "fields": [{"name": "referent", "value": {"object": 101}}]},
            {"id": 120, "class": 7, "fields": [{"name": "value", "value": {"object": 121}}]},
            {"id": 121, "class": 8, "array": {"chars": "heap"}},
            {"id": 122, "class": 8, "array": {"chars": [97, 55296, 98]}}
        ],
        "roots": [
            {"id": 10, "kind": "sticky-class"}
        ]
    });

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_vec_pretty(&snapshot)?)?;
    Ok(())
}

fn run(snapshot: &Path, args: &[&str]) -> anyhow::Result<Output> {
    let bin = env!("CARGO_BIN_EXE_heap-navigator");
    let mut cmd = Command::new(bin);
    cmd.arg("--snapshot").arg(snapshot).args(args);
    cmd.env_remove("HEAP_NAVIGATOR_EXCLUDES");
    Ok(cmd.output()?)
}

fn run_json(snapshot: &Path, args: &[&str]) -> anyhow::Result<Value> {
    let out = run(snapshot, args)?;
    if !out.status.success() {
        return Err(anyhow::anyhow!(
            "command failed: status={:?}, stderr={}",
            out.status.code(),
            String::from_utf8_lossy(&out.stderr)
        ));
    }
    Ok(serde_json::from_slice(&out.stdout)?)
}

fn ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn navigator_answers_graph_queries() -> anyhow::Result<()> {
    let base = temp_dir("graph_queries");
    let snapshot = base.join("heap.json");
    write_snapshot(&snapshot)?;

    let summary = run_json(&snapshot, &["summary"])?;
    assert_eq!(summary["classes"], json!(10));
    assert_eq!(summary["instances"], json!(10));
    assert_eq!(summary["weak_reference_class"], json!("java.lang.ref.Reference"));
    assert_eq!(summary["referent_field_index"], json!(0));
    assert_eq!(summary["digest"].as_str().map(str::len), Some(64));

    let class = run_json(&snapshot, &["class", "[I"])?;
    assert_eq!(class["kind"], json!("class"));
    assert_eq!(class["id"], json!("0x9"));
    let by_id = run_json(&snapshot, &["class", "0xa"])?;
    assert_eq!(by_id["class_name"], json!("com.acme.Service"));

    let everything = run_json(&snapshot, &["instances", "java.lang.Object", "--subclasses"])?;
    assert_eq!(ids(&everything).len(), 10);
    let own = run_json(&snapshot, &["instances", "java.lang.Object"])?;
    assert_eq!(ids(&own), vec!["0x65"]);
    let limited = run_json(
        &snapshot,
        &["instances", "java.lang.ref.Reference", "--subclasses", "--limit", "2"],
    )?;
    assert_eq!(ids(&limited).len(), 2);

    let strong = run_json(&snapshot, &["referrers", "101"])?;
    assert_eq!(ids(&strong), vec!["0x64"]);
    let all = run_json(&snapshot, &["referrers", "101", "--weak"])?;
    assert_eq!(ids(&all), vec!["0x46", "0x64", "0x66"]);

    let statics = run_json(&snapshot, &["referees", "0xa"])?;
    assert_eq!(ids(&statics), vec!["0x64"]);
    let fields = run_json(&snapshot, &["referees", "0x64"])?;
    assert_eq!(ids(&fields), vec!["0x65", "0x78"]);

    let path = run_json(&snapshot, &["root", "101"])?;
    assert_eq!(path["distance"], json!(2));
    assert_eq!(path["nearest_root"]["kind"], json!("sticky-class"));
    let unreachable = run_json(&snapshot, &["root", "102"])?;
    assert_eq!(unreachable["distance"], json!(0));
    assert_eq!(unreachable["nearest_root"], Value::Null);

    let finalizable = run_json(&snapshot, &["finalizers"])?;
    assert_eq!(ids(&finalizable), vec!["0x65", "0x64"]);

    let root_objects = run_json(&snapshot, &["roots", "--objects"])?;
    assert_eq!(root_objects[0]["kind"], json!("class"));
    assert_eq!(root_objects[0]["class_name"], json!("com.acme.Service"));

    let rendered = run_json(&snapshot, &["render", "0x78"])?;
    assert_eq!(rendered["value"], json!("heap"));
    let fallback = run_json(&snapshot, &["render", "101"])?;
    assert_eq!(fallback["value"], json!("java.lang.Object#0x65"));

    let names = run_json(&snapshot, &["classes", "--pattern", r"^java\.lang\.ref\."])?;
    assert_eq!(names.as_array().map(Vec::len), Some(4));

    let lone_surrogate = run_json(&snapshot, &["render", "0x7a"])?;
    assert_eq!(lone_surrogate["value"], json!("a\u{fffd}b"));

    std::fs::remove_dir_all(base)?;
    Ok(())
}

#[test]
fn text_format_and_failures() -> anyhow::Result<()> {
    let base = temp_dir("text_and_failures");
    let snapshot = base.join("heap.json");
    write_snapshot(&snapshot)?;

    let out = run(&snapshot, &["-f", "text", "referrers", "101"])?;
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout).trim(),
        "com.acme.Service#0x64"
    );

    let missing = run(&snapshot, &["class", "com.acme.Missing"])?;
    assert!(!missing.status.success());
    assert!(String::from_utf8_lossy(&missing.stderr).contains("Class not found"));

    let bad_pattern = run(&snapshot, &["classes", "--pattern", "("])?;
    assert!(!bad_pattern.status.success());

    let excludes = base.join("excludes.txt");
    std::fs::write(&excludes, "# noisy\njava.lang.Thread.name\n")?;
    let summary = run_json(
        &snapshot,
        &["--excludes", excludes.to_string_lossy().as_ref(), "summary"],
    )?;
    assert_eq!(summary["reachable_excludes"], json!(1));

    let absent = run(&base.join("nope.json"), &["summary"])?;
    assert!(!absent.status.success());

    std::fs::remove_dir_all(base)?;
    Ok(())
}
