//! The `init` scaffold must render cleanly with the values it ships with.

use pilot_core::{load_values, scaffold::write_example_structure};
use pilot_renderer::{TemplateEngine, TemplateSource};
use tempfile::TempDir;

fn scaffolded() -> (TempDir, TemplateEngine, pilot_core::Values) {
    let tmp = TempDir::new().expect("tempdir");
    write_example_structure(tmp.path()).expect("scaffold");
    let engine = TemplateEngine::from_dir(tmp.path()).expect("engine");
    let values = load_values(&tmp.path().join("values.yml")).expect("values");
    (tmp, engine, values)
}

#[test]
fn scaffold_lists_both_example_templates() {
    let (_tmp, engine, _values) = scaffolded();
    assert_eq!(
        engine.list_templates(),
        vec!["example.yml.j2", "override-example.yml.j2"]
    );
}

#[test]
fn example_template_renders_with_include() {
    let (_tmp, engine, values) = scaffolded();
    let layer = values.repos[0].layer_over(&values.defaults);
    let out = engine.render("example.yml.j2", &layer.vars).expect("render");

    assert!(out.starts_with("name: scan\n"), "got:\n{out}");
    assert!(out.contains("- \"test\""), "env var missing:\n{out}");
    assert!(out.contains("  container_scan:"), "job id missing:\n{out}");
    assert!(
        out.contains("Hello, World from job CONTAINER_SCAN!"),
        "include/upper filter missing:\n{out}"
    );
}

#[test]
fn override_template_keeps_github_secret_expression() {
    let (_tmp, engine, values) = scaffolded();
    let layer = values.repos[1].layer_over(&values.defaults);
    let out = engine
        .render("override-example.yml.j2", &layer.vars)
        .expect("render");
    assert!(out.contains("SUPER_SECRET: ${{ secrets.SuperSecret }}"), "got:\n{out}");
    assert!(out.contains("Hello from stage!"), "got:\n{out}");
}

#[test]
fn no_crlf_in_rendered_output() {
    let (_tmp, engine, values) = scaffolded();
    let layer = values.repos[0].layer_over(&values.defaults);
    for name in engine.list_templates() {
        let out = engine.render(&name, &layer.vars).expect("render");
        assert!(!out.contains('\r'), "{name} contains CR");
    }
}
