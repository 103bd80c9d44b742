//! End-to-end builds on a real filesystem with the default collaborators.

use tempfile::TempDir;

use super::{assert_closed, create_test_project};
use crate::{BuildConfig, ExternalPolicy, GraphBuilder, create_module_graph};

#[tokio::test]
async fn test_project_with_package_exports() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = create_test_project(
        &temp,
        &[
            (
                "src/index.ts",
                r#"
                import { helper } from './utils';
                import { html } from 'lit';
                import type { Config } from './types';
                export const main = () => helper(html);
                "#,
            ),
            ("src/utils.ts", "export const helper = (x: unknown) => x;"),
            ("src/types.ts", "export interface Config {}"),
            (
                "node_modules/lit/package.json",
                r#"{
                    "name": "lit",
                    "exports": {
                        ".": { "import": "./index.js", "require": "./index.cjs" }
                    }
                }"#,
            ),
            ("node_modules/lit/index.js", "export * from '@lit/reactive-element';"),
            ("node_modules/lit/index.cjs", ""),
            (
                "node_modules/@lit/reactive-element/package.json",
                r#"{ "name": "@lit/reactive-element", "main": "./reactive-element.js" }"#,
            ),
            (
                "node_modules/@lit/reactive-element/reactive-element.js",
                "export const html = 1;",
            ),
        ],
    );

    let graph = GraphBuilder::new()
        .base_path(&root)
        .build(["src/index.ts"])
        .await
        .unwrap();

    assert_eq!(
        graph.unique_modules(),
        vec![
            "node_modules/@lit/reactive-element/reactive-element.js",
            "node_modules/lit/index.js",
            "src/index.ts",
            "src/utils.ts",
        ]
    );
    assert!(!graph.contains("src/types.ts"));
    assert!(graph.module("node_modules/lit/index.js").unwrap().facade);

    let mut packages: Vec<_> = graph
        .external_modules()
        .map(|e| e.package_name.as_str())
        .collect();
    packages.sort();
    assert_eq!(packages, vec!["@lit/reactive-element", "lit"]);

    assert_eq!(
        graph.find_import_chains("**/reactive-element.js"),
        vec![vec![
            "src/index.ts",
            "node_modules/lit/index.js",
            "node_modules/@lit/reactive-element/reactive-element.js",
        ]]
    );
    assert_eq!(
        graph
            .module("node_modules/@lit/reactive-element/reactive-element.js")
            .unwrap()
            .package_root,
        Some(root.join("node_modules/@lit/reactive-element"))
    );
    assert_closed(&graph);
}

#[tokio::test]
async fn test_conditions_select_export() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = create_test_project(
        &temp,
        &[
            ("index.js", "import 'pkg';"),
            (
                "node_modules/pkg/package.json",
                r#"{ "name": "pkg", "exports": { "browser": "./browser.js", "default": "./node.js" } }"#,
            ),
            ("node_modules/pkg/browser.js", ""),
            ("node_modules/pkg/node.js", ""),
        ],
    );

    let config = BuildConfig {
        base_path: Some(root.clone()),
        conditions: vec!["browser".to_string(), "import".to_string()],
        ..Default::default()
    };
    let graph = create_module_graph(["index.js"], config).await.unwrap();

    assert!(graph.has_edge("index.js", "node_modules/pkg/browser.js"));
    assert!(!graph.contains("node_modules/pkg/node.js"));
}

#[tokio::test]
async fn test_json_and_css_imports_are_leaves() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = create_test_project(
        &temp,
        &[
            (
                "index.js",
                "import data from './data.json' with { type: 'json' };\nimport './app.css';",
            ),
            ("data.json", r#"{ "a": 1 }"#),
            ("app.css", "body {}"),
        ],
    );

    let graph = GraphBuilder::new()
        .base_path(&root)
        .external(ExternalPolicy {
            ignore: true,
            ..Default::default()
        })
        .build(["index.js"])
        .await
        .unwrap();

    assert_eq!(graph.unique_modules(), vec!["app.css", "data.json", "index.js"]);
    let json = graph.module("data.json").unwrap();
    assert_eq!(json.source, r#"{ "a": 1 }"#);
    assert!(!json.has_module_syntax);
}

#[tokio::test]
async fn test_missing_file_is_unresolved_not_fatal() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = create_test_project(&temp, &[("index.js", "import './gone.js';")]);

    let graph = GraphBuilder::new()
        .base_path(&root)
        .build(["index.js"])
        .await
        .unwrap();

    assert_eq!(graph.len(), 1);
    assert_eq!(graph.diagnostics().len(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinked_base_path_yields_local_ids() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = create_test_project(
        &temp,
        &[
            ("real/index.js", "import './dep.js';"),
            ("real/dep.js", ""),
        ],
    );
    let link = root.join("link");
    std::os::unix::fs::symlink(root.join("real"), &link).expect("Failed to create symlink");

    let graph = GraphBuilder::new()
        .base_path(&link)
        .build(["index.js"])
        .await
        .unwrap();

    assert_eq!(graph.unique_modules(), vec!["dep.js", "index.js"]);
    assert_eq!(graph.base_path(), root.join("real"));
}
