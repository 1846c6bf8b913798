//! Behavioural tests for json mode

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use linefold_pipeline::{CollectHandler, Labels};

use crate::config::{Mode, MultilineConfig};
use crate::parser::MultilineParser;

const COMPLEX_DOC: &str = r#"{
    "_id": "5f43ade35a23bc7ef7b12ff8",
    "index": 0,
    "isActive": false,
    "balance": "$3,045.99",
    "picture": "http://placehold.it/32x32",
    "name": {
      "first": "Johanna",
      "last": "Rivera"
    },
    "about": "{\"_id\": \"2\",\"name\": {\"first\": \"Two\"}}",
    "range": [
      0,
      9
    ],
    "friends": [
      {
        "id": 0,
        "name": "Rena Pollard"
      }
    ],
    "favoriteFruit": "strawberry"
  }"#;

async fn run_case(name: &str, separator: &str, input: &[&str], expected: &[&str]) {
    let config = MultilineConfig::new(Mode::Json)
        .with_separator(separator)
        .with_max_idle_duration(Duration::from_secs(1000));
    let collect = Arc::new(CollectHandler::new());
    let parser =
        MultilineParser::new(Some(&config), Some(collect.clone())).expect("valid configuration");

    let labels = Labels::new();
    let ts = Utc::now();
    for line in input {
        parser.handle(&labels, ts, line).await.unwrap();
    }
    parser.stop().await.unwrap();

    assert_eq!(collect.lines(), expected, "case '{name}'");
}

#[tokio::test]
async fn test_json_documents_across_lines() {
    run_case(
        "json mode base test",
        "\n",
        &[
            "{",
            "\t\"_id\": \"1\",",
            "\t\"name\": ",
            "   {",
            "\t\t\"first\": \"{One}\"",
            "\t}",
            "  },",
            "  {",
            "\t\"_id\": \"2\",",
            "\t\"name\": {",
            "\t\t\"first\": \"{Two\"",
            "\t}",
            "  }",
        ],
        &[
            "{\n\t\"_id\": \"1\",\n\t\"name\": \n   {\n\t\t\"first\": \"{One}\"\n\t}\n  }",
            "{\n\t\"_id\": \"2\",\n\t\"name\": {\n\t\t\"first\": \"{Two\"\n\t}\n  }",
        ],
    )
    .await;
}

#[tokio::test]
async fn test_json_complex_documents_with_extra_newlines() {
    // the same document twice: verbatim, then with every opening brace
    // pushed onto its own line (including the brace inside the "about"
    // string, which the extractor must treat as literal text)
    let exploded = COMPLEX_DOC.replace('{', "{\n");

    let mut input: Vec<&str> = COMPLEX_DOC.lines().collect();
    input.extend(exploded.lines());

    run_case(
        "json mode complex docs",
        "\n",
        &input,
        &[COMPLEX_DOC, exploded.as_str()],
    )
    .await;
}

#[tokio::test]
async fn test_json_multiple_documents_in_one_line() {
    run_case(
        "json mode multiple docs in one line",
        "\n",
        &[r#"{"_id": "2","name": {"first": "Two{\"}"}}{"_id": "2","name": {"first": "Two{\"}"}}"#],
        &[
            r#"{"_id": "2","name": {"first": "Two{\"}"}}"#,
            r#"{"_id": "2","name": {"first": "Two{\"}"}}"#,
        ],
    )
    .await;
}

#[tokio::test]
async fn test_json_ignores_surrounding_garbage() {
    run_case(
        "json mode ignoring garbage",
        "\n",
        &[r#"garbage1{"_id": "2"}garbage2{"first": "Two"}garbage3"#],
        &[r#"{"_id": "2"}"#, r#"{"first": "Two"}"#],
    )
    .await;
}

#[tokio::test]
async fn test_json_root_array_yields_elements() {
    run_case(
        "json mode root array",
        "\n",
        &[r#"[{"_id": "2"},{"first": "Two"}]"#],
        &[r#"{"_id": "2"}"#, r#"{"first": "Two"}"#],
    )
    .await;
}

#[tokio::test]
async fn test_json_open_document_drains_on_stop() {
    run_case(
        "json mode unterminated doc",
        "\n",
        &[r#"{"_id": "#],
        &["{\"_id\": \n"],
    )
    .await;
}

#[tokio::test]
async fn test_json_escaped_quote_keeps_string_open() {
    // the \" does not close the string, so the brace after it is literal
    run_case(
        "json mode escape handling",
        "",
        &[r#"{"a": "x\"{y"}"#],
        &[r#"{"a": "x\"{y"}"#],
    )
    .await;
}

#[tokio::test]
async fn test_json_trailing_backslash_at_line_end() {
    // a backslash ending the line escapes nothing and must not lose text
    run_case(
        "json mode trailing backslash",
        "",
        &[r#"{"a": "x\"#, r#"y"}"#],
        &[r#"{"a": "x\y"}"#],
    )
    .await;
}
