//! Behavioural tests for the document driver

use std::cell::RefCell;

use mapper_core::DocumentConverter;
use mapper_transform::{Dialect, Error, Result, TransformAdapter, Transformer};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

const MAPPER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mapper namespace="demo">
  <!-- header comment with <select> in it -->
  <select id="one">
    SELECT a FROM t WHERE b &lt; 3
  </select>
  <update id="two"><![CDATA[
    UPDATE t SET a = 1 WHERE b < 3
  ]]></update>
  <delete id="three">
    DELETE FROM t
    <where><if test="x != null">x = #{x}</if></where>
  </delete>
</mapper>
"#;

fn convert_with(transformer: &dyn Transformer, document: &str) -> mapper_core::ConversionOutcome {
    let adapter = TransformAdapter::new(
        transformer,
        "oracle".parse().unwrap(),
        "postgresql".parse().unwrap(),
    );
    DocumentConverter::new(adapter).convert(document)
}

fn identity(sql: &str, _: &Dialect, _: &Dialect) -> Result<String> {
    Ok(sql.to_string())
}

#[test]
fn test_identity_transform_is_byte_identical() {
    let outcome = convert_with(&identity, MAPPER);
    assert!(!outcome.changed);
    assert!(outcome.changes.is_empty());
    assert_eq!(outcome.text, MAPPER);
}

#[test]
fn test_identity_keeps_crlf_multiline_bodies() {
    let document =
        "<mapper>\r\n  <select id=\"a\">\r\n    SELECT a\r\n    FROM t\r\n  </select>\r\n</mapper>\r\n";
    let outcome = convert_with(&identity, document);
    assert!(!outcome.changed);
    assert_eq!(outcome.text, document);
}

#[test]
fn test_identity_keeps_comment_lines() {
    let document = "<select id=\"a\">\n    -- filter by status:\n    SELECT a FROM t WHERE s = #{s}\n</select>";
    let outcome = convert_with(&identity, document);
    assert!(!outcome.changed);
    assert_eq!(outcome.text, document);
}

#[test]
fn test_crlf_rewrite_keeps_crlf() {
    let document = "<select id=\"a\">\r\n    SELECT SYSDATE\r\n    FROM DUAL\r\n</select>";
    let lf_reply = |_: &str, _: &Dialect, _: &Dialect| -> Result<String> {
        Ok("```sql\n    SELECT NOW()\n```\n".to_string())
    };
    let outcome = convert_with(&lf_reply, document);
    assert!(outcome.changed);
    assert_eq!(outcome.text, "<select id=\"a\">\r\n    SELECT NOW()\r\n</select>");
}

#[test]
fn test_echoed_cdata_wrapper_is_a_no_op() {
    let document = "<select id=\"a\"><![CDATA[SELECT 1 WHERE a < 2]]></select>";
    let rewrap = |sql: &str, _: &Dialect, _: &Dialect| -> Result<String> {
        Ok(format!("<![CDATA[{sql}]]>"))
    };
    let outcome = convert_with(&rewrap, document);
    assert!(!outcome.changed);
    assert!(outcome.changes.is_empty());
    assert_eq!(outcome.text, document);
}

#[rstest]
#[case::trailing_newlines("\n\n")]
#[case::leading_newline_and_spaces("\n   ")]
#[case::trailing_spaces("   ")]
fn test_whitespace_only_rewrites_are_no_ops(#[case] padding: &str) {
    let pad = |sql: &str, _: &Dialect, _: &Dialect| -> Result<String> {
        Ok(format!("{padding}{}{padding}", sql.trim()))
    };
    let outcome = convert_with(&pad, MAPPER);
    assert!(!outcome.changed);
    assert_eq!(outcome.text, MAPPER);
}

#[test]
fn test_escape_is_preserved() {
    let doc = "<update id=\"u\"><![CDATA[\n  UPDATE t SET a = 1\n]]></update>";
    let rewrite = |_: &str, _: &Dialect, _: &Dialect| -> Result<String> {
        Ok("  UPDATE s.t SET a = 1".into())
    };
    let outcome = convert_with(&rewrite, doc);
    assert_eq!(
        outcome.text,
        "<update id=\"u\"><![CDATA[\n  UPDATE s.t SET a = 1\n]]></update>"
    );
}

#[test]
fn test_escape_is_promoted() {
    let doc = "<select id=\"s\">SELECT 1</select>";
    let rewrite = |_: &str, _: &Dialect, _: &Dialect| -> Result<String> {
        Ok("SELECT 1 WHERE 2 > 1".into())
    };
    let outcome = convert_with(&rewrite, doc);
    assert_eq!(
        outcome.text,
        "<select id=\"s\"><![CDATA[SELECT 1 WHERE 2 > 1]]></select>"
    );
}

#[test]
fn test_tags_and_directives_are_preserved() {
    let rename = |sql: &str, _: &Dialect, _: &Dialect| -> Result<String> {
        Ok(sql.replace("FROM t", "FROM s.t").replace("UPDATE t", "UPDATE s.t"))
    };
    let outcome = convert_with(&rename, MAPPER);

    assert!(outcome.changed);
    // The decoded `<` needs a CDATA section once the text is rewritten
    assert!(outcome.text.contains(
        "<select id=\"one\">\n<![CDATA[\n    SELECT a FROM s.t WHERE b < 3\n]]>\n  </select>"
    ));
    assert!(outcome.text.contains("<update id=\"two\"><![CDATA[\n    UPDATE s.t SET a = 1 WHERE b < 3\n  ]]></update>"));
    assert!(outcome.text.contains(
        "<delete id=\"three\">\n    DELETE FROM s.t\n    <where><if test=\"x != null\">x = #{x}</if></where>\n  </delete>"
    ));
    assert!(outcome.text.contains("<!-- header comment with <select> in it -->"));
}

#[test]
fn test_failure_is_contained_to_its_block() {
    let flaky = |sql: &str, _: &Dialect, _: &Dialect| -> Result<String> {
        if sql.contains("UPDATE") {
            Err(Error::Rejected("rate limited".into()))
        } else {
            Ok(sql.replace("FROM t", "FROM s.t"))
        }
    };
    let outcome = convert_with(&flaky, MAPPER);

    assert_eq!(outcome.changes.len(), 3);
    assert_eq!(outcome.failed_blocks(), 1);
    assert!(outcome.changes[1].failed);
    assert!(outcome.text.contains("FROM s.t WHERE b < 3"));
    assert!(outcome.text.contains("DELETE FROM s.t"));
    assert!(outcome.text.contains(
        "<![CDATA[\n-- CONVERSION FAILED: rate limited\n    UPDATE t SET a = 1 WHERE b < 3\n  ]]>"
    ));
}

#[test]
fn test_blocks_are_transformed_in_document_order() {
    let seen = RefCell::new(Vec::new());
    let record = |sql: &str, _: &Dialect, _: &Dialect| -> Result<String> {
        seen.borrow_mut().push(sql.split_whitespace().next().unwrap_or("").to_string());
        Ok(sql.to_string())
    };
    convert_with(&record, MAPPER);
    assert_eq!(*seen.borrow(), vec!["SELECT", "UPDATE", "DELETE"]);
}

#[test]
fn test_change_metadata() {
    let rewrite = |sql: &str, _: &Dialect, _: &Dialect| -> Result<String> {
        Ok(sql.replace("DELETE FROM t", "DELETE FROM s.t"))
    };
    let outcome = convert_with(&rewrite, MAPPER);

    let ids: Vec<Option<&str>> = outcome.changes.iter().map(|c| c.id.as_deref()).collect();
    assert_eq!(ids, vec![Some("three")]);
    assert_eq!(outcome.changes[0].sequence, 3);
    assert_eq!(
        outcome.changes[0].original,
        "    DELETE FROM t\n    <where><if test=\"x != null\">x = #{x}</if></where>"
    );
}

fn build_document(bodies: &[(u8, String)]) -> String {
    let mut doc = String::from("<?xml version=\"1.0\"?>\n<mapper>\n");
    for (i, (kind, body)) in bodies.iter().enumerate() {
        let tag = ["select", "insert", "update", "delete"][*kind as usize % 4];
        doc.push_str(&format!("  <{tag} id=\"s{i}\">{body}</{tag}>\n  <!-- gap {i} -->\n"));
    }
    doc.push_str("</mapper>\n");
    doc
}

fn body_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ \\r\\nA-Za-z0-9=,*#{}()':-]{0,40}",
        "[A-Za-z0-9 ]{0,12}:".prop_map(|s| format!("\n    -- {s}\n    SELECT a FROM t\n  ")),
        "[A-Za-z0-9 ]{0,20}".prop_map(|s| format!("\r\n    SELECT {s}\r\n    FROM t\r\n  ")),
        "[ \\nA-Za-z0-9=,*]{0,20}".prop_map(|s| format!("\n  <![CDATA[ {s} < 1 ]]>\n")),
        "[A-Za-z0-9 ]{0,20}".prop_map(|s| format!("{s} &lt; <if test=\"a\">a = #{{a}}</if>")),
    ]
}

proptest! {
    #[test]
    fn prop_identity_is_byte_identical(
        bodies in proptest::collection::vec((0u8..4, body_strategy()), 0..6)
    ) {
        let doc = build_document(&bodies);
        let outcome = convert_with(&identity, &doc);
        prop_assert!(!outcome.changed);
        prop_assert_eq!(outcome.text, doc);
    }

    #[test]
    fn prop_unchanged_regions_survive_rewrites(
        bodies in proptest::collection::vec((0u8..4, body_strategy()), 1..6)
    ) {
        let doc = build_document(&bodies);
        let marker = |_: &str, _: &Dialect, _: &Dialect| -> Result<String> { Ok("X".into()) };
        let outcome = convert_with(&marker, &doc);

        for i in 0..bodies.len() {
            let gap = format!("<!-- gap {i} -->");
            prop_assert!(outcome.text.contains(&gap));
        }
        prop_assert!(outcome.text.starts_with("<?xml version=\"1.0\"?>\n<mapper>\n"));
        prop_assert!(outcome.text.ends_with("</mapper>\n"));
    }
}
