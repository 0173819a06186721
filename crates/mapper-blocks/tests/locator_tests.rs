//! Integration tests for statement block location.

use mapper_blocks::{BlockKind, find_statement, locate_blocks};
use pretty_assertions::assert_eq;
use rstest::rstest;

const MAPPER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE mapper PUBLIC "-//mybatis.org//DTD Mapper 3.0//EN" "http://mybatis.org/dtd/mybatis-3-mapper.dtd">
<mapper namespace="com.example.UserMapper">
  <resultMap id="userMap" type="User">
    <id property="id" column="ID"/>
  </resultMap>

  <sql id="cols">ID, NAME, EMAIL</sql>

  <select id="findById" resultMap="userMap">
    SELECT <include refid="cols"/> FROM USERS WHERE ID = #{id}
  </select>

  <insert id="insertUser">
    <selectKey keyProperty="id" resultType="long" order="BEFORE">
      SELECT USER_SEQ.NEXTVAL FROM DUAL
    </selectKey>
    INSERT INTO USERS (ID, NAME) VALUES (#{id}, #{name})
  </insert>

  <update id="touch">
    UPDATE USERS SET UPDATED = SYSDATE WHERE ID = #{id}
  </update>

  <delete id="purge">
    <![CDATA[
    DELETE FROM USERS WHERE CREATED < SYSDATE - 365
    ]]>
  </delete>
</mapper>
"#;

#[test]
fn test_blocks_found_in_document_order() {
    let blocks = locate_blocks(MAPPER, &BlockKind::ALL);
    let found: Vec<(BlockKind, Option<&str>)> = blocks
        .iter()
        .map(|b| (b.kind, b.statement_id()))
        .collect();

    assert_eq!(
        found,
        vec![
            (BlockKind::Select, Some("findById")),
            (BlockKind::Insert, Some("insertUser")),
            (BlockKind::Update, Some("touch")),
            (BlockKind::Delete, Some("purge")),
        ]
    );
}

#[test]
fn test_body_is_verbatim_slice() {
    for block in locate_blocks(MAPPER, &BlockKind::ALL) {
        assert_eq!(&MAPPER[block.body_span.clone()], block.body);
        assert_eq!(&MAPPER[block.attributes_span.clone()], block.attributes);
        assert!(block.span.start < block.body_span.start);
        assert!(block.body_span.end < block.span.end);
    }
}

#[test]
fn test_blocks_do_not_overlap() {
    let blocks = locate_blocks(MAPPER, &BlockKind::ALL);
    for pair in blocks.windows(2) {
        assert!(pair[0].span.end <= pair[1].span.start);
    }
}

#[rstest]
#[case(BlockKind::Select, "findById")]
#[case(BlockKind::Insert, "insertUser")]
#[case(BlockKind::Update, "touch")]
#[case(BlockKind::Delete, "purge")]
fn test_single_kind_filter(#[case] kind: BlockKind, #[case] id: &str) {
    let blocks = locate_blocks(MAPPER, &[kind]);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].statement_id(), Some(id));
}

#[test]
fn test_no_kinds_yields_nothing() {
    assert!(locate_blocks(MAPPER, &[]).is_empty());
}

#[test]
fn test_nested_select_key_stays_in_insert_body() {
    let insert = find_statement(MAPPER, &BlockKind::ALL, "insertUser").unwrap();
    assert!(insert.body.contains("<selectKey"));
    assert!(insert.body.contains("</selectKey>"));
    assert!(insert.body.contains("INSERT INTO USERS"));
}

#[test]
fn test_find_statement_missing_id() {
    assert!(find_statement(MAPPER, &BlockKind::ALL, "nope").is_none());
}

#[test]
fn test_multibyte_text_around_blocks() {
    let doc = "<!-- 사용자 조회 -->\n<select id=\"한글\">SELECT '가나다' FROM DUAL</select>";
    let blocks = locate_blocks(doc, &BlockKind::ALL);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].statement_id(), Some("한글"));
    assert_eq!(blocks[0].body, "SELECT '가나다' FROM DUAL");
}

#[test]
fn test_first_end_tag_bounds_the_block() {
    let doc = "<select id=\"a\">A</select> middle <select id=\"b\">B</select>";
    let blocks = locate_blocks(doc, &BlockKind::ALL);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].body, "A");
    assert_eq!(blocks[1].body, "B");
}
