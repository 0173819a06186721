//! Statement block handling for XML mapper documents.
//!
//! A mapper document holds SQL statements inside `<select>`, `<insert>`,
//! `<update>` and `<delete>` elements:
//!
//! ```text
//! <select id="findUser" resultType="User">
//!   SELECT * FROM users WHERE id = #{id}
//! </select>
//! ```
//!
//! Everything here is lexical. Blocks are found by scanning raw text, never
//! by parsing the document, so files with unknown directives, DTDs or
//! slightly broken markup still round-trip byte-for-byte.
//!
//! - [`locator`] finds blocks and their byte spans
//! - [`extract`] pulls the statement text out of a block body
//! - [`escape`] handles `<![CDATA[ ... ]]>` sections and XML entities
//! - [`splice`] puts replacement text back, keeping tags and layout
//!
//! ```
//! use mapper_blocks::{BlockKind, extract, locate_blocks, splice_body};
//!
//! let doc = "<mapper>\n<select id=\"a\">\n  SELECT 1 FROM DUAL\n</select>\n</mapper>";
//! let blocks = locate_blocks(doc, &BlockKind::ALL);
//! let extracted = extract(&blocks[0].body);
//! assert_eq!(extracted.text, "  SELECT 1 FROM DUAL");
//!
//! let body = splice_body(&extracted, "  SELECT 1").unwrap();
//! assert_eq!(body, "\n  SELECT 1\n");
//! ```

pub mod error;
pub mod escape;
pub mod extract;
pub mod kind;
pub mod locator;
pub mod splice;

pub use error::{Error, Result};
pub use escape::{Segment, has_markup_sensitive, segments, unescape_xml, wrap_cdata};
pub use extract::{Extracted, extract};
pub use kind::BlockKind;
pub use locator::{Block, find_statement, locate_blocks};
pub use splice::{BodyEdit, splice_body, splice_document};
