//! Scan command implementation
//!
//! Lists the statement blocks of mapper files without converting them.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use mapper_blocks::{Block, BlockKind, extract, find_statement, locate_blocks};
use mapper_fs::{NormalizedPath, find_mapper_files, io};

use crate::error::{CliError, Result};

/// One located statement block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanEntry {
    pub file: String,
    /// 1-based position among the selected blocks of the file
    pub sequence: usize,
    pub kind: BlockKind,
    pub id: Option<String>,
    pub line: usize,
    /// The body holds a CDATA section
    pub cdata: bool,
}

/// Run the scan command
pub fn run_scan(path: &Path, kinds: &[String], id: Option<&str>, json: bool) -> Result<()> {
    let kinds = parse_kinds(kinds)?;
    let entries = scan(&NormalizedPath::new(path), &kinds, id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{} No statement blocks found.", "=>".blue().bold());
        return Ok(());
    }

    let mut current_file: Option<&str> = None;
    for entry in &entries {
        if current_file != Some(entry.file.as_str()) {
            println!("{}", entry.file.bold());
            current_file = Some(entry.file.as_str());
        }
        let cdata = if entry.cdata { " [CDATA]".dimmed().to_string() } else { String::new() };
        println!(
            "  {:>3}  {:<6}  {:<30}  line {}{}",
            entry.sequence,
            entry.kind.to_string().cyan(),
            entry.id.as_deref().unwrap_or("-"),
            entry.line,
            cdata
        );
    }
    println!();
    println!("{} {} block(s)", "OK".green().bold(), entries.len());
    Ok(())
}

/// Statement kinds named on the command line; none means all of them.
pub fn parse_kinds(names: &[String]) -> Result<Vec<BlockKind>> {
    if names.is_empty() {
        return Ok(BlockKind::ALL.to_vec());
    }
    let mut kinds = Vec::with_capacity(names.len());
    for name in names {
        let kind: BlockKind = name.parse()?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

/// Locate blocks in a single file or in every mapper file under a directory.
pub fn scan(path: &NormalizedPath, kinds: &[BlockKind], id: Option<&str>) -> Result<Vec<ScanEntry>> {
    let (root, files) = if path.is_dir() {
        (path.clone(), find_mapper_files(path, &[])?)
    } else if path.is_file() {
        let root = path.parent().unwrap_or_else(|| NormalizedPath::new("."));
        (root, vec![path.clone()])
    } else {
        return Err(CliError::user(format!("{} does not exist", path)));
    };

    let mut entries = Vec::new();
    for file in &files {
        let document = io::read_text(file)?;
        let name = file
            .relative_to(&root)
            .map(|p| p.to_string())
            .unwrap_or_else(|| file.to_string());

        let blocks = locate_blocks(&document, kinds);
        let selected: Vec<(usize, &Block)> = match id {
            Some(id) => {
                // Statement ids are unique within a mapper namespace
                let Some(found) = find_statement(&document, kinds, id) else {
                    continue;
                };
                blocks
                    .iter()
                    .enumerate()
                    .filter(|(_, block)| block.span == found.span)
                    .collect()
            }
            None => blocks.iter().enumerate().collect(),
        };

        for (index, block) in selected {
            entries.push(ScanEntry {
                file: name.clone(),
                sequence: index + 1,
                kind: block.kind,
                id: block.statement_id().map(str::to_string),
                line: block.line(&document),
                cdata: extract(&block.body).uses_literal_escape,
            });
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const MAPPER: &str = r#"<mapper namespace="m">
  <select id="findAll">
    SELECT * FROM users
  </select>
  <insert id="add"><![CDATA[INSERT INTO users VALUES (1)]]></insert>
  <delete id="drop">DELETE FROM users</delete>
</mapper>
"#;

    fn setup() -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("sub")).unwrap();
        std::fs::write(temp.path().join("A.xml"), MAPPER).unwrap();
        std::fs::write(temp.path().join("sub/B.xml"), MAPPER).unwrap();
        std::fs::write(temp.path().join("notes.txt"), "<select>x</select>").unwrap();
        temp
    }

    #[test]
    fn test_scan_directory() {
        let temp = setup();
        let entries = scan(&NormalizedPath::new(temp.path()), &BlockKind::ALL, None).unwrap();

        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0].file, "A.xml");
        assert_eq!(entries[3].file, "sub/B.xml");
        assert_eq!(
            entries[1],
            ScanEntry {
                file: "A.xml".into(),
                sequence: 2,
                kind: BlockKind::Insert,
                id: Some("add".into()),
                line: 5,
                cdata: true,
            }
        );
    }

    #[test]
    fn test_scan_single_file_filtered() {
        let temp = setup();
        let file = NormalizedPath::new(temp.path().join("A.xml"));
        let entries = scan(&file, &[BlockKind::Delete, BlockKind::Select], None).unwrap();

        let ids: Vec<_> = entries.iter().map(|e| e.id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["findAll", "drop"]);
        assert_eq!(entries[1].sequence, 2);
    }

    #[test]
    fn test_scan_by_id() {
        let temp = setup();
        let entries =
            scan(&NormalizedPath::new(temp.path()), &BlockKind::ALL, Some("drop")).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.kind == BlockKind::Delete));
        assert!(entries.iter().all(|e| e.sequence == 3));
    }

    #[test]
    fn test_scan_by_id_reports_first_match_only() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("Dup.xml"),
            "<mapper><select id=\"x\">SELECT 1</select><select id=\"x\">SELECT 2</select></mapper>",
        )
        .unwrap();

        let entries = scan(&NormalizedPath::new(temp.path()), &BlockKind::ALL, Some("x")).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].sequence, 1);
    }

    #[test]
    fn test_scan_missing_path() {
        let temp = TempDir::new().unwrap();
        let err = scan(&NormalizedPath::new(temp.path().join("nope")), &BlockKind::ALL, None)
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!(parse_kinds(&[]).unwrap(), BlockKind::ALL.to_vec());
        assert_eq!(
            parse_kinds(&["UPDATE".into(), "update".into()]).unwrap(),
            vec![BlockKind::Update]
        );
        assert!(matches!(
            parse_kinds(&["merge".into()]),
            Err(CliError::Blocks(_))
        ));
    }
}
