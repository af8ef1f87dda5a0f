use std::fs;
use std::path::Path;

use crate::constants::*;
use crate::error::{Result, SimError};

/// One step of a page reference trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceOp {
    Access(PageId),
    Reset,
}

/// One line of a segment script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentCommand {
    Alloc { size: usize, label: String },
    Free(String),
    Reset,
}

fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_CHAR) {
        Some(i) => &line[..i],
        None => line,
    }
}

/// Parse a reference string: whitespace-separated page numbers, `reset` tokens and
/// `#` comments, spread over any number of lines
pub fn parse_reference_string(content: &str) -> Result<Vec<TraceOp>> {
    let mut ops = Vec::new();
    for (n, line) in content.lines().enumerate() {
        for token in strip_comment(line).split_whitespace() {
            if token.eq_ignore_ascii_case(RESET_TOKEN) {
                ops.push(TraceOp::Reset);
                continue;
            }
            let page: PageId = token.parse().map_err(|_| SimError::Parse {
                line: n + 1,
                message: format!("Invalid page number: {}", token),
            })?;
            ops.push(TraceOp::Access(page));
        }
    }
    Ok(ops)
}

pub fn read_reference_string<P: AsRef<Path>>(path: P) -> Result<Vec<TraceOp>> {
    let content = fs::read_to_string(path.as_ref())
        .map_err(|e| SimError::Io(format!("Failed to read reference string: {}", e)))?;
    parse_reference_string(&content)
}

/// Parse a segment script, one `alloc <size> <label>`, `free <label>` or `reset` per line
pub fn parse_segment_script(content: &str) -> Result<Vec<SegmentCommand>> {
    let mut commands = Vec::new();
    for (n, line) in content.lines().enumerate() {
        let tokens: Vec<&str> = strip_comment(line).split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        let line = n + 1;
        let err = |message: String| SimError::Parse { line, message };

        let command = match tokens[0].to_ascii_lowercase().as_str() {
            "alloc" | "allocate" => {
                if tokens.len() != 3 {
                    return Err(err(format!(
                        "alloc expects <size> <label>, got {} arguments",
                        tokens.len() - 1
                    )));
                }
                let size: usize = tokens[1]
                    .parse()
                    .map_err(|_| err(format!("Invalid segment size: {}", tokens[1])))?;
                SegmentCommand::Alloc { size, label: tokens[2].to_string() }
            }
            "free" => {
                if tokens.len() != 2 {
                    return Err(err(format!(
                        "free expects <label>, got {} arguments",
                        tokens.len() - 1
                    )));
                }
                SegmentCommand::Free(tokens[1].to_string())
            }
            RESET_TOKEN if tokens.len() == 1 => SegmentCommand::Reset,
            other => return Err(err(format!("Unknown command: {}", other))),
        };
        commands.push(command);
    }
    Ok(commands)
}

pub fn read_segment_script<P: AsRef<Path>>(path: P) -> Result<Vec<SegmentCommand>> {
    let content = fs::read_to_string(path.as_ref())
        .map_err(|e| SimError::Io(format!("Failed to read segment script: {}", e)))?;
    parse_segment_script(&content)
}

/// Write one line per result
pub fn write_results<P: AsRef<Path>, T: ToString>(path: P, results: &[T]) -> Result<()> {
    let mut content = results
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    content.push('\n');
    fs::write(path.as_ref(), content)
        .map_err(|e| SimError::Io(format!("Failed to write output file: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference_string() {
        let ops = parse_reference_string("1 2 3\n4 -5 # comment 6\n\nreset 7").unwrap();
        assert_eq!(
            ops,
            vec![
                TraceOp::Access(1),
                TraceOp::Access(2),
                TraceOp::Access(3),
                TraceOp::Access(4),
                TraceOp::Access(-5),
                TraceOp::Reset,
                TraceOp::Access(7),
            ]
        );
    }

    #[test]
    fn test_parse_reference_string_reports_line() {
        let err = parse_reference_string("1 2\n3 x").unwrap_err();
        assert_eq!(
            err,
            SimError::Parse { line: 2, message: "Invalid page number: x".to_string() }
        );
    }

    #[test]
    fn test_parse_empty_inputs() {
        assert!(parse_reference_string("").unwrap().is_empty());
        assert!(parse_segment_script("# only a comment\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_segment_script() {
        let script = "alloc 40 A\nALLOC 10 B  # trailing\n\nfree A\nreset\n";
        let commands = parse_segment_script(script).unwrap();
        assert_eq!(
            commands,
            vec![
                SegmentCommand::Alloc { size: 40, label: "A".to_string() },
                SegmentCommand::Alloc { size: 10, label: "B".to_string() },
                SegmentCommand::Free("A".to_string()),
                SegmentCommand::Reset,
            ]
        );
    }

    #[test]
    fn test_parse_segment_script_errors() {
        assert!(matches!(
            parse_segment_script("alloc -4 A"),
            Err(SimError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_segment_script("free A\nalloc 4"),
            Err(SimError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            parse_segment_script("compact"),
            Err(SimError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_segment_script("reset now"),
            Err(SimError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_reference_string("/nonexistent/memsim/trace.txt").unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
    }

    #[test]
    fn test_write_and_read_back() {
        let path = std::env::temp_dir().join(format!("memsim_io_{}.txt", std::process::id()));
        write_results(&path, &["first", "second"]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(content, "first\nsecond\n");
    }
}
