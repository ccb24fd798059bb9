use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcfsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type ProcfsResult<T> = Result<T, ProcfsError>;

/// Parent PID from /proc/{pid}/stat
pub fn parse_proc_ppid(content: &str) -> ProcfsResult<u32> {
    // Format: pid (comm) state ppid ...
    // comm may itself contain spaces and parentheses
    let end = content
        .rfind(')')
        .ok_or_else(|| ProcfsError::Parse("No ) found".to_string()))?;

    let mut parts = content[end + 1..].split_whitespace();
    let _state = parts
        .next()
        .ok_or_else(|| ProcfsError::Parse("Missing state".to_string()))?;
    let ppid = parts
        .next()
        .ok_or_else(|| ProcfsError::Parse("Missing ppid".to_string()))?;

    ppid.parse()
        .map_err(|e| ProcfsError::Parse(format!("ppid: {}", e)))
}

/// Numeric directory entries (PIDs, descriptor numbers)
pub fn parse_numeric_name(name: &str) -> Option<u32> {
    name.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_proc_ppid() {
        let content = "4242 (nginx) S 4200 4242 4242 0 -1 4194560 1234 0 0 0 10 5 0 0 20 0 1 0 100 1000000 250\n";
        assert_eq!(parse_proc_ppid(content).unwrap(), 4200);
    }

    #[test]
    fn test_parse_proc_ppid_with_tricky_comm() {
        let content = "77 (my (weird) proc) R 1 77 77 0 -1\n";
        assert_eq!(parse_proc_ppid(content).unwrap(), 1);
    }

    #[test]
    fn test_parse_proc_ppid_truncated() {
        assert!(parse_proc_ppid("77 (proc)").is_err());
        assert!(parse_proc_ppid("garbage").is_err());
    }
}
