use clap::Parser;

use crate::plugins;

/// `analyzer <queue_capacity> <stage_name> [<stage_name> ...]`
///
/// Builds a pipeline out of the named stages, sharing one bounded-queue
/// capacity across every stage, then streams stdin through it until
/// `<END>` or end-of-input.
#[derive(Parser, Debug)]
#[command(name = "analyzer", version, about)]
pub struct Args {
    /// Capacity shared by every stage's input queue. Must be positive.
    #[arg(value_parser = parse_capacity)]
    pub queue_capacity: usize,

    /// Stage names, applied in pipeline order. One of: logger, typewriter,
    /// uppercaser, rotator, flipper, expander.
    #[arg(required = true, num_args = 1.., value_parser = parse_stage_name)]
    pub stage_names: Vec<String>,
}

fn parse_capacity(raw: &str) -> Result<usize, String> {
    let capacity: usize = raw
        .parse()
        .map_err(|_| format!("queue_capacity must be a positive integer, got `{raw}`"))?;
    if capacity == 0 {
        return Err("queue_capacity must be positive".to_string());
    }
    Ok(capacity)
}

fn parse_stage_name(raw: &str) -> Result<String, String> {
    if plugins::STAGE_NAMES.contains(&raw) {
        Ok(raw.to_string())
    } else {
        Err(format!(
            "unknown stage name `{raw}`, expected one of: {}",
            plugins::STAGE_NAMES.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_valid_invocation() {
        let args = Args::try_parse_from(["analyzer", "4", "uppercaser", "logger"]).unwrap();
        assert_eq!(args.queue_capacity, 4);
        assert_eq!(args.stage_names, vec!["uppercaser", "logger"]);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        assert!(Args::try_parse_from(["analyzer", "0", "logger"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_stage() {
        assert!(Args::try_parse_from(["analyzer", "4", "nope"]).is_err());
    }

    #[test]
    fn test_rejects_missing_stage_names() {
        assert!(Args::try_parse_from(["analyzer", "4"]).is_err());
    }
}
