use std::time::Duration;

/// How the automation checkout is obtained.
///
/// - `Clone`: delete any stale checkout, clone fresh, check out the branch.
/// - `InPlace`: reuse an existing checkout under the project root and pass
///   `--exclude <name>` to the script so it skips its own directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    Clone,
    InPlace,
}

impl Default for PipelineMode {
    fn default() -> Self {
        PipelineMode::Clone
    }
}

impl PipelineMode {
    pub fn from_clone_flag(clone: bool) -> Self {
        if clone {
            PipelineMode::Clone
        } else {
            PipelineMode::InPlace
        }
    }

    /// Script path used when the config does not name one.
    pub fn default_script(&self) -> &'static str {
        match self {
            PipelineMode::Clone => "pipeline.py",
            PipelineMode::InPlace => "deploy.py",
        }
    }

    /// Whether `--exclude <repo>` is passed when the config does not say.
    pub fn default_exclude_self(&self) -> bool {
        matches!(self, PipelineMode::InPlace)
    }
}

/// Parse a duration string like `"500ms"`, `"30s"`, `"10m"` or `"1h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;

    let secs_per_unit = match unit_part.trim() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        unit => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };
    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration too large: '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_units() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("10m").unwrap(), Duration::from_secs(600));
        assert_eq!(parse_duration(" 2h ").unwrap(), Duration::from_secs(7200));
    }

    #[test]
    fn rejects_missing_or_unknown_units() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("15").is_err());
        assert!(parse_duration("3d").is_err());
        assert!(parse_duration("m").is_err());
        assert_eq!(
            parse_duration("9999999999999999h"),
            Err("duration too large: '9999999999999999h'".to_string())
        );
        assert!(parse_duration("999999999999999999m").is_err());
    }

    #[test]
    fn mode_defaults_follow_variant() {
        assert_eq!(PipelineMode::Clone.default_script(), "pipeline.py");
        assert!(!PipelineMode::Clone.default_exclude_self());
        assert_eq!(PipelineMode::InPlace.default_script(), "deploy.py");
        assert!(PipelineMode::InPlace.default_exclude_self());
        assert_eq!(PipelineMode::from_clone_flag(false), PipelineMode::InPlace);
    }
}
