//! Query templates and their expansion against a capability profile

pub mod templates;

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::integrations::postgres::CapabilityProfile;

/// Template expansion failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    #[error("unknown placeholder '{{{{{0}}}}}' in query template")]
    UnknownPlaceholder(String),

    #[error("unterminated placeholder at offset {0} in query template")]
    Unterminated(usize),
}

/// Values substituted into query templates.
///
/// Built once from a [`CapabilityProfile`]; the same set is shared by every
/// view so two views never see different facts about the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    values: BTreeMap<&'static str, String>,
}

impl Options {
    pub fn from_profile(profile: &CapabilityProfile) -> Self {
        let mut values = BTreeMap::new();

        values.insert("target_version", profile.version.to_string());
        values.insert(
            "recovery_state",
            if profile.in_recovery { "on" } else { "off" }.to_string(),
        );
        values.insert(
            "application_name",
            profile.application_name.replace('\'', "''"),
        );
        values.insert(
            "track_commit_timestamp",
            if profile.features.track_commit_timestamp {
                "on"
            } else {
                "off"
            }
            .to_string(),
        );

        // WAL functions were renamed in 10; a standby reports the received position.
        let (wal_function, wal_diff_function) = match (profile.version >= 100000, profile.in_recovery)
        {
            (true, false) => ("pg_current_wal_lsn", "pg_wal_lsn_diff"),
            (true, true) => ("pg_last_wal_receive_lsn", "pg_wal_lsn_diff"),
            (false, false) => ("pg_current_xlog_location", "pg_xlog_location_diff"),
            (false, true) => ("pg_last_xlog_receive_location", "pg_xlog_location_diff"),
        };
        values.insert("wal_function", wal_function.to_string());
        values.insert("wal_diff_function", wal_diff_function.to_string());

        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("Invalid placeholder regex"));

/// Expand `{{name}}` placeholders in `template`.
pub fn format(template: &str, options: &Options) -> Result<String, ExpandError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_literal(&mut out, template, last, whole.start())?;

        let name = name.as_str().trim();
        let value = options
            .get(name)
            .ok_or_else(|| ExpandError::UnknownPlaceholder(name.to_string()))?;
        out.push_str(value);
        last = whole.end();
    }

    push_literal(&mut out, template, last, template.len())?;
    Ok(out)
}

/// Copy text between placeholders; an opening brace pair here was never closed.
fn push_literal(out: &mut String, template: &str, from: usize, to: usize) -> Result<(), ExpandError> {
    let literal = &template[from..to];
    if let Some(pos) = literal.find("{{") {
        return Err(ExpandError::Unterminated(from + pos));
    }
    out.push_str(literal);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::postgres::Features;
    use pretty_assertions::assert_eq;

    fn profile(version: u32, in_recovery: bool) -> CapabilityProfile {
        CapabilityProfile {
            version,
            in_recovery,
            features: Features::default(),
            application_name: "pgtop".to_string(),
        }
    }

    #[test]
    fn expands_known_placeholders() {
        let opts = Options::from_profile(&profile(150004, false));
        let sql = format(
            "SELECT {{wal_diff_function}}({{ wal_function }}(), '0/0') -- {{target_version}}",
            &opts,
        )
        .unwrap();
        assert_eq!(
            sql,
            "SELECT pg_wal_lsn_diff(pg_current_wal_lsn(), '0/0') -- 150004"
        );
    }

    #[test]
    fn standby_and_old_servers_use_matching_wal_functions() {
        let standby = Options::from_profile(&profile(130000, true));
        assert_eq!(standby.get("wal_function"), Some("pg_last_wal_receive_lsn"));
        assert_eq!(standby.get("recovery_state"), Some("on"));

        let old = Options::from_profile(&profile(90600, false));
        assert_eq!(old.get("wal_function"), Some("pg_current_xlog_location"));
        assert_eq!(old.get("wal_diff_function"), Some("pg_xlog_location_diff"));
    }

    #[test]
    fn application_name_is_quoted_for_literals() {
        let mut p = profile(150000, false);
        p.application_name = "o'top".to_string();
        let opts = Options::from_profile(&p);
        assert_eq!(
            format("'{{application_name}}'", &opts).unwrap(),
            "'o''top'"
        );
    }

    #[test]
    fn rejects_unknown_and_unterminated_placeholders() {
        let opts = Options::from_profile(&profile(150000, false));
        assert_eq!(
            format("SELECT {{nope}}", &opts),
            Err(ExpandError::UnknownPlaceholder("nope".to_string()))
        );
        assert_eq!(
            format("SELECT {{target_version", &opts),
            Err(ExpandError::Unterminated(7))
        );
        assert_eq!(
            format("SELECT {{target_version}}, {{wal_function", &opts),
            Err(ExpandError::Unterminated(27))
        );
    }

    #[test]
    fn expansion_is_deterministic() {
        let opts = Options::from_profile(&profile(120000, false));
        let first = format(templates::REPLICATION, &opts).unwrap();
        let second = format(templates::REPLICATION, &opts).unwrap();
        assert_eq!(first, second);
        assert!(!first.contains("{{"));
    }
}
