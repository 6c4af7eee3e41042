//! User-Agent string shared by every request the exporter makes.

/// Comment part of the User-Agent.
const UA_COMMENT: &str = "bibliography-export-tool";

/// Default User-Agent for listing, export and attachment requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("biblio-export/{version} ({UA_COMMENT})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_contains_version_and_comment() {
        let ua = default_user_agent();
        assert!(ua.contains(UA_COMMENT), "UA must describe the tool: {ua}");
        assert_eq!(
            env!("CARGO_PKG_VERSION"),
            ua.strip_prefix("biblio-export/")
                .and_then(|s| s.split(' ').next())
                .expect("UA has version"),
            "UA must contain crate version"
        );
    }
}
