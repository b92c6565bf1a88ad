/// Replace `${ENV_VAR}` placeholders in config text.
///
/// Unresolvable variables are left as-is so the parse error (or the missing
/// master-key error downstream) points at the real problem.
pub fn substitute_env(input: &str) -> String {
    substitute_with(input, |name| std::env::var(name).ok())
}

/// Placeholder substitution with a custom lookup, testable without touching
/// the process environment.
fn substitute_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    },
                }
                rest = &after[end + 1..];
            },
            // No closing brace (or empty name): emit literally and move on.
            _ => {
                out.push_str("${");
                rest = after;
            },
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_var() {
        let lookup = |name: &str| (name == "LOCKSTASH_MASTER_KEY").then(|| "s3cr3t".to_string());
        assert_eq!(
            substitute_with("master_key = \"${LOCKSTASH_MASTER_KEY}\"", lookup),
            "master_key = \"s3cr3t\""
        );
    }

    #[test]
    fn leaves_unknown_var() {
        let lookup = |_: &str| None;
        assert_eq!(
            substitute_with("${LOCKSTASH_NONEXISTENT_XYZ}", lookup),
            "${LOCKSTASH_NONEXISTENT_XYZ}"
        );
    }

    #[test]
    fn multiple_placeholders() {
        let lookup = |name: &str| match name {
            "A" => Some("1".to_string()),
            "B" => Some("2".to_string()),
            _ => None,
        };
        assert_eq!(substitute_with("${A}-${B}-${C}", lookup), "1-2-${C}");
    }

    #[test]
    fn unclosed_placeholder_is_literal() {
        let lookup = |_: &str| Some("nope".to_string());
        assert_eq!(substitute_with("tail ${UNCLOSED", lookup), "tail ${UNCLOSED");
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }
}
