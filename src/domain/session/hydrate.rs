//! Template hydration for phase tasks.
//!
//! Phase tasks reference earlier answers with `{{variable}}` placeholders.
//! Hydration is total: every complete placeholder resolves, and missing
//! context keys degrade to a readable `[该variable]` stand-in instead of
//! failing the turn.

use super::Context;

/// Resolves every `{{name}}` placeholder in `template` against `ctx`.
pub fn hydrate(template: &str, ctx: &Context) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        match after_open.find("}}") {
            Some(end) => {
                let key = after_open[..end].trim();
                match ctx.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("[该");
                        out.push_str(key);
                        out.push(']');
                    }
                }
                rest = &after_open[end + 2..];
            }
            None => {
                // Unterminated opener: not a placeholder, emit verbatim.
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ctx(pairs: &[(&str, &str)]) -> Context {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_known_variable() {
        let c = ctx(&[("user_role", "仓库分拣员")]);
        assert_eq!(
            hydrate("刚才你提到的【{{user_role}}】", &c),
            "刚才你提到的【仓库分拣员】"
        );
    }

    #[test]
    fn missing_variable_becomes_placeholder() {
        let c = ctx(&[]);
        assert_eq!(
            hydrate("【{{fatal_mistake}}】降低了多少？", &c),
            "【[该fatal_mistake]】降低了多少？"
        );
    }

    #[test]
    fn resolves_multiple_placeholders() {
        let c = ctx(&[("a", "甲"), ("b", "乙")]);
        assert_eq!(hydrate("{{a}}和{{b}}和{{c}}", &c), "甲和乙和[该c]");
    }

    #[test]
    fn trims_whitespace_inside_braces() {
        let c = ctx(&[("key", "值")]);
        assert_eq!(hydrate("{{ key }}", &c), "值");
    }

    #[test]
    fn unterminated_opener_is_left_verbatim() {
        let c = ctx(&[("a", "甲")]);
        assert_eq!(hydrate("前缀{{a}}后缀{{broken", &c), "前缀甲后缀{{broken");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(hydrate("没有占位符", &ctx(&[])), "没有占位符");
    }

    proptest! {
        // Totality: never panics on arbitrary unicode templates.
        #[test]
        fn hydration_is_total(template in "\\PC{0,200}") {
            let _ = hydrate(&template, &ctx(&[("x", "y")]));
        }

        // Every well-formed placeholder resolves, present in context or not.
        #[test]
        fn well_formed_placeholders_always_resolve(key in "[a-z_]{1,12}") {
            let template = format!("前{{{{{key}}}}}后");
            let out = hydrate(&template, &ctx(&[]));
            prop_assert_eq!(out, format!("前[该{key}]后"));
        }
    }
}
