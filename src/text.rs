//! Leaf text extraction and on-page text assertions.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};

/// Flattens a JSON document into `(dotted.path, text)` pairs.
///
/// Objects and arrays are walked recursively (array elements use their index
/// as the path segment). `null` leaves contribute nothing; numbers and
/// booleans are rendered with their JSON display form.
pub fn collect_leaf_text(value: &Value) -> Vec<(String, String)> {
    let mut out = Vec::new();
    grab(value, "", &mut out);
    out
}

fn grab(value: &Value, prefix: &str, out: &mut Vec<(String, String)>) {
    let join = |segment: &str| {
        if prefix.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{}", prefix, segment)
        }
    };

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                grab(child, &join(key), out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                grab(child, &join(&index.to_string()), out);
            }
        }
        Value::Null => {}
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
        Value::Number(n) => out.push((prefix.to_string(), n.to_string())),
        Value::Bool(b) => out.push((prefix.to_string(), b.to_string())),
    }
}

/// Quotes a string as an XPath literal, whatever quotes it contains.
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{}'", text)
    } else if !text.contains('"') {
        format!("\"{}\"", text)
    } else {
        let parts: Vec<String> = text.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// XPath matching an element whose text, span content or placeholder holds `text`.
pub fn assertive_text_selector(text: &str) -> String {
    let lit = xpath_literal(text);
    format!(
        "//*[contains(text(),{lit})] | //span[contains(.,{lit})] | //*[contains(@placeholder,{lit})]"
    )
}

/// Page access needed to assert on visible text.
#[async_trait]
pub trait PageProbe: Send + Sync {
    /// Waits until `selector` matches a visible element.
    ///
    /// Returns `Ok(false)` if nothing matched within `timeout`.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool>;
}

/// Asserts that every leaf text of `inputs` is visible on the page.
///
/// Fails on the first text that does not appear within `timeout`.
pub async fn verify_assertive_text<P>(probe: &P, inputs: &Value, timeout: Duration) -> Result<()>
where
    P: PageProbe + ?Sized,
{
    for (path, text) in collect_leaf_text(inputs) {
        let selector = assertive_text_selector(&text);
        let found = match probe.wait_for_selector(&selector, timeout).await {
            Ok(found) => found,
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "text lookup failed");
                false
            }
        };
        if !found {
            return Err(Error::TextNotFound {
                text,
                timeout_secs: timeout.as_secs(),
            });
        }
        tracing::debug!(path = %path, text = %text, "text visible");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct FakePage {
        visible: Vec<&'static str>,
        asked: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PageProbe for FakePage {
        async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<bool> {
            self.asked.lock().unwrap().push(selector.to_string());
            Ok(self
                .visible
                .iter()
                .any(|t| selector.contains(&format!("'{}'", t))))
        }
    }

    #[test]
    fn leaf_paths_follow_nesting() {
        let doc = json!({
            "title": "Mr",
            "dateOfBirth": {"day": "1", "month": "February"},
            "tags": ["a", null, 3],
            "active": true,
            "middle": null
        });

        let leaves = collect_leaf_text(&doc);
        assert_eq!(
            leaves,
            vec![
                ("active".to_string(), "true".to_string()),
                ("dateOfBirth.day".to_string(), "1".to_string()),
                ("dateOfBirth.month".to_string(), "February".to_string()),
                ("tags.0".to_string(), "a".to_string()),
                ("tags.2".to_string(), "3".to_string()),
                ("title".to_string(), "Mr".to_string()),
            ]
        );
    }

    #[test]
    fn scalar_root_has_empty_path() {
        assert_eq!(collect_leaf_text(&json!("x")), vec![(String::new(), "x".to_string())]);
        assert!(collect_leaf_text(&Value::Null).is_empty());
    }

    #[test]
    fn xpath_literal_handles_quotes() {
        assert_eq!(xpath_literal("Pune"), "'Pune'");
        assert_eq!(xpath_literal("O'Neil"), "\"O'Neil\"");
        assert_eq!(
            xpath_literal(r#"say "it's""#),
            r#"concat('say "it', "'", 's"')"#
        );
    }

    #[test]
    fn selector_covers_text_span_and_placeholder() {
        let selector = assertive_text_selector("Signup");
        assert_eq!(
            selector,
            "//*[contains(text(),'Signup')] | //span[contains(.,'Signup')] | //*[contains(@placeholder,'Signup')]"
        );
    }

    #[tokio::test]
    async fn verify_passes_when_all_visible() {
        let page = FakePage {
            visible: vec!["Pune", "411006"],
            asked: Mutex::new(Vec::new()),
        };
        let inputs = json!({"address": {"city": "Pune", "zipcode": "411006"}});

        verify_assertive_text(&page, &inputs, Duration::from_secs(10)).await.unwrap();
        assert_eq!(page.asked.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn verify_stops_at_first_missing_text() {
        let page = FakePage {
            visible: vec!["Pune"],
            asked: Mutex::new(Vec::new()),
        };
        let inputs = json!({"a": "Mumbai", "b": "Pune"});

        let err = verify_assertive_text(&page, &inputs, Duration::from_secs(10))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "text \"Mumbai\" not found within 10 seconds");
        assert_eq!(page.asked.lock().unwrap().len(), 1);
    }
}
